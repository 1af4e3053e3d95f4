//! Template rendering.
//!
//! Templates use a deliberately small syntax:
//!
//! - `{{field}}`: replaced by the field's value (empty if unknown or empty).
//! - `{{#field}} ... {{/field}}`: kept only when `field` is non-empty.
//!   Sections do not nest.
//!
//! Values are inserted in a single pass over the template text, so braces in
//! user-supplied values (e.g. the goal) are never re-interpreted, and no
//! `{{...}}` token from the template survives into the output.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::types::{Category, GenerationRequest};

static SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{#\s*([a-z_]+)\s*\}\}(.*?)\{\{/\s*([a-z_]+)\s*\}\}")
        .expect("section pattern is valid")
});

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}").expect("placeholder pattern is valid"));

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").expect("blank-run pattern is valid"));

/// Field values available to templates for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    fields: BTreeMap<&'static str, String>,
}

impl RenderContext {
    /// Build the context for `name` in `category` of `request`.
    pub fn new(category: Category, name: &str, request: &GenerationRequest) -> Self {
        let facts = request.facts();
        let fields = BTreeMap::from([
            ("name", name.to_string()),
            ("title", title_case(name)),
            ("category", category.as_str().to_string()),
            ("goal", request.goal().trim().to_string()),
            ("language", facts.language.clone().unwrap_or_default()),
            ("framework", facts.framework.clone().unwrap_or_default()),
            ("dependencies", bullet_list(&facts.dependencies)),
            ("patterns", bullet_list(&facts.patterns)),
        ]);
        Self { fields }
    }

    /// Non-empty value of `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// Render `template` against `ctx`.
pub fn render(template: &str, ctx: &RenderContext) -> String {
    let sectioned = SECTION.replace_all(template, |caps: &Captures| {
        let (open, body, close) = (&caps[1], &caps[2], &caps[3]);
        if open == close && ctx.get(open).is_some() {
            body.to_string()
        } else {
            String::new()
        }
    });

    let filled = PLACEHOLDER.replace_all(&sectioned, |caps: &Captures| {
        ctx.get(&caps[1]).unwrap_or_default().to_string()
    });

    let collapsed = BLANK_RUN.replace_all(&filled, "\n\n");
    let mut out = collapsed.trim().to_string();
    out.push('\n');
    out
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .filter(|i| !i.trim().is_empty())
        .map(|i| format!("- {}", i.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `code-reviewer` → `Code Reviewer`.
fn title_case(name: &str) -> String {
    name.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
