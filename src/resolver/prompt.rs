//! Live-generation prompts and response cleanup.

use super::render::RenderContext;
use crate::types::Category;

/// Compose the instruction sent to the generation service.
pub fn compose_prompt(category: Category, ctx: &RenderContext) -> String {
    let name = ctx.get("name").unwrap_or_default();
    let mut prompt = match category {
        Category::Agent => format!(
            "Write the definition of a coding-assistant sub-agent named \"{name}\".\n\
             Start with YAML frontmatter containing `name` and `description`, then \
             describe the agent's role, responsibilities and working rules in Markdown."
        ),
        Category::Skill => format!(
            "Write a coding-assistant skill named \"{name}\".\n\
             Start with YAML frontmatter containing `name` and `description`, then give \
             concise, step-by-step instructions for applying the skill in Markdown."
        ),
        Category::Summary => "Write a concise project overview for a coding assistant \
             working in this repository, in Markdown. Cover purpose, stack, layout \
             conventions and how to build and test."
            .to_string(),
    };

    if let Some(goal) = ctx.get("goal") {
        prompt.push_str(&format!("\n\nThe user's goal: {goal}"));
    }

    let mut facts = Vec::new();
    if let Some(language) = ctx.get("language") {
        facts.push(format!("Language: {language}"));
    }
    if let Some(framework) = ctx.get("framework") {
        facts.push(format!("Framework: {framework}"));
    }
    if let Some(deps) = ctx.get("dependencies") {
        facts.push(format!("Dependencies:\n{deps}"));
    }
    if let Some(patterns) = ctx.get("patterns") {
        facts.push(format!("Code patterns:\n{patterns}"));
    }
    if !facts.is_empty() {
        prompt.push_str("\n\nProject facts:\n");
        prompt.push_str(&facts.join("\n"));
    }

    prompt.push_str("\n\nRespond with the document only, without surrounding code fences.");
    prompt
}

/// Strip wrapping artifacts from a model response.
///
/// Removes surrounding whitespace and one enclosing code fence (with or
/// without a language tag). Fences inside the document are left alone.
pub fn strip_wrapping(text: &str) -> String {
    let trimmed = text.trim();
    match enclosing_fence_body(trimmed) {
        Some(body) => body.trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Body of a fenced block spanning all of `text`, if there is one.
///
/// The block opened on the first line must close on the last line. A
/// closing fence anywhere earlier means the first and last lines belong to
/// separate blocks.
fn enclosing_fence_body(text: &str) -> Option<&str> {
    let ticks = text.len() - text.trim_start_matches('`').len();
    if ticks < 3 {
        return None;
    }
    let fence = &text[..ticks];
    let (info, rest) = text[ticks..].split_once('\n')?;
    if info.contains('`') {
        return None;
    }
    let body = rest.strip_suffix(fence)?;
    if !(body.is_empty() || body.ends_with('\n')) {
        return None;
    }
    let closes_early = body.lines().any(|line| {
        let line = line.trim();
        line.len() >= ticks && line.chars().all(|c| c == '`')
    });
    (!closes_early).then_some(body)
}
