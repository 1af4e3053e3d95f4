//! Artifact categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{MimirError, Result};

/// Kind of artifact being generated.
///
/// Each category is resolved through the same strategy chain but carries its
/// own selection policy, built-in templates, and fallback template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// A sub-agent definition.
    Agent,
    /// A reusable skill definition.
    Skill,
    /// The single project summary document.
    Summary,
}

impl Category {
    /// All categories in processing order.
    pub const ALL: [Category; 3] = [Category::Agent, Category::Skill, Category::Summary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Agent => "agent",
            Category::Skill => "skill",
            Category::Summary => "summary",
        }
    }

    /// Directory name used for override templates (`agents/`, `skills/`, `summary/`).
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Agent => "agents",
            Category::Skill => "skills",
            Category::Summary => "summary",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = MimirError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "agent" | "agents" => Ok(Category::Agent),
            "skill" | "skills" => Ok(Category::Skill),
            "summary" => Ok(Category::Summary),
            other => Err(MimirError::Validation(format!("unknown category: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_singular_and_plural() {
        assert_eq!("agent".parse::<Category>().unwrap(), Category::Agent);
        assert_eq!("skills".parse::<Category>().unwrap(), Category::Skill);
        assert!("widget".parse::<Category>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Category::Summary).unwrap(),
            "\"summary\""
        );
    }
}
