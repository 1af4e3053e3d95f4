//! Model capability tiers and complexity hints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{MimirError, Result};

/// Ordinal ranking of model capability, lowest cost first.
///
/// The derived `Ord` follows declaration order, so `Fast < Balanced < Capable`
/// and a ceiling clamp is a plain `min`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Fast,
    #[default]
    Balanced,
    Capable,
}

impl ModelTier {
    /// All tiers in ascending order.
    pub const ALL: [ModelTier; 3] = [ModelTier::Fast, ModelTier::Balanced, ModelTier::Capable];

    /// The next tier up, saturating at [`ModelTier::Capable`].
    pub fn step_up(self) -> Self {
        match self {
            ModelTier::Fast => ModelTier::Balanced,
            ModelTier::Balanced | ModelTier::Capable => ModelTier::Capable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Fast => "fast",
            ModelTier::Balanced => "balanced",
            ModelTier::Capable => "capable",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelTier {
    type Err = MimirError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(ModelTier::Fast),
            "balanced" => Ok(ModelTier::Balanced),
            "capable" => Ok(ModelTier::Capable),
            other => Err(MimirError::Validation(format!("unknown model tier: {other}"))),
        }
    }
}

/// Caller-supplied hint about how demanding an item is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    #[default]
    Normal,
    High,
}

impl FromStr for Complexity {
    type Err = MimirError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Complexity::Low),
            "normal" => Ok(Complexity::Normal),
            "high" => Ok(Complexity::High),
            other => Err(MimirError::Validation(format!("unknown complexity: {other}"))),
        }
    }
}
