//! Content-addressed cache keys.

use sha2::{Digest, Sha256};

use super::TtlClass;
use crate::types::{Category, ModelTier};

const ARTIFACT_NAMESPACE: &str = "mimir/artifact/v1";
const FACTS_NAMESPACE: &str = "mimir/facts/v1";

/// Deterministic key for one cache entry.
///
/// The digest is a SHA-256 over the length-prefixed input tuple, so key length
/// is fixed (64 hex chars) no matter how long the goal text is, and field
/// boundaries cannot be shifted to forge a collision (`("ab", "c")` and
/// `("a", "bc")` hash differently).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    digest: String,
    class: TtlClass,
}

impl CacheKey {
    /// Key for one generated artifact.
    pub fn for_artifact(
        goal: &str,
        fingerprint: &str,
        category: Category,
        name: &str,
        tier: ModelTier,
    ) -> Self {
        Self {
            digest: digest(
                ARTIFACT_NAMESPACE,
                &[goal, fingerprint, category.as_str(), name, tier.as_str()],
            ),
            class: TtlClass::Generated,
        }
    }

    /// Key for the facts snapshot of a project state.
    pub fn for_facts(fingerprint: &str) -> Self {
        Self {
            digest: digest(FACTS_NAMESPACE, &[fingerprint]),
            class: TtlClass::Project,
        }
    }

    /// Hex digest used as the backend key.
    pub fn as_str(&self) -> &str {
        &self.digest
    }

    pub fn class(&self) -> TtlClass {
        self.class
    }
}

fn digest(namespace: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}
