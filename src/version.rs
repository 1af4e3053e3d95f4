//! Build metadata embedded by `build.rs`.

use std::fmt;

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Where this binary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    /// Git branch, or "unknown" outside a checkout.
    pub branch: &'static str,
    /// Full commit SHA, or "unknown".
    pub sha: &'static str,
    pub dirty: bool,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: PKG_VERSION,
            branch: match option_env!("VERGEN_GIT_BRANCH") {
                Some(branch) => branch,
                None => "unknown",
            },
            sha: match option_env!("VERGEN_GIT_SHA") {
                Some(sha) => sha,
                None => "unknown",
            },
            dirty: matches!(option_env!("VERGEN_GIT_DIRTY"), Some("true")),
        }
    }

    pub fn short_sha(&self) -> &'static str {
        &self.sha[..7.min(self.sha.len())]
    }
}

/// Renders as `{version}+{branch}.{short_sha}`, plus `.dirty` for builds
/// from a modified tree.
impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}.{}", self.version, self.branch, self.short_sha())?;
        if self.dirty {
            f.write_str(".dirty")?;
        }
        Ok(())
    }
}

/// Shorthand for `BuildInfo::current().to_string()`.
pub fn version_string() -> String {
    BuildInfo::current().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_has_version_and_build_metadata() {
        let rendered = version_string();
        assert!(rendered.starts_with(PKG_VERSION));
        assert!(rendered.contains('+'));
    }

    #[test]
    fn current_reflects_build_environment() {
        let info = BuildInfo::current();
        assert_eq!(info.version, PKG_VERSION);
        assert_eq!(info.dirty, option_env!("VERGEN_GIT_DIRTY") == Some("true"));
        assert!(!info.branch.is_empty());
        assert_eq!(info.to_string(), version_string());
    }

    #[test]
    fn dirty_suffix() {
        let info = BuildInfo {
            version: "1.2.3",
            branch: "main",
            sha: "0123456789abcdef",
            dirty: true,
        };
        assert_eq!(info.to_string(), "1.2.3+main.0123456.dirty");
        let clean = BuildInfo { dirty: false, ..info };
        assert_eq!(clean.to_string(), "1.2.3+main.0123456");
    }

    #[test]
    fn unknown_sha_is_not_truncated() {
        let info = BuildInfo {
            version: "0.1.0",
            branch: "unknown",
            sha: "unknown",
            dirty: false,
        };
        assert_eq!(info.to_string(), "0.1.0+unknown.unknown");
    }
}
