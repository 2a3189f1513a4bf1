//! Symbolic version targets (branch, tag, or commit).

use std::fmt;

use crate::constants::DEFAULT_BRANCH_NAMES;

/// A branch, tag, or commit hash to check out.
///
/// Two targets are equal iff their names are equal. No attempt is made to
/// tell a branch from a tag or a commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GitTarget {
    name: String,
}

impl GitTarget {
    /// Creates a target for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
        }
    }

    /// The reference name passed to `git checkout` / `git clone --branch`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this target names the repository's default branch.
    ///
    /// Purely name-based: true iff the name is exactly `main` or `master`. The
    /// remote's real HEAD is never queried, so a repository whose default
    /// branch is called something else is treated as non-default.
    #[must_use]
    pub fn is_default(&self) -> bool {
        DEFAULT_BRANCH_NAMES.contains(&self.name.as_str())
    }
}

impl fmt::Display for GitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for GitTarget {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for GitTarget {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
