//! Walker configuration and hard limits.
//!
//! # Invariants
//! - All limits are hard bounds and must be internally consistent.
//!
//! # Design Notes
//! - The unwrap-depth guard bounds a loop the hosting runtimes historically
//!   terminated only through a parse failure; the bound is a deliberate
//!   strengthening against adversarial locator nesting.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shared walker configuration.
///
/// All limits are hard bounds. Locators must be treated as hostile: schemes,
/// nesting depth, and path contents are untrusted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Maximum nested-locator unwrap iterations during enclosing-archive
    /// resolution.
    pub max_nested_unwrap: usize,

    /// Sort native directory listings for deterministic output.
    ///
    /// Filesystem enumeration order is platform-dependent; sorting keeps
    /// results reproducible across runs and hosts.
    pub sort_directory_entries: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            max_nested_unwrap: 16,
            sort_directory_entries: true,
        }
    }
}

impl WalkConfig {
    /// Validate internal consistency.
    ///
    /// Callers should treat a validation failure as a configuration bug, not
    /// hostile input.
    pub fn validate(&self) -> Result<(), WalkConfigError> {
        if self.max_nested_unwrap == 0 {
            return Err(WalkConfigError::MaxNestedUnwrapZero);
        }
        Ok(())
    }
}

/// Validation error returned by `WalkConfig::validate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkConfigError {
    MaxNestedUnwrapZero,
}

impl fmt::Display for WalkConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkConfigError::MaxNestedUnwrapZero => {
                write!(f, "max_nested_unwrap must be > 0")
            }
        }
    }
}

impl std::error::Error for WalkConfigError {}
