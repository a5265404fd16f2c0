//! Container settings.
//!
//! Settings derive [`serde::Deserialize`] so an application can keep
//! them next to the rest of its configuration:
//!
//! ```rust
//! use block_container::settings::Settings;
//!
//! let settings: Settings = serde_json::from_str(r#"{ "detect_cycles": true }"#).unwrap();
//! assert!(settings.detect_cycles);
//! ```

use serde::Deserialize;

/// Behavior switches for a [`Container`](crate::container::Container).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Fail with [`CircularDependency`](crate::error::BlockError::CircularDependency)
    /// when an identifier is requested while it is still being built.
    ///
    /// Off by default: a dependency cycle then recurses until the stack
    /// is exhausted.
    pub detect_cycles: bool,
}

impl Settings {
    pub fn detect_cycles(mut self, detect: bool) -> Self {
        self.detect_cycles = detect;
        self
    }
}
