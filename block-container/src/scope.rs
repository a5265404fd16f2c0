//! Registration lifetimes.
//!
//! - [`Scope::Singleton`] — built once on first `get`, then cached
//! - [`Scope::Transient`] — rebuilt on every `get`
use std::fmt;

/// How long a resolved instance lives in the container.
///
/// # Examples
/// ```
/// use block_container::scope::Scope;
///
/// assert_eq!(Scope::from(true), Scope::Singleton);
/// assert!(!Scope::Transient.is_cached());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// One instance per container.
    ///
    /// Created lazily on the first successful `get` and kept until the
    /// identifier is removed.
    Singleton,

    /// A fresh instance for every `get`.
    #[default]
    Transient,
}

impl Scope {
    /// Returns `true` if instances of this scope are cached.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Scope::Singleton)
    }
}

impl From<bool> for Scope {
    fn from(singleton: bool) -> Self {
        if singleton { Scope::Singleton } else { Scope::Transient }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Singleton => write!(f, "Singleton"),
            Scope::Transient => write!(f, "Transient"),
        }
    }
}
