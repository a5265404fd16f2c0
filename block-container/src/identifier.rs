//! Dependency identifiers.
//!
//! Every registration in the container is keyed by a string
//! [`Identifier`]. Identifiers are free-form (`"db.url"`, `"mailer"`),
//! but auto-wiring looks dependencies up by their Rust type path, so
//! [`Identifier::of`] gives the canonical identifier for a type.

use std::any::type_name;
use std::borrow::{Borrow, Cow};
use std::fmt;

/// A string key naming a registration.
///
/// # Examples
/// ```
/// use block_container::identifier::Identifier;
///
/// let id = Identifier::new("db.url");
/// assert_eq!(id.as_str(), "db.url");
///
/// // The identifier auto-wiring uses for a type
/// let id = Identifier::of::<String>();
/// assert_eq!(id.as_str(), "alloc::string::String");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Cow<'static, str>);

impl Identifier {
    /// Creates an identifier from any string.
    #[inline]
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    /// The identifier of type `T`, used when a parameter of that type is
    /// auto-wired.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(Cow::Borrowed(type_name::<T>()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `false` for empty or whitespace-only identifiers.
    ///
    /// ```
    /// use block_container::identifier::Identifier;
    ///
    /// assert!(Identifier::new("mailer").is_well_formed());
    /// assert!(!Identifier::new("").is_well_formed());
    /// assert!(!Identifier::new("  \t").is_well_formed());
    /// ```
    pub fn is_well_formed(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl From<&'static str> for Identifier {
    fn from(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Self(Cow::Owned(id))
    }
}

impl From<&String> for Identifier {
    fn from(id: &String) -> Self {
        Self(Cow::Owned(id.clone()))
    }
}

impl From<&Identifier> for Identifier {
    fn from(id: &Identifier) -> Self {
        id.clone()
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({:?})", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
