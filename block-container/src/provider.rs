//! Service providers — bundles of related registrations.
//!
//! A provider receives the container and calls `set` (or `register`)
//! on it as often as it likes.
//!
//! # Examples
//! ```rust
//! use block_container::prelude::*;
//!
//! #[derive(Default)]
//! struct MailProvider;
//!
//! impl ServiceProvider for MailProvider {
//!     fn register(&self, container: &Container) {
//!         container.set("mail.from", Definition::value("noreply@example.com"));
//!     }
//! }
//!
//! // Makes the provider reachable through `register_named`.
//! block_container::provider!(MailProvider);
//!
//! # fn main() {
//! let container = Container::new();
//! container.register(MailProvider);
//! assert!(container.has("mail.from"));
//!
//! container.remove("mail.from");
//! container.register_named(std::any::type_name::<MailProvider>()).unwrap();
//! assert!(container.has("mail.from"));
//! # }
//! ```

use crate::container::Container;

/// A module that registers related dependencies into a container.
///
/// Split registrations by concern instead of one giant setup block:
///
/// ```rust,ignore
/// container.register(DatabaseProvider);
/// container.register(MailProvider);
/// container.register_type::<CacheProvider>();
/// ```
pub trait ServiceProvider: Send + Sync {
    /// Registers dependencies. Called once per `register` call.
    fn register(&self, container: &Container);

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A provider type discoverable by name.
///
/// Entries are collected with [`inventory`] and looked up by
/// [`Container::register_named`]. Use the [`provider!`](crate::provider!)
/// macro rather than building entries by hand.
pub struct ProviderEntry {
    name: &'static str,
    construct: fn() -> Box<dyn ServiceProvider>,
}

impl ProviderEntry {
    pub const fn of<P: ServiceProvider + Default + 'static>(name: &'static str) -> Self {
        Self {
            name,
            construct: construct_default::<P>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Creates a fresh provider instance with no arguments.
    pub fn instantiate(&self) -> Box<dyn ServiceProvider> {
        (self.construct)()
    }
}

fn construct_default<P: ServiceProvider + Default + 'static>() -> Box<dyn ServiceProvider> {
    Box::new(P::default())
}

inventory::collect!(ProviderEntry);

/// Finds a provider submitted under `name`.
pub fn find_provider(name: &str) -> Option<&'static ProviderEntry> {
    inventory::iter::<ProviderEntry>
        .into_iter()
        .find(|entry| entry.name == name)
}

/// Makes a `Default` provider type discoverable by name.
///
/// The name is the type's path (`module_path!()::Type`), which matches
/// `std::any::type_name` for non-generic types. A second form takes an
/// explicit name.
///
/// ```rust,ignore
/// block_container::provider!(MailProvider);
/// block_container::provider!(MailProvider, "mail");
/// ```
#[macro_export]
macro_rules! provider {
    ($provider:ident) => {
        $crate::inventory::submit! {
            $crate::provider::ProviderEntry::of::<$provider>(
                concat!(module_path!(), "::", stringify!($provider))
            )
        }
    };
    ($provider:ty, $name:expr) => {
        $crate::inventory::submit! {
            $crate::provider::ProviderEntry::of::<$provider>($name)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CacheProvider;

    impl ServiceProvider for CacheProvider {
        fn register(&self, _container: &Container) {}
    }

    #[derive(Default)]
    struct AliasedProvider;

    impl ServiceProvider for AliasedProvider {
        fn register(&self, _container: &Container) {}

        fn name(&self) -> &str {
            "aliased"
        }
    }

    crate::provider!(CacheProvider);
    crate::provider!(AliasedProvider, "provider.aliased");

    #[test]
    fn provider_has_name() {
        assert!(CacheProvider.name().ends_with("CacheProvider"));
        assert_eq!(AliasedProvider.name(), "aliased");
    }

    #[test]
    fn macro_name_matches_type_name() {
        let name = std::any::type_name::<CacheProvider>();
        let entry = find_provider(name).expect("provider submitted");
        assert_eq!(entry.name(), name);
    }

    #[test]
    fn explicit_name_is_used() {
        let entry = find_provider("provider.aliased").expect("provider submitted");
        assert_eq!(entry.instantiate().name(), "aliased");
    }

    #[test]
    fn unknown_name_is_absent() {
        assert!(find_provider("provider.missing").is_none());
    }
}
