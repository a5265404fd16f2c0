//! # Block — a runtime dependency injection container
//!
//! Register values, constructible types and factories under string
//! identifiers, then `get` them back fully built. Constructor and factory
//! parameters are auto-wired by type, recursively.
//!
//! ```rust
//! use block::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Injectable)]
//! struct Transport;
//!
//! #[derive(Injectable)]
//! struct Mailer {
//!     transport: Arc<Transport>,
//! }
//!
//! let container = Container::new();
//! container.bind_singleton::<Transport>();
//! container.bind::<Mailer>();
//!
//! let a: Arc<Mailer> = container.resolve().unwrap();
//! let b: Arc<Mailer> = container.resolve().unwrap();
//! assert!(!Arc::ptr_eq(&a, &b));
//! assert!(Arc::ptr_eq(&a.transport, &b.transport));
//! ```

pub use block_container::*;
pub use block_container::provider;
pub use block_derive::*;
pub use block_support::*;

pub mod prelude {
    pub use block_container::prelude::*;
    pub use block_derive::Injectable;
}
