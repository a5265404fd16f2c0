//! Core container implementation for Block DI.

pub mod container;
pub mod definition;
pub mod error;
pub mod identifier;
pub mod provider;
mod registry;
pub mod scope;
pub mod settings;

pub use container::prelude;
pub use container::{Container, ContainerBuilder};
pub use definition::{Definition, Factory, Inject, Injectable, Instance};
pub use error::{BlockError, ErrorKind, Result};
pub use identifier::Identifier;
pub use provider::ServiceProvider;
pub use scope::Scope;
pub use settings::Settings;

#[doc(hidden)]
pub use inventory;
