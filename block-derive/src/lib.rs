//! Derive macros for Block DI.
//!
//! See [`Injectable`] for the field rules.

pub use block_macros::Injectable;
