//! # Block Support
//!
//! Shared helpers for the Block DI container.
//!
//! This crate provides:
//! - Rendering of resolution chains and identifiers for error messages
//! - "Did you mean?" suggestions for unknown identifiers

pub mod rendering;
