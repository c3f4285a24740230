//! Port trait definitions for the message subsystem.
//!
//! Ports define the abstract interfaces that callers depend on. The default
//! adapter lives in [`crate::message::validation`].

pub mod validator;

pub use validator::{MessageValidator, ValidationConfig, ValidationResult};
