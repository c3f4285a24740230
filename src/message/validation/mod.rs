//! Message validation implementation.
//!
//! This module provides the default implementation of message validation:
//! the content-addressing rules, the per-type content rules, the execution
//! constraint engine and the composite validator service.

pub mod addressing;
pub mod execution;
pub mod rules;
pub mod service;

pub use execution::{EXECUTION_CONSTRAINTS, ExecutionConstraint, evaluate_constraints};
pub use service::{DefaultMessageValidator, parse_message, parse_message_str};
