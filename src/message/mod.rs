//! Message envelope, content schemas and validation for Corbel.
//!
//! This module implements the closed set of message types, their content
//! schemas, and the rules that bind a message's inline content to its claimed
//! identifier.
//!
//! # Architecture
//!
//! The module follows hexagonal architecture principles:
//!
//! - **Domain**: Pure value types ([`domain::Message`], [`domain::MessageContent`], [`domain::ItemHash`], etc.)
//! - **Ports**: Abstract trait interfaces ([`ports::validator::MessageValidator`])
//! - **Validation**: Content addressing, content rules and execution constraints
//! - **Services**: Construction helpers for outbound messages
//!
//! # Example
//!
//! ```
//! use corbel::message::domain::{ItemHash, ItemType};
//!
//! let hash = ItemHash::new("QmPxCe3eHVCdTG5uKnSZTsPGrYvMFTWAAt4PSfK7ETkz4d")
//!     .expect("CIDv0 hashes are recognised");
//! assert_eq!(hash.item_type(), ItemType::Ipfs);
//! ```

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

#[cfg(test)]
mod tests;
