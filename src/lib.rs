//! Corbel: message format validation for a content-addressed publishing network.
//!
//! Every message on the network carries user content, a content identifier
//! derived from that content, and chain-anchoring metadata. This crate decides
//! whether a message is internally consistent without trusting its sender.
//!
//! # Architecture
//!
//! Corbel follows hexagonal architecture principles:
//!
//! - **Domain**: Immutable value types for envelopes, content variants and
//!   execution specifications
//! - **Ports**: The [`message::ports::validator::MessageValidator`] interface
//! - **Validation**: Content addressing, per-type rules and the execution
//!   constraint engine
//! - **Services**: Helpers for building outbound messages
//!
//! # Modules
//!
//! - [`message`]: Message envelope, content schemas and validation
//!
//! # Example
//!
//! ```
//! use corbel::{compute_item_content_and_hash, parse_message};
//! use serde_json::json;
//!
//! let content = json!({
//!     "address": "0xB68B9D4f3771c246233823ed1D3Add451055F9Ef",
//!     "time": 1_700_000_000.0,
//!     "type": "note",
//!     "content": {"body": "hello"}
//! });
//! let item = compute_item_content_and_hash(&content).expect("content serialises");
//!
//! let raw = json!({
//!     "chain": "ETH",
//!     "sender": "0xB68B9D4f3771c246233823ed1D3Add451055F9Ef",
//!     "type": "POST",
//!     "time": 1_700_000_000.0,
//!     "item_type": "inline",
//!     "item_content": item.item_content(),
//!     "item_hash": item.item_hash().as_str(),
//!     "content": content,
//! });
//!
//! let message = parse_message(&raw).expect("message is consistent");
//! assert_eq!(message.item_hash(), item.item_hash());
//! ```

pub mod message;

pub use message::services::{ItemContent, MessagesResponse, compute_item_content_and_hash};
pub use message::validation::service::{parse_message, parse_message_str};
