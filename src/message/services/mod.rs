//! Application services for the message subsystem.
//!
//! Services sit on top of the validator port: building outbound messages
//! and validating paginated batches of inbound ones.

mod item_content;
mod messages_response;

pub use item_content::{ItemContent, compute_item_content_and_hash};
pub use messages_response::{MessagesResponse, Pagination};
