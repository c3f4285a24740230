//! Validation of paginated message listings.

use crate::message::{
    domain::Message,
    error::ValidationError,
    ports::validator::{MessageValidator, ValidationResult},
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMessagesResponse {
    messages: Vec<Value>,
    pagination_page: u64,
    pagination_total: u64,
    pagination_per_page: u64,
    pagination_item: String,
}

/// Position of a page within a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Page number, starting at 1.
    pub page: u64,
    /// Total number of items in the listing.
    pub total: u64,
    /// Items per page.
    pub per_page: u64,
    /// Kind of item listed.
    pub item: String,
}

/// A page of messages, each validated on its own.
///
/// One invalid message never prevents the others from being returned; its
/// failure is kept in place of the message.
#[derive(Debug, Clone)]
pub struct MessagesResponse {
    messages: Vec<ValidationResult<Message>>,
    pagination: Pagination,
}

impl MessagesResponse {
    /// Decodes a page envelope and validates every message in it.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Schema` if the page envelope itself is
    /// malformed. Per-message failures are not errors of the page.
    pub fn parse<V>(raw: &Value, validator: &V) -> ValidationResult<Self>
    where
        V: MessageValidator + ?Sized,
    {
        let page = RawMessagesResponse::deserialize(raw)
            .map_err(|error| ValidationError::schema("$", error))?;

        let messages: Vec<_> = page
            .messages
            .iter()
            .map(|message| validator.parse_message(message))
            .collect();

        let response = Self {
            messages,
            pagination: Pagination {
                page: page.pagination_page,
                total: page.pagination_total,
                per_page: page.pagination_per_page,
                item: page.pagination_item,
            },
        };
        tracing::debug!(
            page = response.pagination.page,
            valid = response.valid().count(),
            invalid = response.failures().count(),
            "validated message page"
        );
        Ok(response)
    }

    /// Returns every outcome, in page order.
    #[must_use]
    pub const fn messages(&self) -> &[ValidationResult<Message>] {
        self.messages.as_slice()
    }

    /// Iterates over the messages that passed validation.
    pub fn valid(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter_map(|outcome| outcome.as_ref().ok())
    }

    /// Iterates over failures with their position in the page.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &ValidationError)> {
        self.messages
            .iter()
            .enumerate()
            .filter_map(|(index, outcome)| outcome.as_ref().err().map(|error| (index, error)))
    }

    /// Returns the pagination fields.
    #[must_use]
    pub const fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Returns the number of messages on the page.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the page holds no messages.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
