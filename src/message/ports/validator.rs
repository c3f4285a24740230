//! Validator port for message validation.
//!
//! Defines the abstract interface for validating raw messages at different
//! layers.

use crate::message::{
    domain::{HashClassifier, ItemHash, Message, MessageContent, MessageEnvelope},
    error::ValidationError,
};
use serde_json::Value;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Port for message validation operations.
///
/// Validation occurs in layers:
/// 1. Content addressing (storage kind, inline content, claimed hash,
///    confirmations)
/// 2. Content schema selected by the message type, and its type-local rules
/// 3. Execution constraints, for virtual machine content
///
/// # Implementation Notes
///
/// Implementations should:
/// - Collect all validation errors before returning unless configured to
///   stop at the first one
/// - Use `ValidationError::multiple` to combine errors
/// - Be stateless and thread-safe, so that messages can be validated in
///   parallel
pub trait MessageValidator: Send + Sync {
    /// Validates a raw message record and returns the typed message.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any validation rule fails.
    /// Multiple failures are combined using `ValidationError::Multiple`.
    fn parse_message(&self, raw: &Value) -> ValidationResult<Message>;

    /// Checks the binding between storage kind, inline content and hash.
    ///
    /// `content` is the raw `content` field of the message, if present.
    /// Returns the classified content identifier.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the envelope is inconsistent.
    fn validate_addressing(
        &self,
        envelope: &MessageEnvelope,
        content: Option<&Value>,
    ) -> ValidationResult<ItemHash>;

    /// Checks the rules local to the decoded content.
    ///
    /// `raw_content` is the content record the decoded value came from.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if a content rule or execution constraint
    /// fails.
    fn validate_content(
        &self,
        envelope: &MessageEnvelope,
        content: &MessageContent,
        raw_content: &Value,
    ) -> ValidationResult<()>;
}

/// Configuration for validation rules.
///
/// Allows customization of validation behaviour for different contexts.
///
/// # Examples
///
/// ```
/// use corbel::message::ports::validator::ValidationConfig;
///
/// let config = ValidationConfig::default();
/// assert!(config.collect_all_errors);
/// assert!(!config.verify_ipfs_hashes);
///
/// let strict = ValidationConfig::strict();
/// assert!(strict.verify_ipfs_hashes);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Report every violated rule instead of stopping at the first.
    pub collect_all_errors: bool,
    /// Require the hash of an `ipfs` message to have an IPFS shape.
    pub verify_ipfs_hashes: bool,
    /// Number of distinct hashes the validator's classifier retains.
    pub classifier_capacity: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            collect_all_errors: true,
            verify_ipfs_hashes: false,
            classifier_capacity: HashClassifier::DEFAULT_CAPACITY,
        }
    }
}

impl ValidationConfig {
    /// Creates a lenient configuration that stops at the first error.
    ///
    /// Useful when only a pass/fail verdict is needed.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            collect_all_errors: false,
            ..Default::default()
        }
    }

    /// Creates a strict configuration that also checks IPFS hash shapes.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            collect_all_errors: true,
            verify_ipfs_hashes: true,
            classifier_capacity: HashClassifier::DEFAULT_CAPACITY,
        }
    }
}
