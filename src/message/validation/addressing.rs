//! Content-addressing rules.
//!
//! These rules bind a message's declared storage kind, its inline content,
//! its claimed hash and its confirmations together. Each rule is a pure
//! function over the envelope and returns `Ok(())` or a specific
//! `ValidationError`.

use crate::message::{
    domain::{HashClassifier, HashType, ItemHash, ItemType, MessageEnvelope},
    error::ValidationError,
};
use serde_json::Value;

/// Classifies the claimed `item_hash`.
///
/// # Errors
///
/// Returns `ValidationError::UnknownHashFormat` if the hash matches no known
/// shape.
pub fn classify_item_hash(
    envelope: &MessageEnvelope,
    classifier: &HashClassifier,
) -> Result<ItemHash, ValidationError> {
    ItemHash::with_classifier(envelope.item_hash(), classifier)
        .map_err(|error| ValidationError::unknown_hash("item_hash", error))
}

/// Resolves the declared hash function, defaulting to SHA-256.
///
/// # Errors
///
/// Returns `ValidationError::UnsupportedHashFunction` for any other name.
pub fn resolve_hash_type(envelope: &MessageEnvelope) -> Result<HashType, ValidationError> {
    let Some(declared) = envelope.hash_type() else {
        return Ok(HashType::default());
    };
    HashType::parse(declared).ok_or_else(|| ValidationError::UnsupportedHashFunction {
        value: declared.to_owned(),
    })
}

/// Validates the inline content of an `inline` message.
///
/// The content must be present and well-formed JSON, and the hash of its
/// exact bytes must equal the claimed `item_hash`. Non-inline messages pass.
///
/// # Errors
///
/// Returns `ValidationError::MalformedInlineContent` if the content is
/// missing or not JSON, `ValidationError::UnsupportedHashFunction` if the
/// declared hash function is unknown, and `ValidationError::HashMismatch`
/// if the hashes differ.
pub fn validate_inline_content(envelope: &MessageEnvelope) -> Result<(), ValidationError> {
    if envelope.item_type() != ItemType::Inline {
        return Ok(());
    }

    let item_content =
        envelope
            .item_content()
            .ok_or_else(|| ValidationError::MalformedInlineContent {
                reason: "item_content is missing".to_owned(),
            })?;

    serde_json::from_str::<Value>(item_content).map_err(|error| {
        ValidationError::MalformedInlineContent {
            reason: error.to_string(),
        }
    })?;

    let hash_type = resolve_hash_type(envelope)?;
    let computed = hash_type.digest(item_content.as_bytes());
    if computed != envelope.item_hash() {
        return Err(ValidationError::HashMismatch {
            claimed: envelope.item_hash().to_owned(),
            computed,
        });
    }

    Ok(())
}

/// Validates that non-inline messages carry no inline content.
///
/// # Errors
///
/// Returns `ValidationError::UnexpectedInlineContent` if `item_content` is
/// set on a `storage` or `ipfs` message.
pub fn validate_no_unexpected_inline_content(
    envelope: &MessageEnvelope,
) -> Result<(), ValidationError> {
    let item_type = envelope.item_type();
    if item_type != ItemType::Inline && envelope.item_content().is_some() {
        return Err(ValidationError::UnexpectedInlineContent { item_type });
    }
    Ok(())
}

/// Validates that a `storage` message carries its content.
///
/// Absent, `null` and empty-object content all count as missing.
///
/// # Errors
///
/// Returns `ValidationError::MissingStoredContent` if the content is missing.
pub fn validate_stored_content(
    envelope: &MessageEnvelope,
    content: Option<&Value>,
) -> Result<(), ValidationError> {
    if envelope.item_type() != ItemType::Storage {
        return Ok(());
    }
    let missing = match content {
        None | Some(Value::Null) => true,
        Some(Value::Object(fields)) => fields.is_empty(),
        Some(_) => false,
    };
    if missing {
        return Err(ValidationError::MissingStoredContent);
    }
    Ok(())
}

/// Validates that an `ipfs` message's hash has an IPFS shape.
///
/// Only applied when IPFS verification is enabled.
///
/// # Errors
///
/// Returns `ValidationError::ItemTypeMismatch` if the hash classifies as
/// another kind.
pub fn validate_ipfs_hash(
    envelope: &MessageEnvelope,
    item_hash: &ItemHash,
) -> Result<(), ValidationError> {
    let declared = envelope.item_type();
    let classified = item_hash.item_type();
    if declared == ItemType::Ipfs && classified != ItemType::Ipfs {
        return Err(ValidationError::ItemTypeMismatch {
            declared,
            classified,
        });
    }
    Ok(())
}

/// Validates that the `confirmed` flag agrees with the confirmation list.
///
/// An absent flag is not checked.
///
/// # Errors
///
/// Returns `ValidationError::ConfirmationMismatch` if the flag differs from
/// whether any confirmation is attached.
pub fn validate_confirmations(envelope: &MessageEnvelope) -> Result<(), ValidationError> {
    let Some(confirmed) = envelope.confirmed() else {
        return Ok(());
    };
    let confirmations = envelope.confirmations().len();
    if confirmed != (confirmations > 0) {
        return Err(ValidationError::ConfirmationMismatch {
            confirmed,
            confirmations,
        });
    }
    Ok(())
}
