//! Construction of inline content for outbound messages.
//!
//! This is the inverse of the receiver-side hash check: content is serialised
//! deterministically and hashed, and the result is embedded in the message
//! before transmission.

use crate::message::{
    domain::{HashType, ItemHash, ItemType},
    error::ValidationError,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Serialised inline content and its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemContent {
    item_content: String,
    item_hash: ItemHash,
}

impl ItemContent {
    /// Returns the serialised content.
    #[must_use]
    pub fn item_content(&self) -> &str {
        &self.item_content
    }

    /// Returns the SHA-256 hash of the serialised content.
    #[must_use]
    pub const fn item_hash(&self) -> &ItemHash {
        &self.item_hash
    }

    /// Returns the serialised content and its hash, consuming the value.
    #[must_use]
    pub fn into_parts(self) -> (String, ItemHash) {
        (self.item_content, self.item_hash)
    }

    /// Embeds the content in a raw message record.
    ///
    /// Sets `item_type` to `inline` along with `item_content` and
    /// `item_hash`; every other field is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Schema` if `message` is not a JSON object.
    ///
    /// # Examples
    ///
    /// ```
    /// use corbel::compute_item_content_and_hash;
    /// use serde_json::json;
    ///
    /// let item = compute_item_content_and_hash(&json!({"b": 1, "a": null}))
    ///     .expect("content serialises");
    /// let mut message = json!({"type": "POST"});
    /// item.apply_to(&mut message).expect("message is an object");
    ///
    /// assert_eq!(message["item_type"], "inline");
    /// assert_eq!(message["item_content"], r#"{"b":1}"#);
    /// ```
    pub fn apply_to(&self, message: &mut Value) -> Result<(), ValidationError> {
        let Value::Object(fields) = message else {
            return Err(ValidationError::schema("$", "message must be a JSON object"));
        };
        fields.insert(
            "item_type".to_owned(),
            Value::String(ItemType::Inline.as_str().to_owned()),
        );
        fields.insert(
            "item_content".to_owned(),
            Value::String(self.item_content.clone()),
        );
        fields.insert(
            "item_hash".to_owned(),
            Value::String(self.item_hash.as_str().to_owned()),
        );
        Ok(())
    }
}

/// Serialises `content` deterministically and hashes it with SHA-256.
///
/// Null-valued object fields are dropped at every depth, object keys are
/// written in sorted order and no whitespace is inserted.
///
/// # Errors
///
/// Returns `ValidationError::Schema` if `content` cannot be represented as
/// JSON.
///
/// # Examples
///
/// ```
/// use corbel::compute_item_content_and_hash;
/// use serde_json::json;
///
/// let item = compute_item_content_and_hash(&json!({"z": [1, 2], "a": "x"}))
///     .expect("content serialises");
/// assert_eq!(item.item_content(), r#"{"a":"x","z":[1,2]}"#);
/// assert!(item.item_hash().is_storage());
/// ```
pub fn compute_item_content_and_hash<T>(content: &T) -> Result<ItemContent, ValidationError>
where
    T: Serialize + ?Sized,
{
    let value =
        serde_json::to_value(content).map_err(|error| ValidationError::schema("content", error))?;
    let item_content = serde_json::to_string(&canonicalize(&value))
        .map_err(|error| ValidationError::schema("content", error))?;
    let digest = HashType::Sha256.digest(item_content.as_bytes());
    let item_hash =
        ItemHash::new(digest).map_err(|error| ValidationError::unknown_hash("item_hash", error))?;

    tracing::trace!(%item_hash, bytes = item_content.len(), "computed inline content hash");
    Ok(ItemContent {
        item_content,
        item_hash,
    })
}

/// Drops null-valued object fields and rebuilds objects in key order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(fields) => {
            let sorted: BTreeMap<&String, Value> = fields
                .iter()
                .filter(|(_, field)| !field.is_null())
                .map(|(key, field)| (key, canonicalize(field)))
                .collect();
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(key, field)| (key.clone(), field))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
