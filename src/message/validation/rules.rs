//! Content rule implementations.
//!
//! Each rule is implemented as a pure function that validates a specific
//! aspect of a message's content. Rules return `Ok(())` on success or a
//! specific `ValidationError` on failure.

use crate::message::{
    domain::{ItemType, MessageContent, MessageEnvelope, PostContent},
    error::ValidationError,
};
use serde_json::{Map, Value};
use std::{cmp::Ordering, collections::BTreeSet};

/// Validates that an amending POST references the post it amends.
///
/// An empty-string reference counts as absent.
///
/// # Errors
///
/// Returns `ValidationError::AmendRequiresRef` if the reference is missing.
///
/// # Examples
///
/// ```
/// use corbel::message::domain::PostContent;
/// use corbel::message::validation::rules::validate_amend_ref;
/// use serde_json::json;
///
/// let post: PostContent = serde_json::from_value(json!({
///     "address": "0xabc",
///     "time": 1.0,
///     "type": "amend"
/// }))
/// .expect("valid post shape");
/// assert!(validate_amend_ref(&post).is_err());
/// ```
pub fn validate_amend_ref(post: &PostContent) -> Result<(), ValidationError> {
    if post.is_amend() && !post.has_ref() {
        return Err(ValidationError::AmendRequiresRef);
    }
    Ok(())
}

/// Validates that a FORGET message has not itself been forgotten.
///
/// # Errors
///
/// Returns `ValidationError::CannotForgetAForget` if `forgotten_by` is not
/// empty.
pub fn validate_forget_not_forgotten(envelope: &MessageEnvelope) -> Result<(), ValidationError> {
    let count = envelope.forgotten_by().len();
    if count > 0 {
        return Err(ValidationError::CannotForgetAForget { count });
    }
    Ok(())
}

/// Validates that inline execution content matches its `content` field.
///
/// Both sides are compared after dropping null-valued fields. Applies only
/// to inline execution messages; everything else passes.
///
/// # Errors
///
/// Returns `ValidationError::ContentItemContentDivergence` naming the first
/// differing top-level field, in key order.
pub fn validate_inline_execution_content(
    envelope: &MessageEnvelope,
    raw_content: &Value,
) -> Result<(), ValidationError> {
    if envelope.item_type() != ItemType::Inline || !envelope.message_type().is_execution() {
        return Ok(());
    }
    let Some(item_content) = envelope.item_content() else {
        return Ok(());
    };
    let decoded: Value = serde_json::from_str(item_content).map_err(|error| {
        ValidationError::MalformedInlineContent {
            reason: error.to_string(),
        }
    })?;

    let content = drop_null_fields(raw_content);
    let declared = drop_null_fields(&decoded);
    if same_value(&content, &declared) {
        return Ok(());
    }

    Err(first_divergence(&content, &declared))
}

/// Applies the rules specific to the decoded content variant.
///
/// # Errors
///
/// Returns the first content rule violation.
pub fn validate_content_rules(
    envelope: &MessageEnvelope,
    content: &MessageContent,
) -> Result<(), ValidationError> {
    match content {
        MessageContent::Post(post) => validate_amend_ref(post),
        MessageContent::Forget(_) => validate_forget_not_forgotten(envelope),
        MessageContent::Aggregate(_)
        | MessageContent::Store(_)
        | MessageContent::Program(_)
        | MessageContent::Instance(_)
        | MessageContent::Confidential(_) => Ok(()),
    }
}

/// Returns a copy of `value` without null-valued object fields, at any depth.
///
/// Nulls inside arrays are kept.
///
/// # Examples
///
/// ```
/// use corbel::message::validation::rules::drop_null_fields;
/// use serde_json::json;
///
/// let value = json!({"a": null, "b": {"c": null, "d": 1}, "e": [null]});
/// assert_eq!(drop_null_fields(&value), json!({"b": {"d": 1}, "e": [null]}));
/// ```
#[must_use]
pub fn drop_null_fields(value: &Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .filter(|(_, field)| !field.is_null())
                .map(|(key, field)| (key.clone(), drop_null_fields(field)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(drop_null_fields).collect()),
        other => other.clone(),
    }
}

fn first_divergence(content: &Value, item_content: &Value) -> ValidationError {
    let (Value::Object(left), Value::Object(right)) = (content, item_content) else {
        return ValidationError::ContentItemContentDivergence {
            field: "content".to_owned(),
            content: content.to_string(),
            item_content: item_content.to_string(),
        };
    };

    let keys: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
    keys.into_iter()
        .find(|key| match (left.get(*key), right.get(*key)) {
            (Some(a), Some(b)) => !same_value(a, b),
            _ => true,
        })
        .map_or_else(
            || ValidationError::ContentItemContentDivergence {
                field: "content".to_owned(),
                content: content.to_string(),
                item_content: item_content.to_string(),
            },
            |key| ValidationError::ContentItemContentDivergence {
                field: format!("content.{key}"),
                content: render(left.get(key)),
                item_content: render(right.get(key)),
            },
        )
}

/// JSON equality in which numbers compare by value, so `1` equals `1.0`.
fn same_value(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(lhs), Value::Number(rhs)) => {
            if lhs == rhs {
                return true;
            }
            if !(lhs.is_f64() || rhs.is_f64()) {
                return false;
            }
            lhs.as_f64()
                .zip(rhs.as_f64())
                .is_some_and(|(a, b)| a.partial_cmp(&b) == Some(Ordering::Equal))
        }
        (Value::Array(lhs), Value::Array(rhs)) => {
            lhs.len() == rhs.len() && lhs.iter().zip(rhs).all(|(a, b)| same_value(a, b))
        }
        (Value::Object(lhs), Value::Object(rhs)) => {
            lhs.len() == rhs.len()
                && lhs
                    .iter()
                    .all(|(key, a)| rhs.get(key).is_some_and(|b| same_value(a, b)))
        }
        _ => left == right,
    }
}

fn render(value: Option<&Value>) -> String {
    value.map_or_else(|| "<absent>".to_owned(), Value::to_string)
}
