//! Validation service implementation.
//!
//! Provides the default implementation of the `MessageValidator` port,
//! running the content-addressing rules, the content schema selected by the
//! message type, the content rules and the execution constraint engine.

use crate::message::{
    domain::{
        HashClassifier, ItemHash, ItemType, Message, MessageContent, MessageEnvelope, MessageType,
    },
    error::ValidationError,
    ports::validator::{MessageValidator, ValidationConfig, ValidationResult},
    validation::{addressing, execution, rules},
};
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Default implementation of the message validator.
///
/// Applies all validation rules in order, collecting errors to provide
/// comprehensive feedback rather than failing on the first error, unless
/// [`ValidationConfig::collect_all_errors`] is unset.
///
/// Each validator owns its hash classification cache.
///
/// # Examples
///
/// ```
/// use corbel::message::error::ValidationError;
/// use corbel::message::ports::validator::MessageValidator;
/// use corbel::message::validation::service::DefaultMessageValidator;
/// use serde_json::json;
///
/// let raw = json!({
///     "chain": "ETH",
///     "sender": "0xabc",
///     "type": "VOTE",
///     "time": 1.0,
///     "item_type": "inline",
///     "item_hash": "b236db23bf5ad005ad7f5d82eed08a68a925020f0755b2a59c03f784499198eb"
/// });
///
/// let validator = DefaultMessageValidator::new();
/// assert!(matches!(
///     validator.parse_message(&raw),
///     Err(ValidationError::UnknownMessageType { tag }) if tag == "VOTE"
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct DefaultMessageValidator {
    config: ValidationConfig,
    classifier: HashClassifier,
}

impl DefaultMessageValidator {
    /// Creates a new validator with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    /// Creates a new validator with custom configuration.
    #[must_use]
    pub fn with_config(config: ValidationConfig) -> Self {
        let classifier = HashClassifier::with_capacity(config.classifier_capacity);
        Self { config, classifier }
    }

    /// Returns the current validation configuration.
    #[must_use]
    pub const fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Returns the validator's hash classifier.
    #[must_use]
    pub const fn classifier(&self) -> &HashClassifier {
        &self.classifier
    }

    fn run_pipeline(&self, raw: &Value) -> ValidationResult<Message> {
        let Value::Object(fields) = raw else {
            return Err(ValidationError::schema("$", "message must be a JSON object"));
        };
        let message_type = read_message_type(fields)?;

        let mut envelope_fields = fields.clone();
        let raw_content = envelope_fields.remove("content");
        let envelope = MessageEnvelope::deserialize(Value::Object(envelope_fields))
            .map_err(|error| ValidationError::schema("$", error))?;

        let mut collector = ErrorCollector::new(self.config.collect_all_errors);
        let item_hash = match self.validate_addressing(&envelope, raw_content.as_ref()) {
            Ok(item_hash) => Some(item_hash),
            Err(error) => {
                collector.record(Err(error))?;
                None
            }
        };

        let content_value = match resolve_content(&envelope, raw_content) {
            Ok(Some(value)) => value,
            Ok(None) => return collector.finish().and_then(|()| Err(missing_content())),
            Err(error) => {
                collector.record(Err(error))?;
                return collector.finish().and_then(|()| Err(missing_content()));
            }
        };

        let content = match MessageContent::decode(message_type, &content_value) {
            Ok(content) => content,
            Err(error) => {
                collector.record(Err(ValidationError::schema("content", error)))?;
                return collector.finish().and_then(|()| Err(missing_content()));
            }
        };

        collector.record(self.validate_content(&envelope, &content, &content_value))?;
        collector.finish()?;

        let item_hash = item_hash.ok_or_else(|| {
            ValidationError::schema("item_hash", "internal error: hash was not classified")
        })?;
        Ok(Message::from_validated_parts(envelope, item_hash, content))
    }
}

impl Default for DefaultMessageValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageValidator for DefaultMessageValidator {
    fn parse_message(&self, raw: &Value) -> ValidationResult<Message> {
        self.run_pipeline(raw)
            .inspect(|message| {
                tracing::debug!(
                    message_type = %message.message_type(),
                    item_hash = %message.item_hash(),
                    item_type = %message.item_type(),
                    "message passed validation"
                );
            })
            .inspect_err(|error| {
                tracing::debug!(
                    errors = error.iter_flat().count(),
                    category = %error.category(),
                    "message failed validation"
                );
            })
    }

    fn validate_addressing(
        &self,
        envelope: &MessageEnvelope,
        content: Option<&Value>,
    ) -> ValidationResult<ItemHash> {
        let mut collector = ErrorCollector::new(self.config.collect_all_errors);

        let item_hash = match addressing::classify_item_hash(envelope, &self.classifier) {
            Ok(item_hash) => Some(item_hash),
            Err(error) => {
                collector.record(Err(error))?;
                None
            }
        };

        collector.record(addressing::validate_no_unexpected_inline_content(envelope))?;
        if envelope.item_type() == ItemType::Inline {
            collector.record(addressing::validate_inline_content(envelope))?;
        } else {
            collector.record(addressing::resolve_hash_type(envelope).map(|_| ()))?;
        }
        collector.record(addressing::validate_stored_content(envelope, content))?;
        if self.config.verify_ipfs_hashes
            && let Some(item_hash) = item_hash.as_ref()
        {
            collector.record(addressing::validate_ipfs_hash(envelope, item_hash))?;
        }
        collector.record(addressing::validate_confirmations(envelope))?;

        collector.finish()?;
        item_hash.ok_or_else(|| {
            ValidationError::schema("item_hash", "internal error: hash was not classified")
        })
    }

    fn validate_content(
        &self,
        envelope: &MessageEnvelope,
        content: &MessageContent,
        raw_content: &Value,
    ) -> ValidationResult<()> {
        let mut collector = ErrorCollector::new(self.config.collect_all_errors);

        collector.record(rules::validate_content_rules(envelope, content))?;
        collector.record(rules::validate_inline_execution_content(
            envelope,
            raw_content,
        ))?;
        if let Some(executable) = content.as_executable() {
            collector.record(execution::evaluate_constraints(
                executable,
                self.config.collect_all_errors,
            ))?;
        }

        collector.finish()
    }
}

static DEFAULT_VALIDATOR: Lazy<DefaultMessageValidator> = Lazy::new(DefaultMessageValidator::new);

/// Validates a raw message record with the default configuration.
///
/// # Errors
///
/// Returns `ValidationError` if any validation rule fails.
pub fn parse_message(raw: &Value) -> ValidationResult<Message> {
    DEFAULT_VALIDATOR.parse_message(raw)
}

/// Decodes JSON text and validates it with the default configuration.
///
/// # Errors
///
/// Returns `ValidationError::Schema` at `$` if the text is not JSON, or any
/// error from [`parse_message`].
pub fn parse_message_str(raw: &str) -> ValidationResult<Message> {
    let value: Value =
        serde_json::from_str(raw).map_err(|error| ValidationError::schema("$", error))?;
    parse_message(&value)
}

fn read_message_type(fields: &Map<String, Value>) -> ValidationResult<MessageType> {
    let tag = fields
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::schema("type", "message type must be a string"))?;
    MessageType::from_tag(tag).ok_or_else(|| ValidationError::UnknownMessageType {
        tag: tag.to_owned(),
    })
}

/// Picks the content record to decode.
///
/// Returns `Ok(None)` when the content is missing for a reason the
/// addressing rules have already reported.
fn resolve_content(
    envelope: &MessageEnvelope,
    raw_content: Option<Value>,
) -> ValidationResult<Option<Value>> {
    if addressing::validate_stored_content(envelope, raw_content.as_ref()).is_err() {
        return Ok(None);
    }
    if let Some(content) = raw_content {
        return Ok(Some(content));
    }
    if envelope.item_type() != ItemType::Inline {
        return Err(missing_content());
    }
    Ok(envelope
        .item_content()
        .and_then(|item_content| serde_json::from_str(item_content).ok()))
}

fn missing_content() -> ValidationError {
    ValidationError::schema("content", "missing field `content`")
}

/// Accumulates rule failures, or short-circuits on the first one.
struct ErrorCollector {
    errors: Vec<ValidationError>,
    collect_all: bool,
}

impl ErrorCollector {
    const fn new(collect_all: bool) -> Self {
        Self {
            errors: Vec::new(),
            collect_all,
        }
    }

    /// Records a rule outcome.
    ///
    /// Returns the error itself when collecting is disabled, so callers can
    /// stop with `?`.
    fn record(&mut self, result: ValidationResult<()>) -> ValidationResult<()> {
        match result {
            Ok(()) => Ok(()),
            Err(error) if self.collect_all => {
                collect_errors(&mut self.errors, error);
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    fn finish(self) -> ValidationResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::multiple(self.errors))
        }
    }
}

/// Helper function to collect errors, flattening `Multiple` variants.
fn collect_errors(errors: &mut Vec<ValidationError>, error: ValidationError) {
    match error {
        ValidationError::Multiple(inner) => errors.extend(inner),
        other => errors.push(other),
    }
}

// Note: Unit tests for DefaultMessageValidator are located in
// src/message/tests/service_tests.rs with rstest fixtures.
