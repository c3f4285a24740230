//! Domain error types for message validation.
//!
//! Uses `thiserror` for ergonomic error handling with typed variants
//! that can be inspected by callers. Every variant names the offending field
//! and carries the literals needed to diagnose it.

use super::domain::{HypervisorType, ItemType, PaymentType};
use std::fmt;
use thiserror::Error;

/// Broad category of a validation failure.
///
/// # Examples
///
/// ```
/// use corbel::message::error::{ErrorCategory, ValidationError};
///
/// assert_eq!(ValidationError::AmendRequiresRef.category(), ErrorCategory::Structural);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The raw input does not parse into a candidate shape.
    Format,
    /// The input is well-formed but internally contradictory.
    Consistency,
    /// The input does not match the shape required for its declared type.
    Structural,
    /// Individually valid fields combine in a disallowed way.
    Constraint,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Format => "format",
            Self::Consistency => "consistency",
            Self::Structural => "structural",
            Self::Constraint => "constraint",
        };
        f.write_str(label)
    }
}

/// A hash string whose shape matches no known storage kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not determine hash type: '{value}'")]
pub struct UnknownHashFormat {
    /// The hash string that could not be classified.
    pub value: String,
}

impl UnknownHashFormat {
    /// Creates an error for the given hash string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Errors raised when constructing bounded size values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeError {
    /// The value is not an integer in `1..=max`.
    #[error("size {value} MiB is outside the allowed range 1..={max} MiB")]
    OutOfBounds {
        /// The offending value, as declared.
        value: String,
        /// The inclusive upper bound.
        max: u64,
    },
}

/// Errors that can occur during message validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A hash string matches no known storage kind.
    #[error("{path}: could not determine hash type: '{value}'")]
    UnknownHashFormat {
        /// Path of the offending field.
        path: String,
        /// The hash string.
        value: String,
    },

    /// Inline content is absent or is not well-formed JSON.
    #[error("item_content is not valid JSON: {reason}")]
    MalformedInlineContent {
        /// Description of the decoding failure.
        reason: String,
    },

    /// The declared hash function is not supported.
    #[error("unsupported hash function '{value}'")]
    UnsupportedHashFunction {
        /// The declared hash function.
        value: String,
    },

    /// The claimed hash does not match the hash of the inline content.
    #[error("item_hash '{claimed}' does not match hash of item_content, expecting '{computed}'")]
    HashMismatch {
        /// The hash claimed by the message.
        claimed: String,
        /// The hash computed from `item_content`.
        computed: String,
    },

    /// Inline content was supplied for a non-inline message.
    #[error("item_content cannot be defined when item_type is '{item_type}'")]
    UnexpectedInlineContent {
        /// The declared storage kind.
        item_type: ItemType,
    },

    /// A storage-backed message carries no content.
    #[error("content is required when item_type is 'storage'")]
    MissingStoredContent,

    /// The `confirmed` flag disagrees with the confirmation list.
    #[error("confirmed is {confirmed} but the message has {confirmations} confirmation(s)")]
    ConfirmationMismatch {
        /// The declared flag.
        confirmed: bool,
        /// Number of confirmations present.
        confirmations: usize,
    },

    /// Decoded inline content differs from the `content` field.
    #[error("content and item_content differ at '{field}': {content} != {item_content}")]
    ContentItemContentDivergence {
        /// First differing field.
        field: String,
        /// Rendered value from `content`.
        content: String,
        /// Rendered value from `item_content`.
        item_content: String,
    },

    /// The declared storage kind disagrees with the hash's shape.
    #[error("item_hash classifies as '{classified}' but item_type is '{declared}'")]
    ItemTypeMismatch {
        /// The declared storage kind.
        declared: ItemType,
        /// The kind derived from the hash string.
        classified: ItemType,
    },

    /// The message `type` tag is not one of the supported types.
    #[error("unknown message type '{tag}'")]
    UnknownMessageType {
        /// The offending tag.
        tag: String,
    },

    /// A POST of type `amend` carries no reference.
    #[error("a 'ref' is required for POST type 'amend'")]
    AmendRequiresRef,

    /// A FORGET message lists messages that forgot it.
    #[error("a FORGET message cannot be forgotten, but forgotten_by lists {count} message(s)")]
    CannotForgetAForget {
        /// Number of entries in `forgotten_by`.
        count: usize,
    },

    /// The input does not match the schema of its declared type.
    #[error("schema violation at '{path}': {reason}")]
    Schema {
        /// Path of the offending record.
        path: String,
        /// Description of the mismatch.
        reason: String,
    },

    /// GPU requirements without a pinned node.
    #[error("GPU requirements need requirements.node.node_hash to be set")]
    GpuRequiresNodePinning,

    /// GPU requirements on a non-QEMU hypervisor.
    #[error("GPU requirements are only supported by the qemu hypervisor, got '{hypervisor}'")]
    GpuRequiresQemu {
        /// The effective hypervisor.
        hypervisor: HypervisorType,
    },

    /// Streamed or credit payment with requirements but no pinned node.
    #[error("payment type '{payment_type}' with requirements needs requirements.node.node_hash")]
    StreamedPaymentRequiresNodePinning {
        /// The declared payment type.
        payment_type: PaymentType,
    },

    /// Terms and conditions without a pinned node.
    #[error("terms_and_conditions needs requirements.node.node_hash to be set")]
    TermsRequireNodePinning,

    /// Terms and conditions on a held, non-confidential execution.
    #[error("terms_and_conditions are only allowed for streamed payment or trusted execution")]
    TermsRequireStreamOrConfidential,

    /// Trusted execution on a non-QEMU hypervisor.
    #[error("trusted execution is only supported by the qemu hypervisor, got '{hypervisor}'")]
    TrustedExecutionRequiresQemu {
        /// The effective hypervisor.
        hypervisor: HypervisorType,
    },

    /// A volume size falls outside its kind's bounds.
    #[error("{path}: size {value} MiB is outside the allowed range 1..={max} MiB")]
    SizeOutOfBounds {
        /// Path of the offending size field.
        path: String,
        /// The declared value.
        value: String,
        /// The inclusive upper bound.
        max: u64,
    },

    /// Multiple validation errors occurred.
    #[error("multiple validation errors: {}", format_errors(.0))]
    Multiple(Vec<Self>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Creates a schema error at the given path.
    #[must_use]
    pub fn schema(path: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Schema {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Attaches a field path to a classification failure.
    #[must_use]
    pub fn unknown_hash(path: impl Into<String>, error: UnknownHashFormat) -> Self {
        Self::UnknownHashFormat {
            path: path.into(),
            value: error.value,
        }
    }

    /// Attaches a field path to a size bound failure.
    #[must_use]
    pub fn size_out_of_bounds(path: impl Into<String>, error: SizeError) -> Self {
        let SizeError::OutOfBounds { value, max } = error;
        Self::SizeOutOfBounds {
            path: path.into(),
            value,
            max,
        }
    }

    /// Combines multiple validation errors into a single error.
    ///
    /// If only one error is provided, returns it directly rather than wrapping.
    /// Nested `Multiple` values are flattened.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if called with an empty vector, as this indicates
    /// a logic error in the caller. In release builds, returns a schema error.
    #[must_use]
    pub fn multiple(errors: Vec<Self>) -> Self {
        let mut flat = Vec::with_capacity(errors.len());
        for error in errors {
            match error {
                Self::Multiple(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => {
                debug_assert!(false, "multiple() called with empty errors vector");
                Self::schema("$", "internal error: no validation errors")
            }
            1 => flat
                .into_iter()
                .next()
                .unwrap_or_else(|| Self::schema("$", "internal error: no validation errors")),
            _ => Self::Multiple(flat),
        }
    }

    /// Returns `true` if this error represents multiple validation failures.
    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }

    /// Returns the individual errors if this is a `Multiple` variant.
    #[must_use]
    pub fn errors(&self) -> Option<&[Self]> {
        match self {
            Self::Multiple(errors) => Some(errors),
            _ => None,
        }
    }

    /// Iterates over the leaf errors, yielding `self` when it is not `Multiple`.
    pub fn iter_flat(&self) -> impl Iterator<Item = &Self> {
        self.errors()
            .unwrap_or_else(|| std::slice::from_ref(self))
            .iter()
    }

    /// Returns the category of this error.
    ///
    /// `Multiple` reports the category of its first error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownHashFormat { .. } | Self::MalformedInlineContent { .. } => {
                ErrorCategory::Format
            }
            Self::UnsupportedHashFunction { .. }
            | Self::HashMismatch { .. }
            | Self::UnexpectedInlineContent { .. }
            | Self::MissingStoredContent
            | Self::ConfirmationMismatch { .. }
            | Self::ContentItemContentDivergence { .. }
            | Self::ItemTypeMismatch { .. } => ErrorCategory::Consistency,
            Self::UnknownMessageType { .. }
            | Self::AmendRequiresRef
            | Self::CannotForgetAForget { .. }
            | Self::Schema { .. } => ErrorCategory::Structural,
            Self::GpuRequiresNodePinning
            | Self::GpuRequiresQemu { .. }
            | Self::StreamedPaymentRequiresNodePinning { .. }
            | Self::TermsRequireNodePinning
            | Self::TermsRequireStreamOrConfidential
            | Self::TrustedExecutionRequiresQemu { .. }
            | Self::SizeOutOfBounds { .. } => ErrorCategory::Constraint,
            Self::Multiple(errors) => errors
                .first()
                .map_or(ErrorCategory::Structural, Self::category),
        }
    }

    /// Returns the path of the field this error is about.
    ///
    /// Returns `None` for `Multiple`.
    #[must_use]
    pub fn field_path(&self) -> Option<&str> {
        let path = match self {
            Self::UnknownHashFormat { path, .. }
            | Self::Schema { path, .. }
            | Self::SizeOutOfBounds { path, .. } => path.as_str(),
            Self::MalformedInlineContent { .. } | Self::UnexpectedInlineContent { .. } => {
                "item_content"
            }
            Self::UnsupportedHashFunction { .. } => "hash_type",
            Self::HashMismatch { .. } | Self::ItemTypeMismatch { .. } => "item_hash",
            Self::MissingStoredContent => "content",
            Self::ConfirmationMismatch { .. } => "confirmed",
            Self::ContentItemContentDivergence { field, .. } => field.as_str(),
            Self::UnknownMessageType { .. } => "type",
            Self::AmendRequiresRef => "content.ref",
            Self::CannotForgetAForget { .. } => "forgotten_by",
            Self::GpuRequiresNodePinning | Self::GpuRequiresQemu { .. } => {
                "content.requirements.gpu"
            }
            Self::StreamedPaymentRequiresNodePinning { .. } => "content.payment.payment_type",
            Self::TermsRequireNodePinning | Self::TermsRequireStreamOrConfidential => {
                "content.requirements.node.terms_and_conditions"
            }
            Self::TrustedExecutionRequiresQemu { .. } => "content.environment.trusted_execution",
            Self::Multiple(_) => return None,
        };
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn multiple_collapses_single_error() {
        let error = ValidationError::multiple(vec![ValidationError::AmendRequiresRef]);
        assert_eq!(error, ValidationError::AmendRequiresRef);
    }

    #[rstest]
    fn multiple_flattens_nested_errors() {
        let nested = ValidationError::Multiple(vec![
            ValidationError::MissingStoredContent,
            ValidationError::GpuRequiresNodePinning,
        ]);
        let error = ValidationError::multiple(vec![nested, ValidationError::AmendRequiresRef]);

        assert_eq!(error.errors().map(<[ValidationError]>::len), Some(3));
        assert_eq!(error.iter_flat().count(), 3);
    }

    #[rstest]
    fn iter_flat_yields_single_error() {
        let error = ValidationError::MissingStoredContent;
        assert_eq!(error.iter_flat().collect::<Vec<_>>(), vec![&error]);
    }

    #[rstest]
    #[case(ValidationError::MalformedInlineContent { reason: "eof".to_owned() }, ErrorCategory::Format)]
    #[case(ValidationError::MissingStoredContent, ErrorCategory::Consistency)]
    #[case(ValidationError::UnknownMessageType { tag: "VOTE".to_owned() }, ErrorCategory::Structural)]
    #[case(ValidationError::TermsRequireNodePinning, ErrorCategory::Constraint)]
    fn categories(#[case] error: ValidationError, #[case] expected: ErrorCategory) {
        assert_eq!(error.category(), expected);
    }

    #[rstest]
    fn size_error_keeps_path_and_literals() {
        let error = ValidationError::size_out_of_bounds(
            "content.volumes[0].size_mib",
            SizeError::OutOfBounds {
                value: "0".to_owned(),
                max: 954,
            },
        );
        assert_eq!(error.field_path(), Some("content.volumes[0].size_mib"));
        assert_eq!(
            error.to_string(),
            "content.volumes[0].size_mib: size 0 MiB is outside the allowed range 1..=954 MiB"
        );
    }
}
