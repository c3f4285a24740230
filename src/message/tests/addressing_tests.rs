//! Unit tests for hash classification and the content-addressing rules.

use super::validation_fixtures::{
    IPFS_CIDV0, IPFS_CIDV1, STORAGE_HASH, default_validator, inline_message, lenient_validator,
    post_content, remove, set, storage_message, store_content, strict_validator,
};
use crate::message::{
    domain::{ItemType, classify_hash},
    error::{ErrorCategory, UnknownHashFormat, ValidationError},
    ports::validator::MessageValidator,
    validation::service::DefaultMessageValidator,
};
use rstest::rstest;
use serde_json::{Value, json};

// ============================================================================
// Hash classification
// ============================================================================

#[rstest]
#[case(IPFS_CIDV0, ItemType::Ipfs)]
#[case("QmPxCe3eHVCdTG5uKnSZTsPGrYvMFTWAAt4PSfK7ETkz", ItemType::Ipfs)]
#[case(IPFS_CIDV1, ItemType::Ipfs)]
#[case(STORAGE_HASH, ItemType::Storage)]
fn classifies_known_shapes(#[case] hash: &str, #[case] expected: ItemType) {
    assert_eq!(classify_hash(hash), Ok(expected));
}

#[rstest]
#[case("short")]
#[case("")]
#[case("QmPxCe3eHVCdTG5uKnSZTsPGrYvMFTWAAt4PSfK7ETk")]
#[case("bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzd")]
#[case("b236db23bf5ad005ad7f5d82eed08a68a925020f0755b2a59c03f784499198e")]
fn rejects_unknown_shapes(#[case] hash: &str) {
    assert_eq!(classify_hash(hash), Err(UnknownHashFormat::new(hash)));
}

#[rstest]
fn classification_counts_characters_not_bytes() {
    let hash: String = "é".repeat(64);
    assert_eq!(classify_hash(&hash), Ok(ItemType::Storage));
}

#[rstest]
fn unknown_item_hash_is_reported_with_its_path(default_validator: DefaultMessageValidator) {
    let mut message = storage_message("STORE", store_content());
    set(&mut message, "item_hash", json!("short"));

    let error = default_validator
        .parse_message(&message)
        .expect_err("hash shape is unknown");

    assert_eq!(
        error,
        ValidationError::UnknownHashFormat {
            path: "item_hash".to_owned(),
            value: "short".to_owned(),
        }
    );
    assert_eq!(error.category(), ErrorCategory::Format);
}

// ============================================================================
// Inline content
// ============================================================================

#[rstest]
fn inline_message_with_matching_hash_passes(default_validator: DefaultMessageValidator) {
    let message = inline_message("POST", post_content("note"));

    let parsed = default_validator
        .parse_message(&message)
        .expect("inline hash matches");

    assert_eq!(parsed.item_type(), ItemType::Inline);
    assert!(parsed.item_hash().is_storage());
}

#[rstest]
fn flipped_inline_byte_is_a_hash_mismatch(default_validator: DefaultMessageValidator) {
    let mut message = inline_message("POST", post_content("note"));
    let item_content = message
        .get("item_content")
        .and_then(Value::as_str)
        .expect("item_content is set")
        .replace("hello", "hellp");
    set(&mut message, "item_content", json!(item_content));

    let error = default_validator
        .parse_message(&message)
        .expect_err("content no longer matches the hash");

    assert!(matches!(
        error,
        ValidationError::HashMismatch { ref claimed, ref computed }
            if claimed != computed && computed.len() == 64
    ));
}

#[rstest]
#[case(json!("{not json"))]
#[case(json!(""))]
fn malformed_inline_content_is_rejected(
    default_validator: DefaultMessageValidator,
    #[case] item_content: Value,
) {
    let mut message = inline_message("POST", post_content("note"));
    set(&mut message, "item_content", item_content);

    let error = default_validator
        .parse_message(&message)
        .expect_err("item_content is not JSON");

    assert!(matches!(error, ValidationError::MalformedInlineContent { .. }));
}

#[rstest]
fn missing_inline_content_is_malformed(default_validator: DefaultMessageValidator) {
    let mut message = inline_message("POST", post_content("note"));
    remove(&mut message, "item_content");

    let error = default_validator
        .parse_message(&message)
        .expect_err("inline content is required");

    assert!(matches!(error, ValidationError::MalformedInlineContent { .. }));
}

#[rstest]
fn explicit_sha256_hash_type_is_accepted(default_validator: DefaultMessageValidator) {
    let mut message = inline_message("POST", post_content("note"));
    set(&mut message, "hash_type", json!("sha256"));

    assert!(default_validator.parse_message(&message).is_ok());
}

#[rstest]
fn unsupported_hash_function_is_rejected(default_validator: DefaultMessageValidator) {
    let mut message = inline_message("POST", post_content("note"));
    set(&mut message, "hash_type", json!("blake3"));

    let error = default_validator
        .parse_message(&message)
        .expect_err("only sha256 is supported");

    assert_eq!(
        error,
        ValidationError::UnsupportedHashFunction {
            value: "blake3".to_owned(),
        }
    );
}

// ============================================================================
// Non-inline content
// ============================================================================

#[rstest]
#[case("storage", STORAGE_HASH, ItemType::Storage)]
#[case("ipfs", IPFS_CIDV0, ItemType::Ipfs)]
fn non_inline_messages_reject_item_content(
    default_validator: DefaultMessageValidator,
    #[case] item_type: &str,
    #[case] item_hash: &str,
    #[case] expected: ItemType,
) {
    let mut message = storage_message("STORE", store_content());
    set(&mut message, "item_type", json!(item_type));
    set(&mut message, "item_hash", json!(item_hash));
    set(&mut message, "item_content", json!("{}"));

    let error = default_validator
        .parse_message(&message)
        .expect_err("item_content is not allowed");

    assert_eq!(
        error,
        ValidationError::UnexpectedInlineContent {
            item_type: expected
        }
    );
}

#[rstest]
#[case(None)]
#[case(Some(Value::Null))]
#[case(Some(json!({})))]
fn storage_message_requires_content(
    default_validator: DefaultMessageValidator,
    #[case] content: Option<Value>,
) {
    let mut message = storage_message("STORE", store_content());
    match content {
        Some(value) => set(&mut message, "content", value),
        None => remove(&mut message, "content"),
    }

    let error = default_validator
        .parse_message(&message)
        .expect_err("storage content is required");

    assert_eq!(error, ValidationError::MissingStoredContent);
}

#[rstest]
fn ipfs_hash_shape_is_not_checked_by_default(default_validator: DefaultMessageValidator) {
    let mut message = storage_message("STORE", store_content());
    set(&mut message, "item_type", json!("ipfs"));

    assert!(default_validator.parse_message(&message).is_ok());
}

#[rstest]
fn strict_config_checks_ipfs_hash_shape(strict_validator: DefaultMessageValidator) {
    let mut message = storage_message("STORE", store_content());
    set(&mut message, "item_type", json!("ipfs"));

    let error = strict_validator
        .parse_message(&message)
        .expect_err("a sha256 digest is not an IPFS CID");

    assert_eq!(
        error,
        ValidationError::ItemTypeMismatch {
            declared: ItemType::Ipfs,
            classified: ItemType::Storage,
        }
    );
}

#[rstest]
fn strict_config_accepts_ipfs_cid(strict_validator: DefaultMessageValidator) {
    let mut message = storage_message("STORE", store_content());
    set(&mut message, "item_type", json!("ipfs"));
    set(&mut message, "item_hash", json!(IPFS_CIDV1));

    assert!(strict_validator.parse_message(&message).is_ok());
}

// ============================================================================
// Confirmations
// ============================================================================

fn confirmation() -> Value {
    json!({"chain": "ETH", "height": 18_000_000, "hash": "0xabc"})
}

#[rstest]
#[case(Some(true), json!([]), false)]
#[case(Some(false), json!([confirmation()]), false)]
#[case(Some(true), json!([confirmation()]), true)]
#[case(Some(false), json!([]), true)]
#[case(None, json!([confirmation()]), true)]
fn confirmed_flag_must_match_confirmations(
    default_validator: DefaultMessageValidator,
    #[case] confirmed: Option<bool>,
    #[case] confirmations: Value,
    #[case] accepted: bool,
) {
    let mut message = storage_message("STORE", store_content());
    set(&mut message, "confirmations", confirmations);
    if let Some(flag) = confirmed {
        set(&mut message, "confirmed", json!(flag));
    }

    let result = default_validator.parse_message(&message);

    assert_eq!(result.is_ok(), accepted);
    if let Err(error) = result {
        assert!(matches!(error, ValidationError::ConfirmationMismatch { .. }));
    }
}

#[rstest]
fn binary_confirmation_hashes_are_accepted(default_validator: DefaultMessageValidator) {
    let mut message = storage_message("STORE", store_content());
    set(
        &mut message,
        "confirmations",
        json!([{"chain": "ETH", "height": 1, "hash": {"$binary": "q83v", "$type": "00"}}]),
    );
    set(&mut message, "confirmed", json!(true));

    let parsed = default_validator
        .parse_message(&message)
        .expect("binary hashes decode");

    assert!(parsed.is_confirmed());
}

// ============================================================================
// Error collection
// ============================================================================

#[rstest]
fn all_addressing_errors_are_collected(default_validator: DefaultMessageValidator) {
    let mut message = storage_message("STORE", store_content());
    set(&mut message, "item_content", json!("{}"));
    set(&mut message, "confirmed", json!(true));

    let error = default_validator
        .parse_message(&message)
        .expect_err("two rules are violated");

    assert!(error.is_multiple());
    assert_eq!(error.iter_flat().count(), 2);
}

#[rstest]
fn lenient_config_stops_at_first_error(lenient_validator: DefaultMessageValidator) {
    let mut message = storage_message("STORE", store_content());
    set(&mut message, "item_content", json!("{}"));
    set(&mut message, "confirmed", json!(true));

    let error = lenient_validator
        .parse_message(&message)
        .expect_err("first rule is violated");

    assert_eq!(
        error,
        ValidationError::UnexpectedInlineContent {
            item_type: ItemType::Storage
        }
    );
}
