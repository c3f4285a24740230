//! Unit tests for message type dispatch and the content schemas.

use super::validation_fixtures::{
    IPFS_CIDV0, STORAGE_HASH, default_validator, field_mut, forget_content, inline_message,
    post_content, remove, set, storage_message, store_content,
};
use crate::message::{
    domain::{MessageContent, MessageType, PostRef},
    error::{ErrorCategory, ValidationError},
    ports::validator::MessageValidator,
    validation::service::DefaultMessageValidator,
};
use rstest::rstest;
use serde_json::{Value, json};

fn assert_schema_error(error: &ValidationError, expected_path: &str) {
    assert!(
        matches!(error, ValidationError::Schema { path, .. } if path == expected_path),
        "expected schema error at {expected_path}, got {error:?}"
    );
}

// ============================================================================
// Dispatch
// ============================================================================

#[rstest]
#[case("VOTE")]
#[case("post")]
fn unknown_type_tag_is_rejected(
    default_validator: DefaultMessageValidator,
    #[case] tag: &str,
) {
    let message = storage_message(tag, post_content("note"));

    let error = default_validator
        .parse_message(&message)
        .expect_err("tag is not a message type");

    assert_eq!(
        error,
        ValidationError::UnknownMessageType {
            tag: tag.to_owned()
        }
    );
}

#[rstest]
#[case(None)]
#[case(Some(json!(7)))]
fn missing_type_tag_is_a_schema_error(
    default_validator: DefaultMessageValidator,
    #[case] tag: Option<Value>,
) {
    let mut message = storage_message("POST", post_content("note"));
    match tag {
        Some(value) => set(&mut message, "type", value),
        None => remove(&mut message, "type"),
    }

    let error = default_validator
        .parse_message(&message)
        .expect_err("type tag is required");

    assert_schema_error(&error, "type");
}

#[rstest]
fn non_object_input_is_a_schema_error(default_validator: DefaultMessageValidator) {
    let error = default_validator
        .parse_message(&json!([1, 2, 3]))
        .expect_err("messages are objects");

    assert_schema_error(&error, "$");
}

#[rstest]
fn tag_selects_the_content_schema(default_validator: DefaultMessageValidator) {
    let message = storage_message("POST", store_content());

    let error = default_validator
        .parse_message(&message)
        .expect_err("store content is not a post");

    assert_schema_error(&error, "content");
    assert_eq!(error.category(), ErrorCategory::Structural);
}

#[rstest]
fn unknown_envelope_field_is_rejected(default_validator: DefaultMessageValidator) {
    let mut message = storage_message("STORE", store_content());
    set(&mut message, "priority", json!("high"));

    let error = default_validator
        .parse_message(&message)
        .expect_err("envelope is closed");

    assert_schema_error(&error, "$");
}

#[rstest]
fn unknown_chain_is_rejected(default_validator: DefaultMessageValidator) {
    let mut message = storage_message("STORE", store_content());
    set(&mut message, "chain", json!("DOGE"));

    let error = default_validator
        .parse_message(&message)
        .expect_err("chain list is closed");

    assert_schema_error(&error, "$");
}

#[rstest]
fn optional_envelope_fields_are_kept(default_validator: DefaultMessageValidator) {
    let mut message = storage_message("STORE", store_content());
    set(&mut message, "_id", json!({"$oid": "5fa2f2ac1f4c1e0f2c8b4567"}));
    set(&mut message, "signature", json!("0xsigned"));
    set(&mut message, "size", json!(120));
    set(&mut message, "channel", json!("TEST"));

    let parsed = default_validator
        .parse_message(&message)
        .expect("optional fields decode");
    let envelope = parsed.envelope();

    assert_eq!(
        envelope.id().map(|id| id.oid.as_str()),
        Some("5fa2f2ac1f4c1e0f2c8b4567")
    );
    assert_eq!(envelope.signature(), Some("0xsigned"));
    assert_eq!(envelope.size(), Some(120));
    assert_eq!(envelope.channel(), Some("TEST"));
}

// ============================================================================
// Post
// ============================================================================

#[rstest]
fn amend_without_ref_is_rejected(default_validator: DefaultMessageValidator) {
    let message = inline_message("POST", post_content("amend"));

    let error = default_validator
        .parse_message(&message)
        .expect_err("amend needs a ref");

    assert_eq!(error, ValidationError::AmendRequiresRef);
    assert_eq!(error.field_path(), Some("content.ref"));
}

#[rstest]
fn amend_with_empty_ref_is_rejected(default_validator: DefaultMessageValidator) {
    let mut content = post_content("amend");
    set(&mut content, "ref", json!(""));
    let message = inline_message("POST", content);

    let error = default_validator
        .parse_message(&message)
        .expect_err("an empty ref is no ref");

    assert_eq!(error, ValidationError::AmendRequiresRef);
}

#[rstest]
fn amend_with_ref_is_accepted(default_validator: DefaultMessageValidator) {
    let mut content = post_content("amend");
    set(&mut content, "ref", json!("0x123"));
    let message = inline_message("POST", content);

    let parsed = default_validator
        .parse_message(&message)
        .expect("amend with ref is valid");

    let MessageContent::Post(post) = parsed.content() else {
        panic!("expected post content");
    };
    assert_eq!(post.reference, Some(PostRef::Hash("0x123".to_owned())));
}

#[rstest]
fn post_ref_may_embed_the_referenced_message(default_validator: DefaultMessageValidator) {
    let mut content = post_content("amend");
    set(
        &mut content,
        "ref",
        json!({
            "chain": "ETH",
            "item_content": "{}",
            "item_hash": STORAGE_HASH,
            "item_type": "inline",
            "sender": "0xabc",
            "signature": "0xsigned",
            "time": 1.0
        }),
    );
    let message = inline_message("POST", content);

    let parsed = default_validator
        .parse_message(&message)
        .expect("embedded references decode");

    let MessageContent::Post(post) = parsed.content() else {
        panic!("expected post content");
    };
    assert!(matches!(
        post.reference.as_ref(),
        Some(PostRef::Chain(chain_ref)) if chain_ref.message_type == "POST"
    ));
}

#[rstest]
fn post_content_is_closed(default_validator: DefaultMessageValidator) {
    let mut content = post_content("note");
    set(&mut content, "mood", json!("cheerful"));
    let message = inline_message("POST", content);

    let error = default_validator
        .parse_message(&message)
        .expect_err("unknown content fields are rejected");

    assert_schema_error(&error, "content");
}

#[rstest]
fn inline_message_without_content_decodes_item_content(
    default_validator: DefaultMessageValidator,
) {
    let mut message = inline_message("POST", post_content("note"));
    remove(&mut message, "content");

    let parsed = default_validator
        .parse_message(&message)
        .expect("content is recovered from item_content");

    assert_eq!(parsed.message_type(), MessageType::Post);
    assert_eq!(
        parsed.content().address(),
        "0xB68B9D4f3771c246233823ed1D3Add451055F9Ef"
    );
}

#[rstest]
fn ipfs_message_without_content_is_a_schema_error(default_validator: DefaultMessageValidator) {
    let mut message = storage_message("STORE", store_content());
    set(&mut message, "item_type", json!("ipfs"));
    set(&mut message, "item_hash", json!(IPFS_CIDV0));
    remove(&mut message, "content");

    let error = default_validator
        .parse_message(&message)
        .expect_err("content is required");

    assert_schema_error(&error, "content");
}

// ============================================================================
// Aggregate
// ============================================================================

#[rstest]
#[case(json!("profile"))]
#[case(json!({"name": "profile"}))]
fn aggregate_key_has_two_forms(default_validator: DefaultMessageValidator, #[case] key: Value) {
    let content = json!({
        "address": "0xabc",
        "time": 1.0,
        "key": key,
        "content": {"nickname": "ada"}
    });
    let message = inline_message("AGGREGATE", content);

    let parsed = default_validator
        .parse_message(&message)
        .expect("aggregate decodes");

    let MessageContent::Aggregate(aggregate) = parsed.content() else {
        panic!("expected aggregate content");
    };
    assert_eq!(aggregate.key.name(), "profile");
    assert_eq!(aggregate.content, json!({"nickname": "ada"}));
}

#[rstest]
fn aggregate_requires_content_field(default_validator: DefaultMessageValidator) {
    let content = json!({"address": "0xabc", "time": 1.0, "key": "profile"});
    let message = storage_message("AGGREGATE", content);

    let error = default_validator
        .parse_message(&message)
        .expect_err("content field is required");

    assert_schema_error(&error, "content");
}

// ============================================================================
// Store
// ============================================================================

#[rstest]
fn store_content_keeps_producer_metadata(default_validator: DefaultMessageValidator) {
    let mut content = store_content();
    set(&mut content, "engine_info", json!({"Blocks": 1}));
    set(&mut content, "size", json!(1024));
    let message = storage_message("STORE", content);

    let parsed = default_validator
        .parse_message(&message)
        .expect("store content tolerates extra metadata");

    let MessageContent::Store(store) = parsed.content() else {
        panic!("expected store content");
    };
    assert_eq!(store.size, Some(1024));
    assert_eq!(store.extra.get("engine_info"), Some(&json!({"Blocks": 1})));
    assert!(store.item_hash.is_ipfs());
}

#[rstest]
fn store_content_rejects_unknown_hash(default_validator: DefaultMessageValidator) {
    let mut content = store_content();
    set(&mut content, "item_hash", json!("not-a-hash"));
    let message = storage_message("STORE", content);

    let error = default_validator
        .parse_message(&message)
        .expect_err("stored file hash is classified");

    assert_schema_error(&error, "content");
}

// ============================================================================
// Forget
// ============================================================================

#[rstest]
fn forget_cannot_be_forgotten(default_validator: DefaultMessageValidator) {
    let mut message = storage_message("FORGET", forget_content());
    set(&mut message, "forgotten_by", json!([STORAGE_HASH]));

    let error = default_validator
        .parse_message(&message)
        .expect_err("a forget cannot be forgotten");

    assert_eq!(error, ValidationError::CannotForgetAForget { count: 1 });
}

#[rstest]
#[case(Some(Value::Null))]
#[case(Some(json!([])))]
#[case(None)]
fn forget_without_forgotten_by_is_accepted(
    default_validator: DefaultMessageValidator,
    #[case] forgotten_by: Option<Value>,
) {
    let mut message = storage_message("FORGET", forget_content());
    if let Some(value) = forgotten_by {
        set(&mut message, "forgotten_by", value);
    }

    let parsed = default_validator
        .parse_message(&message)
        .expect("forget is valid");

    let MessageContent::Forget(forget) = parsed.content() else {
        panic!("expected forget content");
    };
    assert_eq!(forget.hashes.len(), 1);
    assert!(forget.aggregates.is_empty());
}

#[rstest]
fn forgotten_post_is_accepted(default_validator: DefaultMessageValidator) {
    let mut message = storage_message("POST", post_content("note"));
    set(&mut message, "forgotten_by", json!([STORAGE_HASH]));

    let parsed = default_validator
        .parse_message(&message)
        .expect("other types may be forgotten");

    assert_eq!(parsed.envelope().forgotten_by().len(), 1);
}

#[rstest]
fn forget_hashes_are_classified(default_validator: DefaultMessageValidator) {
    let mut content = forget_content();
    *field_mut(&mut content, "hashes") = json!(["short"]);
    let message = storage_message("FORGET", content);

    let error = default_validator
        .parse_message(&message)
        .expect_err("hashes must be recognised");

    assert_schema_error(&error, "content");
}
