//! Behavioural integration tests for message validation.
//!
//! These tests exercise end-to-end scenarios through the public entry
//! points, from building inline content on the sending side through
//! validating the resulting wire records on the receiving side.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use corbel::{
    MessagesResponse, compute_item_content_and_hash,
    message::{
        domain::{HypervisorType, ItemType, MessageContent, MessageType},
        error::{ErrorCategory, ValidationError},
        ports::validator::{MessageValidator, ValidationConfig},
        validation::service::DefaultMessageValidator,
    },
    parse_message, parse_message_str,
};
use serde_json::{Value, json};

const SENDER: &str = "0xB68B9D4f3771c246233823ed1D3Add451055F9Ef";
const STORAGE_HASH: &str = "b236db23bf5ad005ad7f5d82eed08a68a925020f0755b2a59c03f784499198eb";
const NODE_HASH: &str = "4d4db19afca380fdf06ba7f916153d0f740db9de9eee23ad26ba96a90d8a2920";

fn inline_message(message_type: &str, content: Value) -> Value {
    let item = compute_item_content_and_hash(&content).expect("content should serialise");
    let mut message = json!({
        "chain": "ETH",
        "sender": SENDER,
        "type": message_type,
        "channel": "TEST",
        "time": 1_700_000_000.0,
        "content": content
    });
    item.apply_to(&mut message)
        .expect("message should be an object");
    message
}

fn instance_content() -> Value {
    json!({
        "address": SENDER,
        "time": 1_700_000_000.0,
        "allow_amend": false,
        "environment": {"internet": true},
        "resources": {"vcpus": 2, "memory": 2048, "seconds": 30},
        "rootfs": {
            "parent": {"ref": STORAGE_HASH, "use_latest": true},
            "persistence": "host",
            "size_mib": 20_480
        }
    })
}

// ============================================================================
// Scenario: Sender-built inline post is accepted by a receiver
// ============================================================================

/// When a sender builds inline content with the canonical serialiser,
/// a receiver should accept the message and recover the same identifier.
#[test]
fn sender_built_post_is_accepted() {
    // Arrange
    let content = json!({
        "address": SENDER,
        "time": 1_700_000_000.0,
        "type": "chat",
        "content": {"body": "gm", "reply_to": null}
    });

    // Act
    let raw = inline_message("POST", content).to_string();
    let message = parse_message_str(&raw).expect("message should validate");

    // Assert
    assert_eq!(message.message_type(), MessageType::Post);
    assert_eq!(message.item_type(), ItemType::Inline);
    let MessageContent::Post(post) = message.content() else {
        panic!("expected post content");
    };
    assert_eq!(post.post_type, "chat");
    assert_eq!(post.address, SENDER);
}

// ============================================================================
// Scenario: Tampered message is rejected
// ============================================================================

/// When the inline content is altered in transit, the claimed hash no
/// longer matches and the message should be rejected.
#[test]
fn tampered_inline_content_is_rejected() {
    // Arrange
    let mut message = inline_message(
        "POST",
        json!({"address": SENDER, "time": 1.0, "type": "chat", "content": "gm"}),
    );
    let tampered = message
        .get("item_content")
        .and_then(Value::as_str)
        .expect("item_content should be set")
        .replace("gm", "gn");
    message
        .as_object_mut()
        .expect("message should be an object")
        .insert("item_content".to_owned(), json!(tampered));

    // Act
    let result = parse_message(&message);

    // Assert
    let error = result.expect_err("tampered message should fail");
    assert!(matches!(error, ValidationError::HashMismatch { .. }));
    assert_eq!(error.category(), ErrorCategory::Consistency);
}

// ============================================================================
// Scenario: Inline instance with a GPU request
// ============================================================================

/// When an instance requests a GPU on an unpinned firecracker VM, every
/// violated execution rule should be reported together.
#[test]
fn gpu_instance_reports_every_violation() {
    // Arrange
    let mut content = instance_content();
    content
        .as_object_mut()
        .expect("content should be an object")
        .insert(
            "requirements".to_owned(),
            json!({"gpu": [{
                "vendor": "NVIDIA",
                "device_name": "RTX 4090",
                "device_class": "0300",
                "device_id": "10de:2684"
            }]}),
        );
    let validator = DefaultMessageValidator::new();

    // Act
    let result = validator.parse_message(&inline_message("INSTANCE", content));

    // Assert
    let error = result.expect_err("GPU request is unsatisfiable");
    let errors: Vec<_> = error.iter_flat().collect();
    assert_eq!(errors.len(), 2);
    assert!(
        errors
            .iter()
            .all(|violation| violation.category() == ErrorCategory::Constraint)
    );
    assert!(errors.contains(&&ValidationError::GpuRequiresQemu {
        hypervisor: HypervisorType::Firecracker
    }));
}

// ============================================================================
// Scenario: Pinned qemu instance is accepted
// ============================================================================

/// When the same instance is pinned to a node and runs under qemu, it
/// should be accepted.
#[test]
fn pinned_qemu_gpu_instance_is_accepted() {
    // Arrange
    let mut content = instance_content();
    let fields = content
        .as_object_mut()
        .expect("content should be an object");
    fields.insert(
        "environment".to_owned(),
        json!({"internet": true, "hypervisor": "qemu"}),
    );
    fields.insert(
        "requirements".to_owned(),
        json!({
            "node": {"node_hash": NODE_HASH},
            "gpu": [{
                "vendor": "NVIDIA",
                "device_name": "RTX 4090",
                "device_class": "0300",
                "device_id": "10de:2684"
            }]
        }),
    );

    // Act
    let message = parse_message(&inline_message("INSTANCE", content))
        .expect("instance should validate");

    // Assert
    let executable = message
        .content()
        .as_executable()
        .expect("instances are executable");
    assert_eq!(executable.hypervisor(), HypervisorType::Qemu);
    assert!(executable.requests_gpu());
}

// ============================================================================
// Scenario: Fail-fast configuration
// ============================================================================

/// When the validator is configured to stop at the first failure, only
/// one error should be reported.
#[test]
fn lenient_validator_reports_one_error() {
    // Arrange
    let validator = DefaultMessageValidator::with_config(ValidationConfig::lenient());
    let raw = json!({
        "chain": "ETH",
        "sender": SENDER,
        "type": "STORE",
        "time": 1.0,
        "item_type": "storage",
        "item_hash": STORAGE_HASH,
        "item_content": "{}",
        "confirmed": true
    });

    // Act
    let error = validator
        .parse_message(&raw)
        .expect_err("message violates several rules");

    // Assert
    assert!(!error.is_multiple());
}

// ============================================================================
// Scenario: A page of messages from a storage node
// ============================================================================

/// When a listing mixes valid and invalid messages, each should be
/// validated on its own.
#[test]
fn listing_is_validated_message_by_message() {
    // Arrange
    let valid = inline_message(
        "AGGREGATE",
        json!({"address": SENDER, "time": 1.0, "key": "profile", "content": {"name": "ada"}}),
    );
    let invalid = json!({"type": "VOTE"});
    let raw = json!({
        "messages": [valid, invalid],
        "pagination_page": 1,
        "pagination_total": 2,
        "pagination_per_page": 20,
        "pagination_item": "messages"
    });

    // Act
    let response = MessagesResponse::parse(&raw, &DefaultMessageValidator::new())
        .expect("page envelope should decode");

    // Assert
    assert_eq!(response.len(), 2);
    assert_eq!(response.valid().count(), 1);
    let failures: Vec<_> = response.failures().collect();
    assert_eq!(
        failures,
        vec![(
            1,
            &ValidationError::UnknownMessageType {
                tag: "VOTE".to_owned()
            }
        )]
    );
}
