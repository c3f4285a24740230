//! Behavioural tests for publishing and validating messages.

use corbel::{
    compute_item_content_and_hash,
    message::{domain::Message, error::ValidationError},
    parse_message,
};
use eyre::{Result, eyre};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

const SENDER: &str = "0xB68B9D4f3771c246233823ed1D3Add451055F9Ef";
const STORAGE_HASH: &str = "b236db23bf5ad005ad7f5d82eed08a68a925020f0755b2a59c03f784499198eb";
const NODE_HASH: &str = "4d4db19afca380fdf06ba7f916153d0f740db9de9eee23ad26ba96a90d8a2920";

#[derive(Default)]
struct PublishingWorld {
    message_type: Option<&'static str>,
    content: Option<Value>,
    raw: Option<Value>,
    outcome: Option<Result<Message, ValidationError>>,
}

impl PublishingWorld {
    fn prepare(&mut self, message_type: &'static str, content: Value) {
        self.message_type = Some(message_type);
        self.content = Some(content);
        self.raw = None;
        self.outcome = None;
    }

    fn error(&self) -> Result<&ValidationError> {
        match self.outcome.as_ref() {
            Some(Err(error)) => Ok(error),
            Some(Ok(_)) => Err(eyre!("expected validation to fail")),
            None => Err(eyre!("message was not validated")),
        }
    }
}

#[fixture]
fn world() -> PublishingWorld {
    PublishingWorld::default()
}

fn rootfs() -> Value {
    json!({
        "parent": {"ref": STORAGE_HASH},
        "persistence": "host",
        "size_mib": 20_480
    })
}

#[given(r#"a post with body "{body}""#)]
fn post_with_body(world: &mut PublishingWorld, body: String) {
    world.prepare(
        "POST",
        json!({"address": SENDER, "time": 1.0, "type": "chat", "content": {"body": body}}),
    );
}

#[given("an amending post without a reference")]
fn amend_without_reference(world: &mut PublishingWorld) {
    world.prepare(
        "POST",
        json!({"address": SENDER, "time": 1.0, "type": "amend", "content": "fixed typo"}),
    );
}

#[given(r"an instance with an ephemeral volume of {size:u64} MiB")]
fn instance_with_ephemeral_volume(world: &mut PublishingWorld, size: u64) {
    world.prepare(
        "INSTANCE",
        json!({
            "address": SENDER,
            "time": 1.0,
            "allow_amend": false,
            "environment": {"internet": true},
            "resources": {"vcpus": 1, "memory": 2048, "seconds": 30},
            "rootfs": rootfs(),
            "volumes": [{"ephemeral": true, "mount": "/tmp", "size_mib": size}]
        }),
    );
}

#[given("a confidential instance paid by stream to a node")]
fn confidential_instance(world: &mut PublishingWorld) {
    world.prepare(
        "CONFIDENTIAL",
        json!({
            "address": SENDER,
            "time": 1.0,
            "allow_amend": false,
            "environment": {"trusted_execution": {"firmware": STORAGE_HASH}},
            "resources": {"vcpus": 4, "memory": 4096, "seconds": 30},
            "payment": {"chain": "BASE", "payment_type": "superfluid", "node_hash": NODE_HASH},
            "rootfs": rootfs()
        }),
    );
}

#[when("the sender publishes it inline")]
fn publish_inline(world: &mut PublishingWorld) -> Result<()> {
    let message_type = world
        .message_type
        .ok_or_else(|| eyre!("message type should be chosen"))?;
    let content = world
        .content
        .clone()
        .ok_or_else(|| eyre!("content should be prepared"))?;

    let item = compute_item_content_and_hash(&content)?;
    let mut raw = json!({
        "chain": "ETH",
        "sender": SENDER,
        "type": message_type,
        "time": 1.0,
        "content": content
    });
    item.apply_to(&mut raw)?;
    world.raw = Some(raw);
    Ok(())
}

#[when("the inline content is altered in transit")]
fn alter_inline_content(world: &mut PublishingWorld) -> Result<()> {
    let raw = world
        .raw
        .as_mut()
        .and_then(Value::as_object_mut)
        .ok_or_else(|| eyre!("message should be published"))?;
    let altered = raw
        .get("item_content")
        .and_then(Value::as_str)
        .ok_or_else(|| eyre!("message should carry inline content"))?
        .replace("gm", "gn");
    raw.insert("item_content".to_owned(), Value::String(altered));
    Ok(())
}

#[when("the receiver validates the message")]
fn validate_message(world: &mut PublishingWorld) -> Result<()> {
    let raw = world
        .raw
        .as_ref()
        .ok_or_else(|| eyre!("message should be published"))?;
    world.outcome = Some(parse_message(raw));
    Ok(())
}

#[then(r#"the message is accepted as a "{message_type}""#)]
fn message_accepted(world: &PublishingWorld, message_type: String) -> Result<()> {
    let message = match world.outcome.as_ref() {
        Some(Ok(message)) => message,
        Some(Err(error)) => return Err(eyre!("expected acceptance, got {error}")),
        None => return Err(eyre!("message was not validated")),
    };
    if message.message_type().as_str() != message_type {
        return Err(eyre!(
            "expected message type '{message_type}', got '{}'",
            message.message_type()
        ));
    }
    Ok(())
}

#[then("validation fails with a hash mismatch")]
fn fails_with_hash_mismatch(world: &PublishingWorld) -> Result<()> {
    let error = world.error()?;
    if !matches!(error, ValidationError::HashMismatch { .. }) {
        return Err(eyre!("expected a hash mismatch, got {error}"));
    }
    Ok(())
}

#[then("validation fails because the amend has no reference")]
fn fails_without_amend_reference(world: &PublishingWorld) -> Result<()> {
    let error = world.error()?;
    assert_eq!(error, &ValidationError::AmendRequiresRef);
    Ok(())
}

#[then(r#"validation fails at "{path}""#)]
fn fails_at_path(world: &PublishingWorld, path: String) -> Result<()> {
    let error = world.error()?;
    if error.field_path() != Some(path.as_str()) {
        return Err(eyre!(
            "expected failure at '{path}', got {:?}",
            error.field_path()
        ));
    }
    Ok(())
}

#[scenario(
    path = "tests/features/message_validation.feature",
    name = "Inline post built by a sender is accepted"
)]
fn inline_post_accepted(world: PublishingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/message_validation.feature",
    name = "Altered inline content is rejected"
)]
fn altered_content_rejected(world: PublishingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/message_validation.feature",
    name = "Amending post without a reference is rejected"
)]
fn amend_without_reference_rejected(world: PublishingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/message_validation.feature",
    name = "Oversized ephemeral volume is rejected"
)]
fn oversized_volume_rejected(world: PublishingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/message_validation.feature",
    name = "Confidential instance is accepted"
)]
fn confidential_instance_accepted(world: PublishingWorld) {
    let _ = world;
}
