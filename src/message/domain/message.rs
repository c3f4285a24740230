//! The message envelope, the closed set of content variants, and the
//! validated message value.

use super::{
    AggregateContent, Chain, ConfidentialContent, ExecutableContent, ForgetContent,
    InstanceContent, ItemHash, ItemType, MessageConfirmation, MessageType, MongodbId,
    PostContent, ProgramContent, StoreContent,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every top-level field of a message except `content`.
///
/// Decoding is closed: unknown top-level fields are rejected. The claimed
/// `item_hash` and the declared `hash_type` are kept as raw strings so that
/// the content-addressing checks can report them with their own error kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageEnvelope {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<MongodbId>,
    chain: Chain,
    sender: String,
    #[serde(rename = "type")]
    message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confirmations: Option<Vec<MessageConfirmation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confirmed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    time: f64,
    item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    item_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hash_type: Option<String>,
    item_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    forgotten_by: Option<Vec<String>>,
}

impl MessageEnvelope {
    /// Returns the storage-layer record identifier, if present.
    #[must_use]
    pub const fn id(&self) -> Option<&MongodbId> {
        self.id.as_ref()
    }

    /// Returns the chain the sender signed on.
    #[must_use]
    pub const fn chain(&self) -> Chain {
        self.chain
    }

    /// Returns the sender address.
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Returns the message type tag.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Returns the channel, if any.
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    /// Returns the chain confirmations, if any.
    #[must_use]
    pub fn confirmations(&self) -> &[MessageConfirmation] {
        self.confirmations.as_deref().unwrap_or_default()
    }

    /// Returns the declared `confirmed` flag.
    #[must_use]
    pub const fn confirmed(&self) -> Option<bool> {
        self.confirmed
    }

    /// Returns the signature, if any. It is never verified here.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Returns the declared size of the content.
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        self.size
    }

    /// Returns the publication time in float seconds.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Returns the declared storage kind.
    #[must_use]
    pub const fn item_type(&self) -> ItemType {
        self.item_type
    }

    /// Returns the serialised inline content, if any.
    #[must_use]
    pub fn item_content(&self) -> Option<&str> {
        self.item_content.as_deref()
    }

    /// Returns the declared hash function, if any.
    #[must_use]
    pub fn hash_type(&self) -> Option<&str> {
        self.hash_type.as_deref()
    }

    /// Returns the claimed content hash.
    #[must_use]
    pub fn item_hash(&self) -> &str {
        &self.item_hash
    }

    /// Returns the messages that retracted this one.
    #[must_use]
    pub fn forgotten_by(&self) -> &[String] {
        self.forgotten_by.as_deref().unwrap_or_default()
    }
}

/// Content of a message, one variant per message type.
///
/// The variant is always selected by the envelope's `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// POST content.
    Post(PostContent),
    /// AGGREGATE content.
    Aggregate(AggregateContent),
    /// STORE content.
    Store(StoreContent),
    /// FORGET content.
    Forget(ForgetContent),
    /// PROGRAM content.
    Program(Box<ProgramContent>),
    /// INSTANCE content.
    Instance(Box<InstanceContent>),
    /// CONFIDENTIAL content.
    Confidential(Box<ConfidentialContent>),
}

impl MessageContent {
    /// Decodes `value` with the schema selected by `message_type`.
    ///
    /// # Errors
    ///
    /// Returns the decoder error if `value` does not match the schema.
    ///
    /// # Examples
    ///
    /// ```
    /// use corbel::message::domain::{MessageContent, MessageType};
    /// use serde_json::json;
    ///
    /// let value = json!({"address": "0xabc", "time": 1.0, "key": "profile", "content": null});
    /// let content = MessageContent::decode(MessageType::Aggregate, &value).expect("aggregate");
    /// assert_eq!(content.message_type(), MessageType::Aggregate);
    /// assert!(MessageContent::decode(MessageType::Post, &value).is_err());
    /// ```
    pub fn decode(message_type: MessageType, value: &Value) -> Result<Self, serde_json::Error> {
        let content = match message_type {
            MessageType::Post => Self::Post(PostContent::deserialize(value)?),
            MessageType::Aggregate => Self::Aggregate(AggregateContent::deserialize(value)?),
            MessageType::Store => Self::Store(StoreContent::deserialize(value)?),
            MessageType::Forget => Self::Forget(ForgetContent::deserialize(value)?),
            MessageType::Program => Self::Program(Box::new(ProgramContent::deserialize(value)?)),
            MessageType::Instance => {
                Self::Instance(Box::new(InstanceContent::deserialize(value)?))
            }
            MessageType::Confidential => {
                Self::Confidential(Box::new(ConfidentialContent::deserialize(value)?))
            }
        };
        Ok(content)
    }

    /// Returns the message type this content belongs to.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::Post(_) => MessageType::Post,
            Self::Aggregate(_) => MessageType::Aggregate,
            Self::Store(_) => MessageType::Store,
            Self::Forget(_) => MessageType::Forget,
            Self::Program(_) => MessageType::Program,
            Self::Instance(_) => MessageType::Instance,
            Self::Confidential(_) => MessageType::Confidential,
        }
    }

    /// Returns the author address.
    #[must_use]
    pub fn address(&self) -> &str {
        match self {
            Self::Post(content) => &content.address,
            Self::Aggregate(content) => &content.address,
            Self::Store(content) => &content.address,
            Self::Forget(content) => &content.address,
            Self::Program(content) => &content.address,
            Self::Instance(content) => &content.address,
            Self::Confidential(content) => &content.address,
        }
    }

    /// Returns the execution view of the content, for VM message types.
    #[must_use]
    pub fn as_executable(&self) -> Option<&dyn ExecutableContent> {
        match self {
            Self::Program(content) => Some(content.as_ref()),
            Self::Instance(content) => Some(content.as_ref()),
            Self::Confidential(content) => Some(content.as_ref()),
            Self::Post(_) | Self::Aggregate(_) | Self::Store(_) | Self::Forget(_) => None,
        }
    }
}

/// A fully validated message.
///
/// Messages are only produced by the validation pipeline and never change
/// afterwards; an amendment is a new message referencing an old one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    #[serde(flatten)]
    envelope: MessageEnvelope,
    #[serde(skip)]
    item_hash: ItemHash,
    content: MessageContent,
}

impl Message {
    /// Assembles a message from parts that have already been validated.
    #[must_use]
    pub(crate) const fn from_validated_parts(
        envelope: MessageEnvelope,
        item_hash: ItemHash,
        content: MessageContent,
    ) -> Self {
        Self {
            envelope,
            item_hash,
            content,
        }
    }

    /// Returns the envelope fields.
    #[must_use]
    pub const fn envelope(&self) -> &MessageEnvelope {
        &self.envelope
    }

    /// Returns the validated content identifier.
    #[must_use]
    pub const fn item_hash(&self) -> &ItemHash {
        &self.item_hash
    }

    /// Returns the decoded content.
    #[must_use]
    pub const fn content(&self) -> &MessageContent {
        &self.content
    }

    /// Returns the message type.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        self.envelope.message_type
    }

    /// Returns the declared storage kind.
    #[must_use]
    pub const fn item_type(&self) -> ItemType {
        self.envelope.item_type
    }

    /// Returns the sender address.
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.envelope.sender
    }

    /// Returns `true` if at least one chain confirmation is attached.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        !self.envelope.confirmations().is_empty()
    }

    /// Returns the publication time as a UTC timestamp.
    ///
    /// Returns `None` if the wire time is not representable.
    ///
    /// # Examples
    ///
    /// ```
    /// use corbel::parse_message;
    /// use serde_json::json;
    ///
    /// let raw = json!({
    ///     "chain": "ETH",
    ///     "sender": "0xabc",
    ///     "type": "STORE",
    ///     "time": 1_700_000_000.5,
    ///     "item_type": "storage",
    ///     "item_hash": "b236db23bf5ad005ad7f5d82eed08a68a925020f0755b2a59c03f784499198eb",
    ///     "content": {
    ///         "address": "0xabc",
    ///         "time": 1_700_000_000.0,
    ///         "item_type": "ipfs",
    ///         "item_hash": "QmPxCe3eHVCdTG5uKnSZTsPGrYvMFTWAAt4PSfK7ETkz4d"
    ///     }
    /// });
    /// let message = parse_message(&raw).expect("valid store message");
    /// let published = message.published_at().expect("representable time");
    /// assert_eq!(published.timestamp(), 1_700_000_000);
    /// assert_eq!(published.timestamp_subsec_millis(), 500);
    /// ```
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        reason = "wire timestamps are float seconds; microsecond precision is enough"
    )]
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let micros = (self.envelope.time * 1_000_000.0).round();
        if !micros.is_finite() {
            return None;
        }
        DateTime::from_timestamp_micros(micros as i64)
    }
}
