//! Content schemas for the non-execution message types.
//!
//! Each schema is closed: unknown fields are rejected when decoding. The one
//! exception is [`StoreContent`], which keeps producer-added metadata in an
//! explicit sidecar map.

use super::{Chain, ItemHash, ItemType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Content-type tag that marks a POST as superseding an earlier one.
pub const AMEND_POST_TYPE: &str = "amend";

/// Embedded copy of a referenced POST message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRef {
    /// Chain of the referenced message.
    pub chain: Chain,
    /// Channel of the referenced message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Serialised content of the referenced message.
    pub item_content: String,
    /// Hash of the referenced message.
    pub item_hash: String,
    /// Storage kind of the referenced message.
    pub item_type: ItemType,
    /// Sender of the referenced message.
    pub sender: String,
    /// Signature of the referenced message.
    pub signature: String,
    /// Publication time of the referenced message.
    pub time: f64,
    /// Message type of the referenced message.
    #[serde(rename = "type", default = "default_chain_ref_type")]
    pub message_type: String,
}

fn default_chain_ref_type() -> String {
    "POST".to_owned()
}

/// Reference from a POST to another message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostRef {
    /// Reference by hash or free-form identifier.
    Hash(String),
    /// Embedded copy of the referenced message.
    Chain(Box<ChainRef>),
}

impl PostRef {
    /// Returns `true` if the reference carries no identifier.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Hash(hash) => hash.is_empty(),
            Self::Chain(_) => false,
        }
    }
}

/// Content of a POST message.
///
/// # Examples
///
/// ```
/// use corbel::message::domain::PostContent;
/// use serde_json::json;
///
/// let post: PostContent = serde_json::from_value(json!({
///     "address": "0xB68B9D4f3771c246233823ed1D3Add451055F9Ef",
///     "time": 1_700_000_000.0,
///     "type": "amend",
///     "ref": "0x123"
/// }))
/// .expect("valid post");
/// assert!(post.is_amend());
/// assert!(post.has_ref());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostContent {
    /// Address of the author.
    pub address: String,
    /// Creation time in float seconds.
    pub time: f64,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// User-generated content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    /// Message referenced by this one.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<PostRef>,
    /// User-generated content type.
    #[serde(rename = "type")]
    pub post_type: String,
}

impl PostContent {
    /// Returns `true` if this POST supersedes another.
    #[must_use]
    pub fn is_amend(&self) -> bool {
        self.post_type == AMEND_POST_TYPE
    }

    /// Returns `true` if a non-empty reference is present.
    #[must_use]
    pub fn has_ref(&self) -> bool {
        self.reference.as_ref().is_some_and(|reference| !reference.is_empty())
    }
}

/// Key of an aggregate, either a bare string or an object naming it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggregateKey {
    /// Bare key.
    Name(String),
    /// Key wrapped in an object.
    Object(AggregateKeyName),
}

impl AggregateKey {
    /// Returns the key name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Object(key) => &key.name,
        }
    }
}

/// Object form of an aggregate key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateKeyName {
    /// Key name.
    pub name: String,
}

/// Content of an AGGREGATE message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateContent {
    /// Address of the author.
    pub address: String,
    /// Creation time in float seconds.
    pub time: f64,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Aggregate key.
    pub key: AggregateKey,
    /// Value merged into the aggregate. Required, but may be `null`.
    pub content: Value,
}

/// Content of a STORE message.
///
/// Storage nodes add their own metadata to stored content; anything beyond
/// the typed fields lands in [`StoreContent::extra`].
///
/// # Examples
///
/// ```
/// use corbel::message::domain::StoreContent;
/// use serde_json::json;
///
/// let store: StoreContent = serde_json::from_value(json!({
///     "address": "0xB68B9D4f3771c246233823ed1D3Add451055F9Ef",
///     "time": 1_700_000_000.0,
///     "item_type": "ipfs",
///     "item_hash": "QmPxCe3eHVCdTG5uKnSZTsPGrYvMFTWAAt4PSfK7ETkz4d",
///     "engine_info": {"Blocks": 1}
/// }))
/// .expect("valid store content");
/// assert!(store.extra.contains_key("engine_info"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreContent {
    /// Address of the author.
    pub address: String,
    /// Creation time in float seconds.
    pub time: f64,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Where the stored file lives.
    pub item_type: ItemType,
    /// Identifier of the stored file.
    pub item_hash: ItemHash,
    /// Size of the stored file, set by the node on storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// MIME type of the stored file, set by the node on storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Reference to a related message.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Producer-added metadata.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl StoreContent {
    /// Returns the producer-added metadata as a JSON object.
    #[must_use]
    pub fn extra_as_object(&self) -> Map<String, Value> {
        self.extra
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

/// Content of a FORGET message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForgetContent {
    /// Address of the author.
    pub address: String,
    /// Creation time in float seconds.
    pub time: f64,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Messages to retract.
    pub hashes: Vec<ItemHash>,
    /// Aggregates to retract.
    #[serde(default)]
    pub aggregates: Vec<ItemHash>,
    /// Why the messages are retracted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
