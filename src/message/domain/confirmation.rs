//! Chain confirmation records and storage-layer metadata attached to messages.

use super::Chain;
use serde::{Deserialize, Serialize};

/// Binary-encoded transaction hash as exported by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfirmationHashBinary {
    /// Encoded bytes.
    #[serde(rename = "$binary")]
    pub binary: String,
    /// Encoding subtype.
    #[serde(rename = "$type")]
    pub subtype: String,
}

/// Transaction hash of a confirmation, either plain or binary-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfirmationHash {
    /// Plain transaction hash.
    Plain(String),
    /// Binary-encoded transaction hash.
    Binary(ConfirmationHashBinary),
}

/// Result of a message having been confirmed on a blockchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageConfirmation {
    /// Chain the confirmation was observed on.
    pub chain: Chain,
    /// Block height of the confirming transaction.
    pub height: u64,
    /// Hash of the confirming transaction.
    pub hash: ConfirmationHash,
}

/// Internal record identifier returned by some storage nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MongodbId {
    /// Object identifier.
    #[serde(rename = "$oid")]
    pub oid: String,
}
