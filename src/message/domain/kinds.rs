//! Closed vocabularies of the message envelope: chains, hash functions and
//! message types.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Blockchains a message can be anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    /// Arbitrum.
    #[serde(rename = "ARB")]
    Arbitrum,
    /// Avalanche.
    #[serde(rename = "AVAX")]
    Avax,
    /// Base.
    #[serde(rename = "BASE")]
    Base,
    /// Blast.
    #[serde(rename = "BLAST")]
    Blast,
    /// BOB.
    #[serde(rename = "BOB")]
    Bob,
    /// BNB Smart Chain.
    #[serde(rename = "BSC")]
    Bsc,
    /// Cosmos SDK chains.
    #[serde(rename = "CSDK")]
    Csdk,
    /// Cyber.
    #[serde(rename = "CYBER")]
    Cyber,
    /// Polkadot.
    #[serde(rename = "DOT")]
    Dot,
    /// Ethereum.
    #[serde(rename = "ETH")]
    Eth,
    /// Fraxtal.
    #[serde(rename = "FRAX")]
    Fraxtal,
    /// Ink.
    #[serde(rename = "INK")]
    Ink,
    /// Linea.
    #[serde(rename = "LINEA")]
    Linea,
    /// Lisk.
    #[serde(rename = "LISK")]
    Lisk,
    /// Metis.
    #[serde(rename = "METIS")]
    Metis,
    /// Mode.
    #[serde(rename = "MODE")]
    Mode,
    /// Neo.
    #[serde(rename = "NEO")]
    Neo,
    /// NULS.
    #[serde(rename = "NULS")]
    Nuls,
    /// NULS 2.
    #[serde(rename = "NULS2")]
    Nuls2,
    /// Optimism.
    #[serde(rename = "OP")]
    Optimism,
    /// Polygon.
    #[serde(rename = "POL")]
    Pol,
    /// Solana.
    #[serde(rename = "SOL")]
    Sol,
    /// Tezos.
    #[serde(rename = "TEZOS")]
    Tezos,
    /// World Chain.
    #[serde(rename = "WLD")]
    Worldchain,
    /// Zora.
    #[serde(rename = "ZORA")]
    Zora,
    /// Sonic.
    #[serde(rename = "SONIC")]
    Sonic,
}

/// Hash functions accepted for `item_hash`.
///
/// # Examples
///
/// ```
/// use corbel::message::domain::HashType;
///
/// assert_eq!(
///     HashType::Sha256.digest(b"abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashType {
    /// SHA-256, rendered as lowercase hex.
    #[default]
    Sha256,
}

impl HashType {
    /// Parses a declared hash function name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }

    /// Hashes `bytes` and returns the lowercase hex digest.
    #[must_use]
    pub fn digest(self, bytes: &[u8]) -> String {
        match self {
            Self::Sha256 => hex::encode(Sha256::digest(bytes)),
        }
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of message types.
///
/// The tag alone selects the content schema of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    /// Unique data posts.
    Post,
    /// Key-value storage specific to an address.
    Aggregate,
    /// File storage.
    Store,
    /// Retraction of earlier messages.
    Forget,
    /// Function-style virtual machine.
    Program,
    /// Long-running virtual machine.
    Instance,
    /// Virtual machine in a trusted execution environment.
    Confidential,
}

impl MessageType {
    /// Every message type, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Post,
        Self::Aggregate,
        Self::Store,
        Self::Forget,
        Self::Program,
        Self::Instance,
        Self::Confidential,
    ];

    /// Looks up a message type by its exact wire tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use corbel::message::domain::MessageType;
    ///
    /// assert_eq!(MessageType::from_tag("POST"), Some(MessageType::Post));
    /// assert_eq!(MessageType::from_tag("post"), None);
    /// ```
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Returns the wire tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Aggregate => "AGGREGATE",
            Self::Store => "STORE",
            Self::Forget => "FORGET",
            Self::Program => "PROGRAM",
            Self::Instance => "INSTANCE",
            Self::Confidential => "CONFIDENTIAL",
        }
    }

    /// Returns `true` for types whose content describes a virtual machine.
    #[must_use]
    pub const fn is_execution(self) -> bool {
        matches!(self, Self::Program | Self::Instance | Self::Confidential)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
