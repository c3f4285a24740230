//! Content identifiers and their storage-kind classification.
//!
//! A hash string's storage kind is a pure function of its textual shape, so
//! classification results are memoised in a bounded, thread-safe cache owned
//! by [`HashClassifier`].

use crate::message::error::UnknownHashFormat;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{cmp::Ordering, fmt, hash::Hash, str::FromStr};

/// Where and how a message's content is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Serialised content embedded in the message itself.
    Inline,
    /// Content held by the network's storage engine, addressed by sha256.
    Storage,
    /// Content referenced through IPFS.
    Ipfs,
}

impl ItemType {
    /// Classifies a hash string using the shared classifier.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownHashFormat`] if the string matches no known shape.
    pub fn from_hash(item_hash: &str) -> Result<Self, UnknownHashFormat> {
        HashClassifier::shared().classify(item_hash)
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Storage => "storage",
            Self::Ipfs => "ipfs",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a hash string by its shape, without caching.
///
/// - `Qm` prefix and 44 to 46 characters: IPFS CIDv0
/// - `bafy` prefix and exactly 59 characters: IPFS CIDv1
/// - exactly 64 characters: raw sha256 hex digest
///
/// [`ItemType::Inline`] is never produced; inline storage is declared by the
/// message, not inferred.
///
/// # Errors
///
/// Returns [`UnknownHashFormat`] carrying the string when no shape matches.
///
/// # Examples
///
/// ```
/// use corbel::message::domain::{ItemType, classify_hash};
///
/// let digest = "b236db23bf5ad005ad7f5d82eed08a68a925020f0755b2a59c03f784499198eb";
/// assert_eq!(classify_hash(digest), Ok(ItemType::Storage));
/// assert!(classify_hash("short").is_err());
/// ```
pub fn classify_hash(item_hash: &str) -> Result<ItemType, UnknownHashFormat> {
    let length = item_hash.chars().count();
    if item_hash.starts_with("Qm") && (44..=46).contains(&length) {
        Ok(ItemType::Ipfs)
    } else if item_hash.starts_with("bafy") && length == 59 {
        Ok(ItemType::Ipfs)
    } else if length == 64 {
        Ok(ItemType::Storage)
    } else {
        Err(UnknownHashFormat::new(item_hash))
    }
}

static SHARED_CLASSIFIER: Lazy<HashClassifier> = Lazy::new(HashClassifier::new);

/// Read-through cache in front of [`classify_hash`].
///
/// The cache stops admitting entries once `capacity` distinct hashes are held;
/// lookups past that point are classified directly. Failed classifications are
/// never cached.
///
/// # Examples
///
/// ```
/// use corbel::message::domain::{HashClassifier, ItemType};
///
/// let classifier = HashClassifier::with_capacity(2);
/// let hash = "QmPxCe3eHVCdTG5uKnSZTsPGrYvMFTWAAt4PSfK7ETkz4d";
/// assert_eq!(classifier.classify(hash), Ok(ItemType::Ipfs));
/// assert_eq!(classifier.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct HashClassifier {
    cache: DashMap<String, ItemType>,
    capacity: usize,
}

impl HashClassifier {
    /// Default number of distinct hashes retained.
    pub const DEFAULT_CAPACITY: usize = 4096;

    /// Creates a classifier with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a classifier retaining at most `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: DashMap::new(),
            capacity,
        }
    }

    /// Returns the process-wide classifier used when decoding [`ItemHash`] values.
    #[must_use]
    pub fn shared() -> &'static Self {
        &SHARED_CLASSIFIER
    }

    /// Classifies a hash string, consulting the cache first.
    ///
    /// Concurrent callers racing on the same string insert identical values.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownHashFormat`] if the string matches no known shape.
    pub fn classify(&self, item_hash: &str) -> Result<ItemType, UnknownHashFormat> {
        if let Some(entry) = self.cache.get(item_hash) {
            tracing::trace!(item_hash, "hash classification cache hit");
            return Ok(*entry.value());
        }

        let item_type = classify_hash(item_hash)?;
        if self.cache.len() < self.capacity {
            self.cache.insert(item_hash.to_owned(), item_type);
        }
        tracing::trace!(item_hash, %item_type, "hash classification cache miss");
        Ok(item_type)
    }

    /// Returns the number of cached classifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns `true` if nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Returns the maximum number of cached classifications.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HashClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// A content identifier paired with its derived storage kind.
///
/// Equality, ordering and hashing consider the raw string only; the kind is a
/// derived accessor.
///
/// # Examples
///
/// ```
/// use corbel::message::domain::{ItemHash, ItemType};
///
/// let hash = ItemHash::new("b236db23bf5ad005ad7f5d82eed08a68a925020f0755b2a59c03f784499198eb")
///     .expect("sha256 digests are recognised");
/// assert!(hash.is_storage());
/// assert_eq!(hash.item_type(), ItemType::Storage);
/// ```
#[derive(Debug, Clone)]
pub struct ItemHash {
    value: String,
    item_type: ItemType,
}

impl ItemHash {
    /// Creates an item hash, classifying it with the shared classifier.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownHashFormat`] if the string matches no known shape.
    pub fn new(value: impl Into<String>) -> Result<Self, UnknownHashFormat> {
        Self::with_classifier(value, HashClassifier::shared())
    }

    /// Creates an item hash using the given classifier.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownHashFormat`] if the string matches no known shape.
    pub fn with_classifier(
        value: impl Into<String>,
        classifier: &HashClassifier,
    ) -> Result<Self, UnknownHashFormat> {
        let raw = value.into();
        let item_type = classifier.classify(&raw)?;
        Ok(Self {
            value: raw,
            item_type,
        })
    }

    /// Returns the hash string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the storage kind derived from the hash's shape.
    #[must_use]
    pub const fn item_type(&self) -> ItemType {
        self.item_type
    }

    /// Returns `true` if the hash is a raw sha256 digest.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        self.item_type == ItemType::Storage
    }

    /// Returns `true` if the hash is an IPFS CID.
    #[must_use]
    pub fn is_ipfs(&self) -> bool {
        self.item_type == ItemType::Ipfs
    }

    /// Returns the hash string, consuming the value.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.value
    }
}

impl PartialEq for ItemHash {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for ItemHash {}

impl PartialOrd for ItemHash {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ItemHash {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl Hash for ItemHash {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl AsRef<str> for ItemHash {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ItemHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for ItemHash {
    type Err = UnknownHashFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ItemHash {
    type Error = UnknownHashFormat;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for ItemHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for ItemHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
