//! Volumes mounted into a virtual machine.
//!
//! Volume sizes are kept as declared and checked against their kind's bound
//! by the execution constraint engine, so that an out-of-range size is
//! reported with the exact path of the field.

use crate::message::{
    domain::{
        DeclaredSize, EPHEMERAL_VOLUME_MAX_MIB, EphemeralVolumeSize, ItemHash,
        PERSISTENT_VOLUME_MAX_MIB, PersistentVolumeSize,
    },
    error::SizeError,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use serde_json::{Map, Value};

const fn default_use_latest() -> bool {
    true
}

/// Read-only volume built from existing content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImmutableVolume {
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Mount point inside the VM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<String>,
    /// Content backing the volume.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ItemHash>,
    /// Follow amendments of the referenced content.
    #[serde(default = "default_use_latest")]
    pub use_latest: bool,
}

/// The `ephemeral: true` marker of an ephemeral volume.
///
/// Only `true` decodes, which keeps other volume shapes from matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EphemeralMarker;

impl Serialize for EphemeralMarker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(true)
    }
}

impl<'de> Deserialize<'de> for EphemeralMarker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if bool::deserialize(deserializer)? {
            Ok(Self)
        } else {
            Err(serde::de::Error::custom("ephemeral must be true"))
        }
    }
}

/// Fresh read-write volume discarded when the VM stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EphemeralVolume {
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Mount point inside the VM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<String>,
    /// Ephemeral marker.
    #[serde(default)]
    pub ephemeral: EphemeralMarker,
    /// Declared size in MiB.
    pub size_mib: DeclaredSize,
}

impl EphemeralVolume {
    /// Returns the size checked against the ephemeral bound.
    ///
    /// # Errors
    ///
    /// Returns [`SizeError::OutOfBounds`] unless the size is in `1..=954`.
    pub fn size(&self) -> Result<EphemeralVolumeSize, SizeError> {
        self.size_mib.bounded::<EPHEMERAL_VOLUME_MAX_MIB>()
    }
}

/// Where a persistent volume is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumePersistence {
    /// On the executing host.
    Host,
    /// In the network's storage engine.
    Store,
}

/// Existing volume copied to seed a persistent one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParentVolume {
    /// Content of the parent volume.
    #[serde(rename = "ref")]
    pub reference: ItemHash,
    /// Follow amendments of the parent.
    #[serde(default = "default_use_latest")]
    pub use_latest: bool,
}

/// Named read-write volume that outlives the VM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersistentVolume {
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Mount point inside the VM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<String>,
    /// Volume the new one is copied from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentVolume>,
    /// Where the volume is kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistence: Option<VolumePersistence>,
    /// Volume name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Declared size in MiB.
    pub size_mib: DeclaredSize,
}

impl PersistentVolume {
    /// Returns the size checked against the persistent bound.
    ///
    /// # Errors
    ///
    /// Returns [`SizeError::OutOfBounds`] unless the size is in `1..=95368`.
    pub fn size(&self) -> Result<PersistentVolumeSize, SizeError> {
        self.size_mib.bounded::<PERSISTENT_VOLUME_MAX_MIB>()
    }
}

/// A volume attached to an execution.
///
/// The wire format carries no tag; the variant is chosen by shape. A volume
/// without `size_mib` is immutable. An `ephemeral` key, or a bare size
/// within the ephemeral bound, selects ephemeral. Anything else carrying a
/// size is persistent.
///
/// # Examples
///
/// ```
/// use corbel::message::domain::MachineVolume;
/// use serde_json::json;
///
/// let volume: MachineVolume =
///     serde_json::from_value(json!({"ephemeral": true, "size_mib": 10})).expect("ephemeral");
/// assert!(!volume.is_read_only());
///
/// let volume: MachineVolume = serde_json::from_value(json!({"mount": "/opt"})).expect("immutable");
/// assert!(volume.is_read_only());
///
/// let volume: MachineVolume =
///     serde_json::from_value(json!({"mount": "/data", "size_mib": 2000})).expect("persistent");
/// assert!(matches!(volume, MachineVolume::Persistent(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MachineVolume {
    /// Ephemeral volume.
    Ephemeral(EphemeralVolume),
    /// Persistent volume.
    Persistent(PersistentVolume),
    /// Immutable volume.
    Immutable(ImmutableVolume),
}

const PERSISTENT_ONLY_KEYS: [&str; 3] = ["parent", "persistence", "name"];

fn fits_ephemeral_bound(fields: &Map<String, Value>) -> bool {
    fields
        .get("size_mib")
        .and_then(|size| serde_json::from_value::<DeclaredSize>(size.clone()).ok())
        .is_some_and(|size| size.bounded::<EPHEMERAL_VOLUME_MAX_MIB>().is_ok())
}

impl<'de> Deserialize<'de> for MachineVolume {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let Value::Object(fields) = &value else {
            return Err(D::Error::custom("volume must be an object"));
        };

        let sized = fields.contains_key("size_mib");
        let ephemeral = fields.contains_key("ephemeral")
            || (!PERSISTENT_ONLY_KEYS.iter().any(|key| fields.contains_key(*key))
                && fits_ephemeral_bound(fields));

        let volume = match (sized, ephemeral) {
            (false, _) => serde_json::from_value(value).map(Self::Immutable),
            (true, true) => serde_json::from_value(value).map(Self::Ephemeral),
            (true, false) => serde_json::from_value(value).map(Self::Persistent),
        };
        volume.map_err(D::Error::custom)
    }
}

impl MachineVolume {
    /// Returns `true` if the VM cannot write to the volume.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self, Self::Immutable(_))
    }

    /// Returns the mount point, if declared.
    #[must_use]
    pub fn mount(&self) -> Option<&str> {
        match self {
            Self::Ephemeral(volume) => volume.mount.as_deref(),
            Self::Persistent(volume) => volume.mount.as_deref(),
            Self::Immutable(volume) => volume.mount.as_deref(),
        }
    }
}

/// Root filesystem of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootfsVolume {
    /// Base image the root filesystem is copied from.
    pub parent: ParentVolume,
    /// Where the root filesystem is kept.
    pub persistence: VolumePersistence,
    /// Declared size in MiB.
    pub size_mib: DeclaredSize,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl RootfsVolume {
    /// Returns the size checked against the persistent bound.
    ///
    /// # Errors
    ///
    /// Returns [`SizeError::OutOfBounds`] unless the size is in `1..=95368`.
    pub fn size(&self) -> Result<PersistentVolumeSize, SizeError> {
        self.size_mib.bounded::<PERSISTENT_VOLUME_MAX_MIB>()
    }
}
