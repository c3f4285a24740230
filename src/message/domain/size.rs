//! Resource quantities for volumes, with unit conversion and bounds.

use crate::message::error::SizeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use std::fmt;

const GIGABYTE: u64 = 1_000_000_000;
const MEBIBYTE: u64 = 1 << 20;

/// A quantity in decimal gigabytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Gigabytes(pub u64);

/// A quantity in binary mebibytes, the unit used for volume sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mebibytes(pub u64);

/// Converts gigabytes to mebibytes, rounding up.
///
/// Rounding up means a requested size is never under-allocated.
///
/// # Examples
///
/// ```
/// use corbel::message::domain::{Gigabytes, Mebibytes, gigabyte_to_mebibyte};
///
/// assert_eq!(gigabyte_to_mebibyte(Gigabytes(1)), Mebibytes(954));
/// assert_eq!(gigabyte_to_mebibyte(Gigabytes(100)), Mebibytes(95_368));
/// ```
#[must_use]
pub const fn gigabyte_to_mebibyte(n: Gigabytes) -> Mebibytes {
    Mebibytes(n.0.saturating_mul(GIGABYTE).div_ceil(MEBIBYTE))
}

impl From<Gigabytes> for Mebibytes {
    fn from(value: Gigabytes) -> Self {
        gigabyte_to_mebibyte(value)
    }
}

impl fmt::Display for Mebibytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MiB", self.0)
    }
}

/// Largest ephemeral volume, 1 GB.
pub const EPHEMERAL_VOLUME_MAX_MIB: u64 = gigabyte_to_mebibyte(Gigabytes(1)).0;

/// Largest persistent volume or root filesystem, 100 GB.
pub const PERSISTENT_VOLUME_MAX_MIB: u64 = gigabyte_to_mebibyte(Gigabytes(100)).0;

/// A positive mebibyte count no larger than `MAX`.
///
/// # Examples
///
/// ```
/// use corbel::message::domain::EphemeralVolumeSize;
///
/// assert!(EphemeralVolumeSize::new(954).is_ok());
/// assert!(EphemeralVolumeSize::new(955).is_err());
/// assert!(EphemeralVolumeSize::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoundedMebibytes<const MAX: u64>(u64);

/// Size of an ephemeral volume.
pub type EphemeralVolumeSize = BoundedMebibytes<EPHEMERAL_VOLUME_MAX_MIB>;

/// Size of a persistent volume or root filesystem.
pub type PersistentVolumeSize = BoundedMebibytes<PERSISTENT_VOLUME_MAX_MIB>;

impl<const MAX: u64> BoundedMebibytes<MAX> {
    /// Inclusive upper bound.
    pub const UPPER_BOUND: u64 = MAX;

    /// Creates a bounded size.
    ///
    /// # Errors
    ///
    /// Returns [`SizeError::OutOfBounds`] unless `1 <= mib <= MAX`.
    pub fn new(mib: u64) -> Result<Self, SizeError> {
        if mib == 0 || mib > MAX {
            return Err(SizeError::OutOfBounds {
                value: mib.to_string(),
                max: MAX,
            });
        }
        Ok(Self(mib))
    }

    /// Returns the size in mebibytes.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the size as a [`Mebibytes`] quantity.
    #[must_use]
    pub const fn as_mebibytes(self) -> Mebibytes {
        Mebibytes(self.0)
    }
}

impl<const MAX: u64> TryFrom<i64> for BoundedMebibytes<MAX> {
    type Error = SizeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map_err(|_| SizeError::OutOfBounds {
                value: value.to_string(),
                max: MAX,
            })
            .and_then(Self::new)
    }
}

impl<const MAX: u64> TryFrom<&Number> for BoundedMebibytes<MAX> {
    type Error = SizeError;

    fn try_from(value: &Number) -> Result<Self, Self::Error> {
        value.as_u64().map_or_else(
            || {
                Err(SizeError::OutOfBounds {
                    value: value.to_string(),
                    max: MAX,
                })
            },
            Self::new,
        )
    }
}

impl<const MAX: u64> Serialize for BoundedMebibytes<MAX> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de, const MAX: u64> Deserialize<'de> for BoundedMebibytes<MAX> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let number = Number::deserialize(deserializer)?;
        Self::try_from(&number).map_err(serde::de::Error::custom)
    }
}

/// A volume size exactly as declared on the wire.
///
/// Decoding accepts any JSON number so that bounds are reported by the
/// execution constraint engine with the path of the offending field.
/// Use [`DeclaredSize::bounded`] to obtain a checked size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclaredSize(Number);

impl DeclaredSize {
    /// Checks the declared value against `MAX`.
    ///
    /// # Errors
    ///
    /// Returns [`SizeError::OutOfBounds`] for non-integers, non-positive
    /// values and values above `MAX`.
    pub fn bounded<const MAX: u64>(&self) -> Result<BoundedMebibytes<MAX>, SizeError> {
        BoundedMebibytes::try_from(&self.0)
    }

    /// Returns the declared number.
    #[must_use]
    pub const fn as_number(&self) -> &Number {
        &self.0
    }
}

impl<const MAX: u64> From<BoundedMebibytes<MAX>> for DeclaredSize {
    fn from(value: BoundedMebibytes<MAX>) -> Self {
        Self(Number::from(value.get()))
    }
}

impl fmt::Display for DeclaredSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
