// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Library schema versions.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Distinguishes schemas that share a version triple.
///
/// Engine Prime (desktop) and the player firmware both wrote schema 1.18.0,
/// with different column affinities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variant {
    Ep,
    Fw,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Ep => "ep",
            Variant::Fw => "fw",
        }
    }
}

/// A schema version: a numeric triple plus an optional variant tag.
///
/// Ordering is lexicographic with untagged versions sorting before tagged
/// ones, so `1.18.0+ep < 1.18.0+fw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub variant: Option<Variant>,
}

impl Version {
    pub const V1_6_0: Version = Version::new(1, 6, 0);
    pub const V1_7_1: Version = Version::new(1, 7, 1);
    pub const V1_9_1: Version = Version::new(1, 9, 1);
    pub const V1_11_1: Version = Version::new(1, 11, 1);
    pub const V1_13_0: Version = Version::new(1, 13, 0);
    pub const V1_13_1: Version = Version::new(1, 13, 1);
    pub const V1_13_2: Version = Version::new(1, 13, 2);
    pub const V1_15_0: Version = Version::new(1, 15, 0);
    pub const V1_17_0: Version = Version::new(1, 17, 0);
    pub const V1_18_0_EP: Version = Version::with_variant(1, 18, 0, Variant::Ep);
    pub const V1_18_0_FW: Version = Version::with_variant(1, 18, 0, Variant::Fw);

    /// Every supported version, ascending.
    pub const ALL: [Version; 11] = [
        Self::V1_6_0,
        Self::V1_7_1,
        Self::V1_9_1,
        Self::V1_11_1,
        Self::V1_13_0,
        Self::V1_13_1,
        Self::V1_13_2,
        Self::V1_15_0,
        Self::V1_17_0,
        Self::V1_18_0_EP,
        Self::V1_18_0_FW,
    ];

    pub const LATEST: Version = Self::V1_18_0_FW;
    pub const LATEST_FIRMWARE: Version = Self::V1_18_0_FW;

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            variant: None,
        }
    }

    pub const fn with_variant(major: u32, minor: u32, patch: u32, variant: Variant) -> Self {
        Self {
            major,
            minor,
            patch,
            variant: Some(variant),
        }
    }

    /// The numeric triple stored in the `Information` tables.
    pub fn triple(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch)
    }

    pub fn is_supported(&self) -> bool {
        Self::ALL.contains(self)
    }

    /// Product releases that wrote this schema, if the version is supported.
    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            Self::V1_6_0 => "SC5000 Firmware 1.0.0",
            Self::V1_7_1 => "SC5000 Firmware 1.0.3",
            Self::V1_9_1 => "Engine Prime 1.1.1",
            Self::V1_11_1 => "SC5000 Firmware 1.2.0",
            Self::V1_13_0 => "SC5000 Firmware 1.2.2",
            Self::V1_13_1 => "Engine Prime 1.2.2",
            Self::V1_13_2 => "SC5000 Firmware 1.3.1",
            Self::V1_15_0 => "SC5000 Firmware 1.4.0",
            Self::V1_17_0 => "SC5000 Firmware 1.5.1/1.5.2",
            Self::V1_18_0_EP => "Engine Prime 1.5.1/1.6.0/1.6.1",
            Self::V1_18_0_FW => "SC5000 Firmware 1.6.0/1.6.1/1.6.2",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(variant) = self.variant {
            write!(f, "+{}", variant.as_str())?;
        }
        Ok(())
    }
}

/// Text that is not a `major.minor.patch[+variant]` version.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version string: {0:?}")]
pub struct ParseVersionError(String);

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError(s.to_owned());
        let (triple, variant) = match s.split_once(['+', '-']) {
            Some((triple, "ep")) => (triple, Some(Variant::Ep)),
            Some((triple, "fw")) => (triple, Some(Variant::Fw)),
            Some(_) => return Err(err()),
            None => (s, None),
        };
        let mut parts = triple.split('.').map(|p| p.parse::<u32>().map_err(|_| err()));
        let (Some(major), Some(minor), Some(patch), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(err());
        };
        Ok(Version {
            major: major?,
            minor: minor?,
            patch: patch?,
            variant,
        })
    }
}
