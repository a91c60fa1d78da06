// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Musical key codes as stored in track data and integer metadata.
///
/// Codes walk the circle of fifths, alternating each major key with its
/// relative minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
pub enum MusicalKey {
    CMajor = 1,
    AMinor = 2,
    GMajor = 3,
    EMinor = 4,
    DMajor = 5,
    BMinor = 6,
    AMajor = 7,
    FSharpMinor = 8,
    EMajor = 9,
    DFlatMinor = 10,
    BMajor = 11,
    AFlatMinor = 12,
    FSharpMajor = 13,
    EFlatMinor = 14,
    DFlatMajor = 15,
    BFlatMinor = 16,
    AFlatMajor = 17,
    FMinor = 18,
    EFlatMajor = 19,
    CMinor = 20,
    BFlatMajor = 21,
    GMinor = 22,
    FMajor = 23,
    DMinor = 24,
}

impl MusicalKey {
    /// Decode a stored key code; zero and unknown codes mean "no key".
    pub fn from_code(code: i64) -> Option<Self> {
        i32::try_from(code)
            .ok()
            .and_then(|c| Self::try_from(c).ok())
    }

    pub fn code(self) -> i32 {
        self.into()
    }

    pub fn is_minor(self) -> bool {
        self.code() % 2 == 0
    }
}
