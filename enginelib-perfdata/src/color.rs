// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

use std::fmt;

/// RGBA colour of a hot cue or loop pad.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PadColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PadColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_rgba(rgba: u32) -> Self {
        let [r, g, b, a] = rgba.to_be_bytes();
        Self { r, g, b, a }
    }

    pub const fn to_rgba(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }
}

impl fmt::Display for PadColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.to_rgba())
    }
}

/// The eight pad colours hardware players assign by default, in pad order.
pub mod standard_pad_colors {
    use super::PadColor;

    pub const PAD_1: PadColor = PadColor::from_rgba(0xEAC5_32FF);
    pub const PAD_2: PadColor = PadColor::from_rgba(0xEA8F_32FF);
    pub const PAD_3: PadColor = PadColor::from_rgba(0xB855_BFFF);
    pub const PAD_4: PadColor = PadColor::from_rgba(0xBA2A_41FF);
    pub const PAD_5: PadColor = PadColor::from_rgba(0x86C6_4BFF);
    pub const PAD_6: PadColor = PadColor::from_rgba(0x20C6_7CFF);
    pub const PAD_7: PadColor = PadColor::from_rgba(0x00A8_B1FF);
    pub const PAD_8: PadColor = PadColor::from_rgba(0x158E_E2FF);

    pub const ALL: [PadColor; 8] = [PAD_1, PAD_2, PAD_3, PAD_4, PAD_5, PAD_6, PAD_7, PAD_8];
}
