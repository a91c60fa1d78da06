// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Hot cue and main cue blob (`PerformanceData.quickCues`).

use bytes::BufMut;

use crate::color::PadColor;
use crate::error::Result;
use crate::frame;
use crate::reader::{Reader, put_count, put_flag, put_label};

/// Number of hot cue slots on a player.
pub const HOT_CUE_SLOTS: usize = 8;

// is_set + label length + offset + rgba
const MIN_SLOT_LEN: usize = 1 + 4 + 8 + 4;
const UNSET_OFFSET: f64 = -1.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotCue {
    pub label: String,
    pub sample_offset: f64,
    pub color: PadColor,
}

/// Hot cues plus the main cue point.
///
/// The adjusted main cue is the user's cue point; the default main cue is the
/// one found by analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuickCuesData {
    pub hot_cues: [Option<HotCue>; HOT_CUE_SLOTS],
    pub adjusted_main_cue: f64,
    pub is_main_cue_adjusted: bool,
    pub default_main_cue: f64,
}

impl QuickCuesData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn decode(blob: &[u8]) -> Result<Self> {
        if blob.is_empty() {
            return Ok(Self::default());
        }
        let payload = frame::decompress(blob)?;
        let mut r = Reader::new(&payload);
        let n = r.count(Some(HOT_CUE_SLOTS), MIN_SLOT_LEN)?;
        let mut hot_cues: [Option<HotCue>; HOT_CUE_SLOTS] = Default::default();
        for slot in hot_cues.iter_mut().take(n) {
            let is_set = r.flag()?;
            let label = r.label()?;
            let sample_offset = r.f64()?;
            let color = PadColor::new(r.u8()?, r.u8()?, r.u8()?, r.u8()?);
            if is_set {
                *slot = Some(HotCue {
                    label,
                    sample_offset,
                    color,
                });
            }
        }
        let data = Self {
            hot_cues,
            adjusted_main_cue: r.f64()?,
            is_main_cue_adjusted: r.flag()?,
            default_main_cue: r.f64()?,
        };
        r.finish()?;
        Ok(data)
    }

    pub fn encode(&self) -> Vec<u8> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut payload = Vec::new();
        put_count(&mut payload, HOT_CUE_SLOTS);
        for slot in &self.hot_cues {
            match slot {
                Some(cue) => {
                    put_flag(&mut payload, true);
                    put_label(&mut payload, &cue.label);
                    payload.put_f64(cue.sample_offset);
                    payload.put_u32(cue.color.to_rgba());
                }
                None => {
                    put_flag(&mut payload, false);
                    put_label(&mut payload, "");
                    payload.put_f64(UNSET_OFFSET);
                    payload.put_u32(0);
                }
            }
        }
        payload.put_f64(self.adjusted_main_cue);
        put_flag(&mut payload, self.is_main_cue_adjusted);
        payload.put_f64(self.default_main_cue);
        frame::compress(&payload)
    }
}
