// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Saved loop blob (`PerformanceData.loops`).
//!
//! Unlike the other analysis blobs this one is stored without compression.

use bytes::BufMut;

use crate::color::PadColor;
use crate::error::Result;
use crate::reader::{Reader, put_count, put_flag, put_label};

/// Number of saved loop slots on a player.
pub const LOOP_SLOTS: usize = 8;

// is_set + label length + start + end + rgba
const MIN_SLOT_LEN: usize = 1 + 4 + 8 + 8 + 4;
const UNSET_OFFSET: f64 = -1.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loop {
    pub label: String,
    pub start_sample_offset: f64,
    pub end_sample_offset: f64,
    pub color: PadColor,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopsData {
    pub loops: [Option<Loop>; LOOP_SLOTS],
}

impl LoopsData {
    pub fn is_empty(&self) -> bool {
        self.loops.iter().all(Option::is_none)
    }

    pub fn decode(blob: &[u8]) -> Result<Self> {
        let mut data = Self::default();
        if blob.is_empty() {
            return Ok(data);
        }
        let mut r = Reader::new(blob);
        let n = r.count(Some(LOOP_SLOTS), MIN_SLOT_LEN)?;
        for slot in data.loops.iter_mut().take(n) {
            let is_set = r.flag()?;
            let label = r.label()?;
            let start_sample_offset = r.f64()?;
            let end_sample_offset = r.f64()?;
            let color = PadColor::new(r.u8()?, r.u8()?, r.u8()?, r.u8()?);
            if is_set {
                *slot = Some(Loop {
                    label,
                    start_sample_offset,
                    end_sample_offset,
                    color,
                });
            }
        }
        r.finish()?;
        Ok(data)
    }

    pub fn encode(&self) -> Vec<u8> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(4 + LOOP_SLOTS * MIN_SLOT_LEN);
        put_count(&mut out, LOOP_SLOTS);
        for slot in &self.loops {
            match slot {
                Some(l) => {
                    put_flag(&mut out, true);
                    put_label(&mut out, &l.label);
                    out.put_f64(l.start_sample_offset);
                    out.put_f64(l.end_sample_offset);
                    out.put_u32(l.color.to_rgba());
                }
                None => {
                    put_flag(&mut out, false);
                    put_label(&mut out, "");
                    out.put_f64(UNSET_OFFSET);
                    out.put_f64(UNSET_OFFSET);
                    out.put_u32(0);
                }
            }
        }
        out
    }
}
