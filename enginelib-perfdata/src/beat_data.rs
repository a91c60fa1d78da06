// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Beat grid blob (`PerformanceData.beatData`).

use bytes::BufMut;

use crate::error::Result;
use crate::frame;
use crate::reader::{Reader, put_count};

const MARKER_LEN: usize = 16;

/// A point on a beat grid: beat number `beat_index` falls on `sample_offset`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BeatGridMarker {
    pub sample_offset: f64,
    pub beat_index: i64,
}

impl BeatGridMarker {
    pub fn new(sample_offset: f64, beat_index: i64) -> Self {
        Self {
            sample_offset,
            beat_index,
        }
    }
}

/// The analysed (default) and user-adjusted beat grids of a track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeatData {
    pub sample_rate: f64,
    pub sample_count: i64,
    pub default_markers: Vec<BeatGridMarker>,
    pub adjusted_markers: Vec<BeatGridMarker>,
}

fn read_markers(r: &mut Reader<'_>) -> Result<Vec<BeatGridMarker>> {
    let n = r.count(None, MARKER_LEN)?;
    let mut markers = Vec::with_capacity(n);
    for _ in 0..n {
        markers.push(BeatGridMarker {
            sample_offset: r.f64()?,
            beat_index: r.i64()?,
        });
    }
    Ok(markers)
}

fn put_markers(out: &mut Vec<u8>, markers: &[BeatGridMarker]) {
    put_count(out, markers.len());
    for marker in markers {
        out.put_f64(marker.sample_offset);
        out.put_i64(marker.beat_index);
    }
}

impl BeatData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn decode(blob: &[u8]) -> Result<Self> {
        if blob.is_empty() {
            return Ok(Self::default());
        }
        let payload = frame::decompress(blob)?;
        let mut r = Reader::new(&payload);
        let data = Self {
            sample_rate: r.f64()?,
            sample_count: r.i64()?,
            default_markers: read_markers(&mut r)?,
            adjusted_markers: read_markers(&mut r)?,
        };
        r.finish()?;
        Ok(data)
    }

    pub fn encode(&self) -> Vec<u8> {
        if self.is_empty() {
            return Vec::new();
        }
        let markers = self.default_markers.len() + self.adjusted_markers.len();
        let mut payload = Vec::with_capacity(24 + markers * MARKER_LEN);
        payload.put_f64(self.sample_rate);
        payload.put_i64(self.sample_count);
        put_markers(&mut payload, &self.default_markers);
        put_markers(&mut payload, &self.adjusted_markers);
        frame::compress(&payload)
    }
}
