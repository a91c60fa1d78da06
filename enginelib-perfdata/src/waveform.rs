// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Waveform blobs (`highResolutionWaveFormData` and `overviewWaveFormData`).
//!
//! Both share one layout: a sample rate, the number of audio samples summarised
//! by each entry, then one low/mid/high amplitude triple per entry.

use bytes::BufMut;

use crate::error::Result;
use crate::frame;
use crate::reader::{Reader, put_count};

const ENTRY_LEN: usize = 3;

/// Number of entries in an overview waveform.
pub const OVERVIEW_WAVEFORM_ENTRIES: usize = 1024;

/// Band amplitudes for one waveform entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WaveformEntry {
    pub low: u8,
    pub mid: u8,
    pub high: u8,
}

impl WaveformEntry {
    pub const fn new(low: u8, mid: u8, high: u8) -> Self {
        Self { low, mid, high }
    }
}

fn decode_entries(blob: &[u8]) -> Result<(f64, f64, Vec<WaveformEntry>)> {
    let payload = frame::decompress(blob)?;
    let mut r = Reader::new(&payload);
    let sample_rate = r.f64()?;
    let samples_per_entry = r.f64()?;
    let n = r.count(None, ENTRY_LEN)?;
    let mut entries = Vec::with_capacity(n);
    for _ in 0..n {
        entries.push(WaveformEntry {
            low: r.u8()?,
            mid: r.u8()?,
            high: r.u8()?,
        });
    }
    r.finish()?;
    Ok((sample_rate, samples_per_entry, entries))
}

fn encode_entries(sample_rate: f64, samples_per_entry: f64, entries: &[WaveformEntry]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(20 + entries.len() * ENTRY_LEN);
    payload.put_f64(sample_rate);
    payload.put_f64(samples_per_entry);
    put_count(&mut payload, entries.len());
    for entry in entries {
        payload.put_u8(entry.low);
        payload.put_u8(entry.mid);
        payload.put_u8(entry.high);
    }
    frame::compress(&payload)
}

macro_rules! waveform_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub sample_rate: f64,
            pub samples_per_entry: f64,
            pub entries: Vec<WaveformEntry>,
        }

        impl $name {
            pub fn is_empty(&self) -> bool {
                *self == Self::default()
            }

            pub fn decode(blob: &[u8]) -> Result<Self> {
                if blob.is_empty() {
                    return Ok(Self::default());
                }
                let (sample_rate, samples_per_entry, entries) = decode_entries(blob)?;
                Ok(Self {
                    sample_rate,
                    samples_per_entry,
                    entries,
                })
            }

            pub fn encode(&self) -> Vec<u8> {
                if self.is_empty() {
                    return Vec::new();
                }
                encode_entries(self.sample_rate, self.samples_per_entry, &self.entries)
            }
        }
    };
}

waveform_type!(
    /// Full-length waveform with one entry per `samples_per_entry` samples.
    HighResWaveformData
);

waveform_type!(
    /// Fixed-width overview of the whole track.
    OverviewWaveformData
);

impl OverviewWaveformData {
    /// Downsample a high-resolution waveform to [`OVERVIEW_WAVEFORM_ENTRIES`]
    /// entries by taking the midpoint of each bucket.
    ///
    /// `sample_count` is the track length in samples and sets the overview's
    /// `samples_per_entry`, rounded down to a whole multiple of the source
    /// resolution.
    pub fn from_high_res(high_res: &HighResWaveformData, sample_count: i64) -> Self {
        let len = high_res.entries.len();
        if len == 0 {
            return Self::default();
        }
        let n = OVERVIEW_WAVEFORM_ENTRIES;
        let entries = (0..n)
            .map(|i| high_res.entries[len * (2 * i + 1) / (2 * n)])
            .collect();
        let quantum = high_res.samples_per_entry.trunc();
        let samples_per_entry = if quantum > 0.0 {
            ((sample_count as f64 / quantum).trunc() * quantum / n as f64).trunc()
        } else {
            (sample_count as f64 / n as f64).trunc()
        };
        Self {
            sample_rate: high_res.sample_rate,
            samples_per_entry,
            entries,
        }
    }
}
