// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Analysis blob formats of the Engine library.
//!
//! Each row of the performance database carries up to six binary blobs
//! describing the analysis of one track. This crate encodes and decodes them.
//! It is IO-free: every codec maps between a byte slice and a plain value.
//!
//! # Formats
//!
//! - [`TrackData`] - sample rate, length, loudness and key
//! - [`BeatData`] - default and adjusted beat grids
//! - [`HighResWaveformData`], [`OverviewWaveformData`] - three-band waveforms
//! - [`QuickCuesData`] - eight hot cues plus the main cue
//! - [`LoopsData`] - eight saved loops
//!
//! All but the loops blob are wrapped in a length-prefixed zlib frame. An
//! empty blob stands for the default value of its type, and the default value
//! encodes to an empty blob.

mod beat_data;
mod beatgrid;
mod color;
pub mod error;
mod frame;
mod key;
mod loops;
mod quick_cues;
mod reader;
mod track_data;
mod waveform;

#[cfg(test)]
pub mod arbitrary;

pub use beat_data::{BeatData, BeatGridMarker};
pub use beatgrid::{FIRST_BEAT_INDEX, normalize_beatgrid, required_waveform_samples_per_entry};
pub use color::{PadColor, standard_pad_colors};
pub use error::{DecodeError, DecodeErrorKind, InvalidBeatgrid, Result};
pub use key::MusicalKey;
pub use loops::{LOOP_SLOTS, Loop, LoopsData};
pub use quick_cues::{HOT_CUE_SLOTS, HotCue, QuickCuesData};
pub use track_data::TrackData;
pub use waveform::{
    HighResWaveformData, OVERVIEW_WAVEFORM_ENTRIES, OverviewWaveformData, WaveformEntry,
};
