// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Database row types for Engine libraries.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use enginelib_perfdata::{
    BeatData, HighResWaveformData, LoopsData, OverviewWaveformData, QuickCuesData, TrackData,
};

/// A row of the `Track` table, without its id.
///
/// Columns that do not exist at the library's schema version read back as
/// `None`, and values written to them are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackRow {
    pub play_order: Option<i64>,
    /// Length in whole seconds
    pub length: Option<i64>,
    pub length_calculated: Option<i64>,
    pub bpm: Option<i64>,
    pub year: Option<i64>,
    /// Path relative to the library directory (`path` column)
    pub relative_path: Option<String>,
    pub filename: Option<String>,
    pub bitrate: Option<i64>,
    pub bpm_analyzed: Option<f64>,
    pub track_type: Option<i64>,
    pub is_external_track: Option<i64>,
    pub uuid_of_external_database: Option<String>,
    pub id_track_in_external_database: Option<i64>,
    pub album_art_id: Option<i64>,
    /// Since 1.15.0
    pub file_bytes: Option<i64>,
    /// Since 1.7.1
    pub pdb_import_key: Option<i64>,
    /// Since 1.15.0
    pub uri: Option<String>,
    /// Since 1.18.0+fw
    pub is_beatgrid_locked: Option<i64>,
}

/// A row of the `PerformanceData` table with its blobs decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceDataRow {
    pub id: i64,
    pub is_analyzed: i64,
    pub is_rendered: i64,
    pub track_data: TrackData,
    pub high_res_waveform: HighResWaveformData,
    pub overview_waveform: OverviewWaveformData,
    pub beat_data: BeatData,
    pub quick_cues: QuickCuesData,
    pub loops: LoopsData,
    pub has_serato_values: i64,
    /// Since 1.7.1
    pub has_rekordbox_values: Option<i64>,
    /// Since 1.11.1
    pub has_traktor_values: Option<i64>,
}

impl PerformanceDataRow {
    /// The value reported for a track with no performance data.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// A row of the `Crate` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrateRow {
    pub id: i64,
    /// Display name (`title` column)
    pub name: String,
    /// Names from the root crate down to this one, each followed by `;`
    pub path: String,
}

/// Convert Unix timestamp to SystemTime.
pub fn unix_to_system_time(timestamp: i64) -> SystemTime {
    if timestamp >= 0 {
        UNIX_EPOCH + Duration::from_secs(timestamp as u64)
    } else {
        UNIX_EPOCH - Duration::from_secs(timestamp.unsigned_abs())
    }
}

/// Convert SystemTime to Unix timestamp, truncating sub-second precision.
pub fn system_time_to_unix(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}
