// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Plain-value snapshots of a track and their mapping onto stored rows.

use std::time::{Duration, SystemTime};

use enginelib_db::{
    MetaDataIntegerRow, MetaDataRow, MetadataIntType, MetadataStrType, PerformanceDataRow,
    TrackIntegerMetadata, TrackMetadata, TrackRow,
};
use enginelib_perfdata::{
    BeatData, BeatGridMarker, HOT_CUE_SLOTS, HighResWaveformData, HotCue, LOOP_SLOTS, Loop,
    LoopsData, MusicalKey, OverviewWaveformData, QuickCuesData, TrackData, WaveformEntry,
    required_waveform_samples_per_entry,
};

use crate::error::{Error, Result};
use crate::util;

const DEFAULT_TRACK_TYPE: i64 = 1;
/// Album art row meaning "no artwork"
pub(crate) const NO_ALBUM_ART_ID: i64 = 1;

/// Sample rate and length of the audio a track was analysed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub sample_rate: f64,
    pub sample_count: i64,
}

/// Everything the library stores about one track.
///
/// A snapshot taken from a track carries its id; a snapshot used to create a
/// track must not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSnapshot {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub comment: Option<String>,
    pub publisher: Option<String>,
    pub composer: Option<String>,
    /// Path of the audio file relative to the library directory. Required.
    pub relative_path: Option<String>,
    pub track_number: Option<i32>,
    pub year: Option<i32>,
    pub duration: Option<Duration>,
    pub bpm: Option<f64>,
    pub bitrate: Option<i64>,
    pub file_bytes: Option<i64>,
    /// 0 to 100; larger values are clamped on write
    pub rating: Option<i32>,
    pub key: Option<MusicalKey>,
    pub last_played_at: Option<SystemTime>,
    pub last_modified_at: Option<SystemTime>,
    pub last_accessed_at: Option<SystemTime>,
    pub sampling: Option<Sampling>,
    pub average_loudness: Option<f64>,
    pub default_beatgrid: Vec<BeatGridMarker>,
    pub adjusted_beatgrid: Vec<BeatGridMarker>,
    pub default_main_cue: Option<f64>,
    pub adjusted_main_cue: Option<f64>,
    pub hot_cues: [Option<HotCue>; HOT_CUE_SLOTS],
    pub loops: [Option<Loop>; LOOP_SLOTS],
    /// High-resolution waveform; the overview is derived from it
    pub waveform: Vec<WaveformEntry>,
}

/// Rows written for one snapshot.
pub(crate) struct TrackWrite {
    pub track: TrackRow,
    pub metadata: TrackMetadata,
    pub integer_metadata: TrackIntegerMetadata,
    /// `None` clears the performance data
    pub performance: Option<PerformanceDataRow>,
}

impl TrackSnapshot {
    /// Rows for writing this snapshot as track `id`.
    pub(crate) fn to_write(&self, id: i64) -> Result<TrackWrite> {
        let Some(relative_path) = self.relative_path.as_deref() else {
            return Err(Error::InvalidTrackSnapshot(
                "the snapshot has no relative path, which every track requires".into(),
            ));
        };
        let filename = util::filename(relative_path);
        let length = self.duration.map(|d| d.as_secs() as i64);

        let track = TrackRow {
            play_order: self.track_number.map(i64::from),
            length,
            length_calculated: util::calculated_length(self.sampling),
            bpm: self.bpm.map(|bpm| bpm as i64),
            year: self.year.map(i64::from),
            relative_path: Some(relative_path.to_owned()),
            filename: Some(filename.to_owned()),
            bitrate: self.bitrate,
            bpm_analyzed: util::grid_bpm(self.sampling, &self.adjusted_beatgrid),
            track_type: Some(DEFAULT_TRACK_TYPE),
            is_external_track: Some(0),
            uuid_of_external_database: None,
            id_track_in_external_database: None,
            album_art_id: Some(NO_ALBUM_ART_ID),
            file_bytes: self.file_bytes,
            pdb_import_key: Some(0),
            uri: None,
            is_beatgrid_locked: Some(0),
        };

        let metadata = TrackMetadata {
            title: self.title.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            genre: self.genre.clone(),
            comment: self.comment.clone(),
            publisher: self.publisher.clone(),
            composer: self.composer.clone(),
            duration_mm_ss: length.map(util::format_mm_ss),
            ever_played: self.last_played_at.map(|_| "1".to_owned()),
            file_extension: util::file_extension(filename).map(str::to_owned),
        };

        let integer_metadata = TrackIntegerMetadata {
            musical_key: self.key.map(|k| i64::from(k.code())),
            rating: self.rating.map(|r| i64::from(r.clamp(0, 100))),
            last_played_ts: util::to_timestamp(self.last_played_at),
            last_modified_ts: util::to_timestamp(self.last_modified_at),
            last_accessed_ts: util::to_timestamp(self.last_accessed_at)
                .map(util::ceil_to_end_of_day),
            last_play_hash: None,
        };

        Ok(TrackWrite {
            track,
            metadata,
            integer_metadata,
            performance: self.has_performance_data().then(|| self.performance(id)),
        })
    }

    fn has_performance_data(&self) -> bool {
        self.sampling.is_some()
            || self.average_loudness.is_some()
            || !self.default_beatgrid.is_empty()
            || !self.adjusted_beatgrid.is_empty()
            || self.hot_cues.iter().any(Option::is_some)
            || self.loops.iter().any(Option::is_some)
    }

    fn performance(&self, id: i64) -> PerformanceDataRow {
        let sampling = util::known_sampling(self.sampling);
        let sample_rate = sampling.map_or(0.0, |s| s.sample_rate);
        let sample_count = sampling.map_or(0, |s| s.sample_count);

        let high_res_waveform = if self.waveform.is_empty() {
            HighResWaveformData::default()
        } else {
            HighResWaveformData {
                sample_rate,
                samples_per_entry: required_waveform_samples_per_entry(sample_rate),
                entries: self.waveform.clone(),
            }
        };
        let overview_waveform = OverviewWaveformData::from_high_res(&high_res_waveform, sample_count);

        PerformanceDataRow {
            id,
            is_analyzed: 1,
            is_rendered: 0,
            track_data: TrackData {
                sample_rate,
                sample_count,
                average_loudness: self.average_loudness.unwrap_or(0.0),
                key: self.key.map_or(0, MusicalKey::code),
            },
            high_res_waveform,
            overview_waveform,
            beat_data: BeatData {
                sample_rate,
                sample_count,
                default_markers: self.default_beatgrid.clone(),
                adjusted_markers: self.adjusted_beatgrid.clone(),
            },
            quick_cues: QuickCuesData {
                hot_cues: self.hot_cues.clone(),
                adjusted_main_cue: self.adjusted_main_cue.unwrap_or(0.0),
                is_main_cue_adjusted: self.adjusted_main_cue.is_some(),
                default_main_cue: self.default_main_cue.unwrap_or(0.0),
            },
            loops: LoopsData {
                loops: self.loops.clone(),
            },
            has_serato_values: 0,
            has_rekordbox_values: Some(0),
            has_traktor_values: Some(0),
        }
    }

    /// Assemble a snapshot from the stored rows of track `id`.
    pub(crate) fn from_rows(
        id: i64,
        track: TrackRow,
        metadata: Vec<MetaDataRow>,
        integer_metadata: Vec<MetaDataIntegerRow>,
        performance: PerformanceDataRow,
    ) -> Self {
        let track_data = &performance.track_data;
        let sampling = (track_data.sample_rate != 0.0).then_some(Sampling {
            sample_rate: track_data.sample_rate,
            sample_count: track_data.sample_count,
        });
        let analysed = performance.is_analyzed != 0;

        let mut snapshot = Self {
            id: Some(id),
            relative_path: track.relative_path,
            track_number: track.play_order.and_then(|n| i32::try_from(n).ok()),
            year: track.year.and_then(|n| i32::try_from(n).ok()),
            duration: sampling.map(util::sampled_duration).or_else(|| {
                track
                    .length
                    .map(|secs| Duration::from_secs(secs.max(0) as u64))
            }),
            bpm: track.bpm_analyzed.or(track.bpm.map(|bpm| bpm as f64)),
            bitrate: track.bitrate,
            file_bytes: track.file_bytes,
            key: MusicalKey::from_code(i64::from(track_data.key)),
            sampling,
            average_loudness: (track_data.average_loudness != 0.0)
                .then_some(track_data.average_loudness),
            default_main_cue: analysed.then_some(performance.quick_cues.default_main_cue),
            adjusted_main_cue: analysed.then_some(performance.quick_cues.adjusted_main_cue),
            default_beatgrid: performance.beat_data.default_markers,
            adjusted_beatgrid: performance.beat_data.adjusted_markers,
            hot_cues: performance.quick_cues.hot_cues,
            loops: performance.loops.loops,
            waveform: performance.high_res_waveform.entries,
            ..Self::default()
        };

        for row in metadata {
            let field = match row.kind {
                MetadataStrType::Title => &mut snapshot.title,
                MetadataStrType::Artist => &mut snapshot.artist,
                MetadataStrType::Album => &mut snapshot.album,
                MetadataStrType::Genre => &mut snapshot.genre,
                MetadataStrType::Comment => &mut snapshot.comment,
                MetadataStrType::Publisher => &mut snapshot.publisher,
                MetadataStrType::Composer => &mut snapshot.composer,
                _ => continue,
            };
            *field = Some(row.text);
        }

        for row in integer_metadata {
            match row.kind {
                MetadataIntType::LastPlayedTs => {
                    snapshot.last_played_at = util::to_time(Some(row.value))
                }
                MetadataIntType::LastModifiedTs => {
                    snapshot.last_modified_at = util::to_time(Some(row.value))
                }
                MetadataIntType::LastAccessedTs => {
                    snapshot.last_accessed_at = util::to_time(Some(row.value))
                }
                MetadataIntType::MusicalKey if snapshot.key.is_none() => {
                    snapshot.key = MusicalKey::from_code(row.value)
                }
                MetadataIntType::Rating => snapshot.rating = i32::try_from(row.value).ok(),
                _ => {}
            }
        }

        snapshot
    }
}
