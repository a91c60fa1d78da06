// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Tracks of a library.
//!
//! A [`Track`] is a handle: every getter reads the database and every setter
//! writes it immediately. Setters that touch several rows run in one
//! transaction.

use std::fmt;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use enginelib_db::{MetadataIntType, MetadataStrType, PerformanceDataRow, StorageGateway, TrackRow};
use enginelib_perfdata::{
    BeatGridMarker, HOT_CUE_SLOTS, HighResWaveformData, HotCue, LOOP_SLOTS, Loop, MusicalKey,
    OverviewWaveformData, WaveformEntry, required_waveform_samples_per_entry,
};
use tracing::trace;

use crate::crates::Crate;
use crate::error::{Error, Result};
use crate::snapshot::{NO_ALBUM_ART_ID, Sampling, TrackSnapshot};
use crate::util;

macro_rules! string_metadata {
    ($($get:ident, $set:ident => $kind:ident;)*) => {$(
        pub fn $get(&self) -> Result<Option<String>> {
            Ok(self.gw.get_meta_data(self.id, MetadataStrType::$kind)?)
        }

        pub fn $set(&self, value: Option<&str>) -> Result<()> {
            Ok(self.gw.set_meta_data(self.id, MetadataStrType::$kind, value)?)
        }
    )*};
}

/// A track stored in a library.
#[derive(Clone)]
pub struct Track {
    gw: Rc<StorageGateway>,
    id: i64,
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track").field("id", &self.id).finish()
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Rc::ptr_eq(&self.gw, &other.gw)
    }
}

impl Eq for Track {}

impl Track {
    pub(crate) fn new(gw: Rc<StorageGateway>, id: i64) -> Self {
        Self { gw, id }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Whether the track still exists.
    pub fn is_valid(&self) -> Result<bool> {
        Ok(self.gw.track_exists(self.id)?)
    }

    /// Read everything stored about this track.
    pub fn snapshot(&self) -> Result<TrackSnapshot> {
        self.gw.in_transaction(|_| {
            let track = self.gw.get_track(self.id)?;
            let metadata = self.gw.get_all_meta_data(self.id)?;
            let integer_metadata = self.gw.get_all_meta_data_integer(self.id)?;
            let performance = self.gw.get_performance_data(self.id)?;
            Ok(TrackSnapshot::from_rows(
                self.id,
                track,
                metadata,
                integer_metadata,
                performance,
            ))
        })
    }

    /// Overwrite everything stored about this track.
    pub fn update(&self, snapshot: &TrackSnapshot) -> Result<()> {
        if snapshot.id.is_some_and(|id| id != self.id) {
            return Err(Error::InvalidTrackSnapshot(
                "the snapshot belongs to a different track".into(),
            ));
        }
        let write = snapshot.to_write(self.id)?;
        self.gw.in_transaction(|_| {
            self.gw.update_track(self.id, &write.track)?;
            self.gw.set_meta_data_batch(self.id, &write.metadata)?;
            self.gw
                .set_meta_data_integer_batch(self.id, &write.integer_metadata)?;
            match &write.performance {
                Some(performance) => self.gw.set_performance_data(performance)?,
                None => self.gw.clear_performance_data(self.id)?,
            }
            trace!(track_id = self.id, "updated track");
            Ok(())
        })
    }

    fn row(&self) -> Result<TrackRow> {
        Ok(self.gw.get_track(self.id)?)
    }

    fn update_row(&self, f: impl FnOnce(&mut TrackRow)) -> Result<()> {
        self.gw.in_transaction(|_| {
            let mut row = self.gw.get_track(self.id)?;
            f(&mut row);
            self.gw.update_track(self.id, &row)?;
            Ok(())
        })
    }

    fn performance(&self) -> Result<PerformanceDataRow> {
        if !self.gw.track_exists(self.id)? {
            return Err(Error::Storage(enginelib_db::Error::TrackDeleted(self.id)));
        }
        Ok(self.gw.get_performance_data(self.id)?)
    }

    /// Rewrite the performance data row, marking the track analysed.
    fn update_performance(&self, f: impl FnOnce(&mut PerformanceDataRow)) -> Result<()> {
        self.gw.in_transaction(|_| {
            let mut performance = self.gw.get_performance_data(self.id)?;
            f(&mut performance);
            performance.is_analyzed = 1;
            self.gw.set_performance_data(&performance)?;
            Ok(())
        })
    }

    string_metadata! {
        title, set_title => Title;
        artist, set_artist => Artist;
        album, set_album => Album;
        genre, set_genre => Genre;
        comment, set_comment => Comment;
        publisher, set_publisher => Publisher;
        composer, set_composer => Composer;
    }

    pub fn rating(&self) -> Result<Option<i32>> {
        let rating = self
            .gw
            .get_meta_data_integer(self.id, MetadataIntType::Rating)?;
        Ok(rating.and_then(|r| i32::try_from(r).ok()))
    }

    /// Set the rating, clamped to 0..=100.
    pub fn set_rating(&self, rating: Option<i32>) -> Result<()> {
        let rating = rating.map(|r| i64::from(r.clamp(0, 100)));
        Ok(self
            .gw
            .set_meta_data_integer(self.id, MetadataIntType::Rating, rating)?)
    }

    pub fn key(&self) -> Result<Option<MusicalKey>> {
        let code = self
            .gw
            .get_meta_data_integer(self.id, MetadataIntType::MusicalKey)?;
        Ok(code.and_then(MusicalKey::from_code))
    }

    /// Set the key in both the metadata and the analysis data.
    pub fn set_key(&self, key: Option<MusicalKey>) -> Result<()> {
        self.gw.in_transaction(|_| {
            self.update_performance(|p| p.track_data.key = key.map_or(0, MusicalKey::code))?;
            self.gw.set_meta_data_integer(
                self.id,
                MetadataIntType::MusicalKey,
                key.map(|k| i64::from(k.code())),
            )?;
            Ok(())
        })
    }

    pub fn year(&self) -> Result<Option<i32>> {
        Ok(self.row()?.year.and_then(|y| i32::try_from(y).ok()))
    }

    pub fn set_year(&self, year: Option<i32>) -> Result<()> {
        self.update_row(|row| row.year = year.map(i64::from))
    }

    pub fn track_number(&self) -> Result<Option<i32>> {
        Ok(self.row()?.play_order.and_then(|n| i32::try_from(n).ok()))
    }

    pub fn set_track_number(&self, track_number: Option<i32>) -> Result<()> {
        self.update_row(|row| row.play_order = track_number.map(i64::from))
    }

    pub fn bitrate(&self) -> Result<Option<i64>> {
        Ok(self.row()?.bitrate)
    }

    pub fn set_bitrate(&self, bitrate: Option<i64>) -> Result<()> {
        self.update_row(|row| row.bitrate = bitrate)
    }

    pub fn file_bytes(&self) -> Result<Option<i64>> {
        Ok(self.row()?.file_bytes)
    }

    pub fn set_file_bytes(&self, file_bytes: Option<i64>) -> Result<()> {
        self.update_row(|row| row.file_bytes = file_bytes)
    }

    /// Album art row id, `None` when the track has no artwork.
    pub fn album_art_id(&self) -> Result<Option<i64>> {
        Ok(self.row()?.album_art_id.filter(|&id| id > NO_ALBUM_ART_ID))
    }

    pub fn set_album_art_id(&self, album_art_id: Option<i64>) -> Result<()> {
        self.update_row(|row| row.album_art_id = Some(album_art_id.unwrap_or(NO_ALBUM_ART_ID)))
    }

    pub fn relative_path(&self) -> Result<Option<String>> {
        Ok(self.row()?.relative_path)
    }

    /// Move the track, updating its filename and extension.
    pub fn set_relative_path(&self, relative_path: &str) -> Result<()> {
        let filename = util::filename(relative_path);
        self.gw.in_transaction(|_| {
            self.update_row(|row| {
                row.relative_path = Some(relative_path.to_owned());
                row.filename = Some(filename.to_owned());
            })?;
            self.gw.set_meta_data(
                self.id,
                MetadataStrType::FileExtension,
                util::file_extension(filename),
            )?;
            Ok(())
        })
    }

    pub fn filename(&self) -> Result<Option<String>> {
        Ok(self
            .relative_path()?
            .map(|path| util::filename(&path).to_owned()))
    }

    pub fn file_extension(&self) -> Result<Option<String>> {
        Ok(self.relative_path()?.and_then(|path| {
            util::file_extension(util::filename(&path)).map(str::to_owned)
        }))
    }

    /// Analysed tempo.
    pub fn bpm(&self) -> Result<Option<f64>> {
        Ok(self.row()?.bpm_analyzed)
    }

    /// Set the analysed tempo; the integer column holds it rounded up.
    pub fn set_bpm(&self, bpm: Option<f64>) -> Result<()> {
        self.update_row(|row| {
            row.bpm_analyzed = bpm;
            row.bpm = bpm.map(|b| b.ceil() as i64);
        })
    }

    /// Length from the sampling if known, otherwise from the stored seconds.
    pub fn duration(&self) -> Result<Option<Duration>> {
        if let Some(sampling) = self.sampling()? {
            return Ok(Some(util::sampled_duration(sampling)));
        }
        Ok(self
            .row()?
            .length
            .map(|secs| Duration::from_secs(secs.max(0) as u64)))
    }

    pub fn sampling(&self) -> Result<Option<Sampling>> {
        let data = self.performance()?.track_data;
        Ok((data.sample_rate != 0.0).then_some(Sampling {
            sample_rate: data.sample_rate,
            sample_count: data.sample_count,
        }))
    }

    /// Set the sampling, rewriting every value derived from it.
    pub fn set_sampling(&self, sampling: Option<Sampling>) -> Result<()> {
        let sampling = util::known_sampling(sampling);
        let secs = util::calculated_length(sampling);
        let sample_rate = sampling.map_or(0.0, |s| s.sample_rate);
        let sample_count = sampling.map_or(0, |s| s.sample_count);

        self.gw.in_transaction(|_| {
            self.gw.set_meta_data(
                self.id,
                MetadataStrType::DurationMmSs,
                secs.map(util::format_mm_ss).as_deref(),
            )?;
            self.update_row(|row| {
                row.length = secs;
                row.length_calculated = secs;
            })?;
            self.update_performance(|p| {
                p.track_data.sample_rate = sample_rate;
                p.track_data.sample_count = sample_count;
                p.beat_data.sample_rate = sample_rate;
                p.beat_data.sample_count = sample_count;
                if !p.high_res_waveform.is_empty() {
                    p.high_res_waveform.sample_rate = sample_rate;
                    p.high_res_waveform.samples_per_entry =
                        required_waveform_samples_per_entry(sample_rate);
                    p.overview_waveform =
                        OverviewWaveformData::from_high_res(&p.high_res_waveform, sample_count);
                }
            })
        })
    }

    pub fn average_loudness(&self) -> Result<Option<f64>> {
        let loudness = self.performance()?.track_data.average_loudness;
        Ok((loudness != 0.0).then_some(loudness))
    }

    /// Zero is stored as no loudness.
    pub fn set_average_loudness(&self, loudness: Option<f64>) -> Result<()> {
        self.update_performance(|p| p.track_data.average_loudness = loudness.unwrap_or(0.0))
    }

    pub fn hot_cues(&self) -> Result<[Option<HotCue>; HOT_CUE_SLOTS]> {
        Ok(self.performance()?.quick_cues.hot_cues)
    }

    pub fn set_hot_cues(&self, hot_cues: [Option<HotCue>; HOT_CUE_SLOTS]) -> Result<()> {
        self.update_performance(|p| p.quick_cues.hot_cues = hot_cues)
    }

    pub fn hot_cue_at(&self, index: usize) -> Result<Option<HotCue>> {
        if index >= HOT_CUE_SLOTS {
            return Err(Error::InvalidSlot(index));
        }
        Ok(self.performance()?.quick_cues.hot_cues[index].clone())
    }

    pub fn set_hot_cue_at(&self, index: usize, hot_cue: Option<HotCue>) -> Result<()> {
        if index >= HOT_CUE_SLOTS {
            return Err(Error::InvalidSlot(index));
        }
        self.update_performance(|p| p.quick_cues.hot_cues[index] = hot_cue)
    }

    pub fn loops(&self) -> Result<[Option<Loop>; LOOP_SLOTS]> {
        Ok(self.performance()?.loops.loops)
    }

    pub fn set_loops(&self, loops: [Option<Loop>; LOOP_SLOTS]) -> Result<()> {
        self.update_performance(|p| p.loops.loops = loops)
    }

    pub fn loop_at(&self, index: usize) -> Result<Option<Loop>> {
        if index >= LOOP_SLOTS {
            return Err(Error::InvalidSlot(index));
        }
        Ok(self.performance()?.loops.loops[index].clone())
    }

    pub fn set_loop_at(&self, index: usize, l: Option<Loop>) -> Result<()> {
        if index >= LOOP_SLOTS {
            return Err(Error::InvalidSlot(index));
        }
        self.update_performance(|p| p.loops.loops[index] = l)
    }

    pub fn default_beatgrid(&self) -> Result<Vec<BeatGridMarker>> {
        Ok(self.performance()?.beat_data.default_markers)
    }

    pub fn set_default_beatgrid(&self, grid: Vec<BeatGridMarker>) -> Result<()> {
        self.update_performance(|p| p.beat_data.default_markers = grid)
    }

    pub fn adjusted_beatgrid(&self) -> Result<Vec<BeatGridMarker>> {
        Ok(self.performance()?.beat_data.adjusted_markers)
    }

    pub fn set_adjusted_beatgrid(&self, grid: Vec<BeatGridMarker>) -> Result<()> {
        self.update_performance(|p| p.beat_data.adjusted_markers = grid)
    }

    /// Main cue position in samples.
    pub fn default_main_cue(&self) -> Result<f64> {
        Ok(self.performance()?.quick_cues.default_main_cue)
    }

    pub fn set_default_main_cue(&self, sample_offset: f64) -> Result<()> {
        self.update_performance(|p| p.quick_cues.default_main_cue = sample_offset)
    }

    /// Main cue position as moved by the user, in samples.
    pub fn adjusted_main_cue(&self) -> Result<f64> {
        Ok(self.performance()?.quick_cues.adjusted_main_cue)
    }

    pub fn set_adjusted_main_cue(&self, sample_offset: f64) -> Result<()> {
        self.update_performance(|p| {
            p.quick_cues.adjusted_main_cue = sample_offset;
            p.quick_cues.is_main_cue_adjusted = true;
        })
    }

    /// High-resolution waveform.
    pub fn waveform(&self) -> Result<Vec<WaveformEntry>> {
        Ok(self.performance()?.high_res_waveform.entries)
    }

    /// Store a high-resolution waveform and the overview derived from it.
    ///
    /// The entries must already be spaced at the resolution the track's
    /// sample rate requires.
    pub fn set_waveform(&self, waveform: Vec<WaveformEntry>) -> Result<()> {
        self.update_performance(|p| {
            let sample_rate = p.track_data.sample_rate;
            p.high_res_waveform = if waveform.is_empty() {
                HighResWaveformData::default()
            } else {
                HighResWaveformData {
                    sample_rate,
                    samples_per_entry: required_waveform_samples_per_entry(sample_rate),
                    entries: waveform,
                }
            };
            p.overview_waveform =
                OverviewWaveformData::from_high_res(&p.high_res_waveform, p.track_data.sample_count);
        })
    }

    pub fn overview_waveform(&self) -> Result<Vec<WaveformEntry>> {
        Ok(self.performance()?.overview_waveform.entries)
    }

    pub fn last_played_at(&self) -> Result<Option<SystemTime>> {
        let ts = self
            .gw
            .get_meta_data_integer(self.id, MetadataIntType::LastPlayedTs)?;
        Ok(util::to_time(ts))
    }

    /// Set the last play time and the "ever played" flag with it.
    pub fn set_last_played_at(&self, played_at: Option<SystemTime>) -> Result<()> {
        self.gw.in_transaction(|_| {
            let ever_played = if played_at.is_some() { "1" } else { "0" };
            self.gw
                .set_meta_data(self.id, MetadataStrType::EverPlayed, Some(ever_played))?;
            self.gw.set_meta_data_integer(
                self.id,
                MetadataIntType::LastPlayedTs,
                util::to_timestamp(played_at),
            )?;
            Ok(())
        })
    }

    pub fn last_modified_at(&self) -> Result<Option<SystemTime>> {
        let ts = self
            .gw
            .get_meta_data_integer(self.id, MetadataIntType::LastModifiedTs)?;
        Ok(util::to_time(ts))
    }

    pub fn set_last_modified_at(&self, modified_at: Option<SystemTime>) -> Result<()> {
        Ok(self.gw.set_meta_data_integer(
            self.id,
            MetadataIntType::LastModifiedTs,
            util::to_timestamp(modified_at),
        )?)
    }

    pub fn last_accessed_at(&self) -> Result<Option<SystemTime>> {
        let ts = self
            .gw
            .get_meta_data_integer(self.id, MetadataIntType::LastAccessedTs)?;
        Ok(util::to_time(ts))
    }

    /// Stored rounded up to the end of the day.
    pub fn set_last_accessed_at(&self, accessed_at: Option<SystemTime>) -> Result<()> {
        Ok(self.gw.set_meta_data_integer(
            self.id,
            MetadataIntType::LastAccessedTs,
            util::to_timestamp(accessed_at).map(util::ceil_to_end_of_day),
        )?)
    }

    /// Crates that directly contain this track.
    pub fn containing_crates(&self) -> Result<Vec<Crate>> {
        Ok(self
            .gw
            .track_crate_ids(self.id)?
            .into_iter()
            .map(|id| Crate::new(Rc::clone(&self.gw), id))
            .collect())
    }
}
