// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Read operations.

use enginelib_perfdata::{
    BeatData, HighResWaveformData, LoopsData, OverviewWaveformData, QuickCuesData, TrackData,
};
use rusqlite::{OptionalExtension, Row};
use tracing::warn;

use crate::connection::StorageGateway;
use crate::error::{Error, Result};
use crate::metadata::{MetaDataIntegerRow, MetaDataRow, MetadataIntType, MetadataStrType};
use crate::types::{PerformanceDataRow, TrackRow};

/// Undecoded `PerformanceData` row.
struct RawPerformanceData {
    is_analyzed: i64,
    is_rendered: i64,
    blobs: [Vec<u8>; 6],
    has_serato_values: i64,
    has_rekordbox_values: Option<i64>,
    has_traktor_values: Option<i64>,
}

fn blob(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<u8>> {
    Ok(row.get::<_, Option<Vec<u8>>>(idx)?.unwrap_or_default())
}

fn flag(row: &Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    Ok(row.get::<_, Option<i64>>(idx)?.unwrap_or(0))
}

impl StorageGateway {
    /// Get a track row by id.
    pub fn get_track(&self, id: i64) -> Result<TrackRow> {
        let mut stmt = self.conn.prepare_cached(&self.track_sql.select)?;
        let mut rows = stmt.query([id])?;
        let track = match rows.next()? {
            Some(row) => self.track_sql.read(row)?,
            None => return Err(Error::TrackDeleted(id)),
        };
        if rows.next()?.is_some() {
            return Err(Error::TrackDatabaseInconsistency {
                detail: "More than one track with the same id".into(),
                track_id: id,
            });
        }
        Ok(track)
    }

    /// Check if a track exists.
    pub fn track_exists(&self, id: i64) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT 1 FROM music.Track WHERE id = ?1")?;
        Ok(stmt.exists([id])?)
    }

    /// Ids of all tracks, ascending.
    pub fn track_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id FROM music.Track ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    /// Ids of tracks whose `path` column equals `relative_path`.
    pub fn track_ids_by_relative_path(&self, relative_path: &str) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id FROM music.Track WHERE path = ?1 ORDER BY id")?;
        let ids = stmt
            .query_map([relative_path], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    /// Get one string metadata value of a track.
    pub fn get_meta_data(&self, id: i64, kind: MetadataStrType) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT text FROM music.MetaData WHERE id = ?1 AND type = ?2 AND text IS NOT NULL",
        )?;
        let values = stmt
            .query_map([id, i64::from(kind)], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        single_value(values, id, "MetaData", i64::from(kind))
    }

    /// Get all non-null string metadata of a track, ordered by type code.
    ///
    /// Rows with type codes this library does not know are skipped.
    pub fn get_all_meta_data(&self, id: i64) -> Result<Vec<MetaDataRow>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT type, text FROM music.MetaData WHERE id = ?1 AND text IS NOT NULL ORDER BY type",
        )?;
        let raw = stmt
            .query_map([id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(raw.len());
        for (code, text) in raw {
            match MetadataStrType::try_from(code) {
                Ok(kind) => rows.push(MetaDataRow { id, kind, text }),
                Err(_) => warn!(track_id = id, code, "skipping unknown MetaData type"),
            }
        }
        Ok(rows)
    }

    /// Get one integer metadata value of a track.
    pub fn get_meta_data_integer(&self, id: i64, kind: MetadataIntType) -> Result<Option<i64>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT value FROM music.MetaDataInteger \
             WHERE id = ?1 AND type = ?2 AND value IS NOT NULL",
        )?;
        let values = stmt
            .query_map([id, i64::from(kind)], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        single_value(values, id, "MetaDataInteger", i64::from(kind))
    }

    /// Get all non-null integer metadata of a track, ordered by type code.
    pub fn get_all_meta_data_integer(&self, id: i64) -> Result<Vec<MetaDataIntegerRow>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT type, value FROM music.MetaDataInteger \
             WHERE id = ?1 AND value IS NOT NULL ORDER BY type",
        )?;
        let raw = stmt
            .query_map([id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(raw.len());
        for (code, value) in raw {
            match MetadataIntType::try_from(code) {
                Ok(kind) => rows.push(MetaDataIntegerRow { id, kind, value }),
                Err(_) => warn!(track_id = id, code, "skipping unknown MetaDataInteger type"),
            }
        }
        Ok(rows)
    }

    /// Get the decoded performance data of a track.
    ///
    /// A track without a `PerformanceData` row reports an unanalysed default.
    pub fn get_performance_data(&self, id: i64) -> Result<PerformanceDataRow> {
        let has_rekordbox = self.perf_sql.has_rekordbox_values;
        let has_traktor = self.perf_sql.has_traktor_values;
        let mut stmt = self.conn.prepare_cached(&self.perf_sql.select)?;
        let raw = stmt
            .query_row([id], |row| {
                Ok(RawPerformanceData {
                    is_analyzed: flag(row, 1)?,
                    is_rendered: flag(row, 2)?,
                    blobs: [
                        blob(row, 3)?,
                        blob(row, 4)?,
                        blob(row, 5)?,
                        blob(row, 6)?,
                        blob(row, 7)?,
                        blob(row, 8)?,
                    ],
                    has_serato_values: flag(row, 9)?,
                    has_rekordbox_values: if has_rekordbox { Some(flag(row, 10)?) } else { None },
                    has_traktor_values: if has_traktor { Some(flag(row, 11)?) } else { None },
                })
            })
            .optional()?;

        let Some(raw) = raw else {
            return Ok(PerformanceDataRow::new(id));
        };
        let [track_data, high_res, overview, beat_data, quick_cues, loops] = raw.blobs;
        Ok(PerformanceDataRow {
            id,
            is_analyzed: raw.is_analyzed,
            is_rendered: raw.is_rendered,
            track_data: TrackData::decode(&track_data)?,
            high_res_waveform: HighResWaveformData::decode(&high_res)?,
            overview_waveform: OverviewWaveformData::decode(&overview)?,
            beat_data: BeatData::decode(&beat_data)?,
            quick_cues: QuickCuesData::decode(&quick_cues)?,
            loops: LoopsData::decode(&loops)?,
            has_serato_values: raw.has_serato_values,
            has_rekordbox_values: raw.has_rekordbox_values,
            has_traktor_values: raw.has_traktor_values,
        })
    }

    /// UUID of the library, as stored in the music database.
    pub fn uuid(&self) -> Result<String> {
        self.conn
            .query_row(
                "SELECT uuid FROM music.Information ORDER BY id LIMIT 1",
                [],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?
            .flatten()
            .ok_or_else(|| Error::DatabaseInconsistency("the library has no UUID".into()))
    }
}

fn single_value<T>(mut values: Vec<T>, id: i64, table: &str, code: i64) -> Result<Option<T>> {
    if values.len() > 1 {
        return Err(Error::TrackDatabaseInconsistency {
            detail: format!("More than one {table} row of type {code}"),
            track_id: id,
        });
    }
    Ok(values.pop())
}
