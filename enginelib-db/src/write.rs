// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Write operations.

use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use tracing::debug;

use crate::connection::StorageGateway;
use crate::error::{Error, Result};
use crate::metadata::{MetadataIntType, MetadataStrType, TrackIntegerMetadata, TrackMetadata};
use crate::types::{PerformanceDataRow, TrackRow};

/// Tables whose rows hang off a track id in the music database.
const TRACK_CHILD_TABLES: [(&str, &str); 7] = [
    ("MetaData", "id"),
    ("MetaDataInteger", "id"),
    ("PlaylistTrackList", "trackId"),
    ("PreparelistTrackList", "trackId"),
    ("HistorylistTrackList", "trackId"),
    ("CrateTrackList", "trackId"),
    ("CopiedTrack", "trackId"),
];

/// `INSERT OR REPLACE` of `rows` (id, type, value) triples in one statement.
fn batch_sql(table: &str, value_column: &str, rows: usize) -> String {
    let values: Vec<String> = (0..rows)
        .map(|i| format!("(?{}, ?{}, ?{})", 3 * i + 1, 3 * i + 2, 3 * i + 3))
        .collect();
    format!(
        "INSERT OR REPLACE INTO music.{table} (id, type, {value_column}) VALUES {}",
        values.join(", ")
    )
}

fn blob_value(blob: Vec<u8>) -> Value {
    if blob.is_empty() {
        Value::Null
    } else {
        Value::Blob(blob)
    }
}

fn ensure_track(conn: &Connection, id: i64) -> Result<()> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM music.Track WHERE id = ?1")?;
    if stmt.exists([id])? {
        Ok(())
    } else {
        Err(Error::TrackDeleted(id))
    }
}

impl StorageGateway {
    /// Insert a track, returning its new id.
    pub fn create_track(&self, row: &TrackRow) -> Result<i64> {
        let mut stmt = self.conn.prepare_cached(&self.track_sql.insert)?;
        stmt.execute(params_from_iter(self.track_sql.params(row)))?;
        let id = self.conn.last_insert_rowid();
        debug!(track_id = id, "created track");
        Ok(id)
    }

    /// Overwrite every column of an existing track.
    pub fn update_track(&self, id: i64, row: &TrackRow) -> Result<()> {
        let mut params: Vec<&dyn rusqlite::ToSql> = Vec::with_capacity(self.track_sql.len() + 1);
        params.extend(self.track_sql.params(row));
        params.push(&id);
        let mut stmt = self.conn.prepare_cached(&self.track_sql.update)?;
        if stmt.execute(params.as_slice())? == 0 {
            return Err(Error::TrackDeleted(id));
        }
        Ok(())
    }

    /// Delete a track with its metadata, list memberships and performance data.
    pub fn delete_track(&self, id: i64) -> Result<()> {
        self.in_transaction(|conn| {
            ensure_track(conn, id)?;
            for (table, column) in TRACK_CHILD_TABLES {
                conn.execute(&format!("DELETE FROM music.{table} WHERE {column} = ?1"), [id])?;
            }
            conn.execute("DELETE FROM perfdata.PerformanceData WHERE id = ?1", [id])?;
            conn.execute("DELETE FROM music.Track WHERE id = ?1", [id])?;
            debug!(track_id = id, "deleted track");
            Ok(())
        })
    }

    /// Set one string metadata value; `None` stores a NULL row.
    pub fn set_meta_data(&self, id: i64, kind: MetadataStrType, text: Option<&str>) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare_cached("REPLACE INTO music.MetaData (id, type, text) VALUES (?1, ?2, ?3)")?;
        stmt.execute(params![id, i64::from(kind), text])?;
        Ok(())
    }

    /// Write every string metadata row of a track in one statement.
    pub fn set_meta_data_batch(&self, id: i64, metadata: &TrackMetadata) -> Result<()> {
        let rows = metadata.rows();
        let mut values = Vec::with_capacity(rows.len() * 3);
        for (kind, text) in rows {
            values.push(Value::Integer(id));
            values.push(Value::Integer(kind.into()));
            values.push(text.map_or(Value::Null, |t| Value::Text(t.to_owned())));
        }
        let mut stmt = self
            .conn
            .prepare_cached(&batch_sql("MetaData", "text", rows.len()))?;
        stmt.execute(params_from_iter(values))?;
        Ok(())
    }

    /// Set one integer metadata value; `None` stores a NULL row.
    pub fn set_meta_data_integer(
        &self,
        id: i64,
        kind: MetadataIntType,
        value: Option<i64>,
    ) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "REPLACE INTO music.MetaDataInteger (id, type, value) VALUES (?1, ?2, ?3)",
        )?;
        stmt.execute(params![id, i64::from(kind), value])?;
        Ok(())
    }

    /// Write every integer metadata row of a track in one statement.
    pub fn set_meta_data_integer_batch(
        &self,
        id: i64,
        metadata: &TrackIntegerMetadata,
    ) -> Result<()> {
        let rows = metadata.rows();
        let mut values = Vec::with_capacity(rows.len() * 3);
        for (kind, value) in rows {
            values.push(Value::Integer(id));
            values.push(Value::Integer(kind.into()));
            values.push(value.map_or(Value::Null, Value::Integer));
        }
        let mut stmt = self
            .conn
            .prepare_cached(&batch_sql("MetaDataInteger", "value", rows.len()))?;
        stmt.execute(params_from_iter(values))?;
        Ok(())
    }

    /// Replace the performance data of an existing track.
    ///
    /// Empty analysis values are stored as NULL blobs.
    pub fn set_performance_data(&self, data: &PerformanceDataRow) -> Result<()> {
        ensure_track(&self.conn, data.id)?;
        let mut values = vec![
            Value::Integer(data.id),
            Value::Integer(data.is_analyzed),
            Value::Integer(data.is_rendered),
            blob_value(data.track_data.encode()),
            blob_value(data.high_res_waveform.encode()),
            blob_value(data.overview_waveform.encode()),
            blob_value(data.beat_data.encode()),
            blob_value(data.quick_cues.encode()),
            blob_value(data.loops.encode()),
            Value::Integer(data.has_serato_values),
        ];
        if self.perf_sql.has_rekordbox_values {
            values.push(Value::Integer(data.has_rekordbox_values.unwrap_or(0)));
        }
        if self.perf_sql.has_traktor_values {
            values.push(Value::Integer(data.has_traktor_values.unwrap_or(0)));
        }
        let mut stmt = self.conn.prepare_cached(&self.perf_sql.upsert)?;
        stmt.execute(params_from_iter(values))?;
        Ok(())
    }

    /// Remove the performance data row of a track, if any.
    pub fn clear_performance_data(&self, id: i64) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare_cached("DELETE FROM perfdata.PerformanceData WHERE id = ?1")?;
        stmt.execute([id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_sql() {
        assert_eq!(
            batch_sql("MetaData", "text", 2),
            "INSERT OR REPLACE INTO music.MetaData (id, type, text) VALUES (?1, ?2, ?3), (?4, ?5, ?6)"
        );
    }
}
