// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Schema registry: creation, validation and version detection.

mod model;
mod validate;
mod versions;

use std::time::SystemTime;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::system_time_to_unix;
use crate::version::{Variant, Version};

pub use model::Database;
use model::DatabaseDef;

/// The expected structure of both databases at one version.
#[derive(Debug, Clone)]
pub struct Schema {
    version: Version,
    music: DatabaseDef,
    perfdata: DatabaseDef,
}

impl Schema {
    /// Look up the schema for `version`.
    pub fn for_version(version: Version) -> Result<Self> {
        if !version.is_supported() {
            return Err(Error::UnsupportedVersion(version));
        }
        Ok(Self {
            version,
            music: versions::music(version),
            perfdata: versions::perfdata(version),
        })
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// All DDL statements, music database first.
    pub fn ddl(&self) -> Vec<String> {
        let mut ddl = self.music.ddl();
        ddl.extend(self.perfdata.ddl());
        ddl
    }

    /// Create both databases and seed their `Information` rows.
    ///
    /// A library that already has an `Information` table is validated
    /// instead, so creating over a matching library is a no-op.
    pub fn create(&self, conn: &Connection) -> Result<()> {
        if has_information(conn, Database::Music)? || has_information(conn, Database::Perfdata)? {
            debug!(version = %self.version, "schema already present, validating");
            return self.validate(conn);
        }

        let tx = conn.unchecked_transaction()?;
        for statement in self.ddl() {
            tx.execute(&statement, [])?;
        }

        let uuid = uuid::Uuid::new_v4().to_string();
        let created = system_time_to_unix(SystemTime::now());
        let (major, minor, patch) = self.version.triple();
        for database in [Database::Music, Database::Perfdata] {
            let schema = database.schema_name();
            tx.execute(
                &format!(
                    "INSERT INTO {schema}.Information \
                     ([id], [uuid], [schemaVersionMajor], [schemaVersionMinor], \
                     [schemaVersionPatch], [currentPlayedIndiciator]) \
                     VALUES (1, ?1, ?2, ?3, ?4, ?5)"
                ),
                params![uuid, major, minor, patch, created],
            )?;
            if self.version >= Version::V1_7_1 {
                tx.execute(
                    &format!(
                        "UPDATE {schema}.Information SET lastRekordBoxLibraryImportReadCounter = 0"
                    ),
                    [],
                )?;
            }
        }
        // Tracks without artwork point at this placeholder row.
        tx.execute(
            "INSERT INTO music.AlbumArt ([id], [hash], [albumArt]) VALUES (1, NULL, NULL)",
            [],
        )?;
        tx.commit()?;

        debug!(version = %self.version, %uuid, "created schema");
        Ok(())
    }

    /// Compare both attached databases against this schema.
    pub fn validate(&self, conn: &Connection) -> Result<()> {
        validate::validate_database(conn, &self.music)?;
        validate::validate_database(conn, &self.perfdata)?;
        debug!(version = %self.version, "validated schema");
        Ok(())
    }
}

fn has_information(conn: &Connection, database: Database) -> Result<bool> {
    let sql = format!(
        "SELECT COUNT(*) FROM {}.sqlite_master WHERE type = 'table' AND name = 'Information'",
        database.schema_name()
    );
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count > 0)
}

fn stored_triple(conn: &Connection, database: Database) -> Result<(u32, u32, u32)> {
    let sql = format!(
        "SELECT schemaVersionMajor, schemaVersionMinor, schemaVersionPatch \
         FROM {}.Information ORDER BY id LIMIT 1",
        database.schema_name()
    );
    let triple: Option<(i64, i64, i64)> = conn
        .query_row(&sql, [], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .optional()?;
    let component = |n: i64| {
        u32::try_from(n).map_err(|_| {
            Error::DatabaseInconsistency(format!(
                "invalid schema version component {n} in the {} database",
                database.schema_name()
            ))
        })
    };
    match triple {
        Some((major, minor, patch)) => Ok((component(major)?, component(minor)?, component(patch)?)),
        None => Err(Error::DatabaseInconsistency(format!(
            "the {} database has no `Information` row",
            database.schema_name()
        ))),
    }
}

/// Declared type of `music.Track.isExternalTrack`, if the column exists.
fn external_track_affinity(conn: &Connection) -> Result<Option<String>> {
    let ty = conn
        .query_row(
            "SELECT type FROM pragma_table_info('Track', 'music') WHERE name = 'isExternalTrack'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(ty)
}

/// Determine the schema version of an attached library.
///
/// Both databases must carry an `Information` table stating the same version
/// triple. A stated 1.18.0 is resolved to its variant from the declared type
/// of `Track.isExternalTrack`.
pub(crate) fn detect_version(conn: &Connection) -> Result<Version> {
    if !has_information(conn, Database::Music)? || !has_information(conn, Database::Perfdata)? {
        return Err(Error::DatabaseInconsistency(
            "did not find an `Information` table for both the music and performance databases"
                .into(),
        ));
    }

    let music = stored_triple(conn, Database::Music)?;
    let perfdata = stored_triple(conn, Database::Perfdata)?;
    if music != perfdata {
        return Err(Error::DatabaseInconsistency(format!(
            "schema versions differ: music database states {}.{}.{}, performance database states {}.{}.{}",
            music.0, music.1, music.2, perfdata.0, perfdata.1, perfdata.2
        )));
    }

    let (major, minor, patch) = music;
    let mut version = Version::new(major, minor, patch);
    if music == Version::V1_18_0_EP.triple() {
        let variant = match external_track_affinity(conn)?.as_deref() {
            Some("NUMERIC") => Variant::Ep,
            Some("INTEGER") => Variant::Fw,
            other => {
                return Err(Error::DatabaseInconsistency(format!(
                    "cannot resolve the 1.18.0 variant from Track.isExternalTrack type {other:?}"
                )));
            }
        };
        version.variant = Some(variant);
    }

    if !version.is_supported() {
        return Err(Error::UnsupportedVersion(version));
    }
    debug!(%version, "detected schema version");
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn attached() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("ATTACH ':memory:' AS music; ATTACH ':memory:' AS perfdata;")
            .unwrap();
        conn
    }

    fn mismatch(err: Error) -> (String, String, String) {
        match err {
            Error::SchemaMismatch {
                database,
                object,
                detail,
            } => (database, object, detail),
            other => panic!("expected schema mismatch, got {other}"),
        }
    }

    #[rstest]
    fn test_create_then_validate(#[values(
        Version::V1_6_0, Version::V1_7_1, Version::V1_9_1, Version::V1_11_1,
        Version::V1_13_0, Version::V1_13_1, Version::V1_13_2, Version::V1_15_0,
        Version::V1_17_0, Version::V1_18_0_EP, Version::V1_18_0_FW
    )] version: Version) {
        let conn = attached();
        let schema = Schema::for_version(version).unwrap();
        schema.create(&conn).unwrap();
        schema.validate(&conn).unwrap();
        assert_eq!(detect_version(&conn).unwrap(), version);
        // A second create only validates.
        schema.create(&conn).unwrap();
    }

    #[test]
    fn test_other_version_does_not_validate() {
        let conn = attached();
        Schema::for_version(Version::V1_13_2).unwrap().create(&conn).unwrap();
        let err = Schema::for_version(Version::V1_15_0)
            .unwrap()
            .validate(&conn)
            .unwrap_err();
        assert_eq!(
            mismatch(err),
            ("music".into(), "Track.fileBytes".into(), "missing".into())
        );
    }

    #[test]
    fn test_changed_column_type() {
        let mut schema = Schema::for_version(Version::V1_6_0).unwrap();
        let conn = attached();
        schema.create(&conn).unwrap();
        schema.music.set_column_type("Track", "bpm", "REAL");
        let err = schema.validate(&conn).unwrap_err();
        assert_eq!(
            mismatch(err),
            (
                "music".into(),
                "Track.bpm".into(),
                "wrong type: INTEGER, expected REAL".into()
            )
        );
    }

    #[test]
    fn test_dropped_index() {
        let conn = attached();
        let schema = Schema::for_version(Version::V1_18_0_FW).unwrap();
        schema.create(&conn).unwrap();
        conn.execute_batch("DROP INDEX perfdata.index_PerformanceData_isRendered")
            .unwrap();
        let err = schema.validate(&conn).unwrap_err();
        assert_eq!(
            mismatch(err),
            (
                "perfdata".into(),
                "index_PerformanceData_isRendered".into(),
                "missing".into()
            )
        );
    }

    #[test]
    fn test_reordered_index_columns() {
        let conn = attached();
        let schema = Schema::for_version(Version::V1_13_1).unwrap();
        schema.create(&conn).unwrap();
        conn.execute_batch(
            "DROP INDEX music.index_MetaData_id_type; \
             CREATE INDEX music.index_MetaData_id_type ON MetaData ( type, id );",
        )
        .unwrap();
        let err = schema.validate(&conn).unwrap_err();
        assert_eq!(
            mismatch(err),
            (
                "music".into(),
                "index_MetaData_id_type.id".into(),
                "wrong order".into()
            )
        );
    }

    #[test]
    fn test_unique_index() {
        let conn = attached();
        let schema = Schema::for_version(Version::V1_6_0).unwrap();
        schema.create(&conn).unwrap();
        conn.execute_batch(
            "DROP INDEX music.index_Crate_title; \
             CREATE UNIQUE INDEX music.index_Crate_title ON Crate ( title );",
        )
        .unwrap();
        let (_, object, detail) = mismatch(schema.validate(&conn).unwrap_err());
        assert_eq!((object.as_str(), detail.as_str()), ("index_Crate_title", "wrong uniqueness"));
    }

    #[test]
    fn test_extra_table_and_trigger() {
        let conn = attached();
        let schema = Schema::for_version(Version::V1_17_0).unwrap();
        schema.create(&conn).unwrap();
        conn.execute_batch("CREATE TABLE perfdata.Extra (x INTEGER)").unwrap();
        let (database, object, detail) = mismatch(schema.validate(&conn).unwrap_err());
        assert_eq!((database.as_str(), object.as_str(), detail.as_str()), ("perfdata", "Extra", "unexpected"));

        conn.execute_batch(
            "DROP TABLE perfdata.Extra; DROP TRIGGER music.trigger_after_delete_Track;",
        )
        .unwrap();
        let (_, object, detail) = mismatch(schema.validate(&conn).unwrap_err());
        assert_eq!((object.as_str(), detail.as_str()), ("trigger_after_delete_Track", "missing"));
    }

    #[test]
    fn test_changed_trigger_body() {
        let conn = attached();
        let schema = Schema::for_version(Version::V1_17_0).unwrap();
        schema.create(&conn).unwrap();
        conn.execute_batch(
            "DROP TRIGGER music.trigger_after_delete_Track; \
             CREATE TRIGGER music.trigger_after_delete_Track AFTER DELETE ON Track \
             FOR EACH ROW BEGIN DELETE FROM MetaData WHERE id = old.id; END",
        )
        .unwrap();
        let (_, object, detail) = mismatch(schema.validate(&conn).unwrap_err());
        assert_eq!(
            (object.as_str(), detail.as_str()),
            ("trigger_after_delete_Track", "wrong definition")
        );

        // Layout differences alone are accepted.
        conn.execute_batch(
            "DROP TRIGGER music.trigger_after_delete_Track; \
             CREATE TRIGGER music.trigger_after_delete_Track\n  AFTER DELETE ON Track\n\
             FOR EACH ROW\nBEGIN\n  DELETE FROM MetaData WHERE id = old.id;\n  \
             DELETE FROM MetaDataInteger WHERE id = old.id;\nEND",
        )
        .unwrap();
        schema.validate(&conn).unwrap();
    }

    #[test]
    fn test_partial_create_fails() {
        let conn = attached();
        conn.execute_batch("CREATE TABLE music.Track (id INTEGER)").unwrap();
        let schema = Schema::for_version(Version::V1_6_0).unwrap();
        assert!(matches!(schema.create(&conn), Err(Error::Sqlite(_))));
        // Nothing from the failed attempt survives.
        assert!(!has_information(&conn, Database::Music).unwrap());
    }

    #[test]
    fn test_version_mismatch_between_databases() {
        let conn = attached();
        Schema::for_version(Version::V1_9_1).unwrap().create(&conn).unwrap();
        conn.execute_batch("UPDATE perfdata.Information SET schemaVersionMinor = 11")
            .unwrap();
        assert!(matches!(
            detect_version(&conn),
            Err(Error::DatabaseInconsistency(_))
        ));
    }

    #[test]
    fn test_missing_information() {
        let conn = attached();
        assert!(matches!(
            detect_version(&conn),
            Err(Error::DatabaseInconsistency(_))
        ));
    }

    #[test]
    fn test_unsupported() {
        assert!(matches!(
            Schema::for_version(Version::new(1, 12, 2)),
            Err(Error::UnsupportedVersion(_))
        ));
    }
}
