// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Library connection management.
//!
//! A library is a directory holding `m.db` and `p.db`. Both are attached to
//! one in-memory connection as `music` and `perfdata`, so every statement
//! names the database it targets.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, Transaction};
use tracing::debug;

use crate::columns::{PerformanceSql, TrackSql};
use crate::error::{Error, Result};
use crate::schema::{self, Database, Schema};
use crate::version::Version;

/// How to open a library directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Open an existing library, detecting its version
    Load,
    /// Create a library at this version, or validate an existing one against it
    Create(Version),
    /// Load the library if both database files exist, otherwise create it
    CreateOrLoad(Version),
}

/// Storage gateway over an attached pair of library databases.
pub struct StorageGateway {
    pub(crate) conn: Connection,
    directory: Option<PathBuf>,
    schema: Schema,
    created: bool,
    pub(crate) track_sql: TrackSql,
    pub(crate) perf_sql: PerformanceSql,
}

/// Path of `database` inside a library directory.
pub fn database_path<P: AsRef<Path>>(directory: P, database: Database) -> PathBuf {
    directory.as_ref().join(database.file_name())
}

/// Whether both database files of a library exist in `directory`.
pub fn database_exists<P: AsRef<Path>>(directory: P) -> bool {
    let directory = directory.as_ref();
    [Database::Music, Database::Perfdata]
        .into_iter()
        .all(|db| database_path(directory, db).is_file())
}

impl StorageGateway {
    /// Open a library directory.
    pub fn open<P: AsRef<Path>>(directory: P, mode: OpenMode) -> Result<Self> {
        let directory = directory.as_ref();
        match mode {
            OpenMode::Load => Self::load(directory),
            OpenMode::Create(version) => Self::create(directory, version),
            OpenMode::CreateOrLoad(version) => {
                if database_exists(directory) {
                    Self::load(directory)
                } else {
                    Self::create(directory, version)
                }
            }
        }
    }

    /// Create a library held entirely in memory.
    pub fn open_memory(version: Version) -> Result<Self> {
        let schema = Schema::for_version(version)?;
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("ATTACH DATABASE ':memory:' AS music; ATTACH DATABASE ':memory:' AS perfdata;")?;
        configure_pragmas(&conn)?;
        schema.create(&conn)?;
        debug!(%version, "created in-memory library");
        Ok(Self::new(conn, None, schema, true))
    }

    fn load(directory: &Path) -> Result<Self> {
        if !directory.is_dir() {
            return Err(Error::DatabaseNotFound(directory.to_owned()));
        }
        for database in [Database::Music, Database::Perfdata] {
            let path = database_path(directory, database);
            if !path.is_file() {
                return Err(Error::DatabaseNotFound(path));
            }
        }

        let conn = attach(directory)?;
        let version = schema::detect_version(&conn)?;
        let schema = Schema::for_version(version)?;
        schema.validate(&conn)?;
        debug!(directory = %directory.display(), %version, "loaded library");
        Ok(Self::new(conn, Some(directory.to_owned()), schema, false))
    }

    fn create(directory: &Path, version: Version) -> Result<Self> {
        let schema = Schema::for_version(version)?;
        if !directory.exists() {
            std::fs::create_dir(directory).map_err(|source| Error::Io {
                path: directory.to_owned(),
                source,
            })?;
        }

        let conn = attach(directory)?;
        schema.create(&conn)?;
        debug!(directory = %directory.display(), %version, "created library");
        Ok(Self::new(conn, Some(directory.to_owned()), schema, true))
    }

    fn new(conn: Connection, directory: Option<PathBuf>, schema: Schema, created: bool) -> Self {
        let version = schema.version();
        Self {
            conn,
            directory,
            schema,
            created,
            track_sql: TrackSql::new(version),
            perf_sql: PerformanceSql::new(version),
        }
    }

    /// Schema version of the library.
    pub fn version(&self) -> Version {
        self.schema.version()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Library directory, `None` for in-memory libraries.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Whether opening this gateway created the schema.
    pub fn was_created(&self) -> bool {
        self.created
    }

    /// Re-validate both databases against the schema.
    pub fn validate(&self) -> Result<()> {
        self.schema.validate(&self.conn)
    }

    /// Get raw connection (for advanced usage).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction spanning both databases.
    ///
    /// Gateway operations called while it is open join it rather than
    /// committing on their own. Dropping it without commit rolls back.
    pub fn transaction(&self) -> Result<Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Run `f` atomically, joining an enclosing transaction if one is open.
    pub fn in_transaction<T, E>(
        &self,
        f: impl FnOnce(&Connection) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<Error>,
    {
        if !self.conn.is_autocommit() {
            return f(&self.conn);
        }
        let tx = self.conn.unchecked_transaction().map_err(Error::from)?;
        let value = f(&tx)?;
        tx.commit().map_err(Error::from)?;
        Ok(value)
    }
}

fn attach(directory: &Path) -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    for database in [Database::Music, Database::Perfdata] {
        let path = database_path(directory, database);
        conn.execute(
            &format!("ATTACH DATABASE ?1 AS {}", database.schema_name()),
            [path.to_string_lossy()],
        )
        .map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
    }
    configure_pragmas(&conn)?;
    Ok(conn)
}

/// Engine hardware reads the files directly, so stay in rollback-journal mode.
fn configure_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA temp_store = MEMORY;
        PRAGMA music.synchronous = FULL;
        PRAGMA perfdata.synchronous = FULL;
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_memory() {
        let gw = StorageGateway::open_memory(Version::V1_17_0).unwrap();
        assert_eq!(gw.version(), Version::V1_17_0);
        assert!(gw.directory().is_none());
        assert!(gw.was_created());
        gw.validate().unwrap();
    }

    #[test]
    fn test_nested_transaction_joins() {
        let gw = StorageGateway::open_memory(Version::V1_6_0).unwrap();
        let tx = gw.transaction().unwrap();
        gw.in_transaction(|conn| {
            conn.execute("INSERT INTO music.Crate (title, path) VALUES ('a', 'a;')", [])?;
            Ok::<_, Error>(())
        })
        .unwrap();
        drop(tx);
        let count: i64 = gw
            .connection()
            .query_row("SELECT COUNT(*) FROM music.Crate", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_unsupported_version() {
        let err = StorageGateway::open_memory(Version::new(1, 14, 5)).err().unwrap();
        assert!(matches!(err, Error::UnsupportedVersion(_)));
    }
}
