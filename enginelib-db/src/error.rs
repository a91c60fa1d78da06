// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Error types for library database operations.

use std::path::PathBuf;

use enginelib_perfdata::DecodeError;
use thiserror::Error;

use crate::version::Version;

/// Result type for library database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during library database operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to open or attach a database file
    #[error("Failed to open database at '{path}': {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Library directory or database file not found
    #[error("Database not found at: {0}")]
    DatabaseNotFound(PathBuf),

    /// Failed to create the library directory
    #[error("Failed to create directory '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The music and performance databases disagree or lack required state
    #[error("Database inconsistency: {0}")]
    DatabaseInconsistency(String),

    /// The on-disk schema differs from the expected schema
    #[error("Schema mismatch in {database} database, {object}: {detail}")]
    SchemaMismatch {
        database: String,
        object: String,
        detail: String,
    },

    /// Rows that the primary key should keep unique are duplicated
    #[error("Track {track_id} is inconsistent: {detail}")]
    TrackDatabaseInconsistency { detail: String, track_id: i64 },

    /// Track does not exist
    #[error("Track {0} does not exist")]
    TrackDeleted(i64),

    /// Crate does not exist
    #[error("Crate {0} does not exist")]
    CrateDeleted(i64),

    /// A crate cannot be moved below itself or one of its descendants
    #[error("Crate {parent} cannot become the parent of crate {id}")]
    InvalidCrateParent { id: i64, parent: i64 },

    /// An analysis blob could not be decoded
    #[error("Invalid performance data: {0}")]
    Decode(#[from] DecodeError),

    /// No schema is known for this version
    #[error("Unsupported schema version: {0}")]
    UnsupportedVersion(Version),
}

impl Error {
    pub(crate) fn schema_mismatch(
        database: &str,
        object: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::SchemaMismatch {
            database: database.to_owned(),
            object: object.into(),
            detail: detail.into(),
        }
    }
}
