// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Version-gated column lists for the `Track` and `PerformanceData` tables.

use rusqlite::{Row, ToSql};

use crate::types::TrackRow;
use crate::version::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrackColumn {
    PlayOrder,
    Length,
    LengthCalculated,
    Bpm,
    Year,
    Path,
    Filename,
    Bitrate,
    BpmAnalyzed,
    TrackType,
    IsExternalTrack,
    UuidOfExternalDatabase,
    IdTrackInExternalDatabase,
    IdAlbumArt,
    FileBytes,
    PdbImportKey,
    Uri,
    IsBeatGridLocked,
}

impl TrackColumn {
    /// Every column in statement order.
    const ALL: [TrackColumn; 18] = [
        Self::PlayOrder,
        Self::Length,
        Self::LengthCalculated,
        Self::Bpm,
        Self::Year,
        Self::Path,
        Self::Filename,
        Self::Bitrate,
        Self::BpmAnalyzed,
        Self::TrackType,
        Self::IsExternalTrack,
        Self::UuidOfExternalDatabase,
        Self::IdTrackInExternalDatabase,
        Self::IdAlbumArt,
        Self::FileBytes,
        Self::PdbImportKey,
        Self::Uri,
        Self::IsBeatGridLocked,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::PlayOrder => "playOrder",
            Self::Length => "length",
            Self::LengthCalculated => "lengthCalculated",
            Self::Bpm => "bpm",
            Self::Year => "year",
            Self::Path => "path",
            Self::Filename => "filename",
            Self::Bitrate => "bitrate",
            Self::BpmAnalyzed => "bpmAnalyzed",
            Self::TrackType => "trackType",
            Self::IsExternalTrack => "isExternalTrack",
            Self::UuidOfExternalDatabase => "uuidOfExternalDatabase",
            Self::IdTrackInExternalDatabase => "idTrackInExternalDatabase",
            Self::IdAlbumArt => "idAlbumArt",
            Self::FileBytes => "fileBytes",
            Self::PdbImportKey => "pdbImportKey",
            Self::Uri => "uri",
            Self::IsBeatGridLocked => "isBeatGridLocked",
        }
    }

    /// First version whose `Track` table has this column.
    pub fn since(self) -> Version {
        match self {
            Self::FileBytes | Self::Uri => Version::V1_15_0,
            Self::PdbImportKey => Version::V1_7_1,
            Self::IsBeatGridLocked => Version::V1_18_0_FW,
            _ => Version::V1_6_0,
        }
    }

    fn value(self, row: &TrackRow) -> &dyn ToSql {
        match self {
            Self::PlayOrder => &row.play_order,
            Self::Length => &row.length,
            Self::LengthCalculated => &row.length_calculated,
            Self::Bpm => &row.bpm,
            Self::Year => &row.year,
            Self::Path => &row.relative_path,
            Self::Filename => &row.filename,
            Self::Bitrate => &row.bitrate,
            Self::BpmAnalyzed => &row.bpm_analyzed,
            Self::TrackType => &row.track_type,
            Self::IsExternalTrack => &row.is_external_track,
            Self::UuidOfExternalDatabase => &row.uuid_of_external_database,
            Self::IdTrackInExternalDatabase => &row.id_track_in_external_database,
            Self::IdAlbumArt => &row.album_art_id,
            Self::FileBytes => &row.file_bytes,
            Self::PdbImportKey => &row.pdb_import_key,
            Self::Uri => &row.uri,
            Self::IsBeatGridLocked => &row.is_beatgrid_locked,
        }
    }

    fn read(self, row: &Row<'_>, idx: usize, out: &mut TrackRow) -> rusqlite::Result<()> {
        match self {
            Self::PlayOrder => out.play_order = row.get(idx)?,
            Self::Length => out.length = row.get(idx)?,
            Self::LengthCalculated => out.length_calculated = row.get(idx)?,
            Self::Bpm => out.bpm = row.get(idx)?,
            Self::Year => out.year = row.get(idx)?,
            Self::Path => out.relative_path = row.get(idx)?,
            Self::Filename => out.filename = row.get(idx)?,
            Self::Bitrate => out.bitrate = row.get(idx)?,
            Self::BpmAnalyzed => out.bpm_analyzed = row.get(idx)?,
            Self::TrackType => out.track_type = row.get(idx)?,
            Self::IsExternalTrack => out.is_external_track = row.get(idx)?,
            Self::UuidOfExternalDatabase => out.uuid_of_external_database = row.get(idx)?,
            Self::IdTrackInExternalDatabase => out.id_track_in_external_database = row.get(idx)?,
            Self::IdAlbumArt => out.album_art_id = row.get(idx)?,
            Self::FileBytes => out.file_bytes = row.get(idx)?,
            Self::PdbImportKey => out.pdb_import_key = row.get(idx)?,
            Self::Uri => out.uri = row.get(idx)?,
            Self::IsBeatGridLocked => out.is_beatgrid_locked = row.get(idx)?,
        }
        Ok(())
    }
}

/// `Track` statements for one schema version, built once per connection.
#[derive(Debug, Clone)]
pub(crate) struct TrackSql {
    columns: Vec<TrackColumn>,
    /// `?1..?n` are the columns, in order
    pub insert: String,
    /// `?1` is the track id
    pub select: String,
    /// `?1..?n` are the columns, `?n+1` is the track id
    pub update: String,
}

impl TrackSql {
    pub fn new(version: Version) -> Self {
        let columns: Vec<TrackColumn> = TrackColumn::ALL
            .into_iter()
            .filter(|c| version >= c.since())
            .collect();
        let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let assignments: Vec<String> = names
            .iter()
            .zip(&placeholders)
            .map(|(name, p)| format!("{name} = {p}"))
            .collect();

        Self {
            insert: format!(
                "INSERT INTO music.Track ({}) VALUES ({})",
                names.join(", "),
                placeholders.join(", ")
            ),
            select: format!("SELECT {} FROM music.Track WHERE id = ?1", names.join(", ")),
            update: format!(
                "UPDATE music.Track SET {} WHERE id = ?{}",
                assignments.join(", "),
                columns.len() + 1
            ),
            columns,
        }
    }

    /// Parameters for [`Self::insert`], and for [`Self::update`] before the id.
    pub fn params<'a>(&'a self, row: &'a TrackRow) -> impl Iterator<Item = &'a dyn ToSql> + 'a {
        self.columns.iter().map(move |c| c.value(row))
    }

    /// Read a row produced by [`Self::select`].
    pub fn read(&self, row: &Row<'_>) -> rusqlite::Result<TrackRow> {
        let mut out = TrackRow::default();
        for (idx, column) in self.columns.iter().enumerate() {
            column.read(row, idx, &mut out)?;
        }
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }
}

/// `PerformanceData` statements for one schema version.
#[derive(Debug, Clone)]
pub(crate) struct PerformanceSql {
    pub has_rekordbox_values: bool,
    pub has_traktor_values: bool,
    /// `?1` is the track id
    pub select: String,
    /// Parameters follow the selected column order, starting with the id
    pub upsert: String,
}

const PERFORMANCE_COLUMNS: [&str; 10] = [
    "id",
    "isAnalyzed",
    "isRendered",
    "trackData",
    "highResolutionWaveFormData",
    "overviewWaveFormData",
    "beatData",
    "quickCues",
    "loops",
    "hasSeratoValues",
];

impl PerformanceSql {
    pub fn new(version: Version) -> Self {
        let has_rekordbox_values = version >= Version::V1_7_1;
        let has_traktor_values = version >= Version::V1_11_1;
        let mut names: Vec<&str> = PERFORMANCE_COLUMNS.to_vec();
        if has_rekordbox_values {
            names.push("hasRekordboxValues");
        }
        if has_traktor_values {
            names.push("hasTraktorValues");
        }
        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{i}")).collect();

        Self {
            has_rekordbox_values,
            has_traktor_values,
            select: format!(
                "SELECT {} FROM perfdata.PerformanceData WHERE id = ?1",
                names.join(", ")
            ),
            upsert: format!(
                "REPLACE INTO perfdata.PerformanceData ({}) VALUES ({})",
                names.join(", "),
                placeholders.join(", ")
            ),
        }
    }
}
