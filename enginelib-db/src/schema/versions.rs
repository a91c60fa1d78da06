// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Per-version schema manifests.
//!
//! The 1.6.0 layout is spelled out in full; every later version is the
//! previous one plus the changes listed under its `version >=` guard.

use crate::version::Version;

use super::model::{
    ColumnDef, Database, DatabaseDef, TableDef, TriggerDef, col, column_index, id, index,
};

fn information(version: Version) -> TableDef {
    let mut columns = vec![
        id(),
        col("uuid", "TEXT"),
        col("schemaVersionMajor", "INTEGER"),
        col("schemaVersionMinor", "INTEGER"),
        col("schemaVersionPatch", "INTEGER"),
        col("currentPlayedIndiciator", "INTEGER"),
    ];
    if version >= Version::V1_7_1 {
        columns.push(col("lastRekordBoxLibraryImportReadCounter", "INTEGER"));
    }
    TableDef::new("Information", columns)
}

fn track_ref(name: &'static str) -> ColumnDef {
    col(name, "INTEGER").references("Track", "id", "CASCADE")
}

fn list_tables(db: &mut DatabaseDef, list: &'static str, track_list: &'static str) {
    let list_id = if list == "Historylist" {
        "historylistId"
    } else {
        "playlistId"
    };
    db.tables.push(TableDef::new(list, vec![id(), col("title", "TEXT")]));
    let mut columns = vec![
        col(list_id, "INTEGER").references(list, "id", "CASCADE"),
        track_ref("trackId"),
        col("trackIdInOriginDatabase", "INTEGER"),
        col("databaseUuid", "TEXT"),
    ];
    columns.push(if list == "Historylist" {
        col("date", "INTEGER")
    } else {
        col("trackNumber", "INTEGER")
    });
    db.tables.push(TableDef::new(track_list, columns));
    db.indices.push(column_index(list, "id"));
    db.indices.push(column_index(track_list, list_id));
    db.indices.push(column_index(track_list, "trackId"));
    if list == "Historylist" {
        db.indices.push(column_index(track_list, "date"));
    }
}

fn music_1_6_0() -> DatabaseDef {
    let mut db = DatabaseDef::new(Database::Music);

    db.tables.push(TableDef::new(
        "AlbumArt",
        vec![id(), col("hash", "TEXT"), col("albumArt", "BLOB")],
    ));
    db.indices.push(column_index("AlbumArt", "id"));
    db.indices.push(column_index("AlbumArt", "hash"));

    db.tables.push(TableDef::new(
        "Track",
        vec![
            id(),
            col("playOrder", "INTEGER"),
            col("length", "INTEGER"),
            col("lengthCalculated", "INTEGER"),
            col("bpm", "INTEGER"),
            col("year", "INTEGER"),
            col("path", "TEXT"),
            col("filename", "TEXT"),
            col("bitrate", "INTEGER"),
            col("bpmAnalyzed", "REAL"),
            col("trackType", "INTEGER"),
            col("isExternalTrack", "NUMERIC"),
            col("uuidOfExternalDatabase", "TEXT"),
            col("idTrackInExternalDatabase", "INTEGER"),
            col("idAlbumArt", "INTEGER").references("AlbumArt", "id", "RESTRICT"),
        ],
    ));
    for column in [
        "id",
        "path",
        "filename",
        "isExternalTrack",
        "uuidOfExternalDatabase",
        "idTrackInExternalDatabase",
        "idAlbumArt",
    ] {
        db.indices.push(column_index("Track", column));
    }

    db.tables.push(TableDef::new(
        "CopiedTrack",
        vec![
            track_ref("trackId").primary_key(1),
            col("uuidOfSourceDatabase", "TEXT"),
            col("idOfTrackInSourceDatabase", "INTEGER"),
        ],
    ));
    db.indices.push(column_index("CopiedTrack", "trackId"));

    for (table, value) in [("MetaData", ("text", "TEXT")), ("MetaDataInteger", ("value", "INTEGER"))] {
        db.tables.push(TableDef::new(
            table,
            vec![
                track_ref("id").primary_key(1),
                col("type", "INTEGER").primary_key(2),
                col(value.0, value.1),
            ],
        ));
        db.indices.push(column_index(table, "id"));
        db.indices.push(column_index(table, "type"));
        db.indices.push(column_index(table, value.0));
    }

    list_tables(&mut db, "Playlist", "PlaylistTrackList");
    list_tables(&mut db, "Preparelist", "PreparelistTrackList");
    list_tables(&mut db, "Historylist", "HistorylistTrackList");

    let crate_ref = |name| col(name, "INTEGER").references("Crate", "id", "CASCADE");
    db.tables.push(TableDef::new(
        "Crate",
        vec![id(), col("title", "TEXT"), col("path", "TEXT")],
    ));
    db.tables.push(TableDef::new(
        "CrateParentList",
        vec![crate_ref("crateOriginId"), crate_ref("crateParentId")],
    ));
    db.tables.push(TableDef::new(
        "CrateTrackList",
        vec![crate_ref("crateId"), track_ref("trackId")],
    ));
    db.tables.push(TableDef::new(
        "CrateHierarchy",
        vec![crate_ref("crateId"), crate_ref("crateIdChild")],
    ));
    for (table, column) in [
        ("Crate", "id"),
        ("Crate", "title"),
        ("Crate", "path"),
        ("CrateParentList", "crateOriginId"),
        ("CrateParentList", "crateParentId"),
        ("CrateTrackList", "crateId"),
        ("CrateTrackList", "trackId"),
        ("CrateHierarchy", "crateId"),
        ("CrateHierarchy", "crateIdChild"),
    ] {
        db.indices.push(column_index(table, column));
    }

    db
}

/// Expected structure of the music database at `version`.
pub(crate) fn music(version: Version) -> DatabaseDef {
    let mut db = music_1_6_0();
    db.tables.push(information(version));

    if version >= Version::V1_7_1 {
        db.add_column("Track", col("pdbImportKey", "INTEGER"));
    }
    if version >= Version::V1_9_1 {
        db.tables.push(TableDef::new(
            "Pack",
            vec![
                id(),
                col("packId", "TEXT"),
                col("changeLogDatabaseUuid", "TEXT"),
                col("changeLogId", "INTEGER"),
            ],
        ));
        db.indices.push(column_index("Pack", "id"));
    }
    if version >= Version::V1_13_0 {
        db.tables.push(TableDef::new(
            "ChangeLog",
            vec![id(), track_ref("trackId")],
        ));
        db.indices.push(column_index("ChangeLog", "id"));
        db.indices.push(column_index("ChangeLog", "trackId"));
    }
    if version >= Version::V1_13_1 {
        db.indices
            .push(index("index_MetaData_id_type", "MetaData", &["id", "type"]));
        db.indices.push(index(
            "index_MetaDataInteger_id_type",
            "MetaDataInteger",
            &["id", "type"],
        ));
    }
    if version >= Version::V1_13_2 {
        for list in ["Playlist", "Preparelist", "Historylist"] {
            db.indices.push(column_index(list, "title"));
        }
    }
    if version >= Version::V1_15_0 {
        db.add_column("Track", col("fileBytes", "INTEGER"));
        db.add_column("Track", col("uri", "TEXT"));
        db.indices.push(column_index("Track", "uri"));
    }
    if version >= Version::V1_17_0 {
        db.triggers.push(TriggerDef {
            name: "trigger_after_delete_Track",
            table: "Track",
            event: "AFTER DELETE",
            body: "DELETE FROM MetaData WHERE id = old.id; \
                   DELETE FROM MetaDataInteger WHERE id = old.id;",
        });
    }
    if version >= Version::V1_18_0_EP {
        db.indices.push(column_index("Track", "playOrder"));
    }
    if version >= Version::V1_18_0_FW {
        db.set_column_type("Track", "isExternalTrack", "INTEGER");
        db.add_column("Track", col("isBeatGridLocked", "INTEGER"));
    }

    db
}

/// Expected structure of the performance database at `version`.
pub(crate) fn perfdata(version: Version) -> DatabaseDef {
    let mut db = DatabaseDef::new(Database::Perfdata);
    db.tables.push(information(version));

    let mut columns = vec![
        id(),
        col("isAnalyzed", "NUMERIC"),
        col("isRendered", "NUMERIC"),
        col("trackData", "BLOB"),
        col("highResolutionWaveFormData", "BLOB"),
        col("overviewWaveFormData", "BLOB"),
        col("beatData", "BLOB"),
        col("quickCues", "BLOB"),
        col("loops", "BLOB"),
        col("hasSeratoValues", "NUMERIC"),
    ];
    if version >= Version::V1_7_1 {
        columns.push(col("hasRekordboxValues", "NUMERIC"));
    }
    if version >= Version::V1_11_1 {
        columns.push(col("hasTraktorValues", "NUMERIC"));
    }
    db.tables.push(TableDef::new("PerformanceData", columns));
    db.indices.push(column_index("PerformanceData", "id"));

    if version >= Version::V1_13_2 {
        db.indices.push(column_index("PerformanceData", "isAnalyzed"));
    }
    if version >= Version::V1_18_0_EP {
        db.indices.push(column_index("PerformanceData", "isRendered"));
    }
    if version >= Version::V1_18_0_FW {
        for column in [
            "isAnalyzed",
            "isRendered",
            "hasSeratoValues",
            "hasRekordboxValues",
            "hasTraktorValues",
        ] {
            db.set_column_type("PerformanceData", column, "INTEGER");
        }
    }

    db
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_type(db: &DatabaseDef, table: &str, column: &str) -> Option<&'static str> {
        db.table(table)?
            .columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.ty)
    }

    #[test]
    fn test_variants_differ_only_in_affinity_and_grid_lock() {
        let ep = music(Version::V1_18_0_EP);
        let fw = music(Version::V1_18_0_FW);
        assert_eq!(column_type(&ep, "Track", "isExternalTrack"), Some("NUMERIC"));
        assert_eq!(column_type(&fw, "Track", "isExternalTrack"), Some("INTEGER"));
        assert_eq!(column_type(&ep, "Track", "isBeatGridLocked"), None);
        assert_eq!(column_type(&fw, "Track", "isBeatGridLocked"), Some("INTEGER"));
        assert_eq!(ep.indices, fw.indices);
    }

    #[test]
    fn test_gated_columns() {
        let old = music(Version::V1_6_0);
        assert_eq!(column_type(&old, "Track", "uri"), None);
        assert_eq!(column_type(&old, "Information", "lastRekordBoxLibraryImportReadCounter"), None);
        let new = music(Version::V1_15_0);
        assert_eq!(column_type(&new, "Track", "uri"), Some("TEXT"));
        assert_eq!(column_type(&new, "Track", "pdbImportKey"), Some("INTEGER"));
        assert!(new.triggers.is_empty());
        assert_eq!(music(Version::V1_17_0).triggers.len(), 1);
    }

    #[test]
    fn test_perfdata_flags() {
        let p = perfdata(Version::V1_7_1);
        assert_eq!(column_type(&p, "PerformanceData", "hasRekordboxValues"), Some("NUMERIC"));
        assert_eq!(column_type(&p, "PerformanceData", "hasTraktorValues"), None);
        let fw = perfdata(Version::V1_18_0_FW);
        assert_eq!(column_type(&fw, "PerformanceData", "hasTraktorValues"), Some("INTEGER"));
    }

    #[test]
    fn test_names_are_unique() {
        for version in Version::ALL {
            for db in [music(version), perfdata(version)] {
                let mut names: Vec<String> = db.tables.iter().map(|t| t.name.to_owned()).collect();
                names.extend(db.indices.iter().map(|i| i.name.clone()));
                let len = names.len();
                names.sort();
                names.dedup();
                assert_eq!(names.len(), len, "{version} {:?}", db.database);
            }
        }
    }
}
