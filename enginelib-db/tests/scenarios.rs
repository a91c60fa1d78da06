// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! End-to-end storage scenarios.

use enginelib_db::{
    Error, MetadataStrType, PerformanceDataRow, StorageGateway, TrackMetadata, TrackRow, Version,
};

fn count(gw: &StorageGateway, sql: &str, id: i64) -> i64 {
    gw.connection().query_row(sql, [id], |r| r.get(0)).unwrap()
}

#[test]
fn test_first_track_on_empty_library() {
    let gw = StorageGateway::open_memory(Version::V1_15_0).unwrap();
    let id = gw
        .create_track(&TrackRow {
            play_order: None,
            length: Some(210),
            filename: Some("a.flac".into()),
            uri: Some("file:///a.flac".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(id, 1);
    assert_eq!(gw.get_track(1).unwrap().uri.as_deref(), Some("file:///a.flac"));
}

#[test]
fn test_string_metadata_batch() {
    let gw = StorageGateway::open_memory(Version::V1_15_0).unwrap();
    let id = gw.create_track(&TrackRow::default()).unwrap();
    gw.set_meta_data_batch(
        id,
        &TrackMetadata {
            title: Some("T".into()),
            artist: Some("A".into()),
            duration_mm_ss: Some("03:30".into()),
            ever_played: Some("1".into()),
            file_extension: Some("flac".into()),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(count(&gw, "SELECT COUNT(*) FROM music.MetaData WHERE id = ?1", id), 15);
    for kind in [MetadataStrType::Unknown15, MetadataStrType::Unknown16] {
        assert_eq!(gw.get_meta_data(id, kind).unwrap().as_deref(), Some("1"));
    }
    assert_eq!(gw.get_meta_data(id, MetadataStrType::Album).unwrap(), None);
    assert_eq!(
        gw.get_meta_data(id, MetadataStrType::DurationMmSs).unwrap().as_deref(),
        Some("03:30")
    );

    // Writing the batch again replaces every row.
    gw.set_meta_data_batch(id, &TrackMetadata::default()).unwrap();
    assert_eq!(count(&gw, "SELECT COUNT(*) FROM music.MetaData WHERE id = ?1", id), 15);
    assert_eq!(gw.get_meta_data(id, MetadataStrType::Title).unwrap(), None);
}

/// A `Track` table without a primary key can hold duplicate ids.
#[test]
fn test_duplicate_track_id() {
    let gw = StorageGateway::open_memory(Version::V1_15_0).unwrap();
    gw.connection()
        .execute_batch(
            "DROP TABLE music.Track;
             CREATE TABLE music.Track (
                 id INTEGER, playOrder INTEGER, length INTEGER, lengthCalculated INTEGER,
                 bpm INTEGER, year INTEGER, path TEXT, filename TEXT, bitrate INTEGER,
                 bpmAnalyzed REAL, trackType INTEGER, isExternalTrack NUMERIC,
                 uuidOfExternalDatabase TEXT, idTrackInExternalDatabase INTEGER,
                 idAlbumArt INTEGER, pdbImportKey INTEGER, fileBytes INTEGER, uri TEXT);
             INSERT INTO music.Track (id, length) VALUES (1, 100), (1, 200);",
        )
        .unwrap();

    match gw.get_track(1) {
        Err(Error::TrackDatabaseInconsistency { detail, track_id }) => {
            assert_eq!(detail, "More than one track with the same id");
            assert_eq!(track_id, 1);
        }
        other => panic!("expected inconsistency, got {other:?}"),
    }
}

#[test]
fn test_delete_track_removes_children() {
    let gw = StorageGateway::open_memory(Version::V1_13_2).unwrap();
    let id = gw.create_track(&TrackRow::default()).unwrap();
    let keep = gw.create_track(&TrackRow::default()).unwrap();
    gw.set_meta_data_batch(id, &TrackMetadata::default()).unwrap();
    gw.set_meta_data_batch(keep, &TrackMetadata::default()).unwrap();
    let mut perf = PerformanceDataRow::new(id);
    perf.is_analyzed = 1;
    gw.set_performance_data(&perf).unwrap();
    let crate_id = gw.create_crate("Box", None).unwrap();
    gw.add_track_to_crate(crate_id, id).unwrap();
    gw.add_track_to_crate(crate_id, keep).unwrap();
    gw.connection()
        .execute(
            "INSERT INTO music.PlaylistTrackList (playlistId, trackId, trackNumber) VALUES (1, ?1, 1)",
            [id],
        )
        .unwrap();

    gw.delete_track(id).unwrap();

    assert!(matches!(gw.get_track(id), Err(Error::TrackDeleted(_))));
    assert_eq!(count(&gw, "SELECT COUNT(*) FROM music.MetaData WHERE id = ?1", id), 0);
    assert_eq!(
        count(&gw, "SELECT COUNT(*) FROM perfdata.PerformanceData WHERE id = ?1", id),
        0
    );
    assert_eq!(
        count(&gw, "SELECT COUNT(*) FROM music.PlaylistTrackList WHERE trackId = ?1", id),
        0
    );
    assert_eq!(gw.crate_track_ids(crate_id).unwrap(), vec![keep]);
    assert_eq!(count(&gw, "SELECT COUNT(*) FROM music.MetaData WHERE id = ?1", keep), 15);
}

#[test]
fn test_crate_membership() {
    let gw = StorageGateway::open_memory(Version::LATEST).unwrap();
    let track = gw.create_track(&TrackRow::default()).unwrap();
    let a = gw.create_crate("A", None).unwrap();
    let b = gw.create_crate("B", None).unwrap();

    gw.add_track_to_crate(a, track).unwrap();
    gw.add_track_to_crate(a, track).unwrap();
    gw.add_track_to_crate(b, track).unwrap();
    assert_eq!(gw.crate_track_ids(a).unwrap(), vec![track]);
    assert_eq!(gw.track_crate_ids(track).unwrap(), vec![a, b]);

    gw.remove_track_from_crate(a, track).unwrap();
    assert!(gw.crate_track_ids(a).unwrap().is_empty());
    assert!(matches!(gw.add_track_to_crate(a, 99), Err(Error::TrackDeleted(99))));
    assert!(matches!(gw.add_track_to_crate(99, track), Err(Error::CrateDeleted(99))));
    assert_eq!(gw.crate_ids_by_name("B").unwrap(), vec![b]);
}
