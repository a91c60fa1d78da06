// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Smoke tests for enginelib-db.
//!
//! These tests exercise track, metadata and performance data storage
//! using in-memory libraries.

use enginelib_db::{
    Error, MetadataIntType, MetadataStrType, PerformanceDataRow, StorageGateway,
    TrackIntegerMetadata, TrackMetadata, TrackRow, Version,
};
use enginelib_perfdata::{BeatData, BeatGridMarker, HotCue, PadColor, TrackData};
use rstest::rstest;

fn row(path: &str) -> TrackRow {
    TrackRow {
        length: Some(210),
        relative_path: Some(path.into()),
        filename: Some(path.rsplit('/').next().unwrap_or(path).into()),
        uri: Some(format!("file:///{path}")),
        ..Default::default()
    }
}

/// Verify an empty library reports no tracks.
#[test]
fn test_empty_library() {
    let gw = StorageGateway::open_memory(Version::LATEST).unwrap();
    assert!(gw.track_ids().unwrap().is_empty());
    assert!(gw.crate_ids().unwrap().is_empty());
    assert_eq!(gw.uuid().unwrap().len(), 36);
}

/// Verify track insert, read and update.
#[test_log::test]
fn test_track_roundtrip() {
    let gw = StorageGateway::open_memory(Version::V1_15_0).unwrap();
    let id = gw.create_track(&row("music/a.flac")).unwrap();
    assert_eq!(id, 1);

    let mut track = gw.get_track(id).unwrap();
    assert_eq!(track.uri.as_deref(), Some("file:///music/a.flac"));
    assert_eq!(track.length, Some(210));
    assert_eq!(track.play_order, None);

    track.bpm = Some(128);
    track.bpm_analyzed = Some(128.25);
    gw.update_track(id, &track).unwrap();
    assert_eq!(gw.get_track(id).unwrap(), track);
    assert_eq!(gw.track_ids_by_relative_path("music/a.flac").unwrap(), vec![id]);
}

/// A row with every column set.
fn full_row() -> TrackRow {
    TrackRow {
        play_order: Some(4),
        length: Some(301),
        length_calculated: Some(300),
        bpm: Some(124),
        year: Some(1999),
        relative_path: Some("../Music/full.aiff".into()),
        filename: Some("full.aiff".into()),
        bitrate: Some(1411),
        bpm_analyzed: Some(123.75),
        track_type: Some(1),
        is_external_track: Some(1),
        uuid_of_external_database: Some("5d1b1b5e-5b0c-4c5e-9d8f-2f1f4c1f0a11".into()),
        id_track_in_external_database: Some(77),
        album_art_id: Some(1),
        file_bytes: Some(53_125_000),
        pdb_import_key: Some(12),
        uri: Some("file:///Music/full.aiff".into()),
        is_beatgrid_locked: Some(1),
    }
}

/// Every column a version has reads back as written.
#[rstest]
fn test_track_roundtrip_all_versions(
    #[values(
        Version::V1_6_0,
        Version::V1_7_1,
        Version::V1_9_1,
        Version::V1_11_1,
        Version::V1_13_0,
        Version::V1_13_1,
        Version::V1_13_2,
        Version::V1_15_0,
        Version::V1_17_0,
        Version::V1_18_0_EP,
        Version::V1_18_0_FW
    )]
    version: Version,
) {
    let gw = StorageGateway::open_memory(version).unwrap();
    let written = full_row();
    let id = gw.create_track(&written).unwrap();

    let mut expected = written.clone();
    if version < Version::V1_7_1 {
        expected.pdb_import_key = None;
    }
    if version < Version::V1_15_0 {
        expected.file_bytes = None;
        expected.uri = None;
    }
    if version < Version::V1_18_0_FW {
        expected.is_beatgrid_locked = None;
    }
    assert_eq!(gw.get_track(id).unwrap(), expected);

    let mut updated = written;
    updated.bpm_analyzed = Some(90.5);
    updated.is_beatgrid_locked = Some(0);
    updated.is_external_track = Some(0);
    gw.update_track(id, &updated).unwrap();
    expected.bpm_analyzed = Some(90.5);
    expected.is_external_track = Some(0);
    if version >= Version::V1_18_0_FW {
        expected.is_beatgrid_locked = Some(0);
    }
    assert_eq!(gw.get_track(id).unwrap(), expected);
}

/// Columns the schema version lacks are dropped on write.
#[test]
fn test_gated_columns_are_dropped() {
    let gw = StorageGateway::open_memory(Version::V1_6_0).unwrap();
    let mut track = row("b.mp3");
    track.pdb_import_key = Some(3);
    track.is_beatgrid_locked = Some(1);
    let id = gw.create_track(&track).unwrap();

    let stored = gw.get_track(id).unwrap();
    assert_eq!(stored.uri, None);
    assert_eq!(stored.pdb_import_key, None);
    assert_eq!(stored.is_beatgrid_locked, None);
    assert_eq!(stored.relative_path.as_deref(), Some("b.mp3"));
}

/// Missing tracks are reported as deleted.
#[test]
fn test_missing_track() {
    let gw = StorageGateway::open_memory(Version::LATEST).unwrap();
    assert!(matches!(gw.get_track(42), Err(Error::TrackDeleted(42))));
    assert!(matches!(gw.update_track(42, &TrackRow::default()), Err(Error::TrackDeleted(42))));
    assert!(matches!(gw.delete_track(42), Err(Error::TrackDeleted(42))));
}

/// Verify single metadata writes replace rather than duplicate.
#[test]
fn test_metadata_replace() {
    let gw = StorageGateway::open_memory(Version::LATEST).unwrap();
    let id = gw.create_track(&row("c.wav")).unwrap();

    gw.set_meta_data(id, MetadataStrType::Title, Some("First")).unwrap();
    gw.set_meta_data(id, MetadataStrType::Title, Some("Second")).unwrap();
    assert_eq!(
        gw.get_meta_data(id, MetadataStrType::Title).unwrap().as_deref(),
        Some("Second")
    );

    gw.set_meta_data(id, MetadataStrType::Title, None).unwrap();
    assert_eq!(gw.get_meta_data(id, MetadataStrType::Title).unwrap(), None);

    gw.set_meta_data_integer(id, MetadataIntType::Rating, Some(80)).unwrap();
    assert_eq!(
        gw.get_meta_data_integer(id, MetadataIntType::Rating).unwrap(),
        Some(80)
    );
}

/// Verify the integer batch writes all twelve slots.
#[test]
fn test_integer_metadata_batch() {
    let gw = StorageGateway::open_memory(Version::LATEST).unwrap();
    let id = gw.create_track(&row("d.ogg")).unwrap();
    let metadata = TrackIntegerMetadata {
        musical_key: Some(3),
        rating: Some(60),
        last_played_ts: Some(1_600_000_000),
        ..Default::default()
    };
    gw.set_meta_data_integer_batch(id, &metadata).unwrap();

    let count: i64 = gw
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM music.MetaDataInteger WHERE id = ?1",
            [id],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(count, 12);

    let rows = gw.get_all_meta_data_integer(id).unwrap();
    let kinds: Vec<MetadataIntType> = rows.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            MetadataIntType::LastPlayedTs,
            MetadataIntType::MusicalKey,
            MetadataIntType::Rating,
            MetadataIntType::Unknown11,
            MetadataIntType::Unknown12,
        ]
    );
}

/// Unknown type codes on disk are skipped.
#[test_log::test]
fn test_unknown_metadata_code() {
    let gw = StorageGateway::open_memory(Version::LATEST).unwrap();
    let id = gw.create_track(&row("e.mp3")).unwrap();
    gw.set_meta_data_batch(
        id,
        &TrackMetadata {
            title: Some("T".into()),
            ..Default::default()
        },
    )
    .unwrap();
    gw.connection()
        .execute(
            "INSERT INTO music.MetaData (id, type, text) VALUES (?1, 99, 'odd')",
            [id],
        )
        .unwrap();

    let kinds: Vec<MetadataStrType> = gw
        .get_all_meta_data(id)
        .unwrap()
        .into_iter()
        .map(|r| r.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            MetadataStrType::Title,
            MetadataStrType::Unknown15,
            MetadataStrType::Unknown16
        ]
    );
}

/// Verify performance data storage and the unanalysed default.
#[test]
fn test_performance_data() {
    let gw = StorageGateway::open_memory(Version::V1_11_1).unwrap();
    let id = gw.create_track(&row("f.flac")).unwrap();
    assert_eq!(gw.get_performance_data(id).unwrap(), PerformanceDataRow::new(id));

    let mut data = PerformanceDataRow::new(id);
    data.is_analyzed = 1;
    data.track_data = TrackData {
        sample_rate: 44100.0,
        sample_count: 441_000,
        average_loudness: 0.5,
        key: 4,
    };
    data.beat_data = BeatData {
        sample_rate: 44100.0,
        sample_count: 441_000,
        default_markers: vec![BeatGridMarker::new(0.0, 0), BeatGridMarker::new(22050.0, 1)],
        adjusted_markers: vec![BeatGridMarker::new(0.0, 0), BeatGridMarker::new(22050.0, 1)],
    };
    data.quick_cues.hot_cues[2] = Some(HotCue {
        label: "Drop".into(),
        sample_offset: 88200.0,
        color: PadColor::new(0xea, 0xc5, 0x32, 0xff),
    });
    data.has_rekordbox_values = Some(0);
    data.has_traktor_values = Some(1);
    gw.set_performance_data(&data).unwrap();
    assert_eq!(gw.get_performance_data(id).unwrap(), data);

    // Empty values are stored as NULL.
    let loops: Option<Vec<u8>> = gw
        .connection()
        .query_row("SELECT loops FROM perfdata.PerformanceData WHERE id = ?1", [id], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(loops, None);

    gw.clear_performance_data(id).unwrap();
    assert_eq!(gw.get_performance_data(id).unwrap(), PerformanceDataRow::new(id));
}

/// Performance data needs an existing track.
#[test]
fn test_performance_data_for_missing_track() {
    let gw = StorageGateway::open_memory(Version::LATEST).unwrap();
    let data = PerformanceDataRow::new(5);
    assert!(matches!(gw.set_performance_data(&data), Err(Error::TrackDeleted(5))));
}

/// Verify a transaction groups gateway writes.
#[test]
fn test_transaction_rollback() {
    let gw = StorageGateway::open_memory(Version::LATEST).unwrap();
    {
        let _tx = gw.transaction().unwrap();
        let id = gw.create_track(&row("g.mp3")).unwrap();
        gw.delete_track(id).unwrap();
        gw.create_track(&row("h.mp3")).unwrap();
    }
    assert!(gw.track_ids().unwrap().is_empty());

    let tx = gw.transaction().unwrap();
    gw.create_track(&row("i.mp3")).unwrap();
    tx.commit().unwrap();
    assert_eq!(gw.track_ids().unwrap().len(), 1);
}
