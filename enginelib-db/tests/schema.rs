// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! On-disk library creation, loading and validation.

use std::path::Path;

use enginelib_db::{Database, Error, OpenMode, StorageGateway, Version, database_exists, database_path};
use rstest::rstest;
use rusqlite::Connection;
use tempfile::TempDir;

fn stored_version(dir: &Path, database: Database) -> (u32, u32, u32) {
    let conn = Connection::open(database_path(dir, database)).unwrap();
    conn.query_row(
        "SELECT schemaVersionMajor, schemaVersionMinor, schemaVersionPatch FROM Information",
        [],
        |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
    )
    .unwrap()
}

fn stored_uuid(dir: &Path, database: Database) -> String {
    let conn = Connection::open(database_path(dir, database)).unwrap();
    conn.query_row("SELECT uuid FROM Information", [], |r| r.get(0)).unwrap()
}

/// Both 1.18.0 variants store the same triple and are told apart on load.
#[rstest]
#[case::firmware(Version::V1_18_0_FW)]
#[case::desktop(Version::V1_18_0_EP)]
fn test_variant_resolution(#[case] version: Version) {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("lib1");

    let gw = StorageGateway::open(&dir, OpenMode::Create(version)).unwrap();
    assert!(gw.was_created());
    drop(gw);

    assert!(dir.join("m.db").is_file());
    assert!(dir.join("p.db").is_file());
    assert_eq!(stored_version(&dir, Database::Music), (1, 18, 0));
    assert_eq!(stored_version(&dir, Database::Perfdata), (1, 18, 0));

    let gw = StorageGateway::open(&dir, OpenMode::Load).unwrap();
    assert_eq!(gw.version(), version);
    assert!(!gw.was_created());
}

/// Every supported version survives a create, close and load cycle.
#[rstest]
fn test_reload(
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
    let tmp = TempDir::new().unwrap();
    let id = {
        let gw = StorageGateway::open(tmp.path(), OpenMode::Create(version)).unwrap();
        gw.create_track(&Default::default()).unwrap()
    };
    let gw = StorageGateway::open(tmp.path(), OpenMode::Load).unwrap();
    assert_eq!(gw.version(), version);
    assert_eq!(gw.track_ids().unwrap(), vec![id]);
}

/// Both databases share one UUID.
#[test]
fn test_shared_uuid() {
    let tmp = TempDir::new().unwrap();
    let gw = StorageGateway::open(tmp.path(), OpenMode::Create(Version::V1_9_1)).unwrap();
    let music = stored_uuid(tmp.path(), Database::Music);
    assert_eq!(music, stored_uuid(tmp.path(), Database::Perfdata));
    assert_eq!(gw.uuid().unwrap(), music);
}

/// A library missing a column fails to load.
#[test_log::test]
fn test_missing_column() {
    let tmp = TempDir::new().unwrap();
    drop(StorageGateway::open(tmp.path(), OpenMode::Create(Version::V1_15_0)).unwrap());

    let conn = Connection::open(tmp.path().join("m.db")).unwrap();
    conn.execute_batch("DROP INDEX index_Track_uri; ALTER TABLE Track DROP COLUMN uri;")
        .unwrap();
    drop(conn);

    match StorageGateway::open(tmp.path(), OpenMode::Load) {
        Err(Error::SchemaMismatch {
            database,
            object,
            detail,
        }) => {
            assert_eq!(database, "music");
            assert_eq!(object, "Track.uri");
            assert_eq!(detail, "missing");
        }
        Err(other) => panic!("expected schema mismatch, got {other}"),
        Ok(_) => panic!("expected schema mismatch"),
    }
}

/// Loading never creates files.
#[test]
fn test_load_missing() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nowhere");
    assert!(matches!(
        StorageGateway::open(&missing, OpenMode::Load),
        Err(Error::DatabaseNotFound(p)) if p == missing
    ));
    assert!(!missing.exists());

    drop(StorageGateway::open(tmp.path(), OpenMode::Create(Version::V1_6_0)).unwrap());
    std::fs::remove_file(tmp.path().join("p.db")).unwrap();
    assert!(!database_exists(tmp.path()));
    assert!(matches!(
        StorageGateway::open(tmp.path(), OpenMode::Load),
        Err(Error::DatabaseNotFound(p)) if p == tmp.path().join("p.db")
    ));
    assert!(!tmp.path().join("p.db").exists());
}

/// Only the library directory itself is created, never its parents.
#[test]
fn test_create_requires_parent() {
    let tmp = TempDir::new().unwrap();
    let parent = tmp.path().join("missing_parent");
    let dir = parent.join("Engine Library");
    assert!(matches!(
        StorageGateway::open(&dir, OpenMode::Create(Version::V1_15_0)),
        Err(Error::Io { path, .. }) if path == dir
    ));
    assert!(!parent.exists());

    std::fs::create_dir(&parent).unwrap();
    let gw = StorageGateway::open(&dir, OpenMode::Create(Version::V1_15_0)).unwrap();
    assert!(gw.was_created());
    assert!(database_exists(&dir));
}

#[test]
fn test_create_or_load() {
    let tmp = TempDir::new().unwrap();
    let first = StorageGateway::open(tmp.path(), OpenMode::CreateOrLoad(Version::V1_13_2)).unwrap();
    assert!(first.was_created());
    drop(first);

    // The stored version wins over the requested one.
    let second = StorageGateway::open(tmp.path(), OpenMode::CreateOrLoad(Version::LATEST)).unwrap();
    assert!(!second.was_created());
    assert_eq!(second.version(), Version::V1_13_2);
}

/// Creating over a library of another version fails validation.
#[test]
fn test_create_over_other_version() {
    let tmp = TempDir::new().unwrap();
    drop(StorageGateway::open(tmp.path(), OpenMode::Create(Version::V1_17_0)).unwrap());
    drop(StorageGateway::open(tmp.path(), OpenMode::Create(Version::V1_17_0)).unwrap());
    assert!(matches!(
        StorageGateway::open(tmp.path(), OpenMode::Create(Version::V1_18_0_EP)),
        Err(Error::SchemaMismatch { .. })
    ));
}

/// Unsupported versions are rejected before touching the filesystem.
#[test]
fn test_unsupported_version() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("lib");
    assert!(matches!(
        StorageGateway::open(&dir, OpenMode::Create(Version::new(1, 12, 2))),
        Err(Error::UnsupportedVersion(_))
    ));
    assert!(!dir.exists());
}

#[test]
fn test_version_disagreement() {
    let tmp = TempDir::new().unwrap();
    drop(StorageGateway::open(tmp.path(), OpenMode::Create(Version::V1_7_1)).unwrap());
    let conn = Connection::open(tmp.path().join("p.db")).unwrap();
    conn.execute("UPDATE Information SET schemaVersionMinor = 9", []).unwrap();
    drop(conn);

    assert!(matches!(
        StorageGateway::open(tmp.path(), OpenMode::Load),
        Err(Error::DatabaseInconsistency(_))
    ));
}
