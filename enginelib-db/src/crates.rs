// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Crate storage.
//!
//! Every crate has one `CrateParentList` row; a root crate is its own parent.
//! `CrateHierarchy` holds one row per (ancestor, descendant) pair, and
//! `Crate.path` spells out the names from the root down, each followed by `;`.

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::connection::StorageGateway;
use crate::error::{Error, Result};
use crate::types::CrateRow;

/// The crate `?1` and all of its descendants.
const SUBTREE: &str =
    "SELECT ?1 UNION SELECT crateIdChild FROM music.CrateHierarchy WHERE crateId = ?1";

fn query_ids(conn: &Connection, sql: &str, id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let ids = stmt
        .query_map([id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(ids)
}

fn ensure_crate(conn: &Connection, id: i64) -> Result<()> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM music.Crate WHERE id = ?1")?;
    if stmt.exists([id])? {
        Ok(())
    } else {
        Err(Error::CrateDeleted(id))
    }
}

fn parent_of(conn: &Connection, id: i64) -> Result<Option<i64>> {
    let parent: Option<i64> = conn
        .prepare_cached(
            "SELECT crateParentId FROM music.CrateParentList WHERE crateOriginId = ?1",
        )?
        .query_row([id], |row| row.get(0))
        .optional()?;
    Ok(parent.filter(|&p| p != id))
}

/// The parent followed by all of its ancestors.
fn ancestors_including(conn: &Connection, parent: i64) -> Result<Vec<i64>> {
    let mut ids = vec![parent];
    ids.extend(query_ids(
        conn,
        "SELECT crateId FROM music.CrateHierarchy WHERE crateIdChild = ?1",
        parent,
    )?);
    Ok(ids)
}

/// Rebuild `Crate.path` of `id` by walking up the parent chain.
fn refresh_path(conn: &Connection, id: i64) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM music.Crate", [], |row| row.get(0))?;
    let mut names = Vec::new();
    let mut current = Some(id);
    while let Some(crate_id) = current {
        if names.len() as i64 > count {
            return Err(Error::DatabaseInconsistency(format!(
                "crate {id} has a cyclic parent chain"
            )));
        }
        let name: String = conn
            .prepare_cached("SELECT title FROM music.Crate WHERE id = ?1")?
            .query_row([crate_id], |row| row.get(0))
            .optional()?
            .ok_or(Error::CrateDeleted(crate_id))?;
        names.push(name);
        current = parent_of(conn, crate_id)?;
    }
    let path: String = names.iter().rev().map(|n| format!("{n};")).collect();
    conn.execute("UPDATE music.Crate SET path = ?1 WHERE id = ?2", params![path, id])?;
    Ok(())
}

impl StorageGateway {
    /// Create a crate under `parent`, or as a root crate.
    pub fn create_crate(&self, name: &str, parent: Option<i64>) -> Result<i64> {
        self.in_transaction(|conn| {
            if let Some(parent) = parent {
                ensure_crate(conn, parent)?;
            }
            conn.execute(
                "INSERT INTO music.Crate (title, path) VALUES (?1, '')",
                [name],
            )?;
            let id = conn.last_insert_rowid();
            conn.execute(
                "INSERT INTO music.CrateParentList (crateOriginId, crateParentId) VALUES (?1, ?2)",
                [id, parent.unwrap_or(id)],
            )?;
            if let Some(parent) = parent {
                for ancestor in ancestors_including(conn, parent)? {
                    conn.execute(
                        "INSERT INTO music.CrateHierarchy (crateId, crateIdChild) VALUES (?1, ?2)",
                        [ancestor, id],
                    )?;
                }
            }
            refresh_path(conn, id)?;
            debug!(crate_id = id, name, ?parent, "created crate");
            Ok(id)
        })
    }

    /// Get a crate row by id.
    pub fn get_crate(&self, id: i64) -> Result<CrateRow> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT title, path FROM music.Crate WHERE id = ?1")?;
        stmt.query_row([id], |row| {
            Ok(CrateRow {
                id,
                name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                path: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            })
        })
        .optional()?
        .ok_or(Error::CrateDeleted(id))
    }

    pub fn crate_exists(&self, id: i64) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT 1 FROM music.Crate WHERE id = ?1")?;
        Ok(stmt.exists([id])?)
    }

    /// Ids of all crates, ascending.
    pub fn crate_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id FROM music.Crate ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    pub fn crate_ids_by_name(&self, name: &str) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id FROM music.Crate WHERE title = ?1 ORDER BY id")?;
        let ids = stmt
            .query_map([name], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    /// Ids of crates that are their own parent.
    pub fn root_crate_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT crateOriginId FROM music.CrateParentList \
             WHERE crateOriginId = crateParentId ORDER BY crateOriginId",
        )?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    pub fn parent_crate_id(&self, id: i64) -> Result<Option<i64>> {
        ensure_crate(&self.conn, id)?;
        parent_of(&self.conn, id)
    }

    /// Ids of the direct children of a crate.
    pub fn child_crate_ids(&self, id: i64) -> Result<Vec<i64>> {
        ensure_crate(&self.conn, id)?;
        query_ids(
            &self.conn,
            "SELECT crateOriginId FROM music.CrateParentList \
             WHERE crateParentId = ?1 AND crateOriginId <> ?1 ORDER BY crateOriginId",
            id,
        )
    }

    /// Ids of all crates below a crate, at any depth.
    pub fn descendant_crate_ids(&self, id: i64) -> Result<Vec<i64>> {
        ensure_crate(&self.conn, id)?;
        query_ids(
            &self.conn,
            "SELECT crateIdChild FROM music.CrateHierarchy WHERE crateId = ?1 ORDER BY crateIdChild",
            id,
        )
    }

    /// Rename a crate, updating the paths of its subtree.
    pub fn set_crate_name(&self, id: i64, name: &str) -> Result<()> {
        self.in_transaction(|conn| {
            ensure_crate(conn, id)?;
            conn.execute("UPDATE music.Crate SET title = ?1 WHERE id = ?2", params![name, id])?;
            for member in query_ids(conn, SUBTREE, id)? {
                refresh_path(conn, member)?;
            }
            Ok(())
        })
    }

    /// Move a crate under `parent`, or make it a root crate.
    pub fn set_crate_parent(&self, id: i64, parent: Option<i64>) -> Result<()> {
        self.in_transaction(|conn| {
            ensure_crate(conn, id)?;
            let subtree = query_ids(conn, SUBTREE, id)?;
            if let Some(parent) = parent {
                ensure_crate(conn, parent)?;
                if subtree.contains(&parent) {
                    return Err(Error::InvalidCrateParent { id, parent });
                }
            }

            conn.execute(
                "UPDATE music.CrateParentList SET crateParentId = ?1 WHERE crateOriginId = ?2",
                [parent.unwrap_or(id), id],
            )?;
            // Drop links from old ancestors into the subtree, then link the new ones.
            conn.execute(
                &format!(
                    "DELETE FROM music.CrateHierarchy \
                     WHERE crateIdChild IN ({SUBTREE}) AND crateId NOT IN ({SUBTREE})"
                ),
                [id],
            )?;
            if let Some(parent) = parent {
                for ancestor in ancestors_including(conn, parent)? {
                    for &member in &subtree {
                        conn.execute(
                            "INSERT INTO music.CrateHierarchy (crateId, crateIdChild) VALUES (?1, ?2)",
                            [ancestor, member],
                        )?;
                    }
                }
            }
            for &member in &subtree {
                refresh_path(conn, member)?;
            }
            debug!(crate_id = id, ?parent, "moved crate");
            Ok(())
        })
    }

    /// Delete a crate together with all of its descendants.
    pub fn delete_crate(&self, id: i64) -> Result<()> {
        self.in_transaction(|conn| {
            ensure_crate(conn, id)?;
            let subtree = query_ids(conn, SUBTREE, id)?;
            for member in subtree {
                conn.execute("DELETE FROM music.CrateTrackList WHERE crateId = ?1", [member])?;
                conn.execute(
                    "DELETE FROM music.CrateHierarchy WHERE crateId = ?1 OR crateIdChild = ?1",
                    [member],
                )?;
                conn.execute(
                    "DELETE FROM music.CrateParentList WHERE crateOriginId = ?1",
                    [member],
                )?;
                conn.execute("DELETE FROM music.Crate WHERE id = ?1", [member])?;
            }
            debug!(crate_id = id, "deleted crate");
            Ok(())
        })
    }

    /// Add a track to a crate; adding it twice keeps one membership.
    pub fn add_track_to_crate(&self, crate_id: i64, track_id: i64) -> Result<()> {
        self.in_transaction(|conn| {
            ensure_crate(conn, crate_id)?;
            if !conn
                .prepare_cached("SELECT 1 FROM music.Track WHERE id = ?1")?
                .exists([track_id])?
            {
                return Err(Error::TrackDeleted(track_id));
            }
            conn.execute(
                "INSERT INTO music.CrateTrackList (crateId, trackId) \
                 SELECT ?1, ?2 WHERE NOT EXISTS \
                 (SELECT 1 FROM music.CrateTrackList WHERE crateId = ?1 AND trackId = ?2)",
                [crate_id, track_id],
            )?;
            Ok(())
        })
    }

    pub fn remove_track_from_crate(&self, crate_id: i64, track_id: i64) -> Result<()> {
        ensure_crate(&self.conn, crate_id)?;
        self.conn.execute(
            "DELETE FROM music.CrateTrackList WHERE crateId = ?1 AND trackId = ?2",
            [crate_id, track_id],
        )?;
        Ok(())
    }

    /// Ids of tracks in a crate, ascending.
    pub fn crate_track_ids(&self, crate_id: i64) -> Result<Vec<i64>> {
        ensure_crate(&self.conn, crate_id)?;
        query_ids(
            &self.conn,
            "SELECT DISTINCT trackId FROM music.CrateTrackList WHERE crateId = ?1 ORDER BY trackId",
            crate_id,
        )
    }

    /// Ids of crates that contain a track, ascending.
    pub fn track_crate_ids(&self, track_id: i64) -> Result<Vec<i64>> {
        query_ids(
            &self.conn,
            "SELECT DISTINCT crateId FROM music.CrateTrackList WHERE trackId = ?1 ORDER BY crateId",
            track_id,
        )
    }
}
