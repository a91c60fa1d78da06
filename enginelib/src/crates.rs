// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Crates: named, nestable collections of tracks.

use std::fmt;
use std::rc::Rc;

use enginelib_db::StorageGateway;
use tracing::debug;

use crate::error::{Error, Result};
use crate::track::Track;

/// Crate names must be non-empty and must not contain the path separator.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(';') {
        return Err(Error::InvalidCrateName(name.to_owned()));
    }
    Ok(())
}

/// Fail if any of `siblings` other than `except` is called `name`.
pub(crate) fn ensure_unique_name(
    gw: &StorageGateway,
    siblings: &[i64],
    name: &str,
    except: Option<i64>,
) -> Result<()> {
    for &id in siblings {
        if Some(id) != except && gw.get_crate(id)?.name == name {
            return Err(Error::CrateAlreadyExists(name.to_owned()));
        }
    }
    Ok(())
}

/// A crate stored in a library.
#[derive(Clone)]
pub struct Crate {
    gw: Rc<StorageGateway>,
    id: i64,
}

impl fmt::Debug for Crate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crate").field("id", &self.id).finish()
    }
}

impl PartialEq for Crate {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Rc::ptr_eq(&self.gw, &other.gw)
    }
}

impl Eq for Crate {}

impl Crate {
    pub(crate) fn new(gw: Rc<StorageGateway>, id: i64) -> Self {
        Self { gw, id }
    }

    fn handle(&self, id: i64) -> Crate {
        Crate::new(Rc::clone(&self.gw), id)
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn is_valid(&self) -> Result<bool> {
        Ok(self.gw.crate_exists(self.id)?)
    }

    pub fn name(&self) -> Result<String> {
        Ok(self.gw.get_crate(self.id)?.name)
    }

    /// Names from the root crate down to this one, each followed by `;`.
    pub fn path(&self) -> Result<String> {
        Ok(self.gw.get_crate(self.id)?.path)
    }

    /// Rename the crate; siblings must keep distinct names.
    pub fn set_name(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        self.gw.in_transaction(|_| {
            let siblings = self.sibling_ids(self.gw.parent_crate_id(self.id)?)?;
            ensure_unique_name(&self.gw, &siblings, name, Some(self.id))?;
            self.gw.set_crate_name(self.id, name)?;
            Ok(())
        })
    }

    fn sibling_ids(&self, parent: Option<i64>) -> Result<Vec<i64>> {
        Ok(match parent {
            Some(parent) => self.gw.child_crate_ids(parent)?,
            None => self.gw.root_crate_ids()?,
        })
    }

    pub fn parent(&self) -> Result<Option<Crate>> {
        Ok(self.gw.parent_crate_id(self.id)?.map(|id| self.handle(id)))
    }

    /// Move this crate below `parent`, or to the top level.
    pub fn set_parent(&self, parent: Option<&Crate>) -> Result<()> {
        let parent = parent.map(Crate::id);
        self.gw.in_transaction(|_| {
            let name = self.name()?;
            let siblings = self.sibling_ids(parent)?;
            ensure_unique_name(&self.gw, &siblings, &name, Some(self.id))?;
            self.gw.set_crate_parent(self.id, parent)?;
            Ok(())
        })
    }

    /// Direct sub-crates.
    pub fn children(&self) -> Result<Vec<Crate>> {
        Ok(self
            .gw
            .child_crate_ids(self.id)?
            .into_iter()
            .map(|id| self.handle(id))
            .collect())
    }

    /// Sub-crates at any depth.
    pub fn descendants(&self) -> Result<Vec<Crate>> {
        Ok(self
            .gw
            .descendant_crate_ids(self.id)?
            .into_iter()
            .map(|id| self.handle(id))
            .collect())
    }

    pub fn sub_crate_by_name(&self, name: &str) -> Result<Option<Crate>> {
        for id in self.gw.child_crate_ids(self.id)? {
            if self.gw.get_crate(id)?.name == name {
                return Ok(Some(self.handle(id)));
            }
        }
        Ok(None)
    }

    pub fn create_sub_crate(&self, name: &str) -> Result<Crate> {
        validate_name(name)?;
        let id = self.gw.in_transaction(|_| {
            let siblings = self.gw.child_crate_ids(self.id)?;
            ensure_unique_name(&self.gw, &siblings, name, None)?;
            Ok::<_, Error>(self.gw.create_crate(name, Some(self.id))?)
        })?;
        debug!(crate_id = id, parent = self.id, name, "created sub-crate");
        Ok(self.handle(id))
    }

    pub fn tracks(&self) -> Result<Vec<Track>> {
        Ok(self
            .gw
            .crate_track_ids(self.id)?
            .into_iter()
            .map(|id| Track::new(Rc::clone(&self.gw), id))
            .collect())
    }

    pub fn add_track(&self, track: &Track) -> Result<()> {
        Ok(self.gw.add_track_to_crate(self.id, track.id())?)
    }

    pub fn remove_track(&self, track: &Track) -> Result<()> {
        Ok(self.gw.remove_track_from_crate(self.id, track.id())?)
    }

    pub fn clear_tracks(&self) -> Result<()> {
        self.gw.in_transaction(|_| {
            for id in self.gw.crate_track_ids(self.id)? {
                self.gw.remove_track_from_crate(self.id, id)?;
            }
            Ok(())
        })
    }
}
