// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Opening libraries and finding their tracks and crates.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use enginelib_db::{Database, OpenMode, StorageGateway, Version};
use tracing::debug;

use crate::crates::{Crate, ensure_unique_name, validate_name};
use crate::error::{Error, Result};
use crate::snapshot::TrackSnapshot;
use crate::track::Track;

/// An open Engine library.
///
/// Cloning is cheap; clones share one connection.
#[derive(Clone)]
pub struct Library {
    gw: Rc<StorageGateway>,
}

/// Create a new library in `directory`, creating the directory (but not its
/// parents) if needed.
pub fn create_database<P: AsRef<Path>>(directory: P, version: Version) -> Result<Library> {
    Library::open(directory, OpenMode::Create(version))
}

/// Create a library held in memory.
pub fn create_temporary_database(version: Version) -> Result<Library> {
    Ok(Library::from_gateway(StorageGateway::open_memory(version)?))
}

/// Load an existing library, detecting its version.
pub fn load_database<P: AsRef<Path>>(directory: P) -> Result<Library> {
    Library::open(directory, OpenMode::Load)
}

/// Load the library in `directory`, or create it at `version` if absent.
///
/// Also returns whether the library was created.
pub fn create_or_load_database<P: AsRef<Path>>(
    directory: P,
    version: Version,
) -> Result<(Library, bool)> {
    let library = Library::open(directory, OpenMode::CreateOrLoad(version))?;
    let created = library.gw.was_created();
    Ok((library, created))
}

/// Whether `directory` holds both library database files.
pub fn database_exists<P: AsRef<Path>>(directory: P) -> bool {
    enginelib_db::database_exists(directory)
}

pub fn music_db_path<P: AsRef<Path>>(directory: P) -> PathBuf {
    enginelib_db::database_path(directory, Database::Music)
}

pub fn perfdata_db_path<P: AsRef<Path>>(directory: P) -> PathBuf {
    enginelib_db::database_path(directory, Database::Perfdata)
}

impl Library {
    fn open<P: AsRef<Path>>(directory: P, mode: OpenMode) -> Result<Self> {
        Ok(Self::from_gateway(StorageGateway::open(directory, mode)?))
    }

    fn from_gateway(gw: StorageGateway) -> Self {
        Self { gw: Rc::new(gw) }
    }

    fn track(&self, id: i64) -> Track {
        Track::new(Rc::clone(&self.gw), id)
    }

    fn crate_handle(&self, id: i64) -> Crate {
        Crate::new(Rc::clone(&self.gw), id)
    }

    pub fn version(&self) -> Version {
        self.gw.version()
    }

    /// Library directory, `None` for in-memory libraries.
    pub fn directory(&self) -> Option<&Path> {
        self.gw.directory()
    }

    pub fn uuid(&self) -> Result<String> {
        Ok(self.gw.uuid()?)
    }

    /// Re-validate both databases against the schema of the library's version.
    pub fn verify(&self) -> Result<()> {
        Ok(self.gw.validate()?)
    }

    pub fn tracks(&self) -> Result<Vec<Track>> {
        Ok(self
            .gw
            .track_ids()?
            .into_iter()
            .map(|id| self.track(id))
            .collect())
    }

    pub fn track_by_id(&self, id: i64) -> Result<Option<Track>> {
        Ok(self.gw.track_exists(id)?.then(|| self.track(id)))
    }

    pub fn tracks_by_relative_path(&self, relative_path: &str) -> Result<Vec<Track>> {
        Ok(self
            .gw
            .track_ids_by_relative_path(relative_path)?
            .into_iter()
            .map(|id| self.track(id))
            .collect())
    }

    /// Add a track built from `snapshot`, which must not carry an id.
    pub fn create_track(&self, snapshot: &TrackSnapshot) -> Result<Track> {
        if snapshot.id.is_some() {
            return Err(Error::InvalidTrackSnapshot(
                "the snapshot already belongs to a stored track".into(),
            ));
        }
        let id = self.gw.in_transaction(|_| {
            let mut write = snapshot.to_write(0)?;
            let id = self.gw.create_track(&write.track)?;
            self.gw.set_meta_data_batch(id, &write.metadata)?;
            self.gw
                .set_meta_data_integer_batch(id, &write.integer_metadata)?;
            if let Some(performance) = write.performance.as_mut() {
                performance.id = id;
                self.gw.set_performance_data(performance)?;
            }
            Ok::<_, Error>(id)
        })?;
        debug!(track_id = id, "created track");
        Ok(self.track(id))
    }

    /// Delete a track and everything stored about it.
    pub fn remove_track(&self, track: Track) -> Result<()> {
        Ok(self.gw.delete_track(track.id())?)
    }

    pub fn crates(&self) -> Result<Vec<Crate>> {
        Ok(self
            .gw
            .crate_ids()?
            .into_iter()
            .map(|id| self.crate_handle(id))
            .collect())
    }

    /// Top-level crates.
    pub fn root_crates(&self) -> Result<Vec<Crate>> {
        Ok(self
            .gw
            .root_crate_ids()?
            .into_iter()
            .map(|id| self.crate_handle(id))
            .collect())
    }

    pub fn crate_by_id(&self, id: i64) -> Result<Option<Crate>> {
        Ok(self.gw.crate_exists(id)?.then(|| self.crate_handle(id)))
    }

    /// Crates at any depth with this name.
    pub fn crates_by_name(&self, name: &str) -> Result<Vec<Crate>> {
        Ok(self
            .gw
            .crate_ids_by_name(name)?
            .into_iter()
            .map(|id| self.crate_handle(id))
            .collect())
    }

    pub fn root_crate_by_name(&self, name: &str) -> Result<Option<Crate>> {
        for id in self.gw.root_crate_ids()? {
            if self.gw.get_crate(id)?.name == name {
                return Ok(Some(self.crate_handle(id)));
            }
        }
        Ok(None)
    }

    pub fn create_root_crate(&self, name: &str) -> Result<Crate> {
        validate_name(name)?;
        let id = self.gw.in_transaction(|_| {
            let roots = self.gw.root_crate_ids()?;
            ensure_unique_name(&self.gw, &roots, name, None)?;
            Ok::<_, Error>(self.gw.create_crate(name, None)?)
        })?;
        debug!(crate_id = id, name, "created root crate");
        Ok(self.crate_handle(id))
    }

    /// Delete a crate and all of its sub-crates. Tracks are kept.
    pub fn remove_crate(&self, c: Crate) -> Result<()> {
        Ok(self.gw.delete_crate(c.id())?)
    }
}
