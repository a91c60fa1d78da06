// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Error types for library operations.

use thiserror::Error;

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while working with a library.
#[derive(Error, Debug)]
pub enum Error {
    /// Storage layer error
    #[error(transparent)]
    Storage(#[from] enginelib_db::Error),

    /// A snapshot cannot be written as given
    #[error("Invalid track snapshot: {0}")]
    InvalidTrackSnapshot(String),

    /// Crate names must be non-empty and free of `;`
    #[error("Invalid crate name: {0:?}")]
    InvalidCrateName(String),

    /// A sibling crate already has this name
    #[error("A crate named {0:?} already exists at this level")]
    CrateAlreadyExists(String),

    /// Hot cue and loop slots are numbered 0 to 7
    #[error("Slot {0} is out of range")]
    InvalidSlot(usize),
}
