// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! SQLite storage for Engine DJ libraries.
//!
//! A library directory holds a music database (`m.db`) and a performance
//! database (`p.db`). This crate creates, loads and validates both at every
//! supported schema version, and reads and writes their rows.
//!
//! **Architecture**: This is the storage layer under the `enginelib` facade.
//!
//! # Key Features
//!
//! - Schema manifests for eleven versions, 1.6.0 through 1.18.0+fw
//! - Structural validation of existing libraries against their manifest
//! - Version-gated track and performance data columns
//! - Crate hierarchy maintenance
//!
//! # Example
//!
//! ```ignore
//! use enginelib_db::{OpenMode, StorageGateway, Version};
//!
//! let gw = StorageGateway::open("/media/usb/Engine Library", OpenMode::Load)?;
//! for id in gw.track_ids()? {
//!     println!("{:?}", gw.get_track(id)?.relative_path);
//! }
//! ```

mod columns;
mod connection;
mod crates;
mod error;
mod metadata;
mod query;
mod schema;
mod types;
mod version;
mod write;

pub use connection::{OpenMode, StorageGateway, database_exists, database_path};
pub use error::{Error, Result};
pub use metadata::*;
pub use schema::{Database, Schema};
pub use types::*;
pub use version::{ParseVersionError, Variant, Version};
