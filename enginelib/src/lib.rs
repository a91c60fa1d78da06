// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Engine DJ library access.
//!
//! Open a library directory, then read and write its tracks and crates
//! through plain Rust values. Analysis data (beat grids, cues, loops and
//! waveforms) is decoded transparently.
//!
//! # Example
//!
//! ```ignore
//! use enginelib::{TrackSnapshot, Version, create_or_load_database};
//!
//! let (library, _created) = create_or_load_database("Engine Library", Version::LATEST)?;
//! let track = library.create_track(&TrackSnapshot {
//!     relative_path: Some("../Music/song.flac".into()),
//!     title: Some("Song".into()),
//!     ..Default::default()
//! })?;
//! library.create_root_crate("Favourites")?.add_track(&track)?;
//! ```

mod crates;
mod error;
mod library;
mod snapshot;
mod track;
mod util;

pub use crates::Crate;
pub use error::{Error, Result};
pub use library::{
    Library, create_database, create_or_load_database, create_temporary_database, database_exists,
    load_database, music_db_path, perfdata_db_path,
};
pub use snapshot::{Sampling, TrackSnapshot};
pub use track::Track;

pub use enginelib_db::{Variant, Version};
pub use enginelib_perfdata::{
    BeatGridMarker, HOT_CUE_SLOTS, HotCue, LOOP_SLOTS, Loop, MusicalKey, PadColor, WaveformEntry,
    normalize_beatgrid, required_waveform_samples_per_entry, standard_pad_colors,
};
