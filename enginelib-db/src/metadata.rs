// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Type codes of the `MetaData` and `MetaDataInteger` tables.
//!
//! The `Unknown*` codes have no known meaning but hardware players expect
//! rows for them; the batch writers fill them with the values players write.

use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
pub enum MetadataStrType {
    Title = 1,
    Artist = 2,
    Album = 3,
    Genre = 4,
    Comment = 5,
    Publisher = 6,
    Composer = 7,
    Unknown8 = 8,
    Unknown9 = 9,
    DurationMmSs = 10,
    EverPlayed = 12,
    FileExtension = 13,
    Unknown15 = 15,
    Unknown16 = 16,
    Unknown17 = 17,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
pub enum MetadataIntType {
    LastPlayedTs = 1,
    LastModifiedTs = 2,
    LastAccessedTs = 3,
    MusicalKey = 4,
    Rating = 5,
    Unknown6 = 6,
    Unknown7 = 7,
    Unknown8 = 8,
    Unknown9 = 9,
    LastPlayHash = 10,
    Unknown11 = 11,
    Unknown12 = 12,
}

/// A non-null row of the `MetaData` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaDataRow {
    pub id: i64,
    pub kind: MetadataStrType,
    pub text: String,
}

/// A non-null row of the `MetaDataInteger` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaDataIntegerRow {
    pub id: i64,
    pub kind: MetadataIntType,
    pub value: i64,
}

/// Every string metadata field a track carries, written together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub comment: Option<String>,
    pub publisher: Option<String>,
    pub composer: Option<String>,
    pub duration_mm_ss: Option<String>,
    pub ever_played: Option<String>,
    pub file_extension: Option<String>,
}

impl TrackMetadata {
    /// Rows in the order they are written, including the opaque slots.
    pub(crate) fn rows(&self) -> [(MetadataStrType, Option<&str>); 15] {
        use MetadataStrType::*;
        [
            (Title, self.title.as_deref()),
            (Artist, self.artist.as_deref()),
            (Album, self.album.as_deref()),
            (Genre, self.genre.as_deref()),
            (Comment, self.comment.as_deref()),
            (Publisher, self.publisher.as_deref()),
            (Composer, self.composer.as_deref()),
            (Unknown8, None),
            (Unknown9, None),
            (DurationMmSs, self.duration_mm_ss.as_deref()),
            (EverPlayed, self.ever_played.as_deref()),
            (FileExtension, self.file_extension.as_deref()),
            (Unknown15, Some("1")),
            (Unknown16, Some("1")),
            (Unknown17, None),
        ]
    }
}

/// Every integer metadata field a track carries, written together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackIntegerMetadata {
    pub musical_key: Option<i64>,
    pub rating: Option<i64>,
    pub last_played_ts: Option<i64>,
    pub last_modified_ts: Option<i64>,
    pub last_accessed_ts: Option<i64>,
    pub last_play_hash: Option<i64>,
}

impl TrackIntegerMetadata {
    /// Rows in the order hardware players write them.
    pub(crate) fn rows(&self) -> [(MetadataIntType, Option<i64>); 12] {
        use MetadataIntType::*;
        [
            (MusicalKey, self.musical_key),
            (Rating, self.rating),
            (LastPlayedTs, self.last_played_ts),
            (LastModifiedTs, self.last_modified_ts),
            (LastAccessedTs, self.last_accessed_ts),
            (Unknown6, None),
            (Unknown8, None),
            (Unknown7, None),
            (Unknown9, None),
            (LastPlayHash, self.last_play_hash),
            (Unknown11, Some(1)),
            (Unknown12, Some(1)),
        ]
    }
}
