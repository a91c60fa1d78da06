// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Track summary blob (`PerformanceData.trackData`).

use bytes::BufMut;

use crate::error::Result;
use crate::frame;
use crate::reader::Reader;

const PAYLOAD_LEN: usize = 28;

/// Summary analysis of a whole track.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackData {
    pub sample_rate: f64,
    pub sample_count: i64,
    pub average_loudness: f64,
    /// Initial playback key code; zero means no key.
    pub key: i32,
}

impl TrackData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn decode(blob: &[u8]) -> Result<Self> {
        if blob.is_empty() {
            return Ok(Self::default());
        }
        let payload = frame::decompress(blob)?;
        let mut r = Reader::new(&payload);
        let data = Self {
            sample_rate: r.f64()?,
            sample_count: r.i64()?,
            average_loudness: r.f64()?,
            key: r.i32()?,
        };
        r.finish()?;
        Ok(data)
    }

    pub fn encode(&self) -> Vec<u8> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut payload = Vec::with_capacity(PAYLOAD_LEN);
        payload.put_f64(self.sample_rate);
        payload.put_i64(self.sample_count);
        payload.put_f64(self.average_loudness);
        payload.put_i32(self.key);
        frame::compress(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeErrorKind;

    #[test]
    fn test_payload_layout() {
        let data = TrackData {
            sample_rate: 44100.0,
            sample_count: 1_000_000,
            average_loudness: 0.5,
            key: 3,
        };
        let payload = frame::decompress(&data.encode()).unwrap();
        assert_eq!(payload.len(), PAYLOAD_LEN);
        assert_eq!(&payload[..8], &44100f64.to_be_bytes());
        assert_eq!(&payload[8..16], &1_000_000i64.to_be_bytes());
        assert_eq!(&payload[24..], &3i32.to_be_bytes());
        assert_eq!(TrackData::decode(&data.encode()).unwrap(), data);
    }

    #[test]
    fn test_empty_blob_is_default() {
        assert_eq!(TrackData::decode(&[]).unwrap(), TrackData::default());
        assert!(TrackData::default().encode().is_empty());
    }

    #[test]
    fn test_short_payload() {
        let blob = frame::compress(&[0; 20]);
        let err = TrackData::decode(&blob).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::TruncatedInput);
        assert_eq!(err.offset, 16);
    }
}
