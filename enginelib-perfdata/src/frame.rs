// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! The zlib envelope shared by the compressed blob formats.
//!
//! Layout: a big-endian `u32` holding the inflated length, followed by a
//! zlib stream.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use tracing::trace;

use crate::error::{DecodeError, DecodeErrorKind, Result};
use crate::reader::{Reader, put_count};

// Upper bound on the deflate expansion ratio.
const MAX_INFLATE_RATIO: usize = 1032;

/// Inflate a framed blob, checking the inflated size against the prefix.
pub(crate) fn decompress(blob: &[u8]) -> Result<Vec<u8>> {
    let mut reader = Reader::new(blob);
    let expected = reader.u32()? as usize;
    let stream_start = reader.offset();
    let stream = reader.take(reader.remaining())?;

    // One byte of headroom past the claimed size exposes streams that inflate
    // to more than they declare; the ratio cap stops a hostile prefix from
    // forcing a large allocation.
    let capacity = expected.min(stream.len().saturating_mul(MAX_INFLATE_RATIO)) + 1;
    let mut out = Vec::with_capacity(capacity);
    let mut inflater = Decompress::new(true);
    let status = inflater
        .decompress_vec(stream, &mut out, FlushDecompress::Finish)
        .map_err(|_| DecodeError::new(DecodeErrorKind::DecompressionFailed, stream_start))?;

    match status {
        Status::StreamEnd if out.len() == expected => {}
        Status::StreamEnd => return Err(DecodeError::new(DecodeErrorKind::LengthMismatch, 0)),
        // Output buffer filled before the stream ended.
        _ if out.len() >= capacity => {
            return Err(DecodeError::new(DecodeErrorKind::LengthMismatch, 0));
        }
        _ => {
            return Err(DecodeError::new(
                DecodeErrorKind::DecompressionFailed,
                blob.len(),
            ));
        }
    }

    let consumed = inflater.total_in() as usize;
    if consumed != stream.len() {
        return Err(DecodeError::new(
            DecodeErrorKind::TrailingBytes,
            stream_start + consumed,
        ));
    }

    trace!(compressed = blob.len(), inflated = out.len(), "inflated blob");
    Ok(out)
}

/// Deflate a payload into the framed representation.
pub(crate) fn compress(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() / 2 + 16);
    put_count(&mut out, payload.len());

    let mut encoder = ZlibEncoder::new(out, Compression::default());
    encoder
        .write_all(payload)
        .expect("in-memory zlib write cannot fail");
    encoder.finish().expect("in-memory zlib finish cannot fail")
}
