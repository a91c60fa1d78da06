// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Bounds-checked big-endian primitives shared by the codecs.

use bytes::{Buf, BufMut};

use crate::error::{DecodeError, DecodeErrorKind, Result};

/// Cursor over an untrusted byte buffer.
///
/// Every read is checked against the remaining input; nothing here panics on
/// short or hostile data.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::new(kind, self.pos)
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(self.error(DecodeErrorKind::TruncatedInput));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?.get_u8())
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        Ok(self.take(4)?.get_u32())
    }

    pub(crate) fn i32(&mut self) -> Result<i32> {
        Ok(self.take(4)?.get_i32())
    }

    pub(crate) fn i64(&mut self) -> Result<i64> {
        Ok(self.take(8)?.get_i64())
    }

    pub(crate) fn f64(&mut self) -> Result<f64> {
        Ok(self.take(8)?.get_f64())
    }

    /// A byte that must be 0 or 1.
    pub(crate) fn flag(&mut self) -> Result<bool> {
        let at = self.pos;
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(DecodeError::new(DecodeErrorKind::BadMagic, at)),
        }
    }

    /// A `u32` element count, checked against both `max` and the number of
    /// elements of at least `min_size` bytes that could still fit.
    pub(crate) fn count(&mut self, max: Option<usize>, min_size: usize) -> Result<usize> {
        let at = self.pos;
        let n = self.u32()? as usize;
        let too_many = max.is_some_and(|max| n > max);
        let too_long = n
            .checked_mul(min_size)
            .is_none_or(|bytes| bytes > self.remaining());
        if too_many || too_long {
            return Err(DecodeError::new(DecodeErrorKind::LengthMismatch, at));
        }
        Ok(n)
    }

    /// A `u32`-length-prefixed UTF-8 label.
    pub(crate) fn label(&mut self) -> Result<String> {
        let len = self.count(None, 1)?;
        let at = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| DecodeError::new(DecodeErrorKind::InvalidUtf8, at))
    }

    /// Require that the whole buffer has been consumed.
    pub(crate) fn finish(self) -> Result<()> {
        if self.remaining() != 0 {
            return Err(self.error(DecodeErrorKind::TrailingBytes));
        }
        Ok(())
    }
}

pub(crate) fn put_flag(out: &mut Vec<u8>, value: bool) {
    out.put_u8(u8::from(value));
}

/// Length prefixes are `u32` on the wire.
pub(crate) fn wire_count(n: usize) -> u32 {
    u32::try_from(n).expect("length exceeds the u32 wire prefix")
}

pub(crate) fn put_count(out: &mut Vec<u8>, n: usize) {
    out.put_u32(wire_count(n));
}

pub(crate) fn put_label(out: &mut Vec<u8>, label: &str) {
    put_count(out, label.len());
    out.put_slice(label.as_bytes());
}
