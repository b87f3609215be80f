// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

// SBE decode cursor - all read methods return SbeError::BufferTooShort when buffer too short
#![allow(clippy::missing_errors_doc)]

//! Zero-copy SBE byte cursor for sequential decoding.

use crate::{
    error::{SbeError, SbeResult},
    scalar::{ScalarKind, ScalarValue, UintWidth, read_scalar},
};

/// Zero-copy SBE byte cursor for sequential decoding.
///
/// Wraps a byte slice and tracks position, providing typed read methods
/// that automatically advance the cursor. The position is a plain value threaded
/// through each decode call, so a cursor never outlives the call that created it.
#[derive(Debug, Clone)]
pub struct SbeCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> SbeCursor<'a> {
    /// Creates a new cursor at position 0.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Creates a cursor starting at a specific offset.
    #[must_use]
    pub const fn new_at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    /// Current position in the buffer.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Remaining bytes from current position.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Ensures at least `n` bytes remain.
    ///
    /// # Errors
    ///
    /// Returns `BufferTooShort` if fewer than `n` bytes remain.
    pub fn require(&self, n: usize) -> SbeResult<()> {
        // A cursor positioned past the end has nothing left, not even zero bytes
        if self.buf.len().checked_sub(self.pos).is_none_or(|r| r < n) {
            return Err(SbeError::BufferTooShort {
                expected: self.pos.saturating_add(n),
                actual: self.buf.len(),
            });
        }
        Ok(())
    }

    /// Reads an unsigned integer of the given width and advances.
    pub fn read_uint(&mut self, width: UintWidth) -> SbeResult<u64> {
        let value = width.read(self.buf, self.pos)?;
        self.pos += width.size();
        Ok(value)
    }

    /// Reads a scalar of `kind` and advances by its width.
    pub fn read_scalar(&mut self, kind: ScalarKind) -> SbeResult<ScalarValue> {
        let (value, width) = read_scalar(self.buf, self.pos, kind)?;
        self.pos += width;
        Ok(value)
    }

    /// Reads N bytes and advances.
    pub fn read_bytes(&mut self, n: usize) -> SbeResult<&'a [u8]> {
        self.require(n)?;
        let end = self.pos + n;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Reads a length-prefixed var-data field and returns the raw payload (zero-copy).
    ///
    /// A truncated prefix fails with `BufferTooShort`, a payload longer than the
    /// remaining buffer fails with `TruncatedVarData`.
    pub fn read_var_data(&mut self, length_width: UintWidth) -> SbeResult<&'a [u8]> {
        let length = self.read_uint(length_width)?;
        let available = self.remaining();

        let len = match usize::try_from(length) {
            Ok(len) if len <= available => len,
            _ => {
                return Err(SbeError::TruncatedVarData {
                    offset: self.pos,
                    length,
                    available,
                });
            }
        };

        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }
}
