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

//! Length-prefixed variable-length field codec.
//!
//! Layout: an unsigned little-endian length prefix (`varString8` uses `uint8`, `varDataEncoding`
//! uses `uint32`) followed by exactly that many raw bytes. No terminator, no padding.

use crate::{
    cursor::SbeCursor,
    error::{SbeError, SbeResult},
    scalar::UintWidth,
};

/// Appends `value` with a `length_width` length prefix.
///
/// # Errors
///
/// Returns `VarDataTooLong` if `value.len()` does not fit the prefix.
pub fn write_var(out: &mut Vec<u8>, value: &[u8], length_width: UintWidth) -> SbeResult<()> {
    let length = value.len();
    let fits = u64::try_from(length).is_ok_and(|len| length_width.fits(len));
    if !fits {
        return Err(SbeError::VarDataTooLong {
            length,
            max: length_width.max_value(),
        });
    }

    out.reserve(length_width.size() + length);
    length_width.append(out, length as u64)?;
    out.extend_from_slice(value);
    Ok(())
}

/// Reads a length-prefixed field at `offset`.
///
/// Returns the payload (borrowed from `buf`) and the offset immediately after it.
///
/// # Errors
///
/// Returns `BufferTooShort` if the prefix is truncated, or `TruncatedVarData` if the declared
/// length runs past the end of the buffer.
pub fn read_var(buf: &[u8], offset: usize, length_width: UintWidth) -> SbeResult<(&[u8], usize)> {
    let mut cursor = SbeCursor::new_at(buf, offset);
    let value = cursor.read_var_data(length_width)?;
    Ok((value, cursor.pos()))
}

/// Total encoded size of a var-data field holding `len` bytes.
#[must_use]
pub const fn encoded_var_len(len: usize, length_width: UintWidth) -> usize {
    length_width.size() + len
}
