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

//! Repeating group codec.
//!
//! Wire layout of a group:
//!
//! ```text
//! +--------------+-------------+-----------------------+--------------------+-----
//! | blockLength  | numInGroup  | item 0 fixed block    | item 0 nested data | item 1 ...
//! | (uint16)     | (uint32)    | (blockLength bytes)   | (groups, var-data) |
//! +--------------+-------------+-----------------------+--------------------+-----
//! ```
//!
//! The producer's `blockLength` is the authoritative per-item stride. A decoder built against an
//! older schema reads the fields it knows from the front of each fixed block and skips the rest,
//! so nested data always starts at `item_start + blockLength`.

use crate::{
    cursor::SbeCursor,
    error::{SbeError, SbeResult},
    scalar::UintWidth,
};

/// Encoding of a group dimension header (block length and item count widths).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupDimension {
    /// Width of the `blockLength` field.
    pub block_length: UintWidth,
    /// Width of the `numInGroup` field.
    pub num_in_group: UintWidth,
}

impl GroupDimension {
    /// `groupSizeEncoding`: u16 block length + u32 count.
    pub const GROUP_SIZE: Self = Self {
        block_length: UintWidth::U16,
        num_in_group: UintWidth::U32,
    };

    /// `groupSize16Encoding`: u16 block length + u16 count.
    pub const GROUP_SIZE_16: Self = Self {
        block_length: UintWidth::U16,
        num_in_group: UintWidth::U16,
    };

    /// Creates a dimension with the given field widths.
    #[must_use]
    pub const fn new(block_length: UintWidth, num_in_group: UintWidth) -> Self {
        Self {
            block_length,
            num_in_group,
        }
    }

    /// Encoded length of the dimension header in bytes.
    #[must_use]
    pub const fn encoded_length(&self) -> usize {
        self.block_length.size() + self.num_in_group.size()
    }
}

impl Default for GroupDimension {
    fn default() -> Self {
        Self::GROUP_SIZE
    }
}

/// Decoded group dimension header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupHeader {
    /// Per-item fixed block length.
    pub block_length: usize,
    /// Number of items.
    pub num_in_group: usize,
}

/// Reads a group dimension header, enforcing `max_group_size`.
///
/// # Errors
///
/// Returns `BufferTooShort` if the header is truncated, or `GroupSizeTooLarge` if the count
/// exceeds `max_group_size`.
pub fn read_group_header(
    cursor: &mut SbeCursor<'_>,
    dimension: GroupDimension,
    max_group_size: u32,
) -> SbeResult<GroupHeader> {
    let block_length = cursor.read_uint(dimension.block_length)?;
    let num_in_group = cursor.read_uint(dimension.num_in_group)?;

    if num_in_group > u64::from(max_group_size) {
        return Err(SbeError::GroupSizeTooLarge {
            count: num_in_group,
            max: max_group_size,
        });
    }

    let block_length = usize::try_from(block_length).map_err(|_| SbeError::InvalidBlockLength {
        expected: 0,
        actual: usize::MAX,
    })?;

    Ok(GroupHeader {
        block_length,
        // Bounded by `max_group_size` above
        num_in_group: num_in_group as usize,
    })
}

/// Appends a group dimension header.
///
/// # Errors
///
/// Returns `InvalidBlockLength` if `block_length` does not fit the block length field, or
/// `GroupCountTooLarge` if `count` does not fit the count field.
pub fn write_group_header(
    out: &mut Vec<u8>,
    dimension: GroupDimension,
    block_length: usize,
    count: usize,
) -> SbeResult<()> {
    if !u64::try_from(block_length).is_ok_and(|bl| dimension.block_length.fits(bl)) {
        return Err(SbeError::InvalidBlockLength {
            expected: block_length,
            actual: dimension.block_length.max_value() as usize,
        });
    }
    if !u64::try_from(count).is_ok_and(|c| dimension.num_in_group.fits(c)) {
        return Err(SbeError::GroupCountTooLarge {
            count,
            max: dimension.num_in_group.max_value(),
        });
    }

    dimension.block_length.append(out, block_length as u64)?;
    dimension.num_in_group.append(out, count as u64)
}

/// Reads a repeating group.
///
/// For each item, `decode_item` receives the item's fixed block (exactly `blockLength` bytes as
/// declared by the producer) and the cursor, already positioned at `item_start + blockLength`,
/// from which it reads any nested groups or var-data belonging to the item.
///
/// # Errors
///
/// Returns `GroupSizeTooLarge` if the count exceeds `max_group_size`, `InvalidBlockLength` if the
/// declared block length is smaller than `min_block_length`, `GroupCountOverflow` if
/// `count * blockLength` exceeds the remaining buffer, or any error from `decode_item`.
pub fn read_group<'a, T, F>(
    cursor: &mut SbeCursor<'a>,
    dimension: GroupDimension,
    min_block_length: usize,
    max_group_size: u32,
    mut decode_item: F,
) -> SbeResult<Vec<T>>
where
    F: FnMut(&'a [u8], &mut SbeCursor<'a>) -> SbeResult<T>,
{
    let header = read_group_header(cursor, dimension, max_group_size)?;
    let block_len = header.block_length;
    let count = header.num_in_group;

    if block_len < min_block_length {
        return Err(SbeError::InvalidBlockLength {
            expected: min_block_length,
            actual: block_len,
        });
    }

    // Validate we have enough bytes for all fixed blocks
    let remaining = cursor.remaining();
    if count.checked_mul(block_len).is_none_or(|total| total > remaining) {
        return Err(SbeError::GroupCountOverflow {
            count: count as u64,
            block_length: block_len,
            remaining,
        });
    }

    if count > 0 && block_len > min_block_length {
        tracing::trace!(
            block_length = block_len,
            known = min_block_length,
            count,
            "Skipping unknown trailing bytes in group items"
        );
    }

    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        // Advances to the next item boundary regardless of how much the decoder reads
        let block = cursor.read_bytes(block_len)?;
        items.push(decode_item(block, cursor)?);
    }

    Ok(items)
}

/// Writer handed to the item encoder of [`write_group`].
///
/// The fixed block is reserved and zero-filled before the encoder runs; nested groups and
/// var-data are appended after it.
#[derive(Debug)]
pub struct GroupItemWriter<'w> {
    out: &'w mut Vec<u8>,
    block_start: usize,
    block_length: usize,
}

impl GroupItemWriter<'_> {
    /// Returns the item's fixed block.
    pub fn block_mut(&mut self) -> &mut [u8] {
        &mut self.out[self.block_start..self.block_start + self.block_length]
    }

    /// Returns the output buffer for nested groups and var-data.
    pub fn trailing(&mut self) -> &mut Vec<u8> {
        self.out
    }
}

/// Writes a repeating group: dimension header then, per item, a zero-filled `block_length`
/// fixed block filled in by `encode_item`, followed by anything it appends as nested data.
///
/// # Errors
///
/// Returns `InvalidBlockLength` or `GroupCountTooLarge` if the header values do not fit the
/// dimension, or any error from `encode_item`.
pub fn write_group<T, F>(
    out: &mut Vec<u8>,
    dimension: GroupDimension,
    block_length: usize,
    items: &[T],
    mut encode_item: F,
) -> SbeResult<()>
where
    F: FnMut(&mut GroupItemWriter<'_>, &T) -> SbeResult<()>,
{
    write_group_header(out, dimension, block_length, items.len())?;
    out.reserve(items.len() * block_length);

    for item in items {
        let block_start = out.len();
        out.resize(block_start + block_length, 0);

        let mut writer = GroupItemWriter {
            out: &mut *out,
            block_start,
            block_length,
        };
        encode_item(&mut writer, item)?;
    }

    Ok(())
}
