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

//! Descriptor-driven message body codec.
//!
//! A body is laid out as:
//!
//! 1. Root block: `block_length` bytes holding the fixed fields at their offsets.
//! 2. Repeating groups, in declared order. Each item's nested groups and var-data follow
//!    that item's fixed block.
//! 3. Var-data fields, in declared order.
//!
//! Decoding takes the acting block length and version from the producer so that encodings
//! from newer schemas (longer blocks) and older schemas (missing members) both decode.

use crate::{
    config::MAX_GROUP_SIZE,
    cursor::SbeCursor,
    descriptor::{BlockLayout, MessageDescriptor, Presence},
    error::{SbeError, SbeResult},
    group::{read_group, write_group},
    message::DecodedMessage,
    scalar::{read_scalar, write_scalar},
    var_data::write_var,
};

/// Producer-side parameters for a decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Root block length advertised by the producer.
    pub block_length: usize,
    /// Schema version the producer encoded with.
    pub acting_version: u16,
    /// Maximum items accepted per group.
    pub max_group_size: u32,
}

impl DecodeOptions {
    /// Options for a buffer encoded with exactly `descriptor`'s schema.
    #[must_use]
    pub const fn for_descriptor(descriptor: &MessageDescriptor) -> Self {
        Self {
            block_length: descriptor.block_length(),
            acting_version: descriptor.version,
            max_group_size: MAX_GROUP_SIZE,
        }
    }
}

/// Decodes a message body at `offset` assuming the producer used `descriptor`'s schema.
///
/// Returns the message and the offset of the first byte after it.
///
/// # Errors
///
/// Returns `MessageDecode` wrapping the first failure (`BufferTooShort`, `TruncatedVarData`,
/// `GroupCountOverflow`, `InvalidBlockLength`, `GroupSizeTooLarge`).
pub fn decode_message(
    descriptor: &MessageDescriptor,
    buf: &[u8],
    offset: usize,
) -> SbeResult<(DecodedMessage, usize)> {
    decode_message_with(
        descriptor,
        buf,
        offset,
        &DecodeOptions::for_descriptor(descriptor),
    )
}

/// Decodes a message body at `offset` using the producer's block length and version.
///
/// Members introduced after `options.acting_version` are not read: fields decode to their
/// null value, groups to no items and var-data to empty bytes.
///
/// # Errors
///
/// Returns `MessageDecode` wrapping the first failure.
pub fn decode_message_with(
    descriptor: &MessageDescriptor,
    buf: &[u8],
    offset: usize,
    options: &DecodeOptions,
) -> SbeResult<(DecodedMessage, usize)> {
    let mut cursor = SbeCursor::new_at(buf, offset);
    decode_root(descriptor, &mut cursor, options)
        .map(|msg| (msg, cursor.pos()))
        .map_err(|e| SbeError::MessageDecode {
            name: descriptor.name,
            template_id: descriptor.template_id,
            source: Box::new(e),
        })
}

fn decode_root(
    descriptor: &MessageDescriptor,
    cursor: &mut SbeCursor<'_>,
    options: &DecodeOptions,
) -> SbeResult<DecodedMessage> {
    let required = descriptor.body.min_block_length(options.acting_version);
    if options.block_length < required {
        return Err(SbeError::InvalidBlockLength {
            expected: required,
            actual: options.block_length,
        });
    }
    if options.block_length > descriptor.block_length() {
        tracing::trace!(
            name = %descriptor.name,
            block_length = options.block_length,
            known = descriptor.block_length(),
            "Skipping unknown trailing bytes in root block"
        );
    }

    let block = cursor.read_bytes(options.block_length)?;
    decode_body(&descriptor.body, block, cursor, options)
}

fn decode_body<'a>(
    layout: &BlockLayout,
    block: &'a [u8],
    cursor: &mut SbeCursor<'a>,
    options: &DecodeOptions,
) -> SbeResult<DecodedMessage> {
    let mut msg = DecodedMessage::new();
    decode_fields(layout, block, options.acting_version, &mut msg)?;
    decode_trailing(layout, cursor, options, &mut msg)?;
    Ok(msg)
}

fn decode_fields(
    layout: &BlockLayout,
    block: &[u8],
    acting_version: u16,
    msg: &mut DecodedMessage,
) -> SbeResult<()> {
    for field in layout.fields() {
        let value = if field.since_version > acting_version {
            field.kind.null_value()
        } else {
            read_scalar(block, field.offset, field.kind)?.0
        };
        msg.fields.insert(field.name, value);
    }
    Ok(())
}

fn decode_trailing<'a>(
    layout: &BlockLayout,
    cursor: &mut SbeCursor<'a>,
    options: &DecodeOptions,
    msg: &mut DecodedMessage,
) -> SbeResult<()> {
    for group in layout.groups() {
        let items = if group.since_version > options.acting_version {
            Vec::new()
        } else {
            read_group(
                cursor,
                group.dimension,
                group.body.min_block_length(options.acting_version),
                options.max_group_size,
                |block, cursor| decode_body(&group.body, block, cursor, options),
            )?
        };
        msg.groups.insert(group.name, items);
    }

    for var in layout.var_data() {
        let value = if var.since_version > options.acting_version {
            Vec::new()
        } else {
            cursor.read_var_data(var.length_width)?.to_vec()
        };
        msg.var_data.insert(var.name, value);
    }

    Ok(())
}

/// Encodes `msg` as a message body (no header).
///
/// # Errors
///
/// Returns `MessageEncode` wrapping the first failure (`MissingField`, `ValueKindMismatch`,
/// `VarDataTooLong`, `GroupCountTooLarge`).
pub fn encode_message(descriptor: &MessageDescriptor, msg: &DecodedMessage) -> SbeResult<Vec<u8>> {
    let mut out = Vec::with_capacity(descriptor.block_length());
    encode_into(descriptor, msg, &mut out)?;
    Ok(out)
}

/// Appends the encoded body of `msg` to `out`.
///
/// On error `out` may hold a partial body.
///
/// # Errors
///
/// Returns `MessageEncode` wrapping the first failure.
pub fn encode_into(
    descriptor: &MessageDescriptor,
    msg: &DecodedMessage,
    out: &mut Vec<u8>,
) -> SbeResult<()> {
    encode_root(&descriptor.body, msg, out).map_err(|e| SbeError::MessageEncode {
        name: descriptor.name,
        template_id: descriptor.template_id,
        source: Box::new(e),
    })
}

fn encode_root(layout: &BlockLayout, msg: &DecodedMessage, out: &mut Vec<u8>) -> SbeResult<()> {
    let block_start = out.len();
    out.resize(block_start + layout.block_length(), 0);
    encode_fields(layout, msg, &mut out[block_start..])?;
    encode_trailing(layout, msg, out)
}

fn encode_fields(layout: &BlockLayout, msg: &DecodedMessage, block: &mut [u8]) -> SbeResult<()> {
    for field in layout.fields() {
        let value = match (msg.fields.get(&field.name), field.presence) {
            (Some(value), _) => *value,
            (None, Presence::Optional) => field.kind.null_value(),
            (None, Presence::Required) => return Err(SbeError::MissingField(field.name)),
        };
        write_scalar(block, field.offset, field.kind, value)?;
    }
    Ok(())
}

fn encode_trailing(layout: &BlockLayout, msg: &DecodedMessage, out: &mut Vec<u8>) -> SbeResult<()> {
    for group in layout.groups() {
        let items = msg.groups.get(&group.name).map_or(&[][..], Vec::as_slice);
        write_group(
            out,
            group.dimension,
            group.block_length(),
            items,
            |writer, item| {
                encode_fields(&group.body, item, writer.block_mut())?;
                encode_trailing(&group.body, item, writer.trailing())
            },
        )?;
    }

    for var in layout.var_data() {
        let value = msg.var_data.get(&var.name).map_or(&[][..], Vec::as_slice);
        write_var(out, value, var.length_width)?;
    }

    Ok(())
}
