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

//! Schema-driven [Simple Binary Encoding](https://github.com/aeron-io/simple-binary-encoding)
//! (SBE) codec for [NautilusTrader](http://nautilustrader.io).
//!
//! Messages are described at runtime by descriptor tables (fields at fixed offsets, repeating
//! groups, variable-length data) rather than by generated code. A single generic engine decodes
//! any described message into a [`DecodedMessage`] tree and encodes that tree back to the exact
//! wire bytes.
//!
//! # Wire format
//!
//! All integers are little-endian. A frame is a message header (by default `blockLength`,
//! `templateId`, `schemaId`, `version` as `u16`) followed by the root block, the repeating groups
//! in declaration order, and finally the variable-length data fields. Each group carries its own
//! dimension header (`blockLength` + `numInGroup`) and each item's nested groups and var-data
//! follow that item's fixed block.
//!
//! Decoding always strides by the block length found on the wire, so a consumer holding an older
//! descriptor skips fields appended by a newer producer.
//!
//! # Modules
//!
//! - [`scalar`], [`cursor`], [`var_data`], [`group`]: wire primitives.
//! - [`descriptor`], [`message`]: descriptor tables and the decoded value tree.
//! - [`codec`], [`header`], [`registry`]: the generic engine and template dispatch.
//! - [`schema`], [`config`]: loading descriptor tables from JSON or TOML files.
//! - [`binance`]: descriptor tables and typed views for the Binance spot market data streams.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod binance;
pub mod codec;
pub mod config;
pub mod cursor;
pub mod descriptor;
pub mod error;
pub mod group;
pub mod header;
pub mod message;
pub mod registry;
pub mod scalar;
pub mod schema;
pub mod var_data;

pub use crate::{
    codec::{DecodeOptions, decode_message, decode_message_with, encode_into, encode_message},
    config::{CodecConfig, MAX_GROUP_SIZE},
    cursor::SbeCursor,
    descriptor::{
        FieldDescriptor, FieldSpec, GroupDescriptor, MessageDescriptor, Presence,
        VarDataDescriptor, VarDataEncoding,
    },
    error::{SbeError, SbeResult},
    group::GroupDimension,
    header::{HeaderField, MessageEnvelope, MessageHeader, MessageHeaderLayout},
    message::DecodedMessage,
    registry::{DecodedFrame, SchemaRegistry},
    scalar::{ScalarKind, ScalarValue, UintWidth},
    schema::SchemaDefinition,
};
