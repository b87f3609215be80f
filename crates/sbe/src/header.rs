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

//! SBE message header (envelope) codec with a configurable layout.

use std::str::FromStr;

use strum::{Display, EnumString};

use crate::{
    descriptor::MessageDescriptor,
    error::{SbeError, SbeResult},
    scalar::UintWidth,
};

/// A field of the message header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum HeaderField {
    #[strum(to_string = "block_length", serialize = "blockLength")]
    BlockLength,
    #[strum(to_string = "template_id", serialize = "templateId")]
    TemplateId,
    #[strum(to_string = "schema_id", serialize = "schemaId")]
    SchemaId,
    #[strum(to_string = "version")]
    Version,
    #[strum(to_string = "num_groups", serialize = "numGroups")]
    NumGroups,
    #[strum(to_string = "num_var_data_fields", serialize = "numVarDataFields")]
    NumVarDataFields,
}

impl HeaderField {
    /// Parses a header field name (snake_case or SBE camelCase).
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeader` if the name is not a known header field.
    pub fn parse(name: &str) -> SbeResult<Self> {
        Self::from_str(name)
            .map_err(|_| SbeError::InvalidHeader(format!("unknown header field '{name}'")))
    }

    const fn is_core(self) -> bool {
        matches!(
            self,
            Self::BlockLength | Self::TemplateId | Self::SchemaId | Self::Version
        )
    }
}

/// Decoded message header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MessageHeader {
    pub block_length: u16,
    pub template_id: u16,
    pub schema_id: u16,
    pub version: u16,
    /// Zero when the layout has no `numGroups` field.
    pub num_groups: u16,
    /// Zero when the layout has no `numVarDataFields` field.
    pub num_var_data_fields: u16,
}

impl MessageHeader {
    /// Builds the header announcing a body encoded with `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeader` if a count does not fit in `u16`.
    pub fn for_descriptor(descriptor: &MessageDescriptor) -> SbeResult<Self> {
        let narrow = |what: &str, value: usize| {
            u16::try_from(value)
                .map_err(|_| SbeError::InvalidHeader(format!("{what} {value} exceeds u16")))
        };

        Ok(Self {
            block_length: narrow("block length", descriptor.block_length())?,
            template_id: descriptor.template_id,
            schema_id: descriptor.schema_id,
            version: descriptor.version,
            num_groups: narrow("group count", descriptor.body.groups().len())?,
            num_var_data_fields: narrow("var-data count", descriptor.body.var_data().len())?,
        })
    }

    const fn get(&self, field: HeaderField) -> u16 {
        match field {
            HeaderField::BlockLength => self.block_length,
            HeaderField::TemplateId => self.template_id,
            HeaderField::SchemaId => self.schema_id,
            HeaderField::Version => self.version,
            HeaderField::NumGroups => self.num_groups,
            HeaderField::NumVarDataFields => self.num_var_data_fields,
        }
    }

    const fn set(&mut self, field: HeaderField, value: u16) {
        match field {
            HeaderField::BlockLength => self.block_length = value,
            HeaderField::TemplateId => self.template_id = value,
            HeaderField::SchemaId => self.schema_id = value,
            HeaderField::Version => self.version = value,
            HeaderField::NumGroups => self.num_groups = value,
            HeaderField::NumVarDataFields => self.num_var_data_fields = value,
        }
    }
}

/// A decoded header plus the offset at which the body starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageEnvelope {
    pub header: MessageHeader,
    pub body_offset: usize,
}

/// Ordered header fields and their widths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageHeaderLayout {
    fields: Vec<(HeaderField, UintWidth)>,
    encoded_length: usize,
}

impl MessageHeaderLayout {
    /// Standard SBE header: `blockLength`, `templateId`, `schemaId`, `version`, all `uint16`.
    #[must_use]
    pub fn standard() -> Self {
        Self::from_fields(vec![
            (HeaderField::BlockLength, UintWidth::U16),
            (HeaderField::TemplateId, UintWidth::U16),
            (HeaderField::SchemaId, UintWidth::U16),
            (HeaderField::Version, UintWidth::U16),
        ])
    }

    /// Creates a layout from ordered fields.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeader` if a field appears twice, a core field (`block_length`,
    /// `template_id`, `schema_id`, `version`) is missing, or a field is wider than `uint16`.
    pub fn new(fields: Vec<(HeaderField, UintWidth)>) -> SbeResult<Self> {
        for (i, (field, width)) in fields.iter().enumerate() {
            if fields[..i].iter().any(|(f, _)| f == field) {
                return Err(SbeError::InvalidHeader(format!(
                    "duplicate header field {field}"
                )));
            }
            if width.size() > UintWidth::U16.size() {
                return Err(SbeError::InvalidHeader(format!(
                    "header field {field} wider than uint16: {width}"
                )));
            }
        }

        let core_count = fields.iter().filter(|(f, _)| f.is_core()).count();
        if core_count != 4 {
            return Err(SbeError::InvalidHeader(
                "layout must contain block_length, template_id, schema_id and version".to_string(),
            ));
        }

        Ok(Self::from_fields(fields))
    }

    fn from_fields(fields: Vec<(HeaderField, UintWidth)>) -> Self {
        let encoded_length = fields.iter().map(|(_, w)| w.size()).sum();
        Self {
            fields,
            encoded_length,
        }
    }

    /// Header fields in wire order.
    #[must_use]
    pub fn fields(&self) -> &[(HeaderField, UintWidth)] {
        &self.fields
    }

    /// Encoded header length in bytes.
    #[must_use]
    pub const fn encoded_length(&self) -> usize {
        self.encoded_length
    }

    /// Decodes a header at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `BufferTooShort` if fewer than [`Self::encoded_length`] bytes remain.
    pub fn decode(&self, buf: &[u8], offset: usize) -> SbeResult<MessageEnvelope> {
        let mut header = MessageHeader::default();
        let mut pos = offset;

        for &(field, width) in &self.fields {
            // Widths are at most u16, enforced by `new`
            let value = width.read(buf, pos)? as u16;
            header.set(field, value);
            pos += width.size();
        }

        Ok(MessageEnvelope {
            header,
            body_offset: pos,
        })
    }

    /// Appends `header` in this layout.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeader` if a value does not fit its field width.
    pub fn encode(&self, header: &MessageHeader, out: &mut Vec<u8>) -> SbeResult<()> {
        for &(field, width) in &self.fields {
            let value = header.get(field);
            if !width.fits(u64::from(value)) {
                return Err(SbeError::InvalidHeader(format!(
                    "{field} value {value} does not fit {width}"
                )));
            }
            width.append(out, u64::from(value))?;
        }
        Ok(())
    }
}

impl Default for MessageHeaderLayout {
    fn default() -> Self {
        Self::standard()
    }
}
