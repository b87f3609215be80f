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

//! Schema definition files.
//!
//! A schema is a JSON or TOML document listing message templates. Primitive and width names
//! use the SBE spellings (`int64`, `uint16`, `double`, ...).
//!
//! ```toml
//! schema_id = 1
//! version = 0
//!
//! [[messages]]
//! name = "BestBidAskStreamEvent"
//! template_id = 10001
//! fields = [
//!     { name = "eventTime", type = "int64" },
//!     { name = "bookUpdateId", type = "int64" },
//! ]
//! var_data = [{ name = "symbol", length_type = "uint8", encoding = "utf8" }]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    config::CodecConfig,
    descriptor::{
        FieldSpec, GroupDescriptor, GroupDescriptorBuilder, MessageDescriptor,
        MessageDescriptorBuilder, Presence, VarDataDescriptor, VarDataEncoding,
    },
    error::{SbeError, SbeResult},
    group::GroupDimension,
    header::{HeaderField, MessageHeaderLayout},
    registry::SchemaRegistry,
    scalar::{ScalarKind, UintWidth},
};

/// Top-level schema document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    pub schema_id: u16,
    #[serde(default)]
    pub version: u16,
    /// Header fields as `[name, width]` pairs. Defaults to the standard SBE header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Vec<(String, String)>>,
    #[serde(default)]
    pub config: CodecConfig,
    #[serde(default)]
    pub messages: Vec<MessageDefinition>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageDefinition {
    pub name: String,
    pub template_id: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_length: Option<usize>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub groups: Vec<GroupDefinition>,
    #[serde(default)]
    pub var_data: Vec<VarDataDefinition>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub since_version: u16,
    #[serde(default)]
    pub presence: Presence,
    /// Padding bytes inserted before this field.
    #[serde(default)]
    pub padding: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_length: Option<usize>,
    #[serde(default = "default_block_length_type")]
    pub block_length_type: String,
    #[serde(default = "default_count_type")]
    pub count_type: String,
    #[serde(default)]
    pub since_version: u16,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub groups: Vec<GroupDefinition>,
    #[serde(default)]
    pub var_data: Vec<VarDataDefinition>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VarDataDefinition {
    pub name: String,
    #[serde(default = "default_length_type")]
    pub length_type: String,
    #[serde(default)]
    pub encoding: VarDataEncoding,
    #[serde(default)]
    pub since_version: u16,
}

fn default_block_length_type() -> String {
    UintWidth::U16.to_string()
}

fn default_count_type() -> String {
    UintWidth::U32.to_string()
}

fn default_length_type() -> String {
    UintWidth::U32.to_string()
}

impl SchemaDefinition {
    /// Parses a JSON schema document.
    ///
    /// # Errors
    ///
    /// Returns `Schema` if the document is malformed.
    pub fn from_json(text: &str) -> SbeResult<Self> {
        serde_json::from_str(text).map_err(|e| SbeError::Schema(format!("invalid JSON: {e}")))
    }

    /// Parses a TOML schema document.
    ///
    /// # Errors
    ///
    /// Returns `Schema` if the document is malformed.
    pub fn from_toml(text: &str) -> SbeResult<Self> {
        toml::from_str(text).map_err(|e| SbeError::Schema(format!("invalid TOML: {e}")))
    }

    /// Loads a schema file, choosing the format by extension (`.toml`, otherwise JSON).
    ///
    /// # Errors
    ///
    /// Returns `Schema` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> SbeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SbeError::Schema(format!("failed to read {}: {e}", path.display())))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml(&text)
        } else {
            Self::from_json(&text)
        }
    }

    /// Builds the header layout.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeader` or `UnsupportedKind` for a malformed header declaration.
    pub fn header_layout(&self) -> SbeResult<MessageHeaderLayout> {
        let Some(header) = &self.header else {
            return Ok(MessageHeaderLayout::standard());
        };

        let fields = header
            .iter()
            .map(|(name, width)| Ok((HeaderField::parse(name)?, UintWidth::parse(width)?)))
            .collect::<SbeResult<Vec<_>>>()?;
        MessageHeaderLayout::new(fields)
    }

    /// Builds a descriptor for every message.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedKind` for unknown type names, or `InvalidDescriptor` for an invalid
    /// layout.
    pub fn descriptors(&self) -> SbeResult<Vec<MessageDescriptor>> {
        self.messages
            .iter()
            .map(|msg| self.message_descriptor(msg))
            .collect()
    }

    /// Builds a registry holding every message, with this schema's header and config.
    ///
    /// # Errors
    ///
    /// Returns any descriptor or header error, or `DuplicateTemplate`.
    pub fn build_registry(&self) -> SbeResult<SchemaRegistry> {
        let mut registry = SchemaRegistry::with_layout(self.header_layout()?, self.config);
        registry.register_schema(self.descriptors()?)?;
        Ok(registry)
    }

    fn message_descriptor(&self, def: &MessageDefinition) -> SbeResult<MessageDescriptor> {
        let mut builder =
            MessageDescriptor::builder(&def.name, def.template_id, self.schema_id, self.version);
        for field in &def.fields {
            builder = builder.padding(field.padding).field_spec(field.spec()?);
        }
        if let Some(block_length) = def.block_length {
            builder = builder.block_length(block_length);
        }
        builder = add_members(
            builder,
            &def.groups,
            &def.var_data,
            MessageDescriptorBuilder::group,
            MessageDescriptorBuilder::var_data,
        )?;
        builder.build()
    }
}

impl FieldDefinition {
    fn spec(&self) -> SbeResult<FieldSpec> {
        Ok(FieldSpec {
            presence: self.presence,
            ..FieldSpec::new(&self.name, ScalarKind::parse(&self.kind)?).since(self.since_version)
        })
    }
}

impl GroupDefinition {
    fn descriptor(&self) -> SbeResult<GroupDescriptor> {
        let dimension = GroupDimension::new(
            UintWidth::parse(&self.block_length_type)?,
            UintWidth::parse(&self.count_type)?,
        );

        let mut builder = GroupDescriptor::builder(&self.name)
            .dimension(dimension)
            .since(self.since_version);
        for field in &self.fields {
            builder = builder.padding(field.padding).field_spec(field.spec()?);
        }
        if let Some(block_length) = self.block_length {
            builder = builder.block_length(block_length);
        }
        builder = add_members(
            builder,
            &self.groups,
            &self.var_data,
            GroupDescriptorBuilder::group,
            GroupDescriptorBuilder::var_data,
        )?;
        builder.build()
    }
}

impl VarDataDefinition {
    fn descriptor(&self) -> SbeResult<VarDataDescriptor> {
        Ok(VarDataDescriptor::new(&self.name)
            .with_length_width(UintWidth::parse(&self.length_type)?)
            .with_encoding(self.encoding)
            .since(self.since_version))
    }
}

fn add_members<B>(
    mut builder: B,
    groups: &[GroupDefinition],
    var_data: &[VarDataDefinition],
    add_group: fn(B, GroupDescriptor) -> B,
    add_var_data: fn(B, VarDataDescriptor) -> B,
) -> SbeResult<B> {
    for group in groups {
        builder = add_group(builder, group.descriptor()?);
    }
    for var in var_data {
        builder = add_var_data(builder, var.descriptor()?);
    }
    Ok(builder)
}
