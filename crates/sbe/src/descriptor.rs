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

//! Message, group, field and var-data descriptors.
//!
//! Descriptors are the data that drives the codec. Field offsets are never supplied by hand:
//! builders derive each offset from the widths of the preceding fields plus any declared
//! padding, so offsets are monotonically increasing and contiguous by construction.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use ustr::Ustr;

use crate::{
    error::{SbeError, SbeResult},
    group::GroupDimension,
    scalar::{ScalarKind, UintWidth},
};

/// Whether a field must be supplied on encode.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// Encoding fails with `MissingField` when absent.
    #[default]
    Required,
    /// Encoded as the kind's null value when absent.
    Optional,
}

/// Interpretation of a var-data payload. The codec never validates the payload.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VarDataEncoding {
    /// Opaque bytes.
    #[default]
    Bytes,
    /// UTF-8 text.
    #[strum(to_string = "utf8", serialize = "utf-8")]
    #[serde(alias = "utf-8")]
    Utf8,
}

/// A fixed-width field at a derived offset within its block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: Ustr,
    pub kind: ScalarKind,
    pub offset: usize,
    pub since_version: u16,
    pub presence: Presence,
}

impl FieldDescriptor {
    /// Encoded width in bytes.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.kind.width()
    }

    /// Offset of the first byte after the field.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.kind.width()
    }
}

/// Declaration of a field before its offset is assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: Ustr,
    pub kind: ScalarKind,
    pub since_version: u16,
    pub presence: Presence,
}

impl FieldSpec {
    /// Creates a required field introduced in version 0.
    #[must_use]
    pub fn new(name: &str, kind: ScalarKind) -> Self {
        Self {
            name: Ustr::from(name),
            kind,
            since_version: 0,
            presence: Presence::Required,
        }
    }

    /// Marks the field optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    /// Sets the schema version that introduced the field.
    #[must_use]
    pub const fn since(mut self, version: u16) -> Self {
        self.since_version = version;
        self
    }
}

/// A length-prefixed variable-length field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarDataDescriptor {
    pub name: Ustr,
    pub length_width: UintWidth,
    pub encoding: VarDataEncoding,
    pub since_version: u16,
}

impl VarDataDescriptor {
    /// Creates a `varDataEncoding` field (`uint32` length prefix, opaque bytes).
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Ustr::from(name),
            length_width: UintWidth::U32,
            encoding: VarDataEncoding::Bytes,
            since_version: 0,
        }
    }

    /// Creates a `varString8` field (`uint8` length prefix, UTF-8 text).
    #[must_use]
    pub fn var_string8(name: &str) -> Self {
        Self::new(name)
            .with_length_width(UintWidth::U8)
            .with_encoding(VarDataEncoding::Utf8)
    }

    #[must_use]
    pub const fn with_length_width(mut self, length_width: UintWidth) -> Self {
        self.length_width = length_width;
        self
    }

    #[must_use]
    pub const fn with_encoding(mut self, encoding: VarDataEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub const fn since(mut self, version: u16) -> Self {
        self.since_version = version;
        self
    }
}

/// Fixed block plus trailing groups and var-data, shared by messages and group items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockLayout {
    block_length: usize,
    fields: Vec<FieldDescriptor>,
    groups: Vec<GroupDescriptor>,
    var_data: Vec<VarDataDescriptor>,
}

impl BlockLayout {
    /// Declared fixed block length (the encode stride).
    #[must_use]
    pub const fn block_length(&self) -> usize {
        self.block_length
    }

    /// Fixed fields in offset order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Repeating groups in wire order.
    #[must_use]
    pub fn groups(&self) -> &[GroupDescriptor] {
        &self.groups
    }

    /// Var-data fields in wire order.
    #[must_use]
    pub fn var_data(&self) -> &[VarDataDescriptor] {
        &self.var_data
    }

    /// Looks up a fixed field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name.as_str() == name)
    }

    /// Looks up a group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&GroupDescriptor> {
        self.groups.iter().find(|g| g.name.as_str() == name)
    }

    /// Bytes of fixed block a producer at `acting_version` must provide: the end of the last
    /// field that version carries.
    #[must_use]
    pub fn min_block_length(&self, acting_version: u16) -> usize {
        self.fields
            .iter()
            .filter(|f| f.since_version <= acting_version)
            .map(FieldDescriptor::end)
            .max()
            .unwrap_or(0)
    }

    fn check_versions(&self, owner: Ustr, version: u16) -> SbeResult<()> {
        let newest = self
            .fields
            .iter()
            .map(|f| (f.name, f.since_version))
            .chain(self.groups.iter().map(|g| (g.name, g.since_version)))
            .chain(self.var_data.iter().map(|v| (v.name, v.since_version)))
            .find(|(_, since)| *since > version);

        if let Some((name, since)) = newest {
            return Err(SbeError::InvalidDescriptor(format!(
                "{owner}.{name} introduced in version {since}, after schema version {version}"
            )));
        }

        for group in &self.groups {
            group.body.check_versions(group.name, version)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct LayoutBuilder {
    next_offset: usize,
    offset_overflow: bool,
    block_length: Option<usize>,
    fields: Vec<FieldDescriptor>,
    groups: Vec<GroupDescriptor>,
    var_data: Vec<VarDataDescriptor>,
}

impl LayoutBuilder {
    /// Claims `bytes` at the next offset and returns where they start.
    fn reserve(&mut self, bytes: usize) -> usize {
        let offset = self.next_offset;
        match offset.checked_add(bytes) {
            Some(end) => self.next_offset = end,
            None => self.offset_overflow = true,
        }
        offset
    }

    fn push_field(&mut self, spec: FieldSpec) {
        let offset = self.reserve(spec.kind.width());
        self.fields.push(FieldDescriptor {
            name: spec.name,
            kind: spec.kind,
            offset,
            since_version: spec.since_version,
            presence: spec.presence,
        });
    }

    fn build(self, owner: Ustr, block_length_width: UintWidth) -> SbeResult<BlockLayout> {
        if self.offset_overflow {
            return Err(SbeError::InvalidDescriptor(format!(
                "{owner}: field offsets overflow"
            )));
        }

        let extent = self.next_offset;
        let block_length = self.block_length.unwrap_or(extent);

        if block_length < extent {
            return Err(SbeError::InvalidDescriptor(format!(
                "{owner}: block length {block_length} smaller than field extent {extent}"
            )));
        }
        if !u64::try_from(block_length).is_ok_and(|bl| block_length_width.fits(bl)) {
            return Err(SbeError::InvalidDescriptor(format!(
                "{owner}: block length {block_length} does not fit {block_length_width}"
            )));
        }

        let mut seen = AHashSet::new();
        let names = self
            .fields
            .iter()
            .map(|f| f.name)
            .chain(self.groups.iter().map(|g| g.name))
            .chain(self.var_data.iter().map(|v| v.name));
        for name in names {
            if !seen.insert(name) {
                return Err(SbeError::InvalidDescriptor(format!(
                    "{owner}: duplicate member name '{name}'"
                )));
            }
        }

        // Members are appended as the schema evolves
        check_non_decreasing(owner, self.fields.iter().map(|f| (f.name, f.since_version)))?;
        check_non_decreasing(owner, self.groups.iter().map(|g| (g.name, g.since_version)))?;
        check_non_decreasing(owner, self.var_data.iter().map(|v| (v.name, v.since_version)))?;

        Ok(BlockLayout {
            block_length,
            fields: self.fields,
            groups: self.groups,
            var_data: self.var_data,
        })
    }
}

fn check_non_decreasing(
    owner: Ustr,
    members: impl Iterator<Item = (Ustr, u16)>,
) -> SbeResult<()> {
    let mut previous = 0;
    for (name, since) in members {
        if since < previous {
            return Err(SbeError::InvalidDescriptor(format!(
                "{owner}.{name}: since_version {since} precedes an earlier member's {previous}"
            )));
        }
        previous = since;
    }
    Ok(())
}

macro_rules! layout_builder_methods {
    () => {
        /// Appends a required field at the next offset.
        #[must_use]
        pub fn field(self, name: &str, kind: ScalarKind) -> Self {
            self.field_spec(FieldSpec::new(name, kind))
        }

        /// Appends an optional field at the next offset.
        #[must_use]
        pub fn optional_field(self, name: &str, kind: ScalarKind) -> Self {
            self.field_spec(FieldSpec::new(name, kind).optional())
        }

        /// Appends a field declaration at the next offset.
        #[must_use]
        pub fn field_spec(mut self, spec: FieldSpec) -> Self {
            self.layout.push_field(spec);
            self
        }

        /// Skips `bytes` of padding before the next field.
        #[must_use]
        pub fn padding(mut self, bytes: usize) -> Self {
            self.layout.reserve(bytes);
            self
        }

        /// Declares the block length explicitly (defaults to the field extent).
        #[must_use]
        pub fn block_length(mut self, block_length: usize) -> Self {
            self.layout.block_length = Some(block_length);
            self
        }

        /// Appends a repeating group.
        #[must_use]
        pub fn group(mut self, group: GroupDescriptor) -> Self {
            self.layout.groups.push(group);
            self
        }

        /// Appends a var-data field.
        #[must_use]
        pub fn var_data(mut self, var_data: VarDataDescriptor) -> Self {
            self.layout.var_data.push(var_data);
            self
        }
    };
}

/// A repeating group: dimension encoding plus the layout of each item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupDescriptor {
    pub name: Ustr,
    pub dimension: GroupDimension,
    pub since_version: u16,
    pub body: BlockLayout,
}

impl GroupDescriptor {
    /// Starts a group with the default `groupSizeEncoding` dimension.
    #[must_use]
    pub fn builder(name: &str) -> GroupDescriptorBuilder {
        GroupDescriptorBuilder {
            name: Ustr::from(name),
            dimension: GroupDimension::default(),
            since_version: 0,
            layout: LayoutBuilder::default(),
        }
    }

    /// Declared per-item block length.
    #[must_use]
    pub const fn block_length(&self) -> usize {
        self.body.block_length
    }
}

/// Builder for [`GroupDescriptor`].
#[derive(Debug)]
pub struct GroupDescriptorBuilder {
    name: Ustr,
    dimension: GroupDimension,
    since_version: u16,
    layout: LayoutBuilder,
}

impl GroupDescriptorBuilder {
    layout_builder_methods!();

    /// Sets the dimension encoding.
    #[must_use]
    pub const fn dimension(mut self, dimension: GroupDimension) -> Self {
        self.dimension = dimension;
        self
    }

    /// Sets the schema version that introduced the group.
    #[must_use]
    pub const fn since(mut self, version: u16) -> Self {
        self.since_version = version;
        self
    }

    /// Validates and builds the group.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescriptor` on duplicate member names, a block length smaller than the
    /// field extent or too large for the dimension, or out-of-order member versions.
    pub fn build(self) -> SbeResult<GroupDescriptor> {
        let body = self.layout.build(self.name, self.dimension.block_length)?;
        Ok(GroupDescriptor {
            name: self.name,
            dimension: self.dimension,
            since_version: self.since_version,
            body,
        })
    }
}

/// A message template: identity plus root layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageDescriptor {
    pub name: Ustr,
    pub template_id: u16,
    pub schema_id: u16,
    pub version: u16,
    pub body: BlockLayout,
}

impl MessageDescriptor {
    /// Starts a message descriptor.
    #[must_use]
    pub fn builder(
        name: &str,
        template_id: u16,
        schema_id: u16,
        version: u16,
    ) -> MessageDescriptorBuilder {
        MessageDescriptorBuilder {
            name: Ustr::from(name),
            template_id,
            schema_id,
            version,
            layout: LayoutBuilder::default(),
        }
    }

    /// Declared root block length.
    #[must_use]
    pub const fn block_length(&self) -> usize {
        self.body.block_length
    }
}

/// Builder for [`MessageDescriptor`].
#[derive(Debug)]
pub struct MessageDescriptorBuilder {
    name: Ustr,
    template_id: u16,
    schema_id: u16,
    version: u16,
    layout: LayoutBuilder,
}

impl MessageDescriptorBuilder {
    layout_builder_methods!();

    /// Validates and builds the descriptor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescriptor` if any layout in the tree is invalid, or if any member was
    /// introduced after the schema version.
    pub fn build(self) -> SbeResult<MessageDescriptor> {
        // Root block length travels in the u16 header field
        let body = self.layout.build(self.name, UintWidth::U16)?;
        body.check_versions(self.name, self.version)?;

        Ok(MessageDescriptor {
            name: self.name,
            template_id: self.template_id,
            schema_id: self.schema_id,
            version: self.version,
            body,
        })
    }
}
