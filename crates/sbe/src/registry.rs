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

//! Schema registry: maps `(schema_id, template_id)` to message descriptors and frames bodies
//! with a message header.
//!
//! The registry is built once, then shared read-only (typically as `Arc<SchemaRegistry>`).

use std::sync::Arc;

use ahash::AHashMap;

use crate::{
    codec::{DecodeOptions, decode_message_with, encode_into},
    config::CodecConfig,
    descriptor::MessageDescriptor,
    error::{SbeError, SbeResult},
    header::{MessageEnvelope, MessageHeader, MessageHeaderLayout},
    message::DecodedMessage,
};

/// A fully decoded frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedFrame {
    pub header: MessageHeader,
    pub descriptor: Arc<MessageDescriptor>,
    pub message: DecodedMessage,
    /// Offset of the first byte after the frame.
    pub next_offset: usize,
}

/// Registry of message descriptors keyed by schema and template.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    header: MessageHeaderLayout,
    config: CodecConfig,
    templates: AHashMap<(u16, u16), Arc<MessageDescriptor>>,
}

impl SchemaRegistry {
    /// Creates an empty registry with the standard header and default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given header layout and config.
    #[must_use]
    pub fn with_layout(header: MessageHeaderLayout, config: CodecConfig) -> Self {
        Self {
            header,
            config,
            templates: AHashMap::new(),
        }
    }

    #[must_use]
    pub const fn header_layout(&self) -> &MessageHeaderLayout {
        &self.header
    }

    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Registers a descriptor.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateTemplate` if the schema and template are already registered. The
    /// existing registration is kept.
    pub fn register(&mut self, descriptor: MessageDescriptor) -> SbeResult<Arc<MessageDescriptor>> {
        let key = (descriptor.schema_id, descriptor.template_id);
        if self.templates.contains_key(&key) {
            return Err(SbeError::DuplicateTemplate {
                schema_id: key.0,
                template_id: key.1,
            });
        }

        tracing::debug!(
            name = %descriptor.name,
            schema_id = key.0,
            template_id = key.1,
            version = descriptor.version,
            "Registered SBE template"
        );

        let descriptor = Arc::new(descriptor);
        self.templates.insert(key, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Registers every descriptor, or none if any would collide.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateTemplate` on the first collision with an existing registration or
    /// within `descriptors`.
    pub fn register_schema(
        &mut self,
        descriptors: impl IntoIterator<Item = MessageDescriptor>,
    ) -> SbeResult<()> {
        let descriptors: Vec<MessageDescriptor> = descriptors.into_iter().collect();

        let mut pending = ahash::AHashSet::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            let key = (descriptor.schema_id, descriptor.template_id);
            if self.templates.contains_key(&key) || !pending.insert(key) {
                return Err(SbeError::DuplicateTemplate {
                    schema_id: key.0,
                    template_id: key.1,
                });
            }
        }

        for descriptor in descriptors {
            self.register(descriptor)?;
        }
        Ok(())
    }

    /// Looks up a descriptor.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTemplate` if nothing is registered for the pair.
    pub fn resolve(&self, schema_id: u16, template_id: u16) -> SbeResult<Arc<MessageDescriptor>> {
        self.templates
            .get(&(schema_id, template_id))
            .cloned()
            .ok_or(SbeError::UnknownTemplate {
                schema_id,
                template_id,
            })
    }

    /// Decodes the message header at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `BufferTooShort` if the header is truncated.
    pub fn decode_envelope(&self, buf: &[u8], offset: usize) -> SbeResult<MessageEnvelope> {
        self.header.decode(buf, offset)
    }

    /// Decodes a header plus body at `offset`.
    ///
    /// The body is decoded with the block length and version advertised in the header, so
    /// frames from older and newer producers of the same schema decode.
    ///
    /// # Errors
    ///
    /// Returns `BufferTooShort` for a truncated header, `UnknownTemplate` if the template is
    /// not registered, `VersionMismatch` in strict mode, or `MessageDecode` on body failure.
    pub fn decode_frame(&self, buf: &[u8], offset: usize) -> SbeResult<DecodedFrame> {
        let envelope = self.decode_envelope(buf, offset)?;
        let header = envelope.header;
        let descriptor = self.resolve(header.schema_id, header.template_id)?;

        if header.version != descriptor.version {
            if self.config.strict_version {
                tracing::warn!(
                    name = %descriptor.name,
                    expected = descriptor.version,
                    actual = header.version,
                    "Rejected SBE frame with mismatched schema version"
                );
                return Err(SbeError::VersionMismatch {
                    expected: descriptor.version,
                    actual: header.version,
                });
            }
            tracing::trace!(
                name = %descriptor.name,
                registered = descriptor.version,
                acting = header.version,
                "Decoding with acting version"
            );
        }

        let options = DecodeOptions {
            block_length: usize::from(header.block_length),
            acting_version: header.version,
            max_group_size: self.config.max_group_size,
        };
        let (message, next_offset) =
            decode_message_with(&descriptor, buf, envelope.body_offset, &options)?;

        Ok(DecodedFrame {
            header,
            descriptor,
            message,
            next_offset,
        })
    }

    /// Decodes consecutive frames from `offset` to the end of `buf`.
    ///
    /// # Errors
    ///
    /// Returns the first frame error.
    pub fn decode_frames(&self, buf: &[u8], mut offset: usize) -> SbeResult<Vec<DecodedFrame>> {
        let mut frames = Vec::new();
        while offset < buf.len() {
            let frame = self.decode_frame(buf, offset)?;
            offset = frame.next_offset;
            frames.push(frame);
        }
        Ok(frames)
    }

    /// Encodes a header plus body.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeader` if a header value does not fit the layout, or `MessageEncode`
    /// on body failure.
    pub fn encode_frame(
        &self,
        descriptor: &MessageDescriptor,
        message: &DecodedMessage,
    ) -> SbeResult<Vec<u8>> {
        let header = MessageHeader::for_descriptor(descriptor)?;
        let mut out =
            Vec::with_capacity(self.header.encoded_length() + descriptor.block_length());
        self.header.encode(&header, &mut out)?;
        encode_into(descriptor, message, &mut out)?;
        Ok(out)
    }
}
