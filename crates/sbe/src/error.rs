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

//! Unified SBE codec error type.

use thiserror::Error;
use ustr::Ustr;

use crate::scalar::ScalarKind;

/// Result type for SBE codec operations.
pub type SbeResult<T> = Result<T, SbeError>;

/// SBE encode/decode error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SbeError {
    /// Buffer too short to read or write the expected bytes.
    #[error("Buffer too short: expected {expected} bytes, was {actual}")]
    BufferTooShort {
        /// Expected minimum bytes.
        expected: usize,
        /// Actual bytes available.
        actual: usize,
    },
    /// Declared var-data length runs past the end of the buffer.
    #[error(
        "Truncated var-data at offset {offset}: declared {length} bytes, {available} available"
    )]
    TruncatedVarData {
        /// Offset of the var-data payload (after the length prefix).
        offset: usize,
        /// Declared payload length.
        length: u64,
        /// Bytes remaining in the buffer.
        available: usize,
    },
    /// Var-data value does not fit the declared length prefix.
    #[error("Var-data length {length} exceeds maximum {max} for the length prefix")]
    VarDataTooLong {
        /// Actual value length.
        length: usize,
        /// Largest length the prefix can carry.
        max: u64,
    },
    /// Declared group count times block length exceeds the remaining buffer.
    #[error(
        "Group count {count} with block length {block_length} exceeds remaining {remaining} bytes"
    )]
    GroupCountOverflow {
        /// Declared item count.
        count: u64,
        /// Declared item block length.
        block_length: usize,
        /// Bytes remaining after the group header.
        remaining: usize,
    },
    /// Group count exceeds the configured safety limit.
    #[error("Group size {count} exceeds maximum {max}")]
    GroupSizeTooLarge {
        /// Actual count.
        count: u64,
        /// Maximum allowed.
        max: u32,
    },
    /// Group item count does not fit the count field on encode.
    #[error("Group count {count} exceeds maximum {max} for the count field")]
    GroupCountTooLarge {
        /// Actual count.
        count: usize,
        /// Largest count the field can carry.
        max: u64,
    },
    /// Block length too small for the fields that must be read.
    #[error("Invalid block length: expected at least {expected}, was {actual}")]
    InvalidBlockLength {
        /// Minimum bytes required by the known fields.
        expected: usize,
        /// Declared block length.
        actual: usize,
    },
    /// No descriptor registered for the schema and template.
    #[error("Unknown template ID {template_id} for schema {schema_id}")]
    UnknownTemplate {
        /// Schema ID.
        schema_id: u16,
        /// Template ID.
        template_id: u16,
    },
    /// A descriptor is already registered for the schema and template.
    #[error("Duplicate template ID {template_id} for schema {schema_id}")]
    DuplicateTemplate {
        /// Schema ID.
        schema_id: u16,
        /// Template ID.
        template_id: u16,
    },
    /// Schema version mismatch in strict mode.
    #[error("Schema version mismatch: expected {expected}, was {actual}")]
    VersionMismatch {
        /// Registered schema version.
        expected: u16,
        /// Advertised schema version.
        actual: u16,
    },
    /// Unrecognized scalar kind name.
    #[error("Unsupported scalar kind: {0}")]
    UnsupportedKind(String),
    /// Scalar value variant differs from the declared kind.
    #[error("Value kind mismatch: expected {expected}, was {actual}")]
    ValueKindMismatch {
        /// Declared kind.
        expected: ScalarKind,
        /// Kind of the supplied value.
        actual: ScalarKind,
    },
    /// Required field absent from the message being encoded or converted.
    #[error("Missing field: {0}")]
    MissingField(Ustr),
    /// Malformed descriptor.
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),
    /// Malformed message header or header layout.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    /// Schema definition could not be parsed or loaded.
    #[error("Schema error: {0}")]
    Schema(String),
    /// Decode failure with message context.
    #[error("Failed to decode message {name} (template {template_id}): {source}")]
    MessageDecode {
        /// Message name.
        name: Ustr,
        /// Template ID.
        template_id: u16,
        /// Underlying error.
        source: Box<SbeError>,
    },
    /// Encode failure with message context.
    #[error("Failed to encode message {name} (template {template_id}): {source}")]
    MessageEncode {
        /// Message name.
        name: Ustr,
        /// Template ID.
        template_id: u16,
        /// Underlying error.
        source: Box<SbeError>,
    },
}

impl SbeError {
    /// Returns the innermost error, unwrapping message context.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::MessageDecode { source, .. } | Self::MessageEncode { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Returns the template ID when the error carries message context.
    #[must_use]
    pub const fn template_id(&self) -> Option<u16> {
        match self {
            Self::MessageDecode { template_id, .. } | Self::MessageEncode { template_id, .. } => {
                Some(*template_id)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_buffer_too_short_display() {
        let err = SbeError::BufferTooShort {
            expected: 100,
            actual: 50,
        };
        assert_eq!(
            err.to_string(),
            "Buffer too short: expected 100 bytes, was 50"
        );
    }

    #[rstest]
    fn test_group_size_too_large_display() {
        let err = SbeError::GroupSizeTooLarge {
            count: 50000,
            max: 10000,
        };
        assert_eq!(err.to_string(), "Group size 50000 exceeds maximum 10000");
    }

    #[rstest]
    fn test_value_kind_mismatch_display() {
        let err = SbeError::ValueKindMismatch {
            expected: ScalarKind::Int64,
            actual: ScalarKind::UInt8,
        };
        assert_eq!(
            err.to_string(),
            "Value kind mismatch: expected int64, was uint8"
        );
    }

    #[rstest]
    fn test_message_decode_display_and_root_cause() {
        let inner = SbeError::BufferTooShort {
            expected: 26,
            actual: 25,
        };
        let err = SbeError::MessageDecode {
            name: Ustr::from("DepthDiffStreamEvent"),
            template_id: 10003,
            source: Box::new(inner.clone()),
        };

        assert_eq!(
            err.to_string(),
            "Failed to decode message DepthDiffStreamEvent (template 10003): \
             Buffer too short: expected 26 bytes, was 25"
        );
        assert_eq!(err.root_cause(), &inner);
        assert_eq!(err.template_id(), Some(10003));
        assert_eq!(inner.template_id(), None);
    }

    #[rstest]
    fn test_source_chain() {
        let err = SbeError::MessageEncode {
            name: Ustr::from("Ping"),
            template_id: 1,
            source: Box::new(SbeError::MissingField(Ustr::from("id"))),
        };
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("Missing field: id"));
    }
}
