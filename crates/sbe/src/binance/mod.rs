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

//! Binance spot market data stream schema (schema 1, version 0).
//!
//! Each stream message is a descriptor table decoded by the generic codec, plus a typed view
//! built from the [`DecodedMessage`]. Prices and quantities travel as `i64` mantissas with a
//! per-message `i8` exponent.

mod best_bid_ask;
mod depth_diff;
mod depth_snapshot;
mod trades;

pub use best_bid_ask::BestBidAskStreamEvent;
pub use depth_diff::DepthDiffStreamEvent;
pub use depth_snapshot::DepthSnapshotStreamEvent;
pub use trades::{Trade, TradesStreamEvent};

use ustr::Ustr;

use crate::{
    descriptor::{GroupDescriptor, MessageDescriptor},
    error::{SbeError, SbeResult},
    group::GroupDimension,
    message::DecodedMessage,
    registry::SchemaRegistry,
    scalar::ScalarKind,
};

/// Stream schema ID.
pub const STREAM_SCHEMA_ID: u16 = 1;

/// Stream schema version.
pub const STREAM_SCHEMA_VERSION: u16 = 0;

/// Stream template IDs.
pub mod template_id {
    pub const TRADES_STREAM_EVENT: u16 = 10000;
    pub const BEST_BID_ASK_STREAM_EVENT: u16 = 10001;
    pub const DEPTH_SNAPSHOT_STREAM_EVENT: u16 = 10002;
    pub const DEPTH_DIFF_STREAM_EVENT: u16 = 10003;
}

/// Returns the descriptors of every stream message.
///
/// # Errors
///
/// Returns `InvalidDescriptor` if a table is malformed.
pub fn stream_descriptors() -> SbeResult<Vec<MessageDescriptor>> {
    Ok(vec![
        TradesStreamEvent::descriptor()?,
        BestBidAskStreamEvent::descriptor()?,
        DepthSnapshotStreamEvent::descriptor()?,
        DepthDiffStreamEvent::descriptor()?,
    ])
}

/// Creates a registry holding the stream schema with the standard header.
///
/// # Errors
///
/// Returns `InvalidDescriptor` if a table is malformed.
pub fn stream_registry() -> SbeResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    registry.register_schema(stream_descriptors()?)?;
    Ok(registry)
}

/// A decoded stream message.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketDataMessage {
    Trades(TradesStreamEvent),
    BestBidAsk(BestBidAskStreamEvent),
    DepthSnapshot(DepthSnapshotStreamEvent),
    DepthDiff(DepthDiffStreamEvent),
}

/// Decodes a stream frame (header + body) into its typed event.
///
/// # Errors
///
/// Returns any frame decode error, or `UnknownTemplate` if the frame is not a stream message.
pub fn decode_market_data(registry: &SchemaRegistry, buf: &[u8]) -> SbeResult<MarketDataMessage> {
    let frame = registry.decode_frame(buf, 0)?;
    let header = frame.header;
    let msg = &frame.message;

    if header.schema_id != STREAM_SCHEMA_ID {
        return Err(SbeError::UnknownTemplate {
            schema_id: header.schema_id,
            template_id: header.template_id,
        });
    }

    match header.template_id {
        template_id::TRADES_STREAM_EVENT => {
            TradesStreamEvent::try_from(msg).map(MarketDataMessage::Trades)
        }
        template_id::BEST_BID_ASK_STREAM_EVENT => {
            BestBidAskStreamEvent::try_from(msg).map(MarketDataMessage::BestBidAsk)
        }
        template_id::DEPTH_SNAPSHOT_STREAM_EVENT => {
            DepthSnapshotStreamEvent::try_from(msg).map(MarketDataMessage::DepthSnapshot)
        }
        template_id::DEPTH_DIFF_STREAM_EVENT => {
            DepthDiffStreamEvent::try_from(msg).map(MarketDataMessage::DepthDiff)
        }
        template_id => Err(SbeError::UnknownTemplate {
            schema_id: header.schema_id,
            template_id,
        }),
    }
}

/// Price/quantity level in order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    /// Price mantissa (multiply by 10^exponent to get actual price).
    pub price_mantissa: i64,
    /// Quantity mantissa (multiply by 10^exponent to get actual quantity).
    pub qty_mantissa: i64,
}

impl TryFrom<&DecodedMessage> for PriceLevel {
    type Error = SbeError;

    fn try_from(msg: &DecodedMessage) -> SbeResult<Self> {
        Ok(Self {
            price_mantissa: msg.get("price")?,
            qty_mantissa: msg.get("qty")?,
        })
    }
}

impl From<&PriceLevel> for DecodedMessage {
    fn from(level: &PriceLevel) -> Self {
        Self::new()
            .with_field("price", level.price_mantissa)
            .with_field("qty", level.qty_mantissa)
    }
}

/// Convert mantissa and exponent to f64.
#[inline]
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mantissa_to_f64(mantissa: i64, exponent: i8) -> f64 {
    mantissa as f64 * 10_f64.powi(i32::from(exponent))
}

// Order book levels as a groupSize16Encoding group.
fn price_level_group(name: &str) -> SbeResult<GroupDescriptor> {
    GroupDescriptor::builder(name)
        .dimension(GroupDimension::GROUP_SIZE_16)
        .field("price", ScalarKind::Int64)
        .field("qty", ScalarKind::Int64)
        .build()
}

fn price_levels(msg: &DecodedMessage, group: &str) -> SbeResult<Vec<PriceLevel>> {
    msg.group(group).iter().map(PriceLevel::try_from).collect()
}

fn level_items(levels: &[PriceLevel]) -> Vec<DecodedMessage> {
    levels.iter().map(DecodedMessage::from).collect()
}

fn symbol(msg: &DecodedMessage) -> SbeResult<Ustr> {
    msg.var_str("symbol")
        .map(|s| Ustr::from(&s))
        .ok_or_else(|| SbeError::MissingField(Ustr::from("symbol")))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_mantissa_to_f64() {
        assert!((mantissa_to_f64(12345, -2) - 123.45).abs() < 1e-10);
        assert!((mantissa_to_f64(100, 0) - 100.0).abs() < 1e-10);
        assert!((mantissa_to_f64(5, 3) - 5000.0).abs() < 1e-10);
    }

    #[rstest]
    fn test_stream_registry_templates() {
        let registry = stream_registry().unwrap();
        assert_eq!(registry.len(), 4);

        for (template, block_length) in [
            (template_id::TRADES_STREAM_EVENT, 18),
            (template_id::BEST_BID_ASK_STREAM_EVENT, 50),
            (template_id::DEPTH_SNAPSHOT_STREAM_EVENT, 18),
            (template_id::DEPTH_DIFF_STREAM_EVENT, 26),
        ] {
            let descriptor = registry.resolve(STREAM_SCHEMA_ID, template).unwrap();
            assert_eq!(descriptor.block_length(), block_length, "{}", descriptor.name);
            assert_eq!(descriptor.version, STREAM_SCHEMA_VERSION);
        }
    }

    #[rstest]
    fn test_decode_market_data_wrong_schema() {
        let registry = stream_registry().unwrap();
        // block_length=50, template_id=10001, schema_id=99, version=0
        let mut buf = vec![50, 0, 0x11, 0x27, 99, 0, 0, 0];
        buf.extend_from_slice(&[0u8; 51]);

        let err = decode_market_data(&registry, &buf).unwrap_err();
        assert_eq!(
            err,
            SbeError::UnknownTemplate {
                schema_id: 99,
                template_id: 10001
            }
        );
    }

    #[rstest]
    fn test_price_level_view() {
        let item = DecodedMessage::new()
            .with_field("price", 4_200_000i64)
            .with_field("qty", 100i64);
        let level = PriceLevel::try_from(&item).unwrap();

        assert_eq!(level.price_mantissa, 4_200_000);
        assert_eq!(DecodedMessage::from(&level), item);
    }
}
