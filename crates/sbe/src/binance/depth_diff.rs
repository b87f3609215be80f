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

//! Depth diff stream event.
//!
//! Message layout (after 8-byte header):
//! - eventTime: i64 (microseconds)
//! - firstBookUpdateId: i64
//! - lastBookUpdateId: i64
//! - priceExponent: i8
//! - qtyExponent: i8
//! - bids group (groupSize16Encoding: u16 blockLength + u16 numInGroup):
//!   - price: i64 (mantissa)
//!   - qty: i64 (mantissa)
//! - asks group (groupSize16Encoding: u16 blockLength + u16 numInGroup):
//!   - price: i64 (mantissa)
//!   - qty: i64 (mantissa)
//! - symbol: varString8

use ustr::Ustr;

use super::{
    PriceLevel, STREAM_SCHEMA_ID, STREAM_SCHEMA_VERSION, level_items, price_level_group,
    price_levels, symbol, template_id,
};
use crate::{
    descriptor::{MessageDescriptor, VarDataDescriptor},
    error::{SbeError, SbeResult},
    message::DecodedMessage,
    scalar::ScalarKind,
};

/// Depth diff stream event (incremental order book updates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthDiffStreamEvent {
    /// Event timestamp in microseconds.
    pub event_time_us: i64,
    /// First book update ID in this diff.
    pub first_book_update_id: i64,
    /// Last book update ID in this diff.
    pub last_book_update_id: i64,
    /// Price exponent (prices = mantissa * 10^exponent).
    pub price_exponent: i8,
    /// Quantity exponent (quantities = mantissa * 10^exponent).
    pub qty_exponent: i8,
    /// Bid level updates (qty=0 means remove level).
    pub bids: Vec<PriceLevel>,
    /// Ask level updates (qty=0 means remove level).
    pub asks: Vec<PriceLevel>,
    /// Trading symbol.
    pub symbol: Ustr,
}

impl DepthDiffStreamEvent {
    /// Fixed block length (excluding header, groups, and variable-length data).
    pub const BLOCK_LENGTH: usize = 26;

    /// Returns the message descriptor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescriptor` if the table is malformed.
    pub fn descriptor() -> SbeResult<MessageDescriptor> {
        MessageDescriptor::builder(
            "DepthDiffStreamEvent",
            template_id::DEPTH_DIFF_STREAM_EVENT,
            STREAM_SCHEMA_ID,
            STREAM_SCHEMA_VERSION,
        )
        .field("eventTime", ScalarKind::Int64)
        .field("firstBookUpdateId", ScalarKind::Int64)
        .field("lastBookUpdateId", ScalarKind::Int64)
        .field("priceExponent", ScalarKind::Int8)
        .field("qtyExponent", ScalarKind::Int8)
        .block_length(Self::BLOCK_LENGTH)
        .group(price_level_group("bids")?)
        .group(price_level_group("asks")?)
        .var_data(VarDataDescriptor::var_string8("symbol"))
        .build()
    }

    /// Get price as f64 for a level.
    #[inline]
    #[must_use]
    pub fn level_price(&self, level: &PriceLevel) -> f64 {
        super::mantissa_to_f64(level.price_mantissa, self.price_exponent)
    }

    /// Get quantity as f64 for a level.
    #[inline]
    #[must_use]
    pub fn level_qty(&self, level: &PriceLevel) -> f64 {
        super::mantissa_to_f64(level.qty_mantissa, self.qty_exponent)
    }
}

impl TryFrom<&DecodedMessage> for DepthDiffStreamEvent {
    type Error = SbeError;

    fn try_from(msg: &DecodedMessage) -> SbeResult<Self> {
        Ok(Self {
            event_time_us: msg.get("eventTime")?,
            first_book_update_id: msg.get("firstBookUpdateId")?,
            last_book_update_id: msg.get("lastBookUpdateId")?,
            price_exponent: msg.get("priceExponent")?,
            qty_exponent: msg.get("qtyExponent")?,
            bids: price_levels(msg, "bids")?,
            asks: price_levels(msg, "asks")?,
            symbol: symbol(msg)?,
        })
    }
}

impl From<&DepthDiffStreamEvent> for DecodedMessage {
    fn from(event: &DepthDiffStreamEvent) -> Self {
        Self::new()
            .with_field("eventTime", event.event_time_us)
            .with_field("firstBookUpdateId", event.first_book_update_id)
            .with_field("lastBookUpdateId", event.last_book_update_id)
            .with_field("priceExponent", event.price_exponent)
            .with_field("qtyExponent", event.qty_exponent)
            .with_group("bids", level_items(&event.bids))
            .with_group("asks", level_items(&event.asks))
            .with_var_data("symbol", event.symbol.as_str())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::binance::{MarketDataMessage, decode_market_data, stream_registry};

    fn make_valid_buffer(num_bids: usize, num_asks: usize) -> Vec<u8> {
        let level_block_len = 16u16;
        let body_size = 26
            + 4
            + (num_bids * level_block_len as usize)
            + 4
            + (num_asks * level_block_len as usize)
            + 8;
        let mut buf = vec![0u8; 8 + body_size];

        // Header
        buf[0..2].copy_from_slice(&26u16.to_le_bytes()); // block_length
        buf[2..4].copy_from_slice(&template_id::DEPTH_DIFF_STREAM_EVENT.to_le_bytes());
        buf[4..6].copy_from_slice(&STREAM_SCHEMA_ID.to_le_bytes());
        buf[6..8].copy_from_slice(&0u16.to_le_bytes()); // version

        // Body
        let body = &mut buf[8..];
        body[0..8].copy_from_slice(&1000000i64.to_le_bytes()); // event_time_us
        body[8..16].copy_from_slice(&12345i64.to_le_bytes()); // first_book_update_id
        body[16..24].copy_from_slice(&12350i64.to_le_bytes()); // last_book_update_id
        body[24] = (-2i8) as u8; // price_exponent
        body[25] = (-8i8) as u8; // qty_exponent

        let mut offset = 26;

        // Bids group header
        body[offset..offset + 2].copy_from_slice(&level_block_len.to_le_bytes());
        body[offset + 2..offset + 4].copy_from_slice(&(num_bids as u16).to_le_bytes());
        offset += 4;

        // Bids
        for i in 0..num_bids {
            body[offset..offset + 8].copy_from_slice(&(4200000i64 - i as i64 * 100).to_le_bytes());
            body[offset + 8..offset + 16].copy_from_slice(&100000000i64.to_le_bytes());
            offset += level_block_len as usize;
        }

        // Asks group header
        body[offset..offset + 2].copy_from_slice(&level_block_len.to_le_bytes());
        body[offset + 2..offset + 4].copy_from_slice(&(num_asks as u16).to_le_bytes());
        offset += 4;

        // Asks
        for i in 0..num_asks {
            body[offset..offset + 8].copy_from_slice(&(4200100i64 + i as i64 * 100).to_le_bytes());
            body[offset + 8..offset + 16].copy_from_slice(&0i64.to_le_bytes()); // removed level
            offset += level_block_len as usize;
        }

        // Symbol: "BTCUSDT"
        body[offset] = 7;
        body[offset + 1..offset + 8].copy_from_slice(b"BTCUSDT");

        buf
    }

    fn decode(buf: &[u8]) -> SbeResult<DepthDiffStreamEvent> {
        match decode_market_data(&stream_registry()?, buf)? {
            MarketDataMessage::DepthDiff(event) => Ok(event),
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[rstest]
    fn test_decode_valid() {
        let buf = make_valid_buffer(3, 2);
        let event = decode(&buf).unwrap();

        assert_eq!(event.event_time_us, 1000000);
        assert_eq!(event.first_book_update_id, 12345);
        assert_eq!(event.last_book_update_id, 12350);
        assert_eq!(event.bids.len(), 3);
        assert_eq!(event.asks.len(), 2);
        assert_eq!(event.asks[1].qty_mantissa, 0);
        assert_eq!(event.symbol.as_str(), "BTCUSDT");
        assert!((event.level_price(&event.bids[0]) - 42000.0).abs() < 0.01);
        assert!((event.level_qty(&event.bids[0]) - 1.0).abs() < 1e-12);
    }

    #[rstest]
    fn test_decode_one_byte_short() {
        let mut buf = make_valid_buffer(1, 1);
        buf.pop();
        let err = decode(&buf).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            SbeError::TruncatedVarData { .. }
        ));
    }

    #[rstest]
    fn test_decode_wrong_block_length_in_group() {
        let mut buf = make_valid_buffer(1, 0);
        // Bids group claims 8-byte items, too short for price + qty
        buf[8 + 26..8 + 28].copy_from_slice(&8u16.to_le_bytes());
        let err = decode(&buf).unwrap_err();
        assert_eq!(
            err.root_cause(),
            &SbeError::InvalidBlockLength {
                expected: 16,
                actual: 8
            }
        );
    }

    #[rstest]
    fn test_encode_matches_wire_layout() {
        let buf = make_valid_buffer(2, 2);
        let event = decode(&buf).unwrap();

        let encoded = stream_registry()
            .unwrap()
            .encode_frame(
                &DepthDiffStreamEvent::descriptor().unwrap(),
                &DecodedMessage::from(&event),
            )
            .unwrap();
        assert_eq!(encoded, buf);
    }
}
