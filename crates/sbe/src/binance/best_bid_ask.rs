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

//! BestBidAsk stream event.
//!
//! Message layout (after 8-byte header):
//! - eventTime: i64 (microseconds)
//! - bookUpdateId: i64
//! - priceExponent: i8
//! - qtyExponent: i8
//! - bidPrice: i64 (mantissa)
//! - bidQty: i64 (mantissa)
//! - askPrice: i64 (mantissa)
//! - askQty: i64 (mantissa)
//! - symbol: varString8

use ustr::Ustr;

use super::{STREAM_SCHEMA_ID, STREAM_SCHEMA_VERSION, symbol, template_id};
use crate::{
    descriptor::{MessageDescriptor, VarDataDescriptor},
    error::{SbeError, SbeResult},
    message::DecodedMessage,
    scalar::ScalarKind,
};

/// Best bid/ask stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestBidAskStreamEvent {
    /// Event timestamp in microseconds.
    pub event_time_us: i64,
    /// Book update ID for sequencing.
    pub book_update_id: i64,
    /// Price exponent (prices = mantissa * 10^exponent).
    pub price_exponent: i8,
    /// Quantity exponent (quantities = mantissa * 10^exponent).
    pub qty_exponent: i8,
    /// Best bid price mantissa.
    pub bid_price_mantissa: i64,
    /// Best bid quantity mantissa.
    pub bid_qty_mantissa: i64,
    /// Best ask price mantissa.
    pub ask_price_mantissa: i64,
    /// Best ask quantity mantissa.
    pub ask_qty_mantissa: i64,
    /// Trading symbol.
    pub symbol: Ustr,
}

impl BestBidAskStreamEvent {
    /// Fixed block length (excluding header and variable-length data).
    pub const BLOCK_LENGTH: usize = 50;

    /// Returns the message descriptor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescriptor` if the table is malformed.
    pub fn descriptor() -> SbeResult<MessageDescriptor> {
        MessageDescriptor::builder(
            "BestBidAskStreamEvent",
            template_id::BEST_BID_ASK_STREAM_EVENT,
            STREAM_SCHEMA_ID,
            STREAM_SCHEMA_VERSION,
        )
        .field("eventTime", ScalarKind::Int64)
        .field("bookUpdateId", ScalarKind::Int64)
        .field("priceExponent", ScalarKind::Int8)
        .field("qtyExponent", ScalarKind::Int8)
        .field("bidPrice", ScalarKind::Int64)
        .field("bidQty", ScalarKind::Int64)
        .field("askPrice", ScalarKind::Int64)
        .field("askQty", ScalarKind::Int64)
        .block_length(Self::BLOCK_LENGTH)
        .var_data(VarDataDescriptor::var_string8("symbol"))
        .build()
    }

    /// Get bid price as f64.
    #[inline]
    #[must_use]
    pub fn bid_price(&self) -> f64 {
        super::mantissa_to_f64(self.bid_price_mantissa, self.price_exponent)
    }

    /// Get bid quantity as f64.
    #[inline]
    #[must_use]
    pub fn bid_qty(&self) -> f64 {
        super::mantissa_to_f64(self.bid_qty_mantissa, self.qty_exponent)
    }

    /// Get ask price as f64.
    #[inline]
    #[must_use]
    pub fn ask_price(&self) -> f64 {
        super::mantissa_to_f64(self.ask_price_mantissa, self.price_exponent)
    }

    /// Get ask quantity as f64.
    #[inline]
    #[must_use]
    pub fn ask_qty(&self) -> f64 {
        super::mantissa_to_f64(self.ask_qty_mantissa, self.qty_exponent)
    }
}

impl TryFrom<&DecodedMessage> for BestBidAskStreamEvent {
    type Error = SbeError;

    fn try_from(msg: &DecodedMessage) -> SbeResult<Self> {
        Ok(Self {
            event_time_us: msg.get("eventTime")?,
            book_update_id: msg.get("bookUpdateId")?,
            price_exponent: msg.get("priceExponent")?,
            qty_exponent: msg.get("qtyExponent")?,
            bid_price_mantissa: msg.get("bidPrice")?,
            bid_qty_mantissa: msg.get("bidQty")?,
            ask_price_mantissa: msg.get("askPrice")?,
            ask_qty_mantissa: msg.get("askQty")?,
            symbol: symbol(msg)?,
        })
    }
}

impl From<&BestBidAskStreamEvent> for DecodedMessage {
    fn from(event: &BestBidAskStreamEvent) -> Self {
        Self::new()
            .with_field("eventTime", event.event_time_us)
            .with_field("bookUpdateId", event.book_update_id)
            .with_field("priceExponent", event.price_exponent)
            .with_field("qtyExponent", event.qty_exponent)
            .with_field("bidPrice", event.bid_price_mantissa)
            .with_field("bidQty", event.bid_qty_mantissa)
            .with_field("askPrice", event.ask_price_mantissa)
            .with_field("askQty", event.ask_qty_mantissa)
            .with_var_data("symbol", event.symbol.as_str())
    }
}
