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

//! Trades stream event.
//!
//! Message layout (after 8-byte header):
//! - eventTime: i64 (microseconds)
//! - transactTime: i64 (microseconds)
//! - priceExponent: i8
//! - qtyExponent: i8
//! - trades group (groupSizeEncoding: u16 blockLength + u32 numInGroup):
//!   - id: i64
//!   - price: i64 (mantissa)
//!   - qty: i64 (mantissa)
//!   - isBuyerMaker: u8
//! - symbol: varString8

use ustr::Ustr;

use super::{STREAM_SCHEMA_ID, STREAM_SCHEMA_VERSION, symbol, template_id};
use crate::{
    descriptor::{GroupDescriptor, MessageDescriptor, VarDataDescriptor},
    error::{SbeError, SbeResult},
    message::DecodedMessage,
    scalar::ScalarKind,
};

/// Individual trade within a trades stream event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    /// Trade ID.
    pub id: i64,
    /// Price mantissa.
    pub price_mantissa: i64,
    /// Quantity mantissa.
    pub qty_mantissa: i64,
    /// True if buyer is the maker (seller initiated the trade).
    pub is_buyer_maker: bool,
}

impl Trade {
    /// Encoded length per trade entry.
    pub const ENCODED_LENGTH: usize = 25;
}

impl TryFrom<&DecodedMessage> for Trade {
    type Error = SbeError;

    fn try_from(msg: &DecodedMessage) -> SbeResult<Self> {
        Ok(Self {
            id: msg.get("id")?,
            price_mantissa: msg.get("price")?,
            qty_mantissa: msg.get("qty")?,
            is_buyer_maker: msg.get::<u8>("isBuyerMaker")? != 0,
        })
    }
}

impl From<&Trade> for DecodedMessage {
    fn from(trade: &Trade) -> Self {
        Self::new()
            .with_field("id", trade.id)
            .with_field("price", trade.price_mantissa)
            .with_field("qty", trade.qty_mantissa)
            .with_field("isBuyerMaker", u8::from(trade.is_buyer_maker))
    }
}

/// Trades stream event (may contain multiple trades).
#[derive(Debug, Clone, PartialEq)]
pub struct TradesStreamEvent {
    /// Event timestamp in microseconds.
    pub event_time_us: i64,
    /// Transaction timestamp in microseconds.
    pub transact_time_us: i64,
    /// Price exponent (prices = mantissa * 10^exponent).
    pub price_exponent: i8,
    /// Quantity exponent (quantities = mantissa * 10^exponent).
    pub qty_exponent: i8,
    /// Trades in this event.
    pub trades: Vec<Trade>,
    /// Trading symbol.
    pub symbol: Ustr,
}

impl TradesStreamEvent {
    /// Fixed block length (excluding header, groups, and variable-length data).
    pub const BLOCK_LENGTH: usize = 18;

    /// Returns the message descriptor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescriptor` if the table is malformed.
    pub fn descriptor() -> SbeResult<MessageDescriptor> {
        let trades = GroupDescriptor::builder("trades")
            .field("id", ScalarKind::Int64)
            .field("price", ScalarKind::Int64)
            .field("qty", ScalarKind::Int64)
            .field("isBuyerMaker", ScalarKind::UInt8)
            .block_length(Trade::ENCODED_LENGTH)
            .build()?;

        MessageDescriptor::builder(
            "TradesStreamEvent",
            template_id::TRADES_STREAM_EVENT,
            STREAM_SCHEMA_ID,
            STREAM_SCHEMA_VERSION,
        )
        .field("eventTime", ScalarKind::Int64)
        .field("transactTime", ScalarKind::Int64)
        .field("priceExponent", ScalarKind::Int8)
        .field("qtyExponent", ScalarKind::Int8)
        .block_length(Self::BLOCK_LENGTH)
        .group(trades)
        .var_data(VarDataDescriptor::var_string8("symbol"))
        .build()
    }

    /// Get price as f64 for a trade.
    #[inline]
    #[must_use]
    pub fn trade_price(&self, trade: &Trade) -> f64 {
        super::mantissa_to_f64(trade.price_mantissa, self.price_exponent)
    }

    /// Get quantity as f64 for a trade.
    #[inline]
    #[must_use]
    pub fn trade_qty(&self, trade: &Trade) -> f64 {
        super::mantissa_to_f64(trade.qty_mantissa, self.qty_exponent)
    }
}

impl TryFrom<&DecodedMessage> for TradesStreamEvent {
    type Error = SbeError;

    fn try_from(msg: &DecodedMessage) -> SbeResult<Self> {
        Ok(Self {
            event_time_us: msg.get("eventTime")?,
            transact_time_us: msg.get("transactTime")?,
            price_exponent: msg.get("priceExponent")?,
            qty_exponent: msg.get("qtyExponent")?,
            trades: msg
                .group("trades")
                .iter()
                .map(Trade::try_from)
                .collect::<SbeResult<_>>()?,
            symbol: symbol(msg)?,
        })
    }
}

impl From<&TradesStreamEvent> for DecodedMessage {
    fn from(event: &TradesStreamEvent) -> Self {
        Self::new()
            .with_field("eventTime", event.event_time_us)
            .with_field("transactTime", event.transact_time_us)
            .with_field("priceExponent", event.price_exponent)
            .with_field("qtyExponent", event.qty_exponent)
            .with_group("trades", event.trades.iter().map(Self::from).collect())
            .with_var_data("symbol", event.symbol.as_str())
    }
}
