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

//! Integration tests for template registration and frame dispatch.

use std::{sync::Arc, thread};

use nautilus_sbe::{
    CodecConfig, DecodedMessage, FieldSpec, HeaderField, MessageDescriptor, MessageHeaderLayout,
    ScalarKind, SbeError, SchemaRegistry, UintWidth, VarDataDescriptor,
    binance::{
        BestBidAskStreamEvent, MarketDataMessage, decode_market_data, stream_registry,
    },
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use ustr::Ustr;

fn quote_v0() -> MessageDescriptor {
    MessageDescriptor::builder("Quote", 1, 5, 0)
        .field("bid", ScalarKind::Int64)
        .field("ask", ScalarKind::Int64)
        .var_data(VarDataDescriptor::var_string8("symbol"))
        .build()
        .unwrap()
}

fn quote_v1() -> MessageDescriptor {
    MessageDescriptor::builder("Quote", 1, 5, 1)
        .field("bid", ScalarKind::Int64)
        .field("ask", ScalarKind::Int64)
        .field_spec(FieldSpec::new("ts", ScalarKind::UInt64).since(1))
        .var_data(VarDataDescriptor::var_string8("symbol"))
        .build()
        .unwrap()
}

fn status() -> MessageDescriptor {
    MessageDescriptor::builder("Status", 2, 5, 0)
        .field("code", ScalarKind::UInt8)
        .build()
        .unwrap()
}

fn quote(bid: i64, ask: i64) -> DecodedMessage {
    DecodedMessage::new()
        .with_field("bid", bid)
        .with_field("ask", ask)
        .with_field("ts", 77u64)
        .with_var_data("symbol", "ETHUSDT")
}

#[rstest]
fn test_duplicate_registration_keeps_first() {
    let mut registry = SchemaRegistry::new();
    registry.register(quote_v0()).unwrap();

    let err = registry.register(quote_v1()).unwrap_err();
    assert_eq!(
        err,
        SbeError::DuplicateTemplate {
            schema_id: 5,
            template_id: 1
        }
    );

    let resolved = registry.resolve(5, 1).unwrap();
    assert_eq!(resolved.version, 0);
    assert_eq!(*resolved, quote_v0());
    assert_eq!(registry.len(), 1);
}

#[rstest]
fn test_register_schema_is_all_or_nothing() {
    let mut registry = SchemaRegistry::new();
    registry.register(status()).unwrap();

    let err = registry.register_schema([quote_v0(), status()]).unwrap_err();
    assert!(matches!(err, SbeError::DuplicateTemplate { template_id: 2, .. }));
    assert!(matches!(
        registry.resolve(5, 1),
        Err(SbeError::UnknownTemplate { .. })
    ));
}

#[rstest]
fn test_decode_back_to_back_frames() {
    let mut registry = SchemaRegistry::new();
    registry.register_schema([quote_v0(), status()]).unwrap();

    let mut buf = registry.encode_frame(&quote_v0(), &quote(100, 101)).unwrap();
    buf.extend(
        registry
            .encode_frame(&status(), &DecodedMessage::new().with_field("code", 3u8))
            .unwrap(),
    );
    buf.extend(registry.encode_frame(&quote_v0(), &quote(102, 103)).unwrap());

    let frames = registry.decode_frames(&buf, 0).unwrap();
    let names: Vec<&str> = frames.iter().map(|f| f.descriptor.name.as_str()).collect();
    assert_eq!(names, ["Quote", "Status", "Quote"]);
    assert_eq!(frames[2].message.get::<i64>("ask").unwrap(), 103);
    assert_eq!(frames[2].next_offset, buf.len());
    assert_eq!(frames[0].header.block_length, 16);
}

#[rstest]
fn test_unknown_template_frame() {
    let mut registry = SchemaRegistry::new();
    registry.register(quote_v0()).unwrap();
    let buf = [1, 0, 9, 0, 5, 0, 0, 0, 0];

    let err = registry.decode_frame(&buf, 0).unwrap_err();
    assert_eq!(
        err,
        SbeError::UnknownTemplate {
            schema_id: 5,
            template_id: 9
        }
    );
}

#[rstest]
fn test_newer_frame_with_lenient_and_strict_registry() {
    let producer = SchemaRegistry::new();
    let frame = producer.encode_frame(&quote_v1(), &quote(5, 6)).unwrap();

    let mut lenient = SchemaRegistry::new();
    lenient.register(quote_v0()).unwrap();
    let decoded = lenient.decode_frame(&frame, 0).unwrap();
    assert_eq!(decoded.header.version, 1);
    assert_eq!(decoded.header.block_length, 24);
    assert_eq!(decoded.message.var_str("symbol").as_deref(), Some("ETHUSDT"));
    assert_eq!(decoded.next_offset, frame.len());

    let config = CodecConfig {
        strict_version: true,
        ..CodecConfig::default()
    };
    let mut strict = SchemaRegistry::with_layout(MessageHeaderLayout::standard(), config);
    strict.register(quote_v0()).unwrap();
    let err = strict.decode_frame(&frame, 0).unwrap_err();
    assert_eq!(
        err,
        SbeError::VersionMismatch {
            expected: 0,
            actual: 1
        }
    );
}

#[rstest]
fn test_custom_header_layout() {
    let layout = MessageHeaderLayout::new(vec![
        (HeaderField::TemplateId, UintWidth::U16),
        (HeaderField::SchemaId, UintWidth::U8),
        (HeaderField::Version, UintWidth::U8),
        (HeaderField::BlockLength, UintWidth::U16),
        (HeaderField::NumVarDataFields, UintWidth::U8),
    ])
    .unwrap();
    assert_eq!(layout.encoded_length(), 7);

    let mut registry = SchemaRegistry::with_layout(layout, CodecConfig::default());
    registry.register(quote_v0()).unwrap();

    let frame = registry.encode_frame(&quote_v0(), &quote(1, 2)).unwrap();
    assert_eq!(&frame[..7], &[1, 0, 5, 0, 16, 0, 1]);

    let decoded = registry.decode_frame(&frame, 0).unwrap();
    assert_eq!(decoded.header.num_var_data_fields, 1);
    assert_eq!(decoded.message.get::<i64>("bid").unwrap(), 1);
}

#[rstest]
fn test_truncated_header() {
    let registry = stream_registry().unwrap();
    let err = registry.decode_frame(&[0u8; 7], 0).unwrap_err();
    assert!(matches!(err, SbeError::BufferTooShort { .. }));
}

#[rstest]
fn test_registry_shared_across_threads() {
    let registry = Arc::new(stream_registry().unwrap());
    let event = BestBidAskStreamEvent {
        event_time_us: 1,
        book_update_id: 2,
        price_exponent: -2,
        qty_exponent: -8,
        bid_price_mantissa: 4_200_000,
        bid_qty_mantissa: 1,
        ask_price_mantissa: 4_200_100,
        ask_qty_mantissa: 2,
        symbol: Ustr::from("BTCUSDT"),
    };
    let frame = Arc::new(
        registry
            .encode_frame(
                &BestBidAskStreamEvent::descriptor().unwrap(),
                &DecodedMessage::from(&event),
            )
            .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let frame = Arc::clone(&frame);
            thread::spawn(move || decode_market_data(&registry, &frame).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(
            handle.join().unwrap(),
            MarketDataMessage::BestBidAsk(event.clone())
        );
    }
}
