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

//! Decodes SBE frames and prints them as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin sbe-decode --package nautilus-sbe -- --hex 1200102701000000...
//! cargo run --bin sbe-decode --package nautilus-sbe -- --schema schema.toml --file frames.bin --all
//! ```
//!
//! Without `--schema` the built-in Binance spot stream schema is used.
//! Set `RUST_LOG=debug` to trace group and var-data decoding.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use nautilus_sbe::{
    DecodedFrame, DecodedMessage, SchemaDefinition, SchemaRegistry, ScalarValue, VarDataEncoding,
    binance, descriptor::BlockLayout,
};
use serde_json::{Map, Value, json};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "sbe-decode", about = "Decode SBE frames to JSON")]
struct Args {
    /// Schema file (`.json` or `.toml`). Defaults to the Binance spot stream schema.
    #[arg(long, env = "SBE_SCHEMA")]
    schema: Option<PathBuf>,

    /// Frame bytes as a hex string.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    hex: Option<String>,

    /// File holding raw frame bytes.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Offset of the first frame.
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Decode back-to-back frames until the buffer is exhausted.
    #[arg(long)]
    all: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let args = Args::parse();

    let registry = load_registry(&args)?;
    tracing::info!(templates = registry.len(), "Loaded schema");

    let buf = read_input(&args)?;
    tracing::debug!(len = buf.len(), offset = args.offset, "Decoding buffer");

    let frames = if args.all {
        registry.decode_frames(&buf, args.offset)?
    } else {
        vec![registry.decode_frame(&buf, args.offset)?]
    };

    for frame in &frames {
        println!("{}", serde_json::to_string_pretty(&frame_json(frame))?);
    }

    tracing::info!(frames = frames.len(), "Decoded");
    Ok(())
}

fn load_registry(args: &Args) -> anyhow::Result<SchemaRegistry> {
    match &args.schema {
        Some(path) => SchemaDefinition::load(path)
            .and_then(|schema| schema.build_registry())
            .with_context(|| format!("Failed to load schema {}", path.display())),
        None => binance::stream_registry().context("Failed to build stream registry"),
    }
}

fn read_input(args: &Args) -> anyhow::Result<Vec<u8>> {
    if let Some(text) = &args.hex {
        let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        return hex::decode(cleaned).context("Invalid hex input");
    }

    match &args.file {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => anyhow::bail!("Either --hex or --file is required"),
    }
}

fn frame_json(frame: &DecodedFrame) -> Value {
    let header = frame.header;
    json!({
        "name": frame.descriptor.name.as_str(),
        "header": {
            "blockLength": header.block_length,
            "templateId": header.template_id,
            "schemaId": header.schema_id,
            "version": header.version,
        },
        "message": message_json(&frame.descriptor.body, &frame.message),
        "nextOffset": frame.next_offset,
    })
}

fn message_json(layout: &BlockLayout, msg: &DecodedMessage) -> Value {
    let mut out = Map::new();

    for (name, value) in &msg.fields {
        out.insert(name.to_string(), scalar_json(*value));
    }

    for group in layout.groups() {
        let items = msg
            .group(group.name.as_str())
            .iter()
            .map(|item| message_json(&group.body, item))
            .collect();
        out.insert(group.name.to_string(), Value::Array(items));
    }

    for var in layout.var_data() {
        let bytes = msg.var_data(var.name.as_str()).unwrap_or_default();
        let value = match (var.encoding, std::str::from_utf8(bytes)) {
            (VarDataEncoding::Utf8, Ok(text)) => Value::from(text),
            _ => Value::from(hex::encode(bytes)),
        };
        out.insert(var.name.to_string(), value);
    }

    Value::Object(out)
}

fn scalar_json(value: ScalarValue) -> Value {
    if value.is_null() {
        return Value::Null;
    }

    match value {
        ScalarValue::Int8(v) => json!(v),
        ScalarValue::UInt8(v) => json!(v),
        ScalarValue::Int16(v) => json!(v),
        ScalarValue::UInt16(v) => json!(v),
        ScalarValue::Int32(v) => json!(v),
        ScalarValue::UInt32(v) => json!(v),
        ScalarValue::Int64(v) => json!(v),
        ScalarValue::UInt64(v) => json!(v),
        ScalarValue::Float(v) => Value::from(f64::from(v)),
        ScalarValue::Double(v) => Value::from(v),
    }
}
