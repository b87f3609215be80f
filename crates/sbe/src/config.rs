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

//! Codec configuration.

use serde::{Deserialize, Serialize};

/// Default maximum number of items accepted in a single repeating group.
pub const MAX_GROUP_SIZE: u32 = 10_000;

/// Configuration for decoding through a [`SchemaRegistry`](crate::registry::SchemaRegistry).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Maximum `numInGroup` accepted for any group before allocating items.
    pub max_group_size: u32,
    /// Reject frames whose header version differs from the registered schema version.
    pub strict_version: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_group_size: MAX_GROUP_SIZE,
            strict_version: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.max_group_size, 10_000);
        assert!(!config.strict_version);
    }

    #[rstest]
    fn test_partial_json_uses_defaults() {
        let config: CodecConfig = serde_json::from_str(r#"{"strict_version": true}"#).unwrap();
        assert_eq!(config.max_group_size, MAX_GROUP_SIZE);
        assert!(config.strict_version);
    }

    #[rstest]
    fn test_unknown_key_rejected() {
        let result: Result<CodecConfig, _> = serde_json::from_str(r#"{"max_groups": 5}"#);
        assert!(result.is_err());
    }

    #[rstest]
    fn test_toml_round_trip() {
        let config = CodecConfig {
            max_group_size: 500,
            strict_version: true,
        };
        let text = toml::to_string(&config).unwrap();
        let parsed: CodecConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
