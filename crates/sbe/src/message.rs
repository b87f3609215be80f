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

//! Generic decoded message representation.

use indexmap::IndexMap;
use ustr::Ustr;

use crate::{
    error::{SbeError, SbeResult},
    scalar::ScalarValue,
};

/// Values of one message (or one group item), keyed by member name in schema order.
///
/// Group items share the same shape as the message itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedMessage {
    pub fields: IndexMap<Ustr, ScalarValue>,
    pub groups: IndexMap<Ustr, Vec<DecodedMessage>>,
    pub var_data: IndexMap<Ustr, Vec<u8>>,
}

impl DecodedMessage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<ScalarValue>) -> Self {
        self.set_field(name, value);
        self
    }

    #[must_use]
    pub fn with_group(mut self, name: &str, items: Vec<Self>) -> Self {
        self.set_group(name, items);
        self
    }

    #[must_use]
    pub fn with_var_data(mut self, name: &str, value: impl Into<Vec<u8>>) -> Self {
        self.set_var_data(name, value);
        self
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<ScalarValue>) {
        self.fields.insert(Ustr::from(name), value.into());
    }

    pub fn set_group(&mut self, name: &str, items: Vec<Self>) {
        self.groups.insert(Ustr::from(name), items);
    }

    pub fn set_var_data(&mut self, name: &str, value: impl Into<Vec<u8>>) {
        self.var_data.insert(Ustr::from(name), value.into());
    }

    /// Returns a fixed field value.
    ///
    /// Lookups never intern `name`: a name that was never interned cannot be a key.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<ScalarValue> {
        let key = Ustr::from_existing(name)?;
        self.fields.get(&key).copied()
    }

    /// Returns the items of a group, or an empty slice if absent.
    #[must_use]
    pub fn group(&self, name: &str) -> &[Self] {
        Ustr::from_existing(name)
            .and_then(|key| self.groups.get(&key))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Returns a var-data payload.
    #[must_use]
    pub fn var_data(&self, name: &str) -> Option<&[u8]> {
        let key = Ustr::from_existing(name)?;
        self.var_data.get(&key).map(Vec::as_slice)
    }

    /// Returns a var-data payload as UTF-8 text, replacing invalid sequences.
    #[must_use]
    pub fn var_str(&self, name: &str) -> Option<String> {
        self.var_data(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Returns a fixed field converted to `T`.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if absent, or `ValueKindMismatch` if the value is not a `T`.
    pub fn get<T>(&self, name: &str) -> SbeResult<T>
    where
        T: TryFrom<ScalarValue, Error = SbeError>,
    {
        let value = self
            .field(name)
            .ok_or_else(|| SbeError::MissingField(Ustr::from(name)))?;
        T::try_from(value)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::scalar::ScalarKind;

    #[rstest]
    fn test_builder_preserves_insertion_order() {
        let msg = DecodedMessage::new()
            .with_field("eventTime", 1_700_000_000_000i64)
            .with_field("priceExponent", -2i8)
            .with_var_data("symbol", "BTCUSDT");

        let names: Vec<&str> = msg.fields.keys().map(Ustr::as_str).collect();
        assert_eq!(names, vec!["eventTime", "priceExponent"]);
        assert_eq!(msg.var_str("symbol").as_deref(), Some("BTCUSDT"));
    }

    #[rstest]
    fn test_typed_get() {
        let msg = DecodedMessage::new().with_field("qty", 42i64);

        assert_eq!(msg.get::<i64>("qty").unwrap(), 42);
        assert_eq!(
            msg.get::<u8>("qty").unwrap_err(),
            SbeError::ValueKindMismatch {
                expected: ScalarKind::UInt8,
                actual: ScalarKind::Int64,
            }
        );
        assert_eq!(
            msg.get::<i64>("price").unwrap_err(),
            SbeError::MissingField(Ustr::from("price"))
        );
    }

    #[rstest]
    fn test_missing_group_is_empty() {
        let msg = DecodedMessage::new();
        assert!(msg.group("bids").is_empty());
        assert!(msg.var_data("symbol").is_none());
    }

    #[rstest]
    fn test_lookup_does_not_intern_name() {
        let msg = DecodedMessage::new().with_field("seq", 1u32);
        let name = "lookupOnlyNameNeverDeclared";

        assert!(msg.field(name).is_none());
        assert!(msg.group(name).is_empty());
        assert!(msg.var_data(name).is_none());
        assert!(Ustr::from_existing(name).is_none());
        assert_eq!(msg.field("seq"), Some(ScalarValue::UInt32(1)));
    }

    #[rstest]
    fn test_var_str_lossy() {
        let msg = DecodedMessage::new().with_var_data("raw", vec![b'o', b'k', 0xFF]);
        assert_eq!(msg.var_str("raw").as_deref(), Some("ok\u{FFFD}"));
    }
}
