use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Timelike};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Value of an extra field attached to a [`LogRecord`](crate::record::LogRecord).
///
/// The first eight variants map one-to-one onto JSON. The remaining ones have
/// no native JSON form and are resolved by the fallback rule in
/// [`FieldValue::to_json`]:
///
/// - [`FieldValue::Uuid`] becomes its hyphenated string,
/// - [`FieldValue::DateTime`] / [`FieldValue::DateTimeTz`] become an ISO-8601
///   string with a `T` separator,
/// - [`FieldValue::Object`] becomes its attribute mapping,
/// - [`FieldValue::Opaque`] becomes its default string form.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Seq(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
    Uuid(Uuid),
    DateTime(NaiveDateTime),
    DateTimeTz(DateTime<FixedOffset>),
    Object(BTreeMap<String, FieldValue>),
    Opaque(String),
}

impl FieldValue {
    /// An object exposing its public attributes.
    pub fn object<K, V, I>(attrs: I) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        FieldValue::Object(attrs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// An object known only through its string form.
    pub fn opaque(repr: impl fmt::Display) -> Self {
        FieldValue::Opaque(repr.to_string())
    }

    /// Capture any `Serialize` value.
    ///
    /// Types whose serde representation cannot be expressed as JSON (for
    /// example maps with non-string keys) are kept as [`FieldValue::Opaque`]
    /// holding the type name.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => FieldValue::from(json),
            Err(_) => FieldValue::Opaque(std::any::type_name::<T>().to_string()),
        }
    }

    /// Whether standard JSON encoding applies without the fallback rule.
    pub fn is_native(&self) -> bool {
        match self {
            FieldValue::Null
            | FieldValue::Bool(_)
            | FieldValue::Int(_)
            | FieldValue::UInt(_)
            | FieldValue::Float(_)
            | FieldValue::Str(_) => true,
            FieldValue::Seq(items) => items.iter().all(FieldValue::is_native),
            FieldValue::Map(entries) => entries.values().all(FieldValue::is_native),
            _ => false,
        }
    }

    /// Resolve this value into a JSON tree, applying the fallback rule to
    /// every non-native leaf.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::UInt(u) => Value::from(*u),
            // NaN and infinities have no JSON literal.
            FieldValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            FieldValue::Str(s) => Value::String(s.clone()),
            FieldValue::Seq(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
            FieldValue::Map(entries) | FieldValue::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
            FieldValue::Uuid(id) => Value::String(id.hyphenated().to_string()),
            FieldValue::DateTime(dt) => Value::String(iso_naive(dt)),
            FieldValue::DateTimeTz(dt) => Value::String(iso_with_offset(dt)),
            FieldValue::Opaque(repr) => Value::String(repr.clone()),
        }
    }

    /// Encode this value the way it appears under `details`: a JSON document
    /// rendered to a string, so the payload carries it double-encoded.
    pub fn encode_detail(&self) -> String {
        serde_json::to_string(&self.to_json()).unwrap_or_else(|_| "null".to_string())
    }
}

fn iso_naive(dt: &NaiveDateTime) -> String {
    // Microsecond precision, fraction omitted when zero.
    if dt.nanosecond() / 1_000 == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

fn iso_with_offset(dt: &DateTime<FixedOffset>) -> String {
    format!("{}{}", iso_naive(&dt.naive_local()), dt.format("%:z"))
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    FieldValue::UInt(u)
                } else {
                    FieldValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => FieldValue::Str(s),
            Value::Array(items) => FieldValue::Seq(items.into_iter().map(FieldValue::from).collect()),
            Value::Object(entries) => {
                FieldValue::Map(entries.into_iter().map(|(k, v)| (k, FieldValue::from(v))).collect())
            }
        }
    }
}

macro_rules! from_scalar {
    ($variant:ident: $($ty:ty => $conv:ty),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::$variant(<$conv>::from(value))
                }
            }
        )*
    };
}

from_scalar!(Int: i8 => i64, i16 => i64, i32 => i64, i64 => i64);
from_scalar!(UInt: u8 => u64, u16 => u64, u32 => u64, u64 => u64);
from_scalar!(Float: f32 => f64, f64 => f64);

// Beyond 64 bits only a float keeps the value a JSON number.
impl From<i128> for FieldValue {
    fn from(value: i128) -> Self {
        if let Ok(i) = i64::try_from(value) {
            FieldValue::Int(i)
        } else if let Ok(u) = u64::try_from(value) {
            FieldValue::UInt(u)
        } else {
            FieldValue::Float(value as f64)
        }
    }
}

impl From<u128> for FieldValue {
    fn from(value: u128) -> Self {
        match u64::try_from(value) {
            Ok(u) => FieldValue::UInt(u),
            Err(_) => FieldValue::Float(value as f64),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for FieldValue {
    fn from(value: DateTime<Tz>) -> Self {
        FieldValue::DateTimeTz(value.fixed_offset())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(value: Vec<T>) -> Self {
        FieldValue::Seq(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rstest::rstest;
    use serde_json::json;

    fn naive(micros: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 1, 18)
            .and_then(|d| d.and_hms_micro_opt(16, 46, 47, micros))
            .expect("valid date")
    }

    #[rstest]
    #[case(FieldValue::Int(1), "1")]
    #[case(FieldValue::Null, "null")]
    #[case(FieldValue::Bool(true), "true")]
    #[case(FieldValue::Float(1.5), "1.5")]
    #[case(FieldValue::from("fred"), "\"fred\"")]
    #[case(FieldValue::from(vec![1, 2]), "[1,2]")]
    #[case(FieldValue::from(json!({"a": {"b": null}})), r#"{"a":{"b":null}}"#)]
    #[case(FieldValue::Float(f64::NAN), "null")]
    fn native_values_encode_as_plain_json(#[case] value: FieldValue, #[case] expected: &str) {
        assert_eq!(value.encode_detail(), expected);
    }

    #[test]
    fn native_detection_descends_into_containers() {
        assert!(FieldValue::from(json!([1, "a", {"b": false}])).is_native());
        assert!(!FieldValue::Seq(vec![FieldValue::Uuid(Uuid::nil())]).is_native());
        assert!(!FieldValue::opaque("x").is_native());
    }

    #[test]
    fn uuid_encodes_as_quoted_hyphenated_string() {
        let id = Uuid::new_v4();
        assert_eq!(FieldValue::from(id).encode_detail(), format!("\"{}\"", id));
    }

    #[test]
    fn naive_datetime_uses_t_separator_and_microseconds() {
        assert_eq!(
            FieldValue::from(naive(541_427)).encode_detail(),
            "\"2017-01-18T16:46:47.541427\""
        );
        assert_eq!(FieldValue::from(naive(0)).encode_detail(), "\"2017-01-18T16:46:47\"");
    }

    #[test]
    fn aware_datetime_carries_offset() {
        let utc = Utc.from_utc_datetime(&naive(5));
        assert_eq!(
            FieldValue::from(utc).encode_detail(),
            "\"2017-01-18T16:46:47.000005+00:00\""
        );
    }

    #[test]
    fn object_encodes_as_attribute_mapping() {
        let thing = FieldValue::object([("thing1", "Fred"), ("thing2", "Jerry")]);
        let decoded: Value = serde_json::from_str(&thing.encode_detail()).expect("valid json");
        assert_eq!(decoded, json!({"thing1": "Fred", "thing2": "Jerry"}));
    }

    #[test]
    fn opaque_encodes_as_string_form() {
        assert_eq!(FieldValue::opaque("Thing { id: 3 }").encode_detail(), "\"Thing { id: 3 }\"");
    }

    #[test]
    fn fallback_applies_inside_containers() {
        let id = Uuid::nil();
        let value = FieldValue::Seq(vec![FieldValue::Int(1), FieldValue::Uuid(id)]);
        assert_eq!(
            value.encode_detail(),
            format!("[1,\"{}\"]", id.hyphenated())
        );
    }

    #[test]
    fn unserializable_value_falls_back_to_type_name() {
        let mut bad = BTreeMap::new();
        bad.insert((1, 2), "tuple keys are not json");
        match FieldValue::from_serialize(&bad) {
            FieldValue::Opaque(repr) => assert!(repr.contains("BTreeMap")),
            other => panic!("expected opaque, got {other:?}"),
        }
    }

    #[rstest]
    #[case(FieldValue::from(-3i128), FieldValue::Int(-3))]
    #[case(FieldValue::from(u64::MAX as i128), FieldValue::UInt(u64::MAX))]
    #[case(FieldValue::from(7u128), FieldValue::UInt(7))]
    #[case(FieldValue::from(u128::MAX), FieldValue::Float(u128::MAX as f64))]
    fn wide_integers_narrow_to_json_numbers(#[case] value: FieldValue, #[case] expected: FieldValue) {
        assert_eq!(value, expected);
    }

    #[test]
    fn option_none_is_null() {
        assert_eq!(FieldValue::from(None::<i32>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(3)), FieldValue::Int(3));
    }
}
