//! Structured prop values.
//!
//! Props are opaque to the protocol: their shape depends on the node type. What the
//! protocol does care about is *value equality*, because the host only marks its
//! registry dirty when a merged value actually differs. [`PropValue`] therefore
//! compares deeply, and dates compare by the instant they denote rather than by
//! their textual form.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// A prop map. Keys are kept sorted so serialized payloads are deterministic.
pub type Props = BTreeMap<String, PropValue>;

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A structured prop value.
#[derive(Debug, Clone, Default)]
pub enum PropValue {
    /// Absent value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// String value.
    String(String),
    /// A point in time. Travels as an RFC 3339 string.
    Date(OffsetDateTime),
    /// Ordered list of values.
    List(Vec<PropValue>),
    /// Nested map of values.
    Object(Props),
}

impl PropValue {
    /// Returns the string content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the numeric content, if this is a number.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the boolean content, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the date content.
    ///
    /// Strings holding an RFC 3339 timestamp are accepted as well, since that is
    /// how dates look once they have crossed the wire.
    #[must_use]
    pub fn as_date(&self) -> Option<OffsetDateTime> {
        match self {
            Self::Date(value) => Some(*value),
            Self::String(value) => OffsetDateTime::parse(value, &Rfc3339).ok(),
            _ => None,
        }
    }

    /// Returns `true` for [`PropValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts this value into its JSON wire form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(value) => Value::Bool(*value),
            Self::Number(value) => number_to_json(*value),
            Self::String(value) => Value::String(value.clone()),
            Self::Date(value) => Value::String(format_date(*value)),
            Self::List(values) => Value::Array(values.iter().map(Self::to_json).collect()),
            Self::Object(props) => Value::Object(props_to_json(props)),
        }
    }

    /// Builds a value from its JSON wire form.
    ///
    /// Strings are kept as strings; the receiving side decides whether a field is a date.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Bool(*value),
            Value::Number(number) => number.as_f64().map_or(Self::Null, Self::Number),
            Value::String(value) => Self::String(value.clone()),
            Value::Array(values) => Self::List(values.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Object(props_from_json(map)),
        }
    }
}

/// Formats a date as RFC 3339.
#[must_use]
pub fn format_date(date: OffsetDateTime) -> String {
    date.format(&Rfc3339).unwrap_or_else(|_| date.to_string())
}

// Integral values go out as JSON integers so `5` does not turn into `5.0`.
fn number_to_json(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        #[allow(clippy::cast_possible_truncation)]
        return Value::from(value as i64);
    }
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            // NaN never settles otherwise, which would keep the registry dirty forever.
            (Self::Number(a), Self::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a.unix_timestamp_nanos() == b.unix_timestamp_nanos(),
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for PropValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PropValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_json(&value))
    }
}

/// Converts a JSON object into a prop map.
#[must_use]
pub fn props_from_json(map: &Map<String, Value>) -> Props {
    map.iter()
        .map(|(key, value)| (key.clone(), PropValue::from_json(value)))
        .collect()
}

/// Converts a prop map into a JSON object.
#[must_use]
pub fn props_to_json(props: &Props) -> Map<String, Value> {
    props
        .iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect()
}

/// Merges `patch` into `props`, assigning only the keys present in `patch`.
///
/// Returns `true` when at least one key ended up with a different value.
pub fn merge_props(props: &mut Props, patch: &Props) -> bool {
    let mut changed = false;
    for (key, value) in patch {
        if props.get(key) != Some(value) {
            props.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for PropValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

impl_from!(
    bool => Bool,
    f64 => Number,
    f32 => Number,
    i32 => Number,
    u32 => Number,
    String => String,
    &str => String,
    OffsetDateTime => Date,
    Vec<PropValue> => List,
    Props => Object,
);

impl From<i64> for PropValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn dates_compare_by_instant() {
        let utc = PropValue::from(datetime!(2024-01-01 0:00 UTC));
        let shifted = PropValue::from(datetime!(2024-01-01 1:00 +1));
        assert_eq!(utc, shifted);
        assert_ne!(utc, PropValue::from(datetime!(2024-01-01 0:00:01 UTC)));
    }

    #[test]
    fn nested_values_compare_deeply() {
        let mut a = Props::new();
        a.insert("items".into(), PropValue::List(vec![1.into(), "two".into()]));
        let b = a.clone();
        assert_eq!(PropValue::Object(a), PropValue::Object(b));
    }

    #[test]
    fn merge_reports_only_real_changes() {
        let mut props = Props::new();
        props.insert("value".into(), 5.into());
        props.insert("label".into(), "Volume".into());

        let mut same = Props::new();
        same.insert("value".into(), 5.into());
        assert!(!merge_props(&mut props, &same));

        let mut patch = Props::new();
        patch.insert("value".into(), 6.into());
        assert!(merge_props(&mut props, &patch));
        assert_eq!(props["value"], PropValue::Number(6.0));
        assert_eq!(props["label"], PropValue::from("Volume"));
    }

    #[test]
    fn integral_numbers_serialize_without_fraction() {
        assert_eq!(PropValue::from(5).to_json().to_string(), "5");
        assert_eq!(PropValue::from(0.5).to_json().to_string(), "0.5");
    }

    #[test]
    fn dates_travel_as_rfc3339() {
        let value = PropValue::from(datetime!(2024-03-05 12:30 UTC));
        assert_eq!(value.to_json(), Value::String("2024-03-05T12:30:00Z".into()));
        let back = PropValue::from_json(&value.to_json());
        assert_eq!(back.as_date(), value.as_date());
    }
}
