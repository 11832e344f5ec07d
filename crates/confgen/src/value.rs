//! value representation
//!
//! Configuration files are parsed into the following data types
//! - boolean (true/false)
//! - integer (signed, i64)
//! - decimal (f64)
//! - string (utf-8)
//! - array ("list" of values)
//! - object (order-preserving "map"/"dictionary", where the key is of type string)
//!
//! Additionally:
//! - there is no `null`/`None` value. Parsing a document containing `null` fails.
//! - keys are unique within an object. Parsing a document repeating a key fails.
//! - the only valid **implicit** conversion: every `integer` is also a `decimal`
//! - objects keep the order of the source document, group declaration order depends on it
use serde::{
    de::{self, MapAccess, SeqAccess, Visitor},
    ser::{SerializeMap, SerializeSeq},
    Deserializer, Serializer,
};
use std::cmp::Ordering;

/// All possible value types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    Array(Vec<Value>),
    Object(indexmap::IndexMap<String, Value>),
}

impl Value {
    /// Human readable name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&indexmap::IndexMap<String, Value>> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Decimal view of a numeric value (integers widen)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(int) => Some(*int as f64),
            Value::Decimal(dec) => Some(*dec),
            _ => None,
        }
    }

    /// The text another property's overrides are keyed by
    ///
    /// Only scalars have a key form. Collections never select an override. Decimals use the
    /// same text as their swift literal, so `1.0` keys as `"1.0"`.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Value::Boolean(b) => Some(b.to_string()),
            Value::Integer(int) => Some(int.to_string()),
            Value::Decimal(dec) => Some(format!("{dec:?}")),
            Value::String(s) => Some(s.clone()),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Compact JSON with keys sorted the way Foundation's `JSONSerialization` sorts them
    ///
    /// The output is stable for equal documents regardless of their key order, which makes it
    /// usable as digest input.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(&Canonical(self))?;
        Ok(json.replace('/', "\\/"))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<K: ToString, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Object(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

/// Reasons a json document can not be represented as [Value]
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValueError {
    #[error("null is not a valid configuration value")]
    Null,
    #[error("number {0} does not fit into a 64 bit integer or decimal")]
    NumberOutOfRange(String),
    #[error("duplicate key `{0}`")]
    DuplicateKey(String),
}

impl TryFrom<serde_json::Value> for Value {
    type Error = ValueError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value as Json;

        Ok(match value {
            Json::Null => return Err(ValueError::Null),
            Json::Bool(b) => b.into(),
            Json::Number(num) => {
                if let Some(int) = num.as_i64() {
                    Value::Integer(int)
                } else if num.is_f64() {
                    match num.as_f64() {
                        Some(dec) => Value::Decimal(dec),
                        None => return Err(ValueError::NumberOutOfRange(num.to_string())),
                    }
                } else {
                    // u64 above i64::MAX
                    return Err(ValueError::NumberOutOfRange(num.to_string()));
                }
            }
            Json::String(s) => s.into(),
            Json::Array(array) => Value::Array(
                array
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Json::Object(object) => Value::Object(
                object
                    .into_iter()
                    .map(|(k, v)| Ok((k, Value::try_from(v)?)))
                    .collect::<Result<_, ValueError>>()?,
            ),
        })
    }
}

impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Boolean(value) => serializer.serialize_bool(*value),
            Value::Integer(value) => serializer.serialize_i64(*value),
            Value::Decimal(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::Array(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Value::Object(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for (element_key, element_value) in value {
                    ser.serialize_entry(element_key, element_value)?;
                }
                ser.end()
            }
        }
    }
}

impl<'de> serde::de::Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a configuration value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Boolean(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| E::custom(ValueError::NumberOutOfRange(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Decimal(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Err(E::custom(ValueError::Null))
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Err(E::custom(ValueError::Null))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut array = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(element) = seq.next_element()? {
            array.push(element);
        }
        Ok(Value::Array(array))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut object = indexmap::IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            if object.contains_key(&key) {
                return Err(de::Error::custom(ValueError::DuplicateKey(key)));
            }
            object.insert(key, value);
        }
        Ok(Value::Object(object))
    }
}

/// Serializes a [Value] with sorted object keys and integral decimals written as integers
struct Canonical<'v>(&'v Value);

impl serde::ser::Serialize for Canonical<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0 {
            Value::Decimal(dec) if dec.fract() == 0.0 && dec.abs() < 1e15 => {
                serializer.serialize_i64(*dec as i64)
            }
            Value::Array(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(&Canonical(element))?;
                }
                ser.end()
            }
            Value::Object(value) => {
                let mut entries: Vec<_> = value.iter().collect();
                entries.sort_by(|(a, _), (b, _)| foundation_key_order(a, b));

                let mut ser = serializer.serialize_map(Some(entries.len()))?;
                for (element_key, element_value) in entries {
                    ser.serialize_entry(element_key, &Canonical(element_value))?;
                }
                ser.end()
            }
            other => serde::ser::Serialize::serialize(other, serializer),
        }
    }
}

/// Case insensitive comparison where runs of digits compare by numeric value
///
/// Ties are broken by plain byte order so distinct keys never compare equal.
fn foundation_key_order(a: &str, b: &str) -> Ordering {
    let mut lhs = a.chars().peekable();
    let mut rhs = b.chars().peekable();

    loop {
        let (l, r) = match (lhs.peek().copied(), rhs.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => (l, r),
        };

        if l.is_ascii_digit() && r.is_ascii_digit() {
            let l_digits = take_digits(&mut lhs);
            let r_digits = take_digits(&mut rhs);
            let ordering = l_digits
                .len()
                .cmp(&r_digits.len())
                .then_with(|| l_digits.cmp(&r_digits));
            if ordering != Ordering::Equal {
                return ordering;
            }
            continue;
        }

        let ordering = l.to_lowercase().cmp(r.to_lowercase());
        if ordering != Ordering::Equal {
            return ordering;
        }
        lhs.next();
        rhs.next();
    }
}

/// Consumes a run of ascii digits, dropping leading zeros
fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        chars.next();
        if digits.is_empty() && c == '0' {
            continue;
        }
        digits.push(c);
    }
    digits
}
