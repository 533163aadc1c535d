//! Outcome records and the run summary written to disk.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Key of the single-entry object hosts use to mark a circular reference.
pub const CIRCULAR_MARKER: &str = "$circular";

/// Terminal state of one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Pass,
    Fail,
    Pending,
}

/// One property value captured from a test error.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<ErrorValue>),
    Object(IndexMap<String, ErrorValue>),
    /// Reference back to an enclosing value; never representable as JSON.
    Circular(String),
}

impl Serialize for ErrorValue {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => s.serialize_unit(),
            Self::Bool(b) => s.serialize_bool(*b),
            Self::Number(n) => n.serialize(s),
            Self::String(v) => s.serialize_str(v),
            Self::Array(items) => items.serialize(s),
            Self::Object(map) => map.serialize(s),
            Self::Circular(path) => Err(S::Error::custom(format!(
                "converting circular structure to JSON (property '{path}')"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for ErrorValue {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        d.deserialize_any(ErrorValueVisitor)
    }
}

struct ErrorValueVisitor;

impl<'de> Visitor<'de> for ErrorValueVisitor {
    type Value = ErrorValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<ErrorValue, E> {
        Ok(ErrorValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ErrorValue, E> {
        Ok(ErrorValue::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ErrorValue, E> {
        Ok(ErrorValue::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ErrorValue, E> {
        Ok(ErrorValue::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ErrorValue, E> {
        Ok(ErrorValue::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<ErrorValue, E> {
        Ok(ErrorValue::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<ErrorValue, E> {
        Ok(ErrorValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<ErrorValue, E> {
        Ok(ErrorValue::Null)
    }

    fn visit_some<D>(self, d: D) -> Result<ErrorValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        ErrorValue::deserialize(d)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<ErrorValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ErrorValue::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<ErrorValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut out = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, ErrorValue>()? {
            out.insert(key, value);
        }
        if out.len() == 1 {
            if let Some(ErrorValue::String(path)) = out.get(CIRCULAR_MARKER) {
                return Ok(ErrorValue::Circular(path.clone()));
            }
        }
        Ok(ErrorValue::Object(out))
    }
}

impl From<&str> for ErrorValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for ErrorValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<bool> for ErrorValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ErrorValue {
    fn from(v: i64) -> Self {
        Self::Number(v.into())
    }
}

impl From<u64> for ErrorValue {
    fn from(v: u64) -> Self {
        Self::Number(v.into())
    }
}

/// Non-finite floats become `Null`, the same way JSON encoders treat NaN.
impl From<f64> for ErrorValue {
    fn from(v: f64) -> Self {
        serde_json::Number::from_f64(v)
            .map(Self::Number)
            .unwrap_or(Self::Null)
    }
}

impl From<Vec<ErrorValue>> for ErrorValue {
    fn from(v: Vec<ErrorValue>) -> Self {
        Self::Array(v)
    }
}

impl From<ErrorObject> for ErrorValue {
    fn from(v: ErrorObject) -> Self {
        Self::Object(v.0)
    }
}

/// Own properties of a test error, in the order the host reported them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorObject(IndexMap<String, ErrorValue>);

impl ErrorObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error carrying only a `message` property.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::new().with("message", message)
    }

    /// Capture a Rust error: `message` from its display form, plus `causes`
    /// when it has a source chain.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut obj = Self::from_message(err.to_string());
        let mut causes = Vec::new();
        let mut next = err.source();
        while let Some(cause) = next {
            causes.push(ErrorValue::String(cause.to_string()));
            next = cause.source();
        }
        if !causes.is_empty() {
            obj.insert("causes", ErrorValue::Array(causes));
        }
        obj
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ErrorValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ErrorValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ErrorValue> {
        self.0.get(key)
    }

    /// The `message` property, when it is a string.
    pub fn message(&self) -> Option<&str> {
        match self.0.get("message") {
            Some(ErrorValue::String(m)) => Some(m),
            _ => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Immutable record of one finished test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeRecord {
    pub title: String,
    /// Title qualified by ancestor suite titles.
    pub full_title: String,
    /// Elapsed milliseconds as the host reported them (fractions kept);
    /// `null` when the host did not time the test.
    pub duration: Option<serde_json::Number>,
    pub current_retry: u32,
    #[serde(default)]
    pub err: ErrorObject,
}

/// Run counters, kept the way Mocha's base reporter keeps them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Non-root suites entered.
    pub suites: u64,
    /// Test-finished events received.
    pub tests: u64,
    pub passes: u64,
    pub pending: u64,
    pub failures: u64,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Milliseconds between `start` and `end`.
    pub duration: Option<u64>,
}

/// Document written to the results file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub stats: RunStats,
    pub pending: Vec<OutcomeRecord>,
    pub passes: Vec<OutcomeRecord>,
    pub failures: Vec<OutcomeRecord>,
}

impl RunSummary {
    /// Number of recorded outcomes across all three lists.
    pub fn total(&self) -> usize {
        self.passes.len() + self.failures.len() + self.pending.len()
    }

    pub fn records(&self, kind: OutcomeKind) -> &[OutcomeRecord] {
        match kind {
            OutcomeKind::Pass => &self.passes,
            OutcomeKind::Fail => &self.failures,
            OutcomeKind::Pending => &self.pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_object_keeps_insertion_order() {
        let err = ErrorObject::new()
            .with("stack", "at foo")
            .with("message", "boom")
            .with("actual", 3i64);
        let keys: Vec<_> = err.keys().collect();
        assert_eq!(keys, vec!["stack", "message", "actual"]);

        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"stack":"at foo","message":"boom","actual":3}"#);
    }

    #[test]
    fn test_error_object_parse_preserves_order_and_marker() {
        let err: ErrorObject =
            serde_json::from_str(r#"{"z":1,"a":{"$circular":"err.self"},"m":[true,null]}"#)
                .unwrap();
        let keys: Vec<_> = err.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(
            err.get("a"),
            Some(&ErrorValue::Circular("err.self".into()))
        );
        assert_eq!(
            err.get("m"),
            Some(&ErrorValue::Array(vec![ErrorValue::Bool(true), ErrorValue::Null]))
        );
    }

    #[test]
    fn test_circular_value_is_not_serializable() {
        let err = ErrorObject::from_message("boom").with("self", ErrorValue::Circular("err".into()));
        let res = serde_json::to_string(&err);
        assert!(res.unwrap_err().to_string().contains("circular"));
    }

    #[test]
    fn test_non_finite_float_becomes_null() {
        assert_eq!(ErrorValue::from(f64::NAN), ErrorValue::Null);
        assert_eq!(ErrorValue::from(f64::INFINITY), ErrorValue::Null);
        assert!(matches!(ErrorValue::from(1.5), ErrorValue::Number(_)));
    }

    #[test]
    fn test_from_error_collects_causes() {
        #[derive(Debug, thiserror::Error)]
        #[error("outer")]
        struct Outer(#[source] std::io::Error);

        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "inner"));
        let obj = ErrorObject::from_error(&err);
        assert_eq!(obj.message(), Some("outer"));
        assert_eq!(
            obj.get("causes"),
            Some(&ErrorValue::Array(vec![ErrorValue::String("inner".into())]))
        );
    }

    #[test]
    fn test_record_uses_camel_case_keys() {
        let rec = OutcomeRecord {
            title: "adds".into(),
            full_title: "Math adds".into(),
            duration: None,
            current_retry: 0,
            err: ErrorObject::new(),
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["fullTitle"], "Math adds");
        assert_eq!(v["currentRetry"], 0);
        assert!(v["duration"].is_null());
        assert!(v["err"].as_object().unwrap().is_empty());
    }
}
