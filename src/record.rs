use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::panic::Location;
use tracing::Level;

/// A single log event on its way to a [`Handler`](crate::handler::Handler).
///
/// Attributes keep their insertion order, which is also the order in which
/// they are encoded.
#[derive(Debug, Clone)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub source: Option<Source>,
    pub attrs: Vec<Attr>,
}

impl Record {
    /// Create a record stamped with the current time and no attributes.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            source: None,
            attrs: Vec::new(),
        }
    }

    /// Attach the call site the record was emitted from.
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    /// Append attributes after the ones already present.
    pub fn add_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>) {
        self.attrs.extend(attrs);
    }
}

/// Key/value pair carried by a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Shorthand for [`Attr::new`].
pub fn attr(key: impl Into<String>, value: impl Into<Value>) -> Attr {
    Attr::new(key, value)
}

/// Build an attribute whose value is a nested object of `attrs`.
pub fn group(key: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) -> Attr {
    Attr {
        key: key.into(),
        value: Value::Group(attrs.into_iter().collect()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Time(DateTime<Utc>),
    Level(Level),
    Source(Source),
    Origin(Origin),
    Group(Vec<Attr>),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I64(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U64(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

impl From<Level> for Value {
    fn from(v: Level) -> Self {
        Value::Level(v)
    }
}

impl From<Source> for Value {
    fn from(v: Source) -> Self {
        Value::Source(v)
    }
}

impl From<Origin> for Value {
    fn from(v: Origin) -> Self {
        Value::Origin(v)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Str(v) => serializer.serialize_str(v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Time(v) => {
                serializer.serialize_str(&v.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::Level(v) => serializer.serialize_str(v.as_str()),
            Value::Source(v) => v.serialize(serializer),
            Value::Origin(v) => v.serialize(serializer),
            Value::Group(attrs) => Attrs(attrs).serialize(serializer),
        }
    }
}

/// Serializes a slice of attributes as a JSON object, preserving order.
///
/// Duplicate keys are written as-is.
pub(crate) struct Attrs<'a>(pub &'a [Attr]);

impl Serialize for Attrs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for a in self.0 {
            map.serialize_entry(&a.key, &a.value)?;
        }
        map.end()
    }
}

/// Raw call-site location of a record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Source {
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl Source {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
        }
    }

    /// Location of the caller. Rust exposes no function name here, so it is left empty.
    #[track_caller]
    pub fn caller() -> Self {
        let loc = Location::caller();
        Self::new("", loc.file(), loc.line())
    }
}

/// Nested `{"file": {"name", "line", "function"}}` layout of a [`Source`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Origin {
    pub file: OriginFile,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OriginFile {
    pub name: String,
    pub line: u32,
    pub function: String,
}

impl From<&Source> for Origin {
    fn from(source: &Source) -> Self {
        Origin {
            file: OriginFile {
                name: source.file.clone(),
                line: source.line,
                function: source.function.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn origin_nests_source_under_file() {
        let origin = Origin::from(&Source::new("f", "a.go", 42));
        let json = serde_json::to_value(&origin).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"file": {"name": "a.go", "line": 42, "function": "f"}})
        );
    }

    #[test]
    fn group_keeps_member_order() {
        let g = group("req", [attr("z", 1), attr("a", "x"), attr("m", true)]);
        let out = serde_json::to_string(&g.value).unwrap();
        assert_eq!(out, r#"{"z":1,"a":"x","m":true}"#);
    }

    #[test]
    fn time_uses_millisecond_rfc3339() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let out = serde_json::to_string(&Value::Time(t)).unwrap();
        assert_eq!(out, r#""2024-05-01T12:30:00.000Z""#);
    }

    #[test]
    fn level_serializes_upper_case() {
        let out = serde_json::to_string(&Value::Level(Level::WARN)).unwrap();
        assert_eq!(out, r#""WARN""#);
    }

    #[test]
    fn caller_points_at_this_file() {
        let src = Source::caller();
        assert!(src.file.ends_with("record.rs"));
        assert!(src.function.is_empty());
    }
}
