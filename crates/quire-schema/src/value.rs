//! Typed values produced by validation.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use quire_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A metadata value after coercion into its declared type.
///
/// Serializes untagged: dates and datetimes become ISO 8601 strings, objects
/// become maps. This lets a [`Record`] feed straight into a caller's
/// `#[derive(Deserialize)]` struct.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// Text (also enum values).
    String(String),
    /// Whole number.
    Integer(i64),
    /// Floating point number.
    Number(f64),
    /// Boolean.
    Boolean(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Timestamp with offset.
    DateTime(DateTime<FixedOffset>),
    /// Homogeneous list.
    Array(Vec<TypedValue>),
    /// Nested record.
    Object(Record),
}

impl TypedValue {
    /// Render as JSON, with the same conventions as [`Record::to_json`].
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            TypedValue::String(s) => Value::String(s.clone()),
            TypedValue::Integer(n) => Value::from(*n),
            TypedValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            TypedValue::Boolean(b) => Value::Bool(*b),
            TypedValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            TypedValue::DateTime(dt) => Value::String(dt.to_rfc3339()),
            TypedValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            TypedValue::Object(record) => record.to_json(),
        }
    }

    /// The string, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this is an integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// The number, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Number(n) => Some(*n),
            TypedValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// The boolean, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The date, if this is a date value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            TypedValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// The timestamp, if this is a datetime value.
    pub fn as_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            TypedValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// The items, if this is an array.
    pub fn as_array(&self) -> Option<&[TypedValue]> {
        match self {
            TypedValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The nested record, if this is an object.
    pub fn as_object(&self) -> Option<&Record> {
        match self {
            TypedValue::Object(record) => Some(record),
            _ => None,
        }
    }
}

/// A validated metadata record: field name to typed value.
///
/// Only declared fields appear. Optional fields that were absent are left
/// out rather than stored as nulls.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, TypedValue>);

impl Record {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field.
    pub fn insert(&mut self, name: impl Into<String>, value: TypedValue) {
        self.0.insert(name.into(), value);
    }

    /// Get a field.
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.0.get(name)
    }

    /// Get a string field.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    /// Whether the field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if no fields are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TypedValue)> {
        self.0.iter()
    }

    /// Render as a JSON object.
    ///
    /// Dates render as `YYYY-MM-DD`, datetimes as RFC 3339. A non-finite
    /// number has no JSON form and renders as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }

    /// Convert into a caller-defined type.
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use quire_schema::{validate, Field, Schema};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Event {
    ///     title: String,
    ///     date: NaiveDate,
    /// }
    ///
    /// let schema = Schema::new()
    ///     .field("title", Field::string())
    ///     .field("date", Field::date());
    /// let metadata = serde_yaml::from_str("title: A\ndate: 2025-01-01").unwrap();
    /// let record = validate(&schema, &metadata).into_record().unwrap();
    ///
    /// let event: Event = record.deserialize().unwrap();
    /// assert_eq!(event.date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.to_json())
            .map_err(|e| Error::parse(format!("Failed to convert record: {e}")))
    }
}

impl FromIterator<(String, TypedValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, TypedValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Record {
    type Item = (String, TypedValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, TypedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn sample() -> Record {
        let mut image = Record::new();
        image.insert("src", TypedValue::String("/a.png".into()));

        let mut record = Record::new();
        record.insert("title", TypedValue::String("A".into()));
        record.insert(
            "date",
            TypedValue::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
        );
        record.insert("count", TypedValue::Integer(3));
        record.insert("image", TypedValue::Object(image));
        record.insert(
            "tags",
            TypedValue::Array(vec![TypedValue::String("rust".into())]),
        );
        record
    }

    #[test]
    fn test_record_to_json() {
        let json = sample().to_json();
        assert_eq!(json["title"], "A");
        assert_eq!(json["date"], "2025-01-01");
        assert_eq!(json["count"], 3);
        assert_eq!(json["image"]["src"], "/a.png");
        assert_eq!(json["tags"][0], "rust");
    }

    #[test]
    fn test_typed_value_to_json_edges() {
        let dt = DateTime::parse_from_rfc3339("2025-04-12T09:00:00+02:00").unwrap();
        assert_eq!(
            TypedValue::DateTime(dt).to_json(),
            serde_json::json!("2025-04-12T09:00:00+02:00")
        );
        assert_eq!(TypedValue::Number(1.5).to_json(), serde_json::json!(1.5));
        assert!(TypedValue::Number(f64::NAN).to_json().is_null());
        assert!(Record::new().to_json().as_object().unwrap().is_empty());
    }

    #[derive(Debug, Deserialize)]
    struct Image {
        src: String,
    }

    #[derive(Debug, Deserialize)]
    struct Item {
        title: String,
        date: NaiveDate,
        count: u32,
        image: Image,
        tags: Vec<String>,
    }

    #[test]
    fn test_record_deserialize() {
        let item: Item = sample().deserialize().unwrap();
        assert_eq!(item.title, "A");
        assert_eq!(item.date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(item.count, 3);
        assert_eq!(item.image.src, "/a.png");
        assert_eq!(item.tags, vec!["rust"]);
    }

    #[test]
    fn test_record_deserialize_mismatch() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Wrong {
            title: u32,
        }
        let err = sample().deserialize::<Wrong>().unwrap_err();
        assert!(err.to_string().contains("Failed to convert record"));
    }

    #[test]
    fn test_typed_value_accessors() {
        let record = sample();
        assert_eq!(record.get_str("title"), Some("A"));
        assert_eq!(record.get("count").and_then(TypedValue::as_f64), Some(3.0));
        assert!(record.get("date").and_then(TypedValue::as_date).is_some());
        assert!(record.get("title").and_then(TypedValue::as_date).is_none());
        assert_eq!(record.len(), 5);
        assert!(!record.contains("missing"));
    }
}
