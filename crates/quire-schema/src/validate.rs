//! Schema validation and coercion.
//!
//! [`validate`] walks every declared field, coercing values into their
//! declared types and collecting every violation it finds. It never stops at
//! the first problem and never returns an error: a document that does not fit
//! its schema is an ordinary [`ValidationOutcome::Invalid`].
//!
//! Field paths are dotted for nested objects and use brackets for array
//! items, e.g. `speakers[1].name`.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::schema::{Field, FieldType, Schema, UnknownFields};
use crate::value::{Record, TypedValue};

const REQUIRED: &str = "required field missing";
const UNKNOWN: &str = "unknown field not allowed";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Result of validating one metadata mapping.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationOutcome {
    /// Every field conforms; values are coerced.
    Valid(Record),
    /// At least one field failed.
    Invalid(FieldErrors),
}

impl ValidationOutcome {
    /// `true` for [`ValidationOutcome::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }

    /// The record, if valid.
    pub fn into_record(self) -> Option<Record> {
        match self {
            ValidationOutcome::Valid(record) => Some(record),
            ValidationOutcome::Invalid(_) => None,
        }
    }

    /// The errors, if invalid.
    pub fn into_errors(self) -> Option<FieldErrors> {
        match self {
            ValidationOutcome::Valid(_) => None,
            ValidationOutcome::Invalid(errors) => Some(errors),
        }
    }

    /// Convert into a `Result`, for callers that want `?`.
    pub fn into_result(self) -> Result<Record, FieldErrors> {
        match self {
            ValidationOutcome::Valid(record) => Ok(record),
            ValidationOutcome::Invalid(errors) => Err(errors),
        }
    }
}

/// Field path to the ordered messages reported for it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// No errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a path.
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.entry(path.into()).or_default().push(message.into());
    }

    /// Messages for one path.
    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.0.get(path).map(Vec::as_slice)
    }

    /// Whether any message was recorded for `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    /// Number of failing paths.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Failing paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Paths with their messages, in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Validate a metadata mapping against a schema.
///
/// Total and pure: the same input always yields the same outcome.
pub fn validate(schema: &Schema, metadata: &Mapping) -> ValidationOutcome {
    let mut errors = FieldErrors::new();
    let record = validate_object(
        &schema.fields,
        schema.unknown_fields,
        metadata,
        "",
        &mut errors,
    );

    if errors.is_empty() {
        ValidationOutcome::Valid(record)
    } else {
        ValidationOutcome::Invalid(errors)
    }
}

/// Join a parent path and a key.
pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Messages produced by checking a single value, regardless of path.
pub(crate) fn check_value(ty: &FieldType, value: &Value, path: &str) -> Vec<String> {
    let mut errors = FieldErrors::new();
    validate_value(ty, value, path, &mut errors);
    errors
        .iter()
        .flat_map(|(p, msgs)| msgs.iter().map(move |m| format!("{p}: {m}")))
        .collect()
}

fn validate_object(
    fields: &BTreeMap<String, Field>,
    unknown: UnknownFields,
    map: &Mapping,
    prefix: &str,
    errors: &mut FieldErrors,
) -> Record {
    let mut record = Record::new();

    for (name, field) in fields {
        let path = join_path(prefix, name);
        let supplied = map.get(name.as_str()).filter(|v| !v.is_null());

        let value = match (supplied, &field.default) {
            (Some(value), _) => value,
            (None, Some(default)) => default,
            (None, None) if field.optional => continue,
            (None, None) => {
                match map.get(name.as_str()) {
                    Some(_) => errors.push(path, mismatch(field.ty.name(), &Value::Null)),
                    None => errors.push(path, REQUIRED),
                }
                continue;
            }
        };

        if let Some(typed) = validate_value(&field.ty, value, &path, errors) {
            record.insert(name.clone(), typed);
        }
    }

    if unknown == UnknownFields::Reject {
        for key in map.keys() {
            match key.as_str() {
                Some(k) if fields.contains_key(k) => {}
                Some(k) => errors.push(join_path(prefix, k), UNKNOWN),
                None => errors.push(join_path(prefix, &render_key(key)), UNKNOWN),
            }
        }
    }

    record
}

fn validate_value(
    ty: &FieldType,
    value: &Value,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<TypedValue> {
    if let Value::Tagged(tagged) = value {
        return validate_value(ty, &tagged.value, path, errors);
    }

    let result = match ty {
        FieldType::String {
            min_length,
            max_length,
        } => coerce_string(value, *min_length, *max_length),
        FieldType::Integer { min, max } => coerce_integer(value, *min, *max),
        FieldType::Number { min, max } => coerce_number(value, *min, *max),
        FieldType::Boolean => coerce_boolean(value),
        FieldType::Date => coerce_date(value),
        FieldType::DateTime => coerce_datetime(value),
        FieldType::Enum { values } => coerce_enum(value, values),
        FieldType::Array {
            items,
            min_items,
            max_items,
        } => return validate_array(items, *min_items, *max_items, value, path, errors),
        FieldType::Object {
            fields,
            unknown_fields,
        } => {
            return match value {
                Value::Mapping(map) => {
                    let before = errors.len();
                    let record = validate_object(fields, *unknown_fields, map, path, errors);
                    (errors.len() == before).then_some(TypedValue::Object(record))
                }
                other => {
                    errors.push(path, mismatch("object", other));
                    None
                }
            };
        }
    };

    match result {
        Ok(typed) => Some(typed),
        Err(message) => {
            errors.push(path, message);
            None
        }
    }
}

fn validate_array(
    items: &FieldType,
    min_items: Option<usize>,
    max_items: Option<usize>,
    value: &Value,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<TypedValue> {
    let Value::Sequence(seq) = value else {
        errors.push(path, mismatch("array", value));
        return None;
    };

    let mut ok = true;
    if let Some(min) = min_items {
        if seq.len() < min {
            errors.push(path, format!("must contain at least {min} items"));
            ok = false;
        }
    }
    if let Some(max) = max_items {
        if seq.len() > max {
            errors.push(path, format!("must contain at most {max} items"));
            ok = false;
        }
    }

    let mut typed = Vec::with_capacity(seq.len());
    for (i, item) in seq.iter().enumerate() {
        match validate_value(items, item, &format!("{path}[{i}]"), errors) {
            Some(v) => typed.push(v),
            None => ok = false,
        }
    }

    ok.then_some(TypedValue::Array(typed))
}

// ============================================================================
// Scalar coercions
// ============================================================================

type Coerced = Result<TypedValue, String>;

fn coerce_string(value: &Value, min: Option<usize>, max: Option<usize>) -> Coerced {
    let Value::String(s) = value else {
        return Err(mismatch("string", value));
    };
    let len = s.chars().count();
    if let Some(min) = min {
        if len < min {
            return Err(format!("must be at least {min} characters"));
        }
    }
    if let Some(max) = max {
        if len > max {
            return Err(format!("must be at most {max} characters"));
        }
    }
    Ok(TypedValue::String(s.clone()))
}

fn coerce_integer(value: &Value, min: Option<i64>, max: Option<i64>) -> Coerced {
    let n = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && in_i64_range(*f))
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| mismatch("integer", value))?;

    check_bounds(n, min, max)?;
    Ok(TypedValue::Integer(n))
}

fn coerce_number(value: &Value, min: Option<f64>, max: Option<f64>) -> Coerced {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
    .ok_or_else(|| mismatch("number", value))?;

    check_bounds(n, min, max)?;
    Ok(TypedValue::Number(n))
}

fn coerce_boolean(value: &Value) -> Coerced {
    match value {
        Value::Bool(b) => Ok(TypedValue::Boolean(*b)),
        Value::String(s) if s == "true" => Ok(TypedValue::Boolean(true)),
        Value::String(s) if s == "false" => Ok(TypedValue::Boolean(false)),
        other => Err(mismatch("boolean", other)),
    }
}

fn coerce_date(value: &Value) -> Coerced {
    let Value::String(s) = value else {
        return Err(mismatch("date", value));
    };
    parse_date(s)
        .map(TypedValue::Date)
        .ok_or_else(|| format!("invalid date '{s}': expected YYYY-MM-DD"))
}

fn coerce_datetime(value: &Value) -> Coerced {
    let Value::String(s) = value else {
        return Err(mismatch("datetime", value));
    };
    parse_datetime(s)
        .map(TypedValue::DateTime)
        .ok_or_else(|| {
            format!("invalid datetime '{s}': expected RFC 3339 or YYYY-MM-DD HH:MM[:SS]")
        })
}

fn coerce_enum(value: &Value, allowed: &[String]) -> Coerced {
    let expected = allowed
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ");
    match value {
        Value::String(s) if allowed.contains(s) => Ok(TypedValue::String(s.clone())),
        Value::String(s) => Err(format!(
            "invalid enum value '{s}': expected one of {expected}"
        )),
        other => Err(format!(
            "expected one of {expected}, received {}",
            value_kind(other)
        )),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn parse_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}

fn check_bounds<T>(n: T, min: Option<T>, max: Option<T>) -> Result<(), String>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if let Some(min) = min {
        if n < min {
            return Err(format!("must be >= {min}"));
        }
    }
    if let Some(max) = max {
        if n > max {
            return Err(format!("must be <= {max}"));
        }
    }
    Ok(())
}

fn in_i64_range(f: f64) -> bool {
    f >= i64::MIN as f64 && f < i64::MAX as f64
}

fn mismatch(expected: &str, value: &Value) -> String {
    format!("expected {expected}, received {}", value_kind(value))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "array",
        Value::Mapping(_) => "object",
        Value::Tagged(tagged) => value_kind(&tagged.value),
    }
}

fn render_key(key: &Value) -> String {
    match key {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => format!("<{}>", value_kind(other)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn event_schema() -> Schema {
        Schema::new()
            .field("title", Field::string())
            .field("date", Field::date())
    }

    fn errors_of(schema: &Schema, yaml: &str) -> FieldErrors {
        validate(schema, &mapping(yaml))
            .into_errors()
            .expect("expected invalid outcome")
    }

    fn msgs(errors: &FieldErrors, path: &str) -> Vec<String> {
        errors.get(path).map(<[String]>::to_vec).unwrap_or_default()
    }

    // ------------------------------------------------------------------------
    // Presence tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_valid_record_is_coerced() {
        let outcome = validate(&event_schema(), &mapping("title: A\ndate: 2025-01-01"));
        let record = outcome.into_record().unwrap();
        assert_eq!(record.get_str("title"), Some("A"));
        assert_eq!(
            record.get("date"),
            Some(&TypedValue::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()))
        );
    }

    #[test]
    fn test_missing_required_field() {
        let errors = errors_of(&event_schema(), "title: B");
        assert_eq!(errors.len(), 1);
        assert_eq!(msgs(&errors, "date"), vec![REQUIRED]);
    }

    #[test]
    fn test_every_failing_field_reported() {
        let errors = errors_of(&event_schema(), "{}");
        assert_eq!(errors.paths().collect::<Vec<_>>(), vec!["date", "title"]);
    }

    #[test]
    fn test_null_required_field() {
        let errors = errors_of(&event_schema(), "title: ~\ndate: 2025-01-01");
        assert_eq!(msgs(&errors, "title"), vec!["expected string, received null"]);
    }

    #[test]
    fn test_optional_field_absent_or_null() {
        let schema = Schema::new()
            .field("title", Field::string())
            .field("date", Field::date().optional());

        let record = validate(&schema, &mapping("title: A")).into_record().unwrap();
        assert!(!record.contains("date"));

        let record = validate(&schema, &mapping("title: A\ndate:"))
            .into_record()
            .unwrap();
        assert!(!record.contains("date"));
    }

    #[test]
    fn test_default_applied() {
        let schema = Schema::new().field("published", Field::boolean().with_default(false));
        let record = validate(&schema, &Mapping::new()).into_record().unwrap();
        assert_eq!(record.get("published"), Some(&TypedValue::Boolean(false)));
    }

    // ------------------------------------------------------------------------
    // Type and coercion tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_wrong_type() {
        let errors = errors_of(&event_schema(), "title: 42\ndate: 2025-01-01");
        assert_eq!(msgs(&errors, "title"), vec!["expected string, received number"]);
    }

    #[test]
    fn test_invalid_date() {
        let errors = errors_of(&event_schema(), "title: A\ndate: 2025-13-40");
        assert_eq!(
            msgs(&errors, "date"),
            vec!["invalid date '2025-13-40': expected YYYY-MM-DD"]
        );
    }

    #[test]
    fn test_date_from_timestamp() {
        let record = validate(
            &event_schema(),
            &mapping("title: A\ndate: 2025-01-01T10:00:00+02:00"),
        )
        .into_record()
        .unwrap();
        assert_eq!(
            record.get("date").and_then(TypedValue::as_date),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
    }

    #[test]
    fn test_datetime_forms() {
        let schema = Schema::new().field("at", Field::datetime());
        for (input, expected) in [
            ("2025-03-01T18:30:00Z", "2025-03-01T18:30:00+00:00"),
            ("2025-03-01T18:30:00+01:00", "2025-03-01T18:30:00+01:00"),
            ("2025-03-01 18:30", "2025-03-01T18:30:00+00:00"),
            ("2025-03-01", "2025-03-01T00:00:00+00:00"),
        ] {
            let record = validate(&schema, &mapping(&format!("at: '{input}'")))
                .into_record()
                .unwrap();
            let at = record.get("at").and_then(TypedValue::as_datetime).unwrap();
            assert_eq!(at.to_rfc3339(), expected, "input {input}");
        }
    }

    #[test]
    fn test_numeric_string_coercion() {
        let schema = Schema::new()
            .field("count", Field::integer())
            .field("ratio", Field::number())
            .field("flag", Field::boolean());
        let record = validate(&schema, &mapping("count: '7'\nratio: '0.5'\nflag: 'true'"))
            .into_record()
            .unwrap();
        assert_eq!(record.get("count"), Some(&TypedValue::Integer(7)));
        assert_eq!(record.get("ratio"), Some(&TypedValue::Number(0.5)));
        assert_eq!(record.get("flag"), Some(&TypedValue::Boolean(true)));
    }

    #[test]
    fn test_integer_accepted_as_number() {
        let schema = Schema::new().field("ratio", Field::number());
        let record = validate(&schema, &mapping("ratio: 2")).into_record().unwrap();
        assert_eq!(record.get("ratio"), Some(&TypedValue::Number(2.0)));
    }

    #[test]
    fn test_non_numeric_string_rejected() {
        let schema = Schema::new().field("count", Field::integer());
        let errors = errors_of(&schema, "count: many");
        assert_eq!(msgs(&errors, "count"), vec!["expected integer, received string"]);
    }

    #[test]
    fn test_number_not_coerced_to_string() {
        let schema = Schema::new().field("name", Field::string());
        assert!(!validate(&schema, &mapping("name: true")).is_valid());
    }

    #[test]
    fn test_bounds() {
        let schema = Schema::new()
            .field(
                "seats",
                Field::new(FieldType::Integer {
                    min: Some(1),
                    max: Some(100),
                }),
            )
            .field(
                "name",
                Field::new(FieldType::String {
                    min_length: Some(2),
                    max_length: None,
                }),
            );
        let errors = errors_of(&schema, "seats: 0\nname: A");
        assert_eq!(msgs(&errors, "seats"), vec!["must be >= 1"]);
        assert_eq!(msgs(&errors, "name"), vec!["must be at least 2 characters"]);
    }

    #[test]
    fn test_enum() {
        let schema = Schema::new().field("level", Field::enumeration(["intro", "advanced"]));
        assert!(validate(&schema, &mapping("level: intro")).is_valid());

        let errors = errors_of(&schema, "level: expert");
        assert_eq!(
            msgs(&errors, "level"),
            vec!["invalid enum value 'expert': expected one of 'intro', 'advanced'"]
        );

        let errors = errors_of(&schema, "level: 3");
        assert_eq!(
            msgs(&errors, "level"),
            vec!["expected one of 'intro', 'advanced', received number"]
        );
    }

    // ------------------------------------------------------------------------
    // Nested structure tests
    // ------------------------------------------------------------------------

    fn partner_schema() -> Schema {
        Schema::new()
            .field("name", Field::string())
            .field(
                "image",
                Field::object(
                    Schema::new()
                        .field("src", Field::string())
                        .field("alt", Field::string()),
                ),
            )
            .field(
                "speakers",
                Field::array(FieldType::object(
                    Schema::new().field("name", Field::string()),
                ))
                .optional(),
            )
    }

    #[test]
    fn test_nested_object_valid() {
        let record = validate(
            &partner_schema(),
            &mapping("name: P\nimage:\n  src: /p.png\n  alt: P logo\n"),
        )
        .into_record()
        .unwrap();
        let image = record.get("image").and_then(TypedValue::as_object).unwrap();
        assert_eq!(image.get_str("alt"), Some("P logo"));
    }

    #[test]
    fn test_nested_failure_paths() {
        let errors = errors_of(
            &partner_schema(),
            "name: P\nimage:\n  src: 3\nspeakers:\n  - name: Ada\n  - {}\n  - name: [x]\n",
        );
        assert_eq!(msgs(&errors, "image.src"), vec!["expected string, received number"]);
        assert_eq!(msgs(&errors, "image.alt"), vec![REQUIRED]);
        assert_eq!(msgs(&errors, "speakers[1].name"), vec![REQUIRED]);
        assert_eq!(
            msgs(&errors, "speakers[2].name"),
            vec!["expected string, received array"]
        );
        assert!(!errors.contains("speakers[0].name"));
    }

    #[test]
    fn test_object_wrong_shape() {
        let errors = errors_of(&partner_schema(), "name: P\nimage: logo.png");
        assert_eq!(msgs(&errors, "image"), vec!["expected object, received string"]);
    }

    #[test]
    fn test_array_bounds_and_items() {
        let schema = Schema::new().field(
            "tags",
            Field::new(FieldType::Array {
                items: Box::new(FieldType::string()),
                min_items: Some(1),
                max_items: Some(2),
            }),
        );
        assert!(validate(&schema, &mapping("tags: [a]")).is_valid());
        let errors = errors_of(&schema, "tags: []");
        assert_eq!(msgs(&errors, "tags"), vec!["must contain at least 1 items"]);
        let errors = errors_of(&schema, "tags: [a, 2, c]");
        assert_eq!(msgs(&errors, "tags"), vec!["must contain at most 2 items"]);
        assert_eq!(msgs(&errors, "tags[1]"), vec!["expected string, received number"]);
    }

    // ------------------------------------------------------------------------
    // Unknown field tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_unknown_fields_stripped() {
        let record = validate(
            &event_schema(),
            &mapping("title: A\ndate: 2025-01-01\nextra: 1"),
        )
        .into_record()
        .unwrap();
        assert!(!record.contains("extra"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let schema = event_schema().reject_unknown();
        let errors = errors_of(&schema, "title: A\ndate: 2025-01-01\nextra: 1\n3: x");
        assert_eq!(msgs(&errors, "extra"), vec![UNKNOWN]);
        assert_eq!(msgs(&errors, "3"), vec![UNKNOWN]);
    }

    fn framed_schema(unknown: UnknownFields) -> Schema {
        Schema::new().field(
            "image",
            Field::new(FieldType::Object {
                fields: Schema::new()
                    .field("src", Field::string())
                    .fields,
                unknown_fields: unknown,
            }),
        )
    }

    #[test]
    fn test_nested_unknown_fields_stripped() {
        let record = validate(
            &framed_schema(UnknownFields::Strip),
            &mapping("image:\n  src: /a.png\n  extra: 1"),
        )
        .into_record()
        .unwrap();
        let image = record.get("image").and_then(TypedValue::as_object).unwrap();
        assert!(image.contains("src"));
        assert!(!image.contains("extra"));
    }

    #[test]
    fn test_nested_unknown_fields_rejected() {
        let errors = errors_of(
            &framed_schema(UnknownFields::Reject),
            "image:\n  src: /a.png\n  extra: 1\nouter: kept",
        );
        assert_eq!(msgs(&errors, "image.extra"), vec![UNKNOWN]);
        assert!(!errors.contains("outer"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_validation_is_deterministic() {
        let input = mapping("title: 1\nextra: x");
        let schema = event_schema().reject_unknown();
        assert_eq!(validate(&schema, &input), validate(&schema, &input));
    }
}
