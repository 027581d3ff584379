//! Schema definitions.
//!
//! Schemas deserialize from any serde format. In TOML a collection schema
//! reads like:
//!
//! ```toml
//! unknown_fields = "reject"
//!
//! [fields]
//! name = { type = "string", min_length = 1 }
//! published = { type = "boolean", default = false }
//! date = { type = "datetime", optional = true }
//! level = { type = "enum", values = ["intro", "advanced"] }
//! tags = { type = "array", items = { type = "string" } }
//!
//! [fields.image]
//! type = "object"
//! fields = { src = { type = "string" }, alt = { type = "string" } }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use quire_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::validate::{check_value, join_path};

/// What to do with metadata keys the schema does not declare.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFields {
    /// Drop undeclared keys from the record.
    #[default]
    Strip,
    /// Report every undeclared key as a field error.
    Reject,
}

/// The expected shape of a field value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    /// UTF-8 text, optionally bounded in length (characters).
    String {
        /// Minimum number of characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        /// Maximum number of characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    /// Whole number. Numeric strings are coerced.
    Integer {
        /// Inclusive lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        /// Inclusive upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    /// Floating point number. Integers and numeric strings are coerced.
    Number {
        /// Inclusive lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        /// Inclusive upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// `true`/`false`, also from the strings `"true"`/`"false"`.
    Boolean,
    /// Calendar date written as `YYYY-MM-DD`.
    Date,
    /// Timestamp, RFC 3339 or naive (read as UTC).
    #[serde(rename = "datetime")]
    DateTime,
    /// One string out of a fixed set.
    Enum {
        /// Allowed values.
        values: Vec<String>,
    },
    /// A list whose items all share one type.
    Array {
        /// Type of every item.
        items: Box<FieldType>,
        /// Minimum number of items.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_items: Option<usize>,
        /// Maximum number of items.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
    /// A nested key/value structure with its own fields.
    Object {
        /// Declared nested fields.
        #[serde(default)]
        fields: BTreeMap<String, Field>,
        /// Policy for undeclared nested keys.
        #[serde(default)]
        unknown_fields: UnknownFields,
    },
}

impl FieldType {
    /// Unbounded string.
    pub fn string() -> Self {
        FieldType::String {
            min_length: None,
            max_length: None,
        }
    }

    /// Unbounded integer.
    pub fn integer() -> Self {
        FieldType::Integer {
            min: None,
            max: None,
        }
    }

    /// Unbounded number.
    pub fn number() -> Self {
        FieldType::Number {
            min: None,
            max: None,
        }
    }

    /// Array of `items` with no length bounds.
    pub fn array(items: FieldType) -> Self {
        FieldType::Array {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
    }

    /// Nested object described by `schema`.
    pub fn object(schema: Schema) -> Self {
        FieldType::Object {
            fields: schema.fields,
            unknown_fields: schema.unknown_fields,
        }
    }

    /// Enum over the given values.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldType::Enum {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Short name used in messages (`expected <name>`).
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String { .. } | FieldType::Enum { .. } => "string",
            FieldType::Integer { .. } => "integer",
            FieldType::Number { .. } => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Array { .. } => "array",
            FieldType::Object { .. } => "object",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Enum { values } => write!(f, "enum({})", values.join("|")),
            FieldType::Array { items, .. } => write!(f, "array<{items}>"),
            other => f.write_str(other.name()),
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// One declared field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Expected shape.
    #[serde(flatten)]
    pub ty: FieldType,
    /// Whether the field may be absent (or null).
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    /// Value used when the field is absent. Validated like a supplied value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Free-form note for humans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Field {
    /// A required field of the given type.
    pub fn new(ty: FieldType) -> Self {
        Self {
            ty,
            optional: false,
            default: None,
            description: None,
        }
    }

    /// Required string.
    pub fn string() -> Self {
        Self::new(FieldType::string())
    }

    /// Required integer.
    pub fn integer() -> Self {
        Self::new(FieldType::integer())
    }

    /// Required number.
    pub fn number() -> Self {
        Self::new(FieldType::number())
    }

    /// Required boolean.
    pub fn boolean() -> Self {
        Self::new(FieldType::Boolean)
    }

    /// Required date.
    pub fn date() -> Self {
        Self::new(FieldType::Date)
    }

    /// Required datetime.
    pub fn datetime() -> Self {
        Self::new(FieldType::DateTime)
    }

    /// Required enum.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(FieldType::enumeration(values))
    }

    /// Required array of `items`.
    pub fn array(items: FieldType) -> Self {
        Self::new(FieldType::array(items))
    }

    /// Required nested object.
    pub fn object(schema: Schema) -> Self {
        Self::new(FieldType::object(schema))
    }

    /// Mark the field optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Use `value` when the field is absent.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Attach a description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// `true` when a missing value is acceptable.
    pub fn may_be_absent(&self) -> bool {
        self.optional || self.default.is_some()
    }
}

/// A collection's metadata schema.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Declared top-level fields.
    #[serde(default)]
    pub fields: BTreeMap<String, Field>,
    /// Policy for undeclared top-level keys.
    #[serde(default)]
    pub unknown_fields: UnknownFields,
}

impl Schema {
    /// An empty schema that strips unknown fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field.
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Report undeclared keys instead of dropping them.
    pub fn reject_unknown(mut self) -> Self {
        self.unknown_fields = UnknownFields::Reject;
        self
    }

    /// Look up a declared field.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Validate a metadata mapping against this schema.
    pub fn validate(&self, metadata: &serde_yaml::Mapping) -> crate::ValidationOutcome {
        crate::validate(self, metadata)
    }

    /// Check that the schema itself is usable.
    ///
    /// Rejects empty or repeated enum values, inverted bounds, and defaults
    /// that would fail their own field's validation.
    pub fn check(&self) -> Result<()> {
        check_fields(&self.fields, "")
    }
}

fn check_fields(fields: &BTreeMap<String, Field>, prefix: &str) -> Result<()> {
    for (name, field) in fields {
        let path = join_path(prefix, name);
        check_type(&field.ty, &path)?;

        if let Some(default) = &field.default {
            let messages = check_value(&field.ty, default, &path);
            if !messages.is_empty() {
                return Err(Error::schema(format!(
                    "default for '{path}' is invalid: {}",
                    messages.join("; ")
                )));
            }
        }
    }
    Ok(())
}

fn check_type(ty: &FieldType, path: &str) -> Result<()> {
    match ty {
        FieldType::String {
            min_length: Some(min),
            max_length: Some(max),
        } if min > max => Err(Error::schema(format!(
            "'{path}': min_length {min} exceeds max_length {max}"
        ))),
        FieldType::Integer {
            min: Some(min),
            max: Some(max),
        } if min > max => Err(Error::schema(format!(
            "'{path}': min {min} exceeds max {max}"
        ))),
        FieldType::Number {
            min: Some(min),
            max: Some(max),
        } if min > max => Err(Error::schema(format!(
            "'{path}': min {min} exceeds max {max}"
        ))),
        FieldType::Enum { values } => {
            if values.is_empty() {
                return Err(Error::schema(format!("'{path}': enum has no values")));
            }
            for (i, value) in values.iter().enumerate() {
                if values[..i].contains(value) {
                    return Err(Error::schema(format!(
                        "'{path}': enum value '{value}' is repeated"
                    )));
                }
            }
            Ok(())
        }
        FieldType::Array {
            items,
            min_items,
            max_items,
        } => {
            if let (Some(min), Some(max)) = (min_items, max_items) {
                if min > max {
                    return Err(Error::schema(format!(
                        "'{path}': min_items {min} exceeds max_items {max}"
                    )));
                }
            }
            check_type(items, &format!("{path}[]"))
        }
        FieldType::Object { fields, .. } => check_fields(fields, path),
        _ => Ok(()),
    }
}
