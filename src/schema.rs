//! What a backend knows about the data it filters.
//!
//! Backends describe their metadata through [`SchemaResolver`]; the bundled
//! [`Schema`] is a plain in-memory implementation that can be built in code or
//! loaded from JSON:
//!
//! ```
//! use odata_filter::schema::{Schema, SchemaResolver, ValueType};
//!
//! let schema = Schema::from_json(r#"{
//!     "fields": {
//!         "id": "number",
//!         "status": { "enum": "TestStatus" },
//!         "author": "entity",
//!         "author/name": "string"
//!     },
//!     "enums": { "TestStatus": ["enabled", "disabled"] }
//! }"#).unwrap();
//!
//! assert_eq!(schema.resolve_field(&["author", "name"]), Some(ValueType::String));
//! assert_eq!(schema.enum_values("TestStatus").map(|v| v.len()), Some(2));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Type of a field, a literal or an expression result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Boolean,
    String,
    #[serde(alias = "integer", alias = "decimal", alias = "float")]
    Number,
    Date,
    #[serde(alias = "date_time")]
    Datetime,
    Time,
    Duration,
    Guid,
    Binary,
    /// Field holding members of the named enum type
    Enum(String),
    /// Navigation target with fields of its own
    Entity,
    /// Collection of elements of the inner type
    Collection(Box<ValueType>),
    /// The `null` literal
    Null,
    /// Not known statically; compatible with everything
    Any,
}

impl ValueType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Number)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, ValueType::Date | ValueType::Datetime | ValueType::Time)
    }

    /// `Any` stands for "could be anything" and is never reported as a mismatch.
    pub fn is_any(&self) -> bool {
        matches!(self, ValueType::Any)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Boolean => f.write_str("boolean"),
            ValueType::String => f.write_str("string"),
            ValueType::Number => f.write_str("number"),
            ValueType::Date => f.write_str("date"),
            ValueType::Datetime => f.write_str("datetime"),
            ValueType::Time => f.write_str("time"),
            ValueType::Duration => f.write_str("duration"),
            ValueType::Guid => f.write_str("guid"),
            ValueType::Binary => f.write_str("binary"),
            ValueType::Enum(name) => write!(f, "enum {name}"),
            ValueType::Entity => f.write_str("entity"),
            ValueType::Collection(inner) => write!(f, "collection of {inner}"),
            ValueType::Null => f.write_str("null"),
            ValueType::Any => f.write_str("any"),
        }
    }
}

/// Field and enum lookups a schema-aware backend needs.
///
/// Implementations are read-only during a traversal.
pub trait SchemaResolver {
    /// Declared type of the field at `path` (root segment first).
    fn resolve_field(&self, path: &[&str]) -> Option<ValueType>;

    /// Members of the enum type `type_name`, or `None` if it is unknown.
    fn enum_values(&self, type_name: &str) -> Option<&[String]>;
}

/// In-memory schema keyed by `/`-joined field paths.
///
/// Intermediate segments of a nested path should be declared too (usually as
/// [`ValueType::Entity`]) so that a failed lookup can name the first segment
/// that does not exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub fields: BTreeMap<String, ValueType>,
    #[serde(default)]
    pub enums: BTreeMap<String, Vec<String>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Declares a field; `path` uses `/` between segments.
    pub fn field(mut self, path: impl Into<String>, ty: ValueType) -> Self {
        self.fields.insert(path.into(), ty);
        self
    }

    /// Declares an enum type and its members.
    pub fn enumeration<I, S>(mut self, type_name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enums
            .insert(type_name.into(), values.into_iter().map(Into::into).collect());
        self
    }
}

impl SchemaResolver for Schema {
    fn resolve_field(&self, path: &[&str]) -> Option<ValueType> {
        self.fields.get(&path.join("/")).cloned()
    }

    fn enum_values(&self, type_name: &str) -> Option<&[String]> {
        self.enums.get(type_name).map(Vec::as_slice)
    }
}
