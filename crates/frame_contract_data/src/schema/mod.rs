//! Schema oracle.
//!
//! A schema describes the columns a [`Frame`](crate::Frame) must carry (or the
//! values a [`Series`](crate::Series) must hold). Validation collects every
//! failure instead of stopping at the first one; each failure is one
//! human-readable string.
//!
//! Column names may be placeholders ([`ColumnKey::FromArg`]) that name a
//! function parameter. The schema cannot validate until its placeholders are
//! resolved with [`DataFrameSchema::resolve_columns`].

mod definition;
mod validate;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::types::DataType;
use crate::value::Value;

pub use validate::ValidateOptions;

/// Column name in a schema: a literal name or a placeholder resolved from a
/// function parameter at call time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Name(String),
    FromArg(String),
}

impl ColumnKey {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            ColumnKey::Name(name) => Some(name),
            ColumnKey::FromArg(_) => None,
        }
    }

    pub fn as_parameter(&self) -> Option<&str> {
        match self {
            ColumnKey::Name(_) => None,
            ColumnKey::FromArg(param) => Some(param),
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Name(name) => write!(f, "'{}'", name),
            ColumnKey::FromArg(param) => write!(f, "from_arg('{}')", param),
        }
    }
}

impl From<&str> for ColumnKey {
    fn from(name: &str) -> Self {
        ColumnKey::Name(name.to_string())
    }
}

impl From<String> for ColumnKey {
    fn from(name: String) -> Self {
        ColumnKey::Name(name)
    }
}

/// Expectations for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Expected logical type; `None` accepts any type
    pub data_type: Option<DataType>,

    /// Whether null values are allowed
    pub nullable: bool,

    /// Whether values must be distinct
    pub unique: bool,

    /// Whether the column must exist
    pub required: bool,
}

impl Column {
    pub fn of(data_type: DataType) -> Self {
        Self {
            data_type: Some(data_type),
            ..Self::any()
        }
    }

    pub fn any() -> Self {
        Self {
            data_type: None,
            nullable: false,
            unique: false,
            required: true,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

impl Default for Column {
    fn default() -> Self {
        Self::any()
    }
}

/// Schema for 2-D frames.
#[derive(Debug, Clone, Default)]
pub struct DataFrameSchema {
    columns: Vec<(ColumnKey, Column)>,
    strict: bool,
    name: Option<String>,
}

impl DataFrameSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, key: impl Into<ColumnKey>, column: Column) -> Self {
        self.columns.push((key.into(), column));
        self
    }

    /// Reject columns the schema does not name.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn columns(&self) -> &[(ColumnKey, Column)] {
        &self.columns
    }

    /// Literal column names, in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().filter_map(|(key, _)| key.as_name()).collect()
    }

    /// Parameter names referenced by placeholders.
    pub fn placeholders(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter_map(|(key, _)| key.as_parameter())
            .collect()
    }

    pub fn is_resolved(&self) -> bool {
        self.columns
            .iter()
            .all(|(key, _)| matches!(key, ColumnKey::Name(_)))
    }

    /// Copy with every placeholder replaced by the column names `lookup`
    /// returns for its parameter. One placeholder may expand to several
    /// columns, each sharing the placeholder's column spec.
    pub fn resolve_columns<E, F>(&self, mut lookup: F) -> Result<DataFrameSchema, E>
    where
        F: FnMut(&str) -> Result<Vec<String>, E>,
    {
        if self.is_resolved() {
            return Ok(self.clone());
        }
        let mut columns = Vec::with_capacity(self.columns.len());
        for (key, column) in &self.columns {
            match key {
                ColumnKey::Name(_) => columns.push((key.clone(), column.clone())),
                ColumnKey::FromArg(param) => {
                    for name in lookup(param)? {
                        columns.push((ColumnKey::Name(name), column.clone()));
                    }
                }
            }
        }
        Ok(DataFrameSchema {
            columns,
            strict: self.strict,
            name: self.name.clone(),
        })
    }
}

/// Schema for 1-D series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesSchema {
    pub data_type: Option<DataType>,
    pub nullable: bool,
    pub unique: bool,
    pub name: Option<String>,
}

impl SeriesSchema {
    pub fn of(data_type: DataType) -> Self {
        Self {
            data_type: Some(data_type),
            ..Self::default()
        }
    }

    pub fn any() -> Self {
        Self::default()
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Either kind of schema.
#[derive(Debug, Clone)]
pub enum Schema {
    DataFrame(DataFrameSchema),
    Series(SeriesSchema),
}

impl Schema {
    /// Backend name used in mismatch messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Schema::DataFrame(_) => "DataFrameSchema",
            Schema::Series(_) => "SeriesSchema",
        }
    }

    pub fn as_data_frame(&self) -> Option<&DataFrameSchema> {
        match self {
            Schema::DataFrame(schema) => Some(schema),
            Schema::Series(_) => None,
        }
    }

    pub fn placeholders(&self) -> Vec<&str> {
        match self {
            Schema::DataFrame(schema) => schema.placeholders(),
            Schema::Series(_) => Vec::new(),
        }
    }

    pub fn resolve_columns<E, F>(&self, lookup: F) -> Result<Schema, E>
    where
        F: FnMut(&str) -> Result<Vec<String>, E>,
    {
        match self {
            Schema::DataFrame(schema) => Ok(Schema::DataFrame(schema.resolve_columns(lookup)?)),
            Schema::Series(schema) => Ok(Schema::Series(schema.clone())),
        }
    }

    /// Validate a value; a value of the wrong structural kind yields
    /// [`SchemaError::BackendMismatch`].
    pub fn validate(&self, value: &Value, options: &ValidateOptions) -> Result<(), SchemaError> {
        match (self, value) {
            (Schema::DataFrame(schema), Value::Frame(frame)) => {
                validate::validate_frame(schema, &frame.read(), options)
            }
            (Schema::Series(schema), Value::Series(series)) => {
                validate::validate_series(schema, &series.read(), options)
            }
            _ => Err(SchemaError::BackendMismatch {
                schema: self.kind_name(),
                value: value.kind(),
            }),
        }
    }
}

impl From<DataFrameSchema> for Schema {
    fn from(schema: DataFrameSchema) -> Self {
        Schema::DataFrame(schema)
    }
}

impl From<SeriesSchema> for Schema {
    fn from(schema: SeriesSchema) -> Self {
        Schema::Series(schema)
    }
}

/// Outcome of a failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{}", .0.join("\n"))]
    Failures(Vec<String>),

    #[error("Backend {schema} not applicable to {value}")]
    BackendMismatch {
        schema: &'static str,
        value: &'static str,
    },
}

impl SchemaError {
    /// One message per failure.
    pub fn messages(&self) -> Vec<String> {
        match self {
            SchemaError::Failures(failures) => failures.clone(),
            SchemaError::BackendMismatch { .. } => vec![self.to_string()],
        }
    }
}
