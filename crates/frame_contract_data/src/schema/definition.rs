//! JSON schema definitions.
//!
//! Accepted shapes:
//!
//! ```json
//! {"name": "orders", "strict": true, "columns": [{"name": "id", "dtype": "int64", "unique": true}]}
//! [{"name": "id", "dtype": "int64"}, {"from_arg": "key_col", "nullable": true}]
//! ```

use serde_json::{Map, Value as JsonValue};
use std::str::FromStr;

use super::{Column, ColumnKey, DataFrameSchema};
use crate::error::{DataError, Result};
use crate::types::DataType;

fn invalid(message: impl Into<String>) -> DataError {
    DataError::InvalidSchema(message.into())
}

impl DataFrameSchema {
    /// Parse a schema definition from JSON.
    pub fn from_json(raw: &str) -> Result<DataFrameSchema> {
        let raw = raw.trim();
        if raw.is_empty() || raw == "null" {
            return Err(invalid("schema definition is empty"));
        }
        let value: JsonValue = serde_json::from_str(raw)?;

        if value.is_array() {
            return Ok(DataFrameSchema {
                columns: columns_from_value(&value)?,
                strict: false,
                name: None,
            });
        }

        let obj = value
            .as_object()
            .ok_or_else(|| invalid("schema definition must be an object or an array of columns"))?;
        let columns_value = obj
            .get("columns")
            .ok_or_else(|| invalid("schema definition missing columns"))?;
        Ok(DataFrameSchema {
            columns: columns_from_value(columns_value)?,
            strict: bool_field(obj, "strict", false)?,
            name: obj.get("name").and_then(|v| v.as_str()).map(str::to_string),
        })
    }
}

fn columns_from_value(value: &JsonValue) -> Result<Vec<(ColumnKey, Column)>> {
    let arr = value
        .as_array()
        .ok_or_else(|| invalid("columns must be an array"))?;
    arr.iter().map(column_from_value).collect()
}

fn column_from_value(value: &JsonValue) -> Result<(ColumnKey, Column)> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid("column must be an object"))?;

    let key = match (
        obj.get("name").and_then(|v| v.as_str()),
        obj.get("from_arg").and_then(|v| v.as_str()),
    ) {
        (Some(name), None) => ColumnKey::Name(name.to_string()),
        (None, Some(param)) => ColumnKey::FromArg(param.to_string()),
        (Some(_), Some(_)) => return Err(invalid("column sets both name and from_arg")),
        (None, None) => return Err(invalid("column.name or column.from_arg is required")),
    };

    let data_type = match obj
        .get("dtype")
        .or_else(|| obj.get("data_type"))
        .or_else(|| obj.get("type"))
    {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(dtype)) => Some(DataType::from_str(dtype)?),
        Some(_) => return Err(invalid(format!("column {} dtype must be a string", key))),
    };

    let column = Column {
        data_type,
        nullable: bool_field(obj, "nullable", false)?,
        unique: bool_field(obj, "unique", false)?,
        required: bool_field(obj, "required", true)?,
    };
    Ok((key, column))
}

fn bool_field(obj: &Map<String, JsonValue>, field: &str, default: bool) -> Result<bool> {
    match obj.get(field) {
        None | Some(JsonValue::Null) => Ok(default),
        Some(JsonValue::Bool(b)) => Ok(*b),
        Some(_) => Err(invalid(format!("{} must be a boolean", field))),
    }
}
