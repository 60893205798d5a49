//! Canonical column data types used by schemas.
//!
//! Schemas speak in a small set of logical types; Arrow arrays carry physical
//! types. [`DataType::accepts`] decides which physical types satisfy a logical
//! one.

use arrow::datatypes::DataType as ArrowDataType;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean
    Boolean,

    /// Signed integer of any width
    Int64,

    /// Unsigned integer of any width
    UInt64,

    /// Floating point of any width
    Float64,

    /// UTF-8 string
    String,

    /// Raw bytes
    Binary,

    /// Date (no time component)
    Date,

    /// Timestamp without timezone
    Timestamp,

    /// Timestamp with explicit timezone
    TimestampTz { tz: String },

    /// Time of day
    Time,

    /// Duration
    Duration,

    /// Decimal with fixed precision and scale
    Decimal { precision: u8, scale: i8 },

    /// List of any item type
    List,
}

impl DataType {
    /// Whether an Arrow array of `actual` type satisfies this logical type.
    ///
    /// All-null arrays (`Null` physical type) satisfy every logical type; the
    /// nullability check reports them instead.
    pub fn accepts(&self, actual: &ArrowDataType) -> bool {
        use ArrowDataType as A;
        use DataType as S;

        match (self, actual) {
            (_, A::Null) => true,
            (S::Boolean, A::Boolean) => true,
            (S::Int64, A::Int8 | A::Int16 | A::Int32 | A::Int64) => true,
            (S::UInt64, A::UInt8 | A::UInt16 | A::UInt32 | A::UInt64) => true,
            (S::Float64, A::Float16 | A::Float32 | A::Float64) => true,
            (S::String, A::Utf8 | A::LargeUtf8 | A::Utf8View) => true,
            (S::Binary, A::Binary | A::LargeBinary | A::BinaryView) => true,
            (S::Date, A::Date32 | A::Date64) => true,
            (S::Timestamp, A::Timestamp(_, tz)) => tz.is_none(),
            (S::TimestampTz { tz }, A::Timestamp(_, Some(actual_tz))) => eq_tz(actual_tz, tz),
            (S::Time, A::Time32(_) | A::Time64(_)) => true,
            (S::Duration, A::Duration(_)) => true,
            (S::Decimal { precision, scale }, A::Decimal128(p, s) | A::Decimal256(p, s)) => {
                precision == p && scale == s
            }
            (S::List, A::List(_) | A::LargeList(_) | A::FixedSizeList(_, _)) => true,
            _ => false,
        }
    }

    /// Logical name for an Arrow type, falling back to Arrow's own spelling.
    pub fn describe_arrow(actual: &ArrowDataType) -> String {
        use ArrowDataType as A;
        match actual {
            A::Int8 | A::Int16 | A::Int32 | A::Int64 => actual.to_string().to_lowercase(),
            A::UInt8 | A::UInt16 | A::UInt32 | A::UInt64 => actual.to_string().to_lowercase(),
            A::Float16 | A::Float32 | A::Float64 => actual.to_string().to_lowercase(),
            A::Boolean => "boolean".to_string(),
            A::Utf8 | A::LargeUtf8 | A::Utf8View => "string".to_string(),
            A::Null => "null".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => write!(f, "boolean"),
            DataType::Int64 => write!(f, "int64"),
            DataType::UInt64 => write!(f, "uint64"),
            DataType::Float64 => write!(f, "float64"),
            DataType::String => write!(f, "string"),
            DataType::Binary => write!(f, "binary"),
            DataType::Date => write!(f, "date"),
            DataType::Timestamp => write!(f, "timestamp"),
            DataType::TimestampTz { tz } => write!(f, "timestamp_tz({})", tz),
            DataType::Time => write!(f, "time"),
            DataType::Duration => write!(f, "duration"),
            DataType::Decimal { precision, scale } => write!(f, "decimal({},{})", precision, scale),
            DataType::List => write!(f, "list"),
        }
    }
}

impl FromStr for DataType {
    type Err = DataError;

    /// Accepts canonical names plus the common pandas/polars spellings.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let lower = trimmed.to_lowercase();

        if let Some(inner) = strip_call(&lower, "timestamp_tz") {
            return Ok(DataType::TimestampTz {
                tz: inner.trim().to_string(),
            });
        }
        if let Some(inner) = strip_call(&lower, "decimal") {
            return parse_decimal(inner).ok_or_else(|| DataError::UnsupportedDtype(trimmed.to_string()));
        }
        if lower.starts_with("datetime64") {
            if lower.contains("utc") || lower.contains("tz=") {
                return Ok(DataType::TimestampTz {
                    tz: "UTC".to_string(),
                });
            }
            return Ok(DataType::Timestamp);
        }

        let dt = match lower.as_str() {
            "bool" | "boolean" => DataType::Boolean,
            "int" | "integer" | "int8" | "int16" | "int32" | "int64" => DataType::Int64,
            "uint" | "uint8" | "uint16" | "uint32" | "uint64" => DataType::UInt64,
            "float" | "float16" | "float32" | "float64" | "double" => DataType::Float64,
            "str" | "string" | "utf8" | "text" | "object" => DataType::String,
            "binary" | "bytes" => DataType::Binary,
            "date" | "date32" | "date64" => DataType::Date,
            "timestamp" | "datetime" => DataType::Timestamp,
            "time" | "time32" | "time64" => DataType::Time,
            "duration" | "timedelta" | "interval" => DataType::Duration,
            "list" => DataType::List,
            _ => return Err(DataError::UnsupportedDtype(trimmed.to_string())),
        };
        Ok(dt)
    }
}

impl Serialize for DataType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DataType::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

fn strip_call<'a>(value: &'a str, name: &str) -> Option<&'a str> {
    value
        .strip_prefix(name)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_decimal(inner: &str) -> Option<DataType> {
    let (precision, scale) = inner.split_once(',')?;
    Some(DataType::Decimal {
        precision: precision.trim().parse().ok()?,
        scale: scale.trim().parse().ok()?,
    })
}

fn eq_tz(a: &str, b: &str) -> bool {
    normalize_tz(a) == normalize_tz(b)
}

fn normalize_tz(value: &str) -> String {
    let lower = value.trim().to_ascii_lowercase();
    match lower.as_str() {
        "utc" | "etc/utc" | "gmt" | "etc/gmt" | "z" | "+00:00" => "utc".to_string(),
        _ => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::TimeUnit;

    #[test]
    fn test_parse_dtype_aliases() {
        assert_eq!("int".parse::<DataType>().unwrap(), DataType::Int64);
        assert_eq!("Float32".parse::<DataType>().unwrap(), DataType::Float64);
        assert_eq!("str".parse::<DataType>().unwrap(), DataType::String);
        assert_eq!(
            "datetime64[ns, UTC]".parse::<DataType>().unwrap(),
            DataType::TimestampTz { tz: "UTC".to_string() }
        );
        assert_eq!(
            "decimal(10, 2)".parse::<DataType>().unwrap(),
            DataType::Decimal { precision: 10, scale: 2 }
        );
        assert!("complex128".parse::<DataType>().is_err());
    }

    #[test]
    fn test_accepts_physical_widths() {
        assert!(DataType::Int64.accepts(&ArrowDataType::Int32));
        assert!(!DataType::Int64.accepts(&ArrowDataType::Float64));
        assert!(!DataType::Float64.accepts(&ArrowDataType::Int64));
        assert!(DataType::String.accepts(&ArrowDataType::LargeUtf8));
        assert!(DataType::Boolean.accepts(&ArrowDataType::Null));
    }

    #[test]
    fn test_timezone_alias_matching() {
        let utc = DataType::TimestampTz { tz: "UTC".to_string() };
        assert!(utc.accepts(&ArrowDataType::Timestamp(TimeUnit::Second, Some("Etc/UTC".into()))));
        assert!(!utc.accepts(&ArrowDataType::Timestamp(TimeUnit::Second, None)));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&DataType::Int64).unwrap();
        assert_eq!(json, "\"int64\"");
        let back: DataType = serde_json::from_str("\"float\"").unwrap();
        assert_eq!(back, DataType::Float64);
    }
}
