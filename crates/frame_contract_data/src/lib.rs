//! Frame Contract Data
//!
//! Table-like values checked by `frame_contract` and the schema oracle that
//! validates them.
//!
//! - [`Frame`]: 2-D table (Arrow record batch plus a row index)
//! - [`Series`]: 1-D labeled values
//! - [`Shared`]: handle giving frames and series object identity
//! - [`Value`]: any argument or return value of a checked function
//! - [`schema`]: `DataFrameSchema` / `SeriesSchema` validation

pub mod error;
pub mod frame;
pub mod schema;
pub mod types;
pub mod value;

pub use error::{DataError, Result};
pub use frame::{range_index, Frame, FrameRef, Series, SeriesRef, Shared};
pub use schema::{
    Column, ColumnKey, DataFrameSchema, Schema, SchemaError, SeriesSchema, ValidateOptions,
};
pub use types::DataType;
pub use value::{ItemKey, Value};
