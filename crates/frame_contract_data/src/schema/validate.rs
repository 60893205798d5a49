use arrow::array::{Array, ArrayRef};
use arrow::error::ArrowError;
use arrow::row::{RowConverter, SortField};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use super::{Column, ColumnKey, DataFrameSchema, SchemaError, SeriesSchema};
use crate::frame::{Frame, Series};
use crate::types::DataType;

/// Row sampling applied before validation.
///
/// With nothing set every row is validated. Otherwise the validated rows are
/// the union of the first `head`, the last `tail` and `sample` rows drawn at
/// random (seeded by `random_state` when given).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_state: Option<u64>,
}

impl ValidateOptions {
    pub fn head(n: usize) -> Self {
        Self {
            head: Some(n),
            ..Self::default()
        }
    }

    pub fn tail(n: usize) -> Self {
        Self {
            tail: Some(n),
            ..Self::default()
        }
    }

    pub fn sample(n: usize, random_state: Option<u64>) -> Self {
        Self {
            sample: Some(n),
            random_state,
            ..Self::default()
        }
    }

    pub fn is_full(&self) -> bool {
        self.head.is_none() && self.tail.is_none() && self.sample.is_none()
    }

    /// Sorted row positions to validate, or `None` for all rows.
    pub fn row_positions(&self, len: usize) -> Option<Vec<usize>> {
        if self.is_full() {
            return None;
        }
        let mut rows = BTreeSet::new();
        if let Some(n) = self.head {
            rows.extend(0..n.min(len));
        }
        if let Some(n) = self.tail {
            rows.extend(len.saturating_sub(n)..len);
        }
        if let Some(n) = self.sample {
            let mut rng = match self.random_state {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            let mut positions: Vec<usize> = (0..len).collect();
            positions.shuffle(&mut rng);
            rows.extend(positions.into_iter().take(n));
        }
        Some(rows.into_iter().collect())
    }
}

pub(super) fn validate_frame(
    schema: &DataFrameSchema,
    frame: &Frame,
    options: &ValidateOptions,
) -> Result<(), SchemaError> {
    let sampled;
    let frame = match options.row_positions(frame.num_rows()) {
        Some(rows) => {
            sampled = frame
                .take_rows(&rows)
                .map_err(|e| SchemaError::Failures(vec![format!("sampling failed: {}", e)]))?;
            &sampled
        }
        None => frame,
    };

    let mut failures = Vec::new();
    for (key, column) in schema.columns() {
        let name = match key {
            ColumnKey::Name(name) => name,
            ColumnKey::FromArg(_) => {
                failures.push(format!("column placeholder {} was not resolved", key));
                continue;
            }
        };
        match frame.column(name) {
            Some(array) => check_column(name, column, array, &mut failures),
            None if column.required => {
                failures.push(format!("column '{}' not in frame", name));
            }
            None => {}
        }
    }

    if schema.is_strict() {
        let declared = schema.column_names();
        for name in frame.column_names() {
            if !declared.contains(&name.as_str()) {
                failures.push(format!("column '{}' not in schema", name));
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::Failures(failures))
    }
}

fn check_column(name: &str, column: &Column, array: &ArrayRef, failures: &mut Vec<String>) {
    if let Some(expected) = &column.data_type {
        if !expected.accepts(array.data_type()) {
            failures.push(format!(
                "expected column '{}' to have type {}, got {}",
                name,
                expected,
                DataType::describe_arrow(array.data_type())
            ));
            return;
        }
    }
    let nulls = array.logical_null_count();
    if !column.nullable && nulls > 0 {
        failures.push(format!(
            "non-nullable column '{}' contains {} null values",
            name, nulls
        ));
    }
    if column.unique {
        match has_duplicates(array) {
            Ok(true) => failures.push(format!("column '{}' contains duplicate values", name)),
            Ok(false) => {}
            Err(e) => failures.push(format!(
                "column '{}' uniqueness could not be checked: {}",
                name, e
            )),
        }
    }
}

pub(super) fn validate_series(
    schema: &SeriesSchema,
    series: &Series,
    options: &ValidateOptions,
) -> Result<(), SchemaError> {
    let sampled;
    let series = match options.row_positions(series.len()) {
        Some(rows) => {
            sampled = series
                .take_rows(&rows)
                .map_err(|e| SchemaError::Failures(vec![format!("sampling failed: {}", e)]))?;
            &sampled
        }
        None => series,
    };

    let mut failures = Vec::new();
    if let Some(expected) = &schema.name {
        if series.name() != Some(expected.as_str()) {
            failures.push(format!(
                "expected series name '{}', got {}",
                expected,
                series
                    .name()
                    .map(|n| format!("'{}'", n))
                    .unwrap_or_else(|| "None".to_string())
            ));
        }
    }

    let values = series.values();
    if let Some(expected) = &schema.data_type {
        if !expected.accepts(values.data_type()) {
            failures.push(format!(
                "expected series to have type {}, got {}",
                expected,
                DataType::describe_arrow(values.data_type())
            ));
        }
    }
    let nulls = values.logical_null_count();
    if !schema.nullable && nulls > 0 {
        failures.push(format!("non-nullable series contains {} null values", nulls));
    }
    if schema.unique {
        match has_duplicates(values) {
            Ok(true) => failures.push("series contains duplicate values".to_string()),
            Ok(false) => {}
            Err(e) => failures.push(format!("series uniqueness could not be checked: {}", e)),
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::Failures(failures))
    }
}

fn has_duplicates(array: &ArrayRef) -> Result<bool, ArrowError> {
    let converter = RowConverter::new(vec![SortField::new(array.data_type().clone())])?;
    let rows = converter.convert_columns(&[Arc::clone(array)])?;
    let mut seen = HashSet::with_capacity(rows.num_rows());
    for row in rows.iter() {
        if !seen.insert(row.as_ref().to_vec()) {
            return Ok(true);
        }
    }
    Ok(false)
}
