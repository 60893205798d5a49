//! Table-like values: 2-D [`Frame`], 1-D [`Series`] and the shared handle
//! that gives them object identity.

use arrow::array::{Array, ArrayRef, Int64Array, UInt32Array};
use arrow::compute::take;
use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{DataError, Result};

/// Reference-counted handle with interior mutability.
///
/// Cloning the handle aliases the same object, which is what identity checks
/// compare. Functions that modify a frame "in place" go through [`Shared::write`].
pub struct Shared<T> {
    inner: Arc<RwLock<T>>,
}

pub type FrameRef = Shared<Frame>;
pub type SeriesRef = Shared<Series>;

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// True when both handles point at the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> Shared<T> {
    /// Clone of the current content, detached from the handle.
    pub fn snapshot(&self) -> T {
        self.read().clone()
    }

    /// A distinct object with equal content.
    pub fn deep_copy(&self) -> Self {
        Self::new(self.snapshot())
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&*self.read()).finish()
    }
}

/// Default row index `0..len`.
pub fn range_index(len: usize) -> ArrayRef {
    Arc::new(Int64Array::from_iter_values(0..len as i64))
}

/// 2-D labeled table: a row index plus named, ordered columns.
#[derive(Debug, Clone)]
pub struct Frame {
    index: ArrayRef,
    batch: RecordBatch,
}

impl Frame {
    /// Wrap a record batch with a default range index.
    pub fn new(batch: RecordBatch) -> Self {
        let index = range_index(batch.num_rows());
        Self { index, batch }
    }

    /// A frame with `num_rows` rows and no columns.
    pub fn empty(num_rows: usize) -> Self {
        let schema = Arc::new(Schema::empty());
        let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
        // An empty column list with an explicit row count is always valid.
        let batch = RecordBatch::try_new_with_options(schema.clone(), vec![], &options)
            .unwrap_or_else(|_| RecordBatch::new_empty(schema));
        Self::new(batch)
    }

    /// Build a frame from named columns; all columns must have equal length.
    pub fn from_columns<N: Into<String>>(columns: Vec<(N, ArrayRef)>) -> Result<Self> {
        if columns.is_empty() {
            return Ok(Self::empty(0));
        }
        let (fields, arrays): (Vec<Field>, Vec<ArrayRef>) = columns
            .into_iter()
            .map(|(name, array)| (Field::new(name, array.data_type().clone(), true), array))
            .unzip();
        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(Self::new(batch))
    }

    /// Replace the row index.
    pub fn with_index(mut self, index: ArrayRef) -> Result<Self> {
        if index.len() != self.num_rows() {
            return Err(DataError::LengthMismatch {
                what: "index".to_string(),
                expected: self.num_rows(),
                got: index.len(),
            });
        }
        self.index = index;
        Ok(self)
    }

    /// Same columns with a fresh `0..n` index.
    pub fn reset_index(&self) -> Self {
        Self::new(self.batch.clone())
    }

    pub fn index(&self) -> &ArrayRef {
        &self.index
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect()
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.batch.schema().index_of(name).is_ok()
    }

    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        let idx = self.batch.schema().index_of(name).ok()?;
        Some(self.batch.column(idx))
    }

    /// Named columns in order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ArrayRef)> + '_ {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|field| field.name().as_str())
            .zip(self.batch.columns().iter())
    }

    /// Set a column in place: replaces an existing column of the same name,
    /// otherwise appends it.
    pub fn set_column(&mut self, name: &str, array: ArrayRef) -> Result<()> {
        if array.len() != self.num_rows() {
            return Err(DataError::LengthMismatch {
                what: format!("column '{}'", name),
                expected: self.num_rows(),
                got: array.len(),
            });
        }
        let schema = self.batch.schema();
        let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
        let mut arrays = self.batch.columns().to_vec();
        let field = Field::new(name, array.data_type().clone(), true);
        match schema.index_of(name) {
            Ok(idx) => {
                fields[idx] = field;
                arrays[idx] = array;
            }
            Err(_) => {
                fields.push(field);
                arrays.push(array);
            }
        }
        self.batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(())
    }

    /// Copy with one column set (see [`Frame::set_column`]).
    pub fn assign(&self, name: &str, array: ArrayRef) -> Result<Self> {
        let mut out = self.clone();
        out.set_column(name, array)?;
        Ok(out)
    }

    /// Copy without the named columns; unknown names are ignored.
    pub fn drop_columns(&self, names: &[&str]) -> Result<Self> {
        let keep: Vec<usize> = self
            .columns()
            .enumerate()
            .filter(|(_, (name, _))| !names.contains(name))
            .map(|(idx, _)| idx)
            .collect();
        let batch = self.batch.project(&keep)?;
        Ok(Self {
            index: Arc::clone(&self.index),
            batch,
        })
    }

    /// Rows at the given positions, index included.
    pub fn take_rows(&self, positions: &[usize]) -> Result<Self> {
        let indices = UInt32Array::from_iter_values(positions.iter().map(|&p| p as u32));
        let columns = self
            .batch
            .columns()
            .iter()
            .map(|column| take(column.as_ref(), &indices, None))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let options = RecordBatchOptions::new().with_row_count(Some(positions.len()));
        let batch = RecordBatch::try_new_with_options(self.batch.schema(), columns, &options)?;
        let index = take(self.index.as_ref(), &indices, None)?;
        Ok(Self { index, batch })
    }
}

/// 1-D labeled sequence.
#[derive(Debug, Clone)]
pub struct Series {
    name: Option<String>,
    index: ArrayRef,
    values: ArrayRef,
}

impl Series {
    pub fn new(values: ArrayRef) -> Self {
        Self {
            name: None,
            index: range_index(values.len()),
            values,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_index(mut self, index: ArrayRef) -> Result<Self> {
        if index.len() != self.values.len() {
            return Err(DataError::LengthMismatch {
                what: "index".to_string(),
                expected: self.values.len(),
                got: index.len(),
            });
        }
        self.index = index;
        Ok(self)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn index(&self) -> &ArrayRef {
        &self.index
    }

    pub fn values(&self) -> &ArrayRef {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values at the given positions, index included.
    pub fn take_rows(&self, positions: &[usize]) -> Result<Self> {
        let indices = UInt32Array::from_iter_values(positions.iter().map(|&p| p as u32));
        Ok(Self {
            name: self.name.clone(),
            index: take(self.index.as_ref(), &indices, None)?,
            values: take(self.values.as_ref(), &indices, None)?,
        })
    }
}
