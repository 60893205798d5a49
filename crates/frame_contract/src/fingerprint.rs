//! Content fingerprints of frames.
//!
//! A fingerprint records a BLAKE3 hash of the row index, the ordered column
//! names, and one hash per column. Comparing the fingerprint of a function's
//! input (taken before the call) with that of its output tells which parts
//! of the frame changed.

use arrow::array::{Array, ArrayData};
use arrow::datatypes::{DataType, UnionMode};
use arrow::util::bit_util;
use blake3::Hasher;
use frame_contract_data::{Frame, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub index: blake3::Hash,
    pub columns: Vec<String>,
    pub data: Vec<(String, blake3::Hash)>,
}

impl Fingerprint {
    /// Fingerprint of a frame value, skipping the `excluded` columns.
    ///
    /// Fails with a descriptive message when the value is not a frame.
    pub fn of(value: &Value, excluded: &[String]) -> Result<Fingerprint, String> {
        match value {
            Value::Frame(frame) => Ok(Self::of_frame(&frame.read(), excluded)),
            other => Err(format!("not a Frame, got {}.", other.kind())),
        }
    }

    pub fn of_frame(frame: &Frame, excluded: &[String]) -> Fingerprint {
        let mut columns = Vec::new();
        let mut data = Vec::new();
        for (name, array) in frame.columns() {
            if excluded.iter().any(|col| col == name) {
                continue;
            }
            columns.push(name.to_string());
            data.push((name.to_string(), hash_array(array.as_ref())));
        }
        Fingerprint {
            index: hash_array(frame.index().as_ref()),
            columns,
            data,
        }
    }

    /// Differences between `self` (the tested frame) and `source`.
    ///
    /// Columns are compared by position: a column is reported as changed only
    /// when both fingerprints carry the same name at the same position.
    pub fn diff(&self, source: &Fingerprint) -> Vec<String> {
        if self == source {
            return Vec::new();
        }
        let mut errors = Vec::new();
        if self.index != source.index {
            errors.push("index differ".to_string());
        }
        if self.columns != source.columns {
            errors.push(format!(
                "Columns differ: {} != {}",
                format_columns(&self.columns),
                format_columns(&source.columns)
            ));
        }
        for ((col, hash), (other_col, other_hash)) in self.data.iter().zip(source.data.iter()) {
            if col == other_col && hash != other_hash {
                errors.push(format!("Column '{}' was changed.", col));
            }
        }
        errors
    }
}

/// `['a', 'b']`
pub fn format_columns(columns: &[String]) -> String {
    let quoted: Vec<String> = columns.iter().map(|col| format!("'{}'", col)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Hash of an array's content: the validity and value bytes of every row.
///
/// Rows are read through the array's own layout, so a slice hashes equal to
/// a copy of the same rows, a null slot hashes the same whatever bytes sit
/// behind it, and encoded columns (dictionary, run-end) hash like their
/// decoded values. The data type is not part of the hash.
pub fn hash_array(array: &dyn Array) -> blake3::Hash {
    let data = array.to_data();
    let mut hasher = Hasher::new();
    hash_range(&data, 0, data.len(), &mut hasher);
    hasher.finalize()
}

fn hash_range(data: &ArrayData, start: usize, len: usize, hasher: &mut Hasher) {
    hasher.update(&(len as u64).to_le_bytes());
    for row in start..start + len {
        hash_row(data, row, hasher);
    }
}

/// `row` counts from the logical start of `data`.
fn hash_row(data: &ArrayData, row: usize, hasher: &mut Hasher) {
    if *data.data_type() == DataType::Null || data.is_null(row) {
        hasher.update(&[0]);
        return;
    }
    hasher.update(&[1]);

    let pos = data.offset() + row;
    match data.data_type() {
        DataType::Boolean => {
            let bits = data.buffers()[0].as_slice();
            hasher.update(&[bit_util::get_bit(bits, pos) as u8]);
        }
        DataType::Utf8 | DataType::Binary => {
            let offsets = data.buffer::<i32>(0);
            let (start, end) = (offsets[row] as usize, offsets[row + 1] as usize);
            hash_bytes(&data.buffers()[1].as_slice()[start..end], hasher);
        }
        DataType::LargeUtf8 | DataType::LargeBinary => {
            let offsets = data.buffer::<i64>(0);
            let (start, end) = (offsets[row] as usize, offsets[row + 1] as usize);
            hash_bytes(&data.buffers()[1].as_slice()[start..end], hasher);
        }
        DataType::Utf8View | DataType::BinaryView => hash_view(data, pos, hasher),
        DataType::FixedSizeBinary(width) => {
            let width = *width as usize;
            hash_bytes(&data.buffers()[0].as_slice()[pos * width..(pos + 1) * width], hasher);
        }
        DataType::List(_) | DataType::Map(_, _) => {
            let offsets = data.buffer::<i32>(0);
            let (start, end) = (offsets[row] as usize, offsets[row + 1] as usize);
            hash_range(&data.child_data()[0], start, end - start, hasher);
        }
        DataType::LargeList(_) => {
            let offsets = data.buffer::<i64>(0);
            let (start, end) = (offsets[row] as usize, offsets[row + 1] as usize);
            hash_range(&data.child_data()[0], start, end - start, hasher);
        }
        DataType::ListView(_) => {
            let start = data.buffer::<i32>(0)[row] as usize;
            let size = data.buffer::<i32>(1)[row] as usize;
            hash_range(&data.child_data()[0], start, size, hasher);
        }
        DataType::LargeListView(_) => {
            let start = data.buffer::<i64>(0)[row] as usize;
            let size = data.buffer::<i64>(1)[row] as usize;
            hash_range(&data.child_data()[0], start, size, hasher);
        }
        DataType::FixedSizeList(_, size) => {
            let size = *size as usize;
            hash_range(&data.child_data()[0], pos * size, size, hasher);
        }
        // Struct children are sliced along with their parent.
        DataType::Struct(_) => {
            for child in data.child_data() {
                hash_row(child, row, hasher);
            }
        }
        DataType::Union(fields, mode) => {
            let type_id = data.buffer::<i8>(0)[row];
            let Some(child) = fields.iter().position(|(id, _)| id == type_id) else {
                return;
            };
            let child_row = match mode {
                UnionMode::Sparse => pos,
                UnionMode::Dense => data.buffer::<i32>(1)[row] as usize,
            };
            hasher.update(&[type_id as u8]);
            hash_row(&data.child_data()[child], child_row, hasher);
        }
        DataType::Dictionary(key_type, _) => {
            if let Some(key) = dictionary_key(data, key_type, row) {
                hash_row(&data.child_data()[0], key, hasher);
            }
        }
        DataType::RunEndEncoded(_, _) => {
            let run_ends = &data.child_data()[0];
            let values = &data.child_data()[1];
            let physical = match run_ends.data_type() {
                DataType::Int16 => run_index(&run_ends.buffer::<i16>(0)[..run_ends.len()], pos),
                DataType::Int32 => run_index(&run_ends.buffer::<i32>(0)[..run_ends.len()], pos),
                DataType::Int64 => run_index(&run_ends.buffer::<i64>(0)[..run_ends.len()], pos),
                _ => return,
            };
            if physical < values.len() {
                hash_row(values, physical, hasher);
            }
        }
        other => {
            if let Some(width) = other.primitive_width() {
                hash_bytes(&data.buffers()[0].as_slice()[pos * width..(pos + 1) * width], hasher);
            }
        }
    }
}

fn hash_bytes(bytes: &[u8], hasher: &mut Hasher) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Views are 16 bytes: length, then either the inlined value (up to 12
/// bytes) or prefix, buffer index and offset into a data buffer.
fn hash_view(data: &ArrayData, pos: usize, hasher: &mut Hasher) {
    let mut raw = [0u8; 16];
    raw.copy_from_slice(&data.buffers()[0].as_slice()[pos * 16..(pos + 1) * 16]);
    let view = u128::from_le_bytes(raw);
    let len = view as u32 as usize;
    if len <= 12 {
        hash_bytes(&raw[4..4 + len], hasher);
    } else {
        let buffer = (view >> 64) as u32 as usize;
        let offset = (view >> 96) as u32 as usize;
        hash_bytes(&data.buffers()[1 + buffer].as_slice()[offset..offset + len], hasher);
    }
}

fn dictionary_key(data: &ArrayData, key_type: &DataType, row: usize) -> Option<usize> {
    let key = match key_type {
        DataType::Int8 => data.buffer::<i8>(0)[row] as i64,
        DataType::Int16 => data.buffer::<i16>(0)[row] as i64,
        DataType::Int32 => data.buffer::<i32>(0)[row] as i64,
        DataType::Int64 => data.buffer::<i64>(0)[row],
        DataType::UInt8 => data.buffer::<u8>(0)[row] as i64,
        DataType::UInt16 => data.buffer::<u16>(0)[row] as i64,
        DataType::UInt32 => data.buffer::<u32>(0)[row] as i64,
        DataType::UInt64 => i64::try_from(data.buffer::<u64>(0)[row]).ok()?,
        _ => return None,
    };
    usize::try_from(key).ok()
}

/// Physical index of the run covering logical position `pos`.
fn run_index<T: Copy + Into<i64>>(run_ends: &[T], pos: usize) -> usize {
    run_ends.partition_point(|end| (*end).into() <= pos as i64)
}
