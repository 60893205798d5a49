//! Checks relating the tested value to other arguments of the same call.

use arrow::array::{Array, ArrayRef};
use arrow::compute::cast;
use frame_contract_data::Value;

use super::{not_tabular, ArgNames, BoundCheck, Check};
use crate::error::Result;
use crate::params::Call;

/// The tested value's index equals the index of each named argument.
#[derive(Debug, Clone)]
pub struct SameIndexAs {
    names: Vec<String>,
}

pub fn same_index_as(names: impl Into<ArgNames>) -> SameIndexAs {
    SameIndexAs {
        names: names.into().into_vec(),
    }
}

/// Same values in the same order. Numeric indices of different widths or
/// kinds compare by value, and only when the values survive a cast both ways.
fn index_equal(a: &ArrayRef, b: &ArrayRef) -> bool {
    if a.len() != b.len() {
        return false;
    }
    if a.data_type() == b.data_type() {
        return a.to_data() == b.to_data();
    }
    if !(a.data_type().is_numeric() && b.data_type().is_numeric()) {
        return false;
    }
    match (cast(b, a.data_type()), cast(a, b.data_type())) {
        (Ok(b_as_a), Ok(a_as_b)) => {
            a.to_data() == b_as_a.to_data() && b.to_data() == a_as_b.to_data()
        }
        _ => false,
    }
}

impl Check for SameIndexAs {
    fn is_active(&self) -> bool {
        !self.names.is_empty()
    }

    fn parameters(&self) -> Vec<String> {
        self.names.clone()
    }

    fn bind(&self, call: &Call<'_>) -> Result<BoundCheck> {
        // Indices are captured now, before the function can touch them.
        let mut indices = Vec::with_capacity(self.names.len());
        for name in &self.names {
            let value = call.get(name)?;
            let index = value.index().ok_or_else(|| not_tabular(name, &value));
            indices.push((name.clone(), index));
        }
        Ok(Box::new(move |tested: &Value| {
            let Some(own) = tested.index() else {
                return vec![not_tabular("<input>", tested)];
            };
            indices
                .iter()
                .filter_map(|(name, index)| match index {
                    Ok(index) if index_equal(&own, index) => None,
                    Ok(_) => Some(format!("Index not equal to index of {}.", name)),
                    Err(msg) => Some(msg.clone()),
                })
                .collect()
        }))
    }
}

/// The tested value's length equals the length of each named argument.
#[derive(Debug, Clone)]
pub struct SameLengthAs {
    names: Vec<String>,
}

pub fn same_length_as(names: impl Into<ArgNames>) -> SameLengthAs {
    SameLengthAs {
        names: names.into().into_vec(),
    }
}

impl Check for SameLengthAs {
    fn is_active(&self) -> bool {
        !self.names.is_empty()
    }

    fn parameters(&self) -> Vec<String> {
        self.names.clone()
    }

    fn bind(&self, call: &Call<'_>) -> Result<BoundCheck> {
        let mut lengths = Vec::with_capacity(self.names.len());
        for name in &self.names {
            let value = call.get(name)?;
            let len = value
                .len()
                .ok_or_else(|| format!("Length of {} undefined for {}.", name, value.kind()));
            lengths.push((name.clone(), len));
        }
        Ok(Box::new(move |tested: &Value| {
            let Some(own) = tested.len() else {
                return vec![format!("Length of <input> undefined for {}.", tested.kind())];
            };
            lengths
                .iter()
                .filter_map(|(name, len)| match len {
                    Ok(len) if *len == own => None,
                    Ok(len) => Some(format!("Length of {} = {} != {}.", name, len, own)),
                    Err(msg) => Some(msg.clone()),
                })
                .collect()
        }))
    }
}
