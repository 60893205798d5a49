//! Check protocol and the built-in checks.
//!
//! A [`Check`] is declared once, when a contract is built, and bound to each
//! call with [`Check::bind`]. Binding captures whatever the check needs from
//! the call's other arguments (indices, lengths, fingerprints, identities)
//! before the function runs; the returned [`BoundCheck`] then inspects the
//! value under test and returns one message per violation.

mod extends;
mod identity;
mod relation;
mod removed;
mod schema;

use frame_contract_data::{DataFrameSchema, Schema, SeriesSchema, Value};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::params::Call;

pub use extends::{extends, Extends};
pub use identity::{is_, is_not, Is, IsNot};
pub use relation::{same_index_as, same_length_as, SameIndexAs, SameLengthAs};
pub use removed::{removed, Removed};
pub use schema::{schema, SchemaCheck};

/// Check bound to one call. Returns violation messages for the tested value.
pub type BoundCheck = Box<dyn Fn(&Value) -> Vec<String>>;

pub trait Check: fmt::Debug + Send + Sync {
    /// Inactive checks are dropped when a contract is applied.
    fn is_active(&self) -> bool {
        true
    }

    /// Parameter names the check reads from the call.
    fn parameters(&self) -> Vec<String>;

    fn bind(&self, call: &Call<'_>) -> Result<BoundCheck>;
}

/// Argument names given as a comma-separated string or a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgNames(Vec<String>);

impl ArgNames {
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Split on commas, trim, drop empty entries.
pub fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

impl From<&str> for ArgNames {
    fn from(raw: &str) -> Self {
        ArgNames(split_names(raw))
    }
}

impl From<String> for ArgNames {
    fn from(raw: String) -> Self {
        ArgNames::from(raw.as_str())
    }
}

impl From<Vec<String>> for ArgNames {
    fn from(names: Vec<String>) -> Self {
        ArgNames(names)
    }
}

impl From<Vec<&str>> for ArgNames {
    fn from(names: Vec<&str>) -> Self {
        ArgNames(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ArgNames {
    fn from(names: &[&str]) -> Self {
        ArgNames(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ArgNames {
    fn from(names: [&str; N]) -> Self {
        ArgNames(names.iter().map(|name| name.to_string()).collect())
    }
}

/// A check as handed to a contract builder. Schemas stay unwrapped until the
/// contract is applied so they pick up the builder's validation options.
#[derive(Debug, Clone)]
pub enum CheckSpec {
    Check(Arc<dyn Check>),
    Schema(Schema),
}

impl CheckSpec {
    /// Parameters the contract must find on the function. Inactive checks
    /// never run, so they require nothing.
    pub fn parameters(&self) -> Vec<String> {
        match self {
            CheckSpec::Check(check) if !check.is_active() => Vec::new(),
            CheckSpec::Check(check) => check.parameters(),
            CheckSpec::Schema(schema) => schema
                .placeholders()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

pub trait IntoCheck {
    fn into_check(self) -> CheckSpec;
}

impl<C: Check + 'static> IntoCheck for C {
    fn into_check(self) -> CheckSpec {
        CheckSpec::Check(Arc::new(self))
    }
}

impl IntoCheck for Schema {
    fn into_check(self) -> CheckSpec {
        CheckSpec::Schema(self)
    }
}

impl IntoCheck for DataFrameSchema {
    fn into_check(self) -> CheckSpec {
        CheckSpec::Schema(Schema::DataFrame(self))
    }
}

impl IntoCheck for SeriesSchema {
    fn into_check(self) -> CheckSpec {
        CheckSpec::Schema(Schema::Series(self))
    }
}

impl IntoCheck for CheckSpec {
    fn into_check(self) -> CheckSpec {
        self
    }
}

/// Message for a value that is neither a frame nor a series.
pub(crate) fn not_tabular(label: &str, value: &Value) -> String {
    format!("{} not a Frame or Series, got {}.", label, value.kind())
}
