use frame_contract_data::{Schema, ValidateOptions, Value};

use super::{BoundCheck, Check};
use crate::error::Result;
use crate::params::Call;

/// Validate the tested value against a schema.
#[derive(Debug, Clone)]
pub struct SchemaCheck {
    schema: Schema,
    options: ValidateOptions,
}

pub fn schema(schema: impl Into<Schema>) -> SchemaCheck {
    SchemaCheck::new(schema)
}

impl SchemaCheck {
    pub fn new(schema: impl Into<Schema>) -> Self {
        Self {
            schema: schema.into(),
            options: ValidateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ValidateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &ValidateOptions {
        &self.options
    }

    /// The schema with `from_arg` placeholders replaced by the column names
    /// held by the referenced arguments.
    pub fn resolve(&self, call: &Call<'_>) -> Result<Schema> {
        self.schema.resolve_columns(|param| call.column_names(param))
    }
}

impl Check for SchemaCheck {
    fn parameters(&self) -> Vec<String> {
        self.schema
            .placeholders()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn bind(&self, call: &Call<'_>) -> Result<BoundCheck> {
        let schema = self.resolve(call)?;
        let options = self.options;
        Ok(Box::new(move |value: &Value| match schema.validate(value, &options) {
            Ok(()) => Vec::new(),
            Err(err) => err.messages(),
        }))
    }
}
