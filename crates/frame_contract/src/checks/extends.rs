use frame_contract_data::{Schema, Value};

use super::{BoundCheck, Check, SchemaCheck};
use crate::error::{ContractError, Result};
use crate::fingerprint::Fingerprint;
use crate::params::Call;

/// The tested frame extends the frame passed as `source`: it keeps the
/// source's index and every column except those named by the `modified`
/// schema, which may be added or changed and must conform to that schema.
#[derive(Debug, Clone)]
pub struct Extends {
    source: String,
    modified: Option<SchemaCheck>,
}

/// Build an [`Extends`] check. A `modified` schema must be a
/// `DataFrameSchema`.
pub fn extends(source: impl Into<String>, modified: Option<Schema>) -> Result<Extends> {
    let check = Extends::new(source);
    match modified {
        Some(schema) => check.modified(schema),
        None => Ok(check),
    }
}

impl Extends {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            modified: None,
        }
    }

    pub fn modified(mut self, schema: impl Into<Schema>) -> Result<Self> {
        let schema = schema.into();
        if schema.as_data_frame().is_none() {
            return Err(ContractError::InvalidCheckConfiguration(format!(
                "extends: modified must be a DataFrameSchema, got {}",
                schema.kind_name()
            )));
        }
        self.modified = Some(SchemaCheck::new(schema));
        Ok(self)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn modified_columns(&self, call: &Call<'_>) -> Result<Vec<String>> {
        let Some(check) = &self.modified else {
            return Ok(Vec::new());
        };
        let resolved = check.resolve(call)?;
        Ok(resolved
            .as_data_frame()
            .map(|schema| {
                schema
                    .column_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl Check for Extends {
    fn is_active(&self) -> bool {
        !self.source.is_empty()
    }

    fn parameters(&self) -> Vec<String> {
        let mut params = vec![self.source.clone()];
        if let Some(check) = &self.modified {
            params.extend(check.parameters());
        }
        params
    }

    fn bind(&self, call: &Call<'_>) -> Result<BoundCheck> {
        let source_value = call.get(&self.source)?;
        let modified_columns = self.modified_columns(call)?;
        let source_fp = Fingerprint::of(&source_value, &modified_columns);
        let check_modified = match &self.modified {
            Some(check) => Some(check.bind(call)?),
            None => None,
        };
        let prefix = format!("extends {}: ", self.source);
        let source = self.source.clone();

        Ok(Box::new(move |tested: &Value| {
            let mut errors: Vec<String> = check_modified
                .as_ref()
                .map(|check| check(tested))
                .unwrap_or_default()
                .into_iter()
                .map(|err| format!("{}{}", prefix, err))
                .collect();

            let tested_fp = Fingerprint::of(tested, &modified_columns);
            match (&tested_fp, &source_fp) {
                (Ok(tested_fp), Ok(source_fp)) => {
                    errors.extend(
                        tested_fp
                            .diff(source_fp)
                            .into_iter()
                            .map(|err| format!("{}{}", prefix, err)),
                    );
                }
                _ => {
                    if let Err(err) = &tested_fp {
                        errors.push(format!("{}<input> {}", prefix, err));
                    }
                    if let Err(err) = &source_fp {
                        errors.push(format!("{}{} {}", prefix, source, err));
                    }
                }
            }
            errors
        }))
    }
}
