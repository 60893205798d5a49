use frame_contract_data::{ColumnKey, Value};

use super::{BoundCheck, Check};
use crate::error::Result;
use crate::params::Call;

/// None of the listed columns remain in the tested frame. Columns may be
/// `from_arg` placeholders.
#[derive(Debug, Clone)]
pub struct Removed {
    columns: Vec<ColumnKey>,
}

pub fn removed<I, K>(columns: I) -> Removed
where
    I: IntoIterator<Item = K>,
    K: Into<ColumnKey>,
{
    let mut unique: Vec<ColumnKey> = Vec::new();
    for key in columns.into_iter().map(Into::into) {
        if !unique.contains(&key) {
            unique.push(key);
        }
    }
    Removed { columns: unique }
}

impl Removed {
    fn column_names(&self, call: &Call<'_>) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for key in &self.columns {
            match key {
                ColumnKey::Name(name) => names.push(name.clone()),
                ColumnKey::FromArg(param) => names.extend(call.column_names(param)?),
            }
        }
        Ok(names)
    }
}

impl Check for Removed {
    fn is_active(&self) -> bool {
        !self.columns.is_empty()
    }

    fn parameters(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter_map(|key| key.as_parameter().map(str::to_string))
            .collect()
    }

    fn bind(&self, call: &Call<'_>) -> Result<BoundCheck> {
        let names = self.column_names(call)?;
        Ok(Box::new(move |tested: &Value| match tested {
            Value::Frame(frame) => {
                let frame = frame.read();
                names
                    .iter()
                    .filter(|name| frame.contains_column(name))
                    .map(|name| format!("Column '{}' still exists in Frame", name))
                    .collect()
            }
            other => vec![format!("not a Frame, got {}.", other.kind())],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{from_arg, CallArgs, Signature};
    use arrow::array::{ArrayRef, Int64Array};
    use frame_contract_data::Frame;
    use std::sync::Arc;

    fn abc() -> Value {
        let col = || Arc::new(Int64Array::from(vec![0])) as ArrayRef;
        Value::from(Frame::from_columns(vec![("a", col()), ("b", col()), ("c", col())]).unwrap())
    }

    #[test]
    fn test_literal_and_placeholder_columns() {
        let sig = Signature::new("drop_cols").param("df").param("cols");
        let args = CallArgs::new().arg(abc()).kwarg("cols", Value::list(["a", "b"]));
        let call = Call::new(&sig, &args);

        let check = removed(vec![ColumnKey::from("c"), from_arg("cols").into()]);
        assert_eq!(check.parameters(), vec!["cols"]);
        let bound = check.bind(&call).unwrap();
        assert_eq!(
            bound(&abc()),
            vec![
                "Column 'c' still exists in Frame",
                "Column 'a' still exists in Frame",
                "Column 'b' still exists in Frame",
            ]
        );
        assert_eq!(bound(&Value::Int(0)), vec!["not a Frame, got Int."]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let check = removed(["x", "x"]);
        assert_eq!(check.columns.len(), 1);
        assert!(!removed(Vec::<ColumnKey>::new()).is_active());
    }
}
