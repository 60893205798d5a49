//! Object identity checks, for telling in-place updates from copies.

use frame_contract_data::Value;

use super::{ArgNames, BoundCheck, Check};
use crate::error::Result;
use crate::params::Call;

/// The tested value is the very object passed as `name`.
#[derive(Debug, Clone)]
pub struct Is {
    name: String,
}

pub fn is_(name: impl Into<String>) -> Is {
    Is {
        name: name.into().trim().to_string(),
    }
}

impl Check for Is {
    fn is_active(&self) -> bool {
        !self.name.is_empty()
    }

    fn parameters(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn bind(&self, call: &Call<'_>) -> Result<BoundCheck> {
        let other = call.get(&self.name)?;
        let name = self.name.clone();
        Ok(Box::new(move |tested: &Value| {
            if tested.same_object(&other) {
                Vec::new()
            } else {
                vec![format!("is not {}", name)]
            }
        }))
    }
}

/// The tested value is none of the objects passed as `names`.
#[derive(Debug, Clone)]
pub struct IsNot {
    names: Vec<String>,
}

pub fn is_not(names: impl Into<ArgNames>) -> IsNot {
    IsNot {
        names: names.into().into_vec(),
    }
}

impl Check for IsNot {
    fn is_active(&self) -> bool {
        !self.names.is_empty()
    }

    fn parameters(&self) -> Vec<String> {
        self.names.clone()
    }

    fn bind(&self, call: &Call<'_>) -> Result<BoundCheck> {
        let others = self
            .names
            .iter()
            .map(|name| Ok((name.clone(), call.get(name)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Box::new(move |tested: &Value| {
            others
                .iter()
                .filter(|(_, other)| tested.same_object(other))
                .map(|(name, _)| format!("is {}", name))
                .collect()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{CallArgs, Signature};
    use frame_contract_data::Frame;

    #[test]
    fn test_identity_not_equality() {
        let df = Value::from(Frame::empty(1));
        let df2 = Value::from(Frame::empty(1));
        let sig = Signature::new("f").param("df").param("df2");
        let args = CallArgs::new().arg(df.clone()).arg(df2.clone());
        let call = Call::new(&sig, &args);

        let is_df = is_("df").bind(&call).unwrap();
        assert!(is_df(&df).is_empty());
        let copy = Value::Frame(df.as_frame().unwrap().deep_copy());
        assert_eq!(is_df(&copy), vec!["is not df"]);

        let is_not_both = is_not("df, df2").bind(&call).unwrap();
        assert_eq!(is_not_both(&df2), vec!["is df2"]);
        assert!(is_not_both(&copy).is_empty());
    }

    #[test]
    fn test_empty_is_inactive() {
        assert!(!is_("").is_active());
        assert!(!is_not(Vec::<String>::new()).is_active());
    }
}
