//! Contract builders that wrap a [`ContractFn`].
//!
//! ```ignore
//! let f = argument("df").check(same_index_as("df2")).apply(f)?;
//! let f = result().check(schema).check(is_not("df")).apply(f)?;
//! ```
//!
//! Applying a contract validates its parameter references against the
//! function signature once. Each call then reads the current mode: `Skip`
//! and `Silent` call straight through, every other mode evaluates the
//! checks and hands the violations to [`Mode::handle`].

use frame_contract_data::{ItemKey, ValidateOptions, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::checks::{BoundCheck, Check, CheckSpec, IntoCheck, SchemaCheck};
use crate::error::{ContractError, Result};
use crate::mode::{get_mode, Mode};
use crate::params::{Call, ContractFn};

type Selector = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// Which part of the argument or result is checked.
#[derive(Clone, Default)]
pub enum Key {
    /// The value itself.
    #[default]
    Whole,
    /// `value[key]` for lists, tuples and maps.
    Item(ItemKey),
    /// An arbitrary projection.
    Select(Selector),
}

impl Key {
    pub fn position(pos: i64) -> Self {
        Key::Item(ItemKey::Int(pos))
    }

    pub fn name(name: impl Into<String>) -> Self {
        Key::Item(ItemKey::Str(name.into()))
    }

    pub fn select<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Key::Select(Arc::new(f))
    }

    fn apply(&self, value: Value, context: &str) -> Result<Value> {
        match self {
            Key::Whole => Ok(value),
            Key::Item(key) => value.get_item(key).ok_or_else(|| ContractError::KeyNotFound {
                context: context.to_string(),
                key: key.to_string(),
            }),
            Key::Select(select) => select(&value),
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Whole => write!(f, "Whole"),
            Key::Item(key) => f.debug_tuple("Item").field(key).finish(),
            Key::Select(_) => write!(f, "Select(..)"),
        }
    }
}

impl From<ItemKey> for Key {
    fn from(key: ItemKey) -> Self {
        Key::Item(key)
    }
}

/// Shared builder state for both contract kinds.
#[derive(Debug, Clone, Default)]
struct Contract {
    checks: Vec<CheckSpec>,
    key: Key,
    options: ValidateOptions,
}

impl Contract {
    /// Active checks; bare schemas pick up the validation options.
    fn active_checks(&self) -> Vec<Arc<dyn Check>> {
        self.checks
            .iter()
            .map(|spec| match spec {
                CheckSpec::Check(check) => Arc::clone(check),
                CheckSpec::Schema(schema) => {
                    Arc::new(SchemaCheck::new(schema.clone()).with_options(self.options))
                        as Arc<dyn Check>
                }
            })
            .filter(|check| check.is_active())
            .collect()
    }

    fn validate_signature(&self, f: &ContractFn, decorator: &str, own: &[String]) -> Result<()> {
        let signature = f.signature();
        let missing: Vec<String> = own
            .iter()
            .cloned()
            .chain(self.checks.iter().flat_map(CheckSpec::parameters))
            .filter(|param| !signature.has_parameter(param))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(ContractError::MissingParameters {
            function: signature.qualname().to_string(),
            decorator: decorator.to_string(),
            parameters: missing,
        })
    }
}

fn bind_all(checks: &[Arc<dyn Check>], call: &Call<'_>) -> Result<Vec<BoundCheck>> {
    checks.iter().map(|check| check.bind(call)).collect()
}

fn run_all(bound: &[BoundCheck], value: &Value) -> Vec<String> {
    bound.iter().flat_map(|check| check(value)).collect()
}

/// Contract on one argument of a function.
#[derive(Debug, Clone)]
pub struct ArgumentContract {
    name: String,
    contract: Contract,
}

/// Start a contract on argument `name`.
pub fn argument(name: impl Into<String>) -> ArgumentContract {
    ArgumentContract {
        name: name.into(),
        contract: Contract::default(),
    }
}

impl ArgumentContract {
    pub fn check(mut self, check: impl IntoCheck) -> Self {
        self.contract.checks.push(check.into_check());
        self
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.contract.key = key.into();
        self
    }

    /// Sampling options for schemas passed directly to [`Self::check`].
    pub fn validate(mut self, options: ValidateOptions) -> Self {
        self.contract.options = options;
        self
    }

    /// Wrap `f`. Fails if `f` lacks any parameter the contract refers to.
    /// Under [`Mode::Skip`] `f` is returned as is.
    pub fn apply(self, f: ContractFn) -> Result<ContractFn> {
        let decorator = format!("@argument('{}')", self.name);
        if get_mode() == Mode::Skip {
            debug!(function = f.qualname(), decorator = %decorator, "contract skipped");
            return Ok(f);
        }
        self.contract
            .validate_signature(&f, &decorator, std::slice::from_ref(&self.name))?;

        let checks = self.contract.active_checks();
        debug!(
            function = f.qualname(),
            decorator = %decorator,
            checks = checks.len(),
            "contract applied"
        );

        let prefix = format!("{}: Argument {}: ", f.qualname(), self.name);
        let context = format!("{}: Argument {}", f.qualname(), self.name);
        let name = self.name;
        let key = self.contract.key;
        let inner = f.clone();
        Ok(ContractFn::with_signature(f.signature_arc(), move |call| {
            let mode = get_mode();
            if mode.no_handling() {
                return inner.call(call.args());
            }
            let bound = bind_all(&checks, call)?;
            let value = key.apply(call.get(&name)?, &context)?;
            mode.handle(&run_all(&bound, &value), &prefix)?;
            inner.call(call.args())
        }))
    }
}

/// Contract on the return value of a function.
#[derive(Debug, Clone, Default)]
pub struct ResultContract {
    contract: Contract,
}

/// Start a contract on the return value.
pub fn result() -> ResultContract {
    ResultContract::default()
}

impl ResultContract {
    pub fn check(mut self, check: impl IntoCheck) -> Self {
        self.contract.checks.push(check.into_check());
        self
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.contract.key = key.into();
        self
    }

    /// Sampling options for schemas passed directly to [`Self::check`].
    pub fn validate(mut self, options: ValidateOptions) -> Self {
        self.contract.options = options;
        self
    }

    /// Wrap `f`. Checks are bound before `f` runs, so they see the other
    /// arguments as they were on entry.
    pub fn apply(self, f: ContractFn) -> Result<ContractFn> {
        let decorator = "@result";
        if get_mode() == Mode::Skip {
            debug!(function = f.qualname(), decorator, "contract skipped");
            return Ok(f);
        }
        self.contract.validate_signature(&f, decorator, &[])?;

        let checks = self.contract.active_checks();
        debug!(
            function = f.qualname(),
            decorator,
            checks = checks.len(),
            "contract applied"
        );

        let prefix = format!("{}: Output: ", f.qualname());
        let context = format!("{}: Output", f.qualname());
        let key = self.contract.key;
        let inner = f.clone();
        Ok(ContractFn::with_signature(f.signature_arc(), move |call| {
            let mode = get_mode();
            if mode.no_handling() {
                return inner.call(call.args());
            }
            let bound = bind_all(&checks, call)?;
            let output = inner.call(call.args())?;
            let value = key.apply(output.clone(), &context)?;
            mode.handle(&run_all(&bound, &value), &prefix)?;
            Ok(output)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{extends, is_, same_length_as};
    use crate::mode::scoped_mode;
    use crate::params::{CallArgs, Signature};
    use frame_contract_data::Frame;

    fn identity() -> ContractFn {
        ContractFn::new(Signature::new("ident").param("df").param("other"), |call| {
            call.get("df")
        })
    }

    #[test]
    fn test_key_apply() {
        let pair = Value::tuple([Value::from("res"), Value::Int(3)]);
        assert_eq!(Key::position(1).apply(pair.clone(), "ctx").unwrap().as_int(), Some(3));
        let err = Key::position(5).apply(pair.clone(), "f: Output").unwrap_err();
        assert_eq!(err.to_string(), "f: Output: key 5 not found");
        let len = Key::select(|v: &Value| Ok(Value::Int(v.len().unwrap_or(0) as i64)));
        assert_eq!(len.apply(pair, "ctx").unwrap().as_int(), Some(2));
    }

    #[test]
    fn test_skip_returns_function_unchanged() {
        let _guard = scoped_mode(Mode::Skip).unwrap();
        let f = identity();
        let wrapped = argument("missing").apply(f.clone()).unwrap();
        assert!(wrapped.ptr_eq(&f));
    }

    #[test]
    fn test_missing_parameters_reported_together() {
        let _guard = scoped_mode(Mode::Raise).unwrap();
        let err = argument("x")
            .check(same_length_as("y, other"))
            .apply(identity())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "ident @argument('x') requires argument 'x' in function signature.\n\
             ident @argument('x') requires argument 'y' in function signature."
        );
    }

    #[test]
    fn test_inactive_checks_do_not_block_apply() {
        let _guard = scoped_mode(Mode::Raise).unwrap();
        let f = result()
            .check(is_(""))
            .check(extends("", None).unwrap())
            .apply(identity())
            .unwrap();
        let args = CallArgs::new().arg(Frame::empty(1)).arg(Frame::empty(1));
        assert!(f.call(&args).is_ok());
    }

    #[test]
    fn test_argument_checks_run_before_call() {
        let _guard = scoped_mode(Mode::Raise).unwrap();
        let f = argument("df")
            .check(same_length_as("other"))
            .apply(identity())
            .unwrap();
        let args = CallArgs::new()
            .arg(Frame::empty(1))
            .arg(Frame::empty(2));
        let err = f.call(&args).unwrap_err();
        assert_eq!(err.to_string(), "ident: Argument df: Length of other = 2 != 1.");
    }
}
