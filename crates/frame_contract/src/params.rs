//! Function signatures, call arguments and parameter resolution.
//!
//! A [`ContractFn`] is a function body plus the [`Signature`] metadata that
//! lets checks find arguments by name. Wrapping a function with a contract
//! keeps the innermost signature, so stacked contracts resolve names the
//! same way.

use frame_contract_data::{ColumnKey, FrameRef, SeriesRef, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ContractError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// May be passed by position or by keyword.
    Positional,
    KeywordOnly,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub default: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct Signature {
    qualname: String,
    params: Vec<Param>,
}

impl Signature {
    pub fn new(qualname: impl Into<String>) -> Self {
        Self {
            qualname: qualname.into(),
            params: Vec::new(),
        }
    }

    fn push(mut self, name: impl Into<String>, kind: ParamKind, default: Option<Value>) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind,
            default,
        });
        self
    }

    pub fn param(self, name: impl Into<String>) -> Self {
        self.push(name, ParamKind::Positional, None)
    }

    pub fn param_default(self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.push(name, ParamKind::Positional, Some(default.into()))
    }

    pub fn kwonly(self, name: impl Into<String>) -> Self {
        self.push(name, ParamKind::KeywordOnly, None)
    }

    pub fn kwonly_default(self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.push(name, ParamKind::KeywordOnly, Some(default.into()))
    }

    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.params.iter().any(|param| param.name == name)
    }

    fn positional(&self) -> impl Iterator<Item = &Param> {
        self.params
            .iter()
            .filter(|param| param.kind == ParamKind::Positional)
    }

    /// Value bound to parameter `name` in a call.
    ///
    /// Lookup order: keyword argument, positional argument, positional
    /// default, keyword-only default.
    pub fn resolve(&self, name: &str, args: &CallArgs) -> Result<Value> {
        if let Some(value) = args.keyword.get(name) {
            return Ok(value.clone());
        }
        if let Some(value) = self
            .positional()
            .zip(args.positional.iter())
            .find(|(param, _)| param.name == name)
            .map(|(_, value)| value)
        {
            return Ok(value.clone());
        }
        let default = |kind: ParamKind| {
            self.params
                .iter()
                .filter(|param| param.kind == kind && param.name == name)
                .find_map(|param| param.default.clone())
        };
        default(ParamKind::Positional)
            .or_else(|| default(ParamKind::KeywordOnly))
            .ok_or_else(|| ContractError::MissingArgument {
                function: self.qualname.clone(),
                argument: name.to_string(),
            })
    }
}

/// Arguments of one call.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keyword: HashMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }
}

/// A call in progress: the signature of the called function plus its
/// arguments.
#[derive(Clone, Copy)]
pub struct Call<'a> {
    signature: &'a Signature,
    args: &'a CallArgs,
}

impl<'a> Call<'a> {
    pub fn new(signature: &'a Signature, args: &'a CallArgs) -> Self {
        Self { signature, args }
    }

    pub fn signature(&self) -> &'a Signature {
        self.signature
    }

    pub fn args(&self) -> &'a CallArgs {
        self.args
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        self.signature.resolve(name, self.args)
    }

    pub fn frame(&self, name: &str) -> Result<FrameRef> {
        match self.get(name)? {
            Value::Frame(frame) => Ok(frame),
            other => Err(self.unexpected(name, "Frame", &other)),
        }
    }

    pub fn series(&self, name: &str) -> Result<SeriesRef> {
        match self.get(name)? {
            Value::Series(series) => Ok(series),
            other => Err(self.unexpected(name, "Series", &other)),
        }
    }

    pub fn str(&self, name: &str) -> Result<String> {
        match self.get(name)? {
            Value::Str(s) => Ok(s),
            other => Err(self.unexpected(name, "Str", &other)),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        match self.get(name)? {
            Value::Int(i) => Ok(i),
            other => Err(self.unexpected(name, "Int", &other)),
        }
    }

    /// Column names held by argument `name`: one for a string or integer,
    /// one per item for a list or tuple.
    pub fn column_names(&self, name: &str) -> Result<Vec<String>> {
        let value = self.get(name)?;
        let invalid = |kind: &'static str| ContractError::InvalidColumnPlaceholder {
            parameter: name.to_string(),
            kind,
        };
        match &value {
            Value::List(items) | Value::Tuple(items) => items
                .iter()
                .map(|item| scalar_column_name(item).ok_or_else(|| invalid(item.kind())))
                .collect(),
            other => scalar_column_name(other)
                .map(|col| vec![col])
                .ok_or_else(|| invalid(other.kind())),
        }
    }

    fn unexpected(&self, name: &str, expected: &'static str, got: &Value) -> ContractError {
        ContractError::UnexpectedType {
            name: name.to_string(),
            expected,
            got: got.kind(),
        }
    }
}

fn scalar_column_name(value: &Value) -> Option<String> {
    match value {
        Value::Str(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        _ => None,
    }
}

type Body = dyn Fn(&Call<'_>) -> Result<Value> + Send + Sync;

/// A callable with signature metadata.
#[derive(Clone)]
pub struct ContractFn {
    signature: Arc<Signature>,
    body: Arc<Body>,
}

impl ContractFn {
    pub fn new<F>(signature: Signature, body: F) -> Self
    where
        F: Fn(&Call<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        Self::with_signature(Arc::new(signature), body)
    }

    pub(crate) fn with_signature<F>(signature: Arc<Signature>, body: F) -> Self
    where
        F: Fn(&Call<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            signature,
            body: Arc::new(body),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn signature_arc(&self) -> Arc<Signature> {
        Arc::clone(&self.signature)
    }

    pub fn qualname(&self) -> &str {
        self.signature.qualname()
    }

    pub fn call(&self, args: &CallArgs) -> Result<Value> {
        (self.body)(&Call::new(&self.signature, args))
    }

    /// True when both handles run the same body (no wrapper in between).
    pub fn ptr_eq(&self, other: &ContractFn) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for ContractFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractFn")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Deferred reference to a call argument, usable wherever a column name is
/// expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FromArg {
    name: String,
}

/// Refer to the value of parameter `name` at call time.
pub fn from_arg(name: impl Into<String>) -> FromArg {
    FromArg { name: name.into() }
}

/// Alias of [`from_arg`].
pub fn from_parameter(name: impl Into<String>) -> FromArg {
    from_arg(name)
}

impl FromArg {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolve(&self, call: &Call<'_>) -> Result<Value> {
        call.get(&self.name)
    }

    pub fn column_names(&self, call: &Call<'_>) -> Result<Vec<String>> {
        call.column_names(&self.name)
    }
}

impl From<FromArg> for ColumnKey {
    fn from(arg: FromArg) -> Self {
        ColumnKey::FromArg(arg.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig() -> Signature {
        Signature::new("fn")
            .param("a")
            .param_default("b", 2i64)
            .kwonly_default("c", "x")
            .kwonly("d")
    }

    #[test]
    fn test_resolve_order() {
        let sig = sig();
        let args = CallArgs::new().arg(1i64);
        assert_eq!(sig.resolve("a", &args).unwrap().as_int(), Some(1));
        assert_eq!(sig.resolve("b", &args).unwrap().as_int(), Some(2));
        assert_eq!(sig.resolve("c", &args).unwrap().as_str(), Some("x"));

        let args = CallArgs::new().arg(1i64).arg(5i64);
        assert_eq!(sig.resolve("b", &args).unwrap().as_int(), Some(5));

        let args = CallArgs::new().arg(1i64).arg(5i64).kwarg("b", 9i64);
        assert_eq!(sig.resolve("b", &args).unwrap().as_int(), Some(9));
    }

    #[test]
    fn test_missing_argument() {
        let err = sig().resolve("d", &CallArgs::new()).unwrap_err();
        assert_eq!(err.to_string(), "fn requires argument 'd' for frame_contract");
        assert!(sig().resolve("zzz", &CallArgs::new()).is_err());
    }

    #[test]
    fn test_has_parameter() {
        let sig = sig();
        assert!(sig.has_parameter("a"));
        assert!(sig.has_parameter("d"));
        assert!(!sig.has_parameter("e"));
    }

    #[test]
    fn test_column_names() {
        let sig = Signature::new("f").param("col").param("cols").param("bad");
        let args = CallArgs::new()
            .arg("x")
            .arg(Value::list(["y", "z"]))
            .arg(1.5f64);
        let call = Call::new(&sig, &args);
        assert_eq!(from_arg("col").column_names(&call).unwrap(), vec!["x"]);
        assert_eq!(from_arg("cols").column_names(&call).unwrap(), vec!["y", "z"]);
        let err = from_arg("bad").column_names(&call).unwrap_err();
        assert!(matches!(err, ContractError::InvalidColumnPlaceholder { kind: "Float", .. }));
    }

    #[test]
    fn test_call_typed_accessors() {
        let sig = Signature::new("f").param("n");
        let args = CallArgs::new().arg(3i64);
        let call = Call::new(&sig, &args);
        assert_eq!(call.int("n").unwrap(), 3);
        let err = call.frame("n").unwrap_err();
        assert_eq!(err.to_string(), "Expected Frame for 'n', got Int");
    }

    #[test]
    fn test_contract_fn_call() {
        let f = ContractFn::new(sig(), |call| Ok(Value::Int(call.int("a")? + call.int("b")?)));
        let out = f.call(&CallArgs::new().arg(1i64)).unwrap();
        assert_eq!(out.as_int(), Some(3));
        assert!(f.ptr_eq(&f.clone()));
        assert_eq!(f.qualname(), "fn");
    }
}
