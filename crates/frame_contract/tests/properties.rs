//! Behavioral guarantees of the contract layer

use arrow::array::{ArrayRef, Int64Array};
use frame_contract::checks::{extends, is_, is_not, removed, same_index_as, same_length_as};
use frame_contract::{
    argument, get_mode, raise_scope, result, scoped_mode, with_mode, CallArgs, Column,
    ContractError, ContractFn, DataFrameSchema, DataType, Frame, Mode, Signature, Value,
};
use proptest::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn ints(values: &[i64]) -> ArrayRef {
    Arc::new(Int64Array::from(values.to_vec()))
}

fn table(a: &[i64], b: &[i64]) -> Value {
    Value::from(Frame::from_columns(vec![("a", ints(a)), ("b", ints(b))]).unwrap())
}

/// Two equal-length columns of arbitrary values.
fn arb_table() -> impl Strategy<Value = (Vec<i64>, Vec<i64>)> {
    (0usize..12).prop_flat_map(|len| {
        (
            prop::collection::vec(any::<i64>(), len),
            prop::collection::vec(any::<i64>(), len),
        )
    })
}

/// Arguments that are frames, scalars or missing structure altogether.
fn arb_arg() -> impl Strategy<Value = Value> {
    prop_oneof![
        arb_table().prop_map(|(a, b)| table(&a, &b)),
        any::<i64>().prop_map(Value::Int),
        "[a-z]{0,4}".prop_map(Value::from),
        Just(Value::None),
    ]
}

fn counting_fn(counter: Arc<AtomicUsize>) -> ContractFn {
    ContractFn::new(
        Signature::new("f").param("df").param("other"),
        move |call| {
            counter.fetch_add(1, Ordering::SeqCst);
            call.get("df")
        },
    )
}

fn heavily_checked(f: ContractFn) -> ContractFn {
    let f = argument("df")
        .check(DataFrameSchema::new().column("missing", Column::of(DataType::String)))
        .check(same_index_as("other"))
        .check(same_length_as("other"))
        .apply(f)
        .unwrap();
    result()
        .check(extends("other", None).unwrap())
        .check(is_("other"))
        .check(is_not("df"))
        .check(removed(["a"]))
        .apply(f)
        .unwrap()
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Frame(x), Value::Frame(y)) => x.ptr_eq(y),
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::None, Value::None) => true,
        _ => false,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// P1: skip and silent never change behavior, however malformed the data
    #[test]
    fn prop_mode_gating(df in arb_arg(), other in arb_arg()) {
        for mode in [Mode::Skip, Mode::Silent] {
            let _mode = scoped_mode(mode).unwrap();
            let plain_count = Arc::new(AtomicUsize::new(0));
            let checked_count = Arc::new(AtomicUsize::new(0));
            let plain = counting_fn(Arc::clone(&plain_count));
            let checked = heavily_checked(counting_fn(Arc::clone(&checked_count)));

            let args = CallArgs::new().arg(df.clone()).arg(other.clone());
            let expected = plain.call(&args).unwrap();
            let got = checked.call(&args).unwrap();
            prop_assert!(same_value(&expected, &got));
            prop_assert_eq!(plain_count.load(Ordering::SeqCst), 1);
            prop_assert_eq!(checked_count.load(Ordering::SeqCst), 1);
        }
    }

    /// P3: an identity function always extends its input
    #[test]
    fn prop_extends_identity((a, b) in arb_table()) {
        let _mode = raise_scope();
        let f = ContractFn::new(Signature::new("ident").param("df"), |call| call.get("df"));
        let f = result().check(extends("df", None).unwrap()).apply(f).unwrap();
        prop_assert!(f.call(&CallArgs::new().arg(table(&a, &b))).is_ok());
    }
}

/// P2: raise mode reports length mismatches and passes equal lengths
#[test]
fn test_raise_correctness() {
    let _mode = raise_scope();
    let f = ContractFn::new(Signature::new("f").param("a").param("b"), |call| call.get("a"));
    let f = argument("a").check(same_length_as(["b"])).apply(f).unwrap();

    let err = f
        .call(&CallArgs::new().arg(table(&[1], &[1])).arg(table(&[1, 2], &[1, 2])))
        .unwrap_err();
    assert!(err.is_violation());
    assert!(err.to_string().contains("Length of b = 2 != 1."));

    assert!(f
        .call(&CallArgs::new().arg(table(&[1], &[1])).arg(table(&[3], &[4])))
        .is_ok());
}

/// P4: differing column sets name both column lists
#[test]
fn test_extends_column_diff() {
    let _mode = raise_scope();
    let f = ContractFn::new(Signature::new("rename").param("df"), |_| {
        Ok(Value::from(Frame::from_columns(vec![("b", ints(&[1]))])?))
    });
    let f = result().check(extends("df", None).unwrap()).apply(f).unwrap();
    let source = Value::from(Frame::from_columns(vec![("a", ints(&[1]))]).unwrap());
    let err = f.call(&CallArgs::new().arg(source)).unwrap_err();
    assert!(err
        .to_string()
        .contains("Columns differ: ['b'] != ['a']"));
}

/// P5: identity means the same object, not an equal one
#[test]
fn test_identity() {
    let _mode = raise_scope();
    let same = ContractFn::new(Signature::new("same").param("df"), |call| call.get("df"));
    let copy = ContractFn::new(Signature::new("copy").param("df"), |call| {
        Ok(Value::Frame(call.frame("df")?.deep_copy()))
    });
    let same = result().check(is_("df")).apply(same).unwrap();
    let copy = result().check(is_("df")).apply(copy).unwrap();

    let df = table(&[1], &[2]);
    assert!(same.call(&CallArgs::new().arg(df.clone())).is_ok());
    assert_eq!(
        copy.call(&CallArgs::new().arg(df)).unwrap_err().to_string(),
        "copy: Output: is not df"
    );
}

/// P6: a contract naming an unknown parameter fails when applied
#[test]
fn test_setup_fails_fast() {
    let calls = Arc::new(AtomicUsize::new(0));
    let f = counting_fn(Arc::clone(&calls));
    for mode in [Mode::Silent, Mode::Warn, Mode::Raise] {
        let err = with_mode(mode, || {
            argument("x")
                .check(DataFrameSchema::new())
                .apply(f.clone())
                .unwrap_err()
        });
        assert!(matches!(err, ContractError::MissingParameters { .. }));
        assert_eq!(
            err.to_string(),
            "f @argument('x') requires argument 'x' in function signature."
        );
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// P7: a scoped override is undone even when the block panics
#[test]
fn test_scoped_mode_restored_after_panic() {
    let before = get_mode();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let _mode = scoped_mode(Mode::Critical).unwrap();
        assert_eq!(get_mode(), Mode::Critical);
        panic!("inside scope");
    }));
    assert!(outcome.is_err());
    assert_eq!(get_mode(), before);

    let early_return = || -> Result<(), ContractError> {
        let _mode = raise_scope();
        let stop: Result<(), ContractError> = Err(ContractError::Violation("stop".to_string()));
        stop?;
        Ok(())
    };
    assert!(early_return().is_err());
    assert_eq!(get_mode(), before);
}

/// P8: keyword beats position beats default
#[test]
fn test_parameter_resolution() {
    let sig = Signature::new("fn").param("a").param_default("b", 2i64);
    let b = |args: CallArgs| sig.resolve("b", &args).unwrap().as_int();
    assert_eq!(b(CallArgs::new().arg(1i64)), Some(2));
    assert_eq!(b(CallArgs::new().arg(1i64).arg(5i64)), Some(5));
    assert_eq!(b(CallArgs::new().kwarg("b", 9i64)), Some(9));
}
