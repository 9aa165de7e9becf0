//! Arithmetic helpers.
//!
//! Integer arithmetic stays integral and is overflow-checked; any float
//! operand promotes the whole operation to float. Division and modulo by
//! zero are errors (`div`/`mod` swallow them in legacy mode, `mustDiv`/
//! `mustMod` surface them).

use std::cmp::Ordering;

use tmplkit_registry::{CallArgs, Dynamic, FunctionTable, NativeError, RegistrationError, Registry};

fn numeric_args(args: &CallArgs<'_>) -> Result<Vec<Dynamic>, NativeError> {
    args.slots()
        .iter()
        .enumerate()
        .map(|(i, v)| match v {
            Dynamic::Int(_) | Dynamic::Float(_) => Ok(v.clone()),
            _ => args.arg::<f64>(i).map(Dynamic::Float),
        })
        .collect()
}

fn overflow(op: &str) -> NativeError {
    NativeError::other(format!("integer overflow in {}", op))
}

/// Fold with integer arithmetic, switching to float on the first float operand.
fn fold(
    args: &CallArgs<'_>,
    op: &str,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Dynamic, NativeError> {
    args.expect_at_least(1)?;
    let values = numeric_args(args)?;
    let mut acc = values[0].clone();
    for value in &values[1..] {
        acc = match (&acc, value) {
            (Dynamic::Int(a), Dynamic::Int(b)) => {
                Dynamic::Int(int_op(*a, *b).ok_or_else(|| overflow(op))?)
            }
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => Dynamic::Float(float_op(x, y)),
                _ => return Err(NativeError::other(format!("{}: non-numeric operand", op))),
            },
        };
    }
    Ok(acc)
}

pub fn add(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    fold(args, "add", i64::checked_add, |a, b| a + b)
}

pub fn sub(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    fold(args, "sub", i64::checked_sub, |a, b| a - b)
}

pub fn mul(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    fold(args, "mul", i64::checked_mul, |a, b| a * b)
}

pub fn add1(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    match args.slot(0)? {
        Dynamic::Int(v) => v.checked_add(1).map(Dynamic::Int).ok_or_else(|| overflow("add1")),
        _ => Ok(Dynamic::Float(args.arg::<f64>(0)? + 1.0)),
    }
}

fn is_zero(value: &Dynamic) -> bool {
    value.as_f64() == Some(0.0)
}

pub fn div(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    if is_zero(args.slot(1)?) {
        return Err(NativeError::other("division by zero"));
    }
    fold(args, "div", i64::checked_div, |a, b| a / b)
}

pub fn modulo(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let a: i64 = args.arg(0)?;
    let b: i64 = args.arg(1)?;
    if b == 0 {
        return Err(NativeError::other("modulo by zero"));
    }
    a.checked_rem(b).map(Dynamic::Int).ok_or_else(|| overflow("mod"))
}

fn extreme(args: &CallArgs<'_>, want: Ordering) -> Result<Dynamic, NativeError> {
    args.expect_at_least(1)?;
    let values = numeric_args(args)?;
    let mut best = values[0].clone();
    for value in values.into_iter().skip(1) {
        if value.total_cmp(&best) == want {
            best = value;
        }
    }
    Ok(best)
}

pub fn max(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    extreme(args, Ordering::Greater)
}

pub fn min(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    extreme(args, Ordering::Less)
}

pub fn floor(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    Ok(Dynamic::Float(args.arg::<f64>(0)?.floor()))
}

pub fn ceil(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    Ok(Dynamic::Float(args.arg::<f64>(0)?.ceil()))
}

/// `round x` or `round precision x`, half away from zero.
pub fn round(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    let (precision, value) = match args.len() {
        1 => (0, args.arg::<f64>(0)?),
        2 => (args.arg::<i32>(0)?, args.arg::<f64>(1)?),
        n => return Err(NativeError::arity("1 or 2", n)),
    };
    let scale = 10f64.powi(precision);
    Ok(Dynamic::Float((value * scale).round() / scale))
}

/// Arithmetic registry.
#[derive(Debug, Default)]
pub struct NumericRegistry;

impl NumericRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl Registry for NumericRegistry {
    fn uid(&self) -> &str {
        "numeric"
    }

    fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
        funcs.add("add", add)?;
        funcs.add("add1", add1)?;
        funcs.add("sub", sub)?;
        funcs.add("mul", mul)?;
        funcs.add("div", div)?;
        funcs.add("mustDiv", div)?;
        funcs.add("mod", modulo)?;
        funcs.add("mustMod", modulo)?;
        funcs.add("max", max)?;
        funcs.add("min", min)?;
        funcs.add("floor", floor)?;
        funcs.add("ceil", ceil)?;
        funcs.add("round", round)?;
        Ok(())
    }
}
