//! Coercing conversions.
//!
//! Unlike argument extraction, these functions accept any scalar and try to
//! turn it into the requested type. A string that does not parse is an
//! error, which legacy-mode invocation turns into an empty result.

use tmplkit_registry::{
    CallArgs, Dynamic, FunctionTable, NativeError, NoticeList, NoticeRegistry, RegistrationError,
    Registry,
};

fn unparsable(value: &Dynamic, target: &str) -> NativeError {
    NativeError::other(format!("cannot convert {} '{}' to {}", value.type_name(), value, target))
}

fn coerce_int(value: &Dynamic) -> Result<i64, NativeError> {
    match value {
        Dynamic::Null => Ok(0),
        Dynamic::Bool(b) => Ok(i64::from(*b)),
        Dynamic::Int(v) => Ok(*v),
        Dynamic::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
        Dynamic::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .ok_or_else(|| unparsable(value, "int"))
        }
        _ => Err(unparsable(value, "int")),
    }
}

fn coerce_float(value: &Dynamic) -> Result<f64, NativeError> {
    match value {
        Dynamic::Null => Ok(0.0),
        Dynamic::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Dynamic::Int(v) => Ok(*v as f64),
        Dynamic::Float(f) => Ok(*f),
        Dynamic::String(s) => s.trim().parse().map_err(|_| unparsable(value, "float")),
        _ => Err(unparsable(value, "float")),
    }
}

pub fn to_string(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    Ok(args.slot(0)?.to_string().into())
}

pub fn to_int(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    coerce_int(args.slot(0)?).map(Dynamic::Int)
}

pub fn to_float(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    coerce_float(args.slot(0)?).map(Dynamic::Float)
}

/// Strings are true only for `"true"`/`"1"` (any case); other values use truthiness.
pub fn to_bool(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let out = match args.slot(0)? {
        Dynamic::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        other => other.is_truthy(),
    };
    Ok(out.into())
}

/// Render every element of a list; a scalar becomes a one-element list.
pub fn to_strings(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let rendered: Vec<String> = match args.slot(0)? {
        Dynamic::List(items) => items.iter().map(ToString::to_string).collect(),
        Dynamic::Null => Vec::new(),
        other => vec![other.to_string()],
    };
    Ok(rendered.into_iter().map(Dynamic::String).collect::<Vec<_>>().into())
}

/// String-only integer parse.
pub fn atoi(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let s: String = args.arg(0)?;
    s.trim()
        .parse::<i64>()
        .map(Dynamic::Int)
        .map_err(|e| NativeError::other(format!("atoi: {}", e)))
}

/// Type conversion registry.
#[derive(Debug, Default)]
pub struct ConversionRegistry;

impl ConversionRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl Registry for ConversionRegistry {
    fn uid(&self) -> &str {
        "conversion"
    }

    fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
        funcs.add("toString", to_string)?;
        funcs.add("toInt", to_int)?;
        funcs.add("toFloat", to_float)?;
        funcs.add("toBool", to_bool)?;
        funcs.add("toStrings", to_strings)?;
        funcs.add("atoi", atoi)?;
        Ok(())
    }

    fn as_notice_registry(&self) -> Option<&dyn NoticeRegistry> {
        Some(self)
    }
}

impl NoticeRegistry for ConversionRegistry {
    fn register_notices(&self, notices: &mut NoticeList) -> Result<(), RegistrationError> {
        notices.deprecated("atoi", "use toInt");
        Ok(())
    }
}
