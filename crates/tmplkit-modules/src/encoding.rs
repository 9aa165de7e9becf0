//! JSON encoding via `serde_json`.

use serde_json::{Number, Value};
use tmplkit_registry::{CallArgs, Dynamic, FunctionTable, Map, NativeError, RegistrationError, Registry};

/// Convert a template value into a JSON value.
///
/// Non-finite floats have no JSON form and encode as `null`.
pub fn to_json_value(value: &Dynamic) -> Value {
    match value {
        Dynamic::Null => Value::Null,
        Dynamic::Bool(b) => Value::Bool(*b),
        Dynamic::Int(v) => Value::Number((*v).into()),
        Dynamic::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        Dynamic::String(s) => Value::String(s.clone()),
        Dynamic::List(items) => Value::Array(items.iter().map(to_json_value).collect()),
        Dynamic::Map(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_json_value(v)))
                .collect(),
        ),
    }
}

/// Convert a JSON value into a template value.
///
/// Integers that fit `i64` stay integral; everything else numeric is a float.
pub fn from_json_value(value: Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::Null,
        Value::Bool(b) => Dynamic::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Dynamic::Int(i),
            None => Dynamic::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Dynamic::String(s),
        Value::Array(items) => Dynamic::List(items.into_iter().map(from_json_value).collect()),
        Value::Object(obj) => Dynamic::Map(
            obj.into_iter()
                .map(|(k, v)| (k, from_json_value(v)))
                .collect::<Map>(),
        ),
    }
}

fn json_error(err: serde_json::Error) -> NativeError {
    NativeError::other(format!("json: {}", err))
}

pub fn to_json(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let json = serde_json::to_string(&to_json_value(args.slot(0)?)).map_err(json_error)?;
    Ok(json.into())
}

pub fn to_pretty_json(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let json = serde_json::to_string_pretty(&to_json_value(args.slot(0)?)).map_err(json_error)?;
    Ok(json.into())
}

pub fn from_json(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let text: String = args.arg(0)?;
    let value: Value = serde_json::from_str(&text).map_err(json_error)?;
    Ok(from_json_value(value))
}

/// JSON codec registry.
#[derive(Debug, Default)]
pub struct EncodingRegistry;

impl EncodingRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl Registry for EncodingRegistry {
    fn uid(&self) -> &str {
        "encoding"
    }

    fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
        funcs.add("toJson", to_json)?;
        funcs.add("mustToJson", to_json)?;
        funcs.add("toPrettyJson", to_pretty_json)?;
        funcs.add("fromJson", from_json)?;
        funcs.add("mustFromJson", from_json)?;
        Ok(())
    }
}
