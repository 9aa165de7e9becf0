//! Dictionary helpers.
//!
//! The dictionary is always the last argument. Values are immutable:
//! `set` and `unset` return an updated copy instead of mutating in place.
//!
//! `get`, `set`, `unset`, `hasKey`, `pick` and `omit` also accept the
//! historical dictionary-first order (the handler reorders those calls).
//! `dig` keeps its sprig signature `dig keys... default dict`. It is never
//! reordered and records a legacy-order notice on every call.

use tmplkit_registry::{
    CallArgs, Dynamic, FunctionTable, Map, NativeError, RegistrationError, Registry,
};

fn trailing_map(args: &CallArgs<'_>) -> Result<Map, NativeError> {
    args.expect_at_least(1)?;
    args.arg(args.len() - 1)
}

/// Leading string keys, everything but the trailing dictionary.
fn leading_keys(args: &CallArgs<'_>) -> Result<Vec<String>, NativeError> {
    (0..args.len().saturating_sub(1)).map(|i| args.arg(i)).collect()
}

/// `dict k1 v1 k2 v2 ...`; an odd trailing key maps to "".
pub fn dict(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    let mut map = Map::new();
    for (i, pair) in args.slots().chunks(2).enumerate() {
        let key: String = args.arg(i * 2)?;
        let value = pair.get(1).cloned().unwrap_or_else(|| Dynamic::from(""));
        map.insert(key, value);
    }
    Ok(Dynamic::Map(map))
}

/// `get key dict`; a missing key yields "".
pub fn get(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let key: String = args.arg(0)?;
    let map = trailing_map(args)?;
    Ok(map.get(&key).cloned().unwrap_or_else(|| Dynamic::from("")))
}

/// `mustGet key dict`; a missing key is an error.
pub fn must_get(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let key: String = args.arg(0)?;
    let map = trailing_map(args)?;
    map.get(&key)
        .cloned()
        .ok_or_else(|| NativeError::other(format!("key '{}' not found", key)))
}

/// `set key value dict`
pub fn set(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(3)?;
    let key: String = args.arg(0)?;
    let mut map = trailing_map(args)?;
    map.insert(key, args.slot(1)?.clone());
    Ok(Dynamic::Map(map))
}

/// `unset key dict`
pub fn unset(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let key: String = args.arg(0)?;
    let mut map = trailing_map(args)?;
    map.remove(&key);
    Ok(Dynamic::Map(map))
}

/// `hasKey key dict`
pub fn has_key(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let key: String = args.arg(0)?;
    Ok(trailing_map(args)?.contains_key(&key).into())
}

/// `pick keys... dict`
pub fn pick(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    let map = trailing_map(args)?;
    let keys = leading_keys(args)?;
    Ok(Dynamic::Map(
        map.into_iter().filter(|(k, _)| keys.contains(k)).collect(),
    ))
}

/// `omit keys... dict`
pub fn omit(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    let map = trailing_map(args)?;
    let keys = leading_keys(args)?;
    Ok(Dynamic::Map(
        map.into_iter().filter(|(k, _)| !keys.contains(k)).collect(),
    ))
}

/// `keys dicts...`, sorted, duplicates kept.
pub fn keys(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_at_least(1)?;
    let mut out = Vec::new();
    for i in 0..args.len() {
        let map: Map = args.arg(i)?;
        out.extend(map.into_keys());
    }
    out.sort();
    Ok(out.into_iter().map(Dynamic::String).collect::<Vec<_>>().into())
}

/// `values dict`, in key order.
pub fn values(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    Ok(Dynamic::List(trailing_map(args)?.into_values().collect()))
}

/// `merge dst srcs...`; keys already in `dst` win.
pub fn merge(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_at_least(1)?;
    let mut dst: Map = args.arg(0)?;
    for i in 1..args.len() {
        let src: Map = args.arg(i)?;
        for (k, v) in src {
            dst.entry(k).or_insert(v);
        }
    }
    Ok(Dynamic::Map(dst))
}

/// `dig keys... default dict`
pub fn dig(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_at_least(3)?;
    let map = trailing_map(args)?;
    let default = args.slot(args.len() - 2)?;
    let path: Vec<String> = (0..args.len() - 2)
        .map(|i| args.arg(i))
        .collect::<Result<_, _>>()?;

    let mut current = &Dynamic::Map(map);
    for key in &path {
        match current.as_map().and_then(|m| m.get(key)) {
            Some(next) => current = next,
            None => return Ok(default.clone()),
        }
    }
    Ok(current.clone())
}

/// Dictionary registry.
#[derive(Debug, Default)]
pub struct MapsRegistry;

impl MapsRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl Registry for MapsRegistry {
    fn uid(&self) -> &str {
        "maps"
    }

    fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
        funcs.add("dict", dict)?;
        funcs.add("get", get)?;
        funcs.add("mustGet", must_get)?;
        funcs.add("set", set)?;
        funcs.add("unset", unset)?;
        funcs.add("hasKey", has_key)?;
        funcs.add("pick", pick)?;
        funcs.add("omit", omit)?;
        funcs.add("keys", keys)?;
        funcs.add("values", values)?;
        funcs.add("merge", merge)?;
        funcs.add("dig", dig)?;
        Ok(())
    }
}
