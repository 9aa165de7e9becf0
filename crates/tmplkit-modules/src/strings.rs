//! String helpers.
//!
//! Every function takes the string it operates on as its *last* argument so
//! it composes with pipelines: `{{ .name | trimPrefix "x-" | upper }}`.
//!
//! | Function | Description |
//! |----------|-------------|
//! | `upper s` / `lower s` | Case conversion |
//! | `title s` / `untitle s` | Upper/lower-case the first letter of each word |
//! | `trim s` / `trimAll cutset s` | Strip whitespace / characters in `cutset` |
//! | `trimPrefix p s` / `trimSuffix p s` | Strip one prefix / suffix |
//! | `repeat n s` | Repeat `s` n times (`mustRepeat` fails loudly) |
//! | `replace old new s` | Replace every occurrence |
//! | `contains sub s`, `hasPrefix p s`, `hasSuffix p s` | Predicates |
//! | `quote args...` / `squote args...` | Quote each argument, space separated |
//! | `cat args...` | Join non-null arguments with spaces |
//! | `nospace s` | Remove all whitespace |
//! | `substr start end s` | Character range; negative `end` means "to the end" |
//! | `trunc n s` | Keep first n characters (last -n if negative) |
//! | `split sep s` / `splitList sep s` | Split into a `_0.._n` map / a list |

use crate::check_generated_len;
use tmplkit_registry::{
    CallArgs, Dynamic, FunctionTable, Map, NativeError, RegistrationError, Registry,
};

// =============================================================================
// CASE
// =============================================================================

pub fn upper(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let s: String = args.arg(0)?;
    Ok(s.to_uppercase().into())
}

pub fn lower(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let s: String = args.arg(0)?;
    Ok(s.to_lowercase().into())
}

fn map_word_starts(s: &str, f: impl Fn(char) -> String) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_start = true;
    for ch in s.chars() {
        if at_start && !ch.is_whitespace() {
            out.push_str(&f(ch));
        } else {
            out.push(ch);
        }
        at_start = ch.is_whitespace();
    }
    out
}

pub fn title(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let s: String = args.arg(0)?;
    Ok(map_word_starts(&s, |c| c.to_uppercase().collect()).into())
}

pub fn untitle(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let s: String = args.arg(0)?;
    Ok(map_word_starts(&s, |c| c.to_lowercase().collect()).into())
}

// =============================================================================
// TRIMMING
// =============================================================================

pub fn trim(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let s: String = args.arg(0)?;
    Ok(s.trim().into())
}

pub fn trim_all(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let cutset: String = args.arg(0)?;
    let s: String = args.arg(1)?;
    Ok(s.trim_matches(|c| cutset.contains(c)).into())
}

pub fn trim_prefix(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let prefix: String = args.arg(0)?;
    let s: String = args.arg(1)?;
    Ok(s.strip_prefix(prefix.as_str()).unwrap_or(&s).into())
}

pub fn trim_suffix(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let suffix: String = args.arg(0)?;
    let s: String = args.arg(1)?;
    Ok(s.strip_suffix(suffix.as_str()).unwrap_or(&s).into())
}

pub fn nospace(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let s: String = args.arg(0)?;
    Ok(s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .into())
}

// =============================================================================
// TRANSFORMS
// =============================================================================

pub fn repeat(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let count: i64 = args.arg(0)?;
    let s: String = args.arg(1)?;
    let count = usize::try_from(count)
        .map_err(|_| NativeError::other(format!("negative repeat count {}", count)))?;
    check_generated_len("repeat", count.checked_mul(s.len()))?;
    Ok(s.repeat(count).into())
}

pub fn replace(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(3)?;
    let old: String = args.arg(0)?;
    let new: String = args.arg(1)?;
    let s: String = args.arg(2)?;
    Ok(s.replace(old.as_str(), &new).into())
}

/// Character-based substring; out-of-range indices clamp.
pub fn substr(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(3)?;
    let start: i64 = args.arg(0)?;
    let end: i64 = args.arg(1)?;
    let s: String = args.arg(2)?;

    let len = s.chars().count();
    let start = (start.max(0) as usize).min(len);
    let end = if end < 0 { len } else { (end as usize).min(len) };
    if start >= end {
        return Ok(Dynamic::from(""));
    }
    Ok(s.chars()
        .skip(start)
        .take(end - start)
        .collect::<String>()
        .into())
}

pub fn trunc(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let n: i64 = args.arg(0)?;
    let s: String = args.arg(1)?;

    let len = s.chars().count();
    let out: String = if n >= 0 {
        s.chars().take(n as usize).collect()
    } else {
        let keep = (n.unsigned_abs() as usize).min(len);
        s.chars().skip(len - keep).collect()
    };
    Ok(out.into())
}

// =============================================================================
// PREDICATES
// =============================================================================

pub fn contains(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let needle: String = args.arg(0)?;
    let s: String = args.arg(1)?;
    Ok(s.contains(needle.as_str()).into())
}

pub fn has_prefix(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let prefix: String = args.arg(0)?;
    let s: String = args.arg(1)?;
    Ok(s.starts_with(prefix.as_str()).into())
}

pub fn has_suffix(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let suffix: String = args.arg(0)?;
    let s: String = args.arg(1)?;
    Ok(s.ends_with(suffix.as_str()).into())
}

// =============================================================================
// JOINING / SPLITTING
// =============================================================================

fn quote_with(args: &CallArgs<'_>, mark: char) -> Dynamic {
    let quoted: Vec<String> = args
        .slots()
        .iter()
        .filter(|v| !v.is_null())
        .map(|v| format!("{mark}{v}{mark}"))
        .collect();
    quoted.join(" ").into()
}

pub fn quote(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    Ok(quote_with(args, '"'))
}

pub fn squote(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    Ok(quote_with(args, '\''))
}

pub fn cat(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    let parts: Vec<String> = args
        .slots()
        .iter()
        .filter(|v| !v.is_null())
        .map(ToString::to_string)
        .collect();
    Ok(parts.join(" ").into())
}

pub fn split(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let sep: String = args.arg(0)?;
    let s: String = args.arg(1)?;
    let map: Map = s
        .split(sep.as_str())
        .enumerate()
        .map(|(i, part)| (format!("_{}", i), Dynamic::from(part)))
        .collect();
    Ok(Dynamic::Map(map))
}

pub fn split_list(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let sep: String = args.arg(0)?;
    let s: String = args.arg(1)?;
    Ok(Dynamic::List(s.split(sep.as_str()).map(Dynamic::from).collect()))
}

// =============================================================================
// REGISTRY
// =============================================================================

/// String manipulation registry.
#[derive(Debug, Default)]
pub struct StringsRegistry;

impl StringsRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl Registry for StringsRegistry {
    fn uid(&self) -> &str {
        "strings"
    }

    fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
        funcs.add("upper", upper)?;
        funcs.add("lower", lower)?;
        funcs.add("title", title)?;
        funcs.add("untitle", untitle)?;
        funcs.add("trim", trim)?;
        funcs.add("trimAll", trim_all)?;
        funcs.add("trimPrefix", trim_prefix)?;
        funcs.add("trimSuffix", trim_suffix)?;
        funcs.add("nospace", nospace)?;
        funcs.add("repeat", repeat)?;
        funcs.add("mustRepeat", repeat)?;
        funcs.add("replace", replace)?;
        funcs.add("substr", substr)?;
        funcs.add("trunc", trunc)?;
        funcs.add("contains", contains)?;
        funcs.add("hasPrefix", has_prefix)?;
        funcs.add("hasSuffix", has_suffix)?;
        funcs.add("quote", quote)?;
        funcs.add("squote", squote)?;
        funcs.add("cat", cat)?;
        funcs.add("split", split)?;
        funcs.add("splitList", split_list)?;
        Ok(())
    }
}
