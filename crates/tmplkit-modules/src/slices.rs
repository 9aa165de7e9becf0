//! List helpers.
//!
//! The list is always the last argument. `append`, `prepend`, `has`,
//! `without` and `slice` also accept the historical list-first order; the
//! handler reorders those calls before they reach the functions below.

use tmplkit_registry::{CallArgs, Dynamic, FunctionTable, NativeError, RegistrationError, Registry};

/// The trailing list argument.
fn trailing_list(args: &CallArgs<'_>) -> Result<Vec<Dynamic>, NativeError> {
    args.expect_at_least(1)?;
    args.arg(args.len() - 1)
}

pub fn list(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    Ok(Dynamic::List(args.slots().to_vec()))
}

pub fn first(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    Ok(trailing_list(args)?.into_iter().next().unwrap_or_default())
}

pub fn must_first(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    trailing_list(args)?
        .into_iter()
        .next()
        .ok_or_else(|| NativeError::other("first: list is empty"))
}

pub fn last(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    Ok(trailing_list(args)?.pop().unwrap_or_default())
}

pub fn must_last(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    trailing_list(args)?
        .pop()
        .ok_or_else(|| NativeError::other("last: list is empty"))
}

pub fn rest(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let items = trailing_list(args)?;
    Ok(Dynamic::List(items.into_iter().skip(1).collect()))
}

pub fn initial(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let mut items = trailing_list(args)?;
    items.pop();
    Ok(Dynamic::List(items))
}

/// `append value list`
pub fn append(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let mut items = trailing_list(args)?;
    items.push(args.slot(0)?.clone());
    Ok(Dynamic::List(items))
}

/// `prepend value list`
pub fn prepend(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let mut items = trailing_list(args)?;
    items.insert(0, args.slot(0)?.clone());
    Ok(Dynamic::List(items))
}

/// `has needle list`
pub fn has(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let items = trailing_list(args)?;
    let needle = args.slot(0)?;
    Ok(items.contains(needle).into())
}

/// `without values... list`
pub fn without(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    let items = trailing_list(args)?;
    let drop = &args.slots()[..args.len() - 1];
    Ok(Dynamic::List(
        items.into_iter().filter(|v| !drop.contains(v)).collect(),
    ))
}

/// `slice list`, `slice start list`, `slice start end list`
pub fn slice(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    let items = trailing_list(args)?;
    let len = items.len();
    let (start, end) = match args.len() {
        1 => (0, len),
        2 => (args.arg::<usize>(0)?, len),
        3 => (args.arg::<usize>(0)?, args.arg::<usize>(1)?),
        n => return Err(NativeError::arity("1 to 3", n)),
    };
    if start > end || end > len {
        return Err(NativeError::other(format!(
            "slice: range [{}:{}] out of bounds for length {}",
            start, end, len
        )));
    }
    Ok(Dynamic::List(items[start..end].to_vec()))
}

pub fn uniq(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let mut out: Vec<Dynamic> = Vec::new();
    for item in trailing_list(args)? {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    Ok(Dynamic::List(out))
}

pub fn compact(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    Ok(Dynamic::List(
        trailing_list(args)?
            .into_iter()
            .filter(Dynamic::is_truthy)
            .collect(),
    ))
}

pub fn reverse(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let mut items = trailing_list(args)?;
    items.reverse();
    Ok(Dynamic::List(items))
}

pub fn concat(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    let mut out = Vec::new();
    for i in 0..args.len() {
        out.extend(args.arg::<Vec<Dynamic>>(i)?);
    }
    Ok(Dynamic::List(out))
}

/// Render every element and sort the resulting strings.
pub fn sort_alpha(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let mut rendered: Vec<String> = trailing_list(args)?
        .iter()
        .map(ToString::to_string)
        .collect();
    rendered.sort();
    Ok(rendered.into_iter().map(Dynamic::String).collect::<Vec<_>>().into())
}

/// Sort by [`Dynamic::total_cmp`] and drop duplicates.
pub fn sort_uniq(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let mut items = trailing_list(args)?;
    items.sort_by(Dynamic::total_cmp);
    items.dedup();
    Ok(Dynamic::List(items))
}

/// `join sep list`
pub fn join(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(2)?;
    let sep: String = args.arg(0)?;
    let parts: Vec<String> = trailing_list(args)?
        .iter()
        .filter(|v| !v.is_null())
        .map(ToString::to_string)
        .collect();
    Ok(parts.join(&sep).into())
}

/// List manipulation registry.
#[derive(Debug, Default)]
pub struct SlicesRegistry;

impl SlicesRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl Registry for SlicesRegistry {
    fn uid(&self) -> &str {
        "slices"
    }

    fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
        funcs.add("list", list)?;
        funcs.add("first", first)?;
        funcs.add("mustFirst", must_first)?;
        funcs.add("last", last)?;
        funcs.add("mustLast", must_last)?;
        funcs.add("rest", rest)?;
        funcs.add("initial", initial)?;
        funcs.add("append", append)?;
        funcs.add("mustAppend", append)?;
        funcs.add("prepend", prepend)?;
        funcs.add("mustPrepend", prepend)?;
        funcs.add("has", has)?;
        funcs.add("without", without)?;
        funcs.add("slice", slice)?;
        funcs.add("uniq", uniq)?;
        funcs.add("compact", compact)?;
        funcs.add("reverse", reverse)?;
        funcs.add("concat", concat)?;
        funcs.add("sortAlpha", sort_alpha)?;
        funcs.add("sortUniq", sort_uniq)?;
        funcs.add("join", join)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(
        f: fn(&CallArgs<'_>) -> Result<Dynamic, NativeError>,
        args: &[Dynamic],
    ) -> Result<Dynamic, NativeError> {
        f(&CallArgs::new(args))
    }

    fn ints(values: &[i64]) -> Dynamic {
        Dynamic::List(values.iter().copied().map(Dynamic::Int).collect())
    }

    #[test]
    fn test_first_last_on_empty() {
        assert_eq!(call(first, &[ints(&[])]).unwrap(), Dynamic::Null);
        assert_eq!(call(last, &[ints(&[])]).unwrap(), Dynamic::Null);
        assert!(call(must_first, &[ints(&[])]).is_err());
        assert!(call(must_last, &[ints(&[])]).is_err());
        assert_eq!(call(last, &[ints(&[1, 2])]).unwrap(), Dynamic::Int(2));
    }

    #[test]
    fn test_rest_initial() {
        assert_eq!(call(rest, &[ints(&[1, 2, 3])]).unwrap(), ints(&[2, 3]));
        assert_eq!(call(initial, &[ints(&[1, 2, 3])]).unwrap(), ints(&[1, 2]));
    }

    #[test]
    fn test_append_prepend_value_first() {
        assert_eq!(call(append, &[3.into(), ints(&[1, 2])]).unwrap(), ints(&[1, 2, 3]));
        assert_eq!(call(prepend, &[0.into(), ints(&[1])]).unwrap(), ints(&[0, 1]));
        assert!(call(append, &[ints(&[1]), 3.into()]).is_err());
    }

    #[test]
    fn test_has_without() {
        assert_eq!(call(has, &[2.into(), ints(&[1, 2])]).unwrap(), true.into());
        assert_eq!(
            call(without, &[1.into(), 3.into(), ints(&[1, 2, 3, 1])]).unwrap(),
            ints(&[2])
        );
    }

    #[test]
    fn test_slice_bounds() {
        let l = ints(&[1, 2, 3, 4]);
        assert_eq!(call(slice, &[l.clone()]).unwrap(), l);
        assert_eq!(call(slice, &[1.into(), l.clone()]).unwrap(), ints(&[2, 3, 4]));
        assert_eq!(call(slice, &[1.into(), 3.into(), l.clone()]).unwrap(), ints(&[2, 3]));
        assert!(call(slice, &[3.into(), 9.into(), l]).is_err());
    }

    #[test]
    fn test_uniq_compact_reverse() {
        assert_eq!(call(uniq, &[ints(&[1, 1, 2, 1])]).unwrap(), ints(&[1, 2]));
        let mixed = Dynamic::List(vec![0.into(), "".into(), "a".into(), Dynamic::Null]);
        assert_eq!(
            call(compact, &[mixed]).unwrap(),
            Dynamic::List(vec!["a".into()])
        );
        assert_eq!(call(reverse, &[ints(&[1, 2])]).unwrap(), ints(&[2, 1]));
    }

    #[test]
    fn test_sorting() {
        let l = Dynamic::List(vec!["b".into(), 10.into(), "a".into()]);
        assert_eq!(
            call(sort_alpha, &[l]).unwrap(),
            Dynamic::List(vec!["10".into(), "a".into(), "b".into()])
        );
        assert_eq!(call(sort_uniq, &[ints(&[3, 1, 3])]).unwrap(), ints(&[1, 3]));
    }

    #[test]
    fn test_concat_and_join() {
        assert_eq!(
            call(concat, &[ints(&[1]), ints(&[2, 3])]).unwrap(),
            ints(&[1, 2, 3])
        );
        assert_eq!(call(join, &["-".into(), ints(&[1, 2])]).unwrap(), "1-2".into());
    }
}
