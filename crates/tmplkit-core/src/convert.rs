//! Conversion traits for argument extraction and return value handling.
//!
//! - [`FromDynamic`]: Extract a Rust value from a [`Dynamic`]
//! - [`IntoDynamic`]: Convert a Rust value into a [`Dynamic`]
//!
//! Extraction is a type assertion, not a coercion: asking for a `String`
//! from an `Int` fails. The one exception is `f64`, which accepts integers.
//! Coercing helpers (`toString`, `toInt`, ...) live in the conversion module.
//!
//! ## Example
//!
//! ```
//! use tmplkit_core::{Dynamic, FromDynamic, IntoDynamic};
//!
//! let value = Dynamic::Int(42);
//! let n = i32::from_dynamic(&value).unwrap();
//! assert_eq!(n.into_dynamic(), value);
//! ```

use crate::error::ConversionError;
use crate::value::{Dynamic, Map};

/// Extract a value from a [`Dynamic`].
pub trait FromDynamic: Sized {
    /// Extract a value from the given slot.
    ///
    /// Returns a `ConversionError` if the slot contains an incompatible type.
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError>;
}

/// Convert a value into a [`Dynamic`].
pub trait IntoDynamic {
    /// Convert this value into a Dynamic.
    fn into_dynamic(self) -> Dynamic;
}

fn mismatch(expected: &'static str, value: &Dynamic) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        actual: value.type_name(),
    }
}

// ============================================================================
// Integer implementations
// ============================================================================

macro_rules! impl_dynamic_int {
    ($($ty:ty),*) => {
        $(
            impl FromDynamic for $ty {
                fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
                    match value {
                        Dynamic::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                            ConversionError::IntegerOverflow {
                                value: *v,
                                target_type: stringify!($ty),
                            }
                        }),
                        other => Err(mismatch("int", other)),
                    }
                }
            }

            impl IntoDynamic for $ty {
                /// Values above `i64::MAX` saturate.
                fn into_dynamic(self) -> Dynamic {
                    Dynamic::Int(i64::try_from(self).unwrap_or(i64::MAX))
                }
            }
        )*
    };
}

impl_dynamic_int!(i32, i64, u32, usize);

// ============================================================================
// Scalar implementations
// ============================================================================

impl FromDynamic for f64 {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        value.as_f64().ok_or_else(|| mismatch("float", value))
    }
}

impl IntoDynamic for f64 {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Float(self)
    }
}

impl FromDynamic for bool {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::Bool(b) => Ok(*b),
            other => Err(mismatch("bool", other)),
        }
    }
}

impl IntoDynamic for bool {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Bool(self)
    }
}

impl FromDynamic for String {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::String(s) => Ok(s.clone()),
            other => Err(mismatch("string", other)),
        }
    }
}

impl IntoDynamic for String {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::String(self)
    }
}

impl IntoDynamic for &str {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::String(self.to_string())
    }
}

impl IntoDynamic for () {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Null
    }
}

// ============================================================================
// Container implementations
// ============================================================================

impl FromDynamic for Vec<Dynamic> {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::List(items) => Ok(items.clone()),
            other => Err(mismatch("list", other)),
        }
    }
}

impl IntoDynamic for Vec<Dynamic> {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::List(self)
    }
}

impl IntoDynamic for Vec<String> {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::List(self.into_iter().map(Dynamic::String).collect())
    }
}

impl FromDynamic for Map {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::Map(map) => Ok(map.clone()),
            other => Err(mismatch("map", other)),
        }
    }
}

impl IntoDynamic for Map {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Map(self)
    }
}

impl FromDynamic for Dynamic {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl IntoDynamic for Dynamic {
    fn into_dynamic(self) -> Dynamic {
        self
    }
}

impl<T: IntoDynamic> IntoDynamic for Option<T> {
    fn into_dynamic(self) -> Dynamic {
        self.map_or(Dynamic::Null, IntoDynamic::into_dynamic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_narrowing_reports_overflow() {
        let err = i32::from_dynamic(&Dynamic::Int(i64::MAX)).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::IntegerOverflow { target_type: "i32", .. }
        ));
        assert!(usize::from_dynamic(&Dynamic::Int(-1)).is_err());
    }

    #[test]
    fn wide_unsigned_saturates() {
        assert_eq!(usize::MAX.into_dynamic(), Dynamic::Int(i64::MAX));
        assert_eq!(42usize.into_dynamic(), Dynamic::Int(42));
        assert_eq!(u32::MAX.into_dynamic(), Dynamic::Int(u32::MAX as i64));
    }

    #[test]
    fn string_extraction_is_an_assertion() {
        let err = String::from_dynamic(&Dynamic::Int(1)).unwrap_err();
        assert_eq!(
            err,
            ConversionError::TypeMismatch {
                expected: "string",
                actual: "int"
            }
        );
    }

    #[test]
    fn float_accepts_int() {
        assert_eq!(f64::from_dynamic(&Dynamic::Int(3)).unwrap(), 3.0);
        assert!(f64::from_dynamic(&Dynamic::from("3")).is_err());
    }

    #[test]
    fn map_extraction() {
        let value: Dynamic = [("a", 1)].into_iter().collect();
        let map = Map::from_dynamic(&value).unwrap();
        assert_eq!(map.get("a"), Some(&Dynamic::Int(1)));
        assert!(Map::from_dynamic(&Dynamic::List(vec![])).is_err());
    }

    #[test]
    fn option_into_dynamic() {
        assert_eq!(None::<i64>.into_dynamic(), Dynamic::Null);
        assert_eq!(Some("x").into_dynamic(), Dynamic::from("x"));
    }
}
