//! Core types shared by every tmplkit crate.
//!
//! - [`Dynamic`] - the loosely-typed value passed to and returned from callables
//! - [`FromDynamic`] / [`IntoDynamic`] - typed argument extraction and return conversion
//! - [`NativeFn`] / [`NativeCallable`] / [`CallArgs`] - type-erased callable storage
//! - [`error`] - the error taxonomy (registration, native, invocation)

pub mod convert;
pub mod error;
pub mod native_fn;
pub mod value;

pub use convert::{FromDynamic, IntoDynamic};
pub use error::{ConversionError, InvokeError, NativeError, RegistrationError, TmplError};
pub use native_fn::{CallArgs, NativeCallable, NativeFn};
pub use value::{Dynamic, Map};
