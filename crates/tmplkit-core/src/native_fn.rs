//! Native function storage and argument access.

use std::fmt;
use std::sync::Arc;

use crate::convert::FromDynamic;
use crate::error::NativeError;
use crate::value::Dynamic;

/// Type-erased native function.
///
/// This wraps any callable that implements `NativeCallable`, allowing
/// functions of different shapes to be stored uniformly in one table.
///
/// The inner callable is wrapped in Arc so aliases and wrapper layers can
/// share one implementation, and so the frozen table can be read from
/// many threads.
pub struct NativeFn {
    inner: Arc<dyn NativeCallable + Send + Sync>,
}

impl NativeFn {
    /// Create a new NativeFn from a callable.
    pub fn new<F>(f: F) -> Self
    where
        F: NativeCallable + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Create a new NativeFn from a closure.
    ///
    /// Prefer this over [`NativeFn::new`] for closures: the explicit `Fn`
    /// bound lets the compiler infer the argument and error types.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&CallArgs<'_>) -> Result<Dynamic, NativeError> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Call this native function with the given arguments.
    pub fn call(&self, args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
        self.inner.call(args)
    }

    /// Call with a raw argument slice.
    pub fn call_slice(&self, args: &[Dynamic]) -> Result<Dynamic, NativeError> {
        self.inner.call(&CallArgs::new(args))
    }

    /// Clone this NativeFn, sharing the same underlying callable.
    pub fn clone_arc(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Check whether two handles share one callable.
    pub fn ptr_eq(&self, other: &NativeFn) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").finish_non_exhaustive()
    }
}

impl Clone for NativeFn {
    fn clone(&self) -> Self {
        self.clone_arc()
    }
}

/// Trait for callable native functions.
///
/// This is the core trait that all registered callables implement.
/// The `call` method receives the argument list and returns a value.
pub trait NativeCallable {
    /// Call this function with the given arguments.
    fn call(&self, args: &CallArgs<'_>) -> Result<Dynamic, NativeError>;
}

// Implement NativeCallable for closures that take CallArgs
impl<F> NativeCallable for F
where
    F: Fn(&CallArgs<'_>) -> Result<Dynamic, NativeError>,
{
    fn call(&self, args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
        (self)(args)
    }
}

/// Borrowed argument list for one invocation.
///
/// ## Typed Argument Access
///
/// ```ignore
/// let key: String = args.arg(0)?;
/// let dict: Map = args.arg(1)?;
/// ```
#[derive(Clone, Copy)]
pub struct CallArgs<'a> {
    slots: &'a [Dynamic],
}

impl<'a> CallArgs<'a> {
    /// Create a new argument view.
    pub fn new(slots: &'a [Dynamic]) -> Self {
        Self { slots }
    }

    /// Get the number of arguments.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the call has no arguments.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All argument slots.
    pub fn slots(&self) -> &'a [Dynamic] {
        self.slots
    }

    /// Get a raw reference to an argument slot.
    pub fn slot(&self, index: usize) -> Result<&'a Dynamic, NativeError> {
        self.slots
            .get(index)
            .ok_or(NativeError::ArgumentIndexOutOfBounds {
                index,
                count: self.slots.len(),
            })
    }

    /// Get a typed argument value.
    pub fn arg<T: FromDynamic>(&self, index: usize) -> Result<T, NativeError> {
        let slot = self.slot(index)?;
        T::from_dynamic(slot).map_err(|source| NativeError::Conversion { index, source })
    }

    /// Arguments from `index` to the end (empty if out of range).
    pub fn rest_from(&self, index: usize) -> &'a [Dynamic] {
        self.slots.get(index..).unwrap_or(&[])
    }

    /// Fail unless exactly `count` arguments were passed.
    pub fn expect_count(&self, count: usize) -> Result<(), NativeError> {
        if self.slots.len() == count {
            Ok(())
        } else {
            Err(NativeError::arity(count.to_string(), self.slots.len()))
        }
    }

    /// Fail unless at least `count` arguments were passed.
    pub fn expect_at_least(&self, count: usize) -> Result<(), NativeError> {
        if self.slots.len() >= count {
            Ok(())
        } else {
            Err(NativeError::arity(format!("at least {}", count), self.slots.len()))
        }
    }
}

impl fmt::Debug for CallArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallArgs")
            .field("arg_count", &self.len())
            .finish()
    }
}
