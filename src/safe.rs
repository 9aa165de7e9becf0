//! Safe invocation adapter.
//!
//! Every entry in a built [`FuncMap`](crate::FuncMap) is a [`SafeFn`]. A
//! call runs inside a panic boundary, so no fault raised by a callable ever
//! unwinds into the template engine. What happens to a failure depends on
//! the entry's [`InvokeMode`]:
//!
//! - **Strict** callables (canonical name starts with the strict prefix,
//!   `must` by default) return [`InvokeError::Failed`] and fail the
//!   evaluation that called them.
//! - **Legacy** callables swallow the failure and return [`Dynamic::Null`],
//!   matching the historical silent-failure behaviour. The swallowed
//!   error is logged at `debug`.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tmplkit_core::{CallArgs, Dynamic, InvokeError, NativeError, NativeFn};

/// Default prefix marking strict callables.
pub const DEFAULT_STRICT_PREFIX: &str = "must";

/// Failure policy for one callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeMode {
    /// Failures are returned to the caller.
    Strict,
    /// Failures become `Dynamic::Null`.
    Legacy,
}

impl InvokeMode {
    /// Mode for a callable whose canonical name is `canonical`.
    pub fn for_name(canonical: &str, strict_prefix: &str) -> Self {
        if canonical.starts_with(strict_prefix) {
            InvokeMode::Strict
        } else {
            InvokeMode::Legacy
        }
    }
}

/// Render a panic payload.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// A frozen table entry: callable plus failure policy.
#[derive(Clone)]
pub struct SafeFn {
    name: String,
    canonical: String,
    mode: InvokeMode,
    func: NativeFn,
}

impl SafeFn {
    pub fn new(
        name: impl Into<String>,
        canonical: impl Into<String>,
        mode: InvokeMode,
        func: NativeFn,
    ) -> Self {
        Self {
            name: name.into(),
            canonical: canonical.into(),
            mode,
            func,
        }
    }

    /// Name the entry is looked up by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the function this entry implements.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn mode(&self) -> InvokeMode {
        self.mode
    }

    /// Run the callable without applying the failure policy.
    ///
    /// Panics are still caught and reported as [`NativeError::Panic`].
    pub fn try_call(&self, args: &[Dynamic]) -> Result<Dynamic, NativeError> {
        let call = AssertUnwindSafe(|| self.func.call(&CallArgs::new(args)));
        match panic::catch_unwind(call) {
            Ok(result) => result,
            Err(payload) => Err(NativeError::Panic {
                message: panic_message(payload),
            }),
        }
    }

    /// Invoke with the entry's failure policy applied.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call(&self, args: &[Dynamic]) -> Result<Dynamic, InvokeError> {
        match self.try_call(args) {
            Ok(value) => Ok(value),
            Err(source) => match self.mode {
                InvokeMode::Strict => Err(InvokeError::Failed {
                    name: self.name.clone(),
                    source,
                }),
                InvokeMode::Legacy => {
                    log::debug!("{}: swallowed error: {}", self.name, source);
                    Ok(Dynamic::Null)
                }
            },
        }
    }
}

impl fmt::Debug for SafeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeFn")
            .field("name", &self.name)
            .field("canonical", &self.canonical)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
