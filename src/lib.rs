//! tmplkit - function registration and dispatch for template engines.
//!
//! Capability modules ("registries") contribute named callables to a
//! [`Handler`]. Building the handler produces a [`FuncMap`]: an immutable,
//! thread-safe name → callable table a template engine looks functions up
//! in.
//!
//! Building layers three behaviours over every registered callable:
//!
//! - **Aliases** - historical names resolve to the current implementation
//!   and record a deprecation [`Notice`] when used.
//! - **Signature disambiguation** - callables that used to take their
//!   container first accept both argument orders (see [`signature`]).
//! - **Safe invocation** - panics and errors never escape a call. Strict
//!   callables (`must*`) report failures; all others return an empty
//!   value (see [`safe`]).
//!
//! # Example
//!
//! ```
//! use tmplkit::{Dynamic, Handler};
//!
//! let mut handler = Handler::with_default_registries().unwrap();
//! let funcs = handler.build().unwrap();
//!
//! let dict: Dynamic = [("a", 1)].into_iter().collect();
//! assert_eq!(funcs.call("get", &["a".into(), dict.clone()]).unwrap(), Dynamic::Int(1));
//! assert!(funcs.notices().is_empty());
//!
//! // Container-first order still works, and is noticed.
//! assert_eq!(funcs.call("get", &[dict, "a".into()]).unwrap(), Dynamic::Int(1));
//! assert_eq!(funcs.notices().len(), 1);
//! ```

pub mod funcmap;
pub mod handler;
pub mod hermetic;
pub mod notices;
pub mod safe;
pub mod signature;

pub use funcmap::FuncMap;
pub use handler::{Handler, HandlerBuilder};
pub use hermetic::{NON_HERMETIC, is_hermetic};
pub use safe::{DEFAULT_STRICT_PREFIX, InvokeMode, SafeFn};
pub use signature::{CallOrder, Shape, SignaturePolicy, TieBreak, default_policies};

pub use tmplkit_core::{
    CallArgs, ConversionError, Dynamic, FromDynamic, IntoDynamic, InvokeError, Map, NativeError,
    NativeFn, RegistrationError, TmplError,
};
pub use tmplkit_registry::{
    AliasRegistry, AliasTable, Clock, Entropy, Environment, FixedClock, FunctionTable,
    HandlerLink, MapEnvironment, Notice, NoticeList, NoticeLog, NoticeRegistry, Registry,
    Resolver, SeededEntropy, Services, Severity, StaticResolver,
};
pub use tmplkit_modules::default_registries;
