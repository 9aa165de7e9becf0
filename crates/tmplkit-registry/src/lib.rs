//! Registration surface for tmplkit capability modules.
//!
//! A capability module ("registry") implements [`Registry`] and contributes
//! named callables to a shared [`FunctionTable`]. Registries may also opt
//! into [`AliasRegistry`] and [`NoticeRegistry`]; the handler discovers
//! those through the `as_*` capability queries on [`Registry`].
//!
//! Shared services (clock, entropy, environment, DNS) are injected through
//! the [`HandlerLink`] rather than reached for as process globals, so a host
//! can make every non-hermetic callable deterministic in tests.

pub mod alias;
pub mod function_table;
pub mod notice;
pub mod registry;
pub mod services;

pub use alias::{AliasEntry, AliasTable};
pub use function_table::{FunctionEntry, FunctionTable};
pub use notice::{Notice, NoticeList, NoticeLog, Severity};
pub use registry::{AliasRegistry, HandlerLink, NoticeRegistry, Registry};
pub use services::{
    Clock, Entropy, Environment, FixedClock, MapEnvironment, ProcessEnvironment, Resolver,
    SeededEntropy, Services, StaticResolver, SystemClock, SystemResolver,
};

// Re-export from core so registries only need one import path
pub use tmplkit_core::{
    CallArgs, ConversionError, Dynamic, FromDynamic, IntoDynamic, Map, NativeError, NativeFn,
    RegistrationError,
};
