//! Signature disambiguation for dual-order callables.
//!
//! Some callables historically took their container (dictionary or list)
//! as the *first* argument. The current signatures take it *last* so they
//! compose with pipelines (`$dict | get "a"`). A [`SignaturePolicy`]
//! describes one such callable, and [`Disambiguator`] wraps it so both call
//! shapes keep working:
//!
//! | First arg  | Last arg   | Resolution                                  |
//! |------------|------------|---------------------------------------------|
//! | container  | other      | legacy: rotate container to the end, notice |
//! | other      | container  | canonical: dispatch as-is                   |
//! | container  | container  | [`TieBreak`] (default: legacy)              |
//! | other      | other      | [`TieBreak`] (default: legacy)              |
//!
//! Calls with fewer than two arguments have only one possible order and
//! pass through untouched.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bitflags::bitflags;
use tmplkit_core::{CallArgs, Dynamic, NativeCallable, NativeError, NativeFn};
use tmplkit_registry::{Notice, NoticeLog};

/// Notice text for a call in legacy argument order.
pub const LEGACY_ORDER_NOTICE: &str =
    "legacy argument order detected; prefer piping the container last";

bitflags! {
    /// Value shapes that count as "the container" for a policy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Shape: u8 {
        const MAP = 0b01;
        const LIST = 0b10;
    }
}

impl Shape {
    /// Check whether `value` has one of these shapes.
    pub fn matches(self, value: &Dynamic) -> bool {
        match value {
            Dynamic::Map(_) => self.contains(Shape::MAP),
            Dynamic::List(_) => self.contains(Shape::LIST),
            _ => false,
        }
    }
}

/// Resolution for calls where the container position is ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Treat as container-first and reorder.
    #[default]
    Legacy,
    /// Treat as container-last and dispatch unchanged.
    Canonical,
}

/// Order a call resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOrder {
    /// Container last; dispatched unchanged.
    Canonical,
    /// Container first; rotated before dispatch.
    Legacy,
}

/// Dual-order description of one callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignaturePolicy {
    /// Canonical callable name the policy applies to.
    pub name: String,
    /// Shapes accepted as the container argument.
    pub shape: Shape,
    /// Resolution for ambiguous calls.
    pub tie_break: TieBreak,
    /// The callable has no container-last form. Calls are never reordered
    /// and always emit the legacy notice.
    pub always_legacy: bool,
}

impl SignaturePolicy {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            tie_break: TieBreak::Legacy,
            always_legacy: false,
        }
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn always_legacy(mut self) -> Self {
        self.always_legacy = true;
        self
    }

    /// Decide which order `args` are in.
    ///
    /// Returns `None` when there is nothing to decide (fewer than two
    /// arguments) and the call should pass through without a notice.
    pub fn resolve(&self, args: &[Dynamic]) -> Option<CallOrder> {
        if self.always_legacy {
            return Some(CallOrder::Legacy);
        }
        let (first, last) = match args {
            [first, .., last] => (first, last),
            _ => return None,
        };

        let order = match (self.shape.matches(first), self.shape.matches(last)) {
            (true, false) => CallOrder::Legacy,
            (false, true) => CallOrder::Canonical,
            _ => match self.tie_break {
                TieBreak::Legacy => CallOrder::Legacy,
                TieBreak::Canonical => CallOrder::Canonical,
            },
        };
        Some(order)
    }
}

/// Policies for the shipped dual-order callables.
pub fn default_policies() -> Vec<SignaturePolicy> {
    let maps = ["get", "set", "unset", "hasKey", "pick", "omit"];
    let lists = ["has", "append", "prepend", "without", "slice"];

    let mut policies: Vec<SignaturePolicy> = maps
        .iter()
        .map(|name| SignaturePolicy::new(*name, Shape::MAP))
        .chain(lists.iter().map(|name| SignaturePolicy::new(*name, Shape::LIST)))
        .collect();
    policies.push(SignaturePolicy::new("dig", Shape::MAP).always_legacy());
    policies
}

/// Move the leading container behind the remaining arguments.
///
/// The relative order of the other arguments is preserved.
pub fn to_canonical_order(args: &[Dynamic]) -> Vec<Dynamic> {
    let mut out = args.to_vec();
    if !out.is_empty() {
        out.rotate_left(1);
    }
    out
}

/// Callable wrapper applying a [`SignaturePolicy`].
///
/// The legacy-order notice is recorded once per wrapped name. Two threads
/// racing on the first legacy call may both record it. Callables whose
/// policy is [`always_legacy`](SignaturePolicy::always_legacy) record it on
/// every call.
pub struct Disambiguator {
    name: String,
    policy: SignaturePolicy,
    inner: NativeFn,
    notices: Arc<NoticeLog>,
    noticed: AtomicBool,
}

impl Disambiguator {
    pub fn new(
        name: impl Into<String>,
        policy: SignaturePolicy,
        inner: NativeFn,
        notices: Arc<NoticeLog>,
    ) -> Self {
        Self {
            name: name.into(),
            policy,
            inner,
            notices,
            noticed: AtomicBool::new(false),
        }
    }

    fn notice(&self) {
        self.notices
            .record(Notice::deprecated(&self.name, LEGACY_ORDER_NOTICE));
    }

    fn notice_once(&self) {
        if !self.noticed.swap(true, Ordering::Relaxed) {
            self.notice();
        }
    }
}

impl NativeCallable for Disambiguator {
    fn call(&self, args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
        match self.policy.resolve(args.slots()) {
            Some(CallOrder::Legacy) if self.policy.always_legacy => {
                self.notice();
                self.inner.call(args)
            }
            Some(CallOrder::Legacy) => {
                self.notice_once();
                log::trace!("{}: reordering legacy call", self.name);
                self.inner.call_slice(&to_canonical_order(args.slots()))
            }
            Some(CallOrder::Canonical) | None => self.inner.call(args),
        }
    }
}
