//! Per-invocation notice emission.

use std::sync::Arc;

use tmplkit_core::{CallArgs, Dynamic, NativeCallable, NativeError, NativeFn};
use tmplkit_registry::{Notice, NoticeLog};

/// Callable wrapper that fires its attached notices after every call.
///
/// Notices fire whether or not the call succeeded; a failed call renders
/// `$out` as empty.
pub struct NoticeEmitter {
    name: String,
    rules: Vec<Notice>,
    inner: NativeFn,
    log: Arc<NoticeLog>,
}

impl NoticeEmitter {
    pub fn new(name: impl Into<String>, rules: Vec<Notice>, inner: NativeFn, log: Arc<NoticeLog>) -> Self {
        Self {
            name: name.into(),
            rules,
            inner,
            log,
        }
    }
}

impl NativeCallable for NoticeEmitter {
    fn call(&self, args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
        let result = self.inner.call(args);
        let null = Dynamic::Null;
        let output = result.as_ref().unwrap_or(&null);
        for rule in &self.rules {
            self.log.record(rule.fire(&self.name, output));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmplkit_registry::Severity;

    #[test]
    fn fires_every_call_with_output() {
        let log = Arc::new(NoticeLog::new());
        let rules = vec![
            Notice::deprecated("shout", "use upper"),
            Notice::new("shout", Severity::Debug, "shout returned $out"),
        ];
        let inner = NativeFn::from_fn(|_| Ok(Dynamic::from("HI")));
        let wrapped = NativeFn::new(NoticeEmitter::new("shout", rules, inner, Arc::clone(&log)));

        wrapped.call_slice(&[]).unwrap();
        wrapped.call_slice(&[]).unwrap();

        let fired = log.snapshot();
        assert_eq!(fired.len(), 4);
        assert_eq!(fired[1].message, "shout returned HI");
        assert_eq!(fired[2].severity, Severity::Deprecated);
    }

    #[test]
    fn fires_on_failure() {
        let log = Arc::new(NoticeLog::new());
        let inner = NativeFn::from_fn(|_| Err(NativeError::other("boom")));
        let wrapped = NativeFn::new(NoticeEmitter::new(
            "broken",
            vec![Notice::new("broken", Severity::Debug, "[$out]")],
            inner,
            Arc::clone(&log),
        ));

        assert!(wrapped.call_slice(&[]).is_err());
        assert_eq!(log.snapshot()[0].message, "[]");
    }
}
