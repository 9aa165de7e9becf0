//! Notices: advisory records attached to callable names.
//!
//! Registries attach notices to names through a [`NoticeList`]. Once the
//! table is built, a notice fires every time its subject is invoked and
//! the fired copy is appended to the handler's [`NoticeLog`]. The log is an
//! ordered sequence, not a map: one name can accumulate many records.

use std::fmt;
use std::sync::Mutex;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use tmplkit_core::Dynamic;

/// Placeholder in debug notice messages replaced by the call result.
pub const OUTPUT_PLACEHOLDER: &str = "$out";

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Severity {
    /// Diagnostic output, may reference the call result via `$out`.
    Debug = 0,
    /// Informational guidance.
    Info = 1,
    /// The name or call shape is deprecated.
    Deprecated = 2,
}

impl Severity {
    /// Short tag used in rendered notices.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Deprecated => "deprecated",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An advisory record attached to a callable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Callable name the notice is about.
    pub subject: String,
    /// Severity tag.
    pub severity: Severity,
    /// Human-readable remediation text.
    pub message: String,
}

impl Notice {
    /// Create a notice.
    pub fn new(subject: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            severity,
            message: message.into(),
        }
    }

    /// Deprecation notice.
    pub fn deprecated(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(subject, Severity::Deprecated, message)
    }

    /// Copy of this notice as it fires for `subject` after producing `output`.
    ///
    /// Debug notices substitute `$out` with the rendered output.
    pub fn fire(&self, subject: &str, output: &Dynamic) -> Notice {
        let message = if self.severity == Severity::Debug && self.message.contains(OUTPUT_PLACEHOLDER) {
            self.message.replace(OUTPUT_PLACEHOLDER, &output.to_string())
        } else {
            self.message.clone()
        };
        Notice::new(subject, self.severity, message)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.subject, self.message)
    }
}

// ============================================================================
// NoticeList - registered notices
// ============================================================================

/// Notices registered by registries, each attributed to its registry.
#[derive(Debug, Default)]
pub struct NoticeList {
    entries: Vec<(String, Notice)>,
    current: String,
}

impl NoticeList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute subsequent notices to `uid`.
    pub fn set_registry(&mut self, uid: &str) {
        self.current.clear();
        self.current.push_str(uid);
    }

    /// Append a notice.
    pub fn add(&mut self, notice: Notice) {
        self.entries.push((self.current.clone(), notice));
    }

    /// Append a deprecation notice.
    pub fn deprecated(&mut self, subject: &str, message: impl Into<String>) {
        self.add(Notice::new(subject, Severity::Deprecated, message));
    }

    /// Append an informational notice.
    pub fn info(&mut self, subject: &str, message: impl Into<String>) {
        self.add(Notice::new(subject, Severity::Info, message));
    }

    /// Append a debug notice. `$out` in the message is replaced by the call result.
    pub fn debug(&mut self, subject: &str, message: impl Into<String>) {
        self.add(Notice::new(subject, Severity::Debug, message));
    }

    /// Iterate over notices in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter().map(|(_, n)| n)
    }

    /// Iterate over `(registry, notice)` pairs in registration order.
    pub fn iter_with_registry(&self) -> impl Iterator<Item = (&str, &Notice)> {
        self.entries.iter().map(|(r, n)| (r.as_str(), n))
    }

    /// Forget every notice registered by `uid`.
    pub fn remove_registry(&mut self, uid: &str) {
        self.entries.retain(|(registry, _)| registry != uid);
    }

    /// Notices attached to `subject`.
    pub fn for_subject<'a>(&'a self, subject: &'a str) -> impl Iterator<Item = &'a Notice> + 'a {
        self.iter().filter(move |n| n.subject == subject)
    }

    /// Number of registered notices.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no notices are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// NoticeLog - fired notices
// ============================================================================

/// Thread-safe record of notices that fired at call time.
///
/// Notices accumulate until a host flushes them with [`drain`](NoticeLog::drain).
///
/// Recording also forwards the notice to the `log` facade: deprecations
/// at `warn`, info at `info`, debug at `debug`.
#[derive(Debug, Default)]
pub struct NoticeLog {
    entries: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fired notice.
    pub fn record(&self, notice: Notice) {
        match notice.severity {
            Severity::Deprecated => log::warn!("{}", notice),
            Severity::Info => log::info!("{}", notice),
            Severity::Debug => log::debug!("{}", notice),
        }
        // A panic while holding the lock cannot leave the Vec half-written.
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push(notice);
    }

    /// Copy of every recorded notice, in order.
    pub fn snapshot(&self) -> Vec<Notice> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Take every recorded notice, leaving the log empty.
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// `(subject, message)` pairs for host-side logging.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.snapshot()
            .into_iter()
            .map(|n| (n.subject, n.message))
            .collect()
    }

    /// Number of notices recorded for `subject`.
    pub fn count_for(&self, subject: &str) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|n| n.subject == subject)
            .count()
    }

    /// Total number of recorded notices.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
