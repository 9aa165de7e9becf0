//! The frozen name → callable map produced by [`Handler::build`](crate::Handler::build).
//!
//! A `FuncMap` is immutable. Cloning it is cheap (two `Arc` bumps) and
//! every clone can be read from any number of threads without locking.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tmplkit_core::{Dynamic, InvokeError};
use tmplkit_registry::{Notice, NoticeLog};

use crate::hermetic::is_hermetic;
use crate::safe::SafeFn;

#[derive(Debug, Clone)]
pub struct FuncMap {
    entries: Arc<FxHashMap<String, SafeFn>>,
    notices: Arc<NoticeLog>,
}

impl FuncMap {
    pub(crate) fn new(entries: FxHashMap<String, SafeFn>, notices: Arc<NoticeLog>) -> Self {
        Self {
            entries: Arc::new(entries),
            notices,
        }
    }

    /// Look up an entry.
    pub fn get(&self, name: &str) -> Option<&SafeFn> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Invoke `name` with `args`.
    ///
    /// # Errors
    ///
    /// [`InvokeError::NotFound`] for unknown names, and
    /// [`InvokeError::Failed`] when a strict callable fails.
    pub fn call(&self, name: &str, args: &[Dynamic]) -> Result<Dynamic, InvokeError> {
        match self.entries.get(name) {
            Some(entry) => entry.call(args),
            None => Err(InvokeError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Every name, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SafeFn)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of this map without the non-hermetic callables.
    ///
    /// The copy shares the notice log with this map.
    pub fn hermetic(&self) -> FuncMap {
        let entries = self
            .entries
            .iter()
            .filter(|(name, _)| is_hermetic(name))
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect();
        FuncMap::new(entries, Arc::clone(&self.notices))
    }

    /// The log notices fire into.
    pub fn notice_log(&self) -> &Arc<NoticeLog> {
        &self.notices
    }

    /// Fired notices as `(subject, message)` pairs.
    pub fn notices(&self) -> Vec<(String, String)> {
        self.notices.pairs()
    }

    /// Fired notices.
    pub fn notice_records(&self) -> Vec<Notice> {
        self.notices.snapshot()
    }

    /// Take the fired notices, leaving the shared log empty.
    ///
    /// Clones and hermetic views share one log, so draining through any of
    /// them empties it for all.
    pub fn drain_notices(&self) -> Vec<Notice> {
        self.notices.drain()
    }
}
