//! Dispatch core.
//!
//! A [`Handler`] collects registries, then builds them into a frozen
//! [`FuncMap`]. Registration is single-threaded and happens once at
//! startup; the built map is immutable and freely shareable.
//!
//! # Example
//!
//! ```
//! use tmplkit::{Dynamic, Handler};
//!
//! let mut handler = Handler::with_default_registries().unwrap();
//! let funcs = handler.build().unwrap();
//!
//! let out = funcs.call("toupper", &["abc".into()]).unwrap();
//! assert_eq!(out, Dynamic::from("ABC"));
//! assert_eq!(funcs.notices().len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tmplkit_core::{NativeFn, RegistrationError};
use tmplkit_modules::default_registries;
use tmplkit_registry::{
    AliasTable, FunctionTable, HandlerLink, Notice, NoticeList, NoticeLog, Registry, Services,
};

use crate::funcmap::FuncMap;
use crate::notices::NoticeEmitter;
use crate::safe::{DEFAULT_STRICT_PREFIX, InvokeMode, SafeFn};
use crate::signature::{Disambiguator, SignaturePolicy, default_policies};

/// Registers capability modules and builds the function map.
///
/// # Lifecycle
///
/// 1. Create with [`Handler::new`] or [`Handler::builder`]
/// 2. Add registries with [`add_registry`](Handler::add_registry)
/// 3. Call [`build`](Handler::build) exactly once
///
/// After `build`, every registration method returns
/// [`RegistrationError::AlreadyBuilt`].
pub struct Handler {
    registries: Vec<Box<dyn Registry>>,
    uids: FxHashSet<String>,
    funcs: FunctionTable,
    aliases: AliasTable,
    notice_rules: NoticeList,
    notices: Arc<NoticeLog>,
    services: Services,
    strict_prefix: String,
    policies: FxHashMap<String, SignaturePolicy>,
    built: bool,
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler {
    /// Create an empty handler with system services and the default
    /// signature policies.
    pub fn new() -> Self {
        Self::builder().into_handler()
    }

    /// Start configuring a handler.
    pub fn builder() -> HandlerBuilder {
        HandlerBuilder::new()
    }

    /// Create a handler with every shipped registry added.
    ///
    /// # Errors
    ///
    /// Returns an error if the shipped registries conflict.
    pub fn with_default_registries() -> Result<Self, RegistrationError> {
        Self::builder().with_default_registries().build()
    }

    /// Add one registry.
    ///
    /// Runs, in order: link, function registration, alias registration (if
    /// the registry has aliases), notice registration (if it has notices).
    /// A registry that fails any step leaves no functions, aliases, notices
    /// or uid behind.
    ///
    /// # Errors
    ///
    /// - `AlreadyBuilt` after [`build`](Handler::build)
    /// - `DuplicateRegistry` if the uid is taken
    /// - `DuplicateFunction` if the registry contributes an existing name
    /// - anything the registry itself reports
    pub fn add_registry(&mut self, mut registry: Box<dyn Registry>) -> Result<(), RegistrationError> {
        if self.built {
            return Err(RegistrationError::AlreadyBuilt);
        }

        let uid = registry.uid().to_string();
        if self.uids.contains(&uid) {
            return Err(RegistrationError::DuplicateRegistry { uid });
        }
        log::trace!("adding registry '{}'", uid);

        let before = self.funcs.len();
        if let Err(err) = self.install(&uid, registry.as_mut()) {
            let removed = self.funcs.remove_registry(&uid);
            self.aliases.remove_registry(&uid);
            self.notice_rules.remove_registry(&uid);
            log::debug!(
                "registry '{}' rejected, rolled back {} functions: {}",
                uid,
                removed,
                err
            );
            return Err(err);
        }

        log::debug!(
            "registry '{}' added {} functions",
            uid,
            self.funcs.len() - before
        );
        self.uids.insert(uid);
        self.registries.push(registry);
        Ok(())
    }

    fn install(&mut self, uid: &str, registry: &mut dyn Registry) -> Result<(), RegistrationError> {
        registry.link_handler(&HandlerLink::new(&self.services))?;

        self.funcs.set_registry(uid);
        registry.register_functions(&mut self.funcs)?;

        if let Some(alias_registry) = registry.as_alias_registry() {
            self.aliases.set_registry(uid);
            alias_registry.register_aliases(&mut self.aliases)?;
        }
        if let Some(notice_registry) = registry.as_notice_registry() {
            self.notice_rules.set_registry(uid);
            notice_registry.register_notices(&mut self.notice_rules)?;
        }
        Ok(())
    }

    /// Add registries in order, stopping at the first failure.
    pub fn add_registries<I>(&mut self, registries: I) -> Result<(), RegistrationError>
    where
        I: IntoIterator<Item = Box<dyn Registry>>,
    {
        for registry in registries {
            self.add_registry(registry)?;
        }
        Ok(())
    }

    /// Build the frozen function map.
    ///
    /// This performs:
    /// 1. Alias expansion, attaching a deprecation notice to every alias
    /// 2. Notice attachment
    /// 3. Signature disambiguation for dual-order callables
    /// 4. Safe-invocation wrapping of every entry
    ///
    /// # Errors
    ///
    /// Returns `AlreadyBuilt` on a second call, `UnknownAliasTarget` /
    /// `DuplicateFunction` for bad aliases and `UnknownNoticeSubject` for
    /// notices on missing names.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(&mut self) -> Result<FuncMap, RegistrationError> {
        if self.built {
            return Err(RegistrationError::AlreadyBuilt);
        }
        self.built = true;

        let mut funcs = std::mem::take(&mut self.funcs);
        let mut rules: FxHashMap<String, Vec<Notice>> = FxHashMap::default();

        // Aliases
        for entry in self.aliases.iter() {
            for alias in &entry.aliases {
                funcs.insert_alias(alias, &entry.canonical, &entry.registry)?;
                rules.entry(alias.clone()).or_default().push(Notice::deprecated(
                    alias.as_str(),
                    format!("`{}` is deprecated, use `{}`", alias, entry.canonical),
                ));
            }
        }

        // Registered notices
        for (registry, notice) in self.notice_rules.iter_with_registry() {
            if !funcs.contains(&notice.subject) {
                return Err(RegistrationError::UnknownNoticeSubject {
                    registry: registry.to_string(),
                    subject: notice.subject.clone(),
                });
            }
            rules
                .entry(notice.subject.clone())
                .or_default()
                .push(notice.clone());
        }

        let mut entries = FxHashMap::default();
        for entry in funcs.into_entries() {
            let mut func = entry.func;

            if let Some(policy) = self.policies.get(&entry.canonical) {
                func = NativeFn::new(Disambiguator::new(
                    entry.name.as_str(),
                    policy.clone(),
                    func,
                    Arc::clone(&self.notices),
                ));
            }
            if let Some(attached) = rules.remove(&entry.name) {
                func = NativeFn::new(NoticeEmitter::new(
                    entry.name.as_str(),
                    attached,
                    func,
                    Arc::clone(&self.notices),
                ));
            }

            let mode = InvokeMode::for_name(&entry.canonical, &self.strict_prefix);
            let safe = SafeFn::new(entry.name.as_str(), entry.canonical, mode, func);
            entries.insert(entry.name, safe);
        }

        log::debug!(
            "built function map: {} entries from {} registries",
            entries.len(),
            self.registries.len()
        );
        Ok(FuncMap::new(entries, Arc::clone(&self.notices)))
    }

    /// Check if [`build`](Handler::build) has been called.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// The shared notice log.
    pub fn notices(&self) -> Arc<NoticeLog> {
        Arc::clone(&self.notices)
    }

    /// Services handed to registries when they are linked.
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Uids of the added registries, in order.
    pub fn registry_uids(&self) -> impl Iterator<Item = &str> {
        self.registries.iter().map(|r| r.uid())
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("registries", &self.registry_uids().collect::<Vec<_>>())
            .field("functions", &self.funcs.len())
            .field("strict_prefix", &self.strict_prefix)
            .field("built", &self.built)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// HandlerBuilder
// ============================================================================

/// Configuration for a [`Handler`].
///
/// ```
/// use tmplkit::{FixedClock, Handler, Services};
///
/// let handler = Handler::builder()
///     .with_services(Services::default().with_clock(FixedClock::from_secs(0)))
///     .with_strict_prefix("must")
///     .with_default_registries()
///     .build()
///     .unwrap();
/// assert!(!handler.is_built());
/// ```
pub struct HandlerBuilder {
    services: Services,
    strict_prefix: String,
    policies: Vec<SignaturePolicy>,
    registries: Vec<Box<dyn Registry>>,
    default_registries: bool,
}

impl Default for HandlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerBuilder {
    pub fn new() -> Self {
        Self {
            services: Services::default(),
            strict_prefix: DEFAULT_STRICT_PREFIX.to_string(),
            policies: default_policies(),
            registries: Vec::new(),
            default_registries: false,
        }
    }

    /// Services injected into every registry on link.
    pub fn with_services(mut self, services: Services) -> Self {
        self.services = services;
        self
    }

    /// Canonical-name prefix selecting strict invocation.
    ///
    /// An empty prefix makes every callable strict.
    pub fn with_strict_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.strict_prefix = prefix.into();
        self
    }

    /// Add or replace the signature policy for `policy.name`.
    pub fn with_signature_policy(mut self, policy: SignaturePolicy) -> Self {
        self.policies.retain(|p| p.name != policy.name);
        self.policies.push(policy);
        self
    }

    /// Drop every signature policy, including the defaults.
    pub fn without_signature_policies(mut self) -> Self {
        self.policies.clear();
        self
    }

    /// Add the shipped registries before any added with `with_registry`.
    pub fn with_default_registries(mut self) -> Self {
        self.default_registries = true;
        self
    }

    pub fn with_registry(mut self, registry: impl Registry + 'static) -> Self {
        self.registries.push(Box::new(registry));
        self
    }

    pub fn with_registries<I>(mut self, registries: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Registry>>,
    {
        self.registries.extend(registries);
        self
    }

    fn into_handler(self) -> Handler {
        Handler {
            registries: Vec::new(),
            uids: FxHashSet::default(),
            funcs: FunctionTable::new(),
            aliases: AliasTable::new(),
            notice_rules: NoticeList::new(),
            notices: Arc::new(NoticeLog::new()),
            services: self.services,
            strict_prefix: self.strict_prefix,
            policies: self
                .policies
                .into_iter()
                .map(|p| (p.name.clone(), p))
                .collect(),
            built: false,
        }
    }

    /// Create the handler and add the configured registries.
    ///
    /// # Errors
    ///
    /// Returns the first registration error.
    pub fn build(mut self) -> Result<Handler, RegistrationError> {
        let registries = std::mem::take(&mut self.registries);
        let with_defaults = self.default_registries;
        let mut handler = self.into_handler();

        if with_defaults {
            handler.add_registries(default_registries())?;
        }
        handler.add_registries(registries)?;
        Ok(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmplkit_core::Dynamic;
    use tmplkit_registry::{AliasRegistry, NoticeRegistry};

    struct Single {
        uid: &'static str,
        name: &'static str,
    }

    impl Registry for Single {
        fn uid(&self) -> &str {
            self.uid
        }

        fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
            funcs.add(self.name, |_| Ok(Dynamic::Int(1)))
        }
    }

    struct BadAlias;

    impl Registry for BadAlias {
        fn uid(&self) -> &str {
            "bad-alias"
        }

        fn register_functions(&self, _funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
            Ok(())
        }

        fn as_alias_registry(&self) -> Option<&dyn AliasRegistry> {
            Some(self)
        }
    }

    impl AliasRegistry for BadAlias {
        fn register_aliases(&self, aliases: &mut AliasTable) -> Result<(), RegistrationError> {
            aliases.add("nothing", ["nada"]);
            Ok(())
        }
    }

    struct BadNotice;

    impl Registry for BadNotice {
        fn uid(&self) -> &str {
            "bad-notice"
        }

        fn register_functions(&self, _funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
            Ok(())
        }

        fn as_notice_registry(&self) -> Option<&dyn NoticeRegistry> {
            Some(self)
        }
    }

    impl NoticeRegistry for BadNotice {
        fn register_notices(&self, notices: &mut NoticeList) -> Result<(), RegistrationError> {
            notices.info("ghost", "never registered");
            Ok(())
        }
    }

    /// Adds `extra`, then clashes on `one`, with aliases and notices queued.
    struct HalfRegistered;

    impl Registry for HalfRegistered {
        fn uid(&self) -> &str {
            "half"
        }

        fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
            funcs.add("extra", |_| Ok(Dynamic::Null))?;
            funcs.add("one", |_| Ok(Dynamic::Null))
        }
    }

    struct LateFailure;

    impl Registry for LateFailure {
        fn uid(&self) -> &str {
            "late"
        }

        fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
            funcs.add("late", |_| Ok(Dynamic::Null))
        }

        fn as_alias_registry(&self) -> Option<&dyn AliasRegistry> {
            Some(self)
        }

        fn as_notice_registry(&self) -> Option<&dyn NoticeRegistry> {
            Some(self)
        }
    }

    impl AliasRegistry for LateFailure {
        fn register_aliases(&self, aliases: &mut AliasTable) -> Result<(), RegistrationError> {
            aliases.add("late", ["tardy"]);
            Ok(())
        }
    }

    impl NoticeRegistry for LateFailure {
        fn register_notices(&self, notices: &mut NoticeList) -> Result<(), RegistrationError> {
            notices.info("late", "queued");
            Err(RegistrationError::UnknownNoticeSubject {
                registry: "late".into(),
                subject: "nowhere".into(),
            })
        }
    }

    fn single(uid: &'static str, name: &'static str) -> Box<dyn Registry> {
        Box::new(Single { uid, name })
    }

    #[test]
    fn duplicate_uid_rejected() {
        let mut handler = Handler::new();
        handler.add_registry(single("a", "one")).unwrap();
        let err = handler.add_registry(single("a", "two")).unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateRegistry { uid: "a".into() });
    }

    #[test]
    fn duplicate_function_names_both_registries() {
        let mut handler = Handler::new();
        let err = handler
            .add_registries(vec![single("a", "one"), single("b", "one")])
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateFunction {
                name: "one".into(),
                registry: "b".into(),
                existing: "a".into(),
            }
        );
    }

    #[test]
    fn failed_registry_is_rolled_back() {
        let mut handler = Handler::new();
        handler.add_registry(single("a", "one")).unwrap();
        let err = handler.add_registry(Box::new(HalfRegistered)).unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateFunction { ref registry, .. } if registry == "half"));
        assert_eq!(handler.registry_uids().collect::<Vec<_>>(), vec!["a"]);

        // The uid is free again.
        handler.add_registry(single("half", "two")).unwrap();

        let funcs = handler.build().unwrap();
        assert!(!funcs.contains("extra"));
        assert!(funcs.contains("one"));
        assert!(funcs.contains("two"));
    }

    #[test]
    fn late_failure_drops_aliases_and_notices() {
        let mut handler = Handler::new();
        handler.add_registry(single("a", "one")).unwrap();
        assert!(handler.add_registry(Box::new(LateFailure)).is_err());

        let funcs = handler.build().unwrap();
        assert_eq!(funcs.names(), vec!["one"]);
        assert!(funcs.notices().is_empty());
    }

    #[test]
    fn unknown_alias_target_fails_build() {
        let mut handler = Handler::new();
        handler.add_registry(Box::new(BadAlias)).unwrap();
        let err = handler.build().unwrap_err();
        assert!(matches!(err, RegistrationError::UnknownAliasTarget { ref alias, .. } if alias == "nada"));
        assert_eq!(err.registry(), Some("bad-alias"));
    }

    #[test]
    fn unknown_notice_subject_fails_build() {
        let mut handler = Handler::new();
        handler.add_registry(Box::new(BadNotice)).unwrap();
        let err = handler.build().unwrap_err();
        assert_eq!(
            err,
            RegistrationError::UnknownNoticeSubject {
                registry: "bad-notice".into(),
                subject: "ghost".into(),
            }
        );
    }

    #[test]
    fn build_is_terminal() {
        let mut handler = Handler::new();
        handler.add_registry(single("a", "one")).unwrap();
        let funcs = handler.build().unwrap();
        assert_eq!(funcs.len(), 1);
        assert!(handler.is_built());

        assert_eq!(handler.build().unwrap_err(), RegistrationError::AlreadyBuilt);
        assert_eq!(
            handler.add_registry(single("b", "two")).unwrap_err(),
            RegistrationError::AlreadyBuilt
        );
    }

    #[test]
    fn builder_registers_defaults_then_custom() {
        let handler = Handler::builder()
            .with_default_registries()
            .with_registry(Single { uid: "custom", name: "custom" })
            .build()
            .unwrap();
        let uids: Vec<&str> = handler.registry_uids().collect();
        assert_eq!(uids.first(), Some(&"strings"));
        assert_eq!(uids.last(), Some(&"custom"));
    }

    #[test]
    fn builder_rejects_default_collisions() {
        let err = Handler::builder()
            .with_default_registries()
            .with_registry(Single { uid: "mine", name: "upper" })
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateFunction { ref existing, .. } if existing == "strings"));
    }
}
