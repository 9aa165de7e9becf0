//! FunctionTable - the mutable name → callable table filled during registration.
//!
//! # Storage Model
//!
//! - One [`FunctionEntry`] per name. A name is never rebound: a second
//!   registration of the same name is a [`RegistrationError::DuplicateFunction`]
//!   naming both the new and the owning registry.
//! - Each entry records its canonical name. For directly registered
//!   functions this is the name itself; alias entries point at the
//!   function they were copied from.
//!
//! # Thread Safety
//!
//! `FunctionTable` is **not thread-safe** by design. It is filled on a
//! single thread during startup and then consumed by the handler, which
//! freezes it into an immutable, shareable map.

use rustc_hash::FxHashMap;

use tmplkit_core::{CallArgs, Dynamic, NativeError, NativeFn, RegistrationError};

/// A single binding in the table.
#[derive(Debug, Clone)]
pub struct FunctionEntry {
    /// Name the engine looks the function up by.
    pub name: String,
    /// Name of the function this binding implements.
    pub canonical: String,
    /// Registry that contributed the binding.
    pub registry: String,
    /// The callable.
    pub func: NativeFn,
}

impl FunctionEntry {
    /// Check if this entry was produced by alias expansion.
    pub fn is_alias(&self) -> bool {
        self.name != self.canonical
    }
}

/// Name → callable table shared by all registries during registration.
#[derive(Debug, Default)]
pub struct FunctionTable {
    entries: FxHashMap<String, FunctionEntry>,
    /// Registry currently registering (set by the handler).
    current: String,
}

impl FunctionTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute subsequent registrations to `uid`.
    pub fn set_registry(&mut self, uid: &str) {
        self.current.clear();
        self.current.push_str(uid);
    }

    /// Registry currently registering.
    pub fn current_registry(&self) -> &str {
        &self.current
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a closure under `name`.
    pub fn add<F>(&mut self, name: &str, f: F) -> Result<(), RegistrationError>
    where
        F: Fn(&CallArgs<'_>) -> Result<Dynamic, NativeError> + Send + Sync + 'static,
    {
        self.add_native(name, NativeFn::from_fn(f))
    }

    /// Register an already type-erased callable under `name`.
    pub fn add_native(&mut self, name: &str, func: NativeFn) -> Result<(), RegistrationError> {
        let registry = self.current.clone();
        self.insert(FunctionEntry {
            name: name.to_string(),
            canonical: name.to_string(),
            registry,
            func,
        })
    }

    /// Bind `alias` to the callable registered as `canonical`.
    ///
    /// The alias is attributed to `registry` (the registry that declared
    /// it). Aliases are never resolved through other aliases: `canonical`
    /// must be a directly registered name.
    pub fn insert_alias(
        &mut self,
        alias: &str,
        canonical: &str,
        registry: &str,
    ) -> Result<(), RegistrationError> {
        let func = match self.entries.get(canonical) {
            Some(entry) if !entry.is_alias() => entry.func.clone(),
            _ => {
                return Err(RegistrationError::UnknownAliasTarget {
                    registry: registry.to_string(),
                    canonical: canonical.to_string(),
                    alias: alias.to_string(),
                });
            }
        };

        self.insert(FunctionEntry {
            name: alias.to_string(),
            canonical: canonical.to_string(),
            registry: registry.to_string(),
            func,
        })
    }

    fn insert(&mut self, entry: FunctionEntry) -> Result<(), RegistrationError> {
        if let Some(existing) = self.entries.get(&entry.name) {
            return Err(RegistrationError::DuplicateFunction {
                name: entry.name,
                registry: entry.registry,
                existing: existing.registry.clone(),
            });
        }
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    /// Drop every entry contributed by `uid`, returning how many were removed.
    pub fn remove_registry(&mut self, uid: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.registry != uid);
        before - self.entries.len()
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Get an entry by name.
    pub fn get(&self, name: &str) -> Option<&FunctionEntry> {
        self.entries.get(name)
    }

    /// Check if a name is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over bound names (unordered).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over entries (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &FunctionEntry> {
        self.entries.values()
    }

    /// Iterate mutably over entries, for wrapping passes.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FunctionEntry> {
        self.entries.values_mut()
    }

    /// Consume the table, yielding its entries.
    pub fn into_entries(self) -> impl Iterator<Item = FunctionEntry> {
        self.entries.into_values()
    }
}
