//! Historical names kept for older templates.
//!
//! This registry contributes no functions of its own, only aliases for
//! functions the other registries own. Every alias fires a deprecation
//! notice pointing at the current name when it is called, so it must be
//! added after the registries that own the canonical names.

use tmplkit_registry::{AliasRegistry, AliasTable, FunctionTable, RegistrationError, Registry};

/// `(canonical, aliases)` pairs.
const LEGACY_ALIASES: &[(&str, &[&str])] = &[
    ("upper", &["toupper"]),
    ("lower", &["tolower"]),
    ("trimAll", &["trimall"]),
    ("expandenv", &["expandEnv"]),
    ("toInt", &["int64", "toInt64"]),
    ("toFloat", &["float64"]),
];

#[derive(Debug, Default)]
pub struct LegacyRegistry;

impl LegacyRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl Registry for LegacyRegistry {
    fn uid(&self) -> &str {
        "legacy"
    }

    fn register_functions(&self, _funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
        Ok(())
    }

    fn as_alias_registry(&self) -> Option<&dyn AliasRegistry> {
        Some(self)
    }
}

impl AliasRegistry for LegacyRegistry {
    fn register_aliases(&self, aliases: &mut AliasTable) -> Result<(), RegistrationError> {
        for (canonical, names) in LEGACY_ALIASES {
            aliases.add(canonical, names.iter().copied());
        }
        Ok(())
    }
}
