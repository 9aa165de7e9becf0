//! Capability module contract.
//!
//! Every registry implements [`Registry`]. Alias and notice support are
//! optional capabilities: a registry that has aliases overrides
//! [`Registry::as_alias_registry`] to return itself, everything else keeps
//! the `None` default. Absence of a capability is never an error.
//!
//! # Example
//!
//! ```
//! use tmplkit_registry::{Dynamic, FunctionTable, Registry, RegistrationError};
//!
//! struct Greeter;
//!
//! impl Registry for Greeter {
//!     fn uid(&self) -> &str {
//!         "greeter"
//!     }
//!
//!     fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
//!         funcs.add("hello", |_args| Ok(Dynamic::from("hello")))?;
//!         Ok(())
//!     }
//! }
//! ```

use crate::alias::AliasTable;
use crate::function_table::FunctionTable;
use crate::notice::NoticeList;
use crate::services::Services;
use tmplkit_core::RegistrationError;

/// Non-owning back-reference a registry receives when it is linked.
///
/// The link only lives for the duration of registration. Registries may
/// copy individual services out of it; they never hold on to the handler.
#[derive(Debug, Clone, Copy)]
pub struct HandlerLink<'h> {
    services: &'h Services,
}

impl<'h> HandlerLink<'h> {
    /// Create a link over the handler's services.
    pub fn new(services: &'h Services) -> Self {
        Self { services }
    }

    /// Shared services injected into the handler.
    pub fn services(&self) -> &'h Services {
        self.services
    }
}

/// A capability module contributing named callables.
pub trait Registry {
    /// Stable, unique identifier. Two registries with the same uid cannot
    /// be added to one handler.
    fn uid(&self) -> &str;

    /// Receive the handler link. Must not do heavy work.
    fn link_handler(&mut self, link: &HandlerLink<'_>) -> Result<(), RegistrationError> {
        let _ = link;
        Ok(())
    }

    /// Add this registry's callables to the shared table.
    fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError>;

    /// Capability query for alias registration.
    fn as_alias_registry(&self) -> Option<&dyn AliasRegistry> {
        None
    }

    /// Capability query for notice registration.
    fn as_notice_registry(&self) -> Option<&dyn NoticeRegistry> {
        None
    }
}

/// Optional capability: alternate names for existing callables.
pub trait AliasRegistry {
    /// Map canonical names to their aliases.
    fn register_aliases(&self, aliases: &mut AliasTable) -> Result<(), RegistrationError>;
}

/// Optional capability: advisory notices attached to callables.
pub trait NoticeRegistry {
    /// Attach notices to callable names.
    fn register_notices(&self, notices: &mut NoticeList) -> Result<(), RegistrationError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;
    use tmplkit_core::Dynamic;

    struct Plain;

    impl Registry for Plain {
        fn uid(&self) -> &str {
            "plain"
        }

        fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
            funcs.add("one", |_| Ok(Dynamic::Int(1)))
        }
    }

    struct Full;

    impl Registry for Full {
        fn uid(&self) -> &str {
            "full"
        }

        fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
            funcs.add("two", |_| Ok(Dynamic::Int(2)))
        }

        fn as_alias_registry(&self) -> Option<&dyn AliasRegistry> {
            Some(self)
        }

        fn as_notice_registry(&self) -> Option<&dyn NoticeRegistry> {
            Some(self)
        }
    }

    impl AliasRegistry for Full {
        fn register_aliases(&self, aliases: &mut AliasTable) -> Result<(), RegistrationError> {
            aliases.add("two", ["deux"]);
            Ok(())
        }
    }

    impl NoticeRegistry for Full {
        fn register_notices(&self, notices: &mut NoticeList) -> Result<(), RegistrationError> {
            notices.info("two", "two is even");
            Ok(())
        }
    }

    #[test]
    fn capabilities_default_to_none() {
        let plain = Plain;
        assert!(plain.as_alias_registry().is_none());
        assert!(plain.as_notice_registry().is_none());
    }

    #[test]
    fn capabilities_are_discoverable() {
        let full = Full;

        let mut aliases = AliasTable::new();
        aliases.set_registry(full.uid());
        full.as_alias_registry()
            .unwrap()
            .register_aliases(&mut aliases)
            .unwrap();
        assert_eq!(aliases.len(), 1);

        let mut notices = NoticeList::new();
        full.as_notice_registry()
            .unwrap()
            .register_notices(&mut notices)
            .unwrap();
        assert_eq!(notices.iter().next().unwrap().severity, Severity::Info);
    }

    #[test]
    fn default_link_is_a_no_op() {
        let services = Services::default();
        let mut plain = Plain;
        assert!(plain.link_handler(&HandlerLink::new(&services)).is_ok());
    }
}
