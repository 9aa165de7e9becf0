//! Host name resolution through the injected [`Resolver`].

use std::sync::Arc;

use tmplkit_registry::{
    CallArgs, Dynamic, FunctionTable, HandlerLink, NativeError, RegistrationError, Registry,
    Resolver, SystemResolver,
};

pub struct NetworkRegistry {
    resolver: Arc<dyn Resolver>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self {
            resolver: Arc::new(SystemResolver),
        }
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry for NetworkRegistry {
    fn uid(&self) -> &str {
        "network"
    }

    fn link_handler(&mut self, link: &HandlerLink<'_>) -> Result<(), RegistrationError> {
        self.resolver = Arc::clone(&link.services().resolver);
        Ok(())
    }

    fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
        // First resolved address.
        let resolver = Arc::clone(&self.resolver);
        funcs.add("getHostByName", move |args: &CallArgs<'_>| {
            args.expect_count(1)?;
            let host: String = args.arg(0)?;
            let addrs = resolver
                .lookup_host(&host)
                .map_err(|e| NativeError::other(format!("getHostByName {}: {}", host, e)))?;
            addrs
                .into_iter()
                .next()
                .map(Dynamic::String)
                .ok_or_else(|| NativeError::other(format!("getHostByName {}: no addresses", host)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmplkit_registry::{Services, StaticResolver};

    #[test]
    fn test_static_resolver() {
        let resolver = StaticResolver::new()
            .with("db.internal", &["10.0.0.7", "10.0.0.8"])
            .with("empty.internal", &[]);
        let services = Services::default().with_resolver(resolver);

        let mut registry = NetworkRegistry::new();
        registry.link_handler(&HandlerLink::new(&services)).unwrap();
        let mut funcs = FunctionTable::new();
        registry.register_functions(&mut funcs).unwrap();

        let lookup = &funcs.get("getHostByName").unwrap().func;
        assert_eq!(
            lookup.call_slice(&["db.internal".into()]).unwrap(),
            Dynamic::from("10.0.0.7")
        );
        assert!(lookup.call_slice(&["empty.internal".into()]).is_err());

        let err = lookup.call_slice(&["nowhere".into()]).unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }
}
