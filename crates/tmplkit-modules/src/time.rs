//! Wall-clock access through the injected [`Clock`].

use std::sync::Arc;

use tmplkit_registry::{
    CallArgs, Clock, Dynamic, FunctionTable, HandlerLink, NativeError, RegistrationError, Registry,
    SystemClock,
};

pub struct TimeRegistry {
    clock: Arc<dyn Clock>,
}

impl TimeRegistry {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
        }
    }
}

impl Default for TimeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn secs(clock: &dyn Clock) -> Result<i64, NativeError> {
    i64::try_from(clock.now().as_secs()).map_err(|_| NativeError::other("clock out of range"))
}

impl Registry for TimeRegistry {
    fn uid(&self) -> &str {
        "time"
    }

    fn link_handler(&mut self, link: &HandlerLink<'_>) -> Result<(), RegistrationError> {
        self.clock = Arc::clone(&link.services().clock);
        Ok(())
    }

    fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
        // Seconds since the epoch.
        let clock = Arc::clone(&self.clock);
        funcs.add("now", move |args: &CallArgs<'_>| {
            args.expect_count(0)?;
            secs(clock.as_ref()).map(Dynamic::Int)
        })?;

        let clock = Arc::clone(&self.clock);
        funcs.add("unixEpoch", move |args: &CallArgs<'_>| {
            args.expect_count(0)?;
            Ok(Dynamic::from(secs(clock.as_ref())?.to_string()))
        })?;

        let clock = Arc::clone(&self.clock);
        funcs.add("nowNano", move |args: &CallArgs<'_>| {
            args.expect_count(0)?;
            i64::try_from(clock.now().as_nanos())
                .map(Dynamic::Int)
                .map_err(|_| NativeError::other("clock out of range"))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tmplkit_registry::{FixedClock, Services};

    #[test]
    fn test_fixed_clock() {
        let services =
            Services::default().with_clock(FixedClock(Duration::new(1_700_000_000, 250)));
        let mut registry = TimeRegistry::new();
        registry.link_handler(&HandlerLink::new(&services)).unwrap();

        let mut funcs = FunctionTable::new();
        registry.register_functions(&mut funcs).unwrap();

        let call = |name: &str| funcs.get(name).unwrap().func.call_slice(&[]).unwrap();
        assert_eq!(call("now"), Dynamic::Int(1_700_000_000));
        assert_eq!(call("unixEpoch"), Dynamic::from("1700000000"));
        assert_eq!(call("nowNano"), Dynamic::Int(1_700_000_000_000_000_250));
        assert!(funcs.get("now").unwrap().func.call_slice(&[1.into()]).is_err());
    }
}
