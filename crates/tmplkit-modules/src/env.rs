//! Environment variable access through the injected [`Environment`].

use std::sync::Arc;

use tmplkit_registry::{
    CallArgs, Dynamic, Environment, FunctionTable, HandlerLink, NativeError, ProcessEnvironment,
    RegistrationError, Registry,
};

/// Expand `$VAR` and `${VAR}` references. Unset variables expand to "".
///
/// A `$` not followed by a name or `{` is kept literally, as is an
/// unterminated `${`.
pub fn expand(input: &str, env: &dyn Environment) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => {
                    out.push_str(&env.var(&braced[..end]).unwrap_or_default());
                    rest = &braced[end + 1..];
                }
                None => {
                    out.push_str(&rest[pos..]);
                    rest = "";
                }
            }
            continue;
        }

        let len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if len == 0 {
            out.push('$');
        } else {
            out.push_str(&env.var(&after[..len]).unwrap_or_default());
        }
        rest = &after[len..];
    }

    out.push_str(rest);
    out
}

/// Environment registry.
///
/// Starts out reading the process environment; linking to a handler
/// replaces that with the handler's injected environment.
pub struct EnvRegistry {
    env: Arc<dyn Environment>,
}

impl EnvRegistry {
    pub fn new() -> Self {
        Self {
            env: Arc::new(ProcessEnvironment),
        }
    }
}

impl Default for EnvRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry for EnvRegistry {
    fn uid(&self) -> &str {
        "env"
    }

    fn link_handler(&mut self, link: &HandlerLink<'_>) -> Result<(), RegistrationError> {
        self.env = Arc::clone(&link.services().env);
        Ok(())
    }

    fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
        let env = Arc::clone(&self.env);
        funcs.add("env", move |args: &CallArgs<'_>| {
            args.expect_count(1)?;
            let key: String = args.arg(0)?;
            Ok(Dynamic::from(env.var(&key).unwrap_or_default()))
        })?;

        let env = Arc::clone(&self.env);
        funcs.add("expandenv", move |args: &CallArgs<'_>| {
            args.expect_count(1)?;
            let input: String = args.arg(0)?;
            Ok(Dynamic::from(expand(&input, env.as_ref())))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmplkit_registry::{MapEnvironment, Services};

    fn env() -> MapEnvironment {
        MapEnvironment::new()
            .with("HOME", "/home/tmpl")
            .with("USER_NAME", "ada")
    }

    #[test]
    fn test_expand_forms() {
        let env = env();
        assert_eq!(expand("$HOME/bin", &env), "/home/tmpl/bin");
        assert_eq!(expand("${USER_NAME}x", &env), "adax");
        assert_eq!(expand("$MISSING-", &env), "-");
        assert_eq!(expand("cost: $5 $", &env), "cost:  $");
        assert_eq!(expand("a $ b", &env), "a $ b");
        assert_eq!(expand("${HOME", &env), "${HOME");
    }

    #[test]
    fn test_link_replaces_environment() {
        let services = Services::default().with_env(env());
        let mut registry = EnvRegistry::new();
        registry.link_handler(&HandlerLink::new(&services)).unwrap();

        let mut funcs = FunctionTable::new();
        registry.register_functions(&mut funcs).unwrap();

        let entry = funcs.get("env").unwrap();
        assert_eq!(
            entry.func.call_slice(&["HOME".into()]).unwrap(),
            Dynamic::from("/home/tmpl")
        );
        assert_eq!(
            entry.func.call_slice(&["NOPE".into()]).unwrap(),
            Dynamic::from("")
        );

        let expandenv = funcs.get("expandenv").unwrap();
        assert_eq!(
            expandenv.func.call_slice(&["~$USER_NAME".into()]).unwrap(),
            Dynamic::from("~ada")
        );
    }
}
