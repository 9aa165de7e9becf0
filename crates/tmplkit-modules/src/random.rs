//! Random values from the injected [`Entropy`] source.
//!
//! These are not suitable for secrets.

use std::sync::Arc;

use crate::check_generated_len;
use tmplkit_registry::{
    CallArgs, Dynamic, Entropy, FunctionTable, HandlerLink, NativeError, RegistrationError,
    Registry, SeededEntropy,
};

const ALPHA: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const NUMERIC: &[u8] = b"0123456789";
const ALPHANUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Printable ASCII, space through tilde.
fn ascii_charset() -> Vec<u8> {
    (b' '..=b'~').collect()
}

/// `count` characters drawn uniformly from `charset`.
pub fn random_string(entropy: &dyn Entropy, charset: &[u8], count: usize) -> String {
    (0..count)
        .map(|_| char::from(charset[entropy.below(charset.len() as u64) as usize]))
        .collect()
}

/// Integer in `[min, max)`.
pub fn random_int(entropy: &dyn Entropy, min: i64, max: i64) -> Result<i64, NativeError> {
    if min >= max {
        return Err(NativeError::other(format!(
            "randInt: empty range [{}, {})",
            min, max
        )));
    }
    let span = max.abs_diff(min);
    Ok(min.wrapping_add(entropy.below(span) as i64))
}

pub struct RandomRegistry {
    entropy: Arc<dyn Entropy>,
}

impl RandomRegistry {
    pub fn new() -> Self {
        Self {
            entropy: Arc::new(SeededEntropy::from_system()),
        }
    }
}

impl Default for RandomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomRegistry {
    fn add_string_fn(
        &self,
        funcs: &mut FunctionTable,
        name: &str,
        charset: Vec<u8>,
    ) -> Result<(), RegistrationError> {
        let entropy = Arc::clone(&self.entropy);
        funcs.add(name, move |args: &CallArgs<'_>| {
            args.expect_count(1)?;
            let count: usize = args.arg(0)?;
            let count = check_generated_len("random string", Some(count))?;
            Ok(Dynamic::from(random_string(entropy.as_ref(), &charset, count)))
        })
    }
}

impl Registry for RandomRegistry {
    fn uid(&self) -> &str {
        "random"
    }

    fn link_handler(&mut self, link: &HandlerLink<'_>) -> Result<(), RegistrationError> {
        self.entropy = Arc::clone(&link.services().entropy);
        Ok(())
    }

    fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
        let entropy = Arc::clone(&self.entropy);
        funcs.add("randInt", move |args: &CallArgs<'_>| {
            args.expect_count(2)?;
            let min: i64 = args.arg(0)?;
            let max: i64 = args.arg(1)?;
            random_int(entropy.as_ref(), min, max).map(Dynamic::Int)
        })?;

        self.add_string_fn(funcs, "randAlpha", ALPHA.to_vec())?;
        self.add_string_fn(funcs, "randNumeric", NUMERIC.to_vec())?;
        self.add_string_fn(funcs, "randAlphaNum", ALPHANUM.to_vec())?;
        self.add_string_fn(funcs, "randAscii", ascii_charset())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmplkit_registry::Services;

    fn seeded_table(seed: u64) -> FunctionTable {
        let services = Services::default().with_entropy(SeededEntropy::new(seed));
        let mut registry = RandomRegistry::new();
        registry.link_handler(&HandlerLink::new(&services)).unwrap();
        let mut funcs = FunctionTable::new();
        registry.register_functions(&mut funcs).unwrap();
        funcs
    }

    #[test]
    fn test_rand_int_range() {
        let entropy = SeededEntropy::new(3);
        for _ in 0..200 {
            let v = random_int(&entropy, -5, 5).unwrap();
            assert!((-5..5).contains(&v));
        }
        assert!(random_int(&entropy, 5, 5).is_err());
        assert!(random_int(&entropy, i64::MIN, i64::MAX).is_ok());
    }

    #[test]
    fn test_charsets() {
        let funcs = seeded_table(9);
        let run = |name: &str| {
            funcs.get(name).unwrap().func.call_slice(&[32.into()]).unwrap()
        };

        let alpha = run("randAlpha");
        assert!(alpha.as_str().unwrap().chars().all(|c| c.is_ascii_alphabetic()));
        let digits = run("randNumeric");
        assert!(digits.as_str().unwrap().chars().all(|c| c.is_ascii_digit()));
        let ascii = run("randAscii");
        assert_eq!(ascii.as_str().unwrap().len(), 32);
        assert!(ascii.as_str().unwrap().chars().all(|c| (' '..='~').contains(&c)));
    }

    #[test]
    fn test_same_seed_same_output() {
        let a = seeded_table(42);
        let b = seeded_table(42);
        let args = [Dynamic::Int(16)];
        assert_eq!(
            a.get("randAlphaNum").unwrap().func.call_slice(&args).unwrap(),
            b.get("randAlphaNum").unwrap().func.call_slice(&args).unwrap()
        );
    }

    #[test]
    fn test_oversized_length_rejected() {
        let funcs = seeded_table(1);
        let huge = Dynamic::Int(1i64 << 40);
        for name in ["randAlpha", "randNumeric", "randAlphaNum", "randAscii"] {
            let err = funcs.get(name).unwrap().func.call_slice(&[huge.clone()]).unwrap_err();
            assert!(err.to_string().contains("output exceeds"), "{}", name);
        }
    }

    #[test]
    fn test_negative_length_rejected() {
        let funcs = seeded_table(1);
        let out = funcs.get("randAlpha").unwrap().func.call_slice(&[(-1).into()]);
        assert!(out.is_err());
    }
}
