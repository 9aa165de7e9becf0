//! Names excluded from the hermetic view.
//!
//! A callable is non-hermetic when its result depends on more than its
//! arguments: wall-clock time, randomness, environment variables or DNS.
//! Aliases of such callables are listed explicitly.

/// Every shipped callable name whose result is not repeatable.
pub const NON_HERMETIC: &[&str] = &[
    // env
    "env",
    "expandenv",
    "expandEnv",
    // time
    "now",
    "unixEpoch",
    "nowNano",
    // random
    "randInt",
    "randAlpha",
    "randNumeric",
    "randAlphaNum",
    "randAscii",
    // network
    "getHostByName",
];

/// Check if `name` is safe for deterministic evaluation.
pub fn is_hermetic(name: &str) -> bool {
    !NON_HERMETIC.contains(&name)
}
