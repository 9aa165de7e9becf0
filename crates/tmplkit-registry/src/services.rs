//! Injectable sources for non-hermetic callables.
//!
//! Time, randomness, environment variables and DNS are the only things
//! that make a callable's result depend on more than its arguments. They
//! are modelled as traits and handed to registries through the
//! [`HandlerLink`](crate::HandlerLink), so tests and deterministic hosts can
//! swap in [`FixedClock`], [`SeededEntropy`], [`MapEnvironment`] and
//! [`StaticResolver`].

use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hasher};
use std::io;
use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rustc_hash::FxHashMap;

/// Wall-clock source.
pub trait Clock: Send + Sync {
    /// Time elapsed since the Unix epoch.
    fn now(&self) -> Duration;
}

/// Pseudo-random source.
pub trait Entropy: Send + Sync {
    /// Next 64 random bits.
    fn next_u64(&self) -> u64;

    /// Uniform value in `[0, bound)`. Returns 0 when `bound` is 0.
    fn below(&self, bound: u64) -> u64 {
        if bound == 0 { 0 } else { self.next_u64() % bound }
    }
}

/// Environment variable source.
pub trait Environment: Send + Sync {
    /// Value of `key`, if set.
    fn var(&self, key: &str) -> Option<String>;
}

/// Host name resolution.
pub trait Resolver: Send + Sync {
    /// Addresses for `host`, rendered as strings.
    fn lookup_host(&self, host: &str) -> io::Result<Vec<String>>;
}

// ============================================================================
// System implementations
// ============================================================================

/// [`Clock`] backed by `SystemTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        // Clocks set before 1970 report the epoch itself.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

/// [`Environment`] backed by the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// [`Resolver`] backed by the system resolver.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn lookup_host(&self, host: &str) -> io::Result<Vec<String>> {
        Ok((host, 0)
            .to_socket_addrs()?
            .map(|addr| addr.ip().to_string())
            .collect())
    }
}

/// SplitMix64 generator behind an atomic counter.
///
/// Lock-free, so concurrent template evaluations can share one instance.
#[derive(Debug)]
pub struct SeededEntropy {
    state: AtomicU64,
}

impl SeededEntropy {
    const GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

    /// Deterministic generator starting from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            state: AtomicU64::new(seed),
        }
    }

    /// Generator seeded from the process hasher keys and the clock.
    pub fn from_system() -> Self {
        let mut hasher = RandomState::new().build_hasher();
        hasher.write_u128(SystemClock.now().as_nanos());
        Self::new(hasher.finish())
    }
}

impl Entropy for SeededEntropy {
    fn next_u64(&self) -> u64 {
        let mut z = self
            .state
            .fetch_add(Self::GAMMA, Ordering::Relaxed)
            .wrapping_add(Self::GAMMA);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

// ============================================================================
// Fixed implementations
// ============================================================================

/// [`Clock`] that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Duration);

impl FixedClock {
    /// Clock frozen at `secs` seconds after the epoch.
    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Duration {
        self.0
    }
}

/// [`Environment`] backed by a fixed map.
#[derive(Debug, Default, Clone)]
pub struct MapEnvironment {
    vars: FxHashMap<String, String>,
}

impl MapEnvironment {
    /// Empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }
}

impl Environment for MapEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// [`Resolver`] backed by a fixed host table.
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    hosts: FxHashMap<String, Vec<String>>,
}

impl StaticResolver {
    /// Empty host table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, host: &str, addrs: &[&str]) -> Self {
        self.hosts.insert(
            host.to_string(),
            addrs.iter().map(|a| (*a).to_string()).collect(),
        );
        self
    }
}

impl Resolver for StaticResolver {
    fn lookup_host(&self, host: &str) -> io::Result<Vec<String>> {
        self.hosts.get(host).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("unknown host '{}'", host))
        })
    }
}

// ============================================================================
// Services bundle
// ============================================================================

/// Every injectable source, shared by the handler and its registries.
#[derive(Clone)]
pub struct Services {
    pub clock: Arc<dyn Clock>,
    pub entropy: Arc<dyn Entropy>,
    pub env: Arc<dyn Environment>,
    pub resolver: Arc<dyn Resolver>,
}

impl Services {
    /// System-backed services.
    pub fn system() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            entropy: Arc::new(SeededEntropy::from_system()),
            env: Arc::new(ProcessEnvironment),
            resolver: Arc::new(SystemResolver),
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the entropy source.
    pub fn with_entropy(mut self, entropy: impl Entropy + 'static) -> Self {
        self.entropy = Arc::new(entropy);
        self
    }

    /// Replace the environment.
    pub fn with_env(mut self, env: impl Environment + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Replace the resolver.
    pub fn with_resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
