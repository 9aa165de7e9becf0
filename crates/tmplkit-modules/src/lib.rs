//! Standard capability modules for tmplkit.
//!
//! Each module exposes a registry that contributes its callables to a
//! handler:
//!
//! - **strings** - case, trimming, searching and splitting
//! - **numeric** - integer/float arithmetic and rounding
//! - **slices** - list construction and manipulation
//! - **maps** - dictionary construction and lookup
//! - **conversion** - coercing `to*` conversions
//! - **encoding** - JSON encode/decode
//! - **checksum** - xxHash digests
//! - **env** - environment variables (non-hermetic)
//! - **time** - wall clock (non-hermetic)
//! - **random** - random strings and integers (non-hermetic)
//! - **network** - DNS lookups (non-hermetic)
//! - **legacy** - deprecated alternate names
//!
//! # Usage
//!
//! ```ignore
//! use tmplkit::Handler;
//! use tmplkit_modules::default_registries;
//!
//! let mut handler = Handler::new();
//! handler.add_registries(default_registries())?;
//! let funcs = handler.build()?;
//! ```

pub mod checksum;
pub mod conversion;
pub mod encoding;
pub mod env;
pub mod legacy;
pub mod maps;
pub mod network;
pub mod numeric;
pub mod random;
pub mod slices;
pub mod strings;
pub mod time;

pub use checksum::ChecksumRegistry;
pub use conversion::ConversionRegistry;
pub use encoding::EncodingRegistry;
pub use env::EnvRegistry;
pub use legacy::LegacyRegistry;
pub use maps::MapsRegistry;
pub use network::NetworkRegistry;
pub use numeric::NumericRegistry;
pub use random::RandomRegistry;
pub use slices::SlicesRegistry;
pub use strings::StringsRegistry;
pub use time::TimeRegistry;

use tmplkit_registry::{NativeError, Registry};

/// Largest string, in bytes, a function may generate from a size argument.
///
/// Allocation failure aborts the process rather than unwinding, so sizes
/// are checked before allocating.
pub const MAX_GENERATED_LEN: usize = 16 * 1024 * 1024;

/// Check a requested output size; `None` means the size overflowed.
pub(crate) fn check_generated_len(func: &str, len: Option<usize>) -> Result<usize, NativeError> {
    match len {
        Some(len) if len <= MAX_GENERATED_LEN => Ok(len),
        _ => Err(NativeError::other(format!(
            "{}: output exceeds {} bytes",
            func, MAX_GENERATED_LEN
        ))),
    }
}

/// Every shipped registry, in registration order.
///
/// `legacy` comes last because its aliases point into the others.
pub fn default_registries() -> Vec<Box<dyn Registry>> {
    vec![
        Box::new(StringsRegistry::new()),
        Box::new(NumericRegistry::new()),
        Box::new(SlicesRegistry::new()),
        Box::new(MapsRegistry::new()),
        Box::new(ConversionRegistry::new()),
        Box::new(EncodingRegistry::new()),
        Box::new(ChecksumRegistry::new()),
        Box::new(EnvRegistry::new()),
        Box::new(TimeRegistry::new()),
        Box::new(RandomRegistry::new()),
        Box::new(NetworkRegistry::new()),
        Box::new(LegacyRegistry::new()),
    ]
}
