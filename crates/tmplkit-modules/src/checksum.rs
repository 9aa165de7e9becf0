//! Non-cryptographic checksums (`xxhash-rust`), rendered as lowercase hex.

use tmplkit_registry::{CallArgs, Dynamic, FunctionTable, NativeError, RegistrationError, Registry};
use xxhash_rust::xxh3::xxh3_64;
use xxhash_rust::xxh64::xxh64;

pub fn xxh64sum(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let input: String = args.arg(0)?;
    Ok(format!("{:016x}", xxh64(input.as_bytes(), 0)).into())
}

pub fn xxh3sum(args: &CallArgs<'_>) -> Result<Dynamic, NativeError> {
    args.expect_count(1)?;
    let input: String = args.arg(0)?;
    Ok(format!("{:016x}", xxh3_64(input.as_bytes())).into())
}

#[derive(Debug, Default)]
pub struct ChecksumRegistry;

impl ChecksumRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl Registry for ChecksumRegistry {
    fn uid(&self) -> &str {
        "checksum"
    }

    fn register_functions(&self, funcs: &mut FunctionTable) -> Result<(), RegistrationError> {
        funcs.add("xxh64sum", xxh64sum)?;
        funcs.add("xxh3sum", xxh3sum)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_empty_digests() {
        let empty = [Dynamic::from("")];
        let args = CallArgs::new(&empty);
        assert_eq!(xxh64sum(&args).unwrap(), Dynamic::from("ef46db3751d8e999"));
        assert_eq!(xxh3sum(&args).unwrap(), Dynamic::from("2d06800538d394c2"));
    }

    #[test]
    fn test_fixed_width_and_deterministic() {
        let input = [Dynamic::from("tmplkit")];
        let args = CallArgs::new(&input);
        let a = xxh64sum(&args).unwrap();
        assert_eq!(a.as_str().map(str::len), Some(16));
        assert_eq!(a, xxh64sum(&args).unwrap());
        assert!(xxh64sum(&CallArgs::new(&[Dynamic::Int(1)])).is_err());
    }
}
