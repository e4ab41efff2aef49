//! engine configuration and split parameters

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// bit size of the ring the field prime is drawn from
pub const RING_SIZE: u64 = 512;

/// most custodians a single split may produce
pub const MAX_SHARES: usize = 15;

/// longest secret the codec accepts, in bytes
pub const MAX_SECRET_LEN: usize = 512;

/// default quorum of the command line tool
pub const DEFAULT_QUORUM: usize = 3;

/// default share count of the command line tool
pub const DEFAULT_SHARE_COUNT: usize = 5;

const PRIME_ATTEMPTS: usize = 64;
const PRIMALITY_ROUNDS: usize = 32;

/// tunables of the sharing engine
///
/// every key is optional when loaded from json, missing keys take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// lower bound on the prime field width in bits
    pub ring_bits: u64,
    /// upper bound on shares per split
    pub max_shares: usize,
    /// upper bound on secret length in bytes
    pub max_secret_len: usize,
    /// prime resampling bound before failing closed
    pub prime_attempts: usize,
    /// miller-rabin rounds per primality test
    pub primality_rounds: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ring_bits: RING_SIZE,
            max_shares: MAX_SHARES,
            max_secret_len: MAX_SECRET_LEN,
            prime_attempts: PRIME_ATTEMPTS,
            primality_rounds: PRIMALITY_ROUNDS,
        }
    }
}

impl Config {
    /// a config may only tighten the built-in limits, never widen them
    pub fn validate(&self) -> Result<()> {
        if self.ring_bits < RING_SIZE {
            return Err(Error::invalid(format!(
                "ring of {} bits is below the {}-bit minimum",
                self.ring_bits, RING_SIZE
            )));
        }
        if self.max_shares == 0 || self.max_shares > MAX_SHARES {
            return Err(Error::invalid(format!(
                "max_shares {} outside 1..={}",
                self.max_shares, MAX_SHARES
            )));
        }
        if self.max_secret_len == 0 || self.max_secret_len > MAX_SECRET_LEN {
            return Err(Error::invalid(format!(
                "max_secret_len {} outside 1..={}",
                self.max_secret_len, MAX_SECRET_LEN
            )));
        }
        if self.prime_attempts == 0 || self.primality_rounds == 0 {
            return Err(Error::invalid(
                "prime_attempts and primality_rounds must be at least 1",
            ));
        }
        Ok(())
    }

    /// load a json config file, validating it
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

/// quorum (t) and share count (n) of one split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub quorum: usize,
    pub share_count: usize,
}

impl Params {
    /// check 1 <= t <= n <= max_shares
    pub fn new(quorum: usize, share_count: usize, config: &Config) -> Result<Self> {
        if quorum == 0 {
            return Err(Error::invalid("quorum must be at least 1"));
        }
        if quorum > share_count {
            return Err(Error::invalid(format!(
                "quorum {} exceeds share count {}",
                quorum, share_count
            )));
        }
        if share_count > config.max_shares {
            return Err(Error::invalid(format!(
                "share count {} exceeds maximum {}",
                share_count, config.max_shares
            )));
        }
        Ok(Self {
            quorum,
            share_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_ring() {
        let config = Config::default();
        assert_eq!(config.ring_bits, 512);
        assert_eq!(config.max_shares, 15);
        assert_eq!(config.max_secret_len, 512);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = Config::from_json(r#"{ "max_shares": 7 }"#).unwrap();
        assert_eq!(config.max_shares, 7);
        assert_eq!(config.ring_bits, RING_SIZE);
    }

    #[test]
    fn test_json_rejects_bad_values() {
        assert!(matches!(
            Config::from_json(r#"{ "ring_bits": 8 }"#),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(Config::from_json("not json"), Err(Error::Format(_))));
    }

    #[test]
    fn test_json_cannot_widen_limits() {
        for text in [
            r#"{ "max_shares": 16 }"#,
            r#"{ "max_shares": 0 }"#,
            r#"{ "max_secret_len": 513 }"#,
            r#"{ "max_secret_len": 0 }"#,
            r#"{ "ring_bits": 511 }"#,
            r#"{ "ring_bits": 16 }"#,
            r#"{ "max_shares": 40, "max_secret_len": 4096, "ring_bits": 16 }"#,
        ] {
            assert!(
                matches!(Config::from_json(text), Err(Error::InvalidParameters(_))),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_json_may_tighten_limits() {
        let config =
            Config::from_json(r#"{ "max_shares": 5, "max_secret_len": 64, "ring_bits": 1024 }"#)
                .unwrap();
        assert_eq!(config.max_shares, 5);
        assert_eq!(config.max_secret_len, 64);
        assert_eq!(config.ring_bits, 1024);
    }

    #[test]
    fn test_params_bounds() {
        let config = Config::default();
        assert!(Params::new(3, 5, &config).is_ok());
        assert!(Params::new(15, 15, &config).is_ok());
        assert!(Params::new(1, 1, &config).is_ok());

        assert!(Params::new(0, 5, &config).is_err());
        assert!(Params::new(6, 5, &config).is_err());
        assert!(Params::new(3, 16, &config).is_err());
    }
}
