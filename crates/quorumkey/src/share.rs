//! share records and their text form
//!
//! a share is persisted as three base-36 numerals framed by marker lines:
//!
//! ```text
//! ----- BEGIN SHAMIR SHARE -----
//! <x>
//! <y>
//! <prime>
//! ----- END SHAMIR SHARE -----
//! ```
//!
//! the fingerprint is a sha3-256 digest of the three numerals as text, so an
//! operator can tell shares apart without reading them out.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use zeroize::Zeroizing;

use crate::config::MAX_SECRET_LEN;
use crate::field::wipe;
use crate::{Error, Result};

pub const SHARE_HEADER: &str = "----- BEGIN SHAMIR SHARE -----";
pub const SHARE_FOOTER: &str = "----- END SHAMIR SHARE -----";

/// longest numeral accepted when parsing
pub const MAX_NUMERAL_LEN: usize = 2 * MAX_SECRET_LEN + 16;

/// hex length of a full fingerprint
pub const FINGERPRINT_LEN: usize = 64;

const RADIX: u32 = 36;

/// one custodian's point on the secret polynomial, with the field prime
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    #[serde(with = "base36")]
    x: BigUint,
    #[serde(with = "base36")]
    y: BigUint,
    #[serde(with = "base36")]
    prime: BigUint,
}

impl ShareRecord {
    pub fn new(x: BigUint, y: BigUint, prime: BigUint) -> Self {
        Self { x, y, prime }
    }

    pub fn x(&self) -> &BigUint {
        &self.x
    }

    pub fn y(&self) -> &BigUint {
        &self.y
    }

    pub fn prime(&self) -> &BigUint {
        &self.prime
    }

    /// x, y and prime rendered as base-36 text
    pub fn numerals(&self) -> [Zeroizing<String>; 3] {
        [
            Zeroizing::new(self.x.to_str_radix(RADIX)),
            Zeroizing::new(self.y.to_str_radix(RADIX)),
            Zeroizing::new(self.prime.to_str_radix(RADIX)),
        ]
    }

    /// the framed text block stored by custodians
    pub fn to_armored(&self) -> Zeroizing<String> {
        let [x, y, prime] = self.numerals();
        let mut out = Zeroizing::new(String::with_capacity(
            SHARE_HEADER.len() + SHARE_FOOTER.len() + x.len() + y.len() + prime.len() + 5,
        ));
        for line in [SHARE_HEADER, x.as_str(), y.as_str(), prime.as_str(), SHARE_FOOTER] {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// parse a framed share.
    ///
    /// anything before the begin marker is skipped, the three lines after
    /// it are x, y and prime. the end marker is not required.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        if !lines.by_ref().any(|line| line.trim() == SHARE_HEADER) {
            return Err(Error::format("share begin marker not found"));
        }

        let mut numeral = |field: &str| -> Result<BigUint> {
            let line = lines
                .next()
                .ok_or_else(|| Error::format(format!("share ends before the {} line", field)))?;
            parse_numeral(line.trim(), field)
        };

        let x = numeral("x")?;
        let y = numeral("y")?;
        let prime = numeral("prime")?;
        Ok(Self { x, y, prime })
    }

    /// sha3-256 over the three numerals, uppercase hex
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha3_256::new();
        for numeral in self.numerals().iter() {
            hasher.update(numeral.as_bytes());
        }
        hex::encode_upper(hasher.finalize())
    }

    /// first `len` hex digits of the fingerprint
    pub fn fingerprint_prefix(&self, len: usize) -> String {
        let mut fingerprint = self.fingerprint();
        fingerprint.truncate(len.min(FINGERPRINT_LEN));
        fingerprint
    }
}

impl Drop for ShareRecord {
    fn drop(&mut self) {
        wipe(&mut self.x);
        wipe(&mut self.y);
        wipe(&mut self.prime);
    }
}

impl fmt::Debug for ShareRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareRecord")
            .field("fingerprint", &self.fingerprint_prefix(16))
            .field("prime_bits", &self.prime.bits())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ShareRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_armored())
    }
}

impl FromStr for ShareRecord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_numeral(text: &str, field: &str) -> Result<BigUint> {
    if text.is_empty() {
        return Err(Error::format(format!("empty {} numeral", field)));
    }
    if text.len() > MAX_NUMERAL_LEN {
        return Err(Error::format(format!(
            "{} numeral longer than {} digits",
            field, MAX_NUMERAL_LEN
        )));
    }
    if !text.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(Error::format(format!("{} is not a base-36 numeral", field)));
    }
    BigUint::parse_bytes(text.as_bytes(), RADIX)
        .ok_or_else(|| Error::format(format!("{} is not a base-36 numeral", field)))
}

/// base-36 string serialization helper for serde
mod base36 {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_str_radix(super::RADIX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_numeral(&s, "share").map_err(serde::de::Error::custom)
    }
}
