//! ca passphrases carried through the sharing engine
//!
//! a passphrase is base64 text over random bytes. the raw bytes are what
//! get split, so the shares do not depend on the text encoding.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::config::Params;
use crate::engine::Engine;
use crate::share::ShareRecord;
use crate::{Error, Result};

/// random bytes behind a generated passphrase
pub const PASSPHRASE_BYTES: usize = 40;

pub struct Passphrase(Zeroizing<String>);

impl Passphrase {
    /// fresh passphrase. byte strings starting with zero are redrawn, the
    /// codec cannot carry them.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = Zeroizing::new([0u8; PASSPHRASE_BYTES]);
        loop {
            rng.fill_bytes(&mut bytes[..]);
            if bytes[0] != 0 {
                break;
            }
        }
        Self(Zeroizing::new(STANDARD.encode(&bytes[..])))
    }

    /// wrap existing passphrase text, surrounding whitespace is dropped
    pub fn from_text(text: &str) -> Result<Self> {
        let passphrase = Self(Zeroizing::new(text.trim().to_owned()));
        passphrase.to_bytes()?;
        Ok(passphrase)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> Result<Zeroizing<Vec<u8>>> {
        let bytes = STANDARD
            .decode(self.0.as_bytes())
            .map_err(|e| Error::format(format!("passphrase is not base64: {}", e)))?;
        Ok(Zeroizing::new(bytes))
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(..)")
    }
}

/// split the bytes behind `passphrase`
pub fn split_passphrase<R: RngCore + CryptoRng>(
    engine: &Engine,
    rng: &mut R,
    passphrase: &Passphrase,
    params: Params,
) -> Result<Vec<ShareRecord>> {
    let bytes = passphrase.to_bytes()?;
    engine.split_with_rng(rng, &bytes, params)
}

/// recover a passphrase from a quorum of shares
pub fn reconstruct_passphrase(engine: &Engine, records: &[ShareRecord]) -> Result<Passphrase> {
    let bytes = engine.reconstruct(records)?;
    Ok(Passphrase(Zeroizing::new(STANDARD.encode(bytes.as_slice()))))
}
