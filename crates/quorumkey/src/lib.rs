//! # quorumkey
//!
//! shamir secret sharing for the passphrase that guards a certificate
//! authority key. the passphrase is split into n shares held by separate
//! custodians; any t of them bring it back, t - 1 learn nothing.
//!
//! ## flow
//!
//! ```text
//!   secret bytes
//!        │ codec: uppercase hex read as base 36
//!        ▼
//!   field element s
//!        │ prime: random ~512-bit p > s
//!        ▼
//!   f(x) = s + c1·x + … + c(t-1)·x^(t-1)  mod p
//!        │ evaluate at n random abscissas
//!   ┌────┼────┬────┐
//!   ▼    ▼    ▼    ▼
//! (x1,y1,p) … (xn,yn,p)      shares, one per custodian
//!
//!   any t shares ── lagrange at 0 ──► s ── codec ──► secret bytes
//! ```
//!
//! ## properties
//!
//! - shares carry the prime, so reconstruction needs nothing but shares
//! - abscissas are random, a share does not reveal its position
//! - fewer than t shares reconstruct some other value, with no error
//! - secret values and coefficients are overwritten once dropped
//!
//! ## usage
//!
//! ```rust
//! let shares = quorumkey::split(b"root ca passphrase", 3, 5)?;
//! let secret = quorumkey::reconstruct(&shares[1..4])?;
//! assert_eq!(secret.as_slice(), b"root ca passphrase");
//! # Ok::<(), quorumkey::Error>(())
//! ```

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod manifest;
pub mod passphrase;
pub mod prime;
pub mod reconstruct;
pub mod share;
pub mod split;
pub mod store;

pub use config::{Config, Params};
pub use engine::Engine;
pub use error::{Error, Result};
pub use field::{FieldElement, SecretValue};
pub use manifest::Manifest;
pub use passphrase::{reconstruct_passphrase, split_passphrase, Passphrase};
pub use share::ShareRecord;
pub use store::{load_share, save_share, save_shares};

pub use num_bigint::BigUint;

use zeroize::Zeroizing;

/// split `secret` into `share_count` shares with quorum `quorum`, using the
/// default configuration and os randomness
pub fn split(secret: &[u8], quorum: usize, share_count: usize) -> Result<Vec<ShareRecord>> {
    let engine = Engine::default();
    let params = engine.params(quorum, share_count)?;
    engine.split(secret, params)
}

/// recover the secret bytes from at least a quorum of shares
pub fn reconstruct(records: &[ShareRecord]) -> Result<Zeroizing<Vec<u8>>> {
    Engine::default().reconstruct(records)
}
