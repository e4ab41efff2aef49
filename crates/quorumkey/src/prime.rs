//! choice of the field modulus for one split

use num_bigint::BigUint;
use num_traits::One;
use rand::{CryptoRng, RngCore};
use tracing::{debug, warn};

use crate::config::Config;
use crate::field::{next_prime, random_bits};
use crate::{Error, Result};

/// uniform integer of exactly `bits` bits (top bit set)
fn sample_exact_bits<R: RngCore + CryptoRng>(rng: &mut R, bits: u64) -> BigUint {
    random_bits(rng, bits - 1) | (BigUint::one() << (bits - 1))
}

/// draw a prime strictly greater than `secret`.
///
/// samples a uniform (ring - 1)-bit integer and walks to the next probable
/// prime. the ring is at least two bits wider than the secret, so the
/// sample already exceeds it; the resampling bound `config.prime_attempts`
/// only guards that invariant.
pub fn select_prime<R: RngCore + CryptoRng>(
    secret: &BigUint,
    config: &Config,
    rng: &mut R,
) -> Result<BigUint> {
    let ring_bits = config.ring_bits.max(secret.bits() + 2).max(3);

    for attempt in 1..=config.prime_attempts {
        let sample = sample_exact_bits(rng, ring_bits - 1);
        let prime = next_prime(&sample, config.primality_rounds, rng);
        if &prime > secret {
            debug!(attempt, bits = prime.bits(), "field prime selected");
            return Ok(prime);
        }
    }

    warn!(
        attempts = config.prime_attempts,
        ring_bits, "no field prime above the secret"
    );
    Err(Error::math(format!(
        "no prime above the secret after {} attempts",
        config.prime_attempts
    )))
}
