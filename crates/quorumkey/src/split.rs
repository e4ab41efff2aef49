//! shamir split over a prime field
//!
//! the secret is the constant term of a random polynomial of degree t - 1.
//! each custodian gets the polynomial evaluated at a random abscissa; the
//! abscissas are not indices, so a single share says nothing about its
//! position in the split.

use num_bigint::BigUint;
use num_traits::One;
use rand::{CryptoRng, RngCore};
use tracing::{debug, warn};

use crate::field::{random_bits, wipe};
use crate::share::ShareRecord;
use crate::{Error, Result};

/// coefficients 1..t-1 of the sharing polynomial, wiped on drop
struct Polynomial {
    coefficients: Vec<BigUint>,
}

impl Polynomial {
    fn random<R: RngCore + CryptoRng>(rng: &mut R, degree: usize, prime: &BigUint) -> Self {
        let coefficients = (0..degree).map(|_| nonzero_element(rng, prime)).collect();
        Self { coefficients }
    }

    /// horner evaluation of secret + c1*x + ... + c(t-1)*x^(t-1) mod prime
    fn evaluate(&self, secret: &BigUint, x: &BigUint, prime: &BigUint) -> BigUint {
        let mut acc = BigUint::default();
        for coefficient in self.coefficients.iter().rev() {
            let next = (&acc + coefficient) * x % prime;
            wipe(&mut acc);
            acc = next;
        }
        let y = (&acc + secret) % prime;
        wipe(&mut acc);
        y
    }
}

impl Drop for Polynomial {
    fn drop(&mut self) {
        for coefficient in self.coefficients.iter_mut() {
            wipe(coefficient);
        }
    }
}

/// uniform (bits(prime) - 1)-bit integer plus one
fn nonzero_element<R: RngCore + CryptoRng>(rng: &mut R, prime: &BigUint) -> BigUint {
    random_bits(rng, prime.bits().saturating_sub(1)) + BigUint::one()
}

/// split `secret` into `share_count` points, any `threshold` of which
/// recover it.
///
/// on a coincidence (an abscissa or an ordinate equal to the secret) every
/// share drawn so far is wiped and the split fails; the caller may retry.
pub fn split_value<R: RngCore + CryptoRng>(
    rng: &mut R,
    secret: &BigUint,
    share_count: usize,
    threshold: usize,
    prime: &BigUint,
) -> Result<Vec<ShareRecord>> {
    if secret >= prime {
        return Err(Error::invalid("secret is not below the field prime"));
    }
    if share_count == 0 {
        return Err(Error::invalid("share count must be at least 1"));
    }
    if threshold == 0 || threshold > share_count {
        return Err(Error::invalid(format!(
            "threshold {} outside 1..={}",
            threshold, share_count
        )));
    }

    let polynomial = Polynomial::random(rng, threshold - 1, prime);
    let abscissas: Vec<BigUint> = (0..share_count)
        .map(|_| nonzero_element(rng, prime))
        .collect();

    let mut shares = Vec::with_capacity(share_count);
    for x in abscissas {
        let y = polynomial.evaluate(secret, &x, prime);
        let coincident = &x == secret || &y == secret;
        shares.push(ShareRecord::new(x, y, prime.clone()));
        if coincident {
            warn!(share_count, threshold, "share coincides with the secret, split discarded");
            drop(shares);
            return Err(Error::math("share coordinate equals the secret"));
        }
    }

    debug!(share_count, threshold, prime_bits = prime.bits(), "secret split");
    Ok(shares)
}
