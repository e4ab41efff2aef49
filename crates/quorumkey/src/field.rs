//! big integer helpers for the prime field
//!
//! arithmetic itself is delegated to num-bigint. this module adds what the
//! sharing code needs on top: uniform sampling, probable-prime search,
//! modular inverses and best-effort wiping of sensitive values.

use std::fmt;
use std::sync::OnceLock;

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

/// element of the prime field: an integer below the modulus
pub type FieldElement = BigUint;

/// odd primes below this bound sieve the prime search
const SIEVE_LIMIT: usize = 1 << 16;

/// odd candidates covered by one sieve window
const SIEVE_WINDOW: usize = 4096;

/// trial divisors tried before miller-rabin
const TRIAL_LIMIT: u32 = 1000;

/// odd primes below `SIEVE_LIMIT`, built once
fn sieve_primes() -> &'static [u32] {
    static PRIMES: OnceLock<Vec<u32>> = OnceLock::new();
    PRIMES.get_or_init(|| {
        let mut composite = vec![false; SIEVE_LIMIT];
        let mut primes = Vec::new();
        for n in (3..SIEVE_LIMIT).step_by(2) {
            if composite[n] {
                continue;
            }
            primes.push(n as u32);
            for multiple in (n * n..SIEVE_LIMIT).step_by(2 * n) {
                composite[multiple] = true;
            }
        }
        primes
    })
}

/// `n mod p` from little-endian u32 digits
fn rem_small(digits: &[u32], p: u32) -> u32 {
    let p = u64::from(p);
    digits
        .iter()
        .rev()
        .fold(0u64, |r, &d| ((r << 32) | u64::from(d)) % p) as u32
}

/// uniform integer in [0, 2^bits)
pub fn random_bits<R: RngCore + CryptoRng>(rng: &mut R, bits: u64) -> BigUint {
    if bits == 0 {
        return BigUint::zero();
    }
    rng.gen_biguint(bits)
}

/// miller-rabin with `rounds` uniformly random bases, after trial division
pub fn is_probable_prime<R: RngCore + CryptoRng>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    if n == &two {
        return true;
    }
    if n.is_even() {
        return false;
    }

    for &p in sieve_primes().iter().take_while(|&&p| p < TRIAL_LIMIT) {
        let p = BigUint::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    // n - 1 = d * 2^s with d odd
    let n_minus_one: BigUint = n - 1u32;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for _ in 0..rounds {
        let base = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = base.modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = &x * &x % n;
            if x == n_minus_one {
                continue 'witness;
            }
            if x.is_one() {
                return false;
            }
        }
        return false;
    }
    true
}

/// smallest probable prime >= `from`.
///
/// large starts are sieved window by window against every odd prime below
/// 2^16, so miller-rabin only sees candidates free of small factors.
pub fn next_prime<R: RngCore + CryptoRng>(from: &BigUint, rounds: usize, rng: &mut R) -> BigUint {
    let two = BigUint::from(2u32);
    if from <= &two {
        return two;
    }
    let mut start = if from.is_even() {
        from + 1u32
    } else {
        from.clone()
    };

    // the sieve would strike the small primes themselves
    if start.bits() <= 32 {
        while !is_probable_prime(&start, rounds, rng) {
            start += 2u32;
        }
        return start;
    }

    let primes = sieve_primes();
    loop {
        // slot k stands for start + 2k
        let digits = start.to_u32_digits();
        let mut struck = vec![false; SIEVE_WINDOW];
        for &p in primes {
            let r = u64::from(rem_small(&digits, p));
            let p = u64::from(p);
            // start + 2k = 0 mod p  <=>  k = -r / 2 mod p
            let mut k = (p - r) % p * ((p + 1) / 2) % p;
            while (k as usize) < SIEVE_WINDOW {
                struck[k as usize] = true;
                k += p;
            }
        }

        for (k, &hit) in struck.iter().enumerate() {
            if hit {
                continue;
            }
            let candidate = &start + (2 * k) as u64;
            if is_probable_prime(&candidate, rounds, rng) {
                return candidate;
            }
        }
        start += (2 * SIEVE_WINDOW) as u64;
    }
}

/// inverse of `a` modulo prime `p`, `None` when a = 0 mod p
pub fn mod_inverse(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    let a = a % p;
    if a.is_zero() {
        return None;
    }
    a.modinv(p)
}

/// overwrite the limbs of `value` in place, leaving it zero.
///
/// num-bigint has no zeroize support, so this rewrites the live buffer
/// through `assign_from_slice`. copies left behind by earlier arithmetic
/// are out of reach.
pub fn wipe(value: &mut BigUint) {
    let limbs = value.iter_u32_digits().len();
    if limbs == 0 {
        return;
    }
    value.assign_from_slice(&vec![0u32; limbs]);
}

/// field element holding secret material, wiped on drop
pub struct SecretValue(BigUint);

impl SecretValue {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &BigUint {
        &self.0
    }

    /// swap in a new value, wiping the previous one
    pub(crate) fn replace(&mut self, value: BigUint) {
        let mut old = std::mem::replace(&mut self.0, value);
        wipe(&mut old);
    }
}

impl Drop for SecretValue {
    fn drop(&mut self) {
        wipe(&mut self.0);
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(0x5eed)
    }

    #[test]
    fn test_small_primes_classified() {
        let mut rng = rng();
        let primes: Vec<u32> = (0..600u32)
            .filter(|&n| is_probable_prime(&BigUint::from(n), 16, &mut rng))
            .collect();
        assert_eq!(&primes[..10], &[2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert_eq!(primes.last(), Some(&599));
        assert_eq!(primes.len(), 109);
    }

    #[test]
    fn test_carmichael_rejected() {
        let mut rng = rng();
        // 561 and 41041 fool fermat, not miller-rabin
        for n in [561u32, 1105, 1729, 41041, 825265] {
            assert!(!is_probable_prime(&BigUint::from(n), 16, &mut rng), "{}", n);
        }
    }

    #[test]
    fn test_known_large_prime() {
        let mut rng = rng();
        // 2^127 - 1
        let m127 = (BigUint::one() << 127u32) - 1u32;
        assert!(is_probable_prime(&m127, 32, &mut rng));
        assert!(!is_probable_prime(&(&m127 + 2u32), 32, &mut rng));
    }

    #[test]
    fn test_next_prime() {
        let mut rng = rng();
        let next = |n: u32, rng: &mut ChaCha20Rng| next_prime(&BigUint::from(n), 16, rng);
        assert_eq!(next(0, &mut rng), BigUint::from(2u32));
        assert_eq!(next(3, &mut rng), BigUint::from(3u32));
        assert_eq!(next(24, &mut rng), BigUint::from(29u32));
        assert_eq!(next(7908, &mut rng), BigUint::from(7919u32));
    }

    #[test]
    fn test_sieve_primes() {
        let primes = sieve_primes();
        assert_eq!(&primes[..5], &[3, 5, 7, 11, 13]);
        assert_eq!(primes.last(), Some(&65521));
        // pi(2^16) = 6542, minus the prime 2
        assert_eq!(primes.len(), 6541);
        assert_eq!(rem_small(&[0, 1], 7), ((1u64 << 32) % 7) as u32);
    }

    #[test]
    fn test_sieved_walk_matches_plain_walk() {
        let mut rng = rng();
        for start in [
            (BigUint::one() << 61u32) + 12345u32,
            (BigUint::one() << 89u32) - 1000u32,
            BigUint::parse_bytes(b"1fffffffffffffffffffffffffffffff00", 16).unwrap(),
        ] {
            let mut plain = if start.is_even() { &start + 1u32 } else { start.clone() };
            while !is_probable_prime(&plain, 16, &mut rng) {
                plain += 2u32;
            }
            assert_eq!(next_prime(&start, 16, &mut rng), plain);
        }
        // 2^89 - 1 is a mersenne prime
        let m89 = (BigUint::one() << 89u32) - 1u32;
        assert_eq!(next_prime(&m89, 16, &mut rng), m89);
        assert!(next_prime(&(&m89 + 1u32), 16, &mut rng) > m89);
    }

    #[test]
    fn test_random_bits_bounded() {
        let mut rng = rng();
        for _ in 0..100 {
            assert!(random_bits(&mut rng, 511).bits() <= 511);
        }
        assert!(random_bits(&mut rng, 0).is_zero());
    }

    #[test]
    fn test_mod_inverse() {
        let p = BigUint::from(7919u32);
        for a in [1u32, 2, 1000, 7918] {
            let inv = mod_inverse(&BigUint::from(a), &p).unwrap();
            assert_eq!(BigUint::from(a) * inv % &p, BigUint::one());
        }
        assert!(mod_inverse(&BigUint::zero(), &p).is_none());
        assert!(mod_inverse(&p, &p).is_none());
    }

    #[test]
    fn test_wipe_zeroes_value() {
        let mut value = BigUint::parse_bytes(b"deadbeefcafebabe0123456789", 16).unwrap();
        wipe(&mut value);
        assert!(value.is_zero());

        let mut secret = SecretValue::new(BigUint::from(42u32));
        secret.replace(BigUint::from(7u32));
        assert_eq!(secret.expose(), &BigUint::from(7u32));
        assert_eq!(format!("{:?}", secret), "SecretValue(..)");
    }
}
