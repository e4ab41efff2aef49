//! lagrange interpolation at zero
//!
//! the records carry no threshold. handing in fewer points than the split
//! used, or points from different splits, yields an unrelated value
//! without any error.

use num_traits::Zero;
use tracing::{debug, warn};

use crate::field::{mod_inverse, SecretValue};
use crate::share::ShareRecord;
use crate::{Error, Result};

/// recover the constant term from `records`.
///
/// the prime is taken from the first record. coordinates at or above it,
/// or a repeated abscissa, fail with `MathInvariantViolation`.
pub fn reconstruct_value(records: &[ShareRecord]) -> Result<SecretValue> {
    let first = records
        .first()
        .ok_or_else(|| Error::invalid("no shares to reconstruct from"))?;
    let prime = first.prime();

    for record in records {
        if record.x() >= prime || record.y() >= prime {
            warn!(shares = records.len(), "share coordinate outside the field");
            return Err(Error::math("share coordinate is not below the field prime"));
        }
        if record.prime() != prime {
            warn!(
                expected_bits = prime.bits(),
                found_bits = record.prime().bits(),
                "shares come from different fields"
            );
        }
    }

    let mut secret = SecretValue::new(Zero::zero());
    for (j, record) in records.iter().enumerate() {
        let xj = record.x();
        let mut term = SecretValue::new(record.y().clone());

        for (m, other) in records.iter().enumerate() {
            if m == j {
                continue;
            }
            let xm = other.x();
            let diff = (xm + prime - xj) % prime;
            let inverse = mod_inverse(&diff, prime).ok_or_else(|| {
                warn!(shares = records.len(), "repeated abscissa");
                Error::math("abscissas are not distinct")
            })?;
            term.replace(term.expose() * xm % prime * inverse % prime);
        }

        secret.replace((secret.expose() + term.expose()) % prime);
    }

    debug!(shares = records.len(), "secret reconstructed");
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn point(x: u32, y: u32, p: u32) -> ShareRecord {
        ShareRecord::new(BigUint::from(x), BigUint::from(y), BigUint::from(p))
    }

    #[test]
    fn test_known_line() {
        // f(x) = 5 + 3x mod 17: f(1) = 8, f(2) = 11, f(4) = 0
        let shares = [point(1, 8, 17), point(2, 11, 17)];
        assert_eq!(reconstruct_value(&shares).unwrap().expose(), &BigUint::from(5u32));

        let shares = [point(4, 0, 17), point(2, 11, 17)];
        assert_eq!(reconstruct_value(&shares).unwrap().expose(), &BigUint::from(5u32));
    }

    #[test]
    fn test_known_quadratic() {
        // f(x) = 1234 + 166x + 94x^2 mod 1613
        let f = |x: u64| ((1234 + 166 * x + 94 * x * x) % 1613) as u32;
        let shares = [point(1, f(1), 1613), point(2, f(2), 1613), point(3, f(3), 1613)];
        assert_eq!(reconstruct_value(&shares).unwrap().expose(), &BigUint::from(1234u32));

        // an extra point on the same polynomial changes nothing
        let shares = [
            point(900, f(900), 1613),
            point(1, f(1), 1613),
            point(2, f(2), 1613),
            point(3, f(3), 1613),
        ];
        assert_eq!(reconstruct_value(&shares).unwrap().expose(), &BigUint::from(1234u32));
    }

    #[test]
    fn test_single_share_is_its_ordinate() {
        let shares = [point(12, 345, 1613)];
        assert_eq!(reconstruct_value(&shares).unwrap().expose(), &BigUint::from(345u32));
    }

    #[test]
    fn test_empty_is_invalid() {
        assert!(matches!(
            reconstruct_value(&[]),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_duplicate_abscissa_fails() {
        let shares = [point(1, 8, 17), point(1, 8, 17)];
        assert!(matches!(
            reconstruct_value(&shares),
            Err(Error::MathInvariantViolation(_))
        ));

        let shares = [point(3, 8, 17), point(5, 2, 17), point(3, 9, 17)];
        assert!(matches!(
            reconstruct_value(&shares),
            Err(Error::MathInvariantViolation(_))
        ));
    }

    #[test]
    fn test_out_of_field_coordinates_fail() {
        for shares in [
            [point(17, 8, 17), point(2, 11, 17)],
            [point(1, 8, 17), point(2, 40, 17)],
        ] {
            assert!(matches!(
                reconstruct_value(&shares),
                Err(Error::MathInvariantViolation(_))
            ));
        }
    }

    #[test]
    fn test_too_few_shares_gives_other_value() {
        let f = |x: u64| ((1234 + 166 * x + 94 * x * x) % 1613) as u32;
        let shares = [point(1, f(1), 1613), point(2, f(2), 1613)];
        let value = reconstruct_value(&shares).unwrap();
        assert_ne!(value.expose(), &BigUint::from(1234u32));
    }
}
