//! mapping between secret bytes and a single field element
//!
//! forward: the secret is written as uppercase hex and that text is read
//! as a base-36 numeral. reverse: the element is written in base 36 and the
//! digits are decoded as hex pairs. hex text only uses 0-9/a-f so the two
//! directions agree, but the value is not the big-endian integer of the
//! bytes. share numerals depend on this mapping, so it stays as is.

use num_bigint::BigUint;
use tracing::warn;
use zeroize::Zeroizing;

use crate::field::SecretValue;
use crate::{Error, Result};

const RADIX: u32 = 36;

/// encode `secret` as a field element.
///
/// the first byte must be non-zero: a leading `00` has no base-36 digit to
/// survive in, so such secrets cannot round-trip.
pub fn encode(secret: &[u8], max_len: usize) -> Result<SecretValue> {
    if secret.is_empty() {
        warn!("empty secret rejected by codec");
        return Err(Error::invalid("secret is empty"));
    }
    if secret.len() > max_len {
        warn!(len = secret.len(), max = max_len, "secret rejected by codec");
        return Err(Error::EncodingTooLarge {
            len: secret.len(),
            max: max_len,
        });
    }
    if secret[0] == 0 {
        warn!(len = secret.len(), "secret with a leading zero byte rejected by codec");
        return Err(Error::invalid("secret must not start with a zero byte"));
    }

    let text = Zeroizing::new(hex::encode_upper(secret));
    let value = BigUint::parse_bytes(text.as_bytes(), RADIX)
        .ok_or_else(|| Error::math("hex text did not parse as base 36"))?;
    Ok(SecretValue::new(value))
}

/// decode a reconstructed field element back into secret bytes
pub fn decode(value: &BigUint) -> Result<Zeroizing<Vec<u8>>> {
    let rendered = Zeroizing::new(value.to_str_radix(RADIX));

    if let Some(digit) = rendered.chars().find(|c| !c.is_ascii_hexdigit()) {
        warn!("reconstructed value is outside the hex alphabet");
        return Err(Error::DecodeAlphabetViolation { digit });
    }

    // a first byte below 0x10 loses its leading zero on the way in.
    // sized up front so the buffer never reallocates unwiped
    let mut digits = Zeroizing::new(String::with_capacity(rendered.len() + 1));
    if rendered.len() % 2 == 1 {
        digits.push('0');
    }
    digits.push_str(&rendered);

    let bytes = hex::decode(digits.as_bytes())
        .map_err(|e| Error::math(format!("hex decode failed: {}", e)))?;
    Ok(Zeroizing::new(bytes))
}
