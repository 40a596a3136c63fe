//! Base64 decoding.

use crate::constants::{INVALID, PAD, REVERSE};

/// Error type for base64 decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Base64Error {
    /// A byte outside the alphabet, or misplaced padding.
    InvalidCharacter,
    /// The input length is not a whole number of quartets.
    InvalidLength,
}

impl std::fmt::Display for Base64Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Base64Error::InvalidCharacter => write!(f, "invalid base64 character"),
            Base64Error::InvalidLength => write!(f, "invalid base64 length"),
        }
    }
}

impl std::error::Error for Base64Error {}

/// Decodes standard base64.
///
/// Padding is required: the input length must be a multiple of four, with
/// `=` only in the final one or two positions.
///
/// # Example
///
/// ```
/// use ion_kit_base64::from_base64;
///
/// assert_eq!(from_base64(b"aGVsbG8gd29ybGQ=").unwrap(), b"hello world");
/// ```
pub fn from_base64(encoded: &[u8]) -> Result<Vec<u8>, Base64Error> {
    if encoded.is_empty() {
        return Ok(Vec::new());
    }
    if encoded.len() % 4 != 0 {
        return Err(Base64Error::InvalidLength);
    }
    let mut pad = 0usize;
    if encoded[encoded.len() - 1] == PAD {
        pad += 1;
        if encoded[encoded.len() - 2] == PAD {
            pad += 1;
        }
    }
    let body = &encoded[..encoded.len() - pad];
    let mut out = Vec::with_capacity(body.len() * 3 / 4 + 2);
    let mut acc = 0u32;
    let mut bits = 0u32;
    for &b in body {
        let sextet = REVERSE[b as usize];
        if sextet == INVALID {
            return Err(Base64Error::InvalidCharacter);
        }
        acc = (acc << 6) | sextet as u32;
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
        }
    }
    // Residual bits come only from the padded tail and must be zero.
    if bits > 0 && (acc & ((1 << bits) - 1)) != 0 {
        return Err(Base64Error::InvalidCharacter);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(from_base64(b"").unwrap(), b"");
        assert_eq!(from_base64(b"Zg==").unwrap(), b"f");
        assert_eq!(from_base64(b"Zm8=").unwrap(), b"fo");
        assert_eq!(from_base64(b"Zm9v").unwrap(), b"foo");
        assert_eq!(from_base64(b"Zm9vYmFy").unwrap(), b"foobar");
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(from_base64(b"Zg="), Err(Base64Error::InvalidLength));
        assert_eq!(from_base64(b"Z!=="), Err(Base64Error::InvalidCharacter));
        assert_eq!(from_base64(b"===="), Err(Base64Error::InvalidCharacter));
    }

    #[test]
    fn random_round_trips() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let len = rng.gen_range(0..96);
            let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let encoded = crate::to_base64(&data);
            assert_eq!(from_base64(encoded.as_bytes()).unwrap(), data);
        }
    }
}
