//! Field elements and the mapping from credential attributes into the scalar field.

use ark_ff::{BigInteger, PrimeField};

use crate::utils::errors::EncodingError;

/// Scalar field of BN254. Every wire, public input and hash output lives here.
pub type FieldElement = ark_bn254::Fr;

/// Longest attribute (in bytes) that maps injectively into the field.
///
/// The BN254 scalar modulus is a 254-bit number, so any 31-byte big-endian value is
/// already reduced.
pub const MAX_ATTRIBUTE_BYTES: usize = 31;

/// Encodes raw bytes as the big-endian unsigned integer they spell out.
pub fn encode_bytes(bytes: &[u8]) -> Result<FieldElement, EncodingError> {
    if bytes.len() > MAX_ATTRIBUTE_BYTES {
        return Err(EncodingError::AttributeTooLong(
            bytes.len(),
            MAX_ATTRIBUTE_BYTES,
        ));
    }
    Ok(FieldElement::from_be_bytes_mod_order(bytes))
}

/// Encodes a textual attribute through its UTF-8 bytes.
pub fn encode_attribute(attribute: &str) -> Result<FieldElement, EncodingError> {
    encode_bytes(attribute.as_bytes())
}

/// `0x`-prefixed, zero-padded big-endian hex.
pub fn to_hex(value: &FieldElement) -> String {
    let bytes = value.into_bigint().to_bytes_be();
    let mut out = String::with_capacity(2 + 2 * bytes.len());
    out.push_str("0x");
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Parses the output of [`to_hex`]. Values at or above the modulus are rejected rather than
/// reduced so that two strings never name the same element.
pub fn from_hex(s: &str) -> Result<FieldElement, EncodingError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex_to_bytes(digits).ok_or_else(|| EncodingError::InvalidHex(s.to_string()))?;
    let value = FieldElement::from_be_bytes_mod_order(&bytes);
    let canonical = value.into_bigint().to_bytes_be();
    let trimmed = |b: &[u8]| -> Vec<u8> { b.iter().copied().skip_while(|x| *x == 0).collect() };
    if trimmed(&canonical) != trimmed(&bytes) {
        return Err(EncodingError::InvalidHex(s.to_string()));
    }
    Ok(value)
}

fn hex_to_bytes(digits: &str) -> Option<Vec<u8>> {
    if digits.is_empty() || !digits.is_ascii() {
        return None;
    }
    // Left-pad odd-length strings with a zero nibble.
    let padded = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    (0..padded.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&padded[i..i + 2], 16).ok())
        .collect()
}
