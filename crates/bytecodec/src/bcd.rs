// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! 8421 packed decimal: two decimal digits per byte, high nibble first.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BcdError {
    #[error("non-digit character {0:?}")]
    NonDigit(char),
    #[error("{digits} digits do not fit in {width} bytes")]
    TooLong { digits: usize, width: usize },
    #[error("invalid nibble {0:#x}")]
    InvalidNibble(u8),
}

/// Pack `digits` into exactly `width` bytes, left-padding with zeros.
pub fn encode(digits: &str, width: usize) -> Result<Vec<u8>, BcdError> {
    if let Some(c) = digits.chars().find(|c| !c.is_ascii_digit()) {
        return Err(BcdError::NonDigit(c));
    }
    let capacity = width * 2;
    if digits.len() > capacity {
        return Err(BcdError::TooLong {
            digits: digits.len(),
            width,
        });
    }

    let mut nibbles = vec![0u8; capacity - digits.len()];
    nibbles.extend(digits.bytes().map(|b| b - b'0'));
    Ok(nibbles.chunks_exact(2).map(|p| (p[0] << 4) | p[1]).collect())
}

/// Unpack bytes into a digit string.
///
/// With `skip_leading_zeros`, leading `0` digits are dropped; an all-zero
/// input then decodes to the empty string.
pub fn decode(bytes: &[u8], skip_leading_zeros: bool) -> Result<String, BcdError> {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        for nibble in [b >> 4, b & 0x0f] {
            if nibble > 9 {
                return Err(BcdError::InvalidNibble(nibble));
            }
            if skip_leading_zeros && nibble == 0 && out.is_empty() {
                continue;
            }
            out.push(char::from(b'0' + nibble));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pads_left() {
        assert_eq!(
            encode("18102169375", 6).unwrap(),
            vec![0x01, 0x81, 0x02, 0x16, 0x93, 0x75]
        );
        assert_eq!(
            encode("1234567890", 5).unwrap(),
            vec![0x12, 0x34, 0x56, 0x78, 0x90]
        );
        assert_eq!(encode("", 2).unwrap(), vec![0, 0]);
    }

    #[test]
    fn test_encode_errors() {
        assert_eq!(encode("12a", 2), Err(BcdError::NonDigit('a')));
        assert_eq!(
            encode("12345", 2),
            Err(BcdError::TooLong {
                digits: 5,
                width: 2
            })
        );
    }

    #[test]
    fn test_decode() {
        let bytes = [0x01, 0x81, 0x02, 0x16, 0x93, 0x75];
        assert_eq!(decode(&bytes, false).unwrap(), "018102169375");
        assert_eq!(decode(&bytes, true).unwrap(), "18102169375");
        assert_eq!(decode(&[0x00, 0x00], true).unwrap(), "");
        assert_eq!(decode(&[0x10, 0x05], true).unwrap(), "1005");
        assert_eq!(decode(&[0x1a], false), Err(BcdError::InvalidNibble(0xa)));
    }

    #[test]
    fn test_random_digits_round_trip() {
        let mut rng = fastrand::Rng::with_seed(8421);
        for _ in 0..64 {
            let len = rng.usize(0..=12);
            let digits: String = (0..len).map(|_| char::from(b'0' + rng.u8(0..10))).collect();
            let packed = encode(&digits, 6).unwrap();
            assert_eq!(packed.len(), 6);
            let unpacked = decode(&packed, false).unwrap();
            assert_eq!(unpacked.len(), 12);
            assert!(unpacked.ends_with(&digits));
        }
    }
}
