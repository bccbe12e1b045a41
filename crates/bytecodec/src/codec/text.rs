// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! String fields: packed decimal, legacy encoding or raw UTF-8.

use super::Codec;
use crate::bcd;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::tags::FieldConfig;
use crate::transcode;
use crate::types::TypeKind;
use crate::value::Value;

#[derive(Debug)]
pub(crate) struct TextCodec;

fn bcd_error(err: bcd::BcdError) -> Error {
    Error::Transcoding {
        encoding: "bcd8421",
        reason: err.to_string(),
    }
}

impl Codec for TextCodec {
    fn encode(&self, cursor: &mut Cursor<'_>, value: &Value, config: &FieldConfig) -> Result<()> {
        let Value::String(text) = value else {
            return Err(Error::invalid_type(TypeKind::String, value.kind_name()));
        };

        let bytes = match config.packed_decimal {
            Some(pd) => bcd::encode(text, pd.width).map_err(bcd_error)?,
            None => {
                let bytes = transcode::encode(config.encoding, text)?;
                if let Some(declared) = config.fixed_length {
                    if bytes.len() != declared {
                        return Err(Error::LengthMismatch {
                            what: format!("string {text:?}"),
                            declared,
                            actual: bytes.len(),
                        });
                    }
                }
                bytes
            }
        };
        cursor.write(&bytes);
        Ok(())
    }

    fn decode(&self, cursor: &mut Cursor<'_>, target: &mut Value, config: &FieldConfig) -> Result<()> {
        let width = config
            .fixed_length
            .or(config.packed_decimal.map(|pd| pd.width));
        let bytes = match width {
            Some(n) => cursor.read_exact(n)?,
            None => cursor.read_remaining(),
        };

        let text = match config.packed_decimal {
            Some(pd) => bcd::decode(bytes, pd.skip_leading_zeros).map_err(bcd_error)?,
            None => transcode::decode(config.encoding, bytes)?,
        };
        *target = Value::String(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::CycleGuard;
    use crate::registry::CodecRegistry;

    fn encode(text: &str, tag: &str) -> Result<Vec<u8>> {
        let registry = CodecRegistry::new();
        let mut guard = CycleGuard::default();
        let mut cursor = Cursor::new(&registry, &mut guard);
        let config = FieldConfig::parse(tag).unwrap();
        TextCodec.encode(&mut cursor, &Value::from(text), &config)?;
        Ok(cursor.into_bytes())
    }

    fn decode(bytes: &[u8], tag: &str) -> Result<(String, usize)> {
        let registry = CodecRegistry::new();
        let mut guard = CycleGuard::default();
        let mut cursor = Cursor::with_bytes(&registry, &mut guard, bytes.to_vec());
        let config = FieldConfig::parse(tag).unwrap();
        let mut out = Value::String(String::new());
        TextCodec.decode(&mut cursor, &mut out, &config)?;
        match out {
            Value::String(s) => Ok((s, cursor.remaining())),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_raw_consumes_remaining() {
        assert_eq!(encode("16", "").unwrap(), b"16".to_vec());
        assert_eq!(decode(b"abcdef", "").unwrap(), ("abcdef".into(), 0));
        assert_eq!(decode(b"abcdef", "length:4").unwrap(), ("abcd".into(), 2));
    }

    #[test]
    fn test_fixed_length_mismatch() {
        assert!(matches!(
            encode("abc", "length:4"),
            Err(Error::LengthMismatch {
                declared: 4,
                actual: 3,
                ..
            })
        ));
        assert!(matches!(
            encode("测试测", "gbk;length:4"),
            Err(Error::LengthMismatch { actual: 6, .. })
        ));
    }

    #[test]
    fn test_packed_decimal_takes_precedence() {
        assert_eq!(
            encode("18102169375", "gbk;bcd8421:6,true").unwrap(),
            vec![0x01, 0x81, 0x02, 0x16, 0x93, 0x75]
        );
        let (text, rest) = decode(&[0x01, 0x81, 0x02, 0x16, 0x93, 0x75, 0x04], "bcd8421:6,true").unwrap();
        assert_eq!(text, "18102169375");
        assert_eq!(rest, 1);
        assert!(matches!(
            encode("12x", "bcd8421:2"),
            Err(Error::Transcoding {
                encoding: "bcd8421",
                ..
            })
        ));
    }

    #[test]
    fn test_legacy_encoding() {
        assert_eq!(
            encode("测试", "gbk;length:4").unwrap(),
            vec![0xb2, 0xe2, 0xca, 0xd4]
        );
        assert_eq!(
            decode(&[0xb2, 0xe2, 0xca, 0xd4, 0x12], "gbk18030;length:4").unwrap(),
            ("测试".into(), 1)
        );
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(matches!(
            decode(&[0xc3, 0x28], ""),
            Err(Error::Transcoding { .. })
        ));
    }

    #[test]
    fn test_short_input() {
        assert!(matches!(
            decode(b"ab", "length:4"),
            Err(Error::InsufficientData { need: 4, have: 2 })
        ));
    }
}
