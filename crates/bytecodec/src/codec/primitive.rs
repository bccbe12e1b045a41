// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-width big-endian scalars.

use super::Codec;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::tags::FieldConfig;
use crate::types::TypeKind;
use crate::value::Value;

macro_rules! fixed_width_codec {
    ($($name:ident: $variant:ident => $ty:ty),* $(,)?) => {
        $(
            #[derive(Debug)]
            pub(crate) struct $name;

            impl Codec for $name {
                fn encode(&self, cursor: &mut Cursor<'_>, value: &Value, _: &FieldConfig) -> Result<()> {
                    match value {
                        Value::$variant(v) => {
                            cursor.write(&v.to_be_bytes());
                            Ok(())
                        }
                        other => Err(Error::invalid_type(TypeKind::$variant, other.kind_name())),
                    }
                }

                fn decode(&self, cursor: &mut Cursor<'_>, target: &mut Value, _: &FieldConfig) -> Result<()> {
                    let bytes = cursor.read_array::<{ std::mem::size_of::<$ty>() }>()?;
                    *target = Value::$variant(<$ty>::from_be_bytes(bytes));
                    Ok(())
                }
            }
        )*
    };
}

fixed_width_codec!(
    I8Codec: I8 => i8,
    I16Codec: I16 => i16,
    I32Codec: I32 => i32,
    I64Codec: I64 => i64,
    IntCodec: Int => i64,
    U8Codec: U8 => u8,
    U16Codec: U16 => u16,
    U32Codec: U32 => u32,
    U64Codec: U64 => u64,
    UintCodec: Uint => u64,
    UintptrCodec: Uintptr => u64,
);

macro_rules! float_codec {
    ($($name:ident: $variant:ident => $ty:ty),* $(,)?) => {
        $(
            #[derive(Debug)]
            pub(crate) struct $name;

            impl Codec for $name {
                fn encode(&self, cursor: &mut Cursor<'_>, value: &Value, _: &FieldConfig) -> Result<()> {
                    match value {
                        Value::$variant(v) if !v.is_finite() => {
                            Err(Error::UnsupportedValue(format!("{} {v}", TypeKind::$variant)))
                        }
                        Value::$variant(v) => {
                            cursor.write(&v.to_be_bytes());
                            Ok(())
                        }
                        other => Err(Error::invalid_type(TypeKind::$variant, other.kind_name())),
                    }
                }

                fn decode(&self, cursor: &mut Cursor<'_>, target: &mut Value, _: &FieldConfig) -> Result<()> {
                    let bytes = cursor.read_array::<{ std::mem::size_of::<$ty>() }>()?;
                    *target = Value::$variant(<$ty>::from_be_bytes(bytes));
                    Ok(())
                }
            }
        )*
    };
}

float_codec!(
    F32Codec: F32 => f32,
    F64Codec: F64 => f64,
);

#[derive(Debug)]
pub(crate) struct BoolCodec;

impl Codec for BoolCodec {
    fn encode(&self, cursor: &mut Cursor<'_>, value: &Value, _: &FieldConfig) -> Result<()> {
        match value {
            Value::Bool(b) => {
                cursor.write_u8(u8::from(*b));
                Ok(())
            }
            other => Err(Error::invalid_type(TypeKind::Bool, other.kind_name())),
        }
    }

    fn decode(&self, cursor: &mut Cursor<'_>, target: &mut Value, _: &FieldConfig) -> Result<()> {
        *target = Value::Bool(cursor.read_u8()? != 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::CycleGuard;
    use crate::registry::CodecRegistry;

    fn encode(codec: &dyn Codec, value: Value) -> Result<Vec<u8>> {
        let registry = CodecRegistry::new();
        let mut guard = CycleGuard::default();
        let mut cursor = Cursor::new(&registry, &mut guard);
        codec.encode(&mut cursor, &value, &FieldConfig::default())?;
        Ok(cursor.into_bytes())
    }

    fn decode(codec: &dyn Codec, bytes: &[u8], zero: Value) -> Result<Value> {
        let registry = CodecRegistry::new();
        let mut guard = CycleGuard::default();
        let mut cursor = Cursor::with_bytes(&registry, &mut guard, bytes.to_vec());
        let mut out = zero;
        codec.decode(&mut cursor, &mut out, &FieldConfig::default())?;
        Ok(out)
    }

    #[test]
    fn test_widths_are_big_endian() {
        assert_eq!(encode(&I16Codec, Value::I16(-1)).unwrap(), vec![0xff, 0xff]);
        assert_eq!(encode(&U16Codec, Value::U16(9)).unwrap(), vec![0x00, 0x09]);
        assert_eq!(encode(&I32Codec, Value::I32(2)).unwrap(), vec![0, 0, 0, 2]);
        assert_eq!(encode(&IntCodec, Value::Int(-1)).unwrap(), vec![0xff; 8]);
        assert_eq!(
            encode(&UintptrCodec, Value::Uintptr(12)).unwrap(),
            vec![0, 0, 0, 0, 0, 0, 0, 12]
        );
        assert_eq!(encode(&BoolCodec, Value::Bool(true)).unwrap(), vec![1]);
    }

    #[test]
    fn test_float_bit_patterns() {
        assert_eq!(
            encode(&F32Codec, Value::F32(14.1)).unwrap(),
            vec![0x41, 0x61, 0x99, 0x9a]
        );
        assert_eq!(
            encode(&F64Codec, Value::F64(5.2)).unwrap(),
            vec![0x40, 0x14, 0xcc, 0xcc, 0xcc, 0xcc, 0xcc, 0xcd]
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                encode(&F64Codec, Value::F64(v)),
                Err(Error::UnsupportedValue(_))
            ));
        }
        assert!(matches!(
            encode(&F32Codec, Value::F32(f32::NAN)),
            Err(Error::UnsupportedValue(_))
        ));
    }

    #[test]
    fn test_wrong_variant() {
        assert!(matches!(
            encode(&U8Codec, Value::I8(1)),
            Err(Error::InvalidType { .. })
        ));
    }

    #[test]
    fn test_decode_twos_complement() {
        assert_eq!(
            decode(&I64Codec, &[0xff; 8], Value::I64(0)).unwrap(),
            Value::I64(-1)
        );
        assert_eq!(
            decode(&I16Codec, &[0x80, 0x00], Value::I16(0)).unwrap(),
            Value::I16(i16::MIN)
        );
        assert!(matches!(
            decode(&U32Codec, &[0, 1], Value::U32(0)),
            Err(Error::InsufficientData { need: 4, have: 2 })
        ));
    }

    #[test]
    fn test_random_round_trip() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        for _ in 0..256 {
            let v = rng.i32(..);
            let bytes = encode(&I32Codec, Value::I32(v)).unwrap();
            assert_eq!(bytes.len(), 4);
            assert_eq!(decode(&I32Codec, &bytes, Value::I32(0)).unwrap(), Value::I32(v));

            let f = f64::from_bits(rng.u64(..));
            if f.is_finite() {
                let bytes = encode(&F64Codec, Value::F64(f)).unwrap();
                match decode(&F64Codec, &bytes, Value::F64(0.0)).unwrap() {
                    Value::F64(back) => assert_eq!(back.to_bits(), f.to_bits()),
                    other => panic!("unexpected {other:?}"),
                }
            }
        }
    }
}
