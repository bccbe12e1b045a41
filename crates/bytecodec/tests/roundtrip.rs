// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Byte-exact encoding of every supported shape, and decode round trips.

#![allow(clippy::float_cmp)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::struct_field_names)]

use bytecodec::{
    custom_schema, BoxError, ByteCoder, Cursor, Error, Result, Schema, Slot, TypeDescriptor, Value,
};

/// Pointer-sized unsigned integer, encoded as 8 bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Uintptr(u64);

impl Schema for Uintptr {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Uintptr
    }

    fn to_value(&self) -> Value {
        Value::Uintptr(self.0)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uintptr(v) => Ok(Self(v)),
            other => Err(Error::InvalidType {
                expected: "uintptr".into(),
                found: other.kind_name().into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Schema)]
pub struct Small {
    pub tag: String,
}

fn small(tag: &str) -> Small {
    Small { tag: tag.into() }
}

#[derive(Debug, Clone, Default, PartialEq, Schema)]
pub struct All {
    pub boolean: bool,
    pub int: isize,
    pub int8: i8,
    pub int16: i16,
    pub int32: i32,
    pub int64: i64,
    pub uint: usize,
    pub uint8: u8,
    pub uint16: u16,
    pub uint32: u32,
    pub uint64: u64,
    pub uintptr: Uintptr,
    pub float32: f32,
    pub float64: f64,
    pub string: String,

    pub p_bool: Option<Box<bool>>,
    pub p_int: Option<Box<isize>>,
    pub p_int8: Option<Box<i8>>,
    pub p_int16: Option<Box<i16>>,
    pub p_int32: Option<Box<i32>>,
    pub p_int64: Option<Box<i64>>,
    pub p_uint: Option<Box<usize>>,
    pub p_uint8: Option<Box<u8>>,
    pub p_uint16: Option<Box<u16>>,
    pub p_uint32: Option<Box<u32>>,
    pub p_uint64: Option<Box<u64>>,
    pub p_uintptr: Option<Box<Uintptr>>,
    pub p_float32: Option<Box<f32>>,
    pub p_float64: Option<Box<f64>>,
    pub p_string: Option<Box<String>>,

    pub slice: Vec<Small>,
    pub slice_p: Vec<Option<Box<Small>>>,
    pub p_slice: Option<Box<Vec<Small>>>,
    pub p_slice_p: Option<Box<Vec<Option<Box<Small>>>>>,

    pub empty_slice: Vec<Small>,
    pub nil_slice: Vec<Small>,

    pub string_slice: Vec<String>,
    pub byte_slice: Vec<u8>,

    pub small: Small,
    pub p_small: Option<Box<Small>>,
    pub pp_small: Option<Box<Option<Box<Small>>>>,

    pub interface: Slot,
    pub p_interface: Option<Box<Slot>>,

    unexported: isize,
}

fn all_value() -> All {
    All {
        boolean: true,
        int: -1,
        int8: 1,
        int16: -1,
        int32: 2,
        int64: -1,
        uint: 7,
        uint8: 8,
        uint16: 9,
        uint32: 10,
        uint64: 11,
        uintptr: Uintptr(12),
        float32: 14.1,
        float64: 15.1,
        string: "16".into(),
        slice: vec![small("tag20"), small("tag21")],
        slice_p: vec![Some(Box::new(small("tag22"))), None, Some(Box::new(small("tag23")))],
        string_slice: vec!["str24".into(), "str25".into(), "str26".into()],
        byte_slice: vec![27, 28, 29],
        small: small("tag30"),
        p_small: Some(Box::new(small("tag31"))),
        interface: Slot::of(&5.2f64),
        unexported: 99,
        ..All::default()
    }
}

fn pall_value() -> All {
    let all = all_value();
    All {
        p_bool: Some(Box::new(all.boolean)),
        p_int: Some(Box::new(all.int)),
        p_int8: Some(Box::new(all.int8)),
        p_int16: Some(Box::new(all.int16)),
        p_int32: Some(Box::new(all.int32)),
        p_int64: Some(Box::new(all.int64)),
        p_uint: Some(Box::new(all.uint)),
        p_uint8: Some(Box::new(all.uint8)),
        p_uint16: Some(Box::new(all.uint16)),
        p_uint32: Some(Box::new(all.uint32)),
        p_uint64: Some(Box::new(all.uint64)),
        p_uintptr: Some(Box::new(all.uintptr)),
        p_float32: Some(Box::new(all.float32)),
        p_float64: Some(Box::new(all.float64)),
        p_string: Some(Box::new(all.string.clone())),
        p_slice: Some(Box::new(all.slice.clone())),
        p_slice_p: Some(Box::new(all.slice_p.clone())),
        pp_small: Some(Box::new(all.p_small.clone())),
        p_interface: Some(Box::new(all.interface.clone())),
        ..All::default()
    }
}

const SCALAR_BYTES: &[u8] = &[
    0x1,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x1,
    0xff, 0xff,
    0x0, 0x0, 0x0, 0x2,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x7,
    0x8,
    0x0, 0x9,
    0x0, 0x0, 0x0, 0xa,
    0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0xb,
    0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0xc,
    0x41, 0x61, 0x99, 0x9a,
    0x40, 0x2e, 0x33, 0x33, 0x33, 0x33, 0x33, 0x33,
    0x31, 0x36,
];

fn all_value_bytes() -> Vec<u8> {
    let mut bytes = SCALAR_BYTES.to_vec();
    bytes.extend_from_slice(b"tag20tag21");
    bytes.extend_from_slice(b"tag22tag23");
    bytes.extend_from_slice(b"str24str25str26");
    bytes.extend_from_slice(&[0x1b, 0x1c, 0x1d]);
    bytes.extend_from_slice(b"tag30");
    bytes.extend_from_slice(b"tag31");
    bytes.extend_from_slice(&[0x40, 0x14, 0xcc, 0xcc, 0xcc, 0xcc, 0xcc, 0xcd]);
    bytes
}

fn pall_value_bytes() -> Vec<u8> {
    // Zeroed scalars; the empty string writes nothing.
    let mut bytes = vec![0u8; 1 + 8 + 1 + 2 + 4 + 8 + 8 + 1 + 2 + 4 + 8 + 8 + 4 + 8];
    bytes.extend_from_slice(SCALAR_BYTES);
    bytes.extend_from_slice(b"tag20tag21");
    bytes.extend_from_slice(b"tag22tag23");
    bytes.extend_from_slice(b"tag31");
    bytes.extend_from_slice(&[0x40, 0x14, 0xcc, 0xcc, 0xcc, 0xcc, 0xcc, 0xcd]);
    bytes
}

#[test]
fn test_marshal_all_value() {
    let bytes = bytecodec::marshal(&all_value()).unwrap();
    assert_eq!(bytes, all_value_bytes());
}

#[test]
fn test_marshal_pointer_value() {
    let bytes = bytecodec::marshal(&pall_value()).unwrap();
    assert_eq!(bytes, pall_value_bytes());
}

#[test]
fn test_unexported_field_not_encoded() {
    let mut a = all_value();
    a.unexported = 0;
    assert_eq!(
        bytecodec::marshal(&a).unwrap(),
        bytecodec::marshal(&all_value()).unwrap()
    );
}

#[derive(Debug, Clone, Default, PartialEq, Schema)]
pub struct Fixed {
    pub flag: bool,
    pub a: i8,
    pub b: i16,
    pub c: i32,
    pub d: i64,
    pub e: u8,
    pub f: u16,
    pub g: u32,
    pub h: u64,
    pub i: isize,
    pub j: usize,
    pub k: f32,
    pub l: f64,
    pub grid: [[u8; 2]; 3],
    #[bytecodec("length:6")]
    pub label: String,
}

fn random_fixed(rng: &mut fastrand::Rng) -> Fixed {
    let label: String = (0..6).map(|_| rng.alphanumeric()).collect();
    Fixed {
        flag: rng.bool(),
        a: rng.i8(..),
        b: rng.i16(..),
        c: rng.i32(..),
        d: rng.i64(..),
        e: rng.u8(..),
        f: rng.u16(..),
        g: rng.u32(..),
        h: rng.u64(..),
        i: rng.isize(..),
        j: rng.usize(..),
        k: rng.f32(),
        l: rng.f64() * 1e12 - 5e11,
        grid: [[rng.u8(..), rng.u8(..)], [rng.u8(..), rng.u8(..)], [rng.u8(..), rng.u8(..)]],
        label,
    }
}

#[test]
fn test_random_round_trip() {
    let mut rng = fastrand::Rng::with_seed(0xb17e);
    for _ in 0..128 {
        let value = random_fixed(&mut rng);
        let bytes = bytecodec::marshal(&value).unwrap();
        assert_eq!(bytes.len(), 1 + 1 + 2 + 4 + 8 + 1 + 2 + 4 + 8 + 8 + 8 + 4 + 8 + 6 + 6);

        let mut out = Fixed::default();
        bytecodec::unmarshal(&bytes, &mut out).unwrap();
        assert_eq!(out, value);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Schema)]
pub struct Trailer {
    pub id: u16,
    pub next: Option<Box<Small>>,
}

#[test]
fn test_null_reference_allocated_on_decode() {
    let mut out = Trailer::default();
    bytecodec::unmarshal(b"\x00\x05tag99", &mut out).unwrap();
    assert_eq!(
        out,
        Trailer {
            id: 5,
            next: Some(Box::new(small("tag99"))),
        }
    );

    let value = Trailer { id: 5, next: None };
    assert_eq!(bytecodec::marshal(&value).unwrap(), vec![0, 5]);
}

#[derive(Debug, Clone, Default, PartialEq, Schema)]
pub struct StringTag {
    #[bytecodec("gbk;length:4")]
    pub gbk: String,
    #[bytecodec("gbk18030;length:4")]
    pub gbk18030: String,
    #[bytecodec("bcd8421:5")]
    pub bcd8421: String,
}

#[test]
fn test_string_tags() {
    let value = StringTag {
        gbk: "测试".into(),
        gbk18030: "测试".into(),
        bcd8421: "1234567890".into(),
    };
    let expected = vec![
        0xb2, 0xe2, 0xca, 0xd4, //
        0xb2, 0xe2, 0xca, 0xd4, //
        0x12, 0x34, 0x56, 0x78, 0x90,
    ];
    assert_eq!(bytecodec::marshal(&value).unwrap(), expected);

    let mut out = StringTag::default();
    bytecodec::unmarshal(&expected, &mut out).unwrap();
    assert_eq!(out, value);
}

#[derive(Debug, Clone, Default, PartialEq, Schema)]
pub struct LengthTag {
    #[bytecodec("length:4")]
    pub slice: Vec<u16>,
    #[bytecodec("length:4")]
    pub str: String,
    #[bytecodec("length:5")]
    pub array: [u8; 5],
}

#[test]
fn test_length_tags() {
    let value = LengthTag {
        slice: vec![1, 2],
        str: "abcd".into(),
        array: [1, 2, 3, 4, 0],
    };
    let expected = vec![0x0, 0x1, 0x0, 0x2, 0x61, 0x62, 0x63, 0x64, 0x1, 0x2, 0x3, 0x4, 0x0];
    assert_eq!(bytecodec::marshal(&value).unwrap(), expected);

    let mut out = LengthTag::default();
    bytecodec::unmarshal(&expected, &mut out).unwrap();
    assert_eq!(out, value);
}

#[test]
fn test_length_tag_mismatch_on_encode() {
    let value = LengthTag {
        slice: vec![1, 2, 3],
        str: "abcd".into(),
        array: [0; 5],
    };
    assert!(matches!(
        bytecodec::marshal(&value),
        Err(Error::LengthMismatch {
            declared: 4,
            actual: 6,
            ..
        })
    ));
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Shifted {
    s: String,
}

impl ByteCoder for Shifted {
    fn marshal_bytes(&self, cursor: &mut Cursor<'_>) -> std::result::Result<(), BoxError> {
        for b in self.s.bytes() {
            cursor.write_u8(b + 1);
        }
        Ok(())
    }

    fn unmarshal_bytes(&mut self, cursor: &mut Cursor<'_>) -> std::result::Result<(), BoxError> {
        let bytes: Vec<u8> = cursor.read_remaining().iter().map(|b| b - 1).collect();
        self.s = String::from_utf8(bytes)?;
        Ok(())
    }
}

custom_schema!(Shifted, "Shifted");

#[test]
fn test_byte_coder() {
    let cases: [(&[u8], &str); 2] = [
        (&[231, 182, 140, 233, 176, 150], "测试"),
        (&[117, 102, 116, 117], "test"),
    ];
    for (bytes, text) in cases {
        let value = Shifted { s: text.into() };
        assert_eq!(bytecodec::marshal(&value).unwrap(), bytes);

        let mut out = Shifted::default();
        bytecodec::unmarshal(bytes, &mut out).unwrap();
        assert_eq!(out, value);
    }
}

#[test]
fn test_byte_coder_error_wrapped() {
    let mut out = Shifted::default();
    let err = bytecodec::unmarshal(&[0xff, 0xff], &mut out).unwrap_err();
    assert!(matches!(
        err,
        Error::UserCodec {
            operation: "UnmarshalBytes",
            ..
        }
    ));
    assert_eq!(out, Shifted::default());
}

#[test]
fn test_unsupported_values() {
    for v in [f64::NAN, f64::NEG_INFINITY, f64::INFINITY] {
        assert!(matches!(
            bytecodec::marshal(&v),
            Err(Error::UnsupportedValue(_))
        ));
    }
    let mut value = all_value();
    value.float32 = f32::NAN;
    assert!(matches!(
        bytecodec::marshal(&value),
        Err(Error::UnsupportedValue(_))
    ));
}

#[test]
fn test_unsupported_type() {
    let ty = TypeDescriptor::opaque("map[string]int");
    let err = bytecodec::marshal_dynamic(&ty, &Value::Opaque("map[string]int".into())).unwrap_err();
    assert!(matches!(err, Error::UnsupportedType(name) if name == "map[string]int"));

    let target = bytecodec::Reference::new(Value::Opaque("map[string]int".into()));
    let err = bytecodec::unmarshal_dynamic(
        &[1, 2],
        &TypeDescriptor::reference(ty),
        &Value::Ref(target),
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnsupportedType(_)));
}
