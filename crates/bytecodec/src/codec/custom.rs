// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! User-defined codecs.

use super::Codec;
use crate::cursor::Cursor;
use crate::error::{BoxError, Error, Result};
use crate::tags::FieldConfig;
use crate::types::CustomType;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// A type that writes and reads its own bytes.
///
/// The cursor is the one the engine uses, so implementations can call
/// back into it with [`Cursor::encode`] and [`Cursor::decode`] for
/// sub-values, or read and write raw bytes directly.
///
/// ```
/// use bytecodec::{BoxError, ByteCoder, Cursor};
///
/// #[derive(Debug, Clone, PartialEq, Default)]
/// struct Shifted(String);
///
/// impl ByteCoder for Shifted {
///     fn marshal_bytes(&self, cursor: &mut Cursor<'_>) -> Result<(), BoxError> {
///         for b in self.0.bytes() {
///             cursor.write_u8(b + 1);
///         }
///         Ok(())
///     }
///
///     fn unmarshal_bytes(&mut self, cursor: &mut Cursor<'_>) -> Result<(), BoxError> {
///         let bytes: Vec<u8> = cursor.read_remaining().iter().map(|b| b - 1).collect();
///         self.0 = String::from_utf8(bytes)?;
///         Ok(())
///     }
/// }
///
/// bytecodec::custom_schema!(Shifted, "Shifted");
///
/// let bytes = bytecodec::marshal(&Shifted("test".into())).unwrap();
/// assert_eq!(bytes, [117, 102, 116, 117]);
/// ```
pub trait ByteCoder: fmt::Debug + 'static {
    fn marshal_bytes(&self, cursor: &mut Cursor<'_>) -> std::result::Result<(), BoxError>;

    fn unmarshal_bytes(&mut self, cursor: &mut Cursor<'_>) -> std::result::Result<(), BoxError>;
}

#[derive(Debug)]
pub(crate) struct UserCodec {
    ty: CustomType,
}

impl UserCodec {
    pub(crate) fn new(ty: CustomType) -> Self {
        Self { ty }
    }
}

impl Codec for UserCodec {
    fn encode(&self, cursor: &mut Cursor<'_>, value: &Value, _: &FieldConfig) -> Result<()> {
        let Value::Custom(custom) = value else {
            return Err(Error::invalid_type(self.ty.name(), value.kind_name()));
        };
        custom
            .coder()
            .marshal_bytes(cursor)
            .map_err(|e| Error::user("MarshalBytes", self.ty.name(), e))
    }

    fn decode(&self, cursor: &mut Cursor<'_>, target: &mut Value, _: &FieldConfig) -> Result<()> {
        if !matches!(target, Value::Custom(_)) {
            *target = self.ty.zero_value();
        }
        let Value::Custom(custom) = target else {
            return Err(Error::invalid_type(self.ty.name(), target.kind_name()));
        };
        custom
            .coder_mut()
            .unmarshal_bytes(cursor)
            .map_err(|e| Error::user("UnmarshalBytes", self.ty.name(), e))
    }
}

/// Two-way dispatch: values carrying the user behaviour go through their
/// `ByteCoder`, plain values of the fallback shape through the fallback codec.
#[derive(Debug)]
pub(crate) struct ConditionalCodec {
    user: UserCodec,
    fallback: Arc<dyn Codec>,
}

impl ConditionalCodec {
    pub(crate) fn new(ty: CustomType, fallback: Arc<dyn Codec>) -> Self {
        Self {
            user: UserCodec::new(ty),
            fallback,
        }
    }
}

impl Codec for ConditionalCodec {
    fn encode(&self, cursor: &mut Cursor<'_>, value: &Value, config: &FieldConfig) -> Result<()> {
        match value {
            Value::Custom(_) => self.user.encode(cursor, value, config),
            _ => self.fallback.encode(cursor, value, config),
        }
    }

    fn decode(&self, cursor: &mut Cursor<'_>, target: &mut Value, config: &FieldConfig) -> Result<()> {
        match target {
            Value::Custom(_) => self.user.decode(cursor, target, config),
            _ => self.fallback.decode(cursor, target, config),
        }
    }
}
