// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Struct fields and the length-reference protocol.
//!
//! A field tagged `lengthref:Data` is the *holder* of `Data`'s byte
//! length. On encode the target is encoded first into an isolated child
//! cursor, its byte count is converted to the holder's numeric type and
//! the holder is encoded from that. Both segments still land at their
//! declared positions. On decode the holder is decoded first (it must
//! precede its target) and its value becomes the fixed length of the
//! target for this call only.

use super::Codec;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::registry::CodecRegistry;
use crate::tags::FieldConfig;
use crate::types::{StructType, TypeDescriptor, TypeKind};
use crate::value::Value;
use log::debug;
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Part a field plays in the length-reference protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Plain,
    /// Carries the byte length of the field at `target` (index into `StructFields::fields`).
    LengthHolder { target: usize },
    /// Its length is carried by the field at `holder`.
    LengthTarget { holder: usize },
}

/// One encodable field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    /// Position within the struct value.
    pub index: usize,
    pub codec: Arc<dyn Codec>,
    pub kind: TypeKind,
    pub config: FieldConfig,
    pub role: FieldRole,
}

/// Resolved field table of one struct type.
///
/// Skipped and ignored fields are absent from `fields` but still count in
/// `arity`.
#[derive(Debug)]
pub struct StructFields {
    pub owner: String,
    pub arity: usize,
    pub fields: Vec<FieldDescriptor>,
}

impl StructFields {
    pub(crate) fn build(registry: &CodecRegistry, st: &StructType) -> Result<Self> {
        let owner = st.name().to_owned();
        let defs = st.fields()?;

        let mut fields = Vec::with_capacity(defs.len());
        for (index, def) in defs.iter().enumerate() {
            if def.is_skipped() {
                continue;
            }
            let config = FieldConfig::parse(&def.tag)
                .map_err(|e| Error::tag(owner.as_str(), def.name.as_str(), e.to_string()))?;
            if config.ignored {
                continue;
            }
            let kind = def.ty.kind();
            if let (TypeKind::String, Some(pd), Some(len)) =
                (kind, config.packed_decimal, config.fixed_length)
            {
                if pd.width != len {
                    return Err(Error::tag(
                        owner.as_str(),
                        def.name.as_str(),
                        format!("length:{len} disagrees with bcd8421 width {}", pd.width),
                    ));
                }
            }
            fields.push(FieldDescriptor {
                name: def.name.clone(),
                index,
                codec: registry.resolve(&def.ty),
                kind,
                config,
                role: FieldRole::Plain,
            });
        }

        let mut table = Self {
            owner,
            arity: defs.len(),
            fields,
        };
        table.link_length_refs()?;
        debug!(
            "field table for {}: {} of {} fields encoded",
            table.owner,
            table.fields.len(),
            table.arity
        );
        Ok(table)
    }

    fn link_length_refs(&mut self) -> Result<()> {
        for pos in 0..self.fields.len() {
            let Some(target_name) = self.fields[pos].config.length_ref.clone() else {
                continue;
            };
            let holder = &self.fields[pos];
            let fail = |reason: String| Error::tag(self.owner.as_str(), holder.name.as_str(), reason);

            if !holder.kind.is_numeric() {
                return Err(fail(format!(
                    "length holder must be numeric, found {}",
                    holder.kind
                )));
            }
            if target_name == holder.name {
                return Err(fail("lengthref names the field itself".into()));
            }
            if matches!(holder.role, FieldRole::LengthTarget { .. }) {
                return Err(fail("a lengthref target cannot also be a length holder".into()));
            }
            let Some(target) = self.fields.iter().position(|f| f.name == target_name) else {
                return Err(fail(format!("lengthref target `{target_name}` not found")));
            };
            let target_field = &self.fields[target];
            if target < pos {
                return Err(fail(format!(
                    "length holder must be declared before its target `{target_name}`"
                )));
            }
            if let FieldRole::LengthTarget { .. } = target_field.role {
                return Err(fail(format!(
                    "`{target_name}` already has a length holder"
                )));
            }
            if target_field.config.length_ref.is_some() {
                return Err(fail(format!(
                    "`{target_name}` is itself a length holder"
                )));
            }
            if target_field.config.fixed_length.is_some() {
                return Err(fail(format!(
                    "`{target_name}` already declares a fixed length"
                )));
            }

            self.fields[pos].role = FieldRole::LengthHolder { target };
            self.fields[target].role = FieldRole::LengthTarget { holder: pos };
        }
        Ok(())
    }
}

/// Holder value for a byte count, in the holder's own numeric type.
fn length_value(kind: TypeKind, len: usize) -> Option<Value> {
    let n = len as u64;
    Some(match kind {
        TypeKind::I8 => Value::I8(i8::try_from(len).ok()?),
        TypeKind::I16 => Value::I16(i16::try_from(len).ok()?),
        TypeKind::I32 => Value::I32(i32::try_from(len).ok()?),
        TypeKind::I64 => Value::I64(i64::try_from(len).ok()?),
        TypeKind::Int => Value::Int(i64::try_from(len).ok()?),
        TypeKind::U8 => Value::U8(u8::try_from(len).ok()?),
        TypeKind::U16 => Value::U16(u16::try_from(len).ok()?),
        TypeKind::U32 => Value::U32(u32::try_from(len).ok()?),
        TypeKind::U64 => Value::U64(n),
        TypeKind::Uint => Value::Uint(n),
        TypeKind::Uintptr => Value::Uintptr(n),
        TypeKind::F32 if n <= 1 << f32::MANTISSA_DIGITS => Value::F32(n as f32),
        TypeKind::F64 if n <= 1 << f64::MANTISSA_DIGITS => Value::F64(n as f64),
        _ => return None,
    })
}

/// Byte count carried by a decoded holder value.
fn value_length(value: &Value) -> Option<usize> {
    fn float_length(f: f64) -> Option<usize> {
        (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64)
            .then_some(f as usize)
    }

    match *value {
        Value::I8(v) => usize::try_from(v).ok(),
        Value::I16(v) => usize::try_from(v).ok(),
        Value::I32(v) => usize::try_from(v).ok(),
        Value::I64(v) | Value::Int(v) => usize::try_from(v).ok(),
        Value::U8(v) => Some(usize::from(v)),
        Value::U16(v) => Some(usize::from(v)),
        Value::U32(v) => usize::try_from(v).ok(),
        Value::U64(v) | Value::Uint(v) | Value::Uintptr(v) => usize::try_from(v).ok(),
        Value::F32(v) => float_length(f64::from(v)),
        Value::F64(v) => float_length(v),
        _ => None,
    }
}

/// Field tables are looked up on first use, so a struct declared now and
/// defined later still gets one.
pub(crate) struct StructCodec {
    ty: StructType,
    table: OnceLock<Arc<StructFields>>,
}

impl StructCodec {
    pub(crate) fn new(ty: &StructType) -> Self {
        Self {
            ty: ty.clone(),
            table: OnceLock::new(),
        }
    }

    fn table(&self, registry: &CodecRegistry) -> Result<Arc<StructFields>> {
        if let Some(table) = self.table.get() {
            return Ok(Arc::clone(table));
        }
        let table = registry.struct_fields(&self.ty)?;
        Ok(Arc::clone(self.table.get_or_init(|| table)))
    }

    fn encode_fields(&self, cursor: &mut Cursor<'_>, value: &Value) -> Result<()> {
        let table = self.table(cursor.registry())?;
        let values = match value {
            Value::Struct(values) if values.len() == table.arity => values,
            other => return Err(Error::invalid_type(self.ty.name(), other.kind_name())),
        };

        // Pre-encoded target segments, emitted when their position comes up.
        let mut staged: Vec<Option<Vec<u8>>> = vec![None; table.fields.len()];

        for (pos, field) in table.fields.iter().enumerate() {
            match field.role {
                FieldRole::Plain => {
                    let mut child = cursor.child();
                    field.codec.encode(&mut child, &values[field.index], &field.config)?;
                    let bytes = child.into_bytes();
                    cursor.write(&bytes);
                }
                FieldRole::LengthHolder { target } => {
                    let target_field = &table.fields[target];
                    let mut child = cursor.child();
                    target_field.codec.encode(
                        &mut child,
                        &values[target_field.index],
                        &target_field.config,
                    )?;
                    let data = child.into_bytes();

                    let length = length_value(field.kind, data.len()).ok_or_else(|| {
                        Error::UnsupportedValue(format!(
                            "{}.{}: length {} of `{}` does not fit in {}",
                            table.owner,
                            field.name,
                            data.len(),
                            target_field.name,
                            field.kind
                        ))
                    })?;
                    let mut child = cursor.child();
                    field.codec.encode(&mut child, &length, &field.config)?;
                    let bytes = child.into_bytes();
                    cursor.write(&bytes);
                    staged[target] = Some(data);
                }
                FieldRole::LengthTarget { .. } => match staged[pos].take() {
                    Some(data) => cursor.write(&data),
                    None => {
                        return Err(Error::Internal(format!(
                            "{}.{} was not encoded by its length holder",
                            table.owner, field.name
                        )))
                    }
                },
            }
        }
        Ok(())
    }

    fn decode_fields(&self, cursor: &mut Cursor<'_>, target: &mut Value) -> Result<()> {
        let table = self.table(cursor.registry())?;
        if !matches!(target, Value::Struct(values) if values.len() == table.arity) {
            *target = TypeDescriptor::Struct(self.ty.clone()).zero_value();
        }
        let Value::Struct(values) = target else {
            return Err(Error::Internal("struct target lost its shape".into()));
        };
        if values.len() != table.arity {
            return Err(Error::Internal(format!(
                "zero value of {} has {} fields, expected {}",
                table.owner,
                values.len(),
                table.arity
            )));
        }

        // Lengths resolved from holders during this call.
        let mut resolved: Vec<Option<usize>> = vec![None; table.fields.len()];

        for (pos, field) in table.fields.iter().enumerate() {
            let config = match resolved[pos] {
                Some(len) => Cow::Owned(field.config.with_length(len)),
                None => Cow::Borrowed(&field.config),
            };
            field.codec.decode(cursor, &mut values[field.index], &config)?;

            if let FieldRole::LengthHolder { target } = field.role {
                let len = value_length(&values[field.index]).ok_or_else(|| {
                    Error::UnsupportedValue(format!(
                        "{}.{}: {:?} is not a valid length",
                        table.owner, field.name, values[field.index]
                    ))
                })?;
                resolved[target] = Some(len);
            }
        }
        Ok(())
    }
}

// Tables of recursive structs reach this codec again.
impl fmt::Debug for StructCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructCodec")
            .field("ty", &self.ty.name())
            .field("table_ready", &self.table.get().is_some())
            .finish()
    }
}

impl Codec for StructCodec {
    fn encode(&self, cursor: &mut Cursor<'_>, value: &Value, _: &FieldConfig) -> Result<()> {
        cursor.nested(|cursor| self.encode_fields(cursor, value))
    }

    fn decode(&self, cursor: &mut Cursor<'_>, target: &mut Value, _: &FieldConfig) -> Result<()> {
        cursor.nested(|cursor| self.decode_fields(cursor, target))
    }
}
