// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec variants and the descriptor-to-codec mapping.
//!
//! | Descriptor                         | Codec            | Wire                 |
//! |------------------------------------|------------------|----------------------|
//! | bool, int8, uint8                  | fixed width      | 1 byte               |
//! | int16, uint16                      | fixed width      | 2 bytes big-endian   |
//! | int32, uint32, float32             | fixed width      | 4 bytes big-endian   |
//! | int, int64, uint, uint64, uintptr, float64 | fixed width | 8 bytes big-endian |
//! | string                             | text             | raw, legacy or BCD   |
//! | array, sequence                    | container        | elements, no count   |
//! | reference                          | reference        | pointee or nothing   |
//! | dynamic                            | slot             | held value or nothing|
//! | struct                             | struct           | fields in order      |
//! | custom                             | user             | user defined         |
//! | opaque                             | unsupported      | error                |

mod container;
mod custom;
mod dynamic;
mod primitive;
mod reference;
mod structs;
mod text;
mod unsupported;

pub use custom::ByteCoder;
pub use structs::{FieldDescriptor, FieldRole, StructFields};

use crate::cursor::Cursor;
use crate::error::Result;
use crate::registry::CodecRegistry;
use crate::tags::FieldConfig;
use crate::types::TypeDescriptor;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Encode/decode strategy for one type shape.
///
/// Codecs are built once per descriptor and shared between threads; all
/// per-call state lives in the [`Cursor`].
pub trait Codec: Send + Sync + fmt::Debug {
    /// Append one value to the cursor.
    fn encode(&self, cursor: &mut Cursor<'_>, value: &Value, config: &FieldConfig) -> Result<()>;

    /// Consume one value from the cursor into `target`, reusing its storage.
    fn decode(&self, cursor: &mut Cursor<'_>, target: &mut Value, config: &FieldConfig)
        -> Result<()>;
}

/// Build the codec for `ty`. Sub-codecs are resolved through `registry`,
/// which hands out placeholders for types still under construction.
pub(crate) fn build(registry: &CodecRegistry, ty: &TypeDescriptor) -> Arc<dyn Codec> {
    use primitive::*;

    match ty {
        TypeDescriptor::Bool => Arc::new(BoolCodec),
        TypeDescriptor::I8 => Arc::new(I8Codec),
        TypeDescriptor::I16 => Arc::new(I16Codec),
        TypeDescriptor::I32 => Arc::new(I32Codec),
        TypeDescriptor::I64 => Arc::new(I64Codec),
        TypeDescriptor::Int => Arc::new(IntCodec),
        TypeDescriptor::U8 => Arc::new(U8Codec),
        TypeDescriptor::U16 => Arc::new(U16Codec),
        TypeDescriptor::U32 => Arc::new(U32Codec),
        TypeDescriptor::U64 => Arc::new(U64Codec),
        TypeDescriptor::Uint => Arc::new(UintCodec),
        TypeDescriptor::Uintptr => Arc::new(UintptrCodec),
        TypeDescriptor::F32 => Arc::new(F32Codec),
        TypeDescriptor::F64 => Arc::new(F64Codec),
        TypeDescriptor::String => Arc::new(text::TextCodec),
        TypeDescriptor::Array { element, len } => Arc::new(container::ContainerCodec::array(
            registry.resolve(element),
            TypeDescriptor::clone(element),
            *len,
        )),
        TypeDescriptor::Sequence(element) => Arc::new(container::ContainerCodec::sequence(
            registry.resolve(element),
            TypeDescriptor::clone(element),
        )),
        TypeDescriptor::Reference(element) => Arc::new(reference::RefCodec::new(
            registry.resolve(element),
            TypeDescriptor::clone(element),
        )),
        TypeDescriptor::Dynamic => Arc::new(dynamic::SlotCodec),
        TypeDescriptor::Struct(st) => Arc::new(structs::StructCodec::new(st)),
        TypeDescriptor::Custom(ct) => match ct.fallback() {
            Some(fallback) => Arc::new(custom::ConditionalCodec::new(
                ct.clone(),
                registry.resolve(fallback),
            )),
            None => Arc::new(custom::UserCodec::new(ct.clone())),
        },
        TypeDescriptor::Opaque(name) => Arc::new(unsupported::UnsupportedCodec::new(name)),
    }
}
