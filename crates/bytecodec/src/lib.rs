// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # bytecodec
//!
//! Type-directed binary codec for positional wire and record formats.
//!
//! The struct shape plus a small per-field annotation language is the
//! format definition: fields are written in declaration order with no
//! type tags or framing beyond what `length` and `lengthref` fields
//! encode. Integers and floats are big-endian, `int`/`uint` are always 8
//! bytes, strings can be raw UTF-8, GBK, GB18030 or 8421 packed decimal.
//!
//! ## Quick Start
//!
//! ```
//! use bytecodec::Schema;
//!
//! #[derive(Debug, Default, PartialEq, Schema)]
//! pub struct Message {
//!     #[bytecodec("lengthref:data")]
//!     pub len: u8,
//!     pub data: String,
//! }
//!
//! let msg = Message { len: 0, data: "hi".into() };
//! let bytes = bytecodec::marshal(&msg).unwrap();
//! assert_eq!(bytes, [0x02, 0x68, 0x69]);
//!
//! let mut out = Message::default();
//! bytecodec::unmarshal(&bytes, &mut out).unwrap();
//! assert_eq!(out, Message { len: 2, data: "hi".into() });
//! ```
//!
//! ## Annotations
//!
//! | Tag                    | Meaning                                          |
//! |------------------------|--------------------------------------------------|
//! | `length:N`             | field occupies exactly N bytes                   |
//! | `lengthref:Field`      | this numeric field carries `Field`'s byte length |
//! | `gbk`, `gbk18030`      | legacy text encoding                             |
//! | `bcd8421:W[,skip]`     | packed decimal in W bytes                        |
//! | `-`                    | ignore the field                                 |
//!
//! ## Dynamic API
//!
//! Everything the derive produces is also reachable at runtime through
//! [`TypeDescriptor`], [`StructBuilder`] and [`Value`], including
//! self-referential structs ([`StructType::declare`]) and shared or cyclic
//! [`Reference`] graphs, guarded against infinite recursion.

extern crate self as bytecodec;

pub mod bcd;
pub mod codec;
pub mod config;
mod cursor;
mod engine;
mod error;
mod guard;
mod registry;
mod schema;
pub mod tags;
mod transcode;
pub mod types;
mod value;

pub use codec::{ByteCoder, Codec};
pub use config::{CodecConfig, ConfigError};
pub use cursor::Cursor;
pub use engine::Engine;
pub use error::{BoxError, Error, Result};
pub use guard::{CycleGuard, DEFAULT_CYCLE_THRESHOLD, DEFAULT_MAX_NESTING};
pub use registry::CodecRegistry;
pub use schema::Schema;
pub use tags::FieldConfig;
pub use types::{CustomType, FieldDef, StructBuilder, StructType, TypeDescriptor, TypeKind};
pub use value::{CustomValue, Dynamic, Reference, Slot, Value};

#[cfg(feature = "derive")]
pub use bytecodec_derive::Schema;

/// Encode `value` with the default engine.
pub fn marshal<T: Schema>(value: &T) -> Result<Vec<u8>> {
    Engine::default().marshal(value)
}

/// Decode `bytes` into `target` with the default engine.
pub fn unmarshal<T: Schema>(bytes: &[u8], target: &mut T) -> Result<()> {
    Engine::default().unmarshal(bytes, target)
}

/// Encode a runtime value of shape `ty` with the default engine.
pub fn marshal_dynamic(ty: &TypeDescriptor, value: &Value) -> Result<Vec<u8>> {
    Engine::default().marshal_dynamic(ty, value)
}

/// Decode through a non-null reference with the default engine.
pub fn unmarshal_dynamic(bytes: &[u8], ty: &TypeDescriptor, target: &Value) -> Result<()> {
    Engine::default().unmarshal_dynamic(bytes, ty, target)
}
