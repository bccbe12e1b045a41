// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read/write head threaded through every codec call.

use crate::error::{Error, Result};
use crate::guard::CycleGuard;
use crate::registry::CodecRegistry;
use crate::schema::Schema;
use crate::tags::FieldConfig;
use crate::types::TypeDescriptor;
use crate::value::Value;

/// Stack left before a nested call switches to a fresh segment.
const STACK_RED_ZONE: usize = 64 * 1024;
/// Size of each additional stack segment.
const STACK_SEGMENT: usize = 1024 * 1024;

/// Byte buffer plus read offset, bound to one call tree.
///
/// Encoding appends to the buffer; decoding consumes it from the front.
/// Child cursors share the parent's cycle guard and registry.
pub struct Cursor<'a> {
    buf: Vec<u8>,
    pos: usize,
    guard: &'a mut CycleGuard,
    registry: &'a CodecRegistry,
}

impl<'a> Cursor<'a> {
    /// Empty cursor for encoding.
    pub fn new(registry: &'a CodecRegistry, guard: &'a mut CycleGuard) -> Self {
        Self::with_bytes(registry, guard, Vec::new())
    }

    /// Cursor pre-loaded with input for decoding.
    pub fn with_bytes(
        registry: &'a CodecRegistry,
        guard: &'a mut CycleGuard,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            buf: bytes,
            pos: 0,
            guard,
            registry,
        }
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Bytes held by the buffer, read or not.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Consume exactly `n` bytes.
    pub fn read_exact(&mut self, n: usize) -> Result<&[u8]> {
        let have = self.remaining();
        if n > have {
            return Err(Error::InsufficientData { need: n, have });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.buf[start..self.pos])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_exact(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_exact(1)?[0])
    }

    /// Consume everything left.
    pub fn read_remaining(&mut self) -> &[u8] {
        let start = self.pos;
        self.pos = self.buf.len();
        &self.buf[start..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Empty cursor for measuring an isolated encoding.
    pub fn child(&mut self) -> Cursor<'_> {
        Cursor {
            buf: Vec::new(),
            pos: 0,
            guard: &mut *self.guard,
            registry: self.registry,
        }
    }

    /// Cursor over a copied region, used to bound a decode.
    pub fn region(&mut self, bytes: Vec<u8>) -> Cursor<'_> {
        Cursor {
            buf: bytes,
            pos: 0,
            guard: &mut *self.guard,
            registry: self.registry,
        }
    }

    pub fn guard(&mut self) -> &mut CycleGuard {
        &mut *self.guard
    }

    pub fn registry(&self) -> &'a CodecRegistry {
        self.registry
    }

    /// Run `f` one composite level deeper.
    ///
    /// Fails once the guard's nesting limit is reached. The stack is grown
    /// on the heap when it runs low, so deep values never overflow it.
    pub(crate) fn nested<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        self.guard.descend()?;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || f(&mut *self));
        self.guard.ascend();
        result
    }

    /// Encode a sub-value with its own codec.
    pub fn encode<T: Schema>(&mut self, value: &T) -> Result<()> {
        self.encode_value(&T::type_descriptor(), &value.to_value(), &FieldConfig::default())
    }

    /// Decode a sub-value into a fresh zero value.
    pub fn decode<T: Schema>(&mut self) -> Result<T> {
        let ty = T::type_descriptor();
        let mut value = ty.zero_value();
        self.decode_value(&ty, &mut value, &FieldConfig::default())?;
        T::from_value(value)
    }

    pub fn encode_value(
        &mut self,
        ty: &TypeDescriptor,
        value: &Value,
        config: &FieldConfig,
    ) -> Result<()> {
        let codec = self.registry.resolve(ty);
        codec.encode(self, value, config)
    }

    pub fn decode_value(
        &mut self,
        ty: &TypeDescriptor,
        target: &mut Value,
        config: &FieldConfig,
    ) -> Result<()> {
        let codec = self.registry.resolve(ty);
        codec.decode(self, target, config)
    }
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("len", &self.buf.len())
            .field("pos", &self.pos)
            .field("depth", &self.guard.depth())
            .field("nesting", &self.guard.nesting())
            .finish()
    }
}
