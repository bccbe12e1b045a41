// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed arrays and growable sequences.
//!
//! Elements are written back to back with no count. On decode the
//! container carves its region (the declared length, or everything left)
//! and keeps decoding elements until the region is exhausted, so the
//! container rather than the element owns the stopping condition. Only a
//! declared length is copied into a sub-cursor; the remainder is decoded
//! in place.

use super::Codec;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::tags::FieldConfig;
use crate::types::TypeDescriptor;
use crate::value::Value;
use std::sync::Arc;

const MIN_SEQUENCE_CAPACITY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Array(usize),
    Sequence,
}

#[derive(Debug)]
pub(crate) struct ContainerCodec {
    shape: Shape,
    element: Arc<dyn Codec>,
    element_ty: TypeDescriptor,
}

impl ContainerCodec {
    pub(crate) fn array(element: Arc<dyn Codec>, element_ty: TypeDescriptor, len: usize) -> Self {
        Self {
            shape: Shape::Array(len),
            element,
            element_ty,
        }
    }

    pub(crate) fn sequence(element: Arc<dyn Codec>, element_ty: TypeDescriptor) -> Self {
        Self {
            shape: Shape::Sequence,
            element,
            element_ty,
        }
    }

    fn describe(&self) -> String {
        match self.shape {
            Shape::Array(len) => TypeDescriptor::array(self.element_ty.clone(), len).to_string(),
            Shape::Sequence => TypeDescriptor::sequence(self.element_ty.clone()).to_string(),
        }
    }

    fn items<'v>(&self, value: &'v Value) -> Result<&'v [Value]> {
        match (self.shape, value) {
            (Shape::Array(len), Value::Array(items)) if items.len() == len => Ok(items),
            (Shape::Sequence, Value::Sequence(items)) => Ok(items),
            (_, other) => Err(Error::invalid_type(self.describe(), other.kind_name())),
        }
    }

    fn decode_array(&self, region: &mut Cursor<'_>, target: &mut Value, len: usize, config: &FieldConfig) -> Result<()> {
        if !matches!(target, Value::Array(items) if items.len() == len) {
            *target = TypeDescriptor::array(self.element_ty.clone(), len).zero_value();
        }
        let Value::Array(items) = target else {
            return Err(Error::Internal("array target lost its shape".into()));
        };

        let mut filled = 0;
        while filled < len && region.remaining() > 0 {
            self.element.decode(region, &mut items[filled], config)?;
            filled += 1;
        }
        for slot in &mut items[filled..] {
            *slot = self.element_ty.zero_value();
        }
        Ok(())
    }

    fn decode_sequence(&self, region: &mut Cursor<'_>, target: &mut Value, config: &FieldConfig) -> Result<()> {
        if !matches!(target, Value::Sequence(_)) {
            *target = Value::Sequence(Vec::new());
        }
        let Value::Sequence(items) = target else {
            return Err(Error::Internal("sequence target lost its shape".into()));
        };

        let mut count = 0;
        while region.remaining() > 0 {
            if count == items.len() {
                if items.len() == items.capacity() {
                    let cap = items.capacity();
                    let grown = (cap + cap / 2).max(MIN_SEQUENCE_CAPACITY);
                    items.reserve_exact(grown - items.len());
                }
                items.push(self.element_ty.zero_value());
            }

            let before = region.remaining();
            self.element.decode(region, &mut items[count], config)?;
            if region.remaining() == before {
                return Err(Error::LengthMismatch {
                    what: format!("{} element {count} consumed no bytes", self.describe()),
                    declared: before,
                    actual: 0,
                });
            }
            count += 1;
        }
        items.truncate(count);
        Ok(())
    }

    fn encode_items(&self, cursor: &mut Cursor<'_>, value: &Value, config: &FieldConfig) -> Result<()> {
        let items = self.items(value)?;
        let element_config = config.for_elements();
        let start = cursor.len();
        for item in items {
            self.element.encode(cursor, item, &element_config)?;
        }

        if let Some(declared) = config.fixed_length {
            let actual = cursor.len() - start;
            if actual != declared {
                return Err(Error::LengthMismatch {
                    what: self.describe(),
                    declared,
                    actual,
                });
            }
        }
        Ok(())
    }

    fn decode_items(&self, cursor: &mut Cursor<'_>, target: &mut Value, config: &FieldConfig) -> Result<()> {
        let element_config = config.for_elements();
        match config.fixed_length {
            Some(n) => {
                let bytes = cursor.read_exact(n)?.to_vec();
                self.decode_region(&mut cursor.region(bytes), target, &element_config)
            }
            None => {
                self.decode_region(cursor, target, &element_config)?;
                // The remainder belongs to the container even past array capacity.
                cursor.read_remaining();
                Ok(())
            }
        }
    }

    fn decode_region(&self, region: &mut Cursor<'_>, target: &mut Value, config: &FieldConfig) -> Result<()> {
        match self.shape {
            Shape::Array(len) => self.decode_array(region, target, len, config),
            Shape::Sequence => self.decode_sequence(region, target, config),
        }
    }
}

impl Codec for ContainerCodec {
    fn encode(&self, cursor: &mut Cursor<'_>, value: &Value, config: &FieldConfig) -> Result<()> {
        cursor.nested(|cursor| self.encode_items(cursor, value, config))
    }

    fn decode(&self, cursor: &mut Cursor<'_>, target: &mut Value, config: &FieldConfig) -> Result<()> {
        cursor.nested(|cursor| self.decode_items(cursor, target, config))
    }
}
