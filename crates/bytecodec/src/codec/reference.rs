// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Nullable references.
//!
//! A null reference writes nothing. A non-null reference is encoded as its
//! pointee, under the cycle guard. On decode a null target is first
//! allocated with the pointee's zero value.

use super::Codec;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::tags::FieldConfig;
use crate::types::TypeDescriptor;
use crate::value::{Reference, Value};
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct RefCodec {
    element: Arc<dyn Codec>,
    element_ty: TypeDescriptor,
}

impl RefCodec {
    pub(crate) fn new(element: Arc<dyn Codec>, element_ty: TypeDescriptor) -> Self {
        Self {
            element,
            element_ty,
        }
    }

    fn cycle(&self) -> Error {
        Error::UnsupportedValue(format!("encountered a cycle via *{}", self.element_ty))
    }
}

impl Codec for RefCodec {
    fn encode(&self, cursor: &mut Cursor<'_>, value: &Value, config: &FieldConfig) -> Result<()> {
        let Value::Ref(reference) = value else {
            return Err(Error::invalid_type(
                TypeDescriptor::reference(self.element_ty.clone()),
                value.kind_name(),
            ));
        };
        let (Some(cell), Some(identity)) = (reference.cell(), reference.identity()) else {
            return Ok(());
        };

        cursor.guard().enter(identity, &self.element_ty)?;
        let result = match cell.try_borrow() {
            Ok(pointee) => {
                cursor.nested(|cursor| self.element.encode(cursor, &pointee, config))
            }
            Err(_) => Err(self.cycle()),
        };
        cursor.guard().leave(identity);
        result
    }

    fn decode(&self, cursor: &mut Cursor<'_>, target: &mut Value, config: &FieldConfig) -> Result<()> {
        if !matches!(target, Value::Ref(_)) {
            *target = Value::Ref(Reference::null());
        }
        let Value::Ref(reference) = target else {
            return Err(Error::Internal("reference target lost its shape".into()));
        };
        if reference.is_null() {
            reference.set(self.element_ty.zero_value());
        }
        let (Some(cell), Some(identity)) = (reference.cell().cloned(), reference.identity()) else {
            return Err(Error::Internal("allocated reference is null".into()));
        };

        cursor.guard().enter(identity, &self.element_ty)?;
        let result = match cell.try_borrow_mut() {
            Ok(mut pointee) => {
                cursor.nested(|cursor| self.element.decode(cursor, &mut pointee, config))
            }
            Err(_) => Err(self.cycle()),
        };
        cursor.guard().leave(identity);
        result
    }
}
