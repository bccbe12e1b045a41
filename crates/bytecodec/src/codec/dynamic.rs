// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::Codec;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::tags::FieldConfig;
use crate::types::TypeKind;
use crate::value::{Slot, Value};

/// Dynamic slots delegate to the codec of the value they currently hold.
#[derive(Debug)]
pub(crate) struct SlotCodec;

impl Codec for SlotCodec {
    fn encode(&self, cursor: &mut Cursor<'_>, value: &Value, config: &FieldConfig) -> Result<()> {
        let Value::Slot(slot) = value else {
            return Err(Error::invalid_type(TypeKind::Dynamic, value.kind_name()));
        };
        match slot.get() {
            Some(held) => {
                cursor.nested(|cursor| cursor.encode_value(&held.ty, &held.value, config))
            }
            None => Ok(()),
        }
    }

    fn decode(&self, cursor: &mut Cursor<'_>, target: &mut Value, config: &FieldConfig) -> Result<()> {
        if !matches!(target, Value::Slot(_)) {
            *target = Value::Slot(Slot::empty());
        }
        let Value::Slot(slot) = target else {
            return Err(Error::Internal("slot target lost its shape".into()));
        };
        match slot.get_mut() {
            Some(held) => {
                cursor.nested(|cursor| cursor.decode_value(&held.ty, &mut held.value, config))
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::CycleGuard;
    use crate::registry::CodecRegistry;
    use crate::types::TypeDescriptor;

    #[test]
    fn test_slot_delegates_to_held_type() {
        let registry = CodecRegistry::new();
        let mut guard = CycleGuard::default();
        let mut cursor = Cursor::new(&registry, &mut guard);
        let slot = Value::Slot(Slot::of(&5.2f64));
        SlotCodec
            .encode(&mut cursor, &slot, &FieldConfig::default())
            .unwrap();
        assert_eq!(
            cursor.into_bytes(),
            vec![0x40, 0x14, 0xcc, 0xcc, 0xcc, 0xcc, 0xcc, 0xcd]
        );
    }

    #[test]
    fn test_empty_slot_is_noop() {
        let registry = CodecRegistry::new();
        let mut guard = CycleGuard::default();
        let mut cursor = Cursor::with_bytes(&registry, &mut guard, vec![1, 2]);
        let mut out = Value::Slot(Slot::empty());
        SlotCodec
            .decode(&mut cursor, &mut out, &FieldConfig::default())
            .unwrap();
        assert_eq!(cursor.remaining(), 2);
        assert_eq!(out, Value::Slot(Slot::empty()));
    }

    #[test]
    fn test_decode_into_held_type() {
        let registry = CodecRegistry::new();
        let mut guard = CycleGuard::default();
        let mut cursor = Cursor::with_bytes(&registry, &mut guard, vec![0x12, 0x34]);
        let mut out = Value::Slot(Slot::new(TypeDescriptor::U16, Value::U16(0)));
        SlotCodec
            .decode(&mut cursor, &mut out, &FieldConfig::default())
            .unwrap();
        assert_eq!(out, Value::Slot(Slot::new(TypeDescriptor::U16, Value::U16(0x1234))));
    }
}
