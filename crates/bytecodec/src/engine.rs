// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Top-level marshal and unmarshal.

use crate::config::CodecConfig;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::guard::CycleGuard;
use crate::registry::CodecRegistry;
use crate::schema::Schema;
use crate::tags::FieldConfig;
use crate::types::TypeDescriptor;
use crate::value::Value;
use log::trace;
use std::sync::Arc;

/// A registry plus the settings every call tree starts from.
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<CodecRegistry>,
    config: CodecConfig,
}

impl Default for Engine {
    /// Engine on the process-wide registry.
    fn default() -> Self {
        Self::with_registry(CodecRegistry::shared(), CodecConfig::default())
    }
}

impl Engine {
    /// Engine with a private registry.
    pub fn new(config: CodecConfig) -> Self {
        Self::with_registry(Arc::new(CodecRegistry::new()), config)
    }

    pub fn with_registry(registry: Arc<CodecRegistry>, config: CodecConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<CodecRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode a typed value.
    pub fn marshal<T: Schema>(&self, value: &T) -> Result<Vec<u8>> {
        self.marshal_dynamic(&T::type_descriptor(), &value.to_value())
    }

    /// Decode into `target`. On error `target` is left untouched.
    pub fn unmarshal<T: Schema>(&self, bytes: &[u8], target: &mut T) -> Result<()> {
        let ty = T::type_descriptor();
        let mut value = target.to_value();
        self.run_decode(&ty, bytes, &mut value)?;
        *target = T::from_value(value)?;
        Ok(())
    }

    /// Encode `value` as the shape `ty`.
    pub fn marshal_dynamic(&self, ty: &TypeDescriptor, value: &Value) -> Result<Vec<u8>> {
        let codec = self.registry.resolve(ty);
        let mut guard = self.new_guard();
        let bytes = {
            let mut cursor = Cursor::new(&self.registry, &mut guard);
            codec.encode(&mut cursor, value, &FieldConfig::default())?;
            cursor.into_bytes()
        };
        Self::finish(&guard)?;
        trace!("marshal {ty}: {} bytes", bytes.len());
        Ok(bytes)
    }

    /// Decode through the reference `target`, mutating the storage it
    /// points at. `ty` must be a reference descriptor and `target` a
    /// non-null reference.
    pub fn unmarshal_dynamic(&self, bytes: &[u8], ty: &TypeDescriptor, target: &Value) -> Result<()> {
        if !matches!(ty, TypeDescriptor::Reference(_)) {
            return Err(Error::InvalidUnmarshalTarget(format!(
                "{ty} is not a reference type"
            )));
        }
        let reference = match target {
            Value::Ref(reference) if !reference.is_null() => reference,
            Value::Ref(_) => {
                return Err(Error::InvalidUnmarshalTarget(format!("null {ty}")));
            }
            other => {
                return Err(Error::InvalidUnmarshalTarget(format!(
                    "{} value is not a reference",
                    other.kind_name()
                )));
            }
        };
        let mut handle = Value::Ref(reference.clone());
        self.run_decode(ty, bytes, &mut handle)
    }

    fn run_decode(&self, ty: &TypeDescriptor, bytes: &[u8], target: &mut Value) -> Result<()> {
        let codec = self.registry.resolve(ty);
        let mut guard = self.new_guard();
        let consumed = {
            let mut cursor = Cursor::with_bytes(&self.registry, &mut guard, bytes.to_vec());
            codec.decode(&mut cursor, target, &FieldConfig::default())?;
            bytes.len() - cursor.remaining()
        };
        Self::finish(&guard)?;
        trace!("unmarshal {ty}: {consumed} of {} bytes", bytes.len());
        Ok(())
    }

    fn new_guard(&self) -> CycleGuard {
        CycleGuard::new(self.config.cycle_detection_after)
            .with_max_nesting(self.config.max_nesting)
    }

    fn finish(guard: &CycleGuard) -> Result<()> {
        if guard.is_clear() {
            Ok(())
        } else {
            Err(Error::Internal(format!(
                "cycle guard not empty after call (depth {}, nesting {})",
                guard.depth(),
                guard.nesting()
            )))
        }
    }
}
