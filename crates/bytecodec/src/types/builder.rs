// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for struct types.

use crate::error::Result;
use crate::types::{FieldDef, StructType, TypeDescriptor};

/// Builder for creating StructType instances.
#[derive(Debug)]
pub struct StructBuilder {
    name: String,
    fields: Vec<FieldDef>,
}

impl StructBuilder {
    /// Create a new builder for a struct type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add an untagged field.
    pub fn field(self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.with(FieldDef::new(name, ty))
    }

    /// Add a field with an annotation string.
    pub fn tagged(self, name: impl Into<String>, ty: TypeDescriptor, tag: impl Into<String>) -> Self {
        self.with(FieldDef::new(name, ty).tagged(tag))
    }

    /// Add a field that keeps its position but is never encoded.
    pub fn unexported(self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.with(FieldDef::new(name, ty).unexported())
    }

    /// Add an embedded field; like unexported fields it is never encoded.
    pub fn embedded(self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.with(FieldDef::new(name, ty).embedded())
    }

    /// Add a prepared field definition.
    pub fn with(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Build the StructType.
    pub fn build(self) -> StructType {
        StructType::new(self.name, self.fields)
    }

    /// Supply the fields of a type created with [`StructType::declare`].
    pub fn define_into(self, declared: &StructType) -> Result<()> {
        declared.define(self.fields)
    }
}
