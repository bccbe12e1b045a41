// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors used as registry and dispatch keys.

use crate::error::{Error, Result};
use crate::value::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// Shape of a value.
///
/// Equality and hashing are structural, except for [`StructType`] and
/// [`CustomType`] which compare by identity of their shared definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Bool,
    I8,
    I16,
    I32,
    I64,
    /// Platform integer, always 8 bytes on the wire.
    Int,
    U8,
    U16,
    U32,
    U64,
    /// Platform unsigned integer, always 8 bytes on the wire.
    Uint,
    Uintptr,
    F32,
    F64,
    String,
    /// Fixed-size array.
    Array {
        element: Arc<TypeDescriptor>,
        len: usize,
    },
    /// Growable sequence.
    Sequence(Arc<TypeDescriptor>),
    /// Nullable shared reference.
    Reference(Arc<TypeDescriptor>),
    /// Slot holding a value of any type.
    Dynamic,
    Struct(StructType),
    Custom(CustomType),
    /// A shape with no codec mapping.
    Opaque(String),
}

/// Dispatch tag of a [`TypeDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Int,
    U8,
    U16,
    U32,
    U64,
    Uint,
    Uintptr,
    F32,
    F64,
    String,
    Array,
    Sequence,
    Reference,
    Dynamic,
    Struct,
    Custom,
    Opaque,
}

impl TypeKind {
    /// True for every integer and float kind.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::Int
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::Uint
                | Self::Uintptr
                | Self::F32
                | Self::F64
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::Int => "int",
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::Uint => "uint",
            Self::Uintptr => "uintptr",
            Self::F32 => "float32",
            Self::F64 => "float64",
            Self::String => "string",
            Self::Array => "array",
            Self::Sequence => "sequence",
            Self::Reference => "reference",
            Self::Dynamic => "dynamic",
            Self::Struct => "struct",
            Self::Custom => "custom",
            Self::Opaque => "opaque",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TypeDescriptor {
    /// Fixed-size array of `len` elements.
    pub fn array(element: TypeDescriptor, len: usize) -> Self {
        Self::Array {
            element: Arc::new(element),
            len,
        }
    }

    /// Growable sequence.
    pub fn sequence(element: TypeDescriptor) -> Self {
        Self::Sequence(Arc::new(element))
    }

    /// Nullable reference to `element`.
    pub fn reference(element: TypeDescriptor) -> Self {
        Self::Reference(Arc::new(element))
    }

    /// Descriptor with no codec mapping.
    pub fn opaque(name: impl Into<String>) -> Self {
        Self::Opaque(name.into())
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Bool => TypeKind::Bool,
            Self::I8 => TypeKind::I8,
            Self::I16 => TypeKind::I16,
            Self::I32 => TypeKind::I32,
            Self::I64 => TypeKind::I64,
            Self::Int => TypeKind::Int,
            Self::U8 => TypeKind::U8,
            Self::U16 => TypeKind::U16,
            Self::U32 => TypeKind::U32,
            Self::U64 => TypeKind::U64,
            Self::Uint => TypeKind::Uint,
            Self::Uintptr => TypeKind::Uintptr,
            Self::F32 => TypeKind::F32,
            Self::F64 => TypeKind::F64,
            Self::String => TypeKind::String,
            Self::Array { .. } => TypeKind::Array,
            Self::Sequence(_) => TypeKind::Sequence,
            Self::Reference(_) => TypeKind::Reference,
            Self::Dynamic => TypeKind::Dynamic,
            Self::Struct(_) => TypeKind::Struct,
            Self::Custom(_) => TypeKind::Custom,
            Self::Opaque(_) => TypeKind::Opaque,
        }
    }

    /// Zero value of this shape.
    ///
    /// Structs are zeroed field by field; references start out null, so
    /// self-referential structs terminate.
    pub fn zero_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::I8 => Value::I8(0),
            Self::I16 => Value::I16(0),
            Self::I32 => Value::I32(0),
            Self::I64 => Value::I64(0),
            Self::Int => Value::Int(0),
            Self::U8 => Value::U8(0),
            Self::U16 => Value::U16(0),
            Self::U32 => Value::U32(0),
            Self::U64 => Value::U64(0),
            Self::Uint => Value::Uint(0),
            Self::Uintptr => Value::Uintptr(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
            Self::String => Value::String(String::new()),
            Self::Array { element, len } => {
                Value::Array((0..*len).map(|_| element.zero_value()).collect())
            }
            Self::Sequence(_) => Value::Sequence(Vec::new()),
            Self::Reference(_) => Value::Ref(crate::value::Reference::null()),
            Self::Dynamic => Value::Slot(crate::value::Slot::empty()),
            Self::Struct(st) => Value::Struct(
                st.fields()
                    .map(|fields| fields.iter().map(|f| f.ty.zero_value()).collect())
                    .unwrap_or_default(),
            ),
            Self::Custom(ct) => ct.zero_value(),
            Self::Opaque(name) => Value::Opaque(name.clone()),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array { element, len } => write!(f, "[{len}]{element}"),
            Self::Sequence(element) => write!(f, "[]{element}"),
            Self::Reference(element) => write!(f, "*{element}"),
            Self::Struct(st) => f.write_str(st.name()),
            Self::Custom(ct) => f.write_str(ct.name()),
            Self::Opaque(name) => f.write_str(name),
            other => f.write_str(other.kind().name()),
        }
    }
}

/// One declared field of a struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeDescriptor,
    /// Raw annotation string, e.g. `"gbk;length:4"`.
    pub tag: String,
    pub exported: bool,
    pub embedded: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: String::new(),
            exported: true,
            embedded: false,
        }
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }

    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// Unexported and embedded fields are never encoded, whatever their tag.
    pub fn is_skipped(&self) -> bool {
        !self.exported || self.embedded
    }
}

struct StructInner {
    name: String,
    fields: OnceLock<Vec<FieldDef>>,
    init: Option<fn() -> Vec<FieldDef>>,
}

/// Named struct definition, shared by every descriptor that mentions it.
///
/// Fields are filled in after the type exists, so a struct may refer to
/// itself through a reference, sequence or slot.
#[derive(Clone)]
pub struct StructType(Arc<StructInner>);

impl StructType {
    /// Fully defined struct.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        let st = Self::declare(name);
        // A freshly declared cell is always empty.
        let _ = st.0.fields.set(fields);
        st
    }

    /// Struct whose fields will be supplied later by [`StructType::define`].
    pub fn declare(name: impl Into<String>) -> Self {
        Self(Arc::new(StructInner {
            name: name.into(),
            fields: OnceLock::new(),
            init: None,
        }))
    }

    /// Struct whose fields are computed on first access.
    pub fn lazy(name: impl Into<String>, init: fn() -> Vec<FieldDef>) -> Self {
        Self(Arc::new(StructInner {
            name: name.into(),
            fields: OnceLock::new(),
            init: Some(init),
        }))
    }

    /// Supply the fields of a declared struct.
    pub fn define(&self, fields: Vec<FieldDef>) -> Result<()> {
        if self.0.init.is_some() {
            return Err(Error::invalid_type(
                "declared struct",
                format!("lazily defined struct {}", self.0.name),
            ));
        }
        self.0.fields.set(fields).map_err(|_| {
            Error::invalid_type(
                "undefined struct",
                format!("struct {} defined twice", self.0.name),
            )
        })
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn is_defined(&self) -> bool {
        self.0.fields.get().is_some() || self.0.init.is_some()
    }

    /// Declared fields, computing them first for lazy structs.
    pub fn fields(&self) -> Result<&[FieldDef]> {
        if let Some(fields) = self.0.fields.get() {
            return Ok(fields);
        }
        match self.0.init {
            Some(init) => Ok(self.0.fields.get_or_init(init)),
            None => Err(Error::invalid_type(
                "defined struct",
                format!("struct {} declared but never defined", self.0.name),
            )),
        }
    }
}

impl PartialEq for StructType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for StructType {}

impl Hash for StructType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StructType({})", self.0.name)
    }
}

struct CustomInner {
    name: String,
    zero: fn() -> Value,
    fallback: Option<TypeDescriptor>,
}

/// A user-defined type encoded by its own `ByteCoder`.
///
/// When a fallback descriptor is present, values that do not carry the
/// user behaviour are encoded structurally with the fallback's codec.
#[derive(Clone)]
pub struct CustomType(Arc<CustomInner>);

impl CustomType {
    pub fn new(name: impl Into<String>, zero: fn() -> Value) -> Self {
        Self(Arc::new(CustomInner {
            name: name.into(),
            zero,
            fallback: None,
        }))
    }

    pub fn with_fallback(
        name: impl Into<String>,
        zero: fn() -> Value,
        fallback: TypeDescriptor,
    ) -> Self {
        Self(Arc::new(CustomInner {
            name: name.into(),
            zero,
            fallback: Some(fallback),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn fallback(&self) -> Option<&TypeDescriptor> {
        self.0.fallback.as_ref()
    }

    pub fn zero_value(&self) -> Value {
        (self.0.zero)()
    }
}

impl PartialEq for CustomType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for CustomType {}

impl Hash for CustomType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomType({})", self.0.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_struct_identity_is_nominal() {
        let a = StructType::new("Small", vec![FieldDef::new("Tag", TypeDescriptor::String)]);
        let b = StructType::new("Small", vec![FieldDef::new("Tag", TypeDescriptor::String)]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());

        let mut set = HashSet::new();
        set.insert(TypeDescriptor::Struct(a.clone()));
        set.insert(TypeDescriptor::Struct(a));
        set.insert(TypeDescriptor::Struct(b));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(
            TypeDescriptor::sequence(TypeDescriptor::U16),
            TypeDescriptor::sequence(TypeDescriptor::U16)
        );
        assert_ne!(
            TypeDescriptor::array(TypeDescriptor::U8, 4),
            TypeDescriptor::array(TypeDescriptor::U8, 5)
        );
    }

    #[test]
    fn test_declare_then_define_self_reference() {
        let node = StructType::declare("Node");
        assert!(node.fields().is_err());
        node.define(vec![
            FieldDef::new("Value", TypeDescriptor::U8),
            FieldDef::new(
                "Next",
                TypeDescriptor::reference(TypeDescriptor::Struct(node.clone())),
            ),
        ])
        .unwrap();
        assert_eq!(node.fields().unwrap().len(), 2);
        assert_eq!(node.fields().unwrap()[1].name, "Next");
        assert!(node.define(Vec::new()).is_err());

        let zero = TypeDescriptor::Struct(node).zero_value();
        match zero {
            Value::Struct(fields) => {
                assert_eq!(fields[0], Value::U8(0));
                assert!(fields[1].as_reference().unwrap().is_null());
            }
            other => panic!("unexpected zero {other:?}"),
        }
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(
            TypeDescriptor::array(TypeDescriptor::U8, 3).zero_value(),
            Value::Array(vec![Value::U8(0); 3])
        );
        assert_eq!(
            TypeDescriptor::sequence(TypeDescriptor::String).zero_value(),
            Value::Sequence(Vec::new())
        );
        assert_eq!(TypeDescriptor::F64.zero_value(), Value::F64(0.0));
    }

    #[test]
    fn test_display() {
        let ty = TypeDescriptor::reference(TypeDescriptor::sequence(TypeDescriptor::U8));
        assert_eq!(ty.to_string(), "*[]uint8");
        assert_eq!(TypeDescriptor::array(TypeDescriptor::I16, 2).to_string(), "[2]int16");
    }

    #[test]
    fn test_numeric_kinds() {
        assert!(TypeKind::F32.is_numeric());
        assert!(TypeKind::Uintptr.is_numeric());
        assert!(!TypeKind::String.is_numeric());
        assert!(!TypeKind::Bool.is_numeric());
    }
}
