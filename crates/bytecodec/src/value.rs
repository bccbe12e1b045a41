// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime values walked by the codecs.

use crate::codec::ByteCoder;
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::types::TypeDescriptor;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A value of any supported shape.
///
/// Struct values are positional: one entry per declared field, ignored
/// fields included.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Int(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Uint(u64),
    Uintptr(u64),
    F32(f32),
    F64(f64),
    String(String),
    Array(Vec<Value>),
    Sequence(Vec<Value>),
    Ref(Reference),
    Slot(Slot),
    Struct(Vec<Value>),
    Custom(CustomValue),
    /// Placeholder for a shape without codec mapping.
    Opaque(String),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::I8(_) => "int8",
            Self::I16(_) => "int16",
            Self::I32(_) => "int32",
            Self::I64(_) => "int64",
            Self::Int(_) => "int",
            Self::U8(_) => "uint8",
            Self::U16(_) => "uint16",
            Self::U32(_) => "uint32",
            Self::U64(_) => "uint64",
            Self::Uint(_) => "uint",
            Self::Uintptr(_) => "uintptr",
            Self::F32(_) => "float32",
            Self::F64(_) => "float64",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Sequence(_) => "sequence",
            Self::Ref(_) => "reference",
            Self::Slot(_) => "dynamic",
            Self::Struct(_) => "struct",
            Self::Custom(_) => "custom",
            Self::Opaque(_) => "opaque",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Ref(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_slot(&self) -> Option<&Slot> {
        match self {
            Self::Slot(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_fields(&self) -> Option<&[Value]> {
        match self {
            Self::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_elements(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) | Self::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<Reference> for Value {
    fn from(v: Reference) -> Self {
        Self::Ref(v)
    }
}

impl From<Slot> for Value {
    fn from(v: Slot) -> Self {
        Self::Slot(v)
    }
}

/// Nullable shared mutable storage.
///
/// Two references are the same reference when they point at the same
/// allocation; the cycle guard tracks that identity.
#[derive(Clone, Default)]
pub struct Reference(Option<Rc<RefCell<Value>>>);

impl Reference {
    pub fn null() -> Self {
        Self(None)
    }

    pub fn new(value: Value) -> Self {
        Self(Some(Rc::new(RefCell::new(value))))
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn cell(&self) -> Option<&Rc<RefCell<Value>>> {
        self.0.as_ref()
    }

    /// Allocation address, `None` when null.
    pub fn identity(&self) -> Option<usize> {
        self.0.as_ref().map(|rc| Rc::as_ptr(rc) as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Replace the pointee, allocating when null.
    pub fn set(&mut self, value: Value) {
        match &self.0 {
            Some(cell) => *cell.borrow_mut() = value,
            None => self.0 = Some(Rc::new(RefCell::new(value))),
        }
    }

    /// Copy of the pointee.
    pub fn get(&self) -> Option<Value> {
        self.0.as_ref().map(|cell| cell.borrow().clone())
    }

    /// Take the pointee out, cloning when other handles still share it.
    pub fn into_value(self) -> Option<Value> {
        self.0.map(|rc| match Rc::try_unwrap(rc) {
            Ok(cell) => cell.into_inner(),
            Err(shared) => shared.borrow().clone(),
        })
    }
}

impl PartialEq for Reference {
    /// Same identity, or both non-null with equal pointees.
    ///
    /// Comparing two distinct cyclic graphs does not terminate.
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => match (a.try_borrow(), b.try_borrow()) {
                (Ok(a), Ok(b)) => *a == *b,
                _ => false,
            },
            _ => false,
        }
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identity() {
            Some(addr) => write!(f, "Reference({addr:#x})"),
            None => f.write_str("Reference(null)"),
        }
    }
}

/// A value together with its descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Dynamic {
    pub ty: TypeDescriptor,
    pub value: Value,
}

impl Dynamic {
    pub fn new(ty: TypeDescriptor, value: Value) -> Self {
        Self { ty, value }
    }

    pub fn of<T: Schema>(value: &T) -> Self {
        Self {
            ty: T::type_descriptor(),
            value: value.to_value(),
        }
    }

    /// Convert back into a typed value.
    pub fn to_typed<T: Schema>(&self) -> Result<T> {
        if self.ty != T::type_descriptor() {
            return Err(Error::invalid_type(T::type_descriptor(), &self.ty));
        }
        T::from_value(self.value.clone())
    }
}

/// Contents of a dynamic field: empty or one value of any type.
///
/// An empty slot encodes to zero bytes and decodes as a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slot(Option<Box<Dynamic>>);

impl Slot {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn new(ty: TypeDescriptor, value: Value) -> Self {
        Self(Some(Box::new(Dynamic::new(ty, value))))
    }

    pub fn of<T: Schema>(value: &T) -> Self {
        Self(Some(Box::new(Dynamic::of(value))))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn get(&self) -> Option<&Dynamic> {
        self.0.as_deref()
    }

    pub fn get_mut(&mut self) -> Option<&mut Dynamic> {
        self.0.as_deref_mut()
    }
}

impl From<Dynamic> for Slot {
    fn from(d: Dynamic) -> Self {
        Self(Some(Box::new(d)))
    }
}

/// Object-safe view of a user coder.
trait ErasedCoder: 'static {
    fn coder(&self) -> &dyn ByteCoder;
    fn coder_mut(&mut self) -> &mut dyn ByteCoder;
    fn clone_box(&self) -> Box<dyn ErasedCoder>;
    fn eq_dyn(&self, other: &dyn ErasedCoder) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn type_name(&self) -> &'static str;
}

impl<T> ErasedCoder for T
where
    T: ByteCoder + Clone + PartialEq,
{
    fn coder(&self) -> &dyn ByteCoder {
        self
    }

    fn coder_mut(&mut self) -> &mut dyn ByteCoder {
        self
    }

    fn clone_box(&self) -> Box<dyn ErasedCoder> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn ErasedCoder) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A user value carrying its own `ByteCoder` behaviour.
pub struct CustomValue(Box<dyn ErasedCoder>);

impl CustomValue {
    pub fn new<T: ByteCoder + Clone + PartialEq>(value: T) -> Self {
        Self(Box::new(value))
    }

    pub fn coder(&self) -> &dyn ByteCoder {
        self.0.coder()
    }

    pub fn coder_mut(&mut self) -> &mut dyn ByteCoder {
        self.0.coder_mut()
    }

    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.0.as_any_mut().downcast_mut()
    }

    /// Unwrap into the concrete user type.
    pub fn downcast<T: 'static>(self) -> Option<T> {
        self.0.into_any().downcast::<T>().ok().map(|boxed| *boxed)
    }
}

impl Clone for CustomValue {
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_dyn(other.0.as_ref())
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0.coder(), f)
    }
}
