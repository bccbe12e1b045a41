// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed bridge between Rust values and [`Value`] trees.

use crate::error::{Error, Result};
use crate::types::{TypeDescriptor, TypeKind};
use crate::value::{Reference, Slot, Value};

/// A Rust type with a codec shape.
///
/// Implemented for the scalar types, `String`, `Vec<T>`, `[T; N]`,
/// `Option<Box<T>>` and [`Slot`]; use `#[derive(Schema)]` for structs and
/// [`custom_schema!`](crate::custom_schema) for `ByteCoder` types.
pub trait Schema: Sized {
    fn type_descriptor() -> TypeDescriptor;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! impl_scalar_schema {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Schema for $ty {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::$variant
                }

                fn to_value(&self) -> Value {
                    Value::$variant(*self)
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(Error::invalid_type(TypeKind::$variant, other.kind_name())),
                    }
                }
            }
        )*
    };
}

impl_scalar_schema!(
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
);

impl Schema for isize {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Int
    }

    fn to_value(&self) -> Value {
        Value::Int(*self as i64)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(v) => isize::try_from(v)
                .map_err(|_| Error::UnsupportedValue(format!("int {v} overflows isize"))),
            other => Err(Error::invalid_type(TypeKind::Int, other.kind_name())),
        }
    }
}

impl Schema for usize {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Uint
    }

    fn to_value(&self) -> Value {
        Value::Uint(*self as u64)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uint(v) => usize::try_from(v)
                .map_err(|_| Error::UnsupportedValue(format!("uint {v} overflows usize"))),
            other => Err(Error::invalid_type(TypeKind::Uint, other.kind_name())),
        }
    }
}

impl Schema for String {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::String
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(Error::invalid_type(TypeKind::String, other.kind_name())),
        }
    }
}

impl<T: Schema> Schema for Vec<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::sequence(T::type_descriptor())
    }

    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(Schema::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Sequence(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(Error::invalid_type(Self::type_descriptor(), other.kind_name())),
        }
    }
}

impl<T: Schema, const N: usize> Schema for [T; N] {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::array(T::type_descriptor(), N)
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(Schema::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(Error::invalid_type(Self::type_descriptor(), value.kind_name()));
        };
        let found = items.len();
        let items = items
            .into_iter()
            .map(T::from_value)
            .collect::<Result<Vec<T>>>()?;
        items.try_into().map_err(|_| {
            Error::invalid_type(Self::type_descriptor(), format!("array of {found}"))
        })
    }
}

impl<T: Schema> Schema for Option<Box<T>> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::reference(T::type_descriptor())
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => Value::Ref(Reference::new(inner.to_value())),
            None => Value::Ref(Reference::null()),
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Ref(reference) => match reference.into_value() {
                Some(inner) => Ok(Some(Box::new(T::from_value(inner)?))),
                None => Ok(None),
            },
            other => Err(Error::invalid_type(Self::type_descriptor(), other.kind_name())),
        }
    }
}

impl Schema for Slot {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Dynamic
    }

    fn to_value(&self) -> Value {
        Value::Slot(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Slot(slot) => Ok(slot),
            other => Err(Error::invalid_type(TypeKind::Dynamic, other.kind_name())),
        }
    }
}

/// Implement [`Schema`] for a [`ByteCoder`](crate::ByteCoder) type.
///
/// The type must also be `Clone + PartialEq + Default`; the default value
/// is the decode target.
///
/// `custom_schema!(BcdTime, "BcdTime")` encodes the type only through its
/// own coder. `custom_schema!(BcdTime, "BcdTime", fallback = String)` lets
/// plain values of the fallback shape share the descriptor; those are
/// encoded by the fallback's codec.
#[macro_export]
macro_rules! custom_schema {
    ($ty:ty, $name:expr) => {
        $crate::custom_schema!(@impl $ty, $name, ::core::option::Option::None);
    };
    ($ty:ty, $name:expr, fallback = $fallback:ty) => {
        $crate::custom_schema!(
            @impl $ty,
            $name,
            ::core::option::Option::Some(<$fallback as $crate::Schema>::type_descriptor())
        );
    };
    (@impl $ty:ty, $name:expr, $fallback:expr) => {
        impl $crate::Schema for $ty {
            fn type_descriptor() -> $crate::TypeDescriptor {
                static TYPE: ::std::sync::OnceLock<$crate::CustomType> = ::std::sync::OnceLock::new();
                fn zero() -> $crate::Value {
                    $crate::Value::Custom($crate::CustomValue::new(
                        <$ty as ::core::default::Default>::default(),
                    ))
                }
                let ty = TYPE.get_or_init(|| {
                    let fallback: ::core::option::Option<$crate::TypeDescriptor> = $fallback;
                    match fallback {
                        ::core::option::Option::Some(fb) => $crate::CustomType::with_fallback($name, zero, fb),
                        ::core::option::Option::None => $crate::CustomType::new($name, zero),
                    }
                });
                $crate::TypeDescriptor::Custom(::core::clone::Clone::clone(ty))
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Custom($crate::CustomValue::new(::core::clone::Clone::clone(self)))
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                match value {
                    $crate::Value::Custom(custom) => custom.downcast::<$ty>().ok_or_else(|| {
                        $crate::Error::InvalidType {
                            expected: ::std::string::String::from($name),
                            found: ::std::string::String::from("another custom type"),
                        }
                    }),
                    other => ::core::result::Result::Err($crate::Error::InvalidType {
                        expected: ::std::string::String::from($name),
                        found: ::std::string::String::from(other.kind_name()),
                    }),
                }
            }
        }
    };
}
