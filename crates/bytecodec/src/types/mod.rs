// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors and struct definitions.

mod builder;
mod descriptor;

pub use builder::StructBuilder;
pub use descriptor::{CustomType, FieldDef, StructType, TypeDescriptor, TypeKind};
