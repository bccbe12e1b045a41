// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::Codec;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::tags::FieldConfig;
use crate::value::Value;

/// Codec for shapes with no mapping; fails both ways.
#[derive(Debug)]
pub(crate) struct UnsupportedCodec {
    name: String,
}

impl UnsupportedCodec {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

impl Codec for UnsupportedCodec {
    fn encode(&self, _: &mut Cursor<'_>, _: &Value, _: &FieldConfig) -> Result<()> {
        Err(Error::UnsupportedType(self.name.clone()))
    }

    fn decode(&self, _: &mut Cursor<'_>, _: &mut Value, _: &FieldConfig) -> Result<()> {
        Err(Error::UnsupportedType(self.name.clone()))
    }
}
