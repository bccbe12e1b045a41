// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field annotation parsing.
//!
//! Grammar: semicolon-separated `key` or `key:value` tokens.
//!
//! ```text
//! length:<N>            fixed byte length of the field
//! lengthref:<Field>     this field carries the byte length of <Field>
//! gbk | gbk18030        legacy text encoding
//! bcd8421:<w>[,<bool>]  packed decimal, w bytes, skip leading zeros on decode
//! -                     ignore the field
//! ```

use thiserror::Error;

/// Legacy text encoding of a string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    None,
    Gbk,
    Gb18030,
}

/// Packed-decimal parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedDecimal {
    pub width: usize,
    pub skip_leading_zeros: bool,
}

/// Parsed annotation of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldConfig {
    pub ignored: bool,
    /// Exact byte length; `None` means "until the end of the region".
    pub fixed_length: Option<usize>,
    /// Name of the sibling whose byte length this field holds.
    pub length_ref: Option<String>,
    pub encoding: TextEncoding,
    pub packed_decimal: Option<PackedDecimal>,
}

/// Annotation parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("unknown tag key `{0}`")]
    UnknownKey(String),
    #[error("tag `{key}` has invalid value `{value}`")]
    InvalidValue { key: String, value: String },
    #[error("tag `{0}` requires a value")]
    MissingValue(String),
    #[error("tag `{0}` takes no value")]
    UnexpectedValue(String),
    #[error("gbk and gbk18030 are mutually exclusive")]
    ConflictingEncodings,
    #[error("length and lengthref are mutually exclusive")]
    LengthWithLengthRef,
}

impl FieldConfig {
    /// Parse an annotation string. An empty string yields the default configuration.
    pub fn parse(tag: &str) -> Result<Self, TagError> {
        let mut config = Self::default();

        for token in tag.split(';').map(str::trim).filter(|t| !t.is_empty()) {
            let (key, value) = match token.split_once(':') {
                Some((k, v)) => (k.trim(), Some(v.trim())),
                None => (token, None),
            };

            match key {
                "-" => {
                    if value.is_some() {
                        return Err(TagError::UnexpectedValue(key.to_owned()));
                    }
                    config.ignored = true;
                }
                "length" => {
                    let raw = require(key, value)?;
                    let n = raw.parse::<usize>().map_err(|_| invalid(key, raw))?;
                    config.fixed_length = Some(n);
                }
                "lengthref" => {
                    let raw = require(key, value)?;
                    config.length_ref = Some(raw.to_owned());
                }
                "gbk" | "gbk18030" => {
                    if value.is_some() {
                        return Err(TagError::UnexpectedValue(key.to_owned()));
                    }
                    let encoding = if key == "gbk" {
                        TextEncoding::Gbk
                    } else {
                        TextEncoding::Gb18030
                    };
                    if config.encoding != TextEncoding::None && config.encoding != encoding {
                        return Err(TagError::ConflictingEncodings);
                    }
                    config.encoding = encoding;
                }
                "bcd8421" => {
                    let raw = require(key, value)?;
                    config.packed_decimal = Some(parse_packed_decimal(key, raw)?);
                }
                other => return Err(TagError::UnknownKey(other.to_owned())),
            }
        }

        if config.fixed_length.is_some() && config.length_ref.is_some() {
            return Err(TagError::LengthWithLengthRef);
        }
        Ok(config)
    }

    /// Configuration handed to container elements: lengths bound the
    /// container, not each element.
    pub fn for_elements(&self) -> Self {
        Self {
            fixed_length: None,
            length_ref: None,
            ..self.clone()
        }
    }

    /// Copy with the fixed length replaced, used for resolved lengthref targets.
    pub fn with_length(&self, len: usize) -> Self {
        Self {
            fixed_length: Some(len),
            ..self.clone()
        }
    }
}

fn require<'a>(key: &str, value: Option<&'a str>) -> Result<&'a str, TagError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(TagError::MissingValue(key.to_owned())),
    }
}

fn invalid(key: &str, value: &str) -> TagError {
    TagError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
    }
}

fn parse_packed_decimal(key: &str, raw: &str) -> Result<PackedDecimal, TagError> {
    let (width, skip) = match raw.split_once(',') {
        Some((w, s)) => (w.trim(), Some(s.trim())),
        None => (raw, None),
    };
    let width = match width.parse::<usize>() {
        Ok(w) if w > 0 => w,
        _ => return Err(invalid(key, raw)),
    };
    let skip_leading_zeros = match skip {
        None => false,
        Some(s) => s.parse::<bool>().map_err(|_| invalid(key, raw))?,
    };
    Ok(PackedDecimal {
        width,
        skip_leading_zeros,
    })
}
