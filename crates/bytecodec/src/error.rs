// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by every codec.
//!
//! A failure anywhere in a recursive encode or decode abandons the whole
//! call tree; the caller receives exactly one `Error`. Errors are `Clone`
//! so a codec whose construction failed can keep the failure and hand it
//! out on every use.

use std::fmt;
use std::sync::Arc;

/// Boxed error returned by user codecs.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by marshal and unmarshal.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A value did not match the shape its descriptor promised.
    #[error("invalid type: expected {expected}, found {found}")]
    InvalidType { expected: String, found: String },

    /// The type has no codec mapping.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// The value cannot be represented (NaN, infinity, reference cycle, length overflow).
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    /// A field annotation is malformed or inconsistent with its siblings.
    #[error("tag configuration error on {owner}.{field}: {reason}")]
    TagConfiguration {
        owner: String,
        field: String,
        reason: String,
    },

    /// A declared length disagrees with the bytes actually produced or consumed.
    #[error("length mismatch for {what}: declared {declared}, actual {actual}")]
    LengthMismatch {
        what: String,
        declared: usize,
        actual: usize,
    },

    /// Decoding needs more bytes than remain in the current region.
    #[error("insufficient data: need {need} bytes, have {have}")]
    InsufficientData { need: usize, have: usize },

    /// Legacy text or packed-decimal conversion failed.
    #[error("{encoding} transcoding failed: {reason}")]
    Transcoding {
        encoding: &'static str,
        reason: String,
    },

    /// A user `ByteCoder` returned an error.
    #[error("{operation} of {type_name} failed: {source}")]
    UserCodec {
        operation: &'static str,
        type_name: String,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Unmarshal target is not a non-null reference.
    #[error("invalid unmarshal target: {0}")]
    InvalidUnmarshalTarget(String),

    /// An internal invariant was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub(crate) fn invalid_type(expected: impl fmt::Display, found: impl fmt::Display) -> Self {
        Self::InvalidType {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub(crate) fn tag(
        owner: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::TagConfiguration {
            owner: owner.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn user(operation: &'static str, type_name: impl Into<String>, source: BoxError) -> Self {
        Self::UserCodec {
            operation,
            type_name: type_name.into(),
            source: Arc::from(source),
        }
    }

    /// True when the error reports a reference cycle.
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::UnsupportedValue(msg) if msg.starts_with("encountered a cycle"))
    }
}
