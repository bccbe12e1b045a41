// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concurrent memo table from type descriptors to codecs.
//!
//! The first resolver of a type publishes a [`PendingCodec`] placeholder
//! before building the real codec. Anyone resolving the same type in the
//! meantime (another thread, or a construction that reaches its own type)
//! receives the placeholder, which blocks on use until
//! the real codec is published and then forwards to it. No map shard
//! lock is held while a codec is being built, so unrelated types never
//! wait on each other.

use crate::codec::{self, Codec, StructFields};
use crate::cursor::Cursor;
use crate::error::Result;
use crate::tags::FieldConfig;
use crate::types::{StructType, TypeDescriptor};
use crate::value::Value;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, trace};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Codec placeholder for a type under construction.
pub(crate) struct PendingCodec {
    ty: TypeDescriptor,
    ready: OnceLock<Arc<dyn Codec>>,
    lock: Mutex<()>,
    published: Condvar,
}

impl PendingCodec {
    fn new(ty: TypeDescriptor) -> Self {
        Self {
            ty,
            ready: OnceLock::new(),
            lock: Mutex::new(()),
            published: Condvar::new(),
        }
    }

    fn publish(&self, codec: Arc<dyn Codec>) {
        let _ = self.ready.set(codec);
        let _guard = self.lock.lock();
        self.published.notify_all();
    }

    fn wait(&self) -> Arc<dyn Codec> {
        if let Some(codec) = self.ready.get() {
            return Arc::clone(codec);
        }
        trace!("waiting for codec of {}", self.ty);
        let mut guard = self.lock.lock();
        loop {
            // Checked under the lock, so a publish cannot slip in unnoticed.
            if let Some(codec) = self.ready.get() {
                return Arc::clone(codec);
            }
            self.published.wait(&mut guard);
        }
    }
}

impl fmt::Debug for PendingCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCodec")
            .field("ty", &self.ty.to_string())
            .field("ready", &self.ready.get().is_some())
            .finish()
    }
}

impl Codec for PendingCodec {
    fn encode(&self, cursor: &mut Cursor<'_>, value: &Value, config: &FieldConfig) -> Result<()> {
        self.wait().encode(cursor, value, config)
    }

    fn decode(&self, cursor: &mut Cursor<'_>, target: &mut Value, config: &FieldConfig) -> Result<()> {
        self.wait().decode(cursor, target, config)
    }
}

/// Codec and struct field-table cache.
///
/// Entries are append-only and live as long as the registry. Use
/// [`CodecRegistry::shared`] for the process-wide instance.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: DashMap<TypeDescriptor, Arc<dyn Codec>>,
    fields: DashMap<StructType, Result<Arc<StructFields>>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry.
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<CodecRegistry>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::new())))
    }

    /// Codec for `ty`, building it on first use.
    pub fn resolve(&self, ty: &TypeDescriptor) -> Arc<dyn Codec> {
        if let Some(codec) = self.codecs.get(ty) {
            return Arc::clone(codec.value());
        }

        let pending = Arc::new(PendingCodec::new(ty.clone()));
        match self.codecs.entry(ty.clone()) {
            Entry::Occupied(entry) => return Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&pending) as Arc<dyn Codec>);
            }
        }

        debug!("building codec for {ty}");
        let real = codec::build(self, ty);
        self.codecs.insert(ty.clone(), Arc::clone(&real));
        pending.publish(Arc::clone(&real));
        real
    }

    /// Field table of a struct, built once.
    ///
    /// Tag configuration failures are cached with the table. A struct that
    /// is declared but not yet defined is reported without being cached,
    /// so it resolves once defined.
    pub fn struct_fields(&self, st: &StructType) -> Result<Arc<StructFields>> {
        if let Some(table) = self.fields.get(st) {
            return table.value().clone();
        }
        st.fields()?;
        let built = StructFields::build(self, st).map(Arc::new);
        self.fields.entry(st.clone()).or_insert(built).value().clone()
    }

    /// Number of cached codecs.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    pub fn contains(&self, ty: &TypeDescriptor) -> bool {
        self.codecs.contains_key(ty)
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codecs", &self.codecs.len())
            .field("struct_tables", &self.fields.len())
            .finish()
    }
}
