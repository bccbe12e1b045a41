// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Active-path tracking of reference identities and value nesting.

use crate::error::{Error, Result};
use log::trace;
use std::collections::HashSet;
use std::fmt;

/// Reference depth after which identities start being tracked.
pub const DEFAULT_CYCLE_THRESHOLD: usize = 1000;

/// Composite levels (structs, containers, references, slots) one call
/// tree may descend through.
pub const DEFAULT_MAX_NESTING: usize = 4096;

/// Tracks the references currently being traversed by one call tree.
///
/// Every successful [`CycleGuard::enter`] must be paired with exactly one
/// [`CycleGuard::leave`] for the same identity, so the guard always
/// mirrors the current path. Below the threshold only depth is counted.
///
/// Independently of identities, [`CycleGuard::descend`] bounds how deep
/// composite values may nest.
#[derive(Debug)]
pub struct CycleGuard {
    depth: usize,
    threshold: usize,
    seen: HashSet<usize>,
    nesting: usize,
    max_nesting: usize,
}

impl CycleGuard {
    pub fn new(threshold: usize) -> Self {
        Self {
            depth: 0,
            threshold,
            seen: HashSet::new(),
            nesting: 0,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Descend into the reference `identity` of type `ty`.
    pub fn enter(&mut self, identity: usize, ty: &dyn fmt::Display) -> Result<()> {
        self.depth += 1;
        if self.depth > self.threshold {
            if self.seen.is_empty() {
                trace!("cycle tracking active at depth {}", self.depth);
            }
            if !self.seen.insert(identity) {
                self.depth -= 1;
                return Err(Error::UnsupportedValue(format!(
                    "encountered a cycle via {ty}"
                )));
            }
        }
        Ok(())
    }

    /// Return from the reference `identity`.
    pub fn leave(&mut self, identity: usize) {
        if self.depth > self.threshold {
            self.seen.remove(&identity);
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// Enter one composite level.
    pub fn descend(&mut self) -> Result<()> {
        if self.nesting >= self.max_nesting {
            return Err(Error::UnsupportedValue(format!(
                "value nesting exceeds {} levels",
                self.max_nesting
            )));
        }
        self.nesting += 1;
        Ok(())
    }

    pub fn ascend(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn nesting(&self) -> usize {
        self.nesting
    }

    pub fn is_clear(&self) -> bool {
        self.depth == 0 && self.nesting == 0 && self.seen.is_empty()
    }
}

impl Default for CycleGuard {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLE_THRESHOLD)
    }
}
