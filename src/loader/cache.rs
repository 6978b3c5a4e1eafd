// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Activation cache
//!
//! Process-wide init-once table keyed by activation fingerprint. Entries are
//! never evicted. The entry is recorded *before* the initialization work
//! runs: initialization may itself trigger another activation for the same
//! fingerprint (a hook install requiring a module that activates again), and
//! that re-entrant call must observe the fingerprint as already initialized
//! instead of recursing.

use std::cell::RefCell;
use std::collections::HashSet;
use tracing::debug;

use crate::loader::fingerprint::Fingerprint;

/// Init-once table of seen activation fingerprints
#[derive(Debug, Default)]
pub struct ActivationCache {
    seen: RefCell<HashSet<Fingerprint>>,
}

impl ActivationCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `init` at most once for a defined fingerprint
    ///
    /// `None` means the activation has no stable identity to cache against;
    /// the cache is neither consulted nor written and `init` runs fresh.
    pub fn ensure_initialized<F>(&self, fingerprint: Option<&Fingerprint>, init: F)
    where
        F: FnOnce(),
    {
        let Some(fingerprint) = fingerprint else {
            init();
            return;
        };

        // Mark present before running init; the borrow must not be held
        // across `init` since it may re-enter this cache.
        let first = self.seen.borrow_mut().insert(fingerprint.clone());
        if first {
            debug!("initializing loader state for {fingerprint}");
            init();
        }
    }

    /// Whether a fingerprint has been initialized
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.seen.borrow().contains(fingerprint)
    }

    /// Number of initialized fingerprints
    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }

    /// Whether no fingerprint has been initialized yet
    pub fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }
}
