// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unique identity keys for layers.
//!
//! Every registry draws a scope number from a process-wide counter when it is
//! created, and every key it mints carries that scope:
//! `layer-<scope>-<sequence>`. Minted keys therefore never collide across
//! registries, so trees with separate [`LayerContext`]s can coexist in one
//! process.
//!
//! Keys preserved by decoding go through [`IdentityRegistry::claim`]. A key in
//! the minted form whose scope belongs to a different registry is refused,
//! since that registry may mint or hold it. Keys in any other form are checked
//! against the claiming registry only.
//!
//! [`LayerContext`]: crate::context::LayerContext

use alloc::format;
use alloc::string::String;
use core::sync::atomic::{AtomicU32, Ordering};

use hashbrown::HashSet;

static NEXT_SCOPE: AtomicU32 = AtomicU32::new(0);

/// Mints identity keys and tracks the keys held by live layers.
#[derive(Debug)]
pub struct IdentityRegistry {
    scope: u32,
    next: u64,
    live: HashSet<String>,
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityRegistry {
    /// Creates an empty registry with a scope no other registry in the
    /// process uses.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scope: NEXT_SCOPE.fetch_add(1, Ordering::Relaxed),
            next: 0,
            live: HashSet::new(),
        }
    }

    /// Returns the scope number embedded in every key this registry mints.
    #[must_use]
    pub fn scope(&self) -> u32 {
        self.scope
    }

    /// Returns a fresh key and marks it as held.
    ///
    /// Minted keys skip any value that is already held (for example one that
    /// was preserved through [`claim`](Self::claim)).
    pub fn new_key(&mut self) -> String {
        loop {
            let key = format!("layer-{:08x}-{:016x}", self.scope, self.next);
            self.next += 1;
            if !self.live.contains(&key) {
                self.live.insert(key.clone());
                return key;
            }
        }
    }

    /// Marks `key` as held.
    ///
    /// Returns `false` if the key is empty, already held here, or minted by a
    /// different registry.
    pub fn claim(&mut self, key: &str) -> bool {
        if key.is_empty() || self.live.contains(key) {
            return false;
        }
        if minted_scope(key).is_some_and(|scope| scope != self.scope) {
            return false;
        }
        self.live.insert(String::from(key));
        true
    }

    /// Releases `key` so it may be claimed again. Returns `false` if it was
    /// not held.
    pub fn release(&mut self, key: &str) -> bool {
        self.live.remove(key)
    }

    /// Returns whether `key` is held by a live layer.
    #[must_use]
    pub fn is_live(&self, key: &str) -> bool {
        self.live.contains(key)
    }

    /// Returns the number of held keys.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

/// Returns the scope of a key in the minted form.
fn minted_scope(key: &str) -> Option<u32> {
    let rest = key.strip_prefix("layer-")?;
    let (scope, seq) = rest.split_once('-')?;
    if scope.len() != 8 || seq.len() != 16 || !seq.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(scope, 16).ok()
}
