// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change evaluation for presenters.
//!
//! Mutations only mark dirty channels. [`LayerTree::evaluate`] drains them
//! and reports what changed since the previous call:
//!
//! 1. **VISIBILITY** / **LOCK**: Drain the affected set, recompute each
//!    layer's effective value and compare it with the value last presented.
//!    Only real transitions land in `hidden`/`unhidden` and
//!    `locked`/`unlocked`.
//! 2. **APPEARANCE** / **CONTENT**: Drain and collect.
//! 3. **TOPOLOGY**: Drain and discard; the traversal order was already
//!    rebuilt at the start of evaluation if needed.
//!
//! Like the rest of the SoA accessors, [`TreeChanges`] carries raw slot
//! indices; use [`LayerTree::layer_at`] to turn one back into a
//! [`LayerId`](super::LayerId).

use alloc::vec::Vec;

use super::id::INVALID;
use super::tree::LayerTree;
use crate::dirty;

/// The set of changes produced by a single [`LayerTree::evaluate`] call.
#[derive(Clone, Debug, Default)]
pub struct TreeChanges {
    /// Layers whose visibility was re-evaluated.
    pub visibility: Vec<u32>,
    /// Layers whose lock state was re-evaluated.
    pub locks: Vec<u32>,
    /// Layers whose own presentational properties changed.
    pub appearance: Vec<u32>,
    /// Layers that reported a content change.
    pub content: Vec<u32>,
    /// Layers that became effectively hidden.
    pub hidden: Vec<u32>,
    /// Layers that became effectively visible again.
    pub unhidden: Vec<u32>,
    /// Layers that became effectively locked.
    pub locked: Vec<u32>,
    /// Layers that became effectively unlocked.
    pub unlocked: Vec<u32>,
    /// Layers created since the last evaluate.
    pub added: Vec<u32>,
    /// Layers destroyed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether the traversal order was rebuilt.
    pub topology_changed: bool,
}

impl TreeChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.visibility.clear();
        self.locks.clear();
        self.appearance.clear();
        self.content.clear();
        self.hidden.clear();
        self.unhidden.clear();
        self.locked.clear();
        self.unlocked.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visibility.is_empty()
            && self.locks.is_empty()
            && self.appearance.is_empty()
            && self.content.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl LayerTree {
    /// Drains all dirty channels and returns what changed.
    pub fn evaluate(&mut self) -> TreeChanges {
        let mut changes = TreeChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer.
    pub fn evaluate_into(&mut self, changes: &mut TreeChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        let alive = &self.alive;
        let visibility: Vec<u32> = self
            .dirty
            .drain(dirty::VISIBILITY)
            .affected()
            .deterministic()
            .run()
            .filter(|&idx| alive[idx as usize])
            .collect();
        for &idx in &visibility {
            let hidden = !self.effectively_visible_at(idx);
            let presented = &mut self.presented_hidden[idx as usize];
            if hidden != *presented {
                *presented = hidden;
                if hidden {
                    changes.hidden.push(idx);
                } else {
                    changes.unhidden.push(idx);
                }
            }
        }
        changes.visibility = visibility;

        let alive = &self.alive;
        let locks: Vec<u32> = self
            .dirty
            .drain(dirty::LOCK)
            .affected()
            .deterministic()
            .run()
            .filter(|&idx| alive[idx as usize])
            .collect();
        for &idx in &locks {
            let locked = self.effectively_locked_at(idx);
            let presented = &mut self.presented_locked[idx as usize];
            if locked != *presented {
                *presented = locked;
                if locked {
                    changes.locked.push(idx);
                } else {
                    changes.unlocked.push(idx);
                }
            }
        }
        changes.locks = locks;

        changes.appearance = self.drain_local(dirty::APPEARANCE);
        changes.content = self.drain_local(dirty::CONTENT);
        let _ = self.drain_local(dirty::TOPOLOGY);

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }

    /// Returns the depth-first pre-order of all live layers, as of the last
    /// [`evaluate`](Self::evaluate).
    ///
    /// Detached layers form their own roots, in slot order.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn drain_local(&mut self, channel: understory_dirty::Channel) -> Vec<u32> {
        let alive = &self.alive;
        self.dirty
            .drain(channel)
            .deterministic()
            .run()
            .filter(|&idx| alive[idx as usize])
            .collect()
    }

    fn rebuild_traversal_order(&mut self) {
        let mut order = core::mem::take(&mut self.traversal_order);
        order.clear();
        for idx in 0..self.len {
            if self.alive[idx as usize] && self.parent[idx as usize] == INVALID {
                self.dfs_collect(idx, &mut order);
            }
        }
        self.traversal_order = order;
    }

    fn dfs_collect(&self, idx: u32, order: &mut Vec<u32>) {
        order.push(idx);
        for &c in &self.children[idx as usize] {
            self.dfs_collect(c, order);
        }
    }
}
