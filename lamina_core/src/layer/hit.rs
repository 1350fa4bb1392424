// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing, the active layer, and pointer routing.
//!
//! Groups answer hit queries by asking their visible children top-down; the
//! first positive answer wins. Pointer events go to the *active* layer only,
//! and never while it is effectively locked or hidden.

use kurbo::Point;

use super::id::{ContentRef, INVALID, LayerId};
use super::tree::LayerTree;
use crate::input::{Modifiers, PointerEvent, PointerPhase};

impl LayerTree {
    // -- Hit testing --

    /// Returns whether the layer has content at `point`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn hit_layer(&self, id: LayerId, point: Point) -> bool {
        self.validate(id);
        self.hit_layer_at(id.idx, point)
    }

    /// Returns the object under `point`, if any.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn hit_test(&self, id: LayerId, point: Point) -> Option<ContentRef> {
        self.validate(id);
        self.hit_test_at(id.idx, point)
    }

    /// Returns the topmost visible leaf under `point`, searching from the
    /// root group.
    #[must_use]
    pub fn find_layer(&self, point: Point) -> Option<LayerId> {
        if self.root == INVALID || !self.state[self.root as usize].visible {
            return None;
        }
        self.find_layer_in(self.root, point).map(|idx| self.id_at(idx))
    }

    fn hit_layer_at(&self, idx: u32, point: Point) -> bool {
        if !self.is_group[idx as usize] {
            return self.behavior[idx as usize].hit_layer(point);
        }
        self.children[idx as usize]
            .iter()
            .rev()
            .any(|&c| self.state[c as usize].visible && self.hit_layer_at(c, point))
    }

    fn hit_test_at(&self, idx: u32, point: Point) -> Option<ContentRef> {
        if !self.is_group[idx as usize] {
            return self.behavior[idx as usize].hit_test(point);
        }
        self.children[idx as usize]
            .iter()
            .rev()
            .filter(|&&c| self.state[c as usize].visible)
            .find_map(|&c| self.hit_test_at(c, point))
    }

    fn find_layer_in(&self, idx: u32, point: Point) -> Option<u32> {
        if !self.is_group[idx as usize] {
            return self.behavior[idx as usize].hit_layer(point).then_some(idx);
        }
        self.children[idx as usize]
            .iter()
            .rev()
            .filter(|&&c| self.state[c as usize].visible)
            .find_map(|&c| self.find_layer_in(c, point))
    }

    // -- Active layer --

    /// Returns the active layer.
    #[must_use]
    pub fn active_layer(&self) -> Option<LayerId> {
        (self.active != INVALID).then(|| self.id_at(self.active))
    }

    /// Returns whether the layer is the active layer.
    #[must_use]
    pub fn is_active(&self, id: LayerId) -> bool {
        self.validate(id);
        self.active == id.idx
    }

    /// Returns whether the layer may become the active layer.
    #[must_use]
    pub fn may_become_active(&self, id: LayerId) -> bool {
        self.behavior(id).may_become_active()
    }

    /// Makes `id` the active layer, or clears the active layer for `None`.
    ///
    /// Returns `false` if the layer refuses to become active. The previous
    /// active layer resigns before the new one is told.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_active_layer(&mut self, id: Option<LayerId>) -> bool {
        let Some(id) = id else {
            self.resign_active();
            return true;
        };
        self.validate(id);
        if self.active == id.idx {
            return true;
        }
        if !self.behavior[id.idx as usize].may_become_active() {
            return false;
        }
        self.resign_active();
        self.active = id.idx;
        self.behavior[id.idx as usize].did_become_active();
        true
    }

    /// Sets whether a pointer-down on another layer may make it active.
    pub fn set_auto_activation(&mut self, enabled: bool) {
        self.auto_activate = enabled;
    }

    pub(crate) fn resign_active(&mut self) {
        if self.active != INVALID {
            let idx = self.active as usize;
            self.active = INVALID;
            self.behavior[idx].did_resign_active();
        }
    }

    // -- Input routing --

    /// Routes a pointer event to the active layer.
    ///
    /// On [`PointerPhase::Down`] the layer under the pointer is activated
    /// first if auto-activation is on and it agrees. Returns whether a layer
    /// received the event.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        if event.phase == PointerPhase::Down && self.auto_activate {
            if let Some(hit) = self.find_layer(event.position) {
                let i = hit.idx as usize;
                if self.active != hit.idx
                    && self.behavior[i].should_auto_activate(event, &self.state[i])
                {
                    self.set_active_layer(Some(hit));
                }
            }
        }

        let Some(active) = self.routable_active() else {
            return false;
        };
        let i = active as usize;
        self.behavior[i].handle_pointer(&self.state[i], event);
        true
    }

    /// Tells the active layer that the modifier keys changed.
    pub fn modifiers_changed(&mut self, modifiers: Modifiers) -> bool {
        let Some(active) = self.routable_active() else {
            return false;
        };
        self.behavior[active as usize].modifiers_changed(modifiers);
        true
    }

    fn routable_active(&self) -> Option<u32> {
        let a = self.active;
        (a != INVALID && self.effectively_visible_at(a) && !self.effectively_locked_at(a))
            .then_some(a)
    }
}
