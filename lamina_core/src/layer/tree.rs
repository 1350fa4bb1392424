// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays layer storage with allocation, topology, and group management.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use kurbo::{Rect, Size};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::behavior::{GroupLayer, Layer, PlainLayer};
use super::id::{INVALID, LayerId};
use super::state::LayerState;
use super::traverse::{Ancestors, Children};
use crate::context::LayerContext;
use crate::dirty;
use crate::error::TreeError;
use crate::event::Observers;
use crate::invalidate::{DisplayId, DisplaySurface, InvalidationTracker};
use crate::trace::{TraceSink, Tracer};

/// Struct-of-arrays storage for all layers of one drawing.
///
/// Layers are addressed by [`LayerId`] handles. Internally, each layer occupies
/// a slot in parallel arrays. Destroyed layers are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// Groups own their ordered child list (index 0 is the bottom of the z-order);
/// a child refers back to its group by slot index only.
pub struct LayerTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) children: Vec<Vec<u32>>,
    pub(crate) is_group: Vec<bool>,

    // -- Per-layer data --
    pub(crate) state: Vec<LayerState>,
    pub(crate) behavior: Vec<Box<dyn Layer>>,
    pub(crate) added_to_root: Vec<bool>,

    // -- Presented state (written by evaluate) --
    pub(crate) presented_hidden: Vec<bool>,
    pub(crate) presented_locked: Vec<bool>,

    // -- Allocation --
    pub(crate) alive: Vec<bool>,
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,

    // -- Drawing --
    pub(crate) root: u32,
    pub(crate) active: u32,
    pub(crate) auto_activate: bool,
    pub(crate) drawing_size: Size,
    pub(crate) interior: Option<Rect>,

    // -- Invalidation --
    pub(crate) damage: InvalidationTracker,
    pub(crate) displays: Vec<(DisplayId, Box<dyn DisplaySurface>)>,
    pub(crate) next_display: u32,

    // -- Notification --
    pub(crate) observers: Observers,
    pub(crate) trace: Option<Box<dyn TraceSink>>,

    pub(crate) context: Rc<LayerContext>,
}

impl fmt::Debug for LayerTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerTree")
            .field("len", &self.len)
            .field("live", &self.live_count())
            .field("root", &self.root)
            .field("active", &self.active)
            .field("drawing_size", &self.drawing_size)
            .field("damage", self.damage.region())
            .field("displays", &self.displays.len())
            .field("observers", &self.observers)
            .field("tracing", &self.trace.is_some())
            .finish_non_exhaustive()
    }
}

/// Builds a tree on a context of its own. Identity keys stay unique across
/// the process; share a context through [`LayerTree::new`] for a common
/// palette rotation.
impl Default for LayerTree {
    fn default() -> Self {
        Self::new(LayerContext::new_shared())
    }
}

impl Drop for LayerTree {
    fn drop(&mut self) {
        // Keys of a dropped drawing become available to the rest of the
        // process again.
        for (idx, state) in self.state.iter().enumerate() {
            if self.alive[idx] {
                self.context.release_key(&state.identity_key);
            }
        }
    }
}

impl LayerTree {
    /// Creates an empty tree that draws identity keys, selection colors, and
    /// default knobs from `context`.
    #[must_use]
    pub fn new(context: Rc<LayerContext>) -> Self {
        Self {
            parent: Vec::new(),
            children: Vec::new(),
            is_group: Vec::new(),
            state: Vec::new(),
            behavior: Vec::new(),
            added_to_root: Vec::new(),
            presented_hidden: Vec::new(),
            presented_locked: Vec::new(),
            alive: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            root: INVALID,
            active: INVALID,
            auto_activate: true,
            drawing_size: Size::ZERO,
            interior: None,
            damage: InvalidationTracker::new(),
            displays: Vec::new(),
            next_display: 0,
            observers: Observers::default(),
            trace: None,
            context,
        }
    }

    /// Returns the shared context.
    #[must_use]
    pub fn context(&self) -> &Rc<LayerContext> {
        &self.context
    }

    /// Installs a trace sink, returning the previous one.
    ///
    /// Events reach the sink only when the `trace` feature is enabled.
    pub fn set_trace_sink(
        &mut self,
        sink: Option<Box<dyn TraceSink>>,
    ) -> Option<Box<dyn TraceSink>> {
        core::mem::replace(&mut self.trace, sink)
    }

    // -- Allocation API --

    /// Creates a leaf layer with the given behavior and returns its handle.
    ///
    /// The layer gets a fresh identity key and the next selection color from
    /// the context, and starts visible, unlocked, printable, fully opaque, and
    /// detached.
    pub fn create_layer(&mut self, behavior: Box<dyn Layer>) -> LayerId {
        let state = self.fresh_state();
        self.alloc(behavior, false, state)
    }

    /// Creates a group layer with the given behavior.
    pub fn create_group(&mut self, behavior: Box<dyn Layer>) -> LayerId {
        let state = self.fresh_state();
        self.alloc(behavior, true, state)
    }

    /// Creates a leaf layer with no content of its own.
    pub fn create_plain_layer(&mut self) -> LayerId {
        self.create_layer(Box::new(PlainLayer))
    }

    /// Creates a group with the default group behavior.
    pub fn create_plain_group(&mut self) -> LayerId {
        self.create_group(Box::new(GroupLayer))
    }

    /// Destroys a layer together with its whole subtree.
    ///
    /// The layer is detached from its group first. Identity keys are released,
    /// observers scoped to the destroyed layers are dropped, and every handle
    /// into the subtree becomes stale.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_layer(&mut self, id: LayerId) {
        self.validate(id);
        self.remove_from_parent(id);

        let mut doomed = Vec::new();
        self.collect_subtree(id.idx, &mut doomed);
        for &idx in doomed.iter().rev() {
            self.free_slot(idx);
        }
    }

    /// Returns whether the given handle refers to a live layer.
    #[must_use]
    pub fn is_alive(&self, id: LayerId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && self.alive[id.idx as usize]
    }

    /// Returns the number of live layers.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Root group --

    /// Makes `group` the top of the drawing.
    ///
    /// Every layer in its subtree that was never reachable from the root
    /// before receives [`Layer::was_added_to_root`].
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_root_group(&mut self, group: LayerId) -> Result<(), TreeError> {
        self.validate(group);
        let g = group.idx;
        if !self.is_group[g as usize] {
            return Err(TreeError::NotAGroup(group));
        }
        if self.parent[g as usize] != INVALID {
            return Err(TreeError::AlreadyParented(group));
        }
        if self.root == g {
            return Ok(());
        }
        self.root = g;
        self.traversal_dirty = true;
        self.dirty.mark(g, dirty::TOPOLOGY);
        self.notify_added_to_root(g);
        self.damage.mark_full();
        Ok(())
    }

    /// Returns the root group, if one has been set.
    #[must_use]
    pub fn root_group(&self) -> Option<LayerId> {
        (self.root != INVALID).then(|| self.id_at(self.root))
    }

    // -- Topology API --

    /// Adds `child` as the topmost child of `group`.
    ///
    /// If `group` is reachable from the root group, `child` and its subtree
    /// are notified with [`Layer::was_added_to_root`] (once per layer, ever).
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn add_child(&mut self, group: LayerId, child: LayerId) -> Result<(), TreeError> {
        self.validate(group);
        self.validate(child);
        self.check_attach(group, child)?;
        let index = self.children[group.idx as usize].len();
        self.link(group.idx, child.idx, index);
        Ok(())
    }

    /// Inserts `child` into `group` at `index` (0 is the bottom).
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn insert_child(
        &mut self,
        group: LayerId,
        child: LayerId,
        index: usize,
    ) -> Result<(), TreeError> {
        self.validate(group);
        self.validate(child);
        self.check_attach(group, child)?;
        let len = self.children[group.idx as usize].len();
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        self.link(group.idx, child.idx, index);
        Ok(())
    }

    /// Moves `child` to `index` within its current group.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn move_child(&mut self, child: LayerId, index: usize) -> Result<(), TreeError> {
        self.validate(child);
        let c = child.idx;
        let p = self.parent[c as usize];
        if p == INVALID {
            return Err(TreeError::Detached(child));
        }
        let siblings = &mut self.children[p as usize];
        let len = siblings.len();
        if index >= len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        let Some(from) = siblings.iter().position(|&s| s == c) else {
            unreachable!("child {c} missing from its group's child list");
        };
        if from == index {
            return Ok(());
        }
        siblings.remove(from);
        siblings.insert(index, c);

        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.request_redraw(child);
        Ok(())
    }

    /// Removes `child` from its group. Does nothing if it has no group.
    ///
    /// No notification is sent to the layer. If the active layer is in the
    /// removed subtree it resigns.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove_from_parent(&mut self, child: LayerId) {
        self.validate(child);
        let c = child.idx;
        let p = self.parent[c as usize];
        if p == INVALID {
            return;
        }

        // The vacated area needs repainting.
        self.request_redraw(child);

        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::VISIBILITY);
        self.dirty.remove_dependency(c, p, dirty::LOCK);

        if self.active != INVALID && (self.active == c || self.has_ancestor(self.active, c)) {
            self.resign_active();
        }

        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Moves `child` to the top of `group`, detaching it from its current
    /// group first.
    ///
    /// Nothing changes when an error is returned.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn reparent(&mut self, child: LayerId, group: LayerId) -> Result<(), TreeError> {
        self.validate(child);
        self.validate(group);
        let g = group.idx;
        let c = child.idx;
        if !self.is_group[g as usize] {
            return Err(TreeError::NotAGroup(group));
        }
        if c == self.root {
            return Err(TreeError::IsRoot(child));
        }
        if g == c || self.has_ancestor(g, c) {
            return Err(TreeError::Cycle { group, child });
        }
        self.remove_from_parent(child);
        let index = self.children[g as usize].len();
        self.link(g, c, index);
        Ok(())
    }

    // -- Queries --

    /// Returns the group containing a layer, if any.
    #[must_use]
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the children of a layer, bottom to top.
    #[must_use]
    pub fn children(&self, id: LayerId) -> Children<'_> {
        self.validate(id);
        Children::new(self, &self.children[id.idx as usize])
    }

    /// Returns an iterator over the enclosing groups of a layer, innermost
    /// first.
    #[must_use]
    pub fn ancestors(&self, id: LayerId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors::new(self, self.parent[id.idx as usize])
    }

    /// Returns whether the layer is a group.
    #[must_use]
    pub fn is_group(&self, id: LayerId) -> bool {
        self.validate(id);
        self.is_group[id.idx as usize]
    }

    /// Returns the nesting depth: 1 for a layer with no group, otherwise the
    /// group's level plus one.
    #[must_use]
    pub fn level(&self, id: LayerId) -> usize {
        1 + self.ancestors(id).count()
    }

    /// Returns the position of the layer within its group.
    #[must_use]
    pub fn index_in_group(&self, id: LayerId) -> Option<usize> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            return None;
        }
        self.children[p as usize].iter().position(|&c| c == id.idx)
    }

    /// Returns whether `group` contains the layer at any depth.
    #[must_use]
    pub fn is_child_of_group(&self, id: LayerId, group: LayerId) -> bool {
        self.validate(id);
        self.validate(group);
        self.has_ancestor(id.idx, group.idx)
    }

    /// Returns whether the layer and all of its ancestors are visible.
    #[must_use]
    pub fn is_effectively_visible(&self, id: LayerId) -> bool {
        self.validate(id);
        self.effectively_visible_at(id.idx)
    }

    /// Returns whether the layer or any of its ancestors is locked.
    #[must_use]
    pub fn is_effectively_locked(&self, id: LayerId) -> bool {
        self.validate(id);
        self.effectively_locked_at(id.idx)
    }

    /// Returns whether the layer is effectively locked or effectively hidden.
    #[must_use]
    pub fn locked_or_hidden(&self, id: LayerId) -> bool {
        self.is_effectively_locked(id) || !self.is_effectively_visible(id)
    }

    /// Returns the state of a layer.
    #[must_use]
    pub fn state(&self, id: LayerId) -> &LayerState {
        self.validate(id);
        &self.state[id.idx as usize]
    }

    /// Returns the behavior of a layer.
    #[must_use]
    pub fn behavior(&self, id: LayerId) -> &dyn Layer {
        self.validate(id);
        &*self.behavior[id.idx as usize]
    }

    /// Returns the behavior of a layer for mutation.
    ///
    /// Changes to drawn content should be followed by
    /// [`mark_content_changed`](Self::mark_content_changed) and a redraw
    /// request.
    pub fn behavior_mut(&mut self, id: LayerId) -> &mut dyn Layer {
        self.validate(id);
        &mut *self.behavior[id.idx as usize]
    }

    /// Downcasts the behavior of a layer to a concrete kind.
    #[must_use]
    pub fn layer<T: Layer>(&self, id: LayerId) -> Option<&T> {
        let any: &dyn Any = self.behavior(id);
        any.downcast_ref::<T>()
    }

    /// Downcasts the behavior of a layer to a concrete kind for mutation.
    pub fn layer_mut<T: Layer>(&mut self, id: LayerId) -> Option<&mut T> {
        let any: &mut dyn Any = self.behavior_mut(id);
        any.downcast_mut::<T>()
    }

    /// Returns the persisted kind name of a layer.
    #[must_use]
    pub fn kind(&self, id: LayerId) -> &str {
        self.behavior(id).kind()
    }

    /// Returns whether user interface actions may delete the layer.
    #[must_use]
    pub fn may_be_deleted(&self, id: LayerId) -> bool {
        self.behavior(id).may_be_deleted()
    }

    /// Returns the handle for the live layer at raw slot `idx`, as found in
    /// [`TreeChanges`](super::TreeChanges) or the traversal order.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range or the slot is free.
    #[must_use]
    pub fn layer_at(&self, idx: u32) -> LayerId {
        assert!(
            idx < self.len && self.alive[idx as usize],
            "slot index {idx} is not a live layer (len {})",
            self.len
        );
        self.id_at(idx)
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: LayerId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale LayerId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    pub(crate) fn id_at(&self, idx: u32) -> LayerId {
        LayerId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Builds the tracer for the installed sink.
    pub(crate) fn tracer(sink: &mut Option<Box<dyn TraceSink>>) -> Tracer<'_> {
        match sink {
            Some(s) => Tracer::new(&mut **s),
            None => Tracer::none(),
        }
    }

    fn fresh_state(&self) -> LayerState {
        LayerState::new(
            self.context.mint_key(),
            Some(self.context.next_selection_color()),
        )
    }

    /// Stores a new layer in a free or fresh slot.
    pub(crate) fn alloc(
        &mut self,
        behavior: Box<dyn Layer>,
        group: bool,
        state: LayerState,
    ) -> LayerId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.children[i].clear();
            self.is_group[i] = group;
            self.state[i] = state;
            self.behavior[i] = behavior;
            self.added_to_root[i] = false;
            self.presented_hidden[i] = false;
            self.presented_locked[i] = false;
            self.alive[i] = true;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.children.push(Vec::new());
            self.is_group.push(group);
            self.state.push(state);
            self.behavior.push(behavior);
            self.added_to_root.push(false);
            self.presented_hidden.push(false);
            self.presented_locked.push(false);
            self.alive.push(true);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.mark_subtree_inherited_dirty(idx);

        self.id_at(idx)
    }

    /// Releases everything held by slot `idx`. Its subtree must already be
    /// freed or detached.
    fn free_slot(&mut self, idx: u32) {
        let i = idx as usize;
        let id = self.id_at(idx);
        if self.active == idx {
            self.resign_active();
        }
        if self.root == idx {
            self.root = INVALID;
        }

        let state = core::mem::replace(&mut self.state[i], LayerState::new(String::new(), None));
        self.context.release_key(&state.identity_key);
        self.observers.remove_layer(id);
        self.dirty.remove_key(idx);

        self.behavior[i] = Box::new(PlainLayer);
        self.children[i].clear();
        self.parent[i] = INVALID;
        self.alive[i] = false;

        // Bump generation so old handles immediately fail validation.
        self.generation[i] += 1;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
    }

    fn check_attach(&self, group: LayerId, child: LayerId) -> Result<(), TreeError> {
        let g = group.idx;
        let c = child.idx;
        if !self.is_group[g as usize] {
            return Err(TreeError::NotAGroup(group));
        }
        if self.parent[c as usize] != INVALID {
            return Err(TreeError::AlreadyParented(child));
        }
        if c == self.root {
            return Err(TreeError::IsRoot(child));
        }
        if g == c || self.has_ancestor(g, c) {
            return Err(TreeError::Cycle { group, child });
        }
        Ok(())
    }

    /// Links a checked, parentless `c` into group `g` at `index`.
    pub(crate) fn link(&mut self, g: u32, c: u32, index: usize) {
        self.parent[c as usize] = g;
        self.children[g as usize].insert(index, c);

        // Effective visibility and lockedness are inherited from the group.
        // Attach checks already rule out cycles.
        let visibility = self.dirty.add_dependency(c, g, dirty::VISIBILITY);
        debug_assert!(visibility.is_ok(), "visibility dependency {c} -> {g} rejected");
        let lock = self.dirty.add_dependency(c, g, dirty::LOCK);
        debug_assert!(lock.is_ok(), "lock dependency {c} -> {g} rejected");

        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(g, dirty::TOPOLOGY);

        if self.is_reachable_from_root(g) {
            self.notify_added_to_root(c);
        }
    }

    /// Removes `idx` from its group's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        self.children[p as usize].retain(|&c| c != idx);
        self.parent[idx as usize] = INVALID;
    }

    /// Returns whether `ancestor` encloses `idx` at any depth.
    pub(crate) fn has_ancestor(&self, idx: u32, ancestor: u32) -> bool {
        let mut p = self.parent[idx as usize];
        while p != INVALID {
            if p == ancestor {
                return true;
            }
            p = self.parent[p as usize];
        }
        false
    }

    fn is_reachable_from_root(&self, idx: u32) -> bool {
        self.root != INVALID && (idx == self.root || self.has_ancestor(idx, self.root))
    }

    pub(crate) fn effectively_visible_at(&self, idx: u32) -> bool {
        let mut i = idx;
        while i != INVALID {
            if !self.state[i as usize].visible {
                return false;
            }
            i = self.parent[i as usize];
        }
        true
    }

    pub(crate) fn effectively_locked_at(&self, idx: u32) -> bool {
        let mut i = idx;
        while i != INVALID {
            if self.state[i as usize].locked {
                return true;
            }
            i = self.parent[i as usize];
        }
        false
    }

    /// Collects the subtree rooted at `idx` in pre-order.
    pub(crate) fn collect_subtree(&self, idx: u32, out: &mut Vec<u32>) {
        out.push(idx);
        for &c in &self.children[idx as usize] {
            self.collect_subtree(c, out);
        }
    }

    fn notify_added_to_root(&mut self, idx: u32) {
        let mut subtree = Vec::new();
        self.collect_subtree(idx, &mut subtree);
        for i in subtree {
            let i = i as usize;
            if !self.added_to_root[i] {
                self.added_to_root[i] = true;
                self.behavior[i].was_added_to_root(&self.state[i]);
            }
        }
    }

    /// Marks the subtree rooted at `idx` dirty for inherited channels.
    pub(crate) fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::VISIBILITY, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::LOCK, &EagerPolicy);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use core::cell::Cell;

    use super::*;

    #[test]
    fn create_and_destroy() {
        let mut tree = LayerTree::default();
        let id = tree.create_plain_layer();
        assert!(tree.is_alive(id));
        tree.destroy_layer(id);
        assert!(!tree.is_alive(id));
        assert_eq!(tree.live_count(), 0);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut tree = LayerTree::default();
        let id1 = tree.create_plain_layer();
        tree.destroy_layer(id1);
        let id2 = tree.create_plain_layer();
        // id2 reuses the same slot but has a different generation.
        assert!(!tree.is_alive(id1));
        assert!(tree.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    fn identity_keys_are_distinct_and_released() {
        let cx = LayerContext::new_shared();
        let mut tree = LayerTree::new(Rc::clone(&cx));
        let ids: Vec<_> = (0..16).map(|_| tree.create_plain_layer()).collect();
        let mut keys: Vec<_> = ids
            .iter()
            .map(|&id| String::from(tree.state(id).identity_key()))
            .collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 16);
        assert_eq!(cx.identity().live_count(), 16);

        tree.destroy_layer(ids[3]);
        assert_eq!(cx.identity().live_count(), 15);
        drop(tree);
        assert_eq!(cx.identity().live_count(), 0);
    }

    #[test]
    fn selection_colors_rotate_through_palette() {
        let cx = Rc::new(LayerContext::with_palette(vec![
            crate::color::Color::RED,
            crate::color::Color::BLUE,
        ]));
        let mut tree = LayerTree::new(cx);
        let colors: Vec<_> = (0..5)
            .map(|_| {
                let id = tree.create_plain_layer();
                tree.state(id).selection_color()
            })
            .collect();
        assert_eq!(colors[0], colors[2]);
        assert_eq!(colors[1], colors[3]);
        assert_eq!(colors[4], Some(crate::color::Color::RED));
    }

    #[test]
    fn add_child_and_query() {
        let mut tree = LayerTree::default();
        let group = tree.create_plain_group();
        let child1 = tree.create_plain_layer();
        let child2 = tree.create_plain_layer();

        tree.add_child(group, child1).unwrap();
        tree.add_child(group, child2).unwrap();

        assert_eq!(tree.parent(child1), Some(group));
        assert_eq!(tree.parent(child2), Some(group));

        let kids: Vec<_> = tree.children(group).collect();
        assert_eq!(kids, vec![child1, child2]);
        assert_eq!(tree.index_in_group(child2), Some(1));
        assert_eq!(tree.index_in_group(group), None);
    }

    #[test]
    fn insert_and_move_child() {
        let mut tree = LayerTree::default();
        let group = tree.create_plain_group();
        let a = tree.create_plain_layer();
        let b = tree.create_plain_layer();
        let c = tree.create_plain_layer();

        tree.add_child(group, a).unwrap();
        tree.add_child(group, c).unwrap();
        tree.insert_child(group, b, 1).unwrap();
        assert_eq!(tree.children(group).collect::<Vec<_>>(), vec![a, b, c]);

        tree.move_child(a, 2).unwrap();
        assert_eq!(tree.children(group).collect::<Vec<_>>(), vec![b, c, a]);

        assert_eq!(
            tree.move_child(a, 3),
            Err(TreeError::IndexOutOfRange { index: 3, len: 3 })
        );
        let loose = tree.create_plain_layer();
        assert_eq!(tree.move_child(loose, 0), Err(TreeError::Detached(loose)));
        assert_eq!(
            tree.insert_child(group, loose, 9),
            Err(TreeError::IndexOutOfRange { index: 9, len: 3 })
        );
    }

    #[test]
    fn structural_misuse_is_rejected() {
        let mut tree = LayerTree::default();
        let outer = tree.create_plain_group();
        let inner = tree.create_plain_group();
        let leaf = tree.create_plain_layer();
        let other = tree.create_plain_layer();

        tree.add_child(outer, inner).unwrap();
        tree.add_child(inner, leaf).unwrap();

        assert_eq!(
            tree.add_child(inner, outer),
            Err(TreeError::Cycle {
                group: inner,
                child: outer
            })
        );
        assert_eq!(
            tree.add_child(outer, outer),
            Err(TreeError::Cycle {
                group: outer,
                child: outer
            })
        );
        assert_eq!(
            tree.add_child(leaf, other),
            Err(TreeError::NotAGroup(leaf))
        );
        assert_eq!(
            tree.add_child(outer, leaf),
            Err(TreeError::AlreadyParented(leaf))
        );
        assert_eq!(
            tree.reparent(outer, inner),
            Err(TreeError::Cycle {
                group: inner,
                child: outer
            })
        );
        // Failed calls leave the tree unchanged.
        assert_eq!(tree.parent(inner), Some(outer));
        assert_eq!(tree.parent(outer), None);
    }

    #[test]
    fn remove_from_parent_is_noop_when_detached() {
        let mut tree = LayerTree::default();
        let group = tree.create_plain_group();
        let child = tree.create_plain_layer();

        tree.remove_from_parent(child);
        tree.add_child(group, child).unwrap();
        tree.remove_from_parent(child);
        assert_eq!(tree.parent(child), None);
        assert!(tree.children(group).next().is_none());
    }

    #[test]
    fn reparent_works() {
        let mut tree = LayerTree::default();
        let g1 = tree.create_plain_group();
        let g2 = tree.create_plain_group();
        let child = tree.create_plain_layer();

        tree.add_child(g1, child).unwrap();
        tree.reparent(child, g2).unwrap();
        assert_eq!(tree.parent(child), Some(g2));
        assert!(tree.children(g1).next().is_none());
    }

    #[test]
    fn level_and_group_membership() {
        let mut tree = LayerTree::default();
        let root = tree.create_plain_group();
        let inner = tree.create_plain_group();
        let leaf = tree.create_plain_layer();
        tree.add_child(root, inner).unwrap();
        tree.add_child(inner, leaf).unwrap();

        assert_eq!(tree.level(root), 1);
        assert_eq!(tree.level(inner), 2);
        assert_eq!(tree.level(leaf), 3);
        assert!(tree.is_child_of_group(leaf, root));
        assert!(tree.is_child_of_group(leaf, inner));
        assert!(!tree.is_child_of_group(root, leaf));
        assert_eq!(tree.ancestors(leaf).collect::<Vec<_>>(), vec![inner, root]);
    }

    #[test]
    fn destroy_takes_the_subtree() {
        let mut tree = LayerTree::default();
        let root = tree.create_plain_group();
        let inner = tree.create_plain_group();
        let leaf = tree.create_plain_layer();
        tree.add_child(root, inner).unwrap();
        tree.add_child(inner, leaf).unwrap();

        tree.destroy_layer(inner);
        assert!(!tree.is_alive(inner));
        assert!(!tree.is_alive(leaf));
        assert!(tree.children(root).next().is_none());
        assert_eq!(tree.live_count(), 1);
    }

    struct CountAdds(Rc<Cell<u32>>);

    impl Layer for CountAdds {
        fn was_added_to_root(&mut self, _state: &LayerState) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn added_to_root_fires_once_per_layer() {
        let mut tree = LayerTree::default();
        let root = tree.create_plain_group();
        tree.set_root_group(root).unwrap();

        let group_hits = Rc::new(Cell::new(0));
        let leaf_hits = Rc::new(Cell::new(0));
        let group = tree.create_group(Box::new(CountAdds(Rc::clone(&group_hits))));
        let leaf = tree.create_layer(Box::new(CountAdds(Rc::clone(&leaf_hits))));

        // Not reachable yet.
        tree.add_child(group, leaf).unwrap();
        assert_eq!(leaf_hits.get(), 0);

        tree.add_child(root, group).unwrap();
        assert_eq!(group_hits.get(), 1);
        assert_eq!(leaf_hits.get(), 1);

        tree.remove_from_parent(group);
        tree.add_child(root, group).unwrap();
        assert_eq!(group_hits.get(), 1);
        assert_eq!(leaf_hits.get(), 1);
    }

    #[test]
    fn root_group_must_be_a_detached_group() {
        let mut tree = LayerTree::default();
        let leaf = tree.create_plain_layer();
        assert_eq!(tree.set_root_group(leaf), Err(TreeError::NotAGroup(leaf)));

        let outer = tree.create_plain_group();
        let inner = tree.create_plain_group();
        tree.add_child(outer, inner).unwrap();
        assert_eq!(
            tree.set_root_group(inner),
            Err(TreeError::AlreadyParented(inner))
        );
        tree.set_root_group(outer).unwrap();
        assert_eq!(tree.root_group(), Some(outer));
        tree.destroy_layer(outer);
        assert_eq!(tree.root_group(), None);
    }

    #[test]
    fn root_group_cannot_join_another_group() {
        let mut tree = LayerTree::default();
        let root = tree.create_plain_group();
        let other = tree.create_plain_group();
        tree.set_root_group(root).unwrap();

        assert_eq!(tree.add_child(other, root), Err(TreeError::IsRoot(root)));
        assert_eq!(
            tree.insert_child(other, root, 0),
            Err(TreeError::IsRoot(root))
        );
        assert_eq!(tree.reparent(root, other), Err(TreeError::IsRoot(root)));

        tree.hide(other);
        assert_eq!(tree.parent(root), None);
        assert!(tree.is_effectively_visible(root));
        assert_eq!(tree.level(root), 1);
    }

    #[test]
    fn default_trees_never_share_identity_keys() {
        let mut a = LayerTree::default();
        let mut b = LayerTree::default();
        let x = a.create_plain_layer();
        let y = b.create_plain_layer();
        assert_ne!(a.state(x).identity_key(), b.state(y).identity_key());
    }

    #[test]
    fn downcast_behavior() {
        let mut tree = LayerTree::default();
        let group = tree.create_plain_group();
        assert!(tree.layer::<GroupLayer>(group).is_some());
        assert!(tree.layer::<PlainLayer>(group).is_none());
        assert_eq!(tree.kind(group), "group");
        assert!(tree.may_be_deleted(group));
    }

    #[test]
    #[should_panic(expected = "stale LayerId")]
    fn destroyed_handle_panics_on_state() {
        let mut tree = LayerTree::default();
        let id = tree.create_plain_layer();
        tree.destroy_layer(id);
        let _ = tree.state(id);
    }

    #[test]
    #[should_panic(expected = "stale LayerId")]
    fn destroyed_handle_panics_on_add_child() {
        let mut tree = LayerTree::default();
        let root = tree.create_plain_group();
        let id = tree.create_plain_layer();
        tree.destroy_layer(id);
        let _ = tree.add_child(root, id);
    }

    #[test]
    #[should_panic(expected = "stale LayerId")]
    fn destroyed_handle_panics_on_parent() {
        let mut tree = LayerTree::default();
        let id = tree.create_plain_layer();
        tree.destroy_layer(id);
        let _ = tree.parent(id);
    }
}
