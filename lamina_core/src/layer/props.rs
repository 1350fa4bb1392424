// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer state mutation, drawing geometry, and capability queries.
//!
//! The named setters ([`set_visible`](LayerTree::set_visible),
//! [`set_locked`](LayerTree::set_locked), [`set_name`](LayerTree::set_name),
//! [`set_selection_color`](LayerTree::set_selection_color)) commit the new
//! value, emit the matching [`LayerEvent`], and then request a redraw of the
//! whole layer. Setting a value a layer already has does nothing.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};
use serde_json::Value;
use understory_dirty::EagerPolicy;

use super::behavior::Layer;
use super::id::{INVALID, LayerId};
use super::tree::LayerTree;
use crate::color::Color;
use crate::dirty;
use crate::event::{LayerEvent, LayerEventKind, ObserverId, ObserverScope};
use crate::knobs::Knobs;
use crate::pasteboard::{self, FormatId, PasteboardOp, TransferSource};
use crate::style::StyleSet;

impl LayerTree {
    // -- Observers --

    /// Registers `callback` for events in `scope`.
    ///
    /// Layer-scoped observers are dropped when their layer is destroyed.
    ///
    /// # Panics
    ///
    /// Panics if the scope names a stale layer.
    pub fn observe(
        &mut self,
        scope: ObserverScope,
        callback: impl FnMut(&LayerEvent) + 'static,
    ) -> ObserverId {
        if let ObserverScope::Layer(id) = scope {
            self.validate(id);
        }
        self.observers.add(scope, Box::new(callback))
    }

    /// Removes an observer. Returns `false` if it was already gone.
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    fn emit(&mut self, id: LayerId, kind: LayerEventKind) {
        let event = LayerEvent { kind, layer: id };
        self.observers.emit(&event);
        Self::tracer(&mut self.trace).state_change(&event);
    }

    // -- Named setters --

    /// Shows or hides a layer and its subtree.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_visible(&mut self, id: LayerId, visible: bool) {
        self.validate(id);
        let state = &mut self.state[id.idx as usize];
        if state.visible == visible {
            return;
        }
        state.visible = visible;
        self.dirty.mark_with(id.idx, dirty::VISIBILITY, &EagerPolicy);
        self.emit(id, LayerEventKind::VisibleStateChanged);
        self.request_redraw(id);
    }

    /// Locks or unlocks a layer and its subtree.
    ///
    /// Locking is advisory: the engine still renders and hit-tests locked
    /// layers, but pointer events are not routed to them.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_locked(&mut self, id: LayerId, locked: bool) {
        self.validate(id);
        let state = &mut self.state[id.idx as usize];
        if state.locked == locked {
            return;
        }
        state.locked = locked;
        self.dirty.mark_with(id.idx, dirty::LOCK, &EagerPolicy);
        self.emit(id, LayerEventKind::LockStateChanged);
        self.request_redraw(id);
    }

    /// Renames a layer.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_name(&mut self, id: LayerId, name: impl Into<String>) {
        self.validate(id);
        let name = name.into();
        let state = &mut self.state[id.idx as usize];
        if state.name == name {
            return;
        }
        state.name = name;
        self.dirty.mark(id.idx, dirty::APPEARANCE);
        self.emit(id, LayerEventKind::NameChanged);
        self.request_redraw(id);
    }

    /// Changes the color used to highlight selected content.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_selection_color(&mut self, id: LayerId, color: Color) {
        self.validate(id);
        let state = &mut self.state[id.idx as usize];
        if state.selection_color == Some(color) {
            return;
        }
        state.selection_color = Some(color);
        self.dirty.mark(id.idx, dirty::APPEARANCE);
        self.emit(id, LayerEventKind::SelectionColorChanged);
        self.request_redraw(id);
    }

    // -- Other setters --

    /// Sets whether the layer is drawn when printing.
    pub fn set_printable(&mut self, id: LayerId, printable: bool) {
        self.validate(id);
        let state = &mut self.state[id.idx as usize];
        if state.printable != printable {
            state.printable = printable;
            self.dirty.mark(id.idx, dirty::APPEARANCE);
        }
    }

    /// Sets whether rendering is clipped to the drawing interior.
    pub fn set_clip_to_interior(&mut self, id: LayerId, clip: bool) {
        self.validate(id);
        let state = &mut self.state[id.idx as usize];
        if state.clip_to_interior != clip {
            state.clip_to_interior = clip;
            self.dirty.mark(id.idx, dirty::APPEARANCE);
            self.request_redraw(id);
        }
    }

    /// Sets the advisory opacity, clamped to `[0, 1]`. NaN is ignored.
    ///
    /// A layer with alpha below 1 never hides the layers beneath it.
    pub fn set_alpha(&mut self, id: LayerId, alpha: f64) {
        self.validate(id);
        if alpha.is_nan() {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let state = &mut self.state[id.idx as usize];
        if state.alpha != alpha {
            state.alpha = alpha;
            self.dirty.mark(id.idx, dirty::APPEARANCE);
            self.request_redraw(id);
        }
    }

    /// Sets whether ruler marker updates from this layer reach the displays.
    pub fn set_ruler_markers_enabled(&mut self, id: LayerId, enabled: bool) {
        self.validate(id);
        self.state[id.idx as usize].ruler_markers_enabled = enabled;
    }

    /// Sets whether knob sizes follow the view scale.
    pub fn set_knobs_adjust_to_scale(&mut self, id: LayerId, adjust: bool) {
        self.validate(id);
        let state = &mut self.state[id.idx as usize];
        if state.knobs_adjust_to_scale != adjust {
            state.knobs_adjust_to_scale = adjust;
            self.dirty.mark(id.idx, dirty::APPEARANCE);
        }
    }

    /// Sets or clears the layer's own knobs.
    pub fn set_knobs(&mut self, id: LayerId, knobs: Option<Rc<Knobs>>) {
        self.validate(id);
        self.state[id.idx as usize].knobs = knobs;
        self.dirty.mark(id.idx, dirty::APPEARANCE);
    }

    /// Records that drawable content owned by the layer kind changed.
    pub fn mark_content_changed(&mut self, id: LayerId) {
        self.validate(id);
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    // -- User interface actions --

    /// Locks the layer.
    pub fn lock(&mut self, id: LayerId) {
        self.set_locked(id, true);
    }

    /// Unlocks the layer.
    pub fn unlock(&mut self, id: LayerId) {
        self.set_locked(id, false);
    }

    /// Flips the locked flag.
    pub fn toggle_locked(&mut self, id: LayerId) {
        let locked = self.state(id).locked;
        self.set_locked(id, !locked);
    }

    /// Shows the layer.
    pub fn show(&mut self, id: LayerId) {
        self.set_visible(id, true);
    }

    /// Hides the layer.
    pub fn hide(&mut self, id: LayerId) {
        self.set_visible(id, false);
    }

    /// Flips the visible flag.
    pub fn toggle_visible(&mut self, id: LayerId) {
        let visible = self.state(id).visible;
        self.set_visible(id, !visible);
    }

    // -- Knobs --

    /// Returns the knobs that apply to a layer: its own, else the nearest
    /// enclosing group's, else the context default.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn resolved_knobs(&self, id: LayerId) -> Rc<Knobs> {
        self.validate(id);
        self.resolved_knobs_at(id.idx)
    }

    pub(crate) fn resolved_knobs_at(&self, idx: u32) -> Rc<Knobs> {
        let mut i = idx;
        while i != INVALID {
            if let Some(knobs) = &self.state[i as usize].knobs {
                return Rc::clone(knobs);
            }
            i = self.parent[i as usize];
        }
        self.context.default_knobs()
    }

    // -- User info --

    /// Returns the layer's metadata.
    #[must_use]
    pub fn user_info(&self, id: LayerId) -> &BTreeMap<String, Value> {
        &self.state(id).user_info
    }

    /// Returns one metadata value.
    #[must_use]
    pub fn user_info_value(&self, id: LayerId, key: &str) -> Option<&Value> {
        self.state(id).user_info.get(key)
    }

    /// Stores one metadata value.
    pub fn set_user_info_value(&mut self, id: LayerId, key: impl Into<String>, value: Value) {
        self.validate(id);
        self.state[id.idx as usize]
            .user_info
            .insert(key.into(), value);
    }

    /// Merges `info` into the layer's metadata, replacing same-keyed values.
    pub fn add_user_info(&mut self, id: LayerId, info: BTreeMap<String, Value>) {
        self.validate(id);
        self.state[id.idx as usize].user_info.extend(info);
    }

    /// Replaces the layer's metadata.
    pub fn set_user_info(&mut self, id: LayerId, info: BTreeMap<String, Value>) {
        self.validate(id);
        self.state[id.idx as usize].user_info = info;
    }

    // -- Drawing geometry --

    /// Returns the drawing size.
    #[must_use]
    pub fn drawing_size(&self) -> Size {
        self.drawing_size
    }

    /// Returns the drawing bounds, anchored at the origin.
    #[must_use]
    pub fn drawing_bounds(&self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.drawing_size)
    }

    /// Returns the drawing interior: the area inside the margins, or the
    /// whole drawing when no interior has been set.
    #[must_use]
    pub fn drawing_interior(&self) -> Rect {
        self.interior.unwrap_or_else(|| self.drawing_bounds())
    }

    /// Resizes the drawing and tells every live layer.
    pub fn set_drawing_size(&mut self, size: Size) {
        if self.drawing_size == size {
            return;
        }
        self.drawing_size = size;
        for idx in 0..self.len as usize {
            if self.alive[idx] {
                self.behavior[idx].drawing_did_change_size(size);
            }
        }
        self.damage.mark_full();
    }

    /// Sets the drawing interior and tells every live layer.
    pub fn set_drawing_interior(&mut self, interior: Rect) {
        let interior = interior.abs();
        if self.interior == Some(interior) {
            return;
        }
        self.interior = Some(interior);
        for idx in 0..self.len as usize {
            if self.alive[idx] {
                self.behavior[idx].drawing_did_change_interior(interior);
            }
        }
        self.damage.mark_full();
    }

    // -- Styles --

    /// Hands `styles` to the layer and every layer below it.
    pub fn replace_matching_styles(&mut self, id: LayerId, styles: &StyleSet) {
        self.validate(id);
        let mut subtree = Vec::new();
        self.collect_subtree(id.idx, &mut subtree);
        for idx in subtree {
            self.behavior[idx as usize].replace_matching_styles(styles);
        }
    }

    /// Returns every style used in the layer's subtree, or `None` if no layer
    /// reports any.
    #[must_use]
    pub fn all_styles(&self, id: LayerId) -> Option<StyleSet> {
        self.gather_styles(id, |layer| layer.all_styles())
    }

    /// Returns every registered style used in the layer's subtree, or `None`
    /// if no layer reports any.
    #[must_use]
    pub fn all_registered_styles(&self, id: LayerId) -> Option<StyleSet> {
        self.gather_styles(id, |layer| layer.all_registered_styles())
    }

    fn gather_styles(
        &self,
        id: LayerId,
        styles_of: impl Fn(&dyn Layer) -> Option<StyleSet>,
    ) -> Option<StyleSet> {
        self.validate(id);
        let mut subtree = Vec::new();
        self.collect_subtree(id.idx, &mut subtree);
        let mut all: Option<StyleSet> = None;
        for idx in subtree {
            if let Some(styles) = styles_of(&*self.behavior[idx as usize]) {
                let set = all.get_or_insert_with(StyleSet::new);
                for (key, style) in styles.iter() {
                    set.insert(key.clone(), *style);
                }
            }
        }
        all
    }

    // -- Data transfer --

    /// Returns the formats the layer accepts for `op`.
    #[must_use]
    pub fn pasteboard_types(&self, id: LayerId, op: PasteboardOp) -> Vec<FormatId> {
        self.behavior(id).pasteboard_types(op)
    }

    /// Returns whether `source` offers a format the layer accepts for `op`.
    #[must_use]
    pub fn has_available_type(
        &self,
        id: LayerId,
        source: &dyn TransferSource,
        op: PasteboardOp,
    ) -> bool {
        let wanted = self.pasteboard_types(id, op);
        pasteboard::has_available_type(&wanted, source)
    }
}
