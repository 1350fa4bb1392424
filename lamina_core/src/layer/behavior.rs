// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layer capability trait and the built-in layer kinds.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;

use kurbo::{Point, Rect, Size};
use serde_json::Value;

use super::id::ContentRef;
use super::state::LayerState;
use crate::input::{Modifiers, PointerEvent};
use crate::knobs::Knobs;
use crate::pasteboard::{FormatId, PasteboardOp};
use crate::style::StyleSet;
use crate::surface::{RenderPurpose, Surface};

/// Everything a layer sees while it draws.
pub struct RenderCx<'a> {
    pub(crate) area: Rect,
    pub(crate) state: &'a LayerState,
    pub(crate) surface: Option<&'a mut (dyn Surface + 'static)>,
    pub(crate) purpose: RenderPurpose,
    pub(crate) knobs: Rc<Knobs>,
}

impl core::fmt::Debug for RenderCx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenderCx")
            .field("area", &self.area)
            .field("purpose", &self.purpose)
            .field("has_surface", &self.surface.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> RenderCx<'a> {
    /// The area being drawn, in drawing coordinates.
    ///
    /// Already intersected with the drawing interior when the layer clips to
    /// it.
    #[must_use]
    pub fn area(&self) -> Rect {
        self.area
    }

    /// The drawing layer's state.
    #[must_use]
    pub fn state(&self) -> &'a LayerState {
        self.state
    }

    /// The render target, if any.
    pub fn surface(&mut self) -> Option<&mut (dyn Surface + 'static)> {
        self.surface.as_deref_mut()
    }

    /// Downcasts the render target to a concrete backend surface.
    pub fn surface_as<S: Surface + 'static>(&mut self) -> Option<&mut S> {
        self.surface
            .as_deref_mut()
            .and_then(|s| s.as_any_mut().downcast_mut::<S>())
    }

    /// Why this pass is running.
    #[must_use]
    pub fn purpose(&self) -> RenderPurpose {
        self.purpose
    }

    /// Knobs resolved for the drawing layer.
    #[must_use]
    pub fn knobs(&self) -> &Knobs {
        &self.knobs
    }

    /// Handle size in drawing units for the current view scale.
    #[must_use]
    pub fn knob_size(&self) -> f64 {
        let scale = self.surface.as_deref().map_or(1.0, |s| s.view_scale());
        self.knobs
            .handle_size_at_scale(scale, self.state.knobs_adjust_to_scale)
    }
}

/// Capabilities of a layer kind.
///
/// Every method has a default so that kinds only override what they need.
/// The engine owns the [`LayerState`]; a kind owns its own content and is
/// handed the state where it needs it.
pub trait Layer: Any {
    /// Short kind name stored in persisted records.
    fn kind(&self) -> &str {
        "layer"
    }

    /// Draws the layer. Never called for an effectively invisible layer.
    fn render(&mut self, cx: &mut RenderCx<'_>) {
        _ = cx;
    }

    /// Called before [`render`](Self::render).
    fn begin_drawing(&mut self, cx: &mut RenderCx<'_>) {
        _ = cx;
    }

    /// Called after [`render`](Self::render) (and after a group's children).
    fn end_drawing(&mut self, cx: &mut RenderCx<'_>) {
        _ = cx;
    }

    /// Whether the layer fully covers everything beneath it.
    fn is_opaque(&self) -> bool {
        false
    }

    /// Whether the layer has content at `point`.
    fn hit_layer(&self, point: Point) -> bool {
        _ = point;
        false
    }

    /// The object under `point`, if any.
    fn hit_test(&self, point: Point) -> Option<ContentRef> {
        _ = point;
        None
    }

    /// Formats accepted for `op`.
    fn pasteboard_types(&self, op: PasteboardOp) -> Vec<FormatId> {
        _ = op;
        Vec::new()
    }

    /// Swaps any style the layer uses for the same-keyed style in `styles`.
    fn replace_matching_styles(&mut self, styles: &StyleSet) {
        _ = styles;
    }

    /// Every style used by content in this layer.
    fn all_styles(&self) -> Option<StyleSet> {
        None
    }

    /// Every registered style used by content in this layer.
    fn all_registered_styles(&self) -> Option<StyleSet> {
        None
    }

    /// The layer became reachable from the root group for the first time.
    fn was_added_to_root(&mut self, state: &LayerState) {
        _ = state;
    }

    /// The drawing's size changed.
    fn drawing_did_change_size(&mut self, size: Size) {
        _ = size;
    }

    /// The drawing's interior (margins) changed.
    fn drawing_did_change_interior(&mut self, interior: Rect) {
        _ = interior;
    }

    /// Whether the layer may become the active layer.
    fn may_become_active(&self) -> bool {
        true
    }

    /// Whether user interface actions may delete the layer.
    fn may_be_deleted(&self) -> bool {
        true
    }

    /// The layer became the active layer.
    fn did_become_active(&mut self) {}

    /// The layer stopped being the active layer.
    fn did_resign_active(&mut self) {}

    /// Whether a click at `event` should make this layer active.
    fn should_auto_activate(&self, event: &PointerEvent, state: &LayerState) -> bool {
        _ = event;
        !state.locked
    }

    /// A pointer event routed to the active layer.
    fn handle_pointer(&mut self, state: &LayerState, event: &PointerEvent) {
        _ = (state, event);
    }

    /// The modifier keys changed while the layer is active.
    fn modifiers_changed(&mut self, modifiers: Modifiers) {
        _ = modifiers;
    }

    /// Kind-specific persisted data.
    fn encode_payload(&self) -> Value {
        Value::Null
    }
}

/// A layer kind with no content of its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainLayer;

impl Layer for PlainLayer {}

/// The default group kind.
///
/// Groups draw only their children and never become the active layer
/// themselves.
#[derive(Clone, Copy, Debug, Default)]
pub struct GroupLayer;

impl Layer for GroupLayer {
    fn kind(&self) -> &str {
        "group"
    }

    fn may_become_active(&self) -> bool {
        false
    }
}
