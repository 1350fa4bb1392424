// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-layer state owned by the tree.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;

use serde_json::Value;

use crate::color::Color;
use crate::knobs::Knobs;

/// The state the engine keeps for every live layer.
///
/// Fields are read through getters; changes go through the
/// [`LayerTree`](super::LayerTree) setters so that events, dirty channels, and
/// redraw requests stay consistent.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerState {
    pub(crate) identity_key: String,
    pub(crate) name: String,
    pub(crate) visible: bool,
    pub(crate) locked: bool,
    pub(crate) printable: bool,
    pub(crate) clip_to_interior: bool,
    pub(crate) ruler_markers_enabled: bool,
    pub(crate) knobs_adjust_to_scale: bool,
    pub(crate) alpha: f64,
    pub(crate) selection_color: Option<Color>,
    pub(crate) knobs: Option<Rc<Knobs>>,
    pub(crate) user_info: BTreeMap<String, Value>,
}

impl LayerState {
    pub(crate) fn new(identity_key: String, selection_color: Option<Color>) -> Self {
        Self {
            identity_key,
            name: String::new(),
            visible: true,
            locked: false,
            printable: true,
            clip_to_interior: false,
            ruler_markers_enabled: true,
            knobs_adjust_to_scale: true,
            alpha: 1.0,
            selection_color,
            knobs: None,
            user_info: BTreeMap::new(),
        }
    }

    /// The key assigned at construction, unique among live layers of a
    /// context.
    #[must_use]
    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    /// The user-visible name. Never interpreted by the engine.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The layer's own visible flag (ancestors are not consulted).
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The layer's own locked flag (ancestors are not consulted).
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether the layer is drawn when printing.
    #[must_use]
    pub fn is_printable(&self) -> bool {
        self.printable
    }

    /// Whether rendering is clipped to the drawing's interior.
    #[must_use]
    pub fn clips_to_interior(&self) -> bool {
        self.clip_to_interior
    }

    /// Whether ruler marker updates are forwarded.
    #[must_use]
    pub fn ruler_markers_enabled(&self) -> bool {
        self.ruler_markers_enabled
    }

    /// Whether knob sizes follow the view scale.
    #[must_use]
    pub fn knobs_adjust_to_scale(&self) -> bool {
        self.knobs_adjust_to_scale
    }

    /// Advisory opacity in `[0, 1]`.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The color used to highlight selected content in this layer.
    #[must_use]
    pub fn selection_color(&self) -> Option<Color> {
        self.selection_color
    }

    /// The layer's own knobs override, if any.
    #[must_use]
    pub fn knobs(&self) -> Option<&Rc<Knobs>> {
        self.knobs.as_ref()
    }

    /// Arbitrary client metadata.
    #[must_use]
    pub fn user_info(&self) -> &BTreeMap<String, Value> {
        &self.user_info
    }
}
