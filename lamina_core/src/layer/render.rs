// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering with occlusion culling.
//!
//! A group draws its children bottom to top, but first scans them top-down
//! for an *occluder*: a visible child with full alpha whose behavior reports
//! [`is_opaque`](super::Layer::is_opaque). Drawing starts at the topmost
//! occluder; children below it are covered and never invoked. Each group is
//! scanned exactly once per pass.

use alloc::vec::Vec;

use kurbo::Rect;

use super::behavior::RenderCx;
use super::id::LayerId;
use super::tree::LayerTree;
use crate::surface::{RenderPurpose, Surface};
use crate::trace::RenderPassEvent;

impl LayerTree {
    /// Renders the root group into `area`.
    ///
    /// Does nothing if no root group is set.
    pub fn render(&mut self, area: Rect, surface: Option<&mut (dyn Surface + 'static)>) {
        if let Some(root) = self.root_group() {
            self.render_layer(root, area, surface, RenderPurpose::Display);
        }
    }

    /// Renders one layer and its subtree into `area`.
    ///
    /// Nothing is drawn if the layer is effectively invisible, or if it is
    /// not printable and `purpose` is [`RenderPurpose::Print`]. Siblings of
    /// the layer do not occlude it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn render_layer(
        &mut self,
        id: LayerId,
        area: Rect,
        mut surface: Option<&mut (dyn Surface + 'static)>,
        purpose: RenderPurpose,
    ) {
        self.validate(id);
        if !self.effectively_visible_at(id.idx) {
            return;
        }
        self.render_at(id.idx, area, &mut surface, purpose);
    }

    /// Returns the layers a render of `group` would invoke, in drawing order.
    ///
    /// Groups are listed before their children. The result is empty if the
    /// group is effectively invisible.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn render_order(&self, group: LayerId, purpose: RenderPurpose) -> Vec<LayerId> {
        self.validate(group);
        let mut out = Vec::new();
        if self.effectively_visible_at(group.idx) && self.is_drawn(group.idx, purpose) {
            self.collect_render_order(group.idx, purpose, &mut out);
        }
        out
    }

    fn collect_render_order(&self, idx: u32, purpose: RenderPurpose, out: &mut Vec<LayerId>) {
        out.push(self.id_at(idx));
        if !self.is_group[idx as usize] {
            return;
        }
        let start = self.first_unoccluded(idx, purpose);
        for &c in &self.children[idx as usize][start..] {
            if self.is_drawn(c, purpose) {
                self.collect_render_order(c, purpose, out);
            }
        }
    }

    /// Returns the index of the first child of `group` that is not covered
    /// by an opaque sibling above it.
    pub(crate) fn first_unoccluded(&self, group: u32, purpose: RenderPurpose) -> usize {
        self.children[group as usize]
            .iter()
            .rposition(|&c| self.is_occluder(c, purpose))
            .unwrap_or(0)
    }

    /// Whether `idx` is drawn at all when its group is drawn.
    fn is_drawn(&self, idx: u32, purpose: RenderPurpose) -> bool {
        let state = &self.state[idx as usize];
        state.visible && (purpose != RenderPurpose::Print || state.printable)
    }

    fn is_occluder(&self, idx: u32, purpose: RenderPurpose) -> bool {
        self.is_drawn(idx, purpose)
            && self.state[idx as usize].alpha >= 1.0
            && self.behavior[idx as usize].is_opaque()
    }

    fn render_at(
        &mut self,
        idx: u32,
        area: Rect,
        surface: &mut Option<&mut (dyn Surface + 'static)>,
        purpose: RenderPurpose,
    ) {
        let i = idx as usize;
        if !self.is_drawn(idx, purpose) {
            return;
        }
        let area = if self.state[i].clip_to_interior {
            area.intersect(self.drawing_interior())
        } else {
            area
        };
        let knobs = self.resolved_knobs_at(idx);

        {
            let mut cx = RenderCx {
                area,
                state: &self.state[i],
                surface: surface.as_deref_mut(),
                purpose,
                knobs: knobs.clone(),
            };
            let behavior = &mut self.behavior[i];
            behavior.begin_drawing(&mut cx);
            behavior.render(&mut cx);
        }

        if self.is_group[i] {
            let start = self.first_unoccluded(idx, purpose);
            let children = self.children[i].clone();
            let mut rendered = 0;
            for &c in &children[start..] {
                if self.is_drawn(c, purpose) {
                    self.render_at(c, area, surface, purpose);
                    rendered += 1;
                }
            }
            let event = RenderPassEvent {
                group: self.id_at(idx),
                rendered,
                culled: start,
                purpose,
            };
            Self::tracer(&mut self.trace).render_pass(&event);
        }

        let mut cx = RenderCx {
            area,
            state: &self.state[i],
            surface: surface.as_deref_mut(),
            purpose,
            knobs,
        };
        self.behavior[i].end_drawing(&mut cx);
    }
}
