// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Redraw requests, display surfaces, and ruler markers.

use alloc::boxed::Box;

use kurbo::{Rect, Size};

use super::id::LayerId;
use super::tree::LayerTree;
use crate::invalidate::{DamageRegion, DisplayId, DisplaySurface};
use crate::trace::{FlushEvent, RedrawRequestEvent};

impl LayerTree {
    // -- Redraw requests --

    /// Requests that everything the layer may draw be repainted.
    ///
    /// This is the drawing's bounds, or the whole surface while the drawing
    /// size is still empty.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn request_redraw(&mut self, id: LayerId) {
        self.validate(id);
        let rect = if self.drawing_size.is_zero_area() {
            self.damage.mark_full();
            None
        } else {
            let bounds = self.drawing_bounds();
            self.damage.add_rect(bounds);
            Some(bounds)
        };
        Self::tracer(&mut self.trace).redraw_requested(&RedrawRequestEvent { layer: id, rect });
    }

    /// Requests that `rect` be repainted.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn request_redraw_rect(&mut self, id: LayerId, rect: Rect) {
        self.validate(id);
        self.damage.add_rect(rect);
        Self::tracer(&mut self.trace).redraw_requested(&RedrawRequestEvent {
            layer: id,
            rect: Some(rect.abs()),
        });
    }

    /// Requests that every rect in `rects`, grown by `padding` on each side,
    /// be repainted.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn request_redraw_rects(&mut self, id: LayerId, rects: &[Rect], padding: Size) {
        self.validate(id);
        if rects.is_empty() {
            return;
        }
        self.damage.add_rects(rects.iter().copied(), padding);
        let bounds = rects
            .iter()
            .map(|r| r.abs().inflate(padding.width, padding.height))
            .reduce(|a, b| a.union(b));
        Self::tracer(&mut self.trace).redraw_requested(&RedrawRequestEvent {
            layer: id,
            rect: bounds,
        });
    }

    /// Returns the damage accumulated since the last flush.
    #[must_use]
    pub fn pending_damage(&self) -> &DamageRegion {
        self.damage.region()
    }

    /// Forwards pending damage to every attached display.
    ///
    /// Returns `false` (keeping the damage pending) when there is nothing to
    /// flush or no display is attached.
    pub fn flush(&mut self) -> bool {
        if self.damage.is_empty() || self.displays.is_empty() {
            return false;
        }
        let region = self.damage.take();
        for (_, display) in &mut self.displays {
            display.invalidate(&region);
        }
        let event = FlushEvent {
            displays: self.displays.len(),
            full: matches!(region, DamageRegion::Full),
            rects: region.rect_count(),
        };
        Self::tracer(&mut self.trace).flush(&event);
        true
    }

    // -- Displays --

    /// Attaches a display that will receive flushed damage and ruler marker
    /// updates.
    pub fn attach_display(&mut self, display: Box<dyn DisplaySurface>) -> DisplayId {
        let id = DisplayId(self.next_display);
        self.next_display += 1;
        self.displays.push((id, display));
        id
    }

    /// Detaches a display, handing it back.
    pub fn detach_display(&mut self, id: DisplayId) -> Option<Box<dyn DisplaySurface>> {
        let pos = self.displays.iter().position(|(d, _)| *d == id)?;
        Some(self.displays.remove(pos).1)
    }

    /// Returns the number of attached displays.
    #[must_use]
    pub fn display_count(&self) -> usize {
        self.displays.len()
    }

    // -- Ruler markers --

    /// Shows ruler markers for `rect` on every display, if the layer has
    /// ruler marker updates enabled.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn update_ruler_markers(&mut self, id: LayerId, rect: Rect) {
        self.send_ruler_markers(id, Some(rect));
    }

    /// Hides ruler markers on every display, if the layer has ruler marker
    /// updates enabled.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn hide_ruler_markers(&mut self, id: LayerId) {
        self.send_ruler_markers(id, None);
    }

    fn send_ruler_markers(&mut self, id: LayerId, rect: Option<Rect>) {
        self.validate(id);
        if !self.state[id.idx as usize].ruler_markers_enabled {
            return;
        }
        for (_, display) in &mut self.displays {
            display.update_ruler_markers(rect);
        }
    }
}
