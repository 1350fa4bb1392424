// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for tree operations.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`LayerTree`](crate::layer::LayerTree) calls as it invalidates, renders,
//! flushes, and decodes. All method bodies default to no-ops, so implementing
//! only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use kurbo::Rect;

use crate::event::LayerEvent;
use crate::layer::LayerId;
use crate::surface::RenderPurpose;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a layer asks for part of the drawing to be redrawn.
#[derive(Clone, Copy, Debug)]
pub struct RedrawRequestEvent {
    /// The requesting layer.
    pub layer: LayerId,
    /// Bounds of the requested area, or `None` for the whole surface.
    pub rect: Option<Rect>,
}

/// Emitted after a group has finished drawing its children.
#[derive(Clone, Copy, Debug)]
pub struct RenderPassEvent {
    /// The group whose children were scanned.
    pub group: LayerId,
    /// Children whose render entry was invoked.
    pub rendered: usize,
    /// Children skipped because an opaque sibling above covers them.
    pub culled: usize,
    /// Why the pass ran.
    pub purpose: RenderPurpose,
}

/// Emitted when pending damage is forwarded to display surfaces.
#[derive(Clone, Copy, Debug)]
pub struct FlushEvent {
    /// Number of attached displays that received the region.
    pub displays: usize,
    /// Whether the region covered the whole surface.
    pub full: bool,
    /// Number of rectangles in the region (0 when `full`).
    pub rects: usize,
}

/// Emitted when a decoded layer could not keep its persisted identity key.
#[derive(Clone, Copy, Debug)]
pub struct IdentityRegeneratedEvent<'a> {
    /// The decoded layer.
    pub layer: LayerId,
    /// The key found in the record, already held by a live layer.
    pub persisted: &'a str,
    /// The freshly minted replacement.
    pub assigned: &'a str,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from a layer tree.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a redraw is requested.
    fn on_redraw_requested(&mut self, e: &RedrawRequestEvent) {
        _ = e;
    }

    /// Called after a group render pass.
    fn on_render_pass(&mut self, e: &RenderPassEvent) {
        _ = e;
    }

    /// Called after a named state change has been committed.
    fn on_state_change(&mut self, e: &LayerEvent) {
        _ = e;
    }

    /// Called when damage is flushed to displays.
    fn on_flush(&mut self, e: &FlushEvent) {
        _ = e;
    }

    /// Called when decoding had to replace a persisted identity key.
    fn on_identity_regenerated(&mut self, e: &IdentityRegeneratedEvent<'_>) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`RedrawRequestEvent`].
    #[inline]
    pub fn redraw_requested(&mut self, e: &RedrawRequestEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_redraw_requested(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RenderPassEvent`].
    #[inline]
    pub fn render_pass(&mut self, e: &RenderPassEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_render_pass(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a committed [`LayerEvent`].
    #[inline]
    pub fn state_change(&mut self, e: &LayerEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_state_change(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FlushEvent`].
    #[inline]
    pub fn flush(&mut self, e: &FlushEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_flush(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`IdentityRegeneratedEvent`].
    #[inline]
    pub fn identity_regenerated(&mut self, e: &IdentityRegeneratedEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_identity_regenerated(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerTree;

    fn sample_pass(group: LayerId) -> RenderPassEvent {
        RenderPassEvent {
            group,
            rendered: 2,
            culled: 1,
            purpose: RenderPurpose::Display,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut tree = LayerTree::default();
        let group = tree.create_plain_group();
        let mut sink = NoopSink;
        sink.on_render_pass(&sample_pass(group));
        sink.on_flush(&FlushEvent {
            displays: 0,
            full: true,
            rects: 0,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tree = LayerTree::default();
        let group = tree.create_plain_group();
        let mut tracer = Tracer::none();
        tracer.render_pass(&sample_pass(group));
        tracer.redraw_requested(&RedrawRequestEvent {
            layer: group,
            rect: None,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            culled: Vec<usize>,
        }
        impl TraceSink for RecordingSink {
            fn on_render_pass(&mut self, e: &RenderPassEvent) {
                self.culled.push(e.culled);
            }
        }

        let mut tree = LayerTree::default();
        let group = tree.create_plain_group();
        let mut sink = RecordingSink { culled: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.render_pass(&sample_pass(group));
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.culled, &[1]);
    }
}
