// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection-handle ("knob") descriptions.
//!
//! A layer may carry its own [`Knobs`]; otherwise it inherits those of its
//! enclosing group, and ultimately the framework default held by the
//! [`LayerContext`](crate::context::LayerContext). See
//! [`LayerTree::resolved_knobs`](crate::layer::LayerTree::resolved_knobs).

use crate::color::Color;

/// Shape drawn for each selection handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum KnobShape {
    /// Axis-aligned square.
    #[default]
    Square,
    /// Circle.
    Circle,
    /// Square rotated by 45 degrees.
    Diamond,
}

/// Describes how selection handles are drawn for objects in a layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Knobs {
    /// Handle edge length in drawing units at a view scale of 1.
    pub handle_size: f64,
    /// Handle shape.
    pub shape: KnobShape,
    /// Fill color; `None` uses the layer's selection color.
    pub fill: Option<Color>,
}

impl Default for Knobs {
    fn default() -> Self {
        Self {
            handle_size: Self::DEFAULT_HANDLE_SIZE,
            shape: KnobShape::Square,
            fill: None,
        }
    }
}

impl Knobs {
    /// Handle size used by [`Knobs::default`].
    pub const DEFAULT_HANDLE_SIZE: f64 = 6.0;

    /// Creates knobs with the given size and shape.
    #[must_use]
    pub const fn new(handle_size: f64, shape: KnobShape) -> Self {
        Self {
            handle_size,
            shape,
            fill: None,
        }
    }

    /// Returns the handle size to draw in drawing units at `view_scale`.
    ///
    /// When `adjust_to_scale` is set the size is divided by the view scale so
    /// handles keep a constant on-screen size.
    #[must_use]
    pub fn handle_size_at_scale(&self, view_scale: f64, adjust_to_scale: bool) -> f64 {
        if adjust_to_scale && view_scale > 0.0 {
            self.handle_size / view_scale
        } else {
            self.handle_size
        }
    }
}
