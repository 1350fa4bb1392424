// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render targets handed to layers while drawing.
//!
//! The engine does not define drawing primitives. A [`Surface`] is whatever
//! the backend draws into (a view, a pixmap, a printer page); layer kinds that
//! know the backend downcast it with [`Surface::as_any_mut`].

use core::any::Any;

use kurbo::Rect;

/// Why a render pass is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderPurpose {
    /// Drawing to an on-screen view.
    #[default]
    Display,
    /// Drawing for print or PDF output. Non-printable layers are skipped.
    Print,
    /// Drawing an isolated export (thumbnail or bitmap).
    Export,
}

/// A backend render target.
pub trait Surface {
    /// Returns the ratio of device pixels to drawing units.
    fn view_scale(&self) -> f64 {
        1.0
    }

    /// Returns `false` if `rect` is known to be clipped away, letting layers
    /// skip work.
    fn needs_to_draw(&self, rect: Rect) -> bool {
        _ = rect;
        true
    }

    /// Returns `self` for downcasting to the concrete backend type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
