// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colors used for selection highlights and knobs.

use serde::{Deserialize, Serialize};

/// A straight-alpha RGBA color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
    /// Alpha component.
    pub a: f32,
}

impl Color {
    /// Opaque red.
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0.0, 0.8, 0.0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    /// Opaque cyan.
    pub const CYAN: Self = Self::rgb(0.0, 1.0, 1.0);
    /// Opaque magenta.
    pub const MAGENTA: Self = Self::rgb(1.0, 0.0, 1.0);
    /// Opaque orange.
    pub const ORANGE: Self = Self::rgb(1.0, 0.5, 0.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    /// Creates an opaque color.
    #[inline]
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Creates a color with an explicit alpha.
    #[inline]
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns `true` if every component is finite and within `0.0..=1.0`.
    #[must_use]
    pub fn is_valid(self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }

    /// Returns the color with its alpha replaced.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Converts to 8-bit straight-alpha components, clamping out-of-range
    /// values.
    #[must_use]
    pub fn to_rgba8(self) -> [u8; 4] {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "value is clamped to 0..=255 before the cast"
        )]
        fn channel(c: f32) -> u8 {
            (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
        }
        [channel(self.r), channel(self.g), channel(self.b), channel(self.a)]
    }
}
