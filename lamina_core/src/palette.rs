// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rotating selection-color assignment.
//!
//! Each new layer that is not given an explicit selection color receives the
//! next entry of the palette, wrapping around at the end. The assignment
//! counter only ever grows; replacing the palette keeps the counter so that
//! rotation continues from where it was.

use alloc::vec::Vec;

use crate::color::Color;

/// The built-in palette used until a custom one is installed.
pub const DEFAULT_SELECTION_COLORS: [Color; 6] = [
    Color::RED,
    Color::BLUE,
    Color::GREEN,
    Color::CYAN,
    Color::MAGENTA,
    Color::ORANGE,
];

/// An ordered list of selection colors plus a monotonically increasing
/// assignment counter.
#[derive(Clone, Debug)]
pub struct SelectionPalette {
    colors: Vec<Color>,
    assigned: usize,
}

impl Default for SelectionPalette {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionPalette {
    /// Creates a palette with [`DEFAULT_SELECTION_COLORS`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            colors: DEFAULT_SELECTION_COLORS.to_vec(),
            assigned: 0,
        }
    }

    /// Creates a palette with the given colors.
    ///
    /// An empty list falls back to [`DEFAULT_SELECTION_COLORS`].
    #[must_use]
    pub fn with_colors(colors: Vec<Color>) -> Self {
        let mut palette = Self::new();
        palette.set_colors(colors);
        palette
    }

    /// Returns the current colors in assignment order.
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Replaces the palette. An empty list restores the built-in colors.
    ///
    /// The assignment counter is left untouched.
    pub fn set_colors(&mut self, colors: Vec<Color>) {
        self.colors = if colors.is_empty() {
            DEFAULT_SELECTION_COLORS.to_vec()
        } else {
            colors
        };
    }

    /// Returns the color at `index`, wrapping around the palette length.
    #[must_use]
    pub fn color_for_index(&self, index: usize) -> Color {
        self.colors[index % self.colors.len()]
    }

    /// Returns the next color in rotation and advances the counter.
    pub fn next_color(&mut self) -> Color {
        let color = self.color_for_index(self.assigned);
        self.assigned += 1;
        color
    }

    /// Returns how many colors have been handed out.
    #[must_use]
    pub fn assigned(&self) -> usize {
        self.assigned
    }

    /// Restores the built-in colors and rewinds the counter to zero.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn rotation_wraps_at_palette_length() {
        let mut palette = SelectionPalette::with_colors(vec![Color::RED, Color::BLUE, Color::GREEN]);
        let handed_out: Vec<Color> = (0..7).map(|_| palette.next_color()).collect();
        for (i, color) in handed_out.iter().enumerate() {
            assert_eq!(*color, palette.colors()[i % 3], "index {i}");
        }
        assert_eq!(handed_out[0], handed_out[3], "node L matches node 0");
        assert_eq!(palette.assigned(), 7);
    }

    #[test]
    fn empty_palette_restores_defaults() {
        let mut palette = SelectionPalette::with_colors(vec![Color::ORANGE]);
        assert_eq!(palette.colors(), &[Color::ORANGE]);
        palette.set_colors(Vec::new());
        assert_eq!(palette.colors(), &DEFAULT_SELECTION_COLORS);
    }

    #[test]
    fn replacing_colors_keeps_counter() {
        let mut palette = SelectionPalette::new();
        let _ = palette.next_color();
        let _ = palette.next_color();
        palette.set_colors(vec![Color::RED, Color::BLUE, Color::GREEN]);
        assert_eq!(palette.next_color(), Color::GREEN);
    }

    #[test]
    fn reset_rewinds_counter() {
        let mut palette = SelectionPalette::with_colors(vec![Color::CYAN, Color::MAGENTA]);
        let _ = palette.next_color();
        palette.reset();
        assert_eq!(palette.assigned(), 0);
        assert_eq!(palette.next_color(), DEFAULT_SELECTION_COLORS[0]);
    }
}
