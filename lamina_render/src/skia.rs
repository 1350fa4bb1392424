// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CPU rasterization on `tiny-skia`.

use std::any::Any;

use image::RgbaImage;
use kurbo::{Affine, Rect};
use lamina_core::color::Color;
use lamina_core::surface::Surface;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

use crate::{ExportError, RasterBackend};

/// A [`RasterBackend`] that renders into `tiny-skia` pixmaps.
#[derive(Clone, Copy, Debug, Default)]
pub struct SkiaBackend;

impl RasterBackend for SkiaBackend {
    type Surface = SkiaSurface;

    fn create_surface(
        &self,
        width: u32,
        height: u32,
        transform: Affine,
    ) -> Result<SkiaSurface, ExportError> {
        SkiaSurface::new(width, height, transform)
    }

    fn finish(&self, surface: SkiaSurface) -> Result<RgbaImage, ExportError> {
        Ok(surface.into_image())
    }
}

/// A pixmap plus the transform from drawing coordinates to its pixels.
///
/// Layers reach it through
/// [`RenderCx::surface_as`](lamina_core::layer::RenderCx::surface_as) and
/// draw in drawing coordinates; [`transform`](Self::transform) maps them.
pub struct SkiaSurface {
    pixmap: Pixmap,
    transform: Affine,
}

impl std::fmt::Debug for SkiaSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkiaSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("transform", &self.transform)
            .finish()
    }
}

impl SkiaSurface {
    /// Creates a transparent surface.
    pub fn new(width: u32, height: u32, transform: Affine) -> Result<Self, ExportError> {
        let pixmap = Pixmap::new(width, height).ok_or(ExportError::Allocation { width, height })?;
        Ok(Self { pixmap, transform })
    }

    /// Returns the drawing-to-pixel transform.
    #[must_use]
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Returns the drawing-to-pixel transform in `tiny-skia` form.
    #[must_use]
    pub fn skia_transform(&self) -> Transform {
        to_skia(self.transform)
    }

    /// Returns the pixmap.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Returns the pixmap for direct drawing. Apply
    /// [`skia_transform`](Self::skia_transform) to drawing coordinates.
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Fills `rect`, given in drawing coordinates, with `color`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "tiny-skia paths are f32"
    )]
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let rect = rect.abs();
        let Some(path) = tiny_skia::Rect::from_ltrb(
            rect.x0 as f32,
            rect.y0 as f32,
            rect.x1 as f32,
            rect.y1 as f32,
        )
        .map(PathBuilder::from_rect) else {
            return;
        };
        let [r, g, b, a] = color.to_rgba8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, to_skia(self.transform), None);
    }

    /// Converts the surface into a straight-alpha image.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let mut image = RgbaImage::new(width, height);
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
        }
        image
    }
}

impl Surface for SkiaSurface {
    fn view_scale(&self) -> f64 {
        let [a, b, ..] = self.transform.as_coeffs();
        a.hypot(b)
    }

    fn needs_to_draw(&self, rect: Rect) -> bool {
        let bounds = Rect::new(
            0.0,
            0.0,
            f64::from(self.pixmap.width()),
            f64::from(self.pixmap.height()),
        );
        let mapped = self.transform.transform_rect_bbox(rect.abs());
        mapped.overlaps(bounds)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "tiny-skia works in f32; drawing coordinates fit comfortably"
)]
fn to_skia(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_respects_transform() {
        let mut surface = SkiaSurface::new(8, 8, Affine::scale(2.0)).unwrap();
        surface.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Color::RED);
        let image = surface.into_image();
        assert_eq!(image.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(3, 3).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(5, 5).0, [0, 0, 0, 0]);
    }

    #[test]
    fn translucent_fill_is_straight_alpha() {
        let mut surface = SkiaSurface::new(2, 2, Affine::IDENTITY).unwrap();
        surface.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Color::rgba(0.0, 0.0, 1.0, 0.5));
        let px = surface.into_image().get_pixel(0, 0).0;
        assert!(px[2] >= 254, "blue should survive demultiplication: {px:?}");
        assert!((127..=128).contains(&px[3]), "alpha: {px:?}");
    }

    #[test]
    fn view_scale_and_culling_follow_transform() {
        let surface = SkiaSurface::new(10, 10, Affine::scale(3.0)).unwrap();
        assert!((surface.view_scale() - 3.0).abs() < 1e-12);
        assert!(surface.needs_to_draw(Rect::new(1.0, 1.0, 2.0, 2.0)));
        assert!(!surface.needs_to_draw(Rect::new(4.0, 4.0, 5.0, 5.0)));
    }

    #[test]
    fn zero_sized_surface_fails() {
        assert_eq!(
            SkiaSurface::new(0, 4, Affine::IDENTITY).unwrap_err(),
            ExportError::Allocation {
                width: 0,
                height: 4
            }
        );
    }
}
