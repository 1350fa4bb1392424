// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use image::RgbaImage;
use kurbo::Affine;
use lamina_core::surface::Surface;

use crate::ExportError;

/// A rasterizer the [`Exporter`](crate::Exporter) renders through.
///
/// The exporter asks for a surface of a given pixel size with a transform
/// from drawing coordinates to pixels, renders the layer into it, and
/// finishes it into a straight-alpha image.
pub trait RasterBackend {
    /// The surface handed to layers while rendering.
    type Surface: Surface + 'static;

    /// Creates a transparent surface of `width` × `height` pixels.
    fn create_surface(
        &self,
        width: u32,
        height: u32,
        transform: Affine,
    ) -> Result<Self::Surface, ExportError>;

    /// Converts a finished surface into an image.
    fn finish(&self, surface: Self::Surface) -> Result<RgbaImage, ExportError>;
}
