// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raster and PDF export of a layer's subtree.
//!
//! Exports render only the requested layer and its descendants, in drawing
//! coordinates, scaled uniformly to the target and centered. Areas the
//! content does not cover stay transparent.

use image::RgbaImage;
use kurbo::{Affine, Size, Vec2};
use lamina_core::layer::{LayerId, LayerTree};
use lamina_core::pasteboard::{Pasteboard, formats};
use lamina_core::surface::RenderPurpose;

use crate::pdf::encode_image_pdf;
use crate::{ExportError, RasterBackend};

/// Points per inch; drawing units are points.
const POINTS_PER_INCH: f64 = 72.0;

/// Export defaults.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportConfig {
    /// Resolution used by [`Exporter::bitmap`] when asked for DPI 0.
    pub default_dpi: u32,
    /// Size used by [`Exporter::thumbnail_default`].
    pub thumbnail_size: Size,
    /// Resolution of the raster embedded in PDF output.
    pub pdf_dpi: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_dpi: 72,
            thumbnail_size: Size::new(128.0, 128.0),
            pdf_dpi: 144,
        }
    }
}

/// Returns the transform that scales `content` uniformly to fit inside
/// `target` and centers it.
#[must_use]
pub fn fit_transform(content: Size, target: Size) -> Affine {
    let scale = (target.width / content.width).min(target.height / content.height);
    let offset = Vec2::new(
        (target.width - content.width * scale) / 2.0,
        (target.height - content.height * scale) / 2.0,
    );
    Affine::translate(offset) * Affine::scale(scale)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "pixel dimensions are rounded up and clamped to u32 first"
)]
fn pixels(length: f64) -> u32 {
    length.ceil().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Renders layers into images and PDF documents through a
/// [`RasterBackend`].
#[derive(Clone, Debug, Default)]
pub struct Exporter<B> {
    backend: B,
    config: ExportConfig,
}

impl<B: RasterBackend> Exporter<B> {
    /// Creates an exporter with the default configuration.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, ExportConfig::default())
    }

    /// Creates an exporter with an explicit configuration.
    pub fn with_config(backend: B, config: ExportConfig) -> Self {
        Self { backend, config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Returns the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Renders a thumbnail of `size` pixels, fitting the drawing inside it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn thumbnail(
        &self,
        tree: &mut LayerTree,
        id: LayerId,
        size: Size,
    ) -> Result<RgbaImage, ExportError> {
        let (width, height) = (pixels(size.width), pixels(size.height));
        if width == 0 || height == 0 {
            return Err(ExportError::ZeroSize);
        }
        let drawing = drawing_size(tree)?;
        let target = Size::new(f64::from(width), f64::from(height));
        self.rasterize(
            tree,
            id,
            width,
            height,
            fit_transform(drawing, target),
            RenderPurpose::Export,
        )
    }

    /// Renders a thumbnail at the configured default size.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn thumbnail_default(
        &self,
        tree: &mut LayerTree,
        id: LayerId,
    ) -> Result<RgbaImage, ExportError> {
        self.thumbnail(tree, id, self.config.thumbnail_size)
    }

    /// Renders the whole drawing at `dpi`. A DPI of 0 means the configured
    /// default.
    ///
    /// The image is the drawing size times `dpi / 72`, rounded up.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn bitmap(
        &self,
        tree: &mut LayerTree,
        id: LayerId,
        dpi: u32,
    ) -> Result<RgbaImage, ExportError> {
        let dpi = if dpi == 0 { self.config.default_dpi } else { dpi };
        self.raster_at_dpi(tree, id, dpi, RenderPurpose::Export)
    }

    /// Renders a single-page PDF at the drawing's size in points.
    ///
    /// Layers that are not printable are left out.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn pdf(&self, tree: &mut LayerTree, id: LayerId) -> Result<Vec<u8>, ExportError> {
        let image = self.raster_at_dpi(tree, id, self.config.pdf_dpi, RenderPurpose::Print)?;
        Ok(encode_image_pdf(&image, tree.drawing_size()))
    }

    /// Declares PDF on `pasteboard` and writes [`pdf`](Self::pdf) output to
    /// it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn write_pdf_to_pasteboard(
        &self,
        tree: &mut LayerTree,
        id: LayerId,
        pasteboard: &mut dyn Pasteboard,
    ) -> Result<(), ExportError> {
        let data = self.pdf(tree, id)?;
        pasteboard.declare_types(&[formats::PDF]);
        if pasteboard.set_data(&formats::PDF, data) {
            Ok(())
        } else {
            Err(ExportError::Pasteboard(formats::PDF.as_str().into()))
        }
    }

    fn raster_at_dpi(
        &self,
        tree: &mut LayerTree,
        id: LayerId,
        dpi: u32,
        purpose: RenderPurpose,
    ) -> Result<RgbaImage, ExportError> {
        let drawing = drawing_size(tree)?;
        let scale = f64::from(dpi) / POINTS_PER_INCH;
        let (width, height) = (pixels(drawing.width * scale), pixels(drawing.height * scale));
        if width == 0 || height == 0 {
            return Err(ExportError::ZeroSize);
        }
        let target = Size::new(f64::from(width), f64::from(height));
        self.rasterize(
            tree,
            id,
            width,
            height,
            fit_transform(drawing, target),
            purpose,
        )
    }

    fn rasterize(
        &self,
        tree: &mut LayerTree,
        id: LayerId,
        width: u32,
        height: u32,
        transform: Affine,
        purpose: RenderPurpose,
    ) -> Result<RgbaImage, ExportError> {
        let mut surface = self.backend.create_surface(width, height, transform)?;
        let area = tree.drawing_bounds();
        tree.render_layer(id, area, Some(&mut surface), purpose);
        self.backend.finish(surface)
    }
}

fn drawing_size(tree: &LayerTree) -> Result<Size, ExportError> {
    let size = tree.drawing_size();
    if size.is_zero_area() || !size.is_finite() {
        Err(ExportError::EmptyDrawing)
    } else {
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;
    use lamina_core::color::Color;
    use lamina_core::layer::{Layer, RenderCx};
    use lamina_core::pasteboard::{FormatId, TransferSource};

    use super::*;
    use crate::{SkiaBackend, SkiaSurface};

    /// Fills the whole area it is given.
    struct Fill(Color);

    impl Layer for Fill {
        fn is_opaque(&self) -> bool {
            true
        }

        fn render(&mut self, cx: &mut RenderCx<'_>) {
            let area = cx.area();
            let color = self.0;
            if let Some(surface) = cx.surface_as::<SkiaSurface>() {
                surface.fill_rect(area, color);
            }
        }
    }

    fn drawing(size: Size) -> (LayerTree, LayerId, LayerId) {
        let mut tree = LayerTree::default();
        tree.set_drawing_size(size);
        let root = tree.create_plain_group();
        tree.set_root_group(root).unwrap();
        let fill = tree.create_layer(Box::new(Fill(Color::RED)));
        tree.add_child(root, fill).unwrap();
        (tree, root, fill)
    }

    #[test]
    fn fit_scales_uniformly_and_centers() {
        let t = fit_transform(Size::new(200.0, 100.0), Size::new(128.0, 128.0));
        assert_eq!(t * Point::new(0.0, 0.0), Point::new(0.0, 32.0));
        assert_eq!(t * Point::new(200.0, 100.0), Point::new(128.0, 96.0));
    }

    #[test]
    fn thumbnail_leaves_letterbox_transparent() {
        let (mut tree, root, _) = drawing(Size::new(200.0, 100.0));
        let exporter = Exporter::new(SkiaBackend);
        let image = exporter.thumbnail_default(&mut tree, root).unwrap();

        assert_eq!(image.dimensions(), (128, 128));
        assert_eq!(image.get_pixel(64, 64).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(64, 10).0[3], 0);
        assert_eq!(image.get_pixel(64, 120).0[3], 0);
    }

    #[test]
    fn bitmap_dpi_zero_means_default() {
        let (mut tree, root, _) = drawing(Size::new(100.5, 50.0));
        let exporter = Exporter::new(SkiaBackend);

        let image = exporter.bitmap(&mut tree, root, 0).unwrap();
        assert_eq!(image.dimensions(), (101, 50));

        let image = exporter.bitmap(&mut tree, root, 144).unwrap();
        assert_eq!(image.dimensions(), (201, 100));

        let sharp = Exporter::with_config(
            SkiaBackend,
            ExportConfig {
                default_dpi: 144,
                ..ExportConfig::default()
            },
        );
        let image = sharp.bitmap(&mut tree, root, 0).unwrap();
        assert_eq!(image.dimensions(), (201, 100));
    }

    #[test]
    fn export_renders_only_the_requested_subtree() {
        let (mut tree, root, fill) = drawing(Size::new(10.0, 10.0));
        let above = tree.create_layer(Box::new(Fill(Color::BLUE)));
        tree.add_child(root, above).unwrap();

        let exporter = Exporter::new(SkiaBackend);
        let image = exporter.bitmap(&mut tree, fill, 72).unwrap();
        assert_eq!(image.get_pixel(5, 5).0, [255, 0, 0, 255]);

        let image = exporter.bitmap(&mut tree, root, 72).unwrap();
        assert_eq!(image.get_pixel(5, 5).0, [0, 0, 255, 255]);
    }

    #[test]
    fn empty_targets_are_errors() {
        let (mut tree, root, _) = drawing(Size::new(10.0, 10.0));
        let exporter = Exporter::new(SkiaBackend);
        assert_eq!(
            exporter.thumbnail(&mut tree, root, Size::new(0.0, 10.0)),
            Err(ExportError::ZeroSize)
        );

        tree.set_drawing_size(Size::ZERO);
        assert_eq!(
            exporter.bitmap(&mut tree, root, 72),
            Err(ExportError::EmptyDrawing)
        );
    }

    #[derive(Default)]
    struct MemoryPasteboard {
        types: Vec<FormatId>,
        data: Option<(FormatId, Vec<u8>)>,
        refuse: bool,
    }

    impl TransferSource for MemoryPasteboard {
        fn available_types(&self) -> &[FormatId] {
            &self.types
        }
    }

    impl Pasteboard for MemoryPasteboard {
        fn declare_types(&mut self, types: &[FormatId]) {
            self.types = types.to_vec();
        }

        fn set_data(&mut self, format: &FormatId, data: Vec<u8>) -> bool {
            if self.refuse {
                return false;
            }
            self.data = Some((format.clone(), data));
            true
        }
    }

    #[test]
    fn pdf_goes_to_the_pasteboard() {
        let (mut tree, root, _) = drawing(Size::new(20.0, 10.0));
        let exporter = Exporter::new(SkiaBackend);
        let mut pasteboard = MemoryPasteboard::default();
        exporter
            .write_pdf_to_pasteboard(&mut tree, root, &mut pasteboard)
            .unwrap();

        assert_eq!(pasteboard.types, [formats::PDF]);
        let (format, data) = pasteboard.data.unwrap();
        assert_eq!(format, formats::PDF);
        assert!(data.starts_with(b"%PDF-"));

        let mut refusing = MemoryPasteboard {
            refuse: true,
            ..MemoryPasteboard::default()
        };
        assert!(matches!(
            exporter.write_pdf_to_pasteboard(&mut tree, root, &mut refusing),
            Err(ExportError::Pasteboard(_))
        ));
    }

    #[test]
    fn pdf_leaves_out_non_printable_layers() {
        let (mut tree, root, fill) = drawing(Size::new(4.0, 4.0));
        tree.set_printable(fill, false);
        let exporter = Exporter::with_config(
            SkiaBackend,
            ExportConfig {
                pdf_dpi: 72,
                ..ExportConfig::default()
            },
        );
        let pdf = exporter.pdf(&mut tree, root).unwrap();
        let alpha_stream = b"/Length 16 >>\nstream\n\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\nendstream";
        assert!(
            pdf.windows(alpha_stream.len()).any(|w| w == alpha_stream),
            "soft mask should be fully transparent"
        );
    }
}
