// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plans, raster export, and PDF output for lamina layer trees.
//!
//! This crate sits between [`lamina_core`]'s layer tree and concrete pixel
//! output. It defines:
//!
//! - [`RenderItem`] / [`RenderPlan`]: the ordered set of layers a render
//!   pass would invoke, after occlusion culling
//! - [`RasterBackend`]: the seam between the exporter and a rasterizer
//! - [`SkiaBackend`] / [`SkiaSurface`]: a CPU backend on `tiny-skia`
//! - [`Exporter`]: thumbnails, bitmaps at a DPI, and single-page PDFs
//! - [`ExportError`]: what can go wrong while exporting
//!
//! Layers draw into a [`SkiaSurface`] by downcasting the surface handed to
//! them in [`RenderCx`](lamina_core::layer::RenderCx):
//!
//! ```
//! use lamina_core::color::Color;
//! use lamina_core::layer::{Layer, RenderCx};
//! use lamina_render::SkiaSurface;
//!
//! struct Backdrop;
//!
//! impl Layer for Backdrop {
//!     fn render(&mut self, cx: &mut RenderCx<'_>) {
//!         let area = cx.area();
//!         if let Some(surface) = cx.surface_as::<SkiaSurface>() {
//!             surface.fill_rect(area, Color::BLUE);
//!         }
//!     }
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

mod backend;
mod error;
mod export;
mod pdf;
mod plan;
mod skia;

pub use backend::RasterBackend;
pub use error::ExportError;
pub use export::{ExportConfig, Exporter, fit_transform};
pub use pdf::encode_image_pdf;
pub use plan::{RenderItem, RenderPlan};
pub use skia::{SkiaBackend, SkiaSurface};
