// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors produced while exporting a layer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    /// The requested image or page has no area.
    #[error("export target has zero size")]
    ZeroSize,
    /// The drawing has no size, so there is nothing to fit.
    #[error("drawing size is empty")]
    EmptyDrawing,
    /// The backend could not allocate a surface.
    #[error("could not allocate a {width}x{height} surface")]
    Allocation {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// The pasteboard refused the data.
    #[error("pasteboard rejected {0} data")]
    Pasteboard(String),
}
