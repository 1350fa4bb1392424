// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data-transfer capability declarations.
//!
//! Layers declare which formats they accept for each [`PasteboardOp`]; the
//! transfer mechanics themselves (drag sessions, clipboards) live outside the
//! engine and are seen only through [`TransferSource`] and [`Pasteboard`].

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// A kind of data-transfer interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PasteboardOp {
    /// Receiving a drop.
    DragReceive,
    /// Pasting from the clipboard.
    Paste,
}

/// A data format identifier such as a uniform type identifier.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatId(Cow<'static, str>);

impl FormatId {
    /// Creates a format identifier from a static string.
    #[must_use]
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for FormatId {
    fn from(id: String) -> Self {
        Self(Cow::Owned(id))
    }
}

impl From<&'static str> for FormatId {
    fn from(id: &'static str) -> Self {
        Self::from_static(id)
    }
}

impl fmt::Debug for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FormatId({:?})", self.as_str())
    }
}

/// Well-known format identifiers.
pub mod formats {
    use super::FormatId;

    /// Portable Document Format data.
    pub const PDF: FormatId = FormatId::from_static("com.adobe.pdf");
    /// PNG image data.
    pub const PNG: FormatId = FormatId::from_static("public.png");
    /// TIFF image data.
    pub const TIFF: FormatId = FormatId::from_static("public.tiff");
    /// Plain UTF-8 text.
    pub const UTF8_TEXT: FormatId = FormatId::from_static("public.utf8-plain-text");
    /// A file URL.
    pub const FILE_URL: FormatId = FormatId::from_static("public.file-url");
}

/// Something offering data in one or more formats (a drag session or a
/// clipboard).
pub trait TransferSource {
    /// Returns the formats the source can provide.
    fn available_types(&self) -> &[FormatId];
}

/// A writable clipboard.
pub trait Pasteboard: TransferSource {
    /// Takes ownership of the pasteboard, discarding any existing types, and
    /// announces `types`.
    fn declare_types(&mut self, types: &[FormatId]);

    /// Stores `data` for `format`. Returns `false` if the pasteboard rejects
    /// it.
    fn set_data(&mut self, format: &FormatId, data: Vec<u8>) -> bool;
}

/// Returns `true` if `source` offers at least one of `wanted`.
///
/// An empty `wanted` list never matches.
#[must_use]
pub fn has_available_type(wanted: &[FormatId], source: &dyn TransferSource) -> bool {
    let available = source.available_types();
    wanted.iter().any(|w| available.contains(w))
}
