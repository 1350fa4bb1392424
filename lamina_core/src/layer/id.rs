// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer and content identity types.

use core::fmt;

/// Slot value meaning "none" in the tree's parent and root fields.
pub const INVALID: u32 = u32::MAX;

/// Names one layer of a [`LayerTree`](super::LayerTree).
///
/// A handle is a slot number plus the slot's generation at the time the layer
/// was created. [`destroy_layer`](super::LayerTree::destroy_layer) frees the
/// whole subtree at once and every freed slot moves to its next generation,
/// so handles to the destroyed layer and to all of its descendants go stale
/// together. A later layer may reuse the slot, but its handle never compares
/// equal to an old one, and the tree panics when given a stale handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl LayerId {
    /// Returns the slot number. Only meaningful together with
    /// [`generation`](Self::generation).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the slot's generation when this layer was created.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({}@{})", self.idx, self.generation)
    }
}

/// A borrowed reference to a drawable object found by hit testing.
///
/// The object itself belongs to the layer kind that reported it; the engine
/// only passes the reference along and never keeps it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentRef(pub u64);

impl fmt::Debug for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentRef({})", self.0)
    }
}
