// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process-scoped layer configuration.
//!
//! [`LayerContext`] gathers the state that the framework shares between all
//! documents of a process: the [`IdentityRegistry`], the
//! [`SelectionPalette`], and the default [`Knobs`]. It is passed explicitly
//! (as an `Rc`) to every [`LayerTree`](crate::layer::LayerTree) that should
//! share it, instead of living in a global.
//!
//! The layer model is single-threaded, so the context uses `RefCell` for
//! interior mutability and is neither `Send` nor `Sync`.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Ref, RefCell};

use crate::color::Color;
use crate::identity::IdentityRegistry;
use crate::knobs::Knobs;
use crate::palette::SelectionPalette;

/// Shared configuration consulted when layers are created or decoded.
#[derive(Debug, Default)]
pub struct LayerContext {
    identity: RefCell<IdentityRegistry>,
    palette: RefCell<SelectionPalette>,
    default_knobs: RefCell<Rc<Knobs>>,
}

impl LayerContext {
    /// Creates a context with the built-in palette and default knobs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, independent context behind an `Rc`, ready to be handed
    /// to several trees.
    ///
    /// Trees built on separate contexts never mint the same identity key, but
    /// each context rotates its own selection palette.
    #[must_use]
    pub fn new_shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Creates a context whose palette uses `colors`.
    #[must_use]
    pub fn with_palette(colors: Vec<Color>) -> Self {
        let cx = Self::new();
        cx.set_palette(colors);
        cx
    }

    // -- Identity --

    /// Borrows the identity registry.
    ///
    /// # Panics
    ///
    /// Panics if the registry is currently borrowed mutably.
    #[must_use]
    pub fn identity(&self) -> Ref<'_, IdentityRegistry> {
        self.identity.borrow()
    }

    /// Mints a new identity key.
    pub fn mint_key(&self) -> String {
        self.identity.borrow_mut().new_key()
    }

    /// Reserves a preserved key. Returns `false` if it is already held.
    pub fn claim_key(&self, key: &str) -> bool {
        self.identity.borrow_mut().claim(key)
    }

    /// Releases a key held by a destroyed layer.
    pub fn release_key(&self, key: &str) -> bool {
        self.identity.borrow_mut().release(key)
    }

    // -- Selection palette --

    /// Borrows the selection palette.
    ///
    /// # Panics
    ///
    /// Panics if the palette is currently borrowed mutably.
    #[must_use]
    pub fn palette(&self) -> Ref<'_, SelectionPalette> {
        self.palette.borrow()
    }

    /// Replaces the palette colors. An empty list restores the built-in set.
    pub fn set_palette(&self, colors: Vec<Color>) {
        self.palette.borrow_mut().set_colors(colors);
    }

    /// Hands out the next selection color in rotation.
    pub fn next_selection_color(&self) -> Color {
        self.palette.borrow_mut().next_color()
    }

    // -- Knobs --

    /// Returns the framework-default knobs.
    #[must_use]
    pub fn default_knobs(&self) -> Rc<Knobs> {
        Rc::clone(&self.default_knobs.borrow())
    }

    /// Replaces the framework-default knobs.
    pub fn set_default_knobs(&self, knobs: Rc<Knobs>) {
        *self.default_knobs.borrow_mut() = knobs;
    }

    /// Restores the built-in palette, rewinds the color counter, and restores
    /// the default knobs.
    ///
    /// Identity keys held by live layers stay reserved.
    pub fn reset(&self) {
        self.palette.borrow_mut().reset();
        *self.default_knobs.borrow_mut() = Rc::new(Knobs::default());
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::palette::DEFAULT_SELECTION_COLORS;

    #[test]
    fn reset_restores_palette_but_not_keys() {
        let cx = LayerContext::with_palette(vec![Color::ORANGE]);
        let key = cx.mint_key();
        assert_eq!(cx.next_selection_color(), Color::ORANGE);
        cx.reset();
        assert_eq!(cx.palette().colors(), &DEFAULT_SELECTION_COLORS);
        assert_eq!(cx.palette().assigned(), 0);
        assert!(cx.identity().is_live(&key));
    }

    #[test]
    fn default_knobs_are_replaceable() {
        let cx = LayerContext::new();
        let custom = Rc::new(Knobs::new(10.0, crate::knobs::KnobShape::Diamond));
        cx.set_default_knobs(Rc::clone(&custom));
        assert!(Rc::ptr_eq(&cx.default_knobs(), &custom));
        cx.reset();
        assert!(!Rc::ptr_eq(&cx.default_knobs(), &custom));
    }
}
