// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style references used during document-load reconciliation.
//!
//! Styles are owned by the document; layers only refer to them by key. When a
//! document is loaded its styles are reconciled with the registry by handing
//! every layer a [`StyleSet`] through
//! [`LayerTree::replace_matching_styles`](crate::layer::LayerTree::replace_matching_styles).

use alloc::collections::btree_map::{self, BTreeMap};
use alloc::string::String;

/// The registry key of a style.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleKey(pub String);

/// An opaque handle to a registered style object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleId(pub u64);

/// Styles indexed by key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleSet {
    styles: BTreeMap<StyleKey, StyleId>,
}

impl StyleSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a style, returning the handle previously stored under `key`.
    pub fn insert(&mut self, key: StyleKey, id: StyleId) -> Option<StyleId> {
        self.styles.insert(key, id)
    }

    /// Returns the style registered under `key`.
    #[must_use]
    pub fn get(&self, key: &StyleKey) -> Option<StyleId> {
        self.styles.get(key).copied()
    }

    /// Returns the number of styles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Returns `true` if the set holds no styles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Iterates over `(key, id)` pairs in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, StyleKey, StyleId> {
        self.styles.iter()
    }
}

impl FromIterator<(StyleKey, StyleId)> for StyleSet {
    fn from_iter<I: IntoIterator<Item = (StyleKey, StyleId)>>(iter: I) -> Self {
        Self {
            styles: iter.into_iter().collect(),
        }
    }
}
