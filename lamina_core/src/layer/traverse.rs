// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use core::slice;

use super::id::{INVALID, LayerId};
use super::tree::LayerTree;

/// An iterator over the direct children of a group, bottom to top.
///
/// Created by [`LayerTree::children`]. Use `.rev()` to walk top-down.
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a LayerTree,
    iter: slice::Iter<'a, u32>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a LayerTree, children: &'a [u32]) -> Self {
        Self {
            tree,
            iter: children.iter(),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = LayerId;

    fn next(&mut self) -> Option<LayerId> {
        self.iter.next().map(|&idx| self.tree.id_at(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<LayerId> {
        self.iter.next_back().map(|&idx| self.tree.id_at(idx))
    }
}

impl ExactSizeIterator for Children<'_> {}

/// An iterator over the enclosing groups of a layer, innermost first.
///
/// Created by [`LayerTree::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a LayerTree,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(tree: &'a LayerTree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = LayerId;

    fn next(&mut self) -> Option<LayerId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.parent[idx as usize];
        Some(self.tree.id_at(idx))
    }
}
