// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-region accumulation and forwarding.
//!
//! [`InvalidationTracker`] collects redraw requests as rectangles in drawing
//! coordinates. Rectangles that touch or overlap are merged into their
//! bounding box, so the recorded region may cover more than was requested but
//! never less. The tracker is flushed to every [`DisplaySurface`] attached to
//! a [`LayerTree`](crate::layer::LayerTree); while no display is attached the
//! region simply stays pending.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Rect, Size};

/// Once more than this many disjoint rectangles are pending they are
/// collapsed into their bounding box.
pub const MAX_DISJOINT_RECTS: usize = 32;

/// A region of the drawing that needs redrawing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// Nothing needs redrawing.
    #[default]
    None,
    /// Everything needs redrawing.
    Full,
    /// Pairwise non-touching rectangles, in drawing coordinates.
    Rects(Vec<Rect>),
}

impl DamageRegion {
    /// Returns `true` if no region needs redrawing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns `true` if `rect` lies entirely inside the region.
    #[must_use]
    pub fn covers(&self, rect: Rect) -> bool {
        let rect = rect.abs();
        match self {
            Self::None => false,
            Self::Full => true,
            Self::Rects(rects) => rects.iter().any(|r| contains_rect(*r, rect)),
        }
    }

    /// Returns the bounding box of the region, or `None` when empty or full.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Rects(rects) => rects.iter().copied().reduce(|a, b| a.union(b)),
            Self::None | Self::Full => None,
        }
    }

    /// Returns the number of rectangles in the region (zero for `None` and
    /// `Full`).
    #[must_use]
    pub fn rect_count(&self) -> usize {
        match self {
            Self::Rects(rects) => rects.len(),
            Self::None | Self::Full => 0,
        }
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&mut *self, other) {
            (Self::Full, _) | (_, Self::None) => {}
            (_, Self::Full) => *self = Self::Full,
            (Self::None, Self::Rects(_)) => *self = other.clone(),
            (Self::Rects(a), Self::Rects(b)) => {
                for rect in b {
                    coalesce_into(a, *rect);
                }
            }
        }
    }
}

/// Receives coalesced invalidations for a drawing it displays.
///
/// Views, windows, and test doubles implement this trait and are attached to
/// a [`LayerTree`](crate::layer::LayerTree) with
/// [`attach_display`](crate::layer::LayerTree::attach_display).
pub trait DisplaySurface {
    /// Marks `region` of the displayed drawing as needing redraw.
    fn invalidate(&mut self, region: &DamageRegion);

    /// Updates the ruler markers to `rect`, or hides them for `None`.
    fn update_ruler_markers(&mut self, rect: Option<Rect>) {
        _ = rect;
    }
}

/// Identifies a display attached to a layer tree.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisplayId(pub u32);

impl fmt::Debug for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayId({})", self.0)
    }
}

/// Accumulates redraw requests until they are flushed.
#[derive(Clone, Debug, Default)]
pub struct InvalidationTracker {
    region: DamageRegion,
}

impl InvalidationTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `rect`.
    pub fn add_rect(&mut self, rect: Rect) {
        let rect = rect.abs();
        match &mut self.region {
            DamageRegion::Full => {}
            DamageRegion::None => self.region = DamageRegion::Rects(vec![rect]),
            DamageRegion::Rects(rects) => coalesce_into(rects, rect),
        }
    }

    /// Records every rect in `rects`, each grown by `padding` on all sides.
    pub fn add_rects(&mut self, rects: impl IntoIterator<Item = Rect>, padding: Size) {
        for rect in rects {
            self.add_rect(rect.abs().inflate(padding.width.abs(), padding.height.abs()));
        }
    }

    /// Marks the whole drawing dirty.
    pub fn mark_full(&mut self) {
        self.region = DamageRegion::Full;
    }

    /// Returns the recorded region.
    #[must_use]
    pub fn region(&self) -> &DamageRegion {
        &self.region
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// Takes the recorded region, leaving the tracker empty.
    pub fn take(&mut self) -> DamageRegion {
        core::mem::take(&mut self.region)
    }
}

fn contains_rect(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
}

fn touches(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Adds `rect` to `rects`, merging it with every rectangle it touches until
/// the list is pairwise disjoint again.
fn coalesce_into(rects: &mut Vec<Rect>, mut rect: Rect) {
    if rects.iter().any(|r| contains_rect(*r, rect)) {
        return;
    }
    while let Some(pos) = rects.iter().position(|r| touches(*r, rect)) {
        rect = rect.union(rects.swap_remove(pos));
    }
    rects.push(rect);
    if rects.len() > MAX_DISJOINT_RECTS {
        let bounds = rects.iter().copied().reduce(|a, b| a.union(b));
        rects.clear();
        rects.extend(bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_rects_coalesce() {
        let mut tracker = InvalidationTracker::new();
        tracker.add_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        tracker.add_rect(Rect::new(5.0, 5.0, 20.0, 20.0));
        tracker.add_rect(Rect::new(100.0, 100.0, 110.0, 110.0));
        assert_eq!(tracker.region().rect_count(), 2);
        assert!(tracker.region().covers(Rect::new(0.0, 0.0, 20.0, 20.0)));
    }

    #[test]
    fn bridging_rect_merges_chain() {
        let mut tracker = InvalidationTracker::new();
        tracker.add_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        tracker.add_rect(Rect::new(20.0, 0.0, 30.0, 10.0));
        tracker.add_rect(Rect::new(8.0, 0.0, 22.0, 10.0));
        assert_eq!(
            tracker.region(),
            &DamageRegion::Rects(vec![Rect::new(0.0, 0.0, 30.0, 10.0)])
        );
    }

    #[test]
    fn padded_region_is_superset() {
        let rects = [
            Rect::new(0.0, 0.0, 4.0, 4.0),
            Rect::new(50.0, 50.0, 60.0, 55.0),
            Rect::new(3.0, 40.0, 9.0, 41.0),
        ];
        let padding = Size::new(2.0, 3.0);
        let mut tracker = InvalidationTracker::new();
        tracker.add_rects(rects, padding);
        for rect in rects {
            let padded = rect.inflate(padding.width, padding.height);
            assert!(tracker.region().covers(padded), "{padded:?} not covered");
        }
    }

    #[test]
    fn too_many_rects_collapse_to_bounds() {
        let mut tracker = InvalidationTracker::new();
        let rects: Vec<Rect> = (0..=MAX_DISJOINT_RECTS)
            .map(|i| {
                let x = i as f64 * 10.0;
                Rect::new(x, 0.0, x + 1.0, 1.0)
            })
            .collect();
        tracker.add_rects(rects.iter().copied(), Size::ZERO);
        assert_eq!(tracker.region().rect_count(), 1);
        for rect in rects {
            assert!(tracker.region().covers(rect));
        }
    }

    #[test]
    fn full_absorbs_rects() {
        let mut tracker = InvalidationTracker::new();
        tracker.mark_full();
        tracker.add_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(tracker.take(), DamageRegion::Full);
        assert!(tracker.is_empty());
    }

    #[test]
    fn merge_prefers_full() {
        let mut region = DamageRegion::Rects(vec![Rect::new(0.0, 0.0, 1.0, 1.0)]);
        region.merge(&DamageRegion::None);
        assert_eq!(region.rect_count(), 1);
        region.merge(&DamageRegion::Full);
        assert_eq!(region, DamageRegion::Full);
    }
}
