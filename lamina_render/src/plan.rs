// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plan: the ordered layers one render pass invokes.

use kurbo::Rect;
use lamina_core::layer::{LayerId, LayerTree};
use lamina_core::surface::RenderPurpose;

/// A single layer invocation in the render plan.
///
/// Items are produced bottom to top, groups before their children.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderItem {
    /// The layer to draw.
    pub layer: LayerId,
    /// Nesting depth below the root group (the root is 0).
    pub depth: usize,
    /// Whether the layer is a group.
    pub group: bool,
    /// The layer's own alpha.
    pub alpha: f64,
}

/// The layers a render pass over `area` would invoke, with occluded and
/// hidden layers already removed.
///
/// Presenters use a plan to mirror a pass elsewhere; diagnostics use it to
/// see what culling did.
#[derive(Clone, Debug, Default)]
pub struct RenderPlan {
    /// The area being rendered.
    pub area: Rect,
    /// What the pass is for.
    pub purpose: RenderPurpose,
    /// Layers in drawing order.
    pub items: Vec<RenderItem>,
}

impl RenderPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new(area: Rect, purpose: RenderPurpose) -> Self {
        Self {
            area,
            purpose,
            items: Vec::new(),
        }
    }

    /// Plans a display pass of the root group. Empty if no root is set.
    #[must_use]
    pub fn build(tree: &LayerTree, area: Rect) -> Self {
        let mut plan = Self::new(area, RenderPurpose::Display);
        if let Some(root) = tree.root_group() {
            plan.extend(tree, root);
        }
        plan
    }

    /// Plans a pass of one layer's subtree.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn build_layer(tree: &LayerTree, id: LayerId, area: Rect, purpose: RenderPurpose) -> Self {
        let mut plan = Self::new(area, purpose);
        plan.extend(tree, id);
        plan
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns whether the plan draws `id`.
    #[must_use]
    pub fn contains(&self, id: LayerId) -> bool {
        self.items.iter().any(|item| item.layer == id)
    }

    fn extend(&mut self, tree: &LayerTree, top: LayerId) {
        let base = tree.level(top);
        self.items.extend(
            tree.render_order(top, self.purpose)
                .into_iter()
                .map(|layer| RenderItem {
                    layer,
                    depth: tree.level(layer) - base,
                    group: tree.is_group(layer),
                    alpha: tree.state(layer).alpha(),
                }),
        );
    }
}
