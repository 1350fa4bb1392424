// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer tree data model.
//!
//! A *layer* is a node in the drawing's hierarchy. Each layer has:
//!
//! - An identity ([`LayerId`]): a generational handle that becomes stale when
//!   the layer is destroyed, preventing use-after-free bugs at the API level.
//!   Separately, every layer carries a persistent *identity key* string that
//!   survives encoding and decoding.
//! - Topology: groups own an ordered child list (index = z-order, bottom to
//!   top); every child refers back to its group by index only.
//! - **Common state** ([`LayerState`]) set through the tree:
//!   [`visible`](LayerTree::set_visible), [`locked`](LayerTree::set_locked),
//!   [`name`](LayerTree::set_name), [`alpha`](LayerTree::set_alpha),
//!   selection color, knobs, and user info.
//! - **Behavior**: a boxed [`Layer`] trait object supplied by the concrete
//!   layer kind. Every hook has a default, so kinds override only what they
//!   need.
//!
//! Layers are stored in struct-of-arrays layout with index-based handles.
//!
//! # Effective state
//!
//! A layer is *effectively* hidden if it or any enclosing group is hidden,
//! and effectively locked likewise. Hidden layers are skipped by rendering
//! and hit testing; locked layers still render but receive no pointer input.
//!
//! # Dirty tracking
//!
//! Property mutations mark the corresponding dirty channel (see
//! [`dirty`](crate::dirty)). [`LayerTree::evaluate`] drains the channels into
//! [`TreeChanges`] for presenters that mirror the tree elsewhere.

mod behavior;
mod evaluate;
mod hit;
mod id;
mod props;
mod redraw;
mod render;
mod state;
mod traverse;
mod tree;

pub use behavior::{GroupLayer, Layer, PlainLayer, RenderCx};
pub use evaluate::TreeChanges;
pub use id::{ContentRef, INVALID, LayerId};
pub use state::LayerState;
pub use traverse::{Ancestors, Children};
pub use tree::LayerTree;
