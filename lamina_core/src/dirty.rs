// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Layer mutations are recorded per channel in an
//! [`understory_dirty`] tracker so that presenters can pick up what changed
//! since the last [`LayerTree::evaluate`](crate::layer::LayerTree::evaluate).
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`VISIBILITY`] and [`LOCK`] use
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) with dependency edges from
//!   child to group. Effective visibility and lockedness are inherited, so
//!   marking a group marks its whole subtree.
//!
//! - **Local-only**: [`APPEARANCE`] (name, selection color, alpha, knobs,
//!   print and clip flags) and [`CONTENT`] (reported by concrete layer kinds)
//!   only mark the layer itself.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on the group whose child list
//!   changed and on created or destroyed layers. It triggers a traversal-order
//!   rebuild.

use understory_dirty::Channel;

/// Visible flag changed here or on an ancestor.
pub const VISIBILITY: Channel = Channel::new(0);

/// Locked flag changed here or on an ancestor.
pub const LOCK: Channel = Channel::new(1);

/// A presentational property of the layer itself changed.
pub const APPEARANCE: Channel = Channel::new(2);

/// Drawable content owned by the layer changed.
pub const CONTENT: Channel = Channel::new(3);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(4);
