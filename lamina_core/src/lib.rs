// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer hierarchy engine for retained-mode vector drawings.
//!
//! `lamina_core` owns the scene graph of a drawing: an arena of *layers*
//! addressed by generational [`LayerId`](layer::LayerId) handles, where
//! *groups* own an ordered list of children and every child refers back to
//! its group by index only. It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   LayerContext (identity keys, selection palette, default knobs)
//!       │  consulted when layers are created or decoded
//!       ▼
//!   LayerTree ──► render(area) ──► root group ──► occlusion scan ──► Layer::render
//!       │
//!       ├── setters ──► LayerEvent observers (after commit)
//!       │           └─► InvalidationTracker ──► DisplaySurface::invalidate
//!       │
//!       └── evaluate() ──► TreeChanges (effective hidden / locked transitions)
//! ```
//!
//! **[`layer`]**: The arena ([`LayerTree`](layer::LayerTree)), per-layer
//! state, the [`Layer`](layer::Layer) capability trait, group contract,
//! rendering, hit testing, and change evaluation.
//!
//! **[`invalidate`]**: Dirty-region accumulation and coalescing.
//!
//! **[`context`]**: The process-scoped [`LayerContext`](context::LayerContext)
//! combining [`identity`] and [`palette`], shared between documents.
//!
//! **[`persist`]**: Versioned layer records and decoding through a
//! [`LayerFactory`](persist::LayerFactory).
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) instrumentation hooks.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod color;
pub mod context;
pub mod dirty;
pub mod error;
pub mod event;
pub mod identity;
pub mod input;
pub mod invalidate;
pub mod knobs;
pub mod layer;
pub mod palette;
pub mod pasteboard;
pub mod persist;
pub mod style;
pub mod surface;
pub mod trace;

pub use kurbo;
