// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace pretty-printing and tree snapshots for lamina diagnostics.
//!
//! - [`pretty::PrettyPrintSink`]: a [`TraceSink`](lamina_core::trace::TraceSink)
//!   writing one human-readable line per event.
//! - [`snapshot`]: JSON and indented-text dumps of a
//!   [`LayerTree`](lamina_core::layer::LayerTree) for bug reports and test
//!   failure output.

pub mod pretty;
pub mod snapshot;
