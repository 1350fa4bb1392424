// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for tree mutation and decoding.
//!
//! Queries never fail: absence is reported as `false`, `None`, or an empty
//! list. Using a destroyed [`LayerId`] panics, as with any arena handle.

use alloc::string::String;

use thiserror::Error;

use crate::layer::LayerId;

/// Structural misuse of the layer tree.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// The target of a child operation is not a group.
    #[error("layer {0:?} is not a group")]
    NotAGroup(LayerId),
    /// The child would become its own ancestor.
    #[error("adding {child:?} to {group:?} would create a cycle")]
    Cycle {
        /// The receiving group.
        group: LayerId,
        /// The layer being added.
        child: LayerId,
    },
    /// The layer already belongs to a group.
    #[error("layer {0:?} already has a parent")]
    AlreadyParented(LayerId),
    /// The layer is the root group and cannot join another group.
    #[error("layer {0:?} is the root group")]
    IsRoot(LayerId),
    /// The layer is not in any group.
    #[error("layer {0:?} has no parent")]
    Detached(LayerId),
    /// A child index is past the end of the group.
    #[error("index {index} out of range for a group of {len} children")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of children in the group.
        len: usize,
    },
}

/// A persisted layer record could not be turned into a layer.
///
/// When decoding fails no layer is left in the tree.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DecodeError {
    /// The input is not a well-formed record.
    #[error("malformed layer record: {0}")]
    Malformed(String),
    /// The record was written by a newer schema.
    #[error("unsupported schema version {found} (newest supported is {supported})")]
    UnsupportedVersion {
        /// Version found in the record.
        found: u32,
        /// Newest version this build understands.
        supported: u32,
    },
    /// `alpha` is not within `[0, 1]`.
    #[error("alpha {0} is outside [0, 1]")]
    AlphaOutOfRange(f64),
    /// A selection color component is out of range.
    #[error("selection color components must be within [0, 1]")]
    InvalidColor,
    /// No factory knows how to build this kind.
    #[error("unknown layer kind {0:?}")]
    UnknownKind(String),
    /// A record that is not a group lists children.
    #[error("layer of kind {0:?} is not a group but has children")]
    ChildrenOnLeaf(String),
    /// The factory rejected the record payload.
    #[error("factory failed for kind {kind:?}: {message}")]
    Factory {
        /// The kind being built.
        kind: String,
        /// What went wrong.
        message: String,
    },
}
