// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named layer events and observer registration.
//!
//! Events are emitted synchronously by the [`LayerTree`](crate::layer::LayerTree)
//! setters, after the new value has been stored and before the setter
//! returns. Observers receive only the event, so they cannot re-enter the
//! tree while it is being mutated.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::layer::LayerId;

/// Which state of a layer changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerEventKind {
    /// The locked flag changed.
    LockStateChanged,
    /// The visible flag changed.
    VisibleStateChanged,
    /// The name changed.
    NameChanged,
    /// The selection color changed.
    SelectionColorChanged,
}

/// A state change notification with the affected layer as subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerEvent {
    /// What changed.
    pub kind: LayerEventKind,
    /// The layer whose state changed.
    pub layer: LayerId,
}

/// Which events an observer receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObserverScope {
    /// Every event of the tree. Lives as long as the tree.
    Tree,
    /// Only events whose subject is this layer. Dropped when the layer is
    /// destroyed.
    Layer(LayerId),
}

/// Handle returned by [`LayerTree::observe`](crate::layer::LayerTree::observe).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(u64);

impl fmt::Debug for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObserverId({})", self.0)
    }
}

type Callback = Box<dyn FnMut(&LayerEvent)>;

struct Entry {
    id: ObserverId,
    scope: ObserverScope,
    callback: Callback,
}

/// Registered observers in registration order.
#[derive(Default)]
pub(crate) struct Observers {
    next: u64,
    entries: Vec<Entry>,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("next", &self.next)
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl Observers {
    pub(crate) fn add(&mut self, scope: ObserverScope, callback: Callback) -> ObserverId {
        let id = ObserverId(self.next);
        self.next += 1;
        self.entries.push(Entry {
            id,
            scope,
            callback,
        });
        id
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Drops every observer scoped to `layer`.
    pub(crate) fn remove_layer(&mut self, layer: LayerId) {
        self.entries.retain(|e| e.scope != ObserverScope::Layer(layer));
    }

    pub(crate) fn emit(&mut self, event: &LayerEvent) {
        for entry in &mut self.entries {
            let wants = match entry.scope {
                ObserverScope::Tree => true,
                ObserverScope::Layer(layer) => layer == event.layer,
            };
            if wants {
                (entry.callback)(event);
            }
        }
    }
}
