// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer and modifier input routed to the active layer.

use kurbo::Point;

/// Keyboard modifier state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Shift key.
    pub shift: bool,
    /// Control key.
    pub control: bool,
    /// Alt / option key.
    pub alt: bool,
    /// Command / meta key.
    pub command: bool,
}

/// Stage of a pointer interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Moved with the button held.
    Dragged,
    /// Button released.
    Up,
    /// Moved with no button held.
    Moved,
}

/// A pointer event in drawing coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Stage of the interaction.
    pub phase: PointerPhase,
    /// Location in drawing coordinates (not device pixels).
    pub position: Point,
    /// Number of clicks in quick succession (1 for a single click).
    pub click_count: u32,
    /// Modifier state at the time of the event.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Creates a single-click event with no modifiers.
    #[must_use]
    pub fn new(phase: PointerPhase, position: Point) -> Self {
        Self {
            phase,
            position,
            click_count: 1,
            modifiers: Modifiers::default(),
        }
    }
}
