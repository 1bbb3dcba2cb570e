//! Input model: pointer buttons, wheel deltas, and the drag gesture states.
//!
//! `DragState` is the gesture tracked between pointer-down and pointer-up.
//! Each active variant carries the context needed to compute the next
//! position without reading back from the host.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::model::CardId;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down, zooms out).
    pub dy: f64,
}

/// Gesture state for the drag controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Pressed on empty canvas; not yet past the drag threshold.
    PanCandidate {
        /// Screen position of the press.
        press: Point,
        /// Scroll offsets at the press.
        scroll_at_press: Point,
    },
    /// Dragging the canvas.
    Panning { press: Point, scroll_at_press: Point },
    /// Dragging a card.
    ShapeDrag {
        id: CardId,
        /// Pointer world position minus the card center at the press.
        grab_offset: Point,
    },
}

impl DragState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn is_pan(&self) -> bool {
        matches!(self, Self::PanCandidate { .. } | Self::Panning { .. })
    }

    /// The card being dragged, if any.
    #[must_use]
    pub fn dragged_card(&self) -> Option<&str> {
        match self {
            Self::ShapeDrag { id, .. } => Some(id),
            _ => None,
        }
    }
}
