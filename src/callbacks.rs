//! Observer hooks.
//!
//! Every hook has a no-op default so hosts implement only what they need.
//! The two veto hooks return `Option<bool>`: `None` means the host has no
//! opinion (allow), `Some(true)` allows and `Some(false)` vetoes.

use serde::Serialize;

use crate::camera::Point;
use crate::model::CardId;
use crate::zorder::CardOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionState {
    Selected,
    Cleared,
}

/// What caused a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionSource {
    /// A press on a card or on empty canvas.
    Pointer,
    /// `Board::select` / `Board::clear_selection`.
    Api,
    /// The selected card was removed.
    Removal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionMeta {
    pub source: SelectionSource,
    /// The selection before this change.
    pub previous: Option<CardId>,
}

pub trait BoardCallbacks {
    /// A card drag is about to start. `Some(false)` cancels it.
    fn on_drag_start(&mut self, _id: &str, _center: Point) -> Option<bool> {
        None
    }

    fn on_drag(&mut self, _id: &str, _center: Point) {}

    /// The drag was committed at `center`.
    fn on_drag_end(&mut self, _id: &str, _center: Point) {}

    /// The full ordering, emitted only when it changed.
    fn on_z_order_change(&mut self, _order: &[CardOrder]) {}

    /// For `Cleared`, `id` is the card that was deselected.
    fn on_selection_change(&mut self, _state: SelectionState, _id: &str, _meta: &SelectionMeta) {}

    /// A card is about to be deleted. `Some(false)` keeps it.
    fn on_delete(&mut self, _id: &str) -> Option<bool> {
        None
    }

    fn on_deleted(&mut self, _id: &str) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallbacks;

impl BoardCallbacks for NoopCallbacks {}
