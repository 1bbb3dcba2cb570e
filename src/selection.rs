#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::callbacks::{BoardCallbacks, SelectionMeta, SelectionSource, SelectionState};
use crate::model::CardId;
use crate::registry::{Scene, ShapeRegistry};

/// Single-card selection state. [`select_card`] and [`clear_selection`] add
/// the highlight and the notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<CardId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// Select `id`. Returns the previous selection when it changed, or
    /// `None` when `id` was already selected.
    pub fn select(&mut self, id: &str) -> Option<Option<CardId>> {
        if self.is_selected(id) {
            return None;
        }
        Some(self.selected.replace(id.to_owned()))
    }

    /// Clear and return the previous selection.
    pub fn clear(&mut self) -> Option<CardId> {
        self.selected.take()
    }

    /// Clear the selection if `exists` says the card is gone.
    pub fn drop_if_missing(&mut self, exists: impl Fn(&str) -> bool) -> Option<CardId> {
        match self.selected.as_deref() {
            Some(id) if !exists(id) => self.selected.take(),
            _ => None,
        }
    }
}

/// Select a live card, move the highlight to it, and notify.
///
/// Returns `false` for unknown ids and for the card that is already selected.
pub fn select_card(
    selection: &mut Selection,
    registry: &mut ShapeRegistry,
    scene: &mut Scene<'_>,
    callbacks: &mut dyn BoardCallbacks,
    id: &str,
    source: SelectionSource,
) -> bool {
    if !registry.contains(id) {
        return false;
    }
    let Some(previous) = selection.select(id) else {
        return false;
    };
    registry.set_highlight(scene, Some(id));
    callbacks.on_selection_change(SelectionState::Selected, id, &SelectionMeta { source, previous });
    true
}

/// Clear the selection and its highlight, and notify. Returns `false` if
/// nothing was selected.
pub fn clear_selection(
    selection: &mut Selection,
    registry: &mut ShapeRegistry,
    scene: &mut Scene<'_>,
    callbacks: &mut dyn BoardCallbacks,
    source: SelectionSource,
) -> bool {
    let Some(previous) = selection.clear() else {
        return false;
    };
    registry.set_highlight(scene, None);
    let meta = SelectionMeta { source, previous: Some(previous.clone()) };
    callbacks.on_selection_change(SelectionState::Cleared, &previous, &meta);
    true
}
