//! Z-order: the card stack is the ranking.
//!
//! There is no separate rank table to keep in sync. [`ZOrderManager`] holds
//! the card ids in the same order as the card layer's children (back first),
//! and a card's `z` is just its index here. The `z` stored on each model is a
//! cached copy refreshed by [`ZOrderManager::write_ranks`] after every stack
//! change. [`ZOrderManager::normalize`] also decides whether observers need
//! an ordering-changed notification.

#[cfg(test)]
#[path = "zorder_test.rs"]
mod zorder_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{CardId, CardModel};

/// One entry of the authoritative ordering list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardOrder {
    pub id: CardId,
    pub z: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ZOrderManager {
    stack: Vec<CardId>,
    last_emitted: Vec<CardOrder>,
}

impl ZOrderManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Card ids back to front.
    #[must_use]
    pub fn ids(&self) -> &[CardId] {
        &self.stack
    }

    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.stack.iter().position(|s| s == id)
    }

    /// Insert a new id at `index` (clamped), or at the front when `None`.
    pub fn insert(&mut self, id: CardId, index: Option<usize>) -> usize {
        let at = index.map_or(self.stack.len(), |i| i.min(self.stack.len()));
        self.stack.insert(at, id);
        at
    }

    pub fn remove(&mut self, id: &str) -> Option<usize> {
        let at = self.index_of(id)?;
        self.stack.remove(at);
        Some(at)
    }

    /// Move an existing id to `index` (clamped). Returns the final index.
    pub fn move_to(&mut self, id: &str, index: usize) -> Option<usize> {
        let from = self.index_of(id)?;
        let entry = self.stack.remove(from);
        let to = index.min(self.stack.len());
        self.stack.insert(to, entry);
        Some(to)
    }

    pub fn bring_to_front(&mut self, id: &str) -> Option<usize> {
        self.move_to(id, usize::MAX)
    }

    /// Reorder to follow `order`. Ids missing from `order` keep their relative
    /// order behind the listed ones; listed ids that are not in the stack are ignored.
    pub fn reorder(&mut self, order: &[CardId]) {
        let rank: HashMap<&str, usize> = order.iter().enumerate().map(|(i, id)| (id.as_str(), i)).collect();
        self.stack.sort_by_key(|id| rank.get(id.as_str()).map_or((0, 0), |r| (1, *r)));
    }

    /// Walk the stack: every live card exactly once, `z` = index.
    #[must_use]
    pub fn order(&self) -> Vec<CardOrder> {
        self.stack
            .iter()
            .enumerate()
            .map(|(z, id)| CardOrder { id: id.clone(), z })
            .collect()
    }

    /// Copy every card's stack index onto its model.
    pub fn write_ranks(&self, models: &mut HashMap<CardId, CardModel>) {
        for (z, id) in self.stack.iter().enumerate() {
            if let Some(model) = models.get_mut(id) {
                model.z = z;
            }
        }
    }

    /// Write fresh ranks onto `models` and return the order if it differs from
    /// the last one returned.
    pub fn normalize(&mut self, models: &mut HashMap<CardId, CardModel>) -> Option<Vec<CardOrder>> {
        self.write_ranks(models);
        let order = self.order();
        if order == self.last_emitted {
            return None;
        }
        self.last_emitted.clone_from(&order);
        Some(order)
    }
}
