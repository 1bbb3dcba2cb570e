#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use std::collections::HashMap;

use crate::camera::Point;
use crate::model::{CardId, CardModel};

/// Whether `world_pt` lies on the card, accounting for its rotation.
#[must_use]
pub fn card_contains(card: &CardModel, world_pt: Point) -> bool {
    let d = world_pt.sub(card.center());
    let (sin, cos) = (-card.rot).to_radians().sin_cos();
    let local_x = d.x * cos - d.y * sin;
    let local_y = d.x * sin + d.y * cos;
    local_x.abs() <= card.w * 0.5 && local_y.abs() <= card.h * 0.5
}

/// Front-most card under `world_pt`, walking `stack` from the top.
#[must_use]
pub fn hit_test<'a>(world_pt: Point, stack: &'a [CardId], models: &HashMap<CardId, CardModel>) -> Option<&'a CardId> {
    stack
        .iter()
        .rev()
        .find(|id| models.get(id.as_str()).is_some_and(|card| card_contains(card, world_pt)))
}
