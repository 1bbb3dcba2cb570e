//! Drag controller: disambiguates canvas panning from card dragging.
//!
//! A press on empty canvas only arms a pan. The pan starts once the pointer
//! travels past the drag threshold, so a plain click stays a click (and clears
//! the selection on release). A press on a card starts a card drag at once.
//!
//! Pans move the host's native scroll offsets in raw screen pixels; the
//! viewport's scroll path keeps the camera in step.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use crate::callbacks::{BoardCallbacks, SelectionSource};
use crate::camera::Point;
use crate::input::{Button, DragState};
use crate::model::CardModel;
use crate::registry::{Scene, ShapeRegistry};
use crate::selection::{Selection, clear_selection, select_card};
use crate::viewport::{ViewportController, ViewportHost};

/// Everything a gesture may touch, borrowed for one event.
pub struct DragCtx<'a> {
    pub registry: &'a mut ShapeRegistry,
    pub viewport: &'a mut ViewportController,
    pub host: &'a mut dyn ViewportHost,
    pub scene: Scene<'a>,
    pub callbacks: &'a mut dyn BoardCallbacks,
    pub selection: &'a mut Selection,
}

#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    threshold_px: f64,
}

impl DragController {
    #[must_use]
    pub fn new(threshold_px: f64) -> Self {
        Self { state: DragState::Idle, threshold_px }
    }

    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Handle a press. Only the primary button starts a gesture.
    pub fn pointer_down(&mut self, ctx: &mut DragCtx<'_>, screen: Point, button: Button) {
        if button != Button::Primary {
            return;
        }
        let world = ctx.viewport.client_to_world(screen);
        if let Some(id) = ctx.registry.hit_test(world).map(str::to_owned) {
            self.start_shape_drag(ctx, &id, world);
            return;
        }
        self.state = DragState::PanCandidate { press: screen, scroll_at_press: ctx.viewport.scroll_offset() };
    }

    /// Begin dragging card `id`, grabbed at `world`.
    ///
    /// Cancels any pan candidate and selects the card. If `on_drag_start`
    /// vetoes, the state returns to idle and nothing else changes. Otherwise
    /// the card is raised to the top. Returns whether the drag started.
    pub fn start_shape_drag(&mut self, ctx: &mut DragCtx<'_>, id: &str, world: Point) -> bool {
        self.state = DragState::Idle;
        let Some(center) = ctx.registry.get_shape_model(id).map(CardModel::center) else {
            return false;
        };
        select_card(ctx.selection, ctx.registry, &mut ctx.scene, ctx.callbacks, id, SelectionSource::Pointer);

        if ctx.callbacks.on_drag_start(id, center) == Some(false) {
            tracing::debug!(card = id, "drag vetoed");
            return false;
        }
        ctx.registry.bring_to_front(&mut ctx.scene, id);
        self.state = DragState::ShapeDrag { id: id.to_owned(), grab_offset: world.sub(center) };
        true
    }

    pub fn pointer_move(&mut self, ctx: &mut DragCtx<'_>, screen: Point) {
        if let DragState::PanCandidate { press, scroll_at_press } = self.state
            && screen.distance_sq(press) > self.threshold_px * self.threshold_px
        {
            self.state = DragState::Panning { press, scroll_at_press };
        }

        match &self.state {
            DragState::Panning { press, scroll_at_press } => {
                let scroll = scroll_at_press.sub(screen.sub(*press));
                ctx.viewport.set_scroll_offset(ctx.host, scroll.x, scroll.y);
            }
            DragState::ShapeDrag { id, grab_offset } => {
                let target = ctx.viewport.client_to_world(screen).sub(*grab_offset);
                if let Some(center) = ctx.registry.move_card(&mut ctx.scene, id, target) {
                    ctx.callbacks.on_drag(id, center);
                }
            }
            DragState::Idle | DragState::PanCandidate { .. } => {}
        }
    }

    /// Finish the gesture. A card drag commits its clamped position and
    /// settles the z-order; an unpromoted pan candidate clears the selection.
    pub fn pointer_up(&mut self, ctx: &mut DragCtx<'_>, screen: Point) {
        match std::mem::take(&mut self.state) {
            DragState::PanCandidate { .. } => {
                clear_selection(ctx.selection, ctx.registry, &mut ctx.scene, ctx.callbacks, SelectionSource::Pointer);
            }
            DragState::ShapeDrag { id, grab_offset } => {
                let target = ctx.viewport.client_to_world(screen).sub(grab_offset);
                let committed = ctx.registry.move_card(&mut ctx.scene, &id, target);
                if let Some(order) = ctx.registry.normalize() {
                    ctx.callbacks.on_z_order_change(&order);
                }
                if let Some(center) = committed {
                    tracing::debug!(card = %id, x = center.x, y = center.y, "drag committed");
                    ctx.callbacks.on_drag_end(&id, center);
                }
            }
            DragState::Idle | DragState::Panning { .. } => {}
        }
    }

    /// The pointer left the board: drop any pan. Card drags continue.
    pub fn pointer_leave(&mut self) {
        if self.state.is_pan() {
            self.state = DragState::Idle;
        }
    }
}
