//! Board facade: owns all state and routes host events to the controllers.
//!
//! The host forwards pointer, wheel, scroll and resize events plus frame
//! ticks. Each handler finishes every camera, model and stack mutation first,
//! then pushes the camera transform onto the layers and requests exactly one
//! [`RenderBackend::batch_draw`].

#[cfg(test)]
#[path = "board_test.rs"]
mod board_test;

use crate::animation::{Clock, SystemClock};
use crate::callbacks::{BoardCallbacks, NoopCallbacks, SelectionMeta, SelectionSource, SelectionState};
use crate::camera::{Camera, Point, Size};
use crate::config::BoardConfig;
use crate::consts::{DEFAULT_GRID_COLOR, DEFAULT_GRID_SPACING, DEFAULT_WORLD_FILL};
use crate::drag::{DragController, DragCtx};
use crate::error::{BoardError, ImageError};
use crate::input::{Button, DragState, WheelDelta};
use crate::model::{CardModel, CardPatch, PartialCard};
use crate::registry::{Scene, ShapeRegistry};
use crate::render::{Attr, ImageSize, Layer, NodeId, Primitive, RenderBackend, Shadow};
use crate::selection::{self, Selection};
use crate::skin::{DefaultSkinFactory, SkinFactory};
use crate::style::{CardShadowStyle, GridStyle, WorldStyle};
use crate::viewport::{ViewportController, ViewportHost};
use crate::zorder::CardOrder;

pub struct Board<R: RenderBackend, H: ViewportHost> {
    backend: R,
    host: H,
    skins: Box<dyn SkinFactory>,
    clock: Box<dyn Clock>,
    callbacks: Box<dyn BoardCallbacks>,
    viewport: ViewportController,
    registry: ShapeRegistry,
    drag: DragController,
    selection: Selection,
    world_layer: NodeId,
    cards_layer: NodeId,
    world_rect: NodeId,
    grid: NodeId,
}

impl<R: RenderBackend, H: ViewportHost> Board<R, H> {
    /// Build the board inside `host`'s mount container.
    ///
    /// # Errors
    ///
    /// `Config` if the config does not validate, `MissingMount` if the host
    /// has no container to mount into.
    pub fn new(config: BoardConfig, mut backend: R, mut host: H) -> Result<Self, BoardError> {
        config.validate()?;
        let viewport_size = host.mount_size().ok_or(BoardError::MissingMount)?;

        let world_layer = backend.create_layer(Layer::World);
        let world_rect = backend.create_node(world_layer, Primitive::Rect);
        backend.set_attr(world_rect, Attr::Position(Point::default()));
        backend.set_attr(world_rect, Attr::Size(config.world));
        backend.set_attr(world_rect, Attr::Fill(DEFAULT_WORLD_FILL.to_owned()));

        let grid = backend.create_node(world_layer, Primitive::Grid);
        backend.set_attr(grid, Attr::Size(config.world));
        backend.set_attr(grid, Attr::GridSpacing(DEFAULT_GRID_SPACING));
        backend.set_attr(grid, Attr::Stroke(DEFAULT_GRID_COLOR.to_owned()));
        backend.set_attr(grid, Attr::StrokeWidth(1.0));

        let cards_layer = backend.create_layer(Layer::Cards);
        let registry = ShapeRegistry::new(cards_layer, config.world, config.card);

        let mut viewport = ViewportController::new(&config, viewport_size);
        viewport.attach(&mut host);

        tracing::info!(
            world_width = config.world.width,
            world_height = config.world.height,
            viewport_width = viewport_size.width,
            viewport_height = viewport_size.height,
            zoom = viewport.camera().zoom,
            "board mounted"
        );

        let mut board = Self {
            backend,
            host,
            skins: Box::new(DefaultSkinFactory),
            clock: Box::new(SystemClock::new()),
            callbacks: Box::new(NoopCallbacks),
            viewport,
            registry,
            drag: DragController::new(config.drag_threshold_px),
            selection: Selection::new(),
            world_layer,
            cards_layer,
            world_rect,
            grid,
        };
        board.finish();
        Ok(board)
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the skin factory. Only cards built afterwards use it.
    #[must_use]
    pub fn with_skin_factory(mut self, skins: impl SkinFactory + 'static) -> Self {
        self.skins = Box::new(skins);
        self
    }

    pub fn set_callbacks(&mut self, callbacks: Box<dyn BoardCallbacks>) {
        self.callbacks = callbacks;
    }

    // =============================================================
    // Reads
    // =============================================================

    /// Every card, back to front.
    #[must_use]
    pub fn get_cards(&self) -> Vec<CardModel> {
        self.registry.get_cards()
    }

    #[must_use]
    pub fn get_card_order(&self) -> Vec<CardOrder> {
        self.registry.get_card_order()
    }

    #[must_use]
    pub fn get_shape_model(&self, id: &str) -> Option<&CardModel> {
        self.registry.get_shape_model(id)
    }

    #[must_use]
    pub fn get_camera(&self) -> Camera {
        self.viewport.camera()
    }

    #[must_use]
    pub fn min_zoom(&self) -> f64 {
        self.viewport.min_zoom()
    }

    #[must_use]
    pub fn max_zoom(&self) -> f64 {
        self.viewport.max_zoom()
    }

    #[must_use]
    pub fn client_to_world(&self, client: Point) -> Point {
        self.viewport.client_to_world(client)
    }

    #[must_use]
    pub fn world_to_client(&self, world: Point) -> Point {
        self.viewport.world_to_client(world)
    }

    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.selection.selected()
    }

    #[must_use]
    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    #[must_use]
    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    #[must_use]
    pub fn backend(&self) -> &R {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut R {
        &mut self.backend
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    // =============================================================
    // Model
    // =============================================================

    /// Replace the board contents with `cards`.
    pub fn apply_snapshot(&mut self, cards: Vec<PartialCard>) {
        let mut scene = Scene { backend: &mut self.backend, skins: self.skins.as_ref() };
        let order = self.registry.apply_snapshot(&mut scene, cards);
        self.after_model_change(order);
    }

    pub fn apply_patch(&mut self, patch: CardPatch) {
        let mut scene = Scene { backend: &mut self.backend, skins: self.skins.as_ref() };
        let order = self.registry.apply_patch(&mut scene, patch);
        self.after_model_change(order);
    }

    /// Report the outcome of an image load started by the backend.
    pub fn on_image_loaded(&mut self, id: &str, token: u64, result: Result<ImageSize, ImageError>) {
        let mut scene = Scene { backend: &mut self.backend, skins: self.skins.as_ref() };
        if self.registry.on_image_loaded(&mut scene, id, token, result) {
            self.finish();
        }
    }

    /// Delete one card, subject to the `on_delete` veto. Returns whether it was deleted.
    pub fn delete_card(&mut self, id: &str) -> bool {
        if !self.registry.contains(id) {
            return false;
        }
        if self.callbacks.on_delete(id) == Some(false) {
            tracing::debug!(card = id, "delete vetoed");
            return false;
        }
        let mut scene = Scene { backend: &mut self.backend, skins: self.skins.as_ref() };
        self.registry.remove(&mut scene, id);
        self.drop_missing_selection();
        self.callbacks.on_deleted(id);
        if let Some(order) = self.registry.normalize() {
            self.callbacks.on_z_order_change(&order);
        }
        self.finish();
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection.selected().map(str::to_owned) else {
            return false;
        };
        self.delete_card(&id)
    }

    // =============================================================
    // Selection
    // =============================================================

    /// Select a card. Returns `false` for unknown ids or an unchanged selection.
    pub fn select(&mut self, id: &str) -> bool {
        let mut scene = Scene { backend: &mut self.backend, skins: self.skins.as_ref() };
        let changed = selection::select_card(
            &mut self.selection,
            &mut self.registry,
            &mut scene,
            self.callbacks.as_mut(),
            id,
            SelectionSource::Api,
        );
        if changed {
            self.finish();
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let mut scene = Scene { backend: &mut self.backend, skins: self.skins.as_ref() };
        let changed = selection::clear_selection(
            &mut self.selection,
            &mut self.registry,
            &mut scene,
            self.callbacks.as_mut(),
            SelectionSource::Api,
        );
        if changed {
            self.finish();
        }
        changed
    }

    // =============================================================
    // Camera
    // =============================================================

    /// Animate to `pct` percent zoom around the viewport center.
    pub fn set_zoom_pct(&mut self, pct: f64) {
        let now = self.clock.now_ms();
        self.viewport.set_zoom_pct(now, pct);
    }

    /// Move the camera's top-left corner to world `(x, y)`, clamped.
    pub fn set_camera(&mut self, x: f64, y: f64) {
        self.viewport.set_camera(&mut self.host, x, y);
        self.finish();
    }

    /// Animate to the world center.
    pub fn center(&mut self) {
        let now = self.clock.now_ms();
        self.viewport.center(now);
    }

    /// Animate so `world` ends up at the viewport center.
    pub fn pan_to(&mut self, world: Point) {
        let now = self.clock.now_ms();
        self.viewport.animate_pan_to(now, world);
    }

    /// Advance animations. Returns `true` while another frame is needed.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now_ms();
        if self.viewport.tick(&mut self.host, now) {
            self.finish();
        }
        self.viewport.is_animating()
    }

    // =============================================================
    // Style
    // =============================================================

    pub fn set_world_style(&mut self, style: &WorldStyle) {
        if let Some(fill) = &style.fill {
            self.backend.set_attr(self.world_rect, Attr::Fill(fill.clone()));
        }
        if let Some(stroke) = &style.stroke {
            self.backend.set_attr(self.world_rect, Attr::Stroke(stroke.clone()));
        }
        if let Some(width) = finite_non_negative("world.strokeWidth", style.stroke_width) {
            self.backend.set_attr(self.world_rect, Attr::StrokeWidth(width));
        }
        self.finish();
    }

    pub fn set_grid_style(&mut self, style: &GridStyle) {
        if let Some(spacing) = finite_non_negative("grid.spacing", style.spacing).filter(|s| *s > 0.0) {
            self.backend.set_attr(self.grid, Attr::GridSpacing(spacing));
        }
        if let Some(color) = &style.color {
            self.backend.set_attr(self.grid, Attr::Stroke(color.clone()));
        }
        if let Some(width) = finite_non_negative("grid.lineWidth", style.line_width) {
            self.backend.set_attr(self.grid, Attr::StrokeWidth(width));
        }
        if let Some(opacity) = finite_non_negative("grid.opacity", style.opacity) {
            self.backend.set_attr(self.grid, Attr::Opacity(opacity.min(1.0)));
        }
        self.finish();
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.backend.set_attr(self.grid, Attr::Visible(visible));
        self.finish();
    }

    /// Restyle the shadow on every card body, present and future.
    pub fn set_card_shadow_style(&mut self, style: &CardShadowStyle) {
        let current = self.registry.shadow();
        let shadow = Shadow {
            color: style.color.clone().unwrap_or_else(|| current.color.clone()),
            blur: finite_non_negative("shadow.blur", style.blur).unwrap_or(current.blur),
            offset: Point::new(
                finite("shadow.offsetX", style.offset_x).unwrap_or(current.offset.x),
                finite("shadow.offsetY", style.offset_y).unwrap_or(current.offset.y),
            ),
            opacity: finite_non_negative("shadow.opacity", style.opacity).map_or(current.opacity, |o| o.min(1.0)),
        };
        let mut scene = Scene { backend: &mut self.backend, skins: self.skins.as_ref() };
        self.registry.set_shadow(&mut scene, shadow);
        self.finish();
    }

    // =============================================================
    // Input
    // =============================================================

    pub fn on_pointer_down(&mut self, screen: Point, button: Button) {
        self.drive_drag(|drag, ctx| drag.pointer_down(ctx, screen, button));
    }

    pub fn on_pointer_move(&mut self, screen: Point) {
        self.drive_drag(|drag, ctx| drag.pointer_move(ctx, screen));
    }

    pub fn on_pointer_up(&mut self, screen: Point) {
        self.drive_drag(|drag, ctx| drag.pointer_up(ctx, screen));
    }

    pub fn on_pointer_leave(&mut self) {
        self.drag.pointer_leave();
    }

    /// Wheel zoom anchored at the pointer.
    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta) {
        self.viewport.wheel_zoom(&mut self.host, screen, delta.dy);
        self.finish();
    }

    /// Native scroll event from the host container.
    pub fn on_scroll(&mut self, left: f64, top: f64) {
        if self.viewport.on_scroll(&mut self.host, left, top) {
            self.finish();
        }
    }

    /// The mount container changed size.
    pub fn on_resize(&mut self, viewport: Size) {
        let now = self.clock.now_ms();
        self.viewport.resize(&mut self.host, now, viewport);
        self.finish();
    }

    // =============================================================
    // Internals
    // =============================================================

    fn drive_drag(&mut self, f: impl FnOnce(&mut DragController, &mut DragCtx<'_>)) {
        let mut ctx = DragCtx {
            registry: &mut self.registry,
            viewport: &mut self.viewport,
            host: &mut self.host,
            scene: Scene { backend: &mut self.backend, skins: self.skins.as_ref() },
            callbacks: self.callbacks.as_mut(),
            selection: &mut self.selection,
        };
        f(&mut self.drag, &mut ctx);
        self.finish();
    }

    fn after_model_change(&mut self, order: Option<Vec<CardOrder>>) {
        self.drop_missing_selection();
        if let Some(order) = order {
            self.callbacks.on_z_order_change(&order);
        }
        self.finish();
    }

    fn drop_missing_selection(&mut self) {
        let registry = &self.registry;
        if let Some(previous) = self.selection.drop_if_missing(|id| registry.contains(id)) {
            let meta = SelectionMeta { source: SelectionSource::Removal, previous: Some(previous.clone()) };
            self.callbacks.on_selection_change(SelectionState::Cleared, &previous, &meta);
        }
    }

    /// Push the camera onto both layers and draw once.
    fn finish(&mut self) {
        let cam = self.viewport.camera();
        let offset = Point::new(-cam.x * cam.zoom, -cam.y * cam.zoom);
        for layer in [self.world_layer, self.cards_layer] {
            self.backend.set_attr(layer, Attr::Position(offset));
            self.backend.set_attr(layer, Attr::Scale(cam.zoom));
        }
        self.backend.batch_draw();
    }
}

fn finite(field: &'static str, value: Option<f64>) -> Option<f64> {
    let v = value?;
    if v.is_finite() {
        Some(v)
    } else {
        tracing::warn!(field, value = v, "ignoring non-finite style value");
        None
    }
}

fn finite_non_negative(field: &'static str, value: Option<f64>) -> Option<f64> {
    let v = finite(field, value)?;
    if v >= 0.0 {
        Some(v)
    } else {
        tracing::warn!(field, value = v, "ignoring negative style value");
        None
    }
}
