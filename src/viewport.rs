//! Viewport controller: camera bounds, animated zoom/pan, resize, scroll sync.
//!
//! The host's native scroll container mirrors the camera: `scroll = camera *
//! zoom`, and the scroll content is the world scaled by zoom. Every camera
//! write, whether from a tween, a wheel event, a drag-pan or a resize, goes
//! through [`ViewState::write_camera`], which also pushes the new offsets to
//! the host.
//!
//! A controller-initiated scroll write comes back as a scroll event. The
//! [`ScrollGuard`] recognizes that echo and swallows it; without it the echo
//! would re-enter the scroll-to-camera path and the two values would chase
//! each other indefinitely.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::animation::{AnimationScheduler, Easing, TweenUpdate};
use crate::camera::{Camera, Point, Size, lerp};
use crate::config::BoardConfig;

/// Scroll offsets closer than this are the same position.
const SCROLL_EPSILON: f64 = 0.5;

/// The scroll container the board is mounted in.
pub trait ViewportHost {
    /// Client size of the mount container, or `None` if it does not exist.
    fn mount_size(&self) -> Option<Size>;

    /// Size of the scrollable content (the world scaled by zoom).
    fn set_content_size(&mut self, size: Size);

    fn set_scroll(&mut self, left: f64, top: f64);

    /// Keep the drawing surface pinned to the visible area.
    fn pin_overlay(&mut self, left: f64, top: f64);
}

// =============================================================
// ScrollGuard
// =============================================================

/// Remembers the last scroll position the controller wrote so the matching
/// scroll event can be recognized as an echo.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollGuard {
    pending: Option<Point>,
}

impl ScrollGuard {
    pub fn arm(&mut self, at: Point) {
        self.pending = Some(at);
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the guard. Returns `true` if `(left, top)` is the echo of the
    /// armed write; any other position releases the guard and must be handled.
    pub fn absorb(&mut self, left: f64, top: f64) -> bool {
        match self.pending.take() {
            Some(p) => (p.x - left).abs() <= SCROLL_EPSILON && (p.y - top).abs() <= SCROLL_EPSILON,
            None => false,
        }
    }
}

// =============================================================
// ViewState
// =============================================================

/// Camera plus everything needed to bound it.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub camera: Camera,
    pub viewport: Size,
    pub world: Size,
    pub min_zoom: f64,
    pub hard_min_zoom: f64,
    pub max_zoom: f64,
    guard: ScrollGuard,
    last_scroll: Point,
}

impl ViewState {
    #[must_use]
    pub fn new(config: &BoardConfig, viewport: Size) -> Self {
        let mut view = Self {
            camera: Camera::default(),
            viewport,
            world: config.world,
            min_zoom: config.hard_min_zoom,
            hard_min_zoom: config.hard_min_zoom,
            max_zoom: config.max_zoom,
            guard: ScrollGuard::default(),
            last_scroll: Point::default(),
        };
        view.min_zoom = view.compute_min_zoom();
        view.camera.zoom = view.clamp_zoom(config.initial_zoom);
        view.camera = view.clamp_offset(view.camera);
        view
    }

    /// The smallest zoom at which the world still covers the viewport.
    #[must_use]
    pub fn compute_min_zoom(&self) -> f64 {
        let fit_w = self.viewport.width / self.world.width;
        let fit_h = self.viewport.height / self.world.height;
        self.hard_min_zoom.max(fit_w).max(fit_h).min(self.max_zoom)
    }

    #[must_use]
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.min_zoom;
        }
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Keep the visible rect inside the world. Zoom is left untouched.
    #[must_use]
    pub fn clamp_offset(&self, cam: Camera) -> Camera {
        let visible = cam.visible_size(self.viewport);
        Camera {
            x: clamp_axis(cam.x, self.world.width - visible.width),
            y: clamp_axis(cam.y, self.world.height - visible.height),
            zoom: cam.zoom,
        }
    }

    /// The single camera write path: clamp, then sync the host.
    ///
    /// Content size is written before the scroll offset so the container is
    /// large enough to accept it. The scroll is only written when it moved,
    /// and every write arms the guard.
    pub fn write_camera(&mut self, host: &mut dyn ViewportHost, cam: Camera) {
        self.camera = self.clamp_offset(cam);
        host.set_content_size(Size::new(self.world.width * self.camera.zoom, self.world.height * self.camera.zoom));
        let scroll = self.camera.scroll_offset();
        if !same_scroll(scroll, self.last_scroll) {
            self.guard.arm(scroll);
            host.set_scroll(scroll.x, scroll.y);
            self.last_scroll = scroll;
        }
        host.pin_overlay(scroll.x, scroll.y);
    }
}

fn clamp_axis(v: f64, max: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.min(max).max(0.0)
}

fn same_scroll(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() <= SCROLL_EPSILON && (a.y - b.y).abs() <= SCROLL_EPSILON
}

// =============================================================
// Camera tweens
// =============================================================

/// What a camera tween writes on each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraTween {
    /// Move the top-left corner at the current zoom.
    Pan { from: Point, to: Point },
    /// Change zoom while keeping `anchor_world` under `anchor_screen`.
    Zoom { from: f64, to: f64, anchor_screen: Point, anchor_world: Point },
}

pub struct CameraCtx<'a> {
    pub view: &'a mut ViewState,
    pub host: &'a mut dyn ViewportHost,
}

impl<'a> TweenUpdate<CameraCtx<'a>> for CameraTween {
    fn update(&mut self, ctx: &mut CameraCtx<'a>, progress: f64) {
        let cam = match *self {
            Self::Pan { from, to } => {
                let p = from.lerp(to, progress);
                Camera { x: p.x, y: p.y, zoom: ctx.view.camera.zoom }
            }
            Self::Zoom { from, to, anchor_screen, anchor_world } => {
                Camera::anchored(anchor_world, anchor_screen, lerp(from, to, progress))
            }
        };
        ctx.view.write_camera(ctx.host, cam);
    }
}

// =============================================================
// ViewportController
// =============================================================

#[derive(Debug, Clone)]
pub struct ViewportController {
    view: ViewState,
    tweens: AnimationScheduler<CameraTween>,
    wheel_sensitivity: f64,
    zoom_duration_ms: f64,
    pan_min_duration_ms: f64,
    pan_max_duration_ms: f64,
    pan_speed_px_per_ms: f64,
}

impl ViewportController {
    #[must_use]
    pub fn new(config: &BoardConfig, viewport: Size) -> Self {
        Self {
            view: ViewState::new(config, viewport),
            tweens: AnimationScheduler::new(),
            wheel_sensitivity: config.wheel_sensitivity,
            zoom_duration_ms: config.zoom_duration_ms,
            pan_min_duration_ms: config.pan_min_duration_ms,
            pan_max_duration_ms: config.pan_max_duration_ms,
            pan_speed_px_per_ms: config.pan_speed_px_per_ms,
        }
    }

    /// Push the initial camera to the host.
    pub fn attach(&mut self, host: &mut dyn ViewportHost) {
        let cam = self.view.camera;
        self.view.write_camera(host, cam);
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.view.camera
    }

    #[must_use]
    pub fn viewport(&self) -> Size {
        self.view.viewport
    }

    #[must_use]
    pub fn min_zoom(&self) -> f64 {
        self.view.min_zoom
    }

    #[must_use]
    pub fn max_zoom(&self) -> f64 {
        self.view.max_zoom
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        !self.tweens.is_empty()
    }

    #[must_use]
    pub fn client_to_world(&self, client: Point) -> Point {
        self.view.camera.screen_to_world(client)
    }

    #[must_use]
    pub fn world_to_client(&self, world: Point) -> Point {
        self.view.camera.world_to_screen(world)
    }

    #[must_use]
    pub fn scroll_offset(&self) -> Point {
        self.view.camera.scroll_offset()
    }

    /// Move the top-left corner to `(x, y)` in world units, clamped.
    pub fn set_camera(&mut self, host: &mut dyn ViewportHost, x: f64, y: f64) {
        let zoom = self.view.camera.zoom;
        self.view.write_camera(host, Camera { x, y, zoom });
    }

    /// Scroll to raw screen offsets at the current zoom.
    pub fn set_scroll_offset(&mut self, host: &mut dyn ViewportHost, left: f64, top: f64) {
        let zoom = self.view.camera.zoom;
        self.view.write_camera(host, Camera { x: left / zoom, y: top / zoom, zoom });
    }

    /// Animate to `pct` percent zoom, anchored at the viewport center.
    pub fn set_zoom_pct(&mut self, now_ms: f64, pct: f64) {
        let target = self.view.clamp_zoom(pct / 100.0);
        let anchor_screen = self.view.viewport.center();
        self.start_zoom(now_ms, target, anchor_screen);
    }

    /// Immediate zoom by wheel delta, keeping the world point under `screen` fixed.
    pub fn wheel_zoom(&mut self, host: &mut dyn ViewportHost, screen: Point, delta_y: f64) {
        if !delta_y.is_finite() {
            return;
        }
        let cam = self.view.camera;
        let factor = (-delta_y / self.wheel_sensitivity).exp2();
        let zoom = self.view.clamp_zoom(cam.zoom * factor);
        let anchor_world = cam.screen_to_world(screen);
        self.view.write_camera(host, Camera::anchored(anchor_world, screen, zoom));
        tracing::debug!(zoom, "wheel zoom");
    }

    /// Animate so `world` ends up at the viewport center.
    pub fn animate_pan_to(&mut self, now_ms: f64, world: Point) {
        let cam = self.view.camera;
        let visible = cam.visible_size(self.view.viewport);
        let target = self.view.clamp_offset(Camera {
            x: world.x - visible.width * 0.5,
            y: world.y - visible.height * 0.5,
            zoom: cam.zoom,
        });
        let from = Point::new(cam.x, cam.y);
        let to = Point::new(target.x, target.y);
        let screen_dist = from.distance_sq(to).sqrt() * cam.zoom;
        if screen_dist <= f64::EPSILON {
            return;
        }
        let duration = (screen_dist / self.pan_speed_px_per_ms).clamp(self.pan_min_duration_ms, self.pan_max_duration_ms);
        self.tweens.start(now_ms, duration, Easing::EaseInOutCubic, CameraTween::Pan { from, to });
        tracing::debug!(x = to.x, y = to.y, duration_ms = duration, "pan started");
    }

    /// Animate to the world center.
    pub fn center(&mut self, now_ms: f64) {
        let world = self.view.world.center();
        self.animate_pan_to(now_ms, world);
    }

    /// Apply a new viewport size.
    ///
    /// The world point at the viewport center stays at the center. If the new
    /// size raises the minimum zoom above the current zoom, the offsets are
    /// clamped now and the zoom animates up to the new minimum.
    pub fn resize(&mut self, host: &mut dyn ViewportHost, now_ms: f64, viewport: Size) {
        let cam = self.view.camera;
        let anchor_world = cam.screen_to_world(self.view.viewport.center());
        self.view.viewport = viewport;
        self.view.min_zoom = self.view.compute_min_zoom();
        self.view.write_camera(host, Camera::anchored(anchor_world, viewport.center(), cam.zoom));
        if cam.zoom < self.view.min_zoom {
            let target = self.view.min_zoom;
            self.start_zoom(now_ms, target, viewport.center());
        }
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            min_zoom = self.view.min_zoom,
            "viewport resized"
        );
    }

    /// Handle a native scroll event. Returns `true` if the camera followed it,
    /// `false` if it was the echo of our own write.
    pub fn on_scroll(&mut self, host: &mut dyn ViewportHost, left: f64, top: f64) -> bool {
        if self.view.guard.absorb(left, top) {
            return false;
        }
        self.view.last_scroll = Point::new(left, top);
        self.set_scroll_offset(host, left, top);
        true
    }

    /// Advance camera tweens. Returns `true` if any tween ran.
    pub fn tick(&mut self, host: &mut dyn ViewportHost, now_ms: f64) -> bool {
        if self.tweens.is_empty() {
            return false;
        }
        let mut ctx = CameraCtx { view: &mut self.view, host };
        self.tweens.tick(now_ms, &mut ctx) > 0
    }

    fn start_zoom(&mut self, now_ms: f64, target: f64, anchor_screen: Point) {
        let cam = self.view.camera;
        if (target - cam.zoom).abs() <= f64::EPSILON {
            return;
        }
        let anchor_world = cam.screen_to_world(anchor_screen);
        self.tweens.start(
            now_ms,
            self.zoom_duration_ms,
            Easing::EaseOutCubic,
            CameraTween::Zoom { from: cam.zoom, to: target, anchor_screen, anchor_world },
        );
        tracing::debug!(from = cam.zoom, to = target, "zoom started");
    }
}
