//! Infinite-canvas card board core.
//!
//! This crate owns the interactive state of a card board: a fixed-size world
//! of positioned, resizable, rotatable cards viewed through a pannable/zoomable
//! camera. The host layer is responsible only for forwarding pointer, wheel,
//! scroll and resize events plus animation-frame ticks; the core mutates camera
//! and model state and drives an abstract [`render::RenderBackend`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`board`] | Top-level [`board::Board`] facade owning all state |
//! | [`viewport`] | Camera controller: zoom/pan bounds, resize, scroll sync |
//! | [`registry`] | Card models, their visuals, snapshot/patch reconciliation |
//! | [`drag`] | Pan vs. card-drag gesture state machine |
//! | [`zorder`] | Dense front-to-back ranking derived from the visual stack |
//! | [`animation`] | Tick-driven easing tweens and injectable clocks |
//! | [`model`] | Card model types and the center clamp |
//! | [`camera`] | Camera state and coordinate conversions |
//! | [`hit`] | Rotation-aware hit-testing against cards |
//! | [`input`] | Pointer input types and gesture states |
//! | [`selection`] | Single-card selection tracking |
//! | [`callbacks`] | Observer hooks with no-op defaults |
//! | [`skin`] | Style-key skin factory |
//! | [`style`] | Global world/grid/shadow style settings |
//! | [`render`] | Rendering backend contract |
//! | [`headless`] | In-memory backend and host for tests and server-side use |
//! | [`config`] | Board configuration |
//! | [`error`] | Error types |
//! | [`consts`] | Shared numeric constants |

pub mod animation;
pub mod board;
pub mod callbacks;
pub mod camera;
pub mod config;
pub mod consts;
pub mod drag;
pub mod error;
pub mod headless;
pub mod hit;
pub mod input;
pub mod model;
pub mod registry;
pub mod render;
pub mod selection;
pub mod skin;
pub mod style;
pub mod viewport;
pub mod zorder;
