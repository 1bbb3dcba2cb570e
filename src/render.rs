//! Rendering backend contract.
//!
//! The core never draws. It creates and mutates retained scene-graph nodes
//! through [`RenderBackend`] and asks for one [`RenderBackend::batch_draw`] at
//! the end of each event, after all camera/model/stack mutation is done, so a
//! frame never observes a torn intermediate state.
//!
//! Compound card visuals keep explicit [`NodeId`] handles to their parts; the
//! backend is never asked to find a part by name.

use crate::camera::{Point, Size};

/// Opaque handle to a backend node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Top-level layers created once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// World background and grid.
    World,
    /// Card groups; child order is the z-order.
    Cards,
}

/// Node primitive types the core asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Group,
    Rect,
    Text,
    Image,
    Grid,
}

/// Drop shadow parameters applied to card bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct Shadow {
    pub color: String,
    pub blur: f64,
    pub offset: Point,
    pub opacity: f64,
}

/// A single attribute mutation.
///
/// Positions and rotations are relative to the parent node. Rotation is in
/// degrees, clockwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    Position(Point),
    Rotation(f64),
    /// Uniform scale; the board sets it on layers to apply the camera zoom.
    Scale(f64),
    Size(Size),
    Fill(String),
    Stroke(String),
    StrokeWidth(f64),
    CornerRadius(f64),
    Text(String),
    FontSize(f64),
    Visible(bool),
    Opacity(f64),
    Shadow(Shadow),
    GridSpacing(f64),
}

/// An image fetch started by the core.
///
/// The host reports the outcome through
/// [`crate::board::Board::on_image_loaded`] with the same `card_id` and `token`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub card_id: String,
    pub token: u64,
    pub url: String,
    pub node: NodeId,
}

/// Pixel dimensions of a loaded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

/// Retained-mode scene graph the board drives.
pub trait RenderBackend {
    /// Create a top-level layer. Layers stack in creation order.
    fn create_layer(&mut self, layer: Layer) -> NodeId;

    /// Create a node as the front-most child of `parent`.
    fn create_node(&mut self, parent: NodeId, primitive: Primitive) -> NodeId;

    /// Destroy a node and all of its descendants.
    fn destroy_node(&mut self, node: NodeId);

    fn set_attr(&mut self, node: NodeId, attr: Attr);

    /// Move a node to `index` within its parent's child stack (0 = back).
    fn move_to_index(&mut self, node: NodeId, index: usize);

    /// Begin an asynchronous image fetch into `request.node`.
    fn load_image(&mut self, request: ImageRequest);

    /// Flush pending mutations as one redraw.
    fn batch_draw(&mut self);
}
