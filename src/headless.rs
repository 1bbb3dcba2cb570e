//! In-memory collaborators: a retained scene graph and a scroll host.
//!
//! [`MemoryBackend`] implements [`RenderBackend`] without drawing anything,
//! which is what tests and server-side consumers need: node lookups, child
//! stacks, counted redraws, and queued image requests. [`MemoryHost`]
//! implements [`ViewportHost`] and records every scroll write.

#[cfg(test)]
#[path = "headless_test.rs"]
mod headless_test;

use std::collections::HashMap;

use crate::camera::{Point, Size};
use crate::render::{Attr, ImageRequest, Layer, NodeId, Primitive, RenderBackend, Shadow};
use crate::viewport::ViewportHost;

// =============================================================
// MemoryBackend
// =============================================================

/// Latest value of every attribute set on a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeAttrs {
    pub position: Point,
    pub rotation: f64,
    pub scale: f64,
    pub size: Size,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    pub corner_radius: f64,
    pub text: String,
    pub font_size: f64,
    pub visible: bool,
    pub opacity: f64,
    pub shadow: Option<Shadow>,
    pub grid_spacing: f64,
}

impl Default for NodeAttrs {
    fn default() -> Self {
        Self {
            position: Point::default(),
            rotation: 0.0,
            scale: 1.0,
            size: Size::default(),
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            corner_radius: 0.0,
            text: String::new(),
            font_size: 0.0,
            visible: true,
            opacity: 1.0,
            shadow: None,
            grid_spacing: 0.0,
        }
    }
}

impl NodeAttrs {
    fn apply(&mut self, attr: Attr) {
        match attr {
            Attr::Position(p) => self.position = p,
            Attr::Rotation(r) => self.rotation = r,
            Attr::Scale(s) => self.scale = s,
            Attr::Size(s) => self.size = s,
            Attr::Fill(c) => self.fill = Some(c),
            Attr::Stroke(c) => self.stroke = Some(c),
            Attr::StrokeWidth(w) => self.stroke_width = w,
            Attr::CornerRadius(r) => self.corner_radius = r,
            Attr::Text(t) => self.text = t,
            Attr::FontSize(s) => self.font_size = s,
            Attr::Visible(v) => self.visible = v,
            Attr::Opacity(o) => self.opacity = o,
            Attr::Shadow(s) => self.shadow = Some(s),
            Attr::GridSpacing(s) => self.grid_spacing = s,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub primitive: Primitive,
    pub children: Vec<NodeId>,
    pub attrs: NodeAttrs,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    nodes: HashMap<NodeId, MemoryNode>,
    layers: Vec<(Layer, NodeId)>,
    next_id: u64,
    draws: usize,
    pending_images: Vec<ImageRequest>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn attrs(&self, id: NodeId) -> Option<&NodeAttrs> {
        self.nodes.get(&id).map(|n| &n.attrs)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[must_use]
    pub fn layer(&self, layer: Layer) -> Option<NodeId> {
        self.layers.iter().find(|(l, _)| *l == layer).map(|(_, id)| *id)
    }

    /// Children of `id` in stack order (back first).
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.draws
    }

    /// Image requests issued since the last call.
    pub fn take_image_requests(&mut self) -> Vec<ImageRequest> {
        std::mem::take(&mut self.pending_images)
    }

    fn alloc(&mut self, parent: Option<NodeId>, primitive: Primitive) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(id, MemoryNode { id, parent, primitive, children: Vec::new(), attrs: NodeAttrs::default() });
        id
    }

    fn destroy_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        for child in node.children {
            self.destroy_subtree(child);
        }
    }
}

impl RenderBackend for MemoryBackend {
    fn create_layer(&mut self, layer: Layer) -> NodeId {
        let id = self.alloc(None, Primitive::Group);
        self.layers.push((layer, id));
        id
    }

    fn create_node(&mut self, parent: NodeId, primitive: Primitive) -> NodeId {
        let id = self.alloc(Some(parent), primitive);
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    fn destroy_node(&mut self, node: NodeId) {
        let parent = self.nodes.get(&node).and_then(|n| n.parent);
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != node);
        }
        self.destroy_subtree(node);
    }

    fn set_attr(&mut self, node: NodeId, attr: Attr) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.attrs.apply(attr);
        }
    }

    fn move_to_index(&mut self, node: NodeId, index: usize) {
        let parent = self.nodes.get(&node).and_then(|n| n.parent);
        let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) else {
            return;
        };
        let Some(from) = p.children.iter().position(|c| *c == node) else {
            return;
        };
        let child = p.children.remove(from);
        let to = index.min(p.children.len());
        p.children.insert(to, child);
    }

    fn load_image(&mut self, request: ImageRequest) {
        self.pending_images.push(request);
    }

    fn batch_draw(&mut self) {
        self.draws += 1;
    }
}

// =============================================================
// MemoryHost
// =============================================================

/// Scroll container stand-in.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    pub mount: Option<Size>,
    pub scroll: Point,
    pub content: Size,
    pub overlay: Point,
    pub scroll_writes: usize,
}

impl MemoryHost {
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self { mount: Some(viewport), ..Self::default() }
    }

    /// A host whose container was never mounted.
    #[must_use]
    pub fn unmounted() -> Self {
        Self::default()
    }
}

impl ViewportHost for MemoryHost {
    fn mount_size(&self) -> Option<Size> {
        self.mount
    }

    fn set_content_size(&mut self, size: Size) {
        self.content = size;
    }

    fn set_scroll(&mut self, left: f64, top: f64) {
        self.scroll = Point::new(left, top);
        self.scroll_writes += 1;
    }

    fn pin_overlay(&mut self, left: f64, top: f64) {
        self.overlay = Point::new(left, top);
    }
}
