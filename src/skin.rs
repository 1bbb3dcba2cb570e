//! Skin factory: turns a card's style key into its body and header nodes.
//!
//! Unknown style keys fall back to [`SkinStyle::Classic`]; they are never an
//! error.

#[cfg(test)]
#[path = "skin_test.rs"]
mod skin_test;

use crate::camera::{Point, Size};
use crate::render::{Attr, NodeId, Primitive, RenderBackend};

/// Built-in card styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkinStyle {
    /// Softly rounded body with a full-width header.
    #[default]
    Classic,
    /// Pill-like corners.
    Rounded,
    /// Square corners.
    Sharp,
    /// Sticky note: flat body, thin tape-like header.
    Sticky,
}

impl SkinStyle {
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key {
            "classic" => Self::Classic,
            "rounded" => Self::Rounded,
            "sharp" => Self::Sharp,
            "sticky" => Self::Sticky,
            other => {
                tracing::debug!(style_key = other, "unknown style key; using classic skin");
                Self::Classic
            }
        }
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Rounded => "rounded",
            Self::Sharp => "sharp",
            Self::Sticky => "sticky",
        }
    }

    #[must_use]
    pub fn corner_radius(self) -> f64 {
        match self {
            Self::Classic => 8.0,
            Self::Rounded => 18.0,
            Self::Sharp => 0.0,
            Self::Sticky => 2.0,
        }
    }

    /// Fraction of the configured header height this style draws.
    #[must_use]
    pub fn header_scale(self) -> f64 {
        match self {
            Self::Sticky => 0.5,
            _ => 1.0,
        }
    }
}

/// Geometry and colors a skin is built from.
#[derive(Debug, Clone, Copy)]
pub struct SkinParams<'a> {
    pub size: Size,
    pub header_height: f64,
    pub stroke: &'a str,
    pub stroke_width: f64,
    pub body_fill: &'a str,
    pub header_fill: &'a str,
}

/// Handles to the two skin parts, resolved at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Skin {
    pub body: NodeId,
    pub header: NodeId,
    /// Height the header actually occupies; the title and image slot are laid out below it.
    pub header_height: f64,
}

/// Builds the style-specific subtree of a card inside `parent`.
///
/// Children are positioned relative to the card center.
pub trait SkinFactory {
    fn build(&self, backend: &mut dyn RenderBackend, parent: NodeId, style_key: &str, params: &SkinParams<'_>)
    -> Skin;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSkinFactory;

impl SkinFactory for DefaultSkinFactory {
    fn build(
        &self,
        backend: &mut dyn RenderBackend,
        parent: NodeId,
        style_key: &str,
        params: &SkinParams<'_>,
    ) -> Skin {
        let style = SkinStyle::from_key(style_key);
        let radius = style.corner_radius().min(params.size.width * 0.5).min(params.size.height * 0.5);
        let top_left = Point::new(-params.size.width * 0.5, -params.size.height * 0.5);
        let header_h = (params.header_height * style.header_scale()).min(params.size.height);

        let body = backend.create_node(parent, Primitive::Rect);
        backend.set_attr(body, Attr::Position(top_left));
        backend.set_attr(body, Attr::Size(params.size));
        backend.set_attr(body, Attr::Fill(params.body_fill.to_owned()));
        backend.set_attr(body, Attr::Stroke(params.stroke.to_owned()));
        backend.set_attr(body, Attr::StrokeWidth(params.stroke_width));
        backend.set_attr(body, Attr::CornerRadius(radius));

        let header = backend.create_node(parent, Primitive::Rect);
        backend.set_attr(header, Attr::Position(top_left));
        backend.set_attr(header, Attr::Size(Size::new(params.size.width, header_h)));
        backend.set_attr(header, Attr::Fill(params.header_fill.to_owned()));
        backend.set_attr(header, Attr::CornerRadius(radius.min(header_h * 0.5)));

        Skin { body, header, header_height: header_h }
    }
}
