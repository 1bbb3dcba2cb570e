//! Card model: the stored card, its sparse update record, and the center clamp.
//!
//! A [`CardModel`] is what the registry stores and hands back to callers. A
//! [`PartialCard`] is what arrives from snapshots and patches: only `id` is
//! required and every other present field is shallow-merged over the previous
//! model (or over defaults for a new card).
//!
//! Every merge re-clamps the center so the card's full extent stays inside the
//! world.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use serde::{Deserialize, Serialize};

use crate::camera::{Point, Size};
use crate::config::CardDefaults;
use crate::consts::{DEFAULT_BODY_FILL, DEFAULT_HEADER_FILL, DEFAULT_STROKE, DEFAULT_STROKE_WIDTH, DEFAULT_STYLE_KEY};

/// Unique identifier for a card.
pub type CardId = String;

/// Kind assigned to cards that arrive without one.
pub const CARD_KIND: &str = "card";

/// A card as stored in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardModel {
    pub id: CardId,
    pub board_id: Option<String>,
    pub kind: String,
    /// Center x in world coordinates.
    pub cx: f64,
    /// Center y in world coordinates.
    pub cy: f64,
    pub w: f64,
    pub h: f64,
    /// Clockwise rotation in degrees around the center.
    pub rot: f64,
    /// Dense stack rank; 0 is back-most.
    pub z: usize,
    pub style_key: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub body_fill: String,
    pub header_fill: String,
    pub title: String,
    pub img: Option<String>,
}

/// Sparse card record. Only present fields are applied.
///
/// `img: Some("")` clears the image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialCard {
    pub id: CardId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rot: Option<f64>,
    /// Requested stack rank; a placement hint, see the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

impl PartialCard {
    #[must_use]
    pub fn new(id: impl Into<CardId>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }

    /// The requested rank as a stack index; negative values mean the back.
    #[must_use]
    pub fn z_hint(&self) -> Option<usize> {
        self.z.map(|z| usize::try_from(z).unwrap_or(0))
    }
}

/// Incremental change set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardPatch {
    #[serde(default)]
    pub add: Vec<PartialCard>,
    #[serde(default)]
    pub update: Vec<PartialCard>,
    #[serde(default)]
    pub remove: Vec<CardId>,
}

/// What a merge changed, so the registry can pick the cheapest visual update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Size, style or image changed; the skin must be rebuilt.
    pub rebuild: bool,
    /// Center or rotation changed.
    pub transform: bool,
    pub title: bool,
}

impl CardModel {
    /// A new card with default geometry and colors, centered at the world origin corner.
    #[must_use]
    pub fn new(id: impl Into<CardId>, defaults: &CardDefaults) -> Self {
        Self {
            id: id.into(),
            board_id: None,
            kind: CARD_KIND.to_owned(),
            cx: defaults.width * 0.5,
            cy: defaults.height * 0.5,
            w: defaults.width,
            h: defaults.height,
            rot: 0.0,
            z: 0,
            style_key: DEFAULT_STYLE_KEY.to_owned(),
            stroke: DEFAULT_STROKE.to_owned(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            body_fill: DEFAULT_BODY_FILL.to_owned(),
            header_fill: DEFAULT_HEADER_FILL.to_owned(),
            title: String::new(),
            img: None,
        }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.cx, self.cy)
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Shallow-merge `patch` over this model and re-clamp the center.
    ///
    /// Non-finite numbers and non-positive sizes are dropped with a warning.
    #[allow(clippy::float_cmp)]
    pub fn merge(&mut self, patch: &PartialCard, world: Size) -> MergeOutcome {
        let mut out = MergeOutcome::default();
        let before = (self.cx, self.cy, self.rot);

        if let Some(board_id) = &patch.board_id {
            self.board_id = Some(board_id.clone());
        }
        if let Some(kind) = &patch.kind {
            self.kind.clone_from(kind);
        }

        if let Some(w) = positive_field(&patch.id, "w", patch.w)
            && w != self.w
        {
            self.w = w;
            out.rebuild = true;
        }
        if let Some(h) = positive_field(&patch.id, "h", patch.h)
            && h != self.h
        {
            self.h = h;
            out.rebuild = true;
        }
        if let Some(sw) = finite_field(&patch.id, "strokeWidth", patch.stroke_width).map(|sw| sw.max(0.0))
            && sw != self.stroke_width
        {
            self.stroke_width = sw;
            out.rebuild = true;
        }
        out.rebuild |= merge_string(&mut self.style_key, patch.style_key.as_ref());
        out.rebuild |= merge_string(&mut self.stroke, patch.stroke.as_ref());
        out.rebuild |= merge_string(&mut self.body_fill, patch.body_fill.as_ref());
        out.rebuild |= merge_string(&mut self.header_fill, patch.header_fill.as_ref());

        if let Some(img) = &patch.img {
            let next = if img.is_empty() { None } else { Some(img.clone()) };
            if next != self.img {
                self.img = next;
                out.rebuild = true;
            }
        }

        out.title = merge_string(&mut self.title, patch.title.as_ref());

        if let Some(cx) = finite_field(&patch.id, "cx", patch.cx) {
            self.cx = cx;
        }
        if let Some(cy) = finite_field(&patch.id, "cy", patch.cy) {
            self.cy = cy;
        }
        if let Some(rot) = finite_field(&patch.id, "rot", patch.rot) {
            self.rot = rot;
        }

        let clamped = clamp_center(self.cx, self.cy, self.w, self.h, world);
        self.cx = clamped.x;
        self.cy = clamped.y;

        out.transform = before != (self.cx, self.cy, self.rot);
        out
    }
}

/// Clamp a card center so a `w` x `h` card lies fully inside `world`.
///
/// Total for finite input. NaN snaps to the low bound and infinities to the
/// nearest bound. A card larger than the world pins to its low bound on that
/// axis.
#[must_use]
pub fn clamp_center(cx: f64, cy: f64, w: f64, h: f64, world: Size) -> Point {
    Point::new(clamp_axis(cx, w, world.width), clamp_axis(cy, h, world.height))
}

fn clamp_axis(c: f64, extent: f64, world: f64) -> f64 {
    let lo = extent * 0.5;
    let hi = (world - extent * 0.5).max(lo);
    if c.is_nan() {
        return lo;
    }
    c.max(lo).min(hi)
}

fn merge_string(slot: &mut String, incoming: Option<&String>) -> bool {
    match incoming {
        Some(v) if v != slot => {
            slot.clone_from(v);
            true
        }
        _ => false,
    }
}

fn finite_field(id: &str, field: &'static str, value: Option<f64>) -> Option<f64> {
    let v = value?;
    if v.is_finite() {
        Some(v)
    } else {
        tracing::warn!(card = id, field, value = v, "dropping non-finite card field");
        None
    }
}

fn positive_field(id: &str, field: &'static str, value: Option<f64>) -> Option<f64> {
    let v = finite_field(id, field, value)?;
    if v > 0.0 {
        Some(v)
    } else {
        tracing::warn!(card = id, field, value = v, "dropping non-positive card size");
        None
    }
}
