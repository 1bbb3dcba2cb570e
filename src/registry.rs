//! Shape registry: card models, their visuals, and snapshot/patch reconciliation.
//!
//! Every model owns exactly one [`CardVisual`]: a group node in the card layer
//! plus explicit handles to its parts. Both are created and destroyed together.
//! The card layer's child order mirrors [`ZOrderManager`]'s stack at all times.
//!
//! Visual updates pick the cheapest path the merge allows: a size or style
//! change tears down the parts and rebuilds them inside the same group (so the
//! stack position survives), a title change rewrites the text node, and a move
//! or rotation only touches the group transform.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::{HashMap, HashSet};

use crate::camera::{Point, Size};
use crate::config::CardDefaults;
use crate::consts::{
    DEFAULT_SHADOW_BLUR, DEFAULT_SHADOW_COLOR, DEFAULT_SHADOW_OFFSET_Y, DEFAULT_SHADOW_OPACITY, SELECTION_STROKE,
    SELECTION_STROKE_WIDTH, TITLE_FONT_SIZE, TITLE_PADDING,
};
use crate::error::ImageError;
use crate::hit;
use crate::model::{CardId, CardModel, CardPatch, MergeOutcome, PartialCard, clamp_center};
use crate::render::{Attr, ImageRequest, ImageSize, NodeId, Primitive, RenderBackend, Shadow};
use crate::skin::{Skin, SkinFactory, SkinParams};
use crate::zorder::{CardOrder, ZOrderManager};

/// Rendering collaborators borrowed for the duration of one operation.
pub struct Scene<'a> {
    pub backend: &'a mut dyn RenderBackend,
    pub skins: &'a dyn SkinFactory,
}

/// Node handles for one card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardVisual {
    pub group: NodeId,
    pub skin: Skin,
    pub title: NodeId,
    pub img_frame: NodeId,
    pub img: NodeId,
    /// Token of the outstanding image load, if any.
    pub image_token: Option<u64>,
}

impl CardVisual {
    fn parts(&self) -> [NodeId; 5] {
        [self.skin.body, self.skin.header, self.img_frame, self.img, self.title]
    }
}

#[must_use]
pub fn default_shadow() -> Shadow {
    Shadow {
        color: DEFAULT_SHADOW_COLOR.to_owned(),
        blur: DEFAULT_SHADOW_BLUR,
        offset: Point::new(0.0, DEFAULT_SHADOW_OFFSET_Y),
        opacity: DEFAULT_SHADOW_OPACITY,
    }
}

#[derive(Debug)]
pub struct ShapeRegistry {
    world: Size,
    defaults: CardDefaults,
    layer: NodeId,
    models: HashMap<CardId, CardModel>,
    visuals: HashMap<CardId, CardVisual>,
    zorder: ZOrderManager,
    shadow: Shadow,
    highlighted: Option<CardId>,
    next_image_token: u64,
}

impl ShapeRegistry {
    /// A registry drawing into `layer`, the card layer.
    #[must_use]
    pub fn new(layer: NodeId, world: Size, defaults: CardDefaults) -> Self {
        Self {
            world,
            defaults,
            layer,
            models: HashMap::new(),
            visuals: HashMap::new(),
            zorder: ZOrderManager::new(),
            shadow: default_shadow(),
            highlighted: None,
            next_image_token: 0,
        }
    }

    // =============================================================
    // Reads
    // =============================================================

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    #[must_use]
    pub fn get_shape_model(&self, id: &str) -> Option<&CardModel> {
        self.models.get(id)
    }

    /// Every card, back to front.
    #[must_use]
    pub fn get_cards(&self) -> Vec<CardModel> {
        self.zorder.ids().iter().filter_map(|id| self.models.get(id).cloned()).collect()
    }

    #[must_use]
    pub fn get_card_order(&self) -> Vec<CardOrder> {
        self.zorder.order()
    }

    #[must_use]
    pub fn visual(&self, id: &str) -> Option<&CardVisual> {
        self.visuals.get(id)
    }

    #[must_use]
    pub fn shadow(&self) -> &Shadow {
        &self.shadow
    }

    /// Front-most card under `world_pt`.
    #[must_use]
    pub fn hit_test(&self, world_pt: Point) -> Option<&str> {
        hit::hit_test(world_pt, self.zorder.ids(), &self.models).map(String::as_str)
    }

    // =============================================================
    // Reconciliation
    // =============================================================

    /// Make the registry match `cards` exactly.
    ///
    /// Cards are taken in ascending `z` (missing = 0, ties keep input order);
    /// the resulting stack follows that order. Returns the new ordering if it
    /// changed.
    pub fn apply_snapshot(&mut self, scene: &mut Scene<'_>, cards: Vec<PartialCard>) -> Option<Vec<CardOrder>> {
        let mut cards: Vec<PartialCard> = cards.into_iter().filter(|c| valid_id(&c.id)).collect();
        cards.sort_by_key(|c| c.z.unwrap_or(0));

        for card in &cards {
            self.upsert(scene, card, false);
        }

        let keep: HashSet<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        let stale: Vec<CardId> = self.models.keys().filter(|id| !keep.contains(id.as_str())).cloned().collect();
        for id in &stale {
            self.remove(scene, id);
        }

        let mut seen = HashSet::new();
        let order: Vec<CardId> = cards.iter().filter(|c| seen.insert(c.id.as_str())).map(|c| c.id.clone()).collect();
        self.zorder.reorder(&order);
        self.sync_stack(scene);

        tracing::info!(cards = self.models.len(), removed = stale.len(), "applied snapshot");
        self.normalize()
    }

    /// Apply an incremental change set: removals, then additions, then updates.
    pub fn apply_patch(&mut self, scene: &mut Scene<'_>, patch: CardPatch) -> Option<Vec<CardOrder>> {
        for id in &patch.remove {
            self.remove(scene, id);
        }
        for card in patch.add.iter().chain(patch.update.iter()) {
            if valid_id(&card.id) {
                self.upsert(scene, card, true);
            }
        }
        tracing::debug!(
            added = patch.add.len(),
            updated = patch.update.len(),
            removed = patch.remove.len(),
            "applied patch"
        );
        self.normalize()
    }

    /// Create or merge one card.
    ///
    /// With `honor_z`, a new card is inserted at `min(z, len)` and an existing
    /// card is moved to `min(z, len - 1)`; without it new cards go on top and
    /// existing ones keep their place.
    pub fn upsert(&mut self, scene: &mut Scene<'_>, card: &PartialCard, honor_z: bool) {
        let hint = if honor_z { card.z_hint() } else { None };

        let Some(model) = self.models.get_mut(&card.id) else {
            self.create(scene, card, hint);
            return;
        };
        let outcome = model.merge(card, self.world);

        if let Some(z) = hint {
            let target = z.min(self.zorder.len().saturating_sub(1));
            if self.zorder.index_of(&card.id) != Some(target) {
                self.restack(scene, &card.id, target);
            }
        }
        self.refresh(scene, &card.id, outcome);
    }

    fn create(&mut self, scene: &mut Scene<'_>, card: &PartialCard, hint: Option<usize>) {
        let mut model = CardModel::new(card.id.clone(), &self.defaults);
        model.merge(card, self.world);

        let group = scene.backend.create_node(self.layer, Primitive::Group);
        let at = self.zorder.insert(card.id.clone(), hint);
        scene.backend.move_to_index(group, at);
        model.z = at;
        apply_transform(scene.backend, group, &model);

        let mut visual = self.build_parts(scene, group, &model);
        self.request_image(scene, &model, &mut visual);

        tracing::debug!(card = %card.id, z = at, "card created");
        self.visuals.insert(card.id.clone(), visual);
        self.models.insert(card.id.clone(), model);
    }

    fn refresh(&mut self, scene: &mut Scene<'_>, id: &str, outcome: MergeOutcome) {
        let (Some(model), Some(visual)) = (self.models.get(id), self.visuals.get(id).copied()) else {
            return;
        };
        if outcome.transform {
            apply_transform(scene.backend, visual.group, model);
        }
        if outcome.rebuild {
            let model = model.clone();
            for part in visual.parts() {
                scene.backend.destroy_node(part);
            }
            let mut rebuilt = self.build_parts(scene, visual.group, &model);
            self.request_image(scene, &model, &mut rebuilt);
            self.visuals.insert(model.id.clone(), rebuilt);
            tracing::debug!(card = id, style_key = %model.style_key, "card skin rebuilt");
        } else if outcome.title {
            scene.backend.set_attr(visual.title, Attr::Text(model.title.clone()));
        }
    }

    fn build_parts(&self, scene: &mut Scene<'_>, group: NodeId, model: &CardModel) -> CardVisual {
        let size = model.size();
        let params = SkinParams {
            size,
            header_height: self.defaults.header_height,
            stroke: &model.stroke,
            stroke_width: model.stroke_width,
            body_fill: &model.body_fill,
            header_fill: &model.header_fill,
        };
        let skin = scene.skins.build(scene.backend, group, &model.style_key, &params);
        scene.backend.set_attr(skin.body, Attr::Shadow(self.shadow.clone()));
        if self.highlighted.as_deref() == Some(model.id.as_str()) {
            apply_highlight(scene.backend, skin.body, model, true);
        }

        let frame = slot_frame(model, skin.header_height, self.defaults.image_slot);
        let img_frame = scene.backend.create_node(group, Primitive::Rect);
        scene.backend.set_attr(img_frame, Attr::Position(frame.origin));
        scene.backend.set_attr(img_frame, Attr::Size(frame.size));
        scene.backend.set_attr(img_frame, Attr::Stroke(model.stroke.clone()));
        scene.backend.set_attr(img_frame, Attr::StrokeWidth(model.stroke_width));
        scene.backend.set_attr(img_frame, Attr::Visible(model.img.is_some()));

        let img = scene.backend.create_node(group, Primitive::Image);
        scene.backend.set_attr(img, Attr::Position(frame.origin));
        scene.backend.set_attr(img, Attr::Visible(false));

        let title = scene.backend.create_node(group, Primitive::Text);
        scene.backend.set_attr(
            title,
            Attr::Position(Point::new(
                -size.width * 0.5 + TITLE_PADDING,
                -size.height * 0.5 + ((frame.header_height - TITLE_FONT_SIZE) * 0.5).max(0.0),
            )),
        );
        scene.backend.set_attr(title, Attr::FontSize(TITLE_FONT_SIZE));
        scene.backend.set_attr(title, Attr::Fill(model.stroke.clone()));
        scene.backend.set_attr(title, Attr::Text(model.title.clone()));

        CardVisual { group, skin, title, img_frame, img, image_token: None }
    }

    fn request_image(&mut self, scene: &mut Scene<'_>, model: &CardModel, visual: &mut CardVisual) {
        let Some(url) = &model.img else {
            visual.image_token = None;
            return;
        };
        self.next_image_token += 1;
        let token = self.next_image_token;
        visual.image_token = Some(token);
        scene.backend.load_image(ImageRequest { card_id: model.id.clone(), token, url: url.clone(), node: visual.img });
    }

    /// Destroy a card's visual, model and stack entry. Unknown ids are a no-op.
    pub fn remove(&mut self, scene: &mut Scene<'_>, id: &str) -> bool {
        if self.models.remove(id).is_none() {
            return false;
        }
        if let Some(visual) = self.visuals.remove(id) {
            scene.backend.destroy_node(visual.group);
        }
        self.zorder.remove(id);
        if self.highlighted.as_deref() == Some(id) {
            self.highlighted = None;
        }
        tracing::debug!(card = id, "card removed");
        true
    }

    // =============================================================
    // Stack
    // =============================================================

    fn restack(&mut self, scene: &mut Scene<'_>, id: &str, index: usize) -> Option<usize> {
        let at = self.zorder.move_to(id, index)?;
        if let Some(visual) = self.visuals.get(id) {
            scene.backend.move_to_index(visual.group, at);
        }
        Some(at)
    }

    /// Move a card's group to the top and re-rank every model.
    ///
    /// Observers are not notified; the next [`Self::normalize`] reports the
    /// new ordering.
    pub fn bring_to_front(&mut self, scene: &mut Scene<'_>, id: &str) -> Option<usize> {
        let at = self.zorder.bring_to_front(id)?;
        if let Some(visual) = self.visuals.get(id) {
            scene.backend.move_to_index(visual.group, at);
        }
        self.zorder.write_ranks(&mut self.models);
        Some(at)
    }

    fn sync_stack(&self, scene: &mut Scene<'_>) {
        for (index, id) in self.zorder.ids().iter().enumerate() {
            if let Some(visual) = self.visuals.get(id) {
                scene.backend.move_to_index(visual.group, index);
            }
        }
    }

    /// Refresh every model's `z` and return the ordering if it changed.
    pub fn normalize(&mut self) -> Option<Vec<CardOrder>> {
        self.zorder.normalize(&mut self.models)
    }

    // =============================================================
    // Drag, highlight, images
    // =============================================================

    /// Move a card's center, clamped to the world. Returns the stored center.
    pub fn move_card(&mut self, scene: &mut Scene<'_>, id: &str, center: Point) -> Option<Point> {
        let model = self.models.get_mut(id)?;
        let clamped = clamp_center(center.x, center.y, model.w, model.h, self.world);
        model.cx = clamped.x;
        model.cy = clamped.y;
        if let Some(visual) = self.visuals.get(id) {
            apply_transform(scene.backend, visual.group, model);
        }
        Some(clamped)
    }

    /// Highlight `id` (or nothing), clearing any previous highlight.
    pub fn set_highlight(&mut self, scene: &mut Scene<'_>, id: Option<&str>) {
        if let Some(prev) = self.highlighted.take()
            && let (Some(model), Some(visual)) = (self.models.get(&prev), self.visuals.get(&prev))
        {
            apply_highlight(scene.backend, visual.skin.body, model, false);
        }
        let Some(id) = id else {
            return;
        };
        if let (Some(model), Some(visual)) = (self.models.get(id), self.visuals.get(id)) {
            apply_highlight(scene.backend, visual.skin.body, model, true);
            self.highlighted = Some(id.to_owned());
        }
    }

    /// Replace the shared body shadow on every card.
    pub fn set_shadow(&mut self, scene: &mut Scene<'_>, shadow: Shadow) {
        for visual in self.visuals.values() {
            scene.backend.set_attr(visual.skin.body, Attr::Shadow(shadow.clone()));
        }
        self.shadow = shadow;
    }

    /// Apply the outcome of an image load. Returns `false` for stale reports.
    ///
    /// Success fits the image into the square slot, preserving aspect and
    /// centering it. Failure hides the slot; there is no retry.
    pub fn on_image_loaded(
        &mut self,
        scene: &mut Scene<'_>,
        id: &str,
        token: u64,
        result: Result<ImageSize, ImageError>,
    ) -> bool {
        let Some(visual) = self.visuals.get_mut(id) else {
            tracing::debug!(card = id, token, "image result for removed card");
            return false;
        };
        if visual.image_token != Some(token) {
            tracing::debug!(card = id, token, "stale image result");
            return false;
        }
        visual.image_token = None;
        let visual = *visual;

        match result.and_then(validate_image) {
            Ok(image) => {
                let Some(model) = self.models.get(id) else {
                    return false;
                };
                let frame = slot_frame(model, visual.skin.header_height, self.defaults.image_slot);
                let scale = (frame.size.width / image.width).min(frame.size.height / image.height);
                let drawn = Size::new(image.width * scale, image.height * scale);
                let origin = frame
                    .origin
                    .add(Point::new((frame.size.width - drawn.width) * 0.5, (frame.size.height - drawn.height) * 0.5));
                scene.backend.set_attr(visual.img, Attr::Position(origin));
                scene.backend.set_attr(visual.img, Attr::Size(drawn));
                scene.backend.set_attr(visual.img, Attr::Visible(true));
            }
            Err(error) => {
                tracing::warn!(card = id, %error, "image failed to load; hiding slot");
                scene.backend.set_attr(visual.img, Attr::Visible(false));
                scene.backend.set_attr(visual.img_frame, Attr::Visible(false));
            }
        }
        true
    }
}

/// Where a card's image slot sits in group-local coordinates: a square
/// centered horizontally in the body area below the header.
struct SlotFrame {
    origin: Point,
    size: Size,
    header_height: f64,
}

fn slot_frame(model: &CardModel, header_height: f64, image_slot: f64) -> SlotFrame {
    let size = model.size();
    let header = header_height.max(0.0).min(size.height);
    let slot = image_slot.min(size.width).min(size.height - header);
    SlotFrame {
        origin: Point::new(-slot * 0.5, -size.height * 0.5 + header + (size.height - header - slot) * 0.5),
        size: Size::new(slot, slot),
        header_height: header,
    }
}

fn validate_image(size: ImageSize) -> Result<ImageSize, ImageError> {
    if size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0 {
        Ok(size)
    } else {
        Err(ImageError::EmptyImage)
    }
}

fn apply_transform(backend: &mut dyn RenderBackend, group: NodeId, model: &CardModel) {
    backend.set_attr(group, Attr::Position(model.center()));
    backend.set_attr(group, Attr::Rotation(model.rot));
}

fn apply_highlight(backend: &mut dyn RenderBackend, body: NodeId, model: &CardModel, on: bool) {
    if on {
        backend.set_attr(body, Attr::Stroke(SELECTION_STROKE.to_owned()));
        backend.set_attr(body, Attr::StrokeWidth(SELECTION_STROKE_WIDTH));
    } else {
        backend.set_attr(body, Attr::Stroke(model.stroke.clone()));
        backend.set_attr(body, Attr::StrokeWidth(model.stroke_width));
    }
}

fn valid_id(id: &str) -> bool {
    if id.is_empty() {
        tracing::warn!("dropping card without an id");
        return false;
    }
    true
}
