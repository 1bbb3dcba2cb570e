#![allow(clippy::float_cmp)]

use super::*;
use crate::consts::DEFAULT_STROKE;
use crate::headless::MemoryBackend;
use crate::render::Layer;
use crate::skin::DefaultSkinFactory;

struct Fixture {
    backend: MemoryBackend,
    layer: NodeId,
    reg: ShapeRegistry,
}

impl Fixture {
    fn new() -> Self {
        let mut backend = MemoryBackend::new();
        let layer = backend.create_layer(Layer::Cards);
        let reg = ShapeRegistry::new(layer, Size::new(6000.0, 6000.0), CardDefaults::default());
        Self { backend, layer, reg }
    }

    fn snapshot(&mut self, cards: Vec<PartialCard>) -> Option<Vec<CardOrder>> {
        let mut scene = Scene { backend: &mut self.backend, skins: &DefaultSkinFactory };
        self.reg.apply_snapshot(&mut scene, cards)
    }

    fn patch(&mut self, patch: CardPatch) -> Option<Vec<CardOrder>> {
        let mut scene = Scene { backend: &mut self.backend, skins: &DefaultSkinFactory };
        self.reg.apply_patch(&mut scene, patch)
    }

    fn image(&mut self, id: &str, token: u64, result: Result<ImageSize, ImageError>) -> bool {
        let mut scene = Scene { backend: &mut self.backend, skins: &DefaultSkinFactory };
        self.reg.on_image_loaded(&mut scene, id, token, result)
    }

    /// Card ids in the order of the card layer's children.
    fn layer_ids(&self) -> Vec<String> {
        self.backend
            .children(self.layer)
            .iter()
            .filter_map(|g| {
                self.reg.get_cards().into_iter().find(|c| self.reg.visual(&c.id).map(|v| v.group) == Some(*g))
            })
            .map(|c| c.id)
            .collect()
    }

    fn order_ids(&self) -> Vec<String> {
        self.reg.get_card_order().into_iter().map(|o| o.id).collect()
    }

    fn body(&self, id: &str) -> NodeId {
        self.reg.visual(id).unwrap().skin.body
    }
}

fn card(id: &str, z: Option<i64>) -> PartialCard {
    PartialCard { cx: Some(1000.0), cy: Some(1000.0), z, ..PartialCard::new(id) }
}

fn three() -> Fixture {
    let mut f = Fixture::new();
    f.snapshot(vec![card("A", Some(0)), card("B", Some(1)), card("C", Some(2))]);
    f
}

// =============================================================
// Snapshot
// =============================================================

#[test]
fn snapshot_orders_by_z() {
    let mut f = Fixture::new();
    let order = f.snapshot(vec![card("C", Some(2)), card("A", Some(0)), card("B", Some(1))]).unwrap();
    assert_eq!(
        order,
        vec![
            CardOrder { id: "A".into(), z: 0 },
            CardOrder { id: "B".into(), z: 1 },
            CardOrder { id: "C".into(), z: 2 }
        ]
    );
    assert_eq!(f.layer_ids(), vec!["A", "B", "C"]);
    assert_eq!(f.reg.get_shape_model("C").unwrap().z, 2);
}

#[test]
fn snapshot_missing_z_sorts_as_zero_and_keeps_input_order() {
    let mut f = Fixture::new();
    f.snapshot(vec![card("X", None), card("Y", Some(1)), card("Z", None)]);
    assert_eq!(f.order_ids(), vec!["X", "Z", "Y"]);
    assert_eq!(f.layer_ids(), vec!["X", "Z", "Y"]);
}

#[test]
fn snapshot_is_idempotent() {
    let mut f = Fixture::new();
    let cards = vec![card("A", Some(0)), card("B", Some(1))];
    assert!(f.snapshot(cards.clone()).is_some());
    let before = f.reg.get_cards();
    let nodes = f.backend.node_count();
    let body = f.body("A");

    assert!(f.snapshot(cards).is_none());
    assert_eq!(f.reg.get_cards(), before);
    assert_eq!(f.backend.node_count(), nodes);
    assert_eq!(f.body("A"), body);
}

#[test]
fn snapshot_removes_absent_cards() {
    let mut f = three();
    let group_b = f.reg.visual("B").unwrap().group;
    let order = f.snapshot(vec![card("A", Some(0)), card("C", Some(2))]).unwrap();
    assert_eq!(order, vec![CardOrder { id: "A".into(), z: 0 }, CardOrder { id: "C".into(), z: 1 }]);
    assert!(!f.reg.contains("B"));
    assert!(!f.backend.contains(group_b));
    assert_eq!(f.backend.children(f.layer).len(), 2);
}

#[test]
fn snapshot_reorders_existing_cards() {
    let mut f = three();
    f.snapshot(vec![card("A", Some(2)), card("B", Some(0)), card("C", Some(1))]);
    assert_eq!(f.order_ids(), vec!["B", "C", "A"]);
    assert_eq!(f.layer_ids(), vec!["B", "C", "A"]);
}

#[test]
fn snapshot_clamps_new_cards() {
    let mut f = Fixture::new();
    f.snapshot(vec![PartialCard { cx: Some(-100.0), cy: Some(-100.0), ..PartialCard::new("A") }]);
    let a = f.reg.get_shape_model("A").unwrap();
    assert_eq!((a.cx, a.cy), (150.0, 75.0));
    let group = f.reg.visual("A").unwrap().group;
    assert_eq!(f.backend.attrs(group).unwrap().position, Point::new(150.0, 75.0));
}

#[test]
fn snapshot_skips_empty_ids() {
    let mut f = Fixture::new();
    f.snapshot(vec![card("", Some(0)), card("A", Some(1))]);
    assert_eq!(f.reg.len(), 1);
    assert!(f.reg.contains("A"));
}

#[test]
fn snapshot_applies_defaults() {
    let mut f = Fixture::new();
    f.snapshot(vec![PartialCard::new("A")]);
    let a = f.reg.get_shape_model("A").unwrap();
    assert_eq!(a.kind, "card");
    assert_eq!((a.w, a.h), (300.0, 150.0));
    assert_eq!(a.style_key, "classic");
}

// =============================================================
// Patch
// =============================================================

#[test]
fn patch_remove_closes_gap() {
    let mut f = three();
    let order = f.patch(CardPatch { remove: vec!["B".into()], ..CardPatch::default() }).unwrap();
    assert_eq!(order, vec![CardOrder { id: "A".into(), z: 0 }, CardOrder { id: "C".into(), z: 1 }]);
}

#[test]
fn patch_unknown_remove_is_noop() {
    let mut f = three();
    assert!(f.patch(CardPatch { remove: vec!["nope".into()], ..CardPatch::default() }).is_none());
    assert_eq!(f.reg.len(), 3);
}

#[test]
fn patch_removes_before_adding() {
    let mut f = three();
    // Re-adding a removed id in the same patch creates a fresh card.
    let old_group = f.reg.visual("B").unwrap().group;
    f.patch(CardPatch {
        add: vec![PartialCard { title: Some("again".into()), ..PartialCard::new("B") }],
        remove: vec!["B".into()],
        ..CardPatch::default()
    });
    assert!(!f.backend.contains(old_group));
    let b = f.reg.get_shape_model("B").unwrap();
    assert_eq!(b.title, "again");
    assert_eq!(b.cx, 150.0);
    assert_eq!(f.order_ids(), vec!["A", "C", "B"]);
}

#[test]
fn patch_adds_before_updating() {
    let mut f = Fixture::new();
    f.patch(CardPatch {
        add: vec![PartialCard { title: Some("first".into()), ..PartialCard::new("N") }],
        update: vec![PartialCard { title: Some("second".into()), ..PartialCard::new("N") }],
        ..CardPatch::default()
    });
    assert_eq!(f.reg.get_shape_model("N").unwrap().title, "second");
}

#[test]
fn patch_add_with_z_inserts_at_rank() {
    let mut f = three();
    f.patch(CardPatch { add: vec![card("D", Some(1))], ..CardPatch::default() });
    assert_eq!(f.order_ids(), vec!["A", "D", "B", "C"]);
    assert_eq!(f.layer_ids(), vec!["A", "D", "B", "C"]);

    f.patch(CardPatch { add: vec![card("E", Some(99))], ..CardPatch::default() });
    assert_eq!(f.order_ids().last().map(String::as_str), Some("E"));
}

#[test]
fn patch_add_without_z_goes_on_top() {
    let mut f = three();
    f.patch(CardPatch { add: vec![card("D", None)], ..CardPatch::default() });
    assert_eq!(f.order_ids(), vec!["A", "B", "C", "D"]);
}

#[test]
fn patch_update_with_z_moves_existing() {
    let mut f = three();
    f.patch(CardPatch { update: vec![card("C", Some(0))], ..CardPatch::default() });
    assert_eq!(f.order_ids(), vec!["C", "A", "B"]);
    assert_eq!(f.layer_ids(), vec!["C", "A", "B"]);

    f.patch(CardPatch { update: vec![card("C", Some(50))], ..CardPatch::default() });
    assert_eq!(f.order_ids(), vec!["A", "B", "C"]);
}

#[test]
fn ranks_stay_dense_across_patches() {
    let mut f = three();
    f.patch(CardPatch {
        add: vec![card("D", Some(7)), card("E", Some(-3))],
        update: vec![card("A", Some(2))],
        remove: vec!["B".into()],
    });
    let order = f.reg.get_card_order();
    let mut zs: Vec<usize> = order.iter().map(|o| o.z).collect();
    zs.sort_unstable();
    assert_eq!(zs, vec![0, 1, 2, 3]);
    for entry in &order {
        assert_eq!(f.reg.get_shape_model(&entry.id).unwrap().z, entry.z);
    }
    assert_eq!(f.order_ids(), f.layer_ids());
}

// =============================================================
// Visual updates
// =============================================================

#[test]
fn title_change_updates_text_in_place() {
    let mut f = three();
    let body = f.body("A");
    f.patch(CardPatch { update: vec![PartialCard { title: Some("Hello".into()), ..PartialCard::new("A") }], ..CardPatch::default() });
    assert_eq!(f.body("A"), body);
    let title = f.reg.visual("A").unwrap().title;
    assert_eq!(f.backend.attrs(title).unwrap().text, "Hello");
}

#[test]
fn move_updates_group_transform_only() {
    let mut f = three();
    let body = f.body("A");
    let group = f.reg.visual("A").unwrap().group;
    f.patch(CardPatch {
        update: vec![PartialCard { cx: Some(2000.0), rot: Some(15.0), ..PartialCard::new("A") }],
        ..CardPatch::default()
    });
    assert_eq!(f.body("A"), body);
    let attrs = f.backend.attrs(group).unwrap();
    assert_eq!(attrs.position, Point::new(2000.0, 1000.0));
    assert_eq!(attrs.rotation, 15.0);
}

#[test]
fn size_change_rebuilds_in_same_group() {
    let mut f = three();
    let body = f.body("A");
    let group = f.reg.visual("A").unwrap().group;
    f.patch(CardPatch { update: vec![PartialCard { w: Some(500.0), ..PartialCard::new("A") }], ..CardPatch::default() });

    let visual = *f.reg.visual("A").unwrap();
    assert_eq!(visual.group, group);
    assert_ne!(visual.skin.body, body);
    assert!(!f.backend.contains(body));
    assert_eq!(f.backend.attrs(visual.skin.body).unwrap().size, Size::new(500.0, 150.0));
    assert_eq!(f.backend.children(group).len(), 5);
    assert_eq!(f.layer_ids(), vec!["A", "B", "C"]);
}

#[test]
fn style_change_rebuilds() {
    let mut f = three();
    let body = f.body("B");
    f.patch(CardPatch {
        update: vec![PartialCard { style_key: Some("sharp".into()), ..PartialCard::new("B") }],
        ..CardPatch::default()
    });
    assert_ne!(f.body("B"), body);
    assert_eq!(f.backend.attrs(f.body("B")).unwrap().corner_radius, 0.0);
}

#[test]
fn invalid_size_is_dropped() {
    let mut f = three();
    let body = f.body("A");
    f.patch(CardPatch {
        update: vec![PartialCard { w: Some(-5.0), h: Some(f64::NAN), ..PartialCard::new("A") }],
        ..CardPatch::default()
    });
    assert_eq!(f.body("A"), body);
    let a = f.reg.get_shape_model("A").unwrap();
    assert_eq!((a.w, a.h), (300.0, 150.0));
}

// =============================================================
// Images
// =============================================================

fn with_image() -> (Fixture, u64) {
    let mut f = Fixture::new();
    f.snapshot(vec![PartialCard { img: Some("https://img.example/a.png".into()), ..card("A", Some(0)) }]);
    let requests = f.backend.take_image_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].card_id, "A");
    assert_eq!(requests[0].url, "https://img.example/a.png");
    (f, requests[0].token)
}

#[test]
fn loaded_image_fits_slot() {
    let (mut f, token) = with_image();
    assert!(f.image("A", token, Ok(ImageSize { width: 144.0, height: 72.0 })));
    let img = f.reg.visual("A").unwrap().img;
    let attrs = f.backend.attrs(img).unwrap();
    assert!(attrs.visible);
    assert_eq!(attrs.size, Size::new(72.0, 36.0));
    assert_eq!(attrs.position, Point::new(-36.0, -2.0));
}

#[test]
fn duplicate_report_is_ignored() {
    let (mut f, token) = with_image();
    assert!(f.image("A", token, Ok(ImageSize { width: 10.0, height: 10.0 })));
    assert!(!f.image("A", token, Ok(ImageSize { width: 10.0, height: 10.0 })));
}

#[test]
fn failed_image_hides_slot() {
    let (mut f, token) = with_image();
    assert!(f.image("A", token, Err(ImageError::Network("404".into()))));
    let visual = *f.reg.visual("A").unwrap();
    assert!(!f.backend.attrs(visual.img).unwrap().visible);
    assert!(!f.backend.attrs(visual.img_frame).unwrap().visible);
}

#[test]
fn zero_sized_image_is_a_failure() {
    let (mut f, token) = with_image();
    assert!(f.image("A", token, Ok(ImageSize { width: 0.0, height: 10.0 })));
    let visual = *f.reg.visual("A").unwrap();
    assert!(!f.backend.attrs(visual.img_frame).unwrap().visible);
}

#[test]
fn rebuild_reacquires_image_and_invalidates_old_token() {
    let (mut f, old) = with_image();
    f.patch(CardPatch { update: vec![PartialCard { stroke: Some("#ff0000".into()), ..PartialCard::new("A") }], ..CardPatch::default() });
    let requests = f.backend.take_image_requests();
    assert_eq!(requests.len(), 1);
    let new = requests[0].token;
    assert_ne!(new, old);

    assert!(!f.image("A", old, Ok(ImageSize { width: 10.0, height: 10.0 })));
    assert!(f.image("A", new, Ok(ImageSize { width: 10.0, height: 10.0 })));
}

#[test]
fn image_for_removed_card_is_ignored() {
    let (mut f, token) = with_image();
    f.patch(CardPatch { remove: vec!["A".into()], ..CardPatch::default() });
    assert!(!f.image("A", token, Ok(ImageSize { width: 10.0, height: 10.0 })));
}

#[test]
fn clearing_image_hides_frame_without_request() {
    let (mut f, _) = with_image();
    f.patch(CardPatch { update: vec![PartialCard { img: Some(String::new()), ..PartialCard::new("A") }], ..CardPatch::default() });
    assert!(f.backend.take_image_requests().is_empty());
    let visual = *f.reg.visual("A").unwrap();
    assert!(!f.backend.attrs(visual.img_frame).unwrap().visible);
    assert_eq!(visual.image_token, None);
}

// =============================================================
// Drag support
// =============================================================

#[test]
fn bring_to_front_reranks_every_card() {
    let mut f = three();
    let mut scene = Scene { backend: &mut f.backend, skins: &DefaultSkinFactory };
    assert_eq!(f.reg.bring_to_front(&mut scene, "A"), Some(2));
    let ranks: Vec<(String, usize)> = f.reg.get_cards().into_iter().map(|c| (c.id, c.z)).collect();
    assert_eq!(ranks, vec![("B".to_owned(), 0), ("C".to_owned(), 1), ("A".to_owned(), 2)]);
    assert_eq!(f.layer_ids(), vec!["B", "C", "A"]);
    let order = f.reg.normalize().unwrap();
    assert_eq!(order[0], CardOrder { id: "B".into(), z: 0 });
}

#[test]
fn move_card_clamps_and_moves_group() {
    let mut f = three();
    let mut scene = Scene { backend: &mut f.backend, skins: &DefaultSkinFactory };
    let at = f.reg.move_card(&mut scene, "A", Point::new(10.0, 99_999.0)).unwrap();
    assert_eq!(at, Point::new(150.0, 6000.0 - 75.0));
    let group = f.reg.visual("A").unwrap().group;
    assert_eq!(f.backend.attrs(group).unwrap().position, at);

    let mut scene = Scene { backend: &mut f.backend, skins: &DefaultSkinFactory };
    assert!(f.reg.move_card(&mut scene, "ghost", Point::new(0.0, 0.0)).is_none());
}

#[test]
fn hit_test_finds_front_most() {
    let f = three();
    assert_eq!(f.reg.hit_test(Point::new(1000.0, 1000.0)), Some("C"));
    assert_eq!(f.reg.hit_test(Point::new(10.0, 10.0)), None);
}

// =============================================================
// Highlight and shadow
// =============================================================

#[test]
fn highlight_moves_between_cards() {
    let mut f = three();
    let mut scene = Scene { backend: &mut f.backend, skins: &DefaultSkinFactory };
    f.reg.set_highlight(&mut scene, Some("A"));
    assert_eq!(f.backend.attrs(f.body("A")).unwrap().stroke.as_deref(), Some(SELECTION_STROKE));

    let mut scene = Scene { backend: &mut f.backend, skins: &DefaultSkinFactory };
    f.reg.set_highlight(&mut scene, Some("B"));
    assert_eq!(f.backend.attrs(f.body("A")).unwrap().stroke.as_deref(), Some(DEFAULT_STROKE));
    assert_eq!(f.backend.attrs(f.body("B")).unwrap().stroke_width, SELECTION_STROKE_WIDTH);

    let mut scene = Scene { backend: &mut f.backend, skins: &DefaultSkinFactory };
    f.reg.set_highlight(&mut scene, None);
    assert_eq!(f.backend.attrs(f.body("B")).unwrap().stroke.as_deref(), Some(DEFAULT_STROKE));
}

#[test]
fn highlight_survives_rebuild() {
    let mut f = three();
    let mut scene = Scene { backend: &mut f.backend, skins: &DefaultSkinFactory };
    f.reg.set_highlight(&mut scene, Some("A"));
    f.patch(CardPatch { update: vec![PartialCard { h: Some(200.0), ..PartialCard::new("A") }], ..CardPatch::default() });
    assert_eq!(f.backend.attrs(f.body("A")).unwrap().stroke.as_deref(), Some(SELECTION_STROKE));
}

#[test]
fn shadow_applies_to_existing_and_new_cards() {
    let mut f = three();
    let shadow = Shadow { color: "#333333".into(), blur: 20.0, offset: Point::new(4.0, 4.0), opacity: 0.5 };
    let mut scene = Scene { backend: &mut f.backend, skins: &DefaultSkinFactory };
    f.reg.set_shadow(&mut scene, shadow.clone());
    assert_eq!(f.backend.attrs(f.body("A")).unwrap().shadow.as_ref(), Some(&shadow));

    f.patch(CardPatch { add: vec![card("D", None)], ..CardPatch::default() });
    assert_eq!(f.backend.attrs(f.body("D")).unwrap().shadow.as_ref(), Some(&shadow));
}
