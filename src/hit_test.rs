use super::*;
use crate::config::CardDefaults;

fn card_at(id: &str, cx: f64, cy: f64, w: f64, h: f64, rot: f64) -> CardModel {
    CardModel { cx, cy, w, h, rot, ..CardModel::new(id, &CardDefaults::default()) }
}

// =============================================================
// card_contains
// =============================================================

#[test]
fn contains_center_and_edges() {
    let card = card_at("A", 500.0, 500.0, 300.0, 150.0, 0.0);
    assert!(card_contains(&card, Point::new(500.0, 500.0)));
    assert!(card_contains(&card, Point::new(650.0, 575.0)));
    assert!(!card_contains(&card, Point::new(651.0, 500.0)));
    assert!(!card_contains(&card, Point::new(500.0, 576.0)));
}

#[test]
fn rotation_is_respected() {
    // A 300x20 bar rotated 90 degrees becomes a 20x300 bar.
    let card = card_at("A", 500.0, 500.0, 300.0, 20.0, 90.0);
    assert!(card_contains(&card, Point::new(500.0, 640.0)));
    assert!(!card_contains(&card, Point::new(640.0, 500.0)));
}

#[test]
fn rotated_corner_outside_unrotated_box() {
    let card = card_at("A", 0.0, 0.0, 100.0, 100.0, 45.0);
    // The unrotated corner (49, 49) falls outside a diamond of half-diagonal ~70.7.
    assert!(!card_contains(&card, Point::new(49.0, 49.0)));
    assert!(card_contains(&card, Point::new(0.0, 70.0)));
}

// =============================================================
// hit_test
// =============================================================

#[test]
fn hit_test_prefers_front_most() {
    let mut models = HashMap::new();
    models.insert("back".to_owned(), card_at("back", 500.0, 500.0, 300.0, 150.0, 0.0));
    models.insert("front".to_owned(), card_at("front", 550.0, 500.0, 300.0, 150.0, 0.0));
    let stack = vec!["back".to_owned(), "front".to_owned()];

    assert_eq!(hit_test(Point::new(550.0, 500.0), &stack, &models).map(String::as_str), Some("front"));
    assert_eq!(hit_test(Point::new(360.0, 500.0), &stack, &models).map(String::as_str), Some("back"));
}

#[test]
fn hit_test_empty_space_is_none() {
    let mut models = HashMap::new();
    models.insert("A".to_owned(), card_at("A", 500.0, 500.0, 100.0, 100.0, 0.0));
    let stack = vec!["A".to_owned()];
    assert!(hit_test(Point::new(10.0, 10.0), &stack, &models).is_none());
}

#[test]
fn hit_test_skips_ids_without_models() {
    let models = HashMap::new();
    let stack = vec!["ghost".to_owned()];
    assert!(hit_test(Point::new(0.0, 0.0), &stack, &models).is_none());
}
