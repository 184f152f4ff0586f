use std::path::{Path, PathBuf};

use seating_rs_planner::{
    AssetCatalog, GestureKind, LayoutError, Mode, NoAssets, Point, Session, parse_layout,
};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn read_fixture(rel: &str) -> String {
    std::fs::read_to_string(fixtures().join(rel)).expect("fixture read failed")
}

fn session_with_fixtures(layout: Option<&str>) -> Session {
    let mut session = Session::default();
    session.load_roster_text(&read_fixture("rosters/class1.txt"), "rosters/class1.txt");
    if let Some(rel) = layout {
        session
            .load_layout_str(&read_fixture(rel))
            .expect("layout fixture should parse");
    }
    session
}

fn seat_names(session: &mut Session) -> Vec<Option<String>> {
    session
        .render()
        .seats
        .iter()
        .map(|seat| seat.entry.as_ref().map(|entry| entry.name.clone()))
        .collect()
}

#[test]
fn roster_fixture_parses_rows_and_names() {
    let session = session_with_fixtures(None);
    let roster = session.roster();
    assert_eq!(roster.row_count(), 3);
    assert_eq!(roster.len(), 6);
    assert_eq!(roster.name_at(1), Some("Alan Turing"));
    assert_eq!(session.status(), "Parsed 3 row(s) from rosters/class1.txt.");
}

#[test]
fn named_seats_bind_before_sequential_fill() {
    let mut session = session_with_fixtures(Some("layouts/u_shape.json"));
    let names = seat_names(&mut session);
    assert_eq!(
        names,
        vec![
            Some("Grace Hopper".to_string()),
            Some("Ada Lovelace".to_string()),
            Some("Alan Turing".to_string()),
            Some("Edsger Dijkstra".to_string()),
            Some("Donald Knuth".to_string()),
        ]
    );
    let scene = session.scene().unwrap();
    assert_eq!(scene.unplaced.len(), 1);
    assert_eq!(scene.unplaced[0].name, "Barbara Liskov");
}

#[test]
fn named_seat_follows_swapped_name() {
    let mut session = session_with_fixtures(Some("layouts/u_shape.json"));
    // Grace (2) trades roster places with Ada (0) but keeps the seat named for her.
    session.click_seat(0);
    session.click_seat(2);
    let names = seat_names(&mut session);
    assert_eq!(names[0].as_deref(), Some("Grace Hopper"));
    assert_eq!(names[1].as_deref(), Some("Alan Turing"));
    assert_eq!(names[2].as_deref(), Some("Ada Lovelace"));
    assert_eq!(
        session.export_roster_text(),
        "Grace Hopper,Alan Turing,Ada Lovelace\nEdsger Dijkstra,Barbara Liskov\nDonald Knuth"
    );
}

#[test]
fn sequential_swap_moves_names_between_seats() {
    let mut session = session_with_fixtures(None);
    session.click_seat(1);
    session.click_seat(4);
    let names = seat_names(&mut session);
    assert_eq!(names[1].as_deref(), Some("Barbara Liskov"));
    assert_eq!(names[4].as_deref(), Some("Alan Turing"));
}

#[test]
fn json5_layout_is_accepted() {
    let layout = parse_layout(&read_fixture("layouts/pairs.json5")).unwrap();
    assert_eq!(layout.name, "Pairs");
    assert_eq!(layout.slots[1].r, 90.0);
}

#[test]
fn invalid_slot_is_rejected_and_grid_stays() {
    let mut session = session_with_fixtures(None);
    let err = session
        .load_layout_str(&read_fixture("layouts/broken.json"))
        .unwrap_err();
    assert!(matches!(err, LayoutError::InvalidSlot { index: 0, .. }));
    assert!(session.layout().is_none());
    assert!(session.render().synthesized);
}

#[test]
fn picture_directory_prefers_jpg() {
    let catalog = AssetCatalog::scan_directory(&fixtures().join("pics")).unwrap();
    assert_eq!(catalog.len(), 2);
    assert!(catalog.get("ada lovelace").unwrap().href.ends_with("ada lovelace.jpg"));
    assert!(catalog.get("Grace Hopper").unwrap().href.ends_with("Grace Hopper.JPEG"));
}

#[test]
fn rendered_chart_marks_missing_pictures() {
    let catalog = AssetCatalog::scan_directory(&fixtures().join("pics")).unwrap();
    let mut session = session_with_fixtures(Some("layouts/u_shape.json"));
    let svg = session.render_svg(&catalog);
    assert!(svg.contains("ada lovelace.jpg"));
    assert!(svg.contains("Alan Turing (No image found)"));
    assert!(!svg.contains("Barbara Liskov"));
    assert!(svg.contains("rotate(-15.00 100.00 100.00)"));
    assert_eq!(catalog.outstanding(), 0);

    let plain = session.render_svg(&NoAssets);
    assert!(plain.contains("Ada Lovelace (No image found)"));
}

#[test]
fn edited_layout_exports_and_reloads() {
    let mut session = session_with_fixtures(Some("layouts/u_shape.json"));
    session.set_mode(Mode::Edit);
    assert!(session.pointer_down(1, 1, GestureKind::Translate, Point::new(300.0, 80.0)));
    assert!(session.pointer_down(2, 4, GestureKind::Resize, Point::new(600.0, 420.0)));
    session.pointer_move(1, Point::new(320.0, 100.0));
    session.pointer_move(2, Point::new(630.0, 440.0));
    session.pointer_up(1, Point::new(320.0, 100.0));
    session.pointer_up(2, Point::new(630.0, 440.0));

    let json = session.export_layout_json().unwrap();
    let reloaded = parse_layout(&json).unwrap();
    assert_eq!(reloaded.name, "U shape");
    assert_eq!((reloaded.slots[1].x, reloaded.slots[1].y), (280.0, 60.0));
    assert_eq!((reloaded.slots[4].w, reloaded.slots[4].h), (150.0, 140.0));
    assert_eq!(reloaded.slots[0].id.as_deref(), Some("grace hopper"));

    let mut fresh = Session::default();
    fresh.load_roster_text(&read_fixture("rosters/class1.txt"), "class1.txt");
    fresh.load_layout_str(&json).unwrap();
    assert_eq!(fresh.export_layout(), reloaded);
}

#[test]
fn default_grid_export_uses_default_name() {
    let session = session_with_fixtures(None);
    let layout = parse_layout(&session.export_layout_json().unwrap()).unwrap();
    assert_eq!(layout.name, "layout");
    assert_eq!(layout.slots.len(), 6);
    assert_eq!(session.export_roster_file_name(), "class1-updated.txt");
}
