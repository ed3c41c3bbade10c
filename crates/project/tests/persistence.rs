use proptest::prelude::*;
use serde_json::json;
use sq_app_state::{AppState, Layer, LayerKind, Marker, Region, Shot, Tool};
use sq_common::BlendMode;
use sq_project::{
    apply_to_state, export_to_file, load_project, parse, save_project, to_json_string,
    validate_compatibility, ProjectError,
};

fn populated_state() -> AppState {
    let mut state = AppState::new();
    state.project.name = "Harbor Lights".into();
    state.project.frame_rate = 30.0;

    let mut opening = Shot::new("Opening", 0.0, 90.0);
    opening.prompt = "fog rolling over a harbor at night".into();
    let opening_id = opening.id.clone();
    state.timeline.add_shot(opening);
    state.timeline.add_shot(Shot::new("Lighthouse", 90.0, 45.0));

    let mut glow = Layer::new("Glow", LayerKind::Adjustment);
    glow.blend_mode = BlendMode::Screen;
    glow.opacity = 0.4;
    state.timeline.add_layer(&opening_id, glow);

    state.timeline.add_marker(Marker::new(30.0, "Horn"));
    state.timeline.add_region(Region::new(0.0, 90.0, "Act I"));
    state.timeline.select_one(&opening_id, false);
    state.timeline.set_playhead(12.0);
    state.timeline.set_zoom(2.5);
    state.tools.active = Tool::Razor;
    state
}

#[test]
fn file_roundtrip_restores_all_five_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harbor.seq.json");
    let state = populated_state();

    save_project(&export_to_file(&state, "1.2.0"), &path).unwrap();
    let loaded = load_project(&path, "1.2.0").unwrap();
    assert!(loaded.warnings.is_empty());

    let mut restored = AppState::new();
    let applied = apply_to_state(loaded.file, &mut restored);
    assert_eq!(applied.len(), 5);
    assert_eq!(restored.timeline, state.timeline);
    assert_eq!(restored.project, state.project);
    assert_eq!(restored.assets, state.assets);
    assert_eq!(restored.panels, state.panels);
    assert_eq!(restored.tools, state.tools);
    assert_eq!(restored.timeline.duration(), 135.0);
}

#[test]
fn parse_of_export_is_deep_equal() {
    let exported = export_to_file(&populated_state(), "1.2.0");
    let parsed = parse(&to_json_string(&exported).unwrap()).unwrap();
    assert_eq!(parsed, exported);
}

#[test]
fn schema_two_is_incompatible() {
    let mut file = export_to_file(&AppState::new(), "1.0.0");
    file.schema_version = "2.0".into();
    let report = validate_compatibility(&file, "1.0.0");
    assert!(!report.compatible);
    assert!(report.errors.iter().any(|e| e.contains("2.0")));

    // Parsing the same text fails early with the typed error.
    let err = parse(&serde_json::to_string(&file).unwrap()).unwrap_err();
    assert!(matches!(err, ProjectError::UnsupportedSchema { .. }));
}

#[test]
fn missing_timeline_is_incompatible() {
    let raw = json!({
        "version": "1.0.0",
        "schema_version": "1.0",
        "project": { "name": "No Timeline" },
        "assets": {},
        "panels": {},
        "tools": {}
    });
    let file = parse(&raw.to_string()).unwrap();
    let report = validate_compatibility(&file, "1.0.0");
    assert!(!report.compatible);
    assert!(report.errors.iter().any(|e| e.contains("timeline")));
}

#[test]
fn newer_writer_is_compatible_with_warning() {
    let file = export_to_file(&AppState::new(), "1.5.0");
    let report = validate_compatibility(&file, "1.0.0");
    assert!(report.compatible);
    assert!(!report.warnings.is_empty());
}

#[test]
fn failed_load_leaves_nothing_applied() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.seq.json");
    std::fs::write(&path, r#"{ "version": "1.0.0", "schema_version": "1.0", "timeline": "#).unwrap();

    let state = populated_state();
    let before = state.timeline.clone();
    let err = load_project(&path, "1.0.0").unwrap_err();
    assert!(matches!(err, ProjectError::Format(_)));
    assert_eq!(state.timeline, before);
}

#[test]
fn hand_written_file_with_sparse_sections_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sparse.seq.json");
    let raw = json!({
        "version": "1.0.0",
        "schema_version": "1.0",
        "created": "2026-01-05T10:00:00Z",
        "project": { "name": "Sparse" },
        "timeline": {
            "shots": [
                { "id": "s1", "name": "One", "startTime": 0, "duration": 24 },
                { "id": "s2", "name": "Two", "startTime": 24, "duration": 24 }
            ],
            "selection": { "selectedIds": ["s2", "s2"] }
        },
        "assets": { "items": [] },
        "panels": { "inspectorVisible": false },
        "tools": { "active": "hand" }
    });
    std::fs::write(&path, raw.to_string()).unwrap();

    let loaded = load_project(&path, "1.0.0").unwrap();
    let mut state = AppState::new();
    apply_to_state(loaded.file, &mut state);

    assert_eq!(state.timeline.duration(), 48.0);
    assert_eq!(state.timeline.selection().selected_ids(), ["s2"]);
    assert!(!state.panels.inspector_visible);
    assert_eq!(state.tools.active, Tool::Hand);
    assert_eq!(state.timeline.tracks().len(), 6);
}

proptest! {
    #[test]
    fn fractional_frames_survive_export_and_parse(
        spans in prop::collection::vec((0.0f64..1.0e6, 1.0e-3f64..1.0e6), 1..12),
        playhead in 0.0f64..1.0e6,
        zoom in 0.1f64..10.0,
    ) {
        let mut state = AppState::new();
        for (i, (start, duration)) in spans.iter().enumerate() {
            state.timeline.add_shot(Shot::new(format!("Shot {i}"), *start, *duration));
        }
        state.timeline.add_marker(Marker::new(playhead, "Cue"));
        state.timeline.set_playhead(playhead);
        state.timeline.set_zoom(zoom);

        let exported = export_to_file(&state, "1.0.0");
        let parsed = parse(&to_json_string(&exported).unwrap()).unwrap();
        prop_assert_eq!(&parsed, &exported);

        let timeline = parsed.timeline.unwrap();
        for (shot, (start, duration)) in timeline.shots().iter().zip(&spans) {
            prop_assert_eq!(shot.start_time.to_bits(), start.to_bits());
            prop_assert_eq!(shot.duration.to_bits(), duration.to_bits());
        }
        prop_assert_eq!(timeline.duration(), state.timeline.duration());
    }
}
