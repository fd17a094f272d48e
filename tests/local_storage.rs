// File: tests/local_storage.rs
use chrono::{TimeZone, Utc};
use glassflow::config::Config;
use glassflow::context::{AppContext, TestContext};
use glassflow::controller::open_store;
use glassflow::storage::LocalStorage;
use glassflow::store::{AppState, TaskStore};
use std::fs;

#[test]
fn test_every_mutation_is_saved() {
    let ctx = TestContext::new();
    let config = Config::default();

    let mut store = open_store(&ctx, &config).unwrap();
    let id = store.add_todo("persist me", Some(Utc.with_ymd_and_hms(2026, 10, 18, 7, 0, 0).unwrap()));
    store.add_note("sticky", None);
    store.toggle_todo(&id);
    let expected = store.snapshot();
    drop(store);

    let reopened = open_store(&ctx, &config).unwrap();
    assert_eq!(*reopened.snapshot(), *expected);
}

#[test]
fn test_file_layout_is_versioned() {
    let ctx = TestContext::new();
    let mut store = open_store(&ctx, &Config::default()).unwrap();
    store.add_todo("x", None);

    let raw = fs::read_to_string(ctx.get_state_path().unwrap()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["version"], 1);
    assert_eq!(json["state"]["todos"][0]["text"], "x");
    assert_eq!(json["state"]["weatherCity"], "厦门市");
    assert!(!ctx.get_data_dir().unwrap().join("glassflow.tmp").exists());
}

#[test]
fn test_fresh_state_uses_config_defaults() {
    let ctx = TestContext::new();
    let config = Config {
        default_opacity: 0.9,
        default_weather_city: "上海市".to_string(),
        default_note_color: "bg-pink-200/80".to_string(),
        ..Config::default()
    };
    let mut store = open_store(&ctx, &config).unwrap();
    assert_eq!(store.state().opacity, 0.9);
    assert_eq!(store.state().weather_city, "上海市");
    store.add_note("n", None);
    assert_eq!(store.state().notes[0].color, "bg-pink-200/80");
}

#[test]
fn test_migrates_version_zero() {
    let ctx = TestContext::new();
    let path = ctx.get_state_path().unwrap();
    fs::write(
        &path,
        r#"{"state":{"todos":[{"id":"1","text":"old","done":false}],"events":[],"notes":[],"opacity":0.5,"weatherCity":"厦门市"},"version":0}"#,
    )
    .unwrap();

    let storage = LocalStorage::new(&ctx).unwrap();
    let state = storage.load().unwrap().unwrap();
    assert_eq!(state.todos[0].text, "old");
    assert_eq!(state.opacity, 0.5);

    let upgraded: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(upgraded["version"], 1);
}

#[test]
fn test_corrupt_file_is_not_overwritten() {
    let ctx = TestContext::new();
    let path = ctx.get_state_path().unwrap();
    fs::write(&path, "{ definitely not json").unwrap();

    assert!(open_store(&ctx, &Config::default()).is_err());

    // A caller that carries on anyway must not clobber the file.
    let storage = LocalStorage::new(&ctx).unwrap();
    assert!(storage.load().is_err());
    let mut store = TaskStore::from_state(AppState::default()).with_persistence(storage);
    store.add_todo("would wipe data", None);
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ definitely not json");
}

#[test]
fn test_lock_file_sits_next_to_state() {
    let ctx = TestContext::new();
    let storage = LocalStorage::new(&ctx).unwrap();
    storage.save(&AppState::default()).unwrap();
    assert!(ctx.get_data_dir().unwrap().join("glassflow.json.lock").exists());
}
