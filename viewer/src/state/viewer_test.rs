use super::*;

fn ready(generation: u64, url: &str) -> SceneReady {
    SceneReady { generation, url: url.to_owned(), pose: CameraPose::INITIAL }
}

#[test]
fn default_state_is_idle() {
    let state = ViewerState::default();
    assert_eq!(state.connection, ConnectionState::Connecting);
    assert!(!state.inspector_visible);
    assert!(!state.loading);
    assert_eq!(state.scene_generation, 0);
    assert_eq!(state.scene_label(), "no scene");
}

#[test]
fn record_message_counts_sync_triggers() {
    let mut state = ViewerState::default();
    assert_eq!(state.record_message("sync glb"), Signal::Sync);
    assert_eq!(state.record_message("Echo: sync glb"), Signal::Echo("sync glb".to_owned()));
    assert_eq!(state.syncs_received, 1);
    assert_eq!(state.last_signal, Some(Signal::Echo("sync glb".to_owned())));
}

#[test]
fn toggle_inspector_flips() {
    let mut state = ViewerState::default();
    state.toggle_inspector();
    assert!(state.inspector_visible);
    state.toggle_inspector();
    assert!(!state.inspector_visible);
}

#[test]
fn request_sync_increments() {
    let mut state = ViewerState::default();
    state.request_sync();
    state.request_sync();
    assert_eq!(state.sync_requests, 2);
}

#[test]
fn failed_load_records_error_until_next_swap() {
    let mut state = ViewerState::default();
    state.begin_load();
    let err = LoadError::Fetch { url: "http://h/scene.glb".to_owned(), reason: "404".to_owned() };
    state.finish_load(&Err(err), false);
    assert!(!state.loading);
    assert_eq!(state.last_error.as_deref(), Some("failed to fetch scene from http://h/scene.glb: 404"));

    state.begin_load();
    state.finish_load(&Ok(SwapOutcome::Activated { generation: 2 }), false);
    assert!(state.last_error.is_none());
}

#[test]
fn superseded_load_keeps_loading_flag_from_host() {
    let mut state = ViewerState::default();
    state.begin_load();
    state.finish_load(&Ok(SwapOutcome::Superseded { generation: 1 }), true);
    assert!(state.loading);
    assert_eq!(state.scene_label(), "loading…");
}

#[test]
fn apply_ready_updates_scene_fields() {
    let mut state = ViewerState::default();
    state.apply_ready(&ready(3, "http://localhost:8001/scene.glb?t=9"));
    assert_eq!(state.scene_generation, 3);
    assert_eq!(state.camera, Some(CameraPose::INITIAL));
    assert_eq!(state.scene_label(), "#3 scene.glb");
}
