use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::{LocalPool, block_on};
use futures::task::LocalSpawnExt;

use super::*;
use crate::camera::Vec3;
use crate::engine::PoseListener;

// =============================================================
// Recording engine
// =============================================================

struct MockScene {
    id: u32,
    camera: RefCell<Option<CameraPose>>,
    listener: RefCell<Option<PoseListener>>,
}

impl MockScene {
    /// Simulate the user orbiting this scene's camera.
    fn move_camera(&self, pose: CameraPose) {
        *self.camera.borrow_mut() = Some(pose);
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(pose);
        }
    }

    fn remove_camera(&self) {
        self.camera.borrow_mut().take();
    }
}

#[derive(Default)]
struct MockEngine {
    log: RefCell<Vec<String>>,
    scenes: RefCell<Vec<Rc<MockScene>>>,
    next_id: Cell<u32>,
    failures: RefCell<HashMap<String, LoadError>>,
    embedded: RefCell<HashMap<String, CameraPose>>,
    gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
}

impl MockEngine {
    fn record(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }

    fn make_scene(&self, camera: Option<CameraPose>) -> Rc<MockScene> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let scene = Rc::new(MockScene { id, camera: RefCell::new(camera), listener: RefCell::new(None) });
        self.scenes.borrow_mut().push(Rc::clone(&scene));
        scene
    }

    fn scene(&self, id: u32) -> Rc<MockScene> {
        let scenes = self.scenes.borrow();
        let found = scenes.iter().find(|s| s.id == id).expect("scene id exists");
        Rc::clone(found)
    }

    fn fail(&self, url: &str, err: LoadError) {
        self.failures.borrow_mut().insert(url.to_owned(), err);
    }

    fn embed_camera(&self, url: &str, pose: CameraPose) {
        self.embedded.borrow_mut().insert(url.to_owned(), pose);
    }

    /// Hold the import of `url` until the returned sender fires.
    fn gate(&self, url: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(url.to_owned(), rx);
        tx
    }

    fn entries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn entries_after(&self, marker: &str) -> Vec<String> {
        let log = self.log.borrow();
        let start = log.iter().position(|e| e == marker).expect("marker present");
        log[start..].to_vec()
    }
}

impl SceneEngine for MockEngine {
    type Scene = Rc<MockScene>;

    fn create_scene(&self) -> Self::Scene {
        let scene = self.make_scene(None);
        self.record(format!("create {}", scene.id));
        scene
    }

    async fn import_scene(&self, url: &str) -> Result<Self::Scene, LoadError> {
        self.record(format!("import {url}"));
        let gate = self.gates.borrow_mut().remove(url);
        if let Some(gate) = gate {
            gate.await.expect("gate sender dropped");
        }
        let failure = self.failures.borrow_mut().remove(url);
        if let Some(err) = failure {
            return Err(err);
        }
        let embedded = self.embedded.borrow().get(url).copied();
        Ok(self.make_scene(embedded))
    }

    fn stage(&self, scene: &Self::Scene, _settings: &SceneSettings) {
        self.record(format!("stage {}", scene.id));
    }

    fn camera_pose(&self, scene: &Self::Scene) -> Option<CameraPose> {
        *scene.camera.borrow()
    }

    fn install_camera(&self, scene: &Self::Scene, pose: CameraPose, on_view_change: PoseListener) {
        self.record(format!("camera {}", scene.id));
        *scene.camera.borrow_mut() = Some(pose);
        *scene.listener.borrow_mut() = Some(on_view_change);
    }

    fn activate(&self, scene: &Self::Scene) {
        self.record(format!("activate {}", scene.id));
    }

    fn dispose(&self, scene: Self::Scene) {
        self.record(format!("dispose {}", scene.id));
    }

    fn start_render_loop(&self) {
        self.record("render-loop".to_owned());
    }

    fn watch_resize(&self) {
        self.record("watch-resize".to_owned());
    }
}

fn host() -> SceneHost<MockEngine> {
    SceneHost::initialize(MockEngine::default(), SceneSettings::default())
}

fn pose(alpha: f64, beta: f64, radius: f64) -> CameraPose {
    CameraPose { alpha, beta, target: Vec3::new(1.0, 2.0, 3.0), radius }
}

fn active_id(host: &SceneHost<MockEngine>) -> u32 {
    host.with_active_scene(|s| s.id).expect("active scene")
}

// =============================================================
// initialize
// =============================================================

#[test]
fn initialize_builds_default_scene_then_starts_loop() {
    let host = host();
    assert_eq!(
        host.engine().entries(),
        vec!["create 0", "stage 0", "camera 0", "activate 0", "render-loop", "watch-resize"]
    );
    assert_eq!(active_id(&host), 0);
    assert_eq!(host.active_generation(), 0);
    assert_eq!(host.generation(), 0);
    assert!(!host.is_loading());
}

#[test]
fn initialize_installs_camera_at_initial_pose() {
    let host = host();
    assert_eq!(host.engine().camera_pose(&host.engine().scene(0)), Some(CameraPose::INITIAL));
    assert!(host.snapshot().is_none());
}

#[test]
fn view_changes_update_snapshot_synchronously() {
    let host = host();
    let moved = pose(0.4, 1.0, 12.0);
    host.engine().scene(0).move_camera(moved);
    assert_eq!(host.snapshot(), Some(moved));

    let again = pose(0.5, 1.1, 3.0);
    host.engine().scene(0).move_camera(again);
    assert_eq!(host.snapshot(), Some(again));
}

// =============================================================
// load_scene: ordering
// =============================================================

#[test]
fn load_disposes_previous_only_after_new_scene_is_active() {
    let host = host();
    let outcome = block_on(host.load_scene("a")).expect("load ok");

    assert_eq!(outcome, SwapOutcome::Activated { generation: 1 });
    assert_eq!(
        host.engine().entries_after("import a"),
        vec!["import a", "stage 1", "camera 1", "activate 1", "dispose 0"]
    );
    assert_eq!(active_id(&host), 1);
    assert_eq!(host.active_generation(), 1);
    assert_eq!(host.swap_count(), 1);
}

#[test]
fn ready_fires_after_disposal_of_previous_scene() {
    let host = Rc::new(host());
    let host_for_listener = Rc::clone(&host);
    host.on_scene_ready(move |ready| {
        host_for_listener
            .engine()
            .record(format!("ready {}", ready.generation));
    });

    block_on(host.load_scene("a")).expect("load ok");

    let log = host.engine().entries();
    assert_eq!(log[log.len() - 2..], ["dispose 0".to_owned(), "ready 1".to_owned()]);
}

#[test]
fn ready_listeners_run_in_registration_order() {
    let host = host();
    let order = Rc::new(RefCell::new(Vec::new()));
    for name in ["inspector", "status"] {
        let order = Rc::clone(&order);
        host.on_scene_ready(move |ready| order.borrow_mut().push(format!("{name}:{}", ready.url)));
    }

    block_on(host.load_scene("a")).expect("load ok");
    assert_eq!(*order.borrow(), vec!["inspector:a", "status:a"]);
}

// =============================================================
// load_scene: camera preservation
// =============================================================

#[test]
fn snapshot_is_applied_to_new_camera() {
    let host = host();
    let user_view = pose(0.3, 0.9, 25.0);
    host.engine().scene(0).move_camera(user_view);

    block_on(host.load_scene("a")).expect("load ok");

    assert_eq!(*host.engine().scene(1).camera.borrow(), Some(user_view));
    assert_eq!(host.snapshot(), Some(user_view));
}

#[test]
fn snapshot_beats_camera_embedded_in_file() {
    let host = host();
    let user_view = pose(0.3, 0.9, 25.0);
    host.engine().scene(0).move_camera(user_view);
    host.engine().embed_camera("a", pose(2.0, 2.0, 2.0));

    block_on(host.load_scene("a")).expect("load ok");

    assert_eq!(*host.engine().scene(1).camera.borrow(), Some(user_view));
}

#[test]
fn second_load_uses_pose_set_right_before_it() {
    let host = host();
    host.engine().scene(0).move_camera(pose(0.1, 0.2, 5.0));
    block_on(host.load_scene("first.glb")).expect("first load");

    let before_second = pose(1.5, 0.6, 8.0);
    host.engine().scene(1).move_camera(before_second);
    block_on(host.load_scene("second.glb")).expect("second load");

    assert_eq!(*host.engine().scene(2).camera.borrow(), Some(before_second));
    let ready_pose = host.snapshot().expect("snapshot");
    assert_eq!(ready_pose, before_second);
}

#[test]
fn ready_reports_the_applied_pose() {
    let host = host();
    let user_view = pose(0.7, 0.7, 7.0);
    host.engine().scene(0).move_camera(user_view);
    let seen = Rc::new(RefCell::new(None));
    let seen_in = Rc::clone(&seen);
    host.on_scene_ready(move |ready| *seen_in.borrow_mut() = Some(ready.clone()));

    block_on(host.load_scene("a")).expect("load ok");

    let ready = seen.borrow().clone().expect("ready published");
    assert_eq!(ready, SceneReady { generation: 1, url: "a".to_owned(), pose: user_view });
}

#[test]
fn without_snapshot_embedded_camera_seeds_it() {
    let host = host();
    let shipped = pose(1.0, 1.0, 4.0);
    host.engine().embed_camera("a", shipped);

    block_on(host.load_scene("a")).expect("load ok");

    assert_eq!(host.snapshot(), Some(shipped));
    assert_eq!(*host.engine().scene(1).camera.borrow(), Some(shipped));
}

#[test]
fn without_snapshot_outgoing_camera_seeds_it() {
    let host = host();
    block_on(host.load_scene("a")).expect("load ok");
    assert_eq!(host.snapshot(), Some(CameraPose::INITIAL));
}

#[test]
fn without_any_camera_snapshot_is_zeroed() {
    let host = host();
    host.engine().scene(0).remove_camera();

    block_on(host.load_scene("a")).expect("load ok");

    assert_eq!(host.snapshot(), Some(CameraPose::default()));
    assert_eq!(*host.engine().scene(1).camera.borrow(), Some(CameraPose::default()));
}

#[test]
fn disposed_scene_camera_no_longer_feeds_snapshot() {
    let host = host();
    let user_view = pose(0.3, 0.9, 25.0);
    host.engine().scene(0).move_camera(user_view);
    block_on(host.load_scene("a")).expect("load ok");

    host.engine().scene(0).move_camera(pose(9.0, 9.0, 9.0));
    assert_eq!(host.snapshot(), Some(user_view));

    let newer = pose(0.2, 0.2, 2.0);
    host.engine().scene(1).move_camera(newer);
    assert_eq!(host.snapshot(), Some(newer));
}

// =============================================================
// load_scene: failures
// =============================================================

#[test]
fn failed_load_propagates_and_keeps_active_scene() {
    let host = host();
    let err = LoadError::Fetch { url: "missing.glb".to_owned(), reason: "404".to_owned() };
    host.engine().fail("missing.glb", err.clone());
    let fired = Rc::new(Cell::new(false));
    let fired_in = Rc::clone(&fired);
    host.on_scene_ready(move |_| fired_in.set(true));

    let result = block_on(host.load_scene("missing.glb"));

    assert_eq!(result, Err(err));
    assert_eq!(active_id(&host), 0);
    assert_eq!(host.active_generation(), 0);
    assert!(!host.engine().entries().iter().any(|e| e.starts_with("dispose")));
    assert!(!fired.get());
    assert!(!host.is_loading());
}

#[test]
fn load_after_failure_still_swaps() {
    let host = host();
    host.engine()
        .fail("bad.glb", LoadError::Parse { url: "bad.glb".to_owned(), reason: "bad magic".to_owned() });
    assert!(block_on(host.load_scene("bad.glb")).is_err());

    let outcome = block_on(host.load_scene("good.glb")).expect("load ok");
    assert_eq!(outcome, SwapOutcome::Activated { generation: 2 });
    assert_eq!(host.active_generation(), 2);
    assert_eq!(host.swap_count(), 1);
}

// =============================================================
// load_scene: overlapping requests
// =============================================================

#[test]
fn older_load_finishing_last_is_superseded() {
    let host = Rc::new(host());
    let release_a = host.engine().gate("a");
    let outcomes = Rc::new(RefCell::new(Vec::new()));
    let readies = Rc::new(RefCell::new(Vec::new()));
    let readies_in = Rc::clone(&readies);
    host.on_scene_ready(move |ready| readies_in.borrow_mut().push(ready.generation));

    let mut pool = LocalPool::new();
    for url in ["a", "b"] {
        let host = Rc::clone(&host);
        let outcomes = Rc::clone(&outcomes);
        pool.spawner()
            .spawn_local(async move {
                let outcome = host.load_scene(url).await.expect("load ok");
                outcomes.borrow_mut().push((url, outcome));
            })
            .expect("spawn");
    }

    pool.run_until_stalled();
    assert!(host.is_loading());
    assert_eq!(host.active_generation(), 2);

    release_a.send(()).expect("gate open");
    pool.run_until_stalled();

    assert_eq!(
        *outcomes.borrow(),
        vec![
            ("b", SwapOutcome::Activated { generation: 2 }),
            ("a", SwapOutcome::Superseded { generation: 1 }),
        ]
    );
    assert_eq!(*readies.borrow(), vec![2]);
    assert!(!host.is_loading());
    // Scene 1 came from "b" (imported first), scene 2 from "a".
    let log = host.engine().entries();
    assert!(log.contains(&"activate 1".to_owned()));
    assert!(!log.contains(&"activate 2".to_owned()));
    assert_eq!(log.last().map(String::as_str), Some("dispose 2"));
    assert_eq!(active_id(&host), 1);
}

/// Spawn one `load_scene` per url on `pool`, recording each result.
fn spawn_loads(
    pool: &LocalPool,
    host: &Rc<SceneHost<MockEngine>>,
    urls: &[&'static str],
) -> Rc<RefCell<Vec<(&'static str, Result<SwapOutcome, LoadError>)>>> {
    let results = Rc::new(RefCell::new(Vec::new()));
    for &url in urls {
        let host = Rc::clone(host);
        let results = Rc::clone(&results);
        pool.spawner()
            .spawn_local(async move {
                let result = host.load_scene(url).await;
                results.borrow_mut().push((url, result));
            })
            .expect("spawn");
    }
    results
}

#[test]
fn older_load_finishing_first_is_still_superseded() {
    let host = Rc::new(host());
    let release_a = host.engine().gate("a");
    let release_b = host.engine().gate("b");
    let mut pool = LocalPool::new();
    let results = spawn_loads(&pool, &host, &["a", "b"]);

    pool.run_until_stalled();
    assert!(results.borrow().is_empty());

    release_a.send(()).expect("gate open");
    pool.run_until_stalled();
    assert_eq!(*results.borrow(), vec![("a", Ok(SwapOutcome::Superseded { generation: 1 }))]);
    assert_eq!(active_id(&host), 0);
    assert!(host.is_loading());

    release_b.send(()).expect("gate open");
    pool.run_until_stalled();

    assert_eq!(results.borrow().last(), Some(&("b", Ok(SwapOutcome::Activated { generation: 2 }))));
    assert_eq!(host.active_generation(), 2);
    assert_eq!(host.swap_count(), 1);
    assert!(!host.is_loading());
}

#[test]
fn older_success_is_used_when_newer_load_fails() {
    let host = Rc::new(host());
    let release_a = host.engine().gate("a");
    let release_b = host.engine().gate("b");
    let err = LoadError::Fetch { url: "b".to_owned(), reason: "connection reset".to_owned() };
    host.engine().fail("b", err.clone());
    let readies = Rc::new(RefCell::new(Vec::new()));
    let readies_in = Rc::clone(&readies);
    host.on_scene_ready(move |ready| readies_in.borrow_mut().push(ready.url.clone()));
    let mut pool = LocalPool::new();
    let results = spawn_loads(&pool, &host, &["a", "b"]);
    pool.run_until_stalled();

    release_b.send(()).expect("gate open");
    pool.run_until_stalled();
    release_a.send(()).expect("gate open");
    pool.run_until_stalled();

    assert_eq!(
        *results.borrow(),
        vec![("b", Err(err)), ("a", Ok(SwapOutcome::Activated { generation: 1 }))]
    );
    assert_eq!(host.active_generation(), 1);
    assert_eq!(*readies.borrow(), vec!["a"]);
    assert!(!host.is_loading());
}

#[test]
fn older_success_after_newer_activation_is_discarded() {
    let host = Rc::new(host());
    let release_a = host.engine().gate("a");
    let mut pool = LocalPool::new();
    let results = spawn_loads(&pool, &host, &["a", "b", "c"]);
    host.engine().fail("c", LoadError::Parse { url: "c".to_owned(), reason: "bad magic".to_owned() });
    pool.run_until_stalled();
    assert_eq!(host.active_generation(), 2);

    release_a.send(()).expect("gate open");
    pool.run_until_stalled();

    assert_eq!(results.borrow().last(), Some(&("a", Ok(SwapOutcome::Superseded { generation: 1 }))));
    assert_eq!(host.active_generation(), 2);
}
