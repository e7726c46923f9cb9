use std::cell::RefCell;
use std::rc::Rc;

use futures::executor::block_on;
use scene::camera::Vec3;
use scene::engine::{LoadError, PoseListener, SceneSettings};

use super::*;
use crate::net::comms::TransportError;

struct Sink;

impl Transport for Sink {
    fn transmit(&self, _message: &str) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Engine whose scenes are just their camera listener slot.
#[derive(Default)]
struct StubEngine {
    last_listener: RefCell<Option<PoseListener>>,
}

impl SceneEngine for StubEngine {
    type Scene = ();

    fn create_scene(&self) -> Self::Scene {}

    async fn import_scene(&self, url: &str) -> Result<(), LoadError> {
        if url.ends_with(".glb") {
            Ok(())
        } else {
            Err(LoadError::Parse { url: url.to_owned(), reason: "not a glb".to_owned() })
        }
    }

    fn stage(&self, _scene: &(), _settings: &SceneSettings) {}

    fn camera_pose(&self, _scene: &()) -> Option<CameraPose> {
        None
    }

    fn install_camera(&self, _scene: &(), _pose: CameraPose, on_view_change: PoseListener) {
        *self.last_listener.borrow_mut() = Some(on_view_change);
    }

    fn activate(&self, _scene: &()) {}

    fn dispose(&self, _scene: ()) {}

    fn start_render_loop(&self) {}

    fn watch_resize(&self) {}
}

fn bindings() -> DebugBindings<Sink, StubEngine> {
    let comms = Rc::new(Comms::new(Sink));
    let host = Rc::new(SceneHost::initialize(StubEngine::default(), SceneSettings::default()));
    DebugBindings::new(comms, host)
}

#[test]
fn report_at_startup() {
    let report = bindings().report();
    assert_eq!(
        report,
        DebugReport {
            connection: ConnectionState::Connecting,
            pending_messages: 0,
            listeners: 0,
            scene_generation: 0,
            requested_generation: 0,
            swaps: 0,
            loading: false,
            camera: None,
        }
    );
}

#[test]
fn report_tracks_comms_and_host() {
    let debug = bindings();
    debug.comms().send("sync glb").expect("queued");
    debug.comms().add_listener(|_| {});
    block_on(debug.host().load_scene("scene.glb")).expect("load ok");
    block_on(debug.host().load_scene("broken")).expect_err("parse failure");

    let report = debug.report();
    assert_eq!(report.pending_messages, 1);
    assert_eq!(report.listeners, 1);
    assert_eq!(report.scene_generation, 1);
    assert_eq!(report.requested_generation, 2);
    assert_eq!(report.swaps, 1);
    assert_eq!(report.camera, Some(CameraPose::default()));
}

#[test]
fn report_sees_live_camera_moves() {
    let debug = bindings();
    let moved = CameraPose { alpha: 1.0, beta: 0.5, target: Vec3::new(0.0, 1.0, 0.0), radius: 4.0 };
    let listener = debug.host().engine().last_listener.borrow().clone().expect("camera installed");
    listener(moved);
    assert_eq!(debug.report().camera, Some(moved));
}

#[test]
fn report_serializes_connection_as_lowercase() {
    let json = bindings().report_json().expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["connection"], "connecting");
    assert_eq!(value["camera"], serde_json::Value::Null);
}

#[test]
fn summary_includes_camera_when_known() {
    let mut report = bindings().report();
    assert_eq!(report.summary(), "connecting | queued 0 | scene 0/0 | swaps 0");

    report.camera = Some(CameraPose::INITIAL);
    assert_eq!(report.summary(), "connecting | queued 0 | scene 0/0 | swaps 0 | α 1.57 β 0.79 r 10.00");
}
