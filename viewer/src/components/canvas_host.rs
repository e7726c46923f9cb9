//! Render surface host.
//!
//! SYSTEM CONTEXT
//! ==============
//! Once the `<canvas>` is mounted this component boots the Babylon engine,
//! the [`SceneHost`], and the socket [`Comms`], then wires them together:
//!
//! - an inbound sync trigger starts a best-effort scene reload
//!   ([`crate::reload::reload_on_sync`]);
//! - every completed swap updates [`ViewerState`] and re-attaches the
//!   inspector when it is visible;
//! - toolbar writes to [`ViewerState`] become socket sends and inspector calls;
//! - a timer refreshes the [`DebugReport`] shown in the status bar.
//!
//! [`SceneHost`]: scene::host::SceneHost
//! [`Comms`]: crate::net::comms::Comms
//! [`DebugReport`]: crate::debug::DebugReport

use leptos::prelude::*;

#[cfg(feature = "csr")]
use std::cell::RefCell;
#[cfg(feature = "csr")]
use std::rc::Rc;

#[cfg(feature = "csr")]
use gloo_timers::callback::Interval;
#[cfg(feature = "csr")]
use scene::babylon::BabylonEngine;
#[cfg(feature = "csr")]
use scene::engine::SceneSettings;
#[cfg(feature = "csr")]
use scene::host::SceneHost;

#[cfg(feature = "csr")]
use crate::config::ViewerConfig;
#[cfg(feature = "csr")]
use crate::debug::{DebugBindings, DebugReport};
#[cfg(feature = "csr")]
use crate::net::socket::{self, BrowserSocket};
#[cfg(feature = "csr")]
use crate::reload::reload_on_sync;
#[cfg(feature = "csr")]
use crate::state::viewer::ViewerState;

#[cfg(feature = "csr")]
const REPORT_INTERVAL_MS: u32 = 500;

#[cfg(feature = "csr")]
type Host = SceneHost<BabylonEngine>;

#[cfg(feature = "csr")]
struct Runtime {
    debug: DebugBindings<BrowserSocket, BabylonEngine>,
    _report_tick: Interval,
}

/// Load `url` into the host without blocking the caller. Failures are logged
/// and surfaced in the status bar.
#[cfg(feature = "csr")]
fn spawn_load(host: Rc<Host>, url: String, state: RwSignal<ViewerState>) {
    state.update(ViewerState::begin_load);
    leptos::task::spawn_local(async move {
        let result = host.load_scene(&url).await;
        if let Err(err) = &result {
            log::warn!("scene reload skipped: {err}");
        }
        state.update(|s| s.finish_load(&result, host.is_loading()));
    });
}

#[cfg(feature = "csr")]
fn set_inspector(host: &Host, visible: bool) {
    host.with_active_scene(|scene| {
        if scene.inspector_visible() != visible {
            scene.set_inspector_visible(visible);
        }
    });
}

#[cfg(feature = "csr")]
fn boot(
    canvas: web_sys::HtmlCanvasElement,
    config: &ViewerConfig,
    state: RwSignal<ViewerState>,
    report: RwSignal<Option<DebugReport>>,
) -> Result<Runtime, String> {
    let engine = BabylonEngine::new(canvas).map_err(|err| err.to_string())?;
    let host = Rc::new(SceneHost::initialize(engine, SceneSettings::default()));
    let comms = socket::connect(&config.socket_url).map_err(|err| err.to_string())?;

    comms.on_state_change(move |connection| state.update(|s| s.connection = connection));

    comms.add_listener(move |raw| {
        state.update(|s| {
            s.record_message(raw);
        });
    });
    reload_on_sync(&*comms, &host, config.scene_url.clone(), move |host, url| spawn_load(host, url, state));

    {
        let weak = Rc::downgrade(&host);
        host.on_scene_ready(move |ready| {
            state.update(|s| s.apply_ready(ready));
            if state.with_untracked(|s| s.inspector_visible) {
                if let Some(host) = weak.upgrade() {
                    set_inspector(&host, true);
                }
            }
        });
    }

    if state.with_untracked(|s| s.inspector_visible) {
        set_inspector(&host, true);
    }
    spawn_load(Rc::clone(&host), config.scene_url.clone(), state);

    let debug = DebugBindings::new(comms, host);
    match debug.report_json() {
        Ok(json) => log::debug!("viewer booted: {json}"),
        Err(err) => log::warn!("debug report unavailable: {err}"),
    }
    let ticking = debug.clone();
    let report_tick = Interval::new(REPORT_INTERVAL_MS, move || report.set(Some(ticking.report())));

    Ok(Runtime { debug, _report_tick: report_tick })
}

/// Full-size canvas that owns the scene host and the socket.
#[component]
pub fn CanvasHost() -> impl IntoView {
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    #[cfg(feature = "csr")]
    {
        let state = expect_context::<RwSignal<ViewerState>>();
        let report = expect_context::<RwSignal<Option<DebugReport>>>();
        let config = expect_context::<ViewerConfig>();
        let runtime = Rc::new(RefCell::new(None::<Runtime>));

        {
            let runtime = Rc::clone(&runtime);
            Effect::new(move || {
                let Some(canvas) = canvas_ref.get() else {
                    return;
                };
                if runtime.borrow().is_some() {
                    return;
                }
                match boot(canvas, &config, state, report) {
                    Ok(booted) => *runtime.borrow_mut() = Some(booted),
                    Err(message) => {
                        log::error!("viewer failed to start: {message}");
                        state.update(|s| s.last_error = Some(message));
                    }
                }
            });
        }

        {
            let runtime = Rc::clone(&runtime);
            Effect::new(move |previous: Option<u64>| {
                let requests = state.with(|s| s.sync_requests);
                if previous.is_some_and(|p| p != requests) {
                    if let Some(rt) = runtime.borrow().as_ref() {
                        if let Err(err) = rt.debug.comms().send(wire::SYNC_TRIGGER) {
                            log::warn!("sync not sent: {err}");
                            state.update(|s| s.last_error = Some(err.to_string()));
                        }
                    }
                }
                requests
            });
        }

        {
            let runtime = Rc::clone(&runtime);
            Effect::new(move || {
                let visible = state.with(|s| s.inspector_visible);
                if let Some(rt) = runtime.borrow().as_ref() {
                    set_inspector(rt.debug.host(), visible);
                }
            });
        }
    }

    view! { <canvas class="viewer__canvas" node_ref=canvas_ref></canvas> }
}
