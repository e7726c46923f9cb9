//! Bottom status bar: connection, scene, last message, diagnostics.

#[cfg(test)]
#[path = "status_bar_test.rs"]
mod status_bar_test;

use leptos::prelude::*;
use wire::Signal;

use crate::debug::DebugReport;
use crate::net::comms::ConnectionState;
use crate::state::viewer::ViewerState;

#[component]
pub fn StatusBar() -> impl IntoView {
    let state = expect_context::<RwSignal<ViewerState>>();
    let report = expect_context::<RwSignal<Option<DebugReport>>>();

    let status_class = move || connection_class(state.with(|s| s.connection));
    let status_text = move || state.with(|s| s.connection.label());
    let scene = move || state.with(ViewerState::scene_label);
    let signal = move || state.with(|s| format_signal(s.last_signal.as_ref()));
    let error = move || state.with(|s| s.last_error.clone());
    let diagnostics = move || report.with(|r| r.as_ref().map(DebugReport::summary).unwrap_or_default());

    view! {
        <div class="status-bar">
            <div class="status-bar__section">
                <span class="status-bar__item">
                    <span class=status_class></span>
                    {status_text}
                </span>
                <span class="status-bar__divider"></span>
                <span class="status-bar__item">{scene}</span>
                <span class="status-bar__divider"></span>
                <span class="status-bar__item">{signal}</span>
                {move || error().map(|message| view! {
                    <span class="status-bar__divider"></span>
                    <span class="status-bar__item status-bar__item--error">{message}</span>
                })}
            </div>
            <div class="status-bar__section">
                <span class="status-bar__item status-bar__item--muted">{diagnostics}</span>
            </div>
        </div>
    }
}

fn connection_class(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Open => "status-bar__dot status-bar__dot--connected",
        ConnectionState::Connecting => "status-bar__dot status-bar__dot--connecting",
        ConnectionState::Closed => "status-bar__dot status-bar__dot--disconnected",
    }
}

fn format_signal(signal: Option<&Signal>) -> String {
    match signal {
        None => "no messages".to_owned(),
        Some(Signal::Sync) => "sync received".to_owned(),
        Some(Signal::Echo(text)) => format!("echo: {text}"),
        Some(Signal::Text(text)) => format!("msg: {text}"),
    }
}
