//! Top bar with the Sync and Inspector controls.
//!
//! Buttons only write [`ViewerState`]; the canvas host turns those writes into
//! socket sends and inspector calls.

use leptos::prelude::*;

use crate::net::comms::ConnectionState;
use crate::state::viewer::ViewerState;

#[component]
pub fn Toolbar() -> impl IntoView {
    let state = expect_context::<RwSignal<ViewerState>>();

    let sync_disabled = move || state.with(|s| s.connection == ConnectionState::Closed);
    let inspector_label = move || if state.with(|s| s.inspector_visible) { "Hide inspector" } else { "Inspector" };

    view! {
        <div class="toolbar">
            <span class="toolbar__title">"glbview"</span>
            <span class="toolbar__spacer"></span>
            <button
                class="btn toolbar__sync"
                disabled=sync_disabled
                on:click=move |_| state.update(ViewerState::request_sync)
                title="Ask the authoring tool for a fresh export"
            >
                "Sync"
            </button>
            <button
                class="btn toolbar__inspector"
                class:btn--active=move || state.with(|s| s.inspector_visible)
                on:click=move |_| state.update(ViewerState::toggle_inspector)
                title="Toggle the scene inspector"
            >
                {inspector_label}
            </button>
        </div>
    }
}
