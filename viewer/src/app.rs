//! Root component and shared context.

use leptos::prelude::*;

use crate::components::canvas_host::CanvasHost;
use crate::components::status_bar::StatusBar;
use crate::components::toolbar::Toolbar;
use crate::config::ViewerConfig;
use crate::debug::DebugReport;
use crate::state::viewer::ViewerState;

/// Provides [`ViewerConfig`], `RwSignal<ViewerState>`, and
/// `RwSignal<Option<DebugReport>>` to the component tree.
#[component]
pub fn App() -> impl IntoView {
    #[cfg(feature = "csr")]
    let config = ViewerConfig::from_location();
    #[cfg(not(feature = "csr"))]
    let config = ViewerConfig::default();

    let state = RwSignal::new(ViewerState { inspector_visible: config.inspector_on_start, ..ViewerState::default() });
    provide_context(config);
    provide_context(state);
    provide_context(RwSignal::new(None::<DebugReport>));

    view! {
        <div class="viewer">
            <Toolbar/>
            <CanvasHost/>
            <StatusBar/>
        </div>
    }
}
