// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rive Viewer - animation viewer with live ViewModel controls
//!
//! A desktop shell around the binding engine featuring:
//! - Canvas tab with playback and layout controls
//! - Controls tab with one live widget per ViewModel or state-machine input
//! - Explorer tab for browsing, reading and writing inputs by path
//! - Console tab fed by the tracing bridge
//!
//! ## Architecture
//!
//! All introspection lives in `rive_viewer_bindings`. This binary owns the
//! window, the dock layout and the file loading pipeline, and forwards the
//! load/unload events to a `ViewerSession`.

mod app;
mod panel_types;
mod panels;

use app::ViewerApp;
use panels::console::TracingBridge;
use rive_viewer_bindings::registry::{extract_opened_file_args, file_arg_to_path};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_LOG_DIRECTIVES: &str = "rive_viewer=debug,rive_viewer_app=debug,rive_viewer_bindings=debug,wgpu=warn,naga=warn";

fn main() {
    // Create the console tracing bridge (channel pair)
    let (bridge_layer, tracing_rx) = TracingBridge::new();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_DIRECTIVES));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(bridge_layer)
        .init();

    tracing::info!("Starting Rive Viewer v{}", env!("CARGO_PKG_VERSION"));

    let files: Vec<_> = extract_opened_file_args(std::env::args().skip(1))
        .iter()
        .map(|arg| file_arg_to_path(arg))
        .collect();
    if files.len() > 1 {
        tracing::info!("{} files given; opening the last one", files.len());
    }

    if let Err(e) = ViewerApp::run(Some(tracing_rx), files.last().cloned()) {
        tracing::error!("Viewer crashed: {e}");
        std::process::exit(1);
    }
}
