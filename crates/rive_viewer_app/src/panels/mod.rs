// SPDX-License-Identifier: MIT OR Apache-2.0
//! Viewer panel implementations.

mod canvas;
pub mod console;
mod explorer;

pub use canvas::{CanvasAction, CanvasPanel};
pub use console::ConsolePanel;
pub use explorer::ExplorerPanel;
