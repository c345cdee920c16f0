// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared panel type definitions.

/// Panel types that can be docked in the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelType {
    /// Animation canvas and playback
    Canvas,
    /// Live ViewModel and state-machine controls
    Controls,
    /// Path-based ViewModel explorer
    Explorer,
    /// Console/log output
    Console,
}

impl PanelType {
    /// Get the display name for this panel type
    pub fn name(&self) -> &'static str {
        match self {
            Self::Canvas => "Canvas",
            Self::Controls => "Controls",
            Self::Explorer => "Explorer",
            Self::Console => "Console",
        }
    }

    /// Get the icon for this panel type
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Canvas => "\u{1f3ac}",   // film
            Self::Controls => "\u{2699}",  // cog
            Self::Explorer => "\u{1f4c2}", // folder
            Self::Console => "\u{1f4bb}",  // terminal
        }
    }
}
