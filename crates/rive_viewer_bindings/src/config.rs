// SPDX-License-Identifier: MIT OR Apache-2.0
//! Viewer settings.
//!
//! Persisted as pretty RON. Files written by a newer format version are
//! rejected rather than silently misread.

use crate::color::hex_to_rgb;
use crate::error::{Result, ViewerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Current settings format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const CONFIG_FILE_NAME: &str = "viewer.ron";

/// How the artboard is fitted into the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutFit {
    /// Fill, cropping overflow
    Cover,
    /// Fit inside, letterboxed
    #[default]
    Contain,
    /// Stretch to fill
    Fill,
    /// Match the canvas width
    FitWidth,
    /// Match the canvas height
    FitHeight,
    /// Contain, but never upscale
    ScaleDown,
    /// Contain, but never downscale
    ScaleUp,
}

impl LayoutFit {
    /// Every fit, in menu order
    pub const ALL: [LayoutFit; 7] = [
        LayoutFit::Cover,
        LayoutFit::Contain,
        LayoutFit::Fill,
        LayoutFit::FitWidth,
        LayoutFit::FitHeight,
        LayoutFit::ScaleDown,
        LayoutFit::ScaleUp,
    ];

    /// Runtime name of the fit
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Contain => "contain",
            Self::Fill => "fill",
            Self::FitWidth => "fitWidth",
            Self::FitHeight => "fitHeight",
            Self::ScaleDown => "scaleDown",
            Self::ScaleUp => "scaleUp",
        }
    }

    /// Parse a runtime name; unknown names fall back to the default
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|fit| fit.name() == name.trim())
            .unwrap_or_default()
    }
}

impl fmt::Display for LayoutFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rendering backend of the animation runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    /// 2D canvas renderer
    Canvas,
    /// WebGL2 renderer
    #[default]
    Webgl2,
}

impl RuntimeKind {
    /// Registry name of the runtime
    pub fn name(&self) -> &'static str {
        match self {
            Self::Canvas => "canvas",
            Self::Webgl2 => "webgl2",
        }
    }
}

/// Options passed to the runtime when instantiating an animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceOptions {
    /// Start playing on load
    pub autoplay: bool,
    /// Auto-bind the default ViewModel instance
    pub auto_bind: bool,
    /// State machines to start
    pub state_machines: Vec<String>,
    /// Artboard to show; the default artboard when unset
    pub artboard: Option<String>,
    /// Fill in the first state machine after a load and reload once
    pub auto_fill_state_machine: bool,
}

impl Default for InstanceOptions {
    fn default() -> Self {
        Self {
            autoplay: true,
            auto_bind: true,
            state_machines: Vec::new(),
            artboard: None,
            auto_fill_state_machine: true,
        }
    }
}

impl InstanceOptions {
    /// Name of the state machine the runtime will start, if any
    pub fn primary_state_machine(&self) -> Option<&str> {
        self.state_machines.first().map(String::as_str)
    }
}

/// Drop blank state-machine names and trim the rest
pub fn normalize_state_machine_selection(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Viewer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Settings format version
    pub version: u32,
    /// Live-sync polling interval in milliseconds
    pub sync_interval_ms: u64,
    /// Section accent colours as `#rrggbb`, cycled by depth
    pub accent_palette: Vec<String>,
    /// Canvas layout fit
    pub layout_fit: LayoutFit,
    /// Canvas background as `#rrggbb`
    pub canvas_color: String,
    /// Runtime backend
    pub runtime: RuntimeKind,
    /// Package URL the runtime is resolved from, e.g.
    /// `https://unpkg.com/@rive-app/webgl2@2.35.0`
    pub runtime_url: Option<String>,
    /// Instantiation options
    pub instance: InstanceOptions,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            sync_interval_ms: 100,
            accent_palette: vec![
                "#4fa3f7".to_string(),
                "#7ed321".to_string(),
                "#f5a623".to_string(),
                "#bd10e0".to_string(),
                "#50e3c2".to_string(),
                "#f25c54".to_string(),
            ],
            layout_fit: LayoutFit::default(),
            canvas_color: "#0d1117".to_string(),
            runtime: RuntimeKind::default(),
            runtime_url: None,
            instance: InstanceOptions::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> Result<Self> {
        let mut config: ViewerConfig =
            ron::from_str(content).map_err(|e| ViewerError::Config(e.to_string()))?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ViewerError::Config(format!(
                "Settings version {} is newer than supported version {}",
                config.version, CONFIG_FORMAT_VERSION
            )));
        }
        if config.accent_palette.is_empty() {
            return Err(ViewerError::Config("accent_palette must not be empty".to_string()));
        }

        config.instance.state_machines = normalize_state_machine_selection(&config.instance.state_machines);
        Ok(config)
    }

    /// Load settings; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save settings
    pub fn save(&self, path: &Path) -> Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content =
            ron::ser::to_string_pretty(self, config).map_err(|e| ViewerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Polling interval as a duration
    pub fn sync_interval(&self) -> Duration {
        Duration::from_millis(self.sync_interval_ms.max(1))
    }

    /// Accent palette as RGB
    pub fn accents(&self) -> Vec<[u8; 3]> {
        self.accent_palette.iter().map(|hex| hex_to_rgb(hex)).collect()
    }

    /// Canvas background as RGB
    pub fn canvas_rgb(&self) -> [u8; 3] {
        hex_to_rgb(&self.canvas_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ViewerConfig::default();
        assert_eq!(config.version, CONFIG_FORMAT_VERSION);
        assert_eq!(config.sync_interval(), Duration::from_millis(100));
        assert_eq!(config.accents().len(), 6);
        assert_eq!(config.canvas_rgb(), [0x0d, 0x11, 0x17]);
        assert_eq!(config.layout_fit, LayoutFit::Contain);
        assert!(config.instance.auto_bind);
    }

    #[test]
    fn test_serialization() {
        let mut config = ViewerConfig::default();
        config.layout_fit = LayoutFit::ScaleDown;
        config.instance.state_machines = vec!["State Machine 1".to_string()];

        let ron_str = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let loaded = ViewerConfig::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded = ViewerConfig::from_ron(
            r#"(layout_fit: fitWidth, instance: (state_machines: ["  Main ", "", "  "]))"#,
        )
        .unwrap();
        assert_eq!(loaded.layout_fit, LayoutFit::FitWidth);
        assert_eq!(loaded.instance.state_machines, vec!["Main".to_string()]);
        assert!(loaded.instance.autoplay);
        assert_eq!(loaded.sync_interval_ms, 100);
    }

    #[test]
    fn test_rejects_newer_version_and_empty_palette() {
        assert!(matches!(ViewerConfig::from_ron("(version: 99)"), Err(ViewerError::Config(_))));
        assert!(matches!(
            ViewerConfig::from_ron("(accent_palette: [])"),
            Err(ViewerError::Config(_))
        ));
    }

    #[test]
    fn test_layout_fit_names() {
        assert_eq!(LayoutFit::from_name("scaleUp"), LayoutFit::ScaleUp);
        assert_eq!(LayoutFit::from_name("bogus"), LayoutFit::Contain);
        assert_eq!(LayoutFit::ALL.len(), 7);
        assert_eq!(RuntimeKind::default().name(), "webgl2");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("rive_viewer_missing_settings.ron");
        let _ = std::fs::remove_file(&path);
        assert_eq!(ViewerConfig::load(&path).unwrap(), ViewerConfig::default());
    }
}
