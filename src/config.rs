use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::Rule;

/// User commands bindable to keys and pointer buttons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Walk the visible clients of the focused monitor; positive is
    /// forward in list order, negative backward.
    FocusStack(i32),
    FocusMonitor(i32),
    MoveToMonitor(i32),
    /// Switch to a tag by index. An out-of-range index means "whatever
    /// was viewed before", same as `ViewLast`.
    ViewTag(usize),
    ViewLast,
    CycleView(i32),
    AssignTag(usize),
    IncMasterCount(i32),
    /// Below 1.0 the value adjusts the current factor; 1.0 and above sets
    /// it absolutely to `value - 1.0`.
    SetMasterFraction(f32),
    SetLayout(usize),
    ToggleFloating,
    ToggleBar,
    Zoom,
    Kill,
    Spawn(Vec<String>),
    MoveMouse,
    ResizeMouse,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub keysym: u32,
    pub modifiers: u32,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonBinding {
    pub button: u8,
    pub modifiers: u32,
    pub action: Action,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub border_px: i32,
    pub snap: i32,
    pub bar_height: i32,
    pub show_bar: bool,
    pub mfact: f32,
    pub nmaster: u32,
    pub tags: Vec<String>,
    pub rules: Vec<Rule>,
    pub keys: Vec<KeyBinding>,
    pub buttons: Vec<ButtonBinding>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            border_px: 1,
            snap: 32,
            bar_height: 20,
            show_bar: true,
            mfact: 0.5,
            nmaster: 1,
            tags: (1..=9).map(|n| n.to_string()).collect(),
            rules: Vec::new(),
            keys: Vec::new(),
            buttons: Vec::new(),
        }
    }
}

impl Config {
    /// Load the user config, falling back to compiled defaults when no
    /// file exists. A present-but-broken file is an error; silently
    /// running with defaults in that case hides the typo from the user.
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) if path.exists() => {
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let config: Config = serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse {}", path.display()))?;
                config.validate()?;
                tracing::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            _ => {
                tracing::info!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("shoji").join("config.json"))
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.tags.is_empty(), "at least one tag is required");
        anyhow::ensure!(
            (0.05..=0.95).contains(&self.mfact),
            "mfact {} outside [0.05, 0.95]",
            self.mfact
        );
        anyhow::ensure!(self.bar_height > 0, "bar_height must be positive");
        Ok(())
    }
}
