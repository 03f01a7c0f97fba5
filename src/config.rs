use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// How a configurable function parameter is fed when a wrapper calls it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "value")]
pub enum ParamSetting {
    Uv,
    CenteredUv,
    Custom(String),
}

/// Names of the shader environment plus per-parameter overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentOptions {
    /// Reserved per-pixel entry point.
    pub entry_point: String,
    /// Output color parameter of the entry point.
    pub output_var: String,
    /// Pixel coordinate parameter of the entry point.
    pub coord_var: String,
    /// Viewport resolution uniform.
    pub resolution_uniform: String,
    /// Bound texture inputs, first one feeds `sampler2D` parameters.
    pub texture_inputs: Vec<String>,
    /// Overrides keyed by parameter name.
    pub param_overrides: HashMap<String, ParamSetting>,
    /// How far to look for the editor's line text when line numbers drifted.
    pub drift_window: usize,
}

impl Default for InstrumentOptions {
    fn default() -> Self {
        Self {
            entry_point: "mainImage".to_string(),
            output_var: "fragColor".to_string(),
            coord_var: "fragCoord".to_string(),
            resolution_uniform: "iResolution".to_string(),
            texture_inputs: (0..4).map(|i| format!("iChannel{}", i)).collect(),
            param_overrides: HashMap::new(),
            drift_window: 8,
        }
    }
}

impl InstrumentOptions {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
