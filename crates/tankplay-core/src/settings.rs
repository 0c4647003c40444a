use crate::env::{EwEnvironment, DEFAULT_INSTALLATION};
use crate::error::{Result, TankplayError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// SettingsWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// EarthwormSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarthwormSettings {
    /// Overrides the sourced `EW_PARAMS` for child processes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<PathBuf>,
    #[serde(default = "default_installation")]
    pub installation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<PathBuf>,
}

fn default_installation() -> String {
    DEFAULT_INSTALLATION.to_string()
}

impl Default for EarthwormSettings {
    fn default() -> Self {
        Self {
            params: None,
            installation: default_installation(),
            log: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ToolSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_tankplayer")]
    pub tankplayer: String,
    #[serde(default = "default_tanksniff")]
    pub tanksniff: String,
}

fn default_tankplayer() -> String {
    "tankplayer".to_string()
}

fn default_tanksniff() -> String {
    "tanksniff".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tankplayer: default_tankplayer(),
            tanksniff: default_tanksniff(),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub earthworm: EarthwormSettings,
    #[serde(default)]
    pub tools: ToolSettings,
    /// Directory receiving `tank_start.log`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            earthworm: EarthwormSettings::default(),
            tools: ToolSettings::default(),
            log_dir: None,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TankplayError::SettingsNotFound(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&data)?;
        Ok(settings)
    }

    /// Load `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Build the environment for child processes. `sourced_params` is the
    /// `EW_PARAMS` found at startup and `inherited_log` the inherited `EW_LOG`.
    pub fn ew_environment(
        &self,
        sourced_params: &Path,
        inherited_log: Option<PathBuf>,
    ) -> EwEnvironment {
        let params = self
            .earthworm
            .params
            .clone()
            .unwrap_or_else(|| sourced_params.to_path_buf());
        let log = self
            .earthworm
            .log
            .clone()
            .or(inherited_log)
            .unwrap_or_else(|| match params.parent() {
                Some(parent) => parent.join("logs"),
                None => params.join("logs"),
            });
        EwEnvironment {
            params,
            installation: self.earthworm.installation.clone(),
            log,
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn tankplayer(&self) -> PathBuf {
        resolve_tool(&self.tools.tankplayer)
    }

    pub fn tanksniff(&self) -> PathBuf {
        resolve_tool(&self.tools.tanksniff)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<SettingsWarning> {
        let mut warnings = Vec::new();

        if self.version != SETTINGS_VERSION {
            warnings.push(SettingsWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "unknown settings version {} (expected {})",
                    self.version, SETTINGS_VERSION
                ),
            });
        }

        for (key, value) in [
            ("tools.tankplayer", &self.tools.tankplayer),
            ("tools.tanksniff", &self.tools.tanksniff),
        ] {
            if value.trim().is_empty() {
                warnings.push(SettingsWarning {
                    level: WarnLevel::Error,
                    message: format!("{key} is empty"),
                });
            }
        }

        if self.earthworm.installation.trim().is_empty() {
            warnings.push(SettingsWarning {
                level: WarnLevel::Warning,
                message: "earthworm.installation is empty; EW_INSTALLATION will be blank"
                    .to_string(),
            });
        }

        warnings
    }
}

/// Paths are used as given; bare names are looked up on `PATH` and left
/// unresolved when not found so the spawn error names the tool.
pub fn resolve_tool(name: &str) -> PathBuf {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return candidate.to_path_buf();
    }
    which::which(name).unwrap_or_else(|_| candidate.to_path_buf())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
