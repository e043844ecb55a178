use anyhow::Context;
use directories::{ProjectDirs, UserDirs};
use metamorph_core::{SceneStyle, SessionConfig, SimulationConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Canvas size used until the window reports its real layout.
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Wheel zoom factor is `2^(delta * wheel_sensitivity)`.
    pub wheel_sensitivity: f64,
    /// Where exports land; the user's download directory when unset.
    pub export_dir: Option<PathBuf>,
    /// Load host fonts so PNG exports carry labels.
    pub system_fonts: bool,
    pub last_history: Option<PathBuf>,
    pub simulation: SimulationConfig,
    pub style: SceneStyle,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            wheel_sensitivity: 0.002,
            export_dir: None,
            system_fonts: true,
            last_history: None,
            simulation: SimulationConfig::default(),
            style: SceneStyle::default(),
        }
    }
}

impl ViewerConfig {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            simulation: self.simulation.clone(),
            style: self.style.clone(),
            width: self.canvas_width,
            height: self.canvas_height,
        }
    }

    pub fn resolved_export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(|| {
                UserDirs::new().and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            })
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "metamorph")?;
    Some(proj.config_dir().join("viewer.toml"))
}

pub fn load_or_default() -> ViewerConfig {
    let Some(path) = config_file_path() else {
        return ViewerConfig::default();
    };
    load_or_default_from_path(&path)
}

fn load_or_default_from_path(path: &Path) -> ViewerConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return ViewerConfig::default();
    };
    toml::from_str(&contents).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "ignoring invalid viewer config");
        ViewerConfig::default()
    })
}

pub fn save(cfg: &ViewerConfig) -> anyhow::Result<PathBuf> {
    let Some(path) = config_file_path() else {
        return Err(anyhow::anyhow!("no config directory available"));
    };
    save_to_path(cfg, &path)?;
    Ok(path)
}

fn save_to_path(cfg: &ViewerConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize viewer config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write viewer config {}", path.display()))?;
    Ok(())
}
