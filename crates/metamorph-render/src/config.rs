use anyhow::{Context, Result};
use metamorph_core::{ExportFormat, SessionConfig};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_TICKS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub history: PathBuf,
    pub fraction: f64,
    pub search: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub svg: Option<PathBuf>,
    pub png: Option<PathBuf>,
    pub max_ticks: u64,
    pub config: Option<PathBuf>,
}

pub fn parse_args() -> Result<RenderConfig> {
    parse_args_from(std::env::args_os().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<RenderConfig>
where
    I: IntoIterator<Item = OsString>,
{
    let mut history = None;
    let mut fraction = 1.0;
    let mut search = String::new();
    let mut width = None;
    let mut height = None;
    let mut svg = None;
    let mut png = None;
    let mut max_ticks = DEFAULT_MAX_TICKS;
    let mut config = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let Some(flag) = arg.to_str() else {
            anyhow::bail!("unknown argument: {:?}", arg);
        };
        match flag {
            "--history" => history = Some(path_value(flag, args.next())?),
            "--svg" => svg = Some(path_value(flag, args.next())?),
            "--png" => png = Some(path_value(flag, args.next())?),
            "--config" => config = Some(path_value(flag, args.next())?),
            "--search" => search = text_value(flag, args.next())?,
            "--fraction" => {
                let value = text_value(flag, args.next())?;
                fraction = value
                    .parse::<f64>()
                    .ok()
                    .filter(|f| (0.0..=1.0).contains(f))
                    .with_context(|| format!("--fraction expects a number in [0, 1], got {value}"))?;
            }
            "--width" => width = Some(extent_value(flag, args.next())?),
            "--height" => height = Some(extent_value(flag, args.next())?),
            "--max-ticks" => {
                let value = text_value(flag, args.next())?;
                max_ticks = value
                    .parse()
                    .with_context(|| format!("--max-ticks expects a tick count, got {value}"))?;
            }
            _ => anyhow::bail!("unknown argument: {:?}", arg),
        }
    }

    let Some(history) = history else {
        anyhow::bail!("--history <commits.json> is required");
    };
    if svg.is_none() && png.is_none() {
        svg = Some(PathBuf::from(ExportFormat::Svg.file_name()));
    }

    Ok(RenderConfig {
        history,
        fraction,
        search,
        width,
        height,
        svg,
        png,
        max_ticks,
        config,
    })
}

fn text_value(flag: &str, value: Option<OsString>) -> Result<String> {
    let Some(value) = value else {
        anyhow::bail!("{flag} expects a value");
    };
    value
        .into_string()
        .map_err(|v| anyhow::anyhow!("{flag} value is not valid UTF-8: {:?}", v))
}

fn path_value(flag: &str, value: Option<OsString>) -> Result<PathBuf> {
    let Some(value) = value else {
        anyhow::bail!("{flag} expects a path");
    };
    Ok(PathBuf::from(value))
}

fn extent_value(flag: &str, value: Option<OsString>) -> Result<f64> {
    let value = text_value(flag, value)?;
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 1.0)
        .with_context(|| format!("{flag} expects a positive pixel size, got {value}"))
}

/// Simulation and style overrides; missing keys keep their defaults.
pub fn load_session_config(path: &Path) -> Result<SessionConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("invalid config {}", path.display()))
}
