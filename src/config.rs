use anyhow::{Context, Result};
use faceform_geometry::AnalysisConfig;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub static CONFIG_PATH: Lazy<&'static Path> = Lazy::new(|| {
    Path::new(option_env!("FACEFORM_CONFIG_PATH").unwrap_or("/usr/local/etc/faceform/config.toml"))
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the annotated images are written to.
    pub output_dir: PathBuf,
    /// Embed base64 JPEGs in the JSON report.
    pub embed_images: bool,
    pub analysis: AnalysisConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            embed_images: false,
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let layout = &self.analysis.layout;
        if let Some(idx) = layout.out_of_range_index() {
            anyhow::bail!(
                "layout '{}' references index {} but only has {} points",
                layout.name,
                idx,
                layout.num_points
            );
        }
        anyhow::ensure!(
            self.analysis.symmetry.max_deviation > 0.0,
            "symmetry.max_deviation must be positive"
        );
        anyhow::ensure!(
            (1..=100).contains(&self.analysis.jpeg_quality),
            "jpeg_quality must be within 1..=100"
        );
        Ok(())
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or(&CONFIG_PATH);
    if !path.exists() {
        log::debug!("no config at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validating config {}", path.display()))?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or(&CONFIG_PATH);
    let data = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)?;
    Ok(())
}
