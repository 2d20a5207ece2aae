use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::parser::extract::images::ImageScope;

/// Looked up in the working directory when `--config` is not given.
const DEFAULT_FILE: &str = "recipe_parser";
const ENV_PREFIX: &str = "RECIPES";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root that identifier keys and `source_path` are relative to.
    pub base_dir: PathBuf,
    pub dishes_dir: PathBuf,
    pub tips_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Identifier mapping (relative path → id), JSON.
    pub id_map: PathBuf,
    /// Image mapping (original → transferred reference), JSON.
    pub image_map: PathBuf,
    pub image_scope: ImageScope,
    pub images: ImageSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub enabled: bool,
    pub target_dir: PathBuf,
    /// Prepended to the stored file's path, e.g. a CDN origin.
    pub public_prefix: String,
    pub timeout_secs: u64,
    pub jpeg_quality: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_dir: PathBuf::from("."),
            dishes_dir: PathBuf::from("dishes"),
            tips_dir: PathBuf::from("tips"),
            output_dir: PathBuf::from("recipes"),
            id_map: PathBuf::from("recipes/uuid/uuid.json"),
            image_map: PathBuf::from("recipes/uuid/images.json"),
            image_scope: ImageScope::default(),
            images: ImageSettings::default(),
        }
    }
}

impl Default for ImageSettings {
    fn default() -> Self {
        ImageSettings {
            enabled: true,
            target_dir: PathBuf::from("recipes/images"),
            public_prefix: String::new(),
            timeout_secs: 30,
            jpeg_quality: 85,
        }
    }
}

impl Settings {
    /// Defaults, then the TOML file, then `RECIPES_*` variables
    /// (`__` separates nested keys: `RECIPES_IMAGES__ENABLED=false`).
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.images.jpeg_quality) {
            bail!("images.jpeg_quality must be within 1..=100");
        }
        if self.images.timeout_secs == 0 {
            bail!("images.timeout_secs must be greater than 0");
        }
        Ok(())
    }

    /// `path` resolved against `base_dir` (absolute paths pass through).
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }
}
