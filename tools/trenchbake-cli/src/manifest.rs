//! Trenchbake.toml manifest parsing
//!
//! Optional project-level configuration shared by the bake subcommands. CLI
//! flags override manifest values; a missing manifest means defaults.
//!
//! ```toml
//! [paths]
//! assets = "assets"
//! baked = "assets_baked"
//!
//! [textures]
//! exclude_models = false
//! previews = true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use trenchbake_core::BakeConfig;

/// Trenchbake.toml manifest structure
#[derive(Debug, Default, Deserialize)]
pub struct BakeManifest {
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub textures: TexturesSection,
}

/// Source and staging locations
#[derive(Debug, Deserialize)]
pub struct PathsSection {
    #[serde(default = "default_assets")]
    pub assets: PathBuf,
    #[serde(default = "default_baked")]
    pub baked: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            assets: default_assets(),
            baked: default_baked(),
        }
    }
}

fn default_assets() -> PathBuf {
    PathBuf::from("assets")
}

fn default_baked() -> PathBuf {
    PathBuf::from("assets_baked")
}

/// Texture encoding toggles
#[derive(Debug, Deserialize)]
pub struct TexturesSection {
    /// Leave the models subtree out of KTX2 conversion.
    #[serde(default)]
    pub exclude_models: bool,
    /// Keep a quality-1 JPEG preview next to each compressed color texture.
    #[serde(default = "default_previews")]
    pub previews: bool,
}

impl Default for TexturesSection {
    fn default() -> Self {
        Self {
            exclude_models: false,
            previews: default_previews(),
        }
    }
}

fn default_previews() -> bool {
    true
}

impl BakeManifest {
    /// Load the manifest, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse trenchbake.toml")
    }

    /// Turn the manifest into a pipeline configuration.
    pub fn into_config(self) -> BakeConfig {
        BakeConfig {
            assets_dir: self.paths.assets,
            baked_dir: self.paths.baked,
            exclude_models: self.textures.exclude_models,
            write_previews: self.textures.previews,
            ..BakeConfig::default()
        }
    }
}
