//! Pipeline configuration
//!
//! Successive revisions of the original bake scripts disagreed on a couple of
//! behaviors (whether the models subtree gets compressed, whether a cheap
//! preview raster is kept), so those are explicit toggles here rather than
//! hardcoded.

use std::path::PathBuf;

/// Configuration for one bake run.
#[derive(Debug, Clone)]
pub struct BakeConfig {
    /// Source asset tree. Never mutated.
    pub assets_dir: PathBuf,
    /// Staged output tree. Deleted and rebuilt from scratch every run.
    pub baked_dir: PathBuf,
    /// Texture subtree name. This cannot be configured in the level editor,
    /// it is what TrenchBroom expects.
    pub textures_subdir: String,
    /// Models subtree name (glTF scenes live here).
    pub models_subdir: String,
    /// Skip the models subtree during texture encoding.
    pub exclude_models: bool,
    /// Emit a quality-1 JPEG next to each compressed color texture for use as
    /// a cheap preview/placeholder.
    pub write_previews: bool,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            baked_dir: PathBuf::from("assets_baked"),
            textures_subdir: "textures".to_string(),
            models_subdir: "models".to_string(),
            exclude_models: false,
            write_previews: true,
        }
    }
}

impl BakeConfig {
    /// Texture subtree inside the staged tree.
    pub fn baked_textures_dir(&self) -> PathBuf {
        self.baked_dir.join(&self.textures_subdir)
    }

    /// Texture subtree inside the source tree.
    pub fn source_textures_dir(&self) -> PathBuf {
        self.assets_dir.join(&self.textures_subdir)
    }

    /// Models subtree inside the staged tree.
    pub fn baked_models_dir(&self) -> PathBuf {
        self.baked_dir.join(&self.models_subdir)
    }
}
