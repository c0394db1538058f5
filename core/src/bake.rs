//! Pipeline orchestration
//!
//! Runs the four stages in order against a freshly staged copy of the source
//! tree. Control flows strictly top to bottom; each stage's on-disk side
//! effects are the only channel to the next one.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::config::BakeConfig;
use crate::encode::encode_textures;
use crate::error::{BakeError, Result};
use crate::maps::compile_maps;
use crate::normalize::normalize_textures;
use crate::rename::RenameTable;
use crate::rewrite::rewrite_references;
use crate::tool::{BAKE_TOOLS, ToolRunner, verify_tools};

/// Run the whole bake pipeline.
///
/// Returns the rename table so callers can report what was truncated.
pub fn run_bake(runner: &dyn ToolRunner, config: &BakeConfig) -> Result<RenameTable> {
    verify_tools(runner, BAKE_TOOLS)?;

    if !config.assets_dir.exists() {
        return Err(BakeError::MissingInput {
            path: config.assets_dir.clone(),
        });
    }

    let table = stage_assets(config)?;
    compile_maps(runner, &config.baked_dir, &table)?;
    encode_textures(runner, config)?;
    rewrite_references(runner, config)?;
    Ok(table)
}

/// Destroy any previous staged tree and rebuild it: the texture subtree goes
/// through the normalizer, everything else is copied verbatim.
pub fn stage_assets(config: &BakeConfig) -> Result<RenameTable> {
    if config.baked_dir.exists() {
        fs::remove_dir_all(&config.baked_dir)?;
    }
    fs::create_dir_all(&config.baked_dir)?;

    let source_textures = config.source_textures_dir();
    for entry in fs::read_dir(&config.assets_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path == source_textures {
            continue;
        }
        let target = config.baked_dir.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&path, &target)?;
        } else {
            fs::copy(&path, &target)?;
        }
    }

    let mut table = RenameTable::new();
    if source_textures.exists() {
        normalize_textures(&source_textures, &config.baked_textures_dir(), &mut table)?;
    }
    Ok(table)
}

fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
