//! Reference rewriter
//!
//! Points descriptor files at the compressed textures after encoding. This
//! is plain text substitution of extension strings, not a parse of the
//! descriptor formats; it assumes raster extensions never appear as
//! substrings in unrelated contexts within these files.
//!
//! glTF scenes additionally carry embedded binary texture references that a
//! text pass cannot reach, so those go through the external `klafsa` tool.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::COMPRESSED_EXTENSION;
use crate::classify::{TEXTURE_EXTENSIONS, is_raster};
use crate::config::BakeConfig;
use crate::error::Result;
use crate::tool::ToolRunner;

const SCENE_EXTENSIONS: &[&str] = &["gltf", "glb"];

/// Replace every raster extension occurrence with the compressed-container
/// extension.
pub fn rewrite_extensions(content: &str) -> String {
    let mut content = content.to_string();
    for ext in TEXTURE_EXTENSIONS {
        content = content.replace(&format!(".{ext}"), &format!(".{COMPRESSED_EXTENSION}"));
    }
    content
}

/// Rewrite all material descriptors and glTF scenes under the staged tree.
pub fn rewrite_references(runner: &dyn ToolRunner, config: &BakeConfig) -> Result<()> {
    let mut descriptors = Vec::new();
    let mut scenes = Vec::new();
    for entry in WalkDir::new(&config.baked_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if ext == "toml" {
            descriptors.push(entry.into_path());
        } else if SCENE_EXTENSIONS.contains(&ext) && !is_klafsa_output(entry.path()) {
            // A `<stem>_ktx2` scene is klafsa output from an earlier or
            // aborted run; it gets renamed over its original, not processed
            // as a scene of its own.
            scenes.push(entry.into_path());
        }
    }

    for descriptor in descriptors {
        tracing::debug!(file = %descriptor.display(), "rewriting material descriptor");
        let content = fs::read_to_string(&descriptor)?;
        fs::write(&descriptor, rewrite_extensions(&content))?;
    }

    for scene in scenes {
        rewrite_scene(runner, &scene)?;
    }
    Ok(())
}

/// Rewrite one glTF scene: text pass for `.gltf`, then `klafsa` for the
/// embedded binary references, then orphaned-raster cleanup.
fn rewrite_scene(runner: &dyn ToolRunner, scene: &Path) -> Result<()> {
    tracing::info!(file = %scene.display(), "rewriting scene textures");

    // .glb is binary; only the JSON flavor gets the text pass.
    if scene.extension().is_some_and(|e| e == "gltf") {
        let content = fs::read_to_string(scene)?;
        fs::write(scene, rewrite_extensions(&content))?;
    }

    // Containers already on disk came from the encode stage, and the rasters
    // sitting next to those are deliberate survivors (previews, sources the
    // encoder kept). Only containers klafsa itself writes orphan a raster.
    let preexisting = match scene.parent() {
        Some(dir) => compressed_containers(dir)?,
        None => HashSet::new(),
    };

    runner.run_checked(
        "klafsa",
        &[
            "gltf".to_string(),
            "--container".to_string(),
            COMPRESSED_EXTENSION.to_string(),
            scene.display().to_string(),
        ],
        None,
    )?;

    // klafsa writes `<stem>_ktx2.<ext>` next to the input; that output
    // replaces the original.
    let rewritten = klafsa_output_path(scene);
    if rewritten.exists() {
        fs::rename(&rewritten, scene)?;
    }

    // Rasters whose compressed counterpart klafsa just wrote are now
    // orphans.
    if let Some(dir) = scene.parent() {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !is_raster(&path) {
                continue;
            }
            let compressed = path.with_extension(COMPRESSED_EXTENSION);
            if compressed.exists() && !preexisting.contains(&compressed) {
                tracing::debug!(file = %path.display(), "removing orphaned raster");
                fs::remove_file(&path)?;
            }
        }
    }
    Ok(())
}

fn compressed_containers(dir: &Path) -> Result<HashSet<PathBuf>> {
    let mut containers = HashSet::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == COMPRESSED_EXTENSION) {
            containers.insert(path);
        }
    }
    Ok(containers)
}

fn is_klafsa_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.ends_with(&format!("_{COMPRESSED_EXTENSION}")))
}

fn klafsa_output_path(scene: &Path) -> std::path::PathBuf {
    let stem = scene
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = scene
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    scene.with_file_name(format!("{stem}_{COMPRESSED_EXTENSION}.{ext}"))
}
