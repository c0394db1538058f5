//! Map compiler adapter
//!
//! Rewrites texture references in `.map` sources using the rename table, then
//! drives the external geometry compiler (`qbsp`) and lightmap baker
//! (`light`) over each map in the staged tree. Compiled `.bsp` output lands
//! next to the source; transient compiler droppings are cleaned up
//! afterwards. Any nonzero compiler exit aborts the whole run.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;
use crate::rename::RenameTable;
use crate::tool::ToolRunner;

/// Intermediate files the compilers leave next to the map.
const TRANSIENT_EXTENSIONS: &[&str] = &["log", "prt", "texinfo.json"];

/// Compile every `.map` file under `baked_dir`.
pub fn compile_maps(
    runner: &dyn ToolRunner,
    baked_dir: &Path,
    table: &RenameTable,
) -> Result<()> {
    // Editor-generated backups are not part of the shippable asset set.
    remove_autosave_dirs(baked_dir)?;

    let map_files = collect_files_with_extension(baked_dir, "map")?;
    for map_file in map_files {
        rewrite_map_references(&map_file, table)?;
        compile_map(runner, &map_file)?;
    }
    Ok(())
}

/// Replace every whitespace-bounded occurrence of an original texture
/// identifier with its staged replacement.
pub fn rewrite_map_references(map_file: &Path, table: &RenameTable) -> Result<()> {
    let mut content = fs::read_to_string(map_file)?;
    for (original, replacement) in table.iter() {
        if original != replacement {
            content = replace_token(&content, original, replacement);
        }
    }
    fs::write(map_file, content)?;
    Ok(())
}

fn compile_map(runner: &dyn ToolRunner, map_file: &Path) -> Result<()> {
    tracing::info!(map = %map_file.display(), "compiling map");

    // The compilers run for minutes on a real map; their progress output
    // goes straight to the terminal instead of being captured.
    let map_arg = map_file.display().to_string();
    runner.run_streamed_checked("qbsp", &["-bsp2".to_string(), map_arg], None)?;

    let bsp_file = map_file.with_extension("bsp");
    let bsp_arg = bsp_file.display().to_string();
    runner.run_streamed_checked(
        "light",
        &["-extra4".to_string(), "-novanilla".to_string(), bsp_arg],
        None,
    )?;

    for ext in TRANSIENT_EXTENSIONS {
        let transient = map_file.with_extension(ext);
        if transient.exists() {
            fs::remove_file(transient)?;
        }
    }
    Ok(())
}

/// Delete every directory literally named `autosave` under `root`.
fn remove_autosave_dirs(root: &Path) -> Result<()> {
    let mut autosaves = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if entry.file_type().is_dir() && entry.file_name() == "autosave" {
            autosaves.push(entry.into_path());
        }
    }
    for dir in autosaves {
        // A parent autosave directory may already have taken a nested one
        // with it.
        if dir.exists() {
            tracing::debug!(dir = %dir.display(), "removing editor autosaves");
            fs::remove_dir_all(&dir)?;
        }
    }
    Ok(())
}

fn collect_files_with_extension(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|e| e == extension)
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Replace `from` with `to` wherever `from` occurs as a standalone token
/// (bounded by whitespace or the ends of the text). Partial-token matches
/// are left alone.
pub fn replace_token(content: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return content.to_string();
    }
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for (idx, _) in content.match_indices(from) {
        if idx < last {
            continue;
        }
        let end = idx + from.len();
        let bounded_before = content[..idx]
            .chars()
            .next_back()
            .is_none_or(char::is_whitespace);
        let bounded_after = content[end..].chars().next().is_none_or(char::is_whitespace);
        if bounded_before && bounded_after {
            out.push_str(&content[last..idx]);
            out.push_str(to);
            last = end;
        }
    }
    out.push_str(&content[last..]);
    out
}
