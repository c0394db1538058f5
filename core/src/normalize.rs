//! Tree normalizer
//!
//! Walks the source texture tree and copies it into the staged tree,
//! flattening recognized texture groups to the destination root and
//! truncating identifiers that exceed the map format's name field.
//!
//! A texture group follows a tri-part convention at one directory level:
//!
//! - `F.png` (or `.jpg`/`.jpeg`) - the base color texture
//! - `F.toml` - the material descriptor (this sibling is what makes `F.png` a
//!   base color texture)
//! - `F/` - optional subdirectory of channel textures, each named
//!   `F<suffix>.<ext>`
//!
//! Directories that match neither role are recursed into unconditionally, so
//! nested groupings are found anywhere in the tree.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::classify::is_raster;
use crate::error::{BakeError, Result};
use crate::rename::{MAX_TEXTURE_NAME_LEN, RenameTable, fits_name_field};
use crate::rewrite::rewrite_extensions;

/// One recognized base-texture group.
#[derive(Debug)]
struct TextureGroup {
    /// Base name `F`.
    name: String,
    /// `F.<raster ext>`
    color: PathBuf,
    /// `F.toml`
    descriptor: PathBuf,
    /// `F/`, if present.
    channels: Option<PathBuf>,
}

/// Explicit classification of one directory's entries.
///
/// Listing the directory once into a typed set and applying the grouping
/// rules against that set keeps the recognition logic out of the filesystem.
#[derive(Debug)]
struct DirScan {
    groups: Vec<TextureGroup>,
    /// Directories not claimed as channel subdirectories.
    subdirs: Vec<PathBuf>,
    /// Files not claimed by any group.
    loose: Vec<PathBuf>,
}

fn scan_dir(dir: &Path) -> Result<DirScan> {
    let mut dirs: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut rasters: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut descriptors: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut other: Vec<PathBuf> = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            dirs.insert(name, path);
        } else if is_raster(&path) {
            let stem = name
                .rsplit_once('.')
                .map(|(stem, _)| stem.to_string())
                .unwrap_or(name);
            rasters.insert(stem, path);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            let stem = name
                .rsplit_once('.')
                .map(|(stem, _)| stem.to_string())
                .unwrap_or(name);
            descriptors.insert(stem, path);
        } else {
            other.push(path);
        }
    }

    let mut groups = Vec::new();
    for (stem, color) in rasters {
        // A raster is a base color texture iff a same-named descriptor sits
        // next to it.
        match descriptors.remove(&stem) {
            Some(descriptor) => {
                let channels = dirs.remove(&stem);
                groups.push(TextureGroup {
                    name: stem,
                    color,
                    descriptor,
                    channels,
                });
            }
            None => other.push(color),
        }
    }
    other.extend(descriptors.into_values());

    Ok(DirScan {
        groups,
        subdirs: dirs.into_values().collect(),
        loose: other,
    })
}

/// Copy the source texture tree into `dst`, normalizing names.
///
/// Returns nothing; the rename table passed in accumulates
/// `original relative identifier -> staged name` for every base color
/// texture, which the map compiler adapter later consults.
pub fn normalize_textures(src: &Path, dst: &Path, table: &mut RenameTable) -> Result<()> {
    if !src.exists() {
        return Err(BakeError::MissingInput {
            path: src.to_path_buf(),
        });
    }
    fs::create_dir_all(dst)?;
    normalize_level(src, "", dst, table)
}

fn normalize_level(dir: &Path, rel: &str, dst: &Path, table: &mut RenameTable) -> Result<()> {
    let scan = scan_dir(dir)?;

    for group in &scan.groups {
        copy_group(group, rel, dst, table)?;
    }

    for file in &scan.loose {
        let Some(name) = file.file_name() else {
            continue;
        };
        let target_dir = if rel.is_empty() {
            dst.to_path_buf()
        } else {
            dst.join(rel)
        };
        fs::create_dir_all(&target_dir)?;
        fs::copy(file, target_dir.join(name))?;
    }

    for sub in &scan.subdirs {
        let Some(name) = sub.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let child_rel = if rel.is_empty() {
            name
        } else {
            format!("{rel}/{name}")
        };
        normalize_level(sub, &child_rel, dst, table)?;
    }

    Ok(())
}

fn copy_group(group: &TextureGroup, rel: &str, dst: &Path, table: &mut RenameTable) -> Result<()> {
    let key = if rel.is_empty() {
        group.name.clone()
    } else {
        format!("{rel}/{}", group.name)
    };

    let descriptor_text = fs::read_to_string(&group.descriptor)?;
    let staged_name = if is_base_material(&descriptor_text) {
        // Base material definitions are referenced by name from other
        // descriptors, so the pipeline must not rename them behind the
        // author's back.
        if !fits_name_field(&group.name) {
            return Err(BakeError::BaseMaterialNameTooLong {
                name: group.name.clone(),
                limit: MAX_TEXTURE_NAME_LEN,
            });
        }
        if table.is_staged(&group.name) {
            return Err(BakeError::BaseMaterialNameTaken {
                name: group.name.clone(),
            });
        }
        table.record(&key, &group.name);
        group.name.clone()
    } else if fits_name_field(&group.name) && !table.is_staged(&group.name) {
        table.record(&key, &group.name);
        group.name.clone()
    } else {
        // Over-length, or the flattened name is already taken by another
        // group; either way a numeric replacement keeps it unambiguous.
        table.assign(&key).to_string()
    };

    tracing::debug!(original = %key, staged = %staged_name, "normalizing texture group");

    // Base color texture, flattened to the destination root.
    let color_ext = group
        .color
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    fs::copy(&group.color, dst.join(format!("{staged_name}.{color_ext}")))?;

    // Descriptor, rewritten to reference compressed textures.
    fs::write(
        dst.join(format!("{staged_name}.toml")),
        rewrite_extensions(&descriptor_text),
    )?;

    // Channel textures move into a correspondingly renamed subdirectory.
    if let Some(channel_dir) = &group.channels {
        let staged_channel_dir = dst.join(&staged_name);
        fs::create_dir_all(&staged_channel_dir)?;
        for entry in fs::read_dir(channel_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let (stem, ext) = file_name
                .rsplit_once('.')
                .map(|(s, e)| (s.to_string(), e.to_string()))
                .unwrap_or((file_name.clone(), String::new()));
            let suffix = channel_suffix(&path, &stem, &group.name)?;
            let staged_file = if ext.is_empty() {
                format!("{staged_name}{suffix}")
            } else {
                format!("{staged_name}{suffix}.{ext}")
            };
            fs::copy(&path, staged_channel_dir.join(staged_file))?;
        }
    }

    Ok(())
}

/// Derive the channel suffix from `F<suffix>`, failing loudly when the file
/// does not extend its base name. An empty suffix would make classification
/// silently default to color, so it is a hard precondition violation.
fn channel_suffix<'a>(path: &Path, stem: &'a str, base: &str) -> Result<&'a str> {
    match stem.strip_prefix(base) {
        Some(suffix) if !suffix.is_empty() => Ok(suffix),
        _ => Err(BakeError::BadChannelTexture {
            path: path.to_path_buf(),
            base: base.to_string(),
        }),
    }
}

/// A descriptor declares a long-form base material when it uses the `$`
/// templating token without inheriting from another material.
fn is_base_material(descriptor: &str) -> bool {
    descriptor.contains('$') && !descriptor.contains("inherits")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_short_identifier_survives_unchanged() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("textures");
        let dst = tmp.path().join("baked");
        write(&src.join("rock.png"), "png");
        write(&src.join("rock.toml"), "albedo = \"rock.png\"\n");
        write(&src.join("rock/rock_normal.png"), "png");
        write(&src.join("rock/rock_roughness.png"), "png");

        let mut table = RenameTable::new();
        normalize_textures(&src, &dst, &mut table).unwrap();

        assert!(dst.join("rock.png").exists());
        assert!(dst.join("rock.toml").exists());
        assert!(dst.join("rock/rock_normal.png").exists());
        assert!(dst.join("rock/rock_roughness.png").exists());
        // Descriptor now references the compressed container.
        let descriptor = fs::read_to_string(dst.join("rock.toml")).unwrap();
        assert_eq!(descriptor, "albedo = \"rock.ktx2\"\n");
        assert_eq!(table.get("rock"), Some("rock"));
    }

    #[test]
    fn test_over_length_identifier_is_truncated_and_memoized() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("textures");
        let dst = tmp.path().join("baked");
        let long = "a_very_long_texture_name";
        assert!(long.len() > MAX_TEXTURE_NAME_LEN);
        write(&src.join(format!("{long}.png")), "png");
        write(&src.join(format!("{long}.toml")), "inherits = \"base\"\n");
        write(&src.join(format!("{long}/{long}_normal.png")), "png");

        let mut table = RenameTable::new();
        normalize_textures(&src, &dst, &mut table).unwrap();

        assert_eq!(table.get(long), Some("0"));
        assert!(dst.join("0.png").exists());
        assert!(dst.join("0.toml").exists());
        assert!(dst.join("0/0_normal.png").exists());
    }

    #[test]
    fn test_nested_groups_are_flattened_to_root() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("textures");
        let dst = tmp.path().join("baked");
        write(&src.join("stone/floor/slate.png"), "png");
        write(&src.join("stone/floor/slate.toml"), "");

        let mut table = RenameTable::new();
        normalize_textures(&src, &dst, &mut table).unwrap();

        assert!(dst.join("slate.png").exists());
        assert!(dst.join("slate.toml").exists());
        assert_eq!(table.get("stone/floor/slate"), Some("slate"));
    }

    #[test]
    fn test_duplicate_group_names_stage_distinctly() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("textures");
        let dst = tmp.path().join("baked");
        write(&src.join("stone/slate.png"), "stone pixels");
        write(&src.join("stone/slate.toml"), "");
        write(&src.join("wood/slate.png"), "wood pixels");
        write(&src.join("wood/slate.toml"), "");

        let mut table = RenameTable::new();
        normalize_textures(&src, &dst, &mut table).unwrap();

        // Subdirectories are visited in name order, so the stone group keeps
        // the flattened name and the wood group gets a replacement.
        assert_eq!(table.get("stone/slate"), Some("slate"));
        assert_eq!(table.get("wood/slate"), Some("0"));
        assert_eq!(
            fs::read_to_string(dst.join("slate.png")).unwrap(),
            "stone pixels"
        );
        assert_eq!(
            fs::read_to_string(dst.join("0.png")).unwrap(),
            "wood pixels"
        );
    }

    #[test]
    fn test_base_material_name_collision_is_fatal() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("textures");
        let dst = tmp.path().join("baked");
        write(&src.join("stone/slate.png"), "png");
        write(&src.join("stone/slate.toml"), "");
        // Same flattened name, but this one cannot be renamed.
        write(&src.join("wood/slate.png"), "png");
        write(&src.join("wood/slate.toml"), "albedo = \"$albedo\"\n");

        let mut table = RenameTable::new();
        let err = normalize_textures(&src, &dst, &mut table).unwrap_err();
        assert!(matches!(err, BakeError::BaseMaterialNameTaken { .. }));
    }

    #[test]
    fn test_channel_texture_without_suffix_is_fatal() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("textures");
        let dst = tmp.path().join("baked");
        write(&src.join("rock.png"), "png");
        write(&src.join("rock.toml"), "");
        // Name equal to the base name: no suffix can be derived.
        write(&src.join("rock/rock.png"), "png");

        let mut table = RenameTable::new();
        let err = normalize_textures(&src, &dst, &mut table).unwrap_err();
        assert!(matches!(err, BakeError::BadChannelTexture { .. }));
    }

    #[test]
    fn test_over_length_base_material_is_a_configuration_error() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("textures");
        let dst = tmp.path().join("baked");
        let long = "base_material_with_long_name";
        write(&src.join(format!("{long}.png")), "png");
        // `$` template token and no `inherits`: a base material definition.
        write(&src.join(format!("{long}.toml")), "albedo = \"$albedo\"\n");

        let mut table = RenameTable::new();
        let err = normalize_textures(&src, &dst, &mut table).unwrap_err();
        assert!(matches!(err, BakeError::BaseMaterialNameTooLong { .. }));
    }

    #[test]
    fn test_templated_descriptor_with_inherits_is_still_truncated() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("textures");
        let dst = tmp.path().join("baked");
        let long = "inheriting_material_long_name";
        write(&src.join(format!("{long}.png")), "png");
        write(
            &src.join(format!("{long}.toml")),
            "inherits = \"/textures/base.toml\"\nalbedo = \"$albedo\"\n",
        );

        let mut table = RenameTable::new();
        normalize_textures(&src, &dst, &mut table).unwrap();
        assert_eq!(table.get(long), Some("0"));
    }

    #[test]
    fn test_rasters_without_descriptor_are_copied_verbatim() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("textures");
        let dst = tmp.path().join("baked");
        write(&src.join("ui/crosshair.png"), "png");

        let mut table = RenameTable::new();
        normalize_textures(&src, &dst, &mut table).unwrap();

        assert!(dst.join("ui/crosshair.png").exists());
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_source_dir_is_fatal() {
        let tmp = tempdir().unwrap();
        let mut table = RenameTable::new();
        let err = normalize_textures(
            &tmp.path().join("does_not_exist"),
            &tmp.path().join("baked"),
            &mut table,
        )
        .unwrap_err();
        assert!(matches!(err, BakeError::MissingInput { .. }));
    }
}
