//! Texture encoder adapter
//!
//! Walks the staged tree and converts every raster image to a KTX2 container
//! via the external `kram` encoder, choosing color-space and format flags
//! from the filename-suffix classification. The source raster is removed
//! only after the encoder exits successfully.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::COMPRESSED_EXTENSION;
use crate::classify::{TextureKind, classify, is_raster};
use crate::config::BakeConfig;
use crate::error::Result;
use crate::tool::ToolRunner;

/// Convert every raster under the staged tree to KTX2.
pub fn encode_textures(runner: &dyn ToolRunner, config: &BakeConfig) -> Result<()> {
    for raster in collect_rasters(config)? {
        encode_one(runner, &raster, config.write_previews)?;
    }
    Ok(())
}

fn encode_one(runner: &dyn ToolRunner, raster: &Path, write_preview: bool) -> Result<()> {
    let output = raster.with_extension(COMPRESSED_EXTENSION);
    tracing::info!(input = %raster.display(), output = %output.display(), "encoding texture");

    let kind = raster
        .file_stem()
        .and_then(|s| s.to_str())
        .map(classify)
        .unwrap_or(TextureKind::Color);

    let mut args = vec![
        "encode".to_string(),
        "-input".to_string(),
        raster.display().to_string(),
        "-output".to_string(),
        output.display().to_string(),
        "-mipmin".to_string(),
        "1".to_string(),
        "-zstd".to_string(),
        "0".to_string(),
        "-encoder".to_string(),
        "bcenc".to_string(),
    ];
    match kind {
        TextureKind::Normal => args.extend(["-normal", "-format", "bc5"].map(String::from)),
        TextureKind::Linear => args.extend(["-format", "bc5"].map(String::from)),
        TextureKind::Color => args.extend(["-srgb", "-format", "bc7"].map(String::from)),
    }
    runner.run_checked("kram", &args, None)?;

    let mut keep_source = false;
    if write_preview && kind == TextureKind::Color {
        let preview = raster.with_extension("jpg");
        runner.run_checked(
            "magick",
            &[
                raster.display().to_string(),
                "-quality".to_string(),
                "1".to_string(),
                preview.display().to_string(),
            ],
            None,
        )?;
        // A JPEG source was just overwritten by its own preview; removing it
        // would delete the preview too.
        keep_source = preview == raster;
    }

    if !keep_source {
        fs::remove_file(raster)?;
    }
    Ok(())
}

/// The rasters an encode pass will touch, in deterministic order.
pub fn collect_rasters(config: &BakeConfig) -> Result<Vec<PathBuf>> {
    let models_dir = config.baked_models_dir();
    let mut rasters = Vec::new();
    for entry in WalkDir::new(&config.baked_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if config.exclude_models && entry.path().starts_with(&models_dir) {
            continue;
        }
        if is_raster(entry.path()) {
            rasters.push(entry.into_path());
        }
    }
    Ok(rasters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BakeError;
    use crate::tool::fake::FakeRunner;
    use std::fs;
    use tempfile::tempdir;

    fn config_for(dir: &Path) -> BakeConfig {
        BakeConfig {
            baked_dir: dir.to_path_buf(),
            write_previews: false,
            ..BakeConfig::default()
        }
    }

    fn kram_args_for(runner: &FakeRunner, file_name: &str) -> Vec<String> {
        runner
            .invocations
            .borrow()
            .iter()
            .find(|i| i.program == "kram" && i.args.iter().any(|a| a.ends_with(file_name)))
            .map(|i| i.args.clone())
            .unwrap_or_else(|| panic!("no kram invocation for {file_name}"))
    }

    #[test]
    fn test_flags_follow_classification() {
        let tmp = tempdir().unwrap();
        let textures = tmp.path().join("textures/rock");
        fs::create_dir_all(&textures).unwrap();
        fs::write(tmp.path().join("textures/rock.png"), "png").unwrap();
        fs::write(textures.join("rock_normal.png"), "png").unwrap();
        fs::write(textures.join("rock_roughness.png"), "png").unwrap();

        let runner = FakeRunner::default();
        encode_textures(&runner, &config_for(tmp.path())).unwrap();

        let color = kram_args_for(&runner, "rock.png");
        assert!(color.contains(&"-srgb".to_string()));
        assert!(color.contains(&"bc7".to_string()));

        let normal = kram_args_for(&runner, "rock_normal.png");
        assert!(normal.contains(&"-normal".to_string()));
        assert!(normal.contains(&"bc5".to_string()));

        let linear = kram_args_for(&runner, "rock_roughness.png");
        assert!(!linear.contains(&"-normal".to_string()));
        assert!(!linear.contains(&"-srgb".to_string()));
        assert!(linear.contains(&"bc5".to_string()));
    }

    #[test]
    fn test_source_rasters_removed_after_success() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("rock.png"), "png").unwrap();

        let runner = FakeRunner::default();
        encode_textures(&runner, &config_for(tmp.path())).unwrap();

        assert!(!tmp.path().join("rock.png").exists());
    }

    #[test]
    fn test_failed_encode_keeps_the_source() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("rock.png"), "png").unwrap();

        let runner = FakeRunner {
            failing: vec!["kram".to_string()],
            ..Default::default()
        };
        let err = encode_textures(&runner, &config_for(tmp.path())).unwrap_err();

        assert!(matches!(err, BakeError::ToolFailed { .. }));
        assert!(tmp.path().join("rock.png").exists());
    }

    #[test]
    fn test_models_subtree_exclusion_toggle() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("models")).unwrap();
        fs::write(tmp.path().join("models/crate_albedo.png"), "png").unwrap();
        fs::write(tmp.path().join("splash.png"), "png").unwrap();

        let runner = FakeRunner::default();
        let config = BakeConfig {
            exclude_models: true,
            ..config_for(tmp.path())
        };
        encode_textures(&runner, &config).unwrap();

        assert!(tmp.path().join("models/crate_albedo.png").exists());
        assert!(!tmp.path().join("splash.png").exists());
    }

    #[test]
    fn test_preview_written_for_color_textures_only() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("rock.png"), "png").unwrap();
        fs::write(tmp.path().join("rock_normal.png"), "png").unwrap();

        let runner = FakeRunner::default();
        let config = BakeConfig {
            write_previews: true,
            ..config_for(tmp.path())
        };
        encode_textures(&runner, &config).unwrap();

        let magick_runs: Vec<_> = runner
            .invocations
            .borrow()
            .iter()
            .filter(|i| i.program == "magick")
            .cloned()
            .collect();
        assert_eq!(magick_runs.len(), 1);
        assert!(magick_runs[0].args[0].ends_with("rock.png"));
        assert!(magick_runs[0].args[3].ends_with("rock.jpg"));
    }

    #[test]
    fn test_jpeg_source_becomes_its_own_preview() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("poster.jpg"), "jpg").unwrap();

        let runner = FakeRunner::default();
        let config = BakeConfig {
            write_previews: true,
            ..config_for(tmp.path())
        };
        encode_textures(&runner, &config).unwrap();

        // magick overwrote the source in place; deleting it afterwards would
        // destroy the preview.
        assert!(tmp.path().join("poster.jpg").exists());
    }
}
