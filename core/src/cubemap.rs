//! Cubemap baking utility
//!
//! Turns an equirectangular EXR environment map into a cubemap KTX2 with
//! half-float channels. The actual image work is delegated to `exrenvmap`
//! (face extraction), `magick` and `oiiotool` (per-face cleanup), and `ktx`
//! (container assembly).

use std::fs;
use std::path::{Path, PathBuf};

use crate::COMPRESSED_EXTENSION;
use crate::error::{BakeError, Result};
use crate::tool::ToolRunner;

/// Face order as `exrenvmap` names them.
pub const CUBEMAP_FACES: &[&str] = &["+X", "-X", "+Y", "-Y", "+Z", "-Z"];

/// Face order `ktx create --cubemap` expects. Note the flipped Z pair
/// relative to [`CUBEMAP_FACES`].
const KTX_FACE_ORDER: &[&str] = &["+X", "-X", "+Y", "-Y", "-Z", "+Z"];

/// Result of one cubemap bake.
#[derive(Debug)]
pub struct CubemapOutput {
    /// The assembled `.ktx2` container.
    pub container: PathBuf,
    /// The `vkFormat` line reported by `ktx info`, if present.
    pub vk_format: Option<String>,
}

fn face_file(face: &str) -> String {
    format!("cubemap_{face}.exr")
}

/// Bake `input` into `<stem>.ktx2` inside `work_dir`.
///
/// The six intermediate face files are written into `work_dir` and removed
/// again after the container has been assembled.
pub fn create_cubemap(
    runner: &dyn ToolRunner,
    input: &Path,
    work_dir: &Path,
) -> Result<CubemapOutput> {
    if !input.exists() {
        return Err(BakeError::MissingInput {
            path: input.to_path_buf(),
        });
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cubemap".to_string());

    // Extract the six faces from the equirectangular source.
    runner.run_checked(
        "exrenvmap",
        &[
            "-c".to_string(),
            "-li".to_string(),
            "-w".to_string(),
            "512".to_string(),
            "-m".to_string(),
            "-z".to_string(),
            "none".to_string(),
            input.display().to_string(),
            "cubemap_%.exr".to_string(),
        ],
        Some(work_dir),
    )?;
    tracing::info!("created cubemap faces from equirectangular input");

    // Normalize each face in place: ImageMagick rewrites the header, OIIO
    // clears NaNs left by the projection.
    for face in CUBEMAP_FACES {
        let face = face_file(face);
        runner.run_checked("magick", &[face.clone(), face.clone()], Some(work_dir))?;
        runner.run_checked(
            "oiiotool",
            &[
                face.clone(),
                "--fixnan".to_string(),
                "box3".to_string(),
                "-o".to_string(),
                face.clone(),
            ],
            Some(work_dir),
        )?;
        tracing::debug!(face, "processed cubemap face");
    }

    let container_name = format!("{stem}.{COMPRESSED_EXTENSION}");
    let container = work_dir.join(&container_name);
    if container.exists() {
        fs::remove_file(&container)?;
    }

    let mut args = vec![
        "create".to_string(),
        "--format".to_string(),
        "R16G16B16A16_SFLOAT".to_string(),
        "--assign-tf".to_string(),
        "linear".to_string(),
        "--cubemap".to_string(),
        "--zstd".to_string(),
        "3".to_string(),
    ];
    args.extend(KTX_FACE_ORDER.iter().map(|f| face_file(f)));
    args.push(container_name.clone());
    runner.run_checked("ktx", &args, Some(work_dir))?;

    let info = runner.run_checked(
        "ktx",
        &["info".to_string(), container_name],
        Some(work_dir),
    )?;
    let vk_format = info
        .stdout
        .lines()
        .find(|line| line.contains("vkFormat"))
        .map(|line| line.trim().to_string());

    for face in CUBEMAP_FACES {
        let face_path = work_dir.join(face_file(face));
        if face_path.exists() {
            fs::remove_file(face_path)?;
        }
    }

    Ok(CubemapOutput {
        container,
        vk_format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::fake::FakeRunner;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cubemap_tool_sequence() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("sky.exr");
        fs::write(&input, "exr").unwrap();

        let runner = FakeRunner {
            stdout: HashMap::from([(
                "ktx".to_string(),
                "vkFormat: VK_FORMAT_R16G16B16A16_SFLOAT\n".to_string(),
            )]),
            ..Default::default()
        };
        let output = create_cubemap(&runner, &input, tmp.path()).unwrap();

        let programs = runner.programs_run();
        assert_eq!(programs[0], "exrenvmap");
        // Six faces, each fixed by magick then oiiotool.
        assert_eq!(
            programs[1..13]
                .iter()
                .filter(|p| *p == "magick")
                .count(),
            6
        );
        assert_eq!(
            programs[1..13]
                .iter()
                .filter(|p| *p == "oiiotool")
                .count(),
            6
        );
        assert_eq!(&programs[13..], &["ktx", "ktx"]);

        assert_eq!(output.container, tmp.path().join("sky.ktx2"));
        assert_eq!(
            output.vk_format.as_deref(),
            Some("vkFormat: VK_FORMAT_R16G16B16A16_SFLOAT")
        );
    }

    #[test]
    fn test_ktx_create_uses_flipped_z_order() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("sky.exr");
        fs::write(&input, "exr").unwrap();

        let runner = FakeRunner::default();
        create_cubemap(&runner, &input, tmp.path()).unwrap();

        let invocations = runner.invocations.borrow();
        let create = invocations
            .iter()
            .find(|i| i.program == "ktx" && i.args[0] == "create")
            .unwrap();
        let faces: Vec<&str> = create
            .args
            .iter()
            .filter(|a| a.starts_with("cubemap_"))
            .map(String::as_str)
            .collect();
        assert_eq!(
            faces,
            [
                "cubemap_+X.exr",
                "cubemap_-X.exr",
                "cubemap_+Y.exr",
                "cubemap_-Y.exr",
                "cubemap_-Z.exr",
                "cubemap_+Z.exr"
            ]
        );
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let tmp = tempdir().unwrap();
        let runner = FakeRunner::default();
        let err = create_cubemap(&runner, &tmp.path().join("absent.exr"), tmp.path()).unwrap_err();
        assert!(matches!(err, BakeError::MissingInput { .. }));
        assert!(runner.programs_run().is_empty());
    }

    #[test]
    fn test_stale_container_is_removed_before_create() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("sky.exr");
        fs::write(&input, "exr").unwrap();
        fs::write(tmp.path().join("sky.ktx2"), "stale").unwrap();

        let runner = FakeRunner::default();
        create_cubemap(&runner, &input, tmp.path()).unwrap();
        // The fake never writes output, so the stale file being gone proves
        // the pre-delete ran.
        assert!(!tmp.path().join("sky.ktx2").exists());
    }
}
