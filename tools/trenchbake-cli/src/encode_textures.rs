//! Encode-textures command - kram over the staged tree

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use trenchbake_core::encode::{collect_rasters, encode_textures};
use trenchbake_core::tool::{ExternalTool, verify_tools};
use trenchbake_core::{BakeConfig, SystemRunner};

use crate::manifest::BakeManifest;

/// Arguments for the encode-textures command
#[derive(Args)]
pub struct EncodeTexturesArgs {
    /// Path to trenchbake.toml manifest file (defaults are used if absent)
    #[arg(short, long, default_value = "trenchbake.toml")]
    pub manifest: PathBuf,

    /// Staged asset directory (overrides the manifest)
    #[arg(long)]
    pub baked: Option<PathBuf>,

    /// Leave the models subtree out of KTX2 conversion
    #[arg(long)]
    pub skip_models: bool,

    /// Do not keep quality-1 JPEG previews next to compressed color textures
    #[arg(long)]
    pub no_previews: bool,
}

/// Execute the encode-textures command
pub fn execute(args: EncodeTexturesArgs) -> Result<()> {
    let manifest = BakeManifest::load_or_default(&args.manifest)?;
    let mut config: BakeConfig = manifest.into_config();
    if let Some(baked) = args.baked {
        config.baked_dir = baked;
    }
    if args.skip_models {
        config.exclude_models = true;
    }
    if args.no_previews {
        config.write_previews = false;
    }

    if !config.baked_dir.exists() {
        anyhow::bail!(
            "'{}' directory not found. Run `trenchbake normalize` first.",
            config.baked_dir.display()
        );
    }

    let runner = SystemRunner;
    verify_tools(
        &runner,
        &[
            ExternalTool {
                name: "kram",
                probe_args: &[],
            },
            ExternalTool {
                name: "magick",
                probe_args: &["--help"],
            },
        ],
    )?;

    let rasters = collect_rasters(&config)?;
    println!("Converting {} texture(s) to ktx2", rasters.len());
    encode_textures(&runner, &config).context("Texture encoding failed")?;
    println!("Done.");
    Ok(())
}
