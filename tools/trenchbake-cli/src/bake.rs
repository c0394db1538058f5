//! Bake command - run the whole pipeline

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use trenchbake_core::SystemRunner;
use trenchbake_core::bake::run_bake;
use trenchbake_core::tool::BAKE_TOOLS;

use crate::manifest::BakeManifest;

/// Arguments for the bake command
#[derive(Args)]
pub struct BakeArgs {
    /// Path to trenchbake.toml manifest file (defaults are used if absent)
    #[arg(short, long, default_value = "trenchbake.toml")]
    pub manifest: PathBuf,

    /// Source asset directory (overrides the manifest)
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Staged output directory (overrides the manifest)
    #[arg(long)]
    pub baked: Option<PathBuf>,

    /// Leave the models subtree out of KTX2 conversion
    #[arg(long)]
    pub skip_models: bool,

    /// Do not keep quality-1 JPEG previews next to compressed color textures
    #[arg(long)]
    pub no_previews: bool,
}

/// Execute the bake command
pub fn execute(args: BakeArgs) -> Result<()> {
    let manifest = BakeManifest::load_or_default(&args.manifest)?;
    let mut config = manifest.into_config();
    if let Some(assets) = args.assets {
        config.assets_dir = assets;
    }
    if let Some(baked) = args.baked {
        config.baked_dir = baked;
    }
    if args.skip_models {
        config.exclude_models = true;
    }
    if args.no_previews {
        config.write_previews = false;
    }

    println!(
        "Baking {} into {}",
        config.assets_dir.display(),
        config.baked_dir.display()
    );
    for tool in BAKE_TOOLS {
        match which::which(tool.name) {
            Ok(path) => println!("  {}: {}", tool.name, path.display()),
            Err(_) => println!("  {}: not found on PATH", tool.name),
        }
    }

    let table = run_bake(&SystemRunner, &config).context("Bake failed")?;

    let truncated: Vec<_> = table.iter().filter(|(from, to)| from != to).collect();
    if truncated.is_empty() {
        println!("Done. No texture names needed truncation.");
    } else {
        println!("Done. Truncated {} texture name(s):", truncated.len());
        for (from, to) in truncated {
            println!("  {from} -> {to}");
        }
    }
    Ok(())
}
