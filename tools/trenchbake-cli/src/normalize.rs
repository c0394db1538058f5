//! Normalize command - rebuild the staged tree

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use trenchbake_core::bake::stage_assets;

use crate::manifest::BakeManifest;

/// Arguments for the normalize command
#[derive(Args)]
pub struct NormalizeArgs {
    /// Path to trenchbake.toml manifest file (defaults are used if absent)
    #[arg(short, long, default_value = "trenchbake.toml")]
    pub manifest: PathBuf,

    /// Source asset directory (overrides the manifest)
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Staged output directory (overrides the manifest)
    #[arg(long)]
    pub baked: Option<PathBuf>,
}

/// Execute the normalize command
///
/// Destroys any previous staged tree, copies the source tree, and normalizes
/// texture identifiers to the map format's 15-character name field.
pub fn execute(args: NormalizeArgs) -> Result<()> {
    let manifest = BakeManifest::load_or_default(&args.manifest)?;
    let mut config = manifest.into_config();
    if let Some(assets) = args.assets {
        config.assets_dir = assets;
    }
    if let Some(baked) = args.baked {
        config.baked_dir = baked;
    }

    if !config.assets_dir.exists() {
        anyhow::bail!(
            "'{}' directory not found. Run this from the root of the project.",
            config.assets_dir.display()
        );
    }

    println!(
        "Staging {} into {}",
        config.assets_dir.display(),
        config.baked_dir.display()
    );
    let table = stage_assets(&config).context("Staging failed")?;

    println!("Staged {} texture group(s)", table.len());
    for (from, to) in table.iter().filter(|(from, to)| from != to) {
        println!("  {from} -> {to}");
    }
    Ok(())
}
