//! Rewrite-refs command - point descriptors and glTF files at KTX2

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use trenchbake_core::rewrite::rewrite_references;
use trenchbake_core::tool::{ExternalTool, verify_tools};
use trenchbake_core::{BakeConfig, SystemRunner};

/// Arguments for the rewrite-refs command
#[derive(Args)]
pub struct RewriteRefsArgs {
    /// Staged asset directory
    #[arg(long, default_value = "assets_baked")]
    pub baked: PathBuf,
}

/// Execute the rewrite-refs command
pub fn execute(args: RewriteRefsArgs) -> Result<()> {
    if !args.baked.exists() {
        anyhow::bail!(
            "'{}' directory not found. Run `trenchbake normalize` first.",
            args.baked.display()
        );
    }

    let runner = SystemRunner;
    verify_tools(
        &runner,
        &[ExternalTool {
            name: "klafsa",
            probe_args: &["--help"],
        }],
    )?;

    let config = BakeConfig {
        baked_dir: args.baked,
        ..BakeConfig::default()
    };
    println!(
        "Rewriting texture references under {}",
        config.baked_dir.display()
    );
    rewrite_references(&runner, &config).context("Reference rewriting failed")?;
    println!("Done.");
    Ok(())
}
