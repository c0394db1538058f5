//! Compile-maps command - qbsp + light over the staged tree
//!
//! Standalone runs have no rename table (it only exists inside a full bake),
//! so map references are compiled as-is. `trenchbake bake` carries the table
//! from normalization into this stage.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use trenchbake_core::maps::compile_maps;
use trenchbake_core::tool::{ExternalTool, verify_tools};
use trenchbake_core::{RenameTable, SystemRunner};

/// Arguments for the compile-maps command
#[derive(Args)]
pub struct CompileMapsArgs {
    /// Staged asset directory containing .map files
    #[arg(long, default_value = "assets_baked")]
    pub baked: PathBuf,
}

/// Execute the compile-maps command
pub fn execute(args: CompileMapsArgs) -> Result<()> {
    if !args.baked.exists() {
        anyhow::bail!(
            "'{}' directory not found. Run `trenchbake normalize` first.",
            args.baked.display()
        );
    }

    let runner = SystemRunner;
    verify_tools(
        &runner,
        &[
            ExternalTool {
                name: "qbsp",
                probe_args: &["--help"],
            },
            ExternalTool {
                name: "light",
                probe_args: &["--help"],
            },
        ],
    )?;

    println!("Compiling maps under {}", args.baked.display());
    compile_maps(&runner, &args.baked, &RenameTable::new()).context("Map compilation failed")?;
    println!("Done.");
    Ok(())
}
