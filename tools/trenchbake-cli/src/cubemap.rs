//! Cubemap command - equirectangular EXR to cubemap KTX2

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use trenchbake_core::SystemRunner;
use trenchbake_core::cubemap::create_cubemap;
use trenchbake_core::tool::{CUBEMAP_TOOLS, verify_tools};

/// Arguments for the cubemap command
#[derive(Args)]
pub struct CubemapArgs {
    /// Equirectangular environment map (.exr)
    pub input: PathBuf,

    /// Directory to write the cubemap (and transient face files) into
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

/// Execute the cubemap command
pub fn execute(args: CubemapArgs) -> Result<()> {
    let runner = SystemRunner;
    verify_tools(&runner, CUBEMAP_TOOLS)?;

    println!("Baking cubemap from {}", args.input.display());
    let output = create_cubemap(&runner, &args.input, &args.out_dir)
        .context("Cubemap baking failed")?;

    println!("Created {}", output.container.display());
    if let Some(vk_format) = output.vk_format {
        println!("  {vk_format}");
    }
    Ok(())
}
