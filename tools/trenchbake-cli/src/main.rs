//! Trenchbake CLI - release asset baking for TrenchBroom-authored games
//!
//! # Commands
//!
//! - `trenchbake bake` - run the whole pipeline (stage + compile + encode + rewrite)
//! - `trenchbake normalize` - rebuild the staged tree and normalize texture names
//! - `trenchbake compile-maps` - compile `.map` files in an existing staged tree
//! - `trenchbake encode-textures` - convert staged rasters to KTX2
//! - `trenchbake rewrite-refs` - point descriptors and glTF files at KTX2
//! - `trenchbake cubemap` - bake an equirectangular EXR into a cubemap KTX2
//!
//! # Usage
//!
//! From the project root (the directory containing `assets/`):
//! ```bash
//! # Bake everything into assets_baked/
//! trenchbake bake
//!
//! # Bake, keeping models uncompressed and skipping preview JPEGs
//! trenchbake bake --skip-models --no-previews
//!
//! # Bake a skybox
//! trenchbake cubemap assets/skyboxes/dusk.exr
//! ```
//!
//! External tools expected on PATH: `kram`, `magick`, `qbsp`, `light`,
//! `klafsa` for the bake pipeline; `exrenvmap`, `magick`, `oiiotool`, `ktx`
//! for cubemaps.

mod bake;
mod compile_maps;
mod cubemap;
mod encode_textures;
mod manifest;
mod normalize;
mod rewrite_refs;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Trenchbake CLI - release asset baking
#[derive(Parser)]
#[command(name = "trenchbake")]
#[command(about = "Bake release assets for TrenchBroom-authored games")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole pipeline: stage, compile maps, encode textures, rewrite references
    Bake(bake::BakeArgs),

    /// Rebuild the staged tree and normalize texture names
    Normalize(normalize::NormalizeArgs),

    /// Compile .map files in an existing staged tree
    CompileMaps(compile_maps::CompileMapsArgs),

    /// Convert staged rasters to KTX2
    EncodeTextures(encode_textures::EncodeTexturesArgs),

    /// Point material descriptors and glTF files at KTX2 textures
    RewriteRefs(rewrite_refs::RewriteRefsArgs),

    /// Bake an equirectangular EXR into a cubemap KTX2
    Cubemap(cubemap::CubemapArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bake(args) => bake::execute(args),
        Commands::Normalize(args) => normalize::execute(args),
        Commands::CompileMaps(args) => compile_maps::execute(args),
        Commands::EncodeTextures(args) => encode_textures::execute(args),
        Commands::RewriteRefs(args) => rewrite_refs::execute(args),
        Commands::Cubemap(args) => cubemap::execute(args),
    }
}
