//! Trenchbake Core - asset-baking pipeline library
//!
//! Bakes a source asset tree into a release-ready staged tree for a game with
//! a TrenchBroom level workflow:
//!
//! - [`normalize`] - copy textures into the staged tree, truncating
//!   identifiers to the map format's 15-character name field
//! - [`maps`] - rewrite texture references in `.map` files and drive the
//!   external `qbsp`/`light` compilers
//! - [`encode`] - convert rasters to KTX2 via the external `kram` encoder
//! - [`rewrite`] - point material and glTF files at the compressed textures
//! - [`cubemap`] - bake an equirectangular EXR into a cubemap KTX2
//! - [`bake`] - run the whole pipeline in order
//!
//! All heavy lifting happens in external binaries reached through
//! [`tool::ToolRunner`]; this crate sequences the calls and massages paths
//! and text in between. Execution is single-threaded and sequential, and
//! every error is fatal: the staged tree is simply rebuilt on the next run.

pub mod bake;
pub mod classify;
pub mod config;
pub mod cubemap;
pub mod encode;
pub mod error;
pub mod maps;
pub mod normalize;
pub mod rename;
pub mod rewrite;
pub mod tool;

pub use config::BakeConfig;
pub use error::{BakeError, Result};
pub use rename::RenameTable;
pub use tool::{SystemRunner, ToolRunner};

/// Extension of the GPU-compressed texture container the encoder produces.
pub const COMPRESSED_EXTENSION: &str = "ktx2";
