//! Error types for the bake pipeline
//!
//! Every fault is fatal: the staged tree is discarded and rebuilt on the next
//! run, so there is no recoverable category and no rollback.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BakeError>;

#[derive(Error, Debug)]
pub enum BakeError {
    /// A required external tool could not be spawned.
    #[error("`{tool}` is not installed (required on PATH)")]
    ToolMissing { tool: String },

    /// An expected input (source directory, cubemap image) does not exist.
    #[error("input not found: {}", .path.display())]
    MissingInput { path: PathBuf },

    /// A channel texture does not extend its base name, so no suffix can be
    /// derived for classification.
    #[error(
        "channel texture {} does not extend base name `{base}` (cannot derive a suffix)",
        .path.display()
    )]
    BadChannelTexture { path: PathBuf, base: String },

    /// A base material definition (descriptor with a `$` template token and no
    /// `inherits` key) exceeds the map format's name field. These are exempt
    /// from automatic truncation, so the author has to rename the file.
    #[error(
        "base material `{name}` is {} characters long, but the map format allows at most {limit}; rename the material",
        .name.chars().count()
    )]
    BaseMaterialNameTooLong { name: String, limit: usize },

    /// A base material's name is already staged by another texture group.
    /// Flattening puts everything in one directory and base materials cannot
    /// be renamed, so the author has to resolve the clash.
    #[error(
        "base material `{name}` clashes with an already staged texture of the same name; rename one of them"
    )]
    BaseMaterialNameTaken { name: String },

    /// An external tool ran but exited nonzero.
    #[error("`{tool}` exited with {code}{}", render_diagnostics(.stderr))]
    ToolFailed {
        tool: String,
        code: String,
        stderr: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

fn render_diagnostics(stderr: &str) -> String {
    if stderr.trim().is_empty() {
        String::new()
    } else {
        format!(":\n{}", stderr.trim_end())
    }
}
