//! External tool capability
//!
//! All of the real transformation work (BSP compilation, lighting, texture
//! encoding, glTF rewriting) happens in external binaries. The pipeline talks
//! to them exclusively through [`ToolRunner`] so the orchestration logic can
//! be exercised in tests with a fake runner that records invocations instead
//! of spawning processes.

use std::path::Path;
use std::process::Command;

use crate::error::{BakeError, Result};

/// Captured result of one blocking tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit code, if the process terminated normally.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Blocking invoke-with-arguments capability for external binaries.
pub trait ToolRunner {
    /// Run `program` with `args`, optionally in `cwd`, and wait for it.
    ///
    /// A spawn failure because the binary does not exist maps to
    /// [`BakeError::ToolMissing`]; a nonzero exit is *not* an error at this
    /// level (tool probing relies on that).
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<ToolOutput>;

    /// Like [`ToolRunner::run`], but the child inherits this process's
    /// stdio instead of having it captured. Long-running tools stream their
    /// progress straight to the terminal; `stdout`/`stderr` in the returned
    /// [`ToolOutput`] are empty.
    fn run_streamed(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<ToolOutput> {
        self.run(program, args, cwd)
    }

    /// Like [`ToolRunner::run`], but a nonzero exit becomes
    /// [`BakeError::ToolFailed`] carrying the tool's own diagnostics.
    fn run_checked(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<ToolOutput> {
        check_exit(program, self.run(program, args, cwd)?)
    }

    /// [`ToolRunner::run_streamed`] with the nonzero-exit mapping of
    /// [`ToolRunner::run_checked`].
    fn run_streamed_checked(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<ToolOutput> {
        check_exit(program, self.run_streamed(program, args, cwd)?)
    }
}

fn check_exit(program: &str, output: ToolOutput) -> Result<ToolOutput> {
    if !output.success() {
        return Err(BakeError::ToolFailed {
            tool: program.to_string(),
            code: output
                .code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            stderr: output.stderr,
        });
    }
    Ok(output)
}

/// [`ToolRunner`] backed by [`std::process::Command`].
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<ToolOutput> {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }
        match command.output() {
            Ok(output) => Ok(ToolOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(BakeError::ToolMissing {
                    tool: program.to_string(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn run_streamed(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<ToolOutput> {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }
        match command.status() {
            Ok(status) => Ok(ToolOutput {
                code: status.code(),
                stdout: String::new(),
                stderr: String::new(),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(BakeError::ToolMissing {
                    tool: program.to_string(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// One external dependency and the arguments used to probe for it.
pub struct ExternalTool {
    pub name: &'static str,
    pub probe_args: &'static [&'static str],
}

/// Tools the bake pipeline shells out to.
pub const BAKE_TOOLS: &[ExternalTool] = &[
    ExternalTool {
        name: "kram",
        probe_args: &[],
    },
    ExternalTool {
        name: "magick",
        probe_args: &["--help"],
    },
    ExternalTool {
        name: "qbsp",
        probe_args: &["--help"],
    },
    ExternalTool {
        name: "light",
        probe_args: &["--help"],
    },
    ExternalTool {
        name: "klafsa",
        probe_args: &["--help"],
    },
];

/// Tools the cubemap utility shells out to.
pub const CUBEMAP_TOOLS: &[ExternalTool] = &[
    ExternalTool {
        name: "exrenvmap",
        probe_args: &["--help"],
    },
    ExternalTool {
        name: "magick",
        probe_args: &["--help"],
    },
    ExternalTool {
        name: "oiiotool",
        probe_args: &["--help"],
    },
    ExternalTool {
        name: "ktx",
        probe_args: &["--help"],
    },
];

/// Probe every tool before doing any work.
///
/// Each tool is invoked with its help flag; only a failure to spawn counts as
/// missing. Help output and nonzero "usage" exits are ignored.
pub fn verify_tools(runner: &dyn ToolRunner, tools: &[ExternalTool]) -> Result<()> {
    for tool in tools {
        let args: Vec<String> = tool.probe_args.iter().map(|a| a.to_string()).collect();
        runner.run(tool.name, &args, None)?;
        tracing::debug!(tool = tool.name, "found external tool");
    }
    Ok(())
}
