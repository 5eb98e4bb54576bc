use std::{
    ffi::OsStr,
    path::Path,
    process::{ExitStatus, Stdio},
    time::Duration,
};

use log::{debug, warn};
use tokio::{process::Command, time};

use crate::{
    error::{HarnessError, Result},
    tools::CoreTools,
};

pub const LOADMODEL_TIMEOUT: Duration = Duration::from_secs(10);
pub const RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit status and captured output of a finished tool.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Turns a non-zero exit into an error carrying the captured output.
    ///
    /// # Arguments
    /// * `context` - What was being attempted, used as the error's prefix.
    pub fn ensure_success(self, context: impl Into<String>) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }

        Err(HarnessError::ToolFailed {
            context: context.into(),
            status: self.status,
            stdout: self.stdout,
            stderr: self.stderr,
        })
    }
}

/// Runs `program` with `args`, capturing its output.
///
/// The child is killed if it does not exit within `timeout`.
///
/// # Errors
/// `Spawn` if the program cannot be started, `Timeout` if it runs too long.
/// A non-zero exit is not an error here, see [`ToolOutput::ensure_success`].
pub async fn run_tool<I, S>(program: &Path, args: I, timeout: Duration) -> Result<ToolOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(program:? = program; "spawning");

    let child = cmd.spawn().map_err(|source| HarnessError::Spawn {
        program: program.to_path_buf(),
        source,
    })?;

    let output = match time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => output?,
        Err(_) => {
            warn!("{} timed out after {timeout:?}", program.display());
            return Err(HarnessError::Timeout {
                program: program.to_path_buf(),
                after: timeout,
            });
        }
    };

    debug!(program:? = program, status:% = output.status; "tool exited");

    Ok(ToolOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Runs the core's `loadmodel` tool on a `.nam` file.
///
/// # Errors
/// `ToolMissing` if `loadmodel` is not built, otherwise as [`run_tool`].
pub async fn run_loadmodel(tools: &CoreTools, model: &Path) -> Result<ToolOutput> {
    let exe = tools.loadmodel().ok_or_else(|| HarnessError::ToolMissing {
        tool: "loadmodel",
        core_dir: tools.core_dir().to_path_buf(),
    })?;

    run_tool(exe, [model], LOADMODEL_TIMEOUT).await
}

/// Runs the core's `render` tool: `model` applied to `input` is written to `output`.
///
/// # Errors
/// `ToolMissing` if `render` is not built, otherwise as [`run_tool`].
pub async fn run_render(
    tools: &CoreTools,
    model: &Path,
    input: &Path,
    output: &Path,
) -> Result<ToolOutput> {
    let exe = tools.render().ok_or_else(|| HarnessError::ToolMissing {
        tool: "render",
        core_dir: tools.core_dir().to_path_buf(),
    })?;

    run_tool(exe, [model, input, output], RENDER_TIMEOUT).await
}
