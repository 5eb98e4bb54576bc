use std::{
    error::Error,
    fmt, io,
    path::PathBuf,
    process::ExitStatus,
    time::Duration,
};

use variants::VariantError;

/// The harness module's result type.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Failures while driving the external trainer and core tools.
#[derive(Debug)]
pub enum HarnessError {
    Io(io::Error),
    Wav(hound::Error),
    Json(serde_json::Error),
    Config(VariantError),
    /// The core checkout or one of its built tools is not there.
    ToolMissing {
        tool: &'static str,
        core_dir: PathBuf,
    },
    /// No exporter command is configured.
    ExporterUnavailable,
    Spawn {
        program: PathBuf,
        source: io::Error,
    },
    Timeout {
        program: PathBuf,
        after: Duration,
    },
    /// The tool ran and exited unsuccessfully.
    ToolFailed {
        context: String,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
    /// An export finished but a file it should have produced is absent.
    MissingArtifact(PathBuf),
    /// A `.npy` file could not be decoded.
    Npy { path: PathBuf, msg: String },
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Wav(e) => write!(f, "wav error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
            Self::Config(e) => write!(f, "config error: {e}"),
            Self::ToolMissing { tool, core_dir } => write!(
                f,
                "NeuralAmpModelerCore {tool} not found: either {} is missing or build/tools/{tool} is not built",
                core_dir.display()
            ),
            Self::ExporterUnavailable => {
                write!(f, "no exporter configured: set NAM_EXPORTER to the trainer's export command")
            }
            Self::Spawn { program, source } => {
                write!(f, "cannot start {}: {source}", program.display())
            }
            Self::Timeout { program, after } => {
                write!(f, "{} did not finish within {after:?}", program.display())
            }
            Self::ToolFailed {
                context,
                status,
                stdout,
                stderr,
            } => write!(
                f,
                "{context} failed ({status}): stderr={stderr:?} stdout={stdout:?}"
            ),
            Self::MissingArtifact(path) => write!(f, "expected {} to exist", path.display()),
            Self::Npy { path, msg } => write!(f, "cannot decode {}: {msg}", path.display()),
        }
    }
}

impl Error for HarnessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Wav(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for HarnessError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<hound::Error> for HarnessError {
    fn from(e: hound::Error) -> Self {
        Self::Wav(e)
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<VariantError> for HarnessError {
    fn from(e: VariantError) -> Self {
        Self::Config(e)
    }
}
