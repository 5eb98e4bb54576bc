use std::fmt;

use harness::{HarnessError, Mismatch};
use variants::VariantError;

/// All errors that can occur while checking a variant.
#[derive(Debug)]
pub enum ConformanceError {
    /// The variant could not be turned into a configuration.
    Config(VariantError),
    /// Exporting, running a core tool or reading its output failed.
    Harness(HarnessError),
    /// The core rendered something other than what the trainer predicted.
    Disagreement { variant: String, mismatch: Mismatch },
}

impl fmt::Display for ConformanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config error: {e}"),
            Self::Harness(e) => write!(f, "{e}"),
            Self::Disagreement { variant, mismatch } => {
                write!(f, "trainer and core disagree on {variant}: {mismatch}")
            }
        }
    }
}

impl std::error::Error for ConformanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Harness(e) => Some(e),
            Self::Disagreement { mismatch, .. } => Some(mismatch),
        }
    }
}

impl From<VariantError> for ConformanceError {
    fn from(e: VariantError) -> Self {
        Self::Config(e)
    }
}

impl From<HarnessError> for ConformanceError {
    fn from(e: HarnessError) -> Self {
        Self::Harness(e)
    }
}

impl From<std::io::Error> for ConformanceError {
    fn from(e: std::io::Error) -> Self {
        Self::Harness(HarnessError::Io(e))
    }
}
