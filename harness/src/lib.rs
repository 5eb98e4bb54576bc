//! Plumbing for checking exported WaveNet models against NeuralAmpModelerCore.
//!
//! The trainer and the core are external: the trainer is reached through an
//! [`Exporter`], the core through its `loadmodel` and `render` executables
//! located by [`CoreTools`].

pub mod compare;
pub mod error;
pub mod exporter;
pub mod npy;
pub mod process;
pub mod tools;
pub mod wav;

pub use compare::{Mismatch, Tolerance, ToleranceTable, compare};
pub use error::{HarnessError, Result};
pub use exporter::{
    CommandExporter, EXPORTER_ENV, ExportedModel, Exporter, LocalExporter, SAMPLE_RATE, Snapshot,
};
pub use process::{ToolOutput, run_loadmodel, run_render, run_tool};
pub use tools::CoreTools;
