//! Checks that WaveNet models exported by the trainer load and render the
//! same way in NeuralAmpModelerCore, for every configuration variant.

pub mod conformance;
pub mod error;

pub use conformance::{Check, Conformance, MODEL_BASENAME};
pub use error::ConformanceError;
