//! Typed WaveNet model configurations and the variants derived from them.
//!
//! A [`VariantBuilder`] holds one base configuration (normally the demonet
//! config under `configs/`) and derives a fresh copy with exactly one
//! structural mutation per [`Variant`]. The parameterized conformance tests
//! iterate [`Variant::all`] to cover every mutation.

mod builder;
pub mod configs;
pub mod error;
mod variant;

pub use builder::{VariantBuilder, get_config_for_variant};
pub use error::{Result, VariantError};
pub use variant::{Variant, all_variant_ids};
