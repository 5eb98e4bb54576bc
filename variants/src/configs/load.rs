use std::{fs, path::Path};

use log::debug;

use super::ModelConfig;
use crate::error::{Result, VariantError};

/// Location of the canonical base configuration.
pub const DEMONET_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../configs/demonet.json");

/// Free-text fields allowed at the top level of a config file and dropped on load.
const ANNOTATION_KEYS: [&str; 2] = ["_notes", "_comments"];

/// Loads the demonet base configuration from the repository's `configs/` directory.
///
/// # Errors
/// Returns a `VariantError` if the file cannot be read or does not match the schema.
pub fn load_demonet_config() -> Result<ModelConfig> {
    load_config(DEMONET_CONFIG_PATH)
}

/// Loads a model configuration from a JSON file.
///
/// # Arguments
/// * `path` - The path of the JSON document.
///
/// # Returns
/// The parsed configuration, without its annotation fields.
pub fn load_config(path: impl AsRef<Path>) -> Result<ModelConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| VariantError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path:? = path; "loaded base config");
    parse_config(&content)
}

/// Parses a model configuration document, dropping `_notes` and `_comments`.
pub fn parse_config(content: &str) -> Result<ModelConfig> {
    let mut val: serde_json::Value = serde_json::from_str(content)?;

    if let Some(obj) = val.as_object_mut() {
        for key in ANNOTATION_KEYS {
            obj.remove(key);
        }
    }

    Ok(serde_json::from_value(val)?)
}
