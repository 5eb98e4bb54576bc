use std::{error::Error, fmt, io, path::PathBuf};

/// The variants module's result type.
pub type Result<T> = std::result::Result<T, VariantError>;

/// All errors that can occur while loading or deriving configurations.
#[derive(Debug)]
pub enum VariantError {
    /// The base configuration file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// The base configuration is not valid JSON or does not match the schema.
    Json(serde_json::Error),
    /// The identifier names an activation outside the supported list.
    UnknownActivation(String),
    /// The identifier names a FiLM slot that does not exist.
    UnknownFilmSlot(String),
    /// The identifier matches no variant at all.
    UnknownVariant(String),
    /// An activation variant was requested for an activation the loader cannot read.
    UnsupportedActivation(String),
    /// The base configuration has fewer layers than the mutation touches.
    TooFewLayers {
        variant: String,
        needed: usize,
        got: usize,
    },
}

impl VariantError {
    /// Whether this error was caused by the caller passing a bad variant request,
    /// as opposed to a broken base configuration.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::UnknownActivation(_)
                | Self::UnknownFilmSlot(_)
                | Self::UnknownVariant(_)
                | Self::UnsupportedActivation(_)
        )
    }
}

impl fmt::Display for VariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read '{}': {source}", path.display()),
            Self::Json(e) => write!(f, "invalid config: {e}"),
            Self::UnknownActivation(id) => write!(f, "unknown activation variant: {id}"),
            Self::UnknownFilmSlot(slot) => write!(f, "unknown film slot: {slot}"),
            Self::UnknownVariant(id) => write!(f, "unknown variant_id: {id}"),
            Self::UnsupportedActivation(name) => {
                write!(f, "activation {name} is not supported by loadmodel")
            }
            Self::TooFewLayers {
                variant,
                needed,
                got,
            } => write!(
                f,
                "variant {variant} needs at least {needed} layer(s), base config has {got}"
            ),
        }
    }
}

impl Error for VariantError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for VariantError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
