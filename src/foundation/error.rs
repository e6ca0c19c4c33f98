/// Result alias used throughout the crate.
pub type PipevizResult<T> = Result<T, PipevizError>;

/// Error taxonomy for diagram loading and rendering.
///
/// Configuration errors abort initialization. Asset errors never escape the icon loader: they are
/// logged and turned into an empty icon slot.
#[derive(thiserror::Error, Debug)]
pub enum PipevizError {
    /// Invalid diagram configuration (undefined node reference, bad ranges, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// An asset could not be read or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// Surface allocation or pixel conversion failure.
    #[error("render error: {0}")]
    Render(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipevizError {
    /// Build a [`PipevizError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`PipevizError::Asset`].
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`PipevizError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PipevizError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
