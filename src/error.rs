//! Error types.
//!
//! Only construction can fail through the public API. Everything else
//! sanitizes its input and logs instead of returning an error.

/// Failure constructing a [`crate::board::Board`].
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("board mount container is missing")]
    MissingMount,
    #[error("invalid board config: {0}")]
    Config(#[from] ConfigError),
}

/// Invalid [`crate::config::BoardConfig`] values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("world size must be positive and finite, got {width}x{height}")]
    InvalidWorld { width: f64, height: f64 },
    #[error("zoom range must satisfy 0 < min <= max, got [{min}, {max}]")]
    InvalidZoomRange { min: f64, max: f64 },
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must be non-negative and finite, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("pan duration range must satisfy min <= max, got [{min}, {max}]")]
    InvalidPanRange { min: f64, max: f64 },
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Image load failure reported by the host.
///
/// Never propagated: a failed image only hides the card's image slot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("image request failed: {0}")]
    Network(String),
    #[error("image decode failed: {0}")]
    Decode(String),
    #[error("image has no pixels")]
    EmptyImage,
}
