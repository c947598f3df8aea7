//! Error types for world generation.

/// Errors raised while configuring or exporting a world.
///
/// Generation itself has no per-cell failure modes; everything here is
/// detected before any stage runs or after generation has finished.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Grid width or height is zero.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Target land fraction outside the open interval (0, 1).
    #[error("target land fraction {0} must lie strictly between 0 and 1")]
    InvalidLandFraction(f32),

    /// Sea threshold outside the open interval (0, 1).
    #[error("sea threshold {0} must lie strictly between 0 and 1")]
    InvalidSeaThreshold(f32),

    /// River target range is empty or reversed.
    #[error("river target range {min}..={max} is invalid")]
    InvalidRiverTargets { min: usize, max: usize },

    /// Failed to read or write a file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse or serialize JSON.
    #[error("json error: {0}")]
    Parse(#[from] serde_json::Error),
}
