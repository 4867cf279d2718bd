/// Errors raised while configuring the world or the polar pass.
///
/// The scrubbing path itself never fails; these only come out of
/// constructors and parsers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    #[error("unknown world preset '{0}'")]
    UnknownPreset(String),

    #[error("world radius must be positive, got {0}")]
    InvalidRadius(i32),

    #[error("polar start {start} lies outside the world radius {radius}")]
    PolarStartOutsideWorld { start: i32, radius: i32 },

    #[error("polar start fraction must be in (0, 1], got {0}")]
    InvalidStartFraction(f64),

    #[error("scrub budget must be between 1 and 256 columns, got {0}")]
    InvalidBudget(u16),

    #[error("vertical window must be at least one block")]
    EmptyVerticalWindow,

    #[error("invalid chunk config: {0}")]
    InvalidChunkConfig(String),
}
