//! Error types for schedule construction

use thiserror::Error;

/// Schedule configuration errors
///
/// All variants are raised at construction time; stepping never fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("plateau position must be between 0 and 100, got {value}")]
    PlateauPositionOutOfRange { value: f32 },

    #[error("plateau duration must be between 0 and 100, got {value}")]
    PlateauDurationOutOfRange { value: f32 },

    #[error("unknown warmup shape '{shape}', expected 'linear'")]
    UnknownWarmupShape { shape: String },
}

/// Result type for schedule operations
pub type Result<T> = std::result::Result<T, ScheduleError>;
