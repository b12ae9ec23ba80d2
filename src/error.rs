use thiserror::Error;

use crate::timing::Stage;

/// Every failure the benchmark can hit. None of them is recoverable: a
/// sweep that hits one stops and reports it.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The icicle backend libraries could not be loaded.
    #[error("failed to load icicle backend: {0}")]
    BackendLoad(String),

    #[error("device {kind}:{index} is not available")]
    DeviceUnavailable { kind: String, index: i32 },

    #[error("failed to select device {kind}:{index}: {reason}")]
    DeviceSelect { kind: String, index: i32, reason: String },

    /// A stage of the staged GPU run failed. `reason` is the backend's error code.
    #[error("{stage} failed for {count} elements: {reason}")]
    Stage { stage: Stage, count: usize, reason: String },

    /// The CPU MSM rejected its input, which only happens on a length mismatch.
    #[error("cpu msm rejected input of {0} elements")]
    CpuMsm(usize),

    #[error("sample set shape mismatch: {scalars} scalars, {points} points")]
    SampleShape { scalars: usize, points: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BenchError {
    pub fn stage(stage: Stage, count: usize, reason: impl std::fmt::Debug) -> Self {
        BenchError::Stage { stage, count, reason: format!("{reason:?}") }
    }
}
