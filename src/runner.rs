//! The two sides of the comparison.
//!
//! Both runners consume the same [`SampleSet`] and report the wall-clock time
//! of one complete MSM. The CPU side is atomic; the GPU side can additionally
//! decompose its run into stages.

use std::time::Duration;

use crate::curve::G1Affine;
use crate::error::BenchError;
use crate::sample::SampleSet;
use crate::timing::TimingBreakdown;

pub mod cpu;
pub mod gpu;

pub use self::cpu::ArkCpuRunner;
pub use self::gpu::GpuStagedRunner;

/// The affine point one MSM execution produced.
pub type RunResult = G1Affine;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuRun {
    pub result: RunResult,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuRun {
    pub result: RunResult,
    pub elapsed: Duration,
    /// Present only when the run was asked to measure detail.
    pub breakdown: Option<TimingBreakdown>,
}

pub trait CpuMsmRunner {
    /// One MSM over `samples`. Must leave `samples` untouched.
    fn run(&mut self, samples: &SampleSet) -> Result<CpuRun, BenchError>;
}

pub trait GpuMsmRunner {
    /// One full staged run over `samples`, with a per-stage breakdown when
    /// `measure_detail` is set.
    fn run(&mut self, samples: &SampleSet, measure_detail: bool) -> Result<GpuRun, BenchError>;
}
