//! Per-stage timing of one staged GPU run.
//!
//! A [`TimingBreakdown`] only exists when a run was asked to measure detail.
//! [`StageTimer`] wraps every stage so the same call sites serve both the
//! measured and the unmeasured path.

use std::fmt;
use std::time::{Duration, Instant};

/// The stages of the GPU pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Allocate,
    BasesH2D,
    ScalarsH2D,
    BasesMontgomery,
    ScalarsMontgomery,
    MsmCompute,
    ResultD2H,
}

impl Stage {
    /// Stages that carry a duration in a [`TimingBreakdown`].
    pub const TIMED: [Stage; 6] = [
        Stage::BasesH2D,
        Stage::ScalarsH2D,
        Stage::BasesMontgomery,
        Stage::ScalarsMontgomery,
        Stage::MsmCompute,
        Stage::ResultD2H,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Allocate => "Allocate",
            Stage::BasesH2D => "Bases H2D",
            Stage::ScalarsH2D => "Scalars H2D",
            Stage::BasesMontgomery => "Bases Montgomery",
            Stage::ScalarsMontgomery => "Scalars Montgomery",
            Stage::MsmCompute => "MSM Compute",
            Stage::ResultD2H => "Result D2H",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Wall-clock durations of one measured GPU run.
///
/// `total` spans allocation through release, so it is never smaller than the
/// sum of the stage fields. Allocation and free are not attributed to a stage
/// and only show up in the residual.
///
/// `result_d2h` is always zero: the result lands in a host buffer inside the
/// MSM call, so its retrieval is counted under `msm_compute`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingBreakdown {
    pub bases_h2d: Duration,
    pub scalars_h2d: Duration,
    pub bases_montgomery: Duration,
    pub scalars_montgomery: Duration,
    pub msm_compute: Duration,
    pub result_d2h: Duration,
    pub total: Duration,
}

impl TimingBreakdown {
    pub fn get(&self, stage: Stage) -> Duration {
        match stage {
            Stage::BasesH2D => self.bases_h2d,
            Stage::ScalarsH2D => self.scalars_h2d,
            Stage::BasesMontgomery => self.bases_montgomery,
            Stage::ScalarsMontgomery => self.scalars_montgomery,
            Stage::MsmCompute => self.msm_compute,
            Stage::ResultD2H => self.result_d2h,
            Stage::Allocate => Duration::ZERO,
        }
    }

    pub fn record(&mut self, stage: Stage, elapsed: Duration) {
        match stage {
            Stage::BasesH2D => self.bases_h2d = elapsed,
            Stage::ScalarsH2D => self.scalars_h2d = elapsed,
            Stage::BasesMontgomery => self.bases_montgomery = elapsed,
            Stage::ScalarsMontgomery => self.scalars_montgomery = elapsed,
            Stage::MsmCompute => self.msm_compute = elapsed,
            Stage::ResultD2H => self.result_d2h = elapsed,
            Stage::Allocate => {}
        }
    }

    /// Sum of all stage durations, excluding `total`.
    pub fn stages_sum(&self) -> Duration {
        Stage::TIMED.iter().map(|stage| self.get(*stage)).sum()
    }

    /// Time inside `total` not attributed to any stage.
    pub fn unaccounted(&self) -> Duration {
        self.total.saturating_sub(self.stages_sum())
    }

    /// Share of `total` spent in `stage`, in percent.
    pub fn percent(&self, stage: Stage) -> f64 {
        if self.total.is_zero() {
            return 0.0;
        }
        100.0 * self.get(stage).as_secs_f64() / self.total.as_secs_f64()
    }
}

/// Scoped stage timer recording into an optional breakdown.
///
/// Built with `measure == false` it never reads the clock and
/// [`StageTimer::finish`] returns `None`.
pub struct StageTimer {
    active: Option<(Instant, TimingBreakdown)>,
}

impl StageTimer {
    /// Starts the `total` span when measuring.
    pub fn new(measure: bool) -> Self {
        Self {
            active: measure.then(|| (Instant::now(), TimingBreakdown::default())),
        }
    }

    pub fn is_measuring(&self) -> bool {
        self.active.is_some()
    }

    /// Runs `f` as `stage`, recording its duration when measuring.
    pub fn time<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        match self.active.as_mut() {
            None => f(),
            Some((_, breakdown)) => {
                let start = Instant::now();
                let out = f();
                breakdown.record(stage, start.elapsed());
                out
            }
        }
    }

    /// Records a stage that has no separable cost of its own.
    pub fn mark_zero(&mut self, stage: Stage) {
        if let Some((_, breakdown)) = self.active.as_mut() {
            breakdown.record(stage, Duration::ZERO);
        }
    }

    /// Closes the `total` span.
    pub fn finish(self) -> Option<TimingBreakdown> {
        self.active.map(|(started, mut breakdown)| {
            breakdown.total = started.elapsed();
            breakdown
        })
    }
}
