//! The benchmark orchestrator.
//!
//! For every problem size of the sweep it walks through the same phases:
//! - `Generating`  -> one [`SampleSet`] shared by every run of this size
//! - `WarmingUp`   -> one untimed run per side, absorbing lazy initialisation
//! - `Measuring`   -> `runs` timed repetitions, CPU then GPU
//! - `Aggregating` -> averages and speedup
//! - `Done`        -> one [`BenchmarkRecord`]
//!
//! A failing run aborts the whole sweep. Comparative data with holes in it
//! is not reported.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::config::BenchConfig;
use crate::device::DeviceContext;
use crate::error::BenchError;
use crate::runner::{CpuMsmRunner, GpuMsmRunner};
use crate::sample::{ProblemSize, SampleSet};
use crate::timing::TimingBreakdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Generating,
    WarmingUp,
    Measuring { iteration: u32 },
    Aggregating,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Faster {
    Cpu,
    Gpu,
}

/// Slower average over faster average, so `ratio >= 1.0` either way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speedup {
    pub ratio: f64,
    pub faster: Faster,
}

impl Speedup {
    /// Ties count as CPU.
    pub fn from_averages(cpu_avg: Duration, gpu_avg: Duration) -> Self {
        let (slower, faster, side) = if cpu_avg > gpu_avg {
            (cpu_avg, gpu_avg, Faster::Gpu)
        } else {
            (gpu_avg, cpu_avg, Faster::Cpu)
        };

        let ratio = if faster.is_zero() {
            if slower.is_zero() { 1.0 } else { f64::INFINITY }
        } else {
            slower.as_secs_f64() / faster.as_secs_f64()
        };

        Self { ratio, faster: side }
    }
}

impl fmt::Display for Speedup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.faster {
            Faster::Cpu => "CPU",
            Faster::Gpu => "GPU",
        };
        write!(f, "{:.2}x {}", self.ratio, side)
    }
}

/// The outcome for one problem size.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord {
    pub size: ProblemSize,
    pub cpu_avg: Duration,
    pub gpu_avg: Duration,
    /// `cpu_avg / gpu_avg`; above 1.0 the GPU was faster.
    pub speedup: f64,
    /// From the first timed GPU run, in detailed mode only.
    pub breakdown: Option<TimingBreakdown>,
    /// Whether the two warm-up results agreed, when verification was on.
    pub results_match: Option<bool>,
}

impl BenchmarkRecord {
    pub fn directed_speedup(&self) -> Speedup {
        Speedup::from_averages(self.cpu_avg, self.gpu_avg)
    }
}

/// `total / runs`, with `runs` already validated to be non-zero.
pub fn average(total: Duration, runs: u32) -> Duration {
    total / runs
}

/// `cpu_avg / gpu_avg` as a plain ratio.
pub fn raw_speedup(cpu_avg: Duration, gpu_avg: Duration) -> f64 {
    if gpu_avg.is_zero() {
        return if cpu_avg.is_zero() { 1.0 } else { f64::INFINITY };
    }
    cpu_avg.as_secs_f64() / gpu_avg.as_secs_f64()
}

pub struct Benchmark<'a, C, G, R> {
    config: &'a BenchConfig,
    device: &'a DeviceContext,
    cpu: C,
    gpu: G,
    rng: R,
}

impl<'a, C, G, R> Benchmark<'a, C, G, R>
where
    C: CpuMsmRunner,
    G: GpuMsmRunner,
    R: Rng,
{
    pub fn new(config: &'a BenchConfig, device: &'a DeviceContext, cpu: C, gpu: G, rng: R) -> Self {
        Self { config, device, cpu, gpu, rng }
    }

    pub fn into_runners(self) -> (C, G) {
        (self.cpu, self.gpu)
    }

    /// Measures every configured size in increasing order, handing each
    /// record to `on_record` as soon as it is ready.
    pub fn run(
        &mut self,
        mut on_record: impl FnMut(&BenchmarkRecord),
    ) -> Result<Vec<BenchmarkRecord>, BenchError> {
        let sizes = self.config.problem_sizes()?;
        info!(
            sizes = sizes.len(),
            runs = self.config.runs,
            detailed = self.config.detailed,
            device = %self.device,
            "starting sweep"
        );

        let mut records = Vec::with_capacity(sizes.len());
        for size in sizes {
            let record = self.measure(size)?;
            on_record(&record);
            records.push(record);
        }

        info!(sizes = records.len(), "sweep complete");
        Ok(records)
    }

    /// Runs all phases for one size.
    #[instrument(skip_all, fields(size = %size, n = size.size()))]
    pub fn measure(&mut self, size: ProblemSize) -> Result<BenchmarkRecord, BenchError> {
        self.config.validate()?;
        let runs = self.config.runs;
        let detailed = self.config.detailed;
        info!("testing {size} ({} elements)", size.size());

        debug!(phase = ?Phase::Generating);
        let samples = SampleSet::generate(size, &mut self.rng);

        debug!(phase = ?Phase::WarmingUp);
        let cpu_warm = self.cpu.run(&samples)?;
        let gpu_warm = self.gpu.run(&samples, false)?;

        let results_match = self.config.verify.then(|| cpu_warm.result == gpu_warm.result);
        if results_match == Some(false) {
            warn!(cpu = ?cpu_warm.result, gpu = ?gpu_warm.result, "cpu and gpu results differ");
        }

        let mut cpu_total = Duration::ZERO;
        let mut gpu_total = Duration::ZERO;
        let mut breakdown = None;

        for iteration in 1..=runs {
            let phase = Phase::Measuring { iteration };
            debug!(?phase);
            let representative = detailed && iteration == 1;

            cpu_total += self.cpu.run(&samples)?.elapsed;

            let gpu_run = self.gpu.run(&samples, representative)?;
            gpu_total += gpu_run.elapsed;
            if representative {
                breakdown = gpu_run.breakdown;
            }
        }

        debug!(phase = ?Phase::Aggregating);
        let cpu_avg = average(cpu_total, runs);
        let gpu_avg = average(gpu_total, runs);
        let record = BenchmarkRecord {
            size,
            cpu_avg,
            gpu_avg,
            speedup: raw_speedup(cpu_avg, gpu_avg),
            breakdown,
            results_match,
        };

        debug!(phase = ?Phase::Done, ?cpu_avg, ?gpu_avg, speedup = record.speedup);
        Ok(record)
    }
}
