//! CPU vs GPU multi-scalar multiplication benchmark over BN254 G1.
//!
//! The CPU side is the arkworks MSM, the GPU side an icicle pipeline driven
//! stage by stage so that transfer, Montgomery conversion and compute can be
//! timed separately. The crate does not implement MSM; it measures two
//! implementations under the same inputs and reports averages, speedup and,
//! optionally, where the GPU time goes.

pub mod backend;
pub mod bench;
pub mod config;
pub mod curve;
pub mod device;
pub mod error;
pub mod report;
pub mod runner;
pub mod sample;
pub mod timing;

pub use bench::{Benchmark, BenchmarkRecord, Speedup};
pub use config::{BenchConfig, DeviceSpec};
pub use device::DeviceContext;
pub use error::BenchError;
pub use runner::{ArkCpuRunner, GpuStagedRunner};
pub use sample::{ProblemSize, SampleSet};
pub use timing::{Stage, TimingBreakdown};
