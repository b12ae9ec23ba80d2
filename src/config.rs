use crate::error::BenchError;
use crate::sample::ProblemSize;

pub const DEFAULT_MIN_DEGREE: u32 = 7;
pub const DEFAULT_MAX_DEGREE: u32 = 20;
pub const DEFAULT_RUNS: u32 = 3;

/// Which device the GPU side runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSpec {
    pub kind: String,
    pub index: i32,
}

impl Default for DeviceSpec {
    fn default() -> Self {
        Self { kind: "CUDA".to_string(), index: 0 }
    }
}

/// Parameters of one sweep.
///
/// - `min_degree..=max_degree`: the sizes `2^d` measured, in increasing order.
/// - `runs`: timed repetitions per size, at least one.
/// - `detailed`: capture a stage breakdown from the first timed GPU run.
/// - `verify`: compare the CPU and GPU warm-up results once per size.
/// - `seed`: replayable inputs; `None` draws from OS entropy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    pub min_degree: u32,
    pub max_degree: u32,
    pub runs: u32,
    pub detailed: bool,
    pub verify: bool,
    pub seed: Option<u64>,
    pub device: DeviceSpec,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            min_degree: DEFAULT_MIN_DEGREE,
            max_degree: DEFAULT_MAX_DEGREE,
            runs: DEFAULT_RUNS,
            detailed: false,
            verify: false,
            seed: None,
            device: DeviceSpec::default(),
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.runs == 0 {
            return Err(BenchError::InvalidConfig("runs must be at least 1".to_string()));
        }
        if self.min_degree > self.max_degree {
            return Err(BenchError::InvalidConfig(format!(
                "min degree {} is above max degree {}",
                self.min_degree, self.max_degree
            )));
        }
        if self.max_degree > ProblemSize::MAX_DEGREE {
            return Err(BenchError::InvalidConfig(format!(
                "max degree {} is above the supported {}",
                self.max_degree,
                ProblemSize::MAX_DEGREE
            )));
        }
        Ok(())
    }

    /// The sweep, smallest size first.
    pub fn problem_sizes(&self) -> Result<Vec<ProblemSize>, BenchError> {
        self.validate()?;
        (self.min_degree..=self.max_degree).map(ProblemSize::new).collect()
    }
}
