use std::time::Instant;

use ark_ec::{CurveGroup, VariableBaseMSM};

use super::{CpuMsmRunner, CpuRun};
use crate::curve::G1Projective;
use crate::error::BenchError;
use crate::sample::SampleSet;

/// Reference MSM on the host through arkworks' Pippenger implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArkCpuRunner;

impl CpuMsmRunner for ArkCpuRunner {
    fn run(&mut self, samples: &SampleSet) -> Result<CpuRun, BenchError> {
        let start = Instant::now();
        let result = G1Projective::msm(samples.points(), samples.scalars())
            .map_err(BenchError::CpuMsm)?
            .into_affine();
        let elapsed = start.elapsed();

        Ok(CpuRun { result, elapsed })
    }
}
