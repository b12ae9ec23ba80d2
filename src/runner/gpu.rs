use std::time::Instant;

use tracing::debug;

use super::{GpuMsmRunner, GpuRun};
use crate::backend::DeviceMsm;
use crate::curve::{DeviceProjective, projective_to_affine};
use crate::error::BenchError;
use crate::sample::SampleSet;
use crate::timing::{Stage, StageTimer};

/// Drives one MSM through the device pipeline stage by stage:
/// allocate, bases H2D, scalars H2D, bases and scalars out of Montgomery form,
/// MSM (result lands on the host), free.
///
/// Buffers are allocated and released inside every run; nothing is cached
/// between runs.
pub struct GpuStagedRunner<B: DeviceMsm> {
    backend: B,
}

impl<B: DeviceMsm> GpuStagedRunner<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Stages 2 through 6. The caller owns allocation and release so that
    /// release happens whatever this returns.
    fn run_stages(
        backend: &mut B,
        samples: &SampleSet,
        bases: &mut B::Bases,
        scalars: &mut B::Scalars,
        timer: &mut StageTimer,
    ) -> Result<DeviceProjective, BenchError> {
        timer.time(Stage::BasesH2D, || {
            backend.copy_bases_to_device(samples.device_points(), bases)
        })?;
        timer.time(Stage::ScalarsH2D, || {
            backend.copy_scalars_to_device(samples.device_scalars(), scalars)
        })?;
        timer.time(Stage::BasesMontgomery, || backend.bases_from_montgomery(bases))?;
        timer.time(Stage::ScalarsMontgomery, || backend.scalars_from_montgomery(scalars))?;

        let result = timer.time(Stage::MsmCompute, || backend.msm(scalars, bases))?;
        // retrieval is part of the msm call, see `TimingBreakdown::result_d2h`
        timer.mark_zero(Stage::ResultD2H);

        Ok(result)
    }
}

impl<B: DeviceMsm> GpuMsmRunner for GpuStagedRunner<B> {
    fn run(&mut self, samples: &SampleSet, measure_detail: bool) -> Result<GpuRun, BenchError> {
        let n = samples.len();
        let start = Instant::now();
        let mut timer = StageTimer::new(measure_detail);

        let mut bases = self.backend.alloc_bases(n)?;
        let mut scalars = match self.backend.alloc_scalars(n) {
            Ok(scalars) => scalars,
            Err(e) => {
                self.backend.free_bases(bases);
                return Err(e);
            }
        };

        let staged =
            Self::run_stages(&mut self.backend, samples, &mut bases, &mut scalars, &mut timer);

        self.backend.free_bases(bases);
        self.backend.free_scalars(scalars);

        let breakdown = timer.finish();
        let projective =
            staged.inspect_err(|e| debug!(error = %e, n, "staged run failed, buffers released"))?;

        // normalisation to affine counts toward the run
        let result = projective_to_affine(&projective);
        let elapsed = start.elapsed();

        Ok(GpuRun { result, elapsed, breakdown })
    }
}

#[cfg(test)]
mod tests {
    use super::GpuStagedRunner;
    use crate::backend::DeviceMsm;
    use crate::curve::{DeviceAffine, DeviceProjective, DeviceScalar, G1Affine};
    use crate::error::BenchError;
    use crate::runner::GpuMsmRunner;
    use crate::sample::{ProblemSize, SampleSet};
    use crate::timing::Stage;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::thread::sleep;
    use std::time::Duration;

    /// Host-memory stand-in for a device that counts allocations and frees
    /// and can be told to fail at one stage.
    #[derive(Default)]
    struct CountingBackend {
        allocs: usize,
        frees: usize,
        fail_at: Option<Stage>,
        calls: Vec<Stage>,
        release_delay: Duration,
    }

    impl CountingBackend {
        fn failing_at(stage: Stage) -> Self {
            Self { fail_at: Some(stage), ..Default::default() }
        }

        fn step(&mut self, stage: Stage, count: usize) -> Result<(), BenchError> {
            self.calls.push(stage);
            if self.fail_at == Some(stage) {
                return Err(BenchError::stage(stage, count, "injected"));
            }
            Ok(())
        }
    }

    impl DeviceMsm for CountingBackend {
        type Scalars = Vec<DeviceScalar>;
        type Bases = Vec<DeviceAffine>;

        fn alloc_bases(&mut self, count: usize) -> Result<Self::Bases, BenchError> {
            self.step(Stage::Allocate, count)?;
            self.allocs += 1;
            Ok(Vec::with_capacity(count))
        }

        fn alloc_scalars(&mut self, count: usize) -> Result<Self::Scalars, BenchError> {
            self.allocs += 1;
            Ok(Vec::with_capacity(count))
        }

        fn copy_bases_to_device(
            &mut self,
            host: &[DeviceAffine],
            bases: &mut Self::Bases,
        ) -> Result<(), BenchError> {
            self.step(Stage::BasesH2D, host.len())?;
            bases.extend_from_slice(host);
            Ok(())
        }

        fn copy_scalars_to_device(
            &mut self,
            host: &[DeviceScalar],
            scalars: &mut Self::Scalars,
        ) -> Result<(), BenchError> {
            self.step(Stage::ScalarsH2D, host.len())?;
            scalars.extend_from_slice(host);
            Ok(())
        }

        fn bases_from_montgomery(&mut self, bases: &mut Self::Bases) -> Result<(), BenchError> {
            self.step(Stage::BasesMontgomery, bases.len())
        }

        fn scalars_from_montgomery(
            &mut self,
            scalars: &mut Self::Scalars,
        ) -> Result<(), BenchError> {
            self.step(Stage::ScalarsMontgomery, scalars.len())
        }

        fn msm(
            &mut self,
            scalars: &Self::Scalars,
            bases: &Self::Bases,
        ) -> Result<DeviceProjective, BenchError> {
            assert_eq!(scalars.len(), bases.len());
            self.step(Stage::MsmCompute, scalars.len())?;
            Ok(DeviceProjective::zero())
        }

        fn free_bases(&mut self, _bases: Self::Bases) {
            self.frees += 1;
        }

        fn free_scalars(&mut self, _scalars: Self::Scalars) {
            sleep(self.release_delay);
            self.frees += 1;
        }
    }

    fn samples(degree: u32) -> SampleSet {
        let mut rng = ChaCha20Rng::seed_from_u64(u64::from(degree) + 100);
        SampleSet::generate(ProblemSize::new(degree).unwrap(), &mut rng)
    }

    #[test]
    fn test_stages_run_in_order() {
        let mut runner = GpuStagedRunner::new(CountingBackend::default());
        runner.run(&samples(3), false).unwrap();

        let backend = runner.into_backend();
        assert_eq!(
            backend.calls,
            vec![
                Stage::Allocate,
                Stage::BasesH2D,
                Stage::ScalarsH2D,
                Stage::BasesMontgomery,
                Stage::ScalarsMontgomery,
                Stage::MsmCompute,
            ]
        );
        assert_eq!(backend.allocs, 2);
        assert_eq!(backend.frees, 2);
    }

    #[test]
    fn test_breakdown_only_when_measured() {
        let samples = samples(4);
        let mut runner = GpuStagedRunner::new(CountingBackend::default());

        let plain = runner.run(&samples, false).unwrap();
        assert!(plain.breakdown.is_none());

        let detailed = runner.run(&samples, true).unwrap();
        let breakdown = detailed.breakdown.unwrap();
        assert_eq!(breakdown.result_d2h, Duration::ZERO);
        assert!(breakdown.stages_sum() <= breakdown.total);
        assert!(breakdown.total <= detailed.elapsed);
    }

    #[test]
    fn test_elapsed_runs_until_result_is_ready() {
        let delay = Duration::from_millis(5);
        let backend = CountingBackend { release_delay: delay, ..Default::default() };
        let mut runner = GpuStagedRunner::new(backend);

        let run = runner.run(&samples(2), true).unwrap();
        let breakdown = run.breakdown.unwrap();
        assert!(breakdown.total >= delay);
        assert!(run.elapsed >= breakdown.total);
    }

    #[test]
    fn test_zero_projective_is_infinity() {
        let mut runner = GpuStagedRunner::new(CountingBackend::default());
        let run = runner.run(&samples(0), true).unwrap();
        assert_eq!(run.result, G1Affine::identity());
    }

    #[test]
    fn test_buffers_released_on_every_failure() {
        let samples = samples(3);
        for stage in [
            Stage::BasesH2D,
            Stage::ScalarsH2D,
            Stage::BasesMontgomery,
            Stage::ScalarsMontgomery,
            Stage::MsmCompute,
        ] {
            let mut runner = GpuStagedRunner::new(CountingBackend::failing_at(stage));
            let err = runner.run(&samples, true).unwrap_err();
            assert!(matches!(err, BenchError::Stage { stage: s, .. } if s == stage));

            let backend = runner.into_backend();
            assert_eq!(backend.allocs, 2, "{stage}");
            assert_eq!(backend.frees, 2, "{stage}");
            assert_eq!(backend.calls.last(), Some(&stage));
        }
    }

    #[test]
    fn test_failed_first_allocation_frees_nothing() {
        let mut runner = GpuStagedRunner::new(CountingBackend::failing_at(Stage::Allocate));
        assert!(runner.run(&samples(2), true).is_err());

        let backend = runner.into_backend();
        assert_eq!(backend.allocs, 0);
        assert_eq!(backend.frees, 0);
    }

    #[test]
    fn test_partial_allocation_is_released() {
        let mut runner = GpuStagedRunner::new(FailSecondAlloc(CountingBackend::default()));
        assert!(runner.run(&samples(2), false).is_err());

        let FailSecondAlloc(backend) = runner.into_backend();
        assert_eq!(backend.allocs, 1);
        assert_eq!(backend.frees, 1);
    }

    /// Passes everything through but refuses the scalar allocation.
    struct FailSecondAlloc(CountingBackend);

    impl DeviceMsm for FailSecondAlloc {
        type Scalars = Vec<DeviceScalar>;
        type Bases = Vec<DeviceAffine>;

        fn alloc_bases(&mut self, count: usize) -> Result<Self::Bases, BenchError> {
            self.0.alloc_bases(count)
        }

        fn alloc_scalars(&mut self, count: usize) -> Result<Self::Scalars, BenchError> {
            Err(BenchError::stage(Stage::Allocate, count, "out of memory"))
        }

        fn copy_bases_to_device(
            &mut self,
            host: &[DeviceAffine],
            bases: &mut Self::Bases,
        ) -> Result<(), BenchError> {
            self.0.copy_bases_to_device(host, bases)
        }

        fn copy_scalars_to_device(
            &mut self,
            host: &[DeviceScalar],
            scalars: &mut Self::Scalars,
        ) -> Result<(), BenchError> {
            self.0.copy_scalars_to_device(host, scalars)
        }

        fn bases_from_montgomery(&mut self, bases: &mut Self::Bases) -> Result<(), BenchError> {
            self.0.bases_from_montgomery(bases)
        }

        fn scalars_from_montgomery(
            &mut self,
            scalars: &mut Self::Scalars,
        ) -> Result<(), BenchError> {
            self.0.scalars_from_montgomery(scalars)
        }

        fn msm(
            &mut self,
            scalars: &Self::Scalars,
            bases: &Self::Bases,
        ) -> Result<DeviceProjective, BenchError> {
            self.0.msm(scalars, bases)
        }

        fn free_bases(&mut self, bases: Self::Bases) {
            self.0.free_bases(bases)
        }

        fn free_scalars(&mut self, scalars: Self::Scalars) {
            self.0.free_scalars(scalars)
        }
    }
}
