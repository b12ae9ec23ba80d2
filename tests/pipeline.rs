use msm_bench::backend::IcicleBackend;
use msm_bench::curve::{Fr, G1Affine};
use msm_bench::runner::{CpuMsmRunner, GpuMsmRunner};
use msm_bench::{
    ArkCpuRunner, BenchConfig, Benchmark, DeviceContext, GpuStagedRunner, ProblemSize, SampleSet,
};

use ark_ec::AffineRepr;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn host_runner() -> GpuStagedRunner<IcicleBackend> {
    let ctx = DeviceContext::host();
    ctx.activate().unwrap();
    GpuStagedRunner::new(IcicleBackend::new(ctx))
}

#[test]
fn test_staged_pipeline_matches_cpu() {
    let mut rng = ChaCha20Rng::seed_from_u64(42);
    let mut gpu = host_runner();

    for degree in [0, 1, 4, 7] {
        let samples = SampleSet::generate(ProblemSize::new(degree).unwrap(), &mut rng);

        let cpu = ArkCpuRunner.run(&samples).unwrap();
        let staged = gpu.run(&samples, true).unwrap();

        assert_eq!(cpu.result, staged.result, "degree {degree}");
        let breakdown = staged.breakdown.unwrap();
        assert!(breakdown.stages_sum() <= breakdown.total);
    }
}

#[test]
fn test_single_pair_is_scalar_mul() {
    let samples = SampleSet::from_parts(vec![Fr::from(5u64)], vec![G1Affine::generator()]).unwrap();
    let staged = host_runner().run(&samples, false).unwrap();

    let expected = ArkCpuRunner.run(&samples).unwrap().result;
    assert_eq!(staged.result, expected);
    assert!(staged.breakdown.is_none());
}

#[test]
fn test_small_sweep_on_host_device() {
    let config = BenchConfig {
        min_degree: 3,
        max_degree: 4,
        runs: 2,
        detailed: true,
        verify: true,
        ..Default::default()
    };
    let ctx = DeviceContext::host();
    ctx.activate().unwrap();

    let gpu = GpuStagedRunner::new(IcicleBackend::new(ctx.clone()));
    let mut bench = Benchmark::new(&config, &ctx, ArkCpuRunner, gpu, ChaCha20Rng::seed_from_u64(7));
    let records = bench.run(|_| {}).unwrap();

    assert_eq!(records.len(), 2);
    for (record, size) in records.iter().zip([8, 16]) {
        assert_eq!(record.size.size(), size);
        assert_eq!(record.results_match, Some(true));
        assert!(record.speedup >= 0.0);
        assert!(record.breakdown.is_some());
    }
}
