use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use msm_bench::backend::IcicleBackend;
use msm_bench::config::{DEFAULT_MAX_DEGREE, DEFAULT_MIN_DEGREE, DEFAULT_RUNS};
use msm_bench::{
    ArkCpuRunner, BenchConfig, Benchmark, DeviceContext, DeviceSpec, GpuStagedRunner, report,
};

#[derive(Parser, Debug)]
#[command(name = "msm-bench")]
#[command(about = "MSM performance comparison: CPU vs GPU", long_about = None)]
struct Args {
    /// Minimum degree (2^min)
    #[arg(long = "min", default_value_t = DEFAULT_MIN_DEGREE)]
    min_degree: u32,

    /// Maximum degree (2^max)
    #[arg(long = "max", default_value_t = DEFAULT_MAX_DEGREE)]
    max_degree: u32,

    /// Number of timed runs per size
    #[arg(long, default_value_t = DEFAULT_RUNS)]
    runs: u32,

    /// Show detailed GPU timing breakdown
    #[arg(long)]
    detailed: bool,

    /// Compare CPU and GPU results once per size, outside timing
    #[arg(long)]
    verify: bool,

    /// Seed for input generation, random if unset
    #[arg(long)]
    seed: Option<u64>,

    /// Device type for the GPU side
    #[arg(long, default_value = "CUDA")]
    device: String,

    /// Device index
    #[arg(long, default_value_t = 0)]
    device_index: i32,
}

impl Args {
    fn into_config(self) -> BenchConfig {
        BenchConfig {
            min_degree: self.min_degree,
            max_degree: self.max_degree,
            runs: self.runs,
            detailed: self.detailed,
            verify: self.verify,
            seed: self.seed,
            device: DeviceSpec { kind: self.device, index: self.device_index },
        }
    }
}

fn main() -> Result<()> {
    // logs go to stderr, the result table to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "msm_bench=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Args::parse().into_config();
    config.validate().context("invalid arguments")?;

    info!("initializing icicle backend");
    let DeviceSpec { kind, index } = &config.device;
    let ctx = DeviceContext::open(kind, *index)
        .with_context(|| format!("failed to set up device {kind}:{index}"))?;

    print!("{}", report::render_banner(&config, &ctx));
    println!();

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let gpu = GpuStagedRunner::new(IcicleBackend::new(ctx.clone()));
    let mut bench = Benchmark::new(&config, &ctx, ArkCpuRunner, gpu, rng);

    print!("{}", report::render_table_header());
    bench
        .run(|record| print!("{}", report::render_record(record, config.detailed)))
        .context("benchmark aborted")?;
    print!("{}", report::render_footer());

    Ok(())
}
