use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use chain::{ChainConfig, ForkName, PresetContext, PresetName};
use clap::{Args, Parser, Subcommand};
use containers::{MainnetPreset, MinimalPreset, Preset};
use spec_tests::{ClientTransition, FilesystemCorpus, SuiteDriver, SuiteReport, VectorGenerator};
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Block header conformance suite for the beacon chain state transition")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the operations/block_header suite of a corpus against the client transition.
    Run(RunArgs),
    /// Write a generated block_header vector set in corpus layout.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Root of an unpacked consensus-spec-tests archive.
    #[arg(short, long, env = "CONSENSUS_SPEC_TESTS_DIR")]
    corpus: PathBuf,

    /// Defaults to the PRESET_BASE of --config, or minimal.
    #[arg(short, long)]
    preset: Option<PresetName>,

    #[arg(short, long)]
    fork: ForkName,

    /// Preset/config YAML files, merged in order over the built-in bundle.
    #[arg(long = "config")]
    configs: Vec<PathBuf>,

    #[arg(long)]
    parallel: bool,

    #[arg(long, default_value_t = 60_000, conflicts_with = "no_timeout")]
    timeout_ms: u64,

    #[arg(long)]
    no_timeout: bool,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(short, long)]
    out: PathBuf,

    #[arg(short, long, default_value = "minimal")]
    preset: PresetName,

    #[arg(short, long)]
    fork: ForkName,

    #[arg(long, default_value_t = spec_tests::vectors::DEFAULT_VALIDATOR_COUNT)]
    validators: usize,

    #[arg(long, default_value_t = spec_tests::vectors::DEFAULT_SLOT)]
    slot: u64,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Command::Run(args) => run(args),
        Command::Generate(args) => generate(args),
    }
}

fn run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let config = if args.configs.is_empty() {
        None
    } else {
        Some(ChainConfig::load_from_files(&args.configs).context("unable to load --config")?)
    };
    let preset = args
        .preset
        .or(config.as_ref().map(|config| config.preset_base))
        .unwrap_or(PresetName::Minimal);

    let report = match preset {
        PresetName::Minimal => run_suite::<MinimalPreset>(&args, config)?,
        PresetName::Mainnet => run_suite::<MainnetPreset>(&args, config)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_suite<E: Preset>(
    args: &RunArgs,
    config: Option<ChainConfig>,
) -> anyhow::Result<SuiteReport> {
    let timeout = (!args.no_timeout).then(|| Duration::from_millis(args.timeout_ms));

    let mut driver = SuiteDriver::<E>::new(FilesystemCorpus::new(&args.corpus), ClientTransition)
        .parallel(args.parallel)
        .with_timeout(timeout);
    if let Some(config) = config {
        driver = driver.with_config(config);
    }

    let mut context = PresetContext::new();
    driver
        .run_all(args.fork, &mut context)
        .with_context(|| format!("{}/{} block_header suite aborted", E::NAME, args.fork))
}

fn generate(args: GenerateArgs) -> anyhow::Result<ExitCode> {
    match args.preset {
        PresetName::Minimal => write_vectors::<MinimalPreset>(&args)?,
        PresetName::Mainnet => write_vectors::<MainnetPreset>(&args)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn write_vectors<E: Preset>(args: &GenerateArgs) -> anyhow::Result<()> {
    let vectors = VectorGenerator::new(args.fork, E::default_config())
        .with_validators(args.validators)
        .at_slot(args.slot)
        .generate::<E>()?;

    for vector in &vectors {
        vector
            .write_to(&args.out)
            .with_context(|| format!("unable to write {}", vector.case_id()))?;
    }

    info!(
        out = %args.out.display(),
        preset = %E::NAME,
        fork = %args.fork,
        count = vectors.len(),
        "Vectors written"
    );
    Ok(())
}
