use clap::Parser;
use std::path::PathBuf;
use tonosweep::{
    CommandSimulator, ExperimentConfig, SweepPlan, build_sink, init_logging, notify_completion,
    run_sweep, write_outcome,
};
use tonosweep_core::SweepRuntime;

#[derive(Parser, Debug)]
#[command(name = "tonosweep")]
#[command(about = "Run tonotopic tuning parameter sweeps against a network simulator")]
struct Args {
    /// Experiment file (YAML)
    config: PathBuf,

    /// Path to the data directory (default: ~/.tonosweep/)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Where result files are written (default: <data_dir>/results)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Skip the completion notification even if the experiment enables it
    #[arg(long)]
    no_notify: bool,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tonosweep")
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);
    let output_dir = args.output_dir.unwrap_or_else(|| data_dir.join("results"));

    init_logging(&data_dir, &args.log_level, &args.config)?;

    let config = ExperimentConfig::load(&args.config)?;
    tracing::info!(
        config = %args.config.display(),
        mode = %config.mode,
        variables = config.sweep.len(),
        frequencies = config.frequency_count,
        "Loaded experiment"
    );

    let notify = config.notify_enabled() && !args.no_notify;
    let mut runtime =
        SweepRuntime::new(config.sweep.clone(), config.frequency_count, config.mode)?;
    if let Some(notify_config) = &config.notify {
        runtime = runtime.with_notifier(build_sink(&notify_config.sink));
    }

    let plan = SweepPlan::from_config(&config, notify);
    let mut simulator = CommandSimulator::from_config(&config.simulator);
    let mut stdout = std::io::stdout();

    let mut outcome = run_sweep(&mut runtime, &plan, &mut simulator, &mut stdout)?;
    let path = write_outcome(&outcome, &output_dir)?;
    println!("Results saved to {}", path.display());

    notify_completion(&mut runtime, &plan, &mut outcome)?;

    tracing::info!("Application shutting down");
    Ok(())
}
