// trainer_cli/src/main.rs
mod app_config;

use anyhow::{bail, Context, Result};
use app_config::AppConfig;
use backprop_viz::{
    mean_error, print_model_summary, print_summary_table, ModelSnapshot, NetworkConfig, TickOutcome, TrainingSession,
    XOR_TEXT,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Train and query a one-hidden-layer network")]
struct Cli {
    /// YAML settings file; command-line flags override it
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train on a CSV-like file (XOR when omitted) and optionally save the model
    Train {
        #[arg(short, long, value_name = "PATH")]
        data: Option<PathBuf>,
        #[arg(short, long, value_name = "INT")]
        epochs: Option<usize>,
        #[arg(long, value_name = "INT")]
        hidden: Option<usize>,
        #[arg(long, value_name = "FLOAT")]
        lr: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
        /// Where to write the snapshot
        #[arg(short, long, value_name = "PATH")]
        out: Option<PathBuf>,
        /// Gzip the snapshot
        #[arg(long)]
        compress: bool,
    },
    /// Run a saved model on one input
    Predict {
        #[arg(short, long, value_name = "PATH")]
        model: PathBuf,
        /// Comma-separated input values
        #[arg(value_delimiter = ',', allow_hyphen_values = true, required = true)]
        input: Vec<f64>,
    },
    /// Print the topology and epoch of a saved model
    Inspect {
        #[arg(short, long, value_name = "PATH")]
        model: PathBuf,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().compact().with_env_filter(filter).init();
}

fn is_compressed(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("gz") | Some("pere"))
}

fn read_snapshot(path: &Path) -> Result<ModelSnapshot> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let snapshot = if is_compressed(path) {
        ModelSnapshot::from_gz_bytes(&bytes)?
    } else {
        backprop_viz::restore(&String::from_utf8(bytes)?)?
    };
    Ok(snapshot)
}

fn write_snapshot(path: &Path, snapshot: &ModelSnapshot, compress: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = if compress {
        snapshot.to_gz_bytes()?
    } else {
        snapshot.to_json_pretty()?.into_bytes()
    };
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

/// Network config matching a snapshot's own shapes.
fn config_for(snapshot: &ModelSnapshot, lr: f64) -> Result<NetworkConfig> {
    match snapshot.topology() {
        Some((input, hidden, output)) => Ok(NetworkConfig::new(input, hidden, output, lr)),
        None => bail!("snapshot has ragged weight matrices"),
    }
}

fn run_train(settings: AppConfig, data: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let text = match &data {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to open {}", path.display()))?,
        None => XOR_TEXT.to_string(),
    };
    let config = settings.network_config()?;
    let mut session = match settings.seed {
        Some(seed) => TrainingSession::with_seed(config, seed)?,
        None => TrainingSession::new(config)?,
    };
    session.set_training_data(&text);
    if session.dataset().is_empty() {
        bail!("no valid training rows");
    }
    print_model_summary(session.model());

    let epochs = settings.epochs.unwrap_or(5000);
    let mut errors = Vec::with_capacity(epochs);
    session.start_training();
    for _ in 0..epochs {
        match session.tick()? {
            TickOutcome::Trained(m) => errors.push(m.error),
            TickOutcome::Idle | TickOutcome::Skipped => break,
        }
    }
    session.pause_training();

    let metrics = session.metrics();
    print_summary_table(&errors, "Training Error");
    info!(epoch = metrics.epoch, error = metrics.error, accuracy = metrics.accuracy, "training finished");
    println!("Accuracy: {:.0}%", metrics.accuracy);
    println!("Error after last update: {:.6}", mean_error(session.dataset(), session.model())?);

    if let Some(path) = out {
        write_snapshot(&path, &session.save_model(), settings.compress.unwrap_or(false))?;
        info!(path = %path.display(), "snapshot written");
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let file_settings = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Command::Train { data, epochs, hidden, lr, seed, out, compress } => {
            let flags = AppConfig {
                hidden_size: hidden,
                learning_rate: lr,
                epochs,
                seed,
                compress: compress.then_some(true),
            };
            run_train(file_settings.merge(flags), data, out)?;
        }
        Command::Predict { model, input } => {
            let snapshot = read_snapshot(&model)?;
            let config = config_for(&snapshot, file_settings.network_config()?.learning_rate)?;
            let mut session = TrainingSession::new(config)?;
            session.load_snapshot(snapshot)?;
            let result = session.test_input(&input)?;
            println!("Input: {:?}", input);
            println!("Output: {:?}", result.output);
            println!("Rounded: {:?}", result.rounded);
        }
        Command::Inspect { model } => {
            let snapshot = read_snapshot(&model)?;
            match snapshot.topology() {
                Some((i, h, o)) => println!("Network: [{}, {}, {}] epoch={}", i, h, o, snapshot.epoch),
                None => bail!("snapshot has ragged weight matrices"),
            }
        }
    }
    Ok(())
}
