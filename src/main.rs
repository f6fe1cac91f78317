//! Kohonen CLI - Self-Organizing Map trainer
//!
//! Command-line interface for training a map on vectors read from a file.

use clap::{Parser, Subcommand};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use kohonen::input::load_vectors;
use kohonen::{Config, KohonenMap, Result, SomConfig, TrainingConfig};
use log::error;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "kohonen")]
#[command(version)]
#[command(about = "Kohonen self-organizing map trainer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a map on input vectors (one per line, comma or space separated)
    Train {
        /// Input vector file
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Horizontal size of the map
        #[arg(short = 'x', long, default_value = "30")]
        x_size: usize,

        /// Vertical size of the map
        #[arg(short = 'y', long, default_value = "30")]
        y_size: usize,

        /// Spacing between node positions
        #[arg(long, default_value = "1.0")]
        spacing: f64,

        /// Initial winner learning rate
        #[arg(long, default_value = "0.95")]
        win_rate: f64,

        /// Initial learning rate for the other nodes in the neighbourhood
        #[arg(long, default_value = "0.90")]
        other_rate: f64,

        /// Decay constant for the winner learning rate
        #[arg(long, default_value = "0.9980")]
        win_rate_decay: f64,

        /// Decay constant for the neighbour learning rate
        #[arg(long, default_value = "0.9975")]
        other_rate_decay: f64,

        /// Decay constant for the neighbourhood radius
        #[arg(long, default_value = "0.99")]
        radius_decay: f64,

        /// Initial neighbourhood radius as a fraction of the map diagonal
        #[arg(long, default_value = "0.50")]
        radius_factor: f64,

        /// Random seed for the initial map (0 = seed from entropy)
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Stop after this many epochs even if not converged
        #[arg(short = 'n', long, default_value = "1000")]
        max_epochs: usize,

        /// Search winners in parallel
        #[arg(short, long)]
        parallel: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the default configuration as JSON
    Defaults,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let result = match cli.command {
        Commands::Train {
            input,
            output,
            x_size,
            y_size,
            spacing,
            win_rate,
            other_rate,
            win_rate_decay,
            other_rate_decay,
            radius_decay,
            radius_factor,
            seed,
            max_epochs,
            parallel,
            pretty,
        } => {
            let config = Config {
                som: SomConfig {
                    x_size,
                    y_size,
                    spacing,
                    dimension: None,
                    seed: SomConfig::seed_from_legacy(seed),
                },
                training: TrainingConfig {
                    win_rate,
                    other_rate,
                    win_rate_decay,
                    other_rate_decay,
                    radius_decay,
                    radius_factor,
                    max_epochs,
                    parallel_search: parallel,
                    ..Default::default()
                },
            };
            train_map(input, output, config, pretty)
        }

        Commands::Defaults => show_defaults(),
    };

    if let Err(e) = result {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn train_map(input: PathBuf, output: Option<PathBuf>, config: Config, pretty: bool) -> Result<()> {
    let start_time = Instant::now();

    let vectors = load_vectors(&input)?;
    eprintln!("✓ Loaded {} vectors from {}", vectors.len(), input.display());

    let max_epochs = config.training.max_epochs;
    let mut map = KohonenMap::configure(config, vectors)?;
    eprintln!(
        "✓ Initialized {}x{} map (dimension {})",
        map.grid().x_size(),
        map.grid().y_size(),
        map.grid().dimension()
    );

    let bar_style = ProgressStyle::default_bar()
        .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} epochs")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░  ");

    let pb = ProgressBar::new(max_epochs as u64);
    pb.set_style(bar_style);

    let cancel = AtomicBool::new(false);
    let summary = map.train_with_cancel(&cancel, |report| {
        pb.inc(1);
        pb.set_message(format!(
            "win_rate {:.4}  radius {:.2}  qe {:.5}",
            report.win_rate,
            report.radius,
            report.quantization_error.unwrap_or(f64::NAN)
        ));
    })?;
    pb.finish_and_clear();

    if summary.converged {
        eprintln!("✓ Converged after {} epochs", summary.total_epochs);
    } else {
        eprintln!("! Not converged after {} epochs", summary.total_epochs);
    }

    let snapshot = map.snapshot();
    let json = if pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };

    match output {
        Some(path) => {
            fs::write(&path, json)?;
            eprintln!("✓ Wrote map to {}", path.display());
        }
        None => println!("{}", json),
    }

    eprintln!("Done in {}", HumanDuration(start_time.elapsed()));
    Ok(())
}

fn show_defaults() -> Result<()> {
    let json = serde_json::to_string_pretty(&Config::default())?;
    println!("{}", json);
    Ok(())
}
