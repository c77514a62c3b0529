//! Schedulability prediction CLI
//!
//! Trains recurrent binary classifiers on task-set feature data and runs
//! hyperparameter sweeps over them.

use clap::{Parser, Subcommand};
use schedlearn::{CellKind, Config, Result};

#[derive(Parser)]
#[command(name = "schedlearn")]
#[command(about = "Task-set schedulability prediction with recurrent networks", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init,
    /// Generate synthetic task-set CSV files
    Generate {
        /// Number of training examples
        #[arg(long, default_value = "2000")]
        train_samples: usize,
        /// Number of test examples
        #[arg(long, default_value = "500")]
        test_samples: usize,
        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },
    /// Train a classifier and report metrics
    Train {
        /// Recurrent cell kind (lstm or gru)
        #[arg(long)]
        cell: Option<CellKind>,
        /// Override number of epochs
        #[arg(long)]
        epochs: Option<usize>,
        /// Override hidden state width
        #[arg(long)]
        hidden_size: Option<usize>,
        /// Override batch size
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Sweep a hyperparameter grid and write results as CSV
    Sweep {
        /// Recurrent cell kind (lstm or gru)
        #[arg(long)]
        cell: Option<CellKind>,
        /// Hidden sizes to sweep
        #[arg(long, value_delimiter = ',')]
        hidden_sizes: Vec<usize>,
        /// Batch sizes to sweep
        #[arg(long, value_delimiter = ',')]
        batch_sizes: Vec<usize>,
        /// Epoch counts to sweep
        #[arg(long, value_delimiter = ',')]
        epoch_counts: Vec<usize>,
        /// Output CSV path
        #[arg(long, default_value = "sweep.csv")]
        out: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Init => commands::init(&cli.config),
        Commands::Generate {
            train_samples,
            test_samples,
            seed,
        } => commands::generate(&config, train_samples, test_samples, seed),
        Commands::Train {
            cell,
            epochs,
            hidden_size,
            batch_size,
        } => commands::train(&config, cell, epochs, hidden_size, batch_size),
        Commands::Sweep {
            cell,
            hidden_sizes,
            batch_sizes,
            epoch_counts,
            out,
        } => commands::sweep(&config, cell, hidden_sizes, batch_sizes, epoch_counts, &out),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use schedlearn::data::{synthetic, DatasetSplit};
    use schedlearn::training::{sweep, SequenceClassifierTrainer, SweepGrid, SweepRunner};

    type Backend = Autodiff<NdArray<f32>>;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        println!("Created data/ directory");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize hyperparameters", config_path);
        println!("  2. Run 'schedlearn generate' for synthetic task sets");
        println!("  3. Run 'schedlearn train' to train and evaluate");
        Ok(())
    }

    pub fn generate(
        config: &Config,
        train_samples: usize,
        test_samples: usize,
        seed: u64,
    ) -> Result<()> {
        let params = &config.hyperparams;
        params.validate()?;

        let train = synthetic::taskset_split(train_samples, params, seed);
        let test = synthetic::taskset_split(test_samples, params, seed.wrapping_add(1));

        train.save_csv(&config.data.train_path)?;
        test.save_csv(&config.data.test_path)?;

        println!(
            "Wrote {} training examples to {} and {} test examples to {}",
            train.len(),
            config.data.train_path,
            test.len(),
            config.data.test_path
        );
        Ok(())
    }

    pub fn train(
        config: &Config,
        cell: Option<CellKind>,
        epochs: Option<usize>,
        hidden_size: Option<usize>,
        batch_size: Option<usize>,
    ) -> Result<()> {
        let mut params = config.hyperparams.clone();
        if let Some(cell) = cell {
            params.cell_kind = cell;
        }
        if let Some(epochs) = epochs {
            params.epochs = epochs;
        }
        if let Some(hidden_size) = hidden_size {
            params.hidden_size = hidden_size;
        }
        if let Some(batch_size) = batch_size {
            params.batch_size = batch_size;
        }

        let train_split = DatasetSplit::from_csv(&config.data.train_path, params.feature_count)?;
        let test_split = DatasetSplit::from_csv(&config.data.test_path, params.feature_count)?;
        log::info!(
            "Loaded {} training and {} test examples",
            train_split.len(),
            test_split.len()
        );

        let device = Default::default();
        let mut trainer = SequenceClassifierTrainer::<Backend>::new(device, params)?;
        let report = trainer.train(&train_split, &test_split)?;

        println!("{}", report.metrics);

        if let Some(report_path) = &config.data.report_path {
            let json = serde_json::to_string_pretty(&report).map_err(|e| {
                schedlearn::SchedError::Parse(format!("Failed to serialize report: {}", e))
            })?;
            std::fs::write(report_path, json)?;
            println!("Wrote training report to {}", report_path);
        }
        Ok(())
    }

    pub fn sweep(
        config: &Config,
        cell: Option<CellKind>,
        hidden_sizes: Vec<usize>,
        batch_sizes: Vec<usize>,
        epoch_counts: Vec<usize>,
        out: &str,
    ) -> Result<()> {
        let mut base = config.hyperparams.clone();
        if let Some(cell) = cell {
            base.cell_kind = cell;
        }
        let grid = SweepGrid {
            hidden_sizes,
            batch_sizes,
            epoch_counts,
        };

        let train_split = DatasetSplit::from_csv(&config.data.train_path, base.feature_count)?;
        let test_split = DatasetSplit::from_csv(&config.data.test_path, base.feature_count)?;

        let device = Default::default();
        let runner = SweepRunner::<Backend>::new(device);
        let records = runner.run(&base, &grid, &train_split, &test_split)?;

        sweep::write_csv(&records, out)?;
        println!("Wrote {} sweep records to {}", records.len(), out);
        Ok(())
    }
}
