use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidhal_core::{parse_ordering, parse_single_choice, Dataset, DisplayOrder, TaskKind};
use vidhal_runtime::{ModelRegistry, RunConfig, Runner};

#[derive(Parser)]
#[command(name = "vidhal")]
#[command(about = "Caption ranking evaluation for video-language models", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an evaluation task over an annotation file
    Run(RunArgs),

    /// Parse a single model answer
    Parse {
        #[command(subcommand)]
        kind: ParseKind,
    },

    /// Generate a random option display order and save it
    DisplayOrder {
        /// Annotation file (JSON)
        #[arg(short, long)]
        annotations: PathBuf,

        /// Where to write the display order
        #[arg(short, long)]
        out: PathBuf,

        /// Seed for the shuffle
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Annotation file (JSON)
    #[arg(short, long)]
    annotations: PathBuf,

    /// Task: mcqa, naive-ordering or relative-ordering
    #[arg(short, long)]
    task: TaskKind,

    /// Where to write the `video_id -> response` JSON
    #[arg(short, long)]
    save_path: PathBuf,

    /// Model type (overrides the config file)
    #[arg(short, long)]
    model: Option<String>,

    /// Directory holding `<video>.mp4` files
    #[arg(long, default_value = ".")]
    videos: PathBuf,

    /// Predefined display order (JSON); generated when absent
    #[arg(long)]
    options_path: Option<PathBuf>,

    /// Save the generated display order here
    #[arg(long)]
    save_options: Option<PathBuf>,

    /// Run configuration (YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Options per item
    #[arg(long)]
    num_captions: Option<usize>,

    /// Items processed at the same time
    #[arg(long)]
    concurrency: Option<usize>,

    /// Seed for the generated display order
    #[arg(long)]
    seed: Option<u64>,

    /// Leave the worked example out of ordering prompts
    #[arg(long)]
    no_hint: bool,

    /// Per-item time limit (e.g. "30s", "2m")
    #[arg(long, value_parser = humantime::parse_duration)]
    item_timeout: Option<Duration>,
}

#[derive(Subcommand)]
enum ParseKind {
    /// Extract one option letter
    Choice {
        /// Number of options
        #[arg(short, default_value = "3")]
        n: usize,

        /// Model answer
        text: String,
    },

    /// Extract an ordering of option letters
    Ordering {
        /// Number of options
        #[arg(short, default_value = "3")]
        n: usize,

        /// Model answer
        text: String,
    },
}

impl RunArgs {
    /// Config file (or defaults) with command-line overrides applied.
    fn config(&self) -> anyhow::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => RunConfig::default(),
        };

        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(num_captions) = self.num_captions {
            config.num_captions = num_captions;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.no_hint {
            config.use_hint = false;
        }
        if self.item_timeout.is_some() {
            config.item_timeout = self.item_timeout;
        }

        config.validate()?;
        Ok(config)
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = args.config()?;

    let dataset = Dataset::from_json_file(&args.annotations, &args.videos).with_context(|| {
        format!("Failed to load annotations from {}", args.annotations.display())
    })?;

    let display_order = match &args.options_path {
        Some(path) => DisplayOrder::from_json_file(path)
            .with_context(|| format!("Failed to load display order from {}", path.display()))?,
        None => {
            tracing::info!("No predefined display order supplied, generating one");
            DisplayOrder::generate_seeded(dataset.items(), config.seed)?
        }
    };

    if let Some(path) = &args.save_options {
        display_order
            .save(path)
            .with_context(|| format!("Failed to save display order to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Saved display order");
    }

    let runner = Runner::from_config(args.task, &ModelRegistry::with_defaults(), config)?;
    let report = runner.run(&dataset, &display_order).await?;

    report
        .save_responses(&args.save_path)
        .with_context(|| format!("Failed to save responses to {}", args.save_path.display()))?;

    let summary = serde_json::json!({
        "task": report.task,
        "model": report.model,
        "items": report.responses.len(),
        "started_at": report.started_at,
        "finished_at": report.finished_at,
        "usage": report.usage,
        "save_path": args.save_path,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

fn display_order(annotations: PathBuf, out: PathBuf, seed: Option<u64>) -> anyhow::Result<()> {
    let dataset = Dataset::from_json_file(&annotations, ".")
        .with_context(|| format!("Failed to load annotations from {}", annotations.display()))?;

    let order = DisplayOrder::generate_seeded(dataset.items(), seed)?;
    order
        .save(&out)
        .with_context(|| format!("Failed to save display order to {}", out.display()))?;

    tracing::info!(videos = order.len(), path = %out.display(), "Saved display order");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args).await?,
        Commands::Parse { kind } => match kind {
            ParseKind::Choice { n, text } => {
                println!("{}", serde_json::to_string(&parse_single_choice(&text, n))?);
            }
            ParseKind::Ordering { n, text } => {
                println!("{}", serde_json::to_string(&parse_ordering(&text, n))?);
            }
        },
        Commands::DisplayOrder {
            annotations,
            out,
            seed,
        } => display_order(annotations, out, seed)?,
    }

    Ok(())
}
