//! Scholar CLI: turn a research topic into a structured report.

mod commands;
mod output;

use clap::Parser;
use scholar_core::config::{ReportFormat, ScholarConfig, check_api_keys, load_config, log_dir};
use scholar_core::{Pipeline, create_provider_or_unavailable};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Scholar: search the web, analyse sources and write a research report
#[derive(Parser, Debug)]
#[command(name = "scholar", version, about, long_about = None)]
pub(crate) struct Cli {
    /// Research topic
    topic: Option<String>,

    /// LLM model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum documents to retrieve
    #[arg(short = 'n', long)]
    max_results: Option<usize>,

    /// Report format: pdf or markdown
    #[arg(short, long)]
    format: Option<ReportFormat>,

    /// Directory for generated reports
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the final pipeline state as JSON
    #[arg(long)]
    json: bool,

    /// Workspace directory (reads `.scholar/config.toml`)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum Commands {
    /// Report which API keys are configured and any configuration warnings
    Check,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default `.scholar/config.toml` into the workspace
    Init,
}

impl Cli {
    fn apply_overrides(&self, config: &mut ScholarConfig) {
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(n) = self.max_results {
            config.search.max_results = n;
        }
        if let Some(format) = self.format {
            config.report.format = format;
        }
        if let Some(dir) = &self.output_dir {
            config.report.output_dir = dir.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    let log_dir = log_dir().unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "scholar.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut config = load_config(Some(&workspace), None)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    cli.apply_overrides(&mut config);

    if let Some(command) = cli.command {
        return commands::handle_command(command, &config, &workspace);
    }

    let Some(topic) = cli.topic.as_deref() else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    for warning in config.validate() {
        warn!("{warning}");
    }
    for key in check_api_keys(&config).iter().filter(|k| !k.present) {
        warn!(
            service = key.service,
            env_var = %key.env_var,
            "API key not set; results will use fallbacks"
        );
    }

    let pipeline = Pipeline::standard(
        scholar_tools::build_search_tiers(&config.search),
        config.search.max_results,
        create_provider_or_unavailable(&config.llm),
        scholar_tools::create_renderer(&config.report),
    )
    .with_callback(Arc::new(output::ProgressPrinter::new(cli.json || cli.quiet)));

    let state = pipeline.run(topic).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print!("{}", output::human_summary(&state));
    }
    Ok(())
}
