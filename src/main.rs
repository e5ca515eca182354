use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mathtutor::config::load_settings;
use mathtutor::{interpret, server, solve_query, Intent, Options};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Log at debug level
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run the HTTP service
  Serve {
    /// Address to listen on, overrides the config file and environment
    #[arg(long)]
    bind: Option<String>,
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
  },
  /// Solve one query and print the steps
  Solve {
    /// The problem, in Arabic or English
    text: String,
    /// evaluate, fraction, derivative, integral, solve or matrix
    #[arg(long)]
    mode: Option<String>,
    /// brief or detailed
    #[arg(long)]
    verbosity: Option<String>,
    /// degrees or radians
    #[arg(long)]
    angle_unit: Option<String>,
    /// Print the response as JSON
    #[arg(long)]
    json: bool,
  },
  /// Simplify an expression
  Eval {
    /// The expression to simplify
    expression: String,
  },
}

fn init_logger(verbose: bool) {
  let fallback = if verbose {
    "mathtutor=debug,tower_http=debug,info"
  } else {
    "mathtutor=info"
  };
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(fallback));

  tracing_subscriber::registry()
    .with(filter)
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact(),
    )
    .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  init_logger(cli.verbose);

  match cli.command {
    Commands::Serve { bind, config } => {
      let mut settings = load_settings(config.as_deref())?;
      if let Some(bind) = bind {
        settings.bind_addr = bind;
      }
      server::serve(settings).await?;
    }
    Commands::Solve {
      text,
      mode,
      verbosity,
      angle_unit,
      json,
    } => {
      let mut options = Options::default();
      if let Some(mode) = mode {
        options.mode = Some(mode.parse::<Intent>()?);
      }
      if let Some(v) = verbosity {
        options.verbosity = v.parse()?;
      }
      if let Some(unit) = angle_unit {
        options.angle_unit = unit.parse()?;
      }
      let solution = solve_query(&text, &options)?;
      if json {
        let out = serde_json::to_string_pretty(&solution)
          .context("failed to encode the solution")?;
        println!("{out}");
      } else {
        for (i, step) in solution.steps.iter().enumerate() {
          println!("{}. {step}", i + 1);
        }
        println!("=> {}", solution.result);
      }
    }
    Commands::Eval { expression } => {
      println!("{}", interpret(&expression)?);
    }
  }
  Ok(())
}
