mod args;
mod op;
mod ops;
mod render;
mod state;

use args::Args;
use clap::{Parser, Subcommand};
use op::Op;
use ops::{Export, Import, Init, Inspect, Resolve};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

command_enum! {
    (Init, Init),
    (Inspect, Inspect),
    (Resolve, Resolve),
    (Import, Import),
    (Export, Export),
}

/// Pick the default log level: the flag, then the config file, then warn
fn log_level(args: &Args) -> Result<LevelFilter, state::StateError> {
    if let Some(level) = &args.log_level {
        return level
            .parse()
            .map_err(|_| state::StateError::InvalidLogLevel(level.clone()));
    }
    match state::AppState::load(args.config_path.clone()) {
        Ok(state) => state.config.level_filter(),
        Err(_) => Ok(LevelFilter::WARN),
    }
}

/// Log to stderr so command output on stdout stays parseable
fn init_logging(level: LevelFilter) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let level = match log_level(&args) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(level);

    let ctx = op::OpContext::new(args.config_path);

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            tracing::debug!("command failed: {:?}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
