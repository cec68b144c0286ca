mod cli;
mod columns;
mod compile;
mod config;
mod db;
mod grid_file;
mod run;

use tracing_subscriber::EnvFilter;

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Compile(args) => compile::run(args),
        cli::Command::Run(args) => run::run(args).await,
        cli::Command::Columns(args) => columns::run(args).await,
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `[logging].filter`.
pub(crate) fn init_logging(config: &config::ProjectConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = config.file.logging.filter.as_deref().unwrap_or("warn");
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
