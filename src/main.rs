use brrtrouter_cors::cli::{run_cli, Cli};
use brrtrouter_cors::otel::{self, LogConfig, LogFormat};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Log lines share the terminal with the report
    let mut log_config = LogConfig::from_env();
    log_config.log_level = cli.log_level.clone();
    log_config.format = LogFormat::Pretty;
    otel::init_logging_with_config(&log_config)?;

    let stdout = std::io::stdout();
    run_cli(&cli, &mut stdout.lock())
}
