use clap::Parser;
use specrouter::cli::{run_cli, Cli};
use specrouter::logging::init_logging;

fn main() -> anyhow::Result<()> {
    if let Err(err) = init_logging() {
        eprintln!("Warning: {err:#}");
    }
    let cli = Cli::parse();
    run_cli(&cli)
}
