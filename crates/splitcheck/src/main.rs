use clap::Parser;
use splitcheck::{Cli, init_logging, run};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref())?;

    run(cli)
}
