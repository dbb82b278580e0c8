use clap::Parser;
use uniarch_cli::Cli;

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .format_timestamp(None)
        .init();

    log::debug!("uniarch {}", uniarch_cli::VERSION);
    uniarch_cli::run(cli)
}
