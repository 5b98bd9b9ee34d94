mod cli;

use anyhow::Result;
use berth::cancel::CancelToken;
use berth::error::{kind_of, ErrorKind};
use berth::logging::init_logging;
use clap::Parser;
use colored::Colorize;

use cli::{dispatch, Cli};

/// Exit status after an interrupt, as for SIGINT-terminated shells
const EXIT_INTERRUPTED: i32 = 130;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cancel = CancelToken::new();
    cancel.install_signal_handler()?;

    let result = dispatch(cli.command, &cancel);
    if let Err(err) = &result {
        if kind_of(err) == Some(ErrorKind::Canceled) {
            eprintln!("{} {err:#}", "interrupted:".yellow().bold());
            std::process::exit(EXIT_INTERRUPTED);
        }
    }
    result
}
