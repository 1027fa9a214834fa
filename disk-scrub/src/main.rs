use clap::Parser;
use disk_scrub::cli::Cli;
use scrub_core::{logging, request::FAILURE_EXIT_CODE};
use scrub_hal::LinuxHal;
use std::io::{self, Write};

fn main() {
    let cli = Cli::parse();

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(FAILURE_EXIT_CODE);
        }
    };
    logging::init(&config.logging);
    log::info!("disk-scrub {} starting", env!("CARGO_PKG_VERSION"));

    let outcome = disk_scrub::run(&config, &LinuxHal::new(), &cli.request);

    print!("{}", outcome.stdout);
    eprint!("{}", outcome.stderr);
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
    std::process::exit(outcome.exit_code);
}
