use anyhow::{Context, Result};
use clap::Parser;

use lightbox::Cli;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config();

    if cli.summary_only {
        let summary = lightbox::summary::describe(&config).context("failed to build scene summary")?;
        print!("{summary}");
        return Ok(());
    }

    lightbox::run(config).context("lightbox exited with an error")
}
