// crates/sii-rs-cli/src/main.rs

//! `siitool`: prints an SII image or ESI file and converts between the two.

mod cli;
mod loader;
mod print;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::debug;
use sii_rs::{Finding, SiiCodec};

use crate::cli::Cli;

/// Exit status when `--strict` is set and an Error finding was reported.
const EXIT_FINDINGS: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let codec = SiiCodec::new(cli.codec_config());
    let options = cli.esi_options();

    // 1. Read and detect.
    let input = cli.input_path();
    let bytes = loader::read_input(input)?;
    let hint = loader::format_hint(input);
    let loaded = loader::load(&bytes, hint, &codec, &options)?;
    debug!("Loaded {} categories", loaded.model.categories().len());

    // 2. Report.
    if !cli.quiet {
        println!("Processing {} input", loaded.format);
        print!("{}", print::render_model(&loaded.model, cli.size_unit.into())?);
        println!();
    }
    eprint!("{}", print::render_findings(&loaded.findings)?);

    // 3. Convert.
    if let Some(output) = &cli.output {
        let format = loader::write_output(output, &loaded.model, &codec, &options)?;
        if !cli.quiet {
            println!("Wrote {} output to {}", format, output.display());
        }
    }

    if cli.strict && loaded.findings.iter().any(Finding::is_error) {
        return Ok(ExitCode::from(EXIT_FINDINGS));
    }
    Ok(ExitCode::SUCCESS)
}
