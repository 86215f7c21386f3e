//! retag - rule-driven batch editor for audio file tags
//!
//! Reads a JSON rule set, evaluates it against each file's existing tags and
//! derived properties, and writes the results back (or only reports them in
//! dry-run mode).

mod audio;
mod cli;
mod config;
mod core;
mod logging;
mod rules;
mod test_fixtures;

use std::process::ExitCode;

use clap::Parser;

use audio::{expand_inputs, FIELDS, IMAGE_SLOTS};
use cli::Cli;
use config::Config;
use core::{list_tags, run_batch, Context, RunOptions};
use rules::compile_anchored;

/// Exit status for configuration and usage errors
const EXIT_CONFIG: u8 = 2;

fn load_config(cli: &Cli) -> rules::Result<Config> {
    let config = config::load(cli.config_file.as_deref(), cli.config.as_deref())?;
    config.validate_fields(FIELDS)?;
    config.validate_image_slots(IMAGE_SLOTS)?;
    if config.is_empty() {
        log::info!("No rules given; files are only re-saved");
    }
    Ok(config)
}

fn run_options(cli: &Cli) -> rules::Result<RunOptions> {
    let renumber = cli.renumber.as_deref().map(compile_anchored).transpose()?;
    Ok(RunOptions {
        dry_run: cli.dryrun,
        keep_v1: cli.keep_v1,
        renumber,
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, !cli.no_log_file);

    if cli.list_tags {
        return if list_tags(&expand_inputs(&cli.names)) == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    let (config, opts) = match load_config(&cli).and_then(|c| Ok((c, run_options(&cli)?))) {
        Ok(v) => v,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let files = expand_inputs(&cli.names);
    let mut ctx = Context::new(opts);
    let summary = run_batch(&mut ctx, &config, &files);

    if summary.succeeded() {
        ExitCode::SUCCESS
    } else {
        log::error!("{} of {} file(s) failed", summary.failed, summary.processed);
        ExitCode::FAILURE
    }
}
