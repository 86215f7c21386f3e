//! Batch driver: walks the expanded file list through one `Context`.

use std::path::{Path, PathBuf};

use crate::audio::{LoftyStore, StoreError, TagStore};
use crate::config::Config;

use super::context::Context;
use super::state::RunSummary;

/// Process every file with the lofty-backed store
pub fn run_batch(ctx: &mut Context, config: &Config, files: &[PathBuf]) -> RunSummary {
    run_batch_with(ctx, config, files, LoftyStore::open)
}

/// Process every file, opening each one with `open`.
///
/// A failing file is logged and counted; the batch always continues.
pub fn run_batch_with<S, F>(
    ctx: &mut Context,
    config: &Config,
    files: &[PathBuf],
    open: F,
) -> RunSummary
where
    S: TagStore,
    F: Fn(&Path) -> Result<S, StoreError>,
{
    let mut summary = RunSummary::default();

    for path in files {
        log::info!("Processing {}", path.display());
        summary.processed += 1;

        match ctx.process_file(config, path, &open) {
            Ok(report) if report.is_partial() => {
                log::warn!(
                    "{}: {} image rule(s) skipped",
                    path.display(),
                    report.image_failures
                );
                summary.failed += 1;
            }
            Ok(_) => {}
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                summary.failed += 1;
            }
        }
    }

    log::debug!(
        "Processed {} file(s), {} failed",
        summary.processed,
        summary.failed
    );

    summary
}
