//! Per-file rule application
//!
//! A `Context` owns the run options and the sequence counter. For each file
//! it builds the property snapshot, evaluates field rules, then image rules,
//! logs every change and, outside dry-run, writes them through the store.

use std::path::Path;

use crate::audio::{StoreError, TagStore};
use crate::config::Config;
use crate::rules::{evaluate_images, ImageAction, Result};

use super::properties::build_properties;
use super::state::{FileReport, RunOptions};

pub struct Context {
    opts: RunOptions,
    next_index: i64,
}

impl Context {
    pub fn new(opts: RunOptions) -> Self {
        Self {
            opts,
            next_index: 1,
        }
    }

    /// Sequence index the next file will get
    #[cfg(test)]
    pub fn next_index(&self) -> i64 {
        self.next_index
    }

    /// Open, edit and save one file.
    ///
    /// The sequence index is consumed before anything can fail, so every
    /// processed file advances it exactly once.
    pub fn process_file<S, F>(&mut self, config: &Config, path: &Path, open: F) -> Result<FileReport>
    where
        S: TagStore,
        F: FnOnce(&Path) -> std::result::Result<S, StoreError>,
    {
        let index = self.next_index;
        self.next_index += 1;

        let mut store = open(path)?;
        let report = self.apply(&mut store, config, path, index)?;

        if !self.opts.dry_run {
            store.save()?;
            if !self.opts.keep_v1 && store.strip_legacy_tags()? {
                log::info!("  Removing ID3v1");
            }
        }

        Ok(report)
    }

    /// Evaluate every rule for one file and write the results to `store`.
    ///
    /// Field rules are all resolved before the first write, so an error in
    /// any of them leaves the store untouched. An unreadable image file only
    /// drops its own rule and is counted in the report.
    pub fn apply<S: TagStore + ?Sized>(
        &self,
        store: &mut S,
        config: &Config,
        path: &Path,
        index: i64,
    ) -> Result<FileReport> {
        let bag = build_properties(
            &*store,
            index,
            path,
            &config.file_index,
            self.opts.renumber.as_ref(),
        );
        log::debug!("Properties: {}", bag.names().join(", "));

        let fields = config.rules.evaluate(&bag)?;
        // Old values come from the store as it was before this file's first
        // write, so several rules on one field report the same way in dry-run.
        let olds: Vec<String> = fields
            .iter()
            .map(|c| store.get(&c.field).map_or_else(|| "None".to_string(), |v| v.to_string()))
            .collect();
        for (change, old) in fields.iter().zip(&olds) {
            log::info!("{}: {} -> {}", change.field, old, change.value);
            if !self.opts.dry_run {
                store.set(&change.field, &change.value)?;
            }
        }

        let images = evaluate_images(&config.images, &bag)?;
        for failure in &images.failures {
            log::error!("{}", failure);
        }
        for change in &images.changes {
            match &change.action {
                ImageAction::Set { mime, data } => {
                    log::info!("{}: image {}, {} bytes", change.slot, mime, data.len());
                    if !self.opts.dry_run {
                        store.set_image(&change.slot, mime, data)?;
                    }
                }
                ImageAction::Remove => {
                    log::info!("{}: remove image", change.slot);
                    if !self.opts.dry_run {
                        store.remove_image(&change.slot)?;
                    }
                }
            }
        }

        Ok(FileReport {
            index,
            fields,
            image_failures: images.failures.len(),
            images: images.changes,
        })
    }
}
