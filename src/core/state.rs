//! Run state types
//!
//! - RunOptions: switches that apply to a whole run
//! - FileReport: what was computed for one file
//! - RunSummary: totals across a run

use regex::Regex;

use crate::rules::{FieldChange, ImageChange};

/// Options for a run, fixed before the first file is processed
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Compute and log changes without touching any file
    pub dry_run: bool,
    /// Leave ID3v1 tags in place after saving
    pub keep_v1: bool,
    /// Pattern applied to titles before rules see them
    pub renumber: Option<Regex>,
}

/// Changes computed (and, outside dry-run, written) for one file
#[derive(Debug, Default)]
pub struct FileReport {
    pub index: i64,
    pub fields: Vec<FieldChange>,
    pub images: Vec<ImageChange>,
    /// Image rules dropped because their source could not be read
    pub image_failures: usize,
}

impl FileReport {
    pub fn is_partial(&self) -> bool {
        self.image_failures > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        self.failed == 0
    }
}
