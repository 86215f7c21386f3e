//! Test fixtures for tag editing tests
//!
//! Provides an in-memory `TagStore` that records every mutation, and a
//! generator for tiny silent MP3 files that lofty can open and tag.

#![cfg(test)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::audio::{FIELDS, StoreError, TagStore};
use crate::rules::Value;

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, stereo, no CRC
const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
const FRAME_LEN: usize = 417;
const FRAME_COUNT: usize = 20;

/// Write a silent, untagged MP3 made of identical empty frames
pub fn write_silent_mp3(dir: &Path, name: &str) -> PathBuf {
    let mut frame = vec![0u8; FRAME_LEN];
    frame[..4].copy_from_slice(&FRAME_HEADER);
    let data: Vec<u8> = frame.repeat(FRAME_COUNT);

    let path = dir.join(name);
    std::fs::write(&path, data).expect("Failed to write test mp3");
    path
}

thread_local! {
    static CAPTURED: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Logger that records info and above for the calling thread only
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        CAPTURED.with(|captured| {
            if let Some(lines) = captured.borrow_mut().as_mut() {
                lines.push(record.args().to_string());
            }
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static LOGGER_INIT: Once = Once::new();

/// Run `f` and return its result with the log lines it produced on this thread
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    LOGGER_INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Info);
        }
    });
    CAPTURED.with(|captured| *captured.borrow_mut() = Some(Vec::new()));
    let result = f();
    let lines = CAPTURED.with(|captured| captured.borrow_mut().take().unwrap_or_default());
    (result, lines)
}

/// A store that keeps everything in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub values: HashMap<String, Value>,
    pub images: HashMap<String, (String, Vec<u8>)>,
    /// Number of set/remove/save calls
    pub mutations: usize,
    pub saved: bool,
    /// Make `save` fail, to exercise error paths
    pub fail_save: bool,
}

impl MemoryStore {
    pub fn with(values: &[(&str, Value)]) -> Self {
        Self {
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            ..Default::default()
        }
    }
}

impl TagStore for MemoryStore {
    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &Value) -> Result<(), StoreError> {
        if !FIELDS.contains(&name) {
            return Err(StoreError::UnknownField(name.to_string()));
        }
        self.mutations += 1;
        if value.is_null() {
            self.values.remove(name);
        } else {
            self.values.insert(name.to_string(), value.clone());
        }
        Ok(())
    }

    fn set_image(&mut self, slot: &str, mime: &str, data: &[u8]) -> Result<(), StoreError> {
        self.mutations += 1;
        self.images
            .insert(slot.to_ascii_lowercase(), (mime.to_string(), data.to_vec()));
        Ok(())
    }

    fn remove_image(&mut self, slot: &str) -> Result<(), StoreError> {
        self.mutations += 1;
        self.images.remove(&slot.to_ascii_lowercase());
        Ok(())
    }

    fn save(&mut self) -> Result<(), StoreError> {
        if self.fail_save {
            return Err(StoreError::Io("Failed to save file: disk full".to_string()));
        }
        self.mutations += 1;
        self.saved = true;
        Ok(())
    }
}
