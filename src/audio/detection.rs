use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Check if a file is an audio file based on its extension
pub fn is_audio_file(path: &Path) -> bool {
    if let Some(ext) = path.extension() {
        let ext = ext.to_string_lossy().to_lowercase();
        matches!(
            ext.as_str(),
            "mp3" | "flac" | "wav" | "ogg" | "m4a" | "aac" | "aiff" | "aif" | "opus" | "ape" | "wv"
        )
    } else {
        false
    }
}

/// Expand command line names into the files to process.
///
/// Files are kept as given, whatever their extension. Directories are walked
/// recursively for audio files, sorted by name. Names that do not exist are
/// logged and dropped.
pub fn expand_inputs(names: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for name in names {
        if name.is_file() {
            files.push(name.clone());
        } else if name.is_dir() {
            let before = files.len();
            for entry in WalkDir::new(name).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() && is_audio_file(entry.path()) => {
                        files.push(entry.into_path());
                    }
                    Ok(_) => {}
                    Err(e) => log::warn!("Skipping unreadable entry under {}: {}", name.display(), e),
                }
            }
            log::debug!("Found {} audio files in {}", files.len() - before, name.display());
        } else {
            log::warn!("  File {} not found. Skipping", name.display());
        }
    }
    files
}
