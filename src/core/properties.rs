//! Building the per-file property snapshot.

use std::path::Path;

use regex::Regex;

use crate::audio::TagStore;
use crate::rules::{PropertyBag, Value};

/// Default `--renumber` pattern: drop leading digits and punctuation
pub const DEFAULT_RENUMBER_RE: &str = r"[\d\W]*(.*)";

/// Extract the file index from a file name.
///
/// Uses the first capture group when the pattern has one, the whole match
/// otherwise. `None` when nothing matches or the text is not a number.
pub fn file_index(file_name: &str, pattern: &Regex) -> Option<i64> {
    let caps = pattern.captures(file_name)?;
    let m = caps.get(1).or_else(|| caps.get(0))?;
    m.as_str().trim().parse().ok()
}

/// Apply the renumber pattern to a title, returning the new title if it changes
pub fn renumber_title(title: &str, pattern: &Regex) -> Option<String> {
    let caps = pattern.captures(title)?;
    let new_title = caps.get(1)?.as_str();
    (new_title != title).then(|| new_title.to_string())
}

/// Snapshot the store's fields plus the derived properties for one file.
///
/// Derived properties: `inc_index`, `file_index`, `file_name`, `file_stem`,
/// `file_dir`, `file_path` and `none` (always null).
pub fn build_properties<S: TagStore + ?Sized>(
    store: &S,
    index: i64,
    path: &Path,
    file_index_re: &Regex,
    renumber: Option<&Regex>,
) -> PropertyBag {
    let mut bag = PropertyBag::new();
    for name in store.fields() {
        bag.insert(*name, store.get(name));
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_stem = path
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_dir = path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    bag.insert("inc_index", index);
    bag.insert("file_index", file_index(&file_name, file_index_re));
    bag.insert("file_name", file_name);
    bag.insert("file_stem", file_stem);
    bag.insert("file_dir", file_dir);
    bag.insert("file_path", path.to_string_lossy().into_owned());
    bag.insert("none", Value::Null);

    if let Some(pattern) = renumber {
        let title = bag.lookup("title").and_then(Value::as_str).map(str::to_string);
        if let Some(title) = title {
            if let Some(new_title) = renumber_title(&title, pattern) {
                log::info!("modify title: {} -> {}", title, new_title);
                bag.insert("title", new_title);
            }
        }
    }

    bag
}
