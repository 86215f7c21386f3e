//! `--list-tags`: print the tags found in each file.

use std::path::Path;

use crate::audio::{LoftyStore, StoreError, TagStore};

/// Lines describing the tags of one file, in field order
pub fn describe_tags(path: &Path) -> Result<Vec<String>, StoreError> {
    let store = LoftyStore::open(path)?;
    let name = path.display();

    if store.found_tags().is_empty() {
        return Ok(vec![format!("No available tags found in {}", name)]);
    }

    let types: Vec<String> = store
        .found_tags()
        .iter()
        .map(|t| format!("{:?}", t))
        .collect();
    let mut lines = vec![format!("{} | Available tags: {}", name, types.join(", "))];

    for field in store.fields() {
        if let Some(value) = store.get(field) {
            lines.push(format!("  {}: {}", field, value));
        }
    }
    Ok(lines)
}

/// Print the tags of every file; returns the number of files that could not be read
pub fn list_tags(files: &[impl AsRef<Path>]) -> usize {
    let mut failed = 0;
    for path in files {
        let path = path.as_ref();
        match describe_tags(path) {
            Ok(lines) => {
                for line in lines {
                    println!("{}", line);
                }
            }
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                failed += 1;
            }
        }
    }
    failed
}
