//! Loading rule documents from files, stdin and inline strings

use std::fs;
use std::io::Read;
use std::path::Path;

use serde_json::{Map, Value as JsonValue};

use super::types::Config;
use crate::rules::{Error, Result};

/// Read a config document; `-` reads stdin
pub fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut contents = String::new();
        std::io::stdin()
            .read_to_string(&mut contents)
            .map_err(|e| Error::InvalidConfig(format!("Failed to read config from stdin: {}", e)))?;
        return Ok(contents);
    }

    fs::read_to_string(path).map_err(|e| {
        Error::InvalidConfig(format!("Failed to read config file {}: {}", path.display(), e))
    })
}

/// Parse a document that must be a JSON object
pub fn parse_document(contents: &str) -> Result<Map<String, JsonValue>> {
    let value: JsonValue = serde_json::from_str(contents)
        .map_err(|e| Error::InvalidConfig(format!("Failed to parse config: {}", e)))?;

    match value {
        JsonValue::Object(map) => Ok(map),
        _ => Err(Error::InvalidConfig("config must be a JSON object".to_string())),
    }
}

/// Merge `overlay` into `base`. Overridden keys keep their original position.
pub fn merge(base: &mut Map<String, JsonValue>, overlay: Map<String, JsonValue>) {
    for (key, value) in overlay {
        base.insert(key, value);
    }
}

/// Build the run configuration from an optional file and an optional inline
/// document, the inline one taking precedence key by key.
pub fn load(file: Option<&Path>, inline: Option<&str>) -> Result<Config> {
    let mut document = Map::new();

    if let Some(path) = file {
        merge(&mut document, parse_document(&read_source(path)?)?);
        log::debug!("Loaded config file {}", path.display());
    }
    if let Some(contents) = inline {
        merge(&mut document, parse_document(contents)?);
    }

    let config = Config::from_map(&document)?;
    log::debug!(
        "Loaded {} field rule(s) and {} image rule(s)",
        config.rules.len(),
        config.images.len()
    );
    Ok(config)
}
