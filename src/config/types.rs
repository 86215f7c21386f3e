//! Typed configuration built from the JSON rule document.

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::rules::{
    compile_anchored, CondKey, Error, FieldRule, ImageRule, ImageSource, Result, RuleSet,
    Template, Value,
};

/// Default pattern for pulling a numeric index from the start of a file name
pub const DEFAULT_FILE_INDEX_RE: &str = r"\s*(\d+)";

const IMAGES_DIRECTIVE: &str = "$images";
const FILE_INDEX_DIRECTIVE: &str = "$re_fileindex";

/// Object form of an `$images` entry
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ImageEntry {
    image: Option<String>,
    /// `regex` or `regex|value-template`, appended to the entry key
    #[serde(default, rename = "match")]
    condition: Option<String>,
}

/// Everything a run applies to each file
#[derive(Debug, Clone)]
pub struct Config {
    pub rules: RuleSet,
    pub images: Vec<ImageRule>,
    /// Anchored pattern whose first group is the file index
    pub file_index: Regex,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: RuleSet::new(),
            images: Vec::new(),
            file_index: compile_anchored(DEFAULT_FILE_INDEX_RE)
                .expect("default file index pattern is valid"),
        }
    }
}

impl Config {
    /// Build from a JSON object, keeping declaration order
    pub fn from_map(map: &Map<String, JsonValue>) -> Result<Self> {
        let mut config = Config::default();

        for (key, value) in map {
            match key.as_str() {
                IMAGES_DIRECTIVE => config.images = parse_images(value)?,
                FILE_INDEX_DIRECTIVE => {
                    let pattern = value.as_str().ok_or_else(|| {
                        Error::InvalidConfig(format!("{FILE_INDEX_DIRECTIVE} must be a string"))
                    })?;
                    config.file_index = compile_anchored(pattern)?;
                }
                directive if directive.starts_with('$') => {
                    return Err(Error::InvalidConfig(format!("unknown directive '{directive}'")));
                }
                _ => {
                    let rule = FieldRule::new(CondKey::parse(key)?, template_from_json(key, value)?);
                    config.rules.push(rule);
                }
            }
        }

        Ok(config)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.images.is_empty()
    }

    /// Reject image rules naming slots the tag store cannot hold (case-insensitive)
    pub fn validate_image_slots(&self, known: &[&str]) -> Result<()> {
        for rule in &self.images {
            if !known.iter().any(|slot| slot.eq_ignore_ascii_case(rule.slot())) {
                return Err(Error::InvalidConfig(format!(
                    "unknown image slot '{}' (known slots: {})",
                    rule.slot(),
                    known.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Reject field rules naming fields the tag store cannot write
    pub fn validate_fields(&self, known: &[&str]) -> Result<()> {
        for rule in self.rules.iter() {
            if !known.contains(&rule.field()) {
                return Err(Error::InvalidConfig(format!(
                    "unknown field '{}' (known fields: {})",
                    rule.field(),
                    known.join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn template_from_json(key: &str, value: &JsonValue) -> Result<Template> {
    match value {
        JsonValue::String(pattern) => Template::parse(pattern),
        other => Ok(Template::literal(literal_from_json(key, other)?)),
    }
}

fn literal_from_json(key: &str, value: &JsonValue) -> Result<Value> {
    match value {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::String(s) => Ok(Value::Str(s.clone())),
        JsonValue::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float))
            .ok_or_else(|| Error::InvalidConfig(format!("'{key}': number {n} out of range"))),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| literal_from_json(key, item))
            .collect::<Result<Vec<_>>>()
            .map(Value::Tuple),
        JsonValue::Bool(_) | JsonValue::Object(_) => Err(Error::InvalidConfig(format!(
            "'{key}': value must be a string, number, null or array"
        ))),
    }
}

fn parse_images(value: &JsonValue) -> Result<Vec<ImageRule>> {
    let entries = value
        .as_object()
        .ok_or_else(|| Error::InvalidConfig(format!("{IMAGES_DIRECTIVE} must be an object")))?;

    let mut rules = Vec::with_capacity(entries.len());
    for (key, entry) in entries {
        let (expr, descriptor) = match entry {
            JsonValue::String(descriptor) => (key.clone(), Some(descriptor.clone())),
            JsonValue::Null => (key.clone(), None),
            JsonValue::Object(_) => {
                let entry: ImageEntry = serde_json::from_value(entry.clone()).map_err(|e| {
                    Error::InvalidConfig(format!("{IMAGES_DIRECTIVE} entry '{key}': {e}"))
                })?;
                let expr = match entry.condition {
                    Some(_) if key.contains('|') => {
                        return Err(Error::InvalidConfig(format!(
                            "{IMAGES_DIRECTIVE} entry '{key}' has both an inline condition and 'match'"
                        )));
                    }
                    Some(condition) => format!("{key}|{condition}"),
                    None => key.clone(),
                };
                (expr, entry.image)
            }
            _ => {
                return Err(Error::InvalidConfig(format!(
                    "{IMAGES_DIRECTIVE} entry '{key}' must be a descriptor, null or object"
                )));
            }
        };

        let source = descriptor.as_deref().map(ImageSource::parse).transpose()?;
        rules.push(ImageRule::new(CondKey::parse(&expr)?, source));
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ImageAction, PropertyBag};
    use serde_json::json;

    fn config(value: JsonValue) -> Result<Config> {
        Config::from_map(value.as_object().unwrap())
    }

    #[test]
    fn test_rules_keep_declaration_order() {
        let cfg = config(json!({
            "title": "{title}",
            "album": "Album",
            "artist": "Artist",
            "track_num": "({file_index}, 10)",
        }))
        .unwrap();

        let fields: Vec<&str> = cfg.rules.iter().map(|r| r.field()).collect();
        assert_eq!(fields, vec!["title", "album", "artist", "track_num"]);
    }

    #[test]
    fn test_literal_values() {
        let cfg = config(json!({ "bpm": 120, "comment": null, "disc_num": [1, 2] })).unwrap();
        let bag = PropertyBag::new();
        let values: Vec<Value> = cfg
            .rules
            .iter()
            .map(|r| r.template().resolve(&bag).unwrap())
            .collect();
        assert_eq!(
            values,
            vec![
                Value::Int(120),
                Value::Null,
                Value::Tuple(vec![Value::Int(1), Value::Int(2)]),
            ]
        );
    }

    #[test]
    fn test_rejects_bad_values_and_directives() {
        assert!(config(json!({ "title": true })).is_err());
        assert!(config(json!({ "$unknown": 1 })).is_err());
        assert!(config(json!({ "$re_fileindex": 5 })).is_err());
        assert!(config(json!({ "$re_fileindex": "(" })).is_err());
    }

    #[test]
    fn test_file_index_directive() {
        let cfg = config(json!({ "$re_fileindex": r"track(\d+)" })).unwrap();
        let caps = cfg.file_index.captures("track07.mp3").unwrap();
        assert_eq!(&caps[1], "07");
        assert!(cfg.file_index.captures("a track07.mp3").is_none());
    }

    #[test]
    fn test_default_file_index() {
        let cfg = Config::default();
        let caps = cfg.file_index.captures("  12 - Song.mp3").unwrap();
        assert_eq!(&caps[1], "12");
        assert!(cfg.is_empty());
    }

    #[test]
    fn test_image_entry_forms() {
        let cfg = config(json!({
            "$images": {
                "front_cover": { "image": "data:image/png:AAEC", "match": "01" },
                "back_cover|02|{file_name}": "data:image/jpeg:AwQ=",
                "icon": null,
                "leaflet": { "image": null },
            }
        }))
        .unwrap();
        assert_eq!(cfg.images.len(), 4);

        let mut bag = PropertyBag::new();
        bag.insert("file_name", "01.mp3");
        let front = cfg.images[0].resolve(&bag).unwrap().unwrap();
        assert_eq!(
            front.action,
            ImageAction::Set {
                mime: "image/png".to_string(),
                data: vec![0, 1, 2],
            }
        );
        assert_eq!(cfg.images[1].resolve(&bag).unwrap(), None);
        assert_eq!(cfg.images[2].resolve(&bag).unwrap().unwrap().action, ImageAction::Remove);
        assert_eq!(cfg.images[3].resolve(&bag).unwrap().unwrap().action, ImageAction::Remove);
    }

    #[test]
    fn test_image_entry_errors() {
        assert!(matches!(
            config(json!({ "$images": { "front_cover": "data:image/png" } })),
            Err(Error::MalformedPayload { .. })
        ));
        assert!(config(json!({ "$images": { "a|1": { "image": null, "match": "2" } } })).is_err());
        assert!(config(json!({ "$images": { "a": { "img": null } } })).is_err());
        assert!(config(json!({ "$images": ["front_cover"] })).is_err());
    }

    #[test]
    fn test_validate_fields() {
        let cfg = config(json!({ "title|01": "x", "colour": "red" })).unwrap();
        let err = cfg.validate_fields(&["title", "artist"]).unwrap_err();
        assert!(err.to_string().contains("colour"));

        let cfg = config(json!({ "title|01": "x" })).unwrap();
        assert!(cfg.validate_fields(&["title"]).is_ok());
    }

    #[test]
    fn test_validate_image_slots() {
        let cfg = config(json!({ "$images": { "sideways": null } })).unwrap();
        let err = cfg.validate_image_slots(&["front_cover"]).unwrap_err();
        assert!(err.to_string().contains("sideways"));

        let cfg = config(json!({
            "$images": { "FRONT_COVER|01": null, "back_cover": { "image": null } },
        }))
        .unwrap();
        assert!(cfg.validate_image_slots(&["front_cover", "back_cover"]).is_ok());
    }
}
