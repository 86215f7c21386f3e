//! Image rules: pick, load or remove embedded pictures.
//!
//! Descriptors have the form `<source>:<mime>:<content>` where source is
//! `data` (content is base64, decoded once when the rule is built) or
//! `file` / `filename` (content is a path template resolved per file).

use std::fs;
use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::cond_key::CondKey;
use super::error::{Error, Result};
use super::template::Template;
use super::value::PropertyBag;

#[derive(Debug, Clone)]
pub enum Payload {
    Inline(Vec<u8>),
    File(Template),
}

#[derive(Debug, Clone)]
pub struct ImageSource {
    mime: String,
    payload: Payload,
}

impl ImageSource {
    pub fn parse(descriptor: &str) -> Result<Self> {
        let malformed = |reason: &str| Error::MalformedPayload {
            descriptor: truncate(descriptor),
            reason: reason.to_string(),
        };

        let mut parts = descriptor.splitn(3, ':');
        let (Some(kind), Some(mime), Some(content)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed("expected <type>:<mime>:<content>"));
        };
        if mime.trim().is_empty() {
            return Err(malformed("empty mime type"));
        }

        let payload = match kind {
            "data" => {
                let bytes = STANDARD
                    .decode(content.trim())
                    .map_err(|e| malformed(&format!("invalid base64: {e}")))?;
                Payload::Inline(bytes)
            }
            "file" | "filename" => Payload::File(Template::parse(content)?),
            other => return Err(malformed(&format!("unknown source type '{other}'"))),
        };

        Ok(Self {
            mime: mime.trim().to_string(),
            payload,
        })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Bytes for this file. File-backed sources are read in full on every call.
    pub fn load(&self, bag: &PropertyBag) -> Result<Vec<u8>> {
        match &self.payload {
            Payload::Inline(bytes) => Ok(bytes.clone()),
            Payload::File(template) => {
                let path = PathBuf::from(template.resolve_to_string(bag)?);
                fs::read(&path).map_err(|source| Error::ImageSource { path, source })
            }
        }
    }
}

/// Keep error messages readable when an inline payload is large
fn truncate(descriptor: &str) -> String {
    const MAX: usize = 48;
    if descriptor.chars().count() <= MAX {
        descriptor.to_string()
    } else {
        let head: String = descriptor.chars().take(MAX).collect();
        format!("{head}...")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageAction {
    Set { mime: String, data: Vec<u8> },
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageChange {
    pub slot: String,
    pub action: ImageAction,
}

/// A conditional image rule. No source means the slot is removed.
#[derive(Debug, Clone)]
pub struct ImageRule {
    key: CondKey,
    source: Option<ImageSource>,
}

impl ImageRule {
    pub fn new(key: CondKey, source: Option<ImageSource>) -> Self {
        Self { key, source }
    }

    pub fn slot(&self) -> &str {
        self.key.key()
    }

    /// `Ok(None)` when the condition does not hold
    pub fn resolve(&self, bag: &PropertyBag) -> Result<Option<ImageChange>> {
        if !self.key.matches(bag)? {
            return Ok(None);
        }
        let action = match &self.source {
            None => ImageAction::Remove,
            Some(source) => ImageAction::Set {
                mime: source.mime().to_string(),
                data: source.load(bag)?,
            },
        };
        Ok(Some(ImageChange {
            slot: self.slot().to_string(),
            action,
        }))
    }
}

/// Result of running every image rule for one file
#[derive(Debug, Default)]
pub struct ImageEvaluation {
    pub changes: Vec<ImageChange>,
    /// Image rules that could not load their source; other rules still apply
    pub failures: Vec<Error>,
}

/// Evaluate image rules in declaration order.
///
/// Unreadable image files only drop their own rule. Any other error aborts.
pub fn evaluate_images(rules: &[ImageRule], bag: &PropertyBag) -> Result<ImageEvaluation> {
    let mut eval = ImageEvaluation::default();
    for rule in rules {
        match rule.resolve(bag) {
            Ok(Some(change)) => eval.changes.push(change),
            Ok(None) => log::info!("{}: condition not met, skipped", rule.slot()),
            Err(e) if e.is_image_source() => eval.failures.push(e),
            Err(e) => return Err(e),
        }
    }
    Ok(eval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn file(name: &str) -> PropertyBag {
        let mut bag = PropertyBag::new();
        bag.insert("file_name", name);
        bag
    }

    #[test]
    fn test_inline_payload_round_trip() {
        let descriptor = format!("data:image/png:{}", STANDARD.encode(PNG_HEADER));
        let source = ImageSource::parse(&descriptor).unwrap();
        assert_eq!(source.mime(), "image/png");
        assert_eq!(source.load(&PropertyBag::new()).unwrap(), PNG_HEADER);
    }

    #[test]
    fn test_file_payload_reads_resolved_path() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("01.png"), PNG_HEADER).unwrap();

        let descriptor = format!("file:image/png:{}/{{file_index:02d}}.png", dir.path().display());
        let source = ImageSource::parse(&descriptor).unwrap();
        let mut bag = PropertyBag::new();
        bag.insert("file_index", 1i64);
        assert_eq!(source.load(&bag).unwrap(), PNG_HEADER);
    }

    #[test]
    fn test_missing_file_reports_resolved_path() {
        let dir = TempDir::new().unwrap();
        let descriptor = format!("filename:image/jpeg:{}/{{file_name}}.jpg", dir.path().display());
        let source = ImageSource::parse(&descriptor).unwrap();

        let err = source.load(&file("track7")).unwrap_err();
        match err {
            Error::ImageSource { path, source } => {
                assert_eq!(path, dir.path().join("track7.jpg"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_descriptors() {
        let cases = [
            "image/png",
            "data:image/png",
            "data::AAAA",
            "data:image/png:not base64!",
            "http:image/png:x",
        ];
        for case in cases {
            assert!(
                matches!(ImageSource::parse(case), Err(Error::MalformedPayload { .. })),
                "{case} should be rejected"
            );
        }
    }

    #[test]
    fn test_path_may_contain_colons() {
        let source = ImageSource::parse("file:image/png:C:/covers/{file_name}.png").unwrap();
        let err = source.load(&file("x")).unwrap_err();
        assert!(matches!(err, Error::ImageSource { ref path, .. } if path == &PathBuf::from("C:/covers/x.png")));
    }

    #[test]
    fn test_rule_condition_and_removal() {
        let remove = ImageRule::new(CondKey::parse("back_cover|01").unwrap(), None);
        assert_eq!(remove.resolve(&file("02.mp3")).unwrap(), None);
        assert_eq!(
            remove.resolve(&file("01.mp3")).unwrap(),
            Some(ImageChange {
                slot: "back_cover".to_string(),
                action: ImageAction::Remove,
            })
        );
    }

    #[test]
    fn test_evaluate_keeps_going_after_unreadable_file() {
        let missing = ImageSource::parse("file:image/png:/nonexistent/cover.png").unwrap();
        let inline = ImageSource::parse(&format!("data:image/png:{}", STANDARD.encode(PNG_HEADER))).unwrap();
        let rules = vec![
            ImageRule::new(CondKey::parse("front_cover").unwrap(), Some(missing)),
            ImageRule::new(CondKey::parse("back_cover").unwrap(), Some(inline)),
        ];

        let eval = evaluate_images(&rules, &file("01.mp3")).unwrap();
        assert_eq!(eval.failures.len(), 1);
        assert_eq!(eval.changes.len(), 1);
        assert_eq!(eval.changes[0].slot, "back_cover");
    }

    #[test]
    fn test_evaluate_aborts_on_missing_property() {
        let rules = vec![ImageRule::new(CondKey::parse("front_cover|x|{artist}").unwrap(), None)];
        assert!(matches!(
            evaluate_images(&rules, &file("01.mp3")),
            Err(Error::ConditionEval { .. })
        ));
    }
}
