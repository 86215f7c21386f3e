//! `TagStore` backed by lofty.
//!
//! Opens a file once, edits its primary tag in memory and writes the tag back
//! on `save`. Files without a primary tag get one, seeded from any other tag
//! the file carries (an ID3v1 tag on an MP3, for example).

use std::path::{Path, PathBuf};

use lofty::{
    Accessor, AudioFile, ItemKey, MimeType, Picture, PictureType, Probe, Tag, TagExt, TagType,
    TaggedFile, TaggedFileExt,
};

use super::store::{StoreError, TagStore};
use crate::rules::{TagDate, Value};

/// Every field this store understands, in listing order
pub const FIELDS: &[&str] = &[
    "title",
    "artist",
    "album",
    "album_artist",
    "composer",
    "genre",
    "comment",
    "publisher",
    "copyright",
    "encoded_by",
    "bpm",
    "track_num",
    "disc_num",
    "recording_date",
    "release_date",
    "original_release_date",
];

/// Image slot names accepted by `set_image` and `remove_image`, matched ignoring case
pub const IMAGE_SLOTS: &[&str] = &[
    "other",
    "icon",
    "other_icon",
    "front_cover",
    "cover_front",
    "back_cover",
    "cover_back",
    "leaflet",
    "media",
    "lead_artist",
    "artist",
    "conductor",
    "band",
    "composer",
    "lyricist",
    "recording_location",
    "during_recording",
    "during_performance",
    "screen_capture",
    "bright_colored_fish",
    "bright_coloured_fish",
    "illustration",
    "band_logo",
    "publisher_logo",
];

/// Plain text fields and the item each one maps to
fn text_key(field: &str) -> Option<ItemKey> {
    match field {
        "title" => Some(ItemKey::TrackTitle),
        "artist" => Some(ItemKey::TrackArtist),
        "album" => Some(ItemKey::AlbumTitle),
        "album_artist" => Some(ItemKey::AlbumArtist),
        "composer" => Some(ItemKey::Composer),
        "genre" => Some(ItemKey::Genre),
        "comment" => Some(ItemKey::Comment),
        "publisher" => Some(ItemKey::Label),
        "copyright" => Some(ItemKey::CopyrightMessage),
        "encoded_by" => Some(ItemKey::EncodedBy),
        "bpm" => Some(ItemKey::Bpm),
        _ => None,
    }
}

fn date_key(field: &str) -> Option<ItemKey> {
    match field {
        "recording_date" => Some(ItemKey::RecordingDate),
        "release_date" => Some(ItemKey::ReleaseDate),
        "original_release_date" => Some(ItemKey::OriginalReleaseDate),
        _ => None,
    }
}

/// Map an image slot name to a picture type, ignoring case
pub fn picture_type(slot: &str) -> Option<PictureType> {
    let pic_type = match slot.to_ascii_lowercase().as_str() {
        "other" => PictureType::Other,
        "icon" => PictureType::Icon,
        "other_icon" => PictureType::OtherIcon,
        "front_cover" | "cover_front" => PictureType::CoverFront,
        "back_cover" | "cover_back" => PictureType::CoverBack,
        "leaflet" => PictureType::Leaflet,
        "media" => PictureType::Media,
        "lead_artist" => PictureType::LeadArtist,
        "artist" => PictureType::Artist,
        "conductor" => PictureType::Conductor,
        "band" => PictureType::Band,
        "composer" => PictureType::Composer,
        "lyricist" => PictureType::Lyricist,
        "recording_location" => PictureType::RecordingLocation,
        "during_recording" => PictureType::DuringRecording,
        "during_performance" => PictureType::DuringPerformance,
        "screen_capture" => PictureType::ScreenCapture,
        "bright_colored_fish" | "bright_coloured_fish" => PictureType::BrightFish,
        "illustration" => PictureType::Illustration,
        "band_logo" => PictureType::BandLogo,
        "publisher_logo" => PictureType::PublisherLogo,
        _ => return None,
    };
    Some(pic_type)
}

/// Parse stored text as a number where it looks like one
fn numeric_or_text(s: &str) -> Value {
    if let Ok(i) = s.trim().parse::<i64>() {
        Value::Int(i)
    } else if let Ok(x) = s.trim().parse::<f64>() {
        Value::Float(x)
    } else {
        Value::Str(s.to_string())
    }
}

fn number_pair(n: Option<u32>, total: Option<u32>) -> Option<Value> {
    if n.is_none() && total.is_none() {
        return None;
    }
    let member = |v: Option<u32>| v.map_or(Value::Null, |v| Value::Int(i64::from(v)));
    Some(Value::Tuple(vec![member(n), member(total)]))
}

fn mismatch(field: &str, value: &Value) -> StoreError {
    StoreError::TypeMismatch {
        field: field.to_string(),
        kind: value.kind(),
        value: value.to_string(),
    }
}

/// Read a tuple member or bare number as an optional count
fn as_count(field: &str, value: &Value) -> Result<Option<u32>, StoreError> {
    match value {
        Value::Null => Ok(None),
        Value::Int(i) => u32::try_from(*i).map(Some).map_err(|_| mismatch(field, value)),
        Value::Str(s) => s.trim().parse::<u32>().map(Some).map_err(|_| mismatch(field, value)),
        _ => Err(mismatch(field, value)),
    }
}

pub struct LoftyStore {
    path: PathBuf,
    file: TaggedFile,
    /// Tag types present on disk when the file was opened
    found: Vec<TagType>,
}

impl LoftyStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        // Read the file
        let mut tagged_file = Probe::open(path)
            .map_err(|e| StoreError::Io(format!("Failed to open file: {}", e)))?
            .read()
            .map_err(|e| StoreError::Io(format!("Failed to read file: {}", e)))?;

        let found: Vec<TagType> = tagged_file.tags().iter().map(|t| t.tag_type()).collect();

        if tagged_file.primary_tag().is_none() {
            let tag_type = tagged_file.primary_tag_type();
            let mut tag = tagged_file
                .first_tag()
                .cloned()
                .unwrap_or_else(|| Tag::new(tag_type));
            tag.re_map(tag_type);
            tagged_file.insert_tag(tag);
            log::debug!("Created {:?} tag for {}", tag_type, path.display());
        }

        Ok(Self {
            path: path.to_path_buf(),
            file: tagged_file,
            found,
        })
    }

    /// Tag types the file carried before it was opened
    pub fn found_tags(&self) -> &[TagType] {
        &self.found
    }

    /// Whether the file on disk carries an ID3v1 tag
    pub fn has_id3v1(&self) -> bool {
        self.file.contains_tag_type(TagType::Id3v1)
    }

    pub fn strip_id3v1(&self) -> Result<(), StoreError> {
        TagType::Id3v1
            .remove_from_path(&self.path)
            .map_err(|e| StoreError::Io(format!("Failed to remove ID3v1 tag: {}", e)))
    }

    fn tag(&self) -> Option<&Tag> {
        self.file.primary_tag()
    }

    fn tag_mut(&mut self) -> Result<&mut Tag, StoreError> {
        self.file
            .primary_tag_mut()
            .ok_or_else(|| StoreError::Io("Failed to create tag".to_string()))
    }

    fn set_text(&mut self, field: &str, key: ItemKey, value: &Value) -> Result<(), StoreError> {
        let text = match value {
            Value::Null => {
                self.tag_mut()?.remove_key(&key);
                return Ok(());
            }
            Value::Tuple(_) => return Err(mismatch(field, value)),
            other => other.to_string(),
        };
        if self.tag_mut()?.insert_text(key, text) {
            Ok(())
        } else {
            Err(StoreError::Unsupported(field.to_string()))
        }
    }

    fn set_pair(&mut self, field: &str, value: &Value) -> Result<(), StoreError> {
        let (n, total) = match value {
            Value::Tuple(items) => match items.as_slice() {
                [n] => (as_count(field, n)?, None),
                [n, total] => (as_count(field, n)?, Some(as_count(field, total)?)),
                _ => return Err(mismatch(field, value)),
            },
            Value::Null => (None, Some(None)),
            single => (as_count(field, single)?, None),
        };

        let tag = self.tag_mut()?;
        if field == "track_num" {
            match n {
                Some(n) => tag.set_track(n),
                None => tag.remove_track(),
            }
            match total {
                Some(Some(t)) => tag.set_track_total(t),
                Some(None) => tag.remove_track_total(),
                None => {}
            }
        } else {
            match n {
                Some(n) => tag.set_disk(n),
                None => tag.remove_disk(),
            }
            match total {
                Some(Some(t)) => tag.set_disk_total(t),
                Some(None) => tag.remove_disk_total(),
                None => {}
            }
        }
        Ok(())
    }

    fn set_date(&mut self, field: &str, key: ItemKey, value: &Value) -> Result<(), StoreError> {
        match value {
            Value::Date(_) | Value::Null => self.set_text(field, key, value),
            Value::Str(s) if TagDate::parse(s).is_some() => self.set_text(field, key, value),
            _ => Err(mismatch(field, value)),
        }
    }
}

impl TagStore for LoftyStore {
    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn get(&self, name: &str) -> Option<Value> {
        let tag = self.tag()?;
        match name {
            "track_num" => number_pair(tag.track(), tag.track_total()),
            "disc_num" => number_pair(tag.disk(), tag.disk_total()),
            "bpm" => tag.get_string(&ItemKey::Bpm).map(numeric_or_text),
            _ => {
                if let Some(key) = date_key(name) {
                    let s = tag.get_string(&key)?;
                    return Some(TagDate::parse(s).map_or_else(|| Value::from(s), Value::Date));
                }
                tag.get_string(&text_key(name)?).map(Value::from)
            }
        }
    }

    fn set(&mut self, name: &str, value: &Value) -> Result<(), StoreError> {
        if matches!(name, "track_num" | "disc_num") {
            return self.set_pair(name, value);
        }
        if let Some(key) = date_key(name) {
            return self.set_date(name, key, value);
        }
        match text_key(name) {
            Some(key) => self.set_text(name, key, value),
            None => Err(StoreError::UnknownField(name.to_string())),
        }
    }

    fn set_image(&mut self, slot: &str, mime: &str, data: &[u8]) -> Result<(), StoreError> {
        let pic_type = picture_type(slot).ok_or_else(|| StoreError::UnknownImageSlot(slot.to_string()))?;
        let mime_type = Some(MimeType::from_str(mime));
        let picture = Picture::new_unchecked(pic_type, mime_type, None, data.to_vec());

        let tag = self.tag_mut()?;
        tag.remove_picture_type(pic_type);
        tag.push_picture(picture);
        Ok(())
    }

    fn remove_image(&mut self, slot: &str) -> Result<(), StoreError> {
        let pic_type = picture_type(slot).ok_or_else(|| StoreError::UnknownImageSlot(slot.to_string()))?;
        self.tag_mut()?.remove_picture_type(pic_type);
        Ok(())
    }

    fn save(&mut self) -> Result<(), StoreError> {
        let tag = self
            .tag()
            .ok_or_else(|| StoreError::Io("No tag to save".to_string()))?;

        // Save the file
        tag.save_to_path(&self.path)
            .map_err(|e| StoreError::Io(format!("Failed to save file: {}", e)))?;

        Ok(())
    }

    fn strip_legacy_tags(&mut self) -> Result<bool, StoreError> {
        if !self.has_id3v1() {
            return Ok(false);
        }
        self.strip_id3v1()?;
        self.file.remove(TagType::Id3v1);
        Ok(true)
    }
}
