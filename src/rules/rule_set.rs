//! Field rules and the coercions applied before values reach the tag store.

use super::cond_key::CondKey;
use super::dates::to_date;
use super::error::Result;
use super::literal::parse_literal;
use super::template::Template;
use super::value::{PropertyBag, Value};

#[derive(Debug, Clone)]
pub struct FieldRule {
    key: CondKey,
    template: Template,
}

impl FieldRule {
    pub fn new(key: CondKey, template: Template) -> Self {
        Self { key, template }
    }

    pub fn field(&self) -> &str {
        self.key.key()
    }

    pub fn template(&self) -> &Template {
        &self.template
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub value: Value,
}

/// Field rules in declaration order
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<FieldRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: FieldRule) {
        self.rules.push(rule);
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Compute the value of every applicable rule against one snapshot.
    ///
    /// Rules whose condition does not hold are logged and left out. The first
    /// error stops evaluation so that nothing is written for a half-resolved file.
    pub fn evaluate(&self, bag: &PropertyBag) -> Result<Vec<FieldChange>> {
        let mut changes = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            if !rule.key.matches(bag)? {
                log::info!("{}: condition not met, skipped", rule.field());
                continue;
            }
            let resolved = rule.template().resolve(bag)?;
            changes.push(FieldChange {
                field: rule.field().to_string(),
                value: coerce(rule.field(), resolved)?,
            });
        }
        Ok(changes)
    }
}

/// Type coercion for a resolved value.
///
/// Date-named fields always go through date parsing. Otherwise text that
/// contains `(` is read as a literal tuple when it is one.
pub fn coerce(field: &str, value: Value) -> Result<Value> {
    if field.contains("date") {
        return to_date(value);
    }
    match value {
        Value::Str(ref s) if s.contains('(') => match parse_literal(s) {
            Some(parsed) => Ok(parsed),
            None => {
                log::debug!("{field}: '{s}' is not a literal tuple, keeping text");
                Ok(value)
            }
        },
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Error;

    fn rule(key: &str, template: &str) -> FieldRule {
        FieldRule::new(CondKey::parse(key).unwrap(), Template::parse(template).unwrap())
    }

    fn bag() -> PropertyBag {
        let mut bag = PropertyBag::new();
        bag.insert("file_name", "03 - Song.mp3");
        bag.insert("file_index", 3i64);
        bag.insert("title", "Song");
        bag
    }

    #[test]
    fn test_evaluate_in_declaration_order() {
        let mut set = RuleSet::new();
        set.push(rule("title", "{file_index:02d}. {title}"));
        set.push(rule("album", "Best Of"));

        let changes = set.evaluate(&bag()).unwrap();
        assert_eq!(
            changes,
            vec![
                FieldChange {
                    field: "title".to_string(),
                    value: Value::from("03. Song"),
                },
                FieldChange {
                    field: "album".to_string(),
                    value: Value::from("Best Of"),
                },
            ]
        );
    }

    #[test]
    fn test_condition_mismatch_skips_field() {
        let mut set = RuleSet::new();
        set.push(rule("genre|01", "Intro"));
        set.push(rule("genre|03", "Song"));

        let changes = set.evaluate(&bag()).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].value, Value::from("Song"));
    }

    #[test]
    fn test_tuple_text_becomes_tuple() {
        let mut set = RuleSet::new();
        set.push(rule("track_num", "({file_index}, 12)"));

        let changes = set.evaluate(&bag()).unwrap();
        assert_eq!(changes[0].value, Value::Tuple(vec![Value::Int(3), Value::Int(12)]));
    }

    #[test]
    fn test_text_with_paren_that_is_not_a_tuple_is_kept() {
        let value = coerce("title", Value::from("Song (Live)")).unwrap();
        assert_eq!(value, Value::from("Song (Live)"));
    }

    #[test]
    fn test_date_fields_always_parse_as_dates() {
        let value = coerce("recording_date", Value::from("2001-02-03")).unwrap();
        assert!(matches!(value, Value::Date(_)));
        assert_eq!(value.to_string(), "2001-02-03");

        // the tuple heuristic never applies to date fields
        let err = coerce("release_date", Value::from("(2001, 2)")).unwrap_err();
        assert!(matches!(err, Error::InvalidDate { .. }));
    }

    #[test]
    fn test_missing_property_aborts_evaluation() {
        let mut set = RuleSet::new();
        set.push(rule("title", "{title}"));
        set.push(rule("artist", "{artist}"));

        assert!(matches!(set.evaluate(&bag()), Err(Error::MissingProperty { .. })));
    }

    #[test]
    fn test_literal_template_passes_through() {
        let mut set = RuleSet::new();
        set.push(FieldRule::new(CondKey::parse("bpm").unwrap(), Template::literal(Value::Int(120))));
        set.push(FieldRule::new(CondKey::parse("comment").unwrap(), Template::literal(Value::Null)));

        let changes = set.evaluate(&PropertyBag::new()).unwrap();
        assert_eq!(changes[0].value, Value::Int(120));
        assert_eq!(changes[1].value, Value::Null);
    }
}
