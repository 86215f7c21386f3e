//! String templates with `{name}` / `{name:spec}` placeholders.

use super::error::{Error, Result};
use super::format_spec::FormatSpec;
use super::value::{PropertyBag, Value};

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Placeholder { name: String, spec: FormatSpec },
}

#[derive(Debug, Clone, PartialEq)]
enum Source {
    Pattern(Vec<Segment>),
    /// Non-text value configured directly; resolves to itself
    Literal(Value),
}

/// A parsed template.
///
/// Placeholders are the non-nested spans between a `{` and the next `}`. A
/// `{` with no closing brace is ordinary text. The name ends at the first `:`
/// and the rest of the span is the format spec.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: Source,
}

impl Template {
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = pattern;

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|i| open + i) else {
                break;
            };
            if open > 0 {
                segments.push(Segment::Text(rest[..open].to_string()));
            }
            let inner = &rest[open + 1..close];
            let (name, spec) = inner.split_once(':').unwrap_or((inner, ""));
            segments.push(Segment::Placeholder {
                name: name.to_string(),
                spec: FormatSpec::parse(spec)?,
            });
            rest = &rest[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self {
            source: Source::Pattern(segments),
        })
    }

    pub fn literal(value: Value) -> Self {
        Self {
            source: Source::Literal(value),
        }
    }

    /// Resolve against `bag`.
    ///
    /// A pattern that is exactly one placeholder without a spec yields the
    /// property's own value so tuples, numbers and dates keep their type.
    /// Every other pattern yields text. Referencing an absent or null
    /// property is an error.
    pub fn resolve(&self, bag: &PropertyBag) -> Result<Value> {
        let segments = match &self.source {
            Source::Literal(value) => return Ok(value.clone()),
            Source::Pattern(segments) => segments,
        };

        if let [Segment::Placeholder { name, spec }] = segments.as_slice() {
            if spec.is_empty() {
                return lookup(bag, name).cloned();
            }
        }

        let mut out = String::new();
        for segment in segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder { name, spec } => {
                    let value = lookup(bag, name)?;
                    out.push_str(&spec.apply(name, value)?);
                }
            }
        }
        Ok(Value::Str(out))
    }

    /// Resolve and render as text regardless of the resolved type
    pub fn resolve_to_string(&self, bag: &PropertyBag) -> Result<String> {
        self.resolve(bag).map(|v| v.to_string())
    }
}

fn lookup<'a>(bag: &'a PropertyBag, name: &str) -> Result<&'a Value> {
    bag.lookup(name).ok_or_else(|| Error::MissingProperty {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag() -> PropertyBag {
        let mut bag = PropertyBag::new();
        bag.insert("index", 10i64);
        bag.insert("title", "Mustang");
        bag.insert("track_num", Value::Tuple(vec![Value::Int(3), Value::Int(12)]));
        bag.insert("none", Value::Null);
        bag
    }

    #[test]
    fn test_formatted_interpolation() {
        let t = Template::parse("index is {index:03d} - with {title}").unwrap();
        assert_eq!(t.resolve(&bag()).unwrap(), Value::from("index is 010 - with Mustang"));
    }

    #[test]
    fn test_no_placeholders_is_passthrough() {
        let t = Template::parse("title").unwrap();
        assert_eq!(t.resolve(&PropertyBag::new()).unwrap(), Value::from("title"));

        let t = Template::parse("").unwrap();
        assert_eq!(t.resolve(&bag()).unwrap(), Value::from(""));

        let t = Template::parse("open { brace").unwrap();
        assert_eq!(t.resolve(&bag()).unwrap(), Value::from("open { brace"));
    }

    #[test]
    fn test_bare_placeholder_keeps_type() {
        let tuple = Value::Tuple(vec![Value::Int(3), Value::Int(12)]);

        let t = Template::parse("{track_num}").unwrap();
        assert_eq!(t.resolve(&bag()).unwrap(), tuple);

        let t = Template::parse("n={track_num}").unwrap();
        assert_eq!(t.resolve(&bag()).unwrap(), Value::from("n=(3, 12)"));

        let t = Template::parse("{index}").unwrap();
        assert_eq!(t.resolve(&bag()).unwrap(), Value::Int(10));

        let t = Template::parse("{index:d}").unwrap();
        assert_eq!(t.resolve(&bag()).unwrap(), Value::from("10"));
    }

    #[test]
    fn test_missing_and_null_properties() {
        let t = Template::parse("{artist} - {title}").unwrap();
        let err = t.resolve(&bag()).unwrap_err();
        assert!(matches!(err, Error::MissingProperty { ref name } if name == "artist"));

        let t = Template::parse("{none}").unwrap();
        assert!(matches!(t.resolve(&bag()), Err(Error::MissingProperty { .. })));
    }

    #[test]
    fn test_literal_values_resolve_to_themselves() {
        let t = Template::literal(Value::Int(7));
        assert_eq!(t.resolve(&PropertyBag::new()).unwrap(), Value::Int(7));

        let t = Template::literal(Value::Null);
        assert_eq!(t.resolve(&PropertyBag::new()).unwrap(), Value::Null);
    }

    #[test]
    fn test_bad_format_spec_fails_at_parse() {
        assert!(matches!(
            Template::parse("{index:zz}"),
            Err(Error::InvalidFormatSpec { .. })
        ));
    }
}
