//! Property values and the per-file property bag.
//!
//! A `Value` is what templates read and what field rules hand to the tag store.
//! Its `Display` form mirrors how the values read in configuration: text is
//! bare, tuples are parenthesised with quoted text members, and null prints as
//! `None` so that a stringified tuple can be parsed back by the literal parser.

use std::collections::HashMap;
use std::fmt;

use super::dates::TagDate;

/// A single property value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Tuple(Vec<Value>),
    Date(TagDate),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Str(_) => "text",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Tuple(_) => "tuple",
            Value::Date(_) => "date",
            Value::Null => "null",
        }
    }

    /// Form used for tuple members: text is quoted, everything else as Display
    fn fmt_member(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => {
                let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
                write!(f, "{quote}")?;
                for c in s.chars() {
                    match c {
                        '\\' => write!(f, "\\\\")?,
                        c if c == quote => write!(f, "\\{c}")?,
                        c => write!(f, "{c}")?,
                    }
                }
                write!(f, "{quote}")
            }
            other => write!(f, "{other}"),
        }
    }
}

/// Shortest form, switching to a signed two-digit exponent outside
/// `1e-4 <= |x| < 1e16`; whole numbers keep a trailing `.0`
fn fmt_float(x: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let magnitude = x.abs();
    if !x.is_finite() {
        return write!(f, "{x}");
    }
    if x != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let raw = format!("{x:e}");
        let (mantissa, exp) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
        let exp: i32 = exp.parse().unwrap_or(0);
        let sign = if exp < 0 { '-' } else { '+' };
        return write!(f, "{mantissa}e{sign}{:02}", exp.abs());
    }
    if x.fract() == 0.0 {
        write!(f, "{x:.1}")
    } else {
        write!(f, "{x}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => fmt_float(*x, f),
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_member(f)?;
                }
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::Date(d) => write!(f, "{d}"),
            Value::Null => write!(f, "None"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Snapshot of named values for one file.
///
/// Built once per processed file and only read afterwards; the single
/// exception is the title override applied while the bag is being built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    values: HashMap<String, Value>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Raw lookup, returns explicit nulls as well
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Lookup that treats an explicit null the same as an absent property
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    /// Names in sorted order, for stable listings
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = PropertyBag::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::Int(-4).to_string(), "-4");
        assert_eq!(Value::Float(10.0).to_string(), "10.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Float(1e20).to_string(), "1e+20");
        assert_eq!(Value::Float(-1.5e16).to_string(), "-1.5e+16");
        assert_eq!(Value::Float(1.5e-7).to_string(), "1.5e-07");
        assert_eq!(Value::Float(0.0001).to_string(), "0.0001");
        assert_eq!(Value::Float(0.0).to_string(), "0.0");
        assert_eq!(Value::Null.to_string(), "None");
    }

    #[test]
    fn test_display_tuple() {
        let t = Value::Tuple(vec![Value::Int(3), Value::Int(12)]);
        assert_eq!(t.to_string(), "(3, 12)");

        let t = Value::Tuple(vec![Value::Int(3), Value::Null]);
        assert_eq!(t.to_string(), "(3, None)");

        let t = Value::Tuple(vec![Value::from("it's"), Value::from("x")]);
        assert_eq!(t.to_string(), "(\"it's\", 'x')");

        let t = Value::Tuple(vec![Value::Int(1)]);
        assert_eq!(t.to_string(), "(1,)");
    }

    #[test]
    fn test_lookup_treats_null_as_missing() {
        let mut bag = PropertyBag::new();
        bag.insert("none", Value::Null);
        bag.insert("title", "Mustang");

        assert!(bag.get("none").is_some());
        assert!(bag.lookup("none").is_none());
        assert_eq!(bag.lookup("title"), Some(&Value::from("Mustang")));
        assert!(bag.lookup("missing").is_none());
    }

    #[test]
    fn test_from_iter_and_names() {
        let bag: PropertyBag = [("b", Value::Int(1)), ("a", Value::Int(2))].into_iter().collect();
        assert_eq!(bag.names(), vec!["a", "b"]);
    }
}
