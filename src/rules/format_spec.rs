//! Per-placeholder format specs: `[[fill]align][sign][#][0][width][.precision][type]`.
//!
//! Supported types are `s` for text, `d x X o b` for integers and
//! `f F e E %` for numbers. With no type, integers print as `d`, floats as `f`
//! when a precision is given, and everything else as its plain display form.

use super::error::{Error, Result};
use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    /// Pad between the sign and the digits
    AfterSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Minus,
    Plus,
    Space,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormatSpec {
    raw: String,
    fill: char,
    align: Option<Align>,
    sign: Sign,
    alternate: bool,
    width: Option<usize>,
    precision: Option<usize>,
    ty: Option<char>,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            raw: String::new(),
            fill: ' ',
            align: None,
            sign: Sign::Minus,
            alternate: false,
            width: None,
            precision: None,
            ty: None,
        }
    }
}

fn align_of(c: char) -> Option<Align> {
    match c {
        '<' => Some(Align::Left),
        '>' => Some(Align::Right),
        '^' => Some(Align::Center),
        '=' => Some(Align::AfterSign),
        _ => None,
    }
}

/// Largest width or precision a spec may ask for
const MAX_COUNT: usize = u16::MAX as usize;

fn take_number(chars: &[char], pos: &mut usize) -> std::result::Result<Option<usize>, String> {
    let start = *pos;
    while *pos < chars.len() && chars[*pos].is_ascii_digit() {
        *pos += 1;
    }
    if *pos == start {
        return Ok(None);
    }
    let digits: String = chars[start..*pos].iter().collect();
    match digits.parse::<usize>() {
        Ok(n) if n <= MAX_COUNT => Ok(Some(n)),
        _ => Err(format!("{digits} exceeds the limit of {MAX_COUNT}")),
    }
}

impl FormatSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidFormatSpec {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let chars: Vec<char> = spec.chars().collect();
        let mut out = FormatSpec {
            raw: spec.to_string(),
            ..Default::default()
        };
        let mut pos = 0;

        if chars.len() >= 2 && align_of(chars[1]).is_some() {
            out.fill = chars[0];
            out.align = align_of(chars[1]);
            pos = 2;
        } else if let Some(align) = chars.first().and_then(|c| align_of(*c)) {
            out.align = Some(align);
            pos = 1;
        }

        match chars.get(pos) {
            Some('+') => {
                out.sign = Sign::Plus;
                pos += 1;
            }
            Some('-') => pos += 1,
            Some(' ') => {
                out.sign = Sign::Space;
                pos += 1;
            }
            _ => {}
        }

        if chars.get(pos) == Some(&'#') {
            out.alternate = true;
            pos += 1;
        }

        if chars.get(pos) == Some(&'0') {
            if out.align.is_none() {
                out.fill = '0';
                out.align = Some(Align::AfterSign);
            }
            pos += 1;
        }

        out.width = take_number(&chars, &mut pos).map_err(|r| invalid(&r))?;

        if chars.get(pos) == Some(&'.') {
            pos += 1;
            out.precision = take_number(&chars, &mut pos).map_err(|r| invalid(&r))?;
            if out.precision.is_none() {
                return Err(invalid("missing precision after '.'"));
            }
        }

        if let Some(&c) = chars.get(pos) {
            if !"sdxXobfFeE%".contains(c) {
                return Err(invalid(&format!("unsupported type '{c}'")));
            }
            out.ty = Some(c);
            pos += 1;
        }

        if pos != chars.len() {
            return Err(invalid("unexpected trailing characters"));
        }
        if out.precision.is_some() && matches!(out.ty, Some('d' | 'x' | 'X' | 'o' | 'b')) {
            return Err(invalid("precision not allowed for integer types"));
        }

        Ok(out)
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Format `value`; `name` is only used for error reporting
    pub fn apply(&self, name: &str, value: &Value) -> Result<String> {
        let mismatch = || Error::Format {
            name: name.to_string(),
            kind: value.kind(),
            spec: self.raw.clone(),
        };

        if self.is_empty() {
            return Ok(value.to_string());
        }

        match (value, self.ty) {
            (Value::Str(s), None | Some('s')) => {
                if self.sign != Sign::Minus || self.align == Some(Align::AfterSign) {
                    return Err(mismatch());
                }
                let body: String = match self.precision {
                    Some(p) => s.chars().take(p).collect(),
                    None => s.clone(),
                };
                Ok(self.pad("", &body, Align::Left))
            }
            (Value::Int(i), None | Some('d' | 'x' | 'X' | 'o' | 'b')) => {
                let digits = self.integer_digits(i.unsigned_abs());
                Ok(self.pad(self.sign_prefix(*i < 0), &digits, Align::Right))
            }
            (Value::Int(i), Some('f' | 'F' | 'e' | 'E' | '%')) => Ok(self.float(*i as f64)),
            (Value::Float(x), None | Some('f' | 'F' | 'e' | 'E' | '%')) => {
                if self.ty.is_none() && self.precision.is_none() {
                    let body = Value::Float(x.abs()).to_string();
                    return Ok(self.pad(self.sign_prefix(x.is_sign_negative()), &body, Align::Right));
                }
                Ok(self.float(*x))
            }
            _ => Err(mismatch()),
        }
    }

    fn integer_digits(&self, n: u64) -> String {
        match self.ty {
            Some('x') => format!("{}{n:x}", if self.alternate { "0x" } else { "" }),
            Some('X') => format!("{}{n:X}", if self.alternate { "0X" } else { "" }),
            Some('o') => format!("{}{n:o}", if self.alternate { "0o" } else { "" }),
            Some('b') => format!("{}{n:b}", if self.alternate { "0b" } else { "" }),
            _ => n.to_string(),
        }
    }

    fn float(&self, x: f64) -> String {
        let precision = self.precision.unwrap_or(6);
        let magnitude = x.abs();
        let body = match self.ty {
            Some('e') => exponent_form(magnitude, precision, 'e'),
            Some('E') => exponent_form(magnitude, precision, 'E'),
            Some('%') => format!("{:.*}%", precision, magnitude * 100.0),
            _ => format!("{magnitude:.precision$}"),
        };
        self.pad(self.sign_prefix(x.is_sign_negative()), &body, Align::Right)
    }

    fn sign_prefix(&self, negative: bool) -> &'static str {
        match (negative, self.sign) {
            (true, _) => "-",
            (false, Sign::Plus) => "+",
            (false, Sign::Space) => " ",
            (false, Sign::Minus) => "",
        }
    }

    fn pad(&self, sign: &str, body: &str, default_align: Align) -> String {
        let len = sign.chars().count() + body.chars().count();
        let width = self.width.unwrap_or(0);
        if len >= width {
            return format!("{sign}{body}");
        }
        let fill = self.fill.to_string().repeat(width - len);
        match self.align.unwrap_or(default_align) {
            Align::Left => format!("{sign}{body}{fill}"),
            Align::Right => format!("{fill}{sign}{body}"),
            Align::AfterSign => format!("{sign}{fill}{body}"),
            Align::Center => {
                let n = width - len;
                let left = self.fill.to_string().repeat(n / 2);
                let right = self.fill.to_string().repeat(n - n / 2);
                format!("{left}{sign}{body}{right}")
            }
        }
    }
}

/// `1.5e3` style with a signed, at least two digit exponent
fn exponent_form(x: f64, precision: usize, marker: char) -> String {
    let raw = format!("{x:.precision$e}");
    let (mantissa, exp) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}{marker}{sign}{:02}", exp.abs())
}
