//! Literal tuple parser.
//!
//! Turns text such as `(3, 12)` or `('a', (1, 2.5), None)` into a `Value`.
//! Only numbers, quoted strings, `None`, parentheses and commas are accepted;
//! anything else makes the whole input "not a literal".

use super::value::Value;

/// Parse `input` as a literal expression, returning `None` if it is not one.
///
/// A top-level comma list is a tuple, as is any parenthesised list with a
/// comma; `(5)` is just `5`.
pub fn parse_literal(input: &str) -> Option<Value> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
    };
    let value = parser.sequence()?;
    parser.skip_ws();
    if parser.pos != parser.chars.len() {
        return None;
    }
    Some(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// `expr (',' expr)* [',']`, stopping before `)` or end of input
    fn sequence(&mut self) -> Option<Value> {
        let first = self.expr()?;
        if !self.eat(',') {
            return Some(first);
        }
        let mut items = vec![first];
        loop {
            self.skip_ws();
            if matches!(self.peek(), None | Some(')')) {
                break;
            }
            items.push(self.expr()?);
            if !self.eat(',') {
                break;
            }
        }
        Some(Value::Tuple(items))
    }

    fn expr(&mut self) -> Option<Value> {
        self.skip_ws();
        match self.peek()? {
            '(' => {
                self.pos += 1;
                if self.eat(')') {
                    return Some(Value::Tuple(Vec::new()));
                }
                let inner = self.sequence()?;
                if !self.eat(')') {
                    return None;
                }
                Some(inner)
            }
            '\'' | '"' => self.string(),
            'N' => self.keyword("None", Value::Null),
            c if c.is_ascii_digit() || matches!(c, '+' | '-' | '.') => self.number(),
            _ => None,
        }
    }

    fn keyword(&mut self, word: &str, value: Value) -> Option<Value> {
        let end = self.pos + word.chars().count();
        if end > self.chars.len() {
            return None;
        }
        let found: String = self.chars[self.pos..end].iter().collect();
        if found != word {
            return None;
        }
        if self.chars.get(end).is_some_and(|c| c.is_alphanumeric() || *c == '_') {
            return None;
        }
        self.pos = end;
        Some(value)
    }

    fn string(&mut self) -> Option<Value> {
        let quote = self.peek()?;
        self.pos += 1;
        let mut out = String::new();
        loop {
            let c = self.peek()?;
            self.pos += 1;
            match c {
                '\\' => {
                    let escaped = self.peek()?;
                    self.pos += 1;
                    out.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                }
                c if c == quote => return Some(Value::Str(out)),
                c => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Option<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some('+' | '-')) {
            self.pos += 1;
        }
        let mut is_float = false;
        let mut digits = 0;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                digits += usize::from(c != '_');
            } else if c == '.' && !is_float {
                is_float = true;
            } else {
                break;
            }
            self.pos += 1;
        }
        if digits == 0 {
            return None;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(), Some('+' | '-')) {
                self.pos += 1;
            }
            let exp_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
            if self.pos == exp_start {
                return None;
            }
        }
        let text: String = self.chars[start..self.pos].iter().filter(|c| **c != '_').collect();
        if is_float {
            text.parse::<f64>().ok().map(Value::Float)
        } else {
            text.parse::<i64>().ok().map(Value::Int)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_of_integers() {
        assert_eq!(
            parse_literal("(3, 12)"),
            Some(Value::Tuple(vec![Value::Int(3), Value::Int(12)]))
        );
        assert_eq!(
            parse_literal("  ( 3 ,12 , )  "),
            Some(Value::Tuple(vec![Value::Int(3), Value::Int(12)]))
        );
    }

    #[test]
    fn test_mixed_and_nested() {
        let parsed = parse_literal("('a\\'b', (1, -2.5), None)").unwrap();
        assert_eq!(
            parsed,
            Value::Tuple(vec![
                Value::from("a'b"),
                Value::Tuple(vec![Value::Int(1), Value::Float(-2.5)]),
                Value::Null,
            ])
        );
    }

    #[test]
    fn test_parenthesised_scalar_is_not_a_tuple() {
        assert_eq!(parse_literal("(5)"), Some(Value::Int(5)));
        assert_eq!(parse_literal("(5,)"), Some(Value::Tuple(vec![Value::Int(5)])));
        assert_eq!(parse_literal("()"), Some(Value::Tuple(vec![])));
    }

    #[test]
    fn test_top_level_comma_list() {
        assert_eq!(
            parse_literal("1, (2)"),
            Some(Value::Tuple(vec![Value::Int(1), Value::Int(2)]))
        );
    }

    #[test]
    fn test_display_form_parses_back() {
        let original = Value::Tuple(vec![Value::Int(4), Value::Null, Value::from("x\"y")]);
        assert_eq!(parse_literal(&original.to_string()), Some(original));
    }

    #[test]
    fn test_rejects_non_literals() {
        assert_eq!(parse_literal("Song (Live)"), None);
        assert_eq!(parse_literal("(1, 2"), None);
        assert_eq!(parse_literal("(1, 2))"), None);
        assert_eq!(parse_literal("__import__('os')"), None);
        assert_eq!(parse_literal("(Nonesuch)"), None);
        assert_eq!(parse_literal("('open"), None);
        assert_eq!(parse_literal("(-)"), None);
    }
}
