//! Literal coercion for rendered action parameters
//!
//! Parameters are plain text once templates are rendered. Values that carry
//! structural markers (`[` or `{`) are parsed as Python-style literals; if that
//! fails the raw text is kept.

use serde_json::{Map, Number, Value};
use tracing::debug;

const STRUCTURAL_MARKERS: [char; 2] = ['[', '{'];

/// Instruction produced from one `name:value` token
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeInstruction {
    Set { name: String, value: Value },
    Remove(String),
}

pub fn has_structural_markers(text: &str) -> bool {
    text.contains(STRUCTURAL_MARKERS)
}

/// Split a rendered `name:value` list into instructions
///
/// Tokens are separated by `,`. When the text contains structural markers a
/// `|` separator takes precedence if present; otherwise commas inside brackets
/// or quotes do not split. Each token is split once on the first `:`. Values
/// `none`/`false` (any case) become removals; empty values are dropped.
pub fn parse_custom_attributes(rendered: &str) -> Vec<AttributeInstruction> {
    let tokens: Vec<&str> = if has_structural_markers(rendered) {
        if rendered.contains('|') {
            rendered.split('|').collect()
        } else {
            split_top_level(rendered, ',')
        }
    } else {
        rendered.split(',').collect()
    };

    let mut instructions = Vec::new();
    for token in tokens {
        if token.trim().is_empty() {
            continue;
        }
        let Some((name, raw)) = token.split_once(':') else {
            debug!("Cant split '{}', no ':' separator", token.trim());
            continue;
        };

        let name = name.trim();
        let raw = raw.trim();
        if name.is_empty() || raw.is_empty() {
            continue;
        }

        let value = coerce(raw);
        if is_removal(&value) {
            instructions.push(AttributeInstruction::Remove(name.to_string()));
        } else {
            instructions.push(AttributeInstruction::Set {
                name: name.to_string(),
                value,
            });
        }
    }
    instructions
}

/// Coerce one value: literal parsing when structural, canonical numbers, else text
pub fn coerce(raw: &str) -> Value {
    if has_structural_markers(raw) {
        return match parse_literal(raw) {
            Some(value) => value,
            None => {
                debug!("Could not parse literal '{}', keeping text", raw);
                Value::String(raw.to_string())
            }
        };
    }

    if let Ok(int) = raw.parse::<i64>() {
        if int.to_string() == raw {
            return Value::from(int);
        }
    }
    if let Ok(float) = raw.parse::<f64>() {
        if let Some(number) = Number::from_f64(float) {
            if float.to_string() == raw {
                return Value::Number(number);
            }
        }
    }
    Value::String(raw.to_string())
}

fn is_removal(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => matches!(s.to_lowercase().as_str(), "none" | "false"),
        _ => false,
    }
}

/// Split on `separator` outside brackets and quotes
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                '[' | '{' | '(' => depth += 1,
                ']' | '}' | ')' => depth = depth.saturating_sub(1),
                c if c == separator && depth == 0 => {
                    parts.push(&text[start..idx]);
                    start = idx + c.len_utf8();
                }
                _ => {}
            },
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Parse a Python-style literal (lists, tuples, dicts, strings, numbers,
/// `None`/`True`/`False`). Returns `None` unless the whole input is consumed.
pub fn parse_literal(text: &str) -> Option<Value> {
    let mut parser = LiteralParser {
        chars: text.chars().collect(),
        pos: 0,
    };
    let value = parser.value()?;
    parser.skip_whitespace();
    if parser.pos == parser.chars.len() {
        Some(value)
    } else {
        None
    }
}

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
}

impl LiteralParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn value(&mut self) -> Option<Value> {
        self.skip_whitespace();
        match self.peek()? {
            '[' => self.sequence('[', ']'),
            '(' => self.sequence('(', ')'),
            '{' => self.dict(),
            '\'' | '"' => self.string().map(Value::String),
            c if c == '-' || c == '+' || c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() => self.keyword(),
            _ => None,
        }
    }

    fn sequence(&mut self, open: char, close: char) -> Option<Value> {
        self.eat(open);
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Some(Value::Array(items));
            }
            items.push(self.value()?);
            if !self.eat(',') {
                return self.eat(close).then_some(Value::Array(items));
            }
        }
    }

    fn dict(&mut self) -> Option<Value> {
        self.eat('{');
        let mut map = Map::new();
        loop {
            if self.eat('}') {
                return Some(Value::Object(map));
            }
            let key = match self.value()? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            if !self.eat(':') {
                return None;
            }
            let value = self.value()?;
            map.insert(key, value);
            if !self.eat(',') {
                return self.eat('}').then_some(Value::Object(map));
            }
        }
    }

    fn string(&mut self) -> Option<String> {
        let quote = self.peek()?;
        self.pos += 1;
        let mut out = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '\\' => {
                    let escaped = self.peek()?;
                    self.pos += 1;
                    out.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                }
                c if c == quote => return Some(out),
                c => out.push(c),
            }
        }
        None
    }

    fn number(&mut self) -> Option<Value> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E' | '_'))
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();

        if let Ok(int) = text.parse::<i64>() {
            return Some(Value::from(int));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
    }

    fn keyword(&mut self) -> Option<Value> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "None" => Some(Value::Null),
            "True" => Some(Value::Bool(true)),
            "False" => Some(Value::Bool(false)),
            _ => None,
        }
    }
}
