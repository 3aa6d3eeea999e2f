//! Codec for the ninth GFF column.
//!
//! The attribute block is an ordered list of `key=value` pairs joined by
//! `;`. Values may be multi-valued: each value is escaped on its own, then
//! the values are joined with a literal comma. Escaping percent-encodes
//! `%`, `;`, `=`, `,` and whitespace control characters, so free text such
//! as marker descriptions and synonyms cannot corrupt the block.

use nom::{
    bytes::complete::{is_not, tag},
    combinator::opt,
    multi::separated_list0,
    sequence::{separated_pair, terminated},
    IResult,
};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AttributeError {
    #[error("malformed attribute block near '{0}'")]
    Malformed(String),
    #[error("attribute with empty key")]
    EmptyKey,
}

/// Ordered attribute block; field order is preserved exactly as pushed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pairs: Vec<(String, Vec<String>)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single-valued attribute
    pub fn push(&mut self, key: &str, value: &str) {
        self.pairs.push((key.to_string(), vec![value.to_string()]));
    }

    /// Append a multi-valued attribute
    pub fn push_multi(&mut self, key: &str, values: Vec<String>) {
        self.pairs.push((key.to_string(), values));
    }

    /// First value of a key, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.first())
            .map(String::as_str)
    }

    /// All values of a key, if present
    pub fn values(&self, key: &str) -> Option<&[String]> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialize to the column-nine wire form
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, values)| {
                let joined = values
                    .iter()
                    .map(|v| escape(v))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{}={}", k, joined)
            })
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Parse a column-nine block, un-escaping values
    pub fn decode(input: &str) -> Result<Self, AttributeError> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == "." {
            return Ok(Self::default());
        }
        let (rest, raw_pairs) =
            block(trimmed).map_err(|_| AttributeError::Malformed(truncate(trimmed)))?;
        if !rest.is_empty() {
            return Err(AttributeError::Malformed(truncate(rest)));
        }

        let mut pairs = Vec::with_capacity(raw_pairs.len());
        for (key, value) in raw_pairs {
            let key = key.trim();
            if key.is_empty() {
                return Err(AttributeError::EmptyKey);
            }
            let values = value
                .unwrap_or("")
                .split(',')
                .map(unescape)
                .collect::<Vec<_>>();
            pairs.push((key.to_string(), values));
        }
        Ok(Self { pairs })
    }
}

fn pair(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    separated_pair(is_not("=;"), tag("="), opt(is_not(";")))(input)
}

fn block(input: &str) -> IResult<&str, Vec<(&str, Option<&str>)>> {
    terminated(separated_list0(tag(";"), pair), opt(tag(";")))(input)
}

fn truncate(s: &str) -> String {
    s.chars().take(40).collect()
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            ';' => out.push_str("%3B"),
            '=' => out.push_str("%3D"),
            ',' => out.push_str("%2C"),
            '\t' => out.push_str("%09"),
            '\n' => out.push_str("%0A"),
            '\r' => out.push_str("%0D"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    // A stray malformed % sequence can only come from already-broken input;
    // fall back to the raw text rather than dropping the value.
    String::from_utf8(out).unwrap_or_else(|_| s.to_string())
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
