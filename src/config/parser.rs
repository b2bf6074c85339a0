// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/config/parser.rs
//!
//! INI keymap file parser
//!
//! Parses the sectioned `key = value` format keymaps are stored in:
//! ```ini
//! [EDITOR]
//! save = CTRL+S
//! copy = CTRL+C/CTRL+INSERT
//! ```
//! - `[name]` opens a section
//! - `key = value` or `key: value` adds an entry to the current section
//! - lines starting with `#` or `;` are comments
//!
//! Keys and values are trimmed. Repeated sections are merged and a repeated
//! key keeps its last value.
//!
//! The parser uses nom combinators per line and never interprets values;
//! key strings are validated later by the registry.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::{map, rest},
    sequence::{delimited, separated_pair},
    IResult, Parser,
};
use thiserror::Error;

use crate::config::KeymapDocument;

/// Parse errors with line number context
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ParseError {
    #[error("Parse error on line {line}: {message}")]
    InvalidSyntax { line: usize, message: String },

    #[error("Entry outside of any section on line {line}")]
    MissingSection { line: usize },
}

/// Parse a complete keymap file
///
/// # Example
/// ```
/// use accel_keymap::config::parser::parse_document;
///
/// let doc = parse_document("[MAIN]\nsave = CTRL+S\n")?;
/// assert_eq!(doc.get("main", "SAVE"), Some("CTRL+S"));
/// # Ok::<(), accel_keymap::config::parser::ParseError>(())
/// ```
pub fn parse_document(content: &str) -> Result<KeymapDocument, ParseError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut document = KeymapDocument::new();
    let mut current: Option<String> = None;

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if trimmed.starts_with('[') {
            match parse_section_header(trimmed) {
                Ok((remaining, name)) if remaining.trim().is_empty() && !name.is_empty() => {
                    document.section_mut(name);
                    current = Some(name.to_string());
                }
                _ => {
                    return Err(ParseError::InvalidSyntax {
                        line: line_num,
                        message: format!("malformed section header '{}'", trimmed),
                    });
                }
            }
            continue;
        }

        let Some(section) = current.as_deref() else {
            return Err(ParseError::MissingSection { line: line_num });
        };

        match parse_assignment(trimmed) {
            Ok((_, (key, value))) if !key.is_empty() => document.set(section, key, value),
            _ => {
                return Err(ParseError::InvalidSyntax {
                    line: line_num,
                    message: format!("expected 'key = value', found '{}'", trimmed),
                });
            }
        }
    }

    Ok(document)
}

/// Parse `[name]`, returning the trimmed name
pub fn parse_section_header(input: &str) -> IResult<&str, &str> {
    map(
        delimited(char('['), take_while1(|c: char| c != ']'), char(']')),
        str::trim,
    )
    .parse(input)
}

/// Parse `key = value` (or `key: value`), returning both sides trimmed
///
/// The value is everything after the first separator, so it may itself
/// contain `=` or `:`.
pub fn parse_assignment(input: &str) -> IResult<&str, (&str, &str)> {
    map(
        separated_pair(
            take_while1(|c: char| c != '=' && c != ':'),
            alt((char('='), char(':'))),
            rest,
        ),
        |(key, value): (&str, &str)| (key.trim(), value.trim()),
    )
    .parse(input)
}

/// Render a document back to INI text
pub fn write_document(document: &KeymapDocument) -> String {
    let mut out = String::new();

    for (index, section) in document.sections().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push('[');
        out.push_str(section.name());
        out.push_str("]\n");

        for (key, value) in section.iter() {
            out.push_str(key);
            out.push_str(" = ");
            out.push_str(value);
            out.push('\n');
        }
    }

    out
}
