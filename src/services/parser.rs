use std::fmt::Debug;
use std::iter::Peekable;
use std::str::Chars;

use crate::catalog::TableIdentifier;
use crate::error::Result;
use crate::value_err;

/// The session's SQL front end, only the identifier surface is needed here.
pub trait SqlParser: Debug + Send + Sync {
    /// Parses `table` or `database.table`, parts may be back-quoted.
    fn parse_table_identifier(&self, name: &str) -> Result<TableIdentifier>;

    /// Parses a dotted multipart identifier.
    fn parse_multipart_identifier(&self, name: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Default)]
pub struct DefaultParser {}

impl DefaultParser {
    pub fn new() -> Self {
        Self {}
    }
}

impl SqlParser for DefaultParser {
    fn parse_table_identifier(&self, name: &str) -> Result<TableIdentifier> {
        let mut parts = self.parse_multipart_identifier(name)?;
        match parts.len() {
            1 => Ok(TableIdentifier::new(parts.remove(0))),
            2 => {
                let table = parts.remove(1);
                Ok(TableIdentifier::qualified(parts.remove(0), table))
            }
            n => Err(value_err!("Expect at most 2 identifier parts, got {}: {}", n, name)),
        }
    }

    fn parse_multipart_identifier(&self, name: &str) -> Result<Vec<String>> {
        let mut chars = name.trim().chars().peekable();
        let mut parts = vec![];
        loop {
            parts.push(next_part(&mut chars, name)?);
            match chars.next() {
                None => return Ok(parts),
                Some('.') => continue,
                Some(c) => return Err(value_err!("Unexpected '{}' in identifier {}", c, name)),
            }
        }
    }
}

fn next_part(chars: &mut Peekable<Chars<'_>>, name: &str) -> Result<String> {
    let mut part = String::new();
    if chars.peek() == Some(&'`') {
        chars.next();
        loop {
            match chars.next() {
                // a doubled back-quote is an escaped one
                Some('`') if chars.peek() == Some(&'`') => {
                    chars.next();
                    part.push('`');
                }
                Some('`') => break,
                Some(c) => part.push(c),
                None => return Err(value_err!("Unterminated quoted identifier in {}", name)),
            }
        }
        if part.is_empty() {
            return Err(value_err!("Empty identifier in {}", name));
        }
        return Ok(part);
    }
    while let Some(&c) = chars.peek() {
        if !(c.is_alphanumeric() || c == '_') {
            break;
        }
        part.push(c);
        chars.next();
    }
    if part.is_empty() {
        return Err(value_err!("Expect identifier in {}", name));
    }
    Ok(part)
}
