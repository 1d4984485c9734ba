//! Pipeline description parser
//!
//! Grammar (component identifiers are case-insensitive):
//!
//! ```text
//! pipeline := segment (">" segment)*
//! segment  := identifier ["(" arg ("," arg)* ")"]
//! arg      := quoted-string | bare-token
//! ```
//!
//! Quoted arguments (`'...'` or `"..."`) have their quotes stripped and
//! may contain commas; bare tokens are trimmed of surrounding
//! whitespace. Empty parenthesis groups yield no arguments.

use std::fmt;

use crate::{PipelineError, Result};

/// One parsed builder-chain entry: a component kind plus its
/// constructor arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    /// Case-folded component identifier
    pub kind: String,

    /// Ordered constructor arguments, quotes stripped
    pub args: Vec<String>,
}

impl StageSpec {
    /// Create a spec from a kind and arguments
    pub fn new(kind: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            kind: kind.into().to_ascii_lowercase(),
            args,
        }
    }
}

impl fmt::Display for StageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)?;
        if !self.args.is_empty() {
            write!(f, "(")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                f.write_str(&quote_arg(arg))?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Quote an argument if re-parsing would otherwise mangle it
fn quote_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg != arg.trim()
        || arg.contains([',', '(', ')', '>'])
        || arg.starts_with(['\'', '"']);
    if !needs_quotes {
        return arg.to_string();
    }
    if arg.contains('\'') {
        format!("\"{}\"", arg)
    } else {
        format!("'{}'", arg)
    }
}

/// Re-serialize a builder chain to its textual form
pub fn format_chain(entries: &[StageSpec]) -> String {
    entries
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Parse a pipeline description into a builder chain
///
/// Fails with [`PipelineError::Config`] if any segment does not match
/// the grammar. Identifier resolution against a registry happens in
/// the factory, not here.
pub fn parse(description: &str) -> Result<Vec<StageSpec>> {
    if description.trim().is_empty() {
        return Err(PipelineError::config("empty pipeline description"));
    }

    description
        .split('>')
        .map(|segment| parse_segment(segment.trim()))
        .collect()
}

fn parse_segment(segment: &str) -> Result<StageSpec> {
    if segment.is_empty() {
        return Err(PipelineError::config("empty pipeline segment"));
    }

    let (name, args) = match segment.find('(') {
        None => (segment, Vec::new()),
        Some(open) => {
            if !segment.ends_with(')') {
                return Err(PipelineError::config(format!(
                    "unterminated argument list in segment '{}'",
                    segment
                )));
            }
            let inner = &segment[open + 1..segment.len() - 1];
            (&segment[..open], split_args(inner)?)
        }
    };

    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(PipelineError::config(format!(
            "invalid component identifier in segment '{}'",
            segment
        )));
    }

    Ok(StageSpec::new(name, args))
}

/// Split a parenthesized argument list on commas, honoring quotes
///
/// An empty group yields no arguments, not a single empty string.
fn split_args(inner: &str) -> Result<Vec<String>> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in inner.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    current.push(c);
                }
                ',' => {
                    args.push(finish_arg(&current)?);
                    current.clear();
                }
                _ => current.push(c),
            },
        }
    }

    if quote.is_some() {
        return Err(PipelineError::config(format!(
            "unterminated quote in argument list '{}'",
            inner
        )));
    }
    args.push(finish_arg(&current)?);
    Ok(args)
}

/// Strip quotes from a quoted argument, trim a bare one
fn finish_arg(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open @ ('\'' | '"')), Some(close)) if open == close && trimmed.len() >= 2 => {
            Ok(trimmed[1..trimmed.len() - 1].to_string())
        }
        (Some('\'' | '"'), _) => Err(PipelineError::config(format!(
            "mismatched quotes in argument '{}'",
            trimmed
        ))),
        _ => Ok(trimmed.to_string()),
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod parser_test;
