//! Display formatting for evaluation outcomes
//!
//! Errors are condensed when they carry a Python traceback; successful values
//! are optionally colorized. Formatting never hides a result: if highlighting
//! fails the raw value is returned.

use crate::nrepl::Outcome;
use crossterm::style::Stylize;
use regex::Regex;
use std::fmt::{self, Write};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::warn;

/// Substrings that mark a traceback line worth keeping
const TRACEBACK_KEEP: [&str; 6] = ["File ", "Error:", "Exception:", "message:", "line ", "phase:"];

static TOKEN_RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("invalid token pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("write failed: {0}")]
    Format(#[from] fmt::Error),
}

/// Render an outcome for display
pub fn render(outcome: &Outcome, highlight_values: bool) -> String {
    match outcome {
        Outcome::Value(value) if highlight_values => match highlight(value) {
            Ok(colored) => colored,
            Err(e) => {
                warn!("Could not format result: {}", e);
                value.clone()
            }
        },
        Outcome::Value(value) => value.clone(),
        _ => condense_traceback(&outcome.to_string()),
    }
}

/// Keep only the informative lines of a traceback. Other messages pass through.
pub fn condense_traceback(message: &str) -> String {
    if !message.contains("Traceback") {
        return message.to_string();
    }

    message
        .lines()
        .filter(|line| TRACEBACK_KEEP.iter().any(|keep| line.contains(keep)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn token_regex() -> Result<&'static Regex, HighlightError> {
    TOKEN_RE
        .get_or_init(|| {
            Regex::new(
                r#"(?s)(?P<string>"(?:[^"\\]|\\.)*")|(?P<comment>;[^\n]*)|(?P<keyword>::?[^\s()\[\]{}",;]+)|(?P<number>-?\d+(?:\.\d+)?)|(?P<literal>\b(?:nil|true|false)\b)|(?P<symbol>[^\s()\[\]{}",;:\d][^\s()\[\]{}",;]*)"#,
            )
        })
        .as_ref()
        .map_err(|e| HighlightError::Pattern(e.clone()))
}

/// Colorize Lisp-like text with ANSI escapes
pub fn highlight(text: &str) -> Result<String, HighlightError> {
    let re = token_regex()?;
    let mut out = String::with_capacity(text.len() * 2);
    let mut last = 0;

    for caps in re.captures_iter(text) {
        let Some(token) = caps.get(0) else { continue };
        out.push_str(&text[last..token.start()]);
        let s = token.as_str();

        if caps.name("string").is_some() {
            write!(out, "{}", s.green())?;
        } else if caps.name("comment").is_some() {
            write!(out, "{}", s.dark_grey())?;
        } else if caps.name("keyword").is_some() {
            write!(out, "{}", s.magenta())?;
        } else if caps.name("number").is_some() {
            write!(out, "{}", s.cyan())?;
        } else if caps.name("literal").is_some() {
            write!(out, "{}", s.yellow())?;
        } else {
            out.push_str(s);
        }

        last = token.end();
    }

    out.push_str(&text[last..]);
    Ok(out)
}
