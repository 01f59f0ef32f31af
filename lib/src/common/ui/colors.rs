//! # Terminal Colors
//!
//! File: lib/src/common/ui/colors.rs
//!
//! ## Overview
//!
//! Tiny helpers for colored terminal output: `Colored` wraps a piece of text
//! and hands it back surrounded by ANSI escape codes, and `Header` builds the
//! `=====` banner lines printed between pipeline stages.
//!
//! ## Usage
//!
//! ```rust
//! use pipeline_utils::common::ui::colors::{Colored, Header};
//!
//! println!("{}", Colored::new("PASS").green());
//! println!("{}", Header::new("Alignment ").red());
//! assert_eq!(Colored::new("plain").to_string(), "plain");
//! ```
//!
use std::fmt;
use std::ops::Deref;

/// ANSI escape code for green foreground text.
const GREEN: &str = "\x1b[32m";
/// ANSI escape code for red foreground text.
const RED: &str = "\x1b[31m";
/// ANSI escape code for yellow foreground text.
const YELLOW: &str = "\x1b[33m";
/// ANSI escape code for cyan foreground text.
const CYAN: &str = "\x1b[36m";
/// ANSI escape code resetting all attributes.
const RESET_ALL: &str = "\x1b[0m";

/// Default banner width used by `Header::new`.
pub const DEFAULT_HEADER_WIDTH: usize = 120;
/// Default banner fill character used by `Header::new`.
pub const DEFAULT_HEADER_SYMBOL: char = '=';

/// Text that can be rendered in color. `Display` prints it uncolored.
#[derive(Clone, PartialEq, Eq)]
pub struct Colored {
    text: String,
}

impl Colored {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn paint(&self, color: &str) -> String {
        format!("{}{}{}", color, self.text, RESET_ALL)
    }

    pub fn green(&self) -> String {
        self.paint(GREEN)
    }

    pub fn red(&self) -> String {
        self.paint(RED)
    }

    pub fn yellow(&self) -> String {
        self.paint(YELLOW)
    }

    pub fn cyan(&self) -> String {
        self.paint(CYAN)
    }
}

impl fmt::Display for Colored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for Colored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Colored({:?})", self.text)
    }
}

/// A banner line: the title left-aligned and padded with a fill symbol.
///
/// Derefs to `Colored`, so `Header::new("QC").green()` works.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Header {
    inner: Colored,
}

impl Header {
    /// `text` padded with `=` to 120 columns.
    pub fn new(text: &str) -> Self {
        Self::with_style(text, DEFAULT_HEADER_WIDTH, DEFAULT_HEADER_SYMBOL)
    }

    /// `text` padded with `symbol` to `width` columns. Longer text is kept as is.
    pub fn with_style(text: &str, width: usize, symbol: char) -> Self {
        let padding = width.saturating_sub(text.chars().count());
        let mut line = String::with_capacity(text.len() + padding * symbol.len_utf8());
        line.push_str(text);
        line.extend(std::iter::repeat(symbol).take(padding));
        Self {
            inner: Colored::new(line),
        }
    }
}

impl Deref for Header {
    type Target = Colored;

    fn deref(&self) -> &Colored {
        &self.inner
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}
