//! Shell-style wildcard matching.
//!
//! Patterns follow fnmatch rules rather than path-aware globbing:
//!
//! - `*` matches any run of characters, including `/`
//! - `?` matches exactly one character
//! - `[seq]` matches one character in `seq` (ranges like `a-z` allowed)
//! - `[!seq]` matches one character not in `seq`
//!
//! A `[` without a closing `]` is matched literally. Each pattern is
//! translated once into an anchored [`regex::Regex`].

use anyhow::{Context, Result};
use regex::Regex;

#[derive(Debug, Clone)]
pub struct WildcardPattern {
    regex: Regex,
}

impl WildcardPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&translate(pattern))
            .with_context(|| format!("Invalid resource pattern '{}'", pattern))?;
        Ok(Self { regex })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Ordered set of manifest patterns; a path qualifies if any pattern matches.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<WildcardPattern>,
}

impl PatternSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| WildcardPattern::new(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}

/// Translate an fnmatch pattern into regex syntax.
pub fn translate(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from(r"\A(?s:");
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                // consecutive stars collapse
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i..end]));
                    i = end + 1;
                }
                None => out.push_str(r"\["),
            },
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }

    out.push_str(r")\z");
    out
}

/// Index of the `]` closing a class whose body starts at `start`.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if j < chars.len() && chars[j] == '!' {
        j += 1;
    }
    // a leading ']' is a member, not the terminator
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    (j < chars.len()).then_some(j)
}

fn translate_class(body: &[char]) -> String {
    let (negated, members) = match body.first() {
        Some('!') => (true, &body[1..]),
        _ => (false, body),
    };

    let mut out = String::from(if negated { "[^" } else { "[" });
    for (idx, &c) in members.iter().enumerate() {
        let is_range = c == '-' && idx > 0 && idx + 1 < members.len();
        if is_range {
            out.push('-');
        } else {
            out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        }
    }
    out.push(']');
    out
}
