//! Reference scanning and substitution
//!
//! Finds variable references inside a string value:
//! - `$$` - escaped sigil, substitutes a literal `$`
//! - `${VAR:-default}` - braced reference with default text
//! - `${VAR}` - braced reference
//! - `$VAR` - plain reference, the name runs until the first character
//!   outside `[A-Z0-9_]`
//!
//! Names match `[A-Z_][A-Z0-9_]*`. Anything else after a `$`, including
//! lowercase or mixed-case names and unclosed braces, is copied through as
//! literal text.

use std::borrow::Cow;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::{CaptureMatches, Regex};

use crate::environment::Environment;
use crate::error::{Error, Result};

// Alternation order is match priority at each `$`.
static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\$(?:(?P<escaped>\$)|\{(?P<braced>[A-Z_][A-Z0-9_]*)(?::-(?P<default>[^}]*))?\}|(?P<plain>[A-Z_][A-Z0-9_]*))",
    )
    .expect("reference pattern is valid")
});

/// What kind of reference was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind<'a> {
    /// `$$`
    Escaped,
    /// `$NAME`
    Plain { name: &'a str },
    /// `${NAME}`
    Braced { name: &'a str },
    /// `${NAME:-default}`
    BracedWithDefault { name: &'a str, default: &'a str },
}

/// A reference found in a string, with the byte span it occupies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
    pub kind: ReferenceKind<'a>,
    pub span: Range<usize>,
}

impl<'a> Reference<'a> {
    /// The variable name, `None` for an escaped sigil
    pub fn name(&self) -> Option<&'a str> {
        match self.kind {
            ReferenceKind::Escaped => None,
            ReferenceKind::Plain { name }
            | ReferenceKind::Braced { name }
            | ReferenceKind::BracedWithDefault { name, .. } => Some(name),
        }
    }

    /// The default text, only present for `${NAME:-default}`
    pub fn default_text(&self) -> Option<&'a str> {
        match self.kind {
            ReferenceKind::BracedWithDefault { default, .. } => Some(default),
            _ => None,
        }
    }
}

/// Lazy left-to-right iterator over the references in a string
pub struct References<'a> {
    input: &'a str,
    inner: CaptureMatches<'static, 'a>,
}

impl<'a> Iterator for References<'a> {
    type Item = Reference<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let caps = self.inner.next()?;
            let span = caps.get(0)?.range();

            // `$Mixed` is not a reference to `M`
            if caps.name("plain").is_some() && starts_with_lowercase(&self.input[span.end..]) {
                continue;
            }

            return Some(Reference {
                kind: reference_kind(&caps)?,
                span,
            });
        }
    }
}

fn starts_with_lowercase(rest: &str) -> bool {
    rest.bytes().next().is_some_and(|b| b.is_ascii_lowercase())
}

fn reference_kind<'a>(caps: &regex::Captures<'a>) -> Option<ReferenceKind<'a>> {
    if caps.name("escaped").is_some() {
        return Some(ReferenceKind::Escaped);
    }

    if let Some(name) = caps.name("braced") {
        let name = name.as_str();
        return Some(match caps.name("default") {
            Some(default) => ReferenceKind::BracedWithDefault {
                name,
                default: default.as_str(),
            },
            None => ReferenceKind::Braced { name },
        });
    }

    caps.name("plain").map(|name| ReferenceKind::Plain {
        name: name.as_str(),
    })
}

/// Scan a string for references
pub fn scan(input: &str) -> References<'_> {
    let re: &'static Regex = &REFERENCE_RE;
    References {
        input,
        inner: re.captures_iter(input),
    }
}

/// Check if a string contains any reference, escaped sigils included
pub fn contains_reference(input: &str) -> bool {
    scan(input).next().is_some()
}

/// Names of the variables referenced in a string, in order of appearance
pub fn referenced_names(input: &str) -> Vec<&str> {
    scan(input).filter_map(|r| r.name()).collect()
}

/// Resolve one reference to its replacement text
///
/// A set, non-empty variable wins; otherwise the default text is used
/// verbatim (even when empty); otherwise the reference is an error under
/// `fail_on_missing` and the empty string without it.
pub fn resolve<'a>(
    reference: &Reference<'a>,
    env: &dyn Environment,
    fail_on_missing: bool,
) -> Result<Cow<'a, str>> {
    let name = match reference.name() {
        Some(name) => name,
        None => return Ok(Cow::Borrowed("$")),
    };

    if let Some(value) = env.lookup(name).filter(|v| !v.is_empty()) {
        log::trace!("${} resolved from environment", name);
        return Ok(Cow::Owned(value));
    }

    if let Some(default) = reference.default_text() {
        log::trace!("${} resolved from default", name);
        return Ok(Cow::Borrowed(default));
    }

    if fail_on_missing {
        return Err(Error::missing_variable(name, None));
    }

    log::trace!("${} unset, substituting empty string", name);
    Ok(Cow::Borrowed(""))
}

/// Substitute every reference in `input`
///
/// Returns `None` when the string contains no reference at all, so callers
/// can leave such strings untouched.
pub fn substitute(
    input: &str,
    env: &dyn Environment,
    fail_on_missing: bool,
) -> Result<Option<String>> {
    let mut references = scan(input).peekable();
    if references.peek().is_none() {
        return Ok(None);
    }

    let mut output = String::with_capacity(input.len());
    let mut last = 0;

    for reference in references {
        output.push_str(&input[last..reference.span.start]);
        output.push_str(&resolve(&reference, env, fail_on_missing)?);
        last = reference.span.end;
    }
    output.push_str(&input[last..]);

    Ok(Some(output))
}
