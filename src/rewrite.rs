//! Pattern-driven, in-place rewriting of a [`GrowableBuffer`].
//!
//! Each substitution searches the buffer from a running offset, splices the
//! replacement over the match and resumes right after the replacement text.
//! Because the offset is derived from what was written rather than from the
//! original match end, later matches line up whether the buffer grew or
//! shrank.
//!
//! Matching itself is delegated to [`regex::bytes::Regex`].
//!
//! ## Example
//!
//! ```
//! use odtext::GrowableBuffer;
//! use odtext::rewrite::{find_and_replace, Mode, Replacement};
//!
//! let mut buf = GrowableBuffer::from("a<tag>b</tag>c");
//! let count = find_and_replace(&mut buf, "<[^>]*>", Mode::All, &Replacement::literal("")).unwrap();
//! assert_eq!(count, 2);
//! assert_eq!(buf.as_bytes(), b"abc");
//! ```

use std::borrow::Cow;
use std::fmt;

use log::trace;
use regex::bytes::{CaptureLocations, Regex};

use crate::buffer::GrowableBuffer;
use crate::error::{Error, Result};
use crate::utf8;

/// How many matches a substitution rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Only the first match.
    Once,
    /// Every non-overlapping match.
    All,
}

/// A half-open byte range `[start, end)` within the buffer at match time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The bytes this span covers in `haystack`.
    pub fn slice<'a>(&self, haystack: &'a [u8]) -> &'a [u8] {
        &haystack[self.start..self.end]
    }
}

/// Spans of a single match: group 0 is the whole match, the rest are the
/// pattern's capture groups. Offsets are absolute positions in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpans {
    groups: Vec<Option<Span>>,
}

impl MatchSpans {
    fn from_locations(locs: &CaptureLocations) -> Self {
        let groups = (0..locs.len())
            .map(|i| locs.get(i).map(|(start, end)| Span { start, end }))
            .collect();
        Self { groups }
    }

    /// The span of the whole match.
    pub fn whole(&self) -> Span {
        self.groups
            .first()
            .copied()
            .flatten()
            .unwrap_or(Span { start: 0, end: 0 })
    }

    /// The span of capture group `i`, if it participated in the match.
    pub fn get(&self, i: usize) -> Option<Span> {
        self.groups.get(i).copied().flatten()
    }

    /// Number of groups including the whole match.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Computes the replacement for one match from the whole buffer, the match
/// spans and the offset the search started from.
pub type Transform = dyn Fn(&[u8], &MatchSpans, usize) -> Vec<u8>;

/// What a match is replaced with.
pub enum Replacement {
    /// A fixed byte string.
    Literal(Cow<'static, [u8]>),
    /// A freshly computed byte string per match.
    Transform(Box<Transform>),
}

impl Replacement {
    pub fn literal(text: impl Into<String>) -> Self {
        Replacement::Literal(Cow::Owned(text.into().into_bytes()))
    }

    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(&[u8], &MatchSpans, usize) -> Vec<u8> + 'static,
    {
        Replacement::Transform(Box::new(f))
    }

    fn produce<'a>(&'a self, haystack: &[u8], spans: &MatchSpans, offset: usize) -> Cow<'a, [u8]> {
        match self {
            Replacement::Literal(text) => Cow::Borrowed(text.as_ref()),
            Replacement::Transform(f) => Cow::Owned(f(haystack, spans, offset)),
        }
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacement::Literal(text) => f
                .debug_tuple("Literal")
                .field(&String::from_utf8_lossy(text))
                .finish(),
            Replacement::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// One step of a substitution battery.
#[derive(Debug)]
pub struct Rule {
    pub pattern: Cow<'static, str>,
    pub mode: Mode,
    pub replacement: Replacement,
}

impl Rule {
    pub fn new(pattern: impl Into<Cow<'static, str>>, mode: Mode, replacement: Replacement) -> Self {
        Self {
            pattern: pattern.into(),
            mode,
            replacement,
        }
    }

    /// Rewrite every match of `pattern` with a fixed string.
    pub fn all(pattern: impl Into<Cow<'static, str>>, replacement: &str) -> Self {
        Self::new(pattern, Mode::All, Replacement::literal(replacement))
    }

    /// Rewrite the first match of `pattern` with a fixed string.
    pub fn once(pattern: impl Into<Cow<'static, str>>, replacement: &str) -> Self {
        Self::new(pattern, Mode::Once, Replacement::literal(replacement))
    }

    /// Rewrite occurrences of the literal text `needle`.
    pub fn literal(needle: &str, mode: Mode, replacement: &str) -> Self {
        Self::new(regex::escape(needle), mode, Replacement::literal(replacement))
    }
}

/// A battery of rules whose patterns have all been compiled.
#[derive(Debug)]
pub struct Rewriter<'r> {
    steps: Vec<(Regex, &'r Rule)>,
}

impl<'r> Rewriter<'r> {
    /// Compile every rule's pattern. Fails on the first invalid pattern,
    /// before any buffer has been touched.
    pub fn new(rules: &'r [Rule]) -> Result<Self> {
        let steps = rules
            .iter()
            .map(|rule| compile(&rule.pattern).map(|regex| (regex, rule)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }

    /// Run the rules in order over `buf` and return the total number of
    /// replacements.
    pub fn apply(&self, buf: &mut GrowableBuffer) -> usize {
        self.steps
            .iter()
            .map(|(regex, rule)| {
                let count = replace_matches(buf, regex, rule.mode, &rule.replacement);
                trace!("{count} replacement(s) for /{}/", rule.pattern);
                count
            })
            .sum()
    }
}

/// Run an ordered list of rules over `buf`.
pub fn rewrite(buf: &mut GrowableBuffer, rules: &[Rule]) -> Result<usize> {
    Ok(Rewriter::new(rules)?.apply(buf))
}

/// Replace the first or every match of `pattern` in `buf`.
///
/// Returns the number of replacements performed.
///
/// # Errors
///
/// Returns [`Error::Pattern`] if `pattern` does not compile; the buffer is
/// left untouched in that case.
pub fn find_and_replace(
    buf: &mut GrowableBuffer,
    pattern: &str,
    mode: Mode,
    replacement: &Replacement,
) -> Result<usize> {
    let regex = compile(pattern)?;
    Ok(replace_matches(buf, &regex, mode, replacement))
}

/// Delete the first or every match of `pattern` from `buf`.
pub fn remove(buf: &mut GrowableBuffer, pattern: &str, mode: Mode) -> Result<usize> {
    find_and_replace(buf, pattern, mode, &Replacement::Literal(Cow::Borrowed(b"")))
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn replace_matches(
    buf: &mut GrowableBuffer,
    regex: &Regex,
    mode: Mode,
    replacement: &Replacement,
) -> usize {
    let mut locs = regex.capture_locations();
    let mut offset = 0;
    let mut count = 0;

    while offset <= buf.len() {
        let Some(found) = regex.captures_read_at(&mut locs, buf.as_bytes(), offset) else {
            break;
        };
        let spans = MatchSpans::from_locations(&locs);
        let span = Span {
            start: found.start(),
            end: found.end(),
        };

        let text = replacement.produce(buf.as_bytes(), &spans, offset);
        buf.splice(span.start, span.end, &text);
        count += 1;

        offset = span.start + text.len();
        if span.is_empty() {
            // Step over one whole character so an empty match cannot repeat.
            offset += buf
                .as_bytes()
                .get(offset)
                .map_or(1, |&lead| utf8::char_len(lead));
        }

        if mode == Mode::Once {
            break;
        }
    }

    count
}
