use regex::Regex;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::config::ScanConfig;
use crate::identifier::{Identifier, IsbnKind};

/// Optional "ISBN", "ISBN-13:", "isbn 10" label followed by a maximal run of
/// digits and separators ending in a digit or X. Separators cover ASCII and
/// Unicode hyphens/dashes, the soft hyphen, periods, carets and any
/// whitespace.
static ISBN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\bisbn(?:[\s\-]*1[03]\b)?[\s:.#]*)?(?P<run>[\s0-9.\^\-\u{00AD}\u{2010}-\u{2015}]{9,}[0-9x])",
    )
    .expect("ISBN pattern compiles")
});

static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^<]*</style>").expect("style pattern compiles"));

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("markup pattern compiles"));

/// Remove `<style>` blocks and replace every other tag with `!`.
///
/// The replacement character is not a separator, so a tag between two
/// numbers keeps them apart instead of gluing them into one run.
pub fn strip_markup(text: &str) -> Cow<'_, str> {
    if !text.contains('<') {
        return Cow::Borrowed(text);
    }
    let without_style = STYLE_BLOCK.replace_all(text, "");
    Cow::Owned(MARKUP_TAG.replace_all(&without_style, "!").into_owned())
}

/// An unvalidated pattern match.
struct Candidate<'a> {
    /// Whole match, label included.
    span: &'a str,
    /// Digits and separators only.
    run: &'a str,
}

fn candidates(text: &str) -> impl Iterator<Item = Candidate<'_>> {
    ISBN_PATTERN.captures_iter(text).filter_map(|caps| {
        Some(Candidate {
            span: caps.get(0)?.as_str().trim(),
            run: caps.name("run")?.as_str().trim(),
        })
    })
}

#[derive(Debug, Default)]
struct ScanState {
    found13: Option<Identifier>,
    found10: Option<Identifier>,
}

/// Finds the best ISBN across one or more chunks of document text.
///
/// The first valid ISBN-13 and the first valid ISBN-10 are kept; later
/// matches of the same kind never replace them. One scanner serves one
/// document and is dropped once its result has been read.
#[derive(Debug)]
pub struct IdentifierScanner {
    valid_prefixes: BTreeSet<String>,
    state: ScanState,
}

impl IdentifierScanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            valid_prefixes: config.prefix_set(),
            state: ScanState::default(),
        }
    }

    /// Scan a chunk of text front to back.
    pub fn feed(&mut self, text: &str) {
        let text = strip_markup(text);
        for candidate in candidates(&text) {
            for id in self.identifiers_in(&candidate) {
                self.record(id);
            }
        }
    }

    /// Scan a chunk of text back to front, so the match nearest the end of
    /// the chunk is considered first. Used for back matter.
    pub fn feed_reversed(&mut self, text: &str) {
        let text = strip_markup(text);
        let found: Vec<Identifier> = candidates(&text)
            .flat_map(|candidate| self.identifiers_in(&candidate))
            .collect();
        for id in found.into_iter().rev() {
            self.record(id);
        }
    }

    /// True once an ISBN-13 has been found. Callers use this to skip
    /// further extraction.
    pub fn has_identifier(&self) -> bool {
        self.state.found13.is_some()
    }

    /// ISBN-13 if one was found, else ISBN-10, else `None`.
    pub fn result(&self) -> Option<&Identifier> {
        self.state
            .found13
            .as_ref()
            .or(self.state.found10.as_ref())
    }

    pub fn into_result(self) -> Option<Identifier> {
        self.state.found13.or(self.state.found10)
    }

    /// Valid identifiers in one candidate, in text order.
    ///
    /// The run is usually a single number. When it is not, it may hold
    /// several numbers ("2018 0-306-40615-2", two ISBNs on consecutive
    /// lines). Each line is then tried on its own, and within a line that
    /// fails, each whitespace-free token. Tokens are never joined, so
    /// unrelated numbers in a table row cannot add up to an ISBN.
    fn identifiers_in(&self, candidate: &Candidate<'_>) -> Vec<Identifier> {
        if let Some(id) = self.accept(candidate.run) {
            return vec![id.with_raw_span(candidate.span)];
        }

        let lines: Vec<&str> = candidate
            .run
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let mut found = Vec::new();
        for &line in &lines {
            if lines.len() > 1 {
                if let Some(id) = self.accept(line) {
                    found.push(id);
                    continue;
                }
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() > 1 {
                found.extend(tokens.into_iter().filter_map(|token| self.accept(token)));
            }
        }

        if found.is_empty() {
            debug!(candidate = candidate.span, "invalid ISBN match");
        }
        found
    }

    /// Whether the identifier passes the prefix policy. ISBN-10s always do.
    pub fn accepts(&self, id: &Identifier) -> bool {
        match id.prefix() {
            Some(prefix) => self.valid_prefixes.contains(prefix),
            None => true,
        }
    }

    fn accept(&self, raw: &str) -> Option<Identifier> {
        let id = Identifier::validate(raw)?;
        if !self.accepts(&id) {
            debug!(isbn = %id, "ISBN-13 with unknown prefix");
            return None;
        }
        Some(id)
    }

    fn record(&mut self, id: Identifier) {
        let slot = match id.kind() {
            IsbnKind::Isbn13 => &mut self.state.found13,
            IsbnKind::Isbn10 => &mut self.state.found10,
        };
        if slot.is_none() {
            info!(isbn = %id, kind = %id.kind(), "valid ISBN");
            *slot = Some(id);
        }
    }
}
