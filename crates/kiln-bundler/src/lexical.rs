//! Lexical regions of script text.
//!
//! One forward pass locates comments and literals (strings, template text,
//! regular expressions) so later passes can tell code from everything else.
//! Nothing is tokenized beyond that. Whether a `/` starts a regular
//! expression is decided from the preceding token.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Code,
    Comment,
    /// String, template text, or regular expression literal.
    Literal,
}

/// Non-code spans of a script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Regions {
    /// Sorted and disjoint.
    spans: Vec<(Range<usize>, Region)>,
}

impl Regions {
    pub fn scan(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut spans = Vec::new();
        // Brace depth inside each open `${ … }`, innermost last.
        let mut substitutions: Vec<usize> = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    let end = find(bytes, i, b"\n").unwrap_or(bytes.len());
                    spans.push((i..end, Region::Comment));
                    i = end;
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    let end = find(bytes, i + 2, b"*/").map_or(bytes.len(), |at| at + 2);
                    spans.push((i..end, Region::Comment));
                    i = end;
                }
                b'/' if regex_allowed(bytes, i) => match regex_end(bytes, i) {
                    Some(end) => {
                        spans.push((i..end, Region::Literal));
                        i = end;
                    }
                    None => i += 1,
                },
                quote @ (b'"' | b'\'') => {
                    let end = string_end(bytes, i, quote);
                    spans.push((i..end, Region::Literal));
                    i = end;
                }
                b'`' => {
                    i = template_text(bytes, i, &mut spans, &mut substitutions);
                }
                b'{' => {
                    if let Some(depth) = substitutions.last_mut() {
                        *depth += 1;
                    }
                    i += 1;
                }
                b'}' => match substitutions.last().copied() {
                    Some(0) => {
                        substitutions.pop();
                        i = template_text(bytes, i, &mut spans, &mut substitutions);
                    }
                    Some(_) => {
                        if let Some(depth) = substitutions.last_mut() {
                            *depth -= 1;
                        }
                        i += 1;
                    }
                    None => i += 1,
                },
                _ => i += 1,
            }
        }
        Self { spans }
    }

    pub fn at(&self, offset: usize) -> Region {
        match self.span_at(offset) {
            Some((_, region)) => region,
            None => Region::Code,
        }
    }

    /// Whether `offset` is inside a literal opened before it.
    pub fn continues_literal(&self, offset: usize) -> bool {
        matches!(
            self.span_at(offset),
            Some((span, Region::Literal)) if span.start < offset
        )
    }

    /// `source` with every comment byte replaced by a space. Offsets are kept.
    pub fn mask_comments(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len());
        let mut at = 0;
        for (span, region) in &self.spans {
            if *region != Region::Comment {
                continue;
            }
            out.push_str(&source[at..span.start]);
            out.extend(std::iter::repeat_n(' ', span.len()));
            at = span.end;
        }
        out.push_str(&source[at..]);
        out
    }

    fn span_at(&self, offset: usize) -> Option<(Range<usize>, Region)> {
        let idx = self.spans.partition_point(|(span, _)| span.end <= offset);
        self.spans
            .get(idx)
            .filter(|(span, _)| span.start <= offset)
            .cloned()
    }
}

/// Record template text starting at `open` (a backtick, or the `}` closing a
/// substitution) and return where code resumes.
fn template_text(
    bytes: &[u8],
    open: usize,
    spans: &mut Vec<(Range<usize>, Region)>,
    substitutions: &mut Vec<usize>,
) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                spans.push((open..i + 1, Region::Literal));
                return i + 1;
            }
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                spans.push((open..i + 2, Region::Literal));
                substitutions.push(0);
                return i + 2;
            }
            _ => i += 1,
        }
    }
    spans.push((open..bytes.len(), Region::Literal));
    bytes.len()
}

/// End of a quoted string; an unterminated one stops at the line break.
fn string_end(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// End of a regular expression literal, or `None` if the line ends first.
fn regex_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut in_class = false;
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return None,
            b'[' => {
                in_class = true;
                i += 1;
            }
            b']' => {
                in_class = false;
                i += 1;
            }
            b'/' if !in_class => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// A `/` at `at` starts a regular expression unless it follows an operand.
fn regex_allowed(bytes: &[u8], at: usize) -> bool {
    let before = &bytes[..at];
    let Some(last) = before.iter().rposition(|b| !b.is_ascii_whitespace()) else {
        return true;
    };
    let prev = before[last];
    if b"(,=:[!&|?{};+-*%<>~^".contains(&prev) {
        return true;
    }
    if !is_ident(prev) {
        return false;
    }
    let start = before[..last]
        .iter()
        .rposition(|b| !is_ident(*b))
        .map_or(0, |p| p + 1);
    matches!(
        &before[start..=last],
        b"return"
            | b"typeof"
            | b"case"
            | b"do"
            | b"else"
            | b"in"
            | b"of"
            | b"new"
            | b"delete"
            | b"void"
            | b"throw"
            | b"yield"
            | b"await"
    )
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|p| p + from)
}
