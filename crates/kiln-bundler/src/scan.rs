//! Dependency scanning of script modules.
//!
//! Recognizes `import … from "x"`, `import "x"`, `export … from "x"`,
//! `require("x")` and `import("x")`. Specifiers are returned once each, in
//! order of first appearance. Matches that start inside a comment or a
//! literal are not imports and are skipped.

use regex_automata::Input;
use regex_automata::meta::Regex;

use crate::error::{Error, Result};
use crate::lexical::{Region, Regions};

const DEPENDENCY_PATTERN: &str = concat!(
    r#"\b(?:import|export)\s+(?:[\w*${}\s,]+?\s+from\s+)?["']([^"'\n]+)["']"#,
    "|",
    r#"\b(?:require|import)\s*\(\s*["']([^"'\n]+)["']\s*\)"#,
);

pub struct DependencyScanner {
    regex: Regex,
}

impl DependencyScanner {
    pub fn new() -> Result<Self> {
        let regex = Regex::new(DEPENDENCY_PATTERN).map_err(|e| Error::HandlerTransform {
            path: "<scanner>".into(),
            handler: "scan".into(),
            diagnostic: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    pub fn scan<'s>(&self, source: &'s str) -> Vec<&'s str> {
        let regions = Regions::scan(source);
        // Same offsets as `source`, so spans index either.
        let masked = regions.mask_comments(source);
        let mut caps = self.regex.create_captures();
        let mut found: Vec<&str> = Vec::new();
        let mut at = 0;
        while at < masked.len() {
            self.regex
                .search_captures(&Input::new(&masked).range(at..), &mut caps);
            let Some(m) = caps.get_match() else {
                break;
            };
            if regions.at(m.start()) != Region::Code {
                // Keywords are ASCII, so the next byte is a char boundary.
                at = m.start() + 1;
                continue;
            }
            at = m.end();
            let Some(span) = caps.get_group(1).or_else(|| caps.get_group(2)) else {
                continue;
            };
            let specifier = &source[span.start..span.end];
            if !found.contains(&specifier) {
                found.push(specifier);
            }
        }
        found
    }
}
