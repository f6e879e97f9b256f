//! Content hashes and content-addressed filename templates.
//!
//! A template such as `app-[contenthash].bundle.js` renders to the same name
//! for identical bytes and to a different name as soon as the bytes change.

use std::fmt;

/// CRC-32 digest of a file's bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(u32);

impl ContentHash {
    pub fn of(bytes: &[u8]) -> Self {
        Self(crc32fast::hash(bytes))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("filename template '{0}' must contain [contenthash]")]
    MissingContentHash(String),

    #[error("filename template '{template}' has unknown placeholder '[{token}]'")]
    UnknownPlaceholder { template: String, token: String },

    #[error("filename template '{0}' has an unclosed '['")]
    Unclosed(String),

    #[error("filename template '{0}' must not contain path separators")]
    PathSeparator(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Name,
    ContentHash,
    Ext,
}

/// Parsed filename template.
///
/// Placeholders: `[name]` (chunk or file stem), `[contenthash]`, and `[ext]`
/// (extension including the leading dot, empty when the file has none).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl FilenameTemplate {
    /// Parse a template. Every template must be content-addressed.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        if template.contains(['/', '\\']) {
            return Err(TemplateError::PathSeparator(template.to_owned()));
        }

        let mut segments = Vec::new();
        let mut rest = template;
        while let Some(open) = rest.find('[') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_owned()));
            }
            let Some(close) = rest[open..].find(']') else {
                return Err(TemplateError::Unclosed(template.to_owned()));
            };
            let token = &rest[open + 1..open + close];
            segments.push(match token {
                "name" => Segment::Name,
                "contenthash" => Segment::ContentHash,
                "ext" => Segment::Ext,
                _ => {
                    return Err(TemplateError::UnknownPlaceholder {
                        template: template.to_owned(),
                        token: token.to_owned(),
                    });
                }
            });
            rest = &rest[open + close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_owned()));
        }

        if !segments.contains(&Segment::ContentHash) {
            return Err(TemplateError::MissingContentHash(template.to_owned()));
        }

        Ok(Self {
            source: template.to_owned(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Render the filename for `content`.
    pub fn render(&self, name: &str, ext: &str, content: &[u8]) -> String {
        let hash = ContentHash::of(content);
        let mut out = String::with_capacity(self.source.len() + 8);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Name => out.push_str(name),
                Segment::ContentHash => out.push_str(&hash.to_string()),
                Segment::Ext => out.push_str(ext),
            }
        }
        out
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
