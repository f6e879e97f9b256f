//! Contracts for the external collaborators the build engine drives.
//!
//! The source compiler and the HTML templating engine are opaque to kiln.
//! The defaults here are deliberately thin so a project builds end to end
//! without either being installed.

use std::path::Path;

use kiln_config::HandlerOptions;
use kiln_core::BuildMode;

use crate::bundle::compact;

/// One module handed to the compiler.
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    pub path: &'a Path,
    pub source: &'a str,
    pub mode: BuildMode,
    pub minify: bool,
    /// Browser query the output must support.
    pub browserslist: &'a str,
    pub options: &'a HandlerOptions,
}

/// Module-to-module source transformer behind the `compile` handler.
pub trait ModuleCompiler: Send + Sync {
    /// Returns the compiled module, or a diagnostic.
    fn compile(&self, request: &CompileRequest<'_>) -> Result<String, String>;
}

/// Leaves sources untouched, apart from whitespace compaction when minifying.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughCompiler;

impl ModuleCompiler for PassthroughCompiler {
    fn compile(&self, request: &CompileRequest<'_>) -> Result<String, String> {
        if request.minify {
            Ok(compact(request.source))
        } else {
            Ok(request.source.to_owned())
        }
    }
}

/// What the generated document must reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlPage<'a> {
    pub title: &'a str,
    /// Public URLs of the scripts, in load order.
    pub scripts: Vec<String>,
}

pub trait HtmlTemplater: Send + Sync {
    /// Render the document from `template`, or from a built-in skeleton.
    fn render(&self, template: Option<&str>, page: &HtmlPage<'_>) -> Result<String, String>;
}

/// Injects one deferred `<script>` per bundle before `</head>`.
///
/// Falls back to `</body>`, then to the end of the document.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptInjector;

impl HtmlTemplater for ScriptInjector {
    fn render(&self, template: Option<&str>, page: &HtmlPage<'_>) -> Result<String, String> {
        let mut html = match template {
            Some(template) => template.to_owned(),
            None => skeleton(page.title),
        };
        let tags: String = page
            .scripts
            .iter()
            .map(|src| format!("<script defer src=\"{}\"></script>", escape_attr(src)))
            .collect();

        let lower = html.to_ascii_lowercase();
        let at = lower
            .find("</head>")
            .or_else(|| lower.find("</body>"))
            .unwrap_or(html.len());
        html.insert_str(at, &tags);
        Ok(html)
    }
}

fn skeleton(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>{}</title>\n</head>\n<body>\n<div id=\"root\"></div>\n</body>\n</html>\n",
        escape_text(title)
    )
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
