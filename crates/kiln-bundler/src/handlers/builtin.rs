use std::sync::Arc;

use kiln_config::HandlerOptions;
use serde_json::Value;

use super::{Handler, HandlerContext, HandlerResult, ModuleContent};
use crate::collab::{CompileRequest, ModuleCompiler};

/// Quoted JavaScript string literal.
pub(crate) fn js_string(text: &str) -> String {
    Value::String(text.to_owned()).to_string()
}

fn export_string(text: &str) -> ModuleContent {
    ModuleContent::Script(format!("module.exports = {};\n", js_string(text)))
}

/// Runs the configured [`ModuleCompiler`].
///
/// Option `minify` (bool) overrides the mode default.
pub struct CompileHandler {
    compiler: Arc<dyn ModuleCompiler>,
}

impl CompileHandler {
    pub fn new(compiler: Arc<dyn ModuleCompiler>) -> Self {
        Self { compiler }
    }
}

impl Handler for CompileHandler {
    fn apply(
        &self,
        input: ModuleContent,
        cx: &mut HandlerContext<'_>,
        options: &HandlerOptions,
    ) -> HandlerResult {
        let source = input.into_text()?;
        let minify = options
            .get("minify")
            .and_then(Value::as_bool)
            .unwrap_or_else(|| cx.mode.minifies());
        let request = CompileRequest {
            path: cx.path,
            source: &source,
            mode: cx.mode,
            minify,
            browserslist: &cx.target.browserslist,
            options,
        };
        self.compiler.compile(&request).map(ModuleContent::Script)
    }

    fn scans_dependencies(&self) -> bool {
        true
    }
}

/// Emits the file under the asset filename template and exports its URL.
pub struct AssetResourceHandler;

impl Handler for AssetResourceHandler {
    fn apply(
        &self,
        input: ModuleContent,
        cx: &mut HandlerContext<'_>,
        _options: &HandlerOptions,
    ) -> HandlerResult {
        let bytes = input.into_bytes();
        let filename = cx.output.asset_filename(cx.path, &bytes);
        let url = cx.output.public_url(&filename);
        cx.emit_asset(filename, bytes);
        Ok(export_string(&url))
    }
}

/// Exports a stylesheet as a string.
pub struct CssHandler;

impl Handler for CssHandler {
    fn apply(
        &self,
        input: ModuleContent,
        _cx: &mut HandlerContext<'_>,
        _options: &HandlerOptions,
    ) -> HandlerResult {
        Ok(export_string(&input.into_text()?))
    }
}

/// Injects the stylesheet exported by the previous step as a `<style>` tag.
///
/// Raw input is taken to be the stylesheet itself.
pub struct StyleHandler;

impl Handler for StyleHandler {
    fn apply(
        &self,
        input: ModuleContent,
        cx: &mut HandlerContext<'_>,
        _options: &HandlerOptions,
    ) -> HandlerResult {
        let css = match input {
            ModuleContent::Script(inner) => format!(
                "(function (module) {{\n{inner}\nreturn module.exports;\n}})({{ exports: {{}} }})"
            ),
            raw @ ModuleContent::Raw(_) => js_string(&raw.into_text()?),
        };
        Ok(ModuleContent::Script(format!(
            "var css = {css};\n\
             if (typeof document !== \"undefined\") {{\n\
             var style = document.createElement(\"style\");\n\
             style.setAttribute(\"data-kiln-module\", {id});\n\
             style.textContent = css;\n\
             document.head.appendChild(style);\n\
             }}\n\
             module.exports = css;\n",
            id = js_string(cx.id),
        )))
    }
}

/// Exports markup as a string.
pub struct HtmlHandler;

impl Handler for HtmlHandler {
    fn apply(
        &self,
        input: ModuleContent,
        _cx: &mut HandlerContext<'_>,
        _options: &HandlerOptions,
    ) -> HandlerResult {
        Ok(export_string(&input.into_text()?))
    }
}

/// Exports parsed JSON.
pub struct JsonHandler;

impl Handler for JsonHandler {
    fn apply(
        &self,
        input: ModuleContent,
        _cx: &mut HandlerContext<'_>,
        _options: &HandlerOptions,
    ) -> HandlerResult {
        let bytes = input.into_bytes();
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| format!("invalid JSON: {e}"))?;
        Ok(ModuleContent::Script(format!("module.exports = {value};\n")))
    }
}
