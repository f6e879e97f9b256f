//! Bundle rendering.
//!
//! The bundle is a single script: the `Define` prelude, then every module
//! wrapped in a function and registered with a small CommonJS-style runtime,
//! then the live-reload client. `Minify` compacts all of it and the inline
//! source map is appended last.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kiln_config::{BuildPlan, Defines, Stage};
use serde_json::json;
use tracing::warn;

use crate::graph::ModuleGraph;
use crate::handlers::js_string;
use crate::lexical::Regions;

/// Polled by the live-reload client; answers with the current build id.
pub const STATUS_PATH: &str = "/__kiln/status";

const RUNTIME_HEAD: &str = r#"(function (modules, entry) {
  var cache = {};
  function load(id) {
    if (cache[id]) {
      return cache[id].exports;
    }
    var module = (cache[id] = { exports: {} });
    var record = modules[id];
    record[0].call(module.exports, function (specifier) {
      var target = record[1][specifier];
      if (target === undefined) {
        throw new Error("Cannot find module '" + specifier + "' from '" + id + "'");
      }
      return load(target);
    }, module, module.exports);
    return module.exports;
  }
  load(entry);
})({
"#;

/// Render the bundle for `graph` with the stages enabled in `plan`.
pub fn render(graph: &ModuleGraph, plan: &BuildPlan) -> String {
    let mut out = String::new();
    if plan.pipeline.contains(Stage::Define) {
        out.push_str(&define_prelude(&plan.defines));
    }

    out.push_str(RUNTIME_HEAD);
    for module in graph.modules() {
        let deps: serde_json::Map<_, _> = module
            .dependencies
            .iter()
            .map(|(specifier, id)| (specifier.clone(), json!(id)))
            .collect();
        out.push_str(&format!(
            "{}: [function (require, module, exports) {{\n{}\n}}, {}],\n",
            js_string(&module.id),
            module.code.trim_end(),
            serde_json::Value::Object(deps),
        ));
    }
    out.push_str(&format!("}}, {});\n", js_string(graph.entry())));

    if plan.pipeline.contains(Stage::LiveReload) {
        out.push_str(&live_reload_client());
    }
    if plan.pipeline.contains(Stage::Minify) {
        out = compact(&out);
        out.push('\n');
    }
    if plan.pipeline.contains(Stage::InlineSourceMap) {
        out.push_str(&inline_source_map(graph));
    }
    out
}

/// One `var` per constant, at script scope.
pub fn define_prelude(defines: &Defines) -> String {
    let mut out = String::new();
    for (name, value) in defines.iter() {
        if !is_identifier(name) {
            warn!(name, "skipping define: not a JavaScript identifier");
            continue;
        }
        out.push_str(&format!("var {name} = {value};\n"));
    }
    out
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Full-page reload once the dev server reports a different build id.
pub fn live_reload_client() -> String {
    format!(
        r#"(function () {{
  var current = null;
  setInterval(function () {{
    fetch({status}, {{ cache: "no-store" }})
      .then(function (response) {{ return response.text(); }})
      .then(function (id) {{
        if (current === null) {{
          current = id;
        }} else if (id !== current) {{
          location.reload();
        }}
      }})
      .catch(function () {{}});
  }}, 1000);
}})();
"#,
        status = js_string(STATUS_PATH)
    )
}

/// Trim every line and drop blank ones.
///
/// Lines stay separate so automatic semicolon insertion is unaffected.
/// Whitespace inside a literal spanning lines (template text, continued
/// strings) is part of its value and is kept.
pub fn compact(source: &str) -> String {
    let regions = Regions::scan(source);
    let mut lines = Vec::new();
    let mut offset = 0;
    for line in source.split('\n') {
        let end = offset + line.len();
        let keep_head = regions.continues_literal(offset);
        let keep_tail = regions.continues_literal(end);
        let mut text = line;
        if !keep_head {
            text = text.trim_start();
        }
        if !keep_tail {
            text = text.trim_end();
        }
        if !text.is_empty() || keep_head || keep_tail {
            lines.push(text);
        }
        offset = end + 1;
    }
    lines.join("\n")
}

/// Source map carrying the original sources, as a data URL comment.
pub fn inline_source_map(graph: &ModuleGraph) -> String {
    let (sources, contents): (Vec<_>, Vec<_>) = graph
        .modules()
        .map(|m| (m.id.as_str(), m.source.as_str()))
        .unzip();
    let map = json!({
        "version": 3,
        "sources": sources,
        "sourcesContent": contents,
        "names": [],
        "mappings": "",
    });
    format!(
        "//# sourceMappingURL=data:application/json;charset=utf-8;base64,{}\n",
        STANDARD.encode(map.to_string())
    )
}
