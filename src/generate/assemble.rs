use crate::convert::options::{ConversionOptions, OutputFormat};
use crate::foundation::error::{TgsError, TgsResult};
use crate::generate::runtime::{RUNTIME_CONSTRUCTOR, minify_source};

/// Where the assembled code gets its animation data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationSource<'a> {
    /// Serialized data inlined into the bundle.
    Inline(&'a str),
    /// Data fetched at load time from `url`, or from the mount point's `data-src` attribute.
    External {
        /// Explicit data location.
        url: Option<&'a str>,
    },
}

/// Wrap `runtime` and the animation data into the artifact selected by `options.output_format`.
pub fn assemble(
    runtime: &str,
    source: AnimationSource<'_>,
    options: &ConversionOptions,
) -> TgsResult<String> {
    let mut w = CodeWriter::new(options.minify, runtime.len());
    let target = js_string(options.target_id())?;

    match options.output_format {
        OutputFormat::Standalone => {
            w.line(0, "(function () {");
            w.line(1, "\"use strict\";");
            w.block(1, runtime);
            match source {
                AnimationSource::Inline(data) => {
                    w.statement(1, &format!("var animationData = {};", embed_json(data)));
                    w.line(
                        1,
                        &format!(
                            "new {RUNTIME_CONSTRUCTOR}(document.getElementById({target}), animationData).start();"
                        ),
                    );
                }
                AnimationSource::External { url } => {
                    let url = url.map(js_string).transpose()?;
                    w.line(1, &format!("var target = document.getElementById({target});"));
                    w.line(
                        1,
                        &format!(
                            "{RUNTIME_CONSTRUCTOR}.fetchData({}, target).then(function (animationData) {{",
                            url.as_deref().unwrap_or("null")
                        ),
                    );
                    w.line(
                        2,
                        &format!("new {RUNTIME_CONSTRUCTOR}(target, animationData).start();"),
                    );
                    w.line(1, "});");
                }
            }
            w.line(0, "})();");
        }
        OutputFormat::Module => {
            w.block(0, runtime);
            if let AnimationSource::Inline(data) = source {
                w.statement(0, &format!("var animationData = {};", embed_json(data)));
            }
            w.line(0, "export function createPlayer(target, options) {");
            w.line(
                1,
                &format!(
                    "var el = (typeof target === \"string\" ? document.getElementById(target) : target) || document.getElementById({target});"
                ),
            );
            match source {
                AnimationSource::Inline(_) => {
                    w.line(
                        1,
                        &format!("return new {RUNTIME_CONSTRUCTOR}(el, animationData, options);"),
                    );
                    w.line(0, "}");
                    w.line(0, &format!("export {{ {RUNTIME_CONSTRUCTOR}, animationData }};"));
                }
                AnimationSource::External { url } => {
                    let url = url.map(js_string).transpose()?;
                    w.line(
                        1,
                        &format!(
                            "return {RUNTIME_CONSTRUCTOR}.fetchData({}, el).then(function (animationData) {{",
                            url.as_deref().unwrap_or("null")
                        ),
                    );
                    w.line(
                        2,
                        &format!("return new {RUNTIME_CONSTRUCTOR}(el, animationData, options);"),
                    );
                    w.line(1, "});");
                    w.line(0, "}");
                    w.line(0, &format!("export {{ {RUNTIME_CONSTRUCTOR} }};"));
                }
            }
            w.line(0, "export default createPlayer;");
        }
    }

    Ok(w.finish())
}

struct CodeWriter {
    out: String,
    minify: bool,
}

impl CodeWriter {
    fn new(minify: bool, capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity + 1024),
            minify,
        }
    }

    fn indent(&mut self, depth: usize) {
        if !self.minify {
            for _ in 0..depth {
                self.out.push_str("  ");
            }
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        self.indent(depth);
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Multi-line statement: continuation lines get the same indentation.
    fn statement(&mut self, depth: usize, text: &str) {
        for line in text.lines() {
            self.line(depth, line);
        }
    }

    /// Embed a source file verbatim (minified when requested).
    fn block(&mut self, depth: usize, src: &str) {
        if self.minify {
            self.out.push_str(&minify_source(src));
            return;
        }
        for line in src.lines() {
            if line.is_empty() {
                self.out.push('\n');
            } else {
                self.line(depth, line);
            }
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Quote `s` as a JavaScript string literal.
fn js_string(s: &str) -> TgsResult<String> {
    serde_json::to_string(s)
        .map(|q| embed_json(&q))
        .map_err(|e| TgsError::generation(format!("encode string literal: {e}")))
}

/// Make JSON text safe to inline in a `<script>` element and in pre-ES2019 engines.
fn embed_json(json: &str) -> String {
    json.replace("</", "<\\/")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

#[cfg(test)]
#[path = "../../tests/unit/generate/assemble.rs"]
mod tests;
