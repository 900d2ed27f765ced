use serde::Deserialize;

/// Player implementation embedded into every bundle.
const PLAYER_JS: &str = include_str!("runtime/player.js");

/// Name of the player constructor the runtime defines.
pub const RUNTIME_CONSTRUCTOR: &str = "TgsPlayer";

/// Runtime build configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Keep the player's internal assertions active.
    pub debug_assertions: bool,
}

/// Produce the runtime source for `config`. Independent of any animation.
pub fn runtime_source(config: &RuntimeConfig) -> String {
    let mut out = String::with_capacity(PLAYER_JS.len() + 32);
    out.push_str("var TGS_DEBUG = ");
    out.push_str(if config.debug_assertions { "true" } else { "false" });
    out.push_str(";\n");
    out.push_str(PLAYER_JS);
    out
}

/// Whitespace-only minification of JavaScript source.
///
/// Indentation, blank lines and whole-line `//` comments are dropped. Line breaks are kept, so
/// automatic semicolon insertion behaves exactly as in the input.
pub fn minify_source(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    for line in src.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/generate/runtime.rs"]
mod tests;
