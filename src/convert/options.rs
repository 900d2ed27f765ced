use crate::generate::runtime::RuntimeConfig;
use crate::optimize::OptimizerOptions;
use serde::Deserialize;

/// Mount point id used when [`ConversionOptions::target_id`] is unset.
pub const DEFAULT_TARGET_ID: &str = "tgs-player";

/// Shape of the generated artifact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Self-executing script that mounts and starts the player.
    #[default]
    Standalone,
    /// ES module exporting a player factory; nothing runs on import.
    Module,
}

/// Per-conversion options.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Script shape of the bundle.
    pub output_format: OutputFormat,
    /// Strip formatting whitespace. Never changes behavior.
    pub minify: bool,
    /// Inline the animation data. When `false` the bundle loads it at runtime.
    pub embed_animation: bool,
    /// DOM id of the mount point.
    pub target_id: Option<String>,
    /// Where a non-embedded bundle fetches its data from. Without it, the mount point's
    /// `data-src` attribute is used.
    pub data_url: Option<String>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Standalone,
            minify: false,
            embed_animation: true,
            target_id: None,
            data_url: None,
        }
    }
}

impl ConversionOptions {
    /// Effective mount point id.
    pub fn target_id(&self) -> &str {
        self.target_id.as_deref().unwrap_or(DEFAULT_TARGET_ID)
    }
}

/// Strict rejection or best-effort repair of malformed input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Reject graphs with fatal problems.
    #[default]
    Strict,
    /// Repair everything that can be repaired.
    Sanitize,
}

/// Converter-wide configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConverterConfig {
    /// How malformed graphs are handled.
    pub validation: ValidationMode,
    /// Run the optimizer before generation.
    pub optimize: bool,
    /// Optimizer pass chain and parallelism.
    pub optimizer: OptimizerOptions,
    /// Player runtime settings embedded into every bundle.
    pub runtime: RuntimeConfig,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            validation: ValidationMode::Strict,
            optimize: true,
            optimizer: OptimizerOptions::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}
