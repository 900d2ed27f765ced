use crate::convert::options::{ConversionOptions, ConverterConfig, ValidationMode};
use crate::decode::tgs::{decompress_tgs, is_compressed, parse_lottie_json};
use crate::foundation::error::{TgsError, TgsResult};
use crate::generate::assemble::{AnimationSource, assemble};
use crate::generate::fingerprint::{OutputFingerprint, fingerprint_code};
use crate::generate::runtime::runtime_source;
use crate::generate::serialize::serialize_animation_data;
use crate::optimize::bundle::OptimizationResult;
use crate::optimize::optimize;
use crate::scene::metadata::{AnimationMetadata, extract_metadata};
use crate::scene::model::AnimationGraph;
use crate::schema::validate::{sanitize_with_report, validate};
use serde::Serialize;
use std::time::Instant;

/// Converter input: `.tgs` bytes (or JSON bytes), or JSON text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionInput<'a> {
    /// Compressed `.tgs` or raw JSON bytes.
    Bytes(&'a [u8]),
    /// Lottie JSON text.
    Text(&'a str),
}

impl ConversionInput<'_> {
    /// Input size in bytes.
    pub fn len(&self) -> usize {
        match self {
            Self::Bytes(b) => b.len(),
            Self::Text(t) => t.len(),
        }
    }

    /// Return `true` for zero-length input.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> From<&'a [u8]> for ConversionInput<'a> {
    fn from(b: &'a [u8]) -> Self {
        Self::Bytes(b)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for ConversionInput<'a> {
    fn from(b: &'a [u8; N]) -> Self {
        Self::Bytes(b)
    }
}

impl<'a> From<&'a Vec<u8>> for ConversionInput<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl<'a> From<&'a str> for ConversionInput<'a> {
    fn from(t: &'a str) -> Self {
        Self::Text(t)
    }
}

impl<'a> From<&'a String> for ConversionInput<'a> {
    fn from(t: &'a String) -> Self {
        Self::Text(t)
    }
}

/// Size and timing figures of one conversion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMetadata {
    /// Input length in bytes.
    pub original_size: usize,
    /// Generated code length in bytes.
    pub output_size: usize,
    /// Root layers in the converted graph.
    pub layer_count: usize,
    /// Wall-clock time of the whole pipeline, in milliseconds.
    pub duration: f64,
}

/// Generated artifact plus everything learned while producing it.
#[derive(Clone, Debug)]
pub struct ConversionResult {
    /// Generated JavaScript.
    pub code: String,
    /// Always `None`; no source maps are produced.
    pub source_map: Option<String>,
    /// Sizes and timing.
    pub metadata: ConversionMetadata,
    /// Metadata of the input animation.
    pub animation: AnimationMetadata,
    /// Repairs applied by sanitize/validate and skipped optimizer passes.
    pub warnings: Vec<String>,
    /// Present when the optimizer ran.
    pub optimization: Option<OptimizationResult>,
    /// Serialized animation data for the host to publish when it is not embedded.
    pub external_data: Option<String>,
    /// Content hash of `code`.
    pub fingerprint: OutputFingerprint,
}

/// Converts TGS/Lottie input into player bundles.
///
/// Holds only configuration; every call is independent, so one converter can be shared across
/// threads.
#[derive(Clone, Debug, Default)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    /// Converter with fixed configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Configuration every conversion uses.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Run the full pipeline: decode, validate, extract metadata, optimize, generate.
    ///
    /// The first fatal error aborts the conversion.
    #[tracing::instrument(skip(self, input, options), fields(format = ?options.output_format))]
    pub fn convert<'a>(
        &self,
        input: impl Into<ConversionInput<'a>>,
        options: &ConversionOptions,
    ) -> TgsResult<ConversionResult> {
        let started = Instant::now();
        let input = input.into();
        let original_size = input.len();

        let graph = decode_input(input)?;

        let (graph, problems) = match self.config.validation {
            ValidationMode::Strict => validate(graph).into_result()?,
            ValidationMode::Sanitize => sanitize_with_report(graph),
        };
        let mut warnings: Vec<String> = problems.iter().map(ToString::to_string).collect();

        let animation = extract_metadata(&graph);

        let (data_graph, optimization) = if self.config.optimize {
            let bundle = optimize(&graph, &self.config.optimizer);
            warnings.extend(bundle.stats.warnings);
            (bundle.graph, Some(bundle.result))
        } else {
            (graph, None)
        };

        let data = serialize_animation_data(&data_graph, options.minify)?;
        let runtime = runtime_source(&self.config.runtime);
        let source = if options.embed_animation {
            AnimationSource::Inline(&data)
        } else {
            AnimationSource::External {
                url: options.data_url.as_deref(),
            }
        };
        let code = assemble(&runtime, source, options)?;
        let external_data = (!options.embed_animation).then_some(data);

        let metadata = ConversionMetadata {
            original_size,
            output_size: code.len(),
            layer_count: animation.layer_count,
            duration: started.elapsed().as_secs_f64() * 1000.0,
        };
        tracing::debug!(
            original_size = metadata.original_size,
            output_size = metadata.output_size,
            duration_ms = metadata.duration,
            warnings = warnings.len(),
            "conversion finished"
        );

        Ok(ConversionResult {
            fingerprint: fingerprint_code(&code),
            code,
            source_map: None,
            metadata,
            animation,
            warnings,
            optimization,
            external_data,
        })
    }
}

/// Convert with the default [`ConverterConfig`].
pub fn convert<'a>(
    input: impl Into<ConversionInput<'a>>,
    options: &ConversionOptions,
) -> TgsResult<ConversionResult> {
    Converter::default().convert(input, options)
}

fn decode_input(input: ConversionInput<'_>) -> TgsResult<AnimationGraph> {
    match input {
        ConversionInput::Bytes(b) if is_compressed(b) => decompress_tgs(b),
        ConversionInput::Bytes(b) => {
            let text = std::str::from_utf8(b).map_err(|e| {
                TgsError::malformed_json(format!("input is neither compressed nor UTF-8: {e}"))
            })?;
            parse_lottie_json(text)
        }
        ConversionInput::Text(t) => parse_lottie_json(t),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/convert/converter.rs"]
mod tests;
