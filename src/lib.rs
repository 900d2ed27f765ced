//! Compile Telegram animated stickers into self-contained player bundles.
//!
//! A `.tgs` file is a gzip-compressed Lottie/Bodymovin document. Conversion is a linear pipeline:
//!
//! - Decompress and parse into an [`AnimationGraph`]
//! - [`validate`] (strict) or [`sanitize`] (best-effort) the graph
//! - [`extract_metadata`] for duration, size and layer count
//! - [`optimize`]: collapse properties that never change, run the [`TransformPass`] chain
//! - Serialize the data, embed the player runtime and [`assemble`] the final script or module
//!
//! [`Converter::convert`] wires all of it together. Every stage is a pure function of its input, so
//! conversions can run on any number of threads without coordination.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod convert;
pub(crate) mod decode;
pub(crate) mod generate;
pub(crate) mod optimize;
pub(crate) mod scene;
pub(crate) mod schema;

pub use crate::foundation::error::{TgsError, TgsResult};
pub use crate::foundation::path::{PathSegment, PropertyPath};

pub use crate::convert::converter::{
    ConversionInput, ConversionMetadata, ConversionResult, Converter, convert,
};
pub use crate::convert::options::{
    ConversionOptions, ConverterConfig, DEFAULT_TARGET_ID, OutputFormat, ValidationMode,
};
pub use crate::decode::tgs::{
    MAX_INFLATED_BYTES, compress_tgs, decompress_tgs, inflate, is_compressed, is_gzip, is_zlib,
    parse_lottie_json,
};
pub use crate::generate::assemble::{AnimationSource, assemble};
pub use crate::generate::fingerprint::{OutputFingerprint, fingerprint_code};
pub use crate::generate::runtime::{
    RUNTIME_CONSTRUCTOR, RuntimeConfig, minify_source, runtime_source,
};
pub use crate::generate::serialize::serialize_animation_data;
pub use crate::optimize::bundle::{
    AnimatedPropertyDescriptor, LayerProperties, LayerStats, OptimizationResult,
    OptimizationStats, OptimizedBundle, PropertySlot, StaticProperty,
};
pub use crate::optimize::classify::{
    ClassificationReason, PropertyClassification, PropertyTag, classify_layer, classify_property,
    discover_properties,
};
pub use crate::optimize::passes::{PassError, TransformContext, TransformPass};
pub use crate::optimize::value::{ComputedStaticValue, compute_static_value};
pub use crate::optimize::{OptimizerOptions, optimize};
pub use crate::scene::metadata::{AnimationMetadata, TGS_PROVENANCE_FLAG, extract_metadata};
pub use crate::scene::model::{AnimationGraph, Asset, LAYER_KIND_NULL, Layer};
pub use crate::schema::validate::{
    DEFAULT_CANVAS_SIZE, DEFAULT_FRAME_RATE, Severity, ValidationErrors, ValidationProblem,
    ValidationResult, sanitize, sanitize_with_report, validate,
};
