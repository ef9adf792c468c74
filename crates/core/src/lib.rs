//! Core library for the Audio Vase generator.
//!
//! The crate turns a recorded audio track into a printable vase shell. Each
//! module owns one stage of the pipeline (decoding, feature extraction,
//! smoothing, noise, mesh synthesis, merging, STL export) and the stages only
//! exchange plain values, so they can be driven individually from tests or
//! composed through [`VasePipeline`].

pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod merge;
pub mod mesh;
pub mod noise;
pub mod pipeline;
pub mod smoothing;
pub mod stl;
pub mod synth;

pub use analysis::{AudioFeatureSample, FeatureExtractor, FeatureSequence};
pub use audio::{AudioDecoder, DecodedAudio, WavDecoder};
pub use config::{AnalysisConfig, AppConfig};
pub use error::{Result, VaseError};
pub use merge::{merge_with_base, BaseConfig, BasePlacement};
pub use mesh::{Bounds, TriangleMesh};
pub use noise::NoiseField;
pub use pipeline::VasePipeline;
pub use smoothing::smooth_amplitudes;
pub use stl::{parse_stl, to_ascii_stl, write_ascii_stl, write_binary_stl};
pub use synth::{GenerationSettings, VaseSynthesizer};
