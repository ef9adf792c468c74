use crate::{
    merge_with_base, smooth_amplitudes, AppConfig, AudioDecoder, BaseConfig, BasePlacement,
    DecodedAudio, FeatureExtractor, FeatureSequence, GenerationSettings, NoiseField, Result,
    TriangleMesh, VaseError, VaseSynthesizer,
};

/// End-to-end façade: audio bytes in, vase mesh out.
///
/// Every call is independent. The noise field is the only state and it is
/// read-only, so one pipeline can serve several generations.
#[derive(Debug, Clone)]
pub struct VasePipeline {
    extractor: FeatureExtractor,
    settings: GenerationSettings,
    base: BaseConfig,
    noise: NoiseField,
}

impl VasePipeline {
    pub fn new(settings: GenerationSettings, noise: NoiseField) -> Self {
        Self {
            extractor: FeatureExtractor::default(),
            settings,
            base: BaseConfig::default(),
            noise,
        }
    }

    /// Builds a pipeline from configuration, drawing a random noise seed if
    /// the configuration does not pin one.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let noise = match config.noise_seed {
            Some(seed) => NoiseField::new(seed),
            None => NoiseField::with_random_seed(),
        };

        Ok(Self {
            extractor: FeatureExtractor::with_segment_seconds(config.analysis.segment_seconds)?,
            settings: config.generation.clone(),
            base: config.base,
            noise,
        })
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Decodes `bytes` and extracts raw (unsmoothed) features.
    pub fn analyse<D: AudioDecoder + ?Sized>(
        &self,
        decoder: &D,
        bytes: &[u8],
    ) -> Result<FeatureSequence> {
        let audio = decoder.decode(bytes)?;
        self.analyse_decoded(&audio)
    }

    pub fn analyse_decoded(&self, audio: &DecodedAudio) -> Result<FeatureSequence> {
        tracing::info!(
            samples = audio.samples().len(),
            sample_rate = audio.sample_rate(),
            seconds = audio.duration_seconds(),
            "analysing audio"
        );
        self.extractor.extract(audio)
    }

    /// Smooths `features` and synthesizes the vase shell.
    pub fn generate(&self, features: &FeatureSequence) -> Result<TriangleMesh> {
        let smoothed = smooth_amplitudes(features, self.settings.smoothing_factor);
        let mesh = VaseSynthesizer::new(&self.settings, &self.noise)
            .synthesize(&smoothed)
            .ok_or(VaseError::EmptyInput(
                "vase synthesis requires at least one feature sample",
            ))?;

        tracing::info!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            seed = self.noise.seed(),
            "generated vase mesh"
        );
        Ok(mesh)
    }

    /// Generates the vase and, if a base is given, stacks it on the base.
    pub fn generate_with_base(
        &self,
        features: &FeatureSequence,
        base: Option<&TriangleMesh>,
    ) -> Result<TriangleMesh> {
        let vase = self.generate(features)?;
        if base.is_none() {
            return Ok(vase);
        }

        let placement = BasePlacement::for_settings(&self.settings, &self.base);
        Ok(merge_with_base(&vase, base, placement))
    }
}
