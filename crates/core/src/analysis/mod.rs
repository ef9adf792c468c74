use std::{ops::Index, slice};

use serde::{Deserialize, Serialize};

use crate::{DecodedAudio, Result, VaseError};

/// Default analysis window length in seconds.
pub const DEFAULT_SEGMENT_SECONDS: f32 = 0.1;

/// Representation of the feature set for a single analysis segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatureSample {
    /// Root-mean-square loudness of the segment.
    pub amplitude: f32,
    /// Magnitude-weighted mean frequency proxy in Hz.
    pub frequency_centroid: f32,
    /// Start of the segment in seconds.
    pub time: f32,
}

/// Ordered, gap-free run of [`AudioFeatureSample`]s, one per segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSequence {
    samples: Vec<AudioFeatureSample>,
}

impl FeatureSequence {
    pub fn new(samples: Vec<AudioFeatureSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AudioFeatureSample> {
        self.samples.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, AudioFeatureSample> {
        self.samples.iter()
    }

    pub fn as_slice(&self) -> &[AudioFeatureSample] {
        &self.samples
    }
}

impl Index<usize> for FeatureSequence {
    type Output = AudioFeatureSample;

    fn index(&self, index: usize) -> &Self::Output {
        &self.samples[index]
    }
}

impl<'a> IntoIterator for &'a FeatureSequence {
    type Item = &'a AudioFeatureSample;
    type IntoIter = slice::Iter<'a, AudioFeatureSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl FromIterator<AudioFeatureSample> for FeatureSequence {
    fn from_iter<I: IntoIterator<Item = AudioFeatureSample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Splits a decoded signal into fixed-length segments and measures loudness
/// and brightness for each of them.
///
/// The brightness measure is deliberately cheap: the position of a sample
/// inside its window stands in for a frequency bin, so no transform is run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureExtractor {
    segment_seconds: f32,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            segment_seconds: DEFAULT_SEGMENT_SECONDS,
        }
    }
}

impl FeatureExtractor {
    /// Creates an extractor using the default 100 ms segments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor with an explicit segment length in seconds.
    pub fn with_segment_seconds(segment_seconds: f32) -> Result<Self> {
        if !segment_seconds.is_finite() || segment_seconds <= 0.0 {
            return Err(VaseError::InvalidInput(
                "segment duration must be a positive number of seconds",
            ));
        }

        Ok(Self { segment_seconds })
    }

    pub fn segment_seconds(&self) -> f32 {
        self.segment_seconds
    }

    /// Number of samples per full segment at `sample_rate`.
    pub fn segment_len(&self, sample_rate: u32) -> usize {
        // An f32 duration is off by up to half an ulp (~6e-8 relative), so a
        // product within that of an integer is that integer.
        let exact = f64::from(self.segment_seconds) * f64::from(sample_rate);
        let nearest = exact.round();
        let len = if (exact - nearest).abs() <= exact * 1e-7 {
            nearest
        } else {
            exact.floor()
        };
        (len as usize).max(1)
    }

    /// Consumes a decoded buffer and produces one feature sample per segment.
    /// A trailing partial segment is measured over the samples it has.
    pub fn extract(&self, audio: &DecodedAudio) -> Result<FeatureSequence> {
        if audio.is_empty() {
            return Err(VaseError::EmptyInput(
                "feature extraction requires at least one sample",
            ));
        }

        let sample_rate = audio.sample_rate();
        let segment_len = self.segment_len(sample_rate);
        let nyquist = sample_rate as f32 * 0.5;

        let features: FeatureSequence = audio
            .samples()
            .chunks(segment_len)
            .enumerate()
            .map(|(segment, window)| AudioFeatureSample {
                amplitude: compute_rms(window),
                frequency_centroid: approximate_centroid(window, nyquist),
                time: (segment * segment_len) as f32 / sample_rate as f32,
            })
            .collect();

        tracing::debug!(
            segments = features.len(),
            segment_len,
            sample_rate,
            "extracted audio features"
        );
        Ok(features)
    }
}

fn compute_rms(samples: &[f32]) -> f32 {
    let sum: f32 = samples.iter().map(|sample| sample * sample).sum();
    (sum / samples.len() as f32).sqrt()
}

fn approximate_centroid(window: &[f32], nyquist: f32) -> f32 {
    let len = window.len() as f32;
    let mut magnitude_sum = 0.0;
    let mut weighted_sum = 0.0;

    for (index, sample) in window.iter().enumerate() {
        let magnitude = sample.abs();
        let bin_hz = (index as f32 / len) * nyquist;
        magnitude_sum += magnitude;
        weighted_sum += magnitude * bin_hz;
    }

    if magnitude_sum == 0.0 {
        0.0
    } else {
        weighted_sum / magnitude_sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn audio(samples: Vec<f32>, sample_rate: u32) -> DecodedAudio {
        DecodedAudio::new(samples, sample_rate).unwrap()
    }

    #[test]
    fn silent_second_yields_ten_zero_segments() {
        let features = FeatureExtractor::new()
            .extract(&audio(vec![0.0; 44_100], 44_100))
            .unwrap();

        assert_eq!(features.len(), 10);
        for sample in &features {
            assert_eq!(sample.amplitude, 0.0);
            assert_eq!(sample.frequency_centroid, 0.0);
        }
    }

    #[test]
    fn keeps_trailing_partial_segment() {
        let extractor = FeatureExtractor::with_segment_seconds(0.1).unwrap();
        // 10 samples per segment, 25 samples total.
        let features = extractor.extract(&audio(vec![0.5; 25], 100)).unwrap();

        assert_eq!(features.len(), 3);
        assert!((features[2].amplitude - 0.5).abs() < 1e-6);
        assert!((features[2].time - 0.2).abs() < 1e-6);
    }

    #[test]
    fn times_are_contiguous() {
        let features = FeatureExtractor::new()
            .extract(&audio(vec![0.25; 1_000], 1_000))
            .unwrap();

        for (index, sample) in features.iter().enumerate() {
            assert!((sample.time - index as f32 * 0.1).abs() < 1e-5);
        }
    }

    #[test]
    fn rms_of_constant_signal_is_its_magnitude() {
        let features = FeatureExtractor::new()
            .extract(&audio(vec![-0.75; 100], 100))
            .unwrap();

        assert_eq!(features.len(), 10);
        assert!((features[0].amplitude - 0.75).abs() < 1e-6);
    }

    #[test]
    fn centroid_uses_window_position_as_frequency() {
        // Four samples per segment at 8 Hz: bins are 0, 1, 2 and 3 Hz.
        let extractor = FeatureExtractor::with_segment_seconds(0.5).unwrap();
        let features = extractor
            .extract(&audio(vec![0.0, 0.0, 0.0, 1.0], 8))
            .unwrap();

        assert_eq!(features.len(), 1);
        assert!((features[0].frequency_centroid - 3.0).abs() < 1e-6);

        let features = extractor
            .extract(&audio(vec![1.0, 1.0, 1.0, 1.0], 8))
            .unwrap();
        assert!((features[0].frequency_centroid - 1.5).abs() < 1e-6);
    }

    #[test]
    fn rejects_empty_audio() {
        let err = FeatureExtractor::new()
            .extract(&audio(Vec::new(), 44_100))
            .unwrap_err();
        assert!(matches!(err, VaseError::EmptyInput(_)));
    }

    #[test]
    fn rejects_non_positive_segments() {
        assert!(FeatureExtractor::with_segment_seconds(0.0).is_err());
        assert!(FeatureExtractor::with_segment_seconds(f32::NAN).is_err());
    }

    #[test]
    fn long_segments_keep_exact_sample_count() {
        let extractor = FeatureExtractor::with_segment_seconds(0.7).unwrap();
        assert_eq!(extractor.segment_len(192_000), 134_400);

        let features = extractor
            .extract(&audio(vec![0.1; 2 * 134_400], 192_000))
            .unwrap();
        assert_eq!(features.len(), 2);
    }

    proptest! {
        #[test]
        fn segment_count_matches_buffer_length(
            samples in prop::collection::vec(-1.0f32..1.0, 1..6_000),
            sample_rate in prop::sample::select(vec![
                8_000u32, 11_025, 16_000, 22_050, 44_100, 48_000, 96_000, 192_000,
            ]),
            segment_ms in 1u32..2_000,
        ) {
            let extractor =
                FeatureExtractor::with_segment_seconds(segment_ms as f32 / 1_000.0).unwrap();
            let segment_len =
                ((u64::from(sample_rate) * u64::from(segment_ms)) / 1_000).max(1) as usize;
            prop_assert_eq!(extractor.segment_len(sample_rate), segment_len);

            let total = samples.len();
            let features = extractor.extract(&audio(samples, sample_rate)).unwrap();
            let expected = total / segment_len + usize::from(total % segment_len != 0);
            prop_assert_eq!(features.len(), expected);
            prop_assert!(features.iter().all(|sample| sample.amplitude >= 0.0));
        }
    }
}
