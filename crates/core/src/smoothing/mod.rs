use crate::{AudioFeatureSample, FeatureSequence};

/// Upper bound (inclusive after clamping) for the smoothing factor. At 0.5
/// the centre tap weight reaches zero.
pub const MAX_SMOOTHING_FACTOR: f32 = 0.5;

/// Runs one pass of a symmetric 3-tap low-pass over the amplitude channel.
///
/// Interior samples become `f·a[i-1] + (1-2f)·a[i] + f·a[i+1]`, computed from
/// the unfiltered input. The first and last samples are copied unchanged, as
/// are the centroid and time channels. Calling this twice filters twice,
/// which is not the same as raising `factor`.
pub fn smooth_amplitudes(features: &FeatureSequence, factor: f32) -> FeatureSequence {
    let factor = clamp_factor(factor);
    let source = features.as_slice();
    let len = source.len();

    if factor == 0.0 || len < 3 {
        return features.clone();
    }

    let centre = 1.0 - 2.0 * factor;
    source
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            if index == 0 || index == len - 1 {
                return *sample;
            }

            let amplitude = factor * source[index - 1].amplitude
                + centre * sample.amplitude
                + factor * source[index + 1].amplitude;
            AudioFeatureSample {
                amplitude,
                ..*sample
            }
        })
        .collect()
}

fn clamp_factor(factor: f32) -> f32 {
    if factor.is_nan() {
        0.0
    } else {
        factor.clamp(0.0, MAX_SMOOTHING_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(amplitudes: &[f32]) -> FeatureSequence {
        amplitudes
            .iter()
            .enumerate()
            .map(|(index, amplitude)| AudioFeatureSample {
                amplitude: *amplitude,
                frequency_centroid: 100.0 * index as f32,
                time: 0.1 * index as f32,
            })
            .collect()
    }

    #[test]
    fn zero_factor_is_identity() {
        let input = sequence(&[0.1, 0.9, 0.3, 0.7, 0.2]);
        assert_eq!(smooth_amplitudes(&input, 0.0), input);
    }

    #[test]
    fn endpoints_pass_through() {
        let input = sequence(&[0.4, 1.0, 0.0, 1.0, 0.8]);
        for factor in [0.1, 0.25, 0.49] {
            let output = smooth_amplitudes(&input, factor);
            assert_eq!(output[0].amplitude, 0.4);
            assert_eq!(output[4].amplitude, 0.8);
        }
    }

    #[test]
    fn filters_interior_from_unfiltered_neighbours() {
        let input = sequence(&[0.0, 1.0, 0.0, 0.0]);
        let output = smooth_amplitudes(&input, 0.25);

        assert!((output[1].amplitude - 0.5).abs() < 1e-6);
        // Uses the original 1.0 at index 1, not the filtered 0.5.
        assert!((output[2].amplitude - 0.25).abs() < 1e-6);
    }

    #[test]
    fn leaves_centroid_and_time_untouched() {
        let input = sequence(&[0.2, 0.6, 0.1]);
        let output = smooth_amplitudes(&input, 0.3);

        for (before, after) in input.iter().zip(output.iter()) {
            assert_eq!(before.frequency_centroid, after.frequency_centroid);
            assert_eq!(before.time, after.time);
        }
    }

    #[test]
    fn second_pass_differs_from_first() {
        let input = sequence(&[0.0, 0.0, 1.0, 0.0, 0.0]);
        let once = smooth_amplitudes(&input, 0.2);
        let twice = smooth_amplitudes(&once, 0.2);

        assert_eq!(once.len(), twice.len());
        assert!((once[2].amplitude - twice[2].amplitude).abs() > 1e-3);
    }

    #[test]
    fn out_of_range_factor_is_clamped() {
        let input = sequence(&[0.0, 1.0, 0.0]);
        assert_eq!(smooth_amplitudes(&input, -1.0), input);
        assert_eq!(smooth_amplitudes(&input, 3.0)[1].amplitude, 0.0);
    }
}
