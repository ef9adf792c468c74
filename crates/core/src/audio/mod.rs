use std::{fs, io::Cursor, path::Path};

use hound::{SampleFormat, WavReader};

use crate::{Result, VaseError};

/// Mono sample buffer produced by an [`AudioDecoder`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl DecodedAudio {
    /// Wraps an already decoded mono buffer.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(VaseError::InvalidInput("sample rate must be positive"));
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the buffer in seconds.
    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Turns raw container bytes into a mono sample buffer.
///
/// Decoding is the only potentially long-running step of the pipeline. It is
/// a plain blocking call; callers that need responsiveness can run it on a
/// worker thread of their choosing.
pub trait AudioDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio>;

    /// Reads `path` fully and decodes it.
    fn decode_file(&self, path: &Path) -> Result<DecodedAudio> {
        let bytes = fs::read(path)?;
        self.decode(&bytes)
    }
}

/// RIFF/WAVE decoder backed by `hound`. Integer and float PCM are accepted;
/// multi-channel input is mixed down by averaging each frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavDecoder;

impl WavDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio> {
        let reader = WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        tracing::debug!(
            channels = spec.channels,
            sample_rate = spec.sample_rate,
            bits = spec.bits_per_sample,
            format = ?spec.sample_format,
            "decoding wav stream"
        );

        if spec.channels == 0 {
            return Err(VaseError::decode("wav stream declares zero channels"));
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            SampleFormat::Int => {
                let scale = int_scale(spec.bits_per_sample);
                reader
                    .into_samples::<i32>()
                    .map(|sample| sample.map(|value| value as f32 / scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let samples = mix_to_mono(&interleaved, usize::from(spec.channels));
        DecodedAudio::new(samples, spec.sample_rate)
            .map_err(|_| VaseError::decode("wav stream declares a zero sample rate"))
    }
}

fn int_scale(bits_per_sample: u16) -> f32 {
    let bits = i32::from(bits_per_sample.clamp(1, 32));
    2f32.powi(bits - 1)
}

fn mix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn encode(spec: WavSpec, write: impl FnOnce(&mut WavWriter<&mut Cursor<Vec<u8>>>)) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            write(&mut writer);
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn decodes_int_pcm_into_unit_range() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let bytes = encode(spec, |writer| {
            writer.write_sample(0i16).unwrap();
            writer.write_sample(i16::MIN).unwrap();
            writer.write_sample(16_384i16).unwrap();
        });

        let audio = WavDecoder::new().decode(&bytes).unwrap();
        assert_eq!(audio.sample_rate(), 8_000);
        assert_eq!(audio.samples(), &[0.0, -1.0, 0.5]);
    }

    #[test]
    fn mixes_stereo_float_down_to_mono() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let bytes = encode(spec, |writer| {
            for (left, right) in [(1.0f32, 0.0f32), (0.5, 0.5), (-1.0, 1.0)] {
                writer.write_sample(left).unwrap();
                writer.write_sample(right).unwrap();
            }
        });

        let audio = WavDecoder::new().decode(&bytes).unwrap();
        assert_eq!(audio.samples(), &[0.5, 0.5, 0.0]);
    }

    #[test]
    fn rejects_garbage_bytes() {
        let err = WavDecoder::new().decode(b"definitely not a wav").unwrap_err();
        assert!(matches!(err, VaseError::Decode(_)));
    }

    #[test]
    fn zero_sample_rate_is_invalid() {
        assert!(matches!(
            DecodedAudio::new(vec![0.0], 0),
            Err(VaseError::InvalidInput(_))
        ));
    }
}
