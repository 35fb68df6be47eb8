//! WAV decoding
//!
//! Decodes sample files into planar channels, then shapes them for the
//! engine: mono for kick/noise banks, interleaved for impulse responses.

use std::io::Cursor;

use hound::{SampleFormat, WavReader};

use crate::error::{KicklabError, Result};

/// Decoded audio, one `Vec` per channel
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Average all channels into one
    pub fn into_mono(self) -> Vec<f32> {
        let count = self.channels.len();
        let mut channels = self.channels.into_iter();
        let Some(mut mono) = channels.next() else {
            return Vec::new();
        };
        if count == 1 {
            return mono;
        }
        for channel in channels {
            for (acc, sample) in mono.iter_mut().zip(channel) {
                *acc += sample;
            }
        }
        let scale = 1.0 / count as f32;
        for sample in &mut mono {
            *sample *= scale;
        }
        mono
    }

    /// Interleave channels frame by frame (`L R L R ...`)
    pub fn into_interleaved(self) -> Vec<f32> {
        let frames = self.len();
        let channels = self.channels.len();
        if channels == 1 {
            return self.channels.into_iter().next().unwrap_or_default();
        }
        let mut out = Vec::with_capacity(frames * channels);
        for frame in 0..frames {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }
}

/// Decode WAV bytes (integer or float PCM)
pub fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio> {
    let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| KicklabError::Decode {
        reason: e.to_string(),
    })?;
    let spec = reader.spec();
    let num_channels = usize::from(spec.channels);
    if num_channels == 0 {
        return Err(KicklabError::Decode {
            reason: "file has no channels".to_string(),
        });
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>(),
        SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()
        }
    }
    .map_err(|e| KicklabError::Decode {
        reason: e.to_string(),
    })?;

    let frames = interleaved.len() / num_channels;
    let mut channels = vec![Vec::with_capacity(frames); num_channels];
    for frame in interleaved.chunks_exact(num_channels) {
        for (channel, sample) in channels.iter_mut().zip(frame) {
            channel.push(*sample);
        }
    }

    Ok(DecodedAudio {
        sample_rate: spec.sample_rate,
        channels,
    })
}

/// Encode interleaved float samples as a 32-bit float WAV
///
/// Used to build fixtures for built-in banks and tests.
pub fn encode_wav(samples: &[f32], channels: u16, sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(|e| {
            KicklabError::Decode {
                reason: e.to_string(),
            }
        })?;
        for sample in samples {
            writer.write_sample(*sample).map_err(|e| KicklabError::Decode {
                reason: e.to_string(),
            })?;
        }
        writer.finalize().map_err(|e| KicklabError::Decode {
            reason: e.to_string(),
        })?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_decode_float_stereo() {
        let bytes = encode_wav(&[0.5, -0.5, 0.25, 0.75], 2, 48000).unwrap();
        let audio = decode_wav(&bytes).unwrap();

        assert_eq!(audio.sample_rate, 48000);
        assert_eq!(audio.num_channels(), 2);
        assert_eq!(audio.channels[0], vec![0.5, 0.25]);
        assert_eq!(audio.channels[1], vec![-0.5, 0.75]);
    }

    #[test]
    fn test_decode_int_pcm() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            writer.write_sample(16384_i16).unwrap();
            writer.write_sample(-32768_i16).unwrap();
            writer.finalize().unwrap();
        }
        let audio = decode_wav(&cursor.into_inner()).unwrap();

        assert_relative_eq!(audio.channels[0][0], 0.5);
        assert_relative_eq!(audio.channels[0][1], -1.0);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_wav(b"definitely not a wav file"),
            Err(KicklabError::Decode { .. })
        ));
    }

    #[test]
    fn test_mono_downmix_averages() {
        let audio = DecodedAudio {
            sample_rate: 48000,
            channels: vec![vec![0.5, 0.2], vec![0.3, -0.2]],
        };
        let mono = audio.into_mono();
        assert_relative_eq!(mono[0], 0.4);
        assert_relative_eq!(mono[1], 0.0);
    }

    #[test]
    fn test_interleave_stereo() {
        let audio = DecodedAudio {
            sample_rate: 48000,
            channels: vec![vec![1.0, 2.0, 3.0], vec![-1.0, -2.0, -3.0]],
        };
        assert_eq!(audio.into_interleaved(), vec![1.0, -1.0, 2.0, -2.0, 3.0, -3.0]);
    }
}
