//! WAV decoding and channel reduction.

use std::io::Read;
use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::config::{ChannelPolicy, IngestConfig};
use crate::error::IngestError;
use crate::types::AudioClip;

/// Decode a WAV stream into a mono clip.
///
/// Integer samples are scaled by `2^(bits - 1)`; 32-bit float samples are
/// taken as is.
pub(crate) fn decode<R: Read>(
    reader: WavReader<R>,
    path: &Path,
    cfg: &IngestConfig,
) -> Result<AudioClip, IngestError> {
    let spec = reader.spec();
    let unsupported = |detail: String| IngestError::UnsupportedFormat {
        path: path.to_path_buf(),
        detail,
    };
    if spec.channels == 0 {
        return Err(unsupported("zero channels".into()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => {
            if spec.bits_per_sample != 32 {
                return Err(unsupported(format!(
                    "{}-bit float samples",
                    spec.bits_per_sample
                )));
            }
            reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| IngestError::wav(path, e))?
        }
        SampleFormat::Int => {
            if !(1..=32).contains(&spec.bits_per_sample) {
                return Err(unsupported(format!(
                    "{}-bit integer samples",
                    spec.bits_per_sample
                )));
            }
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| IngestError::wav(path, e))?
        }
    };

    let samples = to_mono(&interleaved, usize::from(spec.channels), cfg.channel_policy);
    if samples.is_empty() {
        return Err(IngestError::EmptyAudio {
            path: path.to_path_buf(),
        });
    }

    Ok(AudioClip {
        source: path.to_string_lossy().into_owned(),
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Reduce interleaved frames to one channel. A trailing partial frame is dropped.
pub fn to_mono(interleaved: &[f32], channels: usize, policy: ChannelPolicy) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    let frames = interleaved.chunks_exact(channels);
    match policy {
        ChannelPolicy::First => frames.map(|frame| frame[0]).collect(),
        ChannelPolicy::Downmix => frames
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passthrough() {
        let samples = [0.1, -0.2, 0.3];
        assert_eq!(to_mono(&samples, 1, ChannelPolicy::Downmix), samples.to_vec());
    }

    #[test]
    fn first_channel_and_downmix() {
        let stereo = [1.0, 0.0, 0.5, -0.5, 0.25, 0.75];
        assert_eq!(to_mono(&stereo, 2, ChannelPolicy::First), vec![1.0, 0.5, 0.25]);
        assert_eq!(to_mono(&stereo, 2, ChannelPolicy::Downmix), vec![0.5, 0.0, 0.5]);
    }

    #[test]
    fn partial_frame_is_dropped() {
        let samples = [0.1, 0.2, 0.3, 0.4, 0.5];
        assert_eq!(to_mono(&samples, 2, ChannelPolicy::First), vec![0.1, 0.3]);
    }
}
