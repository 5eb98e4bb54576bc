//! Mono WAV files exchanged with the core's `render` tool.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::Result;

/// Writes `samples` as a mono 32-bit float WAV.
pub fn write_mono(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Reads the first channel of a WAV file.
///
/// Integer PCM is scaled into `[-1, 1)`.
///
/// # Returns
/// The samples and the file's sample rate.
pub fn read_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<hound::Result<_>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<hound::Result<_>>()?
        }
    };

    let samples = interleaved.into_iter().step_by(channels).collect();
    Ok((samples, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_samples_survive_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.wav");
        let samples = [0.0, 0.25, -0.5, 1.0e-7, -1.0];

        write_mono(&path, &samples, 48_000).unwrap();
        let (read, rate) = read_mono(&path).unwrap();

        assert_eq!(rate, 48_000);
        assert_eq!(read, samples);
    }

    #[test]
    fn int_samples_are_normalized_and_first_channel_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo16.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(&path, spec).unwrap();
        for (l, r) in [(16_384i16, 1i16), (-32_768, 2)] {
            writer.write_sample(l).unwrap();
            writer.write_sample(r).unwrap();
        }
        writer.finalize().unwrap();

        let (read, rate) = read_mono(&path).unwrap();
        assert_eq!(rate, 44_100);
        assert_eq!(read, [0.5, -1.0]);
    }
}
