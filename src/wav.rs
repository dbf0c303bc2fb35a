//! Data-link streams as WAV files
//!
//! A mono 32-bit float WAV holds the channel samples bit for bit, so a
//! recorded link can be replayed into a receiver later.

use anyhow::{anyhow, Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

fn stream_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    }
}

/// Encodes channel samples as WAV bytes
pub fn encode_stream(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let mut wav = vec![];
    let mut cursor = std::io::Cursor::new(&mut wav);

    let mut wav_writer =
        WavWriter::new(&mut cursor, stream_spec(sample_rate)).context("creating WAV writer")?;

    for sample in samples {
        wav_writer.write_sample(*sample)?;
    }

    wav_writer.finalize().context("finalizing WAV stream")?;

    Ok(wav)
}

/// Decodes WAV bytes written by [`encode_stream`] back to channel samples.
///
/// Only mono 32-bit float files are accepted; anything else would not carry
/// the sentinels intact.
pub fn decode_stream(bytes: &[u8]) -> Result<Vec<f32>> {
    let reader = WavReader::new(std::io::Cursor::new(bytes)).context("reading WAV header")?;
    let spec = reader.spec();
    if spec.channels != 1 || spec.bits_per_sample != 32 || spec.sample_format != SampleFormat::Float {
        return Err(anyhow!(
            "expected mono 32-bit float WAV, got {} channel(s) of {}-bit {:?}",
            spec.channels,
            spec.bits_per_sample,
            spec.sample_format
        ));
    }

    reader
        .into_samples::<f32>()
        .collect::<std::result::Result<Vec<f32>, _>>()
        .context("reading WAV samples")
}

/// Sample rate stored in a WAV header
pub fn stream_sample_rate(bytes: &[u8]) -> Result<u32> {
    let reader = WavReader::new(std::io::Cursor::new(bytes)).context("reading WAV header")?;
    Ok(reader.spec().sample_rate)
}
