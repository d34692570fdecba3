//! Audio file I/O for Gelang
//!
//! Only the WAV header is needed: the headless provider derives the clip
//! duration from it. Samples are never decoded for classification; the
//! server receives the original bytes.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{GelangError, Result};

/// Header facts about a WAV clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    /// Frames per channel
    pub frames: u32,
    pub duration_secs: f64,
}

/// Read the header of an in-memory WAV file
///
/// # Errors
/// * `InvalidAudio` - If the bytes are not a readable WAV file
/// * `InvalidAudio` - If the header reports a zero sample rate
pub fn probe_wav(bytes: &[u8]) -> Result<WavInfo> {
    let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| GelangError::InvalidAudio {
        reason: format!("Failed to read WAV header: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(GelangError::InvalidAudio {
            reason: "WAV header reports a sample rate of 0".to_string(),
            source: None,
        });
    }

    let frames = reader.duration();
    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        frames,
        duration_secs: frames as f64 / spec.sample_rate as f64,
    })
}

/// Generate a mono 16-bit 440 Hz test clip as WAV bytes
///
/// # Arguments
/// * `duration_secs` - Length of the clip
/// * `sample_rate` - Sample rate in Hz
pub fn generate_test_clip(duration_secs: f64, sample_rate: u32) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let num_samples = (duration_secs * sample_rate as f64).round() as usize;
    let angular_freq = 2.0 * std::f64::consts::PI * 440.0 / sample_rate as f64;

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).map_err(wav_write_error)?;
        for i in 0..num_samples {
            let sample = (angular_freq * i as f64).sin() * 0.5 * i16::MAX as f64;
            writer
                .write_sample(sample as i16)
                .map_err(wav_write_error)?;
        }
        writer.finalize().map_err(wav_write_error)?;
    }
    Ok(cursor.into_inner())
}

fn wav_write_error(e: hound::Error) -> GelangError {
    GelangError::InvalidAudio {
        reason: format!("Failed to write WAV data: {}", e),
        source: Some(Box::new(e)),
    }
}
