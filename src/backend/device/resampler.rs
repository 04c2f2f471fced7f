//! Rubato-based resampling of decoded mono PCM to the device rate.

use crate::error::{Result, SusurrusError};
use rubato::{FftFixedIn, Resampler};

const CHUNK_SIZE: usize = 1024;

/// Resamples mono samples from `source_rate` to `target_rate`.
///
/// Input is processed in fixed chunks; the final chunk is zero-padded, so
/// the output may carry a short silent tail.
pub(crate) fn resample_mono(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    if source_rate == target_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if source_rate == 0 || target_rate == 0 {
        return Err(SusurrusError::Resample(
            "sample rates must be greater than 0".to_owned(),
        ));
    }

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        CHUNK_SIZE,
        2, // sub_chunks
        1, // mono
    )
    .map_err(|e| SusurrusError::Resample(format!("failed to create resampler: {e}")))?;

    let mut output = Vec::with_capacity(
        (samples.len() as f64 * target_rate as f64 / source_rate as f64) as usize + CHUNK_SIZE,
    );
    for chunk in samples.chunks(CHUNK_SIZE) {
        let mut input = vec![0.0f32; CHUNK_SIZE];
        input[..chunk.len()].copy_from_slice(chunk);
        let waves = resampler
            .process(&[input], None)
            .map_err(|e| SusurrusError::Resample(e.to_string()))?;
        if let Some(channel) = waves.first() {
            output.extend_from_slice(channel);
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_rates_pass_through() {
        let samples = vec![0.1, 0.2, 0.3, 0.4];
        assert_eq!(resample_mono(&samples, 44100, 44100).unwrap(), samples);
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert!(resample_mono(&[0.0; 8], 0, 48000).is_err());
        assert!(resample_mono(&[0.0; 8], 48000, 0).is_err());
    }

    #[test]
    fn halving_the_rate_roughly_halves_the_length() {
        let samples = vec![0.0f32; 4096];
        let output = resample_mono(&samples, 48000, 24000).unwrap();
        let ratio = output.len() as f32 / samples.len() as f32;
        assert!((ratio - 0.5).abs() < 0.1, "ratio {ratio}");
    }
}
