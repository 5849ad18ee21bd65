//! Test helper utilities for generating synthetic I/Q signals
#![allow(dead_code)]

use num_complex::Complex;
use std::f64::consts::PI;

/// Generate a complex tone
///
/// # Arguments
/// * `frequency` - Frequency in cycles per sample, within [-0.5, 0.5]
/// * `amplitude` - Peak amplitude
/// * `num_samples` - Number of samples to generate
pub fn complex_tone(frequency: f64, amplitude: f32, num_samples: usize) -> Vec<Complex<f32>> {
    (0..num_samples)
        .map(|n| {
            // phase is reduced in f64 so long signals keep an exact frequency
            let phase = 2.0 * PI * (frequency * n as f64).fract();
            Complex::new(
                amplitude * phase.cos() as f32,
                amplitude * phase.sin() as f32,
            )
        })
        .collect()
}

/// Generate a complex tone as interleaved I/Q bytes (format: Cu8)
pub fn complex_tone_cu8(frequency: f64, num_samples: usize) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(num_samples * 2);
    for s in complex_tone(frequency, 1.0, num_samples) {
        // Convert from [-1, 1] to [0, 255] for Cu8 format
        buffer.push(((s.re + 1.0) * 127.5).round() as u8);
        buffer.push(((s.im + 1.0) * 127.5).round() as u8);
    }
    buffer
}

/// Generate a complex tone as interleaved I/Q bytes (format: Cs16, little-endian)
pub fn complex_tone_cs16(frequency: f64, num_samples: usize) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(num_samples * 4);
    for s in complex_tone(frequency, 1.0, num_samples) {
        buffer.extend_from_slice(&((s.re * 32767.0) as i16).to_le_bytes());
        buffer.extend_from_slice(&((s.im * 32767.0) as i16).to_le_bytes());
    }
    buffer
}

/// Generate a complex tone as interleaved I/Q bytes (format: Cf32, little-endian)
pub fn complex_tone_cf32(frequency: f64, num_samples: usize) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(num_samples * 8);
    fastddc::write_cf32(&complex_tone(frequency, 1.0, num_samples), &mut buffer);
    buffer
}

/// Root mean square magnitude
pub fn rms(samples: &[Complex<f32>]) -> f32 {
    let power: f64 = samples.iter().map(|s| s.norm_sqr() as f64).sum();
    (power / samples.len() as f64).sqrt() as f32
}

/// Average phase increment between consecutive samples, in radians
pub fn mean_phase_step(samples: &[Complex<f32>]) -> f64 {
    let acc: Complex<f64> = samples
        .windows(2)
        .map(|w| {
            let d = w[1] * w[0].conj();
            Complex::new(d.re as f64, d.im as f64)
        })
        .sum();
    acc.arg()
}

/// Write `bytes` to a fresh file in the system temporary directory
pub fn temp_file(name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("fastddc_{}_{}", std::process::id(), name));
    std::fs::write(&path, bytes).expect("Failed to write test file");
    path
}
