//! FIR filter design.
//!
//! This module provides the windowed-sinc designs used by the channelizer:
//! - [`filter_len`]: minimal number of taps for a given transition bandwidth
//! - [`lowpass_f`]: real, symmetric low-pass taps
//! - [`bandpass_c`]: complex band-pass taps (a low-pass shifted in frequency)
//!
//! All frequencies are normalized to the sample rate (Nyquist = 0.5).
//!
//! # Example
//!
//! ```
//! use fastddc::dsp::firdes::{self, Window};
//! use num_complex::Complex;
//!
//! let len = firdes::filter_len(0.05);
//! assert_eq!(len, 81);
//!
//! // Pass [-0.1, 0.0], centred on -0.05
//! let mut taps = vec![Complex::new(0.0, 0.0); len];
//! firdes::bandpass_c(&mut taps, -0.1, 0.0, Window::Hamming);
//! ```

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use num_complex::Complex;

use crate::error::Error;

/// Window functions applied to the ideal sinc response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// Rectangular window (no tapering)
    Boxcar,
    /// Blackman window: better stopband attenuation, wider transition band
    Blackman,
    /// Hamming window
    #[default]
    Hamming,
}

impl Window {
    /// Evaluate the window at `rate`, from -1 (first tap) through 0 (centre tap)
    /// to 1 (last tap).
    pub fn kernel(self, rate: f64) -> f64 {
        let x = 0.5 + rate / 2.0;
        match self {
            Window::Boxcar => 1.0,
            Window::Blackman => {
                0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
            }
            Window::Hamming => 0.54 - 0.46 * (2.0 * PI * x).cos(),
        }
    }
}

impl FromStr for Window {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "boxcar" => Ok(Window::Boxcar),
            "blackman" => Ok(Window::Blackman),
            "hamming" => Ok(Window::Hamming),
            _ => Err(Error::format(format!("Unsupported window: {}", s))),
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Window::Boxcar => "boxcar",
            Window::Blackman => "blackman",
            Window::Hamming => "hamming",
        };
        f.write_str(name)
    }
}

/// Minimal number of taps achieving `transition_bw`.
///
/// Uses the `4 / transition_bw` rule of thumb, rounded up to an odd count so the
/// filter is symmetric around a centre tap.
///
/// # Example
///
/// ```
/// use fastddc::dsp::firdes::filter_len;
///
/// assert_eq!(filter_len(0.05), 81);
/// assert_eq!(filter_len(0.1), 41);
/// ```
pub fn filter_len(transition_bw: f32) -> usize {
    let result = (4.0 / transition_bw) as usize;
    if result % 2 == 0 { result + 1 } else { result }
}

/// Design a real low-pass filter into `output`.
///
/// The filter is a windowed sinc with linear phase (symmetric impulse response),
/// normalized to unity gain at DC.
///
/// # Arguments
///
/// * `output` - Tap buffer; its length is the number of taps and must be odd
/// * `cutoff_rate` - Cutoff frequency divided by the sample rate
/// * `window` - Window function
///
/// # Panics
///
/// Panics if `output` has an even length.
pub fn lowpass_f(output: &mut [f32], cutoff_rate: f32, window: Window) {
    let length = output.len();
    assert!(length % 2 == 1, "Filter length must be odd");

    let cutoff = cutoff_rate as f64;
    let middle = length / 2;
    output[middle] = (2.0 * PI * cutoff * window.kernel(0.0)) as f32;
    for i in 1..=middle {
        let tap = (2.0 * PI * cutoff * i as f64).sin() / i as f64
            * window.kernel(i as f64 / middle as f64);
        output[middle - i] = tap as f32;
        output[middle + i] = tap as f32;
    }

    // Normalize to unity gain
    let norm: f32 = output.iter().sum();
    for v in output.iter_mut() {
        *v /= norm;
    }
}

/// Design a complex band-pass filter into `output`.
///
/// A real low-pass of half-width `(high_cut - low_cut) / 2` is modulated to the
/// centre of the band, which yields complex taps with unity gain at
/// `(low_cut + high_cut) / 2`. Cutoffs may be negative.
///
/// # Panics
///
/// Panics if `output` has an even length.
pub fn bandpass_c(output: &mut [Complex<f32>], low_cut: f32, high_cut: f32, window: Window) {
    let half_width = (high_cut - low_cut) / 2.0;
    let mut realtaps = vec![0.0f32; output.len()];
    lowpass_f(&mut realtaps, half_width, window);

    let fmiddle = (half_width + low_cut) as f64;
    for (i, (out, &tap)) in output.iter_mut().zip(realtaps.iter()).enumerate() {
        let phase = 2.0 * PI * fmiddle * i as f64;
        *out = Complex::new((phase.cos() as f32) * tap, (phase.sin() as f32) * tap);
    }
}
