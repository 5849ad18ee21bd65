//! Decimating fine-phase rotation.
//!
//! The frequency-domain stage can only shift by whole multiples of its bin
//! granularity and only decimates by a power of two. [`DecimatingShift`]
//! finishes the job in the time domain: it keeps every `decimation`-th sample
//! and rotates it by the residual (sub-bin) frequency.
//!
//! Phase and decimation position are carried across calls in a
//! [`ShiftStatus`], so consecutive blocks must be processed in the order they
//! were sampled.
//!
//! # Example
//!
//! ```
//! use fastddc::dsp::rotate::DecimatingShift;
//! use num_complex::Complex;
//!
//! let shift = DecimatingShift::new(0.01, 2);
//! let input = vec![Complex::new(1.0, 0.0); 10];
//! let mut output = vec![Complex::new(0.0, 0.0); 5];
//! let status = shift.process(&input, &mut output, shift.init());
//! assert_eq!(status.output_size, 5);
//! ```

use std::f64::consts::PI;

use num_complex::Complex;

/// Continuity state of a [`DecimatingShift`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShiftStatus {
    /// Phase of the next output sample, in radians within (-π, π]
    pub starting_phase: f64,
    /// Index of the next input sample to keep in the following block
    pub decimation_remain: usize,
    /// Number of samples produced by the last call
    pub output_size: usize,
}

/// Keeps every `decimation`-th sample and rotates it by `rate` cycles per
/// input sample.
#[derive(Debug, Clone, Copy)]
pub struct DecimatingShift {
    /// Phase increment per output sample, in radians
    step: f64,
    /// Per-output-sample rotation multiplier
    delta: Complex<f64>,
    decimation: usize,
}

impl DecimatingShift {
    /// Create a new decimating shift.
    ///
    /// # Arguments
    /// * `rate` - Frequency shift in cycles per input sample
    /// * `decimation` - Keep one sample out of `decimation`
    ///
    /// # Panics
    /// Panics if `decimation` is 0.
    pub fn new(rate: f64, decimation: usize) -> Self {
        assert!(decimation > 0, "Decimation factor must be greater than 0");
        let step = 2.0 * PI * rate * decimation as f64;
        Self {
            step,
            delta: Complex::new(step.cos(), step.sin()),
            decimation,
        }
    }

    /// Initial continuity state.
    pub fn init(&self) -> ShiftStatus {
        ShiftStatus::default()
    }

    /// Returns the decimation factor.
    pub fn decimation(&self) -> usize {
        self.decimation
    }

    /// Number of samples [`DecimatingShift::process`] writes for `input_len`
    /// input samples under `status`.
    pub fn output_len(&self, input_len: usize, status: &ShiftStatus) -> usize {
        input_len
            .saturating_sub(status.decimation_remain)
            .div_ceil(self.decimation)
    }

    /// Decimate and rotate `input` into `output`.
    ///
    /// Returns the state for the next block, whose `output_size` is the number
    /// of samples written to the front of `output`.
    ///
    /// # Panics
    /// Panics if `output` cannot hold [`DecimatingShift::output_len`] samples.
    pub fn process(
        &self,
        input: &[Complex<f32>],
        output: &mut [Complex<f32>],
        status: ShiftStatus,
    ) -> ShiftStatus {
        let count = self.output_len(input.len(), &status);
        assert!(
            output.len() >= count,
            "Output buffer too small: {} < {}",
            output.len(),
            count
        );

        let mut rot = Complex::new(status.starting_phase.cos(), status.starting_phase.sin());
        let mut i = status.decimation_remain;
        for out in output[..count].iter_mut() {
            let x = input[i];
            *out = Complex::new(
                (rot.re * x.re as f64 - rot.im * x.im as f64) as f32,
                (rot.im * x.re as f64 + rot.re * x.im as f64) as f32,
            );
            rot *= self.delta;
            i += self.decimation;
        }

        ShiftStatus {
            starting_phase: wrap_phase(status.starting_phase + self.step * count as f64),
            decimation_remain: i - input.len(),
            output_size: count,
        }
    }
}

/// Wrap `phase` into (-π, π].
fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase - 2.0 * PI * (phase / (2.0 * PI)).round();
    if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
}
