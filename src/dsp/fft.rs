//! FFT plans with owned, preallocated buffers.
//!
//! An [`FftPlan`] bundles a `rustfft` transform with its input, output and
//! scratch buffers, so that executing it never allocates. Transforms are
//! unnormalized in both directions.
//!
//! # Example
//!
//! ```
//! use fastddc::dsp::fft::{FftDirection, FftPlan};
//! use num_complex::Complex;
//!
//! let mut plan = FftPlan::new(8, FftDirection::Forward);
//! plan.input_mut().fill(Complex::new(1.0, 0.0));
//! plan.execute();
//! assert_eq!(plan.output()[0], Complex::new(8.0, 0.0));
//! ```

use std::fmt;
use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Direction, Fft, FftPlanner};

pub use rustfft::FftDirection;

/// A planned transform of a fixed size and direction.
pub struct FftPlan {
    fft: Arc<dyn Fft<f32>>,
    input: Vec<Complex<f32>>,
    output: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl FftPlan {
    /// Plan a transform of `size` points.
    ///
    /// # Panics
    ///
    /// Panics if `size` is 0.
    pub fn new(size: usize, direction: FftDirection) -> Self {
        let mut planner = FftPlanner::new();
        Self::with_planner(&mut planner, size, direction)
    }

    /// Plan a transform reusing an existing planner (and its cached twiddles).
    pub fn with_planner(
        planner: &mut FftPlanner<f32>,
        size: usize,
        direction: FftDirection,
    ) -> Self {
        assert!(size > 0, "FFT size must be greater than 0");
        let fft = planner.plan_fft(size, direction);
        let scratch_len = fft.get_outofplace_scratch_len();
        Self {
            fft,
            input: vec![Complex::new(0.0, 0.0); size],
            output: vec![Complex::new(0.0, 0.0); size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
        }
    }

    /// Transform size.
    pub fn size(&self) -> usize {
        self.input.len()
    }

    /// Transform direction.
    pub fn direction(&self) -> FftDirection {
        self.fft.fft_direction()
    }

    /// Buffer read by [`FftPlan::execute`].
    pub fn input_mut(&mut self) -> &mut [Complex<f32>] {
        &mut self.input
    }

    /// Buffer written by [`FftPlan::execute`].
    pub fn output(&self) -> &[Complex<f32>] {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut [Complex<f32>] {
        &mut self.output
    }

    /// Transform the input buffer into the output buffer.
    ///
    /// The input buffer is used as working memory and its content is
    /// unspecified afterwards.
    pub fn execute(&mut self) {
        self.fft
            .process_outofplace_with_scratch(&mut self.input, &mut self.output, &mut self.scratch);
    }
}

impl fmt::Debug for FftPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftPlan")
            .field("size", &self.size())
            .field("direction", &self.direction())
            .finish()
    }
}

/// Exchange the first and second halves of `io`.
///
/// Moves the zero-frequency bin of a transform to the centre, and back.
///
/// # Panics
///
/// Panics if `io` has an odd length.
pub fn swap_sides(io: &mut [Complex<f32>]) {
    assert!(io.len() % 2 == 0, "Cannot swap sides of an odd-length buffer");
    let (first, second) = io.split_at_mut(io.len() / 2);
    first.swap_with_slice(second);
}
