//! Streaming down-converter.
//!
//! [`FastDdc`] wraps a [`Channelizer`] with the forward half of the
//! overlap-scrap scheme: raw samples are collected into windows of `fft_size`
//! samples, each window starting with the last `overlap_length` samples of the
//! previous one, and every full window is transformed and channelized.
//!
//! The history starts as zeros, so the first `scrap` output samples or so carry
//! the filter's start transient.
//!
//! # Example
//!
//! ```
//! use fastddc::dsp::DspBlock;
//! use fastddc::dsp::ddc::FastDdc;
//! use num_complex::Complex;
//!
//! let mut ddc = FastDdc::create(8, 0.05, 0.1).unwrap();
//! let input = vec![Complex::new(0.5, 0.0); 4096];
//! let output = ddc.process(&input);
//! assert!(output.len() <= 4096 / 8);
//! ```

use num_complex::Complex;

use crate::dsp::DspBlock;
use crate::dsp::channelizer::{Channelizer, ChannelizerConfig};
use crate::dsp::fft::{FftDirection, FftPlan};
use crate::dsp::params::DdcParameters;
use crate::error::Result;

/// Down-converter over a stream of raw samples.
pub struct FastDdc {
    channelizer: Channelizer,
    forward: FftPlan,
    /// Current window: `overlap_length` samples of history, then new samples
    window: Vec<Complex<f32>>,
    /// Number of valid samples in `window`
    filled: usize,
    block_out: Vec<Complex<f32>>,
}

impl FastDdc {
    /// Build a down-converter, see [`Channelizer::new`].
    pub fn new(config: &ChannelizerConfig) -> Result<Self> {
        Ok(Self::from_channelizer(Channelizer::new(config)?))
    }

    /// Build a down-converter with a Hamming-windowed filter.
    pub fn create(decimation: usize, transition_bw: f32, freq_shift: f32) -> Result<Self> {
        Self::new(&ChannelizerConfig::new(decimation, transition_bw, freq_shift))
    }

    /// Stream through an existing channelizer.
    pub fn from_channelizer(channelizer: Channelizer) -> Self {
        let params = *channelizer.params();
        Self {
            forward: FftPlan::new(params.fft_size, FftDirection::Forward),
            window: vec![Complex::new(0.0, 0.0); params.fft_size],
            filled: params.overlap_length,
            block_out: vec![Complex::new(0.0, 0.0); channelizer.max_output_len()],
            channelizer,
        }
    }

    /// Derived parameters.
    pub fn params(&self) -> &DdcParameters {
        self.channelizer.params()
    }

    /// Underlying block processor.
    pub fn channelizer(&self) -> &Channelizer {
        &self.channelizer
    }

    /// Samples still needed to complete the current window.
    pub fn pending(&self) -> usize {
        self.window.len() - self.filled
    }

    /// Clear the sample history and the phase continuity.
    pub fn reset(&mut self) {
        self.window.fill(Complex::new(0.0, 0.0));
        self.filled = self.params().overlap_length;
        self.channelizer.reset();
    }

    /// Feed `input` and append every completed output sample to `output`.
    ///
    /// Samples that do not complete a window are kept for the next call, so
    /// the concatenated output does not depend on how the input is chunked.
    pub fn process_into(&mut self, input: &[Complex<f32>], output: &mut Vec<Complex<f32>>) {
        let overlap = self.params().overlap_length;
        let fft_size = self.window.len();

        let mut rest = input;
        while !rest.is_empty() {
            let take = rest.len().min(fft_size - self.filled);
            self.window[self.filled..self.filled + take].copy_from_slice(&rest[..take]);
            self.filled += take;
            rest = &rest[take..];

            if self.filled == fft_size {
                self.forward.input_mut().copy_from_slice(&self.window);
                self.forward.execute();
                let produced = self
                    .channelizer
                    .process(self.forward.output(), &mut self.block_out);
                output.extend_from_slice(&self.block_out[..produced]);

                self.window.copy_within(fft_size - overlap.., 0);
                self.filled = overlap;
            }
        }
    }
}

impl DspBlock for FastDdc {
    fn process(&mut self, data: &[Complex<f32>]) -> Vec<Complex<f32>> {
        let blocks = (self.filled - self.params().overlap_length + data.len())
            / self.params().input_size;
        let mut output = Vec::with_capacity(blocks * self.channelizer.max_output_len());
        self.process_into(data, &mut output);
        output
    }
}
