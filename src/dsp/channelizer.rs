//! FFT channelizer: filter, shift and decimate one channel per block.
//!
//! A [`Channelizer`] consumes blocks of `fft_size` bins, the forward transform
//! of overlapping windows of wide-band samples (see [`crate::dsp::ddc::FastDdc`]
//! for a block that does the framing). For each block it
//!
//! 1. multiplies by the filter spectrum, shifts by `offsetbin` and folds the
//!    result down to `fft_inv_size` bins ([`multiply_and_shift`]),
//! 2. swaps the halves of the folded spectrum and inverse-transforms it,
//! 3. normalizes by `pre_decimation * fft_inv_size`,
//! 4. drops the first `scrap` samples (overlap-scrap, not overlap-add),
//! 5. hands the rest to the fine-phase stage ([`DecimatingShift`]), which
//!    finishes the decimation and the sub-bin frequency correction.
//!
//! Forward spectra and the filter spectrum are both in natural FFT bin order
//! (bin 0 first).
//!
//! # Example
//!
//! ```
//! use fastddc::dsp::channelizer::{Channelizer, ChannelizerConfig};
//! use num_complex::Complex;
//!
//! let mut channelizer = Channelizer::new(&ChannelizerConfig::new(8, 0.05, 0.1)).unwrap();
//! let fft_size = channelizer.params().fft_size;
//!
//! let spectrum = vec![Complex::new(0.0, 0.0); fft_size];
//! let mut output = vec![Complex::new(0.0, 0.0); channelizer.max_output_len()];
//! let produced = channelizer.process(&spectrum, &mut output);
//! assert!(produced <= output.len());
//! ```

use num_complex::Complex;
use rustfft::FftPlanner;
use tracing::{debug, trace};

use crate::dsp::fft::{FftDirection, FftPlan, swap_sides};
use crate::dsp::firdes::{self, Window};
use crate::dsp::params::DdcParameters;
use crate::dsp::rotate::{DecimatingShift, ShiftStatus};
use crate::dsp::shift::multiply_and_shift;
use crate::error::Result;

/// Channel selection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelizerConfig {
    /// Total decimation factor
    pub decimation: usize,
    /// Filter transition bandwidth, as a fraction of the input sample rate
    pub transition_bw: f32,
    /// Frequency shift in cycles per sample; the channel centred at
    /// `-freq_shift` ends up at zero frequency
    pub freq_shift: f32,
    /// Window used for the filter design
    pub window: Window,
}

impl ChannelizerConfig {
    pub fn new(decimation: usize, transition_bw: f32, freq_shift: f32) -> Self {
        Self {
            decimation,
            transition_bw,
            freq_shift,
            window: Window::default(),
        }
    }

    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }
}

/// Frequency-domain down-converter for a single channel.
///
/// Processing takes `&mut self`: one instance serves one stream, in sample
/// order. Independent instances can run on separate threads.
pub struct Channelizer {
    params: DdcParameters,
    /// Transformed band-pass taps, `fft_size` bins
    filter_spectrum: Vec<Complex<f32>>,
    /// Inverse transform of `fft_inv_size` points, with its buffers
    inverse: FftPlan,
    shift: DecimatingShift,
    status: ShiftStatus,
}

impl Channelizer {
    /// Build a channelizer.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no consistent set of parameters can be
    /// derived. Nothing is allocated in that case.
    pub fn new(config: &ChannelizerConfig) -> Result<Self> {
        let params =
            DdcParameters::derive(config.transition_bw, config.decimation, config.freq_shift)?;
        debug!("fastddc parameters: {}", params);

        assert_eq!(params.taps_length % 2, 1, "taps_length must be odd");
        assert_eq!(
            params.overlap_length % params.pre_decimation,
            0,
            "overlap_length must be a multiple of pre_decimation"
        );
        assert_eq!(params.fft_inv_size * params.pre_decimation, params.fft_size);
        assert!(params.fft_size > params.taps_length);
        assert!(params.scrap < params.fft_inv_size);

        let mut planner = FftPlanner::new();
        let filter_spectrum = design_filter_spectrum(&mut planner, &params, config);
        let inverse = FftPlan::with_planner(&mut planner, params.fft_inv_size, FftDirection::Inverse);
        let shift = DecimatingShift::new(params.post_shift, params.post_decimation);

        Ok(Self {
            params,
            filter_spectrum,
            inverse,
            shift,
            status: shift.init(),
        })
    }

    /// Build a channelizer with a Hamming-windowed filter.
    pub fn create(decimation: usize, transition_bw: f32, freq_shift: f32) -> Result<Self> {
        Self::new(&ChannelizerConfig::new(decimation, transition_bw, freq_shift))
    }

    /// Derived parameters.
    pub fn params(&self) -> &DdcParameters {
        &self.params
    }

    /// Transformed filter taps.
    pub fn filter_spectrum(&self) -> &[Complex<f32>] {
        &self.filter_spectrum
    }

    /// Continuity state carried to the next block.
    pub fn status(&self) -> &ShiftStatus {
        &self.status
    }

    /// Output buffer length sufficient for any block.
    pub fn max_output_len(&self) -> usize {
        self.params.max_output_len()
    }

    /// Forget the continuity state, as if no block had been processed.
    pub fn reset(&mut self) {
        self.status = self.shift.init();
    }

    /// Process one transformed block.
    ///
    /// # Arguments
    ///
    /// * `input` - Forward transform of a window of `fft_size` samples, the
    ///   first `overlap_length` of which repeat the end of the previous window
    /// * `output` - Receives the channel samples, at least
    ///   [`Channelizer::max_output_len`] long
    ///
    /// # Returns
    ///
    /// Number of samples written to the front of `output`.
    ///
    /// # Panics
    ///
    /// Panics if `input` is not `fft_size` long or `output` is too short.
    pub fn process(&mut self, input: &[Complex<f32>], output: &mut [Complex<f32>]) -> usize {
        self.process_with(input, output, false)
    }

    /// Same as [`Channelizer::process`]; with `dump` set, the filter spectrum
    /// and the intermediate buffers of this block are logged at trace level.
    pub fn process_with(
        &mut self,
        input: &[Complex<f32>],
        output: &mut [Complex<f32>],
        dump: bool,
    ) -> usize {
        assert_eq!(
            input.len(),
            self.params.fft_size,
            "Input block must hold fft_size bins"
        );

        multiply_and_shift(
            input,
            &self.filter_spectrum,
            self.inverse.input_mut(),
            self.params.offsetbin,
        );
        if dump {
            dump_buffer("taps", &self.filter_spectrum);
            dump_buffer("ddc_input", input);
            dump_buffer("fft_input", self.inverse.input_mut());
        }

        swap_sides(self.inverse.input_mut());
        self.inverse.execute();

        let norm = (self.params.pre_decimation * self.params.fft_inv_size) as f32;
        for x in self.inverse.output_mut() {
            *x /= norm;
        }
        if dump {
            dump_buffer("fft_output", self.inverse.output());
        }

        self.status = self.shift.process(
            &self.inverse.output()[self.params.scrap..],
            output,
            self.status,
        );
        self.status.output_size
    }
}

/// Transform the band-pass taps, zero-padded to `fft_size`.
///
/// The spectrum stays in natural bin order, like the forward input blocks;
/// only the folded spectrum is half-swapped before the inverse transform.
/// With `pre_decimation == 1` a half-swapped filter would select the channel
/// at Nyquist instead.
fn design_filter_spectrum(
    planner: &mut FftPlanner<f32>,
    params: &DdcParameters,
    config: &ChannelizerConfig,
) -> Vec<Complex<f32>> {
    let half_bw = 0.5 / config.decimation as f32;
    let low_cut = -config.freq_shift - half_bw;
    let high_cut = -config.freq_shift + half_bw;
    debug!(
        "preparing a bandpass filter of [{}, {}] cutoff rates, real transition bandwidth is {}",
        low_cut,
        high_cut,
        4.0 / params.taps_length as f32
    );

    let mut plan = FftPlan::with_planner(planner, params.fft_size, FftDirection::Forward);
    let taps = plan.input_mut();
    taps.fill(Complex::new(0.0, 0.0));
    firdes::bandpass_c(&mut taps[..params.taps_length], low_cut, high_cut, config.window);
    plan.execute();
    plan.output().to_vec()
}

fn dump_buffer(name: &str, data: &[Complex<f32>]) {
    for (i, x) in data.iter().enumerate() {
        trace!(buffer = name, index = i, re = x.re, im = x.im);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn tone_spectrum(fft_size: usize, bin: usize, amplitude: f32) -> Vec<Complex<f32>> {
        let mut spectrum = vec![Complex::new(0.0, 0.0); fft_size];
        spectrum[bin] = Complex::new(amplitude * fft_size as f32, 0.0);
        spectrum
    }

    #[test]
    fn test_channelizer_sizes() {
        let channelizer = Channelizer::create(8, 0.05, 0.0).unwrap();
        let params = channelizer.params();
        assert_eq!(channelizer.filter_spectrum().len(), params.fft_size);
        assert_eq!(channelizer.inverse.size(), params.fft_inv_size);
        assert_eq!(channelizer.max_output_len(), 112);
        assert_eq!(*channelizer.status(), ShiftStatus::default());
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            Channelizer::create(0, 0.05, 0.0),
            Err(Error::InvalidDecimation(0))
        ));
        assert!(Channelizer::create(8, 0.0, 0.0).is_err());
        assert!(Channelizer::create(8, 0.05, 0.75).is_err());
    }

    #[test]
    fn test_filter_spectrum_unity_at_channel() {
        let channelizer = Channelizer::create(8, 0.05, 0.25).unwrap();
        // channel centred on -0.25 cycles/sample, bin 768 of 1024
        assert_relative_eq!(channelizer.filter_spectrum()[768].norm(), 1.0, epsilon = 1e-3);
        assert!(channelizer.filter_spectrum()[256].norm() < 1e-2);
    }

    #[test]
    fn test_dc_block() {
        let mut channelizer = Channelizer::create(8, 0.05, 0.0).unwrap();
        let fft_size = channelizer.params().fft_size;
        let mut output = vec![Complex::new(0.0, 0.0); channelizer.max_output_len()];
        let produced = channelizer.process(&tone_spectrum(fft_size, 0, 1.0), &mut output);
        assert_eq!(produced, 112);
        for y in &output[..produced] {
            assert_relative_eq!(y.re, 1.0, epsilon = 1e-3);
            assert_abs_diff_eq!(y.im, 0.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_on_bin_tone_moves_to_dc() {
        // shift 0.25 is exactly -256 bins: no residual for the fine-phase stage
        let mut channelizer = Channelizer::create(8, 0.05, 0.25).unwrap();
        assert_eq!(channelizer.params().offsetbin, -256);
        assert_abs_diff_eq!(channelizer.params().post_shift, 0.0, epsilon = 1e-9);
        let mut output = vec![Complex::new(0.0, 0.0); channelizer.max_output_len()];
        let produced = channelizer.process(&tone_spectrum(1024, 768, 0.5), &mut output);
        for y in &output[..produced] {
            assert_relative_eq!(y.norm(), 0.5, epsilon = 1e-3);
            assert_relative_eq!(y.re, output[0].re, epsilon = 1e-4);
            assert_relative_eq!(y.im, output[0].im, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_on_bin_tone_without_pre_decimation() {
        // decimation 3: pre_decimation 1, all decimation in the time domain
        let mut channelizer = Channelizer::create(3, 0.05, 0.25).unwrap();
        assert_eq!(channelizer.params().pre_decimation, 1);
        let fft_size = channelizer.params().fft_size;
        let bin = fft_size - fft_size / 4;
        let mut output = vec![Complex::new(0.0, 0.0); channelizer.max_output_len()];
        let produced = channelizer.process(&tone_spectrum(fft_size, bin, 1.0), &mut output);
        assert!(produced > 0);
        for y in &output[..produced] {
            assert_relative_eq!(y.norm(), 1.0, epsilon = 1e-3);
            assert_relative_eq!(y.re, output[0].re, epsilon = 1e-4);
            assert_relative_eq!(y.im, output[0].im, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_out_of_band_bin_rejected() {
        let mut channelizer = Channelizer::create(8, 0.05, 0.0).unwrap();
        let mut output = vec![Complex::new(0.0, 0.0); channelizer.max_output_len()];
        let produced = channelizer.process(&tone_spectrum(1024, 256, 1.0), &mut output);
        for y in &output[..produced] {
            assert!(y.norm() < 0.01);
        }
    }

    #[test]
    fn test_deterministic_and_dump_neutral() {
        let spectrum: Vec<Complex<f32>> = (0..1024)
            .map(|i| Complex::new((i as f32 * 0.37).sin(), (i as f32 * 0.11).cos()))
            .collect();
        let mut a = Channelizer::create(12, 0.02, -0.13).unwrap();
        let mut b = Channelizer::create(12, 0.02, -0.13).unwrap();
        let fft_size = a.params().fft_size;
        let mut spectrum = spectrum.repeat(fft_size / 1024 + 1);
        spectrum.truncate(fft_size);
        let spectrum = &spectrum[..];

        let mut out_a = vec![Complex::new(0.0, 0.0); a.max_output_len()];
        let mut out_b = vec![Complex::new(0.0, 0.0); b.max_output_len()];
        for _ in 0..3 {
            let n_a = a.process(spectrum, &mut out_a);
            let n_b = b.process_with(spectrum, &mut out_b, true);
            assert_eq!(n_a, n_b);
            assert_eq!(out_a[..n_a], out_b[..n_b]);
            assert_eq!(a.status(), b.status());
        }
    }

    #[test]
    fn test_reset_restores_status() {
        let mut channelizer = Channelizer::create(6, 0.05, 0.1).unwrap();
        let fft_size = channelizer.params().fft_size;
        let mut output = vec![Complex::new(0.0, 0.0); channelizer.max_output_len()];
        channelizer.process(&tone_spectrum(fft_size, 0, 1.0), &mut output);
        assert_ne!(*channelizer.status(), ShiftStatus::default());
        channelizer.reset();
        assert_eq!(*channelizer.status(), ShiftStatus::default());
    }

    #[test]
    #[should_panic(expected = "Input block must hold fft_size bins")]
    fn test_wrong_block_size() {
        let mut channelizer = Channelizer::create(8, 0.05, 0.0).unwrap();
        let mut output = vec![Complex::new(0.0, 0.0); channelizer.max_output_len()];
        channelizer.process(&[Complex::new(0.0, 0.0); 100], &mut output);
    }

    #[test]
    fn test_channelizer_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Channelizer>();
    }

    #[test]
    fn test_config_window() {
        let config = ChannelizerConfig::new(4, 0.1, 0.0).with_window(Window::Blackman);
        assert_eq!(config.window, Window::Blackman);
        assert_eq!(ChannelizerConfig::new(4, 0.1, 0.0).window, Window::Hamming);
        assert!(Channelizer::new(&config).is_ok());
    }
}
