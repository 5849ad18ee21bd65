//! DDC parameter derivation.
//!
//! Factors a requested decimation and transition bandwidth into a consistent set
//! of FFT sizes, tap counts, spectral-shift bins and sub-bin phase corrections.
//!
//! The decimation is split in two:
//! - `pre_decimation`, a power of two, is done in the frequency domain by
//!   folding the filtered spectrum (a decimation that is itself a power of two
//!   leaves its last factor of 2 to the time domain);
//! - `post_decimation`, the residual, is done in the time domain by the
//!   fine-phase stage ([`crate::dsp::rotate::DecimatingShift`]).
//!
//! # Example
//!
//! ```
//! use fastddc::dsp::params::DdcParameters;
//!
//! let params = DdcParameters::derive(0.05, 8, 0.0).unwrap();
//! assert_eq!(params.pre_decimation * params.post_decimation, 8);
//! assert_eq!(params.fft_size, 1024);
//! assert_eq!(params.fft_inv_size, 256);
//! ```

use std::fmt;

use crate::dsp::firdes;
use crate::error::{Error, Result};

/// Derived sizing and shift constants of one channel.
///
/// Built once by [`DdcParameters::derive`] and never modified afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DdcParameters {
    /// Frequency-domain decimation factor (power of two)
    pub pre_decimation: usize,
    /// Time-domain decimation factor
    pub post_decimation: usize,
    /// Minimal number of taps achieving the requested transition bandwidth
    pub taps_min_length: usize,
    /// Actual (odd) number of filter taps
    pub taps_length: usize,
    /// Forward transform size
    pub fft_size: usize,
    /// Inverse transform size, `fft_size / pre_decimation`
    pub fft_inv_size: usize,
    /// `taps_length - 1`
    pub overlap_length: usize,
    /// New samples consumed per block, `fft_size - overlap_length`
    pub input_size: usize,
    /// Bin granularity of the integer frequency shift
    pub v: usize,
    /// Bin at which the channel of interest starts (multiple of `v`)
    pub startbin: isize,
    /// Integer frequency shift in bins, `startbin - fft_size / 2`
    pub offsetbin: isize,
    /// Residual shift before decimation, in cycles per input sample
    pub pre_shift: f64,
    /// Residual shift after frequency-domain decimation, in cycles per sample
    pub post_shift: f64,
    /// Inverse transform samples discarded per block
    pub scrap: usize,
    /// Inverse transform samples kept per block, `fft_inv_size - scrap`
    pub post_input_size: usize,
}

impl DdcParameters {
    /// Derive all parameters of a channel.
    ///
    /// # Arguments
    ///
    /// * `transition_bw` - Filter transition bandwidth, as a fraction of the sample rate,
    ///   within (0, 1]
    /// * `decimation` - Total decimation factor (>= 1)
    /// * `shift_rate` - Frequency shift in cycles per sample, within [-0.5, 0.5].
    ///   The channel centred at `-shift_rate` is moved to zero frequency.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for out-of-range arguments, and
    /// [`Error::Degenerate`] if the derived `fft_size` is 2 or less, and
    /// [`Error::Oversized`] if the derived sizes do not fit in a `usize`.
    pub fn derive(transition_bw: f32, decimation: usize, shift_rate: f32) -> Result<Self> {
        if decimation == 0 {
            return Err(Error::InvalidDecimation(decimation));
        }
        if !transition_bw.is_finite() || transition_bw <= 0.0 || transition_bw > 1.0 {
            return Err(Error::InvalidTransitionBandwidth(transition_bw));
        }
        let taps_min_length = firdes::filter_len(transition_bw);
        Self::from_taps_min_length(taps_min_length, decimation, shift_rate)
    }

    /// Derive all parameters from an already estimated minimal tap count.
    pub fn from_taps_min_length(
        taps_min_length: usize,
        decimation: usize,
        shift_rate: f32,
    ) -> Result<Self> {
        if decimation == 0 {
            return Err(Error::InvalidDecimation(decimation));
        }
        if !shift_rate.is_finite() || shift_rate.abs() > 0.5 {
            return Err(Error::InvalidShift(shift_rate));
        }

        let (pre_decimation, post_decimation) = factor_decimation(decimation);

        let oversized = || Error::Oversized {
            taps_min_length,
            decimation,
        };

        // odd length, and taps_length - 1 is a multiple of pre_decimation
        let taps_length = taps_min_length
            .max(1)
            .div_ceil(pre_decimation)
            .checked_mul(pre_decimation)
            .and_then(usize::checked_next_power_of_two)
            .ok_or_else(oversized)?
            .max(2)
            + 1;
        // about four filter lengths per transform
        let fft_size = taps_length
            .checked_mul(4)
            .and_then(usize::checked_next_power_of_two)
            .ok_or_else(oversized)?
            .max(pre_decimation);
        check_fft_size(fft_size)?;

        let overlap_length = taps_length - 1;
        let input_size = fft_size - overlap_length;
        let fft_inv_size = fft_size / pre_decimation;

        // Coarsest granularity keeping the shift phase-continuous across blocks
        let v = fft_size / overlap_length;
        let middlebin = (fft_size / 2) as isize;
        let target = (middlebin as f64 - middlebin as f64 * shift_rate as f64 * 2.0) as isize;
        let mut startbin = v as isize * (target as f64 / v as f64).round() as isize;
        let mut offsetbin = startbin - middlebin;
        if offsetbin >= middlebin {
            // shift of -0.5 lands on +fft_size/2, which aliases to -fft_size/2
            offsetbin -= fft_size as isize;
            startbin -= fft_size as isize;
        }

        let pre_shift = offsetbin as f64 / fft_size as f64;
        let post_shift = pre_decimation as f64 * (shift_rate as f64 + pre_shift);

        let scrap = overlap_scrap(overlap_length, pre_decimation);
        let post_input_size = fft_inv_size - scrap;

        Ok(Self {
            pre_decimation,
            post_decimation,
            taps_min_length,
            taps_length,
            fft_size,
            fft_inv_size,
            overlap_length,
            input_size,
            v,
            startbin,
            offsetbin,
            pre_shift,
            post_shift,
            scrap,
            post_input_size,
        })
    }

    /// Total decimation factor.
    pub fn decimation(&self) -> usize {
        self.pre_decimation * self.post_decimation
    }

    /// Largest number of output samples a single block can produce.
    pub fn max_output_len(&self) -> usize {
        self.post_input_size.div_ceil(self.post_decimation)
    }
}

/// Split `decimation` into `(pre_decimation, post_decimation)`.
///
/// Powers of two are moved into `pre_decimation` as long as at least a factor
/// of 2 stays in `post_decimation`.
pub fn factor_decimation(decimation: usize) -> (usize, usize) {
    let mut pre_decimation = 1;
    let mut post_decimation = decimation;
    while post_decimation % 2 == 0 && post_decimation / 2 != 1 {
        post_decimation /= 2;
        pre_decimation *= 2;
    }
    (pre_decimation, post_decimation)
}

/// Number of inverse transform samples scrapped per block.
///
/// Truncating division: an `overlap_length` that is not a multiple of
/// `pre_decimation` under-discards by one sample. [`DdcParameters::derive`]
/// always produces a multiple, since `overlap_length` is a power of two no
/// smaller than `pre_decimation`.
pub fn overlap_scrap(overlap_length: usize, pre_decimation: usize) -> usize {
    overlap_length / pre_decimation
}

fn check_fft_size(fft_size: usize) -> Result<()> {
    if fft_size <= 2 {
        return Err(Error::Degenerate { fft_size });
    }
    Ok(())
}

impl fmt::Display for DdcParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "(fft_size = {}) = (taps_length = {}) + (input_size = {}) - 1",
            self.fft_size, self.taps_length, self.input_size
        )?;
        writeln!(
            f,
            "  overlap     ::  (overlap_length = {}) = taps_length - 1, taps_min_length = {}",
            self.overlap_length, self.taps_min_length
        )?;
        writeln!(
            f,
            "  decimation  ::  decimation = (pre_decimation = {}) * (post_decimation = {}), fft_inv_size = {}",
            self.pre_decimation, self.post_decimation, self.fft_inv_size
        )?;
        writeln!(
            f,
            "  shift       ::  startbin = {}, offsetbin = {}, v = {}, pre_shift = {}, post_shift = {}",
            self.startbin, self.offsetbin, self.v, self.pre_shift, self.post_shift
        )?;
        write!(
            f,
            "  o&s         ::  post_input_size = {}, scrap = {}",
            self.post_input_size, self.scrap
        )
    }
}
