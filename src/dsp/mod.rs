/// Digital Signal Processing (DSP) module.
///
/// This module provides the building blocks of the frequency-domain
/// down-converter: filter design, FFT plans, spectral shift-decimation and the
/// time-domain fine-phase stage, assembled into a [`channelizer::Channelizer`]
/// and the streaming [`ddc::FastDdc`].
///
/// # Modules
/// - `params`: Derivation of FFT, filter and decimation sizes.
/// - `firdes`: Windowed-sinc FIR filter design.
/// - `fft`: FFT plans with preallocated buffers.
/// - `shift`: Filter, shift and decimate a spectrum in one pass.
/// - `rotate`: Decimating rotation of complex samples.
/// - `channelizer`: Per-block frequency-domain down-conversion.
/// - `ddc`: Streaming down-converter over raw samples.
///
/// # Traits
/// - [`DspBlock`]: A trait representing a generic DSP processing block that
///   operates on slices of complex samples.
use num_complex::Complex;

pub mod channelizer;
pub mod ddc;
pub mod fft;
pub mod firdes;
pub mod params;
pub mod rotate;
pub mod shift;

pub trait DspBlock {
    fn process(&mut self, data: &[Complex<f32>]) -> Vec<Complex<f32>>;
}
