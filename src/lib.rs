#![doc = include_str!("../readme.md")]

use std::fmt;
use std::str::FromStr;

use num_complex::Complex;

pub mod dsp;
pub mod error;
pub mod iqread;

pub use dsp::DspBlock;
pub use dsp::channelizer::{Channelizer, ChannelizerConfig};
pub use dsp::ddc::FastDdc;
pub use dsp::params::DdcParameters;
pub use error::{Error, Result};

/**
 * I/Q Data Format
 */
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum IqFormat {
    /// Complex unsigned 8-bit (Cu8)
    Cu8,
    /// Complex signed 8-bit (Cs8)
    Cs8,
    /// Complex signed 16-bit (Cs16)
    Cs16,
    /// Complex 32-bit float (Cf32)
    #[default]
    Cf32,
}

impl IqFormat {
    /// Size of one I/Q pair, in bytes
    pub fn bytes_per_sample(self) -> usize {
        match self {
            IqFormat::Cu8 | IqFormat::Cs8 => 2,
            IqFormat::Cs16 => 4,
            IqFormat::Cf32 => 8,
        }
    }
}

impl FromStr for IqFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cu8" => Ok(IqFormat::Cu8),
            "cs8" => Ok(IqFormat::Cs8),
            "cs16" => Ok(IqFormat::Cs16),
            "cf32" => Ok(IqFormat::Cf32),
            _ => Err(Error::format(format!("Unsupported I/Q format: {}", s))),
        }
    }
}

impl fmt::Display for IqFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IqFormat::Cu8 => "cu8",
            IqFormat::Cs8 => "cs8",
            IqFormat::Cs16 => "cs16",
            IqFormat::Cf32 => "cf32",
        };
        f.write_str(name)
    }
}

/**
 * Synchronous I/Q Data Source (iterable)
 */
pub enum IqSource {
    /// File-based IQ source
    IqFile(iqread::IqRead<std::io::BufReader<std::fs::File>>),
    /// Stdin-based IQ source
    IqStdin(iqread::IqRead<std::io::BufReader<std::io::Stdin>>),
}

impl Iterator for IqSource {
    type Item = Result<Vec<Complex<f32>>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            IqSource::IqFile(source) => source.next(),
            IqSource::IqStdin(source) => source.next(),
        }
    }
}

impl IqSource {
    /// Create a new file-based I/Q source
    pub fn from_file<P: AsRef<std::path::Path>>(
        path: P,
        chunk_size: usize,
        iq_format: IqFormat,
    ) -> Result<Self> {
        let source = iqread::IqRead::from_file(path, chunk_size, iq_format)?;
        Ok(IqSource::IqFile(source))
    }

    /// Create a new stdin-based I/Q source
    pub fn from_stdin(chunk_size: usize, iq_format: IqFormat) -> Self {
        IqSource::IqStdin(iqread::IqRead::from_stdin(chunk_size, iq_format))
    }
}

/// Convert interleaved I/Q bytes to complex samples.
///
/// Trailing bytes that do not form a whole sample are ignored.
pub fn convert_bytes_to_complex(format: IqFormat, buffer: &[u8]) -> Vec<Complex<f32>> {
    match format {
        IqFormat::Cu8 => buffer
            .chunks_exact(2)
            .map(|c| Complex::new((c[0] as f32 - 127.5) / 128.0, (c[1] as f32 - 127.5) / 128.0))
            .collect(),
        IqFormat::Cs8 => buffer
            .chunks_exact(2)
            .map(|c| Complex::new((c[0] as i8) as f32 / 128.0, (c[1] as i8) as f32 / 128.0))
            .collect(),
        IqFormat::Cs16 => buffer
            .chunks_exact(4)
            .map(|c| {
                Complex::new(
                    i16::from_le_bytes([c[0], c[1]]) as f32 / 32768.0,
                    i16::from_le_bytes([c[2], c[3]]) as f32 / 32768.0,
                )
            })
            .collect(),
        IqFormat::Cf32 => buffer
            .chunks_exact(8)
            .map(|c| {
                Complex::new(
                    f32::from_le_bytes([c[0], c[1], c[2], c[3]]),
                    f32::from_le_bytes([c[4], c[5], c[6], c[7]]),
                )
            })
            .collect(),
    }
}

/// Serialize complex samples as interleaved little-endian cf32.
pub fn write_cf32(samples: &[Complex<f32>], output: &mut Vec<u8>) {
    output.reserve(samples.len() * IqFormat::Cf32.bytes_per_sample());
    for s in samples {
        output.extend_from_slice(&s.re.to_le_bytes());
        output.extend_from_slice(&s.im.to_le_bytes());
    }
}
