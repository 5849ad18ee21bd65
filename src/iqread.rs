//! I/Q Data Reading Module
//!
//! This module reads interleaved I/Q samples from files or standard input and
//! yields them as chunks of `Complex<f32>`. A file that does not hold a whole
//! number of chunks ends with a shorter chunk.
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use num_complex::Complex;

use crate::IqFormat;
use crate::error::Result;

/**
 * I/Q Data Source Configuration
 */
#[derive(Debug, Clone, Copy)]
pub struct IqConfig {
    pub iq_format: IqFormat,
    pub chunk_size: usize,
}

impl IqConfig {
    pub fn new(chunk_size: usize, iq_format: IqFormat) -> Self {
        Self {
            iq_format,
            chunk_size,
        }
    }
}

/**
 * Synchronous I/Q Reader
 */
pub struct IqRead<R: Read> {
    config: IqConfig,
    reader: R,
}

impl IqRead<std::io::BufReader<std::fs::File>> {
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        chunk_size: usize,
        iq_format: IqFormat,
    ) -> Result<Self> {
        let path = expanduser(path.as_ref().to_path_buf());
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(Self::from_reader(reader, chunk_size, iq_format))
    }
}

impl IqRead<std::io::BufReader<std::io::Stdin>> {
    pub fn from_stdin(chunk_size: usize, iq_format: IqFormat) -> Self {
        let reader = std::io::BufReader::new(std::io::stdin());
        Self::from_reader(reader, chunk_size, iq_format)
    }
}

impl<R: Read> IqRead<R> {
    pub fn from_reader(reader: R, chunk_size: usize, iq_format: IqFormat) -> Self {
        let config = IqConfig::new(chunk_size, iq_format);
        Self { config, reader }
    }

    pub fn config(&self) -> &IqConfig {
        &self.config
    }

    /// Read up to one chunk. Returns `None` at end of stream.
    fn read_samples(&mut self) -> Result<Option<Vec<Complex<f32>>>> {
        let bytes_per_sample = self.config.iq_format.bytes_per_sample();
        let mut buffer = vec![0u8; self.config.chunk_size * bytes_per_sample];
        let mut total_read = 0;

        while total_read < buffer.len() {
            match self.reader.read(&mut buffer[total_read..]) {
                Ok(0) => break,
                Ok(n) => total_read += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        // A partial trailing sample cannot be decoded
        let usable = total_read - total_read % bytes_per_sample;
        if usable == 0 {
            return Ok(None);
        }
        Ok(Some(crate::convert_bytes_to_complex(
            self.config.iq_format,
            &buffer[..usable],
        )))
    }
}

impl<R: Read> Iterator for IqRead<R> {
    type Item = Result<Vec<Complex<f32>>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_samples().transpose()
    }
}

fn expanduser(path: PathBuf) -> PathBuf {
    // Check if the path starts with "~"
    if let Some(stripped) = path.to_str().and_then(|p| p.strip_prefix("~"))
        && let Some(home_dir) = dirs::home_dir()
    {
        return home_dir.join(stripped.trim_start_matches('/'));
    }
    path
}
