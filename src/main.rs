//! Frequency-domain digital down-converter
//!
//! Reads wide-band I/Q samples from a file or standard input, selects one
//! channel, and writes it to standard output as interleaved little-endian cf32.
//!
//! # Usage Examples
//!
//! ## Select the channel at -100 kHz of a 2 MHz capture, decimate by 8
//! ```bash
//! fastddc --decimation 8 --shift 0.05 --file samples.iq --format cu8 > channel.cf32
//! ```
//!
//! ## Inspect the derived parameters
//! ```bash
//! fastddc --decimation 10 --transition-bw 0.01 --print-params
//! ```

use std::io::{BufWriter, Write};

use clap::{ArgAction, Parser};
use tracing::{debug, info};

use fastddc::dsp::firdes::Window;
use fastddc::{ChannelizerConfig, DdcParameters, FastDdc, IqFormat, IqSource};

#[derive(Parser, Debug)]
#[command(author, version, about = "FFT-based digital down-converter", long_about = None)]
struct Args {
    /// Total decimation factor
    #[arg(short, long)]
    decimation: usize,

    /// Filter transition bandwidth, relative to the input sample rate
    #[arg(short, long, default_value_t = 0.05)]
    transition_bw: f32,

    /// Frequency shift in cycles per sample (the channel at -shift is moved to 0)
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
    shift: f32,

    /// Filter window (boxcar, blackman, hamming)
    #[arg(long, default_value = "hamming")]
    window: Window,

    /// IQ format of the input (cu8, cs8, cs16, cf32)
    #[arg(long, default_value = "cf32")]
    format: IqFormat,

    /// Input file path (standard input if omitted)
    #[arg(long)]
    file: Option<String>,

    /// Number of samples read at once
    #[arg(long, default_value_t = 65536)]
    chunk_size: usize,

    /// Print the derived parameters and exit
    #[arg(long, default_value_t = false)]
    print_params: bool,

    /// Verbosity level (-v=info, -vv=debug, -vvv=trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> fastddc::Result<()> {
    let args = Args::parse();

    // 0 = WARN (quiet), 1 = INFO, 2 = DEBUG, 3+ = TRACE
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .try_init();

    if args.print_params {
        let params = DdcParameters::derive(args.transition_bw, args.decimation, args.shift)?;
        println!("{}", params);
        return Ok(());
    }

    if args.chunk_size == 0 {
        return Err(fastddc::Error::other("chunk size must be greater than 0"));
    }

    let config = ChannelizerConfig::new(args.decimation, args.transition_bw, args.shift)
        .with_window(args.window);
    let mut ddc = FastDdc::new(&config)?;
    info!(
        "decimation {} ({} x {}), shift {}, {} window",
        args.decimation,
        ddc.params().pre_decimation,
        ddc.params().post_decimation,
        args.shift,
        args.window
    );

    let source = match &args.file {
        Some(path) => IqSource::from_file(path, args.chunk_size, args.format)?,
        None => IqSource::from_stdin(args.chunk_size, args.format),
    };

    let mut stdout = BufWriter::new(std::io::stdout().lock());
    let mut samples = Vec::new();
    let mut bytes = Vec::new();
    let (mut total_in, mut total_out) = (0usize, 0usize);

    for chunk in source {
        let chunk = chunk?;
        total_in += chunk.len();

        samples.clear();
        ddc.process_into(&chunk, &mut samples);
        total_out += samples.len();

        bytes.clear();
        fastddc::write_cf32(&samples, &mut bytes);
        match stdout.write_all(&bytes) {
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => break,
            result => result?,
        }
        debug!("read {} samples, wrote {}", chunk.len(), samples.len());
    }

    match stdout.flush() {
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
        result => result?,
    }
    info!("processed {} input samples into {} output samples", total_in, total_out);
    Ok(())
}
