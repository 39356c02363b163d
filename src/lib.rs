#![forbid(unsafe_code)]

//! Color deduplication over three co-registered channel volumes.
//!
//! Each voxel's red, green and blue samples are reduced to `output_bits`
//! bits, packed into a signature and counted in a dense table covering the
//! whole quantized color space. Signatures seen more than `threshold` times
//! are returned in ascending signature order, either as color triples or as
//! the offset of one representative voxel.
//!
//! The counting scan runs in parallel without locking. Counts are bounded by
//! the configured [`CounterWidth`] and wrap on overflow, and concurrent
//! increments of the same signature may be lost. Both effects only ever make
//! a signature look rarer than it is.

extern crate alloc;

pub mod counter;
pub mod error;
pub mod extract;
pub mod histogram;
pub mod polygon;
pub mod quantize;
pub mod signature;
pub mod volume;

pub use counter::CounterWidth;
pub use error::DedupError;
pub use polygon::classify_points_in_polygon;
pub use volume::{ChannelVolume, Extents, Sample};

use alloc::vec::Vec;
use core::sync::atomic::{AtomicU8, AtomicU16, AtomicU32};

use counter::RelaxedCounter;
use extract::Payload;
use rgb::RGB;
use volume::RgbChannels;

/// Widest supported sample, in bits.
pub const MAX_INPUT_BITS: u32 = 32;

/// Widest supported quantized channel, in bits. Decoded channels are stored as `u16`.
pub const MAX_OUTPUT_BITS: u32 = 16;

/// Configuration for color deduplication.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Significant bits per input sample (1..=32).
    pub input_bits: u32,
    /// Bits kept per channel after quantization (1..=16).
    /// The counting table holds `2^(3 * output_bits)` cells.
    pub output_bits: u32,
    /// A signature is kept when its count is strictly greater than this.
    pub threshold: u32,
    /// Width of each counting-table cell.
    pub counter_width: CounterWidth,
    /// Scan and size on the rayon pool. Ignored without the `threads` feature.
    pub parallel: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            input_bits: 16,
            output_bits: 8,
            threshold: 0,
            counter_width: CounterWidth::U8,
            parallel: true,
        }
    }
}

impl DedupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Significant bits per input sample, 1..=32. Samples above this depth saturate.
    pub fn input_bits(mut self, bits: u32) -> Self {
        self.input_bits = bits;
        self
    }

    /// Bits kept per channel, 1..=16. The counting table grows as `2^(3 * bits)`,
    /// so anything past 10 is usually an allocation failure.
    pub fn output_bits(mut self, bits: u32) -> Self {
        self.output_bits = bits;
        self
    }

    /// Keep signatures counted strictly more than `threshold` times. 0 keeps every color seen.
    pub fn threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Counter cell width. Counts wrap modulo `2^bits`.
    pub fn counter_width(mut self, width: CounterWidth) -> Self {
        self.counter_width = width;
        self
    }

    /// Run the scan and sizing pass on the rayon pool. `false` gives exact counts
    /// and last-voxel representatives.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Return the distinct quantized colors seen more than `config.threshold` times,
/// ordered by ascending signature.
pub fn deduplicate_colors<T: Sample>(
    red: &ChannelVolume<'_, T>,
    green: &ChannelVolume<'_, T>,
    blue: &ChannelVolume<'_, T>,
    config: &DedupConfig,
) -> Result<Vec<RGB<u16>>, DedupError> {
    let mut out = Vec::new();
    deduplicate_colors_into(red, green, blue, config, &mut out)?;
    Ok(out)
}

/// Like [`deduplicate_colors`], writing into `out` and reusing its allocation.
///
/// On error `out` is left untouched unless the failure was allocating it.
pub fn deduplicate_colors_into<T: Sample>(
    red: &ChannelVolume<'_, T>,
    green: &ChannelVolume<'_, T>,
    blue: &ChannelVolume<'_, T>,
    config: &DedupConfig,
    out: &mut Vec<RGB<u16>>,
) -> Result<(), DedupError> {
    deduplicate(red, green, blue, config, out)
}

/// Return one representative voxel offset per distinct quantized color seen
/// more than `config.threshold` times, ordered by ascending signature.
///
/// The representative is the last voxel of that color the scan touched; with
/// a parallel scan, which one is unspecified.
pub fn deduplicate_color_indexes<T: Sample>(
    red: &ChannelVolume<'_, T>,
    green: &ChannelVolume<'_, T>,
    blue: &ChannelVolume<'_, T>,
    config: &DedupConfig,
) -> Result<Vec<u64>, DedupError> {
    let mut out = Vec::new();
    deduplicate_color_indexes_into(red, green, blue, config, &mut out)?;
    Ok(out)
}

/// Like [`deduplicate_color_indexes`], writing into `out` and reusing its allocation.
pub fn deduplicate_color_indexes_into<T: Sample>(
    red: &ChannelVolume<'_, T>,
    green: &ChannelVolume<'_, T>,
    blue: &ChannelVolume<'_, T>,
    config: &DedupConfig,
    out: &mut Vec<u64>,
) -> Result<(), DedupError> {
    deduplicate(red, green, blue, config, out)
}

fn deduplicate<T: Sample, E: Payload>(
    red: &ChannelVolume<'_, T>,
    green: &ChannelVolume<'_, T>,
    blue: &ChannelVolume<'_, T>,
    config: &DedupConfig,
    out: &mut Vec<E>,
) -> Result<(), DedupError> {
    let channels = RgbChannels::new(red, green, blue)?;
    validate_config(config)?;

    match config.counter_width {
        CounterWidth::U8 => run::<AtomicU8, T, E>(&channels, config, out),
        CounterWidth::U16 => run::<AtomicU16, T, E>(&channels, config, out),
        CounterWidth::U32 => run::<AtomicU32, T, E>(&channels, config, out),
    }
}

fn run<C: RelaxedCounter, T: Sample, E: Payload>(
    channels: &RgbChannels<'_, T>,
    config: &DedupConfig,
    out: &mut Vec<E>,
) -> Result<(), DedupError> {
    let table = histogram::build_counting_table::<C, T>(
        channels,
        config.input_bits,
        config.output_bits,
        E::NEEDS_REPRESENTATIVES,
        config.parallel,
    )?;
    extract::extract_into(&table, u64::from(config.threshold), config.parallel, out)
}

fn validate_config(config: &DedupConfig) -> Result<(), DedupError> {
    if config.input_bits == 0 || config.input_bits > MAX_INPUT_BITS {
        return Err(DedupError::InvalidBitDepth {
            name: "input_bits",
            value: config.input_bits,
            max: MAX_INPUT_BITS,
        });
    }
    if config.output_bits == 0 || config.output_bits > MAX_OUTPUT_BITS {
        return Err(DedupError::InvalidBitDepth {
            name: "output_bits",
            value: config.output_bits,
            max: MAX_OUTPUT_BITS,
        });
    }
    Ok(())
}
