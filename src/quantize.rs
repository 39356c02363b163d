/// Number of low-order bits discarded when going from `input_bits` to `output_bits`.
#[inline]
pub fn decimation(input_bits: u32, output_bits: u32) -> u32 {
    input_bits.saturating_sub(output_bits)
}

/// Largest value representable in `output_bits` bits.
///
/// `output_bits` must be below 64; the crate itself only passes
/// `1..=MAX_OUTPUT_BITS`.
#[inline]
pub fn max_value(output_bits: u32) -> u64 {
    (1u64 << output_bits) - 1
}

/// Reduce a sample from `input_bits` to `output_bits` by right shift, saturating
/// at [`max_value`]. Samples wider than `input_bits` are clamped rather than wrapped.
///
/// Valid for `output_bits` in `1..=MAX_OUTPUT_BITS` and `input_bits` up to
/// `MAX_INPUT_BITS`.
#[inline]
pub fn quantize(sample: u64, input_bits: u32, output_bits: u32) -> u64 {
    (sample >> decimation(input_bits, output_bits)).min(max_value(output_bits))
}

/// Precomputed shift and clamp for a fixed pair of bit depths, used in the voxel scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Quantizer {
    shift: u32,
    max: u64,
}

impl Quantizer {
    pub(crate) fn new(input_bits: u32, output_bits: u32) -> Self {
        Self {
            shift: decimation(input_bits, output_bits),
            max: max_value(output_bits),
        }
    }

    #[inline]
    pub(crate) fn apply(&self, sample: u64) -> u64 {
        (sample >> self.shift).min(self.max)
    }
}
