use rgb::RGB;

use crate::quantize::max_value;

/// Pack three quantized channel values into one signature.
///
/// Red occupies the low `output_bits` bits, green the next `output_bits`
/// and blue the top `output_bits`.
#[inline]
pub fn encode(r: u64, g: u64, b: u64, output_bits: u32) -> u64 {
    r | (g << output_bits) | (b << (output_bits * 2))
}

/// Unpack a signature produced by [`encode`].
#[inline]
pub fn decode(signature: u64, output_bits: u32) -> RGB<u16> {
    let mask = max_value(output_bits);
    RGB {
        r: (signature & mask) as u16,
        g: ((signature >> output_bits) & mask) as u16,
        b: ((signature >> (output_bits * 2)) & mask) as u16,
    }
}

/// Number of distinct signatures at `output_bits`, i.e. `2^(3 * output_bits)`.
///
/// The shift overflows from 22 bits upward; callers stay within
/// `1..=MAX_OUTPUT_BITS`, as do [`encode`] and [`decode`].
#[inline]
pub fn signature_space(output_bits: u32) -> u64 {
    1u64 << (output_bits * 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_all_depths() {
        for bits in 1..=10u32 {
            let max = max_value(bits);
            // Exhaustive for small depths, a lattice plus the corners above that.
            let step = if bits <= 5 { 1 } else { max / 13 + 1 };
            let mut values: Vec<u64> = (0..=max).step_by(step as usize).collect();
            values.push(max);
            for &r in &values {
                for &g in &values {
                    for &b in &values {
                        let sig = encode(r, g, b, bits);
                        assert!(sig < signature_space(bits));
                        assert_eq!(
                            decode(sig, bits),
                            RGB::new(r as u16, g as u16, b as u16),
                            "bits={bits}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn channel_placement() {
        assert_eq!(encode(1, 0, 0, 4), 0x001);
        assert_eq!(encode(0, 1, 0, 4), 0x010);
        assert_eq!(encode(0, 0, 1, 4), 0x100);
        assert_eq!(encode(3, 3, 3, 2), 0b11_11_11);
    }

    #[test]
    fn space_size() {
        assert_eq!(signature_space(1), 8);
        assert_eq!(signature_space(2), 64);
        assert_eq!(signature_space(8), 1 << 24);
    }
}
