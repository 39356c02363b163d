use alloc::vec::Vec;

#[cfg(feature = "threads")]
use rayon::prelude::*;

use rgb::RGB;

use crate::counter::RelaxedCounter;
use crate::error::DedupError;
use crate::histogram::CountingTable;
use crate::signature::decode;

/// What the fill pass emits for each surviving signature.
pub trait Payload: Sized + Send {
    /// Whether the counting table must record a representative voxel per signature.
    const NEEDS_REPRESENTATIVES: bool;

    fn emit<C: RelaxedCounter>(table: &CountingTable<C>, signature: u64) -> Self;
}

/// The decoded quantized color.
impl Payload for RGB<u16> {
    const NEEDS_REPRESENTATIVES: bool = false;

    #[inline]
    fn emit<C: RelaxedCounter>(table: &CountingTable<C>, signature: u64) -> Self {
        decode(signature, table.output_bits())
    }
}

/// The linear offset of a representative voxel.
impl Payload for u64 {
    const NEEDS_REPRESENTATIVES: bool = true;

    #[inline]
    fn emit<C: RelaxedCounter>(table: &CountingTable<C>, signature: u64) -> Self {
        table.representative(signature).unwrap_or_default()
    }
}

/// Number of signatures in `0..=max_signature` whose count strictly exceeds `threshold`.
pub fn count_above<C: RelaxedCounter>(
    table: &CountingTable<C>,
    threshold: u64,
    parallel: bool,
) -> usize {
    if table.is_empty() {
        return 0;
    }
    let signatures = 0..=table.max_signature();

    #[cfg(feature = "threads")]
    let n = if parallel {
        signatures
            .into_par_iter()
            .filter(|&signature| table.count(signature) > threshold)
            .count()
    } else {
        signatures
            .filter(|&signature| table.count(signature) > threshold)
            .count()
    };
    #[cfg(not(feature = "threads"))]
    let n = {
        let _ = parallel;
        signatures
            .filter(|&signature| table.count(signature) > threshold)
            .count()
    };
    n
}

/// Clear `out` and size it for exactly `n` entries, reusing its allocation when possible.
fn prepare_output<E>(out: &mut Vec<E>, n: usize) -> Result<(), DedupError> {
    if out.capacity() > 0 {
        log::trace!(
            "reusing output buffer with capacity {} for {} entries",
            out.capacity(),
            n
        );
    }
    out.clear();
    out.shrink_to(n);
    out.try_reserve_exact(n)
        .map_err(|_| DedupError::OutOfMemory { entries: n })
}

/// Size, allocate and fill `out` from the counting table.
///
/// The fill pass runs in ascending signature order on the calling thread and
/// clears every counter it emits.
pub fn extract_into<C: RelaxedCounter, E: Payload>(
    table: &CountingTable<C>,
    threshold: u64,
    parallel: bool,
    out: &mut Vec<E>,
) -> Result<(), DedupError> {
    let n = count_above(table, threshold, parallel);
    prepare_output(out, n)?;

    if n > 0 {
        for signature in 0..=table.max_signature() {
            if table.count(signature) > threshold {
                out.push(E::emit(table, signature));
                table.clear(signature);
            }
        }
    }

    debug_assert_eq!(out.len(), n);
    log::debug!("{} signatures above threshold {}", n, threshold);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::build_counting_table;
    use crate::signature::encode;
    use crate::volume::{ChannelVolume, RgbChannels};
    use core::sync::atomic::AtomicU8;

    fn table_for(red: &[u16], track: bool) -> CountingTable<AtomicU8> {
        let zeros = vec![0u16; red.len()];
        let r = ChannelVolume::from_row(red);
        let z = ChannelVolume::from_row(&zeros);
        let ch = RgbChannels::new(&r, &z, &z).unwrap();
        build_counting_table(&ch, 4, 4, track, false).unwrap()
    }

    #[test]
    fn threshold_is_strict() {
        let table = table_for(&[1, 1, 2, 3, 3, 3], false);
        assert_eq!(count_above(&table, 0, false), 3);
        assert_eq!(count_above(&table, 1, false), 2);
        assert_eq!(count_above(&table, 2, false), 1);
        assert_eq!(count_above(&table, 3, false), 0);
    }

    #[test]
    fn fill_is_ascending_and_clears() {
        let table = table_for(&[9, 2, 5, 2], false);
        let mut out: Vec<RGB<u16>> = Vec::new();
        extract_into(&table, 0, false, &mut out).unwrap();
        assert_eq!(
            out,
            vec![RGB::new(2, 0, 0), RGB::new(5, 0, 0), RGB::new(9, 0, 0)]
        );
        for sig in 0..=table.max_signature() {
            assert_eq!(table.count(sig), 0);
        }
    }

    #[test]
    fn representatives_follow_signature_order() {
        let table = table_for(&[9, 2, 5, 2], true);
        let mut out: Vec<u64> = Vec::new();
        extract_into(&table, 0, false, &mut out).unwrap();
        assert_eq!(out, vec![3, 2, 0]);
    }

    #[test]
    fn reused_buffer_is_exactly_resized() {
        let table = table_for(&[1, 1, 4], false);
        let mut out = vec![RGB::new(7u16, 7, 7); 100];
        extract_into(&table, 1, false, &mut out).unwrap();
        assert_eq!(out, vec![RGB::new(1, 0, 0)]);
        assert!(out.capacity() < 100);
    }

    #[test]
    fn nothing_survives() {
        let table = table_for(&[0, 0], false);
        let mut out: Vec<RGB<u16>> = vec![RGB::new(1, 1, 1)];
        extract_into(&table, 5, false, &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(table.count(encode(0, 0, 0, 4)), 2);
    }

    #[cfg(feature = "threads")]
    #[test]
    fn parallel_sizing_matches_sequential() {
        let red: Vec<u16> = (0..5000).map(|i| (i * 7 % 16) as u16).collect();
        let table = table_for(&red, false);
        assert_eq!(
            count_above(&table, 3, true),
            count_above(&table, 3, false)
        );
    }
}
