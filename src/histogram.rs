use core::sync::atomic::{AtomicU64, Ordering};

use alloc::boxed::Box;

use bytemuck::Zeroable;

#[cfg(feature = "threads")]
use rayon::prelude::*;

use crate::counter::RelaxedCounter;
use crate::error::DedupError;
use crate::quantize::Quantizer;
use crate::signature::{encode, signature_space};
use crate::volume::{RgbChannels, Sample};

/// Voxels handed to one rayon task at a time.
#[cfg(feature = "threads")]
const MIN_VOXELS_PER_TASK: usize = 1 << 14;

/// Dense per-signature occurrence counts, optionally with one representative
/// voxel offset per signature.
///
/// Cells are shared between scan workers without synchronization beyond
/// relaxed atomics; see [`RelaxedCounter`] for what that means for the counts.
#[derive(Debug)]
pub struct CountingTable<C> {
    counts: Box<[C]>,
    representatives: Option<Box<[AtomicU64]>>,
    max_signature: u64,
    output_bits: u32,
}

/// Allocate `len` zeroed cells, reporting allocation failure instead of aborting.
///
/// The memory comes straight from the zeroing allocator, so pages the scan
/// never touches are never written.
pub(crate) fn try_alloc_cells<T: Zeroable>(len: u64) -> Result<Box<[T]>, DedupError> {
    let entries = usize::try_from(len).map_err(|_| DedupError::OutOfMemory {
        entries: usize::MAX,
    })?;
    bytemuck::try_zeroed_slice_box(entries).map_err(|_| DedupError::OutOfMemory { entries })
}

impl<C: RelaxedCounter> CountingTable<C> {
    /// Allocate a zeroed table covering every signature at `output_bits`.
    pub fn new(output_bits: u32, track_representatives: bool) -> Result<Self, DedupError> {
        let len = signature_space(output_bits);
        let counts = try_alloc_cells::<C>(len)?;
        let representatives = if track_representatives {
            Some(try_alloc_cells::<AtomicU64>(len)?)
        } else {
            None
        };
        log::debug!(
            "allocated counting table: {} signatures, {}-bit counters wrapping at {}, representatives: {}",
            len,
            C::WIDTH.bits(),
            C::WIDTH.capacity(),
            track_representatives
        );
        Ok(Self {
            counts,
            representatives,
            max_signature: 0,
            output_bits,
        })
    }

    /// Record one voxel and return its signature.
    #[inline]
    fn record<T: Sample>(
        &self,
        channels: &RgbChannels<'_, T>,
        quantizer: Quantizer,
        offset: usize,
    ) -> u64 {
        let (r, g, b) = channels.get(offset);
        let signature = encode(
            quantizer.apply(r),
            quantizer.apply(g),
            quantizer.apply(b),
            self.output_bits,
        );
        self.counts[signature as usize].increment();
        if let Some(representatives) = &self.representatives {
            representatives[signature as usize].store(offset as u64, Ordering::Relaxed);
        }
        signature
    }

    /// Visit every voxel once, accumulating counts.
    ///
    /// With `parallel` set, voxels are spread over the rayon pool and
    /// concurrent increments of one signature may be lost.
    pub(crate) fn scan<T: Sample>(
        &mut self,
        channels: &RgbChannels<'_, T>,
        input_bits: u32,
        parallel: bool,
    ) {
        let quantizer = Quantizer::new(input_bits, self.output_bits);
        let voxels = channels.len();
        let table = &*self;

        #[cfg(feature = "threads")]
        let observed = if parallel {
            (0..voxels)
                .into_par_iter()
                .with_min_len(MIN_VOXELS_PER_TASK)
                .map(|offset| table.record(channels, quantizer, offset))
                .max()
        } else {
            (0..voxels)
                .map(|offset| table.record(channels, quantizer, offset))
                .max()
        };
        #[cfg(not(feature = "threads"))]
        let observed = {
            let _ = parallel;
            (0..voxels)
                .map(|offset| table.record(channels, quantizer, offset))
                .max()
        };

        self.max_signature = self.max_signature.max(observed.unwrap_or(0));
        log::debug!(
            "scanned {} voxels, max signature {}",
            voxels,
            self.max_signature
        );
    }

    /// Current (possibly wrapped) count for `signature`.
    #[inline]
    pub fn count(&self, signature: u64) -> u64 {
        self.counts[signature as usize].get()
    }

    /// Reset the counter for `signature` to zero.
    #[inline]
    pub fn clear(&self, signature: u64) {
        self.counts[signature as usize].clear();
    }

    /// Offset of the last voxel recorded for `signature`, if representatives are tracked.
    #[inline]
    pub fn representative(&self, signature: u64) -> Option<u64> {
        self.representatives
            .as_ref()
            .map(|r| r[signature as usize].load(Ordering::Relaxed))
    }

    /// Largest signature seen by [`scan`](Self::scan); zero for an empty volume.
    pub fn max_signature(&self) -> u64 {
        self.max_signature
    }

    pub fn output_bits(&self) -> u32 {
        self.output_bits
    }

    /// Number of cells, `2^(3 * output_bits)`.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Build a counting table for the given channels.
pub(crate) fn build_counting_table<C: RelaxedCounter, T: Sample>(
    channels: &RgbChannels<'_, T>,
    input_bits: u32,
    output_bits: u32,
    track_representatives: bool,
    parallel: bool,
) -> Result<CountingTable<C>, DedupError> {
    let mut table = CountingTable::<C>::new(output_bits, track_representatives)?;
    table.scan(channels, input_bits, parallel);
    Ok(table)
}
