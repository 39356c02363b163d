use core::sync::atomic::{AtomicU8, AtomicU16, AtomicU32, Ordering};

use bytemuck::Zeroable;

/// Storage width of each counting-table cell.
///
/// The width bounds the count a signature can record: a counter holds
/// `true_count mod 2^bits`, so a heavily populated color can land below the
/// threshold after wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterWidth {
    /// One byte per signature.
    #[default]
    U8,
    U16,
    U32,
}

impl CounterWidth {
    pub fn bits(self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::U32 => 32,
        }
    }

    /// Number of distinct values a counter holds before wrapping to zero.
    pub fn capacity(self) -> u64 {
        1u64 << self.bits()
    }
}

/// A fixed-width counter shared between scan workers.
///
/// `increment` is a relaxed load followed by a relaxed store, not a
/// read-modify-write: two workers bumping the same cell may both read the
/// old value, and one increment is lost. Counts are therefore a lower bound
/// (modulo wrapping) under parallel scans and exact under sequential ones.
pub trait RelaxedCounter: Default + Zeroable + Send + Sync {
    const WIDTH: CounterWidth;

    fn increment(&self);

    fn get(&self) -> u64;

    fn clear(&self);
}

macro_rules! relaxed_counter {
    ($atomic:ty, $width:expr) => {
        impl RelaxedCounter for $atomic {
            const WIDTH: CounterWidth = $width;

            #[inline]
            fn increment(&self) {
                let n = self.load(Ordering::Relaxed);
                self.store(n.wrapping_add(1), Ordering::Relaxed);
            }

            #[inline]
            fn get(&self) -> u64 {
                u64::from(self.load(Ordering::Relaxed))
            }

            #[inline]
            fn clear(&self) {
                self.store(0, Ordering::Relaxed);
            }
        }
    };
}

relaxed_counter!(AtomicU8, CounterWidth::U8);
relaxed_counter!(AtomicU16, CounterWidth::U16);
relaxed_counter!(AtomicU32, CounterWidth::U32);
