use core::fmt;

use crate::error::DedupError;

/// Depth × height × width of a row-major volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extents {
    pub depth: usize,
    pub height: usize,
    pub width: usize,
}

impl Extents {
    pub fn new(depth: usize, height: usize, width: usize) -> Self {
        Self {
            depth,
            height,
            width,
        }
    }

    /// Number of voxels, or `None` if the product overflows `usize`.
    pub fn voxel_count(&self) -> Option<usize> {
        self.depth
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(self.width))
    }
}

impl fmt::Display for Extents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.depth, self.height, self.width)
    }
}

/// An unsigned channel sample type.
pub trait Sample: Copy + Send + Sync {
    fn to_u64(self) -> u64;
}

impl Sample for u8 {
    #[inline]
    fn to_u64(self) -> u64 {
        u64::from(self)
    }
}

impl Sample for u16 {
    #[inline]
    fn to_u64(self) -> u64 {
        u64::from(self)
    }
}

impl Sample for u32 {
    #[inline]
    fn to_u64(self) -> u64 {
        u64::from(self)
    }
}

/// A borrowed single-channel volume in row-major (z, y, x) order.
#[derive(Debug, Clone, Copy)]
pub struct ChannelVolume<'a, T> {
    samples: &'a [T],
    extents: Extents,
}

impl<'a, T: Sample> ChannelVolume<'a, T> {
    /// Wrap `samples` with the given extents.
    ///
    /// Fails if the slice length is not `depth * height * width`.
    pub fn new(samples: &'a [T], extents: Extents) -> Result<Self, DedupError> {
        if extents.voxel_count() != Some(samples.len()) {
            return Err(DedupError::DimensionMismatch {
                len: samples.len(),
                extents,
            });
        }
        Ok(Self { samples, extents })
    }

    /// A volume with a single plane and a single row.
    pub fn from_row(samples: &'a [T]) -> Self {
        Self {
            samples,
            extents: Extents::new(1, 1, samples.len()),
        }
    }

    pub fn extents(&self) -> Extents {
        self.extents
    }

    pub fn samples(&self) -> &'a [T] {
        self.samples
    }
}

/// The red, green and blue channels of one co-registered volume.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RgbChannels<'a, T> {
    pub(crate) red: &'a [T],
    pub(crate) green: &'a [T],
    pub(crate) blue: &'a [T],
}

impl<'a, T: Sample> RgbChannels<'a, T> {
    /// Checks that all three channels share the same extents.
    pub(crate) fn new(
        red: &ChannelVolume<'a, T>,
        green: &ChannelVolume<'a, T>,
        blue: &ChannelVolume<'a, T>,
    ) -> Result<Self, DedupError> {
        if red.extents() != green.extents() || red.extents() != blue.extents() {
            return Err(DedupError::ShapeMismatch {
                red: red.extents(),
                green: green.extents(),
                blue: blue.extents(),
            });
        }
        Ok(Self {
            red: red.samples(),
            green: green.samples(),
            blue: blue.samples(),
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.red.len()
    }

    #[inline]
    pub(crate) fn get(&self, offset: usize) -> (u64, u64, u64) {
        (
            self.red[offset].to_u64(),
            self.green[offset].to_u64(),
            self.blue[offset].to_u64(),
        )
    }
}
