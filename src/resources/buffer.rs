use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::Pod;
use serde::{Deserialize, Serialize};

use crate::errors::{PrismError, Result};

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(0);

/// How a [`GpuBuffer`] picks its new capacity when a frame outgrows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPolicy {
    /// `max(2 * capacity, required)`.
    #[default]
    Double,
    /// Exactly `required`.
    Fit,
}

impl GrowthPolicy {
    #[must_use]
    pub fn next_capacity(self, current: usize, required: usize) -> usize {
        match self {
            GrowthPolicy::Double => current.saturating_mul(2).max(required),
            GrowthPolicy::Fit => required,
        }
    }
}

/// Growable, frame-reused array of GPU-ready records.
///
/// The CPU mirror of a structured buffer. Capacity only ever grows; the
/// logical length is whatever the current frame wrote. Entries past the
/// logical length are never exposed, so records left over from an earlier,
/// larger frame cannot be read as valid.
///
/// A resize allocates fresh storage and bumps [`GpuBuffer::generation`].
/// Only the logically valid records `0..len` carry over, so reserving
/// ahead of a write never changes what the buffer exposes. Consumers
/// holding a GPU-side copy must recreate it when the generation changes.
///
/// An optional record limit models the device's storage-buffer size:
/// growing past it fails with [`PrismError::BufferLimit`].
#[derive(Debug)]
pub struct GpuBuffer<T: Pod> {
    id: u64,
    label: Cow<'static, str>,
    data: Vec<T>,
    len: usize,
    growth: GrowthPolicy,
    max_capacity: usize,
    version: u64,
    generation: u64,
}

impl<T: Pod> GpuBuffer<T> {
    /// Creates an empty buffer without allocating.
    pub fn new(label: impl Into<Cow<'static, str>>, growth: GrowthPolicy) -> Self {
        Self {
            id: NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed),
            label: label.into(),
            data: Vec::new(),
            len: 0,
            growth,
            max_capacity: usize::MAX,
            version: 0,
            generation: 0,
        }
    }

    /// Creates a buffer with room for `capacity` records.
    pub fn with_capacity(
        label: impl Into<Cow<'static, str>>,
        capacity: usize,
        growth: GrowthPolicy,
    ) -> Result<Self> {
        let mut buffer = Self::new(label, growth);
        if capacity > 0 {
            buffer.reallocate(capacity)?;
        }
        Ok(buffer)
    }

    /// Caps the number of records this buffer may ever hold.
    #[must_use]
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of records written this frame.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Incremented on every write.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Incremented on every reallocation.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth
    }

    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// The logically valid records, `0..len`.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.len]
    }

    /// The logically valid records as raw bytes, ready for upload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }

    /// Grows the buffer so it holds at least `required` records.
    ///
    /// Returns `true` if a reallocation happened.
    pub fn ensure_capacity(&mut self, required: usize) -> Result<bool> {
        if required <= self.capacity() {
            return Ok(false);
        }
        if required > self.max_capacity {
            return Err(PrismError::BufferLimit {
                label: self.label.to_string(),
                requested: required,
                limit: self.max_capacity,
            });
        }
        let new_capacity = self
            .growth
            .next_capacity(self.capacity(), required)
            .min(self.max_capacity);
        log::info!(
            "Growing buffer '{}' from {} to {} records",
            self.label,
            self.capacity(),
            new_capacity
        );
        self.reallocate(new_capacity)?;
        Ok(true)
    }

    /// Replaces this frame's contents with `records`.
    pub fn write(&mut self, records: &[T]) -> Result<()> {
        self.map_write(records.len())?.copy_from_slice(records);
        Ok(())
    }

    /// Sets the logical length to `count` and returns `0..count` for the
    /// caller to fill. Every returned entry must be overwritten.
    pub fn map_write(&mut self, count: usize) -> Result<&mut [T]> {
        self.ensure_capacity(count)?;
        self.len = count;
        self.version = self.version.wrapping_add(1);
        Ok(&mut self.data[..count])
    }

    /// Drops the logical contents, keeping the allocation.
    pub fn clear(&mut self) {
        if self.len != 0 {
            self.len = 0;
            self.version = self.version.wrapping_add(1);
        }
    }

    fn reallocate(&mut self, capacity: usize) -> Result<()> {
        let mut data: Vec<T> = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|source| PrismError::BufferGrowth {
                label: self.label.to_string(),
                requested: capacity,
                source,
            })?;
        data.extend_from_slice(&self.data[..self.len]);
        data.resize(capacity, T::zeroed());

        self.data = data;
        self.generation = self.generation.wrapping_add(1);
        Ok(())
    }
}
