//! Render buffers and the allocator seam used to obtain them.
//!
//! Each format-and-emit attempt owns exactly one [`RenderBuffer`]; the buffer
//! is dropped before the next attempt allocates. Allocation goes through
//! [`BufferAlloc`] so exhaustion is reported instead of aborting the process.

use thiserror::Error;

/// Allocation of a render buffer failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("allocation of {capacity} bytes failed")]
pub struct AllocError {
    pub capacity: usize,
}

/// Owned, zero-filled byte buffer of a fixed capacity.
#[derive(Debug)]
pub struct RenderBuffer {
    bytes: Vec<u8>,
}

impl RenderBuffer {
    /// Allocate exactly `capacity` bytes, reporting exhaustion as an error.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, AllocError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|_| AllocError { capacity })?;
        bytes.resize(capacity, 0);
        Ok(Self { bytes })
    }

    /// Capacity this buffer was requested with.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

/// Source of render buffers.
pub trait BufferAlloc {
    fn allocate(&mut self, capacity: usize) -> Result<RenderBuffer, AllocError>;
}

impl<A: BufferAlloc + ?Sized> BufferAlloc for &mut A {
    fn allocate(&mut self, capacity: usize) -> Result<RenderBuffer, AllocError> {
        (**self).allocate(capacity)
    }
}

/// The global allocator, with fallible reservation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAlloc;

impl BufferAlloc for SystemAlloc {
    fn allocate(&mut self, capacity: usize) -> Result<RenderBuffer, AllocError> {
        RenderBuffer::try_with_capacity(capacity)
    }
}

/// Allocator that records every request and can fail a chosen attempt.
///
/// Used by tests and the conformance harness to observe the grow-to-fit
/// sequence (`1024 -> 2001`, ...) and to inject exhaustion.
#[derive(Debug, Default, Clone)]
pub struct RecordingAlloc {
    fail_on_attempt: Option<u32>,
    requests: Vec<usize>,
}

impl RecordingAlloc {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `attempt`-th allocation (1-based) and every one after it.
    #[must_use]
    pub fn failing_on(attempt: u32) -> Self {
        Self {
            fail_on_attempt: Some(attempt),
            requests: Vec::new(),
        }
    }

    /// Capacities requested so far, in order, including the failed one.
    #[must_use]
    pub fn requests(&self) -> &[usize] {
        &self.requests
    }

    pub fn reset(&mut self) {
        self.requests.clear();
    }
}

impl BufferAlloc for RecordingAlloc {
    fn allocate(&mut self, capacity: usize) -> Result<RenderBuffer, AllocError> {
        self.requests.push(capacity);
        match self.fail_on_attempt {
            Some(n) if self.requests.len() >= n as usize => Err(AllocError { capacity }),
            _ => RenderBuffer::try_with_capacity(capacity),
        }
    }
}
