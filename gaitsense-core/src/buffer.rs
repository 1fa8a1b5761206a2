//! Fixed-Size Circular Buffer for Streaming Sensor Windows
//!
//! ## Overview
//!
//! The analyzer keeps a rolling window of aligned motion samples for spectral
//! analysis, plus a shorter ring of vertical acceleration for the bounce
//! diagnostic. Both are served by this ring buffer, whose capacity is fixed at
//! compile time through const generics.
//!
//! ## Design Rationale
//!
//! A circular buffer gives constant-time operations with fixed memory:
//! - O(1) insertion (overwrites oldest when full)
//! - O(1) access to most recent sample
//! - O(n) iteration over the window, oldest first
//! - Zero heap allocations after construction
//!
//! ### Why Not Use `heapless::Vec`?
//!
//! 1. **Automatic Overwrite**: When full, the oldest sample is discarded rather
//!    than the push failing. For a sliding analysis window that is exactly the
//!    behavior we want.
//!
//! 2. **Chronological Iteration**: The FFT needs samples in arrival order. The
//!    buffer translates logical to physical indices so callers never see the
//!    wrap point.
//!
//! ### Memory Layout
//!
//! ```text
//! CircularBuffer<T, 5> after 7 pushes (A..G):
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  F  │  G  │  C  │  D  │  E  │  ← physical slots
//! └─────┴─────┴─────┴─────┴─────┘
//!                ↑
//!                └── write_pos = 2 (also the oldest sample)
//!
//! Logical view: [C, D, E, F, G]
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use gaitsense_core::buffer::CircularBuffer;
//!
//! let mut window: CircularBuffer<f64, 4> = CircularBuffer::new();
//! for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
//!     window.push(v);
//! }
//!
//! let values: Vec<f64> = window.iter().copied().collect();
//! assert_eq!(values, vec![2.0, 3.0, 4.0, 5.0]);
//! assert_eq!(window.last(), Some(&5.0));
//! ```

/// Fixed-size circular buffer for time-series samples
///
/// ## Type Parameters
///
/// - `T`: Sample type. Must be `Copy` so slots can be initialized without
///   unsafe code.
/// - `N`: Maximum number of samples. Prefer powers of two; the modulo in
///   `push()` then compiles to a mask.
///
/// ## Internal Invariants
///
/// - `write_pos < N`
/// - `len <= N`
/// - Iteration yields samples oldest to newest
///
/// ## Thread Safety
///
/// Not synchronized. The pipeline is single-writer by contract.
#[derive(Clone)]
pub struct CircularBuffer<T: Copy, const N: usize> {
    /// Storage; `None` marks slots that have never been written
    data: [Option<T>; N],

    /// Index where the next write will occur
    write_pos: usize,

    /// Current number of valid samples
    len: usize,
}

impl<T: Copy, const N: usize> CircularBuffer<T, N> {
    /// Creates a new empty circular buffer
    pub const fn new() -> Self {
        Self {
            data: [None; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Compile-time capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Adds a sample, overwriting the oldest one when full
    pub fn push(&mut self, sample: T) {
        if N == 0 {
            return;
        }

        self.data[self.write_pos] = Some(sample);
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }
    }

    /// Number of stored samples
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Most recent sample
    pub fn last(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }

        let idx = if self.write_pos == 0 { N - 1 } else { self.write_pos - 1 };
        self.data[idx].as_ref()
    }

    /// Iterate over samples from oldest to newest
    pub fn iter(&self) -> CircularBufferIter<'_, T, N> {
        CircularBufferIter {
            buffer: self,
            index: 0,
        }
    }

    /// Iterate over the newest `count` samples, oldest first
    ///
    /// Yields fewer than `count` items when the buffer holds fewer.
    pub fn recent(&self, count: usize) -> CircularBufferIter<'_, T, N> {
        CircularBufferIter {
            buffer: self,
            index: self.len.saturating_sub(count),
        }
    }

    /// Clear all samples
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }

    /// Gets a sample by logical index (0 = oldest, len-1 = newest)
    ///
    /// ```text
    /// Physical array:  [D, E, A, B, C]  (write_pos = 2)
    /// Logical view:    [A, B, C, D, E]
    /// Mapping: logical[i] = physical[(write_pos + i) % N]
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }

        let actual_index = if self.len < N {
            index
        } else {
            (self.write_pos + index) % N
        };

        self.data[actual_index].as_ref()
    }
}

/// Iterator over circular buffer contents
pub struct CircularBufferIter<'a, T: Copy, const N: usize> {
    buffer: &'a CircularBuffer<T, N>,
    index: usize,
}

impl<'a, T: Copy, const N: usize> Iterator for CircularBufferIter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'a, T: Copy, const N: usize> ExactSizeIterator for CircularBufferIter<'a, T, N> {}

impl<T: Copy, const N: usize> Default for CircularBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
