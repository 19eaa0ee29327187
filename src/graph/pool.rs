//! Reusable index buffers for the short-lived arrays that every mutation needs. Buffers are
//! bucketed by power-of-two size class and handed back to their thread's pool when the
//! [PooledIndices] guard drops.

use core::ops::{Deref, DerefMut};
use std::{cell::RefCell, mem};

/// Buffers retained per size class, beyond which returned buffers are simply freed
const MAX_PER_CLASS: usize = 8;

#[derive(Debug, Default)]
pub struct IndexPool {
    classes: Vec<Vec<Vec<usize>>>,
}

impl IndexPool {
    fn take(&mut self, len: usize) -> Vec<usize> {
        let class = size_class(len);
        let mut buf = self
            .classes
            .get_mut(class)
            .and_then(Vec::pop)
            .unwrap_or_else(|| Vec::with_capacity(1 << class));
        buf.clear();
        buf
    }

    fn give(&mut self, buf: Vec<usize>) {
        if buf.capacity() == 0 {
            return;
        }

        // floor(log2(capacity)), so a buffer never lands in a class larger than it can serve
        let class = (usize::BITS - 1 - buf.capacity().leading_zeros()) as usize;
        if self.classes.len() <= class {
            self.classes.resize_with(class + 1, Vec::new);
        }

        let bucket = &mut self.classes[class];
        if bucket.len() < MAX_PER_CLASS {
            bucket.push(buf);
        }
    }

    /// Number of buffers currently parked in the pool
    pub fn parked(&self) -> usize {
        self.classes.iter().map(Vec::len).sum()
    }
}

#[inline]
fn size_class(len: usize) -> usize {
    len.max(1).next_power_of_two().trailing_zeros() as usize
}

thread_local! {
    static POOL: RefCell<IndexPool> = RefCell::new(IndexPool::default());
}

/// Number of buffers parked in this thread's pool
pub fn parked() -> usize {
    POOL.with(|p| p.borrow().parked())
}

/// A buffer borrowed from this thread's pool, returned when dropped
#[derive(Debug)]
pub struct PooledIndices {
    buf: Vec<usize>,
}

impl PooledIndices {
    /// An empty buffer with capacity for at least `len` indices
    pub fn with_capacity(len: usize) -> Self {
        Self {
            buf: POOL.with(|p| p.borrow_mut().take(len)),
        }
    }

    /// A buffer of `len` copies of `value`
    pub fn filled(len: usize, value: usize) -> Self {
        let mut pooled = Self::with_capacity(len);
        pooled.buf.resize(len, value);
        pooled
    }
}

impl Deref for PooledIndices {
    type Target = Vec<usize>;

    fn deref(&self) -> &Vec<usize> {
        &self.buf
    }
}

impl DerefMut for PooledIndices {
    fn deref_mut(&mut self) -> &mut Vec<usize> {
        &mut self.buf
    }
}

impl Drop for PooledIndices {
    fn drop(&mut self) {
        let buf = mem::take(&mut self.buf);
        // the pool may already be gone during thread teardown, in which case the buffer is freed
        let _ = POOL.try_with(|p| p.borrow_mut().give(buf));
    }
}
