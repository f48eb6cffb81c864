//! A small pool of reusable byte buffers.

use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

const DEFAULT_MAX_POOLED: usize = 64;
/// Buffers that grew beyond this are dropped instead of pooled.
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

pub(crate) struct BufferPool {
  buffers: Mutex<Vec<Vec<u8>>>,
  max_pooled: usize,
}

impl BufferPool {
  pub(crate) fn new() -> Self {
    Self::with_limit(DEFAULT_MAX_POOLED)
  }

  pub(crate) fn with_limit(max_pooled: usize) -> Self {
    Self {
      buffers: Mutex::new(Vec::new()),
      max_pooled,
    }
  }

  /// Takes an empty buffer out of the pool; it goes back when the guard drops.
  pub(crate) fn acquire(&self) -> PooledBuffer<'_> {
    let buf = self.buffers.lock().pop().unwrap_or_default();
    PooledBuffer { pool: self, buf }
  }

  fn release(&self, mut buf: Vec<u8>) {
    if buf.capacity() > MAX_RETAINED_CAPACITY {
      return;
    }
    buf.clear();
    let mut buffers = self.buffers.lock();
    if buffers.len() < self.max_pooled {
      buffers.push(buf);
    }
  }

  #[cfg(test)]
  fn pooled(&self) -> usize {
    self.buffers.lock().len()
  }
}

pub(crate) struct PooledBuffer<'a> {
  pool: &'a BufferPool,
  buf: Vec<u8>,
}

impl Deref for PooledBuffer<'_> {
  type Target = Vec<u8>;

  fn deref(&self) -> &Vec<u8> {
    &self.buf
  }
}

impl DerefMut for PooledBuffer<'_> {
  fn deref_mut(&mut self) -> &mut Vec<u8> {
    &mut self.buf
  }
}

impl Drop for PooledBuffer<'_> {
  fn drop(&mut self) {
    let buf = std::mem::take(&mut self.buf);
    self.pool.release(buf);
  }
}
