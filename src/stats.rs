use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::raw::{LibcAllocator, RawAllocator};

/// Snapshot of a [`CountingAllocator`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorStats {
  pub allocations: usize,
  pub releases: usize,
  pub failures: usize,
  pub bytes_requested: usize,
}

impl AllocatorStats {
  /// Raw blocks handed out and not yet returned.
  pub fn outstanding(&self) -> usize {
    self.allocations.saturating_sub(self.releases)
  }
}

/// Wraps a [`RawAllocator`] and counts what goes through it.
///
/// Can also be told to fail, which simulates an exhausted heap without the
/// inner allocator ever being asked.
#[derive(Debug, Default)]
pub struct CountingAllocator<A = LibcAllocator> {
  inner: A,
  allocations: AtomicUsize,
  releases: AtomicUsize,
  failures: AtomicUsize,
  bytes_requested: AtomicUsize,
  fail: AtomicBool,
}

impl<A: RawAllocator> CountingAllocator<A> {
  pub fn new(inner: A) -> Self {
    Self {
      inner,
      allocations: AtomicUsize::new(0),
      releases: AtomicUsize::new(0),
      failures: AtomicUsize::new(0),
      bytes_requested: AtomicUsize::new(0),
      fail: AtomicBool::new(false),
    }
  }

  /// Makes every following allocation return null until switched off again.
  pub fn set_fail(
    &self,
    fail: bool,
  ) {
    self.fail.store(fail, Ordering::SeqCst);
  }

  /// Snapshot of the counters.
  ///
  /// `releases` is read before `allocations`: a block is always counted as
  /// allocated before it can be released, so the snapshot never shows more
  /// releases than allocations.
  pub fn stats(&self) -> AllocatorStats {
    let releases = self.releases.load(Ordering::SeqCst);
    let allocations = self.allocations.load(Ordering::SeqCst);

    AllocatorStats {
      allocations,
      releases,
      failures: self.failures.load(Ordering::SeqCst),
      bytes_requested: self.bytes_requested.load(Ordering::SeqCst),
    }
  }

  pub fn outstanding(&self) -> usize {
    self.stats().outstanding()
  }

  pub fn inner(&self) -> &A {
    &self.inner
  }
}

impl<A: RawAllocator> RawAllocator for CountingAllocator<A> {
  unsafe fn allocate(
    &self,
    size: usize,
  ) -> *mut u8 {
    if self.fail.load(Ordering::SeqCst) {
      self.failures.fetch_add(1, Ordering::SeqCst);
      return std::ptr::null_mut();
    }

    let address = unsafe { self.inner.allocate(size) };

    if address.is_null() {
      self.failures.fetch_add(1, Ordering::SeqCst);
    } else {
      self.allocations.fetch_add(1, Ordering::SeqCst);
      self.bytes_requested.fetch_add(size, Ordering::SeqCst);
    }

    address
  }

  unsafe fn release(
    &self,
    address: *mut u8,
  ) {
    self.releases.fetch_add(1, Ordering::SeqCst);
    unsafe { self.inner.release(address) }
  }
}
