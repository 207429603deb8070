use libc::{c_void, free, malloc};

/// The general-purpose memory source the aligned allocator sits on.
///
/// Implementations only need to honour the platform's natural alignment.
/// Failure is reported with a null pointer, the same way `malloc` does.
///
/// # Safety
///
/// `release` is only ever called with a non-null pointer previously returned by
/// `allocate` on the same instance, exactly once.
pub trait RawAllocator {
  /// Returns `size` bytes of fresh memory, or null.
  unsafe fn allocate(
    &self,
    size: usize,
  ) -> *mut u8;

  /// Gives a block obtained from [`RawAllocator::allocate`] back.
  unsafe fn release(
    &self,
    address: *mut u8,
  );
}

impl<A: RawAllocator + ?Sized> RawAllocator for &A {
  unsafe fn allocate(
    &self,
    size: usize,
  ) -> *mut u8 {
    unsafe { (**self).allocate(size) }
  }

  unsafe fn release(
    &self,
    address: *mut u8,
  ) {
    unsafe { (**self).release(address) }
  }
}

/// `malloc`/`free` from the C library.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibcAllocator;

impl RawAllocator for LibcAllocator {
  unsafe fn allocate(
    &self,
    size: usize,
  ) -> *mut u8 {
    unsafe { malloc(size) as *mut u8 }
  }

  unsafe fn release(
    &self,
    address: *mut u8,
  ) {
    unsafe { free(address as *mut c_void) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_libc_round_trip() {
    let allocator = LibcAllocator;

    unsafe {
      let address = allocator.allocate(64);
      assert!(!address.is_null());

      for i in 0..64 {
        *address.add(i) = i as u8;
      }

      for i in 0..64 {
        assert_eq!(*address.add(i), i as u8);
      }

      allocator.release(address);
    }
  }

  #[test]
  fn test_libc_is_pointer_aligned() {
    let allocator = LibcAllocator;

    unsafe {
      let address = allocator.allocate(24);
      assert!(!address.is_null());
      assert_eq!(address as usize % std::mem::align_of::<usize>(), 0);
      allocator.release(address);
    }
  }
}
