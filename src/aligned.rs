use std::ptr::{self, NonNull};

use log::{debug, trace};

use crate::{
  align::{checked_align_up, is_power_of_two},
  error::{AlignError, AlignResult},
  header::{self, HEADER_SIZE, MAX_OFFSET, OffsetHeader},
  raw::{LibcAllocator, RawAllocator},
};

/// Largest alignment the 16-bit offset header can serve.
///
/// The displacement from the raw block to the aligned pointer is at most
/// `HEADER_SIZE + alignment - 1`, which has to fit in [`OffsetHeader`].
pub const MAX_ALIGNMENT: usize = 1 << (OffsetHeader::BITS - 1);

const _: () = assert!(HEADER_SIZE + MAX_ALIGNMENT - 1 <= MAX_OFFSET);
const _: () = assert!(HEADER_SIZE + 2 * MAX_ALIGNMENT - 1 > MAX_OFFSET);

static GLOBAL: AlignedAllocator<LibcAllocator> = AlignedAllocator::new(LibcAllocator);

/// An aligned block handed out by an [`AlignedAllocator`].
///
/// The handle owns the block. It is neither `Clone` nor `Copy`, and the only
/// way to get rid of it is [`AlignedAllocator::release`] (or leaking it through
/// [`AlignedPtr::into_raw`]), so it can't be freed twice or passed to `free`.
#[derive(Debug, PartialEq, Eq)]
pub struct AlignedPtr {
  ptr: NonNull<u8>,
  alignment: usize,
  size: usize,
}

// The handle is the unique owner of its bytes, like a `Box<[u8]>`.
unsafe impl Send for AlignedPtr {}
unsafe impl Sync for AlignedPtr {}

impl AlignedPtr {
  /// Rebuilds a handle from a pointer previously returned by [`AlignedPtr::into_raw`].
  ///
  /// # Safety
  ///
  /// `ptr` must have come out of `into_raw` on a handle with the same
  /// `alignment` and `size`, and must not have been rebuilt already.
  pub unsafe fn from_raw_parts(
    ptr: NonNull<u8>,
    alignment: usize,
    size: usize,
  ) -> Self {
    Self { ptr, alignment, size }
  }

  /// Gives up ownership without releasing the block.
  pub fn into_raw(self) -> NonNull<u8> {
    self.ptr
  }

  pub fn as_ptr(&self) -> *mut u8 {
    self.ptr.as_ptr()
  }

  pub fn as_non_null(&self) -> NonNull<u8> {
    self.ptr
  }

  pub fn addr(&self) -> usize {
    self.ptr.as_ptr() as usize
  }

  /// Usable bytes, as requested.
  pub fn size(&self) -> usize {
    self.size
  }

  /// Alignment the block was requested with.
  pub fn alignment(&self) -> usize {
    self.alignment
  }

  pub fn is_aligned_to(
    &self,
    align: usize,
  ) -> bool {
    is_power_of_two(align) && self.addr() & (align - 1) == 0
  }

  /// # Safety
  ///
  /// All `size` bytes must have been initialized.
  pub unsafe fn as_slice(&self) -> &[u8] {
    unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.size) }
  }

  /// # Safety
  ///
  /// All `size` bytes must have been initialized.
  pub unsafe fn as_mut_slice(&mut self) -> &mut [u8] {
    unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.size) }
  }
}

/// Hands out blocks aligned to any power of two up to [`MAX_ALIGNMENT`] on top
/// of an allocator that only guarantees its own natural alignment.
///
/// Each block is carved out of a single over-allocation:
///
/// ```text
///   raw                         aligned (multiple of alignment)
///   │                           │
///   ▼                           ▼
///   ┌─────────────────┬────────┬──────────────────────────┬─────────┐
///   │     padding     │ offset │       size bytes         │  slack  │
///   └─────────────────┴────────┴──────────────────────────┴─────────┘
///                      2 bytes
///   ◄──────────── offset ──────►
/// ```
///
/// The allocator keeps no state of its own, so it is `Send`/`Sync` whenever the
/// underlying allocator is.
#[derive(Debug, Default)]
pub struct AlignedAllocator<A = LibcAllocator> {
  inner: A,
}

impl<A: RawAllocator> AlignedAllocator<A> {
  pub const fn new(inner: A) -> Self {
    Self { inner }
  }

  /// The underlying allocator.
  pub fn inner(&self) -> &A {
    &self.inner
  }

  /// Allocates `size` bytes whose address is a multiple of `alignment`.
  ///
  /// Returns `None` when either argument is zero or the underlying allocator
  /// is out of memory. A bad alignment is rejected even when `size` is zero.
  ///
  /// # Panics
  ///
  /// If `alignment` is not a power of two or is larger than [`MAX_ALIGNMENT`].
  pub fn allocate(
    &self,
    alignment: usize,
    size: usize,
  ) -> Option<AlignedPtr> {
    match self.try_allocate(alignment, size) {
      Ok(ptr) => Some(ptr),
      Err(error) if error.is_contract_violation() => {
        panic!("invalid aligned allocation request: {error}")
      },
      Err(_) => None,
    }
  }

  /// Like [`AlignedAllocator::allocate`], but zero-fills the block.
  pub fn allocate_zeroed(
    &self,
    alignment: usize,
    size: usize,
  ) -> Option<AlignedPtr> {
    let ptr = self.allocate(alignment, size)?;
    unsafe { ptr::write_bytes(ptr.as_ptr(), 0, size) };
    Some(ptr)
  }

  /// Checked allocation: every way of not getting a block is an [`AlignError`].
  pub fn try_allocate(
    &self,
    alignment: usize,
    size: usize,
  ) -> AlignResult<AlignedPtr> {
    if alignment == 0 {
      return Err(AlignError::ZeroAlignment);
    }

    if !is_power_of_two(alignment) {
      return Err(AlignError::NotPowerOfTwo { alignment });
    }

    if alignment > MAX_ALIGNMENT {
      return Err(AlignError::AlignmentTooLarge {
        alignment,
        max: MAX_ALIGNMENT,
      });
    }

    if size == 0 {
      return Err(AlignError::ZeroSize);
    }

    let total_size = size
      .checked_add(HEADER_SIZE + alignment - 1)
      .ok_or(AlignError::SizeOverflow { size, alignment })?;

    let raw = unsafe { self.inner.allocate(total_size) };

    let Some(raw) = NonNull::new(raw) else {
      debug!("aligned allocation failed: {total_size} bytes requested for size = {size}, alignment = {alignment}");
      return Err(AlignError::OutOfMemory { size, alignment });
    };

    let raw_start = raw.as_ptr() as usize;

    // A block of `total_size` bytes ends below `usize::MAX`, so this only fails
    // for a raw allocator handing out bogus addresses.
    let Some(aligned_start) = checked_align_up(raw_start + HEADER_SIZE, alignment) else {
      unsafe { self.inner.release(raw.as_ptr()) };
      return Err(AlignError::SizeOverflow { size, alignment });
    };
    let offset = aligned_start - raw_start;

    debug_assert!((HEADER_SIZE..=HEADER_SIZE + alignment - 1).contains(&offset));
    debug_assert!(offset <= MAX_OFFSET);

    let aligned = unsafe {
      let aligned = raw.add(offset);
      header::write(aligned.as_ptr(), offset as OffsetHeader);
      aligned
    };

    trace!(
      "Allocated {} bytes aligned to {}, raw = {:?}, aligned = {:?}, offset = {}",
      size,
      alignment,
      raw,
      aligned,
      offset
    );

    Ok(AlignedPtr {
      ptr: aligned,
      alignment,
      size,
    })
  }

  /// Returns the block behind `ptr` to the underlying allocator.
  ///
  /// # Safety
  ///
  /// `ptr` must have been allocated by this allocator, or by one sharing the
  /// same underlying allocator. The bytes right before it must not have been
  /// written to.
  pub unsafe fn release(
    &self,
    ptr: AlignedPtr,
  ) {
    unsafe {
      let aligned = ptr.as_ptr();
      let offset = header::read(aligned) as usize;
      let raw = aligned.sub(offset);

      trace!(
        "Released {} bytes aligned to {}, raw = {:?}, aligned = {:?}, offset = {}",
        ptr.size,
        ptr.alignment,
        raw,
        aligned,
        offset
      );

      self.inner.release(raw);
    }
  }
}

/// [`AlignedAllocator::allocate`] on a process-wide allocator backed by `malloc`.
pub fn memalign(
  alignment: usize,
  size: usize,
) -> Option<AlignedPtr> {
  GLOBAL.allocate(alignment, size)
}

/// Releases a block obtained from [`memalign`].
///
/// # Safety
///
/// `ptr` must come from [`memalign`] or from any `AlignedAllocator<LibcAllocator>`.
pub unsafe fn aligned_free(ptr: AlignedPtr) {
  unsafe { GLOBAL.release(ptr) }
}
