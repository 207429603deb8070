use std::{mem, ptr};

/// Distance, in bytes, from the start of the raw block to the aligned pointer.
pub type OffsetHeader = u16;

/// Bytes reserved in front of every aligned pointer.
pub const HEADER_SIZE: usize = mem::size_of::<OffsetHeader>();

/// Largest displacement the header can record.
pub const MAX_OFFSET: usize = OffsetHeader::MAX as usize;

/// Stores `offset` in the header slot right before `aligned`.
///
/// A [`RawAllocator`](crate::RawAllocator) may hand out odd addresses, so the
/// slot is only byte aligned and the write is unaligned.
///
/// # Safety
///
/// `aligned - HEADER_SIZE .. aligned` must be writable memory owned by the
/// caller.
pub unsafe fn write(
  aligned: *mut u8,
  offset: OffsetHeader,
) {
  unsafe {
    let slot = aligned.sub(HEADER_SIZE) as *mut OffsetHeader;
    ptr::write_unaligned(slot, offset);
  }
}

/// Reads back the offset stored by [`write`].
///
/// # Safety
///
/// `aligned` must come from an allocation whose header was written with
/// [`write`] and not yet released.
pub unsafe fn read(aligned: *const u8) -> OffsetHeader {
  unsafe {
    let slot = aligned.sub(HEADER_SIZE) as *const OffsetHeader;
    ptr::read_unaligned(slot)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_header_sits_right_before_pointer() {
    let mut buffer = [0u8; 8];

    unsafe {
      let aligned = buffer.as_mut_ptr().add(3);
      write(aligned, 0xBEEF);

      assert_eq!(read(aligned), 0xBEEF);
    }

    assert_eq!(&buffer[1..3], &0xBEEFu16.to_ne_bytes());
    assert_eq!(buffer[0], 0);
    assert_eq!(&buffer[3..], &[0; 5]);
  }

  #[test]
  fn test_header_limits() {
    assert_eq!(HEADER_SIZE, 2);
    assert_eq!(MAX_OFFSET, 65535);
  }
}
