//! Error type for checked aligned allocations.

use thiserror::Error;

/// Result type for [`AlignedAllocator::try_allocate`](crate::AlignedAllocator::try_allocate).
pub type AlignResult<T> = Result<T, AlignError>;

/// Why an aligned allocation did not produce a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AlignError {
  /// Alignment of zero, a no-op request.
  #[error("alignment is zero")]
  ZeroAlignment,

  /// Size of zero, a no-op request.
  #[error("size is zero")]
  ZeroSize,

  /// The mask arithmetic only works for powers of two.
  #[error("alignment {alignment} is not a power of two")]
  NotPowerOfTwo { alignment: usize },

  /// The offset header cannot record the displacement this alignment may need.
  #[error("alignment {alignment} exceeds the supported maximum of {max}")]
  AlignmentTooLarge { alignment: usize, max: usize },

  /// `size` plus header and alignment slack does not fit in a `usize`.
  #[error("size {size} with alignment {alignment} overflows the address space")]
  SizeOverflow { size: usize, alignment: usize },

  /// The underlying allocator returned null.
  #[error("out of memory allocating {size} bytes aligned to {alignment}")]
  OutOfMemory { size: usize, alignment: usize },
}

impl AlignError {
  /// Caller errors that [`AlignedAllocator::allocate`](crate::AlignedAllocator::allocate)
  /// turns into a panic instead of a null result.
  pub fn is_contract_violation(&self) -> bool {
    matches!(self, Self::NotPowerOfTwo { .. } | Self::AlignmentTooLarge { .. })
  }
}
