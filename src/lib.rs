//! # memalign - Aligned Blocks on Top of Any Heap
//!
//! This crate hands out memory blocks whose start address is a multiple of a
//! caller-chosen power of two, on top of an allocator (by default `malloc`)
//! that only promises its own natural alignment.
//!
//! ## Overview
//!
//! Every request is served by over-allocating from the underlying allocator
//! and picking the first suitably aligned address inside the block that still
//! leaves room for a 2 byte header in front of it:
//!
//! ```text
//!   allocator.allocate(32, size):
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                 raw block: size + 2 + (32 - 1) bytes                 │
//!   │                                                                      │
//!   │   ┌──────────┬────────┬────────────────────────────────┬─────────┐   │
//!   │   │ padding  │ offset │          size bytes            │  slack  │   │
//!   │   └──────────┴────────┴────────────────────────────────┴─────────┘   │
//!   │   ▲                   ▲                                              │
//!   │   │                   │                                              │
//!   │  raw              aligned % 32 == 0                                  │
//!   │                   (returned to the caller)                           │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The header stores `aligned - raw`. On release it is read back, the raw
//! address is recovered and handed to the underlying allocator. No side table
//! is kept anywhere.
//!
//! ## Crate Structure
//!
//! ```text
//!   memalign
//!   ├── align      - Power-of-two helpers (align_up!)
//!   ├── header     - Offset header stored in front of each block (internal)
//!   ├── raw        - RawAllocator trait, LibcAllocator
//!   ├── stats      - CountingAllocator instrumentation
//!   ├── error      - AlignError
//!   └── aligned    - AlignedAllocator, AlignedPtr, memalign/aligned_free
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use memalign::{AlignedAllocator, LibcAllocator};
//!
//! let allocator = AlignedAllocator::new(LibcAllocator);
//!
//! let block = allocator.allocate(64, 1000).expect("out of memory");
//! assert_eq!(block.addr() % 64, 0);
//!
//! unsafe {
//!     block.as_ptr().write_bytes(0xAB, block.size());
//!     allocator.release(block);
//! }
//! ```
//!
//! ## Limits
//!
//! - **Alignment**: powers of two up to [`MAX_ALIGNMENT`] (32 KiB), the most a
//!   16 bit header can describe. Anything else is a caller error and panics in
//!   [`AlignedAllocator::allocate`]; [`AlignedAllocator::try_allocate`] reports
//!   it as an [`AlignError`] instead.
//! - **Zero sizes**: `alignment == 0` or `size == 0` allocate nothing.
//! - **No resizing**: blocks can't grow or shrink in place.
//!
//! ## Safety
//!
//! [`AlignedPtr`] owns its block and can only be consumed by
//! [`AlignedAllocator::release`], so it can't be double freed or passed to
//! `free`. Releasing it through an allocator with a different underlying heap
//! is still undefined behaviour, which is why `release` is `unsafe`.

pub mod align;
mod aligned;
mod error;
mod header;
mod raw;
mod stats;

pub use aligned::{AlignedAllocator, AlignedPtr, MAX_ALIGNMENT, aligned_free, memalign};
pub use error::{AlignError, AlignResult};
pub use header::{HEADER_SIZE, OffsetHeader};
pub use raw::{LibcAllocator, RawAllocator};
pub use stats::{AllocatorStats, CountingAllocator};
