/// Rounds `value` up to the next multiple of `align`.
///
/// `align` must be a power of two, the mask trick is meaningless otherwise.
///
/// # Examples
///
/// ```rust
/// use memalign::align_up;
///
/// assert_eq!(align_up!(13, 8), 16);
/// assert_eq!(align_up!(32, 32), 32);
/// assert_eq!(align_up!(33, 32), 64);
/// ```
#[macro_export]
macro_rules! align_up {
  ($value:expr, $align:expr) => {
    ($value + $align - 1) & !($align - 1)
  };
}

/// Returns `true` when `value` is a non-zero power of two.
pub const fn is_power_of_two(value: usize) -> bool {
  value != 0 && value & (value - 1) == 0
}

/// Overflow-checked [`align_up!`], for address arithmetic near `usize::MAX`.
///
/// Returns `None` when `align` is not a power of two as well.
pub const fn checked_align_up(
  value: usize,
  align: usize,
) -> Option<usize> {
  if !is_power_of_two(align) {
    return None;
  }

  match value.checked_add(align - 1) {
    Some(bumped) => Some(bumped & !(align - 1)),
    None => None,
  }
}
