/// Integer binary search over a monotone predicate.
use crate::error::{CarrotError, Result};

/// Smallest `x` in `[low, high]` with `predicate(x)`.
///
/// The predicate must be monotone (false ... false true ... true). If it never
/// holds inside the range, `high` is returned.
pub fn binary_search<P>(low: i32, high: i32, mut predicate: P) -> Result<i32>
where
    P: FnMut(i32) -> bool,
{
    try_binary_search(low, high, |x| Ok(predicate(x)))
}

/// Same as [`binary_search`] for a predicate that can itself fail.
pub fn try_binary_search<P>(mut low: i32, mut high: i32, mut predicate: P) -> Result<i32>
where
    P: FnMut(i32) -> Result<bool>,
{
    if low > high {
        return Err(CarrotError::InvertedBounds { low, high });
    }
    while low < high {
        let mid = low + (high - low).div_euclid(2);
        if predicate(mid)? {
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    Ok(low)
}
