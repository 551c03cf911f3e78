//! Exact-match binary search with a tri-state comparator.
//!
//! A standard lower-bound search needs a final comparison to distinguish a
//! hit from a miss; folding that into a three-valued comparator saves one
//! probe, which on this path means one less page read.

use std::cmp::Ordering;

use spandb_result::Result;

/// Binary search over `[0, n)` for the single index whose comparator returns
/// `Equal`. Returns `None` when every probe points away.
///
/// The comparator must be monotone: `Less` (target is left of or at the
/// probe), then at most one `Equal`, then `Greater`.
pub fn binary_search_by<F>(n: usize, mut compare: F) -> Result<Option<usize>>
where
    F: FnMut(usize) -> Result<Ordering>,
{
    let mut i = 0usize;
    let mut j = n;
    while i < j {
        let h = (i + j) / 2;
        // i <= h < j
        match compare(h)? {
            Ordering::Equal => return Ok(Some(h)),
            Ordering::Less => j = h,
            Ordering::Greater => i = h + 1,
        }
    }
    Ok(None)
}
