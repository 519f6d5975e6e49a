//! Order-statistic selection
//!
//! Hoare-style quickselect with median-of-three pivoting. The routines work
//! in place: they consume the slice and leave it partially reordered, in
//! exchange for expected linear time and no allocation. Use [`median_of`]
//! when the caller's order has to survive.
//!
//! Termination relies on cursor crossing rather than counting, so runs of
//! equal values and presorted input cannot stall the partition loop.

/// Select the element of rank `k` (0-based, ascending) in place
///
/// After the call `items[k]` holds the value it would hold after a full
/// sort; the rest of the slice is left in unspecified order. Returns `None`
/// when `k` is out of range. Incomparable values (NaN) give an unspecified
/// but in-bounds result.
///
/// # Examples
///
/// ```
/// use mrz_core::select_nth;
///
/// let mut v = [9, 1, 8, 2, 7];
/// assert_eq!(select_nth(&mut v, 1), Some(&2));
/// ```
pub fn select_nth<T: PartialOrd>(items: &mut [T], k: usize) -> Option<&T> {
    let n = items.len();
    if k >= n {
        return None;
    }

    let mut low = 0;
    let mut high = n - 1;

    loop {
        // One element left in the active window
        if high <= low {
            return Some(&items[k]);
        }

        // Two elements: compare and swap directly
        if high == low + 1 {
            if items[low] > items[high] {
                items.swap(low, high);
            }
            return Some(&items[k]);
        }

        // Median of low, middle and high goes to low + 1 as the pivot, with
        // the smaller of the other two at low and the larger at high
        let middle = low + (high - low) / 2;
        items.swap(middle, low + 1);
        if items[low] > items[high] {
            items.swap(low, high);
        }
        if items[low + 1] > items[high] {
            items.swap(low + 1, high);
        }
        if items[low] > items[low + 1] {
            items.swap(low, low + 1);
        }

        let pivot = low + 1;
        let mut ll = pivot;
        let mut hh = high;
        loop {
            ll += 1;
            while ll < high && items[ll] < items[pivot] {
                ll += 1;
            }
            hh -= 1;
            while hh > low && items[hh] > items[pivot] {
                hh -= 1;
            }
            if hh < ll {
                break;
            }
            items.swap(ll, hh);
        }

        // Pivot into its final slot
        items.swap(pivot, hh);

        // Only the side that holds rank k is kept
        if hh <= k {
            low = ll;
        }
        if hh >= k {
            high = hh.saturating_sub(1);
        }
    }
}

/// Select the median in place
///
/// The target rank is the middle index `(n - 1) / 2`, i.e. the lower median
/// for even lengths. Returns `None` for an empty slice.
pub fn select_median<T: PartialOrd>(items: &mut [T]) -> Option<&T> {
    let k = items.len().saturating_sub(1) / 2;
    select_nth(items, k)
}

/// Median of a slice, leaving the input untouched
pub fn median_of<T: PartialOrd + Clone>(items: &[T]) -> Option<T> {
    let mut scratch = items.to_vec();
    select_median(&mut scratch).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_rank(items: &[i32], k: usize) -> i32 {
        let mut sorted = items.to_vec();
        sorted.sort_unstable();
        sorted[k]
    }

    #[test]
    fn test_select_degenerate() {
        let mut empty: [i32; 0] = [];
        assert_eq!(select_median(&mut empty), None);

        let mut one = [42];
        assert_eq!(select_median(&mut one), Some(&42));
    }

    #[test]
    fn test_select_two_elements() {
        let mut two = [5, 3];
        assert_eq!(select_median(&mut two), Some(&3));
        assert_eq!(two, [3, 5]);
    }

    #[test]
    fn test_select_three_elements() {
        for perm in [[1, 2, 3], [1, 3, 2], [2, 1, 3], [2, 3, 1], [3, 1, 2], [3, 2, 1]] {
            let mut v = perm;
            assert_eq!(select_median(&mut v), Some(&2), "perm {:?}", perm);
        }
    }

    #[test]
    fn test_select_every_rank() {
        let data = [7, 3, 9, 1, 4, 4, 8, 0, 6, 2, 5];
        for k in 0..data.len() {
            let mut v = data;
            assert_eq!(select_nth(&mut v, k), Some(&sorted_rank(&data, k)));
        }
        let mut v = data;
        assert_eq!(select_nth(&mut v, data.len()), None);
    }

    #[test]
    fn test_select_adversarial() {
        let mut equal = vec![3; 64];
        assert_eq!(select_median(&mut equal), Some(&3));

        let ascending: Vec<i32> = (0..101).collect();
        let mut v = ascending.clone();
        assert_eq!(select_median(&mut v), Some(&50));

        let mut v: Vec<i32> = ascending.iter().rev().copied().collect();
        assert_eq!(select_median(&mut v), Some(&50));
    }

    #[test]
    fn test_select_floats() {
        let mut v = [0.5, -1.25, 3.0, 2.0];
        assert_eq!(select_median(&mut v), Some(&0.5));
    }

    #[test]
    fn test_median_of_preserves_input() {
        let data = vec![4, 1, 3, 2];
        assert_eq!(median_of(&data), Some(2));
        assert_eq!(data, vec![4, 1, 3, 2]);
    }
}
