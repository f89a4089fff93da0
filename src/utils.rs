//! # Library-Internal Utilities

/// Integer division rounding towards negative infinity
///
/// # Panics
///
/// If `div` is `0`.
#[cfg_attr(feature = "internals", visibility::make(pub))]
#[cfg_attr(docsrs, doc(cfg(feature = "internals")))]
#[must_use]
pub(crate) fn div_floor(num: i64, div: i64) -> i64 {
    debug_assert_ne!(div, 0);
    let quot = num / div;
    if (num % div != 0) && ((num < 0) != (div < 0)) {
        quot - 1
    } else {
        quot
    }
}

/// Integer division rounding towards positive infinity
///
/// # Panics
///
/// If `div` is `0`.
#[cfg_attr(feature = "internals", visibility::make(pub))]
#[cfg_attr(docsrs, doc(cfg(feature = "internals")))]
#[must_use]
pub(crate) fn div_ceil(num: i64, div: i64) -> i64 {
    debug_assert_ne!(div, 0);
    let quot = num / div;
    if (num % div != 0) && ((num < 0) == (div < 0)) {
        quot + 1
    } else {
        quot
    }
}

/// Like [`div_floor`], `None` if the quotient overflows
#[must_use]
pub(crate) fn checked_div_floor(num: i64, div: i64) -> Option<i64> {
    num.checked_div(div).map(|_| div_floor(num, div))
}

/// Finds the first index in `0..` for which `pred` is `false`, assuming `pred`
/// is `true` on a prefix and `false` afterwards. If `len` is `None`, the range
/// is unbounded and the search gallops until it finds a `false` value.
pub(crate) fn partition_point<P>(len: Option<usize>, mut pred: P) -> usize
where
    P: FnMut(usize) -> bool,
{
    let (mut lo, mut hi) = match len {
        Some(len) => (0, len),
        None => {
            let mut hi = 1;
            while pred(hi - 1) {
                hi *= 2;
            }
            (hi / 2, hi - 1)
        }
    };
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

macro_rules! unreachable_none {
    ($opt:expr) => {{
        if let Some(val) = $opt {
            val
        } else {
            unreachable!()
        }
    }};
}
pub(crate) use unreachable_none;
