/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pure arithmetic helpers for the consecutive-session cap.
//!
//! A window is a run of `limit + 1` consecutive periods within one day.  A
//! window that contains both period `break_after` and `break_after + 1`
//! straddles the break; the break resets the consecutive count, so such a
//! window is never constrained.

use std::ops::Range;

/// `true` if the 1-based periods `first ..= first + len - 1` contain both
/// `break_after` and `break_after + 1`.
///
/// Always `false` when there is no break or the window is empty.
pub fn straddles_break(first: u32, len: u32, break_after: Option<u32>) -> bool {
    let Some(b) = break_after else {
        return false;
    };
    if len == 0 {
        return false;
    }
    let last = first + len - 1;
    first <= b && last > b
}

/// All windows of `limit + 1` periods within a day of `periods` periods that
/// must carry the cap, as 0-based half-open period ranges.
///
/// Returns nothing when the day is too short to hold a single window.
pub fn capped_windows(periods: usize, limit: u32, break_after: Option<u32>) -> Vec<Range<usize>> {
    let len = limit as usize + 1;
    if len > periods {
        return Vec::new();
    }
    (0..=periods - len)
        .filter(|&start| !straddles_break(start as u32 + 1, len as u32, break_after))
        .map(|start| start..start + len)
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_across_break_is_exempt() {
        // breakAfter = 4, limit = 2 → windows of 3 periods
        assert!(straddles_break(4, 3, Some(4)), "[4,5,6] spans the break");
        assert!(straddles_break(3, 3, Some(4)), "[3,4,5] spans the break");
    }

    #[test]
    fn window_before_or_after_break_is_constrained() {
        assert!(!straddles_break(2, 3, Some(4)), "[2,3,4] ends at the break");
        assert!(!straddles_break(5, 3, Some(4)), "[5,6,7] starts after it");
        assert!(!straddles_break(1, 3, Some(4)));
    }

    #[test]
    fn no_break_means_no_exemption() {
        assert!(!straddles_break(4, 3, None));
        assert!(!straddles_break(1, 0, Some(1)));
    }

    #[test]
    fn capped_windows_skip_the_break() {
        // 6 periods, breakAfter = 4, limit = 2
        // candidate 1-based windows: [1-3] [2-4] [3-5]x [4-6]x
        let w = capped_windows(6, 2, Some(4));
        assert_eq!(w, vec![0..3, 1..4]);
    }

    #[test]
    fn capped_windows_without_break_cover_the_day() {
        let w = capped_windows(5, 1, None);
        assert_eq!(w, vec![0..2, 1..3, 2..4, 3..5]);
    }

    #[test]
    fn day_shorter_than_window_has_no_windows() {
        assert!(capped_windows(3, 3, None).is_empty());
        assert_eq!(capped_windows(3, 2, None), vec![0..3]);
    }
}
