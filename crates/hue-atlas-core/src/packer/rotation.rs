//! Choosing where the hue circle is cut before packing.
//!
//! Hue buckets wrap around (bin 0 and the last bin are both reds), so packing
//! them in raw index order would split neighbours across the seam. The seam is
//! placed at the largest run of empty hue buckets when one exists, otherwise at
//! a fixed fraction of the circle.

use serde::{Deserialize, Serialize};

/// A maximal run of consecutive empty hue buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub start: usize,
    pub len: usize,
}

/// Result of [`select_rotation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationChoice {
    /// Hue bucket the packing sequence starts from.
    pub start: usize,
    /// Gap the start was taken from; `None` when the fallback was used.
    pub gap: Option<Gap>,
    /// Lower bound on page count from total area.
    pub min_pages: u64,
}

/// Finds maximal runs of zero entries, scanning in index order without wrap-around.
pub fn find_gaps(sizes: &[usize]) -> Vec<Gap> {
    let mut gaps = Vec::new();
    let mut run: Option<Gap> = None;
    for (i, &n) in sizes.iter().enumerate() {
        if n == 0 {
            match run.as_mut() {
                Some(g) => g.len += 1,
                None => run = Some(Gap { start: i, len: 1 }),
            }
        } else if let Some(g) = run.take() {
            gaps.push(g);
        }
    }
    gaps.extend(run);
    gaps
}

/// `ceil(total_area / page_area)`, at least 1.
pub fn min_pages(total_area: u64, page_area: u64) -> u64 {
    if page_area == 0 {
        return 1;
    }
    total_area.div_ceil(page_area).max(1)
}

/// Picks the rotation start for the hue buckets.
///
/// `hue_sizes` holds the asset count of each hue bucket. With at least one gap,
/// the `min_pages` largest gaps are kept (earlier start wins ties) and the
/// largest of them gives the start. Without gaps the start is
/// `floor(fallback_fraction * hue_bins)`.
pub fn select_rotation(
    hue_sizes: &[usize],
    total_area: u64,
    page_area: u64,
    fallback_fraction: f64,
) -> RotationChoice {
    let min_pages = min_pages(total_area, page_area);
    let mut gaps = find_gaps(hue_sizes);
    if gaps.is_empty() {
        let bins = hue_sizes.len();
        let start = (fallback_fraction * bins as f64).floor() as usize;
        return RotationChoice {
            start: start.min(bins.saturating_sub(1)),
            gap: None,
            min_pages,
        };
    }

    // stable sort keeps index order for equal lengths
    gaps.sort_by(|a, b| b.len.cmp(&a.len));
    gaps.truncate(min_pages.min(gaps.len() as u64) as usize);
    let best = gaps[0];
    RotationChoice {
        start: best.start,
        gap: Some(best),
        min_pages,
    }
}

/// Bucket visiting order: hue buckets from `start` wrapping modulo `hue_bins`,
/// then black, white and gray.
pub fn rotation_order(hue_bins: usize, start: usize) -> Vec<usize> {
    let mut order: Vec<usize> = Vec::with_capacity(hue_bins + 3);
    if hue_bins > 0 {
        let start = start % hue_bins;
        order.extend((0..hue_bins).map(|i| (start + i) % hue_bins));
    }
    order.extend([hue_bins, hue_bins + 1, hue_bins + 2]);
    order
}
