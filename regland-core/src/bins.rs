//! Conservation density binning.
//!
//! Aggregates annotated intervals into fixed-width density bins over a gene
//! region. Deterministic: the same region and interval list always produce
//! the same bins.

use crate::types::{ConservationClass, Enhancer, GenomicPos};

pub const DEFAULT_BIN_COUNT: usize = 100;

/// Density of conserved enhancers over `[region_start, region_end)` as
/// `nbins` integers in [0, 100], normalized against the fullest bin.
///
/// A region with no conserved intervals yields all-zero bins.
pub fn conservation_bins(
    region_start: GenomicPos,
    region_end: GenomicPos,
    enhancers: &[Enhancer],
    nbins: usize,
) -> Vec<u32> {
    let counts = class_bin_counts(
        region_start,
        region_end,
        enhancers,
        ConservationClass::Conserved,
        nbins,
    );
    let max_count = counts.iter().copied().max().unwrap_or(0).max(1);
    counts
        .iter()
        .map(|&c| (c as f64 / max_count as f64 * 100.0).round() as u32)
        .collect()
}

/// Raw per-bin overlap counts for intervals of one conservation class.
fn class_bin_counts(
    region_start: GenomicPos,
    region_end: GenomicPos,
    enhancers: &[Enhancer],
    class: ConservationClass,
    nbins: usize,
) -> Vec<u32> {
    let mut counts = vec![0u32; nbins];
    if nbins == 0 || region_end <= region_start {
        return counts;
    }
    let bin_width = (region_end - region_start) as f64 / nbins as f64;

    for enh in enhancers.iter().filter(|e| e.class == class) {
        // Clip to the region; skip clips that come out empty or inverted.
        let start = enh.start.max(region_start);
        let end = enh.end.min(region_end);
        if end <= start {
            continue;
        }
        let rel_start = (start - region_start) as f64;
        let rel_end = (end - region_start) as f64;

        // Inclusive index range of overlapped bins; the end is exclusive in
        // bp, so a boundary-aligned interval does not spill into the next bin.
        let first = (rel_start / bin_width).floor() as usize;
        let last = ((rel_end / bin_width).ceil() as usize).saturating_sub(1);
        let first = first.min(nbins - 1);
        let last = last.clamp(first, nbins - 1);
        for bin in &mut counts[first..=last] {
            *bin += 1;
        }
    }
    counts
}

/// Per-class bin-count matrix for the conservation heatmap tab, one row per
/// requested class, with optional row normalization to [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct ConservationMatrix {
    pub classes: Vec<ConservationClass>,
    /// `rows[class_index][bin_index]`
    pub rows: Vec<Vec<f64>>,
    pub region_start: GenomicPos,
    pub region_end: GenomicPos,
    pub nbins: usize,
    pub normalized: bool,
}

impl ConservationMatrix {
    pub fn build(
        region_start: GenomicPos,
        region_end: GenomicPos,
        enhancers: &[Enhancer],
        classes: &[ConservationClass],
        nbins: usize,
        normalize_rows: bool,
    ) -> Self {
        let mut rows = Vec::with_capacity(classes.len());
        for &class in classes {
            let counts = class_bin_counts(region_start, region_end, enhancers, class, nbins);
            let row: Vec<f64> = if normalize_rows {
                let max = counts.iter().copied().max().unwrap_or(0);
                if max == 0 {
                    vec![0.0; counts.len()]
                } else {
                    counts.iter().map(|&c| c as f64 / max as f64).collect()
                }
            } else {
                counts.iter().map(|&c| c as f64).collect()
            };
            rows.push(row);
        }
        Self {
            classes: classes.to_vec(),
            rows,
            region_start,
            region_end,
            nbins,
            normalized: normalize_rows,
        }
    }

    pub fn max_value(&self) -> f64 {
        self.rows
            .iter()
            .flatten()
            .copied()
            .fold(0.0f64, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enhancer(start: GenomicPos, end: GenomicPos, class: ConservationClass) -> Enhancer {
        Enhancer {
            enh_id: format!("E_{start}_{end}"),
            chrom: "chr1".into(),
            start,
            end,
            tissue: None,
            score: None,
            source: None,
            class,
        }
    }

    #[test]
    fn test_single_conserved_interval_fills_one_bin() {
        // region 0..1000, 10 bins, conserved [100, 200) -> bin 1 maxed out
        let enh = vec![enhancer(100, 200, ConservationClass::Conserved)];
        let bins = conservation_bins(0, 1000, &enh, 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[1], 100);
        for (i, &v) in bins.iter().enumerate() {
            if i != 1 {
                assert_eq!(v, 0, "bin {i} should be empty");
            }
        }
    }

    #[test]
    fn test_no_conserved_intervals_yields_all_zero() {
        let enh = vec![
            enhancer(100, 200, ConservationClass::Gained),
            enhancer(300, 400, ConservationClass::Lost),
        ];
        let bins = conservation_bins(0, 1000, &enh, 25);
        assert_eq!(bins.len(), 25);
        assert!(bins.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_bins_are_normalized_against_fullest_bin() {
        let enh = vec![
            enhancer(0, 100, ConservationClass::Conserved),
            enhancer(0, 100, ConservationClass::Conserved),
            enhancer(500, 600, ConservationClass::Conserved),
        ];
        let bins = conservation_bins(0, 1000, &enh, 10);
        assert_eq!(bins[0], 100);
        assert_eq!(bins[5], 50);
    }

    #[test]
    fn test_interval_clipped_to_region() {
        // spans past both edges; counts only inside the region
        let enh = vec![enhancer(0, 10_000, ConservationClass::Conserved)];
        let bins = conservation_bins(2000, 3000, &enh, 10);
        assert!(bins.iter().all(|&v| v == 100));
    }

    #[test]
    fn test_interval_outside_region_is_skipped() {
        let enh = vec![enhancer(5000, 6000, ConservationClass::Conserved)];
        let bins = conservation_bins(0, 1000, &enh, 10);
        assert!(bins.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_binner_is_deterministic() {
        let enh: Vec<Enhancer> = (0..50)
            .map(|i| enhancer(i * 37, i * 37 + 120, ConservationClass::Conserved))
            .collect();
        let a = conservation_bins(0, 2000, &enh, DEFAULT_BIN_COUNT);
        let b = conservation_bins(0, 2000, &enh, DEFAULT_BIN_COUNT);
        assert_eq!(a, b);
    }

    #[test]
    fn test_matrix_rows_follow_requested_classes() {
        let enh = vec![
            enhancer(0, 100, ConservationClass::Conserved),
            enhancer(200, 300, ConservationClass::Gained),
        ];
        let m = ConservationMatrix::build(
            0,
            1000,
            &enh,
            &ConservationClass::ALL,
            10,
            false,
        );
        assert_eq!(m.rows.len(), 4);
        assert_eq!(m.rows[0][0], 1.0); // conserved
        assert_eq!(m.rows[1][2], 1.0); // gained
        assert_eq!(m.rows[2].iter().sum::<f64>(), 0.0); // lost
    }

    #[test]
    fn test_matrix_row_normalization() {
        let enh = vec![
            enhancer(0, 100, ConservationClass::Conserved),
            enhancer(0, 100, ConservationClass::Conserved),
            enhancer(500, 600, ConservationClass::Conserved),
        ];
        let m = ConservationMatrix::build(
            0,
            1000,
            &enh,
            &[ConservationClass::Conserved],
            10,
            true,
        );
        assert_eq!(m.rows[0][0], 1.0);
        assert_eq!(m.rows[0][5], 0.5);
        assert!(m.normalized);
    }
}
