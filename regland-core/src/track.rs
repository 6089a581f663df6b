//! Screen-position mapping and track layout.
//!
//! Pure helpers that turn absolute genomic coordinates into 0-100% screen
//! offsets for the current view window, plus the layout pass that converts
//! a fetched region bundle into positioned, tooltip-carrying track items.

use crate::types::{CtcfSite, Enhancer, Gene, GwasSnp};
use crate::view::GeneViewport;

/// Items mapped outside this percentage band are not rendered.
pub const VISIBLE_MIN_PCT: f64 = -5.0;
pub const VISIBLE_MAX_PCT: f64 = 105.0;

/// Maps an absolute genomic position to a screen percentage for the given
/// view window. Unclamped; callers hide results outside
/// [`VISIBLE_MIN_PCT`, `VISIBLE_MAX_PCT`].
pub fn position_percent(pos: f64, view_start: f64, window_size: f64) -> f64 {
    (pos - view_start) / window_size * 100.0
}

/// Visibility gate applied before mapping an element to the screen.
pub fn is_in_view(start: f64, end: f64, view_start: f64, window_size: f64) -> bool {
    end >= view_start && start <= view_start + window_size
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackItemKind {
    GeneBody,
    Enhancer,
    CtcfSite,
    Snp,
}

/// A single positioned element on a genome track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackItem {
    pub kind: TrackItemKind,
    /// Left edge as a screen percentage, possibly slightly outside [0, 100].
    pub start_pct: f64,
    /// Right edge as a screen percentage.
    pub end_pct: f64,
    pub class_label: Option<&'static str>,
    pub tooltip: String,
}

impl TrackItem {
    pub fn width_pct(&self) -> f64 {
        (self.end_pct - self.start_pct).max(0.0)
    }
}

/// All positioned elements for one species track at the current view.
#[derive(Debug, Clone, Default)]
pub struct TrackLayout {
    pub gene_body: Option<TrackItem>,
    pub tss_pct: Option<f64>,
    pub enhancers: Vec<TrackItem>,
    pub ctcf_sites: Vec<TrackItem>,
    pub snps: Vec<TrackItem>,
}

impl TrackLayout {
    pub fn build(
        gene: &Gene,
        enhancers: &[Enhancer],
        ctcf_sites: &[CtcfSite],
        snps: &[GwasSnp],
        viewport: &GeneViewport,
    ) -> Self {
        let (view_start, view_end) = viewport.abs_view_range();
        let window = viewport.window_size();

        let mut layout = TrackLayout::default();

        if gene.body_len() > 0
            && is_in_view(
                gene.gene_start as f64,
                gene.gene_end as f64,
                view_start,
                window,
            )
        {
            layout.gene_body = Some(TrackItem {
                kind: TrackItemKind::GeneBody,
                start_pct: position_percent(gene.gene_start as f64, view_start, window),
                end_pct: position_percent(gene.gene_end as f64, view_start, window),
                class_label: None,
                tooltip: format!(
                    "{} {}:{}-{}",
                    gene.symbol, gene.chrom, gene.gene_start, gene.gene_end
                ),
            });
        }

        let tss = gene.tss as f64;
        if tss >= view_start && tss <= view_end {
            let pct = position_percent(tss, view_start, window);
            if (VISIBLE_MIN_PCT..=VISIBLE_MAX_PCT).contains(&pct) {
                layout.tss_pct = Some(pct);
            }
        }

        for enh in enhancers {
            if !is_in_view(enh.start as f64, enh.end as f64, view_start, window) {
                continue;
            }
            let start_pct = position_percent(enh.start as f64, view_start, window);
            let end_pct = position_percent(enh.end as f64, view_start, window);
            let mut tooltip = format!("{} {}:{}-{}", enh.enh_id, enh.chrom, enh.start, enh.end);
            if let Some(score) = enh.score {
                tooltip.push_str(&format!("\nscore: {score:.3}"));
            }
            if let Some(tissue) = &enh.tissue {
                tooltip.push_str(&format!("\ntissue: {tissue}"));
            }
            tooltip.push_str(&format!("\nclass: {}", enh.class.label()));
            layout.enhancers.push(TrackItem {
                kind: TrackItemKind::Enhancer,
                start_pct,
                end_pct,
                class_label: Some(enh.class.label()),
                tooltip,
            });
        }

        for site in ctcf_sites {
            if !is_in_view(site.start as f64, site.end as f64, view_start, window) {
                continue;
            }
            let mut tooltip = format!(
                "{} {}:{}-{}",
                site.site_id, site.chrom, site.start, site.end
            );
            if let Some(score) = site.score {
                tooltip.push_str(&format!("\nscore: {score:.3}"));
            }
            if let Some(class) = &site.cons_class {
                tooltip.push_str(&format!("\nclass: {class}"));
            }
            layout.ctcf_sites.push(TrackItem {
                kind: TrackItemKind::CtcfSite,
                start_pct: position_percent(site.start as f64, view_start, window),
                end_pct: position_percent(site.end as f64, view_start, window),
                class_label: None,
                tooltip,
            });
        }

        for snp in snps {
            let pos = snp.pos as f64;
            if !is_in_view(pos, pos, view_start, window) {
                continue;
            }
            let pct = position_percent(pos, view_start, window);
            if !(VISIBLE_MIN_PCT..=VISIBLE_MAX_PCT).contains(&pct) {
                continue;
            }
            let mut tooltip = format!("{} {}:{}", snp.rsid, snp.chrom, snp.pos);
            if let Some(t) = &snp.trait_name {
                tooltip.push_str(&format!("\ntrait: {t}"));
            }
            if let Some(p) = snp.pval {
                tooltip.push_str(&format!("\np-value: {p:.2e}"));
            }
            layout.snps.push(TrackItem {
                kind: TrackItemKind::Snp,
                start_pct: pct,
                end_pct: pct,
                class_label: None,
                tooltip,
            });
        }

        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConservationClass, GenomicRegion};

    #[test]
    fn test_mapper_endpoints() {
        // view left edge maps to 0%, right edge to 100%
        assert_eq!(position_percent(1000.0, 1000.0, 500.0), 0.0);
        assert_eq!(position_percent(1500.0, 1000.0, 500.0), 100.0);
        assert_eq!(position_percent(1250.0, 1000.0, 500.0), 50.0);
    }

    #[test]
    fn test_mapper_is_unclamped() {
        assert!(position_percent(500.0, 1000.0, 500.0) < 0.0);
        assert!(position_percent(2000.0, 1000.0, 500.0) > 100.0);
    }

    #[test]
    fn test_visibility_gate() {
        assert!(is_in_view(900.0, 1100.0, 1000.0, 500.0));
        assert!(is_in_view(1500.0, 1600.0, 1000.0, 500.0));
        assert!(!is_in_view(100.0, 900.0, 1000.0, 500.0));
        assert!(!is_in_view(1501.0, 1600.0, 1000.0, 500.0));
    }

    fn test_gene() -> Gene {
        Gene {
            gene_id: "G1".into(),
            symbol: "BDNF".into(),
            chrom: "chr11".into(),
            start: 27_589_589,
            end: 27_789_589,
            tss: 27_689_589,
            gene_start: 27_654_894,
            gene_end: 27_724_285,
        }
    }

    #[test]
    fn test_layout_positions_gene_and_filters_offscreen_items() {
        let gene = test_gene();
        let vp = GeneViewport::new(gene.body());
        let enhancers = vec![
            Enhancer {
                enh_id: "E1".into(),
                chrom: "chr11".into(),
                start: gene.gene_start + 1000,
                end: gene.gene_start + 2000,
                tissue: Some("Brain".into()),
                score: Some(0.8),
                source: None,
                class: ConservationClass::Conserved,
            },
            // far outside the 100kb base window
            Enhancer {
                enh_id: "E2".into(),
                chrom: "chr11".into(),
                start: 1_000_000,
                end: 1_000_500,
                tissue: None,
                score: None,
                source: None,
                class: ConservationClass::Gained,
            },
        ];
        let layout = TrackLayout::build(&gene, &enhancers, &[], &[], &vp);

        assert!(layout.gene_body.is_some());
        assert_eq!(layout.enhancers.len(), 1);
        let item = &layout.enhancers[0];
        assert!(item.start_pct >= 0.0 && item.end_pct <= 100.0);
        assert!(item.tooltip.contains("E1"));
        assert!(item.tooltip.contains("tissue: Brain"));
        assert!(item.tooltip.contains("class: conserved"));
    }

    #[test]
    fn test_layout_snp_is_a_point() {
        let gene = test_gene();
        let vp = GeneViewport::new(gene.body());
        let snps = vec![GwasSnp {
            snp_id: "S1".into(),
            rsid: "rs6265".into(),
            chrom: "chr11".into(),
            pos: gene.tss,
            trait_name: Some("Body mass index".into()),
            pval: Some(3.0e-12),
            category: None,
            source: None,
        }];
        let layout = TrackLayout::build(&gene, &[], &[], &snps, &vp);
        assert_eq!(layout.snps.len(), 1);
        assert_eq!(layout.snps[0].start_pct, layout.snps[0].end_pct);
        assert!(layout.snps[0].tooltip.contains("rs6265"));
    }

    #[test]
    fn test_layout_hides_gene_without_body_coordinates() {
        let mut gene = test_gene();
        gene.gene_start = 0;
        gene.gene_end = 0;
        let vp = GeneViewport::new(GenomicRegion::new(0, 0));
        let layout = TrackLayout::build(&gene, &[], &[], &[], &vp);
        assert!(layout.gene_body.is_none());
    }
}
