use serde::{Deserialize, Serialize};

/// Absolute genomic position in base pairs.
pub type GenomicPos = u64;

/// A half-open genomic interval on a single chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomicRegion {
    pub start: GenomicPos,
    pub end: GenomicPos,
}

impl GenomicRegion {
    pub fn new(start: GenomicPos, end: GenomicPos) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn len(&self) -> GenomicPos {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn center(&self) -> GenomicPos {
        self.start + self.len() / 2
    }

    pub fn overlaps(&self, start: GenomicPos, end: GenomicPos) -> bool {
        self.start < end && start < self.end
    }
}

/// Conservation class tag assigned to enhancers and CTCF sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConservationClass {
    Conserved,
    Gained,
    Lost,
    HumanSpecific,
    Unlabeled,
}

impl ConservationClass {
    /// Display order used by tracks and the conservation matrix.
    pub const ALL: [ConservationClass; 4] = [
        ConservationClass::Conserved,
        ConservationClass::Gained,
        ConservationClass::Lost,
        ConservationClass::Unlabeled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ConservationClass::Conserved => "conserved",
            ConservationClass::Gained => "gained",
            ConservationClass::Lost => "lost",
            ConservationClass::HumanSpecific => "human_specific",
            ConservationClass::Unlabeled => "unlabeled",
        }
    }
}

impl Default for ConservationClass {
    fn default() -> Self {
        ConservationClass::Unlabeled
    }
}

/// A gene as returned by the region endpoint: `start`/`end` delimit the
/// fetched region (TSS ± window), `gene_start`/`gene_end` the gene body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub gene_id: String,
    pub symbol: String,
    pub chrom: String,
    pub start: GenomicPos,
    pub end: GenomicPos,
    pub tss: GenomicPos,
    #[serde(default)]
    pub gene_start: GenomicPos,
    #[serde(default)]
    pub gene_end: GenomicPos,
}

impl Gene {
    pub fn body(&self) -> GenomicRegion {
        GenomicRegion::new(self.gene_start, self.gene_end)
    }

    pub fn region(&self) -> GenomicRegion {
        GenomicRegion::new(self.start, self.end)
    }

    /// Gene body length in bp; zero when the record carries no body
    /// coordinates (the view engine then falls back to its floor).
    pub fn body_len(&self) -> GenomicPos {
        self.gene_end.saturating_sub(self.gene_start)
    }
}

/// A regulatory enhancer interval with optional activity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enhancer {
    pub enh_id: String,
    pub chrom: String,
    pub start: GenomicPos,
    pub end: GenomicPos,
    #[serde(default)]
    pub tissue: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub class: ConservationClass,
}

/// A CTCF chromatin-architecture binding site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtcfSite {
    pub site_id: String,
    pub chrom: String,
    pub start: GenomicPos,
    pub end: GenomicPos,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub cons_class: Option<String>,
}

/// A GWAS variant with its associated trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GwasSnp {
    pub snp_id: String,
    pub rsid: String,
    pub chrom: String,
    pub pos: GenomicPos,
    #[serde(rename = "trait", default)]
    pub trait_name: Option<String>,
    #[serde(default)]
    pub pval: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_invariant_end_not_before_start() {
        let r = GenomicRegion::new(200, 100);
        assert_eq!(r.start, 200);
        assert_eq!(r.end, 200);
        assert!(r.is_empty());
    }

    #[test]
    fn test_region_overlap() {
        let r = GenomicRegion::new(100, 200);
        assert!(r.overlaps(150, 160));
        assert!(r.overlaps(0, 101));
        assert!(!r.overlaps(200, 300));
        assert!(!r.overlaps(0, 100));
    }

    #[test]
    fn test_conservation_class_wire_format() {
        let c: ConservationClass = serde_json::from_str("\"conserved\"").unwrap();
        assert_eq!(c, ConservationClass::Conserved);
        let c: ConservationClass = serde_json::from_str("\"human_specific\"").unwrap();
        assert_eq!(c, ConservationClass::HumanSpecific);
        assert_eq!(
            serde_json::to_string(&ConservationClass::Unlabeled).unwrap(),
            "\"unlabeled\""
        );
    }

    #[test]
    fn test_enhancer_defaults_for_optional_fields() {
        let json = r#"{"enh_id":"E1","chrom":"chr11","start":100,"end":200}"#;
        let e: Enhancer = serde_json::from_str(json).unwrap();
        assert_eq!(e.class, ConservationClass::Unlabeled);
        assert!(e.score.is_none());
        assert!(e.tissue.is_none());
    }
}
