//! Wire types for the RegLand backend JSON API.
//!
//! Field names mirror the backend responses; interval and SNP payloads
//! deserialize directly into the `regland-core` data model.

use regland_core::types::{CtcfSite, Enhancer, Gene, GenomicPos, GwasSnp};
use serde::{Deserialize, Serialize};

/// One row of a gene search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneSummary {
    pub gene_id: String,
    pub symbol: String,
    pub species_id: String,
    pub chrom: String,
    pub start: GenomicPos,
    pub end: GenomicPos,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchResponse {
    pub genes: Vec<GeneSummary>,
}

/// Region bundle for one gene and species: the gene record plus every
/// annotated interval in the fetched window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionResponse {
    pub gene: Gene,
    #[serde(default)]
    pub enhancers: Vec<Enhancer>,
    #[serde(default)]
    pub gwas_snps: Vec<GwasSnp>,
    #[serde(default)]
    pub ctcf_sites: Vec<CtcfSite>,
    #[serde(default)]
    pub ucsc_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    High,
    Low,
    None,
}

/// Data-quality summary for a gene (computed against the human genome).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub tissue_availability: Availability,
    pub score_availability: Availability,
    pub conservation_percent: f64,
    #[serde(default)]
    pub available_species: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionPoint {
    pub tissue: String,
    pub tpm: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ExpressionResponse {
    #[serde(default)]
    pub expression: Vec<ExpressionPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genome_build: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SpeciesResponse {
    pub species: Vec<Species>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GwasCategory {
    pub id: String,
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GwasCategoriesResponse {
    pub categories: Vec<GwasCategory>,
}

/// Filter for the trait listing endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TraitsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GwasTrait {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub snp_count: u64,
    #[serde(default)]
    pub gene_count: u64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_pval: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TraitsResponse {
    pub traits: Vec<GwasTrait>,
}

/// A trait SNP row; extends the core SNP record with the genes linked to it
/// through enhancer associations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitSnp {
    #[serde(flatten)]
    pub snp: GwasSnp,
    #[serde(default)]
    pub associated_genes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraitSnpsResponse {
    pub snps: Vec<TraitSnp>,
    pub total_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_response_round_trips_backend_shape() {
        let json = r#"{
            "gene": {
                "gene_id": "ENSG00000176697",
                "symbol": "BDNF",
                "chrom": "chr11",
                "start": 27589589,
                "end": 27789589,
                "tss": 27689589,
                "gene_start": 27654894,
                "gene_end": 27724285
            },
            "enhancers": [
                {"enh_id": "E1", "chrom": "chr11", "start": 27660000,
                 "end": 27661000, "tissue": "Brain", "score": 0.92,
                 "source": "enc", "class": "conserved"}
            ],
            "gwas_snps": [
                {"snp_id": "S1", "rsid": "rs6265", "chrom": "chr11",
                 "pos": 27679916, "trait": "Body mass index",
                 "pval": 3e-12, "category": "Anthropometric", "source": "gwascat"}
            ],
            "ctcf_sites": [],
            "ucsc_url": "https://genome.ucsc.edu/cgi-bin/hgTracks?db=hg38"
        }"#;
        let resp: RegionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.gene.symbol, "BDNF");
        assert_eq!(resp.enhancers.len(), 1);
        assert_eq!(resp.gwas_snps[0].trait_name.as_deref(), Some("Body mass index"));
        assert!(resp.ucsc_url.is_some());
    }

    #[test]
    fn test_data_quality_levels() {
        let json = r#"{
            "tissue_availability": "high",
            "score_availability": "none",
            "conservation_percent": 41.5,
            "available_species": ["human_hg38", "mouse_mm39"]
        }"#;
        let q: DataQuality = serde_json::from_str(json).unwrap();
        assert_eq!(q.tissue_availability, Availability::High);
        assert_eq!(q.score_availability, Availability::None);
        assert_eq!(q.available_species.len(), 2);
    }

    #[test]
    fn test_traits_request_skips_unset_filters() {
        let req = TraitsRequest {
            category: Some("Metabolic".into()),
            ..Default::default()
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["category"], "Metabolic");
        assert!(v.get("search").is_none());
        assert!(v.get("limit").is_none());
    }

    #[test]
    fn test_trait_snp_flattens_core_record() {
        let json = r#"{"snp_id": "S1", "rsid": "rs123", "chrom": "chr2",
                       "pos": 1000, "trait": "Height", "pval": 1e-8,
                       "associated_genes": "ACTB,GAPDH"}"#;
        let s: TraitSnp = serde_json::from_str(json).unwrap();
        assert_eq!(s.snp.rsid, "rs123");
        assert_eq!(s.associated_genes.as_deref(), Some("ACTB,GAPDH"));
    }
}
