//! Per-gene load orchestration.
//!
//! A gene selection fans out one region fetch per species plus the quality
//! and expression fetches, all concurrently. Per-species fetches settle
//! (never short-circuit): the load fails only when every species failed.
//! Completions are tagged with a load generation so responses for a gene
//! the user has already navigated away from are dropped instead of racing
//! the current view.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::client::GeneDataApi;
use crate::error::LoadError;
use crate::models::{DataQuality, ExpressionPoint, RegionResponse, Species};

/// Delay before a search-as-you-type request is actually issued.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Monotonic counter identifying the most recent gene selection. Fetch
/// completions carry the generation they were started under; anything
/// older than [`LoadGeneration::current`] is stale and must be ignored.
#[derive(Debug, Default, Clone)]
pub struct LoadGeneration(Arc<AtomicU64>);

impl LoadGeneration {
    /// Starts a new load, invalidating all in-flight ones.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.current()
    }
}

/// Everything fetched for one gene selection.
#[derive(Debug, Clone)]
pub struct GeneLoad {
    pub generation: u64,
    pub symbol: String,
    /// Reference gene record defining the coordinate frame of the viewer.
    pub gene: regland_core::types::Gene,
    /// Region data per species id; `None` marks a failed fetch, rendered
    /// as "No data available" on that track.
    pub species_data: BTreeMap<String, Option<RegionResponse>>,
    /// `None` when the quality fetch failed.
    pub quality: Option<DataQuality>,
    /// `None` when the expression fetch failed.
    pub expression: Option<Vec<ExpressionPoint>>,
}

/// Loads a gene across all species. `reference_species` decides which
/// species' gene record anchors the viewer coordinates; when that fetch
/// fails, the first successful species stands in.
pub async fn load_gene(
    api: Arc<dyn GeneDataApi>,
    symbol: &str,
    reference_species: &str,
    species: &[Species],
    tissue: &str,
    tss_kb: u32,
    generation: u64,
) -> Result<GeneLoad, LoadError> {
    // Exact-match confirmation first; a miss is a validation error with
    // suggestions and nothing else is fetched.
    let hit = api.lookup_gene(symbol, reference_species).await?;
    let symbol = hit.symbol;

    let regions = async {
        let mut set = JoinSet::new();
        for sp in species {
            let api = Arc::clone(&api);
            let symbol = symbol.clone();
            let species_id = sp.id.clone();
            let tissue = tissue.to_string();
            set.spawn(async move {
                let result = api.gene_region(&symbol, &species_id, &tissue, tss_kb).await;
                (species_id, result)
            });
        }

        let mut data: BTreeMap<String, Option<RegionResponse>> = BTreeMap::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((species_id, Ok(region))) => {
                    data.insert(species_id, Some(region));
                }
                Ok((species_id, Err(err))) => {
                    log::warn!("region fetch failed for {species_id}: {err}");
                    data.insert(species_id, None);
                }
                Err(err) => {
                    log::warn!("region fetch task aborted: {err}");
                }
            }
        }
        data
    };

    let quality = api.data_quality(&symbol);
    let expression = api.expression(&symbol);
    let (species_data, quality, expression) = tokio::join!(regions, quality, expression);

    let gene = species_data
        .get(reference_species)
        .and_then(|r| r.as_ref())
        .or_else(|| species_data.values().find_map(|r| r.as_ref()))
        .map(|r| r.gene.clone())
        .ok_or(LoadError::AllSpeciesFailed)?;

    let quality = match quality {
        Ok(q) => Some(q),
        Err(err) => {
            log::warn!("data-quality fetch failed for {symbol}: {err}");
            None
        }
    };
    let expression = match expression {
        Ok(e) => Some(e),
        Err(err) => {
            log::warn!("expression fetch failed for {symbol}: {err}");
            None
        }
    };

    Ok(GeneLoad {
        generation,
        symbol,
        gene,
        species_data,
        quality,
        expression,
    })
}

/// Trailing-edge debouncer: each call aborts the previously scheduled
/// future, so in a burst only the most recent one fires.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<tokio::task::JoinHandle<()>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<F>(&mut self, handle: &tokio::runtime::Handle, delay: Duration, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.pending = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            fut.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GeneDataApi;
    use crate::error::{ApiError, ApiResult};
    use crate::models::*;
    use async_trait::async_trait;
    use regland_core::types::Gene;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;

    struct StubApi {
        known_genes: Vec<&'static str>,
        failing_species: HashSet<String>,
        fail_quality: bool,
    }

    impl StubApi {
        fn new() -> Self {
            Self {
                known_genes: vec!["BDNF", "BDKRB1", "BDKRB2", "BDH1", "BDP1"],
                failing_species: HashSet::new(),
                fail_quality: false,
            }
        }

        fn failing(mut self, species: &[&str]) -> Self {
            self.failing_species = species.iter().map(|s| s.to_string()).collect();
            self
        }

        fn gene(symbol: &str) -> Gene {
            Gene {
                gene_id: format!("ENSG_{symbol}"),
                symbol: symbol.to_string(),
                chrom: "chr11".into(),
                start: 27_589_589,
                end: 27_789_589,
                tss: 27_689_589,
                gene_start: 27_654_894,
                gene_end: 27_724_285,
            }
        }
    }

    #[async_trait]
    impl GeneDataApi for StubApi {
        async fn search_genes(&self, query: &str, _species: &str) -> ApiResult<Vec<GeneSummary>> {
            let q = query.to_uppercase();
            Ok(self
                .known_genes
                .iter()
                .filter(|s| s.contains(&q))
                .take(10)
                .map(|s| GeneSummary {
                    gene_id: format!("ENSG_{s}"),
                    symbol: s.to_string(),
                    species_id: "human_hg38".into(),
                    chrom: "chr11".into(),
                    start: 0,
                    end: 1000,
                })
                .collect())
        }

        async fn gene_region(
            &self,
            gene: &str,
            species: &str,
            _tissue: &str,
            _tss_kb: u32,
        ) -> ApiResult<RegionResponse> {
            if self.failing_species.contains(species) {
                return Err(ApiError::Status {
                    status: 500,
                    message: format!("no data for {species}"),
                });
            }
            Ok(RegionResponse {
                gene: Self::gene(gene),
                enhancers: vec![],
                gwas_snps: vec![],
                ctcf_sites: vec![],
                ucsc_url: None,
            })
        }

        async fn data_quality(&self, _gene: &str) -> ApiResult<DataQuality> {
            if self.fail_quality {
                return Err(ApiError::Status {
                    status: 500,
                    message: "quality unavailable".into(),
                });
            }
            Ok(DataQuality {
                tissue_availability: Availability::High,
                score_availability: Availability::Low,
                conservation_percent: 40.0,
                available_species: vec!["human_hg38".into()],
            })
        }

        async fn expression(&self, _gene: &str) -> ApiResult<Vec<ExpressionPoint>> {
            Ok(vec![ExpressionPoint {
                tissue: "Brain".into(),
                tpm: 12.5,
            }])
        }

        async fn species(&self) -> ApiResult<Vec<Species>> {
            Ok(vec![])
        }

        async fn gwas_categories(&self) -> ApiResult<Vec<GwasCategory>> {
            Ok(vec![])
        }

        async fn gwas_traits(&self, _request: &TraitsRequest) -> ApiResult<Vec<GwasTrait>> {
            Ok(vec![])
        }

        async fn trait_snps(
            &self,
            _trait_name: &str,
            _limit: Option<u32>,
        ) -> ApiResult<TraitSnpsResponse> {
            Ok(TraitSnpsResponse {
                snps: vec![],
                total_count: 0,
            })
        }
    }

    fn two_species() -> Vec<Species> {
        vec![
            Species {
                id: "human_hg38".into(),
                name: "Human".into(),
                genome_build: Some("hg38".into()),
            },
            Species {
                id: "mouse_mm39".into(),
                name: "Mouse".into(),
                genome_build: Some("mm39".into()),
            },
        ]
    }

    #[tokio::test]
    async fn test_partial_species_failure_is_not_an_error() {
        let api: Arc<dyn GeneDataApi> = Arc::new(StubApi::new().failing(&["mouse_mm39"]));
        let load = load_gene(api, "BDNF", "human_hg38", &two_species(), "Liver", 100, 1)
            .await
            .unwrap();
        assert!(load.species_data["human_hg38"].is_some());
        assert!(load.species_data["mouse_mm39"].is_none());
        assert_eq!(load.gene.symbol, "BDNF");
    }

    #[tokio::test]
    async fn test_all_species_failing_is_a_total_failure() {
        let api: Arc<dyn GeneDataApi> =
            Arc::new(StubApi::new().failing(&["human_hg38", "mouse_mm39"]));
        let err = load_gene(api, "BDNF", "human_hg38", &two_species(), "Liver", 100, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::AllSpeciesFailed));
    }

    #[tokio::test]
    async fn test_reference_species_failure_falls_back_to_another_gene_record() {
        let api: Arc<dyn GeneDataApi> = Arc::new(StubApi::new().failing(&["human_hg38"]));
        let load = load_gene(api, "BDNF", "human_hg38", &two_species(), "Liver", 100, 1)
            .await
            .unwrap();
        assert!(load.species_data["human_hg38"].is_none());
        assert_eq!(load.gene.symbol, "BDNF");
    }

    #[tokio::test]
    async fn test_unknown_symbol_reports_suggestions() {
        let api: Arc<dyn GeneDataApi> = Arc::new(StubApi::new());
        let err = load_gene(api, "BD", "human_hg38", &two_species(), "Liver", 100, 1)
            .await
            .unwrap_err();
        match err {
            LoadError::Api(ApiError::GeneNotFound { query, suggestions }) => {
                assert_eq!(query, "BD");
                assert!(!suggestions.is_empty());
                assert!(suggestions.len() <= 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_quality_failure_degrades_to_none() {
        let mut stub = StubApi::new();
        stub.fail_quality = true;
        let api: Arc<dyn GeneDataApi> = Arc::new(stub);
        let load = load_gene(api, "BDNF", "human_hg38", &two_species(), "Liver", 100, 1)
            .await
            .unwrap();
        assert!(load.quality.is_none());
        assert!(load.expression.is_some());
    }

    #[test]
    fn test_generation_guard_drops_stale_completions() {
        let generation = LoadGeneration::default();
        let first = generation.next();
        let second = generation.next();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[tokio::test]
    async fn test_debouncer_fires_only_the_last_call() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new();
        let handle = tokio::runtime::Handle::current();
        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            debouncer.schedule(&handle, Duration::from_millis(20), async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_debouncer_cancel_suppresses_pending_call() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new();
        let handle = tokio::runtime::Handle::current();
        let c = Arc::clone(&counter);
        debouncer.schedule(&handle, Duration::from_millis(20), async move {
            c.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
