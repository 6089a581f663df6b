//! Typed access to the RegLand backend endpoints.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::models::*;

/// The remote data API as consumed by the browser. The HTTP implementation
/// lives in [`HttpClient`]; tests drive the orchestration layer through
/// in-memory implementations.
#[async_trait]
pub trait GeneDataApi: Send + Sync {
    /// Symbol substring search, exact matches first, at most ten rows.
    async fn search_genes(&self, query: &str, species: &str) -> ApiResult<Vec<GeneSummary>>;

    /// Full region bundle for one gene and species.
    async fn gene_region(
        &self,
        gene: &str,
        species: &str,
        tissue: &str,
        tss_kb: u32,
    ) -> ApiResult<RegionResponse>;

    async fn data_quality(&self, gene: &str) -> ApiResult<DataQuality>;

    async fn expression(&self, gene: &str) -> ApiResult<Vec<ExpressionPoint>>;

    async fn species(&self) -> ApiResult<Vec<Species>>;

    async fn gwas_categories(&self) -> ApiResult<Vec<GwasCategory>>;

    async fn gwas_traits(&self, request: &TraitsRequest) -> ApiResult<Vec<GwasTrait>>;

    async fn trait_snps(&self, trait_name: &str, limit: Option<u32>)
        -> ApiResult<TraitSnpsResponse>;

    /// Resolves a typed symbol to an exact match. A miss carries up to
    /// three suggested alternatives from the search results.
    async fn lookup_gene(&self, query: &str, species: &str) -> ApiResult<GeneSummary> {
        let matches = self.search_genes(query, species).await?;
        if let Some(hit) = matches
            .iter()
            .find(|g| g.symbol.eq_ignore_ascii_case(query))
        {
            return Ok(hit.clone());
        }
        let mut suggestions: Vec<String> = Vec::new();
        for g in &matches {
            if !suggestions.contains(&g.symbol) {
                suggestions.push(g.symbol.clone());
            }
            if suggestions.len() == 3 {
                break;
            }
        }
        Err(ApiError::GeneNotFound {
            query: query.to_string(),
            suggestions,
        })
    }
}

/// HTTP client for a RegLand backend instance.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| status.to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl GeneDataApi for HttpClient {
    async fn search_genes(&self, query: &str, species: &str) -> ApiResult<Vec<GeneSummary>> {
        let response: SearchResponse = self
            .get_json(
                "genes/search/",
                &[("q", query.to_string()), ("species", species.to_string())],
            )
            .await?;
        Ok(response.genes)
    }

    async fn gene_region(
        &self,
        gene: &str,
        species: &str,
        tissue: &str,
        tss_kb: u32,
    ) -> ApiResult<RegionResponse> {
        self.get_json(
            "genes/region/",
            &[
                ("gene", gene.to_string()),
                ("species", species.to_string()),
                ("tissue", tissue.to_string()),
                ("tss_kb", tss_kb.to_string()),
            ],
        )
        .await
    }

    async fn data_quality(&self, gene: &str) -> ApiResult<DataQuality> {
        self.get_json("genes/data-quality/", &[("gene", gene.to_string())])
            .await
    }

    async fn expression(&self, gene: &str) -> ApiResult<Vec<ExpressionPoint>> {
        let response: ExpressionResponse = self
            .get_json("genes/expression/", &[("gene", gene.to_string())])
            .await?;
        Ok(response.expression)
    }

    async fn species(&self) -> ApiResult<Vec<Species>> {
        let response: SpeciesResponse = self.get_json("species/", &[]).await?;
        Ok(response.species)
    }

    async fn gwas_categories(&self) -> ApiResult<Vec<GwasCategory>> {
        let response: GwasCategoriesResponse = self.get_json("gwas/categories/", &[]).await?;
        Ok(response.categories)
    }

    async fn gwas_traits(&self, request: &TraitsRequest) -> ApiResult<Vec<GwasTrait>> {
        let response: TraitsResponse = self.post_json("gwas/traits/", request).await?;
        Ok(response.traits)
    }

    async fn trait_snps(
        &self,
        trait_name: &str,
        limit: Option<u32>,
    ) -> ApiResult<TraitSnpsResponse> {
        let body = serde_json::json!({ "trait": trait_name, "limit": limit });
        self.post_json("gwas/trait-snps/", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let client = HttpClient::new("http://localhost:8000/api/");
        assert_eq!(
            client.url("genes/search/"),
            "http://localhost:8000/api/genes/search/"
        );
    }
}
