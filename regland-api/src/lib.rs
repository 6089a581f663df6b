//! RegLand API client.
//!
//! Typed client for the RegLand backend endpoints plus the per-gene load
//! orchestration used by the browser: concurrent per-species region fetches
//! that always settle, a generation counter that drops stale completions,
//! and the search-as-you-type debouncer.

pub mod client;
pub mod error;
pub mod models;
pub mod session;

pub use client::{GeneDataApi, HttpClient};
pub use error::{ApiError, ApiResult, LoadError};
pub use models::{
    DataQuality, ExpressionPoint, GeneSummary, GwasCategory, GwasTrait, RegionResponse, Species,
    TraitSnp, TraitSnpsResponse, TraitsRequest,
};
pub use session::{load_gene, Debouncer, GeneLoad, LoadGeneration, SEARCH_DEBOUNCE};
