//! poibot-search
//!
//! Search providers for the POI bot: a local Tantivy index (`index` builds it,
//! `search` queries it) and the Azure Cognitive Search REST API (`azure`).
//! `client::MappedSearchClient` pairs any provider with a result mapper.

pub mod azure;
pub mod client;
pub mod index;
pub mod search;
pub mod tantivy_utils;

pub use azure::AzureSearchClient;
pub use client::MappedSearchClient;
pub use index::PoiIndexer;
pub use search::PoiSearchEngine;
