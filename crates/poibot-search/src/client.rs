use async_trait::async_trait;
use tracing::debug;

use poibot_core::mapper::map_page;
use poibot_core::traits::{ResultMapper, SearchClient, SearchProvider};
use poibot_core::{Query, Result, SearchResults};

/// A provider whose pages are run through a mapper.
pub struct MappedSearchClient<P, M> {
    provider: P,
    mapper: M,
}

impl<P, M> MappedSearchClient<P, M>
where
    P: SearchProvider,
    M: ResultMapper,
{
    pub fn new(provider: P, mapper: M) -> Self { Self { provider, mapper } }
}

#[async_trait]
impl<P, M> SearchClient for MappedSearchClient<P, M>
where
    P: SearchProvider,
    M: ResultMapper,
{
    async fn search(&self, query: &Query) -> Result<SearchResults> {
        let page = self.provider.search(query).await?;
        let results = map_page(&self.mapper, page);
        if results.skipped > 0 {
            debug!(skipped = results.skipped, kept = results.hits.len(), "dropped unmappable records");
        }
        Ok(results)
    }
}
