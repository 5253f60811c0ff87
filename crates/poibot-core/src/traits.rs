use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Query, RawPage, RawRecord, SearchHit, SearchResults};

/// A ranked-results backend. Returns exactly one page per call and reports
/// whether more pages exist.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &Query) -> Result<RawPage>;
}

/// The only place that knows provider field names.
pub trait ResultMapper: Send + Sync {
    fn map(&self, raw: &RawRecord) -> Result<SearchHit>;
}

/// What a dialog searches through: a provider page already run through a
/// mapper.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &Query) -> Result<SearchResults>;
}

#[async_trait]
impl<P: SearchProvider + ?Sized> SearchProvider for Box<P> {
    async fn search(&self, query: &Query) -> Result<RawPage> {
        (**self).search(query).await
    }
}
