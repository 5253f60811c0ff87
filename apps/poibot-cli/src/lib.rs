//! Shared wiring for the poibot binaries.

use std::path::PathBuf;
use std::sync::Arc;

use poibot_core::config::{resolve_with_base, AppSettings, ProviderKind};
use poibot_core::mapper::PoiMapper;
use poibot_core::traits::{SearchClient, SearchProvider};
use poibot_search::{AzureSearchClient, MappedSearchClient, PoiSearchEngine};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so chat output on stdout stays readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

pub fn local_index_dir(settings: &AppSettings) -> anyhow::Result<PathBuf> {
    Ok(resolve_with_base(&std::env::current_dir()?, &settings.local.index_dir))
}

/// The provider selected by `search.provider`.
pub fn build_provider(settings: &AppSettings) -> anyhow::Result<Box<dyn SearchProvider>> {
    let refiners = &settings.dialog.refiners;
    let page_size = settings.dialog.page_size;
    match settings.search.provider {
        ProviderKind::Azure => Ok(Box::new(AzureSearchClient::new(&settings.azure, refiners, page_size))),
        ProviderKind::Local => {
            let index_dir = local_index_dir(settings)?;
            if !index_dir.exists() {
                anyhow::bail!("Index not found at {}. Run `poibot-indexer` first.", index_dir.display());
            }
            Ok(Box::new(PoiSearchEngine::open(&index_dir, refiners, page_size)?))
        }
    }
}

/// Keys hits on the same field the indexer keyed records on.
pub fn poi_mapper(settings: &AppSettings) -> PoiMapper {
    PoiMapper::new().with_key_field(&settings.data.key_field).with_image_field(&settings.data.image_field)
}

pub fn build_search_client(settings: &AppSettings) -> anyhow::Result<Arc<dyn SearchClient>> {
    let provider = build_provider(settings)?;
    Ok(Arc::new(MappedSearchClient::new(provider, poi_mapper(settings))))
}
