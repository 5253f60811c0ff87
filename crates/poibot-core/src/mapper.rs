//! Raw record -> `SearchHit` mapping.
//!
//! `PoiMapper` knows the point-of-interest document shape:
//! `id, Name, geohash, Latitude, Longitude, Streetname, City, Neighborhood,
//! District, State, Country` and an optional `thumbnail`.

use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::traits::ResultMapper;
use crate::types::{RawPage, RawRecord, SearchHit, SearchResults};

#[derive(Debug, Clone)]
pub struct PoiMapper {
    key_field: String,
    image_field: String,
}

impl Default for PoiMapper {
    fn default() -> Self {
        Self { key_field: "id".to_string(), image_field: "thumbnail".to_string() }
    }
}

impl PoiMapper {
    pub fn new() -> Self { Self::default() }

    pub fn with_key_field(mut self, field: impl Into<String>) -> Self {
        self.key_field = field.into();
        self
    }

    pub fn with_image_field(mut self, field: impl Into<String>) -> Self {
        self.image_field = field.into();
        self
    }
}

impl ResultMapper for PoiMapper {
    fn map(&self, raw: &RawRecord) -> Result<SearchHit> {
        let key = field_text(raw, &self.key_field);
        if key.is_empty() {
            return Err(Error::Mapping(format!("record has no '{}'", self.key_field)));
        }
        let f = |name: &str| field_text(raw, name);
        let title = format!(
            "{}, Location : {}, ({},{})",
            f("Name"), f("geohash"), f("Latitude"), f("Longitude")
        );
        let description = format!(
            "({}, {}, near {}, {}, {}, {})",
            f("Streetname"), f("City"), f("Neighborhood"), f("District"), f("State"), f("Country")
        );
        let image_url = Some(f(&self.image_field)).filter(|s| !s.is_empty());
        Ok(SearchHit { key, title, description, image_url })
    }
}

/// Render a scalar field as display text. Strings are taken verbatim,
/// numbers and booleans use their JSON text, anything else is empty.
pub fn field_text(raw: &RawRecord, field: &str) -> String {
    match raw.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Map every record of a page, skipping the ones the mapper rejects.
pub fn map_page(mapper: &dyn ResultMapper, page: RawPage) -> SearchResults {
    let mut hits = Vec::with_capacity(page.records.len());
    let mut skipped = 0;
    for raw in &page.records {
        match mapper.map(raw) {
            Ok(hit) => hits.push(hit),
            Err(e) => {
                skipped += 1;
                warn!(error = %e, "skipping unmappable record");
            }
        }
    }
    SearchResults { hits, facets: page.facets, has_more: page.has_more, skipped }
}
