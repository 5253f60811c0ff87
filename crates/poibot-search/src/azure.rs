//! Azure Cognitive Search (REST) provider.
//!
//! One `POST /indexes/<index>/docs/search` per page. Refinements become an
//! OData `$filter` of `eq` clauses joined with `and`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use poibot_core::config::AzureSettings;
use poibot_core::traits::SearchProvider;
use poibot_core::{Error, FacetValues, Query, RawPage, RawRecord, Refinement, Result};

/// Distinct values requested per facet.
const FACET_VALUE_COUNT: usize = 10;

pub struct AzureSearchClient {
    http: Client,
    base_url: String,
    index: String,
    api_version: String,
    api_key: String,
    facet_fields: Vec<String>,
    page_size: usize,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    search: &'a str,
    facets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<String>,
    top: usize,
    skip: usize,
    count: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(rename = "@odata.count")]
    count: Option<usize>,
    #[serde(rename = "@search.facets", default)]
    facets: HashMap<String, Vec<FacetBucket>>,
    #[serde(rename = "@search.nextPageParameters")]
    next_page: Option<Value>,
    #[serde(default)]
    value: Vec<RawRecord>,
}

#[derive(Deserialize)]
struct FacetBucket {
    value: Value,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl AzureSearchClient {
    pub fn new(settings: &AzureSettings, facet_fields: &[String], page_size: usize) -> Self {
        Self {
            http: Client::new(),
            base_url: format!("https://{}.search.windows.net", settings.service),
            index: settings.index.clone(),
            api_version: settings.api_version.clone(),
            api_key: settings.api_key.clone(),
            facet_fields: facet_fields.to_vec(),
            page_size: page_size.max(1),
        }
    }

    /// Point at a different host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self) -> String {
        format!("{}/indexes/{}/docs/search?api-version={}", self.base_url, self.index, self.api_version)
    }

    fn request_body<'a>(&self, query: &'a Query) -> SearchRequest<'a> {
        let text = query.text.trim();
        SearchRequest {
            search: if text.is_empty() { "*" } else { text },
            facets: self.facet_fields.iter().map(|f| format!("{},count:{}", f, FACET_VALUE_COUNT)).collect(),
            filter: odata_filter(&query.refinements),
            top: self.page_size,
            skip: query.page * self.page_size,
            count: true,
        }
    }
}

#[async_trait]
impl SearchProvider for AzureSearchClient {
    async fn search(&self, query: &Query) -> Result<RawPage> {
        let body = self.request_body(query);
        let skip = body.skip;
        let response = self
            .http
            .post(self.url())
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::SearchUnavailable(format!("Azure Search not reachable: {}", e)))?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text).map(|e| e.error.message).unwrap_or(text);
            return Err(Error::InvalidQuery(message));
        }
        if !status.is_success() {
            warn!(%status, "Azure Search request failed");
            return Err(Error::SearchUnavailable(format!("Azure Search returned {}", status)));
        }

        let mut parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::SearchUnavailable(format!("unreadable Azure Search response: {}", e)))?;

        let mut facets = Vec::new();
        for field in &self.facet_fields {
            let Some(buckets) = parsed.facets.remove(field) else { continue };
            let values: Vec<String> = buckets.into_iter().filter_map(|b| scalar_text(&b.value)).collect();
            if !values.is_empty() { facets.push(FacetValues { field: field.clone(), values }); }
        }
        let has_more = parsed.next_page.is_some()
            || parsed.count.is_some_and(|total| skip + parsed.value.len() < total);
        debug!(text = %query.text, page = query.page, returned = parsed.value.len(), has_more, "azure search");
        Ok(RawPage { records: parsed.value, facets, has_more })
    }
}

/// `City eq 'Manila' and State eq 'NCR'`; single quotes are doubled.
pub fn odata_filter(refinements: &[Refinement]) -> Option<String> {
    if refinements.is_empty() { return None; }
    let clauses: Vec<String> = refinements
        .iter()
        .map(|r| format!("{} eq '{}'", r.field, r.value.replace('\'', "''")))
        .collect();
    Some(clauses.join(" and "))
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_joins_and_escapes() {
        let q = Query::new("x").refined("City", "Manila").refined("Neighborhood", "Quiapo's");
        assert_eq!(
            odata_filter(&q.refinements).as_deref(),
            Some("City eq 'Manila' and Neighborhood eq 'Quiapo''s'")
        );
        assert_eq!(odata_filter(&[]), None);
    }

    #[test]
    fn empty_text_searches_everything() {
        let client = AzureSearchClient::new(&AzureSettings::default(), &["City".to_string()], 5);
        let q = Query::new("  ").next_page();
        let body = client.request_body(&q);
        assert_eq!(body.search, "*");
        assert_eq!(body.skip, 5);
        assert_eq!(body.facets, vec!["City,count:10".to_string()]);
    }
}
