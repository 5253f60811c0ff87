//! Domain types shared by search providers and the dialog.

use serde::{Deserialize, Serialize};

/// Provider-native record. Field names are only interpreted by a
/// [`ResultMapper`](crate::traits::ResultMapper).
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// A facet constraint chosen by the user. How it is enforced is up to the
/// provider (OData filter, index term, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Refinement {
    pub field: String,
    pub value: String,
}

/// A submitted search. Never mutated in place: refining or paging yields a
/// new `Query`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub refinements: Vec<Refinement>,
    /// Zero-based page number.
    pub page: usize,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), refinements: Vec::new(), page: 0 }
    }

    /// Same text plus one more constraint, back on the first page.
    /// Re-applying an identical constraint is a no-op.
    pub fn refined(&self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let refinement = Refinement { field: field.into(), value: value.into() };
        let mut refinements = self.refinements.clone();
        if !refinements.contains(&refinement) {
            refinements.push(refinement);
        }
        Self { text: self.text.clone(), refinements, page: 0 }
    }

    pub fn next_page(&self) -> Self {
        Self { page: self.page + 1, ..self.clone() }
    }
}

/// One normalized search result.
///
/// `key` is non-empty and stable across pages for the same entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub key: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Values a provider reports for one facet field, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValues {
    pub field: String,
    pub values: Vec<String>,
}

/// Exactly one page as returned by a provider.
#[derive(Debug, Clone, Default)]
pub struct RawPage {
    pub records: Vec<RawRecord>,
    pub facets: Vec<FacetValues>,
    pub has_more: bool,
}

/// A provider page after mapping. Records that failed to map are counted in
/// `skipped` and left out of `hits`.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    pub facets: Vec<FacetValues>,
    pub has_more: bool,
    pub skipped: usize,
}

impl SearchResults {
    pub fn facet(&self, field: &str) -> Option<&FacetValues> {
        self.facets.iter().find(|f| f.field == field)
    }
}

/// A facet the user can filter by, with the values seen on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refiner {
    pub field: String,
    pub label: String,
    pub values: Vec<String>,
}

/// What the dialog presents for one query. Built fresh per search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPage {
    pub hits: Vec<SearchHit>,
    pub refiners: Vec<Refiner>,
    pub has_more: bool,
}

impl ResultPage {
    pub fn refiner(&self, field: &str) -> Option<&Refiner> {
        self.refiners.iter().find(|r| r.field == field)
    }
}
