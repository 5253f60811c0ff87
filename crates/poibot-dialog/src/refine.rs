//! Refiner labels.
//!
//! A formatter turns the configured facet fields into `(label, field)` pairs
//! once, at registration. [`RefinerLabels`] checks the result and keeps it in
//! field order; every page's [`Refiner`]s are then labelled from it.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

use poibot_core::{Error, Refiner, Result, SearchResults};

/// Field names in, `(label, field)` pairs out.
pub type RefineFormatter = Arc<dyn Fn(&[String]) -> Vec<(String, String)> + Send + Sync>;

/// `By <Capitalized>` for every field.
pub fn default_formatter() -> RefineFormatter {
    Arc::new(|fields: &[String]| fields.iter().map(|f| (format!("By {}", capitalize(f)), f.clone())).collect())
}

/// First character upper-cased, the rest lower-cased: `ProductType` ->
/// `Producttype`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct RefinerLabels {
    by_label: IndexMap<String, String>,
}

impl RefinerLabels {
    /// Fails with `Error::Config` on duplicate fields, duplicate labels
    /// (compared case-insensitively, as users type them), or a formatter
    /// that drops, invents or repeats a field.
    pub fn aggregate(fields: &[String], formatter: &RefineFormatter) -> Result<Self> {
        let mut seen = HashSet::new();
        for field in fields {
            if field.trim().is_empty() {
                return Err(Error::Config("refiner field names must not be empty".to_string()));
            }
            if !seen.insert(field.as_str()) {
                return Err(Error::Config(format!("duplicate refiner field '{}'", field)));
            }
        }

        let mut label_of: IndexMap<String, String> = IndexMap::new();
        let mut labels_seen = HashSet::new();
        for (label, field) in formatter(fields) {
            if !seen.contains(field.as_str()) {
                return Err(Error::Config(format!("formatter produced a label for unknown field '{}'", field)));
            }
            if label.trim().is_empty() {
                return Err(Error::Config(format!("empty label for refiner field '{}'", field)));
            }
            if !labels_seen.insert(label.to_lowercase()) {
                return Err(Error::Config(format!("duplicate refiner label '{}'", label)));
            }
            if label_of.insert(field.clone(), label).is_some() {
                return Err(Error::Config(format!("formatter labelled field '{}' twice", field)));
            }
        }

        let mut by_label = IndexMap::with_capacity(fields.len());
        for field in fields {
            let label = label_of
                .swap_remove(field)
                .ok_or_else(|| Error::Config(format!("formatter produced no label for field '{}'", field)))?;
            by_label.insert(label, field.clone());
        }
        Ok(Self { by_label })
    }

    /// Case-insensitive label lookup.
    pub fn field_for(&self, label: &str) -> Option<&str> {
        let wanted = label.trim();
        self.by_label
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(wanted))
            .map(|(_, f)| f.as_str())
    }

    pub fn label_for(&self, field: &str) -> Option<&str> {
        self.by_label.iter().find(|(_, f)| f.as_str() == field).map(|(l, _)| l.as_str())
    }

    /// `(label, field)` in configured field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_label.iter().map(|(l, f)| (l.as_str(), f.as_str()))
    }

    pub fn len(&self) -> usize { self.by_label.len() }

    pub fn is_empty(&self) -> bool { self.by_label.is_empty() }

    /// Labelled refiners for the facets a search reported, in configured
    /// order. Facets with no values, or not configured, are left out.
    pub fn refiners(&self, results: &SearchResults) -> Vec<Refiner> {
        self.iter()
            .filter_map(|(label, field)| {
                let facet = results.facet(field)?;
                if facet.values.is_empty() { return None; }
                Some(Refiner { field: field.to_string(), label: label.to_string(), values: facet.values.clone() })
            })
            .collect()
    }
}
