//! Outbound messages and their plain-text rendering.

use serde::Serialize;
use std::fmt;

use poibot_core::{ResultPage, SearchHit};

pub const PROMPT_QUERY: &str = "What would you like to search for?";
pub const NO_RESULTS: &str = "Sorry, I didn't find any matches.";
pub const SEARCH_UNAVAILABLE: &str = "Sorry, the search service isn't available right now. Please try your search again.";
pub const NO_MORE_RESULTS: &str = "There are no more results for this search.";
pub const START_OVER: &str = "Sorry, something went wrong. Let's start over.";
pub const HELP_TEXT: &str = "This is an Azure Search bot that finds POIs near the location you enter. Here are the Searchable fields: Streetname, City, District, State, Country, Neighborhood, geohash and neighboring geohashes. Your query must contain value representing any of the field. For example, type \"Manila\" and see the results.";

/// Something the bot sends back. Transports may use the `Display` form or
/// serialize the structured variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Text { text: String },
    Results { page: ResultPage },
    RefinerValues { label: String, values: Vec<String> },
    Selection { hits: Vec<SearchHit> },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self { Reply::Text { text: text.into() } }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text { text } => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Text { text } => f.write_str(text),
            Reply::Results { page } => {
                for (i, hit) in page.hits.iter().enumerate() {
                    writeln!(f, "{}. {}", i + 1, hit.title)?;
                    writeln!(f, "   {}", hit.description)?;
                    if let Some(url) = &hit.image_url { writeln!(f, "   {}", url)?; }
                }
                if !page.refiners.is_empty() {
                    let labels: Vec<&str> = page.refiners.iter().map(|r| r.label.as_str()).collect();
                    writeln!(f, "Refine: {}", labels.join(", "))?;
                }
                if page.has_more { write!(f, "Type 'more' for more results.") } else { Ok(()) }
            }
            Reply::RefinerValues { label, values } => {
                writeln!(f, "{}:", label)?;
                for v in values { writeln!(f, "  - {}", v)?; }
                Ok(())
            }
            Reply::Selection { hits } if hits.is_empty() => f.write_str("You haven't selected anything yet."),
            Reply::Selection { hits } => {
                writeln!(f, "Your selection:")?;
                for hit in hits { writeln!(f, "  [{}] {}", hit.key, hit.title)?; }
                Ok(())
            }
        }
    }
}

/// The host's message after a dialog completes.
pub fn selection_summary(hits: &[SearchHit]) -> Reply {
    if hits.is_empty() {
        return Reply::text("Done! You didn't select any properties.");
    }
    let keys: Vec<&str> = hits.iter().map(|h| h.key.as_str()).collect();
    Reply::text(format!("Done! For future reference, you selected these properties: {}", keys.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_joins_keys() {
        let hit = |k: &str| SearchHit { key: k.to_string(), title: String::new(), description: String::new(), image_url: None };
        assert_eq!(
            selection_summary(&[hit("1"), hit("7")]).as_text(),
            Some("Done! For future reference, you selected these properties: 1, 7")
        );
    }

    #[test]
    fn serializes_with_type_tag() {
        let value = serde_json::to_value(Reply::text("hi")).unwrap();
        assert_eq!(value, serde_json::json!({"type": "text", "text": "hi"}));
        let value = serde_json::to_value(Reply::RefinerValues { label: "By City".into(), values: vec!["Manila".into()] }).unwrap();
        assert_eq!(value["type"], "refiner_values");
    }

    #[test]
    fn results_render_numbered() {
        let page = ResultPage {
            hits: vec![SearchHit { key: "1".into(), title: "Park".into(), description: "(x)".into(), image_url: None }],
            refiners: vec![],
            has_more: true,
        };
        let text = Reply::Results { page }.to_string();
        assert!(text.starts_with("1. Park\n   (x)\n"));
        assert!(text.ends_with("Type 'more' for more results."));
    }
}
