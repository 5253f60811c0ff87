#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use poibot_core::traits::SearchClient;
use poibot_core::{Error, FacetValues, Query, Result, SearchHit, SearchResults};
use poibot_dialog::{Bot, DialogConfig, Reply, Transport};

pub const FACETS: [&str; 2] = ["City", "Neighborhood"];

pub struct Poi {
    pub hit: SearchHit,
    pub fields: HashMap<String, String>,
}

pub fn poi(key: &str, name: &str, city: &str, neighborhood: &str) -> Poi {
    let hit = SearchHit {
        key: key.to_string(),
        title: format!("{}, {}", name, city),
        description: format!("({}, {})", neighborhood, city),
        image_url: None,
    };
    let fields = HashMap::from([
        ("City".to_string(), city.to_string()),
        ("Neighborhood".to_string(), neighborhood.to_string()),
    ]);
    Poi { hit, fields }
}

pub fn catalog() -> Vec<Poi> {
    vec![
        poi("1", "Rizal Park", "Manila", "Ermita"),
        poi("2", "Fort Santiago", "Manila", "Intramuros"),
        poi("3", "Manila Cathedral", "Manila", "Intramuros"),
        poi("4", "SM Mall of Asia", "Pasay", "Bay City"),
        poi("5", "Cultural Center", "Pasay", "Bay City"),
        poi("6", "Quiapo Church", "Manila", "Quiapo"),
    ]
}

/// In-memory search: case-insensitive substring match on title and field
/// values, exact match on refinements, optional injected failures.
pub struct FakeSearch {
    pois: Vec<Poi>,
    page_size: usize,
    failures: AtomicUsize,
    next_error: Mutex<Option<Error>>,
    unmappable: AtomicBool,
    pub queries: Mutex<Vec<Query>>,
}

impl FakeSearch {
    pub fn new(page_size: usize) -> Self {
        Self {
            pois: catalog(),
            page_size,
            failures: AtomicUsize::new(0),
            next_error: Mutex::new(None),
            unmappable: AtomicBool::new(false),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_next(&self, n: usize) { self.failures.store(n, Ordering::SeqCst); }

    /// The next search returns `err` instead of results.
    pub fn fail_next_with(&self, err: Error) { *self.next_error.lock().unwrap() = Some(err); }

    /// Every matching record fails mapping: pages come back with no hits and
    /// a non-zero `skipped`.
    pub fn set_unmappable(&self, on: bool) { self.unmappable.store(on, Ordering::SeqCst); }

    pub fn queries(&self) -> Vec<Query> { self.queries.lock().unwrap().clone() }
}

#[async_trait]
impl SearchClient for FakeSearch {
    async fn search(&self, query: &Query) -> Result<SearchResults> {
        self.queries.lock().unwrap().push(query.clone());
        if let Some(err) = self.next_error.lock().unwrap().take() {
            return Err(err);
        }
        if self.failures.load(Ordering::SeqCst) > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::SearchUnavailable("injected".to_string()));
        }
        if query.text.contains("((") {
            return Err(Error::InvalidQuery("unbalanced parentheses".to_string()));
        }
        let needle = query.text.to_lowercase();
        let matching: Vec<&Poi> = self
            .pois
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.hit.title.to_lowercase().contains(&needle)
                    || p.fields.values().any(|v| v.to_lowercase().contains(&needle))
            })
            .filter(|p| query.refinements.iter().all(|r| p.fields.get(&r.field) == Some(&r.value)))
            .collect();

        let mut facets = Vec::new();
        for field in FACETS {
            let mut values: Vec<String> = Vec::new();
            for p in &matching {
                if let Some(v) = p.fields.get(field) {
                    if !values.contains(v) { values.push(v.clone()); }
                }
            }
            facets.push(FacetValues { field: field.to_string(), values });
        }

        let start = query.page * self.page_size;
        if self.unmappable.load(Ordering::SeqCst) {
            let skipped = matching.len().saturating_sub(start).min(self.page_size);
            return Ok(SearchResults { hits: Vec::new(), facets, has_more: false, skipped });
        }
        let hits: Vec<SearchHit> = matching.iter().skip(start).take(self.page_size).map(|p| p.hit.clone()).collect();
        let has_more = start + hits.len() < matching.len();
        Ok(SearchResults { hits, facets, has_more, skipped: 0 })
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, Reply)>>,
}

impl RecordingTransport {
    pub fn all(&self) -> Vec<(String, Reply)> { self.sent.lock().unwrap().clone() }

    /// Drain what was sent to one conversation.
    pub fn take(&self, conversation: &str) -> Vec<Reply> {
        let mut sent = self.sent.lock().unwrap();
        let (mine, rest): (Vec<_>, Vec<_>) = sent.drain(..).partition(|(c, _)| c == conversation);
        *sent = rest;
        mine.into_iter().map(|(_, r)| r).collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, conversation: &str, reply: &Reply) -> Result<()> {
        self.sent.lock().unwrap().push((conversation.to_string(), reply.clone()));
        Ok(())
    }
}

/// A transport whose channel is gone.
pub struct ClosedTransport;

#[async_trait]
impl Transport for ClosedTransport {
    async fn send(&self, _conversation: &str, _reply: &Reply) -> Result<()> {
        Err(Error::Transport("channel closed".to_string()))
    }
}

pub fn config(search: Arc<FakeSearch>, multiple: bool) -> DialogConfig {
    DialogConfig::builder()
        .multiple_selection(multiple)
        .search(search)
        .refiners(FACETS)
        .build()
        .expect("valid config")
}

/// A bot whose completed selections are captured.
pub fn bot(search: Arc<FakeSearch>, multiple: bool) -> (Bot, Arc<Mutex<Vec<Vec<SearchHit>>>>) {
    let completed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&completed);
    let bot = Bot::new(config(search, multiple))
        .expect("bot")
        .on_complete(Arc::new(move |hits: &[SearchHit]| {
            sink.lock().unwrap().push(hits.to_vec());
            vec![poibot_dialog::reply::selection_summary(hits)]
        }));
    (bot, completed)
}

pub fn texts(replies: &[Reply]) -> Vec<String> {
    replies.iter().filter_map(|r| r.as_text().map(str::to_string)).collect()
}

pub fn result_page(replies: &[Reply]) -> Option<&poibot_core::ResultPage> {
    replies.iter().find_map(|r| match r {
        Reply::Results { page } => Some(page),
        _ => None,
    })
}
