//! The search / refine / select conversation for one user.
//!
//! ```text
//! AwaitingQuery -> Searching -> PresentingResults -> AwaitingQuery
//!                                                 -> PresentingResults
//!                                                 -> Completed
//! ```
//!
//! Each turn returns the replies to send; the dialog never talks to a
//! transport itself.

use std::sync::Arc;
use tracing::{debug, warn};

use poibot_core::{Error, Query, Result, ResultPage, SearchHit};

use crate::config::DialogConfig;
use crate::reply::{Reply, NO_MORE_RESULTS, NO_RESULTS, PROMPT_QUERY, SEARCH_UNAVAILABLE};
use crate::selection::{SelectionMode, SelectionTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    AwaitingQuery,
    Searching,
    PresentingResults,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// The final selection, in insertion order.
    Completed(Vec<SearchHit>),
}

#[derive(Debug, Clone)]
pub struct Turn {
    pub replies: Vec<Reply>,
    pub outcome: Outcome,
}

impl Turn {
    fn reply(replies: Vec<Reply>) -> Self { Self { replies, outcome: Outcome::Continue } }
}

/// A user action while results are on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Finish,
    List,
    More,
    Refine,
    Select(usize),
    UnknownHit(String),
    Deselect(String),
    ShowRefiner(String),
    Apply { field: String, value: String },
    NewQuery(String),
}

pub struct SearchDialog {
    config: Arc<DialogConfig>,
    state: DialogState,
    query: Option<Query>,
    page: Option<ResultPage>,
    /// Field whose values were just listed.
    pending_refiner: Option<String>,
    tracker: SelectionTracker,
}

impl SearchDialog {
    pub fn new(config: Arc<DialogConfig>) -> Self {
        let tracker = SelectionTracker::new(config.selection_mode());
        Self { config, state: DialogState::AwaitingQuery, query: None, page: None, pending_refiner: None, tracker }
    }

    pub fn state(&self) -> DialogState { self.state }

    pub fn query(&self) -> Option<&Query> { self.query.as_ref() }

    pub fn page(&self) -> Option<&ResultPage> { self.page.as_ref() }

    pub fn selection(&self) -> &SelectionTracker { &self.tracker }

    /// The opening prompt.
    pub fn begin(&self) -> Vec<Reply> { vec![Reply::text(PROMPT_QUERY)] }

    pub async fn handle(&mut self, text: &str) -> Result<Turn> {
        match self.state {
            DialogState::AwaitingQuery => self.search(Query::new(text.trim())).await,
            DialogState::PresentingResults => {
                let action = self.parse_action(text);
                debug!(?action, "dialog action");
                self.act(action).await
            }
            DialogState::Searching => Err(Error::InvalidState("turn received while a search is outstanding".to_string())),
            DialogState::Completed => Err(Error::InvalidState("turn received after the dialog completed".to_string())),
        }
    }

    fn parse_action(&self, text: &str) -> Action {
        let t = text.trim();
        match t.to_lowercase().as_str() {
            "done" | "finish" | "finished" => return Action::Finish,
            "list" | "selection" => return Action::List,
            "more" | "next" => return Action::More,
            "refine" => return Action::Refine,
            _ => {}
        }
        for prefix in ["remove ", "deselect ", "unselect "] {
            if let Some(rest) = strip_prefix_ci(t, prefix) {
                let key = self.hit_index(rest).and_then(|i| self.hit_at(i)).map_or_else(|| rest.to_string(), |h| h.key.clone());
                return Action::Deselect(key);
            }
        }
        for prefix in ["add ", "select "] {
            if let Some(rest) = strip_prefix_ci(t, prefix) {
                return self.hit_index(rest).map_or_else(|| Action::UnknownHit(rest.to_string()), Action::Select);
            }
        }
        if let Some(i) = self.hit_index(t) {
            return Action::Select(i);
        }
        let labels = self.config.labels();
        if let Some(field) = &self.pending_refiner {
            if let Some(value) = self.refiner_value(field, t) {
                return Action::Apply { field: field.clone(), value: value.to_string() };
            }
        }
        if let Some((label, value)) = t.split_once(':') {
            if let Some(field) = labels.field_for(label) {
                let value = value.trim();
                if value.is_empty() {
                    return Action::ShowRefiner(field.to_string());
                }
                let value = self.refiner_value(field, value).unwrap_or(value);
                return Action::Apply { field: field.to_string(), value: value.to_string() };
            }
        }
        if let Some(field) = labels.field_for(t) {
            return Action::ShowRefiner(field.to_string());
        }
        Action::NewQuery(t.to_string())
    }

    /// The current page's spelling of a refiner value, matched ignoring case.
    fn refiner_value(&self, field: &str, typed: &str) -> Option<&str> {
        let refiner = self.page.as_ref()?.refiner(field)?;
        refiner.values.iter().find(|v| v.eq_ignore_ascii_case(typed.trim())).map(String::as_str)
    }

    /// A 1-based position or a key on the current page.
    fn hit_index(&self, reference: &str) -> Option<usize> {
        let hits = &self.page.as_ref()?.hits;
        let reference = reference.trim();
        if let Ok(n) = reference.parse::<usize>() {
            if (1..=hits.len()).contains(&n) {
                return Some(n - 1);
            }
        }
        hits.iter().position(|h| h.key == reference)
    }

    fn hit_at(&self, index: usize) -> Option<&SearchHit> {
        self.page.as_ref().and_then(|p| p.hits.get(index))
    }

    async fn act(&mut self, action: Action) -> Result<Turn> {
        let pending = self.pending_refiner.take();
        match action {
            Action::Finish => Ok(self.complete()),
            Action::List => Ok(Turn::reply(vec![Reply::Selection { hits: self.tracker.selected().cloned().collect() }])),
            Action::More => {
                let next = self.query.as_ref().filter(|_| self.page.as_ref().is_some_and(|p| p.has_more)).map(Query::next_page);
                match next {
                    Some(query) => self.search(query).await,
                    None => Ok(Turn::reply(vec![Reply::text(NO_MORE_RESULTS)])),
                }
            }
            Action::Refine => {
                let labels: Vec<&str> = self.page.iter().flat_map(|p| p.refiners.iter().map(|r| r.label.as_str())).collect();
                let text = if labels.is_empty() {
                    "There's nothing to refine these results by.".to_string()
                } else {
                    format!("You can refine by: {}", labels.join(", "))
                };
                Ok(Turn::reply(vec![Reply::text(text)]))
            }
            Action::Select(index) => {
                let hit = self.hit_at(index).cloned().ok_or_else(|| Error::InvalidState(format!("no hit at position {}", index + 1)))?;
                self.tracker.select(hit.clone())?;
                debug!(key = %hit.key, selected = self.tracker.len(), "hit selected");
                match self.tracker.mode() {
                    SelectionMode::Single => Ok(self.complete()),
                    SelectionMode::Multiple => Ok(Turn::reply(vec![Reply::text(format!(
                        "Added '{}'. You have {} selected. Pick another, or type 'done' when you're finished.",
                        hit.title,
                        self.tracker.len()
                    ))])),
                }
            }
            Action::UnknownHit(reference) => {
                Ok(Turn::reply(vec![Reply::text(format!("There's no result '{}' on this page.", reference))]))
            }
            Action::Deselect(key) => {
                let text = if self.tracker.deselect(&key)? {
                    format!("Removed '{}'. You have {} selected.", key, self.tracker.len())
                } else {
                    format!("'{}' wasn't in your selection.", key)
                };
                Ok(Turn::reply(vec![Reply::text(text)]))
            }
            Action::ShowRefiner(field) => {
                let refiner = self.page.as_ref().and_then(|p| p.refiner(&field)).cloned();
                match refiner {
                    Some(refiner) => {
                        self.pending_refiner = Some(field);
                        Ok(Turn::reply(vec![
                            Reply::RefinerValues { label: refiner.label, values: refiner.values },
                            Reply::text("Which one?"),
                        ]))
                    }
                    None => {
                        self.pending_refiner = pending;
                        let label = self.config.labels().label_for(&field).unwrap_or(field.as_str()).to_string();
                        Ok(Turn::reply(vec![Reply::text(format!("These results can't be refined {}.", label.to_lowercase()))]))
                    }
                }
            }
            Action::Apply { field, value } => {
                let base = self.query.clone().unwrap_or_default();
                self.search(base.refined(field, value)).await
            }
            Action::NewQuery(text) => self.search(Query::new(text)).await,
        }
    }

    async fn search(&mut self, query: Query) -> Result<Turn> {
        self.transition(DialogState::Searching);
        let config = Arc::clone(&self.config);
        debug!(text = %query.text, refinements = query.refinements.len(), page = query.page, "dispatching search");
        let outcome = config.search().search(&query).await;
        match outcome {
            Ok(results) if results.hits.is_empty() => {
                self.reset_to_query();
                Ok(Turn::reply(vec![Reply::text(NO_RESULTS), Reply::text(PROMPT_QUERY)]))
            }
            Ok(results) => {
                let page = ResultPage {
                    refiners: config.labels().refiners(&results),
                    hits: results.hits,
                    has_more: results.has_more,
                };
                self.query = Some(query);
                self.page = Some(page.clone());
                self.transition(DialogState::PresentingResults);
                Ok(Turn::reply(vec![Reply::Results { page }, Reply::text(self.next_action_hint())]))
            }
            Err(Error::SearchUnavailable(reason)) => {
                warn!(%reason, "search unavailable");
                self.reset_to_query();
                Ok(Turn::reply(vec![Reply::text(SEARCH_UNAVAILABLE), Reply::text(PROMPT_QUERY)]))
            }
            Err(Error::InvalidQuery(reason)) => {
                debug!(%reason, "invalid query");
                self.reset_to_query();
                Ok(Turn::reply(vec![
                    Reply::text(format!("I couldn't run that search: {}", reason)),
                    Reply::text(PROMPT_QUERY),
                ]))
            }
            Err(e) => {
                self.reset_to_query();
                Err(e)
            }
        }
    }

    fn next_action_hint(&self) -> String {
        match self.tracker.mode() {
            SelectionMode::Multiple => "Type a result number to add it to your list, a refiner such as 'By City' to narrow down, 'list' to see your selection, or 'done' when you're finished.".to_string(),
            SelectionMode::Single => "Type the number of the result you want, or a refiner such as 'By City' to narrow down.".to_string(),
        }
    }

    fn complete(&mut self) -> Turn {
        let hits = self.tracker.finalize();
        self.query = None;
        self.page = None;
        self.pending_refiner = None;
        self.transition(DialogState::Completed);
        Turn { replies: Vec::new(), outcome: Outcome::Completed(hits) }
    }

    fn reset_to_query(&mut self) {
        self.query = None;
        self.page = None;
        self.pending_refiner = None;
        self.transition(DialogState::AwaitingQuery);
    }

    fn transition(&mut self, to: DialogState) {
        debug!(from = ?self.state, ?to, "dialog transition");
        self.state = to;
    }
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        text.get(prefix.len()..).map(str::trim).filter(|rest| !rest.is_empty())
    } else {
        None
    }
}
