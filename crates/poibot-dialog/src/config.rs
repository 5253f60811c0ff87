//! Dialog registration.
//!
//! A [`DialogConfig`] is validated once when built and then shared
//! read-only by every conversation.

use std::fmt;
use std::sync::Arc;

use poibot_core::traits::SearchClient;
use poibot_core::{Error, Result};

use crate::refine::{default_formatter, RefineFormatter, RefinerLabels};
use crate::selection::SelectionMode;

pub struct DialogConfig {
    multiple_selection: bool,
    search: Arc<dyn SearchClient>,
    refiners: Vec<String>,
    labels: RefinerLabels,
}

impl DialogConfig {
    pub fn builder() -> DialogConfigBuilder { DialogConfigBuilder::default() }

    pub fn selection_mode(&self) -> SelectionMode { SelectionMode::from_multiple(self.multiple_selection) }

    pub fn search(&self) -> &dyn SearchClient { self.search.as_ref() }

    pub fn labels(&self) -> &RefinerLabels { &self.labels }
}

impl fmt::Debug for DialogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogConfig")
            .field("multiple_selection", &self.multiple_selection)
            .field("refiners", &self.refiners)
            .finish_non_exhaustive()
    }
}

pub struct DialogConfigBuilder {
    multiple_selection: bool,
    search: Option<Arc<dyn SearchClient>>,
    refiners: Vec<String>,
    refine_formatter: RefineFormatter,
}

impl Default for DialogConfigBuilder {
    fn default() -> Self {
        Self { multiple_selection: false, search: None, refiners: Vec::new(), refine_formatter: default_formatter() }
    }
}

impl DialogConfigBuilder {
    pub fn multiple_selection(mut self, multiple: bool) -> Self {
        self.multiple_selection = multiple;
        self
    }

    pub fn search(mut self, search: Arc<dyn SearchClient>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn refiners<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.refiners = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn refine_formatter(mut self, formatter: RefineFormatter) -> Self {
        self.refine_formatter = formatter;
        self
    }

    /// Fails with `Error::Config` when no search client was given or the
    /// refiner labels do not check out.
    pub fn build(self) -> Result<DialogConfig> {
        let search = self.search.ok_or_else(|| Error::Config("a search client is required".to_string()))?;
        let labels = RefinerLabels::aggregate(&self.refiners, &self.refine_formatter)?;
        Ok(DialogConfig { multiple_selection: self.multiple_selection, search, refiners: self.refiners, labels })
    }
}
