//! Intents that pre-empt the active dialog.
//!
//! Routes are checked in registration order before any dialog state is
//! consulted; the first case-insensitive regex match wins.

use regex::{Regex, RegexBuilder};
use std::fmt;

use poibot_core::{Error, Result};

pub const HELP_INTENT: &str = "help";
pub const HELP_PATTERN: &str = "^help|support|assist";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerId(String);

impl HandlerId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Intent(HandlerId),
    NoMatch,
}

#[derive(Debug, Clone, Default)]
pub struct IntentRouter {
    routes: Vec<(Regex, HandlerId)>,
}

impl IntentRouter {
    pub fn new() -> Self { Self::default() }

    /// A router with only the help intent.
    pub fn with_help() -> Result<Self> {
        let mut router = Self::new();
        router.register(HELP_PATTERN, HandlerId::new(HELP_INTENT))?;
        Ok(router)
    }

    /// Appends a route; an invalid pattern is a configuration error.
    pub fn register(&mut self, pattern: &str, handler: HandlerId) -> Result<()> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::Config(format!("bad intent pattern '{}': {}", pattern, e)))?;
        self.routes.push((regex, handler));
        Ok(())
    }

    pub fn route(&self, utterance: &str) -> Route {
        self.routes
            .iter()
            .find(|(regex, _)| regex.is_match(utterance))
            .map_or(Route::NoMatch, |(_, id)| Route::Intent(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_pattern_matches_like_the_regex_says() {
        let router = IntentRouter::with_help().unwrap();
        let help = Route::Intent(HandlerId::new(HELP_INTENT));
        assert_eq!(router.route("help"), help);
        assert_eq!(router.route("HELP me"), help);
        assert_eq!(router.route("I need support"), help);
        assert_eq!(router.route("can you assist?"), help);
        assert_eq!(router.route("Manila"), Route::NoMatch);
        // "^" only anchors the first alternative.
        assert_eq!(router.route("no help"), Route::NoMatch);
    }

    #[test]
    fn first_registered_route_wins() {
        let mut router = IntentRouter::new();
        router.register("^reset", HandlerId::new("reset")).unwrap();
        router.register("reset|restart", HandlerId::new("restart")).unwrap();
        assert_eq!(router.route("Reset please"), Route::Intent(HandlerId::new("reset")));
        assert_eq!(router.route("restart"), Route::Intent(HandlerId::new("restart")));
    }

    #[test]
    fn bad_pattern_is_config_error() {
        let mut router = IntentRouter::new();
        assert!(matches!(router.register("(", HandlerId::new("x")), Err(Error::Config(_))));
    }
}
