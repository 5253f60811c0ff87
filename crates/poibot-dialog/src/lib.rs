//! poibot-dialog
//!
//! The multi-turn search / refine / select flow: refiner labelling
//! (`refine`), selection bookkeeping (`selection`), the per-conversation
//! state machine (`dialog`), intent pre-emption (`intent`) and the host that
//! ties them to a transport (`bot`).

pub mod bot;
pub mod config;
pub mod dialog;
pub mod intent;
pub mod refine;
pub mod reply;
pub mod selection;

pub use bot::{Bot, Continuation, IntentHandler, Transport};
pub use config::{DialogConfig, DialogConfigBuilder};
pub use dialog::{DialogState, Outcome, SearchDialog, Turn};
pub use intent::{HandlerId, IntentRouter, Route};
pub use refine::{default_formatter, RefineFormatter, RefinerLabels};
pub use reply::Reply;
pub use selection::{SelectionMode, SelectionTracker, TrackerState};
