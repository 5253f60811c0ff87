//! Conversation host.
//!
//! [`Bot::on_turn`] is the single entry point for inbound text. Intents are
//! matched first; anything else goes to the conversation's search dialog.
//! Every conversation has its own lock, so its turns run one at a time while
//! different conversations proceed in parallel.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use poibot_core::{Error, Result, SearchHit};

use crate::config::DialogConfig;
use crate::dialog::{DialogState, Outcome, SearchDialog};
use crate::intent::{HandlerId, IntentRouter, Route, HELP_INTENT};
use crate::reply::{selection_summary, Reply, HELP_TEXT, START_OVER};

/// Delivers replies to a conversation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, conversation: &str, reply: &Reply) -> Result<()>;
}

/// Gets the triggering utterance, returns what to send.
pub type IntentHandler = Arc<dyn Fn(&str) -> Vec<Reply> + Send + Sync>;

/// Receives the final selection of a completed dialog.
pub type Continuation = Arc<dyn Fn(&[SearchHit]) -> Vec<Reply> + Send + Sync>;

#[derive(Default)]
struct Session {
    dialog: Option<SearchDialog>,
}

pub struct Bot {
    config: Arc<DialogConfig>,
    router: IntentRouter,
    intents: HashMap<HandlerId, IntentHandler>,
    on_complete: Continuation,
    sessions: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
}

impl Bot {
    /// A bot with the help intent and the default completion message.
    pub fn new(config: DialogConfig) -> Result<Self> {
        let mut intents: HashMap<HandlerId, IntentHandler> = HashMap::new();
        intents.insert(HandlerId::new(HELP_INTENT), Arc::new(|_: &str| vec![Reply::text(HELP_TEXT)]));
        Ok(Self {
            config: Arc::new(config),
            router: IntentRouter::with_help()?,
            intents,
            on_complete: Arc::new(|hits: &[SearchHit]| vec![selection_summary(hits)]),
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Adds an intent after the existing ones.
    pub fn with_intent(mut self, pattern: &str, id: &str, handler: IntentHandler) -> Result<Self> {
        let id = HandlerId::new(id);
        if self.intents.contains_key(&id) {
            return Err(Error::Config(format!("intent '{}' registered twice", id)));
        }
        self.router.register(pattern, id.clone())?;
        self.intents.insert(id, handler);
        Ok(self)
    }

    pub fn on_complete(mut self, continuation: Continuation) -> Self {
        self.on_complete = continuation;
        self
    }

    pub async fn on_turn(&self, conversation: &str, text: &str, transport: &dyn Transport) -> Result<()> {
        let session = self.session(conversation).await;
        let mut guard = session.lock().await;
        let result = self.turn(conversation, text, transport, &mut guard).await;
        let idle = guard.dialog.is_none();
        drop(guard);
        if idle {
            self.prune(conversation, &session).await;
        }
        result
    }

    async fn turn(&self, conversation: &str, text: &str, transport: &dyn Transport, session: &mut Session) -> Result<()> {
        if let Route::Intent(id) = self.router.route(text) {
            debug!(conversation, intent = %id, "intent matched");
            let replies = self.intents.get(&id).map(|handler| handler(text)).unwrap_or_default();
            return send_all(transport, conversation, &replies).await;
        }

        if session.dialog.is_none() {
            let dialog = SearchDialog::new(Arc::clone(&self.config));
            let replies = dialog.begin();
            session.dialog = Some(dialog);
            debug!(conversation, "search dialog started");
            return send_all(transport, conversation, &replies).await;
        }
        let Some(dialog) = session.dialog.as_mut() else { return Ok(()) };

        match dialog.handle(text).await {
            Ok(turn) => {
                if let Outcome::Completed(hits) = &turn.outcome {
                    session.dialog = None;
                    info!(conversation, selected = hits.len(), "search dialog completed");
                }
                send_all(transport, conversation, &turn.replies).await?;
                if let Outcome::Completed(hits) = turn.outcome {
                    send_all(transport, conversation, &(self.on_complete)(&hits)).await?;
                }
                Ok(())
            }
            Err(Error::InvalidState(reason)) => {
                error!(conversation, %reason, "dialog in an invalid state, discarding it");
                session.dialog = None;
                send_all(transport, conversation, &[Reply::text(START_OVER)]).await
            }
            Err(e) => Err(e),
        }
    }

    /// State of the conversation's dialog, if one is running.
    pub async fn dialog_state(&self, conversation: &str) -> Option<DialogState> {
        let session = self.sessions.lock().await.get(conversation).cloned()?;
        let session = session.lock().await;
        session.dialog.as_ref().map(SearchDialog::state)
    }

    /// Forget a conversation; any running dialog is dropped.
    pub async fn end_conversation(&self, conversation: &str) -> bool {
        self.sessions.lock().await.remove(conversation).is_some()
    }

    pub async fn active_conversations(&self) -> usize { self.sessions.lock().await.len() }

    /// Drops an entry with no running dialog unless another turn is already
    /// waiting on it.
    async fn prune(&self, conversation: &str, session: &Arc<Mutex<Session>>) {
        let mut sessions = self.sessions.lock().await;
        let unshared = sessions.get(conversation).is_some_and(|entry| Arc::ptr_eq(entry, session) && Arc::strong_count(session) == 2);
        if unshared {
            sessions.remove(conversation);
        }
    }

    async fn session(&self, conversation: &str) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions.lock().await;
        Arc::clone(sessions.entry(conversation.to_string()).or_default())
    }
}

async fn send_all(transport: &dyn Transport, conversation: &str, replies: &[Reply]) -> Result<()> {
    for reply in replies {
        transport.send(conversation, reply).await?;
    }
    Ok(())
}
