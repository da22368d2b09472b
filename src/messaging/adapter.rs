//! The messaging adapter.
//!
//! Owns the provider connection for one screen session. One-shot provider
//! calls become futures backed by a oneshot channel; provider notifications
//! become emissions on the started/ended streams.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use super::signal::ConversationSignal;
use super::stream::{EventStream, DEFAULT_CAPACITY};
use super::{MessagingError, LOG_TARGET};
use crate::provider::{
    AuthMode, ConsumerProfile, ConversationView, InitParams, MessagingProvider, ProviderError,
    ProviderEvent, SdkLogLevel, ViewParams,
};

/// Installation identifier reported to the provider unless configured.
pub const DEFAULT_INSTALLATION_ID: Uuid = uuid::uuid!("f10767f2-24fd-4d8f-95bd-0397cd244194");

/// Adapter settings that do not change over a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagingSettings {
    /// Debug build behaviour (chattier provider logging).
    pub debug: bool,
    /// Installation identifier passed at initialisation.
    pub installation_id: Uuid,
    /// Explicit provider log level; derived from `debug` when unset.
    pub sdk_log_level: Option<SdkLogLevel>,
    /// Per-subscriber buffer of each event stream.
    pub stream_capacity: usize,
}

impl MessagingSettings {
    /// Settings for the given build mode with default identifiers.
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            installation_id: DEFAULT_INSTALLATION_ID,
            sdk_log_level: None,
            stream_capacity: DEFAULT_CAPACITY,
        }
    }

    /// The provider log level to apply.
    pub fn sdk_log_level(&self) -> SdkLogLevel {
        self.sdk_log_level
            .unwrap_or_else(|| SdkLogLevel::for_build(self.debug))
    }
}

impl Default for MessagingSettings {
    fn default() -> Self {
        Self::new(cfg!(debug_assertions))
    }
}

/// Adapter between a callback-style provider and async / stream consumers.
#[derive(Debug)]
pub struct Messaging {
    provider: Arc<dyn MessagingProvider>,
    settings: MessagingSettings,
    started: EventStream<String>,
    ended: EventStream<String>,
}

impl Messaging {
    /// Wrap a provider.
    pub fn new(provider: Arc<dyn MessagingProvider>, settings: MessagingSettings) -> Self {
        let capacity = settings.stream_capacity.max(1);
        Self {
            provider,
            settings,
            started: EventStream::new(capacity),
            ended: EventStream::new(capacity),
        }
    }

    /// Emits the identifier of each newly started conversation.
    pub fn conversation_started(&self) -> &EventStream<String> {
        &self.started
    }

    /// Emits once per resolved conversation: identifier, close-reason name,
    /// or an empty string.
    pub fn conversation_ended(&self) -> &EventStream<String> {
        &self.ended
    }

    /// Settings this adapter was built with.
    pub fn settings(&self) -> &MessagingSettings {
        &self.settings
    }

    /// Initialise the provider for a brand.
    ///
    /// On success an empty consumer profile is set before the future
    /// resolves. That step runs in the provider callback, so it happens even
    /// if the returned future is dropped first. No retry.
    ///
    /// # Errors
    ///
    /// [`MessagingError::Initialization`] with the provider's cause, or
    /// [`MessagingError::Abandoned`] if the provider never answers.
    pub async fn initialize(
        &self,
        brand_id: &str,
        application_id: &str,
    ) -> Result<(), MessagingError> {
        self.provider.set_log_level(self.settings.sdk_log_level());
        info!(target: LOG_TARGET, brand_id, "provider initialization started");

        let params = InitParams {
            brand_id: brand_id.to_owned(),
            application_id: application_id.to_owned(),
            installation_id: self.settings.installation_id,
        };
        debug!(target: LOG_TARGET, installation_id = %params.installation_id, "provider installation id");

        let (tx, rx) = oneshot::channel();
        let provider = Arc::clone(&self.provider);
        let brand = brand_id.to_owned();
        self.provider.initialize(
            params,
            Box::new(move |result: Result<(), ProviderError>| {
                match &result {
                    Ok(()) => {
                        info!(target: LOG_TARGET, brand_id = %brand, "provider initialization succeeded");
                        provider.set_user_profile(ConsumerProfile::default());
                    }
                    Err(e) => {
                        error!(target: LOG_TARGET, brand_id = %brand, error = %e, "provider initialization failed");
                    }
                }
                // Nobody awaiting is fine.
                let _ = tx.send(result);
            }),
        );

        match rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(MessagingError::Initialization {
                brand_id: brand_id.to_owned(),
                source,
            }),
            Err(_) => Err(MessagingError::Abandoned {
                operation: "initialize",
            }),
        }
    }

    /// Install the notification handler with the provider.
    ///
    /// Call after [`Messaging::initialize`] succeeds. A second call replaces
    /// the first handler.
    pub fn register_for_conversation_events(&self) {
        trace!(target: LOG_TARGET, "registering for conversation events");
        let started = self.started.clone();
        let ended = self.ended.clone();
        self.provider
            .set_event_handler(Arc::new(move |event: ProviderEvent| {
                dispatch(&event, &started, &ended);
            }));
    }

    /// Ask the provider whether a conversation is already open.
    ///
    /// # Errors
    ///
    /// [`MessagingError::ActiveCheck`] with the provider's cause, or
    /// [`MessagingError::Abandoned`] if the provider never answers.
    pub async fn is_conversation_active(&self) -> Result<bool, MessagingError> {
        debug!(target: LOG_TARGET, "checking active conversation state");
        let (tx, rx) = oneshot::channel();
        self.provider
            .check_active_conversation(Box::new(move |result: Result<bool, ProviderError>| {
                if let Ok(active) = &result {
                    debug!(target: LOG_TARGET, active, "active conversation state");
                }
                let _ = tx.send(result);
            }));

        match rx.await {
            Ok(Ok(active)) => Ok(active),
            Ok(Err(source)) => Err(MessagingError::ActiveCheck(source)),
            Err(_) => Err(MessagingError::Abandoned {
                operation: "is_conversation_active",
            }),
        }
    }

    /// Ask the provider to resolve the open conversation.
    ///
    /// The resulting end arrives later on [`Messaging::conversation_ended`].
    pub fn finish_conversation(&self) {
        info!(target: LOG_TARGET, "requesting conversation resolution");
        self.provider.resolve_conversation();
    }

    /// The provider's conversation view for an unauthenticated consumer.
    pub fn conversation_view(&self) -> Option<ConversationView> {
        self.provider
            .conversation_view(AuthMode::Unauthenticated, ViewParams::default())
    }
}

fn dispatch(event: &ProviderEvent, started: &EventStream<String>, ended: &EventStream<String>) {
    match ConversationSignal::from_event(event) {
        Some(ConversationSignal::Started(id)) => {
            trace!(target: LOG_TARGET, conversation_id = %id, "conversation started");
            started.emit(id);
        }
        Some(ConversationSignal::Ended(payload)) => {
            trace!(target: LOG_TARGET, payload = %payload, "conversation resolved");
            ended.emit(payload);
        }
        None => match event {
            ProviderEvent::Error { kind, message } => {
                warn!(target: LOG_TARGET, ?kind, message = message.as_deref().unwrap_or(""), "provider reported an error");
            }
            other => trace!(target: LOG_TARGET, event = ?other, "provider notification ignored"),
        },
    }
}
