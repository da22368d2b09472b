//! Messaging provider port.
//!
//! The provider is the third-party service that owns transport, auth and
//! conversation state. The rest of the crate only talks to it through the
//! [`MessagingProvider`] trait, so the adapter can run against any
//! implementation. One is shipped:
//! - [`simulated::SimulatedProvider`] — in-process stand-in used by the demo
//!   binary and tests

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

pub mod events;
pub mod simulated;

pub use events::{
    AgentData, CloseReason, ConversationData, ErrorKind, Notice, PermissionType, ProviderEvent,
    Resolution,
};

/// Error reported by the provider for a one-shot call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    /// Provider-supplied description.
    pub message: String,
}

impl ProviderError {
    /// Build an error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Completion callback for a one-shot provider call.
///
/// Being `FnOnce`, a provider can resolve it at most once. Dropping it
/// without calling it is reported to the caller as an abandoned call.
pub type Completion<T> = Box<dyn FnOnce(Result<T, ProviderError>) + Send + 'static>;

/// Receives every notification the provider raises.
pub type EventHandler = Arc<dyn Fn(ProviderEvent) + Send + Sync + 'static>;

/// Verbosity of the provider's own internal logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdkLogLevel {
    /// Everything, including per-frame chatter.
    Verbose,
    /// Informational and above.
    Info,
    /// Errors only.
    Error,
}

impl SdkLogLevel {
    /// Level used when no override is configured.
    pub fn for_build(debug: bool) -> Self {
        if debug {
            Self::Verbose
        } else {
            Self::Error
        }
    }
}

/// Everything the provider needs to initialise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitParams {
    /// Brand (account) identifier.
    pub brand_id: String,
    /// Host application identifier.
    pub application_id: String,
    /// Installation identifier used for provider-side monitoring.
    pub installation_id: Uuid,
}

/// Consumer profile shown to agents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumerProfile {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Phone number.
    pub phone_number: String,
}

/// How the consumer authenticates when opening the conversation view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Anonymous consumer.
    Unauthenticated,
}

/// Presentation parameters for the conversation view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewParams {
    /// Whether the consumer may type.
    pub read_only: bool,
}

/// Opaque handle to the provider's conversation UI component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationView {
    /// Auth mode the view was created with.
    pub auth: AuthMode,
    /// Presentation parameters.
    pub params: ViewParams,
    /// Provider tag identifying the component instance.
    pub tag: String,
}

/// Callback-style interface of a customer-messaging provider.
///
/// Implementations may invoke completions and the event handler from any
/// thread.
pub trait MessagingProvider: Send + Sync {
    /// Set the provider's internal log verbosity.
    fn set_log_level(&self, level: SdkLogLevel);

    /// Start provider initialisation; `done` is resolved once.
    fn initialize(&self, params: InitParams, done: Completion<()>);

    /// Set the consumer profile shown to agents.
    fn set_user_profile(&self, profile: ConsumerProfile);

    /// Install the notification handler, replacing any previous one.
    fn set_event_handler(&self, handler: EventHandler);

    /// Ask whether a conversation is currently open; `done` is resolved once.
    fn check_active_conversation(&self, done: Completion<bool>);

    /// Request resolution of the open conversation.
    fn resolve_conversation(&self);

    /// Create the conversation UI component, if the provider can.
    fn conversation_view(&self, auth: AuthMode, params: ViewParams) -> Option<ConversationView>;
}

impl fmt::Debug for dyn MessagingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MessagingProvider")
    }
}
