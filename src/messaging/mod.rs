//! Messaging adapter: provider lifecycle, one-shot calls, and conversation
//! event streams.
//!
//! [`adapter::Messaging`] wraps a [`crate::provider::MessagingProvider`],
//! turns its completion callbacks into futures and its notifications into
//! two [`stream::EventStream`]s (conversation started / ended).

pub mod adapter;
pub mod signal;
pub mod stream;

pub use adapter::{Messaging, MessagingSettings, DEFAULT_INSTALLATION_ID};
pub use signal::ConversationSignal;
pub use stream::{CompositeSubscription, EventStream, StreamError, Subscription};

use crate::provider::ProviderError;

/// Tracing target shared by the adapter and the screen controller.
pub const LOG_TARGET: &str = "messaging";

/// Errors from the messaging adapter's one-shot calls.
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    /// The provider rejected initialisation.
    #[error("initialization failed for brand {brand_id}: {source}")]
    Initialization {
        /// Brand that was being initialised.
        brand_id: String,
        /// Provider-reported cause.
        #[source]
        source: ProviderError,
    },

    /// The provider could not report whether a conversation is open.
    #[error("active conversation check failed: {0}")]
    ActiveCheck(#[source] ProviderError),

    /// The provider dropped the completion without resolving it.
    #[error("provider abandoned {operation} without a result")]
    Abandoned {
        /// Which call was abandoned.
        operation: &'static str,
    },
}
