//! Mapping from provider notifications to the two conversation signals.

use crate::provider::{ProviderEvent, Resolution};

/// A canonical conversation lifecycle signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationSignal {
    /// A conversation began; carries its identifier.
    Started(String),
    /// A conversation ended; the payload is best-effort metadata
    /// (identifier, close-reason name, or empty).
    Ended(String),
}

impl ConversationSignal {
    /// Translate one provider notification.
    ///
    /// A start without conversation data yields nothing, whereas a bare
    /// resolution yields an empty `Ended` payload.
    pub fn from_event(event: &ProviderEvent) -> Option<Self> {
        match event {
            ProviderEvent::ConversationStarted(Some(data)) => Some(Self::Started(data.id.clone())),
            ProviderEvent::ConversationStarted(None) => None,
            ProviderEvent::ConversationResolved(resolution) => {
                let payload = match resolution {
                    Resolution::WithData(data) => data.id.clone(),
                    Resolution::Bare => String::new(),
                    Resolution::Reason(reason) => reason.name().to_owned(),
                };
                Some(Self::Ended(payload))
            }
            ProviderEvent::Error { .. } | ProviderEvent::Ignored(_) => None,
        }
    }
}
