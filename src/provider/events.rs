//! Notifications delivered by a messaging provider.
//!
//! Every callback the provider can raise is one [`ProviderEvent`] variant.
//! Notifications the demo does not act on are still spelled out in
//! [`Notice`] so that a match over them stays exhaustive.

use std::fmt;

/// Data the provider attaches to a conversation notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationData {
    /// Provider-assigned conversation identifier.
    pub id: String,
}

impl ConversationData {
    /// Conversation data for the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Why the provider closed a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// The agent resolved the conversation.
    Agent,
    /// The consumer resolved the conversation.
    Consumer,
    /// The provider closed it (timeout, auto-close).
    System,
}

impl CloseReason {
    /// Symbolic name as reported by the provider (`AGENT`, `CONSUMER`, `SYSTEM`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Agent => "AGENT",
            Self::Consumer => "CONSUMER",
            Self::System => "SYSTEM",
        }
    }

    /// Parse a symbolic name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Agent, Self::Consumer, Self::System]
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The three shapes in which a provider reports a resolved conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Resolution with full conversation data.
    WithData(ConversationData),
    /// Resolution without any data.
    Bare,
    /// Resolution with a structured close reason only.
    Reason(CloseReason),
}

/// Source of a provider error notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A background provider task failed (connection, history fetch, ...).
    Task(String),
    /// A coded SDK error.
    Sdk(String),
    /// The provider did not say.
    Unknown,
}

/// Runtime permission a provider may ask the user for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionType {
    /// Camera access.
    Camera,
    /// Photo library / storage access.
    Photo,
    /// Microphone access.
    Microphone,
}

/// Agent profile attached to agent-centric notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentData {
    /// Agent first name.
    pub first_name: String,
    /// Agent last name.
    pub last_name: String,
    /// Avatar URL, if the brand configured one.
    pub avatar_url: Option<String>,
}

/// Provider notifications the demo receives but takes no action on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The conversation view was closed by the provider.
    ConversationViewClosed,
    /// The consumer marked the conversation urgent.
    MarkedAsUrgent,
    /// The consumer cleared the urgent mark.
    MarkedAsNormal,
    /// Agent typing indicator changed.
    AgentTyping(bool),
    /// Assigned agent or agent profile changed.
    AgentDetailsChanged(Option<AgentData>),
    /// Brand offline hours toggled.
    OfflineHoursChanged(bool),
    /// The user denied a runtime permission.
    UserDeniedPermission {
        /// Which permission.
        permission: Option<PermissionType>,
        /// Whether "don't ask again" was ticked.
        do_not_show_again: bool,
    },
    /// The user tried an action blocked by a previously denied permission.
    UserActionOnPreventedPermission(Option<PermissionType>),
    /// The user tapped the agent avatar.
    AgentAvatarTapped(Option<AgentData>),
    /// A link inside structured content was opened.
    StructuredContentLinkClicked(Option<String>),
    /// A satisfaction survey was shown.
    CsatLaunched,
    /// A satisfaction survey was dismissed.
    CsatDismissed,
    /// A satisfaction survey was submitted.
    CsatSubmitted {
        /// Conversation the survey belongs to.
        conversation_id: Option<String>,
        /// Star rating, when the survey carried one.
        star_rating: Option<u8>,
    },
    /// A satisfaction survey was skipped.
    CsatSkipped,
    /// The authentication token expired.
    TokenExpired,
    /// The unauthenticated consumer identity expired.
    UnauthenticatedUserExpired,
    /// Socket connectivity changed.
    ConnectionChanged(bool),
}

/// A single notification from the provider's callback interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// A conversation started. The provider raises this both with and
    /// without conversation data.
    ConversationStarted(Option<ConversationData>),
    /// A conversation was resolved.
    ConversationResolved(Resolution),
    /// The provider reported an error.
    Error {
        /// Where the error came from.
        kind: ErrorKind,
        /// Provider message, if any.
        message: Option<String>,
    },
    /// Anything else.
    Ignored(Notice),
}
