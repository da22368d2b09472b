//! In-process provider that simulates a conversation backend.
//!
//! Outcomes are scripted up front and every call is recorded, so the same
//! type drives the demo binary and the test suite.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::{
    AuthMode, CloseReason, Completion, ConsumerProfile, ConversationData, ConversationView,
    EventHandler, InitParams, MessagingProvider, ProviderError, ProviderEvent, Resolution,
    SdkLogLevel, ViewParams,
};

/// Simulated provider with scripted outcomes.
pub struct SimulatedProvider {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    init_failure: Option<ProviderError>,
    active_failure: Option<ProviderError>,
    abandon_calls: bool,
    no_view: bool,
    close_reason: Option<CloseReason>,
    active: bool,
    handler: Option<EventHandler>,
    log_level: Option<SdkLogLevel>,
    init_params: Option<InitParams>,
    profile: Option<ConsumerProfile>,
    registrations: usize,
    resolve_requests: usize,
}

impl SimulatedProvider {
    /// A provider whose calls all succeed, with no open conversation.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Fail initialisation with the given message.
    pub fn with_init_failure(self, message: impl Into<String>) -> Self {
        self.update(|s| s.init_failure = Some(ProviderError::new(message)));
        self
    }

    /// Start with a conversation already open.
    pub fn with_active_conversation(self) -> Self {
        self.update(|s| s.active = true);
        self
    }

    /// Fail the active-conversation check with the given message.
    pub fn with_active_check_failure(self, message: impl Into<String>) -> Self {
        self.update(|s| s.active_failure = Some(ProviderError::new(message)));
        self
    }

    /// Report this close reason when a resolution is requested.
    ///
    /// Without one, resolution is reported as [`Resolution::Bare`].
    pub fn with_close_reason(self, reason: CloseReason) -> Self {
        self.update(|s| s.close_reason = Some(reason));
        self
    }

    /// Drop every completion without resolving it.
    pub fn with_abandoned_calls(self) -> Self {
        self.update(|s| s.abandon_calls = true);
        self
    }

    /// Return no conversation view.
    pub fn without_view(self) -> Self {
        self.update(|s| s.no_view = true);
        self
    }

    /// Deliver an event to the installed handler.
    ///
    /// Returns `false` when no handler is installed.
    pub fn emit(&self, event: ProviderEvent) -> bool {
        let handler = self.lock().handler.clone();
        match handler {
            Some(handler) => {
                handler(event);
                true
            }
            None => {
                debug!(?event, "no handler installed, dropping provider event");
                false
            }
        }
    }

    /// Open a conversation and announce it with its identifier.
    pub fn start_conversation(&self, id: impl Into<String>) -> bool {
        self.update(|s| s.active = true);
        self.emit(ProviderEvent::ConversationStarted(Some(ConversationData::new(
            id,
        ))))
    }

    /// Log level last set by the adapter.
    pub fn log_level(&self) -> Option<SdkLogLevel> {
        self.lock().log_level
    }

    /// Parameters of the last initialisation.
    pub fn init_params(&self) -> Option<InitParams> {
        self.lock().init_params.clone()
    }

    /// Consumer profile last set by the adapter.
    pub fn user_profile(&self) -> Option<ConsumerProfile> {
        self.lock().profile.clone()
    }

    /// Number of times an event handler was installed.
    pub fn registrations(&self) -> usize {
        self.lock().registrations
    }

    /// Number of resolution requests received.
    pub fn resolve_requests(&self) -> usize {
        self.lock().resolve_requests
    }

    /// Whether a conversation is currently open.
    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    fn update(&self, f: impl FnOnce(&mut State)) {
        f(&mut *self.lock());
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // State stays consistent across a panicking holder; recover it.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagingProvider for SimulatedProvider {
    fn set_log_level(&self, level: SdkLogLevel) {
        self.update(|s| s.log_level = Some(level));
    }

    fn initialize(&self, params: InitParams, done: Completion<()>) {
        let outcome = {
            let mut state = self.lock();
            state.init_params = Some(params);
            if state.abandon_calls {
                return;
            }
            match &state.init_failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        };
        done(outcome);
    }

    fn set_user_profile(&self, profile: ConsumerProfile) {
        self.update(|s| s.profile = Some(profile));
    }

    fn set_event_handler(&self, handler: EventHandler) {
        self.update(|s| {
            s.handler = Some(handler);
            s.registrations = s.registrations.saturating_add(1);
        });
    }

    fn check_active_conversation(&self, done: Completion<bool>) {
        let outcome = {
            let state = self.lock();
            if state.abandon_calls {
                return;
            }
            match &state.active_failure {
                Some(err) => Err(err.clone()),
                None => Ok(state.active),
            }
        };
        done(outcome);
    }

    fn resolve_conversation(&self) {
        let reason = {
            let mut state = self.lock();
            state.resolve_requests = state.resolve_requests.saturating_add(1);
            state.active = false;
            state.close_reason
        };
        let resolution = match reason {
            Some(reason) => Resolution::Reason(reason),
            None => Resolution::Bare,
        };
        self.emit(ProviderEvent::ConversationResolved(resolution));
    }

    fn conversation_view(&self, auth: AuthMode, params: ViewParams) -> Option<ConversationView> {
        if self.lock().no_view {
            return None;
        }
        Some(ConversationView {
            auth,
            params,
            tag: "simulated-conversation".to_owned(),
        })
    }
}
