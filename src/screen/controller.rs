//! Screen controller for the conversation screen.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use super::{MenuItem, ScreenEvent, ScreenExit, ScreenView};
use crate::messaging::{CompositeSubscription, Messaging, MessagingError, LOG_TARGET};

/// Sender side of the UI queue for user input (toolbar, back navigation).
#[derive(Debug, Clone)]
pub struct ScreenInput {
    tx: mpsc::UnboundedSender<ScreenEvent>,
}

impl ScreenInput {
    /// Report a toolbar click. Returns `false` once the screen is gone.
    pub fn click(&self, item: MenuItem) -> bool {
        self.tx.send(ScreenEvent::MenuClicked(item)).is_ok()
    }

    /// Report back navigation. Returns `false` once the screen is gone.
    pub fn back(&self) -> bool {
        self.tx.send(ScreenEvent::BackPressed).is_ok()
    }
}

/// A single conversation screen.
pub struct ConversationScreen<V> {
    messaging: Arc<Messaging>,
    view: V,
    brand_id: String,
    application_id: String,
    subscriptions: CompositeSubscription,
    events_tx: mpsc::UnboundedSender<ScreenEvent>,
    events_rx: mpsc::UnboundedReceiver<ScreenEvent>,
    end_action_added: bool,
}

impl<V: ScreenView> ConversationScreen<V> {
    /// Build a screen for a brand. Nothing happens until [`Self::on_create`].
    pub fn new(
        messaging: Arc<Messaging>,
        view: V,
        brand_id: impl Into<String>,
        application_id: impl Into<String>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            messaging,
            view,
            brand_id: brand_id.into(),
            application_id: application_id.into(),
            subscriptions: CompositeSubscription::new(),
            events_tx,
            events_rx,
            end_action_added: false,
        }
    }

    /// Subscribe to conversation events and start the startup chain
    /// (initialize, register, active check).
    ///
    /// Must be called within a Tokio runtime. The startup chain is not
    /// cancelled by [`Self::on_destroy`]; its result is simply discarded.
    pub fn on_create(&self) {
        trace!(target: LOG_TARGET, brand_id = %self.brand_id, "screen created");

        let tx = self.events_tx.clone();
        self.subscriptions
            .add(self.messaging.conversation_started().subscribe(
                move |id| {
                    let _ = tx.send(ScreenEvent::ConversationStarted(id));
                },
                |e| error!(target: LOG_TARGET, error = %e, "error listening for conversation started"),
            ));

        let tx = self.events_tx.clone();
        self.subscriptions
            .add(self.messaging.conversation_ended().subscribe(
                move |payload| {
                    let _ = tx.send(ScreenEvent::ConversationEnded(payload));
                },
                |e| error!(target: LOG_TARGET, error = %e, "error listening for conversation ended"),
            ));

        let messaging = Arc::clone(&self.messaging);
        let tx = self.events_tx.clone();
        let brand_id = self.brand_id.clone();
        let application_id = self.application_id.clone();
        tokio::spawn(async move {
            let event = match startup(&messaging, &brand_id, &application_id).await {
                Ok(already_active) => ScreenEvent::Ready { already_active },
                Err(e) => ScreenEvent::StartupFailed(e.to_string()),
            };
            let _ = tx.send(event);
        });
    }

    /// Handle for feeding user input into the UI loop.
    pub fn input(&self) -> ScreenInput {
        ScreenInput {
            tx: self.events_tx.clone(),
        }
    }

    /// Drain the UI queue until the screen closes or is destroyed.
    pub async fn run(&mut self) -> ScreenExit {
        loop {
            if self.subscriptions.is_disposed() {
                return ScreenExit::Destroyed;
            }
            let Some(event) = self.events_rx.recv().await else {
                return ScreenExit::Destroyed;
            };
            if let Some(exit) = self.handle(event) {
                return exit;
            }
        }
    }

    /// Release every subscription. Idempotent.
    pub fn on_destroy(&self) {
        trace!(target: LOG_TARGET, "screen destroyed");
        self.subscriptions.dispose();
    }

    /// The view this screen renders to.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Whether the end-conversation action is on the toolbar.
    pub fn end_action_added(&self) -> bool {
        self.end_action_added
    }

    fn handle(&mut self, event: ScreenEvent) -> Option<ScreenExit> {
        match event {
            ScreenEvent::Ready { already_active } => {
                match self.messaging.conversation_view() {
                    Some(view) => self.view.show_conversation(view),
                    None => warn!(target: LOG_TARGET, "provider returned no conversation view"),
                }
                if already_active {
                    self.add_end_action();
                }
                None
            }
            ScreenEvent::StartupFailed(reason) => {
                error!(target: LOG_TARGET, error = %reason, "messaging initialization error");
                None
            }
            ScreenEvent::ConversationStarted(id) => {
                debug!(target: LOG_TARGET, conversation_id = %id, "conversation started");
                self.add_end_action();
                None
            }
            ScreenEvent::ConversationEnded(payload) => {
                info!(target: LOG_TARGET, payload = %payload, "conversation ended, closing screen");
                self.view.finish();
                Some(ScreenExit::ConversationEnded(payload))
            }
            ScreenEvent::MenuClicked(MenuItem::EndConversation) => {
                self.messaging.finish_conversation();
                None
            }
            ScreenEvent::MenuClicked(other) => {
                debug!(target: LOG_TARGET, item = other.label(), "unrecognized menu item");
                None
            }
            ScreenEvent::BackPressed => {
                self.view.finish();
                Some(ScreenExit::Closed)
            }
        }
    }

    fn add_end_action(&mut self) {
        if !self.end_action_added {
            self.view.add_menu_item(MenuItem::EndConversation);
            self.end_action_added = true;
        }
    }
}

async fn startup(
    messaging: &Messaging,
    brand_id: &str,
    application_id: &str,
) -> Result<bool, MessagingError> {
    messaging.initialize(brand_id, application_id).await?;
    messaging.register_for_conversation_events();
    messaging.is_conversation_active().await
}
