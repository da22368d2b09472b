//! The conversation screen: drives the messaging adapter and reacts to its
//! events on a single UI loop.
//!
//! Subscriber tasks and the startup chain never touch the view directly.
//! They post [`ScreenEvent`]s to the UI queue, which
//! [`controller::ConversationScreen::run`] drains in order.

pub mod console;
pub mod controller;

pub use controller::{ConversationScreen, ScreenInput};

use crate::provider::ConversationView;

/// Toolbar menu items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    /// Ends the open conversation.
    EndConversation,
    /// Any item the screen does not know.
    Other(String),
}

impl MenuItem {
    /// Toolbar label.
    pub fn label(&self) -> &str {
        match self {
            Self::EndConversation => "End conversation",
            Self::Other(label) => label,
        }
    }
}

/// The UI surface the screen renders to.
pub trait ScreenView {
    /// Place the provider's conversation component on screen.
    fn show_conversation(&mut self, view: ConversationView);

    /// Add an action to the toolbar.
    fn add_menu_item(&mut self, item: MenuItem);

    /// Close the screen.
    fn finish(&mut self);
}

/// Work queued for the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    /// Startup chain finished; carries whether a conversation was already open.
    Ready {
        /// Result of the active-conversation check.
        already_active: bool,
    },
    /// Startup chain failed at some step.
    StartupFailed(String),
    /// A conversation started.
    ConversationStarted(String),
    /// A conversation ended.
    ConversationEnded(String),
    /// The user picked a toolbar item.
    MenuClicked(MenuItem),
    /// The user navigated away.
    BackPressed,
}

/// Why the UI loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenExit {
    /// The conversation ended; carries the ended payload.
    ConversationEnded(String),
    /// The user left the screen.
    Closed,
    /// The screen was torn down or lost all inputs.
    Destroyed,
}
