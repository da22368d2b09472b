//! messaging-demo — a single conversation screen on top of a
//! customer-messaging provider.
//!
//! The provider is reached only through the [`provider::MessagingProvider`]
//! port. [`messaging::Messaging`] adapts its callbacks into futures and
//! event streams; [`screen::ConversationScreen`] consumes them.
//!
//! See `DESIGN.md` for the architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod demo;
pub mod logging;
pub mod messaging;
pub mod provider;
pub mod screen;
