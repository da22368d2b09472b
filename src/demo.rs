//! Console commands for driving the demo screen.
//!
//! Some commands act as the user (toolbar, back), others play the provider
//! side (agent starts or resolves a conversation).

use crate::provider::simulated::SimulatedProvider;
use crate::provider::{CloseReason, ConversationData, Notice, ProviderEvent, Resolution};
use crate::screen::{MenuItem, ScreenInput};

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemoCommand {
    /// Provider starts a conversation, with or without an identifier.
    Start(Option<String>),
    /// Provider resolves the conversation.
    Resolve(Resolution),
    /// Provider reports agent typing.
    Typing,
    /// User taps "End conversation".
    End,
    /// User taps an unknown toolbar item.
    Menu(String),
    /// User leaves the screen.
    Back,
    /// Print the command list.
    Help,
    /// Anything unparseable.
    Unknown(String),
}

impl DemoCommand {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts.next()?;
        let arg = parts.next().map(str::to_owned);
        let command = match verb.to_ascii_lowercase().as_str() {
            "start" => Self::Start(arg),
            "resolve" => Self::Resolve(match arg {
                None => Resolution::Bare,
                Some(a) => match CloseReason::from_name(&a) {
                    Some(reason) => Resolution::Reason(reason),
                    None => Resolution::WithData(ConversationData::new(a)),
                },
            }),
            "typing" => Self::Typing,
            "end" => Self::End,
            "menu" => Self::Menu(arg.unwrap_or_default()),
            "back" | "quit" | "exit" => Self::Back,
            "help" | "?" => Self::Help,
            _ => Self::Unknown(line.trim().to_owned()),
        };
        Some(command)
    }

    /// Carry out the command. Returns `false` once the screen is gone.
    pub fn apply(self, provider: &SimulatedProvider, input: &ScreenInput) -> bool {
        match self {
            Self::Start(Some(id)) => {
                provider.start_conversation(id);
                true
            }
            Self::Start(None) => {
                provider.emit(ProviderEvent::ConversationStarted(None));
                true
            }
            Self::Resolve(resolution) => {
                provider.emit(ProviderEvent::ConversationResolved(resolution));
                true
            }
            Self::Typing => {
                provider.emit(ProviderEvent::Ignored(Notice::AgentTyping(true)));
                true
            }
            Self::End => input.click(MenuItem::EndConversation),
            Self::Menu(label) => input.click(MenuItem::Other(label)),
            Self::Back => input.back(),
            Self::Help | Self::Unknown(_) => true,
        }
    }
}

/// Command list shown by `help`.
pub fn help_text() -> String {
    [
        "Commands:",
        "  start [id]        provider starts a conversation",
        "  resolve [id|AGENT|CONSUMER|SYSTEM]",
        "                    provider resolves the conversation",
        "  typing            provider reports agent typing",
        "  end               tap \"End conversation\"",
        "  menu <label>      tap another toolbar item",
        "  back              leave the screen",
    ]
    .join("\n")
}
