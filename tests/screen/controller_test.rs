//! Conversation screen behaviour against the simulated provider.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use messaging_demo::messaging::stream::DEFAULT_CAPACITY;
use messaging_demo::messaging::{Messaging, MessagingSettings};
use messaging_demo::provider::simulated::SimulatedProvider;
use messaging_demo::provider::{CloseReason, ConversationView, MessagingProvider};
use messaging_demo::screen::{ConversationScreen, MenuItem, ScreenExit, ScreenView};

const SHOWN: &str = "show:simulated-conversation";
const END_ACTION: &str = "menu:End conversation";
const FINISHED: &str = "finish";

/// Records every view call; clones share the log.
#[derive(Clone, Default)]
struct RecordingView {
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingView {
    fn entries(&self) -> Vec<String> {
        self.log.lock().expect("view log").clone()
    }

    fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }

    async fn wait_for(&self, entry: &str) {
        let poll = async {
            while self.count(entry) == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        if tokio::time::timeout(Duration::from_secs(2), poll).await.is_err() {
            panic!("timed out waiting for {entry}; saw {:?}", self.entries());
        }
    }

    fn push(&self, entry: String) {
        self.log.lock().expect("view log").push(entry);
    }
}

impl ScreenView for RecordingView {
    fn show_conversation(&mut self, view: ConversationView) {
        self.push(format!("show:{}", view.tag));
    }

    fn add_menu_item(&mut self, item: MenuItem) {
        self.push(format!("menu:{}", item.label()));
    }

    fn finish(&mut self) {
        self.push(FINISHED.to_owned());
    }
}

fn screen_for(
    provider: &Arc<SimulatedProvider>,
) -> (Arc<Messaging>, RecordingView, ConversationScreen<RecordingView>) {
    let messaging = Arc::new(Messaging::new(
        Arc::clone(provider) as Arc<dyn MessagingProvider>,
        MessagingSettings::new(true),
    ));
    let view = RecordingView::default();
    let screen = ConversationScreen::new(
        Arc::clone(&messaging),
        view.clone(),
        "78100234",
        "pibc.messagingdemo",
    );
    (messaging, view, screen)
}

fn spawn_screen(
    mut screen: ConversationScreen<RecordingView>,
) -> tokio::task::JoinHandle<ScreenExit> {
    tokio::spawn(async move {
        let exit = screen.run().await;
        screen.on_destroy();
        exit
    })
}

async fn join(handle: tokio::task::JoinHandle<ScreenExit>) -> ScreenExit {
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("screen should exit in time")
        .expect("screen task should not panic")
}

#[tokio::test]
async fn end_to_end_conversation_lifecycle() {
    let provider = Arc::new(SimulatedProvider::new().with_close_reason(CloseReason::Agent));
    let (messaging, view, screen) = screen_for(&provider);
    let mut started = messaging.conversation_started().receiver();
    let mut ended = messaging.conversation_ended().receiver();

    screen.on_create();
    let input = screen.input();
    let handle = spawn_screen(screen);

    view.wait_for(SHOWN).await;
    assert_eq!(view.count(END_ACTION), 0, "no conversation is open yet");
    assert_eq!(provider.registrations(), 1);

    assert!(provider.start_conversation("conv-123"));
    assert_eq!(started.try_recv().expect("started emitted"), "conv-123");
    view.wait_for(END_ACTION).await;

    assert!(input.click(MenuItem::EndConversation));
    let exit = join(handle).await;

    assert_eq!(exit, ScreenExit::ConversationEnded("AGENT".to_owned()));
    assert_eq!(provider.resolve_requests(), 1);
    assert_eq!(ended.try_recv().expect("ended emitted"), "AGENT");
    assert_eq!(
        view.entries(),
        vec![SHOWN.to_owned(), END_ACTION.to_owned(), FINISHED.to_owned()]
    );
}

#[tokio::test]
async fn already_active_conversation_adds_end_action_once() {
    let provider = Arc::new(SimulatedProvider::new().with_active_conversation());
    let (_messaging, view, screen) = screen_for(&provider);

    screen.on_create();
    let input = screen.input();
    let handle = spawn_screen(screen);

    view.wait_for(END_ACTION).await;
    assert_eq!(view.count(SHOWN), 1);

    provider.start_conversation("conv-2");
    input.click(MenuItem::Other("Settings".to_owned()));
    tokio::time::sleep(Duration::from_millis(50)).await;
    input.back();
    assert_eq!(join(handle).await, ScreenExit::Closed);

    assert_eq!(view.count(END_ACTION), 1);
    assert_eq!(provider.resolve_requests(), 0);
}

#[tokio::test]
async fn initialization_failure_leaves_screen_empty() {
    let provider = Arc::new(SimulatedProvider::new().with_init_failure("bad brand"));
    let (_messaging, view, screen) = screen_for(&provider);

    screen.on_create();
    let input = screen.input();
    let handle = spawn_screen(screen);

    // Give the startup chain time to fail.
    tokio::time::sleep(Duration::from_millis(50)).await;
    input.back();
    assert_eq!(join(handle).await, ScreenExit::Closed);

    assert_eq!(view.entries(), vec![FINISHED.to_owned()]);
    assert_eq!(provider.registrations(), 0);
    assert_eq!(provider.user_profile(), None);
}

#[tokio::test]
async fn active_check_failure_skips_conversation_view() {
    let provider = Arc::new(SimulatedProvider::new().with_active_check_failure("offline"));
    let (_messaging, view, screen) = screen_for(&provider);

    screen.on_create();
    let input = screen.input();
    let handle = spawn_screen(screen);

    tokio::time::sleep(Duration::from_millis(50)).await;
    input.back();
    assert_eq!(join(handle).await, ScreenExit::Closed);

    assert_eq!(view.count(SHOWN), 0);
    assert_eq!(provider.registrations(), 1);
}

#[tokio::test]
async fn missing_view_still_tracks_conversation() {
    let provider = Arc::new(
        SimulatedProvider::new()
            .without_view()
            .with_active_conversation(),
    );
    let (_messaging, view, screen) = screen_for(&provider);

    screen.on_create();
    let handle = spawn_screen(screen);

    view.wait_for(END_ACTION).await;
    assert_eq!(view.count(SHOWN), 0);

    provider.resolve_conversation();
    assert_eq!(join(handle).await, ScreenExit::ConversationEnded(String::new()));
}

#[tokio::test]
async fn destroyed_screen_ignores_later_events() {
    let provider = Arc::new(SimulatedProvider::new());
    let (_messaging, view, mut screen) = screen_for(&provider);

    screen.on_create();
    screen.on_destroy();
    screen.on_destroy();

    // The startup chain is not cancelled; wait for it to register.
    let registered = async {
        while provider.registrations() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(2), registered)
        .await
        .expect("startup chain should still run");

    provider.start_conversation("conv-late");
    provider.resolve_conversation();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(screen.run().await, ScreenExit::Destroyed);
    assert!(view.entries().is_empty());
    assert!(!screen.end_action_added());
}

#[tokio::test]
async fn screen_still_closes_after_start_burst() {
    let provider = Arc::new(SimulatedProvider::new().with_close_reason(CloseReason::Consumer));
    let (_messaging, view, screen) = screen_for(&provider);

    screen.on_create();
    let handle = spawn_screen(screen);
    view.wait_for(SHOWN).await;

    for i in 0..=DEFAULT_CAPACITY.saturating_mul(2) {
        provider.start_conversation(format!("conv-{i}"));
    }
    view.wait_for(END_ACTION).await;
    provider.resolve_conversation();

    assert_eq!(
        join(handle).await,
        ScreenExit::ConversationEnded("CONSUMER".to_owned())
    );
    assert_eq!(view.count(END_ACTION), 1);
}
