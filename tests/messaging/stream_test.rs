//! Subscriptions and teardown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use messaging_demo::messaging::stream::{StreamError, DEFAULT_CAPACITY};
use messaging_demo::messaging::{
    CompositeSubscription, EventStream, Messaging, MessagingSettings, Subscription,
};
use messaging_demo::provider::simulated::SimulatedProvider;
use messaging_demo::provider::{CloseReason, MessagingProvider};

fn forward(stream: &EventStream<String>, tx: mpsc::UnboundedSender<String>) -> Subscription {
    stream.subscribe(
        move |value| {
            let _ = tx.send(value);
        },
        |_| {},
    )
}

async fn next(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("delivered in time")
        .expect("subscription still open")
}

#[tokio::test]
async fn disposing_composite_stops_delivery() {
    let provider = Arc::new(SimulatedProvider::new().with_close_reason(CloseReason::Agent));
    let messaging = Messaging::new(
        Arc::clone(&provider) as Arc<dyn MessagingProvider>,
        MessagingSettings::new(true),
    );
    messaging.register_for_conversation_events();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscriptions = CompositeSubscription::new();
    subscriptions.add(forward(messaging.conversation_started(), tx.clone()));
    subscriptions.add(forward(messaging.conversation_ended(), tx));
    assert_eq!(subscriptions.len(), 2);

    provider.start_conversation("conv-1");
    let first = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("delivered in time");
    assert_eq!(first.as_deref(), Some("conv-1"));

    subscriptions.dispose();
    assert!(subscriptions.is_disposed());

    // The provider keeps emitting after teardown.
    provider.start_conversation("conv-2");
    provider.resolve_conversation();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(rx.try_recv().is_err(), "nothing delivered after dispose");
}

#[tokio::test]
async fn dropped_subscription_releases_its_receiver() {
    let stream = EventStream::<String>::default();
    let (tx, _rx) = mpsc::unbounded_channel();
    let sub = forward(&stream, tx);
    assert_eq!(stream.subscriber_count(), 1);

    drop(sub);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(stream.subscriber_count(), 0);
}

#[tokio::test]
async fn burst_past_capacity_keeps_subscription_alive() {
    let provider = Arc::new(SimulatedProvider::new());
    let messaging = Messaging::new(
        Arc::clone(&provider) as Arc<dyn MessagingProvider>,
        MessagingSettings::new(true),
    );
    messaging.register_for_conversation_events();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let (err_tx, mut err_rx) = mpsc::unbounded_channel();
    let _sub = messaging.conversation_started().subscribe(
        move |id| {
            let _ = tx.send(id);
        },
        move |e| {
            let _ = err_tx.send(e);
        },
    );

    // Current-thread runtime: the whole burst lands before delivery runs.
    for i in 0..=DEFAULT_CAPACITY {
        provider.start_conversation(format!("conv-{i}"));
    }
    for i in 1..=DEFAULT_CAPACITY {
        assert_eq!(next(&mut rx).await, format!("conv-{i}"));
    }

    provider.start_conversation("conv-late");
    assert_eq!(next(&mut rx).await, "conv-late");
    assert_eq!(err_rx.recv().await, Some(StreamError::Lagged(1)));
    assert!(err_rx.try_recv().is_err());
}
