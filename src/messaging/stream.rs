//! Multicast event streams with disposable subscriptions.
//!
//! [`EventStream`] wraps a Tokio broadcast channel. Each call to
//! [`EventStream::subscribe`] gets its own receiver and delivery task, so
//! subscribers are independent and see events in emission order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::AbortHandle;
use tracing::{trace, warn};

/// Buffered events per subscriber before it is considered lagging.
pub const DEFAULT_CAPACITY: usize = 64;

/// Error reported to a subscriber without ending its subscription.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// The subscriber fell behind and missed this many events.
    #[error("subscriber lagged behind by {0} events")]
    Lagged(u64),
}

/// A hot, multicast stream of values.
///
/// Emitting with no subscribers is not an error; the value is dropped.
#[derive(Debug, Clone)]
pub struct EventStream<T> {
    tx: broadcast::Sender<T>,
}

impl<T: Clone + Send + 'static> EventStream<T> {
    /// Create a stream buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Push a value to every current subscriber.
    ///
    /// Returns the number of subscribers that will receive it.
    pub fn emit(&self, value: T) -> usize {
        self.tx.send(value).unwrap_or(0)
    }

    /// A raw receiver for callers that want to drive delivery themselves.
    pub fn receiver(&self) -> broadcast::Receiver<T> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Deliver every future value to `on_next` on a background task.
    ///
    /// A subscriber that falls more than the buffer capacity behind loses
    /// the oldest values; `on_error` reports how many and delivery carries
    /// on with the values still buffered. The receiver is attached before
    /// this returns, so no value emitted afterwards is missed. Must be
    /// called within a Tokio runtime.
    pub fn subscribe<N, E>(&self, mut on_next: N, mut on_error: E) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        let mut rx = self.tx.subscribe();
        let active = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&active);

        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(value) => {
                        if !flag.load(Ordering::Acquire) {
                            break;
                        }
                        on_next(value);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        if !flag.load(Ordering::Acquire) {
                            break;
                        }
                        warn!(missed, "event stream subscriber lagged");
                        on_error(StreamError::Lagged(missed));
                    }
                    Err(RecvError::Closed) => {
                        trace!("event stream closed");
                        break;
                    }
                }
            }
        });

        Subscription {
            active,
            task: task.abort_handle(),
        }
    }
}

impl<T: Clone + Send + 'static> Default for EventStream<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Handle to a running subscription.
///
/// Disposing is idempotent. Once [`Subscription::dispose`] returns no new
/// value reaches the handler; a delivery already in progress on another
/// thread may still finish. Dropping the handle disposes it.
#[derive(Debug)]
pub struct Subscription {
    active: Arc<AtomicBool>,
    task: AbortHandle,
}

impl Subscription {
    /// Stop delivery and abort the background task.
    pub fn dispose(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            self.task.abort();
        }
    }

    /// Whether [`Subscription::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        !self.active.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// A set of subscriptions released together.
///
/// After [`CompositeSubscription::dispose`], anything added is disposed
/// immediately.
#[derive(Debug)]
pub struct CompositeSubscription {
    inner: Mutex<Option<Vec<Subscription>>>,
}

impl CompositeSubscription {
    /// An empty, live composite.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Some(Vec::new())),
        }
    }

    /// Take ownership of a subscription.
    pub fn add(&self, subscription: Subscription) {
        let mut guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        match guard.as_mut() {
            Some(subs) => subs.push(subscription),
            None => subscription.dispose(),
        }
    }

    /// Dispose every held subscription. Later calls do nothing.
    pub fn dispose(&self) {
        let taken = self
            .inner
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(subs) = taken {
            for sub in &subs {
                sub.dispose();
            }
        }
    }

    /// Whether [`CompositeSubscription::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_none()
    }

    /// Number of subscriptions currently held.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .map_or(0, Vec::len)
    }

    /// Whether no subscriptions are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CompositeSubscription {
    fn default() -> Self {
        Self::new()
    }
}
