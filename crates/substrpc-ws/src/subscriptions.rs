//! Subscription registry and handles.
//!
//! Every subscription owns a worker task that drains its notification queue
//! and calls the handler one value at a time. The registry maps node-assigned
//! subscription ids to those queues; the session's read loop feeds it.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc;

use substrpc_core::error::SessionError;
use substrpc_core::request::SubscriptionId;

use crate::session::Session;

/// Cancellation state shared by a subscription's handle and its worker.
#[derive(Default)]
pub(crate) struct SubscriptionControl {
    cancelled: AtomicBool,
    /// Held by the worker for the duration of each handler call.
    gate: tokio::sync::Mutex<()>,
}

impl SubscriptionControl {
    /// Stop delivery. Returns once no handler call is running, and none
    /// will start afterwards.
    pub(crate) async fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        drop(self.gate.lock().await);
    }

    /// Stop delivery without waiting for a running handler call.
    pub(crate) fn cancel_now(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// A subscription that has been requested but not yet confirmed by the node.
pub(crate) struct PendingSubscription {
    pub(crate) method: String,
    sender: mpsc::UnboundedSender<Value>,
    pub(crate) control: Arc<SubscriptionControl>,
}

impl PendingSubscription {
    /// Spawn the handler worker and return the not-yet-registered entry.
    pub(crate) fn spawn<F>(method: &str, handler: F) -> Self
    where
        F: FnMut(Value) + Send + 'static,
    {
        let (sender, rx) = mpsc::unbounded_channel();
        let control = Arc::new(SubscriptionControl::default());
        tokio::spawn(run_handler(rx, Arc::clone(&control), handler));
        Self { method: method.to_string(), sender, control }
    }
}

async fn run_handler<F>(
    mut rx: mpsc::UnboundedReceiver<Value>,
    control: Arc<SubscriptionControl>,
    mut handler: F,
) where
    F: FnMut(Value) + Send + 'static,
{
    while let Some(value) = rx.recv().await {
        let _guard = control.gate.lock().await;
        if control.is_cancelled() {
            break;
        }
        handler(value);
    }
}

struct ActiveSubscription {
    method: String,
    sender: mpsc::UnboundedSender<Value>,
    control: Arc<SubscriptionControl>,
}

/// Live subscriptions of one session, keyed by node-assigned id.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    entries: Arc<Mutex<HashMap<SubscriptionId, ActiveSubscription>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a confirmed subscription id to its pending entry.
    pub(crate) fn activate(&self, id: SubscriptionId, pending: PendingSubscription) {
        let previous = self.entries.lock().insert(
            id.clone(),
            ActiveSubscription {
                method: pending.method,
                sender: pending.sender,
                control: pending.control,
            },
        );
        if let Some(previous) = previous {
            tracing::warn!(subscription = %id, method = %previous.method, "node reused a live subscription id");
            previous.control.cancel_now();
        }
    }

    /// Queue a notification for its subscription. Unknown ids are dropped.
    ///
    /// Returns `true` if the notification was queued.
    pub fn dispatch(&self, id: &SubscriptionId, message: Value) -> bool {
        let entries = self.entries.lock();
        match entries.get(id) {
            Some(entry) if !entry.control.is_cancelled() => entry.sender.send(message).is_ok(),
            Some(_) => false,
            None => {
                tracing::debug!(subscription = %id, "notification for unknown subscription dropped");
                false
            }
        }
    }

    /// Remove a subscription; its worker exits after the queue drains.
    pub fn remove(&self, id: &SubscriptionId) -> bool {
        self.entries.lock().remove(id).is_some()
    }

    /// Remove the subscription driven by `control`, returning its id.
    pub(crate) fn remove_by_control(&self, control: &Arc<SubscriptionControl>) -> Option<SubscriptionId> {
        let mut entries = self.entries.lock();
        let id = entries
            .iter()
            .find(|(_, entry)| Arc::ptr_eq(&entry.control, control))
            .map(|(id, _)| id.clone())?;
        entries.remove(&id);
        Some(id)
    }

    /// Drop every subscription. Used when the connection closes.
    pub fn clear(&self) {
        let drained: Vec<_> = self.entries.lock().drain().collect();
        for (id, entry) in drained {
            tracing::debug!(subscription = %id, method = %entry.method, "subscription closed with connection");
        }
    }

    /// Ids and methods of all live subscriptions.
    pub fn active(&self) -> Vec<(SubscriptionId, String)> {
        self.entries
            .lock()
            .iter()
            .map(|(id, e)| (id.clone(), e.method.clone()))
            .collect()
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if there are no live subscriptions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle to a live subscription.
///
/// Dropping the handle without calling [`unsubscribe`](Self::unsubscribe)
/// stops local delivery and sends the unsubscribe call without waiting for
/// its answer.
pub struct SubscriptionHandle {
    id: SubscriptionId,
    unsubscribe_method: String,
    control: Arc<SubscriptionControl>,
    session: Session,
    done: bool,
}

impl SubscriptionHandle {
    pub(crate) fn new(
        id: SubscriptionId,
        unsubscribe_method: &str,
        control: Arc<SubscriptionControl>,
        session: Session,
    ) -> Self {
        Self {
            id,
            unsubscribe_method: unsubscribe_method.to_string(),
            control,
            session,
            done: false,
        }
    }

    /// The node-assigned subscription id.
    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    /// Stop delivery and tell the node.
    ///
    /// When this returns the handler is not running and will not run again.
    /// A failed unsubscribe call is logged and not retried.
    pub async fn unsubscribe(mut self) {
        self.done = true;
        self.control.cancel().await;
        self.session.registry().remove(&self.id);

        let params = vec![self.id.to_value()];
        match self.session.call(&self.unsubscribe_method, params).await {
            Ok(_) => {
                tracing::debug!(subscription = %self.id, method = %self.unsubscribe_method, "unsubscribed");
            }
            Err(e) => {
                tracing::warn!(
                    subscription = %self.id,
                    method = %self.unsubscribe_method,
                    error = %e,
                    "unsubscribe failed; server-side subscription may leak"
                );
            }
        }
    }

    /// Stop delivery locally without calling the node, for subscriptions the
    /// node has already ended (e.g. after a final extrinsic status).
    pub async fn release(mut self) {
        self.done = true;
        self.control.cancel().await;
        self.session.registry().remove(&self.id);
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        self.control.cancel_now();
        self.session.registry().remove(&self.id);
        self.session
            .notify_best_effort(&self.unsubscribe_method, vec![self.id.to_value()]);
    }
}

/// A subscription consumed as a stream of typed values.
///
/// Items that fail to deserialize are yielded as errors; the stream ends when
/// the subscription is cancelled or the connection closes.
pub struct SubscriptionStream<T = Value> {
    handle: SubscriptionHandle,
    rx: mpsc::UnboundedReceiver<Value>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> SubscriptionStream<T> {
    pub(crate) fn new(handle: SubscriptionHandle, rx: mpsc::UnboundedReceiver<Value>) -> Self {
        Self { handle, rx, _marker: PhantomData }
    }

    pub fn id(&self) -> &SubscriptionId {
        self.handle.id()
    }

    /// Receive the next item. `None` when the subscription has ended.
    pub async fn next_item(&mut self) -> Option<Result<T, SessionError>> {
        let value = self.rx.recv().await?;
        Some(serde_json::from_value(value).map_err(SessionError::from))
    }

    /// See [`SubscriptionHandle::unsubscribe`].
    pub async fn unsubscribe(self) {
        self.handle.unsubscribe().await;
    }

    /// See [`SubscriptionHandle::release`].
    pub async fn release(self) {
        self.handle.release().await;
    }
}

impl<T: DeserializeOwned> Stream for SubscriptionStream<T> {
    type Item = Result<T, SessionError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.rx
            .poll_recv(cx)
            .map(|opt| opt.map(|v| serde_json::from_value(v).map_err(SessionError::from)))
    }
}
