//! テスト用の共通フィクスチャ
//!
//! Echo / Ping リクエスト、Greeted 通知、実行順を記録する behavior とハンドラ。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

use crate::domain::{CancellationToken, MediatorError, Notification, Request, Unit};
use crate::impls::ErrorObserver;
use crate::typed::{
    Next, NotificationBehavior, NotificationHandler, NotificationNext, PipelineBehavior,
    RequestHandler,
};

#[derive(Debug, Error)]
#[error("fixture failure")]
pub struct FixtureError;

/// Shared, ordered log of what ran.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

// ---- requests ----

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Echo {
    pub payload: String,
}

impl Echo {
    pub fn new(payload: &str) -> Self {
        Self {
            payload: payload.to_string(),
        }
    }
}

impl Request for Echo {
    type Response = String;
}

#[derive(Debug, Default, Clone)]
pub struct EchoHandler {
    journal: Option<Journal>,
}

impl EchoHandler {
    pub fn recording(journal: Journal) -> Self {
        Self {
            journal: Some(journal),
        }
    }
}

#[async_trait]
impl RequestHandler<Echo> for EchoHandler {
    async fn handle(&self, request: Echo, _cancel: CancellationToken) -> Result<String, MediatorError> {
        if let Some(journal) = &self.journal {
            journal.push("H");
        }
        Ok(request.payload)
    }
}

pub struct FailingEchoHandler;

#[async_trait]
impl RequestHandler<Echo> for FailingEchoHandler {
    async fn handle(&self, _request: Echo, _cancel: CancellationToken) -> Result<String, MediatorError> {
        Err(MediatorError::failed(FixtureError))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ping;

impl Request for Ping {
    type Response = Unit;
}

#[derive(Debug, Default, Clone)]
pub struct PingHandler {
    calls: Arc<AtomicUsize>,
}

impl PingHandler {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RequestHandler<Ping> for PingHandler {
    async fn handle(&self, _request: Ping, _cancel: CancellationToken) -> Result<Unit, MediatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Unit)
    }
}

// ---- behaviors ----

/// Records `{name}-enter` / `{name}-exit` around the continuation.
pub struct RecordingBehavior {
    name: String,
    journal: Journal,
}

impl RecordingBehavior {
    pub fn new(name: &str, journal: Journal) -> Self {
        Self {
            name: name.to_string(),
            journal,
        }
    }
}

#[async_trait]
impl<R: Request> PipelineBehavior<R> for RecordingBehavior {
    async fn handle(
        &self,
        request: R,
        next: Next<R>,
        cancel: CancellationToken,
    ) -> Result<R::Response, MediatorError> {
        self.journal.push(format!("{}-enter", self.name));
        let response = next.run(request, cancel).await;
        self.journal.push(format!("{}-exit", self.name));
        response
    }
}

/// Answers without calling the continuation.
pub struct ShortCircuit {
    response: String,
    journal: Journal,
}

impl ShortCircuit {
    pub fn new(response: &str, journal: Journal) -> Self {
        Self {
            response: response.to_string(),
            journal,
        }
    }
}

#[async_trait]
impl PipelineBehavior<Echo> for ShortCircuit {
    async fn handle(
        &self,
        _request: Echo,
        _next: Next<Echo>,
        _cancel: CancellationToken,
    ) -> Result<String, MediatorError> {
        self.journal.push("short-circuit");
        Ok(self.response.clone())
    }
}

// ---- notifications ----

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeted {
    pub name: String,
}

impl Greeted {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Notification for Greeted {}

/// Pushes its name to the journal, optionally after a delay or failing instead.
pub struct RecordingNotificationHandler {
    name: String,
    journal: Journal,
    delay: Option<Duration>,
    fail: bool,
}

impl RecordingNotificationHandler {
    pub fn new(name: &str, journal: Journal) -> Self {
        Self {
            name: name.to_string(),
            journal,
            delay: None,
            fail: false,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl NotificationHandler<Greeted> for RecordingNotificationHandler {
    async fn handle(&self, _notification: Greeted, _cancel: CancellationToken) -> Result<(), MediatorError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.journal.push(self.name.clone());
        if self.fail {
            return Err(MediatorError::failed(FixtureError));
        }
        Ok(())
    }
}

pub struct RecordingNotificationBehavior {
    name: String,
    journal: Journal,
}

impl RecordingNotificationBehavior {
    pub fn new(name: &str, journal: Journal) -> Self {
        Self {
            name: name.to_string(),
            journal,
        }
    }
}

#[async_trait]
impl<N: Notification> NotificationBehavior<N> for RecordingNotificationBehavior {
    async fn handle(
        &self,
        notification: N,
        next: NotificationNext<N>,
        cancel: CancellationToken,
    ) -> Result<(), MediatorError> {
        self.journal.push(format!("{}-enter", self.name));
        let result = next.run(notification, cancel).await;
        self.journal.push(format!("{}-exit", self.name));
        result
    }
}

// ---- error observation ----

/// Collects every `(request, message)` pair handed to it.
#[derive(Debug, Clone, Default)]
pub struct ObservedErrors {
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

impl ObservedErrors {
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn requests(&self) -> Vec<String> {
        self.seen
            .lock()
            .iter()
            .map(|(request, _)| request.clone())
            .collect()
    }
}

impl ErrorObserver for ObservedErrors {
    fn observe(&self, request: &'static str, error: &MediatorError) {
        self.seen
            .lock()
            .push((request.to_string(), error.to_string()));
    }
}
