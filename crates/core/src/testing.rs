//! Test doubles for core ports

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use portico_domain::Result;
use tokio::sync::{Notify, Semaphore};

use crate::session::SessionRefresher;

/// Scripted [`SessionRefresher`].
///
/// Responses are returned in order; once the script runs out every call
/// succeeds without a new token. A gated refresher parks each call until
/// [`release`](Self::release) is called, which lets tests hold a refresh in
/// flight.
#[derive(Debug, Default)]
pub struct MockRefresher {
    responses: Mutex<VecDeque<Result<Option<String>>>>,
    calls: AtomicUsize,
    tokens_seen: Mutex<Vec<String>>,
    started: Notify,
    gate: Option<Semaphore>,
}

impl MockRefresher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning(token: impl Into<String>) -> Self {
        let refresher = Self::new();
        refresher.push(Ok(Some(token.into())));
        refresher
    }

    pub fn failing(error: portico_domain::PorticoError) -> Self {
        let refresher = Self::new();
        refresher.push(Err(error));
        refresher
    }

    #[must_use]
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn push(&self, response: Result<Option<String>>) {
        self.responses.lock().push_back(response);
    }

    /// Let one parked call proceed.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// Resolves once a call has entered `refresh`.
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens_seen.lock().clone()
    }
}

#[async_trait]
impl SessionRefresher for MockRefresher {
    async fn refresh(&self, token: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens_seen.lock().push(token.to_string());
        self.started.notify_one();

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        self.responses.lock().pop_front().unwrap_or(Ok(None))
    }
}
