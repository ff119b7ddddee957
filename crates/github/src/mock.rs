//! In-memory connector for tests.
//!
//! Responses are queued per `(method, path)` and replayed in FIFO order.
//! Every request is recorded, including its query string and body, so tests
//! can assert on exactly what would have gone over the wire.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::connector::{Connector, ConnectorError, HttpMethod, Request, Response};

/// A [`Connector`] that never touches the network.
#[derive(Clone, Default)]
pub struct MockConnector {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    routes: HashMap<(HttpMethod, String), VecDeque<Response>>,
    requests: Vec<Request>,
}

impl MockConnector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues `response` for the next request to `method path`.
    pub fn push(&self, method: HttpMethod, path: impl Into<String>, response: Response) {
        self.state()
            .routes
            .entry((method, path.into()))
            .or_default()
            .push_back(response);
    }

    /// Queues a JSON response.
    pub fn push_json(&self, method: HttpMethod, path: impl Into<String>, status: u16, body: Value) {
        self.push(method, path, Response::from_json(status, &body));
    }

    /// Queues a bodiless response.
    pub fn push_status(&self, method: HttpMethod, path: impl Into<String>, status: u16) {
        self.push(method, path, Response::empty(status));
    }

    /// Every request sent so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.state().requests.clone()
    }

    /// The most recent request, if any.
    #[must_use]
    pub fn last_request(&self) -> Option<Request> {
        self.state().requests.last().cloned()
    }

    /// Number of queued responses not yet consumed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state().routes.values().map(VecDeque::len).sum()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn send(&self, request: Request) -> Result<Response, ConnectorError> {
        let mut state = self.state();
        let key = (request.method, request.path.clone());
        state.requests.push(request);

        match state.routes.get_mut(&key).and_then(VecDeque::pop_front) {
            Some(response) => Ok(response),
            None => Err(ConnectorError::NoMockResponse {
                method: key.0,
                path: key.1,
            }),
        }
    }
}
