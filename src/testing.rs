//! In-memory transport for driving clients and pages in tests.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use url::Url;

use crate::client::Transport;
use crate::error::QueryError;

type Reply = dyn Fn(&Url) -> Result<Value, QueryError> + Send + Sync;

/// Answers every request with a canned reply and records what was sent.
#[derive(Clone)]
pub(crate) struct MockTransport {
    reply: Arc<Reply>,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockTransport {
    fn new(reply: impl Fn(&Url) -> Result<Value, QueryError> + Send + Sync + 'static) -> Self {
        Self {
            reply: Arc::new(reply),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Respond with `{"data": data}`.
    pub(crate) fn data(data: Value) -> Self {
        Self::body(json!({ "data": data }))
    }

    /// Respond with `body` verbatim.
    pub(crate) fn body(body: Value) -> Self {
        Self::new(move |_| Ok(body.clone()))
    }

    /// Reject every request with an HTTP status error.
    pub(crate) fn status(code: u16) -> Self {
        Self::new(move |_| Err(QueryError::Status(code)))
    }

    /// Pick the response by endpoint URL.
    pub(crate) fn routed(
        route: impl Fn(&Url) -> Result<Value, QueryError> + Send + Sync + 'static,
    ) -> Self {
        Self::new(route)
    }

    /// `(url, body)` of every request so far.
    pub(crate) fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }
}

impl Transport for MockTransport {
    async fn post_json(&self, url: &Url, body: &Value) -> Result<Value, QueryError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push((url.to_string(), body.clone()));
        (self.reply)(url)
    }
}
