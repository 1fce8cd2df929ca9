use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Semaphore;

use crate::{BatchRequest, BatchResponse, BatchTransport, TransportError};

type Scripted = Result<BatchResponse, TransportError>;

/// In-memory transport for testing. Replays scripted responses in order and
/// records every request it receives.
///
/// A gated transport holds each request until the test adds a permit, which
/// keeps a session in flight for as long as the test needs.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<BatchRequest>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Like [`ScriptedTransport::new`], but every request waits for a permit
    /// on the returned semaphore.
    pub fn gated(responses: impl IntoIterator<Item = Scripted>) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let transport = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::new(responses)
        };
        (transport, gate)
    }

    pub fn push(&self, response: Scripted) {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner).push_back(response);
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<BatchRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait::async_trait]
impl BatchTransport for ScriptedTransport {
    async fn submit(&self, request: &BatchRequest) -> Result<BatchResponse, TransportError> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request.clone());

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|_| TransportError::new("gate closed"))?
                .forget();
        }

        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted response left")))
    }
}
