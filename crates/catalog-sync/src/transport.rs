use std::sync::Arc;

use crate::batch::{BatchRequest, BatchResponse};
use crate::error::TransportError;

/// Submits one batch request to the remote endpoint.
///
/// Implementations own the transport and authentication envelope. A
/// response with `success = false` is still `Ok`; only failures to complete
/// the round trip are `TransportError`s.
#[async_trait::async_trait]
pub trait BatchTransport: Send + Sync {
    async fn submit(&self, request: &BatchRequest) -> Result<BatchResponse, TransportError>;
}

#[async_trait::async_trait]
impl<T: BatchTransport + ?Sized> BatchTransport for Arc<T> {
    async fn submit(&self, request: &BatchRequest) -> Result<BatchResponse, TransportError> {
        (**self).submit(request).await
    }
}
