use std::{fmt::Debug, future::Future};

use reqwest::{header::HeaderMap, StatusCode};

/// A response with its transport envelope still attached.
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            data,
        }
    }
}

pub struct RequestService;

impl RequestService {
    /// Runs `call` exactly once and strips the envelope from a successful response.
    ///
    /// Failures are logged and handed back untouched: no mapping, no retry.
    pub async fn execute<F, Fut, T, E>(call: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Envelope<T>, E>>,
        E: Debug,
    {
        match call().await {
            Ok(envelope) => Ok(envelope.data),
            Err(err) => {
                tracing::error!("❌ request failed: {err:?}");
                Err(err)
            }
        }
    }
}
