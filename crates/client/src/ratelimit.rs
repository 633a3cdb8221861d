//! Request-spacing HTTP client.
//!
//! Every request issued through a [`RateLimitedClient`] passes a shared
//! [`RequestGate`] first, so consecutive requests start at least
//! `min_spacing` apart no matter how many tasks share the client. The gate
//! only spaces request starts; the network calls themselves may overlap.

use std::time::Duration;

use reqwest::{Client, Request, Response};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::Instant;
use upfeed_core::Error;

/// Timing gate that spaces out request starts.
#[derive(Debug)]
pub struct RequestGate {
    last_request: Mutex<Option<Instant>>,
    min_spacing: Duration,
}

impl RequestGate {
    pub fn new(min_spacing: Duration) -> Self {
        Self { last_request: Mutex::new(None), min_spacing }
    }

    /// Wait until the spacing since the previous request is satisfied.
    ///
    /// Returns the instant recorded as this request's start.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_spacing {
                let wait = self.min_spacing - elapsed;
                tracing::debug!(?elapsed, ?wait, "spacing request");
                tokio::time::sleep(wait).await;
            }
        }

        let now = Instant::now();
        *last = Some(now);
        now
    }

    pub fn min_spacing(&self) -> Duration {
        self.min_spacing
    }
}

/// HTTP client that enforces a minimum spacing between requests.
///
/// No retries and no buffering beyond what the caller asks for; transport
/// errors are returned as they happen.
#[derive(Debug)]
pub struct RateLimitedClient {
    http: Client,
    gate: RequestGate,
}

impl RateLimitedClient {
    pub fn new(http: Client, min_spacing: Duration) -> Self {
        Self { http, gate: RequestGate::new(min_spacing) }
    }

    /// Underlying client, for building requests.
    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    /// Issue a request once the spacing gate allows it.
    pub async fn execute(&self, request: Request) -> Result<Response, Error> {
        let url = request.url().to_string();
        tracing::debug!(%url, method = %request.method(), "executing request");

        self.gate.acquire().await;

        let response = self.http.execute(request).await.map_err(|e| {
            tracing::error!(%url, error = %e, "request failed");
            transport_error(e)
        })?;

        tracing::debug!(%url, status = response.status().as_u16(), "request completed");
        Ok(response)
    }

    /// Issue a request and decode a JSON body.
    ///
    /// Non-success HTTP statuses become [`Error::HttpStatus`]; bodies that do
    /// not match `T` become [`Error::Decode`].
    pub async fn fetch_json<T: DeserializeOwned>(&self, request: Request) -> Result<T, Error> {
        let response = self.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| Error::Decode(e.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::Timeout(err.to_string()) } else { Error::Transport(err.to_string()) }
}
