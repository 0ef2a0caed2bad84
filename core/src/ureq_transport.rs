//! Blocking `Transport` backed by `ureq`.
//!
//! HTTP status codes are never turned into errors here; a 404 comes back as
//! an ordinary `HttpResponse` and the envelope decoder classifies it.

use std::time::Duration;

use ureq::{Agent, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::from_agent(
            Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent(),
        )
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every request by `timeout`, connect through response body.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::from_agent(
            Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(timeout))
                .build()
                .new_agent(),
        )
    }

    /// Use a preconfigured agent. It must have `http_status_as_error(false)`.
    pub fn from_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

fn decorate<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in &request.query {
        builder = builder.query(name, value);
    }
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.path.as_str();
        let body = request.body.as_deref().map(str::as_bytes);

        let result = match (request.method, body) {
            (HttpMethod::Get, _) => decorate(self.agent.get(url), &request).call(),
            (HttpMethod::Delete, _) => decorate(self.agent.delete(url), &request).call(),
            (HttpMethod::Post, Some(body)) => decorate(self.agent.post(url), &request).send(body),
            (HttpMethod::Post, None) => decorate(self.agent.post(url), &request).send_empty(),
            (HttpMethod::Put, Some(body)) => decorate(self.agent.put(url), &request).send(body),
            (HttpMethod::Put, None) => decorate(self.agent.put(url), &request).send_empty(),
            (HttpMethod::Patch, Some(body)) => decorate(self.agent.patch(url), &request).send(body),
            (HttpMethod::Patch, None) => decorate(self.agent.patch(url), &request).send_empty(),
        };
        let mut response = result.map_err(TransportError::new)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(TransportError::new)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
