//! Request construction and the call pipeline shared by every resource.
//!
//! # Design
//! `Client` holds only its configuration and a transport; it keeps no
//! mutable state between calls, so one client can serve concurrent callers.
//! Every operation runs the same steps:
//!
//! 1. validate the operation's options (no I/O on failure),
//! 2. `build_request` folds path, query, body and caller options into an
//!    `HttpRequest`,
//! 3. the transport executes it,
//! 4. the envelope decoder turns the `HttpResponse` into a typed result.
//!
//! `build_request` and the `envelope` functions are pure, so each half can
//! be tested without a network.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::envelope;
use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::options::{RequestConfig, RequestOptions};
use crate::pagination::Pagination;
use crate::payload::{self, Validate};
use crate::resources::{
    channels::Channels, deals::Deals, lead_labels::LeadLabels, leads::Leads, notes::Notes,
    organizations::Organizations, roles::Roles, stages::Stages, users::Users,
};

/// Synchronous, stateless client for the Pipedrive REST API.
#[derive(Debug, Clone)]
pub struct Client<T> {
    config: ClientConfig,
    transport: T,
}

impl<T: Transport> Client<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn channels(&self) -> Channels<'_, T> {
        Channels::new(self)
    }

    pub fn deals(&self) -> Deals<'_, T> {
        Deals::new(self)
    }

    pub fn leads(&self) -> Leads<'_, T> {
        Leads::new(self)
    }

    pub fn lead_labels(&self) -> LeadLabels<'_, T> {
        LeadLabels::new(self)
    }

    pub fn notes(&self) -> Notes<'_, T> {
        Notes::new(self)
    }

    pub fn organizations(&self) -> Organizations<'_, T> {
        Organizations::new(self)
    }

    pub fn roles(&self) -> Roles<'_, T> {
        Roles::new(self)
    }

    pub fn stages(&self) -> Stages<'_, T> {
        Stages::new(self)
    }

    pub fn users(&self) -> Users<'_, T> {
        Users::new(self)
    }

    /// Assemble an `HttpRequest` without sending it.
    ///
    /// Operation query pairs go in first, then the API token, then the
    /// caller's options, so a caller-supplied query value wins.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<String>,
        options: &RequestOptions,
    ) -> HttpRequest {
        let mut config = RequestConfig {
            query,
            ..RequestConfig::default()
        };
        if let Some(token) = &self.config.api_token {
            config.set_query("api_token", token.clone());
        }
        config
            .headers
            .push(("user-agent".to_string(), self.config.user_agent.clone()));
        config
            .headers
            .push(("accept".to_string(), "application/json".to_string()));
        if body.is_some() {
            config
                .headers
                .push(("content-type".to_string(), "application/json".to_string()));
        }
        options.apply(&mut config);

        HttpRequest {
            method,
            path: format!(
                "{}/{}",
                self.config.normalized_base_url(),
                path.trim_start_matches('/')
            ),
            query: config.query,
            headers: config.headers,
            context: config.context,
            body,
        }
    }

    /// Hand a request to the transport. Transport failures are returned
    /// unchanged.
    pub fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            query_params = request.query.len(),
            has_body = request.body.is_some(),
            "sending request"
        );
        let response = self.transport.execute(request)?;
        tracing::debug!(status = response.status, bytes = response.body.len(), "received response");
        Ok(response)
    }

    pub(crate) fn call(&self, call: Call<'_>) -> Result<HttpResponse, Error> {
        let request = self.build_request(call.method, &call.path, call.query, call.body, call.options);
        self.send(request)
    }

    pub(crate) fn fetch<R: DeserializeOwned>(&self, call: Call<'_>) -> Result<R, Error> {
        let response = self.call(call)?;
        envelope::decode_data(&response)
    }

    pub(crate) fn ack(&self, call: Call<'_>) -> Result<(), Error> {
        let response = self.call(call)?;
        envelope::decode_ack(&response)
    }

    pub(crate) fn fetch_list<R: DeserializeOwned>(
        &self,
        call: Call<'_>,
    ) -> Result<(Vec<R>, Option<Pagination>), Error> {
        let response = self.call(call)?;
        envelope::decode_list(&response)
    }
}

/// One operation's request, before the client adds auth and defaults.
pub(crate) struct Call<'a> {
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    body: Option<String>,
    options: &'a RequestOptions,
}

impl<'a> Call<'a> {
    pub(crate) fn new(method: HttpMethod, path: impl Into<String>, options: &'a RequestOptions) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            options,
        }
    }

    pub(crate) fn get(path: impl Into<String>, options: &'a RequestOptions) -> Self {
        Self::new(HttpMethod::Get, path, options)
    }

    pub(crate) fn delete(path: impl Into<String>, options: &'a RequestOptions) -> Self {
        Self::new(HttpMethod::Delete, path, options)
    }

    /// Validate `params` and carry its set fields as query pairs.
    pub(crate) fn query<P: Serialize + Validate>(mut self, params: &P) -> Result<Self, Error> {
        params.validate()?;
        self.query = payload::to_query(params)?;
        Ok(self)
    }

    /// Validate `payload` and carry it as the JSON body.
    pub(crate) fn json<P: Serialize + Validate>(mut self, payload: &P) -> Result<Self, Error> {
        payload.validate()?;
        let body = serde_json::to_string(payload).map_err(|e| Error::Serialization(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }
}
