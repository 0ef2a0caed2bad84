//! Synchronous client core for the Pipedrive REST API.
//!
//! # Overview
//! Every operation is validated, turned into a plain `HttpRequest`, handed to
//! a caller-supplied `Transport`, and the `HttpResponse` is decoded from the
//! `{success, data, additional_data}` envelope into typed records. The core
//! never opens a socket itself; `UreqTransport` (feature `ureq`, on by
//! default) is one ready-made transport.
//!
//! # Design
//! - `Client` is stateless: it holds only `ClientConfig` and the transport.
//! - Option structs keep one `Option<T>` per wire field, so an unset field is
//!   never sent as a zero value. Required fields are checked by `Validate`
//!   before any I/O.
//! - Cross-cutting request tweaks (headers, query values, context) ride along
//!   on any option struct through `WithRequestOptions::with`.
//! - Non-2xx statuses always become `ApiError`; a 2xx body without `data`
//!   is a `DecodeError::MissingData`, never an empty success.
//! - List operations return `(items, Option<Pagination>)`; both the flat and
//!   the nested `additional_data` pagination shapes normalize to one type.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod options;
pub mod pagination;
pub mod payload;
pub mod resources;
pub mod time;
#[cfg(feature = "ureq")]
pub mod ureq_transport;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{ApiError, DecodeError, Error, TransportError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use options::{RequestConfig, RequestOption, RequestOptions, WithRequestOptions};
pub use pagination::Pagination;
pub use payload::{Flag, IdList, Validate};
pub use time::Timestamp;
#[cfg(feature = "ureq")]
pub use ureq_transport::UreqTransport;
