//! Decoding of the `{success, data, additional_data}` response envelope.
//!
//! # Design
//! Decoding is a pure function of the response. The status code is checked
//! first: anything outside 200..=299 becomes an `ApiError` no matter what the
//! body says. Only then is the body parsed, and the `data` payload decoded
//! into the caller's type. Unknown JSON fields are ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{ApiError, DecodeError, Error};
use crate::http::HttpResponse;
use crate::pagination::{self, Pagination};

/// The envelope as it appears on the wire, before `data` is typed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: Option<bool>,
    /// `None` when the key is absent, `Some(Value::Null)` when it is `null`.
    #[serde(default, deserialize_with = "present")]
    pub data: Option<Value>,
    #[serde(default)]
    pub additional_data: Option<Value>,
}

/// Error fields a failed response may carry.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    error_info: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

fn text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn api_error(response: &HttpResponse) -> ApiError {
    let fields: ErrorBody = serde_json::from_str(&response.body).unwrap_or_default();
    ApiError {
        status: response.status,
        message: text(fields.error),
        error_info: text(fields.error_info),
        body: response.body.clone(),
    }
}

/// Check the status and parse the envelope, without typing `data`.
pub fn parse(response: &HttpResponse) -> Result<Envelope, Error> {
    if !response.is_success() {
        return Err(api_error(response).into());
    }
    let envelope: Envelope = serde_json::from_str(&response.body).map_err(DecodeError::from)?;
    if envelope.success == Some(false) {
        return Err(api_error(response).into());
    }
    Ok(envelope)
}

/// Decode a response whose `data` must be present and non-null.
pub fn decode_data<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, Error> {
    let envelope = parse(response)?;
    match envelope.data {
        None | Some(Value::Null) => Err(DecodeError::MissingData.into()),
        Some(data) => Ok(serde_json::from_value(data).map_err(DecodeError::from)?),
    }
}

/// Decode a list response into its items and pagination.
///
/// A `null` `data` is an empty collection; an absent `data` key is still a
/// `MissingData` error.
pub fn decode_list<T: DeserializeOwned>(
    response: &HttpResponse,
) -> Result<(Vec<T>, Option<Pagination>), Error> {
    let envelope = parse(response)?;
    let items = match envelope.data {
        None => return Err(DecodeError::MissingData.into()),
        Some(Value::Null) => Vec::new(),
        Some(data) => serde_json::from_value(data).map_err(DecodeError::from)?,
    };
    let pagination = pagination::extract(envelope.additional_data.as_ref())?;
    Ok((items, pagination))
}

/// Decode a response whose `data` is a bare boolean.
pub fn decode_success(response: &HttpResponse) -> Result<bool, Error> {
    decode_data(response)
}

/// Accept a response that only acknowledges success and carries no `data`.
pub fn decode_ack(response: &HttpResponse) -> Result<(), Error> {
    parse(response).map(|_| ())
}
