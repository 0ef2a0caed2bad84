//! In-memory stand-in for a slice of the Pipedrive v1 API.
//!
//! Serves notes, deals and organizations under `/v1`, wrapping every reply in
//! the `{success, data, additional_data}` envelope. Records are stored as raw
//! JSON objects so any field the client sends comes back on read.

use std::{collections::BTreeMap, collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Timestamp stamped on records that arrive without one.
pub const SERVER_TIME: &str = "2024-01-15 09:30:00";

const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Notes,
    Deals,
    Organizations,
}

impl Resource {
    fn parse(segment: &str) -> Option<Self> {
        match segment {
            "notes" => Some(Self::Notes),
            "deals" => Some(Self::Deals),
            "organizations" => Some(Self::Organizations),
            _ => None,
        }
    }

    fn required_field(self) -> &'static str {
        match self {
            Self::Notes => "content",
            Self::Deals => "title",
            Self::Organizations => "name",
        }
    }

    fn singular(self) -> &'static str {
        match self {
            Self::Notes => "Note",
            Self::Deals => "Deal",
            Self::Organizations => "Organization",
        }
    }
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: i64,
    tables: HashMap<Resource, BTreeMap<i64, Map<String, Value>>>,
}

impl Store {
    fn insert(&mut self, resource: Resource, mut record: Map<String, Value>) -> Value {
        self.next_id += 1;
        let id = self.next_id;
        record.insert("id".to_string(), json!(id));
        record
            .entry("add_time")
            .or_insert_with(|| json!(SERVER_TIME));
        record.insert("update_time".to_string(), json!(SERVER_TIME));
        record.entry("active_flag").or_insert(json!(true));
        if resource == Resource::Deals {
            record.entry("status").or_insert(json!("open"));
        }
        self.tables.entry(resource).or_default().insert(id, record.clone());
        Value::Object(record)
    }

    fn table(&self, resource: Resource) -> impl Iterator<Item = &Map<String, Value>> {
        self.tables.get(&resource).into_iter().flat_map(|t| t.values())
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route(
            "/v1/{resource}",
            get(list_records).post(create_record).delete(delete_bulk),
        )
        .route(
            "/v1/{resource}/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

/// Envelope-shaped failure, the way the real API reports errors.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    message: String,
}

impl Failure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found(resource: Resource) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{} not found", resource.singular()))
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        tracing::debug!(status = %self.status, message = %self.message, "request failed");
        let body = json!({
            "success": false,
            "error": self.message,
            "error_info": "Please check developers.pipedrive.com for more information about Pipedrive API.",
            "data": null,
            "additional_data": null,
        });
        (self.status, Json(body)).into_response()
    }
}

fn success(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

fn authorize(query: &HashMap<String, String>) -> Result<(), Failure> {
    match query.get("api_token") {
        Some(token) if !token.is_empty() => Ok(()),
        _ => Err(Failure::new(StatusCode::UNAUTHORIZED, "You need to be authorized to make this request.")),
    }
}

fn resource(segment: &str) -> Result<Resource, Failure> {
    Resource::parse(segment)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, format!("Unknown resource: {segment}")))
}

fn number(query: &HashMap<String, String>, key: &str, default: usize) -> Result<usize, Failure> {
    match query.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| Failure::new(StatusCode::BAD_REQUEST, format!("{key} must be a number"))),
    }
}

/// Coerce wire fields the client sends as strings back into the types the
/// read side reports.
fn normalize(resource: Resource, record: &mut Map<String, Value>) {
    if resource != Resource::Deals {
        return;
    }
    let amount = match record.get("value") {
        Some(Value::String(raw)) => raw.parse::<f64>().ok(),
        _ => None,
    };
    if let Some(amount) = amount {
        record.insert("value".to_string(), json!(amount));
    }
}

fn object(body: Value) -> Result<Map<String, Value>, Failure> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(Failure::new(StatusCode::BAD_REQUEST, "Request body must be a JSON object")),
    }
}

/// Nested pagination block for a page of `shown` records out of `total`.
fn pagination(start: usize, limit: usize, shown: usize, total: usize) -> Value {
    let more = start.saturating_add(shown) < total;
    let mut block = json!({
        "start": start,
        "limit": limit,
        "more_items_in_collection": more,
    });
    if more {
        block["next_start"] = json!(start.saturating_add(limit));
    }
    block
}

async fn list_records(
    State(db): State<Db>,
    Path(segment): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Failure> {
    authorize(&query)?;
    let resource = resource(&segment)?;
    let start = number(&query, "start", 0)?;
    let limit = number(&query, "limit", DEFAULT_LIMIT)?.max(1);

    let store = db.read().await;
    let all: Vec<&Map<String, Value>> = store.table(resource).collect();
    let page: Vec<Value> = all
        .iter()
        .skip(start)
        .take(limit)
        .map(|record| Value::Object((*record).clone()))
        .collect();
    let pagination = pagination(start, limit, page.len(), all.len());
    let data = if page.is_empty() { Value::Null } else { Value::Array(page) };
    Ok(Json(json!({
        "success": true,
        "data": data,
        "additional_data": { "pagination": pagination },
    })))
}

async fn create_record(
    State(db): State<Db>,
    Path(segment): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    authorize(&query)?;
    let resource = resource(&segment)?;
    let mut record = object(body)?;
    let field = resource.required_field();
    if record.get(field).and_then(Value::as_str).map_or(true, str::is_empty) {
        return Err(Failure::new(StatusCode::BAD_REQUEST, format!("{field} is required")));
    }
    normalize(resource, &mut record);
    let created = db.write().await.insert(resource, record);
    tracing::debug!(?resource, id = %created["id"], "created record");
    Ok((StatusCode::CREATED, success(created)))
}

async fn get_record(
    State(db): State<Db>,
    Path((segment, id)): Path<(String, i64)>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Failure> {
    authorize(&query)?;
    let resource = resource(&segment)?;
    let store = db.read().await;
    store
        .tables
        .get(&resource)
        .and_then(|t| t.get(&id))
        .map(|record| success(Value::Object(record.clone())))
        .ok_or_else(|| Failure::not_found(resource))
}

async fn update_record(
    State(db): State<Db>,
    Path((segment, id)): Path<(String, i64)>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Failure> {
    authorize(&query)?;
    let resource = resource(&segment)?;
    let mut changes = object(body)?;
    normalize(resource, &mut changes);

    let mut store = db.write().await;
    let record = store
        .tables
        .get_mut(&resource)
        .and_then(|t| t.get_mut(&id))
        .ok_or_else(|| Failure::not_found(resource))?;
    changes.remove("id");
    record.extend(changes);
    record.insert("update_time".to_string(), json!(SERVER_TIME));
    Ok(success(Value::Object(record.clone())))
}

async fn delete_record(
    State(db): State<Db>,
    Path((segment, id)): Path<(String, i64)>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Failure> {
    authorize(&query)?;
    let resource = resource(&segment)?;
    let mut store = db.write().await;
    store
        .tables
        .get_mut(&resource)
        .and_then(|t| t.remove(&id))
        .ok_or_else(|| Failure::not_found(resource))?;
    // Notes acknowledge with a bare boolean, the rest echo the id.
    let data = match resource {
        Resource::Notes => json!(true),
        _ => json!({ "id": id }),
    };
    Ok(success(data))
}

async fn delete_bulk(
    State(db): State<Db>,
    Path(segment): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Failure> {
    authorize(&query)?;
    let resource = resource(&segment)?;
    if resource == Resource::Notes {
        return Err(Failure::new(StatusCode::METHOD_NOT_ALLOWED, "Bulk delete is not supported for notes"));
    }
    let ids = query
        .get("ids")
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| Failure::new(StatusCode::BAD_REQUEST, "ids is required"))?
        .split(',')
        .map(|raw| raw.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| Failure::new(StatusCode::BAD_REQUEST, "ids must be a comma separated list of numbers"))?;

    let mut store = db.write().await;
    let table = store.tables.entry(resource).or_default();
    let removed: Vec<i64> = ids.into_iter().filter(|id| table.remove(id).is_some()).collect();
    Ok(success(json!({ "id": removed })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_segments() {
        assert_eq!(Resource::parse("deals"), Some(Resource::Deals));
        assert_eq!(Resource::parse("Deals"), None);
        assert_eq!(Resource::parse("persons"), None);
    }

    #[test]
    fn insert_assigns_sequential_ids_and_defaults() {
        let mut store = Store::default();
        let first = store.insert(Resource::Deals, Map::new());
        let second = store.insert(Resource::Notes, Map::new());
        assert_eq!(first["id"], 1);
        assert_eq!(second["id"], 2);
        assert_eq!(first["status"], "open");
        assert!(second.get("status").is_none());
        assert_eq!(second["add_time"], SERVER_TIME);
    }

    #[test]
    fn caller_add_time_is_kept() {
        let mut store = Store::default();
        let mut record = Map::new();
        record.insert("add_time".to_string(), json!("2020-01-01 00:00:00"));
        let created = store.insert(Resource::Notes, record);
        assert_eq!(created["add_time"], "2020-01-01 00:00:00");
    }

    #[test]
    fn deal_value_strings_become_numbers() {
        let mut record = Map::new();
        record.insert("value".to_string(), json!("1500.50"));
        normalize(Resource::Deals, &mut record);
        assert_eq!(record["value"], json!(1500.5));

        let mut note = Map::new();
        note.insert("value".to_string(), json!("1"));
        normalize(Resource::Notes, &mut note);
        assert_eq!(note["value"], "1");
    }

    #[test]
    fn pagination_offsets_saturate() {
        let block = pagination(usize::MAX - 1, usize::MAX, 0, usize::MAX);
        assert_eq!(block["more_items_in_collection"], true);
        assert_eq!(block["next_start"], json!(usize::MAX));

        let last = pagination(0, 2, 2, 2);
        assert_eq!(last["more_items_in_collection"], false);
        assert!(last.get("next_start").is_none());
    }

    #[test]
    fn missing_token_is_unauthorized() {
        let err = authorize(&HashMap::new()).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
