//! Deals.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{
    BulkDelete, DealId, Deleted, OrganizationId, PersonId, PipelineId, Related, StageId, UserId,
};
use crate::client::{Call, Client};
use crate::error::Error;
use crate::http::{HttpMethod, Transport};
use crate::options::{RequestOptions, WithRequestOptions};
use crate::pagination::Pagination;
use crate::payload::{Flag, Validate, Violations};
use crate::time::{date_only, local_timestamp, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Open,
    Won,
    Lost,
    Deleted,
}

/// Status filter for listing; adds `all_not_deleted` to `DealStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatusFilter {
    Open,
    Won,
    Lost,
    Deleted,
    AllNotDeleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub title: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<DealStatus>,
    #[serde(default)]
    pub stage_id: Option<StageId>,
    #[serde(default)]
    pub pipeline_id: Option<PipelineId>,
    #[serde(default)]
    pub user_id: Option<Related>,
    #[serde(default)]
    pub person_id: Option<Related>,
    #[serde(default)]
    pub org_id: Option<Related>,
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default)]
    pub lost_reason: Option<String>,
    #[serde(default, with = "date_only")]
    pub expected_close_date: Option<NaiveDate>,
    #[serde(default)]
    pub add_time: Option<Timestamp>,
    #[serde(default)]
    pub update_time: Option<Timestamp>,
    #[serde(default)]
    pub close_time: Option<Timestamp>,
    #[serde(default)]
    pub won_time: Option<Timestamp>,
    #[serde(default)]
    pub lost_time: Option<Timestamp>,
    #[serde(default)]
    pub visible_to: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub deleted: Option<bool>,
}

/// Filters for `GET /deals`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListDealsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage_id: Option<StageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<DealStatusFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owned_by_you: Option<Flag>,
    #[serde(skip)]
    request: RequestOptions,
}

impl ListDealsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_id(mut self, id: UserId) -> Self {
        self.user_id = Some(id);
        self
    }

    pub fn filter_id(mut self, id: i64) -> Self {
        self.filter_id = Some(id);
        self
    }

    pub fn stage_id(mut self, id: StageId) -> Self {
        self.stage_id = Some(id);
        self
    }

    pub fn status(mut self, status: DealStatusFilter) -> Self {
        self.status = Some(status);
        self
    }

    pub fn start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn owned_by_you(mut self, owned: bool) -> Self {
        self.owned_by_you = Some(Flag(owned));
        self
    }
}

impl Validate for ListDealsOptions {
    const OPERATION: &'static str = "list deals";

    fn violations(&self) -> Vec<String> {
        Violations::new()
            .check(
                self.filter_id.is_some() && self.user_id.is_some(),
                "filter_id and user_id are mutually exclusive",
            )
            .into_vec()
    }
}

impl WithRequestOptions for ListDealsOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

/// Body for `POST /deals`. Only `title` is required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateDealOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    person_id: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    org_id: Option<OrganizationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pipeline_id: Option<PipelineId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage_id: Option<StageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<DealStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lost_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "local_timestamp::serialize")]
    add_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "date_only::serialize")]
    expected_close_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visible_to: Option<String>,
    #[serde(skip)]
    request: RequestOptions,
}

impl CreateDealOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Monetary value, sent as a string to keep the caller's precision.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn user_id(mut self, id: UserId) -> Self {
        self.user_id = Some(id);
        self
    }

    pub fn person_id(mut self, id: PersonId) -> Self {
        self.person_id = Some(id);
        self
    }

    pub fn org_id(mut self, id: OrganizationId) -> Self {
        self.org_id = Some(id);
        self
    }

    pub fn pipeline_id(mut self, id: PipelineId) -> Self {
        self.pipeline_id = Some(id);
        self
    }

    pub fn stage_id(mut self, id: StageId) -> Self {
        self.stage_id = Some(id);
        self
    }

    pub fn status(mut self, status: DealStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }

    pub fn lost_reason(mut self, reason: impl Into<String>) -> Self {
        self.lost_reason = Some(reason.into());
        self
    }

    pub fn add_time(mut self, at: NaiveDateTime) -> Self {
        self.add_time = Some(at);
        self
    }

    pub fn expected_close_date(mut self, date: NaiveDate) -> Self {
        self.expected_close_date = Some(date);
        self
    }

    pub fn visible_to(mut self, visibility: impl Into<String>) -> Self {
        self.visible_to = Some(visibility.into());
        self
    }
}

impl Validate for CreateDealOptions {
    const OPERATION: &'static str = "create deal";

    fn violations(&self) -> Vec<String> {
        Violations::new()
            .required("title", &self.title)
            .check(
                self.probability.is_some_and(|p| !(0.0..=100.0).contains(&p)),
                "probability must be between 0 and 100",
            )
            .into_vec()
    }
}

impl WithRequestOptions for CreateDealOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

/// Body for `PUT /deals/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateDealOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    person_id: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    org_id: Option<OrganizationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pipeline_id: Option<PipelineId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage_id: Option<StageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<DealStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lost_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "date_only::serialize")]
    expected_close_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visible_to: Option<String>,
    #[serde(skip)]
    request: RequestOptions,
}

impl UpdateDealOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn user_id(mut self, id: UserId) -> Self {
        self.user_id = Some(id);
        self
    }

    pub fn person_id(mut self, id: PersonId) -> Self {
        self.person_id = Some(id);
        self
    }

    pub fn org_id(mut self, id: OrganizationId) -> Self {
        self.org_id = Some(id);
        self
    }

    pub fn pipeline_id(mut self, id: PipelineId) -> Self {
        self.pipeline_id = Some(id);
        self
    }

    pub fn stage_id(mut self, id: StageId) -> Self {
        self.stage_id = Some(id);
        self
    }

    pub fn status(mut self, status: DealStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }

    pub fn lost_reason(mut self, reason: impl Into<String>) -> Self {
        self.lost_reason = Some(reason.into());
        self
    }

    pub fn expected_close_date(mut self, date: NaiveDate) -> Self {
        self.expected_close_date = Some(date);
        self
    }

    pub fn visible_to(mut self, visibility: impl Into<String>) -> Self {
        self.visible_to = Some(visibility.into());
        self
    }
}

impl Validate for UpdateDealOptions {
    const OPERATION: &'static str = "update deal";

    fn violations(&self) -> Vec<String> {
        Violations::new()
            .check(
                self.probability.is_some_and(|p| !(0.0..=100.0).contains(&p)),
                "probability must be between 0 and 100",
            )
            .into_vec()
    }
}

impl WithRequestOptions for UpdateDealOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

pub struct Deals<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Deals<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, opts: ListDealsOptions) -> Result<(Vec<Deal>, Option<Pagination>), Error> {
        let call = Call::get("deals", &opts.request).query(&opts)?;
        self.client.fetch_list(call)
    }

    pub fn get(&self, id: DealId, opts: RequestOptions) -> Result<Deal, Error> {
        self.client.fetch(Call::get(format!("deals/{id}"), &opts))
    }

    pub fn create(&self, opts: CreateDealOptions) -> Result<Deal, Error> {
        let call = Call::new(HttpMethod::Post, "deals", &opts.request).json(&opts)?;
        self.client.fetch(call)
    }

    pub fn update(&self, id: DealId, opts: UpdateDealOptions) -> Result<Deal, Error> {
        let call = Call::new(HttpMethod::Put, format!("deals/{id}"), &opts.request).json(&opts)?;
        self.client.fetch(call)
    }

    /// Returns the id of the deleted deal.
    pub fn delete(&self, id: DealId, opts: RequestOptions) -> Result<DealId, Error> {
        let deleted: Deleted<DealId> = self.client.fetch(Call::delete(format!("deals/{id}"), &opts))?;
        Ok(deleted.id)
    }

    /// Delete several deals in one call. Returns the ids the API reports as
    /// deleted.
    pub fn delete_bulk(
        &self,
        ids: impl IntoIterator<Item = DealId>,
        opts: RequestOptions,
    ) -> Result<Vec<DealId>, Error> {
        let call = Call::delete("deals", &opts).query(&BulkDelete::new(ids))?;
        let deleted: Deleted<Vec<DealId>> = self.client.fetch(call)?;
        Ok(deleted.id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::TransportError;
    use crate::http::{HttpRequest, HttpResponse};

    fn ok(body: &str) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        })
    }

    #[test]
    fn decodes_inlined_relations_and_mixed_timestamps() {
        let deal: Deal = serde_json::from_str(
            r#"{
                "id": 1,
                "title": "Big one",
                "value": 1500.5,
                "currency": "EUR",
                "status": "open",
                "user_id": {"id": 3, "name": "Owner", "email": "o@x", "value": 3},
                "person_id": {"name": "Ann", "value": 8},
                "org_id": null,
                "expected_close_date": "2020-03-01",
                "add_time": "2019-12-09 13:59:21",
                "update_time": "2020-02-13T15:31:44.000Z",
                "stage_order_nr": 2
            }"#,
        )
        .unwrap();
        assert_eq!(deal.user_id.map(|u| u.id), Some(3));
        assert_eq!(deal.person_id.and_then(|p| p.name).as_deref(), Some("Ann"));
        assert!(deal.org_id.is_none());
        assert_eq!(deal.expected_close_date, NaiveDate::from_ymd_opt(2020, 3, 1));
        assert_eq!(deal.status, Some(DealStatus::Open));
    }

    #[test]
    fn date_fields_use_their_own_formats() {
        let opts = CreateDealOptions::new()
            .title("t")
            .expected_close_date(NaiveDate::from_ymd_opt(2020, 5, 17).unwrap())
            .add_time(
                NaiveDate::from_ymd_opt(2020, 5, 1)
                    .and_then(|d| d.and_hms_opt(9, 0, 0))
                    .unwrap(),
            );
        let body = serde_json::to_value(&opts).unwrap();
        assert_eq!(body["expected_close_date"], "2020-05-17");
        assert_eq!(body["add_time"], "2020-05-01 09:00:00");
    }

    #[test]
    fn create_requires_title() {
        let err = CreateDealOptions::new().value("10").validate().unwrap_err();
        assert_eq!(err.violations, vec!["title is required".to_string()]);
    }

    #[test]
    fn list_sends_status_and_flag() {
        let client = Client::new(ClientConfig::default(), |req: HttpRequest| {
            assert_eq!(req.query_value("status"), Some("all_not_deleted"));
            assert_eq!(req.query_value("owned_by_you"), Some("1"));
            ok(r#"{"success":true,"data":null,"additional_data":{"pagination":{"start":0,"limit":100,"more_items_in_collection":false}}}"#)
        });
        let (deals, page) = client
            .deals()
            .list(
                ListDealsOptions::new()
                    .status(DealStatusFilter::AllNotDeleted)
                    .owned_by_you(true),
            )
            .unwrap();
        assert!(deals.is_empty());
        assert!(page.is_some());
    }

    #[test]
    fn bulk_delete_joins_ids() {
        let client = Client::new(ClientConfig::default(), |req: HttpRequest| {
            assert_eq!(req.method, HttpMethod::Delete);
            assert!(req.path.ends_with("/deals"));
            assert_eq!(req.query_value("ids"), Some("1,2,3"));
            ok(r#"{"success":true,"data":{"id":[1,2,3]}}"#)
        });
        let deleted = client.deals().delete_bulk([1, 2, 3], RequestOptions::new()).unwrap();
        assert_eq!(deleted, vec![1, 2, 3]);
    }

    #[test]
    fn empty_bulk_delete_is_rejected_locally() {
        let calls = Cell::new(0);
        let client = Client::new(ClientConfig::default(), |_: HttpRequest| {
            calls.set(calls.get() + 1);
            ok(r#"{"success":true,"data":{"id":[]}}"#)
        });
        let err = client.deals().delete_bulk([], RequestOptions::new()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn not_found_is_api_error() {
        let client = Client::new(ClientConfig::default(), |_: HttpRequest| {
            Ok::<_, TransportError>(HttpResponse {
                status: 404,
                headers: Vec::new(),
                body: r#"{"success":false,"error":"Deal not found","error_info":"Please check developers.pipedrive.com"}"#
                    .to_string(),
            })
        });
        match client.deals().get(99, RequestOptions::new()).unwrap_err() {
            Error::Api(api) => {
                assert!(api.is_not_found());
                assert_eq!(api.message.as_deref(), Some("Deal not found"));
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
