//! Leads. Unlike most resources, leads and their labels are keyed by UUID
//! and updated with `PATCH`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Deleted, LeadId, LeadLabelId, OrganizationId, PersonId, UserId};
use crate::client::{Call, Client};
use crate::error::Error;
use crate::http::{HttpMethod, Transport};
use crate::options::{RequestOptions, WithRequestOptions};
use crate::pagination::Pagination;
use crate::payload::{Validate, Violations};
use crate::time::{date_only, Timestamp};

/// Potential value of a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadValue {
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub title: String,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    #[serde(default)]
    pub creator_id: Option<UserId>,
    #[serde(default)]
    pub label_ids: Vec<LeadLabelId>,
    #[serde(default)]
    pub person_id: Option<PersonId>,
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub is_archived: Option<bool>,
    #[serde(default)]
    pub was_seen: Option<bool>,
    #[serde(default)]
    pub value: Option<LeadValue>,
    #[serde(default, with = "date_only")]
    pub expected_close_date: Option<NaiveDate>,
    #[serde(default)]
    pub next_activity_id: Option<i64>,
    #[serde(default)]
    pub add_time: Option<Timestamp>,
    #[serde(default)]
    pub update_time: Option<Timestamp>,
    #[serde(default)]
    pub visible_to: Option<String>,
    #[serde(default)]
    pub cc_email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchivedStatus {
    Archived,
    NotArchived,
    All,
}

/// Filters for `GET /leads`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListLeadsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    archived_status: Option<ArchivedStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    person_id: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization_id: Option<OrganizationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<String>,
    #[serde(skip)]
    request: RequestOptions,
}

impl ListLeadsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn archived_status(mut self, status: ArchivedStatus) -> Self {
        self.archived_status = Some(status);
        self
    }

    pub fn owner_id(mut self, id: UserId) -> Self {
        self.owner_id = Some(id);
        self
    }

    pub fn person_id(mut self, id: PersonId) -> Self {
        self.person_id = Some(id);
        self
    }

    pub fn organization_id(mut self, id: OrganizationId) -> Self {
        self.organization_id = Some(id);
        self
    }

    pub fn filter_id(mut self, id: i64) -> Self {
        self.filter_id = Some(id);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }
}

impl Validate for ListLeadsOptions {
    const OPERATION: &'static str = "list leads";

    fn violations(&self) -> Vec<String> {
        Vec::new()
    }
}

impl WithRequestOptions for ListLeadsOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

/// Body for `POST /leads`: a title plus a person or an organization.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateLeadOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label_ids: Option<Vec<LeadLabelId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    person_id: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization_id: Option<OrganizationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<LeadValue>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "date_only::serialize")]
    expected_close_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visible_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    was_seen: Option<bool>,
    #[serde(skip)]
    request: RequestOptions,
}

impl CreateLeadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn owner_id(mut self, id: UserId) -> Self {
        self.owner_id = Some(id);
        self
    }

    pub fn label_ids(mut self, ids: impl IntoIterator<Item = LeadLabelId>) -> Self {
        self.label_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn person_id(mut self, id: PersonId) -> Self {
        self.person_id = Some(id);
        self
    }

    pub fn organization_id(mut self, id: OrganizationId) -> Self {
        self.organization_id = Some(id);
        self
    }

    pub fn value(mut self, amount: f64, currency: impl Into<String>) -> Self {
        self.value = Some(LeadValue {
            amount,
            currency: currency.into(),
        });
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

    pub fn was_seen(mut self, seen: bool) -> Self {
        self.was_seen = Some(seen);
        self
    }
}

impl Validate for CreateLeadOptions {
    const OPERATION: &'static str = "create lead";

    fn violations(&self) -> Vec<String> {
        Violations::new()
            .required("title", &self.title)
            .any_of(&[
                ("person_id", self.person_id.is_some()),
                ("organization_id", self.organization_id.is_some()),
            ])
            .into_vec()
    }
}

impl WithRequestOptions for CreateLeadOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

/// Body for `PATCH /leads/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateLeadOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label_ids: Option<Vec<LeadLabelId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    person_id: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization_id: Option<OrganizationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<LeadValue>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "date_only::serialize")]
    expected_close_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visible_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    was_seen: Option<bool>,
    #[serde(skip)]
    request: RequestOptions,
}

impl UpdateLeadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn owner_id(mut self, id: UserId) -> Self {
        self.owner_id = Some(id);
        self
    }

    pub fn label_ids(mut self, ids: impl IntoIterator<Item = LeadLabelId>) -> Self {
        self.label_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn person_id(mut self, id: PersonId) -> Self {
        self.person_id = Some(id);
        self
    }

    pub fn organization_id(mut self, id: OrganizationId) -> Self {
        self.organization_id = Some(id);
        self
    }

    pub fn is_archived(mut self, archived: bool) -> Self {
        self.is_archived = Some(archived);
        self
    }

    pub fn value(mut self, amount: f64, currency: impl Into<String>) -> Self {
        self.value = Some(LeadValue {
            amount,
            currency: currency.into(),
        });
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

    pub fn was_seen(mut self, seen: bool) -> Self {
        self.was_seen = Some(seen);
        self
    }
}

impl Validate for UpdateLeadOptions {
    const OPERATION: &'static str = "update lead";

    fn violations(&self) -> Vec<String> {
        Vec::new()
    }
}

impl WithRequestOptions for UpdateLeadOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

pub struct Leads<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Leads<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, opts: ListLeadsOptions) -> Result<(Vec<Lead>, Option<Pagination>), Error> {
        let call = Call::get("leads", &opts.request).query(&opts)?;
        self.client.fetch_list(call)
    }

    pub fn get(&self, id: LeadId, opts: RequestOptions) -> Result<Lead, Error> {
        self.client.fetch(Call::get(format!("leads/{id}"), &opts))
    }

    pub fn create(&self, opts: CreateLeadOptions) -> Result<Lead, Error> {
        let call = Call::new(HttpMethod::Post, "leads", &opts.request).json(&opts)?;
        self.client.fetch(call)
    }

    pub fn update(&self, id: LeadId, opts: UpdateLeadOptions) -> Result<Lead, Error> {
        let call = Call::new(HttpMethod::Patch, format!("leads/{id}"), &opts.request).json(&opts)?;
        self.client.fetch(call)
    }

    pub fn delete(&self, id: LeadId, opts: RequestOptions) -> Result<LeadId, Error> {
        let deleted: Deleted<LeadId> = self.client.fetch(Call::delete(format!("leads/{id}"), &opts))?;
        Ok(deleted.id)
    }
}
