//! Organizations.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{BulkDelete, Deleted, OrganizationId, Related, UserId};
use crate::client::{Call, Client};
use crate::error::Error;
use crate::http::{HttpMethod, Transport};
use crate::options::{RequestOptions, WithRequestOptions};
use crate::pagination::Pagination;
use crate::payload::{Validate, Violations};
use crate::time::{local_timestamp, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    #[serde(default)]
    pub owner_id: Option<Related>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub people_count: Option<i64>,
    #[serde(default)]
    pub open_deals_count: Option<i64>,
    #[serde(default)]
    pub visible_to: Option<String>,
    #[serde(default)]
    pub active_flag: Option<bool>,
    #[serde(default)]
    pub add_time: Option<Timestamp>,
    #[serde(default)]
    pub update_time: Option<Timestamp>,
}

/// Filters for `GET /organizations`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListOrganizationsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_char: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<String>,
    #[serde(skip)]
    request: RequestOptions,
}

impl ListOrganizationsOptions {
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

    /// Only organizations whose name starts with this letter.
    pub fn first_char(mut self, first: char) -> Self {
        self.first_char = Some(first);
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
}

impl Validate for ListOrganizationsOptions {
    const OPERATION: &'static str = "list organizations";

    fn violations(&self) -> Vec<String> {
        Violations::new()
            .check(
                self.first_char.is_some_and(|c| !c.is_alphanumeric()),
                "first_char must be a letter or digit",
            )
            .into_vec()
    }
}

impl WithRequestOptions for ListOrganizationsOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

/// Body for `POST /organizations` and `PUT /organizations/{id}`.
///
/// `name` is required on create only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visible_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "local_timestamp::serialize")]
    add_time: Option<NaiveDateTime>,
    #[serde(skip)]
    request: RequestOptions,
}

impl OrganizationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn owner_id(mut self, id: UserId) -> Self {
        self.owner_id = Some(id);
        self
    }

    pub fn visible_to(mut self, visibility: impl Into<String>) -> Self {
        self.visible_to = Some(visibility.into());
        self
    }

    /// Only honored on create.
    pub fn add_time(mut self, at: NaiveDateTime) -> Self {
        self.add_time = Some(at);
        self
    }
}

impl WithRequestOptions for OrganizationOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

/// `OrganizationOptions` as a create payload.
#[derive(Serialize)]
#[serde(transparent)]
struct CreateOrganization<'a>(&'a OrganizationOptions);

impl Validate for CreateOrganization<'_> {
    const OPERATION: &'static str = "create organization";

    fn violations(&self) -> Vec<String> {
        Violations::new().required("name", &self.0.name).into_vec()
    }
}

/// `OrganizationOptions` as an update payload.
#[derive(Serialize)]
#[serde(transparent)]
struct UpdateOrganization<'a>(&'a OrganizationOptions);

impl Validate for UpdateOrganization<'_> {
    const OPERATION: &'static str = "update organization";

    fn violations(&self) -> Vec<String> {
        Violations::new()
            .check(self.0.add_time.is_some(), "add_time can only be set on create")
            .into_vec()
    }
}

pub struct Organizations<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Organizations<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub fn list(
        &self,
        opts: ListOrganizationsOptions,
    ) -> Result<(Vec<Organization>, Option<Pagination>), Error> {
        let call = Call::get("organizations", &opts.request).query(&opts)?;
        self.client.fetch_list(call)
    }

    pub fn get(&self, id: OrganizationId, opts: RequestOptions) -> Result<Organization, Error> {
        self.client.fetch(Call::get(format!("organizations/{id}"), &opts))
    }

    pub fn create(&self, opts: OrganizationOptions) -> Result<Organization, Error> {
        let call =
            Call::new(HttpMethod::Post, "organizations", &opts.request).json(&CreateOrganization(&opts))?;
        self.client.fetch(call)
    }

    pub fn update(&self, id: OrganizationId, opts: OrganizationOptions) -> Result<Organization, Error> {
        let call = Call::new(HttpMethod::Put, format!("organizations/{id}"), &opts.request)
            .json(&UpdateOrganization(&opts))?;
        self.client.fetch(call)
    }

    pub fn delete(&self, id: OrganizationId, opts: RequestOptions) -> Result<OrganizationId, Error> {
        let deleted: Deleted<OrganizationId> =
            self.client.fetch(Call::delete(format!("organizations/{id}"), &opts))?;
        Ok(deleted.id)
    }

    pub fn delete_bulk(
        &self,
        ids: impl IntoIterator<Item = OrganizationId>,
        opts: RequestOptions,
    ) -> Result<Vec<OrganizationId>, Error> {
        let call = Call::delete("organizations", &opts).query(&BulkDelete::new(ids))?;
        let deleted: Deleted<Vec<OrganizationId>> = self.client.fetch(call)?;
        Ok(deleted.id)
    }
}
