//! Roles in the company's visibility hierarchy.

use serde::{Deserialize, Serialize};

use super::{Deleted, RoleId};
use crate::client::{Call, Client};
use crate::error::Error;
use crate::http::{HttpMethod, Transport};
use crate::options::{RequestOptions, WithRequestOptions};
use crate::pagination::Pagination;
use crate::payload::{Validate, Violations};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub parent_role_id: Option<RoleId>,
    #[serde(default)]
    pub active_flag: Option<bool>,
    #[serde(default)]
    pub level: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListRolesOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
    #[serde(skip)]
    request: RequestOptions,
}

impl ListRolesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl Validate for ListRolesOptions {
    const OPERATION: &'static str = "list roles";

    fn violations(&self) -> Vec<String> {
        Vec::new()
    }
}

impl WithRequestOptions for ListRolesOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateRoleOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_role_id: Option<RoleId>,
    #[serde(skip)]
    request: RequestOptions,
}

impl CreateRoleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn parent_role_id(mut self, id: RoleId) -> Self {
        self.parent_role_id = Some(id);
        self
    }
}

impl Validate for CreateRoleOptions {
    const OPERATION: &'static str = "create role";

    fn violations(&self) -> Vec<String> {
        Violations::new().required("name", &self.name).into_vec()
    }
}

impl WithRequestOptions for CreateRoleOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateRoleOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_role_id: Option<RoleId>,
    #[serde(skip)]
    request: RequestOptions,
}

impl UpdateRoleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn parent_role_id(mut self, id: RoleId) -> Self {
        self.parent_role_id = Some(id);
        self
    }
}

impl Validate for UpdateRoleOptions {
    const OPERATION: &'static str = "update role";

    fn violations(&self) -> Vec<String> {
        Violations::new()
            .check(
                self.name.is_none() && self.parent_role_id.is_none(),
                "at least one of name, parent_role_id must be set",
            )
            .into_vec()
    }
}

impl WithRequestOptions for UpdateRoleOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

pub struct Roles<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Roles<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, opts: ListRolesOptions) -> Result<(Vec<Role>, Option<Pagination>), Error> {
        let call = Call::get("roles", &opts.request).query(&opts)?;
        self.client.fetch_list(call)
    }

    pub fn get(&self, id: RoleId, opts: RequestOptions) -> Result<Role, Error> {
        self.client.fetch(Call::get(format!("roles/{id}"), &opts))
    }

    pub fn create(&self, opts: CreateRoleOptions) -> Result<Role, Error> {
        let call = Call::new(HttpMethod::Post, "roles", &opts.request).json(&opts)?;
        self.client.fetch(call)
    }

    pub fn update(&self, id: RoleId, opts: UpdateRoleOptions) -> Result<Role, Error> {
        let call = Call::new(HttpMethod::Put, format!("roles/{id}"), &opts.request).json(&opts)?;
        self.client.fetch(call)
    }

    pub fn delete(&self, id: RoleId, opts: RequestOptions) -> Result<RoleId, Error> {
        let deleted: Deleted<RoleId> = self.client.fetch(Call::delete(format!("roles/{id}"), &opts))?;
        Ok(deleted.id)
    }
}
