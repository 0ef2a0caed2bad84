//! Company users.

use serde::{Deserialize, Serialize};

use super::{RoleId, UserId};
use crate::client::{Call, Client};
use crate::error::Error;
use crate::http::{HttpMethod, Transport};
use crate::options::{RequestOptions, WithRequestOptions};
use crate::pagination::Pagination;
use crate::payload::{Flag, Validate, Violations};
use crate::time::Timestamp;

/// Per-app access entry of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccess {
    pub app: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_set_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub default_currency: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub lang: Option<i64>,
    #[serde(default)]
    pub activated: Option<bool>,
    #[serde(default)]
    pub active_flag: Option<bool>,
    #[serde(default)]
    pub is_admin: Option<Flag>,
    #[serde(default)]
    pub role_id: Option<RoleId>,
    #[serde(default)]
    pub timezone_name: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub is_you: Option<bool>,
    #[serde(default)]
    pub access: Vec<UserAccess>,
    #[serde(default)]
    pub last_login: Option<Timestamp>,
    #[serde(default)]
    pub created: Option<Timestamp>,
    #[serde(default)]
    pub modified: Option<Timestamp>,
}

/// Query for `GET /users/find`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FindUsersOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_by_email: Option<Flag>,
    #[serde(skip)]
    request: RequestOptions,
}

impl FindUsersOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    /// Match `term` against emails instead of names.
    pub fn search_by_email(mut self, by_email: bool) -> Self {
        self.search_by_email = Some(Flag(by_email));
        self
    }
}

impl Validate for FindUsersOptions {
    const OPERATION: &'static str = "find users";

    fn violations(&self) -> Vec<String> {
        Violations::new().required("term", &self.term).into_vec()
    }
}

impl WithRequestOptions for FindUsersOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

/// Body for `POST /users`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateUserOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    access: Option<Vec<UserAccess>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    active_flag: Option<bool>,
    #[serde(skip)]
    request: RequestOptions,
}

impl CreateUserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn access(mut self, access: impl IntoIterator<Item = UserAccess>) -> Self {
        self.access = Some(access.into_iter().collect());
        self
    }

    pub fn active_flag(mut self, active: bool) -> Self {
        self.active_flag = Some(active);
        self
    }
}

impl Validate for CreateUserOptions {
    const OPERATION: &'static str = "create user";

    fn violations(&self) -> Vec<String> {
        Violations::new()
            .required("email", &self.email)
            .check(
                self.email.as_deref().is_some_and(|email| !email.contains('@')),
                "email must contain '@'",
            )
            .into_vec()
    }
}

impl WithRequestOptions for CreateUserOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

/// Body for `PUT /users/{id}`. `active_flag` is required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateUserOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    active_flag: Option<bool>,
    #[serde(skip)]
    request: RequestOptions,
}

impl UpdateUserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_flag(mut self, active: bool) -> Self {
        self.active_flag = Some(active);
        self
    }
}

impl Validate for UpdateUserOptions {
    const OPERATION: &'static str = "update user";

    fn violations(&self) -> Vec<String> {
        Violations::new().required("active_flag", &self.active_flag).into_vec()
    }
}

impl WithRequestOptions for UpdateUserOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

pub struct Users<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Users<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    /// All users in the company.
    pub fn list(&self, opts: RequestOptions) -> Result<(Vec<User>, Option<Pagination>), Error> {
        self.client.fetch_list(Call::get("users", &opts))
    }

    pub fn get(&self, id: UserId, opts: RequestOptions) -> Result<User, Error> {
        self.client.fetch(Call::get(format!("users/{id}"), &opts))
    }

    /// The user the API token belongs to.
    pub fn me(&self, opts: RequestOptions) -> Result<User, Error> {
        self.client.fetch(Call::get("users/me", &opts))
    }

    pub fn find(&self, opts: FindUsersOptions) -> Result<(Vec<User>, Option<Pagination>), Error> {
        let call = Call::get("users/find", &opts.request).query(&opts)?;
        self.client.fetch_list(call)
    }

    pub fn create(&self, opts: CreateUserOptions) -> Result<User, Error> {
        let call = Call::new(HttpMethod::Post, "users", &opts.request).json(&opts)?;
        self.client.fetch(call)
    }

    pub fn update(&self, id: UserId, opts: UpdateUserOptions) -> Result<User, Error> {
        let call = Call::new(HttpMethod::Put, format!("users/{id}"), &opts.request).json(&opts)?;
        self.client.fetch(call)
    }
}
