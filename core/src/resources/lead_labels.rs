//! Labels that can be attached to leads.

use serde::{Deserialize, Serialize};

use super::{Deleted, LeadLabelId};
use crate::client::{Call, Client};
use crate::error::Error;
use crate::http::{HttpMethod, Transport};
use crate::options::{RequestOptions, WithRequestOptions};
use crate::pagination::Pagination;
use crate::payload::{Validate, Violations};
use crate::time::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelColor {
    Green,
    Blue,
    Red,
    Yellow,
    Purple,
    Gray,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadLabel {
    pub id: LeadLabelId,
    pub name: String,
    pub color: LabelColor,
    #[serde(default)]
    pub add_time: Option<Timestamp>,
    #[serde(default)]
    pub update_time: Option<Timestamp>,
}

/// Body for `POST /leadLabels`. Both fields are required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateLeadLabelOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<LabelColor>,
    #[serde(skip)]
    request: RequestOptions,
}

impl CreateLeadLabelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn color(mut self, color: LabelColor) -> Self {
        self.color = Some(color);
        self
    }
}

impl Validate for CreateLeadLabelOptions {
    const OPERATION: &'static str = "create lead label";

    fn violations(&self) -> Vec<String> {
        Violations::new()
            .required("name", &self.name)
            .required("color", &self.color)
            .into_vec()
    }
}

impl WithRequestOptions for CreateLeadLabelOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

/// Body for `PATCH /leadLabels/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateLeadLabelOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<LabelColor>,
    #[serde(skip)]
    request: RequestOptions,
}

impl UpdateLeadLabelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn color(mut self, color: LabelColor) -> Self {
        self.color = Some(color);
        self
    }
}

impl Validate for UpdateLeadLabelOptions {
    const OPERATION: &'static str = "update lead label";

    fn violations(&self) -> Vec<String> {
        Violations::new()
            .check(
                self.name.is_none() && self.color.is_none(),
                "at least one of name, color must be set",
            )
            .into_vec()
    }
}

impl WithRequestOptions for UpdateLeadLabelOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

pub struct LeadLabels<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> LeadLabels<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, opts: RequestOptions) -> Result<(Vec<LeadLabel>, Option<Pagination>), Error> {
        self.client.fetch_list(Call::get("leadLabels", &opts))
    }

    pub fn create(&self, opts: CreateLeadLabelOptions) -> Result<LeadLabel, Error> {
        let call = Call::new(HttpMethod::Post, "leadLabels", &opts.request).json(&opts)?;
        self.client.fetch(call)
    }

    pub fn update(&self, id: LeadLabelId, opts: UpdateLeadLabelOptions) -> Result<LeadLabel, Error> {
        let call = Call::new(HttpMethod::Patch, format!("leadLabels/{id}"), &opts.request).json(&opts)?;
        self.client.fetch(call)
    }

    pub fn delete(&self, id: LeadLabelId, opts: RequestOptions) -> Result<LeadLabelId, Error> {
        let deleted: Deleted<LeadLabelId> =
            self.client.fetch(Call::delete(format!("leadLabels/{id}"), &opts))?;
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

    #[test]
    fn create_reports_both_missing_fields() {
        let err = CreateLeadLabelOptions::new().validate().unwrap_err();
        assert_eq!(
            err.violations,
            vec!["name is required".to_string(), "color is required".to_string()]
        );
    }

    #[test]
    fn create_without_color_skips_transport() {
        let calls = Cell::new(0);
        let client = Client::new(ClientConfig::default(), |_: HttpRequest| {
            calls.set(calls.get() + 1);
            Ok::<_, TransportError>(HttpResponse {
                status: 201,
                headers: Vec::new(),
                body: r#"{"success":true,"data":{}}"#.to_string(),
            })
        });
        let err = client
            .lead_labels()
            .create(CreateLeadLabelOptions::new().name("Hot"))
            .unwrap_err();
        match err {
            Error::Validation(v) => assert_eq!(v.violations, vec!["color is required".to_string()]),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(UpdateLeadLabelOptions::new().validate().is_err());
        assert!(UpdateLeadLabelOptions::new().color(LabelColor::Red).validate().is_ok());
    }

    #[test]
    fn list_decodes_colors() {
        let client = Client::new(ClientConfig::default(), |req: HttpRequest| {
            assert!(req.path.ends_with("/leadLabels"));
            Ok::<_, TransportError>(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: r#"{"success":true,"data":[{"id":"f08b42a0-4e75-11ea-9643-03698ef1cfd6","name":"Hot","color":"red","add_time":"2020-02-13T15:31:44.000Z","update_time":"2020-02-13T15:31:44.000Z"}]}"#
                    .to_string(),
            })
        });
        let (labels, page) = client.lead_labels().list(RequestOptions::new()).unwrap();
        assert_eq!(labels.len(), 1);
        assert!(page.is_none());
        assert_eq!(labels[0].color, LabelColor::Red);
    }
}
