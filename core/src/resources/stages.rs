//! Pipeline stages.

use serde::{Deserialize, Serialize};

use super::{BulkDelete, Deleted, PipelineId, StageId};
use crate::client::{Call, Client};
use crate::error::Error;
use crate::http::{HttpMethod, Transport};
use crate::options::{RequestOptions, WithRequestOptions};
use crate::pagination::Pagination;
use crate::payload::{Validate, Violations};
use crate::time::Timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    #[serde(default)]
    pub order_nr: Option<i64>,
    #[serde(default)]
    pub active_flag: Option<bool>,
    #[serde(default)]
    pub deal_probability: Option<i64>,
    #[serde(default)]
    pub pipeline_id: Option<PipelineId>,
    #[serde(default)]
    pub pipeline_name: Option<String>,
    #[serde(default)]
    pub rotten_flag: Option<bool>,
    #[serde(default)]
    pub rotten_days: Option<i64>,
    #[serde(default)]
    pub add_time: Option<Timestamp>,
    #[serde(default)]
    pub update_time: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListStagesOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pipeline_id: Option<PipelineId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
    #[serde(skip)]
    request: RequestOptions,
}

impl ListStagesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pipeline_id(mut self, id: PipelineId) -> Self {
        self.pipeline_id = Some(id);
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
}

impl Validate for ListStagesOptions {
    const OPERATION: &'static str = "list stages";

    fn violations(&self) -> Vec<String> {
        Vec::new()
    }
}

impl WithRequestOptions for ListStagesOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

/// Body for `POST /stages` and `PUT /stages/{id}`. Create needs `name` and
/// `pipeline_id`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pipeline_id: Option<PipelineId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_nr: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deal_probability: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rotten_flag: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rotten_days: Option<i64>,
    #[serde(skip)]
    request: RequestOptions,
}

impl StageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn pipeline_id(mut self, id: PipelineId) -> Self {
        self.pipeline_id = Some(id);
        self
    }

    pub fn order_nr(mut self, order: i64) -> Self {
        self.order_nr = Some(order);
        self
    }

    /// Percentage, 0 to 100.
    pub fn deal_probability(mut self, probability: i64) -> Self {
        self.deal_probability = Some(probability);
        self
    }

    pub fn rotten_flag(mut self, rotten: bool) -> Self {
        self.rotten_flag = Some(rotten);
        self
    }

    pub fn rotten_days(mut self, days: i64) -> Self {
        self.rotten_days = Some(days);
        self
    }

    fn shared_violations(&self) -> Violations {
        Violations::new()
            .check(
                self.deal_probability.is_some_and(|p| !(0..=100).contains(&p)),
                "deal_probability must be between 0 and 100",
            )
            .check(
                self.rotten_days.is_some() && self.rotten_flag == Some(false),
                "rotten_days requires rotten_flag",
            )
    }
}

impl WithRequestOptions for StageOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct CreateStage<'a>(&'a StageOptions);

impl Validate for CreateStage<'_> {
    const OPERATION: &'static str = "create stage";

    fn violations(&self) -> Vec<String> {
        self.0
            .shared_violations()
            .required("name", &self.0.name)
            .required("pipeline_id", &self.0.pipeline_id)
            .into_vec()
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct UpdateStage<'a>(&'a StageOptions);

impl Validate for UpdateStage<'_> {
    const OPERATION: &'static str = "update stage";

    fn violations(&self) -> Vec<String> {
        self.0.shared_violations().into_vec()
    }
}

pub struct Stages<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Stages<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, opts: ListStagesOptions) -> Result<(Vec<Stage>, Option<Pagination>), Error> {
        let call = Call::get("stages", &opts.request).query(&opts)?;
        self.client.fetch_list(call)
    }

    pub fn get(&self, id: StageId, opts: RequestOptions) -> Result<Stage, Error> {
        self.client.fetch(Call::get(format!("stages/{id}"), &opts))
    }

    pub fn create(&self, opts: StageOptions) -> Result<Stage, Error> {
        let call = Call::new(HttpMethod::Post, "stages", &opts.request).json(&CreateStage(&opts))?;
        self.client.fetch(call)
    }

    pub fn update(&self, id: StageId, opts: StageOptions) -> Result<Stage, Error> {
        let call = Call::new(HttpMethod::Put, format!("stages/{id}"), &opts.request)
            .json(&UpdateStage(&opts))?;
        self.client.fetch(call)
    }

    pub fn delete(&self, id: StageId, opts: RequestOptions) -> Result<StageId, Error> {
        let deleted: Deleted<StageId> = self.client.fetch(Call::delete(format!("stages/{id}"), &opts))?;
        Ok(deleted.id)
    }

    pub fn delete_bulk(
        &self,
        ids: impl IntoIterator<Item = StageId>,
        opts: RequestOptions,
    ) -> Result<Vec<StageId>, Error> {
        let call = Call::delete("stages", &opts).query(&BulkDelete::new(ids))?;
        let deleted: Deleted<Vec<StageId>> = self.client.fetch(call)?;
        Ok(deleted.id)
    }
}
