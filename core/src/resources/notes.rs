//! Notes attached to deals, leads, people and organizations.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{DealId, LeadId, NoteId, OrganizationId, PersonId, Related, UserId};
use crate::client::{Call, Client};
use crate::envelope;
use crate::error::Error;
use crate::http::{HttpMethod, Transport};
use crate::options::{RequestOptions, WithRequestOptions};
use crate::pagination::Pagination;
use crate::payload::{Flag, Validate, Violations};
use crate::time::{date_only, local_timestamp, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub deal_id: Option<DealId>,
    #[serde(default)]
    pub person_id: Option<PersonId>,
    #[serde(default)]
    pub org_id: Option<OrganizationId>,
    #[serde(default)]
    pub lead_id: Option<LeadId>,
    #[serde(default)]
    pub add_time: Option<Timestamp>,
    #[serde(default)]
    pub update_time: Option<Timestamp>,
    #[serde(default)]
    pub active_flag: Option<bool>,
    #[serde(default)]
    pub pinned_to_deal_flag: Option<Flag>,
    #[serde(default)]
    pub pinned_to_person_flag: Option<Flag>,
    #[serde(default)]
    pub pinned_to_organization_flag: Option<Flag>,
    #[serde(default)]
    pub pinned_to_lead_flag: Option<Flag>,
    #[serde(default)]
    pub last_update_user_id: Option<UserId>,
    /// Author as inlined by the list endpoint.
    #[serde(default)]
    pub user: Option<Related>,
}

/// Filters for `GET /notes`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListNotesOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lead_id: Option<LeadId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deal_id: Option<DealId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    person_id: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    org_id: Option<OrganizationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "date_only::serialize")]
    start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "date_only::serialize")]
    end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinned_to_lead_flag: Option<Flag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinned_to_deal_flag: Option<Flag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinned_to_organization_flag: Option<Flag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinned_to_person_flag: Option<Flag>,
    #[serde(skip)]
    request: RequestOptions,
}

impl ListNotesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_id(mut self, id: UserId) -> Self {
        self.user_id = Some(id);
        self
    }

    pub fn lead_id(mut self, id: LeadId) -> Self {
        self.lead_id = Some(id);
        self
    }

    pub fn deal_id(mut self, id: DealId) -> Self {
        self.deal_id = Some(id);
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

    pub fn start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// e.g. `"add_time DESC"`.
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn pinned_to_lead_flag(mut self, pinned: bool) -> Self {
        self.pinned_to_lead_flag = Some(Flag(pinned));
        self
    }

    pub fn pinned_to_deal_flag(mut self, pinned: bool) -> Self {
        self.pinned_to_deal_flag = Some(Flag(pinned));
        self
    }

    pub fn pinned_to_organization_flag(mut self, pinned: bool) -> Self {
        self.pinned_to_organization_flag = Some(Flag(pinned));
        self
    }

    pub fn pinned_to_person_flag(mut self, pinned: bool) -> Self {
        self.pinned_to_person_flag = Some(Flag(pinned));
        self
    }
}

impl Validate for ListNotesOptions {
    const OPERATION: &'static str = "list notes";

    fn violations(&self) -> Vec<String> {
        Violations::new()
            .check(
                matches!((self.start_date, self.end_date), (Some(from), Some(to)) if from > to),
                "start_date must not be after end_date",
            )
            .into_vec()
    }
}

impl WithRequestOptions for ListNotesOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

/// Body for `POST /notes`.
///
/// `content` is required, as is at least one of the record ids the note
/// attaches to.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateNoteOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lead_id: Option<LeadId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deal_id: Option<DealId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    person_id: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    org_id: Option<OrganizationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "local_timestamp::serialize")]
    add_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinned_to_lead_flag: Option<Flag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinned_to_deal_flag: Option<Flag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinned_to_organization_flag: Option<Flag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinned_to_person_flag: Option<Flag>,
    #[serde(skip)]
    request: RequestOptions,
}

impl CreateNoteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// HTML is allowed.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn lead_id(mut self, id: LeadId) -> Self {
        self.lead_id = Some(id);
        self
    }

    pub fn deal_id(mut self, id: DealId) -> Self {
        self.deal_id = Some(id);
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

    pub fn user_id(mut self, id: UserId) -> Self {
        self.user_id = Some(id);
        self
    }

    pub fn add_time(mut self, at: NaiveDateTime) -> Self {
        self.add_time = Some(at);
        self
    }

    pub fn pinned_to_lead_flag(mut self, pinned: bool) -> Self {
        self.pinned_to_lead_flag = Some(Flag(pinned));
        self
    }

    pub fn pinned_to_deal_flag(mut self, pinned: bool) -> Self {
        self.pinned_to_deal_flag = Some(Flag(pinned));
        self
    }

    pub fn pinned_to_organization_flag(mut self, pinned: bool) -> Self {
        self.pinned_to_organization_flag = Some(Flag(pinned));
        self
    }

    pub fn pinned_to_person_flag(mut self, pinned: bool) -> Self {
        self.pinned_to_person_flag = Some(Flag(pinned));
        self
    }
}

impl Validate for CreateNoteOptions {
    const OPERATION: &'static str = "create note";

    fn violations(&self) -> Vec<String> {
        Violations::new()
            .required("content", &self.content)
            .any_of(&[
                ("lead_id", self.lead_id.is_some()),
                ("deal_id", self.deal_id.is_some()),
                ("person_id", self.person_id.is_some()),
                ("org_id", self.org_id.is_some()),
            ])
            .into_vec()
    }
}

impl WithRequestOptions for CreateNoteOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

/// Body for `PUT /notes/{id}`. Every field is optional.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateNoteOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lead_id: Option<LeadId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deal_id: Option<DealId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    person_id: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    org_id: Option<OrganizationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "local_timestamp::serialize")]
    add_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinned_to_lead_flag: Option<Flag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinned_to_deal_flag: Option<Flag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinned_to_organization_flag: Option<Flag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinned_to_person_flag: Option<Flag>,
    #[serde(skip)]
    request: RequestOptions,
}

impl UpdateNoteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn lead_id(mut self, id: LeadId) -> Self {
        self.lead_id = Some(id);
        self
    }

    pub fn deal_id(mut self, id: DealId) -> Self {
        self.deal_id = Some(id);
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

    pub fn user_id(mut self, id: UserId) -> Self {
        self.user_id = Some(id);
        self
    }

    pub fn add_time(mut self, at: NaiveDateTime) -> Self {
        self.add_time = Some(at);
        self
    }

    pub fn pinned_to_lead_flag(mut self, pinned: bool) -> Self {
        self.pinned_to_lead_flag = Some(Flag(pinned));
        self
    }

    pub fn pinned_to_deal_flag(mut self, pinned: bool) -> Self {
        self.pinned_to_deal_flag = Some(Flag(pinned));
        self
    }

    pub fn pinned_to_organization_flag(mut self, pinned: bool) -> Self {
        self.pinned_to_organization_flag = Some(Flag(pinned));
        self
    }

    pub fn pinned_to_person_flag(mut self, pinned: bool) -> Self {
        self.pinned_to_person_flag = Some(Flag(pinned));
        self
    }
}

impl Validate for UpdateNoteOptions {
    const OPERATION: &'static str = "update note";

    fn violations(&self) -> Vec<String> {
        Vec::new()
    }
}

impl WithRequestOptions for UpdateNoteOptions {
    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn request_options_mut(&mut self) -> &mut RequestOptions {
        &mut self.request
    }
}

pub struct Notes<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport> Notes<'a, T> {
    pub(crate) fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, opts: ListNotesOptions) -> Result<(Vec<Note>, Option<Pagination>), Error> {
        let call = Call::get("notes", &opts.request).query(&opts)?;
        self.client.fetch_list(call)
    }

    pub fn get(&self, id: NoteId, opts: RequestOptions) -> Result<Note, Error> {
        self.client.fetch(Call::get(format!("notes/{id}"), &opts))
    }

    pub fn create(&self, opts: CreateNoteOptions) -> Result<Note, Error> {
        let call = Call::new(HttpMethod::Post, "notes", &opts.request).json(&opts)?;
        self.client.fetch(call)
    }

    pub fn update(&self, id: NoteId, opts: UpdateNoteOptions) -> Result<Note, Error> {
        let call = Call::new(HttpMethod::Put, format!("notes/{id}"), &opts.request).json(&opts)?;
        self.client.fetch(call)
    }

    /// Notes answer a delete with a bare boolean rather than the id.
    pub fn delete(&self, id: NoteId, opts: RequestOptions) -> Result<bool, Error> {
        let response = self.client.call(Call::delete(format!("notes/{id}"), &opts))?;
        envelope::decode_success(&response)
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
    fn create_payload_omits_unset_fields() {
        let opts = CreateNoteOptions::new().content("Hello");
        let body = serde_json::to_value(&opts).unwrap();
        assert_eq!(body, serde_json::json!({"content": "Hello"}));
    }

    #[test]
    fn pinned_flags_are_integers() {
        let opts = CreateNoteOptions::new()
            .content("x")
            .deal_id(1)
            .pinned_to_deal_flag(true)
            .pinned_to_person_flag(false);
        let body = serde_json::to_value(&opts).unwrap();
        assert_eq!(body["pinned_to_deal_flag"], 1);
        assert_eq!(body["pinned_to_person_flag"], 0);
    }

    #[test]
    fn add_time_uses_local_timestamp_format() {
        let at = NaiveDate::from_ymd_opt(2020, 2, 13)
            .and_then(|d| d.and_hms_opt(15, 31, 44))
            .unwrap();
        let body = serde_json::to_value(CreateNoteOptions::new().add_time(at)).unwrap();
        assert_eq!(body["add_time"], "2020-02-13 15:31:44");
    }

    #[test]
    fn create_requires_content_and_a_parent() {
        let violations = CreateNoteOptions::new().violations();
        assert_eq!(violations.len(), 2);
        let violations = CreateNoteOptions::new().content("x").violations();
        assert_eq!(
            violations,
            vec!["one of lead_id, deal_id, person_id, org_id is required".to_string()]
        );
        assert!(CreateNoteOptions::new().content("x").org_id(3).violations().is_empty());
    }

    #[test]
    fn invalid_create_never_reaches_transport() {
        let calls = Cell::new(0);
        let client = Client::new(ClientConfig::default(), |_: HttpRequest| {
            calls.set(calls.get() + 1);
            ok(r#"{"success":true,"data":{"id":1,"content":"x"}}"#)
        });
        let err = client.notes().create(CreateNoteOptions::new().content("orphan")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn create_sends_post_with_body() {
        let client = Client::new(
            ClientConfig::new("http://api.test/v1").with_api_token("t"),
            |req: HttpRequest| {
                assert_eq!(req.method, HttpMethod::Post);
                assert_eq!(req.path, "http://api.test/v1/notes");
                assert_eq!(req.query_value("api_token"), Some("t"));
                let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(body, serde_json::json!({"content": "Hello", "deal_id": 9}));
                ok(r#"{"success":true,"data":{"id":5,"content":"Hello","deal_id":9}}"#)
            },
        );
        let note = client
            .notes()
            .create(CreateNoteOptions::new().content("Hello").deal_id(9))
            .unwrap();
        assert_eq!(note.id, 5);
        assert_eq!(note.deal_id, Some(9));
    }

    #[test]
    fn list_passes_filters_as_query() {
        let client = Client::new(ClientConfig::default(), |req: HttpRequest| {
            assert_eq!(req.query_value("deal_id"), Some("4"));
            assert_eq!(req.query_value("start_date"), Some("2020-01-01"));
            assert_eq!(req.query_value("pinned_to_deal_flag"), Some("1"));
            assert!(req.query_value("person_id").is_none());
            assert!(req.body.is_none());
            ok(r#"{"success":true,"data":[{"id":1,"content":"a","add_time":"2019-12-09 13:59:21"}],"additional_data":{"pagination":{"start":0,"limit":100,"more_items_in_collection":false}}}"#)
        });
        let (notes, page) = client
            .notes()
            .list(
                ListNotesOptions::new()
                    .deal_id(4)
                    .start_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
                    .pinned_to_deal_flag(true),
            )
            .unwrap();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].add_time.is_some());
        assert_eq!(page.map(|p| p.limit), Some(100));
    }

    #[test]
    fn list_rejects_inverted_date_range() {
        let opts = ListNotesOptions::new()
            .start_date(NaiveDate::from_ymd_opt(2021, 1, 2).unwrap())
            .end_date(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!(opts.violations().len(), 1);
    }

    #[test]
    fn unparseable_add_time_fails_decoding() {
        let client = Client::new(ClientConfig::default(), |_: HttpRequest| {
            ok(r#"{"success":true,"data":{"id":1,"content":"a","add_time":"last tuesday"}}"#)
        });
        let err = client.notes().get(1, RequestOptions::new()).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn delete_returns_boolean_data() {
        let client = Client::new(ClientConfig::default(), |req: HttpRequest| {
            assert_eq!(req.method, HttpMethod::Delete);
            assert!(req.path.ends_with("/notes/12"));
            ok(r#"{"success":true,"data":true}"#)
        });
        assert!(client.notes().delete(12, RequestOptions::new()).unwrap());
    }
}
