//! Full CRUD lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the client over real
//! HTTP through `UreqTransport`. Checks that request building, auth, the
//! envelope decoder and pagination agree with an actual server.

use chrono::NaiveDate;
use pipedrive_core::resources::deals::{CreateDealOptions, DealStatus, ListDealsOptions, UpdateDealOptions};
use pipedrive_core::resources::notes::{CreateNoteOptions, ListNotesOptions, UpdateNoteOptions};
use pipedrive_core::resources::organizations::OrganizationOptions;
use pipedrive_core::{
    ApiError, Client, ClientConfig, Error, RequestOption, RequestOptions, UreqTransport,
    WithRequestOptions,
};

fn start_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn client(addr: std::net::SocketAddr) -> Client<UreqTransport> {
    let config = ClientConfig::new(&format!("http://{addr}/v1/")).with_api_token("integration");
    Client::new(config, UreqTransport::new())
}

#[test]
fn notes_lifecycle() {
    let client = client(start_server());
    let notes = client.notes();

    // Empty collection decodes as an empty list, with pagination.
    let (listed, page) = notes.list(ListNotesOptions::new()).unwrap();
    assert!(listed.is_empty());
    assert_eq!(page.map(|p| p.more_items_in_collection), Some(false));

    // Create.
    let created = notes
        .create(
            CreateNoteOptions::new()
                .content("Discussed renewal")
                .deal_id(7)
                .pinned_to_deal_flag(true),
        )
        .unwrap();
    assert_eq!(created.content, "Discussed renewal");
    assert_eq!(created.deal_id, Some(7));
    assert!(created.add_time.is_some());

    // Get.
    let fetched = notes.get(created.id, RequestOptions::new()).unwrap();
    assert_eq!(fetched, created);

    // Update.
    let updated = notes
        .update(created.id, UpdateNoteOptions::new().content("Renewal signed"))
        .unwrap();
    assert_eq!(updated.content, "Renewal signed");
    assert_eq!(updated.deal_id, Some(7));

    // Delete answers with a bare boolean.
    assert!(notes.delete(created.id, RequestOptions::new()).unwrap());

    // Get after delete is a 404 API error.
    let err = notes.get(created.id, RequestOptions::new()).unwrap_err();
    match err {
        Error::Api(api) => {
            assert!(api.is_not_found());
            assert_eq!(api.message.as_deref(), Some("Note not found"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[test]
fn deals_paginate_and_bulk_delete() {
    let client = client(start_server());
    let deals = client.deals();

    let mut ids = Vec::new();
    for title in ["Alpha", "Beta", "Gamma"] {
        let deal = deals
            .create(
                CreateDealOptions::new()
                    .title(title)
                    .value("250")
                    .currency("EUR")
                    .expected_close_date(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()),
            )
            .unwrap();
        assert_eq!(deal.value, Some(250.0));
        assert_eq!(deal.status, Some(DealStatus::Open));
        ids.push(deal.id);
    }

    // Walk the collection two at a time.
    let mut seen = Vec::new();
    let mut start = 0;
    loop {
        let (page, pagination) = deals.list(ListDealsOptions::new().start(start).limit(2)).unwrap();
        seen.extend(page.into_iter().map(|d| d.title));
        match pagination.and_then(|p| p.next_page_start()) {
            Some(next) => start = next,
            None => break,
        }
    }
    assert_eq!(seen, vec!["Alpha", "Beta", "Gamma"]);

    let won = deals
        .update(ids[0], UpdateDealOptions::new().status(DealStatus::Won))
        .unwrap();
    assert_eq!(won.status, Some(DealStatus::Won));
    assert_eq!(
        won.expected_close_date,
        NaiveDate::from_ymd_opt(2024, 6, 30)
    );

    assert_eq!(deals.delete(ids[0], RequestOptions::new()).unwrap(), ids[0]);
    let removed = deals.delete_bulk(ids.clone(), RequestOptions::new()).unwrap();
    assert_eq!(removed, ids[1..].to_vec());
}

#[test]
fn caller_options_override_auth_query() {
    let client = client(start_server());

    // An empty token supplied by the caller wins over the configured one.
    let opts = OrganizationOptions::new()
        .name("Acme")
        .with(RequestOption::query("api_token", ""));
    let err = client.organizations().create(opts).unwrap_err();
    assert!(matches!(err, Error::Api(ApiError { status: 401, .. })));

    let org = client
        .organizations()
        .create(OrganizationOptions::new().name("Acme"))
        .unwrap();
    assert_eq!(org.name, "Acme");
}

#[test]
fn missing_record_surfaces_as_api_error() {
    let client = client(start_server());

    let err = client
        .deals()
        .get(404, RequestOptions::new().with(RequestOption::header("x-request-id", "it-1")))
        .unwrap_err();
    let Error::Api(api) = err else {
        panic!("expected API error");
    };
    assert_eq!(api.status, 404);
    assert!(api.body.contains("Deal not found"));
    assert!(api.error_info.is_some());
}

#[test]
fn connection_failure_is_transport_error() {
    // Bind and drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let err = client(addr)
        .notes()
        .get(1, RequestOptions::new())
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
}
