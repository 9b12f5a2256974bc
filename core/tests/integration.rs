//! Full contact lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises the client over
//! real HTTP through `UreqTransport`. Validates identity headers, request
//! encoding, response parsing and error normalization end to end.

use std::sync::Arc;

use contacts_core::{
    Api, ApiError, BatchIds, ContactQuery, ContactSubmission, FormData, PageQuery, Questionnaire,
    RecordingNotifier, SessionStore, UreqTransport,
};
use contacts_core::notify::SERVER_ERROR_MESSAGE;

fn start_server() -> String {
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

    format!("http://{addr}")
}

fn client(base_url: &str) -> (Api<UreqTransport>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let api = Api::new(base_url, SessionStore::default(), UreqTransport::new())
        .with_notifier(notifier.clone());
    (api, notifier)
}

fn submission() -> ContactSubmission {
    ContactSubmission {
        title: "Integration Ltd".to_string(),
        description: "stand B12".to_string(),
        full_name: "Иван Петров".to_string(),
        position: "Главный инженер".to_string(),
        email: "Ivan@Example.com".to_string(),
        phone_number: "+7 (845) 200-00-00".to_string(),
        city: "Саратов".to_string(),
        questionnaire: Questionnaire::from_selection(&[1, 5], &[1], 2),
    }
}

#[test]
fn contact_lifecycle() {
    let base = start_server();
    let (api, notifier) = client(&base);

    // Step 1: identity from headers; placeholder user is not an admin.
    let me = api.current_user().unwrap();
    assert_eq!(me.id, 2366);
    assert!(!api.session().is_admin());

    // Step 2: events visible to a regular user.
    let events = api.list_events(&PageQuery::default()).unwrap();
    assert_eq!(events.total, 1);
    let event_id = events.items[0].id;

    // Step 3: submit a contact.
    let created = api.submit_contact(&submission()).unwrap();
    assert_eq!(created.email, "ivan@example.com");
    assert_eq!(created.exhibition_id, Some(event_id));
    assert_eq!(
        created.questionnaire.as_ref().unwrap().product_type,
        ["краны шаровые", "задвижки"]
    );

    // Step 4: fetch and edit it.
    let fetched = api.get_contact(created.id).unwrap();
    assert_eq!(fetched, created);
    let mut edit = ContactSubmission::from(&fetched);
    edit.position = "Директор".to_string();
    let updated = api.update_contact(created.id, &edit).unwrap();
    assert_eq!(updated.position, "Директор");

    // Step 5: the author sees it in the listing.
    let mine = api
        .list_contacts(&ContactQuery {
            exhibition_id: Some(event_id),
            ..ContactQuery::default()
        })
        .unwrap();
    assert_eq!(mine.total, 1);
    // non-ASCII search goes through the transport's query encoding
    let found = api
        .list_contacts(&ContactQuery {
            search: Some("Иван Петров".to_string()),
            ..ContactQuery::default()
        })
        .unwrap();
    assert_eq!(found.total, 1);

    // Step 6: upload a business card.
    let mut progress = Vec::new();
    let uploaded = api
        .upload_contact_files(
            created.id,
            FormData::new().file(
                "business_card_front",
                "card.jpg",
                "image/jpeg",
                vec![0xFF, 0xD8, 0xFF],
            ),
            &mut |p| progress.push(p),
        )
        .unwrap();
    assert_eq!(uploaded.contact_id, created.id);
    assert_eq!(uploaded.files.len(), 1);
    assert_eq!(progress.last().unwrap().fraction(), Some(1.0));

    // Step 7: switch to the admin session and read the event with contacts.
    api.session().set_user_data("1", "admin-token");
    let admin = api.current_user().unwrap();
    assert_eq!(admin.id, 1);
    assert!(api.session().is_admin());
    let event = api.event_contacts(event_id).unwrap();
    assert_eq!(event.contacts.len(), 1);
    assert_eq!(event.contacts[0].id, created.id);

    // Step 7b: admin review of the contact and its files.
    let validated = api
        .validate_contact(created.id, true, Some("визитка проверена"))
        .unwrap();
    assert!(validated.is_validated);
    assert_eq!(validated.notes.as_deref(), Some("визитка проверена"));
    let files = api.contact_files(created.id).unwrap();
    assert_eq!(files.total_files, 1);
    assert_eq!(files.files[0].format, "jpg");
    api.delete_contact_file(created.id, files.files[0].file_id)
        .unwrap();
    assert_eq!(api.contact_files(created.id).unwrap().total_files, 0);

    // Step 8: delete, then the contact is gone.
    api.delete_contact(created.id).unwrap();
    let err = api.get_contact(created.id).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Step 9: batch delete tolerates unknown ids.
    let second = api.submit_contact(&submission()).unwrap();
    api.delete_contacts(&BatchIds { ids: vec![second.id, 12345] }).unwrap();
    assert!(matches!(api.get_contact(second.id), Err(ApiError::NotFound)));

    // The 404s above carried a string detail, not an array: no notifications.
    assert!(notifier.is_empty());
}

#[test]
fn validation_error_reaches_the_notifier() {
    let base = start_server();
    let (api, notifier) = client(&base);

    let mut bad = submission();
    bad.phone_number = "not a phone".to_string();
    let err = api.submit_contact(&bad).unwrap_err();

    match &err {
        ApiError::Backend { status, message, detail } => {
            assert_eq!(*status, 422);
            assert_eq!(message, "Номер телефона содержит недопустимые символы");
            assert_eq!(detail.detail[0].loc, ["body", "phone_number"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let raised = notifier.drain();
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].message, "Номер телефона содержит недопустимые символы");
}

#[test]
fn bare_server_error_raises_generic_notification() {
    let base = start_server();
    let (api, notifier) = client(&base);

    let err = api.get::<serde_json::Value>("/fail", None).unwrap_err();
    assert!(matches!(err, ApiError::Server { .. }));
    let raised = notifier.drain();
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].message, SERVER_ERROR_MESSAGE);
}

#[test]
fn missing_identity_is_a_silent_http_error() {
    let base = start_server();
    let (api, notifier) = client(&base);
    api.session().set_user_data("", "");

    let err = api.list_events(&PageQuery::default()).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 401, .. }));
    assert!(notifier.is_empty());
}

#[test]
fn non_admin_cannot_validate() {
    let base = start_server();
    let (api, notifier) = client(&base);
    let created = api.submit_contact(&submission()).unwrap();

    let err = api.validate_contact(created.id, true, None).unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(!api.get_contact(created.id).unwrap().is_validated);
    assert!(notifier.is_empty());
}

#[test]
fn non_admin_cannot_open_event_contacts() {
    let base = start_server();
    let (api, _) = client(&base);

    let err = api.event_contacts(1).unwrap_err();
    assert_eq!(err.status(), Some(403));
}
