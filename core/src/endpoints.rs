//! Typed calls for the backend routes the web app uses.

use crate::api::{Api, PostBody, RequestConfig};
use crate::error::ApiError;
use crate::form_data::FormData;
use crate::http::{HttpMethod, UploadProgress};
use crate::transport::Transport;
use crate::types::{
    BatchIds, Contact, ContactFiles, ContactSubmission, CurrentUser, Event, EventWithContacts,
    Page, PassportSubmission, UploadedFiles,
};

/// Paging for listing endpoints; `None` leaves the backend default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub active_only: bool,
}

impl PageQuery {
    fn to_config(&self) -> RequestConfig {
        let mut config = RequestConfig::new();
        if let Some(skip) = self.skip {
            config = config.query("skip", skip);
        }
        if let Some(limit) = self.limit {
            config = config.query("limit", limit);
        }
        if self.active_only {
            config = config.query("active_only", true);
        }
        config
    }
}

/// Filters for the contact listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactQuery {
    pub exhibition_id: Option<i64>,
    pub search: Option<String>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl ContactQuery {
    fn to_config(&self) -> RequestConfig {
        let mut config = RequestConfig::new();
        if let Some(id) = self.exhibition_id {
            config = config.query("exhibition_id", id);
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            config = config.query("search", search);
        }
        if let Some(skip) = self.skip {
            config = config.query("skip", skip);
        }
        if let Some(limit) = self.limit {
            config = config.query("limit", limit);
        }
        config
    }
}

impl<T: Transport> Api<T> {
    pub fn list_events(&self, query: &PageQuery) -> Result<Page<Event>, ApiError> {
        self.get("/exhibitions/", Some(&query.to_config()))
    }

    /// An event with every contact collected at it.
    pub fn event_contacts(&self, event_id: i64) -> Result<EventWithContacts, ApiError> {
        self.get(&format!("/exhibitions/{event_id}"), None)
    }

    pub fn list_contacts(&self, query: &ContactQuery) -> Result<Page<Contact>, ApiError> {
        self.get("/contacts/", Some(&query.to_config()))
    }

    pub fn get_contact(&self, contact_id: i64) -> Result<Contact, ApiError> {
        self.get(&format!("/contacts/{contact_id}"), None)
    }

    pub fn submit_contact(&self, submission: &ContactSubmission) -> Result<Contact, ApiError> {
        self.post("/contacts/", Some(&PostBody::Contact(submission.clone())), None)
    }

    pub fn submit_passport(&self, submission: &PassportSubmission) -> Result<Contact, ApiError> {
        self.post("/contacts/", Some(&PostBody::Passport(submission.clone())), None)
    }

    pub fn update_contact(
        &self,
        contact_id: i64,
        submission: &ContactSubmission,
    ) -> Result<Contact, ApiError> {
        self.put(&format!("/contacts/{contact_id}"), Some(submission))
    }

    /// Mark a contact as checked (or not) by an admin, optionally with notes.
    pub fn validate_contact(
        &self,
        contact_id: i64,
        is_validated: bool,
        notes: Option<&str>,
    ) -> Result<Contact, ApiError> {
        let mut config = RequestConfig::new().query("is_validated", is_validated);
        if let Some(notes) = notes {
            config = config.query("notes", notes);
        }
        self.patch(&format!("/contacts/{contact_id}/validate"), Some(&config))
    }

    pub fn delete_contact(&self, contact_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/contacts/{contact_id}"), None)
    }

    pub fn delete_contacts(&self, ids: &BatchIds) -> Result<(), ApiError> {
        self.delete("/contacts/", Some(ids))
    }

    /// Questionnaire template served by the backend, passed through as JSON.
    pub fn questionnaire(&self) -> Result<serde_json::Value, ApiError> {
        self.get("/contacts/questionnaire", None)
    }

    /// Upload business cards or documents for a contact.
    pub fn upload_contact_files(
        &self,
        contact_id: i64,
        files: FormData,
        on_progress: &mut dyn FnMut(UploadProgress),
    ) -> Result<UploadedFiles, ApiError> {
        let path = format!("/contacts/{contact_id}/files");
        let response =
            self.post_with_progress(&path, Some(&PostBody::FormData(files)), None, on_progress)?;
        let uploaded: Option<UploadedFiles> = self.decode(HttpMethod::Post, &path, &response)?;
        Ok(uploaded.unwrap_or_else(|| UploadedFiles::none(contact_id)))
    }

    pub fn contact_files(&self, contact_id: i64) -> Result<ContactFiles, ApiError> {
        self.get(&format!("/contacts/{contact_id}/files"), None)
    }

    pub fn delete_contact_file(&self, contact_id: i64, file_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/contacts/{contact_id}/files/{file_id}"), None)
    }

    /// Fetch the user behind the current session and record its admin flag.
    pub fn current_user(&self) -> Result<CurrentUser, ApiError> {
        let user: CurrentUser = self.get("/users/me", None)?;
        self.session().set_admin(user.is_admin);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use crate::api::tests::{api, ScriptedTransport};
    use crate::http::{HttpMethod, RequestBody};
    use crate::types::Questionnaire;

    use super::*;

    const CONTACT: &str = r#"{"id":11,"title":"Acme","description":null,"full_name":"Jane Roe",
        "position":"Buyer","email":"jane@acme.test","phone_number":"123","exhibition_id":1,
        "questionnaire":{"product_type":[],"manufacturer":[],"contact_type":"ДРУГОЕ"}}"#;

    const EMPTY_PAGE: &str = r#"{"total":0,"skip":0,"limit":100,"items":[]}"#;

    #[test]
    fn list_events_sends_paging() {
        let (api, _) = api(ScriptedTransport::default().respond(
            200,
            r#"{"total":1,"skip":0,"limit":10,"items":[{"id":1,"title":"Expo","start_date":"2025-04-14","end_date":"2025-04-17"}]}"#,
        ));
        let page = api
            .list_events(&PageQuery {
                skip: Some(0),
                limit: Some(10),
                active_only: true,
            })
            .unwrap();
        assert_eq!(page.items[0].title, "Expo");
        let request = api.transport().last_request();
        assert_eq!(request.url, "http://backend.test/exhibitions/");
        assert_eq!(
            request.query,
            [("skip", "0"), ("limit", "10"), ("active_only", "true")]
                .map(|(k, v)| (k.to_string(), v.to_string()))
        );
    }

    #[test]
    fn default_page_query_adds_nothing() {
        let (api, _) = api(ScriptedTransport::default().respond(200, EMPTY_PAGE));
        api.list_events(&PageQuery::default()).unwrap();
        let request = api.transport().last_request();
        assert_eq!(request.url, "http://backend.test/exhibitions/");
        assert!(request.query.is_empty());
    }

    #[test]
    fn list_contacts_filters_by_event_and_skips_blank_search() {
        let (api, _) = api(ScriptedTransport::default().respond(200, EMPTY_PAGE));
        api.list_contacts(&ContactQuery {
            exhibition_id: Some(4),
            search: Some(String::new()),
            ..ContactQuery::default()
        })
        .unwrap();
        let request = api.transport().last_request();
        assert_eq!(request.url, "http://backend.test/contacts/");
        assert_eq!(request.query, vec![("exhibition_id".to_string(), "4".to_string())]);
    }

    #[test]
    fn event_contacts_hits_event_route() {
        let (api, _) = api(ScriptedTransport::default().respond(
            200,
            r#"{"id":2,"title":"Expo","start_date":"2025-04-14","end_date":"2025-04-17","contacts":[]}"#,
        ));
        let event = api.event_contacts(2).unwrap();
        assert_eq!(event.event.id, 2);
        assert_eq!(api.transport().last_request().url, "http://backend.test/exhibitions/2");
    }

    #[test]
    fn submit_and_update_use_contact_routes() {
        let transport = ScriptedTransport::default().respond(201, CONTACT).respond(200, CONTACT);
        let (api, _) = api(transport);
        let submission = ContactSubmission {
            questionnaire: Questionnaire::from_selection(&[], &[], 4),
            ..ContactSubmission::default()
        };

        let created = api.submit_contact(&submission).unwrap();
        assert_eq!(created.id, 11);
        let post = api.transport().last_request();
        assert_eq!(post.method, HttpMethod::Post);
        assert_eq!(post.url, "http://backend.test/contacts/");

        api.update_contact(created.id, &ContactSubmission::from(&created)).unwrap();
        let put = api.transport().last_request();
        assert_eq!(put.method, HttpMethod::Put);
        assert_eq!(put.url, "http://backend.test/contacts/11");
    }

    #[test]
    fn submit_passport_posts_flat_body() {
        let (api, _) = api(ScriptedTransport::default().respond(201, CONTACT));
        api.submit_passport(&PassportSubmission::default()).unwrap();
        let Some(RequestBody::Json(json)) = api.transport().last_request().body else {
            panic!("expected JSON body");
        };
        let sent: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(sent.get("questionaire").is_some());
        assert!(sent.get("full_name").is_some());
    }

    #[test]
    fn delete_routes() {
        let (api, _) = api(ScriptedTransport::default().respond(204, "").respond(204, ""));
        api.delete_contact(3).unwrap();
        assert_eq!(api.transport().last_request().url, "http://backend.test/contacts/3");

        api.delete_contacts(&BatchIds { ids: vec![5, 6] }).unwrap();
        let request = api.transport().last_request();
        assert_eq!(request.url, "http://backend.test/contacts/");
        assert_eq!(request.body, Some(RequestBody::Json(r#"{"ids":[5,6]}"#.to_string())));
    }

    #[test]
    fn current_user_updates_admin_flag() {
        let (api, _) = api(ScriptedTransport::default().respond(
            200,
            r#"{"id":1,"full_name":"Admin","department":null,"position":null,"is_admin":true}"#,
        ));
        assert!(!api.session().is_admin());
        let user = api.current_user().unwrap();
        assert!(user.is_admin);
        assert!(api.session().is_admin());
    }

    #[test]
    fn failed_current_user_keeps_admin_flag() {
        let (api, _) =
            api(ScriptedTransport::default().respond(401, r#"{"detail":"Требуется авторизация"}"#));
        api.session().set_admin(true);
        assert!(api.current_user().is_err());
        assert!(api.session().is_admin());
    }

    #[test]
    fn upload_reports_progress_and_parses_files() {
        let (api, _) = api(ScriptedTransport::default().respond(
            200,
            r#"{"message":"ok","files":[{"id":1,"name":"card.jpg","type":"business_card_front","url":"/uploads/contacts/x.jpg"}],"contact_id":11}"#,
        ));
        let mut calls = 0;
        let uploaded = api
            .upload_contact_files(
                11,
                FormData::new().file(
                    "business_card_front",
                    "card.jpg",
                    "image/jpeg",
                    vec![0xFF, 0xD8],
                ),
                &mut |_| calls += 1,
            )
            .unwrap();
        assert_eq!(calls, 2);
        assert_eq!(uploaded.files[0].kind, "business_card_front");
        assert_eq!(
            api.transport().last_request().url,
            "http://backend.test/contacts/11/files"
        );
    }

    #[test]
    fn upload_with_empty_body_reports_no_files() {
        let (api, _) = api(ScriptedTransport::default().respond(204, ""));
        let uploaded = api
            .upload_contact_files(11, FormData::new().text("note", "x"), &mut |_| {})
            .unwrap();
        assert_eq!(uploaded, UploadedFiles::none(11));
    }

    #[test]
    fn upload_with_non_json_body_is_a_silent_decode_error() {
        let (api, notifier) = api(ScriptedTransport::default().respond(200, "Upload complete"));
        let err = api
            .upload_contact_files(11, FormData::new().text("note", "x"), &mut |_| {})
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
        assert!(notifier.is_empty());
    }

    #[test]
    fn validate_contact_patches_with_query() {
        let transport = ScriptedTransport::default().respond(200, CONTACT).respond(200, CONTACT);
        let (api, _) = api(transport);
        api.validate_contact(11, true, Some("checked at booth")).unwrap();
        let request = api.transport().last_request();
        assert_eq!(request.method, HttpMethod::Patch);
        assert_eq!(request.url, "http://backend.test/contacts/11/validate");
        assert_eq!(request.query_param("is_validated"), Some("true"));
        assert_eq!(request.query_param("notes"), Some("checked at booth"));

        api.validate_contact(11, false, None).unwrap();
        let request = api.transport().last_request();
        assert_eq!(request.query_param("is_validated"), Some("false"));
        assert_eq!(request.query_param("notes"), None);
    }

    #[test]
    fn contact_files_routes() {
        let listing = r#"{"contact_id":11,"total_files":0,"files":[]}"#;
        let (api, _) = api(ScriptedTransport::default().respond(200, listing).respond(204, ""));

        let files = api.contact_files(11).unwrap();
        assert_eq!(files.total_files, 0);
        let request = api.transport().last_request();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "http://backend.test/contacts/11/files");

        api.delete_contact_file(11, 5).unwrap();
        let request = api.transport().last_request();
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(request.url, "http://backend.test/contacts/11/files/5");
        assert!(request.body.is_none());
    }
}
