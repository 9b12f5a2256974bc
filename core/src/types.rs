//! Domain DTOs exchanged with the exhibition contacts backend.
//!
//! # Design
//! Submissions are what the contact form sends; the remaining types mirror
//! what the backend returns for events, contacts and the current user. They
//! are defined independently from the mock-server crate so integration tests
//! catch schema drift between the two.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Structured answers attached to a contact submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Questionnaire {
    pub product_type: Vec<String>,
    pub manufacturer: Vec<String>,
    pub contact_type: String,
}

/// Body of a contact create or update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub title: String,
    pub description: String,
    pub full_name: String,
    pub position: String,
    pub email: String,
    pub phone_number: String,
    pub city: String,
    pub questionnaire: Questionnaire,
}

/// Free-text fields of the contact form, keyed like the passport descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passport {
    pub title: String,
    pub full_name: String,
    pub city: String,
    pub position: String,
    pub phone_number: String,
    pub email: String,
}

/// Passport fields plus questionnaire, as posted straight from the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassportSubmission {
    #[serde(flatten)]
    pub passport: Passport,
    /// The form posts this key with its historical spelling.
    #[serde(rename = "questionaire")]
    pub questionnaire: Questionnaire,
}

/// Ids for a batch delete, sent in the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchIds {
    pub ids: Vec<i64>,
}

/// One page of a listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
    pub items: Vec<T>,
}

/// An exhibition ("event") contacts are collected at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub preview_file_id: Option<i64>,
    #[serde(default)]
    pub contacts_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Event {
    /// Whether `day` falls inside the event's date range, ends included.
    pub fn is_running_on(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

/// Contact row as listed under an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSummary {
    pub id: i64,
    pub title: String,
    pub full_name: String,
    pub position: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// An event together with the contacts collected at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWithContacts {
    #[serde(flatten)]
    pub event: Event,
    #[serde(default)]
    pub contacts: Vec<ContactSummary>,
}

/// Full contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub full_name: String,
    pub position: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub questionnaire: Option<Questionnaire>,
    #[serde(default)]
    pub exhibition_id: Option<i64>,
    #[serde(default)]
    pub is_validated: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl From<&Contact> for ContactSubmission {
    /// Pre-fill the edit form from a stored contact.
    fn from(contact: &Contact) -> Self {
        Self {
            title: contact.title.clone(),
            description: contact.description.clone().unwrap_or_default(),
            full_name: contact.full_name.clone(),
            position: contact.position.clone(),
            email: contact.email.clone(),
            phone_number: contact.phone_number.clone(),
            city: contact.city.clone().unwrap_or_default(),
            questionnaire: contact.questionnaire.clone().unwrap_or_default(),
        }
    }
}

/// The user identified by the current session headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// A file stored against a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// Result of a contact file upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFiles {
    #[serde(default)]
    pub message: String,
    pub files: Vec<UploadedFile>,
    pub contact_id: i64,
}

impl UploadedFiles {
    /// What an upload answered with an empty body amounts to.
    pub fn none(contact_id: i64) -> Self {
        Self {
            message: String::new(),
            files: Vec::new(),
            contact_id,
        }
    }
}

/// One entry of a contact's file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFile {
    pub file_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Every file attached to a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFiles {
    pub contact_id: i64,
    pub total_files: u64,
    pub files: Vec<ContactFile>,
}
