use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Questionnaire {
    pub product_type: Vec<String>,
    pub manufacturer: Vec<String>,
    pub contact_type: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exhibition {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub preview_file_id: Option<i64>,
    #[serde(skip)]
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts_count: Option<u64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub full_name: String,
    pub position: String,
    pub email: String,
    pub phone_number: String,
    pub city: Option<String>,
    pub questionnaire: Questionnaire,
    pub exhibition_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
    pub is_validated: bool,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Contact {
    pub fn summary(&self) -> ContactSummary {
        ContactSummary {
            id: self.id,
            title: self.title.clone(),
            full_name: self.full_name.clone(),
            position: self.position.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            created_at: self.created_at,
        }
    }

    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [
            Some(&self.title),
            Some(&self.full_name),
            Some(&self.position),
            Some(&self.email),
            Some(&self.phone_number),
            self.description.as_ref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContactSummary {
    pub id: i64,
    pub title: String,
    pub full_name: String,
    pub position: String,
    pub email: String,
    pub phone_number: String,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExhibitionWithContacts {
    #[serde(flatten)]
    pub exhibition: Exhibition,
    pub contacts: Vec<ContactSummary>,
}

/// Body of `POST /contacts/`; accepts both the contact and the passport form.
#[derive(Debug, Deserialize)]
pub struct ContactCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub full_name: String,
    pub position: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, alias = "questionaire")]
    pub questionnaire: Questionnaire,
    #[serde(default)]
    pub exhibition_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub full_name: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub questionnaire: Option<Questionnaire>,
    pub notes: Option<String>,
    pub is_validated: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchIds {
    pub ids: Vec<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn slice(all: Vec<T>, skip: u64, limit: u64) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect();
        Self {
            total,
            skip,
            limit,
            items,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub is_admin: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub format: String,
    pub created_at: NaiveDateTime,
}

impl StoredFile {
    pub fn listing_entry(&self) -> ContactFileEntry {
        ContactFileEntry {
            file_id: self.id,
            name: self.name.clone(),
            kind: self.kind.clone(),
            url: self.url.clone(),
            format: self.format.clone(),
            created_at: self.created_at,
        }
    }
}

/// `GET /contacts/{id}/files` names the id `file_id`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContactFileEntry {
    pub file_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub format: String,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContactFileList {
    pub contact_id: i64,
    pub total_files: u64,
    pub files: Vec<ContactFileEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadResult {
    pub message: String,
    pub files: Vec<StoredFile>,
    pub contact_id: i64,
}

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
