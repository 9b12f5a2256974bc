//! In-memory stand-in for the exhibition contacts backend.
//!
//! Reproduces the HTTP contract the client relies on: identity headers,
//! paginated listings, contact CRUD, multipart uploads and FastAPI-style
//! error bodies. Nothing is persisted.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub mod error;
pub mod model;

pub use error::MockError;
pub use model::*;

/// The user id that gets admin rights.
pub const ADMIN_USER_ID: i64 = 1;

const MAX_FILES_PER_CONTACT: usize = 3;
const FILE_FIELDS: [&str; 3] = ["business_card_front", "business_card_back", "document"];

#[derive(Debug, Default)]
pub struct Db {
    pub exhibitions: BTreeMap<i64, Exhibition>,
    pub contacts: BTreeMap<i64, Contact>,
    pub files: BTreeMap<i64, Vec<StoredFile>>,
    next_contact_id: i64,
    next_file_id: i64,
}

impl Db {
    /// One active exhibition, no contacts.
    pub fn seeded() -> Self {
        let created = model::now();
        let mut db = Db {
            next_contact_id: 1,
            next_file_id: 1,
            ..Db::default()
        };
        db.exhibitions.insert(
            1,
            Exhibition {
                id: 1,
                title: "Нефтегаз-2025".to_string(),
                description: Some("Международная выставка".to_string()),
                start_date: NaiveDate::from_ymd_opt(2025, 4, 14).unwrap_or_default(),
                end_date: NaiveDate::from_ymd_opt(2025, 4, 17).unwrap_or_default(),
                preview_file_id: None,
                is_active: true,
                contacts_count: None,
                created_at: created,
                updated_at: created,
            },
        );
        db
    }

    fn active_exhibition(&self) -> Option<i64> {
        self.exhibitions.values().find(|e| e.is_active).map(|e| e.id)
    }

    fn contacts_of(&self, exhibition_id: i64) -> impl Iterator<Item = &Contact> {
        self.contacts
            .values()
            .filter(move |c| c.exhibition_id == Some(exhibition_id))
    }
}

pub type SharedDb = Arc<RwLock<Db>>;

/// Caller identity taken from the `session_id` / `user_id` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub session_id: String,
}

impl Identity {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let session_id = headers.get("session_id")?.to_str().ok()?;
        let user_id = headers.get("user_id")?.to_str().ok()?.trim().parse().ok()?;
        if session_id.is_empty() {
            return None;
        }
        Some(Self {
            user_id,
            session_id: session_id.to_string(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.user_id == ADMIN_USER_ID
    }
}

fn require_auth(headers: &HeaderMap) -> Result<Identity, MockError> {
    Identity::from_headers(headers).ok_or(MockError::Unauthorized)
}

fn require_admin(headers: &HeaderMap) -> Result<Identity, MockError> {
    let identity = require_auth(headers)?;
    if identity.is_admin() {
        Ok(identity)
    } else {
        Err(MockError::Forbidden)
    }
}

pub fn app() -> Router {
    app_with(Arc::new(RwLock::new(Db::seeded())))
}

pub fn app_with(db: SharedDb) -> Router {
    Router::new()
        .route("/users/me", get(current_user))
        .route("/exhibitions/", get(list_exhibitions))
        .route("/exhibitions/{id}", get(get_exhibition))
        .route(
            "/contacts/",
            get(list_contacts).post(create_contact).delete(delete_contacts),
        )
        .route("/contacts/questionnaire", get(questionnaire))
        .route(
            "/contacts/{id}",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .route("/contacts/{id}/validate", patch(validate_contact))
        .route("/contacts/{id}/files", get(list_files).post(upload_files))
        .route("/contacts/{id}/files/{file_id}", axum::routing::delete(delete_file))
        .route("/fail", get(fail))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn current_user(headers: HeaderMap) -> Result<Json<User>, MockError> {
    let identity = require_auth(&headers)?;
    Ok(Json(User {
        id: identity.user_id,
        full_name: format!("Пользователь {}", identity.user_id),
        department: None,
        position: None,
        is_admin: identity.is_admin(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PageParams {
    pub skip: u64,
    pub limit: u64,
    pub active_only: bool,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
            active_only: false,
        }
    }
}

async fn list_exhibitions(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Exhibition>>, MockError> {
    let identity = require_auth(&headers)?;
    let db = db.read().await;

    let mut visible: Vec<Exhibition> = db
        .exhibitions
        .values()
        .filter(|e| !params.active_only || e.is_active)
        .filter(|e| {
            identity.is_admin()
                || e.is_active
                || db
                    .contacts_of(e.id)
                    .any(|c| c.author_id == Some(identity.user_id))
        })
        .cloned()
        .map(|mut e| {
            e.contacts_count = Some(db.contacts_of(e.id).count() as u64);
            e
        })
        .collect();
    visible.sort_by(|a, b| b.start_date.cmp(&a.start_date));

    Ok(Json(Page::slice(visible, params.skip, params.limit)))
}

async fn get_exhibition(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<ExhibitionWithContacts>, MockError> {
    require_admin(&headers)?;
    let db = db.read().await;
    let exhibition = db
        .exhibitions
        .get(&id)
        .cloned()
        .ok_or(MockError::NotFound("Выставка не найдена"))?;
    let contacts = db.contacts_of(id).map(Contact::summary).collect();
    Ok(Json(ExhibitionWithContacts {
        exhibition,
        contacts,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContactParams {
    pub exhibition_id: Option<i64>,
    pub search: Option<String>,
    pub skip: u64,
    pub limit: u64,
}

impl Default for ContactParams {
    fn default() -> Self {
        Self {
            exhibition_id: None,
            search: None,
            skip: 0,
            limit: 100,
        }
    }
}

async fn list_contacts(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Query(params): Query<ContactParams>,
) -> Result<Json<Page<Contact>>, MockError> {
    let identity = require_auth(&headers)?;
    let db = db.read().await;

    let mut found: Vec<Contact> = db
        .contacts
        .values()
        .filter(|c| identity.is_admin() || c.author_id == Some(identity.user_id))
        .filter(|c| params.exhibition_id.is_none() || c.exhibition_id == params.exhibition_id)
        .filter(|c| params.search.as_deref().map_or(true, |s| c.matches(s)))
        .cloned()
        .collect();
    found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    Ok(Json(Page::slice(found, params.skip, params.limit)))
}

/// Same rule as the backend: digits, whitespace and `-+().` only.
fn check_phone(phone: &str, min_digits: usize) -> Result<(), MockError> {
    let allowed = |c: char| c.is_ascii_digit() || c.is_whitespace() || "-+().".contains(c);
    if phone.is_empty() || !phone.chars().all(allowed) {
        return Err(MockError::Validation {
            field: "phone_number",
            msg: "Номер телефона содержит недопустимые символы".to_string(),
            input: phone.to_string(),
        });
    }
    if phone.chars().filter(char::is_ascii_digit).count() < min_digits {
        return Err(MockError::Validation {
            field: "phone_number",
            msg: "Номер телефона слишком короткий".to_string(),
            input: phone.to_string(),
        });
    }
    Ok(())
}

async fn create_contact(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(input): Json<ContactCreate>,
) -> Result<(StatusCode, Json<Contact>), MockError> {
    check_phone(&input.phone_number, 0)?;
    let author = Identity::from_headers(&headers);
    let mut db = db.write().await;

    let exhibition_id = match input.exhibition_id {
        Some(id) if db.exhibitions.contains_key(&id) => Some(id),
        Some(_) => return Err(MockError::NotFound("Выставка не найдена")),
        None => db.active_exhibition(),
    };

    let id = db.next_contact_id;
    db.next_contact_id += 1;
    let created = model::now();
    let contact = Contact {
        id,
        title: input.title,
        description: input.description,
        full_name: input.full_name,
        position: input.position,
        email: input.email.to_lowercase(),
        phone_number: input.phone_number,
        city: input.city,
        questionnaire: input.questionnaire,
        exhibition_id,
        author_id: author.map(|a| a.user_id),
        is_validated: false,
        notes: None,
        created_at: created,
        updated_at: created,
    };
    db.contacts.insert(id, contact.clone());
    tracing::debug!(id, ?exhibition_id, "contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn get_contact(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
) -> Result<Json<Contact>, MockError> {
    let db = db.read().await;
    db.contacts
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(MockError::NotFound("Контакт не найден"))
}

async fn update_contact(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<ContactUpdate>,
) -> Result<Json<Contact>, MockError> {
    let identity = require_auth(&headers)?;
    if let Some(phone) = &input.phone_number {
        check_phone(phone, 10)?;
    }
    let mut db = db.write().await;
    let contact = db
        .contacts
        .get_mut(&id)
        .ok_or(MockError::NotFound("Контакт не найден"))?;
    if contact.author_id != Some(identity.user_id) && !identity.is_admin() {
        return Err(MockError::NotFound(
            "У вас нет прав на редактирование этого контакта",
        ));
    }

    if let Some(title) = input.title {
        contact.title = title;
    }
    if let Some(description) = input.description {
        contact.description = Some(description);
    }
    if let Some(full_name) = input.full_name {
        contact.full_name = full_name;
    }
    if let Some(position) = input.position {
        contact.position = position;
    }
    if let Some(email) = input.email {
        contact.email = email.to_lowercase();
    }
    if let Some(phone_number) = input.phone_number {
        contact.phone_number = phone_number;
    }
    if let Some(city) = input.city {
        contact.city = Some(city);
    }
    if let Some(questionnaire) = input.questionnaire {
        contact.questionnaire = questionnaire;
    }
    if let Some(notes) = input.notes {
        contact.notes = Some(notes);
    }
    if let Some(is_validated) = input.is_validated {
        contact.is_validated = is_validated;
    }
    contact.updated_at = model::now();
    Ok(Json(contact.clone()))
}

#[derive(Debug, Deserialize)]
pub struct ValidateParams {
    pub is_validated: bool,
    pub notes: Option<String>,
}

async fn validate_contact(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(params): Query<ValidateParams>,
) -> Result<Json<Contact>, MockError> {
    let admin = require_admin(&headers)?;
    let mut db = db.write().await;
    let contact = db
        .contacts
        .get_mut(&id)
        .ok_or(MockError::NotFound("Контакт не найден"))?;
    contact.is_validated = params.is_validated;
    if let Some(notes) = params.notes {
        contact.notes = Some(notes);
    }
    contact.updated_at = model::now();
    tracing::debug!(id, validated = params.is_validated, by = admin.user_id, "contact validated");
    Ok(Json(contact.clone()))
}

async fn delete_contact(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
) -> Result<StatusCode, MockError> {
    let mut db = db.write().await;
    db.files.remove(&id);
    db.contacts
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(MockError::NotFound("Контакт не найден"))
}

async fn delete_contacts(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(batch): Json<BatchIds>,
) -> Result<StatusCode, MockError> {
    require_auth(&headers)?;
    let mut db = db.write().await;
    for id in batch.ids {
        db.contacts.remove(&id);
        db.files.remove(&id);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn questionnaire() -> Json<Value> {
    Json(json!({
        "contact_type": ["ПРОЕКТНЫЙ ИНСТИТУТ", "ПОТРЕБИТЕЛЬ", "КОНКУРЕНТ", "ДРУГОЕ"],
        "product_type": [],
        "manufacturer": [],
    }))
}

async fn upload_files(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<UploadResult>, MockError> {
    let mut incoming = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MockError::BadRequest(e.to_string()))?
    {
        let Some(kind) = field.name().filter(|n| FILE_FIELDS.contains(n)).map(str::to_string) else {
            continue;
        };
        let name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| MockError::BadRequest(e.to_string()))?;
        incoming.push((kind, name, bytes.len()));
    }

    let mut db = db.write().await;
    if !db.contacts.contains_key(&id) {
        return Err(MockError::NotFound("Контакт не найден"));
    }
    let stored = db.files.get(&id).map_or(0, Vec::len);
    if stored + incoming.len() > MAX_FILES_PER_CONTACT {
        return Err(MockError::BadRequest(format!(
            "Максимальное количество файлов на контакт: {MAX_FILES_PER_CONTACT}"
        )));
    }

    let mut saved = Vec::new();
    for (kind, name, size) in incoming {
        let file_id = db.next_file_id;
        db.next_file_id += 1;
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        tracing::debug!(contact = id, file_id, size, "file stored");
        saved.push(StoredFile {
            id: file_id,
            url: format!("/uploads/contacts/contact_{id}_{kind}_{file_id}.{extension}"),
            name,
            kind,
            format: extension,
            created_at: model::now(),
        });
    }
    db.files.entry(id).or_default().extend(saved.iter().cloned());

    Ok(Json(UploadResult {
        message: format!("Успешно загружено {} файлов", saved.len()),
        files: saved,
        contact_id: id,
    }))
}

async fn list_files(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
) -> Result<Json<ContactFileList>, MockError> {
    let db = db.read().await;
    if !db.contacts.contains_key(&id) {
        return Err(MockError::NotFound("Контакт не найден"));
    }
    let files: Vec<ContactFileEntry> = db
        .files
        .get(&id)
        .map(|files| files.iter().map(StoredFile::listing_entry).collect())
        .unwrap_or_default();
    Ok(Json(ContactFileList {
        contact_id: id,
        total_files: files.len() as u64,
        files,
    }))
}

async fn delete_file(
    State(db): State<SharedDb>,
    Path((id, file_id)): Path<(i64, i64)>,
) -> Result<StatusCode, MockError> {
    let mut db = db.write().await;
    let files = db.files.get_mut(&id);
    let position = files
        .as_ref()
        .and_then(|files| files.iter().position(|f| f.id == file_id));
    match (files, position) {
        (Some(files), Some(index)) => {
            files.remove(index);
            Ok(StatusCode::NO_CONTENT)
        }
        _ => Err(MockError::NotFound("Файл не найден у данного контакта")),
    }
}

async fn fail() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}
