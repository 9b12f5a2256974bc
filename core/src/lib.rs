//! Client core for the exhibition contacts backend.
//!
//! # Overview
//! Holds the session identity, issues requests to the backend with that
//! identity attached, and turns failures into typed errors plus optional
//! user-facing notifications. Also carries the static contact-form
//! descriptors the submissions are built from.
//!
//! # Design
//! - `SessionStore` is an explicit, cloneable handle; `Api` reads it when a
//!   request is built, so every request carries the identity of that moment.
//! - `Api` builds `HttpRequest` values as plain data and runs them through a
//!   `Transport`, keeping header injection and body encoding testable
//!   without a network. `UreqTransport` is the blocking default.
//! - Failures come back as `Result<_, ApiError>`. User-facing messages go to
//!   an optional `Notifier` observer rather than being rendered here.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod form;
pub mod form_data;
pub mod http;
pub mod notify;
pub mod session;
pub mod transport;
pub mod types;

pub use api::{Api, PostBody, RequestConfig};
pub use config::{ClientConfig, ConfigError};
pub use endpoints::{ContactQuery, PageQuery};
pub use error::{ApiError, BackendError, ErrorDetail, TransportError};
pub use form_data::FormData;
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestBody, UploadProgress};
pub use notify::{Notification, NotificationKind, Notifier, RecordingNotifier, TracingNotifier};
pub use session::{Session, SessionStore};
pub use transport::{Transport, UreqTransport};
pub use types::{
    BatchIds, Contact, ContactFile, ContactFiles, ContactSubmission, ContactSummary, CurrentUser,
    Event, EventWithContacts, Page, Passport, PassportSubmission, Questionnaire, UploadedFile,
    UploadedFiles,
};
