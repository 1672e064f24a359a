//! Session and API-access layer for the gym administration backend.
//!
//! # Overview
//! Holds the admin's bearer token, wraps every call to the REST API with the
//! right headers, and turns every outcome into either a successful envelope
//! or one `ApiError` kind. Typed services for auth, gym owners, health info
//! and support queries sit on top.
//!
//! # Design
//! - `TokenStore` is injected, never global; tests get their own store.
//! - `ApiClient` builds requests and interprets responses as pure
//!   functions; a `Transport` does the I/O.
//! - A 401 clears the token and emits `SessionEvent::Expired`; what happens
//!   next (e.g. showing a login screen) is up to the listener.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod listing;
pub mod multipart;
pub mod services;
pub mod session;
pub mod token;
pub mod transport;
pub mod types;

pub use client::{ApiClient, RequestBody, RequestOptions};
pub use config::{ClientConfig, ConfigError};
pub use envelope::{interpret_response, Envelope};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use listing::{paginate, search_gym_owners, Page};
pub use multipart::{FileUpload, MultipartForm};
pub use services::{AuthService, GymOwnerService, HealthInfoService, SupportService};
pub use session::{SessionEvent, SessionState};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{
    Admin, ChangePassword, GymOwner, GymOwnerUpdate, HealthInfo, LoginCredentials, LoginData, NewGymOwner,
    RegisterAdmin, SupportQuery, UpdateAdmin,
};
