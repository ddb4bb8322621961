//! Client plumbing for the peer-evaluation web app: a session-aware REST client,
//! a polling data hook with request deduplication, and client-side pagination.

pub use self::error::{Error, Result};

pub mod auth;
pub mod config;
pub mod error;
pub mod helpers;
pub mod models;
pub mod services;
pub mod telemetry;

pub use auth::{
    models::Role,
    session::{FileSessionStore, MemorySessionStore, Session, SessionHandle, SessionStore},
};
pub use config::ClientConfig;
pub use models::pagination::{PaginationInfo, Paginator};
pub use services::{
    api_client::ApiClient,
    auth_service::AuthService,
    polling_service::{PollOptions, PollingHandle, PollingService, Snapshot},
    request_service::{Envelope, RequestService},
};
