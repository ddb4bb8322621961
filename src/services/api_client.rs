use std::{sync::Arc, time::Instant};

use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::session::{FileSessionStore, SessionHandle},
    config::ClientConfig,
    services::request_service::{Envelope, RequestService},
    Error, Result,
};

/// JSON REST client bound to one backend.
///
/// Every call goes through [`RequestService::execute`] and carries the session's
/// bearer token when one is present.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    session: SessionHandle,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: SessionHandle) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            config: Arc::new(config),
            session,
        })
    }

    /// Builds a client whose session lives in `config.session_file`, or in memory
    /// when no file is configured.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let session = match &config.session_file {
            Some(path) => SessionHandle::open(Arc::new(FileSessionStore::new(path)))?,
            None => SessionHandle::in_memory(),
        };

        Self::new(config, session)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<(), T>(Method::GET, path, None).await
    }

    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        self.get(path).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<(), T>(Method::DELETE, path, None).await
    }

    async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "http_request",
            request_id = %request_id,
            method = %method,
            path = %path,
        );

        RequestService::execute(|| self.send(method, path, body))
            .instrument(span)
            .await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Envelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut builder = self.http.request(method.clone(), self.config.url_for(path));
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        tracing::info!("{} {}", method, path);
        let started = Instant::now();

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let latency_ms = started.elapsed().as_millis();

        match status.as_u16() {
            200..=299 => tracing::info!("{} ({}ms)", status, latency_ms),
            400..=499 => tracing::warn!("⚠️ {} ({}ms)", status, latency_ms),
            500..=599 => tracing::error!("❌ {} ({}ms)", status, latency_ms),
            _ => tracing::info!("{} ({}ms)", status, latency_ms),
        }

        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        // 204s and empty bodies decode as JSON null
        let raw: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        let data = serde_json::from_slice(raw).map_err(|e| Error::Decode(e.to_string()))?;

        Ok(Envelope {
            status,
            headers,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        http::{header, HeaderMap, StatusCode},
        routing::{delete, get, post},
        Json, Router,
    };
    use serde::Deserialize;
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        auth::{models::Role, session::Session},
        helpers::test_server,
    };

    #[derive(Debug, Deserialize, PartialEq)]
    struct Team {
        id: u32,
        name: String,
    }

    fn router() -> Router {
        Router::new()
            .route(
                "/classes/{id}/teams",
                get(|| async { Json(json!([{"id": 1, "name": "Red"}, {"id": 2, "name": "Blue"}])) }),
            )
            .route(
                "/whoami",
                get(|headers: HeaderMap| async move {
                    let auth = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    Json(json!({ "authorization": auth }))
                }),
            )
            .route(
                "/teams",
                post(|Json(body): Json<Value>| async move {
                    (StatusCode::CREATED, Json(json!({"id": 7, "name": body["name"]})))
                }),
            )
            .route("/teams/{id}", delete(|| async { StatusCode::NO_CONTENT }))
            .route(
                "/broken",
                get(|| async { (StatusCode::NOT_FOUND, "no such class") }),
            )
            .route("/garbled", get(|| async { "{not json" }))
    }

    async fn client() -> ApiClient {
        let base_url = test_server::spawn(router()).await;
        ApiClient::new(
            ClientConfig::new(&base_url).unwrap(),
            SessionHandle::in_memory(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_list_unwraps_body() {
        let client = client().await;

        let teams: Vec<Team> = client.get_list("/classes/4/teams").await.unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(
            teams[0],
            Team {
                id: 1,
                name: "Red".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_bearer_header_follows_session() {
        let client = client().await;

        let anonymous: Value = client.get("/whoami").await.unwrap();
        assert_eq!(anonymous["authorization"], Value::Null);

        client
            .session()
            .set(Session::new("jwt-123".to_string(), Role::Student))
            .unwrap();
        let signed: Value = client.get("/whoami").await.unwrap();
        assert_eq!(signed["authorization"], "Bearer jwt-123");
    }

    #[tokio::test]
    async fn test_post_and_delete() {
        let client = client().await;

        let created: Team = client
            .post("/teams", &json!({"name": "Green"}))
            .await
            .unwrap();
        assert_eq!(created.id, 7);
        assert_eq!(created.name, "Green");

        client.delete::<()>("/teams/7").await.unwrap();
    }

    #[tokio::test]
    async fn test_error_classification() {
        let client = client().await;

        let err = client.get::<Value>("/broken").await.unwrap_err();
        assert_eq!(
            err,
            Error::Status {
                status: 404,
                body: "no such class".to_string()
            }
        );

        let err = client.get::<Value>("/garbled").await.unwrap_err();
        assert_eq!(err.as_ref(), "Decode");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(
            ClientConfig::new(&format!("http://{addr}")).unwrap(),
            SessionHandle::in_memory(),
        )
        .unwrap();

        let err = client.get::<Value>("/anything").await.unwrap_err();
        assert_eq!(err.as_ref(), "Transport");
    }

    #[tokio::test]
    async fn test_from_config_uses_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(
            &path,
            serde_json::to_string(&Session::new("persisted".to_string(), Role::Admin)).unwrap(),
        )
        .unwrap();

        let mut config = ClientConfig::new("http://localhost:1").unwrap();
        config.session_file = Some(path);

        let client = ApiClient::from_config(config).unwrap();
        assert_eq!(client.session().token().as_deref(), Some("persisted"));
        assert_eq!(client.session().role(), Some(Role::Admin));
    }
}
