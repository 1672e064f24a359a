//! Request wrapper shared by every service.
//!
//! # Design
//! `ApiClient` splits each call into three steps: `build_request` (pure),
//! `Transport::execute` (I/O), and `interpret_response` (pure). The client
//! owns the two side effects of the contract: refusing authenticated calls
//! without a token, and clearing the token store on 401.
//!
//! Cloning is cheap and clones share the transport, the token store and the
//! registered session listeners.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use crate::config::ClientConfig;
use crate::envelope::{interpret_response, Envelope};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::multipart::MultipartForm;
use crate::session::{SessionEvent, SessionListener, SessionState};
use crate::token::TokenStore;
use crate::transport::{Transport, UreqTransport};

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    /// Already-serialized JSON text.
    Json(String),
    Multipart(MultipartForm),
}

/// Method, extra headers and body for one call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get() -> Self {
        Self::new(HttpMethod::Get)
    }

    pub fn delete() -> Self {
        Self::new(HttpMethod::Delete)
    }

    pub fn json<T: Serialize + ?Sized>(method: HttpMethod, payload: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(Self {
            body: RequestBody::Json(body),
            ..Self::new(method)
        })
    }

    pub fn multipart(method: HttpMethod, form: MultipartForm) -> Self {
        Self {
            body: RequestBody::Multipart(form),
            ..Self::new(method)
        }
    }

    /// Add a caller header. `Content-Type` and `Authorization` are always
    /// set by the client and a caller value for either is dropped.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
    listeners: Arc<RwLock<Vec<SessionListener>>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.tokens.get_token().is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            transport,
            tokens,
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Client that talks real HTTP through `UreqTransport`.
    pub fn over_http(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Self {
        Self::new(config, Arc::new(UreqTransport::new()), tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Stored token, with an empty value counted as no token.
    fn current_token(&self) -> Option<String> {
        self.tokens.get_token().filter(|t| !t.is_empty())
    }

    pub fn session_state(&self) -> SessionState {
        match self.current_token() {
            Some(_) => SessionState::Authenticated,
            None => SessionState::Anonymous,
        }
    }

    /// Register a listener for login, logout and expiry.
    pub fn on_session_event(&self, listener: impl Fn(SessionEvent) + Send + Sync + 'static) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // Snapshot so a listener may register another without deadlocking.
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner).clone();
        for listener in listeners {
            listener(event);
        }
    }

    /// Clear the stored token. A storage failure is logged, never returned:
    /// local logout must not be blocked.
    pub(crate) fn clear_token(&self) {
        if let Err(e) = self.tokens.remove_token() {
            tracing::warn!("failed to clear session token: {e}");
        }
    }

    /// Build the request for `path`. `token`, when present, becomes the
    /// bearer credential.
    pub fn build_request(&self, path: &str, options: RequestOptions, token: Option<&str>) -> HttpRequest {
        let separator = if path.starts_with('/') { "" } else { "/" };
        let url = format!("{}{separator}{path}", self.base_url);

        let mut headers: Vec<(String, String)> = options
            .headers
            .into_iter()
            .filter(|(name, _)| {
                !name.eq_ignore_ascii_case("content-type") && !name.eq_ignore_ascii_case("authorization")
            })
            .collect();

        let (content_type, body) = match options.body {
            RequestBody::Empty => (JSON_CONTENT_TYPE.to_string(), None),
            RequestBody::Json(text) => (JSON_CONTENT_TYPE.to_string(), Some(text.into_bytes())),
            RequestBody::Multipart(form) => (form.content_type(), Some(form.encode())),
        };
        headers.push(("content-type".to_string(), content_type));
        if let Some(token) = token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }

        HttpRequest {
            method: options.method,
            url,
            headers,
            body,
        }
    }

    /// Unauthenticated call, used where no token exists yet.
    pub fn public_fetch(&self, path: &str, options: RequestOptions) -> Result<Envelope, ApiError> {
        let request = self.build_request(path, options, None);
        self.send(&request, false)
    }

    /// Authenticated call. Fails with `Unauthenticated` and performs no I/O
    /// when the store holds no token.
    pub fn api_fetch(&self, path: &str, options: RequestOptions) -> Result<Envelope, ApiError> {
        let token = self.current_token().ok_or(ApiError::Unauthenticated)?;
        let request = self.build_request(path, options, Some(token.as_str()));
        self.send(&request, true)
    }

    fn send(&self, request: &HttpRequest, authenticated: bool) -> Result<Envelope, ApiError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");

        let response = self.transport.execute(request).map_err(|e| {
            tracing::warn!(url = %request.url, "transport failure: {e}");
            ApiError::Network(e.0)
        })?;
        tracing::debug!(status = response.status, url = %request.url, "received response");

        let result = interpret_response(&response);
        if let Err(ApiError::SessionExpired(_)) = &result {
            self.clear_token();
            if authenticated {
                tracing::warn!(url = %request.url, "session rejected by server; token cleared");
                self.emit(SessionEvent::Expired);
            }
        }
        result
    }
}
