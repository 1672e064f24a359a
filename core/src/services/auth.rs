use validator::Validate;

use crate::client::{ApiClient, RequestOptions};
use crate::envelope::Envelope;
use crate::error::{ApiError, MSG_FORMAT_MISMATCH};
use crate::http::HttpMethod;
use crate::session::{SessionEvent, SessionState};
use crate::types::{Admin, ChangePassword, LoginCredentials, LoginData, RegisterAdmin, UpdateAdmin};

const REGISTER_PATH: &str = "/api/auth/register-admin";
const LOGIN_PATH: &str = "/api/auth/login-admin";
const PROFILE_PATH: &str = "/api/admin/get";
const UPDATE_PATH: &str = "/api/admin/update";
const CHANGE_PASSWORD_PATH: &str = "/api/admin/change-password";
const LOGOUT_PATH: &str = "/api/admin/logout";

/// Login, registration and the admin's own profile.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn session_state(&self) -> SessionState {
        self.client.session_state()
    }

    /// Create an admin account. No token is issued; the envelope is
    /// returned as the server sent it.
    pub fn register_admin(&self, input: &RegisterAdmin) -> Result<Envelope, ApiError> {
        input.validate()?;
        self.client
            .public_fetch(REGISTER_PATH, RequestOptions::json(HttpMethod::Post, input)?)
    }

    /// Log in and persist the issued token.
    ///
    /// The session only becomes `Authenticated` once a token has been
    /// stored; a success envelope without `data.token` is a
    /// `FormatMismatch` and leaves the store untouched.
    pub fn login_admin(&self, credentials: &LoginCredentials) -> Result<LoginData, ApiError> {
        credentials.validate()?;
        let login: LoginData = self
            .client
            .public_fetch(LOGIN_PATH, RequestOptions::json(HttpMethod::Post, credentials)?)?
            .into_data()?;
        if login.token.is_empty() {
            return Err(ApiError::FormatMismatch(MSG_FORMAT_MISMATCH.to_string()));
        }

        self.client.token_store().set_token(&login.token)?;
        tracing::info!(email = %credentials.email, "admin logged in");
        self.client.emit(SessionEvent::LoggedIn);
        Ok(login)
    }

    pub fn get_admin_by_token(&self) -> Result<Admin, ApiError> {
        self.client.api_fetch(PROFILE_PATH, RequestOptions::get())?.into_data()
    }

    /// Send `update` as-is; the server decides which fields are mutable.
    pub fn update_admin_by_token(&self, update: &UpdateAdmin) -> Result<Admin, ApiError> {
        self.client
            .api_fetch(UPDATE_PATH, RequestOptions::json(HttpMethod::Put, update)?)?
            .into_data()
    }

    pub fn change_password(&self, input: &ChangePassword) -> Result<Envelope, ApiError> {
        input.validate()?;
        self.client
            .api_fetch(CHANGE_PASSWORD_PATH, RequestOptions::json(HttpMethod::Post, input)?)
    }

    /// Notify the server, then clear the local session whatever the outcome.
    ///
    /// Returns the server's answer; an error here does not mean the local
    /// logout failed.
    pub fn logout(&self) -> Result<Envelope, ApiError> {
        let result = self.client.api_fetch(LOGOUT_PATH, RequestOptions::get());
        if let Err(e) = &result {
            tracing::warn!("server logout failed, clearing local session anyway: {e}");
        }
        self.client.clear_token();
        tracing::info!("admin logged out");
        self.client.emit(SessionEvent::LoggedOut);
        result
    }
}
