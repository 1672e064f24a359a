use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GymOwner {
    pub id: u64,
    pub unique_id: String,
    pub owner_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub gym_name: String,
    pub subscription_type: String,
    pub active: bool,
    pub profile_image: Option<String>,
    pub gym_logo: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthInfo {
    pub id: u64,
    pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportQuery {
    pub id: u64,
    pub email: String,
    pub sender_id: String,
    pub query: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAdmin {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdmin {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Deserialize)]
pub struct UpdateHealthInfo {
    pub content: String,
}

struct AdminRecord {
    admin: Admin,
    password: String,
}

#[derive(Default)]
pub struct Store {
    admins: HashMap<u64, AdminRecord>,
    sessions: HashMap<String, u64>,
    owners: BTreeMap<u64, GymOwner>,
    health: BTreeMap<u64, HealthInfo>,
    support: Vec<SupportQuery>,
    next_admin_id: u64,
    next_owner_id: u64,
}

impl Store {
    /// Health page 1 and two support queries, oldest first.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        store.health.insert(
            1,
            HealthInfo {
                id: 1,
                content: "<p>Stay hydrated and warm up before training.</p>".to_string(),
            },
        );
        store.support = vec![
            SupportQuery {
                id: 1,
                email: "first@member.com".to_string(),
                sender_id: "member-1".to_string(),
                query: "How do I reset my gym PIN?".to_string(),
            },
            SupportQuery {
                id: 2,
                email: "second@member.com".to_string(),
                sender_id: "member-2".to_string(),
                query: "Can I pause my subscription?".to_string(),
            },
        ];
        store
    }

    fn email_taken(&self, email: &str, except: Option<u64>) -> bool {
        self.owners
            .values()
            .any(|o| o.email.eq_ignore_ascii_case(email) && Some(o.id) != except)
    }
}

pub type Db = Arc<RwLock<Store>>;

/// An error rendered as `{success: false, message}` with its status.
pub struct Failure(StatusCode, String);

impl Failure {
    fn new(status: StatusCode, message: &str) -> Self {
        Self(status, message.to_string())
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "success": false, "message": self.1 }))).into_response()
    }
}

type Reply = Result<(StatusCode, Json<Value>), Failure>;

fn ok(status: StatusCode, message: &str, data: impl Serialize) -> Reply {
    Ok((status, Json(json!({ "success": true, "message": message, "data": data }))))
}

pub fn app() -> Router {
    app_with_store(Store::seeded())
}

pub fn app_with_store(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/auth/register-admin", post(register_admin))
        .route("/api/auth/login-admin", post(login_admin))
        .route("/api/admin/get", get(get_admin))
        .route("/api/admin/update", put(update_admin))
        .route("/api/admin/change-password", post(change_password))
        .route("/api/admin/logout", get(logout))
        .route("/gym-owner/all", get(list_owners))
        .route("/gym-owner/register", post(register_owner))
        .route("/gym-owner/{id}", get(get_owner))
        .route("/gym-owner/update/{id}", put(update_owner))
        .route("/gym-owner/delete/{id}", delete(delete_owner))
        .route("/health-info/all", get(list_health))
        .route("/health-info/update/{id}", put(update_health))
        .route("/communicationsupports/get", get(list_support))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve the calling admin's id from the bearer token.
fn authorize(store: &Store, headers: &HeaderMap) -> Result<u64, Failure> {
    let token = bearer(headers).ok_or_else(|| Failure::new(StatusCode::UNAUTHORIZED, "Authorization token missing"))?;
    store
        .sessions
        .get(token)
        .copied()
        .ok_or_else(|| Failure::new(StatusCode::UNAUTHORIZED, "Invalid or expired token"))
}

fn valid_email(email: &str) -> bool {
    matches!(email.split_once('@'), Some((user, domain)) if !user.is_empty() && domain.contains('.'))
}

async fn register_admin(State(db): State<Db>, Json(input): Json<RegisterAdmin>) -> Reply {
    if [&input.first_name, &input.last_name, &input.email, &input.password]
        .iter()
        .any(|f| f.trim().is_empty())
    {
        return Err(Failure::new(StatusCode::BAD_REQUEST, "All fields are required"));
    }
    if !valid_email(&input.email) {
        return Err(Failure::new(StatusCode::BAD_REQUEST, "Invalid email address"));
    }

    let mut store = db.write().await;
    if store.admins.values().any(|r| r.admin.email.eq_ignore_ascii_case(&input.email)) {
        return Err(Failure::new(StatusCode::CONFLICT, "Email already registered"));
    }
    store.next_admin_id += 1;
    let admin = Admin {
        id: store.next_admin_id,
        first_name: input.first_name,
        last_name: input.last_name,
        email: input.email,
        role: "admin".to_string(),
    };
    store.admins.insert(
        admin.id,
        AdminRecord {
            admin: admin.clone(),
            password: input.password,
        },
    );
    tracing::info!(id = admin.id, "registered admin");
    ok(StatusCode::CREATED, "Admin registered successfully", admin)
}

async fn login_admin(State(db): State<Db>, Json(input): Json<Login>) -> Reply {
    let mut store = db.write().await;
    let admin = store
        .admins
        .values()
        .find(|r| r.admin.email.eq_ignore_ascii_case(&input.email) && r.password == input.password)
        .map(|r| r.admin.clone())
        .ok_or_else(|| Failure::new(StatusCode::UNAUTHORIZED, "Invalid email or password"))?;

    let token = Uuid::new_v4().to_string();
    store.sessions.insert(token.clone(), admin.id);
    ok(StatusCode::OK, "Login successful", json!({ "token": token, "admin": admin }))
}

async fn get_admin(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let store = db.read().await;
    let id = authorize(&store, &headers)?;
    let record = store
        .admins
        .get(&id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Admin not found"))?;
    ok(StatusCode::OK, "Admin fetched", &record.admin)
}

async fn update_admin(State(db): State<Db>, headers: HeaderMap, Json(input): Json<UpdateAdmin>) -> Reply {
    let mut store = db.write().await;
    let id = authorize(&store, &headers)?;
    if let Some(email) = &input.email {
        if !valid_email(email) {
            return Err(Failure::new(StatusCode::BAD_REQUEST, "Invalid email address"));
        }
        if store
            .admins
            .values()
            .any(|r| r.admin.id != id && r.admin.email.eq_ignore_ascii_case(email))
        {
            return Err(Failure::new(StatusCode::CONFLICT, "Email already registered"));
        }
    }
    let record = store
        .admins
        .get_mut(&id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Admin not found"))?;
    if let Some(first_name) = input.first_name {
        record.admin.first_name = first_name;
    }
    if let Some(last_name) = input.last_name {
        record.admin.last_name = last_name;
    }
    if let Some(email) = input.email {
        record.admin.email = email;
    }
    ok(StatusCode::OK, "Profile updated", record.admin.clone())
}

async fn change_password(State(db): State<Db>, headers: HeaderMap, Json(input): Json<ChangePassword>) -> Reply {
    let mut store = db.write().await;
    let id = authorize(&store, &headers)?;
    if input.new_password != input.confirm_new_password {
        return Err(Failure::new(StatusCode::BAD_REQUEST, "Passwords do not match"));
    }
    if input.new_password.len() < MIN_PASSWORD_LEN {
        return Err(Failure::new(StatusCode::BAD_REQUEST, "Password must be at least 6 characters"));
    }
    let record = store
        .admins
        .get_mut(&id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Admin not found"))?;
    if record.password != input.old_password {
        return Err(Failure::new(StatusCode::BAD_REQUEST, "Current password is incorrect"));
    }
    record.password = input.new_password;
    Ok((StatusCode::OK, Json(json!({ "success": true, "message": "Password changed" }))))
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let mut store = db.write().await;
    authorize(&store, &headers)?;
    if let Some(token) = bearer(&headers) {
        store.sessions.remove(token);
    }
    Ok((StatusCode::OK, Json(json!({ "success": true, "message": "Logged out" }))))
}

async fn list_owners(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let store = db.read().await;
    authorize(&store, &headers)?;
    let owners: Vec<&GymOwner> = store.owners.values().collect();
    ok(StatusCode::OK, "Gym owners fetched", owners)
}

async fn get_owner(State(db): State<Db>, headers: HeaderMap, Path(id): Path<u64>) -> Reply {
    let store = db.read().await;
    authorize(&store, &headers)?;
    let owner = store
        .owners
        .get(&id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Gym owner not found."))?;
    ok(StatusCode::OK, "Gym owner fetched", owner)
}

/// Text fields and stored image references read from a multipart body.
#[derive(Default)]
struct OwnerForm {
    fields: HashMap<String, String>,
    files: HashMap<String, String>,
}

impl OwnerForm {
    fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|v| v.trim().to_string())
    }

    fn active(&self) -> Result<Option<bool>, Failure> {
        match self.text("active").as_deref() {
            None => Ok(None),
            Some("true") => Ok(Some(true)),
            Some("false") => Ok(Some(false)),
            Some(_) => Err(Failure::new(StatusCode::BAD_REQUEST, "active must be true or false")),
        }
    }
}

async fn read_owner_form(mut multipart: Multipart) -> Result<OwnerForm, Failure> {
    let bad = |e: axum::extract::multipart::MultipartError| Failure(StatusCode::BAD_REQUEST, e.body_text());
    let mut form = OwnerForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let bytes = field.bytes().await.map_err(bad)?;
                tracing::debug!(%name, %file_name, size = bytes.len(), "received upload");
                form.files.insert(name, format!("/uploads/{}/{file_name}", Uuid::new_v4().simple()));
            }
            None => {
                let value = field.text().await.map_err(bad)?;
                form.fields.insert(name, value);
            }
        }
    }
    Ok(form)
}

async fn register_owner(State(db): State<Db>, headers: HeaderMap, multipart: Multipart) -> Reply {
    authorize(&*db.read().await, &headers)?;
    let form = read_owner_form(multipart).await?;

    let required = |name: &str| form.text(name).filter(|v| !v.is_empty());
    let (Some(owner_name), Some(email), Some(gym_name)) =
        (required("ownerName"), required("email"), required("gymName"))
    else {
        return Err(Failure::new(StatusCode::BAD_REQUEST, "ownerName, email and gymName are required"));
    };
    if !valid_email(&email) {
        return Err(Failure::new(StatusCode::BAD_REQUEST, "Invalid email address"));
    }
    let active = form.active()?.unwrap_or(true);

    let mut store = db.write().await;
    if store.email_taken(&email, None) {
        return Err(Failure::new(StatusCode::CONFLICT, "Email already exists."));
    }
    store.next_owner_id += 1;
    let id = store.next_owner_id;
    let owner = GymOwner {
        id,
        unique_id: required("uniqueId").unwrap_or_else(|| format!("GYM-{id:04}")),
        owner_name,
        email,
        phone_number: form.text("phoneNumber"),
        address: form.text("address"),
        gym_name,
        subscription_type: required("subscriptionType").unwrap_or_else(|| "Monthly".to_string()),
        active,
        profile_image: form.files.get("profileImage").cloned(),
        gym_logo: form.files.get("gymLogo").cloned(),
        created_at: Utc::now(),
    };
    store.owners.insert(id, owner.clone());
    tracing::info!(id, "registered gym owner");
    ok(StatusCode::CREATED, "Gym owner registered", owner)
}

async fn update_owner(State(db): State<Db>, headers: HeaderMap, Path(id): Path<u64>, multipart: Multipart) -> Reply {
    authorize(&*db.read().await, &headers)?;
    let form = read_owner_form(multipart).await?;
    let active = form.active()?;

    let mut store = db.write().await;
    if let Some(email) = form.text("email") {
        if !valid_email(&email) {
            return Err(Failure::new(StatusCode::BAD_REQUEST, "Invalid email address"));
        }
        if store.email_taken(&email, Some(id)) {
            return Err(Failure::new(StatusCode::CONFLICT, "Email already exists."));
        }
    }
    let owner = store
        .owners
        .get_mut(&id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Gym owner not found."))?;

    if let Some(v) = form.text("ownerName") {
        owner.owner_name = v;
    }
    if let Some(v) = form.text("email") {
        owner.email = v;
    }
    if let Some(v) = form.text("gymName") {
        owner.gym_name = v;
    }
    if let Some(v) = form.text("phoneNumber") {
        owner.phone_number = Some(v);
    }
    if let Some(v) = form.text("address") {
        owner.address = Some(v);
    }
    if let Some(v) = form.text("subscriptionType") {
        owner.subscription_type = v;
    }
    if let Some(v) = active {
        owner.active = v;
    }
    if let Some(v) = form.files.get("profileImage") {
        owner.profile_image = Some(v.clone());
    }
    if let Some(v) = form.files.get("gymLogo") {
        owner.gym_logo = Some(v.clone());
    }
    ok(StatusCode::OK, "Gym owner updated", owner.clone())
}

async fn delete_owner(State(db): State<Db>, headers: HeaderMap, Path(id): Path<u64>) -> Reply {
    let mut store = db.write().await;
    authorize(&store, &headers)?;
    store
        .owners
        .remove(&id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Gym owner not found."))?;
    Ok((StatusCode::OK, Json(json!({ "success": true, "message": "Gym owner deleted" }))))
}

async fn list_health(State(db): State<Db>) -> Reply {
    let store = db.read().await;
    let items: Vec<&HealthInfo> = store.health.values().collect();
    ok(StatusCode::OK, "Health information fetched", items)
}

async fn update_health(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(input): Json<UpdateHealthInfo>,
) -> Reply {
    let mut store = db.write().await;
    authorize(&store, &headers)?;
    let info = store
        .health
        .get_mut(&id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Health information not found"))?;
    info.content = input.content;
    ok(StatusCode::OK, "Health information updated", info.clone())
}

async fn list_support(State(db): State<Db>) -> Reply {
    let store = db.read().await;
    ok(StatusCode::OK, "Support queries fetched", &store.support)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_serializes_camel_case_without_password() {
        let admin = Admin {
            id: 1,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            role: "admin".to_string(),
        };
        let json = serde_json::to_value(&admin).unwrap();
        assert_eq!(json["firstName"], "Jane");
        assert_eq!(json["lastName"], "Doe");
        assert!(json.get("password").is_none());
    }

    #[test]
    fn register_admin_rejects_missing_field() {
        let result: Result<RegisterAdmin, _> =
            serde_json::from_str(r#"{"firstName":"A","lastName":"B","email":"a@b.com"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_admin_all_fields_optional() {
        let input: UpdateAdmin = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.first_name.is_none());
        assert!(input.last_name.is_none());
        assert!(input.email.is_none());
    }

    #[test]
    fn email_check_needs_user_and_dotted_domain() {
        assert!(valid_email("a@b.com"));
        assert!(!valid_email("bad"));
        assert!(!valid_email("@b.com"));
        assert!(!valid_email("a@localhost"));
    }

    #[test]
    fn bearer_requires_scheme_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer(&headers), Some("abc"));
        headers.insert(header::AUTHORIZATION, "abc".parse().unwrap());
        assert_eq!(bearer(&headers), None);
    }

    #[test]
    fn seeded_store_has_health_page_one() {
        let store = Store::seeded();
        assert_eq!(store.health.get(&1).map(|h| h.id), Some(1));
        assert_eq!(store.support.len(), 2);
    }
}
