//! End-to-end session and CRUD flow against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every service over
//! real HTTP through `UreqTransport`. Validates that request building,
//! multipart encoding and envelope interpretation agree with the server.

use std::io::{Read, Write};
use std::sync::{Arc, Mutex};

use gym_admin_core::{
    paginate, search_gym_owners, ApiClient, ApiError, AuthService, ChangePassword, ClientConfig, FileUpload,
    GymOwnerService, GymOwnerUpdate, HealthInfoService, LoginCredentials, MemoryTokenStore, NewGymOwner,
    RegisterAdmin, RequestOptions, SessionEvent, SessionState, SupportService, TokenStore, UpdateAdmin,
};

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn client(base_url: &str, tokens: Arc<MemoryTokenStore>) -> ApiClient {
    ApiClient::over_http(&ClientConfig::new(base_url).unwrap(), tokens)
}

#[test]
fn admin_session_and_gym_owner_lifecycle() {
    let base_url = start_server();
    let tokens = Arc::new(MemoryTokenStore::new());
    let c = client(&base_url, tokens.clone());
    let auth = AuthService::new(c.clone());
    let owners = GymOwnerService::new(c.clone());
    let health = HealthInfoService::new(c.clone());
    let support = SupportService::new(c);

    // Step 1: anonymous; authenticated calls fail locally.
    assert_eq!(auth.session_state(), SessionState::Anonymous);
    assert_eq!(owners.get_all_gym_owners().unwrap_err(), ApiError::Unauthenticated);

    // Step 2: register, then a duplicate is a conflict.
    let registration = RegisterAdmin {
        first_name: "Ada".to_string(),
        last_name: "Admin".to_string(),
        email: "ada@gym.com".to_string(),
        password: "secret1".to_string(),
    };
    let envelope = auth.register_admin(&registration).unwrap();
    assert!(envelope.success);
    assert!(matches!(auth.register_admin(&registration), Err(ApiError::Conflict(_))));

    // Step 3: login stores the token.
    let login = auth.login_admin(&LoginCredentials::new("ada@gym.com", "secret1")).unwrap();
    assert_eq!(tokens.get_token(), Some(login.token.clone()));
    assert_eq!(login.admin.map(|a| a.email).as_deref(), Some("ada@gym.com"));

    // Step 4: profile read and partial update.
    let admin = auth.get_admin_by_token().unwrap();
    assert_eq!(admin.first_name, "Ada");
    assert_eq!(admin.role.as_deref(), Some("admin"));
    let updated = auth
        .update_admin_by_token(&UpdateAdmin {
            last_name: Some("Lovelace".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(updated.first_name, "Ada");
    assert_eq!(updated.last_name, "Lovelace");

    // Step 5: wrong current password is a server-side 400.
    let wrong = ChangePassword {
        old_password: "nope123".to_string(),
        new_password: "secret2".to_string(),
        confirm_new_password: "secret2".to_string(),
    };
    assert!(matches!(auth.change_password(&wrong), Err(ApiError::InvalidRequest(_))));

    // Step 6: register a gym owner with a logo and read it back.
    let new_owner = NewGymOwner {
        owner_name: "Jane Doe".to_string(),
        email: "jane@iron.com".to_string(),
        gym_name: "Iron Temple".to_string(),
        phone_number: Some("555-0100".to_string()),
        gym_logo: Some(FileUpload::new("logo.png", "image/png", vec![0x89, b'P', b'N', b'G'])),
        ..Default::default()
    };
    let created = owners.register_gym_owner(&new_owner).unwrap();
    let fetched = owners.get_gym_owner_by_id(created.id).unwrap();
    assert_eq!(fetched.owner_name, "Jane Doe");
    assert_eq!(fetched.email, "jane@iron.com");
    assert_eq!(fetched.phone_number.as_deref(), Some("555-0100"));
    assert!(fetched.gym_logo.is_some());
    assert!(fetched.created_at.is_some());

    // Step 7: a second owner, then list, search and paginate.
    owners
        .register_gym_owner(&NewGymOwner {
            owner_name: "Sam Lee".to_string(),
            email: "sam@flex.io".to_string(),
            gym_name: "Flex Zone".to_string(),
            ..Default::default()
        })
        .unwrap();
    let all = owners.get_all_gym_owners().unwrap();
    assert_eq!(all.len(), 2);
    let hits = search_gym_owners(&all, "iron");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, created.id);
    let page = paginate(&all, 2, 1);
    assert_eq!((page.from, page.to, page.total_pages), (2, 2, 2));

    // Step 8: partial update keeps untouched fields.
    let updated = owners
        .update_gym_owner_by_id(
            created.id,
            &GymOwnerUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(!updated.active);
    assert_eq!(updated.gym_name.as_deref(), Some("Iron Temple"));
    assert_eq!(updated.gym_logo, fetched.gym_logo);

    // Step 9: delete, then the record is gone.
    assert!(owners.delete_gym_owner(created.id).unwrap().success);
    assert!(matches!(owners.get_gym_owner_by_id(created.id), Err(ApiError::NotFound(_))));

    // Step 10: health info and support.
    assert!(health.update_health_info(1, "<p>Sleep well.</p>").unwrap().success);
    assert_eq!(health.get_health_info().unwrap()[0].content, "<p>Sleep well.</p>");
    let queries = support.get_all_support_queries().unwrap();
    assert_eq!(queries.first().map(|q| q.id), Some(2));

    // Step 11: logout revokes the server session and clears the local one.
    let old_token = tokens.get_token().unwrap();
    auth.logout().unwrap();
    assert_eq!(tokens.get_token(), None);
    assert_eq!(owners.get_all_gym_owners().unwrap_err(), ApiError::Unauthenticated);

    // Step 12: replaying the revoked token expires the session again.
    tokens.set_token(&old_token).unwrap();
    assert!(matches!(auth.get_admin_by_token(), Err(ApiError::SessionExpired(_))));
    assert_eq!(tokens.get_token(), None);
}

#[test]
fn unreachable_server_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let tokens = Arc::new(MemoryTokenStore::new());
    let health = HealthInfoService::new(client(&format!("http://127.0.0.1:{port}"), tokens));
    assert!(matches!(health.get_health_info(), Err(ApiError::Network(_))));
}

/// Serve one connection with a fixed raw HTTP response and return the base URL.
fn serve_once(response: &'static [u8]) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream.write_all(response).unwrap();
    });
    format!("http://{addr}")
}

#[test]
fn unauthorized_with_binary_body_still_expires_session() {
    let base_url = serve_once(b"HTTP/1.1 401 Unauthorized\r\nContent-Length: 2\r\nConnection: close\r\n\r\n\xff\xfe");
    let tokens = Arc::new(MemoryTokenStore::with_token("stale"));
    let c = client(&base_url, tokens.clone());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    c.on_session_event(move |e| sink.lock().unwrap().push(e));

    let err = c.api_fetch("/api/admin/get", RequestOptions::get()).unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired(_)));
    assert_eq!(tokens.get_token(), None);
    assert_eq!(*events.lock().unwrap(), vec![SessionEvent::Expired]);
}

#[test]
fn binary_success_body_is_parse_error() {
    let base_url = serve_once(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n\xff\xfe");
    let health = HealthInfoService::new(client(&base_url, Arc::new(MemoryTokenStore::new())));
    assert!(matches!(health.get_health_info(), Err(ApiError::Parse(_))));
}
