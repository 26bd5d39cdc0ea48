use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::json;

use userdesk_api::app::{AppServices, build_app};
use userdesk_core::Email;
use userdesk_infra::{AppConfig, InMemoryStore, UserRepository};

const JWT_SECRET: &str = "test-secret";
const BASE_URL: &str = "http://media.test";

struct TestServer {
    base_url: String,
    media_root: PathBuf,
    store: Arc<InMemoryStore>,
    handle: tokio::task::JoinHandle<()>,
    _tmp: tempfile::TempDir,
}

impl TestServer {
    async fn spawn() -> Self {
        let tmp = tempfile::tempdir().expect("failed to create temp media root");
        let media_root = tmp.path().join("media");
        let config = AppConfig {
            base_url: BASE_URL.to_string(),
            media_root: media_root.clone(),
            jwt_secret: JWT_SECRET.to_string(),
            ..AppConfig::default()
        };

        // Same router as prod, in-memory repositories, ephemeral port.
        let store = Arc::new(InMemoryStore::new());
        let services = AppServices::new(config, store.clone(), store.clone());
        let app = build_app(Arc::new(services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            media_root,
            store,
            handle,
            _tmp: tmp,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn picture_path(&self, filename: &str) -> PathBuf {
        self.media_root.join("profile_pictures").join(filename)
    }

    async fn deactivate(&self, email: &str) {
        let email = Email::parse(email).unwrap();
        let mut user = self.store.find_user_by_email(&email).await.unwrap().unwrap();
        user.is_active = false;
        self.store.update_user(user).await.unwrap();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn register(client: &reqwest::Client, srv: &TestServer, email: &str, password: &str) -> String {
    let res = client
        .post(srv.url("/auth/create-user"))
        .json(&json!({ "email": email, "password": password, "full_name": "Test User" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

fn decode(token: &str) -> serde_json::Value {
    jsonwebtoken::decode::<serde_json::Value>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .expect("token should decode with the server secret")
    .claims
}

fn mint(secret: &str, claims: serde_json::Value) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn assert_invalid_token(res: reqwest::Response) {
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["www-authenticate"], "Bearer");
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["detail"], "Could not validate credentials");
}

fn picture_form(address: &str, phone: &str, filename: &str, bytes: &'static [u8]) -> Form {
    Form::new()
        .text("address", address.to_string())
        .text("phone_number", phone.to_string())
        .part(
            "profile_picture",
            Part::bytes(bytes).file_name(filename.to_string()),
        )
}

async fn read(path: &Path) -> Vec<u8> {
    tokio::fs::read(path).await.expect("uploaded file should exist")
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn registration_token_identifies_the_new_user() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = register(&client, &srv, "ada@example.com", "pw").await;
    let claims = decode(&token);
    assert_eq!(claims["sub"], "ada@example.com");

    let res = client
        .get(srv.url("/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["id"], claims["id"]);
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["username"], "ada@example.com");
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv, "ada@example.com", "pw").await;

    let res = client
        .post(srv.url("/auth/create-user"))
        .json(&json!({ "email": "ada@example.com", "password": "other", "full_name": "Imposter" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_email_is_rejected() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(srv.url("/auth/create-user"))
        .json(&json!({ "email": "not-an-email", "password": "pw", "full_name": "X" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn registration_body_errors_use_the_json_error_shape() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(srv.url("/auth/create-user"))
        .json(&json!({ "email": "ada@example.com", "password": "pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        res.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert!(body["detail"].as_str().unwrap().contains("full_name"));
}

#[tokio::test]
async fn login_without_a_form_body_is_unauthorized() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(srv.url("/auth/token"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["www-authenticate"], "Bearer");
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Incorrect username or password");
}

#[tokio::test]
async fn login_with_correct_credentials_returns_token_and_user() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let reg_token = register(&client, &srv, "ada@example.com", "pw").await;

    let res = client
        .post(srv.url("/auth/token"))
        .form(&[("username", "ada@example.com"), ("password", "pw")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["id"], decode(&reg_token)["id"]);
    assert_eq!(decode(body["access_token"].as_str().unwrap())["sub"], "ada@example.com");
}

#[tokio::test]
async fn login_failures_are_unauthorized() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv, "ada@example.com", "pw").await;

    let attempts: [&[(&str, &str)]; 4] = [
        &[("username", "ada@example.com"), ("password", "wrong")],
        &[("username", "nobody@example.com"), ("password", "pw")],
        &[("password", "pw")],
        &[("username", ""), ("password", "pw")],
    ];

    for form in attempts {
        let res = client
            .post(srv.url("/auth/token"))
            .form(form)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "form {form:?}");
        assert_eq!(res.headers()["www-authenticate"], "Bearer");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["detail"], "Incorrect username or password");
    }
}

#[tokio::test]
async fn me_rejects_missing_and_invalid_tokens() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = register(&client, &srv, "ada@example.com", "pw").await;
    let claims = decode(&token);

    let now = Utc::now();
    let expired = mint(
        JWT_SECRET,
        json!({
            "sub": "ada@example.com",
            "id": claims["id"],
            "iat": (now - ChronoDuration::hours(2)).timestamp(),
            "exp": (now - ChronoDuration::hours(1)).timestamp(),
        }),
    );
    let forged = mint(
        "not-the-server-secret",
        json!({
            "sub": "ada@example.com",
            "id": claims["id"],
            "iat": now.timestamp(),
            "exp": (now + ChronoDuration::minutes(10)).timestamp(),
        }),
    );

    let res = client.get(srv.url("/auth/me")).send().await.unwrap();
    assert_invalid_token(res).await;

    for bad in ["garbage", expired.as_str(), forged.as_str()] {
        let res = client
            .get(srv.url("/auth/me"))
            .bearer_auth(bad)
            .send()
            .await
            .unwrap();
        assert_invalid_token(res).await;
    }
}

#[tokio::test]
async fn token_for_unknown_user_is_rejected() {
    let srv = TestServer::spawn().await;
    let now = Utc::now();
    let token = mint(
        JWT_SECRET,
        json!({
            "sub": "ghost@example.com",
            "id": "01890a5d-ac96-774b-bcce-b302099a8057",
            "iat": now.timestamp(),
            "exp": (now + ChronoDuration::minutes(10)).timestamp(),
        }),
    );

    let res = reqwest::Client::new()
        .get(srv.url("/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_invalid_token(res).await;
}

#[tokio::test]
async fn inactive_users_cannot_log_in_or_use_their_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = register(&client, &srv, "ada@example.com", "pw").await;

    srv.deactivate("ada@example.com").await;

    let res = client
        .post(srv.url("/auth/token"))
        .form(&[("username", "ada@example.com"), ("password", "pw")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Incorrect username or password");

    let res = client
        .get(srv.url("/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_invalid_token(res).await;
}

#[tokio::test]
async fn create_profile_stores_file_and_returns_url() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = register(&client, &srv, "ada@example.com", "pw").await;

    let res = client
        .post(srv.url("/auth/create-profile"))
        .bearer_auth(&token)
        .multipart(picture_form("12 Analytical Way", "+44 1234", "ada.png", b"png-bytes"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    let data = &body["data"];
    assert_eq!(data["user_id"], decode(&token)["id"]);
    assert_eq!(data["address"], "12 Analytical Way");
    assert_eq!(data["phone_number"], "+44 1234");
    assert_eq!(
        data["profile_picture"],
        format!("{BASE_URL}/media/profile_pictures/ada.png")
    );
    assert!(data["id"].as_str().is_some());

    assert_eq!(read(&srv.picture_path("ada.png")).await, b"png-bytes");
}

#[tokio::test]
async fn same_filename_uploads_overwrite_each_other() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let ada = register(&client, &srv, "ada@example.com", "pw").await;
    let bob = register(&client, &srv, "bob@example.com", "pw").await;

    for (token, bytes) in [(&ada, &b"first"[..]), (&bob, &b"second"[..])] {
        let res = client
            .post(srv.url("/auth/create-profile"))
            .bearer_auth(token)
            .multipart(picture_form("addr", "555", "avatar.png", bytes))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    assert_eq!(read(&srv.picture_path("avatar.png")).await, b"second");
}

#[tokio::test]
async fn upload_names_cannot_escape_the_media_directory() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = register(&client, &srv, "ada@example.com", "pw").await;

    let res = client
        .post(srv.url("/auth/create-profile"))
        .bearer_auth(&token)
        .multipart(picture_form("addr", "555", "../../escape.png", b"x"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["data"]["profile_picture"],
        format!("{BASE_URL}/media/profile_pictures/escape.png")
    );
    assert!(srv.picture_path("escape.png").exists());
}

#[tokio::test]
async fn create_profile_requires_auth_and_all_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/auth/create-profile"))
        .multipart(picture_form("addr", "555", "a.png", b"x"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let token = register(&client, &srv, "ada@example.com", "pw").await;
    let res = client
        .post(srv.url("/auth/create-profile"))
        .bearer_auth(&token)
        .multipart(Form::new().text("address", "addr").text("phone_number", "555"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "field required: profile_picture");

    let res = client
        .post(srv.url("/auth/create-profile"))
        .bearer_auth(&token)
        .json(&json!({ "address": "addr" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_multipart");
}
