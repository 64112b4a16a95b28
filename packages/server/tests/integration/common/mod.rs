use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::storage::{BucketPolicy, FilesystemStore, ObjectStore};
use reqwest::Client;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;

use server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, RecallConfig, S3Config, ServerConfig,
    StorageConfig,
};
use server::sms::{SmsError, SmsOutcome, SmsSender};
use server::state::AppState;
use server::trash::PhotoTrash;

pub mod routes {
    pub const REGISTER: &str = "/api/v1/auth/register";
    pub const LOGIN: &str = "/api/v1/auth/login";
    pub const ME: &str = "/api/v1/auth/me";
    pub const SHOWINGS: &str = "/api/v1/showings";
    pub const SMS_SEND: &str = "/api/v1/sms/send";
    pub const CASES: &str = "/api/v1/recall/cases";
    pub const CASES_DELETED: &str = "/api/v1/recall/cases/deleted";
    pub const CASES_SEARCH: &str = "/api/v1/recall/cases/search";
    pub const LOGS_SEARCH: &str = "/api/v1/recall/logs/search";
    pub const STORAGE_HEALTH: &str = "/api/v1/recall/storage/health";

    pub fn showing(id: &str) -> String {
        format!("/api/v1/showings/{id}")
    }

    pub fn public_showing(token: &str) -> String {
        format!("/api/v1/r/{token}")
    }

    pub fn public_feedback(token: &str) -> String {
        format!("/api/v1/r/{token}/feedback")
    }

    pub fn public_photos(token: &str) -> String {
        format!("/api/v1/r/{token}/photos")
    }

    pub fn case(id: &str) -> String {
        format!("/api/v1/recall/cases/{id}")
    }

    pub fn case_restore(id: &str) -> String {
        format!("/api/v1/recall/cases/{id}/restore")
    }

    pub fn case_logs(id: &str) -> String {
        format!("/api/v1/recall/cases/{id}/logs")
    }

    pub fn case_export_pdf(id: &str) -> String {
        format!("/api/v1/recall/cases/{id}/export/pdf")
    }

    pub fn case_export_zip(id: &str) -> String {
        format!("/api/v1/recall/cases/{id}/export/zip")
    }

    pub fn log(id: &str) -> String {
        format!("/api/v1/recall/logs/{id}")
    }

    pub fn log_photos(id: &str) -> String {
        format!("/api/v1/recall/logs/{id}/photos")
    }

    pub fn log_photos_cleanup(id: &str) -> String {
        format!("/api/v1/recall/logs/{id}/photos/cleanup")
    }

    pub fn log_trash(id: &str) -> String {
        format!("/api/v1/recall/logs/{id}/trash")
    }

    pub fn log_export_zip(id: &str) -> String {
        format!("/api/v1/recall/logs/{id}/export/zip")
    }

    pub fn photo(id: &str) -> String {
        format!("/api/v1/recall/photos/{id}")
    }

    pub fn photo_download(id: &str) -> String {
        format!("/api/v1/recall/photos/{id}/download")
    }

    pub fn photo_trash(id: &str) -> String {
        format!("/api/v1/recall/photos/{id}/trash")
    }

    pub fn photo_restore(id: &str) -> String {
        format!("/api/v1/recall/photos/{id}/restore")
    }
}

/// Recording SMS sender: every send succeeds and is captured for assertions.
#[derive(Default)]
pub struct StubSms {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl SmsSender for StubSms {
    async fn send(&self, to: &str, body: &str) -> Result<SmsOutcome, SmsError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((to.to_string(), body.to_string()));
        Ok(SmsOutcome {
            message_sid: format!("SM_test_{}", sent.len()),
            to: to.to_string(),
        })
    }
}

/// A running test server backed by a throwaway SQLite file and filesystem
/// object stores, all under one temp directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub sms: Arc<StubSms>,
    _data_dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

/// Raw download response for file endpoints.
pub struct TestDownload {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub content_disposition: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = data_dir.path().join("recap-test.db");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let db = server::database::init_db(&db_url)
            .await
            .expect("Failed to initialize test database");

        let objects_root = data_dir.path().join("objects");
        let recall_store: Arc<dyn ObjectStore> = Arc::new(
            FilesystemStore::new(&objects_root, "recall", BucketPolicy::recall())
                .await
                .expect("Failed to create recall store"),
        );
        let showing_store: Arc<dyn ObjectStore> = Arc::new(
            FilesystemStore::new(&objects_root, "showing-photos", BucketPolicy::showing())
                .await
                .expect("Failed to create showing store"),
        );

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
                public_base_url: "http://testserver".to_string(),
            },
            database: DatabaseConfig {
                url: db_url.clone(),
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-for-integration-tests".to_string(),
            },
            storage: StorageConfig {
                backend: "filesystem".to_string(),
                filesystem_root: objects_root.display().to_string(),
                recall_bucket: "recall".to_string(),
                showing_bucket: "showing-photos".to_string(),
                s3: S3Config::default(),
            },
            recall: RecallConfig {
                compose_log_types: [
                    "Before",
                    "During",
                    "After",
                    "Issue",
                    "Resolution",
                    "Call",
                    "Visit",
                    "General",
                ]
                .map(String::from)
                .to_vec(),
                edit_log_types: [
                    "Before",
                    "During",
                    "After",
                    "Issue",
                    "Resolution",
                    "Call",
                    "Visit",
                    "Invoice",
                ]
                .map(String::from)
                .to_vec(),
            },
        };

        let sms = Arc::new(StubSms::default());
        let state = AppState {
            db: db.clone(),
            config: app_config,
            recall_store,
            showing_store,
            sms: sms.clone(),
            photo_trash: Arc::new(PhotoTrash::new()),
        };

        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            sms,
            _data_dir: data_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn patch_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .patch(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send PATCH request");

        TestResponse::from_response(res).await
    }

    pub async fn delete_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// Multipart upload of in-memory files, one `files` field per entry of
    /// `(filename, bytes, mime type)`.
    pub async fn upload_with_token(
        &self,
        path: &str,
        files: Vec<(&str, Vec<u8>, &str)>,
        token: &str,
    ) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .multipart(multipart_form(files))
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    /// Unauthenticated multipart upload, for the public showing route.
    pub async fn upload_without_token(
        &self,
        path: &str,
        files: Vec<(&str, Vec<u8>, &str)>,
    ) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .multipart(multipart_form(files))
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    /// GET a file endpoint, keeping the raw bytes and download headers.
    pub async fn download_with_token(&self, path: &str, token: &str) -> TestDownload {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        let status = res.status().as_u16();
        let content_type = header_string(&res, "content-type");
        let content_disposition = header_string(&res, "content-disposition");
        let bytes = res
            .bytes()
            .await
            .expect("Failed to read response body")
            .to_vec();

        TestDownload {
            status,
            bytes,
            content_type,
            content_disposition,
        }
    }

    /// Register a user and log in, returning the auth token.
    pub async fn create_authenticated_user(&self, username: &str, password: &str) -> String {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });

        let reg = self.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(reg.status, 201, "Registration failed: {}", reg.text);

        let res = self.post_without_token(routes::LOGIN, &body).await;
        assert_eq!(res.status, 200, "Login failed: {}", res.text);

        res.body["token"]
            .as_str()
            .expect("Login response should contain a token")
            .to_string()
    }

    /// Create a case via the API and return its `id`.
    pub async fn create_case(&self, token: &str, title: &str) -> String {
        let res = self
            .post_with_token(routes::CASES, &serde_json::json!({ "title": title }), token)
            .await;
        assert_eq!(res.status, 201, "create_case failed: {}", res.text);
        res.id()
    }

    /// Create a log on a case via the API and return its `id`.
    pub async fn create_log(&self, case_id: &str, token: &str) -> String {
        let res = self
            .post_with_token(
                &routes::case_logs(case_id),
                &serde_json::json!({
                    "log_type": "Issue",
                    "note": "Pipe joint leaking behind the north wall",
                }),
                token,
            )
            .await;
        assert_eq!(res.status, 201, "create_log failed: {}", res.text);
        res.id()
    }

    /// Create a showing via the API; returns `(id, public_token)`.
    pub async fn create_showing(&self, token: &str) -> (String, String) {
        let res = self
            .post_with_token(
                routes::SHOWINGS,
                &serde_json::json!({
                    "buyer_name": "Jordan Blake",
                    "buyer_phone": "+14155551234",
                    "buyer_email": "jordan@example.com",
                    "address": "123 Main St",
                    "city": "San Francisco",
                    "state": "CA",
                    "zip": "94105",
                    "showing_datetime": "2025-06-01T14:30:00Z",
                }),
                token,
            )
            .await;
        assert_eq!(res.status, 201, "create_showing failed: {}", res.text);

        let id = res.body["showing"]["id"]
            .as_str()
            .expect("showing id")
            .to_string();
        let public_token = res.body["showing"]["public_token"]
            .as_str()
            .expect("showing public_token")
            .to_string();
        (id, public_token)
    }

    /// Upload one photo to a log via the API and return the photo `id`.
    pub async fn upload_log_photo(&self, log_id: &str, token: &str) -> String {
        let res = self
            .upload_with_token(
                &routes::log_photos(log_id),
                vec![("site.jpg", b"fake-jpeg-bytes".to_vec(), "image/jpeg")],
                token,
            )
            .await;
        assert_eq!(res.status, 201, "photo upload failed: {}", res.text);
        res.body["uploaded"][0]["id"]
            .as_str()
            .expect("uploaded photo id")
            .to_string()
    }
}

fn multipart_form(files: Vec<(&str, Vec<u8>, &str)>) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    for (name, bytes, mime) in files {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(mime)
            .expect("Failed to set MIME type");
        form = form.part("files", part);
    }
    form
}

fn header_string(res: &reqwest::Response, name: &str) -> String {
    res.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    /// The `id` field of the JSON body (a UUID).
    pub fn id(&self) -> String {
        self.body["id"]
            .as_str()
            .expect("response body should contain 'id'")
            .to_string()
    }
}
