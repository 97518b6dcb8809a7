//! Test harness for user migration.
//!
//! [`FakeDirectory`] serves the legacy directory's HTTP routes on an
//! ephemeral port. [`Host`] wires the migration provider into an in-memory
//! host through its factory, the way a real host would.

use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use dashmap::DashMap;
use kc_federation::{
    FederationConfig, FederationSession, UserFederationManager, UserStorageProviderFactory,
};
use kc_federation_migration::config::BASE_URI_KEY;
use kc_federation_migration::{MigrationProviderFactory, MigrationStorageProvider, PROVIDER_ID};
use kc_storage::memory::{InMemoryStore, PasswordPolicy};
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Installs a test subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kc_federation_migration=debug,kc_federation=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct DirectoryState {
    users: DashMap<String, (serde_json::Value, String)>,
    forced_status: Mutex<Option<StatusCode>>,
    details_calls: AtomicUsize,
    exists_calls: AtomicUsize,
    login_calls: AtomicUsize,
}

#[derive(Deserialize)]
struct LoginBody {
    password: String,
}

/// In-process legacy user directory.
pub struct FakeDirectory {
    base_uri: String,
    state: Arc<DirectoryState>,
    _shutdown_tx: oneshot::Sender<()>,
}

impl FakeDirectory {
    /// Starts the directory on an ephemeral port.
    pub async fn start() -> anyhow::Result<Self> {
        init_tracing();

        let state = Arc::new(DirectoryState::default());
        let app = Router::new()
            .route(
                "/migration/api/users/{username}/",
                get(user_details).head(user_exists).post(validate_login),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (_shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                tracing::error!("Fake directory error: {}", e);
            }
        });

        Ok(Self {
            base_uri: format!("http://{addr}/migration"),
            state,
            _shutdown_tx,
        })
    }

    /// Base URI to configure the provider with.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Adds a user record, keyed by its `email` field.
    pub fn add_user(&self, record: serde_json::Value, password: &str) {
        let key = record["email"].as_str().unwrap_or_default().to_string();
        self.add_user_at(&key, record, password);
    }

    /// Adds a user record under an explicit key.
    pub fn add_user_at(&self, key: &str, record: serde_json::Value, password: &str) {
        self.state
            .users
            .insert(key.to_string(), (record, password.to_string()));
    }

    /// Answers every request with the given status.
    pub fn force_status(&self, status: StatusCode) {
        *self.state.forced_status.lock() = Some(status);
    }

    /// Number of `GET` requests served.
    pub fn details_calls(&self) -> usize {
        self.state.details_calls.load(Ordering::SeqCst)
    }

    /// Number of `HEAD` requests served.
    pub fn exists_calls(&self) -> usize {
        self.state.exists_calls.load(Ordering::SeqCst)
    }

    /// Number of `POST` requests served.
    pub fn login_calls(&self) -> usize {
        self.state.login_calls.load(Ordering::SeqCst)
    }
}

async fn user_details(
    State(state): State<Arc<DirectoryState>>,
    Path(username): Path<String>,
) -> Response {
    state.details_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(status) = *state.forced_status.lock() {
        return status.into_response();
    }
    match state.users.get(&username) {
        Some(entry) => Json(entry.0.clone()).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn user_exists(
    State(state): State<Arc<DirectoryState>>,
    Path(username): Path<String>,
) -> StatusCode {
    state.exists_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(status) = *state.forced_status.lock() {
        return status;
    }
    if state.users.contains_key(&username) {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn validate_login(
    State(state): State<Arc<DirectoryState>>,
    Path(username): Path<String>,
    Json(body): Json<LoginBody>,
) -> StatusCode {
    state.login_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(status) = *state.forced_status.lock() {
        return status;
    }
    match state.users.get(&username) {
        Some(entry) if entry.1 == body.password => StatusCode::OK,
        Some(_) => StatusCode::FORBIDDEN,
        None => StatusCode::UNAUTHORIZED,
    }
}

/// Returns a base URI nothing is listening on.
pub fn unreachable_base_uri() -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}/migration"))
}

/// An in-memory host with the migration provider registered.
pub struct Host {
    /// Local storage shared by the session.
    pub store: Arc<InMemoryStore>,
    /// Realm the provider is configured for.
    pub realm_id: Uuid,
    /// Host adapter routing between local storage and the provider.
    pub manager: UserFederationManager<MigrationStorageProvider>,
}

impl Host {
    /// Configures a provider component for `base_uri` and creates it.
    pub fn new(base_uri: &str) -> anyhow::Result<Self> {
        let store = Arc::new(InMemoryStore::with_password_policy(
            PasswordPolicy::new().memory_cost(64).time_cost(1),
        ));
        let session = FederationSession::in_memory(Arc::clone(&store));
        let realm_id = Uuid::now_v7();

        let model = FederationConfig::builder()
            .realm_id(realm_id)
            .provider_type(PROVIDER_ID)
            .name("legacy")
            .config(BASE_URI_KEY, base_uri)
            .build()?;

        let factory = MigrationProviderFactory::new();
        factory.validate_configuration(&model)?;
        let provider = factory.create(&session, &model)?;

        Ok(Self {
            store,
            realm_id,
            manager: UserFederationManager::new(session, provider),
        })
    }
}
