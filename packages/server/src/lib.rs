//! # Server crate — HTTP front end for the notes service
//!
//! | Path | Gate | Handler |
//! |------|------|---------|
//! | `POST /signup` | none | [`routes::signup`] |
//! | `POST /login` | none | [`routes::login`] |
//! | `POST /notes`, `GET /notes` | bearer | [`routes::create_note`], [`routes::list_notes`] |
//! | `GET/PUT/DELETE /notes/{id}` | bearer | [`routes::get_note`], [`routes::update_note`], [`routes::delete_note`] |
//! | `GET /health` | none | [`routes::health`] |
//!
//! The note routes sit behind [`routes::require_identity`]; a request that does
//! not pass the gate never reaches a handler.

use anyhow::Context;
use api::{Backend, NotesService, Settings};
use axum::routing::{get, post};
use axum::{middleware, Router};
use store::{CredentialStore, MemoryStore, NoteStore, SqliteStore};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub mod error;
pub mod routes;

/// Any store the server can run against.
pub trait NotesStore: CredentialStore + NoteStore + Clone + Send + Sync + 'static {}

impl<T> NotesStore for T where T: CredentialStore + NoteStore + Clone + Send + Sync + 'static {}

#[derive(Clone)]
pub struct AppState<S> {
    pub service: NotesService<S>,
}

impl<S> AppState<S> {
    pub fn new(service: NotesService<S>) -> Self {
        Self { service }
    }
}

pub fn router<S: NotesStore>(state: AppState<S>) -> Router {
    let notes = Router::new()
        .route(
            "/notes",
            post(routes::create_note::<S>).get(routes::list_notes::<S>),
        )
        .route(
            "/notes/{id}",
            get(routes::get_note::<S>)
                .put(routes::update_note::<S>)
                .delete(routes::delete_note::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::require_identity::<S>,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .route("/signup", post(routes::signup::<S>))
        .route("/login", post(routes::login::<S>))
        .merge(notes)
        .with_state(state)
}

/// Serve `state` on an already bound listener until Ctrl-C.
pub async fn serve<S: NotesStore>(listener: TcpListener, state: AppState<S>) -> anyhow::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

/// Build the service from validated settings and run it.
pub async fn launch(settings: &Settings) -> anyhow::Result<()> {
    let hasher = settings.hasher()?;
    let tokens = settings.token_issuer()?;

    let listener = TcpListener::bind(&settings.server.listen)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.listen))?;
    info!("Server listening on {}", settings.server.listen);

    match settings.storage.backend {
        Backend::Memory => {
            warn!("Using in-memory storage; all data is lost on exit");
            let service = NotesService::new(MemoryStore::new(), hasher, tokens);
            serve(listener, AppState::new(service)).await
        }
        Backend::Sqlite => {
            let store = SqliteStore::connect(&settings.storage.database_url)
                .await
                .context("failed to open database")?;
            info!("Using sqlite storage");
            let service = NotesService::new(store, hasher, tokens);
            serve(listener, AppState::new(service)).await
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
