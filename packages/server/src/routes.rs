//! Request handlers, the auth-gate layer and the JSON bodies they exchange.

use api::Identity;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use store::{Note, NoteId, UserId};

use crate::error::HttpError;
use crate::{AppState, NotesStore};

type HandlerResult<T> = Result<T, HttpError>;

#[derive(Debug, Deserialize)]
pub struct CredentialsBody {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct NoteBody {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Route layer for the note endpoints: resolves the caller once and hands the
/// [`Identity`] to the handler through request extensions.
pub async fn require_identity<S: NotesStore>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> HandlerResult<Response> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let identity = state.service.authorize(header)?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn signup<S: NotesStore>(
    State(state): State<AppState<S>>,
    body: Result<Json<CredentialsBody>, JsonRejection>,
) -> HandlerResult<(StatusCode, Json<SignupResponse>)> {
    let Json(body) = body?;
    let user_id = state.service.signup(&body.username, &body.password).await?;
    Ok((StatusCode::CREATED, Json(SignupResponse { user_id })))
}

pub async fn login<S: NotesStore>(
    State(state): State<AppState<S>>,
    body: Result<Json<CredentialsBody>, JsonRejection>,
) -> HandlerResult<Json<api::IssuedToken>> {
    let Json(body) = body?;
    let issued = state.service.login(&body.username, &body.password).await?;
    Ok(Json(issued))
}

pub async fn create_note<S: NotesStore>(
    State(state): State<AppState<S>>,
    Extension(who): Extension<Identity>,
    body: Result<Json<NoteBody>, JsonRejection>,
) -> HandlerResult<(StatusCode, Json<Note>)> {
    let Json(body) = body?;
    let note = state
        .service
        .create_note(who, &body.title, &body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn list_notes<S: NotesStore>(
    State(state): State<AppState<S>>,
    Extension(who): Extension<Identity>,
) -> HandlerResult<Json<Vec<Note>>> {
    Ok(Json(state.service.list_notes(who).await?))
}

pub async fn get_note<S: NotesStore>(
    State(state): State<AppState<S>>,
    Extension(who): Extension<Identity>,
    id: Result<Path<i64>, PathRejection>,
) -> HandlerResult<Json<Note>> {
    let Path(id) = id?;
    Ok(Json(state.service.get_note(who, NoteId(id)).await?))
}

pub async fn update_note<S: NotesStore>(
    State(state): State<AppState<S>>,
    Extension(who): Extension<Identity>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<NoteBody>, JsonRejection>,
) -> HandlerResult<Json<Note>> {
    let Path(id) = id?;
    let Json(body) = body?;
    let note = state
        .service
        .update_note(who, NoteId(id), &body.title, &body.content)
        .await?;
    Ok(Json(note))
}

pub async fn delete_note<S: NotesStore>(
    State(state): State<AppState<S>>,
    Extension(who): Extension<Identity>,
    id: Result<Path<i64>, PathRejection>,
) -> HandlerResult<StatusCode> {
    let Path(id) = id?;
    state.service.delete_note(who, NoteId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
