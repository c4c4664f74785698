//! # Notes service — signup, login and owner-scoped note operations
//!
//! [`NotesService`] owns the three pieces of process-wide state and is cloned
//! into every request handler:
//!
//! | Field | Lifecycle |
//! |-------|-----------|
//! | `store` | chosen at startup; its own concurrency discipline |
//! | `hasher` | immutable argon2 cost |
//! | `tokens` | signing secret, read-only after startup |
//!
//! ## Flows
//!
//! - **signup**: validate → hash (blocking pool) → `create_user`. The hash is
//!   computed before the store is touched, so no lock is ever held across it.
//! - **login**: `find_user` → verify (blocking pool) → issue token. An unknown
//!   username verifies against a decoy digest and fails with the same
//!   [`ApiError::InvalidCredentials`] as a wrong password.
//! - **authorize**: the gate; produces the [`Identity`] every note method requires.
//! - **notes**: thin owner-scoped calls into the store. A cross-owner hit is
//!   logged here with both ids, then reported as a plain `NotFound`.

use store::{CredentialStore, Note, NoteId, NoteStore, StoreError, UserId};
use tracing::{debug, error, info, warn};

use crate::auth::{self, Hasher, Identity, IssuedToken, TokenIssuer};
use crate::error::{ApiError, Result};
use crate::validate;

#[derive(Clone, Debug)]
pub struct NotesService<S> {
    store: S,
    hasher: Hasher,
    tokens: TokenIssuer,
}

impl<S> NotesService<S>
where
    S: CredentialStore + NoteStore + Send + Sync,
{
    pub fn new(store: S, hasher: Hasher, tokens: TokenIssuer) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Register a new account.
    pub async fn signup(&self, username: &str, password: &str) -> Result<UserId> {
        validate::username(username)?;
        validate::password(password)?;

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let digest = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        match self.store.create_user(username, &digest).await {
            Ok(id) => {
                info!(user_id = %id, username, "user signed up");
                Ok(id)
            }
            Err(StoreError::DuplicateUsername) => {
                debug!(username, "signup rejected: username taken");
                Err(ApiError::Conflict)
            }
            Err(e) => Err(self.storage_failure("create_user", e)),
        }
    }

    /// Check credentials and issue a session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken> {
        validate::password(password)?;

        let user = match self.store.find_user(username).await {
            Ok(user) => Some(user),
            Err(StoreError::UnknownUser) => None,
            Err(e) => return Err(self.storage_failure("find_user", e)),
        };

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let digest = user.as_ref().map(|u| u.password_hash.clone());
        let valid = tokio::task::spawn_blocking(move || match digest {
            Some(digest) => hasher.verify(&password, &digest),
            None => hasher.verify_decoy(&password),
        })
        .await??;

        match user {
            Some(user) if valid => {
                let issued = self.tokens.issue(user.id)?;
                info!(user_id = %user.id, "user logged in");
                Ok(issued)
            }
            _ => {
                info!(username, "login rejected");
                Err(ApiError::InvalidCredentials)
            }
        }
    }

    /// Gate for protected operations; `header` is the raw `Authorization` value.
    pub fn authorize(&self, header: Option<&str>) -> Result<Identity> {
        auth::authorize(header, &self.tokens).map_err(|e| {
            warn!(reason = %e, "request rejected by auth gate");
            ApiError::from(e)
        })
    }

    pub async fn create_note(&self, who: Identity, title: &str, content: &str) -> Result<Note> {
        validate::note(title, content)?;
        let note = self
            .store
            .create_note(who.user_id(), title, content)
            .await
            .map_err(|e| self.note_failure(who, None, e))?;
        debug!(user_id = %who.user_id(), note_id = %note.id, "note created");
        Ok(note)
    }

    pub async fn list_notes(&self, who: Identity) -> Result<Vec<Note>> {
        self.store
            .list_notes(who.user_id())
            .await
            .map_err(|e| self.note_failure(who, None, e))
    }

    pub async fn get_note(&self, who: Identity, id: NoteId) -> Result<Note> {
        self.store
            .get_note(who.user_id(), id)
            .await
            .map_err(|e| self.note_failure(who, Some(id), e))
    }

    pub async fn update_note(
        &self,
        who: Identity,
        id: NoteId,
        title: &str,
        content: &str,
    ) -> Result<Note> {
        validate::note(title, content)?;
        let note = self
            .store
            .update_note(who.user_id(), id, title, content)
            .await
            .map_err(|e| self.note_failure(who, Some(id), e))?;
        debug!(user_id = %who.user_id(), note_id = %id, "note updated");
        Ok(note)
    }

    pub async fn delete_note(&self, who: Identity, id: NoteId) -> Result<()> {
        self.store
            .delete_note(who.user_id(), id)
            .await
            .map_err(|e| self.note_failure(who, Some(id), e))?;
        debug!(user_id = %who.user_id(), note_id = %id, "note deleted");
        Ok(())
    }

    fn note_failure(&self, who: Identity, id: Option<NoteId>, err: StoreError) -> ApiError {
        match &err {
            StoreError::NotOwned { owner } => {
                warn!(
                    user_id = %who.user_id(),
                    note_id = ?id,
                    owner_id = %owner,
                    "cross-owner note access refused"
                );
            }
            StoreError::UnknownOwner(owner) => {
                warn!(user_id = %owner, "valid token for unknown user");
            }
            StoreError::Backend(_) => return self.storage_failure("note", err),
            _ => {}
        }
        ApiError::from(err)
    }

    fn storage_failure(&self, op: &str, err: StoreError) -> ApiError {
        error!(op, error = %err, "storage failure");
        ApiError::from(err)
    }
}
