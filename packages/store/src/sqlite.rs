//! # SQLite-backed store
//!
//! [`SqliteStore`] persists users and notes through an sqlx connection pool.
//! The schema lives in `packages/store/migrations` and is applied by
//! [`SqliteStore::connect`], so a fresh database file is usable immediately.
//!
//! ## Layout
//!
//! ```text
//! users(id INTEGER PK, username TEXT UNIQUE, password_hash TEXT)
//! notes(id INTEGER PK, title TEXT, content TEXT, owner_id INTEGER REFERENCES users(id))
//! ```
//!
//! Uniqueness of `username` and the `owner_id` reference are enforced by SQLite
//! itself (foreign keys are switched on per connection), so this module holds
//! no lock of its own. Constraint violations are translated into
//! [`StoreError::DuplicateUsername`] and [`StoreError::UnknownOwner`].
//!
//! Owner scoping is part of every write's `WHERE` clause. When a write matches
//! nothing, one extra lookup decides between `NotFound` and `NotOwned`.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::error::{Result, StoreError};
use crate::models::{Note, NoteId, User, UserId};
use crate::repo::{CredentialStore, NoteStore};

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            username: row.username,
            password_hash: row.password_hash,
        }
    }
}

#[derive(FromRow)]
struct NoteRow {
    id: i64,
    title: String,
    content: String,
    owner_id: i64,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Self {
            id: NoteId(row.id),
            title: row.title,
            content: row.content,
            owner_id: UserId(row.owner_id),
        }
    }
}

/// Durable store on a SQLite database.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and apply migrations.
    ///
    /// In-memory URLs get a single long-lived connection, since every SQLite
    /// connection would otherwise see its own empty database.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        sqlx::migrate!().run(&pool).await?;
        tracing::debug!(url, "sqlite store ready");

        Ok(Self { pool })
    }

    /// Decide why an owner-scoped statement matched no row.
    async fn miss(&self, id: NoteId) -> StoreError {
        let owner: std::result::Result<Option<i64>, sqlx::Error> =
            sqlx::query_scalar("SELECT owner_id FROM notes WHERE id = ?")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await;
        match owner {
            Ok(Some(owner)) => StoreError::NotOwned {
                owner: UserId(owner),
            },
            Ok(None) => StoreError::NotFound,
            Err(e) => e.into(),
        }
    }
}

impl CredentialStore for SqliteStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<UserId> {
        let inserted = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await;

        match inserted {
            Ok(done) => Ok(UserId(done.last_insert_rowid())),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateUsername)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, username: &str) -> Result<User> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, password_hash FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::from).ok_or(StoreError::UnknownUser)
    }
}

impl NoteStore for SqliteStore {
    async fn create_note(&self, owner: UserId, title: &str, content: &str) -> Result<Note> {
        let inserted = sqlx::query("INSERT INTO notes (title, content, owner_id) VALUES (?, ?, ?)")
            .bind(title)
            .bind(content)
            .bind(owner.0)
            .execute(&self.pool)
            .await;

        match inserted {
            Ok(done) => Ok(Note {
                id: NoteId(done.last_insert_rowid()),
                title: title.to_string(),
                content: content.to_string(),
                owner_id: owner,
            }),
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                Err(StoreError::UnknownOwner(owner))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_notes(&self, owner: UserId) -> Result<Vec<Note>> {
        let rows: Vec<NoteRow> = sqlx::query_as(
            "SELECT id, title, content, owner_id FROM notes WHERE owner_id = ? ORDER BY id",
        )
        .bind(owner.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn get_note(&self, owner: UserId, id: NoteId) -> Result<Note> {
        let row: Option<NoteRow> =
            sqlx::query_as("SELECT id, title, content, owner_id FROM notes WHERE id = ?")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;

        let note = row.map(Note::from).ok_or(StoreError::NotFound)?;
        if note.owner_id != owner {
            return Err(StoreError::NotOwned {
                owner: note.owner_id,
            });
        }
        Ok(note)
    }

    async fn update_note(
        &self,
        owner: UserId,
        id: NoteId,
        title: &str,
        content: &str,
    ) -> Result<Note> {
        let row: Option<NoteRow> = sqlx::query_as(
            r#"
            UPDATE notes SET title = ?, content = ?
            WHERE id = ? AND owner_id = ?
            RETURNING id, title, content, owner_id
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(id.0)
        .bind(owner.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(self.miss(id).await),
        }
    }

    async fn delete_note(&self, owner: UserId, id: NoteId) -> Result<()> {
        let done = sqlx::query("DELETE FROM notes WHERE id = ? AND owner_id = ?")
            .bind(id.0)
            .bind(owner.0)
            .execute(&self.pool)
            .await?;

        if done.rows_affected() == 0 {
            return Err(self.miss(id).await);
        }
        Ok(())
    }
}
