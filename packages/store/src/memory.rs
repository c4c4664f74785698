use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Result, StoreError};
use crate::models::{Note, NoteId, User, UserId};
use crate::repo::{CredentialStore, NoteStore};

#[derive(Debug, Default)]
struct UserTable {
    last_id: i64,
    by_name: HashMap<String, UserId>,
    rows: HashMap<UserId, User>,
}

#[derive(Debug, Default)]
struct NoteTable {
    last_id: i64,
    rows: BTreeMap<NoteId, Note>,
}

/// In-memory store for tests and single-process deployments.
///
/// Users and notes live behind separate mutexes and no code path holds both at
/// once. Every guard is taken for a single map operation and released before
/// the future completes, so nothing awaits while a lock is held.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    users: Arc<Mutex<UserTable>>,
    notes: Arc<Mutex<NoteTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Each critical section leaves its table consistent, so a panic elsewhere
    // must not wedge the store.
    fn users(&self) -> MutexGuard<'_, UserTable> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notes(&self) -> MutexGuard<'_, NoteTable> {
        self.notes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_owner(note: &Note, owner: UserId) -> Result<()> {
    if note.owner_id == owner {
        Ok(())
    } else {
        Err(StoreError::NotOwned {
            owner: note.owner_id,
        })
    }
}

impl CredentialStore for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<UserId> {
        let mut users = self.users();
        if users.by_name.contains_key(username) {
            return Err(StoreError::DuplicateUsername);
        }
        users.last_id += 1;
        let id = UserId(users.last_id);
        users.by_name.insert(username.to_string(), id);
        users.rows.insert(
            id,
            User {
                id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(id)
    }

    async fn find_user(&self, username: &str) -> Result<User> {
        let users = self.users();
        users
            .by_name
            .get(username)
            .and_then(|id| users.rows.get(id))
            .cloned()
            .ok_or(StoreError::UnknownUser)
    }
}

impl NoteStore for MemoryStore {
    async fn create_note(&self, owner: UserId, title: &str, content: &str) -> Result<Note> {
        // Users are never removed, so the owner cannot vanish between the two locks.
        if !self.users().rows.contains_key(&owner) {
            return Err(StoreError::UnknownOwner(owner));
        }

        let mut notes = self.notes();
        notes.last_id += 1;
        let note = Note {
            id: NoteId(notes.last_id),
            title: title.to_string(),
            content: content.to_string(),
            owner_id: owner,
        };
        notes.rows.insert(note.id, note.clone());
        Ok(note)
    }

    async fn list_notes(&self, owner: UserId) -> Result<Vec<Note>> {
        Ok(self
            .notes()
            .rows
            .values()
            .filter(|note| note.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn get_note(&self, owner: UserId, id: NoteId) -> Result<Note> {
        let note = self
            .notes()
            .rows
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)?;
        check_owner(&note, owner)?;
        Ok(note)
    }

    async fn update_note(
        &self,
        owner: UserId,
        id: NoteId,
        title: &str,
        content: &str,
    ) -> Result<Note> {
        let mut notes = self.notes();
        let note = notes.rows.get_mut(&id).ok_or(StoreError::NotFound)?;
        check_owner(note, owner)?;
        note.title = title.to_string();
        note.content = content.to_string();
        Ok(note.clone())
    }

    async fn delete_note(&self, owner: UserId, id: NoteId) -> Result<()> {
        let mut notes = self.notes();
        let note = notes.rows.get(&id).ok_or(StoreError::NotFound)?;
        check_owner(note, owner)?;
        notes.rows.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn store_with_users() -> (MemoryStore, UserId, UserId) {
        let store = MemoryStore::new();
        let alice = store.create_user("alice", "hash-a").await.unwrap();
        let bob = store.create_user("bob", "hash-b").await.unwrap();
        (store, alice, bob)
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = MemoryStore::new();

        let id = store.create_user("alice", "hash").await.unwrap();
        assert_eq!(id, UserId(1));

        let user = store.find_user("alice").await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, "hash");

        assert!(matches!(
            store.find_user("nobody").await,
            Err(StoreError::UnknownUser)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_username_keeps_original() {
        let store = MemoryStore::new();
        store.create_user("alice", "first").await.unwrap();

        let err = store.create_user("alice", "second").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername));

        let user = store.find_user("alice").await.unwrap();
        assert_eq!(user.id, UserId(1));
        assert_eq!(user.password_hash, "first");

        // The failed attempt did not burn an id.
        assert_eq!(store.create_user("bob", "h").await.unwrap(), UserId(2));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_signup_same_name() {
        let store = MemoryStore::new();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.create_user("alice", &format!("h{i}")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_note_roundtrip() {
        let (store, alice, _) = store_with_users().await;

        let note = store.create_note(alice, "T", "C").await.unwrap();
        assert_eq!(note.id, NoteId(1));
        assert_eq!(note.owner_id, alice);

        let listed = store.list_notes(alice).await.unwrap();
        assert_eq!(listed, vec![note.clone()]);

        let updated = store
            .update_note(alice, note.id, "T2", "C2")
            .await
            .unwrap();
        assert_eq!(updated.title, "T2");
        assert_eq!(store.get_note(alice, note.id).await.unwrap(), updated);

        store.delete_note(alice, note.id).await.unwrap();
        assert!(matches!(
            store.get_note(alice, note.id).await,
            Err(StoreError::NotFound)
        ));
        assert!(store.list_notes(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_note_requires_existing_owner() {
        let store = MemoryStore::new();
        let err = store.create_note(UserId(42), "T", "C").await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownOwner(UserId(42))));
        assert!(store.list_notes(UserId(42)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_owner_cannot_touch_note() {
        let (store, alice, bob) = store_with_users().await;
        let note = store.create_note(alice, "secret", "body").await.unwrap();

        assert!(matches!(
            store.get_note(bob, note.id).await,
            Err(StoreError::NotOwned { owner }) if owner == alice
        ));
        assert!(matches!(
            store.update_note(bob, note.id, "x", "y").await,
            Err(StoreError::NotOwned { .. })
        ));
        assert!(matches!(
            store.delete_note(bob, note.id).await,
            Err(StoreError::NotOwned { .. })
        ));
        assert!(store.list_notes(bob).await.unwrap().is_empty());

        // Untouched for the real owner.
        let still = store.get_note(alice, note.id).await.unwrap();
        assert_eq!(still.title, "secret");
        assert_eq!(still.content, "body");
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_ordered() {
        let (store, alice, bob) = store_with_users().await;
        store.create_note(alice, "a1", "").await.unwrap();
        store.create_note(bob, "b1", "").await.unwrap();
        store.create_note(alice, "a2", "").await.unwrap();

        let titles: Vec<_> = store
            .list_notes(alice)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, ["a1", "a2"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_ids() {
        let (store, alice, _) = store_with_users().await;
        const N: usize = 200;

        let handles: Vec<_> = (0..N)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .create_note(alice, &format!("note {i}"), "body")
                        .await
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        assert_eq!(ids.len(), N);
        assert_eq!(store.list_notes(alice).await.unwrap().len(), N);
    }
}
