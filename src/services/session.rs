use log::info;
use thiserror::Error;

use crate::{
    models::{store::Store, user::User},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum LoginError {
    /// One literal message; unknown email and wrong password are not
    /// distinguished.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Case-sensitive plaintext comparison against the Users collection. On
/// success the user's id is persisted to the session slot.
pub fn login(
    store: &Store,
    storage: &impl Storage,
    email: &str,
    password: &str,
) -> Result<User, LoginError> {
    let user = store
        .users
        .iter()
        .find(|u| u.email == email && u.password.as_deref() == Some(password))
        .ok_or(LoginError::InvalidCredentials)?;

    storage.save_session(user.id)?;
    info!("session opened for '{}'", user.email);

    Ok(user.clone())
}

pub fn logout(storage: &impl Storage) -> Result<(), StorageError> {
    storage.clear_session()?;
    info!("session closed");
    Ok(())
}

/// Resolves the persisted session id against the live Users collection, so
/// profile edits show up without a re-login and a dangling id just reads as
/// "not logged in".
pub fn current_user<'a>(store: &'a Store, storage: &impl Storage) -> Option<&'a User> {
    storage.load_session().and_then(|id| store.get_user(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::JsonDirStorage;

    fn seeded() -> (tempfile::TempDir, JsonDirStorage, Store) {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonDirStorage::new(dir.path().to_path_buf());
        let store = storage.load();
        (dir, storage, store)
    }

    #[test]
    fn seed_admin_logs_in() {
        let (_dir, storage, store) = seeded();

        let user = login(&store, &storage, "paulo@guanais.com.br", "PauloP27").unwrap();
        assert_eq!(user.role, crate::models::user::Role::Admin);
        assert_eq!(storage.load_session(), Some(user.id));
    }

    #[test]
    fn wrong_password_leaves_session_unset() {
        let (_dir, storage, store) = seeded();

        let result = login(&store, &storage, "paulo@guanais.com.br", "nope");
        assert!(matches!(result, Err(LoginError::InvalidCredentials)));
        assert_eq!(storage.load_session(), None);
    }

    #[test]
    fn credential_comparison_is_case_sensitive() {
        let (_dir, storage, store) = seeded();

        let result = login(&store, &storage, "paulo@guanais.com.br", "paulop27");
        assert!(matches!(result, Err(LoginError::InvalidCredentials)));
    }

    #[test]
    fn logout_clears_the_session_slot() {
        let (_dir, storage, store) = seeded();

        login(&store, &storage, "bruno.costa@example.com", "user").unwrap();
        assert!(current_user(&store, &storage).is_some());

        logout(&storage).unwrap();
        assert!(current_user(&store, &storage).is_none());
    }

    #[test]
    fn session_resolution_reflects_live_profile_edits() {
        let (_dir, storage, mut store) = seeded();

        let user = login(&store, &storage, "bruno.costa@example.com", "user").unwrap();
        store.get_user_mut(user.id).unwrap().name = String::from("Bruno C.");

        let resolved = current_user(&store, &storage).unwrap();
        assert_eq!(resolved.name, "Bruno C.");
    }

    #[test]
    fn dangling_session_id_reads_as_logged_out() {
        let (_dir, storage, mut store) = seeded();

        let user = login(&store, &storage, "carla.dias@example.com", "user").unwrap();
        store.remove_user(user.id).unwrap();

        assert!(current_user(&store, &storage).is_none());
    }
}
