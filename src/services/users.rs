use log::info;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        store::Store,
        user::{Role, User},
    },
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum CreateUserError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct CreateUserParameters {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub password: Option<String>,
}

pub fn create_user(
    store: &mut Store,
    storage: &impl Storage,
    parameters: CreateUserParameters,
) -> Result<User, CreateUserError> {
    let user = User {
        id: Uuid::new_v4(),
        name: parameters.name,
        email: parameters.email,
        phone: parameters.phone,
        role: parameters.role,
        password: parameters.password,
    };

    let user_id = user.id;

    store.add_user(user);

    storage.save_users(&store.users)?;
    info!("user {user_id} created");

    Ok(store.get_user(user_id).unwrap().clone())
}

#[derive(Debug, Error)]
pub enum UpdateUserError {
    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("User name is ambiguous. Multiple users found: {}", .0.join(", "))]
    AmbiguousUserName(Vec<String>),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct UpdateUserParameters {
    /// Substring of the user's name or email, case-insensitive.
    pub user: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

pub fn update_user(
    store: &mut Store,
    storage: &impl Storage,
    parameters: UpdateUserParameters,
) -> Result<User, UpdateUserError> {
    let needle = parameters.user.to_lowercase();
    let matching_users: Vec<_> = store
        .users
        .iter()
        .filter(|u| {
            u.name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
        })
        .collect();

    let user_id = match matching_users.len() {
        0 => return Err(UpdateUserError::UserNotFound(parameters.user)),
        1 => matching_users[0].id,
        _ => {
            let names: Vec<String> = matching_users.iter().map(|u| u.name.clone()).collect();
            return Err(UpdateUserError::AmbiguousUserName(names));
        }
    };

    let user = store.get_user_mut(user_id).unwrap();
    if let Some(name) = parameters.name {
        user.name = name;
    }
    if let Some(email) = parameters.email {
        user.email = email;
    }
    if let Some(phone) = parameters.phone {
        user.phone = phone;
    }
    if let Some(role) = parameters.role {
        user.role = role;
    }
    if let Some(password) = parameters.password {
        user.password = Some(password);
    }

    storage.save_users(&store.users)?;
    info!("user {user_id} updated");

    Ok(store.get_user(user_id).unwrap().clone())
}

#[derive(Debug, Error)]
pub enum DeleteUserError {
    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("User name is ambiguous. Multiple users found: {}", .0.join(", "))]
    AmbiguousUserName(Vec<String>),

    #[error("You cannot delete the account you are logged in with")]
    CannotDeleteSelf,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct DeleteUserParameters {
    /// Substring of the user's name or email, case-insensitive.
    pub user: String,
    /// Id of the session user; deleting it is blocked.
    pub current_user_id: Uuid,
}

pub struct DeleteUserResult {
    pub user: User,
    pub unassigned_tasks_count: usize,
}

/// Removes the user and clears the assignee of every task that pointed at
/// them. Tasks are persisted before the Users collection so an interrupted
/// cascade can only leave extra unassigned tasks, never a reference to a
/// user that is already gone.
pub fn delete_user(
    store: &mut Store,
    storage: &impl Storage,
    parameters: DeleteUserParameters,
) -> Result<DeleteUserResult, DeleteUserError> {
    let needle = parameters.user.to_lowercase();
    let matching_users: Vec<_> = store
        .users
        .iter()
        .filter(|u| {
            u.name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
        })
        .collect();

    let user_id = match matching_users.len() {
        0 => return Err(DeleteUserError::UserNotFound(parameters.user)),
        1 => matching_users[0].id,
        _ => {
            let names: Vec<String> = matching_users.iter().map(|u| u.name.clone()).collect();
            return Err(DeleteUserError::AmbiguousUserName(names));
        }
    };

    if user_id == parameters.current_user_id {
        return Err(DeleteUserError::CannotDeleteSelf);
    }

    let mut unassigned_tasks_count = 0;
    for task in store.tasks.iter_mut() {
        if task.assignee_id == Some(user_id) {
            task.assignee_id = None;
            unassigned_tasks_count += 1;
        }
    }

    info!("deleting user {user_id}, unassigning {unassigned_tasks_count} task(s)");
    if unassigned_tasks_count > 0 {
        storage.save_tasks(&store.tasks)?;
        info!("cascade step 1/2: tasks persisted");
    }

    let user = store.remove_user(user_id).unwrap();
    storage.save_users(&store.users)?;
    info!("cascade step 2/2: users persisted");

    Ok(DeleteUserResult {
        user,
        unassigned_tasks_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::JsonDirStorage;

    fn storage() -> (tempfile::TempDir, JsonDirStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonDirStorage::new(dir.path().to_path_buf());
        (dir, storage)
    }

    fn params(name: &str, email: &str) -> CreateUserParameters {
        CreateUserParameters {
            name: name.to_string(),
            email: email.to_string(),
            phone: String::from("11900001111"),
            role: Role::Collaborator,
            password: Some(String::from("pw")),
        }
    }

    #[test]
    fn create_appends_with_a_generated_id() {
        let (_dir, storage) = storage();
        let mut store = Store::default();

        let user = create_user(&mut store, &storage, params("Dana", "dana@example.com")).unwrap();

        assert_eq!(store.users.len(), 1);
        assert_eq!(store.users[0].id, user.id);
        assert!(!user.id.is_nil());
    }

    #[test]
    fn delete_unassigns_every_task_of_the_removed_user() {
        let (_dir, storage) = storage();
        let mut store = storage.load();

        let victim = store
            .users
            .iter()
            .find(|u| u.name == "Bruno Costa")
            .unwrap()
            .clone();
        let admin_id = store
            .users
            .iter()
            .find(|u| u.role == Role::Admin)
            .unwrap()
            .id;
        let owned_before = store
            .tasks
            .iter()
            .filter(|t| t.assignee_id == Some(victim.id))
            .count();
        assert!(owned_before > 0);

        let result = delete_user(
            &mut store,
            &storage,
            DeleteUserParameters {
                user: String::from("bruno"),
                current_user_id: admin_id,
            },
        )
        .unwrap();

        assert_eq!(result.unassigned_tasks_count, owned_before);
        assert!(store.get_user(victim.id).is_none());
        assert!(store.tasks.iter().all(|t| t.assignee_id != Some(victim.id)));

        // The cascade is persisted, not just in memory.
        let reloaded = storage.load();
        assert!(reloaded.get_user(victim.id).is_none());
        assert!(
            reloaded
                .tasks
                .iter()
                .all(|t| t.assignee_id != Some(victim.id))
        );
    }

    #[test]
    fn deleting_the_session_user_is_blocked_and_changes_nothing() {
        let (_dir, storage) = storage();
        let mut store = storage.load();

        let admin_id = store
            .users
            .iter()
            .find(|u| u.role == Role::Admin)
            .unwrap()
            .id;
        let users_before = store.users.len();
        let assigned_before = store
            .tasks
            .iter()
            .filter(|t| t.assignee_id == Some(admin_id))
            .count();

        let result = delete_user(
            &mut store,
            &storage,
            DeleteUserParameters {
                user: String::from("paulo"),
                current_user_id: admin_id,
            },
        );

        assert!(matches!(result, Err(DeleteUserError::CannotDeleteSelf)));
        assert_eq!(store.users.len(), users_before);
        assert_eq!(
            store
                .tasks
                .iter()
                .filter(|t| t.assignee_id == Some(admin_id))
                .count(),
            assigned_before
        );
    }

    #[test]
    fn ambiguous_selector_lists_the_candidates() {
        let (_dir, storage) = storage();
        let mut store = Store::default();
        create_user(&mut store, &storage, params("Ana Lima", "ana@example.com")).unwrap();
        create_user(&mut store, &storage, params("Ana Souza", "souza@example.com")).unwrap();

        let result = delete_user(
            &mut store,
            &storage,
            DeleteUserParameters {
                user: String::from("ana"),
                current_user_id: Uuid::new_v4(),
            },
        );

        match result {
            Err(DeleteUserError::AmbiguousUserName(names)) => assert_eq!(names.len(), 2),
            _ => panic!("expected ambiguous error"),
        }
        assert_eq!(store.users.len(), 2);
    }

    #[test]
    fn update_overwrites_only_the_provided_fields() {
        let (_dir, storage) = storage();
        let mut store = Store::default();
        let created =
            create_user(&mut store, &storage, params("Dana", "dana@example.com")).unwrap();

        let updated = update_user(
            &mut store,
            &storage,
            UpdateUserParameters {
                user: String::from("dana"),
                name: Some(String::from("Dana B.")),
                email: None,
                phone: None,
                role: Some(Role::Admin),
                password: None,
            },
        )
        .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Dana B.");
        assert_eq!(updated.email, "dana@example.com");
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.password.as_deref(), Some("pw"));
    }
}
