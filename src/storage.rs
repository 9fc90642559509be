use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    project::Project, store::Store, task::Task, template::TaskTemplate, theme::Theme, user::User,
};

pub mod json;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to save slot '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize slot to JSON: {source}")]
    SerializeFailed {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to create backup at '{path}': {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to cleanup old backups in '{dir}': {source}")]
    CleanupFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Named-slot persistence. Loads never fail: a missing or unreadable slot is
/// silently replaced by its seed collection. Saves overwrite the whole slot.
pub trait Storage {
    fn load(&self) -> Store;

    fn save_users(&self, users: &[User]) -> Result<(), StorageError>;
    fn save_projects(&self, projects: &[Project]) -> Result<(), StorageError>;
    fn save_tasks(&self, tasks: &[Task]) -> Result<(), StorageError>;
    fn save_templates(&self, templates: &[TaskTemplate]) -> Result<(), StorageError>;

    /// The session slot holds only the logged-in user's id; callers resolve
    /// it against the live Users collection.
    fn load_session(&self) -> Option<Uuid>;
    fn save_session(&self, user_id: Uuid) -> Result<(), StorageError>;
    fn clear_session(&self) -> Result<(), StorageError>;

    fn load_theme(&self) -> Theme;
    fn save_theme(&self, theme: Theme) -> Result<(), StorageError>;
}
