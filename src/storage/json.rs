use std::{
    fs::{self, OpenOptions, rename},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use fs2::FileExt;
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::to_string_pretty;
use uuid::Uuid;

use crate::{
    models::{
        project::Project, store::Store, task::Task, template::TaskTemplate, theme::Theme,
        user::User,
    },
    seed,
    storage::{Storage, StorageError},
};

const USERS_SLOT: &str = "guan-users";
const PROJECTS_SLOT: &str = "guan-projects";
const TASKS_SLOT: &str = "guan-tasks";
const TEMPLATES_SLOT: &str = "guan-templates";
const SESSION_SLOT: &str = "guan-currentUser";
const THEME_SLOT: &str = "theme";

const BACKUPS_PER_SLOT: usize = 5;

/// Directory-backed storage: one file per slot, named after the slot key.
pub struct JsonDirStorage {
    dir: PathBuf,
}

impl JsonDirStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(slot)
    }

    fn backup_dir(&self) -> PathBuf {
        self.dir.join("backups")
    }

    /// Missing slot and unreadable slot both resolve to the seed collection.
    /// The substitution is logged, never surfaced.
    fn load_slot<T, F>(&self, slot: &str, seed: F) -> Vec<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Vec<T>,
    {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(items) => items,
                Err(e) => {
                    warn!("slot '{slot}' holds invalid JSON ({e}); substituting seed data");
                    seed()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => seed(),
            Err(e) => {
                warn!("slot '{slot}' is unreadable ({e}); substituting seed data");
                seed()
            }
        }
    }

    /// Full-slot overwrite through a temp file, an exclusive lock, and a
    /// timestamped backup of the previous snapshot.
    fn save_slot<T: Serialize>(&self, slot: &str, items: &[T]) -> Result<(), StorageError> {
        let json = to_string_pretty(items).map_err(|e| StorageError::SerializeFailed { source: e })?;

        let path = self.slot_path(slot);
        let unique_temp = format!("{}.tmp.{}", path.display(), Uuid::new_v4());
        let temp_path = PathBuf::from(&unique_temp);
        fs::write(&temp_path, json).map_err(|e| StorageError::SaveFailed {
            path: temp_path.clone(),
            source: e,
        })?;

        let lock_file_path = path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .open(&lock_file_path)
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path.clone(),
                source: e,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path,
                source: e,
            })?;

        self.create_backup(slot)?;
        self.cleanup_old_backups(slot)?;

        rename(&temp_path, &path).map_err(|e| StorageError::SaveFailed {
            path: path.clone(),
            source: e,
        })?;

        lock_file.unlock().map_err(|e| StorageError::SaveFailed {
            path,
            source: e,
        })?;

        Ok(())
    }

    fn create_backup(&self, slot: &str) -> Result<(), StorageError> {
        let path = self.slot_path(slot);
        let slot_exists = fs::exists(&path).map_err(|e| StorageError::BackupFailed {
            path: path.clone(),
            source: e,
        })?;
        if !slot_exists {
            return Ok(());
        }

        let backups_dir = self.backup_dir();
        fs::create_dir_all(&backups_dir).map_err(|e| StorageError::BackupFailed {
            path: backups_dir.clone(),
            source: e,
        })?;

        let backup_path = backups_dir.join(format!("{}-{}", slot, jiff::Timestamp::now()));
        fs::copy(&path, &backup_path).map_err(|e| StorageError::BackupFailed {
            path: backup_path,
            source: e,
        })?;

        Ok(())
    }

    fn cleanup_old_backups(&self, slot: &str) -> Result<(), StorageError> {
        let backups_dir = self.backup_dir();
        let backups_dir_exists =
            fs::exists(&backups_dir).map_err(|e| StorageError::CleanupFailed {
                dir: backups_dir.clone(),
                source: e,
            })?;
        if !backups_dir_exists {
            return Ok(());
        }

        let prefix = format!("{}-", slot);
        let mut slot_backups = fs::read_dir(&backups_dir)
            .map_err(|e| StorageError::CleanupFailed {
                dir: backups_dir.clone(),
                source: e,
            })?
            .flatten()
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with(&prefix))
                    .unwrap_or(false)
            })
            .collect::<Vec<_>>();

        slot_backups.sort();

        let number_of_files_to_delete = slot_backups.len().saturating_sub(BACKUPS_PER_SLOT);
        for file_path in &slot_backups[0..number_of_files_to_delete] {
            fs::remove_file(file_path).map_err(|e| StorageError::CleanupFailed {
                dir: backups_dir.clone(),
                source: e,
            })?;
        }

        Ok(())
    }
}

impl Storage for JsonDirStorage {
    fn load(&self) -> Store {
        Store {
            users: self.load_slot(USERS_SLOT, seed::users),
            projects: self.load_slot(PROJECTS_SLOT, seed::projects),
            tasks: self.load_slot(TASKS_SLOT, seed::tasks),
            templates: self.load_slot(TEMPLATES_SLOT, seed::templates),
        }
    }

    fn save_users(&self, users: &[User]) -> Result<(), StorageError> {
        self.save_slot(USERS_SLOT, users)
    }

    fn save_projects(&self, projects: &[Project]) -> Result<(), StorageError> {
        self.save_slot(PROJECTS_SLOT, projects)
    }

    fn save_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        self.save_slot(TASKS_SLOT, tasks)
    }

    fn save_templates(&self, templates: &[TaskTemplate]) -> Result<(), StorageError> {
        self.save_slot(TEMPLATES_SLOT, templates)
    }

    fn load_session(&self) -> Option<Uuid> {
        let content = fs::read_to_string(self.slot_path(SESSION_SLOT)).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn save_session(&self, user_id: Uuid) -> Result<(), StorageError> {
        let path = self.slot_path(SESSION_SLOT);
        let json =
            serde_json::to_string(&user_id).map_err(|e| StorageError::SerializeFailed { source: e })?;
        fs::write(&path, json).map_err(|e| StorageError::SaveFailed { path, source: e })
    }

    fn clear_session(&self) -> Result<(), StorageError> {
        let path = self.slot_path(SESSION_SLOT);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::SaveFailed { path, source: e }),
        }
    }

    fn load_theme(&self) -> Theme {
        fs::read_to_string(self.slot_path(THEME_SLOT))
            .ok()
            .and_then(|content| content.parse().ok())
            .unwrap_or_default()
    }

    fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        let path = self.slot_path(THEME_SLOT);
        fs::write(&path, theme.as_str()).map_err(|e| StorageError::SaveFailed { path, source: e })
    }
}

/// Resolve the storage directory: `GUANTASK_DATA_DIR` wins, otherwise the
/// platform-local data dir.
pub fn default_data_dir() -> PathBuf {
    std::env::var("GUANTASK_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("guantask")
        })
}

pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}
