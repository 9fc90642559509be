use jiff::civil::Date;
use log::info;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        store::Store,
        task::{Status, Task},
    },
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum AddTaskError {
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Project name is ambiguous. Multiple projects found: {}", .0.join(", "))]
    AmbiguousProjectName(Vec<String>),

    #[error("User '{0}' not found")]
    AssigneeNotFound(String),

    #[error("User name is ambiguous. Multiple users found: {}", .0.join(", "))]
    AmbiguousAssigneeName(Vec<String>),

    #[error("Invalid due date '{0}': {1}")]
    InvalidDueDate(String, String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AddTaskParameters {
    pub title: String,
    pub description: String,
    pub due_date: String,
    /// Substring of a user's name or email; None leaves the task unassigned.
    pub assignee: Option<String>,
    /// Substring of the project name.
    pub project: String,
}

pub fn add_task(
    store: &mut Store,
    storage: &impl Storage,
    parameters: AddTaskParameters,
) -> Result<Task, AddTaskError> {
    // 1. Resolve project name to project ID
    let project_needle = parameters.project.to_lowercase();
    let matching_projects: Vec<_> = store
        .projects
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&project_needle))
        .collect();

    let project_id = match matching_projects.len() {
        0 => return Err(AddTaskError::ProjectNotFound(parameters.project)),
        1 => matching_projects[0].id,
        _ => {
            let names: Vec<String> = matching_projects.iter().map(|p| p.name.clone()).collect();
            return Err(AddTaskError::AmbiguousProjectName(names));
        }
    };

    // 2. Resolve assignee name to user ID, if any
    let assignee_id = if let Some(assignee_name) = parameters.assignee {
        let needle = assignee_name.to_lowercase();
        let matching_users: Vec<_> = store
            .users
            .iter()
            .filter(|u| {
                u.name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
            })
            .collect();

        match matching_users.len() {
            0 => return Err(AddTaskError::AssigneeNotFound(assignee_name)),
            1 => Some(matching_users[0].id),
            _ => {
                let names: Vec<String> = matching_users.iter().map(|u| u.name.clone()).collect();
                return Err(AddTaskError::AmbiguousAssigneeName(names));
            }
        }
    } else {
        None
    };

    // 3. Parse the due date
    let due_date = parameters
        .due_date
        .parse::<Date>()
        .map_err(|e| AddTaskError::InvalidDueDate(parameters.due_date.clone(), e.to_string()))?;

    // 4. Create the task; status always starts at Todo
    let task = Task {
        id: Uuid::new_v4(),
        title: parameters.title,
        description: parameters.description,
        due_date,
        assignee_id,
        project_id,
        status: Status::Todo,
        completed_at: None,
        created_at: jiff::Timestamp::now(),
    };

    let task_id = task.id;

    store.add_task(task);

    storage.save_tasks(&store.tasks)?;
    info!("task {task_id} created");

    Ok(store.get_task(task_id).unwrap().clone())
}

#[derive(Debug, Error)]
pub enum ToggleTaskError {
    #[error("Task '{0}' not found")]
    TaskNotFound(String),

    #[error("Task title is ambiguous. Multiple tasks found: {}", .0.join(", "))]
    AmbiguousTaskTitle(Vec<String>),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct ToggleTaskParameters {
    /// Full task UUID, or a substring of the title.
    pub task: String,
}

pub fn toggle_task(
    store: &mut Store,
    storage: &impl Storage,
    parameters: ToggleTaskParameters,
) -> Result<Task, ToggleTaskError> {
    let task_id = resolve_task(store, &parameters.task).map_err(|e| match e {
        TaskLookup::NotFound => ToggleTaskError::TaskNotFound(parameters.task.clone()),
        TaskLookup::Ambiguous(titles) => ToggleTaskError::AmbiguousTaskTitle(titles),
    })?;

    let task = store.get_task_mut(task_id).unwrap();
    task.toggle_status(jiff::Timestamp::now());
    let task = task.clone();

    storage.save_tasks(&store.tasks)?;
    info!("task {task_id} toggled to {:?}", task.status);

    Ok(task)
}

#[derive(Debug, Error)]
pub enum DeleteTaskError {
    #[error("Task '{0}' not found")]
    TaskNotFound(String),

    #[error("Task title is ambiguous. Multiple tasks found: {}", .0.join(", "))]
    AmbiguousTaskTitle(Vec<String>),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct DeleteTaskParameters {
    /// Full task UUID, or a substring of the title.
    pub task: String,
}

pub fn delete_task(
    store: &mut Store,
    storage: &impl Storage,
    parameters: DeleteTaskParameters,
) -> Result<Task, DeleteTaskError> {
    let task_id = resolve_task(store, &parameters.task).map_err(|e| match e {
        TaskLookup::NotFound => DeleteTaskError::TaskNotFound(parameters.task.clone()),
        TaskLookup::Ambiguous(titles) => DeleteTaskError::AmbiguousTaskTitle(titles),
    })?;

    let task = store.remove_task(task_id).unwrap();
    storage.save_tasks(&store.tasks)?;
    info!("task {task_id} deleted");

    Ok(task)
}

enum TaskLookup {
    NotFound,
    Ambiguous(Vec<String>),
}

/// Accepts a full UUID first, then falls back to a case-insensitive
/// substring match over titles.
fn resolve_task(store: &Store, selector: &str) -> Result<Uuid, TaskLookup> {
    if let Ok(id) = selector.parse::<Uuid>() {
        return match store.get_task(id) {
            Some(task) => Ok(task.id),
            None => Err(TaskLookup::NotFound),
        };
    }

    let needle = selector.to_lowercase();
    let matching_tasks: Vec<_> = store
        .tasks
        .iter()
        .filter(|t| t.title.to_lowercase().contains(&needle))
        .collect();

    match matching_tasks.len() {
        0 => Err(TaskLookup::NotFound),
        1 => Ok(matching_tasks[0].id),
        _ => {
            let titles: Vec<String> = matching_tasks.iter().map(|t| t.title.clone()).collect();
            Err(TaskLookup::Ambiguous(titles))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::projects::{CreateProjectParameters, create_project};
    use crate::storage::json::JsonDirStorage;

    fn storage() -> (tempfile::TempDir, JsonDirStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonDirStorage::new(dir.path().to_path_buf());
        (dir, storage)
    }

    fn store_with_project(storage: &JsonDirStorage) -> Store {
        let mut store = Store::default();
        create_project(
            &mut store,
            storage,
            CreateProjectParameters {
                name: String::from("Sprint"),
                description: String::new(),
            },
        )
        .unwrap();
        store
    }

    fn add(store: &mut Store, storage: &JsonDirStorage, title: &str) -> Task {
        add_task(
            store,
            storage,
            AddTaskParameters {
                title: title.to_string(),
                description: String::new(),
                due_date: String::from("2030-01-15"),
                assignee: None,
                project: String::from("sprint"),
            },
        )
        .unwrap()
    }

    #[test]
    fn new_tasks_start_todo_with_a_fresh_creation_stamp() {
        let (_dir, storage) = storage();
        let mut store = store_with_project(&storage);

        let before = jiff::Timestamp::now();
        let task = add(&mut store, &storage, "Write the brief");

        assert_eq!(task.status, Status::Todo);
        assert!(task.completed_at.is_none());
        assert!(task.created_at >= before);
        assert_eq!(store.tasks.len(), 1);
    }

    #[test]
    fn past_due_dates_are_accepted_without_complaint() {
        let (_dir, storage) = storage();
        let mut store = store_with_project(&storage);

        let task = add_task(
            &mut store,
            &storage,
            AddTaskParameters {
                title: String::from("Backfill"),
                description: String::new(),
                due_date: String::from("2001-01-01"),
                assignee: None,
                project: String::from("sprint"),
            },
        )
        .unwrap();

        assert_eq!(task.due_date, jiff::civil::date(2001, 1, 1));
    }

    #[test]
    fn malformed_due_date_is_rejected() {
        let (_dir, storage) = storage();
        let mut store = store_with_project(&storage);

        let result = add_task(
            &mut store,
            &storage,
            AddTaskParameters {
                title: String::from("Oops"),
                description: String::new(),
                due_date: String::from("friday-ish"),
                assignee: None,
                project: String::from("sprint"),
            },
        );

        assert!(matches!(result, Err(AddTaskError::InvalidDueDate(_, _))));
        assert!(store.tasks.is_empty());
    }

    #[test]
    fn toggling_twice_restores_status_and_completion_stamp() {
        let (_dir, storage) = storage();
        let mut store = store_with_project(&storage);
        let task = add(&mut store, &storage, "Flip me");

        let selector = ToggleTaskParameters {
            task: task.id.to_string(),
        };
        let done = toggle_task(&mut store, &storage, selector).unwrap();
        assert_eq!(done.status, Status::Done);
        assert!(done.completed_at.is_some());

        let selector = ToggleTaskParameters {
            task: task.id.to_string(),
        };
        let back = toggle_task(&mut store, &storage, selector).unwrap();
        assert_eq!(back.status, task.status);
        assert_eq!(back.completed_at, task.completed_at);
    }

    #[test]
    fn delete_removes_the_task_and_persists() {
        let (_dir, storage) = storage();
        let mut store = store_with_project(&storage);
        let task = add(&mut store, &storage, "Ephemeral");

        delete_task(
            &mut store,
            &storage,
            DeleteTaskParameters {
                task: String::from("ephemeral"),
            },
        )
        .unwrap();

        assert!(store.get_task(task.id).is_none());
        assert!(storage.load().get_task(task.id).is_none());
    }

    #[test]
    fn fuzzy_selector_reports_ambiguity() {
        let (_dir, storage) = storage();
        let mut store = store_with_project(&storage);
        add(&mut store, &storage, "Review homepage copy");
        add(&mut store, &storage, "Review pricing copy");

        let result = delete_task(
            &mut store,
            &storage,
            DeleteTaskParameters {
                task: String::from("review"),
            },
        );

        assert!(matches!(result, Err(DeleteTaskError::AmbiguousTaskTitle(_))));
        assert_eq!(store.tasks.len(), 2);
    }

    #[test]
    fn unknown_assignee_is_rejected() {
        let (_dir, storage) = storage();
        let mut store = store_with_project(&storage);

        let result = add_task(
            &mut store,
            &storage,
            AddTaskParameters {
                title: String::from("Orphan"),
                description: String::new(),
                due_date: String::from("2030-01-15"),
                assignee: Some(String::from("nobody")),
                project: String::from("sprint"),
            },
        );

        assert!(matches!(result, Err(AddTaskError::AssigneeNotFound(_))));
    }
}
