use log::info;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{project::Project, store::Store},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum CreateProjectError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct CreateProjectParameters {
    pub name: String,
    pub description: String,
}

pub fn create_project(
    store: &mut Store,
    storage: &impl Storage,
    parameters: CreateProjectParameters,
) -> Result<Project, CreateProjectError> {
    let project = Project {
        id: Uuid::new_v4(),
        name: parameters.name,
        description: parameters.description,
    };

    let project_id = project.id;

    store.add_project(project);

    storage.save_projects(&store.projects)?;
    info!("project {project_id} created");

    Ok(store.get_project(project_id).unwrap().clone())
}

#[derive(Debug, Error)]
pub enum ProjectLookupError {
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Project name is ambiguous. Multiple projects found: {}", .0.join(", "))]
    AmbiguousProjectName(Vec<String>),
}

/// Case-insensitive substring match over project names.
pub fn find_project<'a>(store: &'a Store, name: &str) -> Result<&'a Project, ProjectLookupError> {
    let needle = name.to_lowercase();
    let matching_projects: Vec<_> = store
        .projects
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect();

    match matching_projects.len() {
        0 => Err(ProjectLookupError::ProjectNotFound(name.to_string())),
        1 => Ok(matching_projects[0]),
        _ => {
            let names: Vec<String> = matching_projects.iter().map(|p| p.name.clone()).collect();
            Err(ProjectLookupError::AmbiguousProjectName(names))
        }
    }
}

#[derive(Debug, Error)]
pub enum DeleteProjectError {
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Project name is ambiguous. Multiple projects found: {}", .0.join(", "))]
    AmbiguousProjectName(Vec<String>),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct DeleteProjectParameters {
    pub name: String,
}

pub struct DeleteProjectResult {
    pub project: Project,
    pub cascaded_tasks_count: usize,
}

/// Removes the project and every task referencing it. The Tasks slot is
/// persisted before the Projects slot: an interrupted cascade leaves a
/// project with fewer tasks, never tasks pointing at a deleted project.
pub fn delete_project(
    store: &mut Store,
    storage: &impl Storage,
    parameters: DeleteProjectParameters,
) -> Result<DeleteProjectResult, DeleteProjectError> {
    let needle = parameters.name.to_lowercase();
    let matching_projects: Vec<_> = store
        .projects
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect();

    let project_id = match matching_projects.len() {
        0 => return Err(DeleteProjectError::ProjectNotFound(parameters.name)),
        1 => matching_projects[0].id,
        _ => {
            let names: Vec<String> = matching_projects.iter().map(|p| p.name.clone()).collect();
            return Err(DeleteProjectError::AmbiguousProjectName(names));
        }
    };

    let tasks_before = store.tasks.len();
    store.tasks.retain(|t| t.project_id != project_id);
    let cascaded_tasks_count = tasks_before - store.tasks.len();

    info!("deleting project {project_id}, cascading {cascaded_tasks_count} task(s)");
    if cascaded_tasks_count > 0 {
        storage.save_tasks(&store.tasks)?;
        info!("cascade step 1/2: tasks persisted");
    }

    let project = store.remove_project(project_id).unwrap();
    storage.save_projects(&store.projects)?;
    info!("cascade step 2/2: projects persisted");

    Ok(DeleteProjectResult {
        project,
        cascaded_tasks_count,
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

    #[test]
    fn create_appends_with_a_generated_id() {
        let (_dir, storage) = storage();
        let mut store = Store::default();

        let project = create_project(
            &mut store,
            &storage,
            CreateProjectParameters {
                name: String::from("Novo Portal"),
                description: String::from("Portal do cliente."),
            },
        )
        .unwrap();

        assert_eq!(store.projects.len(), 1);
        assert_eq!(store.projects[0].id, project.id);
    }

    #[test]
    fn delete_cascades_to_every_task_of_the_project() {
        let (_dir, storage) = storage();
        let mut store = storage.load();

        let project = find_project(&store, "Lançamento Website").unwrap().clone();
        let project_tasks = store.tasks_for_project(project.id).count();
        assert!(project_tasks > 0);
        let other_tasks = store.tasks.len() - project_tasks;

        let result = delete_project(
            &mut store,
            &storage,
            DeleteProjectParameters {
                name: String::from("website"),
            },
        )
        .unwrap();

        assert_eq!(result.cascaded_tasks_count, project_tasks);
        assert!(store.get_project(project.id).is_none());
        assert!(store.tasks.iter().all(|t| t.project_id != project.id));
        assert_eq!(store.tasks.len(), other_tasks);

        let reloaded = storage.load();
        assert!(reloaded.get_project(project.id).is_none());
        assert!(reloaded.tasks.iter().all(|t| t.project_id != project.id));
    }

    #[test]
    fn unknown_project_is_reported_and_nothing_changes() {
        let (_dir, storage) = storage();
        let mut store = storage.load();
        let projects_before = store.projects.len();
        let tasks_before = store.tasks.len();

        let result = delete_project(
            &mut store,
            &storage,
            DeleteProjectParameters {
                name: String::from("does-not-exist"),
            },
        );

        assert!(matches!(result, Err(DeleteProjectError::ProjectNotFound(_))));
        assert_eq!(store.projects.len(), projects_before);
        assert_eq!(store.tasks.len(), tasks_before);
    }

    #[test]
    fn lookup_reports_ambiguity() {
        let (_dir, storage) = storage();
        let mut store = Store::default();
        for name in ["Campanha A", "Campanha B"] {
            create_project(
                &mut store,
                &storage,
                CreateProjectParameters {
                    name: name.to_string(),
                    description: String::new(),
                },
            )
            .unwrap();
        }

        let result = find_project(&store, "campanha");
        assert!(matches!(
            result,
            Err(ProjectLookupError::AmbiguousProjectName(_))
        ));
    }
}
