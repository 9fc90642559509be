use log::info;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        store::Store,
        template::{TaskTemplate, TemplateTask},
    },
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum SaveTemplateError {
    #[error("Template name must not be empty")]
    EmptyName,

    #[error("A template needs at least one task blueprint")]
    EmptyBlueprintList,

    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    #[error("Template name is ambiguous. Multiple templates found: {}", .0.join(", "))]
    AmbiguousTemplateName(Vec<String>),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct CreateTemplateParameters {
    pub name: String,
    pub tasks: Vec<TemplateTask>,
}

pub fn create_template(
    store: &mut Store,
    storage: &impl Storage,
    parameters: CreateTemplateParameters,
) -> Result<TaskTemplate, SaveTemplateError> {
    if parameters.name.trim().is_empty() {
        return Err(SaveTemplateError::EmptyName);
    }
    if parameters.tasks.is_empty() {
        return Err(SaveTemplateError::EmptyBlueprintList);
    }

    let template = TaskTemplate {
        id: Uuid::new_v4(),
        name: parameters.name,
        tasks: parameters.tasks,
    };

    let template_id = template.id;

    store.add_template(template);

    storage.save_templates(&store.templates)?;
    info!("template {template_id} created");

    Ok(store.get_template(template_id).unwrap().clone())
}

pub struct UpdateTemplateParameters {
    /// Substring of the template name, case-insensitive.
    pub template: String,
    pub name: Option<String>,
    /// When present, replaces the whole blueprint list.
    pub tasks: Option<Vec<TemplateTask>>,
}

pub fn update_template(
    store: &mut Store,
    storage: &impl Storage,
    parameters: UpdateTemplateParameters,
) -> Result<TaskTemplate, SaveTemplateError> {
    if let Some(name) = &parameters.name
        && name.trim().is_empty()
    {
        return Err(SaveTemplateError::EmptyName);
    }
    if let Some(tasks) = &parameters.tasks
        && tasks.is_empty()
    {
        return Err(SaveTemplateError::EmptyBlueprintList);
    }

    let template_id = resolve_template(store, &parameters.template).map_err(|e| match e {
        TemplateLookup::NotFound => SaveTemplateError::TemplateNotFound(parameters.template.clone()),
        TemplateLookup::Ambiguous(names) => SaveTemplateError::AmbiguousTemplateName(names),
    })?;

    let template = store.get_template_mut(template_id).unwrap();
    if let Some(name) = parameters.name {
        template.name = name;
    }
    if let Some(tasks) = parameters.tasks {
        template.tasks = tasks;
    }

    storage.save_templates(&store.templates)?;
    info!("template {template_id} updated");

    Ok(store.get_template(template_id).unwrap().clone())
}

#[derive(Debug, Error)]
pub enum DeleteTemplateError {
    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    #[error("Template name is ambiguous. Multiple templates found: {}", .0.join(", "))]
    AmbiguousTemplateName(Vec<String>),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct DeleteTemplateParameters {
    pub name: String,
}

pub fn delete_template(
    store: &mut Store,
    storage: &impl Storage,
    parameters: DeleteTemplateParameters,
) -> Result<TaskTemplate, DeleteTemplateError> {
    let template_id = resolve_template(store, &parameters.name).map_err(|e| match e {
        TemplateLookup::NotFound => DeleteTemplateError::TemplateNotFound(parameters.name.clone()),
        TemplateLookup::Ambiguous(names) => DeleteTemplateError::AmbiguousTemplateName(names),
    })?;

    let template = store.remove_template(template_id).unwrap();
    storage.save_templates(&store.templates)?;
    info!("template {template_id} deleted");

    Ok(template)
}

enum TemplateLookup {
    NotFound,
    Ambiguous(Vec<String>),
}

fn resolve_template(store: &Store, selector: &str) -> Result<Uuid, TemplateLookup> {
    let needle = selector.to_lowercase();
    let matching_templates: Vec<_> = store
        .templates
        .iter()
        .filter(|t| t.name.to_lowercase().contains(&needle))
        .collect();

    match matching_templates.len() {
        0 => Err(TemplateLookup::NotFound),
        1 => Ok(matching_templates[0].id),
        _ => {
            let names: Vec<String> = matching_templates.iter().map(|t| t.name.clone()).collect();
            Err(TemplateLookup::Ambiguous(names))
        }
    }
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

    fn blueprint(title: &str, offset: i64) -> TemplateTask {
        TemplateTask {
            title: title.to_string(),
            description: String::new(),
            due_offset_days: offset,
        }
    }

    #[test]
    fn create_appends_exactly_one_template_with_a_fresh_id() {
        let (_dir, storage) = storage();
        let mut store = Store::default();

        let template = create_template(
            &mut store,
            &storage,
            CreateTemplateParameters {
                name: String::from("Onboarding"),
                tasks: vec![blueprint("Kickoff", 2)],
            },
        )
        .unwrap();

        assert_eq!(store.templates.len(), 1);
        assert_eq!(store.templates[0].id, template.id);
        assert!(!template.id.is_nil());
    }

    #[test]
    fn empty_blueprint_list_is_rejected_and_nothing_changes() {
        let (_dir, storage) = storage();
        let mut store = Store::default();

        let result = create_template(
            &mut store,
            &storage,
            CreateTemplateParameters {
                name: String::from("Hollow"),
                tasks: vec![],
            },
        );

        assert!(matches!(result, Err(SaveTemplateError::EmptyBlueprintList)));
        assert!(store.templates.is_empty());
    }

    #[test]
    fn blank_name_is_rejected() {
        let (_dir, storage) = storage();
        let mut store = Store::default();

        let result = create_template(
            &mut store,
            &storage,
            CreateTemplateParameters {
                name: String::from("   "),
                tasks: vec![blueprint("Kickoff", 2)],
            },
        );

        assert!(matches!(result, Err(SaveTemplateError::EmptyName)));
        assert!(store.templates.is_empty());
    }

    #[test]
    fn update_overwrites_name_and_blueprints() {
        let (_dir, storage) = storage();
        let mut store = Store::default();
        let created = create_template(
            &mut store,
            &storage,
            CreateTemplateParameters {
                name: String::from("Onboarding"),
                tasks: vec![blueprint("Kickoff", 2)],
            },
        )
        .unwrap();

        let updated = update_template(
            &mut store,
            &storage,
            UpdateTemplateParameters {
                template: String::from("onboarding"),
                name: Some(String::from("Onboarding v2")),
                tasks: Some(vec![blueprint("Kickoff", 1), blueprint("Training", 7)]),
            },
        )
        .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Onboarding v2");
        assert_eq!(updated.tasks.len(), 2);
        assert_eq!(store.templates.len(), 1);
    }

    #[test]
    fn update_with_empty_blueprints_is_rejected_before_lookup() {
        let (_dir, storage) = storage();
        let mut store = Store::default();
        create_template(
            &mut store,
            &storage,
            CreateTemplateParameters {
                name: String::from("Onboarding"),
                tasks: vec![blueprint("Kickoff", 2)],
            },
        )
        .unwrap();

        let result = update_template(
            &mut store,
            &storage,
            UpdateTemplateParameters {
                template: String::from("onboarding"),
                name: None,
                tasks: Some(vec![]),
            },
        );

        assert!(matches!(result, Err(SaveTemplateError::EmptyBlueprintList)));
        assert_eq!(store.templates[0].tasks.len(), 1);
    }

    #[test]
    fn delete_removes_the_template() {
        let (_dir, storage) = storage();
        let mut store = storage.load();
        assert_eq!(store.templates.len(), 1);

        delete_template(
            &mut store,
            &storage,
            DeleteTemplateParameters {
                name: String::from("onboarding"),
            },
        )
        .unwrap();

        assert!(store.templates.is_empty());
        assert!(storage.load().templates.is_empty());
    }
}
