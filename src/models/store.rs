use uuid::Uuid;

use crate::models::{project::Project, task::Task, template::TaskTemplate, user::User};

/// In-memory holder of all four entity collections. Collections keep
/// insertion order; every view and report preserves it.
#[derive(Default)]
pub struct Store {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub templates: Vec<TaskTemplate>,
}

impl Store {
    pub fn get_user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn get_user_mut(&mut self, id: Uuid) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn get_project(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn get_task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_task_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn get_template(&self, id: Uuid) -> Option<&TaskTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn get_template_mut(&mut self, id: Uuid) -> Option<&mut TaskTemplate> {
        self.templates.iter_mut().find(|t| t.id == id)
    }

    pub fn add_user(&mut self, user: User) {
        self.users.push(user);
    }

    pub fn add_project(&mut self, project: Project) {
        self.projects.push(project);
    }

    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn add_template(&mut self, template: TaskTemplate) {
        self.templates.push(template);
    }

    pub fn remove_user(&mut self, id: Uuid) -> Option<User> {
        let index = self.users.iter().position(|u| u.id == id)?;
        Some(self.users.remove(index))
    }

    pub fn remove_project(&mut self, id: Uuid) -> Option<Project> {
        let index = self.projects.iter().position(|p| p.id == id)?;
        Some(self.projects.remove(index))
    }

    pub fn remove_task(&mut self, id: Uuid) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn remove_template(&mut self, id: Uuid) -> Option<TaskTemplate> {
        let index = self.templates.iter().position(|t| t.id == id)?;
        Some(self.templates.remove(index))
    }

    pub fn tasks_for_project(&self, project_id: Uuid) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.project_id == project_id)
    }
}
