//! Read-only projections of the store, recomputed on every call.
//!
//! Each function preserves the underlying collection's insertion order and
//! applies no secondary sort. "Today" comes in as a parameter so bucket
//! boundaries are testable against a fixed clock.

use jiff::civil::Date;
use uuid::Uuid;

use crate::models::{
    store::Store,
    task::{Status, Task},
    user::{Role, User},
};

/// Tasks assigned to the current user, plus (for admins) every task that has
/// an assignee at all. Unassigned tasks are invisible even to admins; that
/// matches the observed product behavior.
pub fn my_tasks<'a>(store: &'a Store, current_user: &User) -> Vec<&'a Task> {
    store
        .tasks
        .iter()
        .filter(|t| {
            t.assignee_id == Some(current_user.id)
                || (current_user.role == Role::Admin && t.assignee_id.is_some())
        })
        .collect()
}

pub fn overdue<'a>(store: &'a Store, current_user: &User, today: Date) -> Vec<&'a Task> {
    my_tasks(store, current_user)
        .into_iter()
        .filter(|t| t.status == Status::Todo && t.due_date < today)
        .collect()
}

pub fn due_today<'a>(store: &'a Store, current_user: &User, today: Date) -> Vec<&'a Task> {
    my_tasks(store, current_user)
        .into_iter()
        .filter(|t| t.status == Status::Todo && t.due_date == today)
        .collect()
}

pub fn upcoming<'a>(store: &'a Store, current_user: &User, today: Date) -> Vec<&'a Task> {
    my_tasks(store, current_user)
        .into_iter()
        .filter(|t| t.status == Status::Todo && t.due_date > today)
        .collect()
}

pub struct CompletedEntry<'a> {
    pub task: &'a Task,
    /// Display name of the assignee, None when unassigned or dangling. The
    /// renderer prints the literal "N/A" marker for None.
    pub completed_by: Option<&'a str>,
}

pub fn completed_report(store: &Store) -> Vec<CompletedEntry<'_>> {
    store
        .tasks
        .iter()
        .filter(|t| t.status == Status::Done)
        .map(|t| CompletedEntry {
            task: t,
            completed_by: t
                .assignee_id
                .and_then(|id| store.get_user(id))
                .map(|u| u.name.as_str()),
        })
        .collect()
}

pub fn project_tasks<'a>(store: &'a Store, project_id: Uuid) -> Vec<&'a Task> {
    store.tasks_for_project(project_id).collect()
}
