use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Todo,
    Done,
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// UUID to identify the task
    pub id: Uuid,
    /// Title of the task
    pub title: String,
    /// Free-form description of the task
    pub description: String,
    /// Calendar date the task is due
    pub due_date: Date,
    /// The user assigned to this task. None (or a dangling id) means
    /// unassigned, never an error.
    #[serde(default)]
    pub assignee_id: Option<Uuid>,
    /// The project this task belongs to
    pub project_id: Uuid,
    /// Whether the task is still to do or done
    pub status: Status,
    /// When the task was completed. Present exactly while status is Done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    /// When the task was created
    pub created_at: Timestamp,
}

impl Task {
    /// Flip Todo<->Done. The Done transition stamps `completed_at` with the
    /// given instant; the Todo transition clears it.
    pub fn toggle_status(&mut self, now: Timestamp) {
        match self.status {
            Status::Todo => {
                self.status = Status::Done;
                self.completed_at = Some(now);
            }
            Status::Done => {
                self.status = Status::Todo;
                self.completed_at = None;
            }
        }
    }
}
