use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplate {
    /// UUID of the template
    pub id: Uuid,
    /// Name of the template
    pub name: String,
    /// Ordered task blueprints, materialized into real tasks only when the
    /// template is applied
    pub tasks: Vec<TemplateTask>,
}

/// A task blueprint: no identity, no status, no assignee. The due date is an
/// offset in days relative to the (future) instantiation date.
#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TemplateTask {
    pub title: String,
    pub description: String,
    pub due_offset_days: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateTaskParseError {
    #[error("Invalid blueprint '{0}'. Expected 'title|description|offset_days'")]
    MissingField(String),

    #[error("Invalid due offset '{0}': expected a whole number of days")]
    InvalidOffset(String),

    #[error("Blueprint title must not be empty")]
    EmptyTitle,
}

impl FromStr for TemplateTask {
    type Err = TemplateTaskParseError;

    /// Parses the CLI blueprint spelling `title|description|offset_days`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(3, '|').collect();
        if parts.len() != 3 {
            return Err(TemplateTaskParseError::MissingField(s.to_string()));
        }

        let title = parts[0].trim();
        if title.is_empty() {
            return Err(TemplateTaskParseError::EmptyTitle);
        }

        let offset = parts[2].trim();
        let due_offset_days = offset
            .parse::<i64>()
            .map_err(|_| TemplateTaskParseError::InvalidOffset(offset.to_string()))?;

        Ok(TemplateTask {
            title: title.to_string(),
            description: parts[1].trim().to_string(),
            due_offset_days,
        })
    }
}
