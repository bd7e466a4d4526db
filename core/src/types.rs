//! Records returned by the Todoist REST API.
//!
//! # Design
//! These are snapshots of server state at fetch time. They are only ever
//! produced by deserialization; the client never mutates or reconciles them.
//! Every struct is `#[serde(default)]` so fields the server omits decode to
//! zero values, while a field of the wrong JSON type is still a decode error.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// A Todoist project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub color: i64,
    pub order: i64,
    pub comment_count: i64,
    pub shared: bool,
    #[serde(rename = "favourite", alias = "favorite")]
    pub favorite: bool,
    pub sync_id: i64,
    /// The catch-all project new tasks land in.
    pub inbox_project: bool,
    pub url: String,
}

/// A single Todoist task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub id: i64,
    pub project_id: i64,
    pub section_id: Option<i64>,
    pub content: String,
    pub description: String,
    pub completed: bool,
    pub label_ids: Vec<i64>,
    pub parent_id: Option<i64>,
    pub order: i64,
    /// 1 (normal) to 4 (urgent).
    pub priority: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub due: DueObject,
    pub url: String,
    pub comment_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub assignee: i64,
}

impl Task {
    /// True when the task is due at a specific time, not just on a date.
    pub fn has_due_time(&self) -> bool {
        !self.due.datetime.is_empty()
    }
}

/// Due date descriptor nested in a [`Task`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DueObject {
    /// Human readable form, e.g. "every monday".
    pub string: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub recurring: bool,
    /// RFC 3339 timestamp, empty when the task has no due time.
    #[serde(deserialize_with = "null_as_default")]
    pub datetime: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timezone: String,
}

impl DueObject {
    /// Parse `datetime`. `None` when the task has no due time.
    pub fn parse_datetime(&self) -> Option<chrono::ParseResult<DateTime<FixedOffset>>> {
        if self.datetime.is_empty() {
            return None;
        }
        Some(DateTime::parse_from_rfc3339(&self.datetime))
    }
}

/// Token issued by the OAuth code exchange.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_decodes_wire_names() {
        let json = r#"{
            "id": 2187255141,
            "name": "Inbox",
            "color": 48,
            "order": 0,
            "comment_count": 2,
            "shared": false,
            "favourite": true,
            "sync_id": 0,
            "inbox_project": true,
            "url": "https://todoist.com/showProject?id=2187255141"
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.id, 2187255141);
        assert_eq!(project.name, "Inbox");
        assert!(project.favorite);
        assert!(project.inbox_project);
        assert_eq!(project.comment_count, 2);
    }

    #[test]
    fn project_accepts_american_spelling() {
        let project: Project = serde_json::from_str(r#"{"id":1,"favorite":true}"#).unwrap();
        assert!(project.favorite);
    }

    #[test]
    fn missing_fields_default() {
        let task: Task = serde_json::from_str(r#"{"id":5,"content":"Buy milk"}"#).unwrap();
        assert_eq!(task.id, 5);
        assert_eq!(task.content, "Buy milk");
        assert_eq!(task.section_id, None);
        assert_eq!(task.parent_id, None);
        assert!(task.label_ids.is_empty());
        assert_eq!(task.due, DueObject::default());
        assert!(!task.has_due_time());
    }

    #[test]
    fn null_due_and_assignee_default() {
        let task: Task =
            serde_json::from_str(r#"{"id":1,"due":null,"assignee":null,"section_id":null}"#)
                .unwrap();
        assert_eq!(task.due, DueObject::default());
        assert_eq!(task.assignee, 0);
        assert_eq!(task.section_id, None);
    }

    #[test]
    fn null_due_time_decodes_empty() {
        let due: DueObject =
            serde_json::from_str(r#"{"date":"2030-01-01","datetime":null,"timezone":null}"#)
                .unwrap();
        assert_eq!(due.date, "2030-01-01");
        assert!(due.datetime.is_empty());
        assert!(due.timezone.is_empty());
    }

    #[test]
    fn wrong_type_is_rejected() {
        let result: Result<Task, _> = serde_json::from_str(r#"{"id":"not a number"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn task_decodes_nested_due() {
        let json = r#"{
            "id": 9,
            "project_id": 1,
            "section_id": 7,
            "content": "Call mom",
            "label_ids": [3, 4],
            "priority": 4,
            "due": {
                "string": "tomorrow at 9",
                "date": "2030-01-01",
                "recurring": false,
                "datetime": "2030-01-01T09:00:00Z",
                "timezone": "Europe/Moscow"
            }
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.section_id, Some(7));
        assert_eq!(task.label_ids, vec![3, 4]);
        assert_eq!(task.due.timezone, "Europe/Moscow");
        assert!(task.has_due_time());
        let due = task.due.parse_datetime().unwrap().unwrap();
        assert_eq!(due.to_rfc3339(), "2030-01-01T09:00:00+00:00");
    }

    #[test]
    fn empty_datetime_is_not_parsed() {
        let due = DueObject {
            date: "2030-01-01".to_string(),
            ..DueObject::default()
        };
        assert!(due.parse_datetime().is_none());
    }

    #[test]
    fn malformed_datetime_is_an_error() {
        let due = DueObject {
            datetime: "tomorrow".to_string(),
            ..DueObject::default()
        };
        assert!(due.parse_datetime().unwrap().is_err());
    }

    #[test]
    fn access_token_debug_hides_secret() {
        let token: AccessToken =
            serde_json::from_str(r#"{"access_token":"abc123","token_type":"Bearer"}"#).unwrap();
        assert_eq!(token.access_token, "abc123");
        assert!(!format!("{token:?}").contains("abc123"));
    }
}
