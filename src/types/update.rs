//! Live update events produced by agent and workflow runs.

use serde::{Deserialize, Serialize};

use super::message::{ContentItem, Role};

/// A partial update from a single agent run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentUpdate {
    #[serde(default = "assistant_role")]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub contents: Vec<ContentItem>,
}

fn assistant_role() -> Role {
    Role::Assistant
}

impl Default for AgentUpdate {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl AgentUpdate {
    /// An assistant update carrying `contents`.
    pub fn new(contents: Vec<ContentItem>) -> Self {
        Self {
            role: Role::Assistant,
            author_name: None,
            message_id: None,
            model_id: None,
            finish_reason: None,
            contents,
        }
    }

    /// A text chunk belonging to message `message_id`.
    pub fn text(message_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(vec![ContentItem::text(text)]).with_message_id(message_id)
    }

    /// A reasoning chunk belonging to message `message_id`.
    pub fn reasoning(message_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(vec![ContentItem::reasoning(text)]).with_message_id(message_id)
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn with_author(mut self, author_name: impl Into<String>) -> Self {
        self.author_name = Some(author_name.into());
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_finish_reason(mut self, finish_reason: impl Into<String>) -> Self {
        self.finish_reason = Some(finish_reason.into());
        self
    }
}

/// Events emitted by a multi-agent workflow run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// A content update from one of the workflow's agents.
    AgentUpdate(AgentUpdate),
    /// The workflow produced its output; the current turn is complete.
    Output {
        #[serde(default)]
        data: serde_json::Value,
    },
    /// The workflow failed.
    Error { message: String },
    /// One executor inside the workflow failed.
    ExecutorFailed {
        #[serde(default)]
        executor_id: String,
        message: String,
    },
    /// Lifecycle events (superstep boundaries, executor invocations, ...).
    #[serde(other)]
    Other,
}

impl WorkflowEvent {
    pub fn update(update: AgentUpdate) -> Self {
        Self::AgentUpdate(update)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Message of an error or executor-failure signal.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } | Self::ExecutorFailed { message, .. } => {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}
