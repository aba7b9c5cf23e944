//! Events exchanged between the UI and the agent/task/tool subsystem.
//!
//! The agent side is a separate process or thread; everything it tells the UI
//! arrives as one of these variants via the [`crate::core::bus::EventBus`],
//! and the only thing the UI sends back is `UserInput`.

use serde_json::Value;

/// Status of one task as mirrored in the UI. The UI never originates a
/// transition; it displays whatever the last snapshot said.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Error,
}

impl TaskStatus {
    /// Single-character marker used in the task list.
    #[must_use]
    pub fn glyph(self, unicode: bool) -> &'static str {
        match (self, unicode) {
            (Self::Pending, true) => "\u{25cb}",
            (Self::Pending, false) => "o",
            (Self::Running, true) => "\u{25b6}",
            (Self::Running, false) => ">",
            (Self::Completed, true) => "\u{2713}",
            (Self::Completed, false) => "x",
            (Self::Error, true) => "\u{2717}",
            (Self::Error, false) => "!",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "done",
            Self::Error => "error",
        }
    }
}

/// Optional progress for a long-running task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
}

/// Read-only UI projection of one task owned by the external task manager.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskView {
    pub index: usize,
    pub description: String,
    pub status: TaskStatus,
    pub progress: Option<Progress>,
}

/// Snapshot of the agent's working context shown in the Context pane.
/// Overwritten wholesale on each `StateUpdate`; user notes are UI-owned and
/// live outside this struct.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextSnapshot {
    pub working_dir: Option<String>,
    pub open_files: Vec<String>,
    /// Free-form key/value context entries, in delivery order.
    pub extra: Vec<(String, String)>,
}

/// Outcome attached to a completed tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(String),
    Failure(String),
}

/// Events recognized by the UI controller, plus the one it emits outward.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Free-text progress line; shown in the status bar and the transcript.
    Processing { message: String },

    /// Full task/context/status snapshot; replaces prior state wholesale.
    StateUpdate {
        tasks: Vec<TaskView>,
        current_task: Option<usize>,
        context: ContextSnapshot,
        status: String,
    },

    /// Patch of one task's status in place.
    TaskUpdate { task_id: usize, status: TaskStatus },

    /// A tool invocation began.
    ToolStarted { tool: String, params: Value },

    /// A tool invocation finished.
    ToolCompleted {
        tool: String,
        params: Value,
        result: ToolOutcome,
    },

    /// Assistant output, with an optional collapsible thought block.
    Assistant {
        content: String,
        thought: Option<String>,
    },

    /// Agent-side failure worth surfacing in the transcript.
    Error { message: String },

    /// The user submitted a command line (UI -> agent direction).
    UserInput { text: String },
}

/// Discriminant-only mirror of [`UiEvent`] used for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Processing,
    StateUpdate,
    TaskUpdate,
    ToolStarted,
    ToolCompleted,
    Assistant,
    Error,
    UserInput,
}

impl UiEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Processing { .. } => EventKind::Processing,
            Self::StateUpdate { .. } => EventKind::StateUpdate,
            Self::TaskUpdate { .. } => EventKind::TaskUpdate,
            Self::ToolStarted { .. } => EventKind::ToolStarted,
            Self::ToolCompleted { .. } => EventKind::ToolCompleted,
            Self::Assistant { .. } => EventKind::Assistant,
            Self::Error { .. } => EventKind::Error,
            Self::UserInput { .. } => EventKind::UserInput,
        }
    }

    /// Convenience constructor for a processing/status message.
    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(UiEvent::processing("x").kind(), EventKind::Processing);
        assert_eq!(
            UiEvent::UserInput { text: "q".into() }.kind(),
            EventKind::UserInput
        );
    }

    #[test]
    fn status_glyphs_have_ascii_fallbacks() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::Running,
            TaskStatus::Completed,
            TaskStatus::Error,
        ] {
            assert!(status.glyph(false).is_ascii());
            assert_eq!(status.glyph(true).chars().count(), 1);
        }
    }
}
