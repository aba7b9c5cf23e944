//! Application state for the agentdeck dashboard.
//!
//! `App` owns every piece of UI state: the transcript ring, the task and
//! context mirrors, focus, overlays and the input buffers. Bus events are
//! applied here via [`App::apply_event`]; decoded keys are routed here via
//! [`App::handle_key`]. Rendering reads this state but never mutates
//! anything except the viewports it sizes.

use std::collections::{HashSet, VecDeque};
use std::hash::{DefaultHasher, Hash, Hasher};

use chrono::{DateTime, Local};
use serde_json::Value;

use crate::core::events::{ContextSnapshot, TaskStatus, TaskView, ToolOutcome, UiEvent};
use crate::settings::Settings;
use crate::tui::viewport::Viewport;

// === Types ===

/// Which pane receives routed keyboard input. Exactly one at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Main,
    TaskList,
    Context,
}

impl Focus {
    /// Tab order: Main -> TaskList -> Context -> Main.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Main => Self::TaskList,
            Self::TaskList => Self::Context,
            Self::Context => Self::Main,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Main => "MAIN",
            Self::TaskList => "TASKS",
            Self::Context => "CONTEXT",
        }
    }
}

/// Centered box drawn over the base layout. While open it captures all input;
/// the task overlay takes precedence over help.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    TaskList,
    Help,
}

/// Transcript entry categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Command,
    Status,
    Tool,
    System,
    Assistant,
    Error,
}

/// One line item in the Main pane's transcript.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub kind: EntryKind,
    pub content: String,
    pub tool_name: Option<String>,
    pub tool_params: Option<Value>,
    pub tool_result: Option<ToolOutcome>,
    pub thought: Option<String>,
    pub timestamp: DateTime<Local>,
}

impl HistoryEntry {
    fn new(kind: EntryKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            tool_name: None,
            tool_params: None,
            tool_result: None,
            thought: None,
            timestamp: Local::now(),
        }
    }

    pub fn command(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Command, text)
    }

    pub fn status(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Status, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(EntryKind::System, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Error, text)
    }

    pub fn assistant(content: impl Into<String>, thought: Option<String>) -> Self {
        let mut entry = Self::new(EntryKind::Assistant, content);
        entry.thought = thought;
        entry
    }

    pub fn tool_started(tool: impl Into<String>, params: Value) -> Self {
        let tool = tool.into();
        let mut entry = Self::new(EntryKind::Tool, format!("{tool} running"));
        entry.tool_name = Some(tool);
        entry.tool_params = Some(params);
        entry
    }

    pub fn tool_completed(tool: impl Into<String>, params: Value, result: ToolOutcome) -> Self {
        let tool = tool.into();
        let verb = match result {
            ToolOutcome::Success(_) => "finished",
            ToolOutcome::Failure(_) => "failed",
        };
        let mut entry = Self::new(EntryKind::Tool, format!("{tool} {verb}"));
        entry.tool_name = Some(tool);
        entry.tool_params = Some(params);
        entry.tool_result = Some(result);
        entry
    }

    /// Identity of this entry's thought block for the expanded-thought set.
    #[must_use]
    pub fn thought_hash(&self) -> Option<u64> {
        self.thought.as_deref().map(hash_text)
    }
}

fn hash_text(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Actions the event loop must carry out on the controller's behalf
/// (emitting on the bus or stopping happen outside `handle_key` so state
/// mutation and bus traffic never interleave).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    SubmitInput(String),
}

// === App State ===

/// Global UI state for the dashboard.
pub struct App {
    // Transcript (Main pane), FIFO-capped.
    pub history: VecDeque<HistoryEntry>,
    history_cap: usize,

    // Read-only mirror of the external task manager.
    pub tasks: Vec<TaskView>,
    pub current_task: Option<usize>,
    pub status_line: String,

    // Context pane: snapshot is overwritten wholesale, notes are UI-owned.
    pub context: ContextSnapshot,
    pub notes: Vec<String>,
    pub note_input: String,
    /// Cursor over the context pane's virtual line list.
    pub context_cursor: usize,

    pub focus: Focus,
    pub overlay: Overlay,
    pub left_visible: bool,
    pub right_visible: bool,
    pub left_width: u16,
    pub right_width: u16,

    /// Content hashes of thought blocks currently shown uncollapsed.
    pub expanded_thoughts: HashSet<u64>,
    pub show_thinking: bool,

    /// Main pane line buffer (the command composer).
    pub input: String,
    /// Selection index shared by the TaskList pane and the task overlay.
    pub task_selected: usize,

    pub main_view: Viewport,
    pub context_view: Viewport,

    /// Set by any state mutation; cleared after each render.
    pub dirty: bool,
}

fn welcome_banner() -> String {
    let m = crate::tui::input::MOD_LABEL;
    format!("Tab cycles panes, {m}+o tasks, {m}+h help, {m}+b sidebars, {m}+q quit")
}

impl App {
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let mut history = VecDeque::new();
        history.push_back(HistoryEntry::system(welcome_banner()));
        Self {
            history,
            history_cap: settings.history_cap,
            tasks: Vec::new(),
            current_task: None,
            status_line: "idle".to_string(),
            context: ContextSnapshot::default(),
            notes: Vec::new(),
            note_input: String::new(),
            context_cursor: 0,
            focus: Focus::Main,
            overlay: Overlay::None,
            left_visible: settings.sidebars_visible,
            right_visible: settings.sidebars_visible,
            left_width: settings.left_width,
            right_width: settings.right_width,
            expanded_thoughts: HashSet::new(),
            show_thinking: settings.show_thinking,
            input: String::new(),
            task_selected: 0,
            main_view: Viewport::new(0),
            context_view: Viewport::new(0),
            dirty: true,
        }
    }

    // === Event application ===

    /// Apply one bus event. Handlers must stay fast and non-blocking: only
    /// in-memory mutation happens here, the render loop picks up `dirty`.
    pub fn apply_event(&mut self, event: &UiEvent) {
        match event {
            UiEvent::Processing { message } => {
                self.status_line = message.clone();
                self.push_history(HistoryEntry::status(message.clone()));
            }
            UiEvent::StateUpdate {
                tasks,
                current_task,
                context,
                status,
            } => {
                self.tasks = tasks.clone();
                self.current_task = *current_task;
                self.context = context.clone();
                self.status_line = status.clone();
                self.task_selected = self
                    .task_selected
                    .min(self.tasks.len().saturating_sub(1));
                self.clamp_context_cursor();
                self.dirty = true;
            }
            UiEvent::TaskUpdate { task_id, status } => {
                match self.tasks.iter_mut().find(|t| t.index == *task_id) {
                    Some(task) => task.status = *status,
                    None => tracing::warn!(task_id, "task update for unknown task"),
                }
                self.dirty = true;
            }
            UiEvent::ToolStarted { tool, params } => {
                self.push_history(HistoryEntry::tool_started(tool.clone(), params.clone()));
            }
            UiEvent::ToolCompleted {
                tool,
                params,
                result,
            } => {
                self.push_history(HistoryEntry::tool_completed(
                    tool.clone(),
                    params.clone(),
                    result.clone(),
                ));
            }
            UiEvent::Assistant { content, thought } => {
                self.push_history(HistoryEntry::assistant(content.clone(), thought.clone()));
            }
            UiEvent::Error { message } => {
                self.status_line = format!("error: {message}");
                self.push_history(HistoryEntry::error(message.clone()));
            }
            // Outward-bound; the UI emitted it and does not consume it.
            UiEvent::UserInput { .. } => {}
        }
    }

    /// Append to the transcript, evicting oldest entries beyond the cap.
    pub fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push_back(entry);
        while self.history.len() > self.history_cap {
            self.history.pop_front();
        }
        self.dirty = true;
    }

    // === Key routing ===

    /// Route one decoded key. Overlay precedence first, then global
    /// shortcuts, then the focused pane.
    pub fn handle_key(&mut self, key: crate::tui::input::Key) -> Option<AppAction> {
        use crate::tui::input::Key;

        // The interrupt gesture quits even while an overlay captures input.
        if key == Key::Interrupt {
            return Some(AppAction::Quit);
        }

        match self.overlay {
            Overlay::TaskList => {
                self.handle_task_list_key(key, true);
                return None;
            }
            Overlay::Help => {
                self.overlay = Overlay::None;
                self.dirty = true;
                return None;
            }
            Overlay::None => {}
        }

        match key {
            Key::Tab => {
                self.focus = self.focus.next();
                self.dirty = true;
                None
            }
            Key::Alt('o') => {
                self.open_task_overlay();
                None
            }
            Key::Alt('h') => {
                self.overlay = Overlay::Help;
                self.dirty = true;
                None
            }
            Key::Alt('x') => {
                self.history.clear();
                self.main_view.set_content(Vec::new());
                self.main_view.scroll_to_top();
                self.status_line = "history cleared".to_string();
                self.dirty = true;
                None
            }
            Key::Alt('r') => {
                self.refresh_or_toggle_thought();
                None
            }
            Key::Alt('b') => {
                self.toggle_sidebars();
                None
            }
            Key::Alt('m') => {
                self.focus = Focus::Main;
                self.dirty = true;
                None
            }
            Key::Alt('t') => {
                self.focus = Focus::TaskList;
                self.dirty = true;
                None
            }
            Key::Alt('c') => {
                self.focus = Focus::Context;
                self.dirty = true;
                None
            }
            Key::Alt('q') => Some(AppAction::Quit),
            Key::Esc => {
                if self.focus == Focus::Main && !self.input.is_empty() {
                    self.input.clear();
                    self.dirty = true;
                    None
                } else {
                    Some(AppAction::Quit)
                }
            }
            _ => match self.focus {
                Focus::Main => self.handle_main_key(key),
                Focus::TaskList => {
                    self.handle_task_list_key(key, false);
                    None
                }
                Focus::Context => {
                    self.handle_context_key(key);
                    None
                }
            },
        }
    }

    fn handle_main_key(&mut self, key: crate::tui::input::Key) -> Option<AppAction> {
        use crate::tui::input::Key;
        match key {
            Key::Char('?') if self.input.is_empty() => {
                self.overlay = Overlay::Help;
                self.dirty = true;
                None
            }
            Key::Char(c) => {
                self.input.push(c);
                self.dirty = true;
                None
            }
            Key::Backspace => {
                if self.input.pop().is_some() {
                    self.dirty = true;
                }
                None
            }
            Key::Enter => self.submit_input().map(AppAction::SubmitInput),
            Key::Up => {
                if self.main_view.scroll_up(1) {
                    self.dirty = true;
                }
                None
            }
            Key::Down => {
                if self.main_view.scroll_down(1) {
                    self.dirty = true;
                }
                None
            }
            Key::Alt('u') => {
                if self.main_view.page_up() {
                    self.dirty = true;
                }
                None
            }
            Key::Alt('d') => {
                if self.main_view.page_down() {
                    self.dirty = true;
                }
                None
            }
            _ => None,
        }
    }

    /// Pull the composer's line out for submission; the Command entry is
    /// appended here, the bus emission happens in the loop.
    fn submit_input(&mut self) -> Option<String> {
        let text = self.input.trim().to_string();
        self.input.clear();
        self.dirty = true;
        if text.is_empty() {
            return None;
        }
        self.push_history(HistoryEntry::command(text.clone()));
        self.main_view.scroll_to_bottom();
        Some(text)
    }

    /// Shared by the TaskList pane and the task overlay (`in_overlay`
    /// additionally handles close keys, since an open overlay captures
    /// everything).
    fn handle_task_list_key(&mut self, key: crate::tui::input::Key, in_overlay: bool) {
        use crate::tui::input::Key;
        let last = self.tasks.len().saturating_sub(1);
        match key {
            Key::Up | Key::Char('k') => {
                self.task_selected = self.task_selected.saturating_sub(1);
                self.dirty = true;
            }
            Key::Down | Key::Char('j') => {
                self.task_selected = (self.task_selected + 1).min(last);
                self.dirty = true;
            }
            Key::Char(c) if c.is_ascii_digit() && c != '0' => {
                let index = (c as usize - '1' as usize).min(last);
                if !self.tasks.is_empty() {
                    self.task_selected = index;
                    self.dirty = true;
                }
            }
            Key::Enter => {
                if let Some(task) = self.tasks.get(self.task_selected) {
                    self.status_line =
                        format!("task {}: {}", task.index + 1, task.description);
                }
                if in_overlay {
                    self.overlay = Overlay::None;
                }
                self.dirty = true;
            }
            Key::Esc | Key::Alt('o') if in_overlay => {
                self.overlay = Overlay::None;
                self.dirty = true;
            }
            _ => {}
        }
    }

    fn handle_context_key(&mut self, key: crate::tui::input::Key) {
        use crate::tui::input::Key;
        match key {
            Key::Up => {
                self.context_cursor = self.context_cursor.saturating_sub(1);
                self.dirty = true;
            }
            Key::Down => {
                self.context_cursor =
                    (self.context_cursor + 1).min(self.context_line_count().saturating_sub(1));
                self.dirty = true;
            }
            Key::Char(c) => {
                self.note_input.push(c);
                self.dirty = true;
            }
            Key::Enter => {
                let note = self.note_input.trim().to_string();
                self.note_input.clear();
                if !note.is_empty() {
                    self.notes.push(note);
                }
                self.dirty = true;
            }
            Key::Backspace => {
                if let Some(index) = self.selected_note() {
                    self.delete_note(index);
                } else {
                    self.note_input.pop();
                }
                self.dirty = true;
            }
            _ => {}
        }
    }

    // === Context pane virtual line list ===
    // Ordering: working dir, open files, extra entries, then notes. Only
    // note lines are deletable; the rest is agent-owned snapshot data.

    /// Index of the first note line in the virtual list.
    #[must_use]
    pub fn note_section_start(&self) -> usize {
        1 + self.context.open_files.len() + self.context.extra.len()
    }

    #[must_use]
    pub fn context_line_count(&self) -> usize {
        self.note_section_start() + self.notes.len()
    }

    /// The note the context cursor currently sits on, if any.
    #[must_use]
    pub fn selected_note(&self) -> Option<usize> {
        let start = self.note_section_start();
        if self.context_cursor >= start && self.context_cursor < start + self.notes.len() {
            Some(self.context_cursor - start)
        } else {
            None
        }
    }

    fn delete_note(&mut self, index: usize) {
        self.notes.remove(index);
        // Selection moves to the previous note, or stays on the first.
        if index > 0 {
            self.context_cursor -= 1;
        }
        self.clamp_context_cursor();
    }

    fn clamp_context_cursor(&mut self) {
        self.context_cursor = self
            .context_cursor
            .min(self.context_line_count().saturating_sub(1));
    }

    // === Global shortcut helpers ===

    fn open_task_overlay(&mut self) {
        self.overlay = Overlay::TaskList;
        self.task_selected = self
            .task_selected
            .min(self.tasks.len().saturating_sub(1));
        self.dirty = true;
    }

    /// Both-sidebar toggle is atomic: any visible sidebar means "hide both",
    /// otherwise show both. An asymmetric layout never results.
    pub fn toggle_sidebars(&mut self) {
        let any_visible = self.left_visible || self.right_visible;
        self.left_visible = !any_visible;
        self.right_visible = !any_visible;
        self.dirty = true;
    }

    /// Alt+r: if a collapsible thought block sits in recent history, toggle
    /// its expansion; otherwise force a full redraw.
    fn refresh_or_toggle_thought(&mut self) {
        let recent_thought = self
            .history
            .iter()
            .rev()
            .take(10)
            .find_map(HistoryEntry::thought_hash);
        if let Some(hash) = recent_thought {
            if !self.expanded_thoughts.remove(&hash) {
                self.expanded_thoughts.insert(hash);
            }
        }
        self.dirty = true;
    }

    /// Counts per status for the task summary line: (pending, running,
    /// completed, error).
    #[must_use]
    pub fn task_counts(&self) -> (usize, usize, usize, usize) {
        let mut counts = (0, 0, 0, 0);
        for task in &self.tasks {
            match task.status {
                TaskStatus::Pending => counts.0 += 1,
                TaskStatus::Running => counts.1 += 1,
                TaskStatus::Completed => counts.2 += 1,
                TaskStatus::Error => counts.3 += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::input::Key;
    use serde_json::json;

    fn app() -> App {
        App::new(&Settings::default())
    }

    fn task(index: usize, status: TaskStatus) -> TaskView {
        TaskView {
            index,
            description: format!("task {index}"),
            status,
            progress: None,
        }
    }

    #[test]
    fn tab_cycles_all_three_panes_and_returns() {
        let mut app = app();
        let start = app.focus;
        let mut visited = vec![start];
        for _ in 0..3 {
            app.handle_key(Key::Tab);
            visited.push(app.focus);
        }
        assert_eq!(visited[3], start, "three Tabs return to the start");
        assert!(visited.contains(&Focus::Main));
        assert!(visited.contains(&Focus::TaskList));
        assert!(visited.contains(&Focus::Context));
    }

    #[test]
    fn history_eviction_keeps_cap_most_recent_in_order() {
        let mut settings = Settings::default();
        settings.history_cap = 10;
        let mut app = App::new(&settings);
        for i in 0..25 {
            app.push_history(HistoryEntry::status(format!("msg {i}")));
        }
        assert_eq!(app.history.len(), 10);
        assert_eq!(app.history.front().unwrap().content, "msg 15");
        assert_eq!(app.history.back().unwrap().content, "msg 24");
    }

    #[test]
    fn submit_appends_command_entry_and_returns_action() {
        let mut app = app();
        for c in "hello".chars() {
            app.handle_key(Key::Char(c));
        }
        let action = app.handle_key(Key::Enter);
        assert_eq!(action, Some(AppAction::SubmitInput("hello".into())));
        assert!(app.input.is_empty());
        let last = app.history.back().unwrap();
        assert_eq!(last.kind, EntryKind::Command);
        assert_eq!(last.content, "hello");
    }

    #[test]
    fn empty_submit_is_swallowed() {
        let mut app = app();
        assert_eq!(app.handle_key(Key::Enter), None);
    }

    #[test]
    fn backspace_edits_the_composer() {
        let mut app = app();
        app.handle_key(Key::Char('a'));
        app.handle_key(Key::Char('b'));
        app.handle_key(Key::Backspace);
        assert_eq!(app.input, "a");
    }

    #[test]
    fn state_update_overwrites_tasks_but_not_notes() {
        let mut app = app();
        app.notes.push("mine".to_string());
        app.apply_event(&UiEvent::StateUpdate {
            tasks: vec![task(0, TaskStatus::Running)],
            current_task: Some(0),
            context: ContextSnapshot {
                working_dir: Some("/work".into()),
                open_files: vec!["a.rs".into()],
                extra: vec![],
            },
            status: "working".into(),
        });
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.status_line, "working");
        assert_eq!(app.notes, vec!["mine".to_string()]);
    }

    #[test]
    fn task_update_patches_one_task_in_place() {
        let mut app = app();
        app.tasks = vec![task(0, TaskStatus::Pending), task(1, TaskStatus::Pending)];
        app.apply_event(&UiEvent::TaskUpdate {
            task_id: 1,
            status: TaskStatus::Completed,
        });
        assert_eq!(app.tasks[0].status, TaskStatus::Pending);
        assert_eq!(app.tasks[1].status, TaskStatus::Completed);
    }

    #[test]
    fn tool_events_append_tool_entries() {
        let mut app = app();
        app.apply_event(&UiEvent::ToolStarted {
            tool: "shell".into(),
            params: json!({"cmd": "ls"}),
        });
        app.apply_event(&UiEvent::ToolCompleted {
            tool: "shell".into(),
            params: json!({"cmd": "ls"}),
            result: ToolOutcome::Success("ok".into()),
        });
        let entries: Vec<_> = app
            .history
            .iter()
            .filter(|e| e.kind == EntryKind::Tool)
            .collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].tool_name.as_deref(), Some("shell"));
        assert!(entries[1].tool_result.is_some());
    }

    #[test]
    fn note_entry_and_deletion_scenario() {
        let mut app = app();
        app.focus = Focus::Context;
        for note in ["one", "two", "three"] {
            for c in note.chars() {
                app.handle_key(Key::Char(c));
            }
            app.handle_key(Key::Enter);
        }
        assert_eq!(app.notes, vec!["one", "two", "three"]);

        // Select note #2 (index 1) and delete it.
        app.context_cursor = app.note_section_start() + 1;
        assert_eq!(app.selected_note(), Some(1));
        app.handle_key(Key::Backspace);
        assert_eq!(app.notes, vec!["one", "three"]);
        // Selection moved to the previous note.
        assert_eq!(app.selected_note(), Some(0));
    }

    #[test]
    fn deleting_the_first_note_keeps_selection_at_zero() {
        let mut app = app();
        app.focus = Focus::Context;
        app.notes = vec!["a".into(), "b".into()];
        app.context_cursor = app.note_section_start();
        app.handle_key(Key::Backspace);
        assert_eq!(app.notes, vec!["b".to_string()]);
        assert_eq!(app.selected_note(), Some(0));
    }

    #[test]
    fn backspace_off_a_note_edits_the_draft() {
        let mut app = app();
        app.focus = Focus::Context;
        app.notes = vec!["keep".into()];
        app.note_input = "dra".into();
        app.context_cursor = 0; // on the working-dir line, not a note
        app.handle_key(Key::Backspace);
        assert_eq!(app.notes, vec!["keep".to_string()]);
        assert_eq!(app.note_input, "dr");
    }

    #[test]
    fn sidebar_toggle_is_atomic_from_asymmetric_state() {
        let mut app = app();
        app.left_visible = true;
        app.right_visible = false;
        app.toggle_sidebars();
        assert!(!app.left_visible && !app.right_visible);
        app.toggle_sidebars();
        assert!(app.left_visible && app.right_visible);
    }

    #[test]
    fn task_overlay_captures_all_input() {
        let mut app = app();
        app.tasks = vec![task(0, TaskStatus::Pending), task(1, TaskStatus::Pending)];
        app.handle_key(Key::Alt('o'));
        assert_eq!(app.overlay, Overlay::TaskList);

        // Characters are navigation, not composer input, while open.
        app.handle_key(Key::Char('j'));
        assert_eq!(app.task_selected, 1);
        assert!(app.input.is_empty());

        // Tab does not escape the overlay either.
        let focus = app.focus;
        app.handle_key(Key::Tab);
        assert_eq!(app.focus, focus);

        app.handle_key(Key::Esc);
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn number_keys_jump_task_selection() {
        let mut app = app();
        app.tasks = (0..5).map(|i| task(i, TaskStatus::Pending)).collect();
        app.handle_key(Key::Alt('o'));
        app.handle_key(Key::Char('4'));
        assert_eq!(app.task_selected, 3);
        // Out-of-range digits clamp to the last task.
        app.handle_key(Key::Char('9'));
        assert_eq!(app.task_selected, 4);
    }

    #[test]
    fn help_overlay_closes_on_any_key() {
        let mut app = app();
        app.handle_key(Key::Alt('h'));
        assert_eq!(app.overlay, Overlay::Help);
        app.handle_key(Key::Char('z'));
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn question_mark_opens_help_only_on_empty_composer() {
        let mut app = app();
        app.handle_key(Key::Char('?'));
        assert_eq!(app.overlay, Overlay::Help);
        app.handle_key(Key::Char('z')); // close
        app.handle_key(Key::Char('w'));
        app.handle_key(Key::Char('?'));
        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(app.input, "w?");
    }

    #[test]
    fn alt_r_toggles_a_recent_thought() {
        let mut app = app();
        app.apply_event(&UiEvent::Assistant {
            content: "answer".into(),
            thought: Some("long reasoning".into()),
        });
        let hash = app.history.back().unwrap().thought_hash().unwrap();
        app.handle_key(Key::Alt('r'));
        assert!(app.expanded_thoughts.contains(&hash));
        app.handle_key(Key::Alt('r'));
        assert!(!app.expanded_thoughts.contains(&hash));
    }

    #[test]
    fn interrupt_quits_even_with_an_overlay_open() {
        let mut app = app();
        app.tasks = vec![task(0, TaskStatus::Pending)];
        app.handle_key(Key::Alt('o'));
        assert_eq!(app.overlay, Overlay::TaskList);
        assert_eq!(app.handle_key(Key::Interrupt), Some(AppAction::Quit));
    }

    #[test]
    fn quit_paths() {
        let mut app = app();
        assert_eq!(app.handle_key(Key::Alt('q')), Some(AppAction::Quit));
        // Esc with composer text clears it instead of quitting.
        app.handle_key(Key::Char('x'));
        assert_eq!(app.handle_key(Key::Esc), None);
        assert!(app.input.is_empty());
        assert_eq!(app.handle_key(Key::Esc), Some(AppAction::Quit));
    }

    #[test]
    fn processing_event_updates_status_and_history() {
        let mut app = app();
        app.apply_event(&UiEvent::processing("compiling"));
        assert_eq!(app.status_line, "compiling");
        assert_eq!(app.history.back().unwrap().kind, EntryKind::Status);
    }

    #[test]
    fn task_counts_tally_by_status() {
        let mut app = app();
        app.tasks = vec![
            task(0, TaskStatus::Pending),
            task(1, TaskStatus::Running),
            task(2, TaskStatus::Completed),
            task(3, TaskStatus::Completed),
            task(4, TaskStatus::Error),
        ];
        assert_eq!(app.task_counts(), (1, 1, 2, 1));
    }
}
