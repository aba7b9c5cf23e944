//! Scripted event feed standing in for the agent subsystem.
//!
//! The real collaborator (LLM engine, task manager, tools) lives outside this
//! process and talks to the UI purely through bus events. `--demo` replays a
//! canned session over the same interface so the dashboard can be exercised
//! and demoed without a backend. Replies to user input are queued here and
//! emitted on the next tick, never from inside a bus handler.

use std::collections::VecDeque;

use serde_json::json;

use crate::core::bus::EventBus;
use crate::core::events::{ContextSnapshot, Progress, TaskStatus, TaskView, ToolOutcome, UiEvent};

/// Ticks between scripted steps (~1s at the default 16ms tick).
const STEP_INTERVAL: u64 = 60;

pub struct DemoFeed {
    ticks: u64,
    step: usize,
    pending_input: VecDeque<String>,
}

impl DemoFeed {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ticks: 0,
            step: 0,
            pending_input: VecDeque::new(),
        }
    }

    /// Record a submitted command line; the reply goes out next tick.
    pub fn note_user_input(&mut self, text: &str) {
        self.pending_input.push_back(text.to_string());
    }

    /// Advance the feed by one loop tick, emitting any due events.
    pub fn tick(&mut self, bus: &EventBus) {
        while let Some(text) = self.pending_input.pop_front() {
            bus.emit(&UiEvent::processing(format!("considering: {text}")));
            bus.emit(&UiEvent::Assistant {
                content: format!("You said \"{text}\". In a live session the agent answers here."),
                thought: Some(format!(
                    "The user asked about \"{text}\"; with no backend attached the demo \
                     feed can only echo it back."
                )),
            });
        }

        self.ticks += 1;
        if self.ticks % STEP_INTERVAL != 0 {
            return;
        }
        let step = self.step;
        self.step += 1;
        self.emit_step(step, bus);
    }

    fn emit_step(&self, step: usize, bus: &EventBus) {
        match step {
            0 => bus.emit(&UiEvent::processing("analyzing request")),
            1 => bus.emit(&UiEvent::StateUpdate {
                tasks: demo_tasks(TaskStatus::Pending, TaskStatus::Pending),
                current_task: Some(0),
                context: demo_context(),
                status: "planning".into(),
            }),
            2 => {
                bus.emit(&UiEvent::TaskUpdate {
                    task_id: 0,
                    status: TaskStatus::Running,
                });
                bus.emit(&UiEvent::ToolStarted {
                    tool: "read_file".into(),
                    params: json!({"path": "src/main.rs"}),
                });
            }
            3 => bus.emit(&UiEvent::ToolCompleted {
                tool: "read_file".into(),
                params: json!({"path": "src/main.rs"}),
                result: ToolOutcome::Success("412 lines".into()),
            }),
            4 => bus.emit(&UiEvent::Assistant {
                content: "The entry point wires the CLI to the event loop; nothing unusual."
                    .into(),
                thought: Some(
                    "main.rs parses flags, loads settings and hands control to the run \
                     loop. The interesting state all lives in the controller."
                        .into(),
                ),
            }),
            5 => bus.emit(&UiEvent::TaskUpdate {
                task_id: 0,
                status: TaskStatus::Completed,
            }),
            6 => bus.emit(&UiEvent::StateUpdate {
                tasks: demo_tasks(TaskStatus::Completed, TaskStatus::Running),
                current_task: Some(1),
                context: demo_context(),
                status: "writing summary".into(),
            }),
            7 => bus.emit(&UiEvent::ToolCompleted {
                tool: "shell".into(),
                params: json!({"cmd": "cargo check"}),
                result: ToolOutcome::Failure("2 warnings".into()),
            }),
            8 => bus.emit(&UiEvent::Error {
                message: "task 2 stalled; retrying once".into(),
            }),
            9 => bus.emit(&UiEvent::processing("demo script finished; type something")),
            _ => {}
        }
    }
}

impl Default for DemoFeed {
    fn default() -> Self {
        Self::new()
    }
}

fn demo_tasks(first: TaskStatus, second: TaskStatus) -> Vec<TaskView> {
    vec![
        TaskView {
            index: 0,
            description: "survey the entry point".into(),
            status: first,
            progress: None,
        },
        TaskView {
            index: 1,
            description: "summarize findings".into(),
            status: second,
            progress: Some(Progress {
                current: 2,
                total: 5,
            }),
        },
    ]
}

fn demo_context() -> ContextSnapshot {
    ContextSnapshot {
        working_dir: Some("/work/agentdeck".into()),
        open_files: vec!["src/main.rs".into(), "src/tui/app.rs".into()],
        extra: vec![("branch".into(), "main".into())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::core::events::EventKind;

    #[test]
    fn user_input_is_answered_on_the_next_tick() {
        let bus = EventBus::new();
        let replies = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&replies);
        bus.subscribe(EventKind::Assistant, move |_| {
            *sink.borrow_mut() += 1;
        });

        let mut feed = DemoFeed::new();
        feed.note_user_input("hello");
        feed.tick(&bus);
        assert_eq!(*replies.borrow(), 1);

        // No further replies without further input.
        feed.tick(&bus);
        assert_eq!(*replies.borrow(), 1);
    }

    #[test]
    fn script_emits_state_updates_in_order() {
        let bus = EventBus::new();
        let kinds = Rc::new(RefCell::new(Vec::new()));
        for kind in [
            EventKind::Processing,
            EventKind::StateUpdate,
            EventKind::TaskUpdate,
            EventKind::ToolStarted,
            EventKind::ToolCompleted,
            EventKind::Assistant,
        ] {
            let sink = Rc::clone(&kinds);
            bus.subscribe(kind, move |event| sink.borrow_mut().push(event.kind()));
        }

        let mut feed = DemoFeed::new();
        for _ in 0..STEP_INTERVAL * 2 {
            feed.tick(&bus);
        }
        assert_eq!(
            *kinds.borrow(),
            vec![EventKind::Processing, EventKind::StateUpdate]
        );
    }
}
