//! Whole-screen frame construction.
//!
//! Every render clears the screen and repaints all panes with absolute
//! cursor addressing; there is no retained scene graph and no partial
//! damage tracking. A misrendered frame costs nothing; the next tick
//! repaints everything. `draw_frame` only returns the byte string, and the
//! loop owns the actual write to stdout.

use std::fmt::Write;

use crate::core::events::{TaskStatus, TaskView, ToolOutcome};
use crate::term::{self, TermCaps};
use crate::tui::app::{App, EntryKind, Focus, HistoryEntry, Overlay};
use crate::tui::input::MOD_LABEL;
use crate::tui::layout::{Layout, Rect};

/// Render one complete frame for a `width` x `height` terminal.
pub fn draw_frame(app: &mut App, caps: &TermCaps, width: u16, height: u16) -> String {
    let layout = Layout::compute(
        width,
        height,
        app.left_width,
        app.right_width,
        app.left_visible,
        app.right_visible,
    );

    let mut buf = String::with_capacity(4096);
    buf.push_str(term::CLEAR_SCREEN);
    buf.push_str(term::CLEAR_SCROLLBACK);
    buf.push_str(term::CURSOR_HOME);
    buf.push_str(term::CURSOR_HIDE);

    draw_header(&mut buf, app, caps, &layout, width);
    draw_dividers(&mut buf, caps, &layout);
    draw_main_pane(&mut buf, app, caps, &layout.main);
    if let Some(rect) = layout.left {
        draw_task_pane(&mut buf, app, caps, &rect);
    }
    if let Some(rect) = layout.right {
        draw_context_pane(&mut buf, app, caps, &rect);
    }
    draw_footer(&mut buf, app, caps, &layout, width);
    draw_input_row(&mut buf, app, caps, &layout, width);

    match app.overlay {
        Overlay::TaskList => draw_task_overlay(&mut buf, app, caps, width, height),
        Overlay::Help => draw_help_overlay(&mut buf, caps, width, height),
        Overlay::None => {}
    }

    place_cursor(&mut buf, app, &layout, width);
    buf
}

/// Accent color scaled to what the terminal supports.
fn accent(caps: &TermCaps) -> String {
    if caps.truecolor {
        term::fg_rgb(95, 175, 255)
    } else if caps.color256 {
        term::fg_256(75)
    } else {
        term::FG_CYAN.to_string()
    }
}

fn at(buf: &mut String, col: u16, row: u16, text: &str) {
    buf.push_str(&term::move_to(col, row));
    buf.push_str(text);
}

// === Chrome ===

fn draw_header(buf: &mut String, app: &App, caps: &TermCaps, layout: &Layout, width: u16) {
    let title = term::colorize(" agentdeck ", &format!("{}{}", term::BOLD, accent(caps)), caps);
    let focus = term::badge(app.focus.label(), term::FG_YELLOW, caps);
    let status = term::dim(&app.status_line, caps);

    let focus_width = term::visible_width(&focus);
    let left_budget = (width as usize).saturating_sub(focus_width);
    let left = term::pad_visible(&format!("{title} {status}"), left_budget, caps);
    at(buf, 0, layout.header_row, &format!("{left}{focus}"));
}

fn draw_footer(buf: &mut String, app: &App, caps: &TermCaps, layout: &Layout, width: u16) {
    let hints = match (app.overlay, app.focus) {
        (Overlay::TaskList, _) => "j/k move · 1-9 jump · Enter select · Esc close".to_string(),
        (Overlay::Help, _) => "any key closes help".to_string(),
        (_, Focus::Main) => {
            format!("Enter send · Up/Down scroll · Tab panes · {MOD_LABEL}+h help")
        }
        (_, Focus::TaskList) => "j/k move · 1-9 jump · Enter select · Tab panes".to_string(),
        (_, Focus::Context) => "type a note, Enter saves · Backspace deletes selection".to_string(),
    };
    at(
        buf,
        0,
        layout.footer_row,
        &term::dim(&term::truncate_visible(&hints, width as usize, caps), caps),
    );

    // Right-aligned scroll position while the transcript is not tail-pinned.
    let info = app.main_view.scroll_info();
    if info.can_scroll_down {
        let pct = term::dim(&format!("{}%", info.percent), caps);
        let pct_width = term::visible_width(&pct) as u16;
        if pct_width < width {
            at(buf, width - pct_width, layout.footer_row, &pct);
        }
    }
}

fn draw_input_row(buf: &mut String, app: &App, caps: &TermCaps, layout: &Layout, width: u16) {
    let prompt_color = if app.focus == Focus::Main {
        accent(caps)
    } else {
        term::FG_GRAY.to_string()
    };
    let prompt = term::colorize("> ", &prompt_color, caps);
    let budget = (width as usize).saturating_sub(3);
    let shown = tail_columns(&app.input, budget);
    at(buf, 0, layout.input_row, &format!("{prompt}{shown}"));
}

/// Keep the end of an overlong composer line visible while typing.
fn tail_columns(text: &str, budget: usize) -> String {
    if term::visible_width(text) <= budget {
        return text.to_string();
    }
    let mut out: Vec<char> = Vec::new();
    let mut used = 0;
    for c in text.chars().rev() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.iter().rev().collect()
}

fn draw_dividers(buf: &mut String, caps: &TermCaps, layout: &Layout) {
    let glyph = if caps.unicode { "\u{2502}" } else { "|" };
    let styled = term::dim(glyph, caps);
    for &col in &layout.dividers {
        for row in 0..layout.body_height {
            at(buf, col, layout.body_top + row, &styled);
        }
    }
}

// === Main pane ===

fn draw_main_pane(buf: &mut String, app: &mut App, caps: &TermCaps, rect: &Rect) {
    let width = rect.width as usize;
    let lines = transcript_lines(app, width, caps);

    // Re-pin after content replacement so a tail-following view stays at the
    // tail, while a user-scrolled view keeps its offset.
    let pinned = app.main_view.is_at_bottom();
    app.main_view.set_height(rect.height as usize);
    app.main_view.set_content(lines);
    if pinned {
        app.main_view.scroll_to_bottom();
    }

    if app.main_view.is_empty() && rect.height > 0 {
        at(buf, rect.col, rect.row, &term::dim("no activity yet", caps));
        return;
    }

    for (i, line) in app.main_view.visible_lines().iter().enumerate() {
        at(buf, rect.col, rect.row + i as u16, line);
    }

    let info = app.main_view.scroll_info();
    if rect.width > 12 && rect.height > 0 {
        let marker_col = rect.right().saturating_sub(10);
        if info.can_scroll_up {
            let n = info.offset;
            at(buf, marker_col, rect.row, &term::dim(&format!("{n} above"), caps));
        }
        if info.can_scroll_down {
            let n = info.total - info.offset - info.visible;
            let row = rect.row + rect.height.saturating_sub(1);
            at(buf, marker_col, row, &term::dim(&format!("{n} below"), caps));
        }
    }
}

fn transcript_lines(app: &App, width: usize, caps: &TermCaps) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in &app.history {
        lines.extend(entry_lines(
            entry,
            width,
            caps,
            app.show_thinking,
            entry
                .thought_hash()
                .is_some_and(|h| app.expanded_thoughts.contains(&h)),
        ));
    }
    lines
}

/// Render one transcript entry into pane-width display lines.
pub fn entry_lines(
    entry: &HistoryEntry,
    width: usize,
    caps: &TermCaps,
    show_thinking: bool,
    thought_expanded: bool,
) -> Vec<String> {
    let width = width.max(8);
    let stamp = term::dim(&entry.timestamp.format("%H:%M").to_string(), caps);
    let body_width = width.saturating_sub(6);

    let mut out = Vec::new();
    let push_block = |prefix: &str, color: &str, text: &str, out: &mut Vec<String>| {
        for (i, line) in wrap_text(text, body_width.saturating_sub(2)).into_iter().enumerate() {
            let lead = if i == 0 { stamp.clone() } else { "     ".to_string() };
            let body = term::colorize(&format!("{prefix}{line}"), color, caps);
            out.push(term::truncate_visible(&format!("{lead} {body}"), width, caps));
        }
    };

    match entry.kind {
        EntryKind::Command => push_block("> ", term::FG_CYAN, &entry.content, &mut out),
        EntryKind::Status => push_block("\u{00b7} ", term::FG_GRAY, &entry.content, &mut out),
        EntryKind::System => push_block("", term::FG_BLUE, &entry.content, &mut out),
        EntryKind::Error => push_block("! ", term::FG_RED, &entry.content, &mut out),
        EntryKind::Assistant => {
            push_block("", term::FG_MAGENTA, &entry.content, &mut out);
            if show_thinking {
                if let Some(thought) = &entry.thought {
                    if thought_expanded {
                        for line in wrap_text(thought, body_width.saturating_sub(4)) {
                            out.push(term::truncate_visible(
                                &format!(
                                    "      {}",
                                    term::colorize(&line, &format!("{}{}", term::ITALIC, term::FG_GRAY), caps)
                                ),
                                width,
                                caps,
                            ));
                        }
                    } else {
                        let summary = format!(
                            "thought ({} chars) \u{00b7} {MOD_LABEL}+r expands",
                            thought.chars().count()
                        );
                        out.push(term::truncate_visible(
                            &format!("      {}", term::dim(&summary, caps)),
                            width,
                            caps,
                        ));
                    }
                }
            }
        }
        EntryKind::Tool => {
            let marker = match &entry.tool_result {
                None => term::badge("run", term::FG_YELLOW, caps),
                Some(ToolOutcome::Success(_)) => term::badge("ok", term::FG_GREEN, caps),
                Some(ToolOutcome::Failure(_)) => term::badge("err", term::FG_RED, caps),
            };
            let name = entry.tool_name.as_deref().unwrap_or("tool");
            let params = entry
                .tool_params
                .as_ref()
                .map(|p| serde_json::to_string(p).unwrap_or_default())
                .unwrap_or_default();
            out.push(term::truncate_visible(
                &format!("{stamp} {marker} {} {}", term::bold(name, caps), term::dim(&params, caps)),
                width,
                caps,
            ));
            if let Some(ToolOutcome::Success(detail) | ToolOutcome::Failure(detail)) =
                &entry.tool_result
            {
                if !detail.is_empty() {
                    out.push(term::truncate_visible(
                        &format!("      {}", term::dim(detail, caps)),
                        width,
                        caps,
                    ));
                }
            }
        }
    }
    out
}

/// Hard wrap on display columns. Content here is raw text (no escapes yet).
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for line in text.split('\n') {
        if line.is_empty() {
            out.push(String::new());
            continue;
        }
        let mut current = String::new();
        let mut used = 0;
        for c in line.chars() {
            let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            if used + w > width && !current.is_empty() {
                out.push(std::mem::take(&mut current));
                used = 0;
            }
            current.push(c);
            used += w;
        }
        out.push(current);
    }
    out
}

// === Task pane ===

fn draw_task_pane(buf: &mut String, app: &App, caps: &TermCaps, rect: &Rect) {
    if rect.height == 0 {
        return;
    }
    let width = rect.width as usize;
    let title = term::colorize("tasks", &format!("{}{}", term::UNDERLINE, accent(caps)), caps);
    at(buf, rect.col, rect.row, &title);

    let (pending, running, completed, error) = app.task_counts();
    let summary = format!("{pending} wait {running} run {completed} done {error} err");
    if rect.height > 1 {
        at(
            buf,
            rect.col,
            rect.row + 1,
            &term::dim(&term::truncate_visible(&summary, width, caps), caps),
        );
    }

    let list_top = rect.row + 2;
    let visible = (rect.height as usize).saturating_sub(2);
    if visible == 0 {
        return;
    }
    // Keep the selection inside the visible window.
    let start = app
        .task_selected
        .saturating_sub(visible.saturating_sub(1))
        .min(app.tasks.len().saturating_sub(visible));

    let mut row = list_top;
    for task in app.tasks.iter().skip(start) {
        if row >= rect.row + rect.height {
            break;
        }
        let selected = task.index == app.tasks[app.task_selected.min(app.tasks.len() - 1)].index
            && app.focus == Focus::TaskList;
        at(buf, rect.col, row, &task_line(task, width, caps, selected));
        row += 1;
        if let Some(progress) = task.progress {
            if task.status == TaskStatus::Running && row < rect.row + rect.height {
                let bar_width = width.saturating_sub(4).max(1);
                let bar = term::progress_bar(progress.current, progress.total, bar_width, caps);
                at(buf, rect.col, row, &format!("  {}", term::colorize(&bar, term::FG_GREEN, caps)));
                row += 1;
            }
        }
    }
}

fn task_line(task: &TaskView, width: usize, caps: &TermCaps, selected: bool) -> String {
    let glyph = task.status.glyph(caps.unicode);
    let color = match task.status {
        TaskStatus::Pending => term::FG_GRAY,
        TaskStatus::Running => term::FG_YELLOW,
        TaskStatus::Completed => term::FG_GREEN,
        TaskStatus::Error => term::FG_RED,
    };
    let text = format!("{glyph} {} {}", task.index + 1, task.description);
    let line = term::truncate_visible(&text, width, caps);
    if selected {
        term::colorize(&term::pad_visible(&line, width, caps), term::REVERSE, caps)
    } else {
        term::colorize(&line, color, caps)
    }
}

// === Context pane ===

fn draw_context_pane(buf: &mut String, app: &mut App, caps: &TermCaps, rect: &Rect) {
    if rect.height == 0 {
        return;
    }
    let width = rect.width as usize;
    let title = term::colorize("context", &format!("{}{}", term::UNDERLINE, accent(caps)), caps);
    at(buf, rect.col, rect.row, &title);

    let lines = context_lines(app, width, caps);
    let body_height = (rect.height as usize).saturating_sub(2);
    app.context_view.set_height(body_height);
    app.context_view.set_content(lines);

    // Keep the cursor line inside the window.
    let offset = app.context_view.offset();
    if app.context_cursor < offset {
        app.context_view.scroll_up(offset - app.context_cursor);
    } else if body_height > 0 && app.context_cursor >= offset + body_height {
        app.context_view
            .scroll_down(app.context_cursor + 1 - body_height - offset);
    }

    for (i, line) in app.context_view.visible_lines().iter().enumerate() {
        at(buf, rect.col, rect.row + 1 + i as u16, line);
    }

    // Note composer pinned to the pane's last row.
    let draft_row = rect.row + rect.height - 1;
    let draft = format!("+ {}", app.note_input);
    at(
        buf,
        rect.col,
        draft_row,
        &term::colorize(&term::truncate_visible(&draft, width, caps), term::FG_CYAN, caps),
    );
}

fn context_lines(app: &App, width: usize, caps: &TermCaps) -> Vec<String> {
    let mut raw = Vec::new();
    raw.push(format!(
        "dir: {}",
        app.context.working_dir.as_deref().unwrap_or("-")
    ));
    for file in &app.context.open_files {
        raw.push(format!("file: {file}"));
    }
    for (key, value) in &app.context.extra {
        raw.push(format!("{key}: {value}"));
    }
    for note in &app.notes {
        raw.push(format!("note: {note}"));
    }

    raw.into_iter()
        .enumerate()
        .map(|(i, line)| {
            let truncated = term::truncate_visible(&line, width, caps);
            if i == app.context_cursor && app.focus == Focus::Context {
                term::colorize(&term::pad_visible(&truncated, width, caps), term::REVERSE, caps)
            } else if i >= app.note_section_start() {
                term::colorize(&truncated, term::FG_CYAN, caps)
            } else {
                term::dim(&truncated, caps)
            }
        })
        .collect()
}

// === Overlays ===

fn centered_box(buf: &mut String, lines: &[String], caps: &TermCaps, width: u16, height: u16) {
    let inner = lines
        .iter()
        .map(|l| term::visible_width(l))
        .max()
        .unwrap_or(0)
        .min((width as usize).saturating_sub(4));
    let boxed = term::boxed(lines, inner + 2, caps);
    let box_height = boxed.len() as u16;
    let box_width = (inner + 4) as u16;
    let top = height.saturating_sub(box_height) / 2;
    let left = width.saturating_sub(box_width) / 2;
    for (i, line) in boxed.iter().enumerate() {
        at(buf, left, top + i as u16, line);
    }
}

fn draw_task_overlay(buf: &mut String, app: &App, caps: &TermCaps, width: u16, height: u16) {
    let mut lines = vec![
        term::bold("tasks", caps),
        term::dim(&term::horizontal_rule(24, caps), caps),
    ];
    if app.tasks.is_empty() {
        lines.push(term::dim("no tasks yet", caps));
    }
    let budget = (width as usize).saturating_sub(10);
    for (i, task) in app.tasks.iter().enumerate() {
        let mut line = format!(
            " {} {} {} [{}]",
            task.status.glyph(caps.unicode),
            task.index + 1,
            task.description,
            task.status.label()
        );
        if let Some(p) = task.progress {
            let _ = write!(line, " ({}/{})", p.current, p.total);
        }
        let line = term::truncate_visible(&line, budget, caps);
        if i == app.task_selected {
            lines.push(term::colorize(&line, term::REVERSE, caps));
        } else {
            lines.push(line);
        }
    }
    lines.push(term::dim("Enter select \u{00b7} Esc close", caps));
    centered_box(buf, &lines, caps, width, height);
}

fn draw_help_overlay(buf: &mut String, caps: &TermCaps, width: u16, height: u16) {
    let m = MOD_LABEL;
    let lines: Vec<String> = vec![
        "agentdeck keys".to_string(),
        String::new(),
        "Tab        cycle pane focus".to_string(),
        format!("{m}+m/t/c  jump to main / tasks / context"),
        format!("{m}+o      task overlay"),
        format!("{m}+b      toggle both sidebars"),
        format!("{m}+x      clear history"),
        format!("{m}+r      refresh / expand thought"),
        "Up/Down    scroll focused pane".to_string(),
        format!("{m}+u/d    page the transcript"),
        "Enter      submit input or note".to_string(),
        format!("{m}+q      quit"),
    ];
    centered_box(buf, &lines, caps, width, height);
}

// === Cursor ===

/// Park the cursor at the composer and show it only when the Main pane has
/// focus with no overlay open; everything else keeps it hidden.
fn place_cursor(buf: &mut String, app: &App, layout: &Layout, width: u16) {
    if app.focus == Focus::Main && app.overlay == Overlay::None {
        let budget = (width as usize).saturating_sub(3);
        let col = 2 + term::visible_width(&tail_columns(&app.input, budget)) as u16;
        at(buf, col.min(width.saturating_sub(1)), layout.input_row, term::CURSOR_SHOW);
    }
}
