//! Terminal capability layer: escape-code primitives and width-aware text
//! formatting.
//!
//! Everything here that returns a `String` is a pure function and is tested
//! by equality on the returned string. The only side-effecting entry points
//! are the direct-write helpers (`hide_cursor`, `show_cursor`, `set_title`)
//! and [`RawModeGuard`], which owns the raw-mode lifecycle.

pub mod caps;

use std::io::{self, Write};

use anyhow::Result;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use unicode_width::UnicodeWidthChar;

pub use caps::TermCaps;

// === ANSI constants ===

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const ITALIC: &str = "\x1b[3m";
pub const UNDERLINE: &str = "\x1b[4m";
pub const REVERSE: &str = "\x1b[7m";

pub const FG_RED: &str = "\x1b[31m";
pub const FG_GREEN: &str = "\x1b[32m";
pub const FG_YELLOW: &str = "\x1b[33m";
pub const FG_BLUE: &str = "\x1b[34m";
pub const FG_MAGENTA: &str = "\x1b[35m";
pub const FG_CYAN: &str = "\x1b[36m";
pub const FG_GRAY: &str = "\x1b[90m";

pub const CLEAR_SCREEN: &str = "\x1b[2J";
pub const CLEAR_SCROLLBACK: &str = "\x1b[3J";
pub const CLEAR_LINE: &str = "\x1b[2K";
pub const CURSOR_HOME: &str = "\x1b[H";
pub const CURSOR_HIDE: &str = "\x1b[?25l";
pub const CURSOR_SHOW: &str = "\x1b[?25h";
pub const CURSOR_SAVE: &str = "\x1b7";
pub const CURSOR_RESTORE: &str = "\x1b8";

/// Fallback dimensions when the size query fails (classic VT default).
pub const FALLBACK_SIZE: (u16, u16) = (80, 24);

// === Cursor and screen sequences ===

/// Move the cursor to an absolute 0-based (col, row) position.
#[must_use]
pub fn move_to(col: u16, row: u16) -> String {
    format!("\x1b[{};{}H", row.saturating_add(1), col.saturating_add(1))
}

/// 256-color foreground.
#[must_use]
pub fn fg_256(index: u8) -> String {
    format!("\x1b[38;5;{index}m")
}

/// True-color foreground.
#[must_use]
pub fn fg_rgb(r: u8, g: u8, b: u8) -> String {
    format!("\x1b[38;2;{r};{g};{b}m")
}

/// Wrap `text` in a color sequence plus reset. No-op when color is off.
#[must_use]
pub fn colorize(text: &str, color: &str, caps: &TermCaps) -> String {
    if !caps.color || color.is_empty() {
        return text.to_string();
    }
    format!("{color}{text}{RESET}")
}

/// Bold wrapper honoring capability detection.
#[must_use]
pub fn bold(text: &str, caps: &TermCaps) -> String {
    colorize(text, BOLD, caps)
}

/// Dim wrapper honoring capability detection.
#[must_use]
pub fn dim(text: &str, caps: &TermCaps) -> String {
    colorize(text, DIM, caps)
}

// === Width-aware text handling ===

/// Strip CSI and OSC escape sequences, leaving only printable content.
#[must_use]
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            // CSI: ESC [ params... final byte in 0x40..=0x7E
            Some('[') => {
                chars.next();
                for c in chars.by_ref() {
                    if ('\u{40}'..='\u{7e}').contains(&c) {
                        break;
                    }
                }
            }
            // OSC: ESC ] ... terminated by BEL or ESC \
            Some(']') => {
                chars.next();
                while let Some(c) = chars.next() {
                    if c == '\x07' {
                        break;
                    }
                    if c == '\x1b' {
                        chars.next();
                        break;
                    }
                }
            }
            // Two-byte sequence (ESC c, ESC 7, ...): drop the follower.
            Some(_) => {
                chars.next();
            }
            None => {}
        }
    }
    out
}

/// Display width of `s` in terminal columns, ignoring embedded escapes.
///
/// Wide (CJK, emoji) characters count as two columns per `unicode-width`.
#[must_use]
pub fn visible_width(s: &str) -> usize {
    strip_ansi(s)
        .chars()
        .map(|c| c.width().unwrap_or(0))
        .sum()
}

/// Truncate `s` to at most `max` visible columns, appending an ellipsis when
/// content was cut. Escape sequences pass through uncounted and are never
/// split; a reset is appended after a cut so styling cannot leak.
#[must_use]
pub fn truncate_visible(s: &str, max: usize, caps: &TermCaps) -> String {
    if visible_width(s) <= max {
        return s.to_string();
    }
    let ellipsis = if caps.unicode { "\u{2026}" } else { "..." };
    let ellipsis_width = if caps.unicode { 1 } else { 3 };
    if max < ellipsis_width {
        return ellipsis.chars().take(max).collect();
    }
    let budget = max - ellipsis_width;

    let mut out = String::new();
    let mut used = 0usize;
    let mut saw_escape = false;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            saw_escape = true;
            out.push(c);
            if let Some(&next) = chars.peek() {
                out.push(next);
                chars.next();
                if next == '[' {
                    while let Some(c) = chars.next() {
                        out.push(c);
                        if ('\u{40}'..='\u{7e}').contains(&c) {
                            break;
                        }
                    }
                } else if next == ']' {
                    while let Some(c) = chars.next() {
                        out.push(c);
                        if c == '\x07' {
                            break;
                        }
                    }
                }
            }
            continue;
        }
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(ellipsis);
    if saw_escape {
        out.push_str(RESET);
    }
    out
}

/// Right-pad `s` with spaces to exactly `width` visible columns,
/// truncating first when it is too long.
#[must_use]
pub fn pad_visible(s: &str, width: usize, caps: &TermCaps) -> String {
    let mut out = truncate_visible(s, width, caps);
    let current = visible_width(&out);
    for _ in current..width {
        out.push(' ');
    }
    out
}

// === Decorations ===

/// A short colored tag like `[run]` used to mark history entries.
#[must_use]
pub fn badge(label: &str, color: &str, caps: &TermCaps) -> String {
    colorize(&format!("[{label}]"), color, caps)
}

/// Horizontal rule of `width` columns.
#[must_use]
pub fn horizontal_rule(width: usize, caps: &TermCaps) -> String {
    let glyph = if caps.unicode { '\u{2500}' } else { '-' };
    std::iter::repeat_n(glyph, width).collect()
}

/// Surround `lines` with a border, producing `inner_width + 2` column rows.
/// Rounded Unicode corners with an ASCII fallback.
#[must_use]
pub fn boxed(lines: &[String], inner_width: usize, caps: &TermCaps) -> Vec<String> {
    let (tl, tr, bl, br, h, v) = if caps.unicode {
        ('\u{256d}', '\u{256e}', '\u{2570}', '\u{256f}', '\u{2500}', '\u{2502}')
    } else {
        ('+', '+', '+', '+', '-', '|')
    };
    let bar: String = std::iter::repeat_n(h, inner_width).collect();
    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(format!("{tl}{bar}{tr}"));
    for line in lines {
        out.push(format!("{v}{}{v}", pad_visible(line, inner_width, caps)));
    }
    out.push(format!("{bl}{bar}{br}"));
    out
}

/// Smooth progress bar using eighth-block glyphs, with an ASCII fallback.
///
/// `current > total` renders as full; `total == 0` renders as empty.
#[must_use]
pub fn progress_bar(current: u64, total: u64, width: usize, caps: &TermCaps) -> String {
    if width == 0 {
        return String::new();
    }
    let ratio = if total == 0 {
        0.0
    } else {
        (current as f64 / total as f64).clamp(0.0, 1.0)
    };
    if !caps.unicode {
        let filled = (ratio * width as f64).round() as usize;
        let filled = filled.min(width);
        let mut out = String::with_capacity(width);
        out.extend(std::iter::repeat_n('#', filled));
        out.extend(std::iter::repeat_n('-', width - filled));
        return out;
    }
    const BLOCKS: [char; 8] = [
        '\u{258f}', '\u{258e}', '\u{258d}', '\u{258c}', '\u{258b}', '\u{258a}', '\u{2589}',
        '\u{2588}',
    ];
    let cells = ratio * width as f64;
    let full = cells.floor() as usize;
    let remainder = cells - full as f64;
    let mut out = String::with_capacity(width * 3);
    out.extend(std::iter::repeat_n('\u{2588}', full.min(width)));
    if full < width {
        let eighths = (remainder * 8.0).round() as usize;
        if eighths > 0 {
            out.push(BLOCKS[eighths.min(8) - 1]);
        } else {
            out.push(' ');
        }
        for _ in full + 1..width {
            out.push(' ');
        }
    }
    out
}

// === Terminal queries and direct writes ===

/// Current (columns, rows), falling back to 80x24 when the query fails.
#[must_use]
pub fn terminal_size() -> (u16, u16) {
    match crossterm::terminal::size() {
        Ok((cols, rows)) if cols > 0 && rows > 0 => (cols, rows),
        _ => {
            tracing::warn!("terminal size query failed, using fallback");
            FALLBACK_SIZE
        }
    }
}

/// Hide the cursor immediately.
pub fn hide_cursor(out: &mut impl Write) -> io::Result<()> {
    out.write_all(CURSOR_HIDE.as_bytes())?;
    out.flush()
}

/// Show the cursor immediately.
pub fn show_cursor(out: &mut impl Write) -> io::Result<()> {
    out.write_all(CURSOR_SHOW.as_bytes())?;
    out.flush()
}

/// Set the terminal window title (OSC 0).
pub fn set_title(out: &mut impl Write, title: &str) -> io::Result<()> {
    write!(out, "\x1b]0;{title}\x07")?;
    out.flush()
}

// === Raw mode lifecycle ===

/// Scoped raw-mode acquisition.
///
/// Dropping the guard restores cooked mode, re-shows the cursor and resets
/// SGR state. Restoration is best-effort but runs on every exit path,
/// including early returns and panics, which is the one cleanup this UI
/// must never skip.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn acquire() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = stdout.write_all(RESET.as_bytes());
        let _ = show_cursor(&mut stdout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn full_caps() -> TermCaps {
        TermCaps {
            color: true,
            color256: true,
            truecolor: true,
            unicode: true,
        }
    }

    fn ascii_caps() -> TermCaps {
        TermCaps {
            color: false,
            color256: false,
            truecolor: false,
            unicode: false,
        }
    }

    #[test]
    fn move_to_is_one_based() {
        assert_eq!(move_to(0, 0), "\x1b[1;1H");
        assert_eq!(move_to(9, 4), "\x1b[5;10H");
    }

    #[test]
    fn strip_ansi_removes_csi_and_osc() {
        assert_eq!(strip_ansi("\x1b[31mred\x1b[0m"), "red");
        assert_eq!(strip_ansi("\x1b]0;title\x07body"), "body");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn visible_width_ignores_escapes_and_counts_wide_chars() {
        assert_eq!(visible_width("\x1b[1;32mok\x1b[0m"), 2);
        assert_eq!(visible_width("\u{4f60}\u{597d}"), 4);
        assert_eq!(visible_width(""), 0);
    }

    #[test]
    fn truncate_keeps_short_strings_unchanged() {
        let caps = full_caps();
        let styled = "\x1b[31mhi\x1b[0m";
        assert_eq!(truncate_visible(styled, 2, &caps), styled);
        assert_eq!(truncate_visible("abc", 10, &caps), "abc");
    }

    #[test]
    fn truncate_bounds_visible_width() {
        let caps = full_caps();
        let long = format!("\x1b[34m{}\x1b[0m", "x".repeat(40));
        let cut = truncate_visible(&long, 10, &caps);
        assert!(visible_width(&cut) <= 10);
        assert!(cut.ends_with(RESET));
        assert!(strip_ansi(&cut).ends_with('\u{2026}'));
    }

    #[test]
    fn truncate_ascii_fallback_uses_three_dots() {
        let caps = ascii_caps();
        let cut = truncate_visible(&"y".repeat(20), 8, &caps);
        assert_eq!(cut, "yyyyy...");
    }

    #[test]
    fn truncate_does_not_split_wide_chars() {
        let caps = full_caps();
        // Three double-width chars = 6 columns; a 4-column budget leaves
        // room for one char plus the ellipsis.
        let cut = truncate_visible("\u{4f60}\u{597d}\u{554a}", 4, &caps);
        assert_eq!(cut, "\u{4f60}\u{2026}");
    }

    #[test]
    fn pad_reaches_exact_width() {
        let caps = full_caps();
        assert_eq!(pad_visible("ab", 5, &caps), "ab   ");
        assert_eq!(visible_width(&pad_visible("\x1b[2mx\x1b[0m", 4, &caps)), 4);
    }

    #[test]
    fn boxed_frames_content() {
        let caps = ascii_caps();
        let lines = boxed(&["hi".to_string()], 4, &caps);
        assert_eq!(lines, vec!["+----+", "|hi  |", "+----+"]);
    }

    #[test]
    fn progress_bar_ascii_endpoints() {
        let caps = ascii_caps();
        assert_eq!(progress_bar(0, 10, 4, &caps), "----");
        assert_eq!(progress_bar(10, 10, 4, &caps), "####");
        assert_eq!(progress_bar(5, 10, 4, &caps), "##--");
    }

    #[test]
    fn progress_bar_unicode_is_width_stable() {
        let caps = full_caps();
        for current in 0..=10u64 {
            let bar = progress_bar(current, 10, 8, &caps);
            assert_eq!(visible_width(&bar), 8, "width drift at {current}");
        }
    }

    #[test]
    fn progress_bar_tolerates_degenerate_input() {
        let caps = full_caps();
        assert_eq!(visible_width(&progress_bar(3, 0, 5, &caps)), 5);
        assert_eq!(visible_width(&progress_bar(20, 10, 5, &caps)), 5);
        assert_eq!(progress_bar(1, 2, 0, &caps), "");
    }

    #[test]
    fn colorize_respects_capabilities() {
        assert_eq!(colorize("x", FG_RED, &full_caps()), "\x1b[31mx\x1b[0m");
        assert_eq!(colorize("x", FG_RED, &ascii_caps()), "x");
    }
}
