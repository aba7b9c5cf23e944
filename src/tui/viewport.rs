//! Virtualized scrolling window over a pane's full content.
//!
//! The viewport owns the complete line buffer and exposes only the slice that
//! fits on screen. The one invariant everything else leans on:
//! `0 <= offset <= max(0, len - height)` after every mutation.

/// Scroll position report used to render "more above/below" indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollInfo {
    pub offset: usize,
    pub total: usize,
    pub visible: usize,
    /// Percent scrolled through the overflow, 100 when pinned to the bottom.
    pub percent: u8,
    pub can_scroll_up: bool,
    pub can_scroll_down: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Viewport {
    lines: Vec<String>,
    offset: usize,
    height: usize,
}

impl Viewport {
    #[must_use]
    pub fn new(height: usize) -> Self {
        Self {
            lines: Vec::new(),
            offset: 0,
            height,
        }
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.height)
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }

    /// Replace the full content, re-clamping the scroll offset.
    pub fn set_content(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.clamp();
    }

    /// Resize the visible window (layout change), re-clamping the offset.
    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.clamp();
    }

    /// Append one line. A viewport already pinned to the bottom stays pinned;
    /// a viewport the user scrolled away from does not get yanked down.
    pub fn add_line(&mut self, line: String) {
        let pinned = self.is_at_bottom();
        self.lines.push(line);
        if pinned {
            self.offset = self.max_offset();
        }
    }

    /// Scroll up `n` lines. Returns whether the offset actually moved.
    pub fn scroll_up(&mut self, n: usize) -> bool {
        let before = self.offset;
        self.offset = self.offset.saturating_sub(n);
        self.offset != before
    }

    /// Scroll down `n` lines. Returns whether the offset actually moved.
    pub fn scroll_down(&mut self, n: usize) -> bool {
        let before = self.offset;
        self.offset = (self.offset + n).min(self.max_offset());
        self.offset != before
    }

    pub fn page_up(&mut self) -> bool {
        self.scroll_up(self.height.max(1))
    }

    pub fn page_down(&mut self) -> bool {
        self.scroll_down(self.height.max(1))
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    /// A zero-height window counts as at-bottom so a viewport squeezed out
    /// by a degenerate terminal re-pins to the tail once height returns.
    #[must_use]
    pub fn is_at_bottom(&self) -> bool {
        self.height == 0 || self.offset >= self.max_offset()
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Exactly the slice of content intersecting `[offset, offset + height)`.
    #[must_use]
    pub fn visible_lines(&self) -> &[String] {
        let end = (self.offset + self.height).min(self.lines.len());
        let start = self.offset.min(end);
        &self.lines[start..end]
    }

    #[must_use]
    pub fn scroll_info(&self) -> ScrollInfo {
        let max = self.max_offset();
        let percent = if max == 0 {
            100
        } else {
            ((self.offset * 100) / max) as u8
        };
        ScrollInfo {
            offset: self.offset,
            total: self.lines.len(),
            visible: self.visible_lines().len(),
            percent,
            can_scroll_up: self.offset > 0,
            can_scroll_down: self.offset < max,
        }
    }
}
