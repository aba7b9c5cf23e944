//! Pane geometry: carve the terminal into header, body panes and input strip.
//!
//! Recomputed from scratch on every render tick; nothing here is cached, so a
//! resize or sidebar toggle is just "compute again with new inputs".

/// One rectangular screen region, 0-based columns/rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub col: u16,
    pub row: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[must_use]
    pub fn new(col: u16, row: u16, width: u16, height: u16) -> Self {
        Self {
            col,
            row,
            width,
            height,
        }
    }

    /// Column one past the right edge.
    #[must_use]
    pub fn right(&self) -> u16 {
        self.col + self.width
    }
}

/// Fixed chrome rows: header, footer hint line, input prompt.
const CHROME_ROWS: u16 = 3;

/// Narrowest main pane we will render; sidebars are dropped below this.
pub const MIN_MAIN_WIDTH: u16 = 20;

/// Sidebar width floor so the panes stay legible on narrow terminals.
const MIN_SIDEBAR_WIDTH: u16 = 12;

/// Computed pane geometry for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub left: Option<Rect>,
    pub main: Rect,
    pub right: Option<Rect>,
    /// Columns of the vertical divider lines, left to right.
    pub dividers: Vec<u16>,
    pub header_row: u16,
    pub footer_row: u16,
    pub input_row: u16,
    /// First body row (below the header).
    pub body_top: u16,
    pub body_height: u16,
}

impl Layout {
    /// Compute pane rectangles for a `width` x `height` terminal.
    ///
    /// Sidebar visibility flags request the left (task list) and right
    /// (context) panes; a pane that cannot fit at the width floors is
    /// silently dropped for this frame rather than producing a degenerate
    /// rectangle.
    #[must_use]
    pub fn compute(
        width: u16,
        height: u16,
        left_width: u16,
        right_width: u16,
        left_visible: bool,
        right_visible: bool,
    ) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        let header_row = 0;
        let input_row = height.saturating_sub(1);
        let footer_row = height.saturating_sub(2);
        let body_top = 1u16.min(input_row);
        let body_height = height.saturating_sub(CHROME_ROWS);

        let left_width = left_width.max(MIN_SIDEBAR_WIDTH);
        let right_width = right_width.max(MIN_SIDEBAR_WIDTH);

        // Shed sidebars that would squeeze the main pane below its floor.
        let mut show_left = left_visible;
        let mut show_right = right_visible;
        let fits = |l: bool, r: bool| {
            let used = if l { left_width + 1 } else { 0 } + if r { right_width + 1 } else { 0 };
            width >= used + MIN_MAIN_WIDTH
        };
        if show_left && show_right && !fits(true, true) {
            show_right = false;
        }
        if show_left && !fits(show_left, show_right) {
            show_left = false;
        }
        if show_right && !fits(show_left, show_right) {
            show_right = false;
        }

        let mut dividers = Vec::new();
        let left = if show_left {
            dividers.push(left_width);
            Some(Rect::new(0, body_top, left_width, body_height))
        } else {
            None
        };
        let right = if show_right {
            let col = width - right_width;
            dividers.push(col - 1);
            Some(Rect::new(col, body_top, right_width, body_height))
        } else {
            None
        };

        let main_col = left.map_or(0, |r| r.right() + 1);
        let main_end = right.map_or(width, |r| r.col - 1);
        let main_width = main_end.saturating_sub(main_col).max(1);
        let main = Rect::new(main_col, body_top, main_width, body_height);

        Self {
            left,
            main,
            right,
            dividers,
            header_row,
            footer_row,
            input_row,
            body_top,
            body_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LEFT: u16 = 22;
    const RIGHT: u16 = 28;

    fn both(width: u16, height: u16) -> Layout {
        Layout::compute(width, height, LEFT, RIGHT, true, true)
    }

    #[test]
    fn widths_are_complementary_when_both_sidebars_visible() {
        for width in [72u16, 80, 100, 120, 200] {
            let layout = both(width, 24);
            let (Some(left), Some(right)) = (layout.left, layout.right) else {
                panic!("sidebars should fit at width {width}");
            };
            let dividers = layout.dividers.len() as u16;
            assert_eq!(
                left.width + layout.main.width + right.width + dividers,
                width,
                "width {width}"
            );
        }
    }

    #[test]
    fn hidden_sidebars_give_main_the_full_width() {
        let layout = Layout::compute(90, 24, LEFT, RIGHT, false, false);
        assert_eq!(layout.left, None);
        assert_eq!(layout.right, None);
        assert!(layout.dividers.is_empty());
        assert_eq!(layout.main, Rect::new(0, 1, 90, 21));
    }

    #[test]
    fn right_pane_is_anchored_to_the_right_edge() {
        let layout = both(100, 24);
        let right = layout.right.unwrap();
        assert_eq!(right.right(), 100);
        assert_eq!(layout.dividers, vec![LEFT, right.col - 1]);
    }

    #[test]
    fn narrow_terminal_sheds_sidebars_instead_of_degenerating() {
        let layout = both(40, 24);
        assert!(layout.right.is_none());
        assert!(layout.main.width >= MIN_MAIN_WIDTH);

        let tiny = both(15, 24);
        assert!(tiny.left.is_none() && tiny.right.is_none());
        assert!(tiny.main.width >= 1);
    }

    #[test]
    fn short_terminal_clamps_heights_non_negative() {
        let layout = both(100, 2);
        assert_eq!(layout.body_height, 0);
        assert_eq!(layout.main.height, 0);
        let minimal = Layout::compute(10, 1, LEFT, RIGHT, true, true);
        assert_eq!(minimal.input_row, 0);
    }

    #[test]
    fn chrome_rows_are_stacked_at_the_edges() {
        let layout = both(100, 30);
        assert_eq!(layout.header_row, 0);
        assert_eq!(layout.body_top, 1);
        assert_eq!(layout.footer_row, 28);
        assert_eq!(layout.input_row, 29);
        assert_eq!(layout.body_height, 27);
    }

    #[test]
    fn single_sidebar_uses_one_divider() {
        let layout = Layout::compute(100, 24, LEFT, RIGHT, true, false);
        assert_eq!(layout.dividers, vec![LEFT]);
        assert_eq!(layout.main.col, LEFT + 1);
        assert_eq!(layout.main.right(), 100);
    }
}
