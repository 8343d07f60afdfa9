use crate::table::table::Table;

/// View state for the table (cursor and viewport)
#[derive(Debug, Clone)]
pub struct TableView {
    // Cursor position; cursor_col indexes the user-facing columns
    pub cursor_row: usize,
    pub cursor_col: usize,

    // Viewport offset (top-left visible cell)
    pub viewport_row: usize,
    pub viewport_col: usize,

    // Set during render
    pub viewport_height: usize,
    pub viewport_width: usize,
}

impl Default for TableView {
    fn default() -> Self {
        Self::new()
    }
}

impl TableView {
    pub fn new() -> Self {
        Self {
            cursor_row: 0,
            cursor_col: 0,
            viewport_row: 0,
            viewport_col: 0,
            viewport_height: 20,
            viewport_width: 10,
        }
    }

    /// Back to the top-left corner (after loading a new file)
    pub fn reset(&mut self) {
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.viewport_row = 0;
        self.viewport_col = 0;
    }

    /// Ensure cursor is within table bounds
    pub fn clamp_cursor(&mut self, table: &Table) {
        self.cursor_row = self.cursor_row.min(table.row_count().saturating_sub(1));
        self.cursor_col = self.cursor_col.min(table.col_count().saturating_sub(1));
        self.scroll_to_cursor();
    }

    /// Ensure viewport contains the cursor
    pub fn scroll_to_cursor(&mut self) {
        let height = self.viewport_height.max(1);
        let width = self.viewport_width.max(1);

        if self.cursor_row < self.viewport_row {
            self.viewport_row = self.cursor_row;
        } else if self.cursor_row >= self.viewport_row + height {
            self.viewport_row = self.cursor_row + 1 - height;
        }

        if self.cursor_col < self.viewport_col {
            self.viewport_col = self.cursor_col;
        } else if self.cursor_col >= self.viewport_col + width {
            self.viewport_col = self.cursor_col + 1 - width;
        }
    }

    pub fn move_left_n(&mut self, n: usize) {
        self.cursor_col = self.cursor_col.saturating_sub(n);
        self.scroll_to_cursor();
    }

    pub fn move_right_n(&mut self, n: usize, table: &Table) {
        self.cursor_col = (self.cursor_col + n).min(table.col_count().saturating_sub(1));
        self.scroll_to_cursor();
    }

    pub fn move_up_n(&mut self, n: usize) {
        self.cursor_row = self.cursor_row.saturating_sub(n);
        self.scroll_to_cursor();
    }

    pub fn move_down_n(&mut self, n: usize, table: &Table) {
        self.cursor_row = (self.cursor_row + n).min(table.row_count().saturating_sub(1));
        self.scroll_to_cursor();
    }

    pub fn move_to_top(&mut self) {
        self.cursor_row = 0;
        self.scroll_to_cursor();
    }

    pub fn move_to_bottom(&mut self, table: &Table) {
        self.cursor_row = table.row_count().saturating_sub(1);
        self.scroll_to_cursor();
    }

    pub fn move_to_first_col(&mut self) {
        self.cursor_col = 0;
        self.scroll_to_cursor();
    }

    pub fn move_to_last_col(&mut self, table: &Table) {
        self.cursor_col = table.col_count().saturating_sub(1);
        self.scroll_to_cursor();
    }

    pub fn page_down(&mut self, table: &Table) {
        let jump = self.viewport_height.saturating_sub(1).max(1);
        self.move_down_n(jump, table);
    }

    pub fn page_up(&mut self) {
        let jump = self.viewport_height.saturating_sub(1).max(1);
        self.move_up_n(jump);
    }

    pub fn half_page_down(&mut self, table: &Table) {
        let jump = (self.viewport_height / 2).max(1);
        self.move_down_n(jump, table);
    }

    pub fn half_page_up(&mut self) {
        let jump = (self.viewport_height / 2).max(1);
        self.move_up_n(jump);
    }
}
