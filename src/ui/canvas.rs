use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style as RatStyle},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ui::style::Style;

/// A single item that can be displayed on the canvas
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasItem {
    /// Plain text line
    Text(String),
    /// One line of pretty-printed JSON, keys highlighted
    Json(String),
    /// Header/title text (bold)
    Header(String),
    /// Horizontal separator
    Separator,
    /// Empty line
    Blank,
}

/// Text the overlay hands to the clipboard on `y`
#[derive(Debug, Clone, PartialEq)]
pub struct CopyPayload {
    pub label: String,
    pub entries: usize,
    pub text: String,
}

/// Overlay for the JSON previews and theme list
#[derive(Debug, Clone)]
pub struct Canvas {
    items: Vec<CanvasItem>,
    title: String,
    pub visible: bool,
    scroll: usize,
    payload: Option<CopyPayload>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            title: "Preview".to_string(),
            visible: false,
            scroll: 0,
            payload: None,
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Clear all content
    pub fn clear(&mut self) {
        self.items.clear();
        self.scroll = 0;
        self.payload = None;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn add_text(&mut self, text: impl Into<String>) {
        self.items.push(CanvasItem::Text(text.into()));
    }

    pub fn add_header(&mut self, text: impl Into<String>) {
        self.items.push(CanvasItem::Header(text.into()));
    }

    pub fn add_separator(&mut self) {
        self.items.push(CanvasItem::Separator);
    }

    pub fn add_blank(&mut self) {
        self.items.push(CanvasItem::Blank);
    }

    /// Add a JSON document line by line and remember it for copying
    pub fn add_json(&mut self, label: &str, entries: usize, text: &str) {
        self.items
            .extend(text.lines().map(|l| CanvasItem::Json(l.to_string())));
        self.payload = Some(CopyPayload {
            label: label.to_string(),
            entries,
            text: text.to_string(),
        });
    }

    pub fn payload(&self) -> Option<&CopyPayload> {
        self.payload.as_ref()
    }

    #[cfg(test)]
    pub fn items(&self) -> &[CanvasItem] {
        &self.items
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.scroll = self.scroll.saturating_sub(amount);
    }

    /// Scroll down, never past the last item
    pub fn scroll_down(&mut self, amount: usize) {
        let max = self.items.len().saturating_sub(1);
        self.scroll = self.scroll.saturating_add(amount).min(max);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    #[cfg(test)]
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Render the canvas as an overlay
    pub fn render(&self, frame: &mut Frame, area: Rect, style: &Style) {
        if !self.visible {
            return;
        }

        // 80% of the screen, centered
        let overlay_width = (area.width * 80 / 100).max(40).min(area.width.saturating_sub(4));
        let overlay_height = (area.height * 80 / 100).max(10).min(area.height.saturating_sub(4));
        let overlay_x = area.x + (area.width - overlay_width) / 2;
        let overlay_y = area.y + (area.height - overlay_height) / 2;
        let overlay_area = Rect::new(overlay_x, overlay_y, overlay_width, overlay_height);

        frame.render_widget(Clear, overlay_area);

        let base = style.overlay();
        let lines: Vec<Line> = self
            .items
            .iter()
            .map(|item| match item {
                CanvasItem::Text(text) => Line::from(text.as_str()),
                CanvasItem::Json(text) => json_line(text, style.header()),
                CanvasItem::Header(text) => Line::from(Span::styled(
                    text.as_str(),
                    style.header().add_modifier(Modifier::BOLD),
                )),
                CanvasItem::Separator => Line::from(Span::styled(
                    "─".repeat(overlay_width.saturating_sub(4) as usize),
                    style.row_number(),
                )),
                CanvasItem::Blank => Line::from(""),
            })
            .collect();

        let visible_height = overlay_height.saturating_sub(2) as usize;
        let max_scroll = lines.len().saturating_sub(visible_height);
        let scroll = self.scroll.min(max_scroll);
        let visible_lines: Vec<Line> = lines.into_iter().skip(scroll).collect();

        let help = if self.payload.is_some() {
            "q/Esc to close, j/k to scroll, y to copy"
        } else {
            "q/Esc to close, j/k to scroll"
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} [{}] ", self.title, help))
            .title_alignment(Alignment::Center)
            .style(base);

        frame.render_widget(Paragraph::new(visible_lines).block(block), overlay_area);
    }
}

/// Split `  "key": value` so the key can be styled on its own
fn json_line(text: &str, key_style: RatStyle) -> Line<'_> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('"') {
        if let Some(pos) = text.find("\": ") {
            let (key, rest) = text.split_at(pos + 1);
            return Line::from(vec![Span::styled(key, key_style), Span::raw(rest)]);
        }
    }
    Line::from(text)
}
