pub mod canvas;
pub mod style;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style as RatStyle},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table as RatatuiTable},
    Frame,
};

use crate::app::App;
use crate::mode::Mode;
use crate::util::{display_width, truncate_to_width};
use crate::viewstate::MessageKind;

/// Borders plus the header line
const TABLE_CHROME_ROWS: u16 = 3;

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.size();
    if let Some(bg) = app.view_state.style.background() {
        frame.render_widget(Block::default().style(RatStyle::default().bg(bg)), area);
    }

    let diff_height = if app.view_state.show_diff {
        let wanted = diff_pane_rows(app.history.modified().len());
        wanted.clamp(TABLE_CHROME_ROWS + 1, (area.height * 2 / 5).max(TABLE_CHROME_ROWS + 1))
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(diff_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_table(frame, app, chunks[0]);
    if app.view_state.show_diff {
        render_diff(frame, app, chunks[1]);
    }
    render_status_bar(frame, app, chunks[2]);
    render_command_line(frame, app, chunks[3]);

    app.view_state.canvas.render(frame, area, &app.view_state.style);
}

/// Height wanted by the diff pane for `modified` rows
fn diff_pane_rows(modified: usize) -> u16 {
    u16::try_from(modified)
        .unwrap_or(u16::MAX)
        .saturating_add(TABLE_CHROME_ROWS)
}

/// How many columns starting at `first` fit into `available` cells
fn visible_columns(widths: &[usize], first: usize, available: usize) -> usize {
    let mut used = 0;
    let mut count = 0;
    for w in widths.iter().skip(first) {
        used += w + 1;
        if used > available && count > 0 {
            break;
        }
        count += 1;
    }
    count
}

fn render_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = match &app.file_path {
        Some(p) => format!(" {} ", p.display()),
        None if app.view_state.is_loading() => " Loading ".to_string(),
        None => " No file (:e <file> to open) ".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let table = app.history.current();
    let columns = table.columns();
    if columns.is_empty() {
        frame.render_widget(block, area);
        return;
    }

    let widths = app.col_widths.col_widths(table).to_vec();
    let row_num_width = table.row_count().to_string().len().max(3);
    let style = &app.view_state.style;
    let view = &mut app.view_state.view;

    // Resize the viewport to what the frame can show, then follow the cursor
    view.viewport_height = area.height.saturating_sub(TABLE_CHROME_ROWS) as usize;
    let available = (area.width as usize).saturating_sub(row_num_width + 3);
    view.viewport_width = visible_columns(&widths, view.viewport_col, available).max(1);
    view.scroll_to_cursor();
    view.viewport_width = visible_columns(&widths, view.viewport_col, available).max(1);

    let first_col = view.viewport_col;
    let last_col = (first_col + view.viewport_width).min(columns.len());
    let shown = &columns[first_col..last_col];

    let mut constraints = vec![Constraint::Length(row_num_width as u16 + 1)];
    constraints.extend(widths[first_col..last_col].iter().map(|w| Constraint::Length(*w as u16)));

    let mut header_cells = vec![Cell::from("")];
    for (i, name) in shown.iter().enumerate() {
        let col = first_col + i;
        let cell_style = if col == view.cursor_col { style.header_selected() } else { style.header() };
        header_cells.push(Cell::from(truncate_to_width(name, widths[col])).style(cell_style));
    }

    let end_row = (view.viewport_row + view.viewport_height).min(table.row_count());
    let rows: Vec<Row> = (view.viewport_row..end_row)
        .filter_map(|r| table.get_row(r).map(|row| (r, row)))
        .map(|(r, row)| {
            let num_style = if r == view.cursor_row { style.row_number_cursor() } else { style.row_number() };
            let mut cells = vec![Cell::from((r + 1).to_string()).style(num_style)];
            for (i, name) in shown.iter().enumerate() {
                let col = first_col + i;
                let cell_style = if r == view.cursor_row && col == view.cursor_col {
                    style.cell_cursor()
                } else if col == view.cursor_col {
                    style.column_selected()
                } else {
                    style.cell()
                };
                cells.push(Cell::from(truncate_to_width(&row.text(name), widths[col])).style(cell_style));
            }
            Row::new(cells)
        })
        .collect();

    let widget = RatatuiTable::new(rows, constraints)
        .header(Row::new(header_cells))
        .column_spacing(1)
        .block(block);
    frame.render_widget(widget, area);
}

fn render_diff(frame: &mut Frame, app: &App, area: Rect) {
    let style = &app.view_state.style;
    let modified = app.history.modified();
    let columns = app.history.current().columns();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Modified rows ({}) [ / ] to scroll, D to hide ", modified.len()));

    let mut constraints = vec![Constraint::Length(8), Constraint::Length(6)];
    constraints.extend(columns.iter().map(|c| Constraint::Length(display_width(c).clamp(6, 24) as u16)));

    let mut header = vec![Cell::from(""), Cell::from("Row")];
    header.extend(columns.iter().map(|c| Cell::from(c.as_str())));

    let height = area.height.saturating_sub(TABLE_CHROME_ROWS) as usize;
    let rows: Vec<Row> = modified
        .iter()
        .skip(app.view_state.diff_scroll)
        .take(height)
        .map(|m| {
            let (label, row_style) = if m.is_original() {
                ("ORIGINAL", style.diff_original())
            } else {
                ("", style.diff_renamed())
            };
            let mut cells = vec![Cell::from(label), Cell::from((m.index + 1).to_string())];
            cells.extend(columns.iter().map(|c| Cell::from(m.row.text(c).into_owned())));
            Row::new(cells).style(row_style)
        })
        .collect();

    let widget = RatatuiTable::new(rows, constraints)
        .header(Row::new(header).style(style.header()))
        .column_spacing(1)
        .block(block);
    frame.render_widget(widget, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let style = &app.view_state.style;
    let table = app.history.current();

    let file_name = app
        .file_path
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "[No File]".to_string());

    let mut spans = vec![
        Span::styled(format!(" {} ", app.mode.display_name()), app.view_state.style.status_mode(&app.mode)),
        Span::raw(" "),
        Span::raw(file_name),
    ];
    if app.dirty {
        spans.push(Span::styled(" [+]", style.status_unsaved()));
    }
    if let Some(column) = app.history.selected() {
        spans.push(Span::raw(format!("  col: {}", column)));
    }

    let mut right = format!("{} rows ", table.row_count());
    if app.history.can_undo() || app.history.can_redo() {
        right = format!(
            "{} undo {} redo {} ",
            right,
            app.history.undo_depth(),
            app.history.redo_depth()
        );
    }
    let pending = app.key_buffer_display();
    if !pending.is_empty() {
        right = format!("{}  {}", pending, right);
    }
    if let Some((operation, progress)) = &app.view_state.progress {
        right = format!("{}  {}", progress.format(operation), right);
    }

    let left_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let pad = (area.width as usize).saturating_sub(left_width + display_width(&right));
    spans.push(Span::raw(" ".repeat(pad)));
    spans.push(Span::raw(right));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(style.status_bar()), area);
}

fn render_command_line(frame: &mut Frame, app: &App, area: Rect) {
    let style = &app.view_state.style;
    match app.mode {
        Mode::Command => {
            let line = Line::from(vec![
                Span::styled(":", style.command_prompt()),
                Span::styled(app.command_buffer(), style.command_line()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            let x = area.x + 1 + display_width(app.command_buffer()) as u16;
            frame.set_cursor(x.min(area.right().saturating_sub(1)), area.y);
        }
        Mode::Prompt(kind) => {
            let label = kind.label();
            let buffer = app.prompt_buffer();
            let line = Line::from(vec![
                Span::styled(label, style.command_prompt()),
                Span::styled(buffer, style.command_line()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            let before: String = buffer.chars().take(app.prompt_cursor()).collect();
            let x = area.x + (display_width(label) + display_width(&before)) as u16;
            frame.set_cursor(x.min(area.right().saturating_sub(1)), area.y);
        }
        Mode::Normal => {
            if let Some(msg) = &app.view_state.message {
                let msg_style = match msg.kind {
                    MessageKind::Info => style.message_info(),
                    MessageKind::Warning => style.message_warning(),
                    MessageKind::Error => style.message_error().add_modifier(Modifier::BOLD),
                };
                frame.render_widget(Paragraph::new(Span::styled(msg.text.as_str(), msg_style)), area);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_columns() {
        assert_eq!(visible_columns(&[10, 10, 10], 0, 25), 2);
        assert_eq!(visible_columns(&[10, 10, 10], 1, 100), 2);
        // A column wider than the screen is still shown
        assert_eq!(visible_columns(&[50, 10], 0, 20), 1);
        assert_eq!(visible_columns(&[], 0, 20), 0);
    }

    #[test]
    fn test_diff_pane_rows_saturate() {
        assert_eq!(diff_pane_rows(2), 2 + TABLE_CHROME_ROWS);
        assert_eq!(diff_pane_rows(65_534), u16::MAX);
        assert_eq!(diff_pane_rows(70_000), u16::MAX);
    }
}
