//! Drawing the pane tree with ratatui.
//!
//! Containers divide their area 50/50 along the split direction; each leaf
//! gets a bordered block titled `user@host · state · cwd` with the pane's
//! `vt100` screen inside. The bottom row is a status line.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::Multiplexer;
use crate::pane::{PaneId, PaneNode, SplitDirection};
use crate::session::ConnectionState;

/// Number of history entries shown in the status line
const STATUS_HISTORY_ENTRIES: usize = 3;

/// Outer rectangle of every leaf, in tree order
pub fn pane_rects(node: &PaneNode, area: Rect) -> Vec<(PaneId, Rect)> {
    let mut out = Vec::new();
    collect_rects(node, area, &mut out);
    out
}

fn collect_rects(node: &PaneNode, area: Rect, out: &mut Vec<(PaneId, Rect)>) {
    match node {
        PaneNode::Leaf(pane) => out.push((pane.id, area)),
        PaneNode::Split {
            direction,
            first,
            second,
            ..
        } => {
            let halves = [Constraint::Percentage(50), Constraint::Percentage(50)];
            let chunks = match direction {
                SplitDirection::Horizontal => Layout::vertical(halves).split(area),
                SplitDirection::Vertical => Layout::horizontal(halves).split(area),
            };
            collect_rects(first, chunks[0], out);
            collect_rects(second, chunks[1], out);
        }
    }
}

/// Split the screen into the pane area and the status row
pub fn split_screen(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
    (chunks[0], chunks[1])
}

/// Terminal size inside a pane's border
pub fn inner_size(rect: Rect) -> (u16, u16) {
    (
        rect.width.saturating_sub(2).max(1),
        rect.height.saturating_sub(2).max(1),
    )
}

fn vt_to_color(c: vt100::Color) -> Color {
    match c {
        vt100::Color::Default => Color::Reset,
        vt100::Color::Idx(i) => Color::Indexed(i),
        vt100::Color::Rgb(r, g, b) => Color::Rgb(r, g, b),
    }
}

fn screen_text(screen: &vt100::Screen, cols: u16, rows: u16) -> Text<'static> {
    let mut lines: Vec<Line<'static>> = Vec::with_capacity(rows as usize);
    for row in 0..rows {
        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut current_text = String::new();
        let mut current_style = Style::default();
        for col in 0..cols {
            let Some(cell) = screen.cell(row, col) else {
                current_text.push(' ');
                continue;
            };
            if cell.is_wide_continuation() {
                continue;
            }
            let mut style = Style::default()
                .fg(vt_to_color(cell.fgcolor()))
                .bg(vt_to_color(cell.bgcolor()));
            if cell.bold() {
                style = style.add_modifier(Modifier::BOLD);
            }
            if cell.italic() {
                style = style.add_modifier(Modifier::ITALIC);
            }
            if cell.underline() {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            if cell.inverse() {
                style = style.add_modifier(Modifier::REVERSED);
            }
            if style != current_style {
                if !current_text.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut current_text), current_style));
                }
                current_style = style;
            }
            let ch = cell.contents();
            if ch.is_empty() {
                current_text.push(' ');
            } else {
                current_text.push_str(&ch);
            }
        }
        if !current_text.is_empty() {
            spans.push(Span::styled(current_text, current_style));
        }
        lines.push(Line::from(spans));
    }
    Text::from(lines)
}

fn state_color(state: ConnectionState) -> Color {
    match state {
        ConnectionState::Connected => Color::Green,
        ConnectionState::Connecting => Color::Yellow,
        ConnectionState::Disconnected => Color::Red,
    }
}

/// Draw the whole multiplexer
pub fn draw(frame: &mut Frame, mux: &Multiplexer) {
    let (panes_area, status_area) = split_screen(frame.area());
    let focused = mux.focused_pane_id();

    for (id, rect) in pane_rects(mux.root(), panes_area) {
        let Some(session) = mux.session(id) else {
            continue;
        };
        let info = session.info();
        let mut title = format!(
            " {} · {}",
            session.credentials().label(),
            session.state().label()
        );
        if let Some(cwd) = &info.current_working_directory {
            title.push_str(" · ");
            title.push_str(cwd);
        }
        title.push(' ');

        let border_style = if id == focused {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(
                title,
                Style::default().fg(state_color(session.state())),
            ));

        let (cols, rows) = inner_size(rect);
        let content = screen_text(session.surface().screen(), cols, rows);
        frame.render_widget(Paragraph::new(content).block(block), rect);
    }

    frame.render_widget(Paragraph::new(status_line(mux)), status_area);
}

fn status_line(mux: &Multiplexer) -> Line<'static> {
    let mut spans = Vec::new();
    if mux.is_prefix_armed() {
        spans.push(Span::styled(
            " PREFIX ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }
    spans.push(Span::raw(format!(
        " par-mux · {} panes · pane {} ",
        mux.panes().pane_count(),
        mux.focused_pane_id()
    )));
    if let Some(session) = mux.session(mux.focused_pane_id()) {
        if session.is_capturing() {
            spans.push(Span::styled(
                "· capturing history ",
                Style::default().fg(Color::Yellow),
            ));
        }
        let recent: Vec<&str> = session
            .info()
            .command_history
            .iter()
            .take(STATUS_HISTORY_ENTRIES)
            .map(String::as_str)
            .collect();
        if !recent.is_empty() {
            spans.push(Span::styled(
                format!("· recent: {}", recent.join(" | ")),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::credentials::Credentials;
    use crate::pane::Pane;

    #[test]
    fn horizontal_split_stacks_panes() {
        let c = Arc::new(Credentials::new("h", "u", "k"));
        let tree = PaneNode::split(
            3,
            SplitDirection::Horizontal,
            Arc::new(PaneNode::leaf(Pane::new(1, Arc::clone(&c)))),
            Arc::new(PaneNode::leaf(Pane::new(2, c))),
        );
        let rects = pane_rects(&tree, Rect::new(0, 0, 80, 40));
        assert_eq!(rects[0], (1, Rect::new(0, 0, 80, 20)));
        assert_eq!(rects[1], (2, Rect::new(0, 20, 80, 20)));
    }

    #[test]
    fn vertical_split_is_side_by_side() {
        let c = Arc::new(Credentials::new("h", "u", "k"));
        let tree = PaneNode::split(
            3,
            SplitDirection::Vertical,
            Arc::new(PaneNode::leaf(Pane::new(1, Arc::clone(&c)))),
            Arc::new(PaneNode::leaf(Pane::new(2, c))),
        );
        let rects = pane_rects(&tree, Rect::new(0, 0, 80, 40));
        assert_eq!(rects[0].1.width + rects[1].1.width, 80);
        assert_eq!(rects[1].1.x, 40);
    }

    #[test]
    fn inner_size_subtracts_border() {
        assert_eq!(inner_size(Rect::new(0, 0, 82, 26)), (80, 24));
        assert_eq!(inner_size(Rect::new(0, 0, 1, 1)), (1, 1));
    }
}
