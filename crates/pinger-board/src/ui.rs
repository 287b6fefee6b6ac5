use crate::app::{App, ConnectionStatus};
use crate::theme;
use pinger_core::{render, ClientState, Display, StatusRow, Subscriber, LOADING_TEXT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use std::{
    cell::{Ref, RefCell},
    rc::Rc,
};

#[derive(Default)]
struct Mount {
    display: Display,
    renders: u64,
}

/// Store subscriber that owns the status list. Clones share one mount, so
/// the store can hold one handle while the draw loop reads through another.
#[derive(Clone, Default)]
pub struct View {
    mount: Rc<RefCell<Mount>>,
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(&self) -> Ref<'_, Display> {
        Ref::map(self.mount.borrow(), |mount| &mount.display)
    }

    pub fn renders(&self) -> u64 {
        self.mount.borrow().renders
    }
}

impl Subscriber for View {
    fn notify(&mut self, state: &ClientState) {
        let mut mount = self.mount.borrow_mut();
        mount.display = render(state);
        mount.renders += 1;
    }
}

pub fn draw(frame: &mut Frame, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(frame.size());
    frame.render_widget(header(app), layout[0]);
    draw_statuses(frame, &app.display(), layout[1]);
}

fn header(app: &App) -> Paragraph<'static> {
    let (running, total) = app.counts();
    let connection = app.connection();
    let updated = app
        .last_update()
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let status_line = Line::from(vec![
        Span::styled("Feed: ", theme::MUTED_STYLE),
        Span::styled(app.endpoint().to_string(), theme::TEXT_STYLE),
        Span::raw("  "),
        Span::styled(
            connection.label(),
            Style::new().fg(theme::connection_color(
                *connection == ConnectionStatus::Connected,
            )),
        ),
    ]);
    let mut detail = format!("Running: {running}/{total}  Updated: {updated}");
    if let ConnectionStatus::Disconnected(Some(reason)) = connection {
        detail.push_str(&format!("  ({reason})"));
    }
    Paragraph::new(Text::from(vec![
        status_line,
        Line::from(Span::styled(detail, theme::MUTED_STYLE)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::BORDER_STYLE)
            .title(Span::styled("Pinger", theme::HEADER_STYLE)),
    )
}

fn draw_statuses(frame: &mut Frame, display: &Display, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::BORDER_STYLE)
        .title(Span::styled("Applications", theme::HEADER_STYLE));
    match display {
        Display::Loading => {
            let loading = Paragraph::new(Line::from(Span::styled(
                LOADING_TEXT,
                theme::MUTED_STYLE,
            )))
            .block(block);
            frame.render_widget(loading, area);
        }
        Display::Rows(rows) => {
            let items: Vec<ListItem> = rows.iter().map(row_item).collect();
            frame.render_widget(List::new(items).block(block), area);
        }
    }
}

fn row_item(row: &StatusRow) -> ListItem<'static> {
    let style = theme::status_style(row.class);
    ListItem::new(Line::from(vec![
        Span::styled(row.app.clone(), theme::APP_STYLE),
        Span::raw(" "),
        Span::styled(format!("({})", row.label()), style),
        Span::raw(" "),
        Span::raw(row.glyph()),
    ]))
}
