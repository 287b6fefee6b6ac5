use pinger_core::StatusClass;
use ratatui::style::{Color, Modifier, Style};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
pub const BORDER_STYLE: Style = Style::new().fg(Color::Rgb(71, 85, 105));
pub const TEXT_STYLE: Style = Style::new().fg(Color::Rgb(226, 232, 240));
pub const MUTED_STYLE: Style = Style::new().fg(Color::Rgb(148, 163, 184));
pub const APP_STYLE: Style = Style::new()
    .fg(Color::Rgb(226, 232, 240))
    .add_modifier(Modifier::BOLD);

pub fn status_color(class: StatusClass) -> Color {
    match class {
        StatusClass::Ok => Color::Rgb(34, 197, 94),
        StatusClass::Down => Color::Rgb(239, 68, 68),
    }
}

pub fn status_style(class: StatusClass) -> Style {
    Style::new()
        .fg(status_color(class))
        .add_modifier(Modifier::BOLD)
}

pub fn connection_color(connected: bool) -> Color {
    if connected {
        Color::Rgb(56, 189, 248)
    } else {
        Color::Rgb(245, 158, 11)
    }
}
