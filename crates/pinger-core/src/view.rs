use crate::store::ClientState;

pub const LOADING_TEXT: &str = "Loading...";

pub mod glyphs {
    pub const RUNNING: &str = "🚀";
    pub const DOWN: &str = "❌";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    Down,
}

impl StatusClass {
    pub fn from_ok(is_ok: bool) -> Self {
        if is_ok {
            StatusClass::Ok
        } else {
            StatusClass::Down
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusClass::Ok => "RUNNING",
            StatusClass::Down => "DOWN",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            StatusClass::Ok => glyphs::RUNNING,
            StatusClass::Down => glyphs::DOWN,
        }
    }

    /// Class name the row is styled by.
    pub fn class_name(self) -> &'static str {
        match self {
            StatusClass::Ok => "green",
            StatusClass::Down => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub app: String,
    pub class: StatusClass,
}

impl StatusRow {
    pub fn label(&self) -> &'static str {
        self.class.label()
    }

    pub fn glyph(&self) -> &'static str {
        self.class.glyph()
    }

    pub fn text(&self) -> String {
        format!("{} {} ({})", self.glyph(), self.app, self.label())
    }
}

/// Everything the mount point shows after one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Loading,
    Rows(Vec<StatusRow>),
}

impl Display {
    pub fn is_loading(&self) -> bool {
        matches!(self, Display::Loading)
    }

    pub fn rows(&self) -> &[StatusRow] {
        match self {
            Display::Loading => &[],
            Display::Rows(rows) => rows,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        match self {
            Display::Loading => vec![LOADING_TEXT.to_string()],
            Display::Rows(rows) => rows.iter().map(StatusRow::text).collect(),
        }
    }
}

/// Rebuilds the whole displayed list from the state.
pub fn render(state: &ClientState) -> Display {
    match state {
        ClientState::Uninitialized => Display::Loading,
        ClientState::Ready(collection) => Display::Rows(
            collection
                .iter()
                .map(|status| StatusRow {
                    app: status.app.clone(),
                    class: StatusClass::from_ok(status.is_ok),
                })
                .collect(),
        ),
    }
}
