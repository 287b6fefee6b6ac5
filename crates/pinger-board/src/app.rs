use crate::client::FeedEvent;
use crate::ui::View;
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pinger_core::{ApplyOutcome, ClientState, Display, StateStore, Subscriber};
use std::cell::Ref;
use tracing::{info, warn};
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected(Option<String>),
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected(_) => "disconnected",
        }
    }
}

pub struct App {
    endpoint: Url,
    store: StateStore,
    view: View,
    connection: ConnectionStatus,
    last_update: Option<DateTime<Utc>>,
    clear_requested: bool,
    should_quit: bool,
}

impl App {
    pub fn new(endpoint: Url) -> Self {
        let mut store = StateStore::new();
        let view = View::new();
        store.subscribe(view.clone());
        Self {
            endpoint,
            store,
            view,
            connection: ConnectionStatus::Connecting,
            last_update: None,
            clear_requested: false,
            should_quit: false,
        }
    }

    pub fn subscribe<S>(&mut self, subscriber: S)
    where
        S: Subscriber + 'static,
    {
        self.store.subscribe(subscriber);
    }

    pub fn apply_feed_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Connected => {
                self.connection = ConnectionStatus::Connected;
            }
            FeedEvent::Message(message) => {
                let kind = message.kind();
                let outcome = self.store.apply_message(message);
                self.last_update = Some(Utc::now());
                if let ApplyOutcome::Replaced { collapsed, .. } = outcome {
                    if collapsed > 0 {
                        warn!(event = "snapshot_duplicate_apps", collapsed);
                    }
                }
                info!(event = "state_applied", kind, outcome = ?outcome);
            }
            FeedEvent::Disconnected(reason) => {
                info!(
                    event = "feed_disconnected",
                    reason = reason.as_deref().unwrap_or("closed")
                );
                self.connection = ConnectionStatus::Disconnected(reason);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('r') => self.clear_requested = true,
            _ => {}
        }
    }

    /// Returns and resets a pending full-screen clear.
    pub fn take_clear_request(&mut self) -> bool {
        std::mem::take(&mut self.clear_requested)
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn state(&self) -> &ClientState {
        self.store.state()
    }

    pub fn display(&self) -> Ref<'_, Display> {
        self.view.display()
    }

    pub fn renders(&self) -> u64 {
        self.view.renders()
    }

    pub fn connection(&self) -> &ConnectionStatus {
        &self.connection
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// `(running, total)` over the current collection.
    pub fn counts(&self) -> (usize, usize) {
        self.store
            .collection()
            .map(|collection| (collection.ok_count(), collection.len()))
            .unwrap_or((0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use pinger_core::{decode_message, StatusClass};

    fn test_app() -> App {
        App::new(Url::parse("ws://127.0.0.1:9111/ws").expect("url"))
    }

    fn message(raw: &str) -> FeedEvent {
        FeedEvent::Message(decode_message(raw).expect("decode"))
    }

    #[test]
    fn new_app_shows_loading_and_connecting() {
        let app = test_app();
        assert!(app.display().is_loading());
        assert_eq!(app.connection(), &ConnectionStatus::Connecting);
        assert_eq!(app.renders(), 0);
        assert_eq!(app.counts(), (0, 0));
        assert!(app.last_update().is_none());
    }

    #[test]
    fn feed_events_drive_connection_and_display() {
        let mut app = test_app();
        app.apply_feed_event(FeedEvent::Connected);
        assert_eq!(app.connection().label(), "connected");

        app.apply_feed_event(message(
            r#"[{"app":"svc-a","isOk":true},{"app":"svc-b","isOk":false}]"#,
        ));
        app.apply_feed_event(message(r#"{"app":"svc-a","isOk":false}"#));
        assert_eq!(app.renders(), 2);
        assert_eq!(app.counts(), (0, 2));
        assert!(app.last_update().is_some());
        let classes: Vec<StatusClass> =
            app.display().rows().iter().map(|row| row.class).collect();
        assert_eq!(classes, vec![StatusClass::Down, StatusClass::Down]);

        app.apply_feed_event(FeedEvent::Disconnected(Some("reset".to_string())));
        assert_eq!(
            app.connection(),
            &ConnectionStatus::Disconnected(Some("reset".to_string()))
        );
        assert_eq!(app.display().rows().len(), 2);
    }

    #[test]
    fn extra_subscribers_see_every_apply() {
        let mut app = test_app();
        let seen = std::rc::Rc::new(std::cell::Cell::new(0usize));
        struct Counter(std::rc::Rc<std::cell::Cell<usize>>);
        impl Subscriber for Counter {
            fn notify(&mut self, _state: &ClientState) {
                self.0.set(self.0.get() + 1);
            }
        }
        app.subscribe(Counter(seen.clone()));
        app.apply_feed_event(message(r#"{"app":"svc-a","isOk":true}"#));
        app.apply_feed_event(message(r#"{"app":"svc-a","isOk":true}"#));
        assert_eq!(seen.get(), 2);
        assert_eq!(app.display().rows().len(), 1);
    }

    #[test]
    fn quit_keys_end_the_session() {
        for key in [
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE),
            KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut app = test_app();
            assert_eq!(key.kind, KeyEventKind::Press);
            app.handle_key(key);
            assert!(app.should_quit());
        }

        let mut app = test_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE));
        assert!(!app.should_quit());
    }

    #[test]
    fn redraw_key_requests_one_clear() {
        let mut app = test_app();
        assert!(!app.take_clear_request());
        app.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE));
        assert!(app.take_clear_request());
        assert!(!app.take_clear_request());
        assert!(!app.should_quit());
    }
}
