use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use pinger_board::{
    client::FEED_QUEUE_CAPACITY, headless::run_headless, load_config, logging::init_logging, ui,
    App, FeedEvent, StreamClient,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = load_config()?;
    let _log_guard = init_logging(&config);
    info!(event = "board_start", endpoint = %config.endpoint, headless = config.headless);

    let (feed_tx, mut feed_rx) = mpsc::channel(FEED_QUEUE_CAPACITY);
    let mut app = App::new(config.endpoint.clone());
    let client = StreamClient::connect(config.endpoint.clone(), feed_tx);

    let result = if config.headless {
        run_headless(&mut app, &mut feed_rx, io::stdout()).await;
        Ok(())
    } else {
        run_terminal(&mut app, &mut feed_rx).await
    };

    drop(feed_rx);
    client.shutdown().await;
    info!(event = "board_exit");
    result
}

async fn run_terminal(app: &mut App, feed_rx: &mut mpsc::Receiver<FeedEvent>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, app, feed_rx).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    feed_rx: &mut mpsc::Receiver<FeedEvent>,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut feed_open = true;

    loop {
        if app.take_clear_request() {
            terminal.clear()?;
        }
        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            maybe_event = feed_rx.recv(), if feed_open => {
                match maybe_event {
                    Some(event) => app.apply_feed_event(event),
                    None => feed_open = false,
                }
            }
            maybe_input = events.next() => {
                match maybe_input {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.handle_key(key);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => app.quit(),
                }
            }
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
