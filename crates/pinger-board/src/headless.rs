use crate::app::App;
use crate::client::FeedEvent;
use pinger_core::{render, ClientState, Subscriber};
use std::io::Write;
use tokio::sync::mpsc;
use tracing::warn;

/// Prints every render as plain text, one block per notification.
pub struct TextPrinter<W: Write> {
    out: W,
}

impl<W: Write> TextPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn print(&mut self, state: &ClientState) -> std::io::Result<()> {
        for line in render(state).lines() {
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> Subscriber for TextPrinter<W> {
    fn notify(&mut self, state: &ClientState) {
        if let Err(err) = self.print(state) {
            warn!(event = "headless_write_error", error = %err);
        }
    }
}

/// Runs without a terminal UI until the feed closes or Ctrl-C arrives.
pub async fn run_headless<W>(app: &mut App, feed_rx: &mut mpsc::Receiver<FeedEvent>, out: W)
where
    W: Write + 'static,
{
    let mut printer = TextPrinter::new(out);
    printer.notify(app.state());
    app.subscribe(printer);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            maybe_event = feed_rx.recv() => {
                let Some(event) = maybe_event else {
                    break;
                };
                let closed = matches!(event, FeedEvent::Disconnected(_));
                app.apply_feed_event(event);
                if closed {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                app.quit();
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinger_core::{decode_message, StateStore};
    use std::{cell::RefCell, io, rc::Rc};

    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).to_string()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn printer_writes_one_block_per_render() {
        let buffer = SharedBuffer::default();
        let mut store = StateStore::new();
        let mut printer = TextPrinter::new(buffer.clone());
        printer.notify(store.state());
        store.subscribe(printer);

        for raw in [
            r#"[{"app":"svc-a","isOk":true},{"app":"svc-b","isOk":false}]"#,
            r#"{"app":"svc-c","isOk":true}"#,
        ] {
            store.apply_message(decode_message(raw).expect("decode"));
        }

        let blocks: Vec<String> = buffer
            .text()
            .split("\n\n")
            .filter(|block| !block.is_empty())
            .map(str::to_string)
            .collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], "Loading...");
        assert!(blocks[1].ends_with("svc-b (DOWN)"));
        let last: Vec<&str> = blocks[2].lines().collect();
        assert_eq!(last.len(), 3);
        assert!(last[2].ends_with("svc-c (RUNNING)"));
    }
}
