pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod headless;
pub mod logging;
pub mod theme;
pub mod ui;

pub use app::{App, ConnectionStatus};
pub use client::{FeedEvent, StreamClient};
pub use config::{load_config, Config, Origin};
