use crate::error::ConfigError;
use clap::Parser;
use std::env;
use url::Url;

pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:9111";
pub const FEED_PATH: &str = "/ws";

#[derive(Parser, Debug, Default)]
#[command(name = "pinger-board", about = "Live status board for the pinger feed")]
pub struct Args {
    /// Origin the board is served from, e.g. https://status.example.com
    #[arg(long, default_value = "")]
    pub origin: String,
    /// Full feed endpoint, overrides the one derived from the origin
    #[arg(long, default_value = "")]
    pub url: String,
    #[arg(long, default_value_t = false)]
    pub headless: bool,
    #[arg(long, default_value = "")]
    pub log_dir: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub endpoint: Url,
    pub headless: bool,
    pub log_dir: String,
    pub log_stdout: bool,
    pub log_level: String,
}

/// Scheme security and host of the page the board stands in for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Origin {
    pub secure: bool,
    pub host: String,
}

impl Origin {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(raw.trim())?;
        let secure = match url.scheme() {
            "https" | "wss" => true,
            "http" | "ws" => false,
            other => {
                return Err(ConfigError::UnsupportedScheme {
                    scheme: other.to_string(),
                    url: raw.to_string(),
                })
            }
        };
        let host = url
            .host_str()
            .ok_or_else(|| ConfigError::MissingHost(raw.to_string()))?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Ok(Self { secure, host })
    }

    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let scheme = if self.secure { "wss" } else { "ws" };
        Ok(Url::parse(&format!("{scheme}://{}{FEED_PATH}", self.host))?)
    }
}

pub fn load_config() -> Result<Config, ConfigError> {
    Config::from_args(Args::parse())
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let endpoint = resolve_endpoint(&args.url, &args.origin)?;
        let headless = args.headless || env_flag("PINGER_HEADLESS").unwrap_or(false);
        let log_level =
            resolve_value("", "PINGER_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        Ok(Self {
            endpoint,
            headless,
            log_dir: resolve_log_dir(&args.log_dir),
            log_stdout: env_flag("PINGER_LOG_STDOUT").unwrap_or(false),
            log_level,
        })
    }
}

pub fn resolve_endpoint(flag_url: &str, flag_origin: &str) -> Result<Url, ConfigError> {
    if let Some(raw) = resolve_value(flag_url, "PINGER_URL") {
        return parse_feed_url(&raw);
    }
    let origin = resolve_value(flag_origin, "PINGER_ORIGIN")
        .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
    Origin::parse(&origin)?.endpoint()
}

pub fn parse_feed_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme {
            scheme: other.to_string(),
            url: raw.to_string(),
        }),
    }
}

fn resolve_log_dir(flag: &str) -> String {
    resolve_value(flag, "PINGER_LOG_DIR").unwrap_or_default()
}

fn resolve_value(flag: &str, key: &str) -> Option<String> {
    if !flag.trim().is_empty() {
        return Some(flag.to_string());
    }
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|value| parse_bool_flag(&value))
}

pub fn parse_bool_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_origin_maps_to_ws_endpoint() {
        let origin = Origin::parse("http://127.0.0.1:9111").expect("parse origin");
        assert!(!origin.secure);
        assert_eq!(origin.host, "127.0.0.1:9111");
        assert_eq!(
            origin.endpoint().expect("endpoint").as_str(),
            "ws://127.0.0.1:9111/ws"
        );
    }

    #[test]
    fn secure_origin_maps_to_wss_endpoint() {
        let origin = Origin::parse("https://status.example.com/dashboard?x=1").expect("parse");
        assert!(origin.secure);
        assert_eq!(
            origin.endpoint().expect("endpoint").as_str(),
            "wss://status.example.com/ws"
        );
    }

    #[test]
    fn origin_path_is_ignored_and_port_kept() {
        let origin = Origin::parse("https://status.example.com:8443/board/").expect("parse");
        assert_eq!(
            origin.endpoint().expect("endpoint").as_str(),
            "wss://status.example.com:8443/ws"
        );
    }

    #[test]
    fn origin_rejects_unknown_scheme() {
        assert!(matches!(
            Origin::parse("ftp://files.example.com"),
            Err(ConfigError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            Origin::parse("not a url"),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn feed_url_override_must_be_websocket() {
        assert_eq!(
            parse_feed_url("wss://feed.example.com/ws")
                .expect("wss url")
                .as_str(),
            "wss://feed.example.com/ws"
        );
        assert!(matches!(
            parse_feed_url("http://feed.example.com/ws"),
            Err(ConfigError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn explicit_flags_win_over_defaults() {
        let url = resolve_endpoint("ws://10.0.0.5:7000/ws", "").expect("flag url");
        assert_eq!(url.as_str(), "ws://10.0.0.5:7000/ws");
        let url = resolve_endpoint("", "https://board.internal").expect("flag origin");
        assert_eq!(url.as_str(), "wss://board.internal/ws");
    }

    #[test]
    fn default_origin_points_at_local_feed() {
        let origin = Origin::parse(DEFAULT_ORIGIN).expect("default origin");
        assert_eq!(
            origin.endpoint().expect("endpoint").as_str(),
            "ws://127.0.0.1:9111/ws"
        );
    }

    #[test]
    fn parse_bool_flag_accepts_common_values() {
        assert_eq!(parse_bool_flag("1"), Some(true));
        assert_eq!(parse_bool_flag(" YES "), Some(true));
        assert_eq!(parse_bool_flag("on"), Some(true));
        assert_eq!(parse_bool_flag("0"), Some(false));
        assert_eq!(parse_bool_flag("Off"), Some(false));
        assert_eq!(parse_bool_flag("maybe"), None);
    }
}
