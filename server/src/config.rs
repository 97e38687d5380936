use std::time::Duration;

use clap::Parser;
use system::{BrushColorPolicy, HubConfig};

use crate::server::ServerOptions;

#[derive(Debug, Clone, Parser)]
#[command(name = "whiteboard-server", about = "Shared canvas synchronization server")]
pub struct Config {
    /// Address the HTTP/websocket listener binds to.
    #[arg(long, env = "WHITEBOARD_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Session joined through `/ws` without a session id.
    #[arg(long, env = "WHITEBOARD_DEFAULT_SESSION", default_value = "default")]
    pub default_session: String,

    /// Cursor broadcast period in milliseconds. 0 broadcasts every cursor move.
    #[arg(long, env = "WHITEBOARD_CURSOR_FLUSH_MS", default_value_t = 50)]
    pub cursor_flush_ms: u64,

    /// Comma separated presence colors.
    #[arg(long, env = "WHITEBOARD_PALETTE", value_delimiter = ',')]
    pub palette: Vec<String>,

    /// `client` keeps brush colors as sent, `presence` paints with the author's color.
    #[arg(long, env = "WHITEBOARD_BRUSH_COLOR", default_value = "client", value_parser = parse_brush_color)]
    pub brush_color: BrushColorPolicy,

    /// Keep a session's canvas after its last user leaves.
    #[arg(long, env = "WHITEBOARD_RETAIN_EMPTY_SESSIONS")]
    pub retain_empty_sessions: bool,

    /// Origins allowed by CORS. Any origin when omitted.
    #[arg(long, env = "WHITEBOARD_ALLOWED_ORIGIN", value_delimiter = ',')]
    pub allowed_origin: Vec<String>,
}

fn parse_brush_color(value: &str) -> Result<BrushColorPolicy, String> {
    match value {
        "client" => Ok(BrushColorPolicy::Client),
        "presence" => Ok(BrushColorPolicy::Presence),
        other => Err(format!("expected `client` or `presence`, got `{}`", other)),
    }
}

impl Config {
    pub fn server_options(&self) -> ServerOptions {
        let palette = self
            .palette
            .iter()
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>();
        let mut hub = HubConfig {
            coalesce_cursors: self.cursor_flush_ms > 0,
            brush_color: self.brush_color,
            ..HubConfig::default()
        };
        if !palette.is_empty() {
            hub.palette = palette;
        }

        ServerOptions {
            hub,
            retain_empty_sessions: self.retain_empty_sessions,
            cursor_flush_interval: if self.cursor_flush_ms > 0 {
                Duration::from_millis(self.cursor_flush_ms)
            } else {
                // nothing is ever pending, the tick only keeps the loop shape
                Duration::from_secs(1)
            },
        }
    }
}
