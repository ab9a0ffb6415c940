mod actions;
mod api;
mod app;
mod components;
mod config;
mod editor;
mod error;
mod event;
mod handler;
mod highlight;
mod logging;
mod notes;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::app::App;
use crate::config::{AppConfig, GeneralConfig, ServerConfig, ThemeConfig};
use crate::event::{Event, EventHandler};
use crate::highlight::Highlighter;
use crate::tui::{install_panic_hook, Tui};

/// A terminal front-end for a git-backed notes wiki.
#[derive(Parser, Debug)]
#[command(name = "notes", version, about)]
struct Cli {
    /// Backend base URL (default: http://localhost:3000)
    server: Option<String>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Username to prefill in the login dialog
    #[arg(long, short)]
    username: Option<String>,

    /// Write logs to this file instead of the default location
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Disable mouse capture
    #[arg(long)]
    no_mouse: bool,

    /// Color scheme: dark or light
    #[arg(long)]
    theme: Option<String>,
}

impl Cli {
    /// Config layer holding only the values given on the command line.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            server: ServerConfig {
                url: self.server.clone(),
                username: self.username.clone(),
                ..Default::default()
            },
            general: GeneralConfig {
                mouse: self.no_mouse.then_some(false),
                log_file: self
                    .log_file
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
                ..Default::default()
            },
            theme: ThemeConfig {
                scheme: self.theme.clone(),
            },
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));

    if let Some(log_path) = config.log_file() {
        if let Err(e) = logging::init(&log_path) {
            eprintln!("Warning: logging disabled ({}): {}", log_path.display(), e);
        }
    }

    let client = ApiClient::new(
        config.server_url(),
        Duration::from_secs(config.timeout_secs()),
    )?;
    info!(server = %client.base_url(), "starting");

    let highlighter = Highlighter::new(config.syntax_theme_name());

    install_panic_hook();

    let mut tui = Tui::new(config.mouse_enabled())?;
    let mut app = App::new(&config);
    let mut events = EventHandler::new(Duration::from_millis(50));
    let event_tx = events.sender();

    loop {
        for action in app.take_actions() {
            actions::spawn(action, &client, &event_tx);
        }

        tui.draw(|frame| ui::render(&mut app, &highlighter, frame))?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse),
            Event::Tick => app.on_tick(),
            Event::Resize(_, _) => {}
            Event::SearchDue { generation } => app.on_search_due(generation),
            Event::Api(api_event) => app.handle_api(api_event),
        }

        if app.should_quit {
            break;
        }
    }

    if let Err(e) = tui.restore() {
        warn!(error = %e, "failed to restore terminal");
        return Err(e);
    }
    info!("exiting");
    Ok(())
}
