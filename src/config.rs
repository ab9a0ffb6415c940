//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (server URL, `--username`, `--theme`, etc.)
//! 2. `--config <path>`
//! 3. `$NOTES_TUI_CONFIG` environment variable (path to config file)
//! 4. Project-local `.notes-tui.toml` in the current working directory
//! 5. Global `~/.config/notes-tui/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

// ── Section configs ──────────────────────────────────────────────────────────

/// Backend connection settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the notes backend.
    pub url: Option<String>,
    /// Username pre-filled in the login dialog.
    pub username: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable mouse support.
    pub mouse: Option<bool>,
    /// Where to write the log file.
    pub log_file: Option<String>,
    /// How long toast messages stay visible.
    pub toast_secs: Option<u64>,
}

/// Tree panel settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// Use nerd font icons (false = ASCII fallback).
    pub use_icons: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a query is sent.
    pub debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GitConfig {
    /// Periodic git info refresh interval; 0 disables it.
    pub info_refresh_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EditorConfig {
    /// Syntax highlighting theme (syntect theme name).
    pub syntax_theme: Option<String>,
    pub tab_width: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark" or "light".
    pub scheme: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub general: GeneralConfig,
    pub tree: TreeConfig,
    pub search: SearchConfig,
    pub git: GitConfig,
    pub editor: EditorConfig,
    pub theme: ThemeConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TOAST_SECS: u64 = 3;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_GIT_INFO_REFRESH_SECS: u64 = 60;
pub const DEFAULT_TAB_WIDTH: usize = 4;

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path; that is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("NOTES_TUI_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".notes-tui.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("notes-tui").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            // Logging may not be up yet, so also tell the user directly.
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`: `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            server: ServerConfig {
                url: other.server.url.clone().or(self.server.url),
                username: other.server.username.clone().or(self.server.username),
                timeout_secs: other.server.timeout_secs.or(self.server.timeout_secs),
            },
            general: GeneralConfig {
                mouse: other.general.mouse.or(self.general.mouse),
                log_file: other.general.log_file.clone().or(self.general.log_file),
                toast_secs: other.general.toast_secs.or(self.general.toast_secs),
            },
            tree: TreeConfig {
                use_icons: other.tree.use_icons.or(self.tree.use_icons),
            },
            search: SearchConfig {
                debounce_ms: other.search.debounce_ms.or(self.search.debounce_ms),
            },
            git: GitConfig {
                info_refresh_secs: other.git.info_refresh_secs.or(self.git.info_refresh_secs),
            },
            editor: EditorConfig {
                syntax_theme: other
                    .editor
                    .syntax_theme
                    .clone()
                    .or(self.editor.syntax_theme),
                tab_width: other.editor.tab_width.or(self.editor.tab_width),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Walk in reverse so that the highest-priority file overwrites lower ones.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn server_url(&self) -> &str {
        self.server.url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn username(&self) -> &str {
        self.server.username.as_deref().unwrap_or("")
    }

    pub fn timeout_secs(&self) -> u64 {
        self.server.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    /// Log file path: configured, else `<data dir>/notes-tui/notes-tui.log`.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.general
            .log_file
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| dirs::data_local_dir().map(|d| d.join("notes-tui").join("notes-tui.log")))
    }

    pub fn toast_secs(&self) -> u64 {
        self.general.toast_secs.unwrap_or(DEFAULT_TOAST_SECS)
    }

    pub fn use_icons(&self) -> bool {
        self.tree.use_icons.unwrap_or(false)
    }

    pub fn search_debounce_ms(&self) -> u64 {
        self.search.debounce_ms.unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS)
    }

    pub fn git_info_refresh_secs(&self) -> u64 {
        self.git
            .info_refresh_secs
            .unwrap_or(DEFAULT_GIT_INFO_REFRESH_SECS)
    }

    pub fn syntax_theme_name(&self) -> &str {
        self.editor
            .syntax_theme
            .as_deref()
            .unwrap_or("base16-ocean.dark")
    }

    pub fn tab_width(&self) -> usize {
        self.editor.tab_width.unwrap_or(DEFAULT_TAB_WIDTH)
    }

    /// Theme scheme: "dark" or "light".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
