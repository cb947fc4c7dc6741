use clap::Parser;
use shortcut_auth::AuthKey;
use shortcut_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const LISTEN_ADDR_ENV: &str = "SERVER_ADDRESS";
pub const BASE_URL_ENV: &str = "BASE_URL";
pub const FILE_STORAGE_PATH_ENV: &str = "FILE_STORAGE_PATH";
pub const DATABASE_DSN_ENV: &str = "DATABASE_DSN";
pub const AUTH_SECRET_ENV: &str = "AUTH_SECRET";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Server configuration.
///
/// Every flag falls back to its environment variable; a flag given on the
/// command line wins over the environment.
#[derive(Debug, Parser)]
#[command(name = "shortener", about = "URL shortener HTTP server")]
pub struct Cli {
    /// Address to listen on, as `host:port` or `:port` for all interfaces.
    #[arg(
        short = 'a',
        long,
        env = LISTEN_ADDR_ENV,
        default_value = DEFAULT_LISTEN_ADDR,
        value_parser = parse_listen_addr
    )]
    pub listen_addr: String,

    /// Prefix of issued short URLs.
    #[arg(short = 'b', long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Persist URLs to this file.
    #[arg(short = 'f', long, env = FILE_STORAGE_PATH_ENV)]
    pub file_storage_path: Option<PathBuf>,

    /// PostgreSQL connection string; takes precedence over the file store.
    #[arg(short = 'd', long, env = DATABASE_DSN_ENV, hide_env_values = true)]
    pub database_dsn: Option<String>,

    /// Hex-encoded 32-byte key sealing auth cookies.
    #[arg(long, env = AUTH_SECRET_ENV, hide_env_values = true)]
    pub auth_secret: Option<AuthKey>,

    #[arg(long, env = LOG_FORMAT_ENV, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Normalises a listen address for `TcpListener::bind`.
///
/// Host names are resolved at bind time, so only the port is checked here.
fn parse_listen_addr(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    let (host, port) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("'{raw}' has no port"))?;
    port.parse::<u16>()
        .map_err(|e| format!("invalid port '{port}': {e}"))?;

    if host.is_empty() {
        Ok(format!("0.0.0.0:{port}"))
    } else {
        Ok(raw.to_string())
    }
}

/// The storage backend selected by the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend<'a> {
    Postgres(&'a str),
    File(&'a Path),
    InMemory,
}

impl Display for Backend<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Postgres(_) => write!(f, "postgres"),
            Backend::File(path) => write!(f, "file ({})", path.display()),
            Backend::InMemory => write!(f, "in-memory"),
        }
    }
}

impl Cli {
    /// A DSN wins over a file path; with neither, URLs live in memory.
    pub fn backend(&self) -> Backend<'_> {
        let dsn = self.database_dsn.as_deref().filter(|dsn| !dsn.is_empty());
        let path = self
            .file_storage_path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty());

        match (dsn, path) {
            (Some(dsn), _) => Backend::Postgres(dsn),
            (None, Some(path)) => Backend::File(path),
            (None, None) => Backend::InMemory,
        }
    }
}
