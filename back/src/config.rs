use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::Parser;

/// Per-user todo lists served over HTTP.
#[derive(Clone, Debug, Parser)]
#[command(name = "todos", version)]
pub struct Config {
    /// Port to listen on, on all interfaces.
    #[arg(long, env = "TODOS_PORT", default_value_t = 7890)]
    pub port: u16,

    /// Snapshot file of the todo table.
    #[arg(long, env = "TODOS_DATA_FILE", default_value = "data.ron")]
    pub data_file: PathBuf,

    /// RON list of user records.
    #[arg(long, env = "TODOS_USERS_FILE", default_value = "users.ron")]
    pub users_file: PathBuf,

    /// Directory served under `/assets` (stylesheet and the editor bundle).
    #[arg(long, env = "TODOS_ASSETS_DIR", default_value = "assets")]
    pub assets_dir: PathBuf,

    /// Seconds between snapshot flushes.
    #[arg(long, env = "TODOS_FLUSH_INTERVAL", default_value_t = 300)]
    pub flush_interval: u64,

    #[arg(long, env = "SSL_CERT", requires = "ssl_key")]
    pub ssl_cert: Option<PathBuf>,

    #[arg(long, env = "SSL_KEY", requires = "ssl_cert")]
    pub ssl_key: Option<PathBuf>,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0; 4], self.port))
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval.max(1))
    }

    pub fn tls(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.ssl_cert.as_ref().zip(self.ssl_key.as_ref())
    }
}
