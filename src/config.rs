use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

/// Electric Vehicle Adoption Dashboard
#[derive(Debug, Clone, Parser)]
#[command(name = "ev-dashboard", version, about)]
pub struct Config {
    /// Dataset to load (.csv, .json or .parquet)
    #[arg(short, long, env = "EV_DASHBOARD_DATA", default_value = "data.csv")]
    pub data: PathBuf,

    /// Serve the dashboard over HTTP instead of opening a window
    #[arg(long, env = "EV_DASHBOARD_SERVE")]
    pub serve: bool,

    /// Address the HTTP server binds to
    #[arg(long, env = "EV_DASHBOARD_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// HTTP port
    #[arg(short, long, env = "EV_DASHBOARD_PORT", default_value_t = 8050)]
    pub port: u16,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long)]
    pub debug: bool,
}

impl Config {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Default `env_logger` filter.
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}
