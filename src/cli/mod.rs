// CLI module for folio-gateway
// Author: kelexine (https://github.com/kelexine)

use clap::Parser;
use std::path::PathBuf;

/// folio-gateway - cached Gemini prompt gateway for the portfolio site
#[derive(Parser, Debug)]
#[command(name = "folio-gateway", version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file (default: ~/.folio-gateway/config.toml, optional)
    #[arg(short, long, env = "FOLIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    pub host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Args {
    /// Apply CLI overrides, the highest-precedence configuration source.
    pub fn apply(&self, config: &mut crate::config::AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
