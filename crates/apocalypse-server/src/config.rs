use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use apocalypse_api::StaticAssets;

/// Server configuration. Every flag can also come from the environment
/// (or a `.env` file loaded before parsing).
#[derive(Debug, Clone, Parser)]
#[command(
    name = "apocalypse",
    about = "Track survivors resources, location and status of infection in a robot apocalypse"
)]
pub struct Config {
    /// Host IP to listen on. Empty means all interfaces.
    #[arg(long, env = "APOCALYPSE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "APOCALYPSE_PORT", default_value_t = 8080)]
    pub port: u16,

    /// SQLite database file.
    #[arg(long, env = "APOCALYPSE_DB_PATH", default_value = "./apocalypse.db")]
    pub db_path: PathBuf,

    /// HTML template for /reportweb.
    #[arg(long, env = "APOCALYPSE_WEB_TEMPLATE", default_value = "./assets/index.html")]
    pub web_template: PathBuf,

    #[arg(long, env = "APOCALYPSE_STYLE_SHEET", default_value = "./assets/style.css")]
    pub style_sheet: PathBuf,

    /// OpenAPI description served at /swagger.yaml.
    #[arg(long, env = "APOCALYPSE_API_SPEC", default_value = "./assets/swagger.yaml")]
    pub api_spec: PathBuf,

    /// Remote robot CPU list proxied by /robotcpu.
    #[arg(
        long,
        env = "APOCALYPSE_ROBOT_ENDPOINT",
        default_value = "https://robotstakeover20210903110417.azurewebsites.net/robotcpu"
    )]
    pub robot_endpoint: String,

    #[arg(long, env = "APOCALYPSE_ROBOT_TIMEOUT_SECS", default_value_t = 10)]
    pub robot_timeout_secs: u64,
}

impl Config {
    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        let host = if self.host.is_empty() { "0.0.0.0" } else { self.host.as_str() };
        format!("{}:{}", host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, self.port))
    }

    pub fn robot_timeout(&self) -> Duration {
        Duration::from_secs(self.robot_timeout_secs)
    }

    pub fn assets(&self) -> StaticAssets {
        StaticAssets {
            style_sheet: self.style_sheet.clone(),
            api_spec: self.api_spec.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "apocalypse",
            "--host",
            "127.0.0.1",
            "--port",
            "9090",
            "--db-path",
            "/tmp/test.db",
            "--robot-endpoint",
            "http://localhost:1234/robotcpu",
            "--robot-timeout-secs",
            "3",
        ])
        .unwrap();

        assert_eq!(config.listen_addr().unwrap(), "127.0.0.1:9090".parse::<SocketAddr>().unwrap());
        assert_eq!(config.db_path, PathBuf::from("/tmp/test.db"));
        assert_eq!(config.robot_endpoint, "http://localhost:1234/robotcpu");
        assert_eq!(config.robot_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn empty_host_listens_everywhere() {
        let config = Config::try_parse_from(["apocalypse", "--host", "", "--port", "8080"]).unwrap();
        assert_eq!(config.listen_addr().unwrap(), "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn bad_host_is_an_error() {
        let config = Config::try_parse_from(["apocalypse", "--host", "not an ip"]).unwrap();
        assert!(config.listen_addr().is_err());
    }

    #[test]
    fn bad_port_is_rejected() {
        assert!(Config::try_parse_from(["apocalypse", "--port", "99999"]).is_err());
    }
}
