use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_CRONTAB_PROGRAM: &str = "crontab";
pub const DEFAULT_CRONTAB_TIMEOUT_SECS: u64 = 10;
pub const MAX_BODY_BYTES: usize = 1024 * 1024; // 1 MB: far beyond any sane crontab

/// Top-level config (cronui.toml + CRONUI_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CronuiConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub crontab: CrontabConfig,
}

/// HTTP boundary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Shown to clients so they can tell which machine's table they edit.
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Contact address surfaced to clients for failure reports.
    pub error_email: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            hostname: default_hostname(),
            error_email: None,
        }
    }
}

/// How the external `crontab` tool is invoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrontabConfig {
    /// Binary used for `-l` (read) and `<file>` (install).
    #[serde(default = "default_program")]
    pub program: String,
    /// Hard cap on a single invocation; a hung tool surfaces as an error.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Where staging files are written before install. OS temp dir when unset.
    pub staging_dir: Option<String>,
}

impl Default for CrontabConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            timeout_secs: DEFAULT_CRONTAB_TIMEOUT_SECS,
            staging_dir: None,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_program() -> String {
    DEFAULT_CRONTAB_PROGRAM.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_CRONTAB_TIMEOUT_SECS
}
fn default_hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}

impl CronuiConfig {
    /// Load config from a TOML file with CRONUI_* env var overrides.
    ///
    /// Nested keys use a double underscore: `CRONUI_SERVER__PORT=9000`.
    /// A missing file is not an error; every field has a default.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: CronuiConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("CRONUI_").split("__"))
            .extract()
            .map_err(|e| crate::error::CronuiError::Config(e.to_string()))?;

        Ok(config)
    }

    /// `bind:port` string ready for `SocketAddr` parsing.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.cronui/cronui.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_file_missing() {
        let config = CronuiConfig::load(Some("/nonexistent/cronui.toml")).unwrap();
        assert_eq!(config.crontab.program, "crontab");
        assert_eq!(config.crontab.timeout_secs, DEFAULT_CRONTAB_TIMEOUT_SECS);
        assert!(config.crontab.staging_dir.is_none());
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9123\nerror_email = \"ops@example.com\"\n\n[crontab]\nprogram = \"/usr/bin/crontab\"\ntimeout_secs = 3"
        )
        .unwrap();

        let config = CronuiConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.server.port, 9123);
        assert_eq!(config.server.error_email.as_deref(), Some("ops@example.com"));
        assert_eq!(config.crontab.program, "/usr/bin/crontab");
        assert_eq!(config.crontab.timeout_secs, 3);
        assert_eq!(config.server.bind, DEFAULT_BIND);
    }

    #[test]
    fn listen_addr_joins_bind_and_port() {
        let config = CronuiConfig::default();
        assert_eq!(config.listen_addr(), "127.0.0.1:8000");
    }
}
