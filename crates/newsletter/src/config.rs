//! Service configuration loaded from TOML.
//!
//! ```toml
//! version = "1"
//! stage = "local"
//!
//! [server]
//! port = 8000
//! app_version = "1.0.0"
//!
//! [database]
//! host = "localhost"
//! name = "newsletter"
//! username = "sa"
//! password = "${DB_PASSWORD}"
//!
//! [mail]
//! smtp_host = "smtp.example.com"
//! sender = "noreply@example.com"
//!
//! [log]
//! level = "info"
//! format = "compact"
//! ```
//!
//! `${VAR}` references in string values are replaced from the environment
//! after `.env` has been loaded.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::service::Newsletter;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: String,

    #[serde(default = "default_stage")]
    pub stage: String,

    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_app_version")]
    pub app_version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            app_version: default_app_version(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_table")]
    pub table: String,
}

impl DatabaseConfig {
    /// ADO.NET-style connection string for SQL Server.
    pub fn ado_connection_string(&self) -> String {
        format!(
            "server=tcp:{},{};database={};user id={};password={};TrustServerCertificate=true",
            self.host, self.port, self.name, self.username, self.password
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub tls_skip_verify: bool,
    pub subject: Option<String>,
    pub body: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            sender: String::new(),
            password: String::new(),
            tls_skip_verify: false,
            subject: None,
            body: None,
        }
    }
}

impl MailConfig {
    /// Newsletter text, with unset parts taken from the defaults.
    pub fn newsletter(&self) -> Newsletter {
        let default = Newsletter::default();
        Newsletter {
            subject: self.subject.clone().unwrap_or(default.subject),
            body: self.body.clone().unwrap_or(default.body),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_stage() -> String {
    "local".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_db_port() -> u16 {
    1433
}

fn default_table() -> String {
    "TB_TRN_Subscribers".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load `.env` (if present), then read, expand and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let _ = dotenvy::dotenv();

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parse, expand and validate config text.
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let mut config: Config = toml::from_str(raw).context("failed to parse config")?;
        config.expand_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Every string value that may hold `${VAR}` references.
    fn strings_mut(&mut self) -> Vec<&mut String> {
        let Config {
            stage,
            server,
            database,
            mail,
            log,
            ..
        } = self;
        let mut fields = vec![
            stage,
            &mut server.app_version,
            &mut database.host,
            &mut database.name,
            &mut database.username,
            &mut database.password,
            &mut database.table,
            &mut mail.smtp_host,
            &mut mail.sender,
            &mut mail.password,
            &mut log.level,
        ];
        fields.extend(mail.subject.as_mut());
        fields.extend(mail.body.as_mut());
        fields
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        for value in self.strings_mut() {
            *value = expand_env_vars(value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }
        if self.server.port == 0 {
            anyhow::bail!("server.port must not be 0");
        }
        if self.database.host.trim().is_empty() {
            anyhow::bail!("database.host must not be empty");
        }
        if self.database.port == 0 {
            anyhow::bail!("database.port must not be 0");
        }
        if self.database.name.trim().is_empty() {
            anyhow::bail!("database.name must not be empty");
        }
        if self.database.table.trim().is_empty() {
            anyhow::bail!("database.table must not be empty");
        }
        if self.mail.smtp_port == 0 {
            anyhow::bail!("mail.smtp_port must not be 0");
        }
        Ok(())
    }
}

/// Substitute each `${VAR}` with the variable's value; a bare `$` is kept.
fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find("${") {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 2..];
        let Some(close) = tail.find('}') else {
            anyhow::bail!("unterminated env var reference in {input:?}");
        };
        let key = &tail[..close];
        if key.is_empty() {
            anyhow::bail!("empty env var reference in {input:?}");
        }
        let value = std::env::var(key)
            .with_context(|| format!("env var {key} referenced by the config is not set"))?;
        out.push_str(&value);
        rest = &tail[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
